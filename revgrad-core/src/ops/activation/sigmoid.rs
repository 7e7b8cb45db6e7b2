use std::fmt::Debug;

use ndarray::ScalarOperand;
use num_traits::Float;

use crate::error::RevGradError;
use crate::node::{Node, Op};
use crate::var::Var;

/// Elementwise logistic sigmoid, `e^x / (e^x + 1)`.
///
/// The stored local derivative is `e^x / (e^x + 1)^2`.
pub fn sigmoid_op<T>(x: &Var<T>) -> Result<Var<T>, RevGradError>
where
    T: Float + ScalarOperand + Debug + Send + Sync + 'static,
{
    let value = x.value().mapv(|v| v.exp() / (v.exp() + T::one()));
    let factor = x.value().mapv(|v| {
        let e = v.exp();
        let denom = e + T::one();
        e / (denom * denom)
    });

    let (rows, cols) = value.dim();
    let index = x.tape().push(Node {
        op: Op::Elementwise {
            deps: vec![x.index()],
            factors: vec![factor],
        },
        rows,
        cols,
    });

    Ok(Var {
        value,
        tape: x.tape().clone(),
        index,
    })
}

#[cfg(test)]
#[path = "sigmoid_test.rs"]
mod tests;
