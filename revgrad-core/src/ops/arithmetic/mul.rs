use std::fmt::Debug;

use ndarray::ScalarOperand;
use num_traits::Float;

use crate::error::RevGradError;
use crate::node::{Node, Op};
use crate::ops::{ensure_same_shape, ensure_same_tape};
use crate::var::Var;

/// Elementwise (Hadamard) product of two tracked matrices.
///
/// Local derivatives: `y` with respect to `x`, `x` with respect to `y`.
pub fn mul_op<T>(x: &Var<T>, y: &Var<T>) -> Result<Var<T>, RevGradError>
where
    T: Float + ScalarOperand + Debug + Send + Sync + 'static,
{
    ensure_same_tape(x, y, "mul")?;
    ensure_same_shape(x, y, "mul")?;

    let value = x.value() * y.value();
    let (rows, cols) = value.dim();
    let index = x.tape().push(Node {
        op: Op::Elementwise {
            deps: vec![x.index(), y.index()],
            factors: vec![y.value().clone(), x.value().clone()],
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
#[path = "mul_test.rs"]
mod tests;
