use std::fmt::Debug;

use ndarray::{Array2, ScalarOperand};
use num_traits::Float;

use crate::error::RevGradError;
use crate::node::{Node, Op};
use crate::ops::{ensure_same_shape, ensure_same_tape};
use crate::var::Var;

/// Elementwise difference of two tracked matrices.
///
/// Local derivatives: 1 with respect to `x`, -1 with respect to `y`.
pub fn sub_op<T>(x: &Var<T>, y: &Var<T>) -> Result<Var<T>, RevGradError>
where
    T: Float + ScalarOperand + Debug + Send + Sync + 'static,
{
    ensure_same_tape(x, y, "sub")?;
    ensure_same_shape(x, y, "sub")?;

    let value = x.value() - y.value();
    let (rows, cols) = value.dim();
    let index = x.tape().push(Node {
        op: Op::Elementwise {
            deps: vec![x.index(), y.index()],
            factors: vec![
                Array2::ones(value.raw_dim()),
                Array2::from_elem(value.raw_dim(), -T::one()),
            ],
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
#[path = "sub_test.rs"]
mod tests;
