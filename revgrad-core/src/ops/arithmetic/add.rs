use std::fmt::Debug;

use ndarray::{Array2, ScalarOperand};
use num_traits::Float;

use crate::error::RevGradError;
use crate::node::{Node, Op};
use crate::ops::{ensure_same_shape, ensure_same_tape};
use crate::var::Var;

/// Elementwise sum of two tracked matrices.
///
/// Both operands must live on the same tape and share a shape. The local
/// derivative with respect to either operand is 1 everywhere.
pub fn add_op<T>(x: &Var<T>, y: &Var<T>) -> Result<Var<T>, RevGradError>
where
    T: Float + ScalarOperand + Debug + Send + Sync + 'static,
{
    ensure_same_tape(x, y, "add")?;
    ensure_same_shape(x, y, "add")?;

    let value = x.value() + y.value();
    let (rows, cols) = value.dim();
    let ones = Array2::ones(value.raw_dim());
    let index = x.tape().push(Node {
        op: Op::Elementwise {
            deps: vec![x.index(), y.index()],
            factors: vec![ones.clone(), ones],
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
#[path = "add_test.rs"]
mod tests;
