use std::fmt::Debug;

use ndarray::ScalarOperand;
use num_traits::Float;

use crate::error::RevGradError;
use crate::node::{Node, Op};
use crate::ops::{ensure_same_shape, ensure_same_tape};
use crate::var::Var;

/// Elementwise quotient of two tracked matrices.
///
/// Local derivatives: `1 / y` with respect to `x`, `-x / y^2` with respect
/// to `y`. Entries of `y` equal to zero are not rejected; non-finite
/// values propagate through the forward result and the stored factors.
pub fn div_op<T>(x: &Var<T>, y: &Var<T>) -> Result<Var<T>, RevGradError>
where
    T: Float + ScalarOperand + Debug + Send + Sync + 'static,
{
    ensure_same_tape(x, y, "div")?;
    ensure_same_shape(x, y, "div")?;

    let value = x.value() / y.value();
    let (rows, cols) = value.dim();
    let dx = y.value().mapv(|v| T::one() / v);
    let y_squared = y.value() * y.value();
    let dy = -(x.value() / &y_squared);
    let index = x.tape().push(Node {
        op: Op::Elementwise {
            deps: vec![x.index(), y.index()],
            factors: vec![dx, dy],
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
#[path = "div_test.rs"]
mod tests;
