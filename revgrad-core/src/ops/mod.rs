//! The differentiable primitives. Each `*_op` function validates its
//! arguments, computes the forward value, and appends exactly one node to
//! the operands' tape.

pub mod activation;
pub mod arithmetic;
pub mod conv;
pub mod linalg;
pub mod reduction;
pub mod reshape;
pub mod stack;

use crate::error::RevGradError;
use crate::var::Var;

pub(crate) fn ensure_same_tape<T>(
    x: &Var<T>,
    y: &Var<T>,
    operation: &str,
) -> Result<(), RevGradError> {
    if x.tape().same_tape(y.tape()) {
        Ok(())
    } else {
        Err(RevGradError::TapeMismatch {
            operation: operation.to_string(),
        })
    }
}

pub(crate) fn ensure_same_shape<T>(
    x: &Var<T>,
    y: &Var<T>,
    operation: &str,
) -> Result<(), RevGradError> {
    if x.shape() == y.shape() {
        Ok(())
    } else {
        Err(RevGradError::ShapeMismatch {
            operation: operation.to_string(),
            lhs: x.shape(),
            rhs: y.shape(),
        })
    }
}
