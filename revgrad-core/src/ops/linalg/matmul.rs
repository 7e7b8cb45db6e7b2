use std::fmt::Debug;

use ndarray::ScalarOperand;
use num_traits::Float;

use crate::error::RevGradError;
use crate::node::{Node, Op};
use crate::ops::ensure_same_tape;
use crate::var::Var;

/// Matrix product `x · y`.
///
/// Requires `cols(x) == rows(y)`. The transposes `y^T` and `x^T` are
/// materialized at record time, so the reverse sweep computes the parent
/// contributions `d · y^T` and `x^T · d` with plain matrix products.
/// Recording this operation clears the tape's elementwise-only flag.
pub fn matmul_op<T>(x: &Var<T>, y: &Var<T>) -> Result<Var<T>, RevGradError>
where
    T: Float + ScalarOperand + Debug + Send + Sync + 'static,
{
    ensure_same_tape(x, y, "matmul")?;
    if x.value().ncols() != y.value().nrows() {
        return Err(RevGradError::ShapeMismatch {
            operation: "matmul".to_string(),
            lhs: x.shape(),
            rhs: y.shape(),
        });
    }

    let value = x.value().dot(y.value());
    let (rows, cols) = value.dim();
    let index = x.tape().push(Node {
        op: Op::MatrixProduct {
            lhs: x.index(),
            rhs: y.index(),
            rhs_t: y.value().t().to_owned(),
            lhs_t: x.value().t().to_owned(),
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
