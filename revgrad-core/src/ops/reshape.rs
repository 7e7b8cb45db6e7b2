use std::fmt::Debug;

use ndarray::{Array2, ScalarOperand};
use num_traits::Float;

use crate::error::RevGradError;
use crate::node::{Node, Op};
use crate::var::Var;

/// Row-major flattening of an `(r, c)` matrix into an `(r * c, 1)` column
/// vector: `x(0,0), ..., x(0,c-1), x(1,0), ..., x(r-1,c-1)`.
///
/// The node stores the original shape so the sweep can fold the flattened
/// derivative back. Recording this operation clears the tape's
/// elementwise-only flag.
pub fn flatten_op<T>(x: &Var<T>) -> Result<Var<T>, RevGradError>
where
    T: Float + ScalarOperand + Debug + Send + Sync + 'static,
{
    let (rows, cols) = x.shape();
    let value = Array2::from_shape_fn((rows * cols, 1), |(k, _)| x.value()[[k / cols, k % cols]]);
    let index = x.tape().push(Node {
        op: Op::Flatten {
            dep: x.index(),
            rows,
            cols,
        },
        rows: rows * cols,
        cols: 1,
    });

    Ok(Var {
        value,
        tape: x.tape().clone(),
        index,
    })
}
