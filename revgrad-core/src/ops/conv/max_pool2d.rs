use std::fmt::Debug;

use ndarray::{Array2, ScalarOperand};
use num_traits::Float;

use crate::error::RevGradError;
use crate::node::{Node, Op};
use crate::var::Var;

/// Non-overlapping max-pooling with a `(ph, pw)` window; `ph` addresses
/// rows, `pw` columns.
///
/// Both window dimensions must be non-zero and divide the corresponding
/// input dimension. The output holds each window's maximum; the node stores
/// a mask with 1 at each window's argmax (ties broken by row-major scan
/// order, first encountered wins). Recording this operation clears the
/// tape's elementwise-only flag.
pub fn max_pool2d_op<T>(x: &Var<T>, pool: (usize, usize)) -> Result<Var<T>, RevGradError>
where
    T: Float + ScalarOperand + Debug + Send + Sync + 'static,
{
    let (ph, pw) = pool;
    let (rows, cols) = x.shape();
    if ph == 0 || pw == 0 || rows % ph != 0 || cols % pw != 0 {
        return Err(RevGradError::ShapeMismatch {
            operation: "max_pool2d".to_string(),
            lhs: (rows, cols),
            rhs: (ph, pw),
        });
    }

    let out_rows = rows / ph;
    let out_cols = cols / pw;
    let mut value = Array2::zeros((out_rows, out_cols));
    let mut mask = Array2::zeros((rows, cols));

    for r in 0..out_rows {
        for c in 0..out_cols {
            let mut arg = (r * ph, c * pw);
            let mut best = x.value()[arg];
            for dr in 0..ph {
                for dc in 0..pw {
                    let candidate = x.value()[[r * ph + dr, c * pw + dc]];
                    if candidate > best {
                        best = candidate;
                        arg = (r * ph + dr, c * pw + dc);
                    }
                }
            }
            value[[r, c]] = best;
            mask[arg] = T::one();
        }
    }

    let index = x.tape().push(Node {
        op: Op::Pooling {
            dep: x.index(),
            mask,
            pool,
        },
        rows: out_rows,
        cols: out_cols,
    });

    Ok(Var {
        value,
        tape: x.tape().clone(),
        index,
    })
}
