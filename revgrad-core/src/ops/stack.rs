use std::fmt::Debug;

use ndarray::{s, Array2, ScalarOperand};
use num_traits::Float;

use crate::error::RevGradError;
use crate::node::{Node, Op};
use crate::ops::ensure_same_tape;
use crate::var::Var;

/// Row-wise concatenation: `xs[i]` is stacked below `xs[i - 1]`.
///
/// Requires at least one matrix, all on the same tape with equal column
/// counts. The node stores the cumulative row offsets so the sweep can hand
/// each parent its block of the child derivative. Recording this operation
/// clears the tape's elementwise-only flag.
pub fn vert_cat_op<T>(xs: &[Var<T>]) -> Result<Var<T>, RevGradError>
where
    T: Float + ScalarOperand + Debug + Send + Sync + 'static,
{
    let Some(first) = xs.first() else {
        return Err(RevGradError::EmptyInput);
    };
    let cols = first.shape().1;

    let mut offsets = Vec::with_capacity(xs.len() + 1);
    offsets.push(0);
    let mut deps = Vec::with_capacity(xs.len());
    let mut rows = 0;
    for x in xs {
        ensure_same_tape(first, x, "vert_cat")?;
        if x.shape().1 != cols {
            return Err(RevGradError::ShapeMismatch {
                operation: "vert_cat".to_string(),
                lhs: first.shape(),
                rhs: x.shape(),
            });
        }
        rows += x.shape().0;
        offsets.push(rows);
        deps.push(x.index());
    }

    let mut value = Array2::zeros((rows, cols));
    for (x, window) in xs.iter().zip(offsets.windows(2)) {
        value
            .slice_mut(s![window[0]..window[1], ..])
            .assign(x.value());
    }

    let index = first.tape().push(Node {
        op: Op::VertConcat { deps, offsets },
        rows,
        cols,
    });

    Ok(Var {
        value,
        tape: first.tape().clone(),
        index,
    })
}
