use std::fmt::Debug;

use ndarray::{Array2, ScalarOperand};
use num_traits::Float;

use crate::error::RevGradError;
use crate::node::{Node, Op};
use crate::var::Var;

/// Squared Euclidean norm, `sum of x(i, j)^2`, as a 1x1 matrix.
///
/// The stored local derivative is `2 · x`. Recording this operation clears
/// the tape's elementwise-only flag.
pub fn squared_norm_op<T>(x: &Var<T>) -> Result<Var<T>, RevGradError>
where
    T: Float + ScalarOperand + Debug + Send + Sync + 'static,
{
    let total = x.value().iter().fold(T::zero(), |acc, &v| acc + v * v);
    let value = Array2::from_elem((1, 1), total);
    let two = T::one() + T::one();
    let index = x.tape().push(Node {
        op: Op::Norm {
            dep: x.index(),
            factor: x.value() * two,
        },
        rows: 1,
        cols: 1,
    });

    Ok(Var {
        value,
        tape: x.tape().clone(),
        index,
    })
}
