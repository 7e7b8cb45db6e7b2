use std::fmt::Debug;

use ndarray::{Array2, ScalarOperand};
use num_traits::Float;

use crate::autograd::{self, Gradient};
use crate::error::RevGradError;
use crate::ops;
use crate::tape::Tape;

/// A matrix tracked on a tape.
///
/// Carries the computed value together with the tape it was recorded on and
/// its index there. Every primitive returns one of these; [`Var::grad`]
/// walks the tape backwards from it. The handle does not own the tape and
/// stays cheap to pass around; the matrix itself is owned.
#[derive(Debug, Clone)]
pub struct Var<T> {
    pub(crate) value: Array2<T>,
    pub(crate) tape: Tape<T>,
    pub(crate) index: usize,
}

impl<T> Var<T> {
    /// The computed matrix.
    pub fn value(&self) -> &Array2<T> {
        &self.value
    }

    /// `(rows, cols)` of the computed matrix.
    pub fn shape(&self) -> (usize, usize) {
        self.value.dim()
    }

    /// Position of this matrix on its tape.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The tape this matrix is recorded on.
    pub fn tape(&self) -> &Tape<T> {
        &self.tape
    }

    /// Consumes the handle, releasing the owned matrix.
    pub fn into_value(self) -> Array2<T> {
        self.value
    }
}

impl<T> Var<T>
where
    T: Float + ScalarOperand + Debug + Send + Sync + 'static,
{
    /// Derivatives of this matrix with respect to every earlier node.
    ///
    /// Unless the tape is still elementwise-only, the root must be 1x1.
    pub fn grad(&self) -> Result<Gradient<T>, RevGradError> {
        autograd::backward(self)
    }

    /// Elementwise sum. See [`ops::arithmetic::add_op`].
    pub fn add(&self, other: &Var<T>) -> Result<Var<T>, RevGradError> {
        ops::arithmetic::add_op(self, other)
    }

    /// Elementwise difference. See [`ops::arithmetic::sub_op`].
    pub fn sub(&self, other: &Var<T>) -> Result<Var<T>, RevGradError> {
        ops::arithmetic::sub_op(self, other)
    }

    /// Elementwise (Hadamard) product. See [`ops::arithmetic::mul_op`].
    pub fn mul(&self, other: &Var<T>) -> Result<Var<T>, RevGradError> {
        ops::arithmetic::mul_op(self, other)
    }

    /// Elementwise quotient. See [`ops::arithmetic::div_op`].
    pub fn div(&self, other: &Var<T>) -> Result<Var<T>, RevGradError> {
        ops::arithmetic::div_op(self, other)
    }

    /// Elementwise logistic sigmoid. See [`ops::activation::sigmoid_op`].
    pub fn sigmoid(&self) -> Result<Var<T>, RevGradError> {
        ops::activation::sigmoid_op(self)
    }

    /// Matrix product. See [`ops::linalg::matmul_op`].
    pub fn matmul(&self, other: &Var<T>) -> Result<Var<T>, RevGradError> {
        ops::linalg::matmul_op(self, other)
    }

    /// Squared Euclidean norm. See [`ops::reduction::squared_norm_op`].
    pub fn squared_norm(&self) -> Result<Var<T>, RevGradError> {
        ops::reduction::squared_norm_op(self)
    }

    /// Valid 2-D cross-correlation. See [`ops::conv::conv2d_op`].
    pub fn conv2d(&self, kernel: &Var<T>) -> Result<Var<T>, RevGradError> {
        ops::conv::conv2d_op(self, kernel)
    }

    /// Non-overlapping max-pooling. See [`ops::conv::max_pool2d_op`].
    pub fn max_pool2d(&self, pool: (usize, usize)) -> Result<Var<T>, RevGradError> {
        ops::conv::max_pool2d_op(self, pool)
    }

    /// Row-major flattening to a column vector. See
    /// [`ops::reshape::flatten_op`].
    pub fn flatten(&self) -> Result<Var<T>, RevGradError> {
        ops::reshape::flatten_op(self)
    }
}
