//! 2-D cross-correlation and pooling, plus the dense kernels they share.
//! `ndarray` does not ship a correlation primitive, so the sliding-window
//! and im2col kernels live here and are reused by the reverse sweep.

pub mod conv2d;
pub mod max_pool2d;

pub use conv2d::conv2d_op;
pub use max_pool2d::max_pool2d_op;

use ndarray::{s, Array2};
use num_traits::Float;

/// Valid 2-D cross-correlation of `mat` against a kernel no larger than it.
///
/// Output shape is `(rows(mat) - rows(ker) + 1, cols(mat) - cols(ker) + 1)`.
pub(crate) fn correlate_valid<T>(mat: &Array2<T>, ker: &Array2<T>) -> Array2<T>
where
    T: Float,
{
    let (ker_rows, ker_cols) = ker.dim();
    let out_rows = mat.nrows() - ker_rows + 1;
    let out_cols = mat.ncols() - ker_cols + 1;

    Array2::from_shape_fn((out_rows, out_cols), |(r, c)| {
        mat.slice(s![r..r + ker_rows, c..c + ker_cols])
            .iter()
            .zip(ker.iter())
            .fold(T::zero(), |acc, (&m, &k)| acc + m * k)
    })
}

/// Rearranges every `ker_rows x ker_cols` window of `mat` into one row, so
/// the whole correlation collapses into a single matrix product against the
/// flattened kernel.
pub(crate) fn im2col<T>(mat: &Array2<T>, ker_rows: usize, ker_cols: usize) -> Array2<T>
where
    T: Float,
{
    let out_rows = mat.nrows() - ker_rows + 1;
    let out_cols = mat.ncols() - ker_cols + 1;

    let mut patches = Array2::zeros((out_rows * out_cols, ker_rows * ker_cols));
    for r in 0..out_rows {
        for c in 0..out_cols {
            let window = mat.slice(s![r..r + ker_rows, c..c + ker_cols]);
            for (k, &v) in window.iter().enumerate() {
                patches[[r * out_cols + c, k]] = v;
            }
        }
    }
    patches
}
