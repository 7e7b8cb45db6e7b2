use std::fmt::Debug;

use ndarray::{s, Array2, ScalarOperand};
use num_traits::Float;

use crate::error::RevGradError;
use crate::node::{Node, Op};
use crate::ops::conv::im2col;
use crate::ops::ensure_same_tape;
use crate::var::Var;

/// Valid 2-D cross-correlation of `mat` against `ker`.
///
/// Requires `rows(mat) >= rows(ker)` and `cols(mat) >= cols(ker)`; the
/// output has shape `(rows(mat) - rows(ker) + 1, cols(mat) - cols(ker) + 1)`.
/// The forward pass goes through im2col, turning the window sweep into one
/// matrix product.
///
/// The node stores, for the `mat` slot, the kernel reversed along both
/// axes: the derivative of the loss with respect to `mat` is the full
/// correlation of the child derivative with the reversed kernel, which the
/// sweep realizes as one valid correlation over a zero-padded child. For
/// the `ker` slot it stores `mat` itself. Recording this operation clears
/// the tape's elementwise-only flag.
pub fn conv2d_op<T>(mat: &Var<T>, ker: &Var<T>) -> Result<Var<T>, RevGradError>
where
    T: Float + ScalarOperand + Debug + Send + Sync + 'static,
{
    ensure_same_tape(mat, ker, "conv2d")?;
    let (mat_rows, mat_cols) = mat.shape();
    let (ker_rows, ker_cols) = ker.shape();
    if mat_rows < ker_rows || mat_cols < ker_cols {
        return Err(RevGradError::ShapeMismatch {
            operation: "conv2d".to_string(),
            lhs: mat.shape(),
            rhs: ker.shape(),
        });
    }

    let out_rows = mat_rows - ker_rows + 1;
    let out_cols = mat_cols - ker_cols + 1;

    let patches = im2col(mat.value(), ker_rows, ker_cols);
    let flat_ker = Array2::from_shape_fn((ker_rows * ker_cols, 1), |(k, _)| {
        ker.value()[[k / ker_cols, k % ker_cols]]
    });
    let flat = patches.dot(&flat_ker);
    let value = Array2::from_shape_fn((out_rows, out_cols), |(r, c)| flat[[r * out_cols + c, 0]]);

    let index = mat.tape().push(Node {
        op: Op::Convolution {
            mat: mat.index(),
            ker: ker.index(),
            mat_factor: ker.value().slice(s![..;-1, ..;-1]).to_owned(),
            ker_factor: mat.value().clone(),
        },
        rows: out_rows,
        cols: out_cols,
    });

    Ok(Var {
        value,
        tape: mat.tape().clone(),
        index,
    })
}

#[cfg(test)]
mod tests {
    use ndarray::{array, Array2};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::autograd::grad_check::check_grad;
    use crate::ops::reduction::squared_norm_op;
    use crate::tape::Tape;
    use crate::utils::testing::check_matrix_near;

    #[test]
    fn test_conv2d_forward_known_values() {
        let tape = Tape::new();
        let mat = tape.track(array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]);
        let ker = tape.track(array![[1.0, 0.0], [0.0, -1.0]]);

        let out = conv2d_op(&mat, &ker).unwrap();
        // Each window contributes top-left minus bottom-right.
        check_matrix_near(out.value(), (2, 2), &[-4.0, -4.0, -4.0, -4.0], 1e-12);
    }

    #[test]
    fn test_conv2d_output_and_gradient_shapes() {
        let mut rng = StdRng::seed_from_u64(67);
        let tape = Tape::new();
        let mat = tape.track(Array2::from_shape_fn((5, 5), |_| rng.gen_range(-1.0..1.0)));
        let ker = tape.track(Array2::from_shape_fn((3, 3), |_| rng.gen_range(-1.0..1.0)));

        let out = conv2d_op(&mat, &ker).unwrap();
        assert_eq!(out.shape(), (3, 3));

        let loss = squared_norm_op(&out).unwrap();
        let gradient = loss.grad().unwrap();
        assert_eq!(gradient.wrt(&mat).dim(), (5, 5));
        assert_eq!(gradient.wrt(&ker).dim(), (3, 3));
    }

    #[test]
    fn test_conv2d_kernel_larger_than_input() {
        let tape = Tape::new();
        let mat = tape.track(Array2::<f64>::zeros((2, 4)));
        let ker = tape.track(Array2::<f64>::zeros((3, 3)));

        assert!(matches!(
            conv2d_op(&mat, &ker),
            Err(RevGradError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_conv2d_full_size_kernel() {
        // Kernel as large as the input degenerates into a dot product.
        let tape = Tape::new();
        let mat = tape.track(array![[1.0, 2.0], [3.0, 4.0]]);
        let ker = tape.track(array![[5.0, 6.0], [7.0, 8.0]]);

        let out = conv2d_op(&mat, &ker).unwrap();
        check_matrix_near(out.value(), (1, 1), &[70.0], 1e-12);

        let gradient = out.grad().unwrap();
        check_matrix_near(&gradient.wrt(&mat), (2, 2), &[5.0, 6.0, 7.0, 8.0], 1e-12);
        check_matrix_near(&gradient.wrt(&ker), (2, 2), &[1.0, 2.0, 3.0, 4.0], 1e-12);
    }

    #[test]
    fn test_conv2d_grad_check() {
        let mut rng = StdRng::seed_from_u64(71);
        let mat = Array2::from_shape_fn((6, 5), |_| rng.gen_range(-1.0..1.0));
        let ker = Array2::from_shape_fn((3, 2), |_| rng.gen_range(-1.0..1.0));

        let func = |_tape: &Tape<f64>, vars: &[crate::Var<f64>]| {
            let out = conv2d_op(&vars[0], &vars[1])?;
            squared_norm_op(&out)
        };

        check_grad(func, &[mat, ker], 1e-5, 1e-5).unwrap();
    }
}
