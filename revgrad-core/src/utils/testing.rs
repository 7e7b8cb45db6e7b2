use approx::AbsDiffEq;
use ndarray::Array2;

/// Checks that a matrix has the expected shape and entries (given in
/// row-major order) within `tol`.
pub fn check_matrix_near(
    actual: &Array2<f64>,
    expected_shape: (usize, usize),
    expected_data: &[f64],
    tol: f64,
) {
    assert_eq!(
        actual.dim(),
        expected_shape,
        "Shape mismatch: expected {:?}, got {:?}",
        expected_shape,
        actual.dim()
    );

    assert_eq!(
        actual.len(),
        expected_data.len(),
        "Data length mismatch: expected {}, got {}",
        expected_data.len(),
        actual.len()
    );

    for (i, (a, e)) in actual.iter().zip(expected_data.iter()).enumerate() {
        assert!(
            AbsDiffEq::abs_diff_eq(a, e, tol),
            "Data mismatch at index {}: expected {}, got {}. Difference: {}",
            i,
            e,
            a,
            (a - e).abs()
        );
    }
}
