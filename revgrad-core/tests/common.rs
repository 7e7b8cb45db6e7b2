use ndarray::Array2;

// Helper to build an f64 matrix from row-major data.
// Shared across the integration test files; not every file uses it.
#[allow(dead_code)]
pub fn matrix(rows: usize, cols: usize, data: &[f64]) -> Array2<f64> {
    Array2::from_shape_vec((rows, cols), data.to_vec()).expect("test matrix creation failed")
}
