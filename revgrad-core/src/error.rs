use thiserror::Error;

/// Error type for tape construction and gradient sweeps.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RevGradError {
    #[error("Shape mismatch for {operation}: got {lhs:?} and {rhs:?}")]
    ShapeMismatch {
        operation: String,
        lhs: (usize, usize),
        rhs: (usize, usize),
    },

    #[error("Operands of {operation} are tracked on different tapes")]
    TapeMismatch { operation: String },

    #[error(
        "grad() requires a 1x1 root once a non-elementwise operation has been recorded, got {rows}x{cols}"
    )]
    NotScalar { rows: usize, cols: usize },

    #[error("Cannot concatenate an empty list of matrices")]
    EmptyInput,

    #[error("Corrupt tape: node {index} references dependency {dependency} outside its own range")]
    CorruptTape { index: usize, dependency: usize },
}
