use ndarray::Array2;

/// How one recorded matrix was produced from earlier tape entries.
///
/// Each variant carries the local partial-derivative payload the reverse
/// sweep needs to turn a child derivative into per-parent contributions.
#[derive(Debug, Clone)]
pub(crate) enum Op<T> {
    /// External input or parameter, tracked directly by the caller.
    Leaf { trainable: bool },

    /// Pointwise operation on one or two parents. One factor per parent,
    /// shape-equal to the node's output; entry (r, c) is the partial
    /// derivative of output (r, c) with respect to parent (r, c).
    Elementwise {
        deps: Vec<usize>,
        factors: Vec<Array2<T>>,
    },

    /// `lhs · rhs`. The stored factors are already transposed, so the sweep
    /// only performs ordinary matrix products.
    MatrixProduct {
        lhs: usize,
        rhs: usize,
        rhs_t: Array2<T>,
        lhs_t: Array2<T>,
    },

    /// Squared Euclidean norm; factor is `2 · x`.
    Norm { dep: usize, factor: Array2<T> },

    /// Valid 2-D cross-correlation. `mat_factor` is the kernel reversed
    /// along both axes; the sweep zero-pads the child derivative so a
    /// single valid correlation against it restores the input shape.
    /// `ker_factor` is the original input matrix.
    Convolution {
        mat: usize,
        ker: usize,
        mat_factor: Array2<T>,
        ker_factor: Array2<T>,
    },

    /// Non-overlapping max-pooling; `mask` is 1 at each window's argmax,
    /// 0 elsewhere.
    Pooling {
        dep: usize,
        mask: Array2<T>,
        pool: (usize, usize),
    },

    /// Row-wise stacking; rows `offsets[j]..offsets[j + 1]` of the output
    /// belong to parent `deps[j]`.
    VertConcat {
        deps: Vec<usize>,
        offsets: Vec<usize>,
    },

    /// Row-major reshape to a column vector; `(rows, cols)` is the parent's
    /// original shape.
    Flatten { dep: usize, rows: usize, cols: usize },
}

impl<T> Op<T> {
    /// Tape indices this operation reads from.
    pub(crate) fn dependencies(&self) -> Vec<usize> {
        match self {
            Op::Leaf { .. } => Vec::new(),
            Op::Elementwise { deps, .. } | Op::VertConcat { deps, .. } => deps.clone(),
            Op::MatrixProduct { lhs, rhs, .. } => vec![*lhs, *rhs],
            Op::Convolution { mat, ker, .. } => vec![*mat, *ker],
            Op::Norm { dep, .. } | Op::Pooling { dep, .. } | Op::Flatten { dep, .. } => {
                vec![*dep]
            }
        }
    }

    /// Whether recording this operation keeps the tape elementwise-only.
    pub(crate) fn is_elementwise(&self) -> bool {
        matches!(self, Op::Leaf { .. } | Op::Elementwise { .. })
    }
}

/// One entry of the tape, together with the shape of the matrix it produced.
#[derive(Debug, Clone)]
pub(crate) struct Node<T> {
    pub(crate) op: Op<T>,
    pub(crate) rows: usize,
    pub(crate) cols: usize,
}
