use std::fmt::Debug;

use log::debug;
use ndarray::{s, Array2, ScalarOperand};
use num_traits::Float;

use crate::error::RevGradError;
use crate::node::Op;
use crate::ops::conv::correlate_valid;
use crate::var::Var;

/// The result of a reverse sweep: one derivative per tape index at or below
/// the root, owned independently of the tape.
#[derive(Debug, Clone)]
pub struct Gradient<T> {
    derivatives: Vec<Option<Array2<T>>>,
}

impl<T> Gradient<T>
where
    T: Float,
{
    /// Derivative of the sweep's root with respect to `var`.
    ///
    /// Indices the sweep never reached (nodes the root does not depend on,
    /// or nodes recorded after the root) yield a zero matrix of `var`'s
    /// shape.
    pub fn wrt(&self, var: &Var<T>) -> Array2<T> {
        match self.derivatives.get(var.index()) {
            Some(Some(derivative)) => derivative.clone(),
            _ => Array2::zeros(var.value().raw_dim()),
        }
    }

    /// Derivative at a raw tape index, if the sweep reached it.
    pub fn get(&self, index: usize) -> Option<&Array2<T>> {
        self.derivatives.get(index).and_then(|d| d.as_ref())
    }

    /// True when the sweep produced no derivatives at all.
    pub fn is_empty(&self) -> bool {
        self.derivatives.iter().all(|d| d.is_none())
    }
}

/// Accumulates `contribution` into the parent slot `dep`, creating it on
/// first touch. `slots` covers indices `0..index`, so a dependency at or
/// past `index` means the tape is corrupt.
fn accumulate<T>(
    slots: &mut [Option<Array2<T>>],
    index: usize,
    dep: usize,
    contribution: Array2<T>,
) -> Result<(), RevGradError>
where
    T: Float,
{
    if dep >= slots.len() {
        return Err(RevGradError::CorruptTape {
            index,
            dependency: dep,
        });
    }
    match &mut slots[dep] {
        Some(existing) => *existing = &*existing + &contribution,
        slot @ None => *slot = Some(contribution),
    }
    Ok(())
}

/// Walks the tape from `root` down to node 0, converting each child
/// derivative into parent contributions through the node's stored factors.
pub(crate) fn backward<T>(root: &Var<T>) -> Result<Gradient<T>, RevGradError>
where
    T: Float + ScalarOperand + Debug + Send + Sync + 'static,
{
    let data = root.tape().read_data();
    let root_node = &data.nodes[root.index()];
    let (rows, cols) = (root_node.rows, root_node.cols);
    debug_assert_eq!(root.shape(), (rows, cols));
    if !data.elementwise_only && (rows, cols) != (1, 1) {
        return Err(RevGradError::NotScalar { rows, cols });
    }

    let mut derivatives: Vec<Option<Array2<T>>> = vec![None; root.index() + 1];
    derivatives[root.index()] = Some(Array2::ones((rows, cols)));

    debug!(
        "reverse sweep from node {} over {} recorded nodes",
        root.index(),
        data.nodes.len()
    );

    for i in (0..=root.index()).rev() {
        let (parents, tail) = derivatives.split_at_mut(i);
        let Some(child) = tail[0].as_ref() else {
            continue;
        };

        match &data.nodes[i].op {
            Op::Leaf { .. } => {}

            Op::Elementwise { deps, factors } => {
                for (&dep, factor) in deps.iter().zip(factors) {
                    accumulate(parents, i, dep, child * factor)?;
                }
            }

            Op::MatrixProduct {
                lhs,
                rhs,
                rhs_t,
                lhs_t,
            } => {
                accumulate(parents, i, *lhs, child.dot(rhs_t))?;
                accumulate(parents, i, *rhs, lhs_t.dot(child))?;
            }

            Op::Norm { dep, factor } => {
                accumulate(parents, i, *dep, factor * child[[0, 0]])?;
            }

            Op::Convolution {
                mat,
                ker,
                mat_factor,
                ker_factor,
            } => {
                // Full correlation of the child with the reversed kernel,
                // as one valid correlation over a zero-padded child.
                let (ker_rows, ker_cols) = mat_factor.dim();
                let mut padded: Array2<T> = Array2::zeros((
                    child.nrows() + 2 * (ker_rows - 1),
                    child.ncols() + 2 * (ker_cols - 1),
                ));
                padded
                    .slice_mut(s![
                        ker_rows - 1..ker_rows - 1 + child.nrows(),
                        ker_cols - 1..ker_cols - 1 + child.ncols()
                    ])
                    .assign(child);
                accumulate(parents, i, *mat, correlate_valid(&padded, mat_factor))?;
                // The input is never smaller than the output, so the valid
                // correlation against the child is directly the kernel
                // derivative.
                accumulate(parents, i, *ker, correlate_valid(ker_factor, child))?;
            }

            Op::Pooling {
                dep,
                mask,
                pool: (ph, pw),
            } => {
                let mut upsampled = Array2::zeros(mask.raw_dim());
                for ((r, c), &d) in child.indexed_iter() {
                    upsampled
                        .slice_mut(s![r * ph..(r + 1) * ph, c * pw..(c + 1) * pw])
                        .fill(d);
                }
                accumulate(parents, i, *dep, &upsampled * mask)?;
            }

            Op::VertConcat { deps, offsets } => {
                for (j, &dep) in deps.iter().enumerate() {
                    let block = child.slice(s![offsets[j]..offsets[j + 1], ..]).to_owned();
                    accumulate(parents, i, dep, block)?;
                }
            }

            Op::Flatten { dep, rows, cols } => {
                let unflattened =
                    Array2::from_shape_vec((*rows, *cols), child.iter().copied().collect())
                        .map_err(|_| RevGradError::CorruptTape {
                            index: i,
                            dependency: *dep,
                        })?;
                accumulate(parents, i, *dep, unflattened)?;
            }
        }
    }

    Ok(Gradient { derivatives })
}
