use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::trace;
use ndarray::Array2;

use crate::node::{Node, Op};
use crate::var::Var;

/// The recorded nodes plus the single flag selecting the gradient shape
/// contract: `elementwise_only` starts true and is cleared, once and for
/// all, by the first primitive that crosses matrix entries.
#[derive(Debug)]
pub(crate) struct TapeData<T> {
    pub(crate) nodes: Vec<Node<T>>,
    pub(crate) elementwise_only: bool,
}

/// A Wengert list: the append-only record of every primitive applied to
/// matrices tracked on it.
///
/// `Tape` is a cheap handle; clones refer to the same underlying record.
/// Two tracked matrices can only be combined when their handles point to
/// the same tape. Appending and sweeping are not synchronized for
/// concurrent use; a tape is meant to be driven from one thread.
#[derive(Debug)]
pub struct Tape<T> {
    pub(crate) data: Arc<RwLock<TapeData<T>>>,
}

impl<T> Clone for Tape<T> {
    fn clone(&self) -> Self {
        Tape {
            data: Arc::clone(&self.data),
        }
    }
}

impl<T> Default for Tape<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Tape<T> {
    /// Creates an empty tape.
    pub fn new() -> Self {
        Tape {
            data: Arc::new(RwLock::new(TapeData {
                nodes: Vec::new(),
                elementwise_only: true,
            })),
        }
    }

    /// Read access to the recorded nodes. Panics if the lock is poisoned.
    pub(crate) fn read_data(&self) -> RwLockReadGuard<'_, TapeData<T>> {
        self.data.read().expect("tape RwLock poisoned")
    }

    /// Write access to the recorded nodes. Panics if the lock is poisoned.
    pub(crate) fn write_data(&self) -> RwLockWriteGuard<'_, TapeData<T>> {
        self.data.write().expect("tape RwLock poisoned")
    }

    /// Number of nodes recorded so far.
    pub fn len(&self) -> usize {
        self.read_data().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether only pointwise primitives have been recorded. While this
    /// holds, `grad` accepts roots of any shape; afterwards only 1x1 roots
    /// admit a well-defined gradient.
    pub fn elementwise_only(&self) -> bool {
        self.read_data().elementwise_only
    }

    pub(crate) fn same_tape(&self, other: &Tape<T>) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Appends a node and returns its index, clearing the elementwise-only
    /// flag when the operation crosses entries.
    pub(crate) fn push(&self, node: Node<T>) -> usize {
        let mut data = self.write_data();
        if !node.op.is_elementwise() {
            data.elementwise_only = false;
        }
        let index = data.nodes.len();
        debug_assert!(node.op.dependencies().iter().all(|&dep| dep < index));
        data.nodes.push(node);
        index
    }

    /// Wraps a raw matrix as a leaf so later primitives can record their
    /// dependency on it.
    pub fn track(&self, value: Array2<T>) -> Var<T> {
        let (rows, cols) = value.dim();
        let index = self.push(Node {
            op: Op::Leaf { trainable: false },
            rows,
            cols,
        });
        trace!("tracked leaf {index} ({rows}x{cols})");
        Var {
            value,
            tape: self.clone(),
            index,
        }
    }

    /// Marks a tracked leaf as a trainable parameter, or unmarks it.
    ///
    /// The engine records the flag but never acts on it; optimizers read it
    /// to decide which leaves to update. Calling this on an intermediate
    /// node, or with a matrix tracked on another tape, is a no-op.
    pub fn toggle_optimize(&self, var: &Var<T>, enable: bool) {
        if !self.same_tape(var.tape()) {
            return;
        }
        let mut data = self.write_data();
        if let Some(Node {
            op: Op::Leaf { trainable },
            ..
        }) = data.nodes.get_mut(var.index())
        {
            *trainable = enable;
        }
    }

    /// Whether `var` is a leaf currently marked as trainable.
    pub fn is_optimized(&self, var: &Var<T>) -> bool {
        if !self.same_tape(var.tape()) {
            return false;
        }
        let data = self.read_data();
        matches!(
            data.nodes.get(var.index()),
            Some(Node {
                op: Op::Leaf { trainable: true },
                ..
            })
        )
    }
}
