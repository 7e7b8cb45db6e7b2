//! Behavioural checks on the tape itself: append-only growth, the
//! elementwise-only gradient contract, sweep independence, gradient
//! algebra, and the trainable-leaf flag.

use approx::assert_abs_diff_eq;
use ndarray::{array, Array2};
use revgrad_core::ops::arithmetic::{add_op, mul_op};
use revgrad_core::{RevGradError, Tape};

mod common;
use common::matrix;

#[test]
fn every_primitive_appends_exactly_one_node() {
    let tape = Tape::new();
    assert!(tape.is_empty());

    let x = tape.track(Array2::<f64>::ones((2, 2)));
    assert_eq!(tape.len(), 1);
    let y = tape.track(Array2::<f64>::ones((2, 2)));
    assert_eq!(tape.len(), 2);

    let sum = x.add(&y).unwrap();
    assert_eq!(tape.len(), 3);
    let product = sum.matmul(&y).unwrap();
    assert_eq!(tape.len(), 4);
    let pooled = product.max_pool2d((2, 2)).unwrap();
    assert_eq!(tape.len(), 5);
    let flat = pooled.flatten().unwrap();
    assert_eq!(tape.len(), 6);
    flat.squared_norm().unwrap();
    assert_eq!(tape.len(), 7);

    // Indices were handed out in recording order.
    assert_eq!(x.index(), 0);
    assert_eq!(y.index(), 1);
    assert_eq!(sum.index(), 2);
    assert_eq!(flat.index(), 5);
}

#[test]
fn failed_primitives_leave_the_tape_untouched() {
    let tape = Tape::new();
    let x = tape.track(Array2::<f64>::ones((2, 3)));
    let y = tape.track(Array2::<f64>::ones((3, 2)));

    assert!(x.add(&y).is_err());
    assert!(x.max_pool2d((2, 2)).is_err());
    assert_eq!(tape.len(), 2);
}

#[test]
fn gradient_shape_matches_variable_shape() {
    let tape = Tape::new();
    let x = tape.track(Array2::<f64>::ones((3, 2)));
    let y = tape.track(Array2::<f64>::ones((2, 4)));

    let loss = x.matmul(&y).unwrap().squared_norm().unwrap();
    let gradient = loss.grad().unwrap();

    assert_eq!(gradient.wrt(&x).dim(), x.shape());
    assert_eq!(gradient.wrt(&y).dim(), y.shape());
    assert_eq!(gradient.wrt(&loss).dim(), (1, 1));
}

#[test]
fn elementwise_only_tapes_accept_any_root_shape() {
    let tape = Tape::new();
    let x = tape.track(array![[0.1, 0.2], [0.3, 0.4]]);
    let y = tape.track(array![[1.0, 2.0], [3.0, 4.0]]);

    let z = x.mul(&y).unwrap().sigmoid().unwrap();
    assert!(tape.elementwise_only());
    assert!(z.grad().is_ok());
}

#[test]
fn shape_crossing_op_demands_scalar_root() {
    let tape = Tape::new();
    let x = tape.track(Array2::<f64>::ones((2, 2)));
    let y = tape.track(Array2::<f64>::ones((2, 2)));

    let sum = x.add(&y).unwrap();
    let product = x.matmul(&y).unwrap();
    assert!(!tape.elementwise_only());

    // Even the earlier elementwise result is now gated.
    assert!(matches!(
        sum.grad(),
        Err(RevGradError::NotScalar { rows: 2, cols: 2 })
    ));
    assert!(matches!(product.grad(), Err(RevGradError::NotScalar { .. })));

    // A 1x1 root is still fine.
    let loss = product.squared_norm().unwrap();
    assert!(loss.grad().is_ok());
}

#[test]
fn sweeps_are_idempotent_and_leave_the_tape_alone() {
    let tape = Tape::new();
    let x = tape.track(array![[1.0, -2.0], [0.5, 3.0]]);
    let y = tape.track(array![[2.0, 0.0], [1.0, -1.0]]);

    let loss = x.matmul(&y).unwrap().squared_norm().unwrap();
    let recorded = tape.len();

    let first = loss.grad().unwrap();
    let second = loss.grad().unwrap();

    assert_eq!(tape.len(), recorded);
    assert_eq!(first.wrt(&x), second.wrt(&x));
    assert_eq!(first.wrt(&y), second.wrt(&y));
}

#[test]
fn gradient_of_sum_is_sum_of_gradients() {
    let tape = Tape::new();
    let x = tape.track(array![[0.7]]);

    let a = mul_op(&x, &x).unwrap();
    let b = x.sigmoid().unwrap();
    let z = add_op(&a, &b).unwrap();

    let grad_a = a.grad().unwrap().wrt(&x)[[0, 0]];
    let grad_b = b.grad().unwrap().wrt(&x)[[0, 0]];
    let grad_z = z.grad().unwrap().wrt(&x)[[0, 0]];

    assert_abs_diff_eq!(grad_z, grad_a + grad_b, epsilon = 1e-12);
}

#[test]
fn chain_rule_composes_local_derivatives() {
    let sig = |v: f64| v.exp() / (v.exp() + 1.0);
    let dsig = |v: f64| v.exp() / (v.exp() + 1.0).powi(2);

    let tape = Tape::new();
    let x = tape.track(array![[0.3]]);

    let inner = x.sigmoid().unwrap();
    let outer = inner.sigmoid().unwrap();

    let gradient = outer.grad().unwrap();
    let expected = dsig(sig(0.3)) * dsig(0.3);
    assert_abs_diff_eq!(gradient.wrt(&x)[[0, 0]], expected, epsilon = 1e-12);
}

#[test]
fn untouched_nodes_read_back_as_zero() {
    let tape = Tape::new();
    let x = tape.track(array![[1.0, 2.0]]);
    let unused = tape.track(array![[5.0], [6.0]]);

    let loss = x.squared_norm().unwrap();
    let gradient = loss.grad().unwrap();

    assert!(!gradient.is_empty());
    assert_eq!(gradient.wrt(&unused), matrix(2, 1, &[0.0, 0.0]));
    // Raw lookup distinguishes "never reached" from an actual derivative.
    assert!(gradient.get(unused.index()).is_none());
    assert!(gradient.get(x.index()).is_some());
}

#[test]
fn trainable_flag_is_recorded_but_inert() {
    let tape = Tape::new();
    let w = tape.track(Array2::<f64>::zeros((2, 2)));
    let b = tape.track(Array2::<f64>::zeros((2, 2)));

    assert!(!tape.is_optimized(&w));
    tape.toggle_optimize(&w, true);
    assert!(tape.is_optimized(&w));
    assert!(!tape.is_optimized(&b));
    tape.toggle_optimize(&w, false);
    assert!(!tape.is_optimized(&w));

    // Intermediate nodes are not parameters; toggling them is a no-op.
    let z = w.add(&b).unwrap();
    tape.toggle_optimize(&z, true);
    assert!(!tape.is_optimized(&z));
}
