use std::fmt::Debug;

use ndarray::{Array2, ScalarOperand};
use num_traits::Float;
use thiserror::Error;

use crate::error::RevGradError;
use crate::tape::Tape;
use crate::var::Var;

/// Error type specifically for gradient-checking failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradCheckError {
    #[error("Gradient mismatch for input {input_index} at element {element_index}: analytical {analytical} != numerical {numerical} (difference {difference})")]
    GradientMismatch {
        input_index: usize,
        element_index: usize,
        analytical: f64,
        numerical: f64,
        difference: f64,
    },

    #[error("Forward function failed during gradient check: {0}")]
    ForwardPassError(RevGradError),

    #[error("Reverse sweep failed during gradient check: {0}")]
    BackwardPassError(RevGradError),

    #[error("Numerical gradient is NaN or infinite for input {input_index}, element {element_index}")]
    NumericalGradNonFinite {
        input_index: usize,
        element_index: usize,
    },

    #[error("Analytical gradient is NaN or infinite for input {input_index}, element {element_index}")]
    AnalyticalGradNonFinite {
        input_index: usize,
        element_index: usize,
    },
}

fn to_f64<T: Float>(x: T) -> f64 {
    num_traits::cast(x).unwrap_or(f64::NAN)
}

/// Evaluates `func` on a fresh tape and reduces its output to a scalar loss
/// by summing the entries. Summing matches the sweep's all-ones seed, so
/// the analytical and numerical sides differentiate the same function.
fn eval_loss<T, F>(func: &F, inputs: &[Array2<T>]) -> Result<f64, GradCheckError>
where
    T: Float + ScalarOperand + Debug + Send + Sync + 'static,
    F: Fn(&Tape<T>, &[Var<T>]) -> Result<Var<T>, RevGradError>,
{
    let tape = Tape::new();
    let vars: Vec<Var<T>> = inputs.iter().map(|m| tape.track(m.clone())).collect();
    let output = func(&tape, &vars).map_err(GradCheckError::ForwardPassError)?;
    let total = output
        .value()
        .iter()
        .fold(T::zero(), |acc, &v| acc + v);
    Ok(to_f64(total))
}

/// Checks analytical gradients against central-difference estimates.
///
/// `func` receives a fresh tape plus one tracked matrix per entry of
/// `inputs`, and returns the output whose entry-sum is differentiated. Each
/// input element is perturbed by `±epsilon` in turn; the resulting estimate
/// must match the swept gradient within `tolerance` (absolute, falling back
/// to a relative comparison for large gradients).
pub fn check_grad<T, F>(
    func: F,
    inputs: &[Array2<T>],
    epsilon: T,
    tolerance: f64,
) -> Result<(), GradCheckError>
where
    T: Float + ScalarOperand + Debug + Send + Sync + 'static,
    F: Fn(&Tape<T>, &[Var<T>]) -> Result<Var<T>, RevGradError>,
{
    let tape = Tape::new();
    let vars: Vec<Var<T>> = inputs.iter().map(|m| tape.track(m.clone())).collect();
    let output = func(&tape, &vars).map_err(GradCheckError::ForwardPassError)?;
    let gradient = output.grad().map_err(GradCheckError::BackwardPassError)?;

    let eps = to_f64(epsilon);
    for (input_index, input) in inputs.iter().enumerate() {
        let analytical_grad = gradient.wrt(&vars[input_index]);
        let ncols = input.ncols();

        for ((r, c), _) in input.indexed_iter() {
            let element_index = r * ncols + c;

            let mut plus = inputs.to_vec();
            plus[input_index][[r, c]] = plus[input_index][[r, c]] + epsilon;
            let loss_plus = eval_loss(&func, &plus)?;

            let mut minus = inputs.to_vec();
            minus[input_index][[r, c]] = minus[input_index][[r, c]] - epsilon;
            let loss_minus = eval_loss(&func, &minus)?;

            let numerical = (loss_plus - loss_minus) / (2.0 * eps);
            let analytical = to_f64(analytical_grad[[r, c]]);

            if !numerical.is_finite() {
                return Err(GradCheckError::NumericalGradNonFinite {
                    input_index,
                    element_index,
                });
            }
            if !analytical.is_finite() {
                return Err(GradCheckError::AnalyticalGradNonFinite {
                    input_index,
                    element_index,
                });
            }

            let difference = (analytical - numerical).abs();
            if difference > tolerance && difference / (analytical.abs() + eps) > tolerance {
                return Err(GradCheckError::GradientMismatch {
                    input_index,
                    element_index,
                    analytical,
                    numerical,
                    difference,
                });
            }
        }
    }

    Ok(())
}
