use rayon::prelude::*;
use tracing::debug;

use crate::{OdeModel, Real, RungeKuttaErrors, RungeKutta, Trajectory, tableau::ButcherTableau};

/// Integrates the same problem once per requested step size, in parallel.
///
/// Every run gets its own clone of `model` along with its own buffers and
/// trajectory. Results come back in the order of `step_sizes`.
pub fn solve_sweep<T, Model>(
    model: &Model,
    x0: &[T],
    tspan: (T, T),
    step_sizes: &[T],
    tableau: &ButcherTableau<T>,
) -> Vec<Result<Trajectory<T>, RungeKuttaErrors>>
where
    T: Real,
    Model: OdeModel<T> + Clone + Send + Sync,
{
    debug!(runs = step_sizes.len(), stages = tableau.stages(), "step size sweep");
    let solver = RungeKutta::new(tableau.clone());
    step_sizes
        .par_iter()
        .map(|&dt| {
            let mut model = model.clone();
            solver.solve_fixed(&mut model, x0, tspan, dt)
        })
        .collect()
}
