use rk_diffeq::{ButcherTableau, Real, RungeKutta, Trajectory, solve_sweep};
use tracing::info;

use crate::{
    ExperimentErrors,
    config::Method,
    problems::{Problem, cast},
};

/// Error of one run against the closed form solution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorRow {
    /// Requested step size.
    pub step: f64,
    pub num_steps: usize,
    pub max_error: f64,
    pub final_error: f64,
    /// Empirical order against the previous row.
    pub order: Option<f64>,
}

/// Endpoint value of one step count in double and single precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EndpointRow {
    pub num_steps: usize,
    pub step: f64,
    pub y64: f64,
    pub error64: f64,
    pub y32: f32,
    pub error32: f64,
}

/// Max and final absolute error of the first solution component.
pub fn solution_errors<T: Real>(
    problem: &Problem,
    trajectory: &Trajectory<T>,
) -> Result<(f64, f64), ExperimentErrors> {
    let offset = problem.offset();
    let mut max_error = 0.0f64;
    let mut final_error = 0.0;
    for (t, y) in trajectory.iter() {
        let exact = problem
            .exact(widen(t))
            .ok_or(ExperimentErrors::NoExactSolution(problem.name()))?;
        final_error = (widen(y[offset]) - exact).abs();
        max_error = max_error.max(final_error);
    }
    Ok((max_error, final_error))
}

/// Empirical order `p = ln(e1/e2) / ln(h1/h2)` between successive runs.
///
/// `None` where an error is zero or two step sizes coincide.
pub fn empirical_orders(runs: &[(f64, f64)]) -> Vec<Option<f64>> {
    runs.windows(2)
        .map(|pair| {
            let ((h1, e1), (h2, e2)) = (pair[0], pair[1]);
            (e1 > 0.0 && e2 > 0.0 && h1 != h2).then(|| (e1 / e2).ln() / (h1 / h2).ln())
        })
        .collect()
}

/// Runs `problem` once per step size and tabulates the errors.
pub fn convergence_study<T: Real>(
    problem: &Problem,
    tableau: &ButcherTableau<T>,
    tspan: (f64, f64),
    step_sizes: &[f64],
) -> Result<Vec<ErrorRow>, ExperimentErrors> {
    info!(
        problem = problem.name(),
        stages = tableau.stages(),
        runs = step_sizes.len(),
        "convergence study"
    );
    let x0 = problem.initial_state::<T>(tspan.0)?;
    let model = problem.rhs::<T>()?;
    let steps = step_sizes
        .iter()
        .map(|&h| cast(h))
        .collect::<Result<Vec<T>, _>>()?;
    let tspan_t = (cast(tspan.0)?, cast(tspan.1)?);

    let mut rows = Vec::with_capacity(step_sizes.len());
    for (&step, result) in step_sizes
        .iter()
        .zip(solve_sweep(&model, &x0, tspan_t, &steps, tableau))
    {
        let trajectory = result?;
        let (max_error, final_error) = solution_errors(problem, &trajectory)?;
        rows.push(ErrorRow {
            step,
            num_steps: trajectory.len() - 1,
            max_error,
            final_error,
            order: None,
        });
    }

    let runs: Vec<(f64, f64)> = rows.iter().map(|row| (row.step, row.max_error)).collect();
    for (row, order) in rows.iter_mut().skip(1).zip(empirical_orders(&runs)) {
        row.order = order;
    }
    Ok(rows)
}

/// Endpoint values over step counts, computed once in f64 and once in f32.
pub fn endpoint_table(
    problem: &Problem,
    method: &Method,
    tspan: (f64, f64),
    step_counts: &[usize],
) -> Result<Vec<EndpointRow>, ExperimentErrors> {
    info!(problem = problem.name(), runs = step_counts.len(), "endpoint table");
    let exact = problem
        .exact(tspan.1)
        .ok_or(ExperimentErrors::NoExactSolution(problem.name()))?;
    let solver64 = RungeKutta::new(method.tableau::<f64>()?);
    let solver32 = RungeKutta::new(method.tableau::<f32>()?);

    step_counts
        .iter()
        .map(|&n| {
            let step = (tspan.1 - tspan.0) / n as f64;
            let y64 = endpoint(problem, &solver64, tspan, n)?;
            let y32 = endpoint(problem, &solver32, tspan, n)?;
            Ok(EndpointRow {
                num_steps: n,
                step,
                y64,
                error64: (y64 - exact).abs(),
                y32,
                error32: (f64::from(y32) - exact).abs(),
            })
        })
        .collect()
}

// final value of the first solution component using exactly `n` steps
fn endpoint<T: Real>(
    problem: &Problem,
    solver: &RungeKutta<T>,
    tspan: (f64, f64),
    n: usize,
) -> Result<T, ExperimentErrors> {
    let (t0, tf): (T, T) = (cast(tspan.0)?, cast(tspan.1)?);
    let dt = (tf - t0) / cast(n as f64)?;
    let mut model = problem.rhs::<T>()?;
    let x0 = problem.initial_state::<T>(tspan.0)?;
    let trajectory = solver.solve_fixed(&mut model, &x0, (t0, tf), dt)?;
    Ok(trajectory.final_state()[problem.offset()])
}

pub(crate) fn widen<T: Real>(value: T) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}
