use std::{
    fmt::Display,
    io::Write,
    path::{Path, PathBuf},
};

use rk_diffeq::{Real, RungeKutta};
use tracing::{info, warn};

use crate::{
    ExperimentErrors,
    config::{Experiment, ExperimentConfig, Precision, Study},
    convergence::{convergence_study, endpoint_table},
    problems::cast,
    report::{write_endpoint_table, write_error_table, write_trajectory_csv},
};

/// Runs every experiment in `config`, stopping at the first failure.
///
/// `output` takes precedence over the directory named in the file.
pub fn run_config<W: Write>(
    config: &ExperimentConfig,
    output: Option<&Path>,
    out: &mut W,
) -> Result<(), ExperimentErrors> {
    let output = output.or(config.output.as_deref());
    for experiment in &config.experiments {
        run_experiment(experiment, output, out)?;
    }
    Ok(())
}

/// Runs one experiment, printing tables to `out`.
///
/// Returns the CSV files written by trajectory studies.
pub fn run_experiment<W: Write>(
    experiment: &Experiment,
    output: Option<&Path>,
    out: &mut W,
) -> Result<Vec<PathBuf>, ExperimentErrors> {
    info!(name = %experiment.name, problem = experiment.problem.name(), "running experiment");
    let tspan = experiment.tspan();
    match &experiment.study {
        Study::Convergence { step_sizes } => {
            let rows = match experiment.precision {
                Precision::F64 => convergence_study(
                    &experiment.problem,
                    &experiment.method.tableau::<f64>()?,
                    tspan,
                    step_sizes,
                )?,
                Precision::F32 => convergence_study(
                    &experiment.problem,
                    &experiment.method.tableau::<f32>()?,
                    tspan,
                    step_sizes,
                )?,
            };
            write_error_table(out, &experiment.name, &rows)?;
            Ok(Vec::new())
        }
        Study::Endpoint { step_counts } => {
            if experiment.precision == Precision::F32 {
                warn!(name = %experiment.name, "endpoint tables always compare f64 and f32");
            }
            let rows = endpoint_table(&experiment.problem, &experiment.method, tspan, step_counts)?;
            write_endpoint_table(out, &experiment.name, &rows)?;
            Ok(Vec::new())
        }
        Study::Trajectory { step_sizes } => {
            let dir = output.ok_or_else(|| ExperimentErrors::MissingOutput(experiment.name.clone()))?;
            let files = match experiment.precision {
                Precision::F64 => write_trajectories::<f64>(experiment, dir, tspan, step_sizes)?,
                Precision::F32 => write_trajectories::<f32>(experiment, dir, tspan, step_sizes)?,
            };
            for file in &files {
                writeln!(out, "{}: wrote {}", experiment.name, file.display())?;
            }
            Ok(files)
        }
    }
}

fn write_trajectories<T: Real + Display>(
    experiment: &Experiment,
    dir: &Path,
    tspan: (f64, f64),
    step_sizes: &[f64],
) -> Result<Vec<PathBuf>, ExperimentErrors> {
    let problem = &experiment.problem;
    let solver = RungeKutta::new(experiment.method.tableau::<T>()?);
    let x0 = problem.initial_state::<T>(tspan.0)?;
    let tspan_t = (cast(tspan.0)?, cast(tspan.1)?);

    let mut files = Vec::with_capacity(step_sizes.len());
    for &h in step_sizes {
        let mut model = problem.rhs::<T>()?;
        let trajectory = solver.solve_fixed(&mut model, &x0, tspan_t, cast(h)?)?;
        if trajectory
            .final_state()
            .iter()
            .any(|v| !v.is_finite())
        {
            warn!(name = %experiment.name, h, "trajectory diverged");
        }
        let path = dir.join(format!("{}_h{h}.csv", experiment.name));
        write_trajectory_csv(&path, problem, &trajectory)?;
        files.push(path);
    }
    Ok(files)
}
