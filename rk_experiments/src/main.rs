use std::{io, path::PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use rk_experiments::{
    ExperimentErrors,
    config::{Experiment, ExperimentConfig, Method, Precision, Study},
    problems::Problem,
    runner::{run_config, run_experiment},
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log debug output (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run every experiment in a RON file
    Run {
        config: PathBuf,
        /// Directory for CSV output, overrides the file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Max error and empirical order over a list of step sizes
    Convergence {
        #[arg(value_enum, default_value_t = ProblemArg::Logistic)]
        problem: ProblemArg,
        #[arg(short, long, value_enum, default_value_t = MethodArg::Rk4)]
        method: MethodArg,
        #[arg(short, long, value_delimiter = ',', default_values_t = [0.5, 0.25, 0.125, 0.0625])]
        steps: Vec<f64>,
        /// Decay rate of exponential-decay
        #[arg(long, default_value_t = 1.0)]
        rate: f64,
        /// Value at t = 0 of exponential-decay
        #[arg(long, default_value_t = 1.0)]
        y0: f64,
        /// Integrate in single precision
        #[arg(long = "f32")]
        single: bool,
    },
    /// Endpoint of y' = -200 t y^2 in f64 and f32 over step counts
    EulerTable {
        #[arg(short, long, value_enum, default_value_t = MethodArg::Euler)]
        method: MethodArg,
        #[arg(short, long, value_delimiter = ',', default_values_t = [25, 50, 100, 200, 400, 800, 1600])]
        counts: Vec<usize>,
    },
    /// Van der Pol trajectories written to CSV
    VanDerPol {
        #[arg(long, default_value_t = 10.0)]
        mu: f64,
        #[arg(short, long, value_enum, default_value_t = MethodArg::Rk4)]
        method: MethodArg,
        #[arg(short, long, value_delimiter = ',', default_values_t = [0.5, 0.25, 0.125, 0.0625])]
        steps: Vec<f64>,
        #[arg(short, long, default_value = "results")]
        output: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ProblemArg {
    Logistic,
    QuadraticDecay,
    Relaxation,
    LogForced,
    ExponentialDecay,
}

impl ProblemArg {
    fn problem(self, rate: f64, y0: f64) -> Problem {
        match self {
            ProblemArg::Logistic => Problem::Logistic {
                growth: 2.0,
                capacity: 1.0,
                y0: 0.1,
            },
            ProblemArg::QuadraticDecay => Problem::QuadraticDecay,
            ProblemArg::Relaxation => Problem::Relaxation,
            ProblemArg::LogForced => Problem::LogForced,
            ProblemArg::ExponentialDecay => Problem::ExponentialDecay { rate, y0 },
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum MethodArg {
    Euler,
    Midpoint,
    Heun,
    Ralston,
    Kutta3,
    Rk4,
    Rk38,
}

impl From<MethodArg> for Method {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Euler => Method::Euler,
            MethodArg::Midpoint => Method::ExplicitMidpoint,
            MethodArg::Heun => Method::Heun,
            MethodArg::Ralston => Method::Ralston,
            MethodArg::Kutta3 => Method::Kutta3,
            MethodArg::Rk4 => Method::Rk4,
            MethodArg::Rk38 => Method::Rk38,
        }
    }
}

fn main() -> Result<(), ExperimentErrors> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    let mut stdout = io::stdout().lock();
    match cli.command {
        Commands::Run { config, output } => {
            let config = ExperimentConfig::from_file(&config)?;
            run_config(&config, output.as_deref(), &mut stdout)?;
        }
        Commands::Convergence {
            problem,
            method,
            steps,
            rate,
            y0,
            single,
        } => {
            let problem = problem.problem(rate, y0);
            let experiment = Experiment {
                name: format!("{} {:?}", problem.name(), method).to_lowercase(),
                problem,
                method: method.into(),
                interval: None,
                study: Study::Convergence { step_sizes: steps },
                precision: if single { Precision::F32 } else { Precision::F64 },
            };
            run_experiment(&experiment, None, &mut stdout)?;
        }
        Commands::EulerTable { method, counts } => {
            let experiment = Experiment {
                name: format!("quadratic_decay {:?}", method).to_lowercase(),
                problem: Problem::QuadraticDecay,
                method: method.into(),
                interval: None,
                study: Study::Endpoint {
                    step_counts: counts,
                },
                precision: Precision::F64,
            };
            run_experiment(&experiment, None, &mut stdout)?;
        }
        Commands::VanDerPol {
            mu,
            method,
            steps,
            output,
        } => {
            let experiment = Experiment {
                name: "van_der_pol".to_string(),
                problem: Problem::VanDerPol { mu },
                method: method.into(),
                interval: None,
                study: Study::Trajectory { step_sizes: steps },
                precision: Precision::F64,
            };
            run_experiment(&experiment, Some(output.as_path()), &mut stdout)?;
        }
    }
    Ok(())
}
