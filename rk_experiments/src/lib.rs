use rk_diffeq::RungeKuttaErrors;
use thiserror::Error;

pub mod config;
pub mod convergence;
pub mod problems;
pub mod report;
pub mod runner;

#[derive(Debug, Error)]
pub enum ExperimentErrors {
    #[error("RungeKuttaErrors: {0}")]
    RungeKutta(#[from] RungeKuttaErrors),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("config error: {0}")]
    Config(#[from] ron::error::SpannedError),
    #[error("{0} is not representable in the requested precision")]
    Precision(f64),
    #[error("problem '{0}' has no closed form solution")]
    NoExactSolution(&'static str),
    #[error("experiment '{0}' writes trajectories but no output directory was given")]
    MissingOutput(String),
}
