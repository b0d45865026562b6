use std::{
    fs,
    path::{Path, PathBuf},
};

use rk_diffeq::{ButcherTableau, Real};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ExperimentErrors, problems::Problem, problems::cast};

/// Contents of a RON experiment file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Directory for CSV output.
    #[serde(default)]
    pub output: Option<PathBuf>,
    pub experiments: Vec<Experiment>,
}

impl ExperimentConfig {
    pub fn from_file(path: &Path) -> Result<Self, ExperimentErrors> {
        let content = fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        debug!(path = %path.display(), experiments = config.experiments.len(), "loaded config");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, ExperimentErrors> {
        Ok(ron::from_str(content)?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experiment {
    pub name: String,
    pub problem: Problem,
    pub method: Method,
    /// Overrides the problem's default interval.
    #[serde(default)]
    pub interval: Option<(f64, f64)>,
    pub study: Study,
    #[serde(default)]
    pub precision: Precision,
}

impl Experiment {
    pub fn tspan(&self) -> (f64, f64) {
        self.interval
            .unwrap_or_else(|| self.problem.interval())
    }
}

/// Runge-Kutta method, either a named tableau or explicit coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Method {
    Euler,
    ExplicitMidpoint,
    Heun,
    Ralston,
    Kutta3,
    Rk4,
    Rk38,
    Custom { a: Vec<Vec<f64>>, b: Vec<f64> },
}

impl Method {
    pub fn tableau<T: Real>(&self) -> Result<ButcherTableau<T>, ExperimentErrors> {
        let tableau = match self {
            Method::Euler => ButcherTableau::euler(),
            Method::ExplicitMidpoint => ButcherTableau::explicit_midpoint(),
            Method::Heun => ButcherTableau::heun(),
            Method::Ralston => ButcherTableau::ralston(),
            Method::Kutta3 => ButcherTableau::kutta3(),
            Method::Rk4 => ButcherTableau::rk4(),
            Method::Rk38 => ButcherTableau::rk38(),
            Method::Custom { a, b } => {
                let a = a
                    .iter()
                    .map(|row| row.iter().map(|&v| cast(v)).collect::<Result<Vec<T>, _>>())
                    .collect::<Result<Vec<Vec<T>>, _>>()?;
                let b = b
                    .iter()
                    .map(|&v| cast(v))
                    .collect::<Result<Vec<T>, _>>()?;
                ButcherTableau::new(a, b)?
            }
        };
        Ok(tableau)
    }
}

/// What to compute for an experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Study {
    /// Max error and empirical order over a list of step sizes.
    Convergence { step_sizes: Vec<f64> },
    /// Endpoint value and error in both f64 and f32 over a list of step counts.
    Endpoint { step_counts: Vec<usize> },
    /// Full trajectories written to CSV, one file per step size.
    Trajectory { step_sizes: Vec<f64> },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum Precision {
    #[default]
    F64,
    F32,
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
(
    output: Some("results"),
    experiments: [
        (
            name: "logistic-rk4",
            problem: Logistic(growth: 2.0, capacity: 1.0, y0: 0.1),
            method: Rk4,
            study: Convergence(step_sizes: [0.5, 0.25, 0.125, 0.0625]),
        ),
        (
            name: "euler-table",
            problem: QuadraticDecay,
            method: Euler,
            study: Endpoint(step_counts: [25, 50, 100]),
        ),
        (
            name: "custom-midpoint",
            problem: ExponentialDecay(rate: 1.0, y0: 1.0),
            method: Custom(a: [[0.0, 0.0], [0.5, 0.0]], b: [0.0, 1.0]),
            interval: Some((0.0, 2.0)),
            study: Trajectory(step_sizes: [0.1]),
            precision: F32,
        ),
    ],
)
"#;

    #[test]
    fn parses_experiment_file() {
        let config = ExperimentConfig::parse(CONFIG).unwrap();
        assert_eq!(config.output, Some(PathBuf::from("results")));
        assert_eq!(config.experiments.len(), 3);

        let first = &config.experiments[0];
        assert_eq!(first.method, Method::Rk4);
        assert_eq!(first.precision, Precision::F64);
        assert_eq!(first.tspan(), (0.0, 5.0));

        let last = &config.experiments[2];
        assert_eq!(last.tspan(), (0.0, 2.0));
        assert_eq!(last.precision, Precision::F32);
        assert_eq!(
            last.method.tableau::<f32>().unwrap(),
            ButcherTableau::<f32>::explicit_midpoint()
        );
    }

    #[test]
    fn custom_tableau_is_validated() {
        let method = Method::Custom {
            a: vec![vec![0.0, 0.0], vec![1.0]],
            b: vec![0.5, 0.5],
        };
        assert!(matches!(
            method.tableau::<f64>(),
            Err(ExperimentErrors::RungeKutta(_))
        ));
    }

    #[test]
    fn malformed_config_is_an_error() {
        assert!(matches!(
            ExperimentConfig::parse("(experiments: [(name: 1)])"),
            Err(ExperimentErrors::Config(_))
        ));
    }
}
