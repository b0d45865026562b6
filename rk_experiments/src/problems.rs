//! Model problems from the course exercises, each with its default interval,
//! initial condition and (where one exists) closed form solution.

use num_traits::NumCast;
use rk_diffeq::{OdeModel, Real, TimeAugmented, TimeDependentModel};
use serde::{Deserialize, Serialize};

use crate::ExperimentErrors;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Problem {
    /// `y' = g y (1 - y/K)`, with `y0` the value at `t = 0`.
    Logistic { growth: f64, capacity: f64, y0: f64 },
    /// `y' = -a y`, with `y0` the value at `t = 0`.
    ExponentialDecay { rate: f64, y0: f64 },
    /// `y' = -200 t y^2` on `[-1, 0]`, `y(-1) = 1/101`.
    QuadraticDecay,
    /// `y' = (1/(t+1) - y) / (t+1)` on `[0, 1]`, `y(0) = 1`.
    Relaxation,
    /// `y' = (ln(t+1) - y) / (t+1)` on `[0, 1]`, `y(0) = 0`.
    LogForced,
    /// Van der Pol oscillator on `[0, 20]`, `y(0) = [0, 1]`.
    VanDerPol { mu: f64 },
}

impl Problem {
    pub fn name(&self) -> &'static str {
        match self {
            Problem::Logistic { .. } => "logistic",
            Problem::ExponentialDecay { .. } => "exponential_decay",
            Problem::QuadraticDecay => "quadratic_decay",
            Problem::Relaxation => "relaxation",
            Problem::LogForced => "log_forced",
            Problem::VanDerPol { .. } => "van_der_pol",
        }
    }

    /// Default integration interval.
    pub fn interval(&self) -> (f64, f64) {
        match self {
            Problem::Logistic { .. } => (0.0, 5.0),
            Problem::QuadraticDecay => (-1.0, 0.0),
            Problem::VanDerPol { .. } => (0.0, 20.0),
            Problem::ExponentialDecay { .. } | Problem::Relaxation | Problem::LogForced => {
                (0.0, 1.0)
            }
        }
    }

    /// Index of the first solution component in the integrated state.
    ///
    /// Time dependent problems carry time in front of the solution.
    pub fn offset(&self) -> usize {
        match self {
            Problem::QuadraticDecay | Problem::Relaxation | Problem::LogForced => 1,
            _ => 0,
        }
    }

    /// Column names of the solution components.
    pub fn labels(&self) -> &'static [&'static str] {
        match self {
            Problem::VanDerPol { .. } => &["y1", "y2"],
            _ => &["y"],
        }
    }

    /// Closed form solution of the first component, if known.
    pub fn exact(&self, t: f64) -> Option<f64> {
        match *self {
            Problem::Logistic {
                growth,
                capacity,
                y0,
            } => Some(capacity / (1.0 + ((capacity - y0) / y0) * (-growth * t).exp())),
            Problem::ExponentialDecay { rate, y0 } => Some(y0 * (-rate * t).exp()),
            Problem::QuadraticDecay => Some(1.0 / (1.0 + 100.0 * t * t)),
            Problem::Relaxation => Some(((t + 1.0).ln() + 1.0) / (t + 1.0)),
            Problem::LogForced => Some((t + 1.0).ln() - 1.0 + 1.0 / (t + 1.0)),
            Problem::VanDerPol { .. } => None,
        }
    }

    /// Integrated state at `t0`, including the time component where needed.
    pub fn initial_state<T: Real>(&self, t0: f64) -> Result<Vec<T>, ExperimentErrors> {
        if let Problem::VanDerPol { .. } = self {
            return Ok(vec![T::zero(), T::one()]);
        }
        let y0 = self
            .exact(t0)
            .ok_or(ExperimentErrors::NoExactSolution(self.name()))?;
        let y0: T = cast(y0)?;
        if self.offset() == 1 {
            Ok(TimeAugmented::<()>::initial_state(cast(t0)?, &[y0]))
        } else {
            Ok(vec![y0])
        }
    }

    /// Right-hand side in precision `T`.
    pub fn rhs<T: Real>(&self) -> Result<ProblemRhs<T>, ExperimentErrors> {
        let rhs = match *self {
            Problem::Logistic {
                growth, capacity, ..
            } => ProblemRhs::Autonomous(AutonomousRhs::Logistic {
                growth: cast(growth)?,
                capacity: cast(capacity)?,
            }),
            Problem::ExponentialDecay { rate, .. } => {
                ProblemRhs::Autonomous(AutonomousRhs::ExponentialDecay { rate: cast(rate)? })
            }
            Problem::VanDerPol { mu } => {
                ProblemRhs::Autonomous(AutonomousRhs::VanDerPol { mu: cast(mu)? })
            }
            Problem::QuadraticDecay => ProblemRhs::TimeDependent(TimeAugmented::new(
                TimeDependentRhs::QuadraticDecay {
                    coeff: cast(-200.0)?,
                },
            )),
            Problem::Relaxation => {
                ProblemRhs::TimeDependent(TimeAugmented::new(TimeDependentRhs::Relaxation))
            }
            Problem::LogForced => {
                ProblemRhs::TimeDependent(TimeAugmented::new(TimeDependentRhs::LogForced))
            }
        };
        Ok(rhs)
    }
}

/// Converts a configuration value into the precision of a run.
pub fn cast<T: Real>(value: f64) -> Result<T, ExperimentErrors> {
    <T as NumCast>::from(value).ok_or(ExperimentErrors::Precision(value))
}

#[derive(Debug, Clone, Copy)]
pub enum AutonomousRhs<T> {
    Logistic { growth: T, capacity: T },
    ExponentialDecay { rate: T },
    VanDerPol { mu: T },
}

impl<T: Real> OdeModel<T> for AutonomousRhs<T> {
    fn f(&mut self, y: &[T], dy: &mut Vec<T>) {
        match *self {
            AutonomousRhs::Logistic { growth, capacity } => {
                dy.push(growth * y[0] * (T::one() - y[0] / capacity));
            }
            AutonomousRhs::ExponentialDecay { rate } => dy.push(-rate * y[0]),
            AutonomousRhs::VanDerPol { mu } => {
                dy.extend([y[1], mu * (T::one() - y[0] * y[0]) * y[1] - y[0]]);
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum TimeDependentRhs<T> {
    QuadraticDecay { coeff: T },
    Relaxation,
    LogForced,
}

impl<T: Real> TimeDependentModel<T> for TimeDependentRhs<T> {
    fn f(&mut self, t: T, y: &[T], dy: &mut Vec<T>) {
        let shifted = t + T::one();
        dy.push(match *self {
            TimeDependentRhs::QuadraticDecay { coeff } => coeff * t * y[0] * y[0],
            TimeDependentRhs::Relaxation => (shifted.recip() - y[0]) / shifted,
            TimeDependentRhs::LogForced => (shifted.ln() - y[0]) / shifted,
        });
    }
}

/// Right-hand side of any [`Problem`], runnable on the autonomous engine.
#[derive(Debug, Clone, Copy)]
pub enum ProblemRhs<T> {
    Autonomous(AutonomousRhs<T>),
    TimeDependent(TimeAugmented<TimeDependentRhs<T>>),
}

impl<T: Real> OdeModel<T> for ProblemRhs<T> {
    fn f(&mut self, state: &[T], derivative: &mut Vec<T>) {
        match self {
            ProblemRhs::Autonomous(rhs) => OdeModel::f(rhs, state, derivative),
            ProblemRhs::TimeDependent(rhs) => OdeModel::f(rhs, state, derivative),
        }
    }
}
