use std::fmt::Debug;

use num_traits::Float;
use thiserror::Error;

pub mod model;
pub mod result;
pub mod rk;
pub mod stepping;
pub mod sweep;
pub mod tableau;

pub use model::{OdeModel, TimeAugmented, TimeDependentModel};
pub use result::Trajectory;
pub use rk::{RungeKutta, integrate};
pub use stepping::FixedStepControl;
pub use sweep::solve_sweep;
pub use tableau::ButcherTableau;

/// Floating point type a single integration runs in.
///
/// Implemented for `f32` and `f64`. Every value of one call (state, step size,
/// tableau coefficients) uses the same precision.
pub trait Real: Float + From<f32> + Debug + Send + Sync + 'static {}

impl<T> Real for T where T: Float + From<f32> + Debug + Send + Sync + 'static {}

/// Failures of an integration call. All of them are terminal for the call.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RungeKuttaErrors {
    #[error("invalid butcher tableau: {0}")]
    InvalidTableau(String),
    #[error("invalid step size: {0}")]
    InvalidStepSize(String),
    #[error("ode function returned {found} components, expected {expected}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("initial state must have at least one component")]
    EmptyState,
}
