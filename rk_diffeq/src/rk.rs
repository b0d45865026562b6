use tracing::{debug, trace};

use crate::{
    OdeModel, Real, RungeKuttaErrors, result::Trajectory, stepping::FixedStepControl,
    tableau::ButcherTableau,
};

// preallocated buffers for intermediate calculations, reused every step
struct RKBuffers<T> {
    stage: StageBuffer<T>,
    /// Stage evaluation point.
    state: Vec<T>,
    /// State at the start of the step.
    x: Vec<T>,
    /// State at the end of the step.
    y: Vec<T>,
    /// Output of the model for the current stage.
    derivative: Vec<T>,
}

impl<T: Real> RKBuffers<T> {
    fn new(stages: usize, x0: &[T]) -> Self {
        Self {
            stage: StageBuffer::new(stages, x0.len()),
            state: vec![T::zero(); x0.len()],
            x: x0.to_vec(),
            y: vec![T::zero(); x0.len()],
            derivative: Vec::with_capacity(x0.len()),
        }
    }
}

/// `s x d` arena holding the stage derivatives `k` of the current step.
pub struct StageBuffer<T> {
    k: Vec<T>,
    dim: usize,
}

impl<T: Real> StageBuffer<T> {
    pub fn new(stages: usize, dim: usize) -> Self {
        Self {
            k: vec![T::zero(); stages * dim],
            dim,
        }
    }

    pub fn k(&self, j: usize) -> &[T] {
        &self.k[j * self.dim..(j + 1) * self.dim]
    }

    fn store(&mut self, j: usize, k: &[T]) {
        self.k[j * self.dim..(j + 1) * self.dim].copy_from_slice(k);
    }
}

/// Fixed-step explicit Runge-Kutta integrator for a given tableau.
#[derive(Debug, Clone)]
pub struct RungeKutta<T> {
    tableau: ButcherTableau<T>,
}

impl<T: Real> RungeKutta<T> {
    pub fn new(tableau: ButcherTableau<T>) -> Self {
        Self { tableau }
    }

    pub fn tableau(&self) -> &ButcherTableau<T> {
        &self.tableau
    }

    /// Integrates `model` from `x0` over `tspan` with requested step `dt`.
    ///
    /// Returns the whole trajectory, `num_steps + 1` entries. Any failure
    /// aborts the call and no partial trajectory is returned.
    pub fn solve_fixed<Model: OdeModel<T>>(
        &self,
        model: &mut Model,
        x0: &[T],
        tspan: (T, T),
        dt: T,
    ) -> Result<Trajectory<T>, RungeKuttaErrors> {
        if x0.is_empty() {
            return Err(RungeKuttaErrors::EmptyState);
        }
        let controller = FixedStepControl::new(tspan, dt)?;
        debug!(
            stages = self.tableau.stages(),
            dim = x0.len(),
            num_steps = controller.num_steps,
            dt = ?controller.dt,
            dt_eff = ?controller.dt_eff,
            "fixed step plan"
        );

        let mut buffers = RKBuffers::new(self.tableau.stages(), x0);
        let entries = controller.num_steps.saturating_add(1);
        let mut result = Trajectory::try_with_capacity(entries, x0.len())?;
        result.push(controller.t0, x0);

        for n in 0..controller.num_steps {
            self.step(model, controller.dt_eff, &mut buffers)?;
            std::mem::swap(&mut buffers.x, &mut buffers.y);
            result.push(controller.time(n + 1), &buffers.x);
        }

        trace!(entries = result.len(), "integration finished");
        Ok(result)
    }

    /// Advances `buffers.x` by one step of size `h` into `buffers.y`.
    fn step<Model: OdeModel<T>>(
        &self,
        model: &mut Model,
        h: T,
        buffers: &mut RKBuffers<T>,
    ) -> Result<(), RungeKuttaErrors> {
        let RKBuffers {
            stage,
            state,
            x,
            y,
            derivative,
        } = buffers;
        let dim = x.len();

        for j in 0..self.tableau.stages() {
            if j == 0 {
                state.copy_from_slice(&x[..]);
            } else {
                // x + h * sum_{i<j} a[j][i] * k[i]
                let coupling = self.tableau.coupling(j);
                for m in 0..dim {
                    let mut sum = T::zero();
                    for (i, &a) in coupling.iter().enumerate() {
                        sum = sum + a * stage.k(i)[m];
                    }
                    state[m] = x[m] + h * sum;
                }
            }

            derivative.clear();
            model.f(state.as_slice(), derivative);
            if derivative.len() != dim {
                return Err(RungeKuttaErrors::DimensionMismatch {
                    expected: dim,
                    found: derivative.len(),
                });
            }
            stage.store(j, derivative.as_slice());
        }

        let weights = self.tableau.weights();
        for m in 0..dim {
            let mut sum = T::zero();
            for (j, &b) in weights.iter().enumerate() {
                sum = sum + b * stage.k(j)[m];
            }
            y[m] = x[m] + h * sum;
        }
        Ok(())
    }
}

/// Integrates `model` with the tableau given as raw `(a, b)`.
///
/// The tableau is validated before the model is evaluated, so a malformed
/// tableau never calls `model`.
pub fn integrate<T, Model>(
    model: &mut Model,
    x0: &[T],
    tspan: (T, T),
    dt: T,
    a: &[Vec<T>],
    b: &[T],
) -> Result<Trajectory<T>, RungeKuttaErrors>
where
    T: Real,
    Model: OdeModel<T>,
{
    let tableau = ButcherTableau::new(a.to_vec(), b.to_vec())?;
    RungeKutta::new(tableau).solve_fixed(model, x0, tspan, dt)
}
