use crate::Real;

/// Right-hand side of an autonomous ODE `y' = f(y)`.
///
/// Implementations must be deterministic and free of side effects on the
/// solution: the engine calls `f` once per stage, `s` times per step, with
/// freshly computed stage states. `derivative` arrives empty and is reused
/// across calls; `f` appends one value per component of `state`.
///
/// Any `FnMut(&[T], &mut Vec<T>)` closure is an `OdeModel<T>`.
pub trait OdeModel<T> {
    fn f(&mut self, state: &[T], derivative: &mut Vec<T>);
}

impl<T, F> OdeModel<T> for F
where
    F: FnMut(&[T], &mut Vec<T>),
{
    fn f(&mut self, state: &[T], derivative: &mut Vec<T>) {
        self(state, derivative)
    }
}

/// Right-hand side of a non-autonomous ODE `y' = f(t, y)`, appending into
/// `derivative` like [`OdeModel::f`].
pub trait TimeDependentModel<T> {
    fn f(&mut self, t: T, y: &[T], derivative: &mut Vec<T>);
}

impl<T, F> TimeDependentModel<T> for F
where
    F: FnMut(T, &[T], &mut Vec<T>),
{
    fn f(&mut self, t: T, y: &[T], derivative: &mut Vec<T>) {
        self(t, y, derivative)
    }
}

/// Runs a time dependent model on the autonomous engine by carrying time as
/// the first state component, `[t, y..]` with `t' = 1`.
#[derive(Debug, Clone, Copy)]
pub struct TimeAugmented<M> {
    model: M,
}

impl<M> TimeAugmented<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    /// Augmented initial state `[t0, y0..]`.
    pub fn initial_state<T: Real>(t0: T, y0: &[T]) -> Vec<T> {
        let mut state = Vec::with_capacity(y0.len() + 1);
        state.push(t0);
        state.extend_from_slice(y0);
        state
    }

    pub fn into_inner(self) -> M {
        self.model
    }
}

impl<T, M> OdeModel<T> for TimeAugmented<M>
where
    T: Real,
    M: TimeDependentModel<T>,
{
    fn f(&mut self, state: &[T], derivative: &mut Vec<T>) {
        let Some((&t, y)) = state.split_first() else {
            return;
        };
        derivative.push(T::one());
        self.model.f(t, y, derivative);
    }
}
