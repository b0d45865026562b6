use crate::{Real, RungeKuttaErrors};

/// Discrete solution of one integration call.
///
/// Holds `num_steps + 1` entries, from the initial condition to the final
/// state. States are stored row-major, `dim` values per entry, and each entry
/// is an independent copy of the state at that time.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory<T> {
    /// Recorded times.
    t: Vec<T>,
    /// Recorded states, `dim` values per time.
    y: Vec<T>,
    dim: usize,
}

impl<T: Real> Trajectory<T> {
    /// Preallocates storage for `n` entries of dimension `dim`.
    ///
    /// A plan too large to store is reported as an unusable step size.
    pub(crate) fn try_with_capacity(n: usize, dim: usize) -> Result<Self, RungeKuttaErrors> {
        let too_large = || {
            RungeKuttaErrors::InvalidStepSize(format!(
                "{n} entries of dimension {dim} do not fit in memory"
            ))
        };
        let values = n.checked_mul(dim).ok_or_else(too_large)?;
        let mut y = Vec::new();
        y.try_reserve_exact(values).map_err(|_| too_large())?;
        let mut t = Vec::new();
        t.try_reserve_exact(n).map_err(|_| too_large())?;
        Ok(Self { t, y, dim })
    }

    pub(crate) fn push(&mut self, t: T, y: &[T]) {
        debug_assert_eq!(y.len(), self.dim);
        self.t.push(t);
        self.y.extend_from_slice(y);
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// State dimension `d`.
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn times(&self) -> &[T] {
        &self.t
    }

    pub fn state(&self, n: usize) -> Option<&[T]> {
        self.y.get(n * self.dim..(n + 1) * self.dim)
    }

    pub fn states(&self) -> impl Iterator<Item = &[T]> {
        self.y.chunks_exact(self.dim)
    }

    /// Iterates `(time, state)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (T, &[T])> {
        self.t.iter().copied().zip(self.states())
    }

    pub fn last(&self) -> Option<(T, &[T])> {
        let n = self.len().checked_sub(1)?;
        Some((self.t[n], self.state(n)?))
    }

    /// State at `tf`.
    ///
    /// # Panics
    ///
    /// Panics on an empty trajectory; the solver never returns one.
    pub fn final_state(&self) -> &[T] {
        &self.y[self.y.len() - self.dim..]
    }

    /// Values of state component `i` over time.
    pub fn component(&self, i: usize) -> Option<Vec<T>> {
        (i < self.dim).then(|| self.states().map(|y| y[i]).collect())
    }

    /// Flattened values for scalar problems (`dim == 1`).
    pub fn scalar_values(&self) -> Option<&[T]> {
        (self.dim == 1).then_some(self.y.as_slice())
    }

    /// Splits into times and one owned vector per state.
    pub fn into_parts(self) -> (Vec<T>, Vec<Vec<T>>) {
        let states = self.states().map(<[T]>::to_vec).collect();
        (self.t, states)
    }
}
