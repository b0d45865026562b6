use crate::{Real, RungeKuttaErrors};

/// Coefficients `(A, b)` of an explicit Runge-Kutta method with `s` stages.
///
/// `a` is `s x s` and `b` has length `s`. The engine only ever reads the
/// entries of `a` strictly below the diagonal, so whatever sits on or above
/// the diagonal has no effect on the result.
#[derive(Debug, Clone, PartialEq)]
pub struct ButcherTableau<T> {
    a: Vec<Vec<T>>,
    b: Vec<T>,
}

impl<T: Real> ButcherTableau<T> {
    /// Builds a tableau after checking its shape.
    pub fn new(a: Vec<Vec<T>>, b: Vec<T>) -> Result<Self, RungeKuttaErrors> {
        validate(&a, &b)?;
        Ok(Self { a, b })
    }

    /// Number of stages `s`.
    pub fn stages(&self) -> usize {
        self.b.len()
    }

    /// Coefficients `A[j][0..j]` that blend earlier stages into stage `j`.
    pub fn coupling(&self, j: usize) -> &[T] {
        &self.a[j][..j]
    }

    pub fn weights(&self) -> &[T] {
        &self.b
    }

    /// Full coefficient matrix as supplied, including ignored entries.
    pub fn matrix(&self) -> &[Vec<T>] {
        &self.a
    }

    /// Stage nodes `c_j = sum_{i<j} A[j][i]`.
    pub fn nodes(&self) -> Vec<T> {
        (0..self.stages())
            .map(|j| {
                self.coupling(j)
                    .iter()
                    .fold(T::zero(), |acc, &a| acc + a)
            })
            .collect()
    }

    /// Explicit Euler: `y + h f(y)`.
    pub fn euler() -> Self {
        Self {
            a: vec![vec![T::zero()]],
            b: vec![T::one()],
        }
    }

    /// Explicit midpoint rule, the "improved Euler" step
    /// `y + h f(y + h/2 f(y))`.
    pub fn explicit_midpoint() -> Self {
        let z = T::zero();
        Self {
            a: vec![vec![z, z], vec![ratio(1., 2.), z]],
            b: vec![z, T::one()],
        }
    }

    /// Heun's method (explicit trapezoidal rule).
    pub fn heun() -> Self {
        let z = T::zero();
        Self {
            a: vec![vec![z, z], vec![T::one(), z]],
            b: vec![ratio(1., 2.), ratio(1., 2.)],
        }
    }

    /// Ralston's second order method.
    pub fn ralston() -> Self {
        let z = T::zero();
        Self {
            a: vec![vec![z, z], vec![ratio(2., 3.), z]],
            b: vec![ratio(1., 4.), ratio(3., 4.)],
        }
    }

    /// Kutta's third order method.
    pub fn kutta3() -> Self {
        let z = T::zero();
        Self {
            a: vec![
                vec![z, z, z],
                vec![ratio(1., 2.), z, z],
                vec![-T::one(), ratio(2., 1.), z],
            ],
            b: vec![ratio(1., 6.), ratio(2., 3.), ratio(1., 6.)],
        }
    }

    // usage is ButcherTableau::<f64>::rk4()
    pub fn rk4() -> Self {
        let z = T::zero();
        Self {
            a: vec![
                vec![z, z, z, z],
                vec![ratio(1., 2.), z, z, z],
                vec![z, ratio(1., 2.), z, z],
                vec![z, z, T::one(), z],
            ],
            b: vec![
                ratio(1., 6.),
                ratio(1., 3.),
                ratio(1., 3.),
                ratio(1., 6.),
            ],
        }
    }

    /// Kutta's 3/8 rule.
    pub fn rk38() -> Self {
        let z = T::zero();
        Self {
            a: vec![
                vec![z, z, z, z],
                vec![ratio(1., 3.), z, z, z],
                vec![ratio(-1., 3.), T::one(), z, z],
                vec![T::one(), -T::one(), T::one(), z],
            ],
            b: vec![
                ratio(1., 8.),
                ratio(3., 8.),
                ratio(3., 8.),
                ratio(1., 8.),
            ],
        }
    }
}

/// Checks that `a` is square and that `b` matches its dimension.
pub fn validate<T>(a: &[Vec<T>], b: &[T]) -> Result<(), RungeKuttaErrors> {
    let s = a.len();
    if s == 0 {
        return Err(RungeKuttaErrors::InvalidTableau(
            "tableau must have at least one stage".into(),
        ));
    }
    if let Some((row, entries)) = a
        .iter()
        .enumerate()
        .find(|(_, entries)| entries.len() != s)
    {
        return Err(RungeKuttaErrors::InvalidTableau(format!(
            "A must be square: row {row} has {} entries, expected {s}",
            entries.len()
        )));
    }
    if b.len() != s {
        return Err(RungeKuttaErrors::InvalidTableau(format!(
            "weights b have length {}, expected {s} to match A",
            b.len()
        )));
    }
    Ok(())
}

// exact small integer ratio evaluated in the target precision
fn ratio<T: Real>(num: f32, den: f32) -> T {
    let num: T = num.into();
    num / den.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rejects_non_square_a() {
        let a = vec![vec![0.0, 0.0], vec![0.5, 0.0], vec![0.0, 1.0]];
        let b = vec![0.2, 0.3, 0.5];
        let err = ButcherTableau::new(a, b).unwrap_err();
        assert!(matches!(err, RungeKuttaErrors::InvalidTableau(_)));
    }

    #[test]
    fn rejects_ragged_a() {
        let a = vec![vec![0.0, 0.0], vec![1.0]];
        let err = ButcherTableau::new(a, vec![0.5, 0.5]).unwrap_err();
        assert!(matches!(err, RungeKuttaErrors::InvalidTableau(_)));
    }

    #[test]
    fn rejects_weight_length_mismatch() {
        let a = vec![vec![0.0; 3]; 3];
        let err = ButcherTableau::new(a, vec![0.5, 0.5]).unwrap_err();
        assert!(matches!(err, RungeKuttaErrors::InvalidTableau(_)));
    }

    #[test]
    fn rejects_empty_tableau() {
        let err = ButcherTableau::<f64>::new(Vec::new(), Vec::new()).unwrap_err();
        assert!(matches!(err, RungeKuttaErrors::InvalidTableau(_)));
    }

    #[test]
    fn coupling_excludes_diagonal_and_upper() {
        let a = vec![
            vec![9.0, 9.0, 9.0],
            vec![0.5, 9.0, 9.0],
            vec![-1.0, 2.0, 9.0],
        ];
        let tableau = ButcherTableau::new(a, vec![1.0 / 6.0, 2.0 / 3.0, 1.0 / 6.0]).unwrap();
        assert!(tableau.coupling(0).is_empty());
        assert_eq!(tableau.coupling(1), &[0.5]);
        assert_eq!(tableau.coupling(2), &[-1.0, 2.0]);
    }

    #[test]
    fn standard_tableaus_are_valid_and_consistent() {
        let tableaus = [
            ButcherTableau::<f64>::euler(),
            ButcherTableau::explicit_midpoint(),
            ButcherTableau::heun(),
            ButcherTableau::ralston(),
            ButcherTableau::kutta3(),
            ButcherTableau::rk4(),
            ButcherTableau::rk38(),
        ];
        for tableau in tableaus {
            validate(tableau.matrix(), tableau.weights()).unwrap();
            let sum: f64 = tableau.weights().iter().sum();
            assert_relative_eq!(sum, 1.0, epsilon = 1e-15);
        }
    }

    #[test]
    fn rk4_matches_classical_coefficients() {
        let tableau = ButcherTableau::<f64>::rk4();
        assert_eq!(tableau.weights(), &[1.0 / 6.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 6.0]);
        assert_eq!(tableau.nodes(), vec![0.0, 0.5, 0.5, 1.0]);
    }

    #[test]
    fn single_precision_rk4() {
        let tableau = ButcherTableau::<f32>::rk4();
        assert_eq!(tableau.weights()[0], 1.0f32 / 6.0f32);
        assert_eq!(tableau.stages(), 4);
    }
}
