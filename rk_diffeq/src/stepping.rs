use num_traits::NumCast;

use crate::{Real, RungeKuttaErrors};

/// Fixed-step control configuration.
///
/// The requested step `dt` only sets the resolution: the number of steps is
/// `round((tf - t0) / dt)` and every step uses `dt_eff = (tf - t0) / num_steps`,
/// so the last step lands on `tf`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedStepControl<T> {
    pub t0: T,
    pub tf: T,
    /// Requested step size.
    pub dt: T,
    /// Step size used for stepping.
    pub dt_eff: T,
    pub num_steps: usize,
}

impl<T: Real> FixedStepControl<T> {
    /// Derives the step plan for `tspan = (t0, tf)` and a requested step `dt`.
    ///
    /// Fails with `InvalidStepSize` if `dt` is not a positive finite number or
    /// if the interval yields no forward steps.
    pub fn new(tspan: (T, T), dt: T) -> Result<Self, RungeKuttaErrors> {
        if !dt.is_finite() || dt <= T::zero() {
            return Err(RungeKuttaErrors::InvalidStepSize(format!(
                "step size must be positive and finite (got {dt:?})"
            )));
        }
        let (t0, tf) = tspan;
        let total = tf - t0;
        let num_steps = (total / dt)
            .round()
            .to_usize()
            .filter(|&n| n > 0)
            .ok_or_else(|| {
                RungeKuttaErrors::InvalidStepSize(format!(
                    "interval ({t0:?}, {tf:?}) with step {dt:?} gives no forward steps"
                ))
            })?;
        let steps: T = <T as NumCast>::from(num_steps).ok_or_else(|| {
            RungeKuttaErrors::InvalidStepSize(format!(
                "step count {num_steps} is not representable"
            ))
        })?;

        Ok(Self {
            t0,
            tf,
            dt,
            dt_eff: total / steps,
            num_steps,
        })
    }

    /// Time of trajectory entry `n`. Entry `num_steps` is exactly `tf`.
    pub fn time(&self, n: usize) -> T {
        if n >= self.num_steps {
            return self.tf;
        }
        <T as NumCast>::from(n).map_or(self.tf, |n: T| self.t0 + self.dt_eff * n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn unit_interval_tenth_gives_ten_steps() {
        let control = FixedStepControl::new((0.0, 1.0), 0.1).unwrap();
        assert_eq!(control.num_steps, 10);
        assert_relative_eq!(control.dt_eff, 0.1, epsilon = 1e-15);
        assert_eq!(control.time(10), 1.0);
    }

    #[test]
    fn non_dividing_step_is_rounded() {
        // 1.0 / 0.3 = 3.33.. -> 3 steps of 1/3
        let control = FixedStepControl::new((0.0, 1.0), 0.3).unwrap();
        assert_eq!(control.num_steps, 3);
        assert_relative_eq!(control.dt_eff, 1.0 / 3.0, epsilon = 1e-15);
        assert_eq!(control.time(control.num_steps), 1.0);
    }

    #[test]
    fn effective_step_covers_interval() {
        let cases: [((f64, f64), f64); 3] =
            [((0.0, 5.0), 0.0625), ((-1.0, 0.0), 1.0 / 1600.0), ((2.0, 3.7), 0.01)];
        for (tspan, dt) in cases {
            let control = FixedStepControl::new(tspan, dt).unwrap();
            assert_eq!(control.num_steps, ((tspan.1 - tspan.0) / dt).round() as usize);
            assert_relative_eq!(
                control.num_steps as f64 * control.dt_eff,
                tspan.1 - tspan.0,
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn rejects_non_positive_step() {
        for dt in [0.0, -0.1, f64::NAN, f64::INFINITY] {
            let err = FixedStepControl::new((0.0, 1.0), dt).unwrap_err();
            assert!(matches!(err, RungeKuttaErrors::InvalidStepSize(_)));
        }
    }

    #[test]
    fn rejects_empty_or_reversed_interval() {
        for tspan in [(1.0, 1.0), (1.0, 0.0), (0.0, 0.04)] {
            let err = FixedStepControl::new(tspan, 0.1).unwrap_err();
            assert!(matches!(err, RungeKuttaErrors::InvalidStepSize(_)));
        }
    }

    #[test]
    fn intermediate_times_are_not_accumulated() {
        let control = FixedStepControl::new((0.0f32, 1.0f32), 0.001).unwrap();
        assert_eq!(control.num_steps, 1000);
        assert_eq!(control.time(0), 0.0);
        assert_eq!(control.time(500), 500.0 * control.dt_eff);
        assert_eq!(control.time(1000), 1.0);
    }
}
