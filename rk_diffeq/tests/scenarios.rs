use rk_diffeq::{ButcherTableau, RungeKutta, TimeAugmented, solve_sweep};

fn classical_rk4() -> (Vec<Vec<f64>>, Vec<f64>) {
    let a = vec![
        vec![0.0, 0.0, 0.0, 0.0],
        vec![0.5, 0.0, 0.0, 0.0],
        vec![0.0, 0.5, 0.0, 0.0],
        vec![0.0, 0.0, 1.0, 0.0],
    ];
    let b = vec![1.0 / 6.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 6.0];
    (a, b)
}

#[test]
fn logistic_rk4_error_is_small() {
    let (g, k, y0) = (2.0, 1.0, 0.1);
    let mut logistic = |y: &[f64], dy: &mut Vec<f64>| dy.push(g * y[0] * (1.0 - y[0] / k));
    let exact = |t: f64| k / (1.0 + ((k - y0) / y0) * (-g * t).exp());

    let (a, b) = classical_rk4();
    let result = rk_diffeq::integrate(&mut logistic, &[y0], (0.0, 5.0), 0.0625, &a, &b).unwrap();
    assert_eq!(result.len(), 81);

    let values = result.scalar_values().unwrap();
    let max_error = result
        .times()
        .iter()
        .zip(values)
        .map(|(&t, &y)| (y - exact(t)).abs())
        .fold(0.0, f64::max);
    assert!(max_error < 1e-4, "max error {max_error}");
}

#[test]
fn rk4_linear_decay_is_fourth_order() {
    let rate = 2.0;
    let model = move |y: &[f64], dy: &mut Vec<f64>| dy.push(-rate * y[0]);
    let steps = [0.1, 0.05, 0.025, 0.0125];
    let results = solve_sweep(&model, &[1.0], (0.0, 2.0), &steps, &ButcherTableau::rk4());

    let errors: Vec<f64> = results
        .into_iter()
        .map(|result| {
            let result = result.unwrap();
            result
                .iter()
                .map(|(t, y)| (y[0] - (-rate * t).exp()).abs())
                .fold(0.0, f64::max)
        })
        .collect();

    for (pair, h) in errors.windows(2).zip(steps.windows(2)) {
        let order = (pair[0] / pair[1]).ln() / (h[0] / h[1]).ln();
        assert!((order - 4.0).abs() < 0.2, "order {order}");
    }
}

#[test]
fn euler_matches_unrolled_recurrence_bit_for_bit() {
    fn rhs(t: f64, y: f64) -> f64 {
        -200.0 * t * y * y
    }
    let (a, b, y0, n) = (-1.0, 0.0, 1.0 / 101.0, 1600);

    let mut model = TimeAugmented::new(|t: f64, y: &[f64], dy: &mut Vec<f64>| dy.push(rhs(t, y[0])));
    let x0 = TimeAugmented::<()>::initial_state(a, &[y0]);
    let result = RungeKutta::new(ButcherTableau::euler())
        .solve_fixed(&mut model, &x0, (a, b), (b - a) / n as f64)
        .unwrap();
    assert_eq!(result.len(), n + 1);

    let h = (b - a) / n as f64;
    let (mut t, mut y) = (a, y0);
    for state in result.states().skip(1) {
        y = y + h * rhs(t, y);
        t = t + h;
        assert_eq!(state[0].to_bits(), t.to_bits());
        assert_eq!(state[1].to_bits(), y.to_bits());
    }
    // first order method, still near the exact endpoint y(0) = 1
    assert!((y - 1.0).abs() < 0.15);
}

#[test]
fn euler_single_precision_matches_recurrence() {
    fn rhs(t: f32, y: f32) -> f32 {
        -200.0 * t * y * y
    }
    let (a, b, y0, n) = (-1.0f32, 0.0f32, 1.0f32 / 101.0, 400);

    let mut model = TimeAugmented::new(|t: f32, y: &[f32], dy: &mut Vec<f32>| dy.push(rhs(t, y[0])));
    let x0 = TimeAugmented::<()>::initial_state(a, &[y0]);
    let result = RungeKutta::new(ButcherTableau::euler())
        .solve_fixed(&mut model, &x0, (a, b), (b - a) / n as f32)
        .unwrap();

    let h = (b - a) / n as f32;
    let (mut t, mut y) = (a, y0);
    for _ in 0..n {
        y = y + h * rhs(t, y);
        t = t + h;
    }
    let (_, last) = result.last().unwrap();
    assert_eq!(last[1].to_bits(), y.to_bits());
}

#[test]
fn van_der_pol_keeps_dimension_and_endpoint() {
    let mu = 10.0;
    let mut model = |y: &[f64], dy: &mut Vec<f64>| {
        dy.extend([y[1], mu * (1.0 - y[0] * y[0]) * y[1] - y[0]]);
    };
    let result = RungeKutta::new(ButcherTableau::rk4())
        .solve_fixed(&mut model, &[0.0, 1.0], (0.0, 20.0), 0.0625)
        .unwrap();
    assert_eq!(result.dim(), 2);
    assert_eq!(result.len(), 321);
    assert_eq!(result.last().unwrap().0, 20.0);
    // the limit cycle of the oscillator stays bounded
    assert!(result.states().all(|y| y[0].abs() < 3.0));
}
