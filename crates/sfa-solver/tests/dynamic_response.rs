//! Transient response by modal superposition.
//!
//! Test cases:
//! 1. Single-dof oscillator under a step load against (P/k)(1 - cos 2πft)
//! 2. Increment capped at a tenth of the shortest retained period
//! 3. Truncation to ten modes on a larger chain
//! 4. Rayleigh damping ratios and decay to the static solution
//! 5. Ramp loads interpolated onto the time grid

use std::f64::consts::PI;

use approx::assert_relative_eq;
use nalgebra::DMatrix;
use sfa_model::{AssembledModel, DofId, LoadHistory, RayleighDamping};
use sfa_solver::{DynamicSolver, MODE_TRUNCATION};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Mass `m` on a spring `k` attached to a restrained base
fn oscillator(k: f64, m: f64, load: LoadHistory, damping: RayleighDamping) -> AssembledModel {
    let mut builder = AssembledModel::builder();
    builder.add_restrained_dof(DofId::new(1, 0)).unwrap();
    builder.add_dof(DofId::new(2, 0)).unwrap();
    builder
        .set_stiffness_dense(&DMatrix::from_row_slice(2, 2, &[k, -k, -k, k]))
        .set_mass_dense(&DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, m]))
        .set_damping(damping);
    builder.add_load(DofId::new(2, 0), load).unwrap();
    builder.build().unwrap()
}

/// Fixed-free chain of `n` unit springs and unit masses, tip loaded
fn chain(n: usize, load: LoadHistory) -> AssembledModel {
    let mut stiffness = DMatrix::zeros(n + 1, n + 1);
    for e in 0..n {
        stiffness[(e, e)] += 1.0;
        stiffness[(e + 1, e + 1)] += 1.0;
        stiffness[(e, e + 1)] -= 1.0;
        stiffness[(e + 1, e)] -= 1.0;
    }
    let mut builder = AssembledModel::builder();
    builder.add_restrained_dof(DofId::new(0, 0)).unwrap();
    for node in 1..=n {
        builder.add_dof(DofId::new(node as i32, 0)).unwrap();
    }
    builder
        .set_stiffness_dense(&stiffness)
        .set_mass_dense(&DMatrix::identity(n + 1, n + 1));
    builder.add_load(DofId::new(n as i32, 0), load).unwrap();
    builder.build().unwrap()
}

#[test]
fn test_undamped_step_response() {
    init_logging();
    let (m, f, p) = (2.0, 1.5, 10.0);
    let k = m * (2.0 * PI * f).powi(2);
    let model = oscillator(k, m, LoadHistory::constant(p), RayleighDamping::default());

    let mut solver = DynamicSolver::new(&model);
    solver
        .set_time_period(2.0)
        .unwrap()
        .set_increment_size(0.001)
        .unwrap();
    let results = solver.submit().unwrap();

    assert_eq!(results.frequencies.len(), 1);
    assert_relative_eq!(results.frequencies[0], f, max_relative = 1e-10);
    assert_relative_eq!(results.increment, 0.001);
    assert_eq!(results.num_steps(), 2001);
    assert_eq!(results.displacement.shape(), (1, 2001));

    // Physical displacement of the mass from the modal coordinate
    let phi = results.modes[(1, 0)];
    let static_u = p / k;
    let mut worst: f64 = 0.0;
    for (j, &t) in results.time.iter().enumerate() {
        let u = phi * results.displacement[(0, j)];
        let exact = static_u * (1.0 - (2.0 * PI * f * t).cos());
        worst = worst.max((u - exact).abs() / static_u);
    }
    println!("Step response: worst relative error {:.2e}", worst);
    assert!(worst < 1e-3, "worst relative error {:.2e}", worst);
}

#[test]
fn test_increment_reduced_for_highest_mode() {
    let (m, f) = (1.0, 4.0);
    let k = m * (2.0 * PI * f).powi(2);
    let model = oscillator(k, m, LoadHistory::constant(1.0), RayleighDamping::default());

    let mut solver = DynamicSolver::new(&model);
    solver
        .set_time_period(1.0)
        .unwrap()
        .set_increment_size(0.5)
        .unwrap();
    let results = solver.submit().unwrap();

    let limit = 0.1 / results.frequencies[0];
    assert!(results.increment <= limit * (1.0 + 1e-12));
    assert!(results.increment < 0.5);
    for pair in results.time.windows(2) {
        assert!(pair[1] - pair[0] <= limit * (1.0 + 1e-9));
    }
    assert!(*results.time.last().unwrap() >= 1.0 - 1e-12);
}

#[test]
fn test_truncates_to_lowest_ten_modes() {
    let n = 15;
    let model = chain(n, LoadHistory::constant(1.0));

    let mut solver = DynamicSolver::new(&model);
    solver
        .set_time_period(1.0)
        .unwrap()
        .set_increment_size(0.01)
        .unwrap();
    let results = solver.submit().unwrap();

    assert_eq!(results.frequencies.len(), MODE_TRUNCATION);
    assert_eq!(results.modes.shape(), (n + 1, MODE_TRUNCATION));
    assert_eq!(results.displacement.nrows(), MODE_TRUNCATION);
    assert!(results.modes.row(0).iter().all(|&v| v == 0.0));
    assert!(results.frequencies.windows(2).all(|w| w[0] <= w[1]));

    // Lowest mode of the chain: ω = 2 sin(π / (2(2n + 1)))
    let omega = 2.0 * (PI / (2.0 * (2 * n + 1) as f64)).sin();
    assert_relative_eq!(results.frequencies[0], omega / (2.0 * PI), max_relative = 1e-9);
}

#[test]
fn test_small_model_keeps_all_modes() {
    let model = chain(3, LoadHistory::constant(1.0));
    let results = DynamicSolver::new(&model).submit().unwrap();
    assert_eq!(results.frequencies.len(), 3);
    assert_eq!(results.velocity.nrows(), 3);
    assert_eq!(results.acceleration.nrows(), 3);
}

#[test]
fn test_rayleigh_damping_decays_to_static() {
    let (m, f, p) = (1.0, 2.0, 5.0);
    let k = m * (2.0 * PI * f).powi(2);
    let damping = RayleighDamping::new(0.5, 0.002);
    let model = oscillator(k, m, LoadHistory::constant(p), damping);

    let mut solver = DynamicSolver::new(&model);
    solver
        .set_time_period(30.0)
        .unwrap()
        .set_increment_size(0.005)
        .unwrap();
    let results = solver.submit().unwrap();

    let zeta = 0.5 / (4.0 * PI * f) + 0.002 * PI * f;
    assert_relative_eq!(results.damping_ratios[0], zeta, max_relative = 1e-9);

    let last = results.displacement_at(results.num_steps() - 1).unwrap();
    let u = results.modes[(1, 0)] * last[0];
    assert_relative_eq!(u, p / k, max_relative = 1e-3);
}

#[test]
fn test_ramp_load_interpolated_on_grid() {
    // Quasi-static ramp on a stiff oscillator follows F(t)/k
    let (m, f) = (1.0, 20.0);
    let k = m * (2.0 * PI * f).powi(2);
    let ramp = LoadHistory::new(vec![0.0, 10.0], vec![0.0, 10.0]).unwrap();
    let model = oscillator(k, m, ramp, RayleighDamping::new(10.0, 0.0));

    let mut solver = DynamicSolver::new(&model);
    solver
        .set_time_period(5.0)
        .unwrap()
        .set_increment_size(0.001)
        .unwrap();
    let results = solver.submit().unwrap();

    let phi = results.modes[(1, 0)];
    let last = results.num_steps() - 1;
    let t = results.time[last];
    assert_relative_eq!(phi * results.displacement[(0, last)], t / k, max_relative = 1e-2);
}

#[test]
fn test_load_on_support_produces_no_motion() {
    let mut builder = AssembledModel::builder();
    builder.add_restrained_dof(DofId::new(1, 0)).unwrap();
    builder.add_dof(DofId::new(2, 0)).unwrap();
    builder.add_dof(DofId::new(3, 0)).unwrap();
    builder
        .set_stiffness_dense(&DMatrix::from_row_slice(
            3,
            3,
            &[2.0, -2.0, 0.0, -2.0, 3.0, -1.0, 0.0, -1.0, 1.0],
        ))
        .set_mass_dense(&DMatrix::identity(3, 3));
    builder
        .add_load(DofId::new(1, 0), LoadHistory::constant(100.0))
        .unwrap();
    let model = builder.build().unwrap();

    let results = DynamicSolver::new(&model).submit().unwrap();
    assert!(results.displacement.iter().all(|&q| q == 0.0));
    assert!(results.acceleration.iter().all(|&q| q == 0.0));
}
