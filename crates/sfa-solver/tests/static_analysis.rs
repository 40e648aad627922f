//! Linear static analysis against closed-form and residual checks.

use approx::assert_relative_eq;
use nalgebra::{DMatrix, DVector};
use sfa_model::{AssembledModel, DofId, LoadHistory, Model, ModelBuilder, spmv};
use sfa_solver::{AnalysisError, StaticSolver};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Fixed-free bar of `n` equal elements, axial stiffness `ea`, length 1
fn bar(n: usize, ea: f64) -> ModelBuilder {
    let k = ea * n as f64;
    let mut stiffness = DMatrix::zeros(n + 1, n + 1);
    for e in 0..n {
        stiffness[(e, e)] += k;
        stiffness[(e + 1, e + 1)] += k;
        stiffness[(e, e + 1)] -= k;
        stiffness[(e + 1, e)] -= k;
    }

    let mut builder = AssembledModel::builder();
    builder.add_restrained_dof(DofId::new(1, 1)).unwrap();
    for node in 2..=(n + 1) {
        builder.add_dof(DofId::new(node as i32, 1)).unwrap();
    }
    builder
        .set_stiffness_dense(&stiffness)
        .set_mass_dense(&DMatrix::identity(n + 1, n + 1));
    builder
}

#[test]
fn test_bar_tip_load_linear_profile() {
    init_logging();
    let (n, ea, p) = (8, 2.0e7, 1.0e3);
    let mut builder = bar(n, ea);
    builder
        .add_load(DofId::new(n as i32 + 1, 1), LoadHistory::constant(p))
        .unwrap();
    let model = builder.build().unwrap();

    let results = StaticSolver::new(&model).submit().unwrap();

    // u(x) = P x / EA
    for i in 0..=n {
        let x = i as f64 / n as f64;
        assert_relative_eq!(results.displacement[i], p * x / ea, epsilon = 1e-14);
    }
    assert!(results.residual_norm.unwrap() < 1e-8);
}

#[test]
fn test_interleaved_supports_satisfy_reduced_equation() {
    // 5 springs in a row, dofs 1 and 3 restrained
    let stiffness = DMatrix::from_row_slice(
        5,
        5,
        &[
            3.0, -1.0, 0.0, 0.0, 0.0, //
            -1.0, 4.0, -2.0, 0.0, 0.0, //
            0.0, -2.0, 5.0, -1.0, 0.0, //
            0.0, 0.0, -1.0, 3.0, -1.0, //
            0.0, 0.0, 0.0, -1.0, 2.0,
        ],
    );
    let mut builder = AssembledModel::builder();
    for node in 1..=5 {
        let id = DofId::new(node, 0);
        if node == 2 || node == 4 {
            builder.add_restrained_dof(id).unwrap();
        } else {
            builder.add_dof(id).unwrap();
        }
    }
    builder
        .set_stiffness_dense(&stiffness)
        .set_mass_dense(&DMatrix::identity(5, 5));
    builder
        .add_load(DofId::new(1, 0), LoadHistory::constant(2.0))
        .unwrap()
        .add_load(DofId::new(3, 0), LoadHistory::constant(-1.0))
        .unwrap()
        .add_load(DofId::new(5, 0), LoadHistory::constant(4.0))
        .unwrap();
    let model = builder.build().unwrap();

    let results = StaticSolver::new(&model).submit().unwrap();
    let u = &results.displacement;

    assert_eq!(u[1], 0.0);
    assert_eq!(u[3], 0.0);

    let free = model.free_indices();
    let kff = model.free_stiffness();
    let uf = DVector::from_iterator(free.len(), free.iter().map(|&i| u[i]));
    let ff = DVector::from_vec(vec![2.0, -1.0, 4.0]);
    assert_relative_eq!(spmv(&kff, &uf), ff, epsilon = 1e-12);

    // Decoupled by the supports: u = F / Kii
    assert_relative_eq!(u[0], 2.0 / 3.0, epsilon = 1e-14);
    assert_relative_eq!(u[2], -1.0 / 5.0, epsilon = 1e-14);
    assert_relative_eq!(u[4], 2.0, epsilon = 1e-14);
}

#[test]
fn test_static_uses_fully_applied_load() {
    let mut builder = bar(2, 1.0);
    builder
        .add_load(
            DofId::new(3, 1),
            LoadHistory::new(vec![0.0, 0.5, 1.0], vec![0.0, 4.0, 10.0]).unwrap(),
        )
        .unwrap();
    let model = builder.build().unwrap();

    let results = StaticSolver::new(&model).submit().unwrap();
    // Tip of a unit-EA bar under the final magnitude 10
    assert_relative_eq!(results.displacement_at(2).unwrap(), 10.0, epsilon = 1e-12);
}

#[test]
fn test_unsupported_model_fails_loudly() {
    let stiffness = DMatrix::from_row_slice(2, 2, &[1.0, -1.0, -1.0, 1.0]);
    let mut builder = AssembledModel::builder();
    builder.add_dof(DofId::new(1, 0)).unwrap();
    builder.add_dof(DofId::new(2, 0)).unwrap();
    builder
        .set_stiffness_dense(&stiffness)
        .set_mass_dense(&DMatrix::identity(2, 2));
    let model = builder.build().unwrap();

    match StaticSolver::new(&model).submit() {
        Err(AnalysisError::NumericalFailure(message)) => {
            assert!(message.contains("singular"), "{}", message)
        }
        other => panic!("expected numerical failure, got {:?}", other),
    }
}
