//! Benchmarks for the static, modal and dynamic analyses

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use nalgebra::DMatrix;
use sfa_model::{AssembledModel, DofId, LoadHistory, RayleighDamping};
use sfa_solver::{DynamicSolver, ModalSolver, NewmarkConfig, StaticSolver, integrate_modal};

/// Fixed-free chain of `n` springs with a tip load
fn create_chain_model(n: usize) -> AssembledModel {
    let mut stiffness = DMatrix::zeros(n + 1, n + 1);
    for e in 0..n {
        stiffness[(e, e)] += 1.0e6;
        stiffness[(e + 1, e + 1)] += 1.0e6;
        stiffness[(e, e + 1)] -= 1.0e6;
        stiffness[(e + 1, e)] -= 1.0e6;
    }

    let mut builder = AssembledModel::builder();
    builder.add_restrained_dof(DofId::new(0, 0)).unwrap();
    for node in 1..=n {
        builder.add_dof(DofId::new(node as i32, 0)).unwrap();
    }
    builder
        .set_stiffness_dense(&stiffness)
        .set_mass_dense(&DMatrix::from_diagonal_element(n + 1, n + 1, 2.0))
        .set_damping(RayleighDamping::new(0.1, 1e-4));
    builder
        .add_load(
            DofId::new(n as i32, 0),
            LoadHistory::new(vec![0.0, 0.1, 1.0], vec![0.0, 1.0e3, 1.0e3]).unwrap(),
        )
        .unwrap();
    builder.build().unwrap()
}

fn benchmark_static(c: &mut Criterion) {
    let model = create_chain_model(200);
    c.bench_function("chain_200_static", |b| {
        b.iter(|| {
            let results = StaticSolver::new(&model).submit().unwrap();
            black_box(results);
        })
    });
}

fn benchmark_modal(c: &mut Criterion) {
    let model = create_chain_model(200);
    c.bench_function("chain_200_modal_10", |b| {
        b.iter(|| {
            let mut solver = ModalSolver::new(&model);
            solver.set_number_of_eigenvalues(10).unwrap();
            black_box(solver.submit().unwrap());
        })
    });
}

fn benchmark_dynamic(c: &mut Criterion) {
    let model = create_chain_model(100);
    c.bench_function("chain_100_dynamic", |b| {
        b.iter(|| {
            let mut solver = DynamicSolver::new(&model);
            solver
                .set_time_period(1.0)
                .unwrap()
                .set_increment_size(1e-3)
                .unwrap();
            black_box(solver.submit().unwrap());
        })
    });
}

fn benchmark_newmark(c: &mut Criterion) {
    let frequencies: Vec<f64> = (1..=10).map(|i| i as f64).collect();
    let damping_ratios = vec![0.02; 10];
    let forces = DMatrix::from_element(10, 10_001, 1.0);
    c.bench_function("newmark_10_modes_10k_steps", |b| {
        b.iter(|| {
            black_box(
                integrate_modal(
                    &NewmarkConfig::linear_acceleration(),
                    &frequencies,
                    &damping_ratios,
                    &forces,
                    1e-3,
                )
                .unwrap(),
            );
        })
    });
}

criterion_group!(
    benches,
    benchmark_static,
    benchmark_modal,
    benchmark_dynamic,
    benchmark_newmark,
);

criterion_main!(benches);
