use ajd_uwedge::{coefficient_matrix, diagonalize_all, uwedge, UwedgeParams};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use faer::Mat;
use rand::{rngs::StdRng, Rng, SeedableRng};

fn joint_set(dim: usize, num_matrices: usize) -> Vec<Mat<f64>> {
    let mut rng = StdRng::seed_from_u64(0);
    let values = (0..dim * dim)
        .map(|_| rng.random_range(-1.0..1.0))
        .collect::<Vec<f64>>();
    let mixing = Mat::from_fn(dim, dim, |i, j| {
        values[i * dim + j] + if i == j { 2.0 } else { 0.0 }
    });

    (0..num_matrices)
        .map(|_| {
            let r = (0..dim)
                .map(|_| rng.random_range(0.5..2.0))
                .collect::<Vec<f64>>();
            Mat::from_fn(dim, dim, |i, j| {
                (0..dim)
                    .map(|k| mixing[(i, k)] * r[k] * mixing[(j, k)])
                    .sum::<f64>()
            })
        })
        .collect()
}

fn bench_coefficient_matrix(c: &mut Criterion) {
    let mut group = c.benchmark_group("coefficient_matrix");
    for &dim in &[5, 10, 20] {
        let matrices = joint_set(dim, 20);
        let v = Mat::<f64>::identity(dim, dim);
        let rs = diagonalize_all(v.as_ref(), &matrices).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(dim), &dim, |b, _| {
            b.iter(|| std::hint::black_box(coefficient_matrix(&rs, f64::EPSILON)))
        });
    }
    group.finish();
}

fn bench_uwedge(c: &mut Criterion) {
    let mut group = c.benchmark_group("uwedge");
    for &dim in &[5, 10, 20] {
        let matrices = joint_set(dim, 20);
        let params = UwedgeParams {
            max_iter: 100,
            ..Default::default()
        };
        group.bench_with_input(BenchmarkId::from_parameter(dim), &dim, |b, _| {
            b.iter(|| std::hint::black_box(uwedge(&matrices, &params)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_coefficient_matrix, bench_uwedge);
criterion_main!(benches);
