use ajd_linalg::decompose::{condition_number, congruence, solve_checked};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use faer::Mat;

fn spd(n: usize) -> Mat<f64> {
    Mat::from_fn(n, n, |i, j| {
        if i == j {
            n as f64 + 1.0
        } else {
            1.0 / (1.0 + (i as f64 - j as f64).abs())
        }
    })
}

fn bench_congruence(c: &mut Criterion) {
    let mut group = c.benchmark_group("congruence");
    for &n in &[4, 16, 64] {
        let r = spd(n);
        let v = Mat::from_fn(n, n, |i, j| ((i * n + j) as f64).sin());
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                let _ = std::hint::black_box(congruence(v.as_ref(), r.as_ref()));
            })
        });
    }
    group.finish();
}

fn bench_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("solve_checked");
    for &n in &[4, 16, 64] {
        let a = spd(n);
        let rhs = Mat::from_fn(n, n, |i, j| (i + j) as f64);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                let _ = std::hint::black_box(solve_checked(a.as_ref(), rhs.as_ref(), 1e12));
            })
        });
    }
    group.finish();
}

fn bench_condition_number(c: &mut Criterion) {
    let mut group = c.benchmark_group("condition_number");
    for &n in &[4, 16, 64] {
        let a = spd(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| std::hint::black_box(condition_number(a.as_ref())))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_congruence, bench_solve, bench_condition_number);
criterion_main!(benches);
