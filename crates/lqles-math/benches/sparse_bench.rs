use criterion::{criterion_group, criterion_main, Criterion};
use lqles_math::grid::{Grid, Step};
use lqles_math::permutation::Permutation;
use lqles_math::sparse::{from_rows, CsrMatrix, CsrOps};
use std::hint::black_box;

/// 5-point periodic stencil on an n×n grid.
fn stencil_2d(n: usize) -> CsrMatrix {
    let grid = Grid::new(&[n, n]).unwrap();
    let rows = grid
        .nodes()
        .map(|ijk| {
            let mut row = vec![(grid.flatten(ijk), 4.0)];
            for axis in 0..2 {
                for step in [Step::Backward, Step::Forward] {
                    if let Some(nb) = grid.neighbor(ijk, axis, step, true) {
                        row.push((nb, -1.0));
                    }
                }
            }
            row
        })
        .collect();
    from_rows(grid.len(), rows).unwrap()
}

fn bench_mul_vec(c: &mut Criterion) {
    let a = stencil_2d(128);
    let x: Vec<f64> = (0..a.ncols()).map(|i| (i as f64 * 0.01).sin()).collect();

    c.bench_function("csr_mul_vec_128x128", |b| b.iter(|| black_box(a.mul_vec(&x))));
}

fn bench_permuted(c: &mut Criterion) {
    let a = stencil_2d(64);
    let n = a.nrows();
    let perm = Permutation::from_mapping((0..n).rev().collect()).unwrap();

    let mut group = c.benchmark_group("permute_64x64");
    group.sample_size(20);

    group.bench_function("relabel", |b| b.iter(|| black_box(a.permuted(&perm).unwrap())));

    group.bench_function("explicit_paq", |b| {
        let p = perm.p_matrix();
        let q = perm.q_matrix();
        b.iter(|| black_box(&(&p * &a) * &q))
    });

    group.finish();
}

criterion_group!(benches, bench_mul_vec, bench_permuted);
criterion_main!(benches);
