use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

use pano_geometry::{compute_homography, project_point, ransac_homography, RansacParams};

#[rustfmt::skip]
const H: [[f64; 3]; 3] = [
    [0.98, 0.03, 120.0],
    [-0.02, 1.01, -6.0],
    [5e-5, 2e-5, 1.0],
];

fn make_points(n: usize) -> (Vec<[f64; 2]>, Vec<[f64; 2]>) {
    let x1 = (0..n)
        .map(|i| [((i * 193) % 640) as f64, ((i * 71) % 480) as f64])
        .collect::<Vec<_>>();
    let x2 = x1
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let q = project_point(&H, p);
            // every fifth point is an outlier
            if i % 5 == 0 {
                [q[0] + 80.0, q[1] + 40.0]
            } else {
                q
            }
        })
        .collect::<Vec<_>>();
    (x1, x2)
}

fn bench_homography(c: &mut Criterion) {
    let mut group = c.benchmark_group("Homography");

    for n in [16, 128, 512].iter() {
        let (x1, x2) = make_points(*n);

        group.bench_with_input(BenchmarkId::new("lstsq", n), &(&x1, &x2), |b, i| {
            b.iter(|| black_box(compute_homography(i.0, i.1)))
        });

        let params = RansacParams {
            max_iterations: 200,
            cutoff: usize::MAX,
            random_seed: Some(0),
            ..Default::default()
        };

        group.bench_with_input(BenchmarkId::new("ransac", n), &(&x1, &x2), |b, i| {
            b.iter(|| black_box(ransac_homography(i.0, i.1, &params)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_homography);
criterion_main!(benches);
