use criterion::{black_box, criterion_group, criterion_main, Criterion};
use facelog_faceid::{Gallery, Identity, Matcher, Role};

fn random_unit_vec(dim: usize, seed: u64) -> Vec<f32> {
    let mut v = Vec::with_capacity(dim);
    let mut state = seed;
    for _ in 0..dim {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
        v.push(((state >> 33) as f32) / (u32::MAX as f32) - 0.5);
    }
    let norm: f64 = v.iter().map(|&x| (x as f64) * (x as f64)).sum::<f64>().sqrt();
    if norm > 0.0 {
        let s = (1.0 / norm) as f32;
        for x in &mut v {
            *x *= s;
        }
    }
    v
}

fn gallery(dim: usize, n: usize) -> Gallery {
    let mut g = Gallery::new(dim);
    for i in 0..n {
        let id = Identity::new(format!("person{i:04}"), Role::Student).unwrap();
        g.insert(id, random_unit_vec(dim, i as u64 + 1)).unwrap();
    }
    g
}

fn bench_identify(c: &mut Criterion) {
    let dim = 512;
    let m = Matcher::default();
    let probe = random_unit_vec(dim, 999_999);

    for n in [100, 1000] {
        let g = gallery(dim, n);
        c.bench_function(&format!("faceid_identify_512d_{n}ids"), |b| {
            b.iter(|| {
                let _ = black_box(m.identify(black_box(&probe), &g));
            });
        });
    }
}

criterion_group!(benches, bench_identify);
criterion_main!(benches);
