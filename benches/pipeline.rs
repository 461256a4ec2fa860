use criterion::{criterion_group, criterion_main, BatchSize, Criterion, black_box};

use facet::assets::builtin;
use facet::decal::{DecalTarget, project};
use facet::material::dissolve_noise;
use facet::scene::normalize;
use facet::selection::StickerTransform;

fn bench_normalize_sphere(c: &mut Criterion) {
    c.bench_function("normalize_sphere", |b| {
        b.iter_batched(
            || builtin::model("sphere"),
            |graph| graph.map(|mut graph| normalize(black_box(&mut graph), 2.4)),
            BatchSize::SmallInput,
        );
    });
}

fn bench_decal_sphere(c: &mut Criterion) {
    let Some(mut sphere) = builtin::model("sphere") else {
        return;
    };
    normalize(&mut sphere, 2.4);
    let Some(target) = DecalTarget::find(&sphere) else {
        return;
    };
    let Some(primitive) = target.primitive(&sphere) else {
        return;
    };
    let transform = StickerTransform::default();

    c.bench_function("decal_project_sphere", |b| {
        b.iter(|| project(black_box(primitive), target.instance.world, black_box(&transform)));
    });
}

fn bench_dissolve_noise_64(c: &mut Criterion) {
    c.bench_function("dissolve_noise_64", |b| {
        b.iter(|| dissolve_noise(black_box(64), 7));
    });
}

criterion_group!(
    benches,
    bench_normalize_sphere,
    bench_decal_sphere,
    bench_dissolve_noise_64,
);
criterion_main!(benches);
