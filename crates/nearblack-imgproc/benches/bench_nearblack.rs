use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use nearblack_image::{Image, ImageSize};
use nearblack_imgproc::color::TargetColors;
use nearblack_imgproc::nearblack::{collapse_in_place, NearBlackParams};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// A noisy frame surrounded by a dark border of uneven width.
fn create_test_image(width: usize, height: usize, border: usize) -> Image<u8, 3> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut data = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        for x in 0..width {
            let margin = border + rng.random_range(0..border.max(1));
            let dark = x < margin || y < margin || x + margin >= width || y + margin >= height;
            for _ in 0..3 {
                data.push(if dark {
                    rng.random_range(0..10)
                } else {
                    rng.random_range(20..=255)
                });
            }
        }
    }
    Image::new(ImageSize { width, height }, data).unwrap()
}

fn bench_nearblack(c: &mut Criterion) {
    let mut group = c.benchmark_group("NearBlack");

    let (w, h) = (1920, 1080);
    let src = create_test_image(w, h, 32);

    for (name, params) in [
        ("collapse", NearBlackParams::default()),
        (
            "collapse_alpha_mask",
            NearBlackParams::default()
                .with_set_alpha(true)
                .with_set_mask(true),
        ),
    ] {
        group.bench_with_input(
            BenchmarkId::new(name, format!("{}x{}", w, h)),
            &src,
            |b, src| {
                let targets = TargetColors::black(3);
                b.iter(|| {
                    let mut image = src.clone();
                    std::hint::black_box(collapse_in_place(&mut image, &targets, &params).unwrap());
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_nearblack);
criterion_main!(benches);
