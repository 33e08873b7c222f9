use chromaseg::PixelGrid;
use criterion::{
	black_box, criterion_group, criterion_main, measurement::WallTime, BenchmarkGroup, BenchmarkId, Criterion,
	SamplingMode,
};
use image::{Rgb, RgbImage};
use std::time::Duration;

/// Smooth gradients with a few hard edges, so that clusters are neither trivial nor pure noise
fn synthetic_image(width: u32, height: u32) -> PixelGrid {
	let image = RgbImage::from_fn(width, height, |x, y| {
		let r = (x * 255 / width) as u8;
		let g = (y * 255 / height) as u8;
		let b = if (x / 64 + y / 64) % 2 == 0 { 40 } else { 220 };
		Rgb([r, g, b.max(r / 2)])
	});
	PixelGrid::from_rgb_image(&image)
}

fn images() -> Vec<(String, PixelGrid)> {
	[(480, 270), (1280, 720), (1920, 1080)]
		.into_iter()
		.map(|(width, height)| (format!("{width}x{height}"), synthetic_image(width, height)))
		.collect()
}

fn create_group<'a>(c: &'a mut Criterion, name: &'a str) -> BenchmarkGroup<'a, WallTime> {
	let mut group = c.benchmark_group(name);
	group
		.sample_size(30)
		.noise_threshold(0.05)
		.sampling_mode(SamplingMode::Flat)
		.warm_up_time(Duration::from_millis(500));
	group
}

fn preprocessing(c: &mut Criterion) {
	let mut group = create_group(c, "preprocessing");

	for (name, grid) in images() {
		group.bench_with_input(BenchmarkId::from_parameter(name), &grid, |b, grid| {
			b.iter(|| chromaseg::vectorize(black_box(grid)).expect("non-empty image"));
		});
	}
}

fn kmeans(c: &mut Criterion) {
	let mut group = create_group(c, "kmeans");

	let vectors = images()
		.into_iter()
		.map(|(name, grid)| (name, chromaseg::vectorize(&grid).expect("non-empty image")))
		.collect::<Vec<_>>();

	fn bench(
		name: &str,
		group: &mut BenchmarkGroup<WallTime>,
		vectors: &[(String, chromaseg::PixelVectorSet)],
		k: usize,
		tolerance: f64,
	) {
		for (size, vectors) in vectors {
			group.bench_with_input(BenchmarkId::new(name, size), vectors, |b, vectors| {
				b.iter(|| {
					chromaseg::cluster(vectors, black_box(k), black_box(100), black_box(tolerance), black_box(42))
						.expect("valid arguments")
				});
			});
		}
	}

	group.measurement_time(Duration::from_secs(4));
	bench("default", &mut group, &vectors, 4, 1e-4);
	bench("high k", &mut group, &vectors, 10, 1e-4);
	bench("high tolerance", &mut group, &vectors, 4, 0.5);
}

fn all_steps(c: &mut Criterion) {
	let mut group = create_group(c, "segment");
	group.measurement_time(Duration::from_secs(8));

	for (name, grid) in images() {
		group.bench_with_input(BenchmarkId::from_parameter(name), &grid, |b, grid| {
			b.iter(|| {
				chromaseg::segment(
					grid,
					black_box(chromaseg::DEFAULT_K),
					black_box(chromaseg::DEFAULT_MAX_ITER),
					black_box(chromaseg::DEFAULT_TOLERANCE),
					black_box(chromaseg::DEFAULT_SEED),
				)
				.expect("valid arguments")
			});
		});
	}
}

criterion_group!(benches, preprocessing, kmeans, all_steps);
criterion_main!(benches);
