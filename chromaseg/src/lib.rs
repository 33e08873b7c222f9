//! Segment an image into its most representative colors using k-means clustering.
//!
//! The pixels of an image are clustered in RGB space,
//! each pixel is then replaced by the average color of its cluster,
//! and the share of the image covered by each cluster is reported.
//!
//! # Examples
//!
//! ## Segment an image file into 4 colors.
//!
//! ```no_run
//! let image = image::open("some image").unwrap();
//! let grid = chromaseg::PixelGrid::from_image(&image);
//! let result = chromaseg::segment(&grid, 4, 100, 1e-4, 42).unwrap();
//!
//! for entry in result.coverage.entries() {
//! 	println!("{:?}: {:.2}%", entry.color, entry.percentage);
//! }
//!
//! result.image.into_rgb_image().save("segmented.png").unwrap();
//! ```
//!
//! ## Run the individual steps.
//!
//! ```no_run
//! # fn main() -> Result<(), chromaseg::InvalidArgument> {
//! # let grid = chromaseg::PixelGrid::from_image(&image::open("some image").unwrap());
//! let vectors = chromaseg::vectorize(&grid)?;
//!
//! let (assignment, centroids) = chromaseg::cluster(&vectors, 6, 100, 1e-4, 42)?.into_parts();
//!
//! let coverage = chromaseg::report(&assignment, &centroids)?;
//! let segmented = chromaseg::reconstruct(&assignment, &centroids, grid.width(), grid.height())?;
//! # Ok(())
//! # }
//! ```
//!
//! # Arguments
//!
//! Here are explanations of the arguments shared between [`segment`] and [`cluster`].
//!
//! ## K
//!
//! This is the number of clusters, i.e. the number of colors in the segmented image.
//!
//! It must be at least `1` and at most the number of pixels.
//! If the image has fewer distinct colors than `k`, some clusters will be empty or duplicates,
//! and empty clusters are left out of the [`CoverageReport`].
//! Values from 2 to 10 are the most useful for segmentation.
//!
//! ## Max Iterations
//!
//! This is the maximum number of k-means iterations.
//! Reaching it is not an error: the clusters found so far are returned.
//! [`DEFAULT_MAX_ITER`] is enough for most images to converge.
//!
//! ## Tolerance
//!
//! k-means stops once no centroid channel moves by more than this amount in one iteration.
//! Channel values are in `0.0..=255.0`, so the default of `1e-4` is well below a visible difference.
//! A tolerance of `0.0` runs until the centroids stop moving entirely.
//!
//! ## Seed
//!
//! This is the value used to seed the random number generator which is used to choose the initial centroids.
//! The same arguments and seed always give the same result, regardless of the number of threads.

#![deny(unsafe_code)]
#![warn(clippy::pedantic, clippy::cargo)]
#![warn(clippy::use_debug, clippy::dbg_macro, clippy::todo, clippy::unimplemented)]
#![warn(clippy::unwrap_used, clippy::unwrap_in_result)]
#![warn(clippy::unneeded_field_pattern, clippy::rest_pat_in_fully_bound_structs)]
#![warn(clippy::unnecessary_self_imports)]
#![warn(clippy::str_to_string, clippy::string_to_string, clippy::string_slice)]
#![warn(missing_docs, clippy::missing_docs_in_private_items, rustdoc::all)]
#![warn(clippy::float_cmp_const, clippy::lossy_float_literal)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::unreadable_literal)]

mod coverage;
mod error;
mod grid;
mod kmeans;
mod reconstruct;
mod vectorize;

pub use coverage::{report, ColorCoverage, CoverageEntry, CoverageReport};
pub use error::InvalidArgument;
pub use grid::PixelGrid;
pub use kmeans::{cluster, CentroidSet, ClusterAssignment, KmeansResult};
pub use reconstruct::reconstruct;
pub use vectorize::{to_srgb, to_vector, vectorize, ColorVector, PixelVectorSet, CHANNELS};

/// The number of clusters offered by default
pub const DEFAULT_K: usize = 4;

/// The default maximum number of k-means iterations
pub const DEFAULT_MAX_ITER: u32 = 100;

/// The default convergence tolerance
pub const DEFAULT_TOLERANCE: f64 = 1e-4;

/// The default seed for choosing the initial centroids
pub const DEFAULT_SEED: u64 = 42;

/// The outputs of [`segment`]
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
	/// The input image with each pixel replaced by its cluster's rounded centroid
	pub image: PixelGrid,
	/// The share of the image covered by each non-empty cluster
	pub coverage: CoverageReport,
	/// Number of elapsed k-means iterations
	pub iterations: u32,
	/// Sum of the squared distances between each pixel and its centroid
	pub variance: f64,
}

/// Segment an image into `k` colors and report the coverage of each.
///
/// This vectorizes the pixels, clusters them with [`cluster`],
/// then runs [`reconstruct`] and [`report`] on the result.
///
/// See the crate documentation for examples and information on each argument.
///
/// # Errors
/// Returns [`InvalidArgument`] if the grid is empty or any argument is out of range.
pub fn segment(
	grid: &PixelGrid,
	k: usize,
	max_iter: u32,
	tolerance: f64,
	seed: u64,
) -> Result<Segmentation, InvalidArgument> {
	let vectors = vectorize(grid)?;
	let KmeansResult { assignment, centroids, iterations, variance } =
		cluster(&vectors, k, max_iter, tolerance, seed)?;

	let image = reconstruct(&assignment, &centroids, grid.width(), grid.height())?;
	let coverage = report(&assignment, &centroids)?;

	Ok(Segmentation { image, coverage, iterations, variance })
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_relative_eq;
	use palette::Srgb;

	fn test_grid() -> PixelGrid {
		let mut pixels = Vec::new();
		for y in 0..12u8 {
			for x in 0..16u8 {
				pixels.push(match (x / 4 + y / 4) % 3 {
					0 => Srgb::new(200 + x, 10, 10 + y),
					1 => Srgb::new(5, 180 + y, 20),
					_ => Srgb::new(x, y, 240),
				});
			}
		}
		PixelGrid::new(16, 12, pixels).expect("valid shape")
	}

	#[test]
	fn black_and_white_image() {
		let (black, white) = (Srgb::new(0, 0, 0), Srgb::new(255, 255, 255));
		let grid = PixelGrid::new(2, 2, vec![black, black, white, white]).expect("valid shape");

		let result = segment(&grid, 2, DEFAULT_MAX_ITER, DEFAULT_TOLERANCE, DEFAULT_SEED).expect("valid arguments");

		assert!(result.iterations <= 2);
		assert_eq!(result.image, grid);

		let entries = result.coverage.entries();
		assert_eq!(entries.len(), 2);
		for color in [black, white] {
			let entry = entries.iter().find(|entry| entry.color == color).expect("color is reported");
			assert_relative_eq!(entry.percentage, 50.0);
		}
	}

	#[test]
	fn single_cluster_covers_everything() {
		let grid = PixelGrid::new(3, 1, vec![Srgb::new(0, 0, 0), Srgb::new(10, 20, 30), Srgb::new(20, 40, 61)])
			.expect("valid shape");

		let result = segment(&grid, 1, DEFAULT_MAX_ITER, DEFAULT_TOLERANCE, DEFAULT_SEED).expect("valid arguments");

		let mean = Srgb::new(10, 20, 30);
		assert_eq!(result.image.pixels(), &[mean; 3]);
		assert_eq!(result.coverage.len(), 1);
		assert_eq!(result.coverage.entries()[0].color, mean);
		assert_relative_eq!(result.coverage.entries()[0].percentage, 100.0);
	}

	#[test]
	fn segmented_pixels_match_their_cluster_color() {
		let grid = test_grid();
		let vectors = vectorize(&grid).expect("non-empty grid");
		let clustering = cluster(&vectors, 5, DEFAULT_MAX_ITER, DEFAULT_TOLERANCE, 1).expect("valid arguments");
		let result = segment(&grid, 5, DEFAULT_MAX_ITER, DEFAULT_TOLERANCE, 1).expect("valid arguments");

		assert_eq!(result.iterations, clustering.iterations);
		assert_eq!(result.image.width(), grid.width());
		assert_eq!(result.image.height(), grid.height());

		let colors = clustering.centroids.colors();
		for (&pixel, &label) in result.image.pixels().iter().zip(clustering.assignment.as_slice()) {
			assert_eq!(pixel, colors[label]);
		}

		let sum = result.coverage.entries().iter().map(|entry| entry.percentage).sum::<f64>();
		assert_relative_eq!(sum, 100.0, max_relative = 1e-6);
		assert!(result.coverage.entries().windows(2).all(|pair| pair[0].cluster < pair[1].cluster));
	}

	#[test]
	fn same_seed_gives_same_segmentation() {
		let grid = test_grid();
		let first = segment(&grid, 6, 20, 0.0, 123).expect("valid arguments");
		let second = segment(&grid, 6, 20, 0.0, 123).expect("valid arguments");
		assert_eq!(first, second);
	}

	#[test]
	fn invalid_arguments_are_surfaced() {
		let empty = PixelGrid::new(0, 3, Vec::new()).expect("valid shape");
		assert_eq!(segment(&empty, 2, 10, 0.0, 0), Err(InvalidArgument::Empty));

		let grid = PixelGrid::new(2, 1, vec![Srgb::new(0, 0, 0), Srgb::new(255, 255, 255)]).expect("valid shape");
		assert_eq!(
			segment(&grid, 3, 10, 0.0, 0),
			Err(InvalidArgument::ClusterCount { k: 3, vectors: 2 })
		);
	}
}
