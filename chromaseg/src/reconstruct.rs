//! Rebuilds an image where each pixel takes the color of its cluster

use crate::{grid::area, CentroidSet, ClusterAssignment, InvalidArgument, PixelGrid};

/// Create a `width` by `height` grid where pixel `i` is the rounded centroid of cluster `assignment[i]`.
///
/// # Errors
/// Returns [`InvalidArgument::ShapeMismatch`] if the assignment does not have `width * height` labels,
/// or [`InvalidArgument::LabelOutOfRange`] if a label has no centroid.
pub fn reconstruct(
	assignment: &ClusterAssignment,
	centroids: &CentroidSet,
	width: u32,
	height: u32,
) -> Result<PixelGrid, InvalidArgument> {
	let expected = area(width, height);
	if assignment.len() != expected {
		return Err(InvalidArgument::ShapeMismatch { expected, actual: assignment.len() });
	}
	assignment.check_labels(centroids.len())?;

	let colors = centroids.colors();
	let pixels = assignment.as_slice().iter().map(|&label| colors[label]).collect();
	PixelGrid::new(width, height, pixels)
}

#[cfg(test)]
mod tests {
	use super::*;
	use palette::Srgb;

	#[test]
	fn pixels_take_rounded_centroid_colors() {
		let assignment = ClusterAssignment::new(vec![1, 0, 0, 1, 2, 1]);
		let centroids = CentroidSet::new(vec![[0.2, 10.5, 99.9], [255.0, 128.4, 3.0], [7.0, 7.0, 7.0]]);

		let grid = reconstruct(&assignment, &centroids, 3, 2).expect("matching shapes");

		let a = Srgb::new(0, 11, 100);
		let b = Srgb::new(255, 128, 3);
		let c = Srgb::new(7, 7, 7);
		assert_eq!(grid.width(), 3);
		assert_eq!(grid.height(), 2);
		assert_eq!(grid.pixels(), &[b, a, a, b, c, b]);
	}

	#[test]
	fn length_mismatch_is_rejected() {
		let assignment = ClusterAssignment::new(vec![0; 5]);
		let centroids = CentroidSet::new(vec![[0.0; 3]]);
		assert_eq!(
			reconstruct(&assignment, &centroids, 2, 2),
			Err(InvalidArgument::ShapeMismatch { expected: 4, actual: 5 })
		);
	}

	#[test]
	fn unknown_label_is_rejected() {
		let assignment = ClusterAssignment::new(vec![0, 1, 2, 0]);
		let centroids = CentroidSet::new(vec![[0.0; 3], [1.0; 3]]);
		assert_eq!(
			reconstruct(&assignment, &centroids, 2, 2),
			Err(InvalidArgument::LabelOutOfRange { index: 2, label: 2, k: 2 })
		);
	}
}
