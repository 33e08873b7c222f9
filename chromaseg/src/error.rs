//! The error type shared by every operation in the crate

use std::fmt::{self, Display};

/// Malformed or out-of-range input given to one of the crate's operations
///
/// This is the only kind of error the crate produces.
/// It is returned unchanged to the caller and is never retried or corrected internally.
#[derive(Debug, Clone, PartialEq)]
pub enum InvalidArgument {
	/// The pixel grid or vector set has no elements
	Empty,
	/// The number of pixels or labels does not match `width * height`
	ShapeMismatch {
		/// The number of elements implied by the dimensions
		expected: usize,
		/// The number of elements actually provided
		actual: usize,
	},
	/// `k` is zero or greater than the number of vectors
	ClusterCount {
		/// The requested number of clusters
		k: usize,
		/// The number of vectors available for clustering
		vectors: usize,
	},
	/// The maximum number of iterations is zero
	MaxIterations,
	/// The tolerance is negative or NaN
	Tolerance(f64),
	/// A color vector contains a NaN or infinite component
	NonFiniteComponent {
		/// Index of the offending vector
		index: usize,
	},
	/// A cluster id in an assignment has no matching centroid
	LabelOutOfRange {
		/// Index of the offending pixel
		index: usize,
		/// The cluster id found at that index
		label: usize,
		/// The number of centroids
		k: usize,
	},
}

impl Display for InvalidArgument {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match *self {
			Self::Empty => write!(f, "no pixels or vectors were provided"),
			Self::ShapeMismatch { expected, actual } => {
				write!(f, "expected {expected} elements for the grid dimensions, but got {actual}")
			},
			Self::ClusterCount { k, vectors } => {
				write!(f, "k must be in 1..={vectors}, but was {k}")
			},
			Self::MaxIterations => write!(f, "the maximum number of iterations must be at least 1"),
			Self::Tolerance(tolerance) => write!(f, "the tolerance must be >= 0, but was {tolerance}"),
			Self::NonFiniteComponent { index } => {
				write!(f, "the color vector at index {index} has a non-finite component")
			},
			Self::LabelOutOfRange { index, label, k } => {
				write!(f, "pixel {index} is assigned to cluster {label}, but there are only {k} centroids")
			},
		}
	}
}

impl std::error::Error for InvalidArgument {}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn display_names_the_values() {
		let message = InvalidArgument::ClusterCount { k: 7, vectors: 4 }.to_string();
		assert!(message.contains('7'));
		assert!(message.contains("1..=4"));

		let message = InvalidArgument::LabelOutOfRange { index: 3, label: 5, k: 2 }.to_string();
		assert!(message.contains("pixel 3"));
		assert!(message.contains("cluster 5"));
	}
}
