//! Reports how much of an image each cluster covers

use crate::{CentroidSet, ClusterAssignment, InvalidArgument};
use palette::Srgb;
use std::collections::HashMap;

/// The share of the image held by one cluster
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverageEntry {
	/// The cluster id
	pub cluster: usize,
	/// The cluster's centroid rounded to an Srgb color
	pub color: Srgb<u8>,
	/// Number of pixels assigned to the cluster
	pub count: usize,
	/// `count` as a percentage of all pixels, in `0.0..=100.0`
	pub percentage: f64,
}

/// The share of the image held by one color, after merging clusters that round to the same color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorCoverage {
	/// The rounded centroid color
	pub color: Srgb<u8>,
	/// Number of pixels assigned to a cluster with this color
	pub count: usize,
	/// `count` as a percentage of all pixels, in `0.0..=100.0`
	pub percentage: f64,
}

/// Per-cluster coverage in ascending cluster id, omitting clusters with no pixels
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageReport {
	/// One entry for each non-empty cluster
	entries: Vec<CoverageEntry>,
	/// The number of pixels the percentages are relative to
	total: usize,
}

/// Returns `count` as a percentage of `total`
#[allow(clippy::cast_precision_loss)]
fn percentage(count: usize, total: usize) -> f64 {
	count as f64 / total as f64 * 100.0
}

impl CoverageReport {
	/// The entry for each non-empty cluster in ascending cluster id
	#[must_use]
	pub fn entries(&self) -> &[CoverageEntry] {
		&self.entries
	}

	/// The total number of pixels
	#[must_use]
	pub const fn total_pixels(&self) -> usize {
		self.total
	}

	/// The number of non-empty clusters
	#[must_use]
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether there are no entries
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Merge the entries of distinct clusters whose rounded colors are identical.
	///
	/// Colors are listed in the order they first appear in the report.
	#[must_use]
	pub fn merge_by_color(&self) -> Vec<ColorCoverage> {
		// Packed Srgb -> merged index
		let mut memo: HashMap<u32, usize> = HashMap::new();
		let mut merged = Vec::<ColorCoverage>::new();

		for entry in &self.entries {
			let key = entry.color.into_u32::<palette::rgb::channels::Rgba>();
			let index = *memo.entry(key).or_insert_with(|| {
				merged.push(ColorCoverage { color: entry.color, count: 0, percentage: 0.0 });
				merged.len() - 1
			});
			merged[index].count += entry.count;
		}

		for color in &mut merged {
			color.percentage = percentage(color.count, self.total);
		}

		merged
	}
}

/// Compute the percentage of pixels assigned to each cluster.
///
/// Clusters that received no pixels are left out of the report.
///
/// # Errors
/// Returns [`InvalidArgument::Empty`] if the assignment is empty,
/// or [`InvalidArgument::LabelOutOfRange`] if a label has no centroid.
pub fn report(assignment: &ClusterAssignment, centroids: &CentroidSet) -> Result<CoverageReport, InvalidArgument> {
	if assignment.is_empty() {
		return Err(InvalidArgument::Empty);
	}
	assignment.check_labels(centroids.len())?;

	let mut counts = vec![0; centroids.len()];
	for &label in assignment.as_slice() {
		counts[label] += 1;
	}

	let total = assignment.len();
	let entries = counts
		.into_iter()
		.zip(centroids.colors())
		.enumerate()
		.filter(|&(_, (count, _))| count > 0)
		.map(|(cluster, (count, color))| CoverageEntry {
			cluster,
			color,
			count,
			percentage: percentage(count, total),
		})
		.collect();

	Ok(CoverageReport { entries, total })
}
