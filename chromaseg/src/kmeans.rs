//! Provides the implementation for Lloyd's k-means

use crate::{vectorize::to_srgb, ColorVector, InvalidArgument, PixelVectorSet, CHANNELS};
use palette::Srgb;
use rand::{seq::index, Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::collections::HashSet;

/// Inputs with at least this many vectors have their assignment step split across threads
#[cfg(feature = "threads")]
const MIN_PARALLEL_LEN: usize = 4096;

/// Squared euclidean distance
fn squared_distance(x: &ColorVector, y: &ColorVector) -> f64 {
	x.iter()
		.zip(y)
		.map(|(a, b)| {
			let d = a - b;
			d * d
		})
		.sum()
}

/// The cluster id of each vector, index-aligned with the [`PixelVectorSet`] it was computed from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterAssignment {
	/// Cluster id for each vector
	labels: Vec<usize>,
}

impl ClusterAssignment {
	/// Wrap cluster ids, e.g. ones produced by another clustering method
	#[must_use]
	pub fn new(labels: Vec<usize>) -> Self {
		Self { labels }
	}

	/// The cluster id of each vector
	#[must_use]
	pub fn as_slice(&self) -> &[usize] {
		&self.labels
	}

	/// The number of labeled vectors
	#[must_use]
	pub fn len(&self) -> usize {
		self.labels.len()
	}

	/// Whether no vectors are labeled
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.labels.is_empty()
	}

	/// Check that every label refers to one of `k` centroids.
	pub(crate) fn check_labels(&self, k: usize) -> Result<(), InvalidArgument> {
		match self.labels.iter().position(|&label| label >= k) {
			Some(index) => Err(InvalidArgument::LabelOutOfRange { index, label: self.labels[index], k }),
			None => Ok(()),
		}
	}
}

/// One centroid per cluster, indexed by cluster id
#[derive(Debug, Clone, PartialEq)]
pub struct CentroidSet {
	/// The centroid of each cluster
	centroids: Vec<ColorVector>,
}

impl CentroidSet {
	/// Wrap centroids, e.g. ones produced by another clustering method
	#[must_use]
	pub fn new(centroids: Vec<ColorVector>) -> Self {
		Self { centroids }
	}

	/// The centroid of each cluster
	#[must_use]
	pub fn as_slice(&self) -> &[ColorVector] {
		&self.centroids
	}

	/// The number of clusters
	#[must_use]
	pub fn len(&self) -> usize {
		self.centroids.len()
	}

	/// Whether there are no clusters
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.centroids.is_empty()
	}

	/// The centroid of the given cluster rounded to an Srgb color
	#[must_use]
	pub fn color(&self, cluster: usize) -> Option<Srgb<u8>> {
		self.centroids.get(cluster).copied().map(to_srgb)
	}

	/// Every centroid rounded to an Srgb color
	#[must_use]
	pub fn colors(&self) -> Vec<Srgb<u8>> {
		self.centroids.iter().copied().map(to_srgb).collect()
	}
}

/// Result from running k-means
#[derive(Debug, Clone, PartialEq)]
pub struct KmeansResult {
	/// The final cluster of each vector
	pub assignment: ClusterAssignment,
	/// Exactly `k` centroids, including those of clusters that ended up empty
	pub centroids: CentroidSet,
	/// Number of elapsed iterations
	pub iterations: u32,
	/// Sum of the squared distances between each vector and its centroid
	///
	/// A lower variance indicates a higher accuracy.
	pub variance: f64,
}

impl KmeansResult {
	/// Split into the assignment and the centroids
	#[must_use]
	pub fn into_parts(self) -> (ClusterAssignment, CentroidSet) {
		(self.assignment, self.centroids)
	}
}

/// Data for each center/centroid
struct CenterData {
	/// The centroid point
	centroid: Vec<ColorVector>,
	/// Vector sum for all data points in this center
	sum: Vec<ColorVector>,
	/// Number of points in this center
	count: Vec<usize>,
}

impl CenterData {
	/// Create a [`CenterData`] starting from the given centroids
	fn new(centroid: Vec<ColorVector>) -> Self {
		let k = centroid.len();
		Self {
			centroid,
			sum: vec![[0.0; CHANNELS]; k],
			count: vec![0; k],
		}
	}
}

/// Holds all the state used by k-means
struct KmeansState {
	/// Data for each center
	centers: CenterData,
	/// Center assignment for each data point
	assignment: Vec<usize>,
}

impl KmeansState {
	/// Initialize a new [`KmeansState`] with the given starting centroids and `n` data points
	fn new(centroids: Vec<ColorVector>, n: usize) -> Self {
		Self {
			centers: CenterData::new(centroids),
			assignment: vec![0; n],
		}
	}

	/// Run one assignment and update step, returning the largest per-channel centroid displacement
	fn step(&mut self, vectors: &[ColorVector]) -> f64 {
		update_assignments(vectors, &self.centers.centroid, &mut self.assignment);
		update_sums(vectors, &self.assignment, &mut self.centers);
		update_centroids(&mut self.centers)
	}

	/// Sum of the squared distances between each vector and its current centroid
	fn variance(&self, vectors: &[ColorVector]) -> f64 {
		vectors
			.iter()
			.zip(&self.assignment)
			.map(|(vector, &center)| squared_distance(vector, &self.centers.centroid[center]))
			.sum()
	}
}

/// Choose `k` starting centroids from distinct positions in `vectors`.
///
/// Positions holding the first occurrence of each distinct vector are sampled first,
/// so the starting centroids only repeat a color if `k` exceeds the number of distinct colors.
fn initial_centroids(vectors: &[ColorVector], k: usize, rng: &mut impl Rng) -> Vec<ColorVector> {
	let mut seen = HashSet::new();
	let (distinct, duplicates): (Vec<usize>, Vec<usize>) =
		(0..vectors.len()).partition(|&i| seen.insert(vectors[i].map(f64::to_bits)));

	let chosen = if k <= distinct.len() {
		index::sample(rng, distinct.len(), k)
			.into_iter()
			.map(|i| distinct[i])
			.collect::<Vec<_>>()
	} else {
		// k <= vectors.len(), so there are enough duplicates to fill the rest
		let remaining = k - distinct.len();
		let mut chosen = distinct;
		chosen.extend(index::sample(rng, duplicates.len(), remaining).into_iter().map(|i| duplicates[i]));
		chosen
	};

	chosen.into_iter().map(|i| vectors[i]).collect()
}

/// Find the closest centroid, preferring the lowest cluster id among equidistant centroids
fn nearest_center(vector: &ColorVector, centroids: &[ColorVector]) -> usize {
	let mut min_center = 0;
	let mut min_dist = squared_distance(vector, &centroids[0]);
	for (center, centroid) in centroids.iter().enumerate().skip(1) {
		let dist = squared_distance(vector, centroid);
		if dist < min_dist * (1.0 - f64::EPSILON) {
			min_dist = dist;
			min_center = center;
		}
	}
	min_center
}

/// For each data point, update its assigned center
fn update_assignments(vectors: &[ColorVector], centroids: &[ColorVector], assignment: &mut [usize]) {
	#[cfg(feature = "threads")]
	if vectors.len() >= MIN_PARALLEL_LEN {
		update_assignments_par(vectors, centroids, assignment);
		return;
	}

	for (center, vector) in assignment.iter_mut().zip(vectors) {
		*center = nearest_center(vector, centroids);
	}
}

/// For each data point, update its assigned center using multiple threads
#[cfg(feature = "threads")]
fn update_assignments_par(vectors: &[ColorVector], centroids: &[ColorVector], assignment: &mut [usize]) {
	use rayon::prelude::*;

	assignment
		.par_iter_mut()
		.with_min_len((vectors.len() / rayon::current_num_threads()).max(1))
		.zip(vectors)
		.for_each(|(center, vector)| *center = nearest_center(vector, centroids));
}

/// Recompute the vector sum and count of each center from the current assignment
fn update_sums(vectors: &[ColorVector], assignment: &[usize], centers: &mut CenterData) {
	centers.sum.fill([0.0; CHANNELS]);
	centers.count.fill(0);

	// Accumulated in vector order, so the sums do not depend on how the assignment step was scheduled
	for (vector, &center) in vectors.iter().zip(assignment) {
		for (sum, &x) in centers.sum[center].iter_mut().zip(vector) {
			*sum += x;
		}
		centers.count[center] += 1;
	}
}

/// For each center, update its centroid using the vector sums and return the largest per-channel displacement
fn update_centroids(centers: &mut CenterData) -> f64 {
	let mut max_delta = 0.0_f64;
	for ((centroid, &n), sum) in centers.centroid.iter_mut().zip(&centers.count).zip(&centers.sum) {
		// Empty centers keep their previous centroid
		if n == 0 {
			continue;
		}

		#[allow(clippy::cast_precision_loss)]
		let n = n as f64;
		for (component, &total) in centroid.iter_mut().zip(sum) {
			let mean = total / n;
			max_delta = max_delta.max((mean - *component).abs());
			*component = mean;
		}
	}

	max_delta
}

/// Check the preconditions of [`cluster`]
fn validate(vectors: &[ColorVector], k: usize, max_iter: u32, tolerance: f64) -> Result<(), InvalidArgument> {
	if vectors.is_empty() {
		return Err(InvalidArgument::Empty);
	}
	if k == 0 || k > vectors.len() {
		return Err(InvalidArgument::ClusterCount { k, vectors: vectors.len() });
	}
	if max_iter == 0 {
		return Err(InvalidArgument::MaxIterations);
	}
	if tolerance.is_nan() || tolerance < 0.0 {
		return Err(InvalidArgument::Tolerance(tolerance));
	}
	if let Some(index) = vectors.iter().position(|v| !v.iter().all(|x| x.is_finite())) {
		return Err(InvalidArgument::NonFiniteComponent { index });
	}
	Ok(())
}

/// Partition `vectors` into `k` clusters using Lloyd's k-means.
///
/// The starting centroids are `k` vectors chosen at random by a generator seeded with `seed`,
/// so the result is fully determined by the arguments.
/// Iteration stops once no centroid component moves by more than `tolerance`,
/// or after `max_iter` iterations, whichever comes first.
/// Stopping because of `max_iter` is not an error.
///
/// # Errors
/// Returns [`InvalidArgument`] if `vectors` is empty or has a non-finite component,
/// if `k` is not in `1..=vectors.len()`, if `max_iter` is zero, or if `tolerance` is negative or NaN.
pub fn cluster(
	vectors: &PixelVectorSet,
	k: usize,
	max_iter: u32,
	tolerance: f64,
	seed: u64,
) -> Result<KmeansResult, InvalidArgument> {
	let vectors = vectors.as_slice();
	validate(vectors, k, max_iter, tolerance)?;

	let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
	let mut state = KmeansState::new(initial_centroids(vectors, k, &mut rng), vectors.len());

	let mut iterations = 0;
	let mut max_delta = f64::INFINITY;
	while iterations < max_iter && max_delta > tolerance {
		max_delta = state.step(vectors);
		iterations += 1;
	}

	let variance = state.variance(vectors);
	let KmeansState { centers, assignment } = state;

	Ok(KmeansResult {
		assignment: ClusterAssignment::new(assignment),
		centroids: CentroidSet::new(centers.centroid),
		iterations,
		variance,
	})
}
