//! Flattens a pixel grid into color vectors suitable for distance computation

use crate::{InvalidArgument, PixelGrid};
use palette::Srgb;

/// The number of channels in each color vector
pub const CHANNELS: usize = 3;

/// One floating point value per color channel (red, green, blue), each in `0.0..=255.0` for image input
pub type ColorVector = [f64; CHANNELS];

/// Color vectors, one per pixel, in the row-major order of the source grid
///
/// The index of a vector is the only link back to its pixel position.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PixelVectorSet {
	/// The color vectors
	vectors: Vec<ColorVector>,
}

impl PixelVectorSet {
	/// Wrap arbitrary color vectors, e.g. for clustering data that did not come from an image
	#[must_use]
	pub fn new(vectors: Vec<ColorVector>) -> Self {
		Self { vectors }
	}

	/// The color vectors
	#[must_use]
	pub fn as_slice(&self) -> &[ColorVector] {
		&self.vectors
	}

	/// The number of vectors
	#[must_use]
	pub fn len(&self) -> usize {
		self.vectors.len()
	}

	/// Whether there are no vectors
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.vectors.is_empty()
	}
}

impl From<Vec<ColorVector>> for PixelVectorSet {
	fn from(vectors: Vec<ColorVector>) -> Self {
		Self::new(vectors)
	}
}

/// Convert an Srgb pixel into a color vector without any scaling
#[must_use]
pub fn to_vector(color: Srgb<u8>) -> ColorVector {
	[f64::from(color.red), f64::from(color.green), f64::from(color.blue)]
}

/// Round each channel of a color vector to the nearest integer in `0..=255`
#[must_use]
pub fn to_srgb(vector: ColorVector) -> Srgb<u8> {
	// Clamped to the u8 range first, so the cast cannot truncate
	#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
	let channel = |value: f64| value.round().clamp(0.0, 255.0) as u8;
	Srgb::new(channel(vector[0]), channel(vector[1]), channel(vector[2]))
}

/// Flatten a pixel grid into one color vector per pixel, in row-major order.
///
/// # Errors
/// Returns [`InvalidArgument::Empty`] if the grid has a width or height of zero.
pub fn vectorize(grid: &PixelGrid) -> Result<PixelVectorSet, InvalidArgument> {
	if grid.is_empty() {
		return Err(InvalidArgument::Empty);
	}

	Ok(PixelVectorSet::new(grid.pixels().iter().copied().map(to_vector).collect()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn vectorize_keeps_pixel_order() {
		let pixels = vec![
			Srgb::new(1, 2, 3),
			Srgb::new(4, 5, 6),
			Srgb::new(7, 8, 9),
			Srgb::new(10, 11, 12),
			Srgb::new(13, 14, 15),
			Srgb::new(255, 0, 128),
		];
		let grid = PixelGrid::new(3, 2, pixels.clone()).expect("valid shape");

		let vectors = vectorize(&grid).expect("non-empty grid");

		assert_eq!(vectors.len(), 6);
		for (&vector, &pixel) in vectors.as_slice().iter().zip(&pixels) {
			assert_eq!(to_srgb(vector), pixel);
		}
		assert_eq!(vectors.as_slice()[5], [255.0, 0.0, 128.0]);
	}

	#[test]
	fn vectorize_rejects_empty_grid() {
		for (width, height) in [(0, 0), (0, 5), (5, 0)] {
			let grid = PixelGrid::new(width, height, Vec::new()).expect("valid shape");
			assert_eq!(vectorize(&grid), Err(InvalidArgument::Empty));
		}
	}

	#[test]
	fn to_srgb_rounds_and_clamps() {
		assert_eq!(to_srgb([0.4, 0.5, 254.6]), Srgb::new(0, 1, 255));
		assert_eq!(to_srgb([-3.0, 300.0, 127.49]), Srgb::new(0, 255, 127));
	}
}
