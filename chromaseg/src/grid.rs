//! Rectangular, row-major grids of Srgb pixels

use crate::InvalidArgument;
use image::{DynamicImage, Rgb, RgbImage};
use palette::Srgb;

/// A rectangular, row-major arrangement of Srgb pixels
///
/// Pixel `(x, y)` is stored at index `y * width + x`.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelGrid {
	/// Number of pixels in each row
	width: u32,
	/// Number of rows
	height: u32,
	/// The pixels in row-major order
	pixels: Vec<Srgb<u8>>,
}

/// Returns `width * height` as a `usize`, saturating on platforms where it does not fit
pub(crate) fn area(width: u32, height: u32) -> usize {
	usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(usize::MAX)
}

impl PixelGrid {
	/// Create a grid from row-major pixels.
	///
	/// # Errors
	/// Returns [`InvalidArgument::ShapeMismatch`] if `pixels.len() != width * height`.
	pub fn new(width: u32, height: u32, pixels: Vec<Srgb<u8>>) -> Result<Self, InvalidArgument> {
		let expected = area(width, height);
		if pixels.len() == expected {
			Ok(Self { width, height, pixels })
		} else {
			Err(InvalidArgument::ShapeMismatch { expected, actual: pixels.len() })
		}
	}

	/// Copy the pixels out of an [`RgbImage`]
	#[must_use]
	pub fn from_rgb_image(image: &RgbImage) -> Self {
		let (width, height) = image.dimensions();
		let pixels = palette::cast::from_component_slice::<Srgb<u8>>(image.as_raw()).to_vec();
		Self { width, height, pixels }
	}

	/// Convert any [`DynamicImage`] to 8-bit RGB, dropping an alpha channel if present
	#[must_use]
	pub fn from_image(image: &DynamicImage) -> Self {
		Self::from_rgb_image(&image.to_rgb8())
	}

	/// Convert this grid into an [`RgbImage`] with the same dimensions
	#[must_use]
	pub fn into_rgb_image(self) -> RgbImage {
		let width = self.width as usize;
		RgbImage::from_fn(self.width, self.height, |x, y| {
			let color = self.pixels[y as usize * width + x as usize];
			Rgb([color.red, color.green, color.blue])
		})
	}

	/// The number of pixels in each row
	#[must_use]
	pub const fn width(&self) -> u32 {
		self.width
	}

	/// The number of rows
	#[must_use]
	pub const fn height(&self) -> u32 {
		self.height
	}

	/// The pixels in row-major order
	#[must_use]
	pub fn pixels(&self) -> &[Srgb<u8>] {
		&self.pixels
	}

	/// The pixel at column `x` and row `y`, if it lies inside the grid
	#[must_use]
	pub fn get(&self, x: u32, y: u32) -> Option<Srgb<u8>> {
		if x < self.width && y < self.height {
			Some(self.pixels[y as usize * self.width as usize + x as usize])
		} else {
			None
		}
	}

	/// The total number of pixels
	#[must_use]
	pub fn len(&self) -> usize {
		self.pixels.len()
	}

	/// Whether the grid has no pixels
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.pixels.is_empty()
	}
}
