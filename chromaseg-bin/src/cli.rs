//! Specifies the CLI and handles arg parsing

use clap::{Parser, ValueEnum};
use std::{
	fmt::{Debug, Display},
	ops::RangeBounds,
	path::PathBuf,
	str::FromStr,
};

/// Supported output formats for the coverage of each color
#[derive(Copy, Clone, ValueEnum)]
pub enum FormatOutput {
	/// Color (r, g, b): percentage
	Text,
	/// sRGB hexcode and percentage
	Hex,
	/// sRGB (r,g,b) triple and percentage
	Rgb,
	/// Whitespace with true color background and percentage
	Swatch,
}

/// Sort orders for the printed colors
#[derive(Copy, Clone, ValueEnum)]
pub enum SortOutput {
	/// Ascending cluster id
	Cluster,
	/// Descending coverage
	Coverage,
}

/// Ways to colorize the output text
#[derive(Copy, Clone, ValueEnum)]
pub enum ColorizeOutput {
	/// Foreground
	Fg,
	/// Background
	Bg,
}

/// Segment an image into its k most representative colors using k-means clustering.
///
/// Prints the share of the image covered by each color,
/// and optionally saves the image with every pixel replaced by the color of its cluster.
#[derive(Parser)]
#[command(version)]
pub struct Options {
	/// The path to the input image
	pub image: PathBuf,

	/// Save the segmented image to this path
	///
	/// The image format is chosen based on the file extension.
	#[arg(short, long)]
	pub output: Option<PathBuf>,

	/// The number of colors to segment the image into
	#[arg(short, default_value_t = chromaseg::DEFAULT_K, value_parser = parse_valid_k)]
	pub k: usize,

	/// The maximum number of k-means iterations
	///
	/// If k-means has not converged by then, the colors found so far are used.
	/// You can use the --verbose option to see how many iterations were needed.
	#[arg(short = 'i', long, default_value_t = chromaseg::DEFAULT_MAX_ITER, value_parser = parse_valid_max_iter)]
	pub max_iter: u32,

	/// The largest centroid movement, in sRGB channel units, for k-means to be considered converged
	#[arg(short = 'e', long, default_value_t = chromaseg::DEFAULT_TOLERANCE, value_parser = parse_valid_tolerance)]
	pub tolerance: f64,

	/// The seed value used for the random number generator
	#[arg(long, default_value_t = chromaseg::DEFAULT_SEED)]
	pub seed: u64,

	/// The format to print the colors in
	#[arg(short, long, default_value = "text")]
	pub format: FormatOutput,

	/// Color the foreground or background for each printed color
	#[arg(short, long)]
	pub colorize: Option<ColorizeOutput>,

	/// The order to print the colors in
	#[arg(short, long, default_value = "cluster")]
	pub sort: SortOutput,

	/// Reverse the printed order of the colors
	#[arg(short, long)]
	pub reverse: bool,

	/// Print distinct clusters that round to the same sRGB color as one color
	#[arg(short, long)]
	pub merge_colors: bool,

	/// The maximum image size, in number of pixels, before a thumbnail is created
	///
	/// This reduces the time needed for large images,
	/// but the segmented image will then also have the thumbnail's dimensions.
	#[arg(short = 'p', long, default_value_t = u32::MAX)]
	pub max_pixels: u32,

	/// The number of threads to use
	///
	/// A value of 0 indicates to automatically choose the number of threads.
	#[cfg(feature = "threads")]
	#[arg(short, long, default_value_t = 0)]
	pub threads: u8,

	/// Print additional information, such as the number of k-means iterations and the time taken by each step
	#[arg(long)]
	pub verbose: bool,
}

/// Parse a value and ensure it is in the provided, valid range
fn parse_in_range<T>(s: &str, range: impl RangeBounds<T> + Debug) -> Result<T, String>
where
	T: FromStr + Display + PartialOrd,
	T::Err: Display,
{
	let value: T = s.parse().map_err(|e| format!("{e}"))?;
	if range.contains(&value) {
		Ok(value)
	} else {
		Err(format!("{value} is not in {range:?}"))
	}
}

/// Parse the number of colors and ensure it is >= `1`
fn parse_valid_k(s: &str) -> Result<usize, String> {
	parse_in_range(s, 1..)
}

/// Parse the maximum number of iterations and ensure it is >= `1`
fn parse_valid_max_iter(s: &str) -> Result<u32, String> {
	parse_in_range(s, 1..)
}

/// Parse the tolerance and ensure it is >= `0.0`
fn parse_valid_tolerance(s: &str) -> Result<f64, String> {
	parse_in_range(s, 0.0..)
}
