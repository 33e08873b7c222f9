//! Segment an image into its most representative colors by performing k-means clustering.

#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
	clippy::pedantic,
	clippy::cargo,
	clippy::use_debug,
	clippy::dbg_macro,
	clippy::todo,
	clippy::unimplemented,
	clippy::unwrap_used,
	clippy::unwrap_in_result,
	clippy::unneeded_field_pattern,
	clippy::rest_pat_in_fully_bound_structs,
	clippy::unnecessary_self_imports,
	clippy::str_to_string,
	clippy::string_to_string,
	clippy::string_slice,
	missing_docs,
	clippy::missing_docs_in_private_items,
	rustdoc::all,
	clippy::float_cmp_const,
	clippy::lossy_float_literal
)]
#![allow(clippy::doc_markdown, clippy::module_name_repetitions, clippy::unreadable_literal)]

mod cli;

#[allow(clippy::wildcard_imports)]
use cli::*;

use std::{
	fmt::{self, Display},
	path::PathBuf,
	process::ExitCode,
	time::Instant,
};

use chromaseg::{ColorCoverage, InvalidArgument, PixelGrid, Segmentation};
use clap::Parser;
use colored::Colorize;
use image::{DynamicImage, GenericImageView};
use palette::Srgb;

/// Record the running time of a function and print the elapsed time
macro_rules! time {
	($name: literal, $verbose: expr, $func_call: expr) => {{
		let start = Instant::now();
		let result = $func_call;
		if $verbose {
			println!("{} took {}ms", $name, start.elapsed().as_millis());
		}
		result
	}};
}

/// Error cases for the whole run, from loading the image to saving the result
#[derive(Debug)]
enum AppError {
	/// Failed to read or decode the image file
	ImageLoad(image::ImageError),
	/// Failed to read the avif file
	#[cfg(feature = "avif")]
	AvifRead(std::io::Error),
	/// Failed to decode the avif file
	#[cfg(feature = "avif")]
	AvifDecode(libavif_image::Error),
	/// The image or the options could not be segmented
	Segment(InvalidArgument),
	/// Failed to encode or write the segmented image
	ImageSave(image::ImageError),
	/// Failed to create the thread pool
	#[cfg(feature = "threads")]
	ThreadPool(rayon::ThreadPoolBuildError),
}

impl Display for AppError {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			AppError::ImageLoad(e) => write!(f, "Failed to load the image file: {e}"),
			#[cfg(feature = "avif")]
			AppError::AvifRead(e) => write!(f, "Failed to read the avif file: {e}"),
			#[cfg(feature = "avif")]
			AppError::AvifDecode(e) => write!(f, "Failed to decode the avif file: {e}"),
			AppError::Segment(e) => write!(f, "Failed to segment the image: {e}"),
			AppError::ImageSave(e) => write!(f, "Failed to save the segmented image: {e}"),
			#[cfg(feature = "threads")]
			AppError::ThreadPool(e) => write!(f, "Failed to create the thread pool: {e}"),
		}
	}
}

fn main() -> ExitCode {
	let options = Options::parse();

	let result = run_segment_and_print(&options);

	// Returning Result<_> uses Debug printing instead of Display
	if let Err(e) = result {
		eprintln!("{e}");
		ExitCode::FAILURE
	} else {
		ExitCode::SUCCESS
	}
}

/// Builds a thread pool and then runs `segment_and_print`
#[cfg(feature = "threads")]
fn run_segment_and_print(options: &Options) -> Result<(), AppError> {
	let pool = rayon::ThreadPoolBuilder::new()
		.num_threads(usize::from(options.threads))
		.build()
		.map_err(AppError::ThreadPool)?;

	pool.install(|| segment_and_print(options))
}

/// Runs `segment_and_print` on a single thread
#[cfg(not(feature = "threads"))]
fn run_segment_and_print(options: &Options) -> Result<(), AppError> {
	segment_and_print(options)
}

/// Load an image, segment it, then print the coverage and save the result using the given options
fn segment_and_print(options: &Options) -> Result<(), AppError> {
	// Input
	let img = time!("Image loading", options.verbose, load_image(&options.image))?;
	let img = generate_thumbnail(img, options.max_pixels, options.verbose);
	let grid = time!("Preprocessing", options.verbose, PixelGrid::from_image(&img));

	// Processing
	let Segmentation { image, coverage, iterations, variance } = time!(
		"Segmentation",
		options.verbose,
		chromaseg::segment(&grid, options.k, options.max_iter, options.tolerance, options.seed)
	)
	.map_err(AppError::Segment)?;

	if options.verbose {
		println!("k-means took {iterations} iterations with a final variance of {variance}");
	}

	// Output
	let mut colors = if options.merge_colors {
		coverage.merge_by_color()
	} else {
		coverage
			.entries()
			.iter()
			.map(|entry| ColorCoverage {
				color: entry.color,
				count: entry.count,
				percentage: entry.percentage,
			})
			.collect()
	};

	sort_colors(&mut colors, options);
	print_colors(&colors, options);

	if let Some(path) = &options.output {
		time!("Image saving", options.verbose, save_image(image, path))?;
	}

	Ok(())
}

/// Load the image at the given path
#[cfg(feature = "avif")]
fn load_image(path: &PathBuf) -> Result<DynamicImage, AppError> {
	if path.extension().map_or(false, |ext| ext == "avif") {
		let buf = std::fs::read(path).map_err(AppError::AvifRead)?;
		libavif_image::read(&buf).map_err(AppError::AvifDecode)
	} else {
		image::open(path).map_err(AppError::ImageLoad)
	}
}

/// Load the image at the given path
#[cfg(not(feature = "avif"))]
fn load_image(path: &PathBuf) -> Result<DynamicImage, AppError> {
	image::open(path).map_err(AppError::ImageLoad)
}

/// Save the segmented image to the given path, choosing the format from the extension
fn save_image(image: PixelGrid, path: &PathBuf) -> Result<(), AppError> {
	image.into_rgb_image().save(path).map_err(AppError::ImageSave)
}

/// Create a thumbnail with at most `max_pixels` pixels if the image has more than `max_pixels` pixels
fn generate_thumbnail(image: DynamicImage, max_pixels: u32, verbose: bool) -> DynamicImage {
	// The number of pixels should be < u64::MAX, since image dimensions are (u32, u32)
	let (width, height) = image.dimensions();
	let pixels = u64::from(width) * u64::from(height);
	if pixels <= u64::from(max_pixels) {
		if verbose {
			println!("Skipping image thumbnail since pixels was below max pixels");
		}

		image
	} else {
		// (u64 as f64) only gives innaccurate results for very large u64
		// I.e, only when pixels is in the order of quintillions
		#[allow(clippy::cast_precision_loss)]
		let scale = (f64::from(max_pixels) / pixels as f64).sqrt();

		// multiplying by a positive factor < 1
		#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
		let (thumb_width, thumb_height) = (
			((f64::from(width) * scale) as u32).max(1),
			((f64::from(height) * scale) as u32).max(1),
		);

		if verbose {
			println!("Creating a thumbnail with dimensions {thumb_width}x{thumb_height}");
		}

		time!("Image thumbnail", verbose, image.thumbnail(thumb_width, thumb_height))
	}
}

/// Order the colors according to the sort and reverse options
fn sort_colors(colors: &mut [ColorCoverage], options: &Options) {
	match options.sort {
		// already in ascending cluster id, or first appearance when merged
		SortOutput::Cluster => (),
		SortOutput::Coverage => colors.sort_by(|x, y| y.count.cmp(&x.count)),
	}

	if options.reverse {
		colors.reverse();
	}
}

/// Format a color according to the output format, without its percentage
fn format_color(color: Srgb<u8>, format: FormatOutput) -> String {
	match format {
		FormatOutput::Text => format!("Color ({}, {}, {})", color.red, color.green, color.blue),
		FormatOutput::Hex => format!("#{color:X}"),
		FormatOutput::Rgb => format!("({},{},{})", color.red, color.green, color.blue),
		FormatOutput::Swatch => "    ".to_owned(),
	}
}

/// Format one line of output for a color and its coverage
fn format_line(coverage: &ColorCoverage, options: &Options) -> String {
	let ColorCoverage { color, percentage, .. } = *coverage;
	let text = format_color(color, options.format);

	let text = match (options.format, options.colorize) {
		(FormatOutput::Swatch, _) => text.on_truecolor(color.red, color.green, color.blue).to_string(),
		(_, Some(ColorizeOutput::Fg)) => text.truecolor(color.red, color.green, color.blue).to_string(),
		(_, Some(ColorizeOutput::Bg)) => text.on_truecolor(color.red, color.green, color.blue).to_string(),
		(_, None) => text,
	};

	match options.format {
		FormatOutput::Text => format!("{text}: {percentage:.2}%"),
		FormatOutput::Hex | FormatOutput::Rgb | FormatOutput::Swatch => format!("{text} {percentage:.2}%"),
	}
}

/// Print each color and its coverage on a separate line
fn print_colors(colors: &[ColorCoverage], options: &Options) {
	for coverage in colors {
		println!("{}", format_line(coverage, options));
	}
}
