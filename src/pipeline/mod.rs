//! Image → dominant color.
//!
//! [`sample`] turns a source into a small flat raster, [`histogram`] buckets
//! the informative pixels, and [`select`] picks the winner. Both precisions
//! run through the same code and differ only in the parameters carried by
//! [`Precision`].

pub mod histogram;
pub mod sample;
pub mod select;

use crate::cli::Precision;
use crate::color::{Color, FALLBACK_GRAY};
use crate::error::ExtractError;

pub use histogram::{ColorBucket, ColorHistogram};
pub use sample::{ImageSampler, ImageSource, PixelSample, SampledImage};

/// Dominant color of a pixel buffer, or the fallback gray when every pixel
/// was discarded.
pub fn dominant_color(pixels: &[PixelSample], precision: Precision) -> Color {
    let histogram = ColorHistogram::build(pixels, precision);
    match select::select_dominant(&histogram, precision) {
        Some(color) => color,
        None => {
            log::debug!("{}; using fallback color", ExtractError::EmptyHistogram);
            FALLBACK_GRAY
        }
    }
}
