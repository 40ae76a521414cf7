use std::collections::HashMap;

use crate::cli::Precision;
use crate::color::Color;
use crate::pipeline::sample::PixelSample;

/// Pixels with alpha below this are treated as non-opaque and skipped.
pub const MIN_ALPHA: u8 = 128;

/// Luminance band outside of which a pixel counts as near-black or near-white.
pub const DARK_LUMINANCE: f32 = 0.05;
pub const BRIGHT_LUMINANCE: f32 = 0.95;

/// What to do with near-black and near-white pixels.
///
/// The fast path drops them before bucketing so the raw-count winner is
/// never a background. The thorough path keeps them and lets the scorer
/// decide, so a cover that really is mostly white can still come out white.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LuminancePolicy {
    HardFilter,
    SoftPenalty,
}

impl Precision {
    /// Bucket edge length per channel.
    pub fn bucket_size(self) -> u8 {
        match self {
            Precision::Fast => 32,
            Precision::Thorough => 16,
        }
    }

    /// Only every `stride`-th pixel of the raster is visited.
    pub fn stride(self) -> usize {
        match self {
            Precision::Fast => 8,
            Precision::Thorough => 4,
        }
    }

    pub fn luminance_policy(self) -> LuminancePolicy {
        match self {
            Precision::Fast => LuminancePolicy::HardFilter,
            Precision::Thorough => LuminancePolicy::SoftPenalty,
        }
    }
}

/// A quantized color cell and how many sampled pixels fell into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorBucket {
    /// Bucket origin: each channel floored to a multiple of the bucket size.
    pub key: [u8; 3],
    pub count: u32,
    /// Pixels whose own luminance was outside the
    /// ([`DARK_LUMINANCE`], [`BRIGHT_LUMINANCE`]) band.
    pub extreme: u32,
}

impl ColorBucket {
    pub fn color(&self) -> Color {
        Color::new(self.key[0], self.key[1], self.key[2])
    }

    /// Near-black or near-white, judged by the pixels rather than the origin.
    ///
    /// Flooring pulls every origin away from white (the brightest 16-step
    /// origin sits at luminance ~0.87), so the origin alone cannot tell.
    pub fn is_extreme(&self) -> bool {
        self.extreme * 2 > self.count
    }
}

fn is_extreme_luminance(luminance: f32) -> bool {
    luminance <= DARK_LUMINANCE || luminance >= BRIGHT_LUMINANCE
}

/// Frequency histogram over quantized colors.
///
/// Buckets keep the order in which they were first seen, which makes
/// tie-breaking in the selector deterministic.
#[derive(Debug, Clone, Default)]
pub struct ColorHistogram {
    buckets: Vec<ColorBucket>,
    index: HashMap<[u8; 3], usize>,
    total: u32,
}

impl ColorHistogram {
    pub fn build(pixels: &[PixelSample], precision: Precision) -> Self {
        let size = precision.bucket_size();
        let policy = precision.luminance_policy();
        let mut histogram = Self::default();

        for pixel in pixels.iter().step_by(precision.stride()) {
            if pixel.a < MIN_ALPHA {
                continue;
            }
            let extreme =
                is_extreme_luminance(Color::new(pixel.r, pixel.g, pixel.b).relative_luminance());
            if extreme && policy == LuminancePolicy::HardFilter {
                continue;
            }
            let key = [
                (pixel.r / size) * size,
                (pixel.g / size) * size,
                (pixel.b / size) * size,
            ];
            histogram.add(key, extreme);
        }

        histogram
    }

    fn add(&mut self, key: [u8; 3], extreme: bool) {
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                self.buckets.push(ColorBucket {
                    key,
                    count: 0,
                    extreme: 0,
                });
                self.index.insert(key, self.buckets.len() - 1);
                self.buckets.len() - 1
            }
        };
        let bucket = &mut self.buckets[slot];
        bucket.count += 1;
        if extreme {
            bucket.extreme += 1;
        }
        self.total += 1;
    }

    /// Buckets in first-seen order.
    pub fn buckets(&self) -> &[ColorBucket] {
        &self.buckets
    }

    /// Number of pixels that made it into a bucket.
    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(pixel: PixelSample, n: usize) -> Vec<PixelSample> {
        vec![pixel; n]
    }

    #[test]
    fn keys_are_floored_to_bucket_origin() {
        let pixels = flat(PixelSample::opaque(0, 168, 243), 16);
        let thorough = ColorHistogram::build(&pixels, Precision::Thorough);
        assert_eq!(thorough.buckets()[0].key, [0, 160, 240]);
        let fast = ColorHistogram::build(&pixels, Precision::Fast);
        assert_eq!(fast.buckets()[0].key, [0, 160, 224]);
    }

    #[test]
    fn stride_skips_pixels() {
        let pixels = flat(PixelSample::opaque(100, 50, 50), 100);
        assert_eq!(ColorHistogram::build(&pixels, Precision::Thorough).total(), 25);
        assert_eq!(ColorHistogram::build(&pixels, Precision::Fast).total(), 13);
    }

    #[test]
    fn transparent_pixels_are_discarded() {
        let mut pixels = flat(PixelSample { r: 200, g: 0, b: 0, a: 127 }, 40);
        pixels.extend(flat(PixelSample { r: 0, g: 0, b: 200, a: 128 }, 40));
        let histogram = ColorHistogram::build(&pixels, Precision::Thorough);
        assert_eq!(histogram.buckets().len(), 1);
        assert_eq!(histogram.buckets()[0].key, [0, 0, 192]);
        assert_eq!(histogram.total(), 10);
    }

    #[test]
    fn fast_path_drops_extremes() {
        let mut pixels = flat(PixelSample::opaque(255, 255, 255), 64);
        pixels.extend(flat(PixelSample::opaque(0, 0, 0), 64));
        assert!(ColorHistogram::build(&pixels, Precision::Fast).is_empty());
    }

    #[test]
    fn thorough_path_keeps_extremes() {
        let pixels = flat(PixelSample::opaque(255, 255, 255), 64);
        let histogram = ColorHistogram::build(&pixels, Precision::Thorough);
        assert_eq!(histogram.buckets()[0].key, [240, 240, 240]);
        assert_eq!(histogram.total(), 16);
        assert_eq!(histogram.buckets()[0].extreme, 16);
        assert!(histogram.buckets()[0].is_extreme());
    }

    #[test]
    fn extreme_status_follows_pixel_majority() {
        // (250, 250, 250) is above the bright cutoff; (242, 242, 242) is not.
        let mut pixels = flat(PixelSample::opaque(250, 250, 250), 12);
        pixels.extend(flat(PixelSample::opaque(242, 242, 242), 20));
        let histogram = ColorHistogram::build(&pixels, Precision::Thorough);
        let bucket = histogram.buckets()[0];
        assert_eq!(histogram.buckets().len(), 1);
        assert_eq!((bucket.count, bucket.extreme), (8, 3));
        assert!(!bucket.is_extreme());
    }

    #[test]
    fn buckets_keep_first_seen_order() {
        let pixels = vec![
            PixelSample::opaque(0, 0, 200),
            PixelSample::opaque(200, 0, 0),
            PixelSample::opaque(0, 0, 200),
        ];
        let mut histogram = ColorHistogram::default();
        for p in &pixels {
            histogram.add([p.r, p.g, p.b], false);
        }
        assert_eq!(histogram.buckets()[0].key, [0, 0, 200]);
        assert_eq!(histogram.buckets()[0].count, 2);
        assert_eq!(histogram.buckets()[1].key, [200, 0, 0]);
    }
}
