use crate::cli::Precision;
use crate::color::Color;
use crate::pipeline::histogram::{ColorBucket, ColorHistogram};

/// Share of retained pixels a near-black/near-white bucket needs to stay in the running.
const EXTREME_COVERAGE: f32 = 0.3;

/// Pick the winning bucket color, or `None` when the histogram is empty.
///
/// `Fast` takes the most frequent bucket. `Thorough` ranks buckets by
/// [`score_bucket`]. Ties go to the bucket seen first in both cases.
pub fn select_dominant(histogram: &ColorHistogram, precision: Precision) -> Option<Color> {
    let total = histogram.total();
    let score = |bucket: &ColorBucket| match precision {
        Precision::Fast => bucket.count as f32,
        Precision::Thorough => score_bucket(bucket, total),
    };

    let mut best: Option<(&ColorBucket, f32)> = None;
    for bucket in histogram.buckets() {
        let s = score(bucket);
        if best.map_or(true, |(_, top)| s > top) {
            best = Some((bucket, s));
        }
    }
    best.map(|(bucket, _)| bucket.color())
}

/// Weighted score of one bucket for the thorough selector.
///
/// `count * saturation * (1 + medium luminance) * (1 + pure hue) * gray penalty`,
/// where saturation above 0.5 triples, above 0.3 doubles, a luminance in
/// (0.3, 0.7) adds half, a pure primary/secondary adds 30%, and a
/// saturation under 0.2 cuts the score to 30%.
///
/// Near-black and near-white buckets (see [`ColorBucket::is_extreme`]) score a
/// flat `count * 0.5` when they cover at least 30% of the retained pixels and
/// are cut to a tenth of their regular score otherwise.
pub fn score_bucket(bucket: &ColorBucket, total: u32) -> f32 {
    let color = bucket.color();
    let count = bucket.count as f32;
    let saturation = color.saturation();
    let luminance = color.relative_luminance();
    let extreme = bucket.is_extreme();

    if extreme && total > 0 && count / total as f32 >= EXTREME_COVERAGE {
        return count * 0.5;
    }

    let saturation_bonus = if saturation > 0.5 {
        3.0
    } else if saturation > 0.3 {
        2.0
    } else {
        1.0
    };
    let medium_luminance_bonus = if luminance > 0.3 && luminance < 0.7 {
        0.5
    } else {
        0.0
    };
    let pure_hue_bonus = if color.is_pure_hue() { 0.3 } else { 0.0 };
    let gray_penalty = if saturation < 0.2 { 0.3 } else { 1.0 };

    let score = count
        * saturation_bonus
        * (1.0 + medium_luminance_bonus)
        * (1.0 + pure_hue_bonus)
        * gray_penalty;

    if extreme {
        score * 0.1
    } else {
        score
    }
}
