//! Semantic palette synthesis from a single dominant color.

use palette::Hsl;

use crate::cli::Variant;
use crate::color::Color;

/// Theme variable names, in the order they are written.
pub const SLOT_NAMES: [&str; 11] = [
    "background",
    "foreground",
    "card",
    "card-foreground",
    "primary",
    "primary-foreground",
    "muted",
    "muted-foreground",
    "accent",
    "accent-foreground",
    "border",
];

/// Minimum contrast for body text.
pub const MIN_TEXT_CONTRAST: f32 = 4.5;

/// Upper bound for the amplified saturation, in percent.
const MAX_SATURATION: f32 = 85.0;

/// Dominant colors brighter than this get a fixed background lightness.
const VERY_LIGHT_LUMINANCE: f32 = 0.7;

pub const PURE_WHITE: HslColor = HslColor::new(0.0, 0.0, 100.0);
pub const PURE_BLACK: HslColor = HslColor::new(0.0, 0.0, 0.0);
pub const NEAR_BLACK: HslColor = HslColor::new(0.0, 0.0, 5.0);
pub const LIGHT_GRAY: HslColor = HslColor::new(0.0, 0.0, 75.0);
pub const DARK_GRAY: HslColor = HslColor::new(0.0, 0.0, 35.0);

/// A color in theme-variable units: hue in degrees, saturation and
/// lightness in percent. Displays as `"H S% L%"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HslColor {
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
}

impl HslColor {
    pub const fn new(hue: f32, saturation: f32, lightness: f32) -> Self {
        Self {
            hue,
            saturation,
            lightness,
        }
    }

    pub fn from_rgb(color: Color) -> Self {
        let hsl = color.to_hsl();
        Self {
            hue: hsl.hue.into_positive_degrees(),
            saturation: hsl.saturation * 100.0,
            lightness: hsl.lightness * 100.0,
        }
    }

    pub fn to_rgb(self) -> Color {
        Color::from_hsl(Hsl::new(
            self.hue,
            (self.saturation / 100.0).clamp(0.0, 1.0),
            (self.lightness / 100.0).clamp(0.0, 1.0),
        ))
    }

    /// Parse the `"H S% L%"` form written by [`Display`](std::fmt::Display).
    pub fn parse(value: &str) -> Option<Self> {
        let mut parts = value.split_whitespace();
        let hue = parts.next()?.parse().ok()?;
        let saturation = parts.next()?.strip_suffix('%')?.parse().ok()?;
        let lightness = parts.next()?.strip_suffix('%')?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self::new(hue, saturation, lightness))
    }
}

impl std::fmt::Display for HslColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}% {}%",
            (self.hue.round() as i32).rem_euclid(360),
            self.saturation.round() as i32,
            self.lightness.round() as i32
        )
    }
}

/// The named slots consumed by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SemanticPalette {
    pub background: HslColor,
    pub foreground: HslColor,
    pub card: HslColor,
    pub card_foreground: HslColor,
    pub primary: HslColor,
    pub primary_foreground: HslColor,
    pub muted: HslColor,
    pub muted_foreground: HslColor,
    pub accent: HslColor,
    pub accent_foreground: HslColor,
    pub border: HslColor,
}

impl SemanticPalette {
    /// Expand one dominant color into a full palette.
    ///
    /// Surfaces take the dominant hue with boosted saturation. Text slots are
    /// pinned: white (and a light gray for muted text) on dark, near-black
    /// (and a dark gray) on light. They do not go through
    /// [`optimal_text_color`].
    pub fn synthesize(color: Color, variant: Variant) -> Self {
        let base = HslColor::from_rgb(color);
        let h = base.hue;
        let s = (base.saturation * 1.3).min(MAX_SATURATION);
        let very_light = color.relative_luminance() > VERY_LIGHT_LUMINANCE;

        match variant {
            Variant::Dark => {
                let bg_l = if very_light {
                    15.0
                } else {
                    base.lightness.min(25.0)
                };
                Self {
                    background: HslColor::new(h, s, bg_l),
                    foreground: PURE_WHITE,
                    card: HslColor::new(h, s * 0.8, bg_l + 15.0),
                    card_foreground: PURE_WHITE,
                    primary: HslColor::new(h, s, 55.0),
                    primary_foreground: PURE_WHITE,
                    muted: HslColor::new(h, s * 0.4, 30.0),
                    muted_foreground: LIGHT_GRAY,
                    accent: HslColor::new(h, s * 0.9, 45.0),
                    accent_foreground: PURE_WHITE,
                    border: HslColor::new(h, s * 0.5, 35.0),
                }
            }
            Variant::Light => {
                let bg_l = if very_light {
                    98.0
                } else {
                    base.lightness.max(92.0)
                };
                Self {
                    background: HslColor::new(h, s, bg_l),
                    foreground: NEAR_BLACK,
                    card: HslColor::new(h, s * 0.8, bg_l - 12.0),
                    card_foreground: NEAR_BLACK,
                    primary: HslColor::new(h, s, 45.0),
                    primary_foreground: NEAR_BLACK,
                    muted: HslColor::new(h, s * 0.4, 70.0),
                    muted_foreground: DARK_GRAY,
                    accent: HslColor::new(h, s * 0.9, 55.0),
                    accent_foreground: NEAR_BLACK,
                    border: HslColor::new(h, s * 0.5, 65.0),
                }
            }
        }
    }

    /// Slots paired with their variable names, in [`SLOT_NAMES`] order.
    pub fn entries(&self) -> [(&'static str, HslColor); 11] {
        [
            (SLOT_NAMES[0], self.background),
            (SLOT_NAMES[1], self.foreground),
            (SLOT_NAMES[2], self.card),
            (SLOT_NAMES[3], self.card_foreground),
            (SLOT_NAMES[4], self.primary),
            (SLOT_NAMES[5], self.primary_foreground),
            (SLOT_NAMES[6], self.muted),
            (SLOT_NAMES[7], self.muted_foreground),
            (SLOT_NAMES[8], self.accent),
            (SLOT_NAMES[9], self.accent_foreground),
            (SLOT_NAMES[10], self.border),
        ]
    }
}

/// Tinted text color for `background`, checked against [`MIN_TEXT_CONTRAST`].
///
/// Bright backgrounds get a dark tint of `base_hue`, dim ones a light tint.
/// If the tint misses the contrast floor, pure black or white is returned.
pub fn optimal_text_color(background: HslColor, base_hue: f32) -> HslColor {
    let bg = background.to_rgb();
    let (tinted, plain) = if bg.relative_luminance() > 0.5 {
        (HslColor::new(base_hue, 30.0, 10.0), PURE_BLACK)
    } else {
        (HslColor::new(base_hue, 20.0, 95.0), PURE_WHITE)
    };

    if Color::contrast_ratio(&tinted.to_rgb(), &bg) >= MIN_TEXT_CONTRAST {
        tinted
    } else {
        plain
    }
}
