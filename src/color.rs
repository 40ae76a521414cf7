use palette::{FromColor, Hsl, IntoColor, Srgb};

/// Neutral gray returned whenever no real color could be derived.
pub const FALLBACK_GRAY: Color = Color {
    r: 128,
    g: 128,
    b: 128,
};

/// Core color type used throughout the pipeline.
/// Wraps sRGB u8 components and provides the HSL, luminance and contrast math
/// the selector and theme synthesizer rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a hex color string like `#FF8800` or `ff8800`.
    ///
    /// Returns `None` unless the remainder after an optional `#` is exactly
    /// six hex digits. Partial input is never guessed at.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self { r, g, b })
    }

    /// Serialize to uppercase hex `#RRGGBB`.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Convert to `palette::Srgb<u8>`.
    pub fn to_srgb_u8(self) -> Srgb<u8> {
        Srgb::new(self.r, self.g, self.b)
    }

    /// Convert to HSL. Saturation and lightness are fractions in [0, 1],
    /// hue is in degrees.
    pub fn to_hsl(self) -> Hsl {
        let srgb_f32: Srgb<f32> = self.to_srgb_u8().into_format();
        srgb_f32.into_color()
    }

    /// Create from HSL, rounding each channel to the nearest integer.
    pub fn from_hsl(hsl: Hsl) -> Self {
        let srgb_f32: Srgb<f32> = Srgb::from_color(hsl);
        Self::from_srgb_f32_clamped(srgb_f32)
    }

    /// Clamp an Srgb<f32> to [0, 1] and convert to Color.
    fn from_srgb_f32_clamped(srgb: Srgb<f32>) -> Self {
        let r = (srgb.red.clamp(0.0, 1.0) * 255.0).round() as u8;
        let g = (srgb.green.clamp(0.0, 1.0) * 255.0).round() as u8;
        let b = (srgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self { r, g, b }
    }

    /// Relative luminance of the sRGB color.
    ///
    /// Linearizes each channel (threshold 0.03928), then computes the
    /// weighted sum.
    pub fn relative_luminance(self) -> f32 {
        fn linearize(c: u8) -> f32 {
            let c = c as f32 / 255.0;
            if c <= 0.03928 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        let r = linearize(self.r);
        let g = linearize(self.g);
        let b = linearize(self.b);
        0.2126 * r + 0.7152 * g + 0.0722 * b
    }

    /// HSV-style saturation: `(max - min) / max`, or 0 for black.
    pub fn saturation(self) -> f32 {
        let max = self.r.max(self.g).max(self.b) as f32 / 255.0;
        let min = self.r.min(self.g).min(self.b) as f32 / 255.0;
        if max == 0.0 {
            0.0
        } else {
            (max - min) / max
        }
    }

    /// Contrast ratio between two colors.
    ///
    /// Returns a value in [1, 21]. Higher means more contrast.
    pub fn contrast_ratio(c1: &Color, c2: &Color) -> f32 {
        let l1 = c1.relative_luminance();
        let l2 = c2.relative_luminance();
        let (lighter, darker) = if l1 > l2 { (l1, l2) } else { (l2, l1) };
        (lighter + 0.05) / (darker + 0.05)
    }

    /// True for strong primaries and secondaries: one or two channels above
    /// 200 while every remaining channel stays below 100.
    pub fn is_pure_hue(self) -> bool {
        let channels = [self.r, self.g, self.b];
        let high = channels.iter().filter(|&&c| c > 200).count();
        let low = channels.iter().filter(|&&c| c < 100).count();
        (1..=2).contains(&high) && high + low == 3
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    const WHITE: Color = Color {
        r: 255,
        g: 255,
        b: 255,
    };

    #[test]
    fn hex_is_uppercase() {
        assert_eq!(Color::new(0, 168, 243).to_hex(), "#00A8F3");
    }

    #[test]
    fn hex_lowercase_input() {
        let color = Color::from_hex("#ff8800").unwrap();
        assert_eq!(color, Color::new(255, 136, 0));
        assert_eq!(color.to_hex(), "#FF8800");
    }

    #[test]
    fn hex_without_hash() {
        let color = Color::from_hex("aabbcc").unwrap();
        assert_eq!(color.to_hex(), "#AABBCC");
    }

    #[test]
    fn hex_invalid_length() {
        assert!(Color::from_hex("#fff").is_none());
        assert!(Color::from_hex("#ff88001").is_none());
        assert!(Color::from_hex("").is_none());
    }

    #[test]
    fn hex_invalid_chars() {
        assert!(Color::from_hex("#gggggg").is_none());
        // from_str_radix alone would accept a sign
        assert!(Color::from_hex("#+f+f+f").is_none());
        assert!(Color::from_hex("##ff8800").is_none());
    }

    #[test]
    fn hsl_of_saturated_blue() {
        let hsl = Color::new(0, 168, 243).to_hsl();
        let hue = hsl.hue.into_positive_degrees();
        assert!((hue - 198.5).abs() < 0.5, "hue was {hue}");
        assert!((hsl.saturation - 1.0).abs() < 0.001);
        assert!((hsl.lightness - 0.476).abs() < 0.001);
    }

    #[test]
    fn srgb_to_hsl_round_trip() {
        let colors = [
            Color::new(200, 100, 50),
            Color::new(0, 255, 0),
            Color::new(128, 128, 128),
            Color::new(12, 34, 56),
            BLACK,
            WHITE,
        ];
        for original in colors {
            let recovered = Color::from_hsl(original.to_hsl());
            for (a, b) in [
                (original.r, recovered.r),
                (original.g, recovered.g),
                (original.b, recovered.b),
            ] {
                assert!(
                    (a as i16 - b as i16).unsigned_abs() <= 1,
                    "channel mismatch for {original:?}: {a} vs {b}"
                );
            }
        }
    }

    #[test]
    fn contrast_ratio_black_white() {
        let ratio = Color::contrast_ratio(&BLACK, &WHITE);
        assert!(
            (ratio - 21.0).abs() < 0.1,
            "black/white contrast should be ~21:1, got {ratio}"
        );
    }

    #[test]
    fn contrast_ratio_same_color() {
        let gray = Color::new(128, 128, 128);
        let ratio = Color::contrast_ratio(&gray, &gray);
        assert!(
            (ratio - 1.0).abs() < 0.001,
            "same color contrast should be 1:1, got {ratio}"
        );
    }

    #[test]
    fn contrast_ratio_is_symmetric() {
        let a = Color::new(200, 50, 50);
        let b = Color::new(50, 200, 50);
        let ratio_ab = Color::contrast_ratio(&a, &b);
        let ratio_ba = Color::contrast_ratio(&b, &a);
        assert!((ratio_ab - ratio_ba).abs() < 0.001);
    }

    #[test]
    fn relative_luminance_extremes() {
        assert!(BLACK.relative_luminance() < 0.001);
        assert!((WHITE.relative_luminance() - 1.0).abs() < 0.001);
    }

    #[test]
    fn saturation_of_grays_and_primaries() {
        assert_eq!(BLACK.saturation(), 0.0);
        assert_eq!(Color::new(90, 90, 90).saturation(), 0.0);
        assert!((Color::new(255, 0, 0).saturation() - 1.0).abs() < f32::EPSILON);
        assert!((Color::new(200, 100, 100).saturation() - 0.5).abs() < 0.001);
    }

    #[test]
    fn pure_hue_signatures() {
        assert!(Color::new(240, 16, 0).is_pure_hue()); // red
        assert!(Color::new(224, 224, 32).is_pure_hue()); // yellow
        assert!(Color::new(0, 208, 208).is_pure_hue()); // cyan
        assert!(!Color::new(240, 240, 240).is_pure_hue()); // white
        assert!(!Color::new(240, 150, 0).is_pure_hue()); // orange, middle channel
        assert!(!Color::new(128, 0, 0).is_pure_hue()); // dark red
    }

    #[test]
    fn display_matches_to_hex() {
        let color = Color::new(171, 205, 239);
        assert_eq!(format!("{color}"), color.to_hex());
    }
}
