//! Color mapping for count-intensity charts.

use crate::models::CountAggregation;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Simple RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl fmt::Display for Rgb {
    /// Format as CSS hex: #rrggbb
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Rgb {
    pub const NEUTRAL: Rgb = Rgb { r: 150, g: 150, b: 150 };

    /// Parse `#rgb` or `#rrggbb`.
    pub fn from_hex(s: &str) -> Option<Rgb> {
        let hex = s.strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let channel = |h: &str| u8::from_str_radix(h, 16).ok();
        match hex.len() {
            6 => Some(Rgb {
                r: channel(&hex[0..2])?,
                g: channel(&hex[2..4])?,
                b: channel(&hex[4..6])?,
            }),
            3 => {
                let c: Vec<u8> = hex
                    .chars()
                    .map(|ch| channel(&ch.to_string()).map(|v| v * 17))
                    .collect::<Option<_>>()?;
                Some(Rgb { r: c[0], g: c[1], b: c[2] })
            }
            _ => None,
        }
    }

    fn lerp(a: Rgb, b: Rgb, t: f64) -> Rgb {
        let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
        Rgb {
            r: mix(a.r, b.r),
            g: mix(a.g, b.g),
            b: mix(a.b, b.b),
        }
    }
}

/// Sequential green ramp, light to dark.
const GREENS: [Rgb; 9] = [
    Rgb { r: 247, g: 252, b: 245 },
    Rgb { r: 229, g: 245, b: 224 },
    Rgb { r: 199, g: 233, b: 192 },
    Rgb { r: 161, g: 217, b: 155 },
    Rgb { r: 116, g: 196, b: 118 },
    Rgb { r: 65, g: 171, b: 93 },
    Rgb { r: 35, g: 139, b: 69 },
    Rgb { r: 0, g: 109, b: 44 },
    Rgb { r: 0, g: 68, b: 27 },
];

/// Color on the green ramp for `t` in [0.0, 1.0].
pub fn greens(t: f64) -> Rgb {
    // NaN / infinities fall back to neutral gray.
    if !t.is_finite() {
        return Rgb::NEUTRAL;
    }
    let t = t.clamp(0.0, 1.0);
    let scaled = t * (GREENS.len() - 1) as f64;
    let lo = scaled.floor() as usize;
    let hi = (lo + 1).min(GREENS.len() - 1);
    Rgb::lerp(GREENS[lo], GREENS[hi], scaled - lo as f64)
}

const GOLDEN_ANGLE: f64 = 137.50776405;

/// Distinct categorical color for series beyond the configured palette.
pub fn golden_angle_color(index: usize) -> String {
    let h = ((index as f64) * GOLDEN_ANGLE) % 360.0;
    format!("hsl({:.1},70%,45%)", h)
}

/// Color for series `index`: the palette entry if valid, otherwise a
/// generated one.
pub fn series_color(palette: &[String], index: usize) -> String {
    palette
        .get(index)
        .and_then(|c| Rgb::from_hex(c))
        .map(|c| c.to_string())
        .unwrap_or_else(|| golden_angle_color(index))
}

/// Min/max normalization of counts onto the green ramp.
///
/// An empty set, or one where every count is equal, maps every value to the
/// midpoint of the ramp.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorScale {
    pub min: usize,
    pub max: usize,
}

impl ColorScale {
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub fn from_counts(counts: &CountAggregation) -> Self {
        match counts.min_max() {
            Some((min, max)) => Self::new(min, max),
            None => Self::new(0, 0),
        }
    }

    /// True when the range is empty and every value gets the neutral color.
    pub fn is_degenerate(&self) -> bool {
        self.max <= self.min
    }

    /// Position of `count` in [0.0, 1.0].
    pub fn normalize(&self, count: usize) -> f64 {
        if self.is_degenerate() {
            return 0.5;
        }
        let span = (self.max - self.min) as f64;
        ((count as f64 - self.min as f64) / span).clamp(0.0, 1.0)
    }

    pub fn color(&self, count: usize) -> Rgb {
        greens(self.normalize(count))
    }

    /// Shade character for text charts, light to dark.
    pub fn shade(&self, count: usize) -> char {
        const SHADES: [char; 4] = ['░', '▒', '▓', '█'];
        let t = self.normalize(count);
        let idx = (t * (SHADES.len() - 1) as f64).round() as usize;
        SHADES[idx.min(SHADES.len() - 1)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CountEntry;

    fn counts(values: &[usize]) -> CountAggregation {
        CountAggregation {
            column: None,
            entries: values
                .iter()
                .enumerate()
                .map(|(i, &count)| CountEntry {
                    value: format!("P{}", i),
                    count,
                })
                .collect(),
        }
    }

    #[test]
    fn test_normalize_range() {
        let scale = ColorScale::from_counts(&counts(&[2, 4, 6]));
        assert_eq!(scale.normalize(2), 0.0);
        assert_eq!(scale.normalize(4), 0.5);
        assert_eq!(scale.normalize(6), 1.0);
        assert_eq!(scale.color(2), GREENS[0]);
        assert_eq!(scale.color(6), GREENS[8]);
    }

    #[test]
    fn test_empty_counts_are_neutral() {
        let scale = ColorScale::from_counts(&CountAggregation::default());
        assert!(scale.is_degenerate());
        let t = scale.normalize(0);
        assert!(t.is_finite());
        assert_eq!(t, 0.5);
    }

    #[test]
    fn test_equal_counts_are_neutral() {
        let scale = ColorScale::from_counts(&counts(&[3, 3, 3]));
        assert!(scale.is_degenerate());
        assert_eq!(scale.normalize(3), 0.5);
        assert_eq!(scale.color(3), greens(0.5));
    }

    #[test]
    fn test_shade_extremes() {
        let scale = ColorScale::new(1, 5);
        assert_eq!(scale.shade(1), '░');
        assert_eq!(scale.shade(5), '█');
    }

    #[test]
    fn test_greens_non_finite() {
        assert_eq!(greens(f64::NAN), Rgb::NEUTRAL);
        assert_eq!(greens(2.0), GREENS[8]);
    }

    #[test]
    fn test_hex_round_trip_and_palette() {
        assert_eq!(Rgb::from_hex("#02C028"), Some(Rgb { r: 2, g: 192, b: 40 }));
        assert_eq!(Rgb::from_hex("#fff"), Some(Rgb { r: 255, g: 255, b: 255 }));
        assert_eq!(Rgb::from_hex("green"), None);
        assert_eq!(Rgb { r: 2, g: 192, b: 40 }.to_string(), "#02c028");

        let palette = vec!["#02C028".to_string(), "not-a-color".to_string()];
        assert_eq!(series_color(&palette, 0), "#02c028");
        assert!(series_color(&palette, 1).starts_with("hsl("));
        assert!(series_color(&palette, 5).starts_with("hsl("));
    }
}
