// Colour strings and tolerance matching.
//
// Accepted textual forms are `#rgb`, `#rrggbb`, `rgb(r, g, b)` and
// `rgba(r, g, b, a)` where `a` is a float in `[0, 1]`.

use crate::error::Error;
use crate::types::Colour;
use std::str::FromStr;

/// Per-channel tolerance used when the caller does not pick one.
pub const DEFAULT_THRESHOLD: u8 = 5;
/// Pixels with alpha below this count as background (white).
pub const DEFAULT_ALPHA_THRESHOLD: u8 = 1;
/// Greys whose alpha-scaled value exceeds this count as background (white).
pub const DEFAULT_BRIGHTNESS_THRESHOLD: f32 = 180.0;

/// Decides whether a sampled colour belongs to the same region as a reference.
///
/// Both colours are normalized first: near-transparent pixels and washed-out
/// greys (the anti-aliased fringe of line art) collapse to opaque white, so
/// region edges do not leak through them. The seed colour goes through the
/// same rule, which means clicking a near-white pixel fills as if it were white.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchConfig {
    pub threshold: u8,
    pub alpha_threshold: u8,
    pub brightness_threshold: f32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            alpha_threshold: DEFAULT_ALPHA_THRESHOLD,
            brightness_threshold: DEFAULT_BRIGHTNESS_THRESHOLD,
        }
    }
}

impl MatchConfig {
    pub fn with_threshold(threshold: u8) -> Self {
        Self { threshold, ..Self::default() }
    }

    #[inline]
    pub fn normalize(&self, c: Colour) -> Colour {
        if c.a < self.alpha_threshold {
            return Colour::WHITE;
        }
        let achromatic = c.r == c.g && c.g == c.b;
        // a == 0 only reaches here with a zero alpha threshold; r*inf > 180 still holds for r > 0
        if achromatic && c.r as f32 * (255.0 / c.a as f32) > self.brightness_threshold {
            return Colour::WHITE;
        }
        c
    }

    /// Compare an already-normalized reference against a raw sample.
    #[inline]
    pub fn matches_normalized(&self, sample: Colour, reference: Colour) -> bool {
        let s = self.normalize(sample);
        let t = self.threshold as i16;
        (s.r as i16 - reference.r as i16).abs() < t
            && (s.g as i16 - reference.g as i16).abs() < t
            && (s.b as i16 - reference.b as i16).abs() < t
            && (s.a as i16 - reference.a as i16).abs() < t
    }

    /// True iff every channel differs by strictly less than the threshold
    /// after both colours are normalized.
    pub fn matches(&self, sample: Colour, reference: Colour) -> bool {
        self.matches_normalized(sample, self.normalize(reference))
    }
}

impl FromStr for Colour {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_colour(s)
    }
}

/// Parse one colour string.
pub fn parse_colour(input: &str) -> Result<Colour, Error> {
    let s = input.trim();
    let bad = || Error::UnparseableColour(input.to_string());

    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(bad);
    }

    let lower = s.to_ascii_lowercase();
    let (body, expected) = if let Some(rest) = lower.strip_prefix("rgba(") {
        (rest, 4)
    } else if let Some(rest) = lower.strip_prefix("rgb(") {
        (rest, 3)
    } else {
        return Err(bad());
    };
    let body = body.strip_suffix(')').ok_or_else(bad)?;

    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    if parts.len() != expected {
        return Err(bad());
    }

    let mut rgb = [0u8; 3];
    for (slot, part) in rgb.iter_mut().zip(&parts) {
        let v = parse_number(part).ok_or_else(bad)?;
        *slot = v.round().clamp(0.0, 255.0) as u8;
    }
    let a = match parts.get(3) {
        Some(part) => {
            let v = parse_number(part).ok_or_else(bad)?;
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        None => 255,
    };

    Ok(Colour::rgba(rgb[0], rgb[1], rgb[2], a))
}

/// Parse a gradient's colour list. Fails on the first bad entry.
pub fn parse_colours<S: AsRef<str>>(list: &[S]) -> Result<Vec<Colour>, Error> {
    list.iter().map(|s| parse_colour(s.as_ref())).collect()
}

fn parse_number(s: &str) -> Option<f32> {
    s.parse::<f32>().ok().filter(|v| v.is_finite())
}

fn parse_hex(hex: &str) -> Option<Colour> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok();
    let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        // #rgb: each nibble doubles, f -> ff
        3 => Some(Colour::rgb(digit(0)? * 0x11, digit(1)? * 0x11, digit(2)? * 0x11)),
        6 => Some(Colour::rgb(pair(0)?, pair(2)?, pair(4)?)),
        _ => None,
    }
}
