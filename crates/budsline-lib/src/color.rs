//! Color parsing, formatting and battery gradients.
//!
//! Colors are handled as [`Rgb`] triples and rendered as `#RRGGBB`, the form
//! status bar hosts expect in a block's `color` field.

use std::fmt;

use crate::error::{BudslineError, Result};

/// A 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Parse a color string.
///
/// Accepts:
/// - Hex: `"#FF0000"`, `"FF0000"`, `"#ff0000"`, short `"#F00"`
/// - Named: `"red"`, `"green"`, `"blue"`, `"white"`, `"orange"`, `"yellow"`, `"purple"`,
///   `"cyan"`, `"gray"`, `"black"`
pub fn parse_color(s: &str) -> Result<Rgb> {
    let s = s.trim();

    match s.to_lowercase().as_str() {
        "red" => return Ok(Rgb::new(0xFF, 0x00, 0x00)),
        "green" => return Ok(Rgb::new(0x00, 0xFF, 0x00)),
        "blue" => return Ok(Rgb::new(0x00, 0x00, 0xFF)),
        "white" => return Ok(Rgb::new(0xFF, 0xFF, 0xFF)),
        "orange" => return Ok(Rgb::new(0xFF, 0x80, 0x00)),
        "yellow" => return Ok(Rgb::new(0xFF, 0xFF, 0x00)),
        "purple" => return Ok(Rgb::new(0x80, 0x00, 0xFF)),
        "cyan" => return Ok(Rgb::new(0x00, 0xFF, 0xFF)),
        "gray" | "grey" => return Ok(Rgb::new(0x80, 0x80, 0x80)),
        "black" => return Ok(Rgb::new(0x00, 0x00, 0x00)),
        _ => {}
    }

    let hex = s.strip_prefix('#').unwrap_or(s);
    let invalid = || BudslineError::Color(format!("Invalid hex color: {s}"));
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());
    match hex.len() {
        6 => Ok(Rgb::new(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        // #RGB → #RRGGBB
        3 => Ok(Rgb::new(
            channel(&hex[0..1].repeat(2))?,
            channel(&hex[1..2].repeat(2))?,
            channel(&hex[2..3].repeat(2))?,
        )),
        _ => Err(BudslineError::Color(format!(
            "Invalid color: {s} (use #RRGGBB or a color name)"
        ))),
    }
}

/// Colors for every integer level `0..=steps`, linearly interpolated per channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gradient {
    colors: Vec<Rgb>,
}

impl Gradient {
    /// `from` sits at level 0, `to` at level `steps`.
    pub fn new(from: Rgb, to: Rgb, steps: usize) -> Self {
        if steps == 0 {
            return Self { colors: vec![from] };
        }
        let lerp = |a: u8, b: u8, i: usize| -> u8 {
            let (a, b, i, n) = (a as i64, b as i64, i as i64, steps as i64);
            let v = a + ((b - a) * i * 2 + n * (b - a).signum()) / (2 * n);
            v.clamp(0, 255) as u8
        };
        let colors = (0..=steps)
            .map(|i| {
                Rgb::new(
                    lerp(from.r, to.r, i),
                    lerp(from.g, to.g, i),
                    lerp(from.b, to.b, i),
                )
            })
            .collect();
        Self { colors }
    }

    /// Color for `level`. Levels past the end clamp to the last color.
    pub fn get(&self, level: usize) -> Rgb {
        let idx = level.min(self.colors.len() - 1);
        self.colors[idx]
    }

    /// Number of levels (`steps + 1`).
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb = Rgb::new(0xFF, 0, 0);
    const GREEN: Rgb = Rgb::new(0, 0xFF, 0);

    // ── parse_color ──

    #[test]
    fn parse_named_colors() {
        assert_eq!(parse_color("red").unwrap(), RED);
        assert_eq!(parse_color("green").unwrap(), GREEN);
        assert_eq!(parse_color("gray").unwrap(), Rgb::new(0x80, 0x80, 0x80));
    }

    #[test]
    fn parse_named_case_insensitive() {
        assert_eq!(parse_color("RED").unwrap(), RED);
        assert_eq!(parse_color("  Red  ").unwrap(), RED);
    }

    #[test]
    fn parse_hex_with_and_without_hash() {
        assert_eq!(parse_color("#FF0000").unwrap(), RED);
        assert_eq!(parse_color("00ff00").unwrap(), GREEN);
        assert_eq!(parse_color("#123456").unwrap(), Rgb::new(0x12, 0x34, 0x56));
    }

    #[test]
    fn parse_short_hex_expands() {
        assert_eq!(parse_color("#f80").unwrap(), Rgb::new(0xFF, 0x88, 0x00));
    }

    #[test]
    fn parse_invalid_length() {
        assert!(parse_color("#FFFF").is_err());
        assert!(parse_color("#FF000000").is_err());
    }

    #[test]
    fn parse_invalid_chars() {
        assert!(parse_color("#GGHHII").is_err());
        assert!(parse_color("chartreuse").is_err());
        // Multi-byte input must not panic on slicing
        assert!(parse_color("#ééé").is_err());
    }

    // ── Display ──

    #[test]
    fn display_pads_and_uppercases() {
        assert_eq!(Rgb::new(0x0a, 0x0b, 0xcd).to_string(), "#0A0BCD");
        assert_eq!(parse_color("#ab12cd").unwrap().to_string(), "#AB12CD");
    }

    // ── Gradient ──

    #[test]
    fn gradient_has_steps_plus_one_colors() {
        let g = Gradient::new(RED, GREEN, 100);
        assert_eq!(g.len(), 101);
    }

    #[test]
    fn gradient_endpoints() {
        let g = Gradient::new(RED, GREEN, 100);
        assert_eq!(g.get(0), RED);
        assert_eq!(g.get(100), GREEN);
    }

    #[test]
    fn gradient_midpoint() {
        let g = Gradient::new(Rgb::new(0, 0, 0), Rgb::new(200, 100, 0), 2);
        assert_eq!(g.get(1), Rgb::new(100, 50, 0));
    }

    #[test]
    fn gradient_is_monotonic() {
        let g = Gradient::new(RED, GREEN, 100);
        for pair in g.colors().windows(2) {
            assert!(pair[0].r >= pair[1].r);
            assert!(pair[0].g <= pair[1].g);
        }
    }

    #[test]
    fn gradient_clamps_past_end() {
        let g = Gradient::new(RED, GREEN, 10);
        assert_eq!(g.get(11), GREEN);
        assert_eq!(g.get(255), GREEN);
    }

    #[test]
    fn gradient_zero_steps_is_single_color() {
        let g = Gradient::new(RED, GREEN, 0);
        assert_eq!(g.len(), 1);
        assert_eq!(g.get(0), RED);
        assert_eq!(g.get(5), RED);
    }
}
