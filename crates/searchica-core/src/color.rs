//! Colors as the search service writes them.
//!
//! Marker colors arrive as CSS-like strings, usually `rgb(R, G, B)` with red
//! meaning "more relevant" and blue "less relevant". Backgrounds use plain
//! names such as `white`.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// An opaque 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `value`, falling back to `fallback` when it is not a color we
    /// understand.
    #[must_use]
    pub fn parse_or(value: &str, fallback: Self) -> Self {
        value.parse().unwrap_or(fallback)
    }

    /// Perceived brightness in `0.0..=1.0`.
    #[must_use]
    pub fn luminance(self) -> f64 {
        (0.299 * f64::from(self.r) + 0.587 * f64::from(self.g) + 0.114 * f64::from(self.b))
            / 255.0
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_ascii_lowercase();
        let invalid = || Error::InvalidColor(s.to_string());

        if let Some(hex) = value.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(invalid);
        }

        if let Some(args) = value
            .strip_prefix("rgba(")
            .or_else(|| value.strip_prefix("rgb("))
        {
            let args = args.strip_suffix(')').ok_or_else(invalid)?;
            let channels: Vec<&str> = args.split(',').map(str::trim).collect();
            if channels.len() < 3 || channels.len() > 4 {
                return Err(invalid());
            }
            let channel = |c: &str| {
                c.parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .map(|v| v.round().clamp(0.0, 255.0) as u8)
            };
            return match (channel(channels[0]), channel(channels[1]), channel(channels[2])) {
                (Some(r), Some(g), Some(b)) => Ok(Self::new(r, g, b)),
                _ => Err(invalid()),
            };
        }

        match value.as_str() {
            "white" => Ok(Self::WHITE),
            "black" => Ok(Self::BLACK),
            "red" => Ok(Self::new(255, 0, 0)),
            "green" => Ok(Self::new(0, 128, 0)),
            "blue" => Ok(Self::new(0, 0, 255)),
            "gray" | "grey" => Ok(Self::new(128, 128, 128)),
            "lightgray" | "lightgrey" => Ok(Self::new(211, 211, 211)),
            _ => Err(invalid()),
        }
    }
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    let digit = |i: usize| u8::from_str_radix(hex.get(i..=i)?, 16).ok();
    match hex.len() {
        3 => Some(Rgb::new(digit(0)? * 17, digit(1)? * 17, digit(2)? * 17)),
        6 => {
            let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
            Some(Rgb::new(byte(0)?, byte(2)?, byte(4)?))
        }
        _ => None,
    }
}
