//! Styling colors carried through to the drawing step.
use bytemuck::{Pod, Zeroable};

use crate::error::ColorParseError;

/// A color in the linear sRGB color space with an alpha component.
///
/// Values are stored as `f32`s, typically in the range `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Creates a new `Color` from four `f32` values (red, green, blue, alpha).
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a new `Color` from four `u8` values (red, green, blue, alpha).
    #[inline]
    pub fn from_rgba_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: a as f32 / 255.0,
        }
    }

    /// Creates a new opaque `Color` from three `u8` values (red, green, blue).
    #[inline]
    pub fn from_rgb_u8(r: u8, g: u8, b: u8) -> Self {
        Self::from_rgba_u8(r, g, b, 255)
    }

    /// Parses `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`.
    ///
    /// ```
    /// use glide_slider::Color;
    ///
    /// let accent = Color::from_hex("#bb00ffe0").unwrap();
    /// assert_eq!(accent, Color::from_rgba_u8(0xbb, 0x00, 0xff, 0xe0));
    /// assert_eq!(Color::from_hex("#ccc").unwrap(), Color::from_rgb_u8(0xcc, 0xcc, 0xcc));
    /// ```
    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let digits = hex
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError::MissingHash(hex.to_owned()))?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::InvalidDigit(hex.to_owned()));
        }

        let nibble = |i: usize| u8::from_str_radix(&digits[i..=i], 16).unwrap_or(0);
        let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).unwrap_or(0);

        match digits.len() {
            3 => Ok(Self::from_rgb_u8(
                nibble(0) * 17,
                nibble(1) * 17,
                nibble(2) * 17,
            )),
            4 => Ok(Self::from_rgba_u8(
                nibble(0) * 17,
                nibble(1) * 17,
                nibble(2) * 17,
                nibble(3) * 17,
            )),
            6 => Ok(Self::from_rgb_u8(byte(0), byte(2), byte(4))),
            8 => Ok(Self::from_rgba_u8(byte(0), byte(2), byte(4), byte(6))),
            _ => Err(ColorParseError::InvalidLength(hex.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex_rejects_malformed_input() {
        assert_eq!(
            Color::from_hex("ccc"),
            Err(ColorParseError::MissingHash("ccc".to_owned()))
        );
        assert_eq!(
            Color::from_hex("#ccccc"),
            Err(ColorParseError::InvalidLength("#ccccc".to_owned()))
        );
        assert_eq!(
            Color::from_hex("#gg0000"),
            Err(ColorParseError::InvalidDigit("#gg0000".to_owned()))
        );
    }

    #[test]
    fn test_from_hex_short_forms_expand() {
        assert_eq!(
            Color::from_hex("#fff").unwrap(),
            Color::new(1.0, 1.0, 1.0, 1.0)
        );
        assert_eq!(
            Color::from_hex("#0008").unwrap(),
            Color::from_rgba_u8(0, 0, 0, 0x88)
        );
    }
}
