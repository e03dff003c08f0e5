// filepath: src/color.rs
//! Color handling for lintel
//!
//! Colors are parsed from "#rrggbb" / "#rrggbbaa" strings and carried as
//! normalized channels together with the packed pixel value the direct
//! (non-vector) backend writes into ARGB8888 buffers.

use thiserror::Error;

/// Errors produced when parsing a hex color string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("color must start with '#'")]
    MissingHash,
    #[error("expected \"#rrggbb\" or \"#rrggbbaa\", got {0} characters")]
    BadLength(usize),
    #[error("invalid hex digit '{0}'")]
    InvalidDigit(char),
}

/// A color with normalized channels in [0, 1].
///
/// `pixel` is the packed premultiplied ARGB encoding; wl_shm Argb8888
/// buffers expect premultiplied alpha, so the packed value can be written
/// out without further conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
    pub pixel: u32,
}

impl Color {
    /// Creates a color from normalized channels, clamping them to [0, 1].
    pub fn new(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        let red = red.clamp(0.0, 1.0);
        let green = green.clamp(0.0, 1.0);
        let blue = blue.clamp(0.0, 1.0);
        let alpha = alpha.clamp(0.0, 1.0);

        let premultiply = |channel: f64| (channel * alpha * 255.0).round() as u32;
        let pixel = ((alpha * 255.0).round() as u32) << 24
            | premultiply(red) << 16
            | premultiply(green) << 8
            | premultiply(blue);

        Self {
            red,
            green,
            blue,
            alpha,
            pixel,
        }
    }

    /// Creates a color from 8-bit channels.
    pub fn from_rgba8(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self::new(
            red as f64 / 255.0,
            green as f64 / 255.0,
            blue as f64 / 255.0,
            alpha as f64 / 255.0,
        )
    }

    /// Parses a color in "#rrggbb" or "#rrggbbaa" form. A missing alpha
    /// component defaults to fully opaque.
    pub fn from_hex(color: &str) -> Result<Self, ColorError> {
        let Some(digits) = color.strip_prefix('#') else {
            return Err(ColorError::MissingHash);
        };

        let count = digits.chars().count();
        if count != 6 && count != 8 {
            return Err(ColorError::BadLength(count + 1));
        }

        let mut nibbles = [0u8; 8];
        for (i, c) in digits.chars().enumerate() {
            nibbles[i] = c.to_digit(16).ok_or(ColorError::InvalidDigit(c))? as u8;
        }
        let byte = |i: usize| nibbles[2 * i] << 4 | nibbles[2 * i + 1];

        let alpha = if count == 8 { byte(3) } else { 0xff };
        Ok(Self::from_rgba8(byte(0), byte(1), byte(2), alpha))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn black_parses_to_zero_channels_and_opaque_alpha() {
        let color = Color::from_hex("#000000").unwrap();
        assert_eq!(color.red, 0.0);
        assert_eq!(color.green, 0.0);
        assert_eq!(color.blue, 0.0);
        assert_eq!(color.alpha, 1.0);
        assert_eq!(color.pixel, 0xff000000);
    }

    #[test]
    fn white_with_alpha_parses_to_all_ones() {
        let color = Color::from_hex("#ffffffff").unwrap();
        assert_eq!(color.red, 1.0);
        assert_eq!(color.green, 1.0);
        assert_eq!(color.blue, 1.0);
        assert_eq!(color.alpha, 1.0);
        assert_eq!(color.pixel, 0xffffffff);
    }

    #[test]
    fn omitted_alpha_defaults_to_opaque() {
        let color = Color::from_hex("#3fbc59").unwrap();
        assert_eq!(color.alpha, 1.0);
        assert_eq!(color.pixel, 0xff3fbc59);
    }

    #[test]
    fn packed_pixel_is_premultiplied() {
        let color = Color::from_hex("#ff000080").unwrap();
        // 0x80 alpha scales the red channel down to 0x80.
        assert_eq!(color.pixel, 0x80800000);
    }

    #[test]
    fn missing_hash_is_rejected() {
        assert_eq!(Color::from_hex("3fbc59"), Err(ColorError::MissingHash));
    }

    #[test]
    fn wrong_length_is_rejected() {
        assert_eq!(Color::from_hex("#fff"), Err(ColorError::BadLength(4)));
        assert_eq!(Color::from_hex("#3fbc591"), Err(ColorError::BadLength(8)));
    }

    #[test]
    fn non_hex_digit_is_rejected() {
        assert_eq!(
            Color::from_hex("#gg0000"),
            Err(ColorError::InvalidDigit('g'))
        );
    }

    #[test]
    fn non_ascii_digit_is_reported_verbatim() {
        assert_eq!(
            Color::from_hex("#abc€de"),
            Err(ColorError::InvalidDigit('€'))
        );
    }

    #[test]
    fn length_is_counted_in_characters() {
        // Multi-byte characters count once, like in the error message.
        assert_eq!(Color::from_hex("#€€€"), Err(ColorError::BadLength(4)));
    }

    #[test]
    fn out_of_range_channels_are_clamped() {
        let color = Color::new(2.0, -1.0, 0.5, 1.0);
        assert_eq!(color.red, 1.0);
        assert_eq!(color.green, 0.0);
        assert_eq!(color.blue, 0.5);
    }
}
