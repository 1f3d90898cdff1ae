//! `#RRGGBB` colours as floating-point triples in `[0, 1]`.

use crate::error::ColorError;

/// Linear RGB triple with each channel in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0.0, g: 0.0, b: 0.0 };

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parse a 7-character `#RRGGBB` string. Hex digits are case-insensitive.
    pub fn from_hex(s: &str) -> Result<Self, ColorError> {
        if s.len() != 7 {
            return Err(ColorError::Length(s.to_owned()));
        }
        let digits = s
            .strip_prefix('#')
            .ok_or_else(|| ColorError::MissingHash(s.to_owned()))?;
        let channel = |i: usize| {
            digits
                .get(i..i + 2)
                .filter(|pair| pair.bytes().all(|b| b.is_ascii_hexdigit()))
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .map(|v| v as f32 / 255.0)
                .ok_or_else(|| ColorError::InvalidHex(s.to_owned()))
        };
        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    /// Lower-case `#rrggbb`, rounding each channel to the nearest byte.
    pub fn to_hex(&self) -> String {
        let [r, g, b] = self.to_bytes();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    pub fn to_bytes(&self) -> [u8; 3] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    pub fn to_array(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl std::str::FromStr for Rgb {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_channels() {
        let c = Rgb::from_hex("#ff8000").unwrap();
        assert_eq!(c.r, 1.0);
        assert!((c.g - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.b, 0.0);
    }

    #[test]
    fn uppercase_digits_accepted() {
        assert_eq!(Rgb::from_hex("#ABCDEF").unwrap().to_hex(), "#abcdef");
    }

    #[test]
    fn rejects_malformed() {
        assert!(matches!(Rgb::from_hex("fff"), Err(ColorError::Length(_))));
        assert!(matches!(Rgb::from_hex("0ffffff"), Err(ColorError::MissingHash(_))));
        assert!(matches!(Rgb::from_hex("#gg0000"), Err(ColorError::InvalidHex(_))));
        // integer parsing alone would take a sign
        assert!(matches!(Rgb::from_hex("#+f+f+f"), Err(ColorError::InvalidHex(_))));
        assert!(matches!(Rgb::from_hex("#00+100"), Err(ColorError::InvalidHex(_))));
        // non-ASCII must not panic on a char boundary
        assert!(Rgb::from_hex("#ééé").is_err());
    }

    #[test]
    fn channels_within_unit_range_and_round_trip() {
        // Stride through the whole byte range on every channel.
        for r in (0..=255u32).step_by(17) {
            for g in (0..=255u32).step_by(15) {
                for b in [0u32, 1, 127, 128, 254, 255] {
                    let hex = format!("#{r:02x}{g:02x}{b:02x}");
                    let c = Rgb::from_hex(&hex).unwrap();
                    for ch in c.to_array() {
                        assert!((0.0..=1.0).contains(&ch));
                    }
                    assert_eq!(c.to_hex(), hex);
                }
            }
        }
    }
}
