use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Color used when a shape does not name one, or names one we cannot parse.
pub const DEFAULT_COLOR: &str = "#000000";

pub const HEX_COLOR_PATTERN: &str = r"^#(?:[A-Fa-f0-9]{3}|[A-Fa-f0-9]{6})$";

static HEX_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(HEX_COLOR_PATTERN).unwrap_or_else(|e| panic!("bad hex color pattern: {e}"))
});

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ColorError {
    #[error("Invalid color format '{0}', expected #RGB or #RRGGBB")]
    InvalidColorFormat(String),
}

/// Output color model a document renderer expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Rgb,
    Cmyk,
}

/// 8-bit RGB color as typed by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub fn to_unit(self) -> (f64, f64, f64) {
        (
            self.r as f64 / 255.0,
            self.g as f64 / 255.0,
            self.b as f64 / 255.0,
        )
    }
}

/// A color ready for a document renderer; every channel is in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "lowercase")]
pub enum TargetColor {
    Rgb { r: f64, g: f64, b: f64 },
    Cmyk { c: f64, m: f64, y: f64, k: f64 },
}

pub fn is_hex_color(hex: &str) -> bool {
    HEX_COLOR.is_match(hex)
}

/// Parse `#RGB` or `#RRGGBB`.
pub fn parse_hex(hex: &str) -> Result<Rgb8, ColorError> {
    if !is_hex_color(hex) {
        return Err(ColorError::InvalidColorFormat(hex.to_string()));
    }
    let digits = &hex[1..];
    let channel = |s: &str| {
        u8::from_str_radix(s, 16).map_err(|_| ColorError::InvalidColorFormat(hex.to_string()))
    };
    if digits.len() == 3 {
        // #abc is shorthand for #aabbcc
        let nibble = |i: usize| channel(&digits[i..i + 1]).map(|v| v * 17);
        Ok(Rgb8 {
            r: nibble(0)?,
            g: nibble(1)?,
            b: nibble(2)?,
        })
    } else {
        Ok(Rgb8 {
            r: channel(&digits[0..2])?,
            g: channel(&digits[2..4])?,
            b: channel(&digits[4..6])?,
        })
    }
}

/// Convert a unit RGB triple to CMYK.
///
/// `k = 1 - max(r, g, b)`, then each of c/m/y is `(1 - channel - k) / (1 - k)`.
/// Pure black short-circuits to `c = m = y = 0` so the division never runs
/// with a zero denominator. No rounding is applied.
pub fn rgb_to_cmyk(r: f64, g: f64, b: f64) -> (f64, f64, f64, f64) {
    let k = 1.0 - r.max(g).max(b);
    if k >= 1.0 {
        return (0.0, 0.0, 0.0, 1.0);
    }
    let c = (1.0 - r - k) / (1.0 - k);
    let m = (1.0 - g - k) / (1.0 - k);
    let y = (1.0 - b - k) / (1.0 - k);
    (c, m, y, k)
}

pub fn hex_to_target_color(hex: &str, mode: ColorMode) -> Result<TargetColor, ColorError> {
    let (r, g, b) = parse_hex(hex)?.to_unit();
    Ok(match mode {
        ColorMode::Rgb => TargetColor::Rgb { r, g, b },
        ColorMode::Cmyk => {
            let (c, m, y, k) = rgb_to_cmyk(r, g, b);
            TargetColor::Cmyk { c, m, y, k }
        }
    })
}

/// Like [`hex_to_target_color`] but substitutes [`DEFAULT_COLOR`] for an
/// unparseable input.
pub fn hex_to_target_color_or_default(hex: &str, mode: ColorMode) -> TargetColor {
    match hex_to_target_color(hex, mode) {
        Ok(color) => color,
        Err(e) => {
            log::warn!("{}; falling back to {}", e, DEFAULT_COLOR);
            match mode {
                ColorMode::Rgb => TargetColor::Rgb {
                    r: 0.0,
                    g: 0.0,
                    b: 0.0,
                },
                ColorMode::Cmyk => TargetColor::Cmyk {
                    c: 0.0,
                    m: 0.0,
                    y: 0.0,
                    k: 1.0,
                },
            }
        }
    }
}
