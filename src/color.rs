use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ColorError {
    #[error("Empty color value")]
    Empty,
    #[error("Invalid hex color: {0}")]
    InvalidHex(String),
    #[error("Unknown color name: {0}")]
    UnknownName(String),
}

/// An RGBA color as stored in the surface buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

pub const BACKGROUND: Color = Color::rgb(0xff, 0xff, 0xff);
pub const GRID_LINE: Color = Color::rgb(0xcc, 0xcc, 0xcc);
pub const DEFAULT_DRAW: Color = Color::rgb(0x00, 0x00, 0x00);

/// Swatches offered by the toolbar, in number-key order (1..9, then 0).
pub const PALETTE: [Color; 10] = [
    Color::rgb(0x00, 0x00, 0x00),
    Color::rgb(0xff, 0xff, 0xff),
    Color::rgb(0xff, 0x00, 0x00),
    Color::rgb(0xff, 0xa5, 0x00),
    Color::rgb(0xff, 0xff, 0x00),
    Color::rgb(0x00, 0xff, 0x00),
    Color::rgb(0x00, 0xff, 0xff),
    Color::rgb(0x00, 0x00, 0xff),
    Color::rgb(0x80, 0x00, 0x80),
    Color::rgb(0xa5, 0x2a, 0x2a),
];

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_rgba(px: [u8; 4]) -> Self {
        Self::rgba(px[0], px[1], px[2], px[3])
    }

    fn from_name(name: &str) -> Option<Self> {
        let color = match name {
            "black" => Self::rgb(0, 0, 0),
            "white" => Self::rgb(255, 255, 255),
            "red" => Self::rgb(255, 0, 0),
            "green" => Self::rgb(0, 128, 0),
            "lime" => Self::rgb(0, 255, 0),
            "blue" => Self::rgb(0, 0, 255),
            "yellow" => Self::rgb(255, 255, 0),
            "orange" => Self::rgb(255, 165, 0),
            "purple" => Self::rgb(128, 0, 128),
            "pink" => Self::rgb(255, 192, 203),
            "cyan" => Self::rgb(0, 255, 255),
            "magenta" => Self::rgb(255, 0, 255),
            "gray" | "grey" => Self::rgb(128, 128, 128),
            "brown" => Self::rgb(165, 42, 42),
            _ => return None,
        };
        Some(color)
    }

    fn from_hex(digits: &str) -> Result<Self, ColorError> {
        let invalid = || ColorError::InvalidHex(format!("#{}", digits));
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        // Short form doubles each nibble: #abc == #aabbcc
        let nibble = |i: usize| u8::from_str_radix(&digits[i..i + 1], 16).map(|v| v * 17);
        let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16);

        match digits.len() {
            3 => Ok(Self::rgb(
                nibble(0).map_err(|_| invalid())?,
                nibble(1).map_err(|_| invalid())?,
                nibble(2).map_err(|_| invalid())?,
            )),
            6 | 8 => {
                let alpha = if digits.len() == 8 { byte(6).map_err(|_| invalid())? } else { 255 };
                Ok(Self::rgba(
                    byte(0).map_err(|_| invalid())?,
                    byte(2).map_err(|_| invalid())?,
                    byte(4).map_err(|_| invalid())?,
                    alpha,
                ))
            }
            _ => Err(invalid()),
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        DEFAULT_DRAW
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim().to_lowercase();
        if value.is_empty() {
            return Err(ColorError::Empty);
        }
        match value.strip_prefix('#') {
            Some(digits) => Self::from_hex(digits),
            None => Self::from_name(&value).ok_or(ColorError::UnknownName(value)),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}
