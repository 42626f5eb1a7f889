use serde::{Deserialize, Serialize};
use std::fmt;

/// Decoration color handed to the renderer as-is. 8 bits per channel.
///
/// On the wire it is a `#RRGGBB` (opaque) or `#RRGGBBAA` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("'{0}' is not a #RRGGBB or #RRGGBBAA color")]
    InvalidHex(String),
}

impl Color {
    pub const fn opaque(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: u8::MAX,
        }
    }

    pub const fn with_alpha(self, alpha: u8) -> Self {
        Self { alpha, ..self }
    }

    pub fn from_hex(text: &str) -> Result<Self, ColorError> {
        let invalid = || ColorError::InvalidHex(text.to_string());
        let digits = text.strip_prefix('#').unwrap_or(text);
        if !digits.is_ascii() || !(digits.len() == 6 || digits.len() == 8) {
            return Err(invalid());
        }
        let mut channels = [u8::MAX; 4];
        for (slot, pair) in channels.iter_mut().zip(digits.as_bytes().chunks(2)) {
            let pair = std::str::from_utf8(pair).map_err(|_| invalid())?;
            *slot = u8::from_str_radix(pair, 16).map_err(|_| invalid())?;
        }
        let [red, green, blue, alpha] = channels;
        Ok(Self {
            red,
            green,
            blue,
            alpha,
        })
    }

    pub fn to_hex(&self) -> String {
        let rgb = format!("#{:02X}{:02X}{:02X}", self.red, self.green, self.blue);
        if self.alpha == u8::MAX {
            rgb
        } else {
            format!("{rgb}{:02X}", self.alpha)
        }
    }

    /// Highlight palette.
    pub const BLACK: Color = Color::opaque(0, 0, 0);
    pub const WHITE: Color = Color::opaque(255, 255, 255);
    pub const RED: Color = Color::opaque(252, 98, 85);
    pub const GREEN: Color = Color::opaque(131, 193, 103);
    pub const BLUE: Color = Color::opaque(88, 196, 221);
    pub const YELLOW: Color = Color::opaque(255, 255, 0);
}

impl Default for Color {
    fn default() -> Self {
        Color::YELLOW
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}
