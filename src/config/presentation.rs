//! Status card appearance.

use serde::{Deserialize, Deserializer};
use std::fmt;

use super::defaults::{
    default_connect_label, default_fallback_color, default_footer, default_palette,
};

/// Colours and fixed wording used when rendering status cards.
#[derive(Debug, Clone, Deserialize)]
pub struct PresentationConfig {
    /// Card colour per roster position. Servers past the end of the
    /// palette use `fallback_color`.
    #[serde(default = "default_palette")]
    pub palette: Vec<HexColor>,
    /// Colour for servers without a palette entry (default: #999999).
    #[serde(default = "default_fallback_color")]
    pub fallback_color: HexColor,
    /// Footer text next to the update timestamp.
    #[serde(default = "default_footer")]
    pub footer: String,
    /// Label of the connect button.
    #[serde(default = "default_connect_label")]
    pub connect_label: String,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            palette: default_palette(),
            fallback_color: default_fallback_color(),
            footer: default_footer(),
            connect_label: default_connect_label(),
        }
    }
}

impl PresentationConfig {
    /// Colour for the server at roster position `index`.
    pub fn color_for(&self, index: usize) -> HexColor {
        self.palette
            .get(index)
            .copied()
            .unwrap_or(self.fallback_color)
    }
}

/// A 24-bit RGB colour written as `#rrggbb` in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexColor(pub u32);

impl HexColor {
    /// Parse `#rrggbb` (the leading `#` is optional).
    pub fn parse(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        u32::from_str_radix(hex, 16).ok().map(Self)
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

impl<'de> Deserialize<'de> for HexColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid colour '{raw}', expected #rrggbb"))
        })
    }
}
