//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

use std::path::PathBuf;

use super::presentation::HexColor;

// =============================================================================
// Discord Defaults
// =============================================================================

pub fn default_category() -> String {
    "Monitoring".to_string()
}

pub fn default_text_channel() -> String {
    "server-status".to_string()
}

// =============================================================================
// Schedule / Query Defaults
// =============================================================================

pub fn default_interval_secs() -> u64 {
    60
}

pub fn default_timeout_ms() -> u64 {
    5000
}

pub fn default_user_agent() -> String {
    concat!("serverboard/", env!("CARGO_PKG_VERSION")).to_string()
}

// =============================================================================
// State Defaults
// =============================================================================

pub fn default_state_path() -> PathBuf {
    PathBuf::from("data/messages.json")
}

// =============================================================================
// Presentation Defaults
// =============================================================================

pub fn default_palette() -> Vec<HexColor> {
    vec![
        HexColor(0x00ff00),
        HexColor(0xffcc00),
        HexColor(0xff4500),
    ]
}

pub fn default_fallback_color() -> HexColor {
    HexColor(0x999999)
}

pub fn default_footer() -> String {
    "Updated".to_string()
}

pub fn default_connect_label() -> String {
    "Connect".to_string()
}
