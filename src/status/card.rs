//! Status cards: the per-server message in the status text channel.
//!
//! A [`StatusCard`] is a platform-neutral description of an embed. It has
//! no timestamp, so rendering the same status twice yields equal cards and
//! the reconciler can compare them. The gateway adds the time when sending.

use super::ServerStatus;
use crate::config::{Layout, PresentationConfig, ServerConfig};

/// Discord's limit on an embed field value.
pub const FIELD_VALUE_LIMIT: usize = 1024;

/// Discord's limit on an embed title.
pub const TITLE_LIMIT: usize = 256;

const SEPARATOR: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";
const ZERO_WIDTH: &str = "\u{200B}";

/// Room kept at the end of a truncated field for the "and N more" tail.
const TAIL_RESERVE: usize = 32;

/// Rendered message content for one server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCard {
    pub title: String,
    pub description: Option<String>,
    /// RGB colour.
    pub color: u32,
    pub thumbnail: Option<String>,
    pub fields: Vec<CardField>,
    pub footer: String,
    pub button: Option<CardButton>,
}

impl StatusCard {
    /// Description and field text joined, for searching in logs and tests.
    pub fn body(&self) -> String {
        let mut parts: Vec<&str> = self.description.iter().map(String::as_str).collect();
        for field in &self.fields {
            parts.push(&field.name);
            parts.push(&field.value);
        }
        parts.join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl CardField {
    fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            inline: false,
        }
    }
}

/// A link button under the card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardButton {
    pub label: String,
    pub url: String,
}

/// Render the card for the server at roster position `index`.
pub fn render_card(
    index: usize,
    server: &ServerConfig,
    status: &ServerStatus,
    presentation: &PresentationConfig,
) -> StatusCard {
    let mut card = StatusCard {
        title: truncate(
            &format!("{} {}", status.indicator(), server.name),
            TITLE_LIMIT,
        ),
        description: None,
        color: presentation.color_for(index).0,
        thumbnail: None,
        fields: Vec::new(),
        footer: presentation.footer.clone(),
        button: Some(CardButton {
            label: presentation.connect_label.clone(),
            url: server.connect.clone(),
        }),
    };

    if !status.online {
        card.description = Some("🚫 Server offline".to_string());
        return card;
    }

    match server.layout() {
        Layout::Simple => {
            card.description = Some(format!(
                "👥 Players: {}/{}",
                status.players, status.max_players
            ));
        }
        Layout::Rich => {
            card.description = Some(format!("{SEPARATOR}\n{ZERO_WIDTH}"));
            if let Some(map) = &status.map {
                card.thumbnail = server
                    .thumbnail
                    .as_ref()
                    .map(|template| template.replace("{map}", map));
                card.fields.push(CardField::new(
                    "🌍 ┃ Map",
                    truncate(&format!("🔹 {map}\n{ZERO_WIDTH}"), FIELD_VALUE_LIMIT),
                ));
            }
            card.fields.push(CardField::new(
                format!("👥 ┃ Players {}/{}", status.players, status.max_players),
                player_list(status),
            ));
            card.fields.push(CardField::new(ZERO_WIDTH, SEPARATOR));
        }
    }
    card
}

fn player_list(status: &ServerStatus) -> String {
    let lines: Vec<String> = status
        .player_names
        .iter()
        .flatten()
        .map(|name| {
            if name.trim().is_empty() {
                "🔹 *Connecting...*".to_string()
            } else {
                format!("🔹 {name}")
            }
        })
        .collect();

    if !lines.is_empty() {
        join_limited(&lines, FIELD_VALUE_LIMIT)
    } else if status.players == 0 {
        "🔸 Nobody is online".to_string()
    } else {
        // Backend reported a count without names.
        ZERO_WIDTH.to_string()
    }
}

/// Join lines with newlines, stopping before `limit` characters and
/// noting how many lines were left out.
fn join_limited(lines: &[String], limit: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for (i, line) in lines.iter().enumerate() {
        let sep = usize::from(!out.is_empty());
        let len = line.chars().count();
        let last = i + 1 == lines.len();
        let budget = if last { limit } else { limit.saturating_sub(TAIL_RESERVE) };
        if used + sep + len > budget {
            if sep == 1 {
                out.push('\n');
            }
            out.push_str(&format!("… and {} more", lines.len() - i));
            return out;
        }
        if sep == 1 {
            out.push('\n');
        }
        out.push_str(line);
        used += sep + len;
    }
    out
}

fn truncate(s: &str, limit: usize) -> String {
    match s.char_indices().nth(limit.saturating_sub(1)) {
        Some((cut, _)) if s.chars().count() > limit => format!("{}…", &s[..cut]),
        _ => s.to_string(),
    }
}
