//! Voice channel names.
//!
//! A server's voice channel is named `"{indicator} {name} ({n} / {max})"`
//! or `"{indicator} {name} (Offline)"`. Discovery parses the name back out
//! of that shape, so the two functions here must stay in sync.

use super::{OFFLINE_INDICATOR, ONLINE_INDICATOR, ServerStatus};

/// Longest server name kept in a label. Together with the widest counter
/// suffix this stays under Discord's 100-character channel name limit.
const MAX_LABEL_NAME: usize = 64;

/// Server name as it appears inside a label.
pub fn label_name(name: &str) -> &str {
    match name.char_indices().nth(MAX_LABEL_NAME) {
        Some((cut, _)) => &name[..cut],
        None => name,
    }
}

/// Voice channel name for a server's current status.
pub fn voice_label(name: &str, status: &ServerStatus) -> String {
    let name = label_name(name);
    if status.online {
        format!(
            "{} {} ({} / {})",
            status.indicator(),
            name,
            status.players,
            status.max_players
        )
    } else {
        format!("{} {} (Offline)", status.indicator(), name)
    }
}

/// Recover the server name from a voice channel name produced by
/// [`voice_label`]. Returns `None` for names of any other shape.
pub fn parse_label_name(label: &str) -> Option<&str> {
    let rest = label
        .strip_prefix(ONLINE_INDICATOR)
        .or_else(|| label.strip_prefix(OFFLINE_INDICATOR))?
        .strip_prefix(' ')?;
    let (name, suffix) = rest.rsplit_once(" (")?;
    suffix.ends_with(')').then_some(name)
}
