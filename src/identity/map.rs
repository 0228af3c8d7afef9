//! The identity mapping and its on-disk format.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

use super::PersistenceError;
use crate::gateway::{ChannelId, MessageId};

/// Current on-disk format version.
pub const FORMAT_VERSION: u32 = 1;

const LEGACY_CHANNEL_KEY: &str = "textChannelId";

/// Which platform objects represent which server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityMap {
    /// The status text channel, shared by every server.
    pub text_channel: Option<ChannelId>,
    /// Status message per server name.
    pub messages: BTreeMap<String, MessageId>,
    /// Voice channel per server name.
    pub voice_channels: BTreeMap<String, ChannelId>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StateFile {
    version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text_channel_id: Option<ChannelId>,
    #[serde(default)]
    messages: BTreeMap<String, MessageId>,
    #[serde(default)]
    voice_channels: BTreeMap<String, ChannelId>,
}

impl IdentityMap {
    pub fn is_empty(&self) -> bool {
        self.text_channel.is_none() && self.messages.is_empty() && self.voice_channels.is_empty()
    }

    /// Encode in the current file format.
    pub fn to_json(&self) -> Result<String, PersistenceError> {
        let file = StateFile {
            version: FORMAT_VERSION,
            text_channel_id: self.text_channel,
            messages: self.messages.clone(),
            voice_channels: self.voice_channels.clone(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Decode either the current format or the older unversioned one,
    /// `{"textChannelId": "...", "<server>": "<message id>", ...}`.
    pub fn from_json(raw: &str) -> Result<Self, PersistenceError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| PersistenceError::Corrupt(e.to_string()))?;
        let Value::Object(object) = &value else {
            return Err(PersistenceError::Corrupt("top level is not an object".into()));
        };

        // A legacy file can hold a server named "version", whose value is a
        // snowflake. Only a small integer marks the versioned layout.
        match object.get("version").filter(|v| is_format_version(v)) {
            Some(version) => {
                let file: StateFile = serde_json::from_value(value.clone())
                    .map_err(|e| PersistenceError::Corrupt(e.to_string()))?;
                if file.version != FORMAT_VERSION {
                    return Err(PersistenceError::Corrupt(format!(
                        "unsupported format version {version}"
                    )));
                }
                Ok(Self {
                    text_channel: file.text_channel_id,
                    messages: file.messages,
                    voice_channels: file.voice_channels,
                })
            }
            None => Ok(Self::from_legacy(object)),
        }
    }

    fn from_legacy(object: &serde_json::Map<String, Value>) -> Self {
        let mut map = Self::default();
        for (key, value) in object {
            let raw = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                _ => {
                    warn!(key = %key, "Skipping non-id entry in legacy identity file");
                    continue;
                }
            };
            if key == LEGACY_CHANNEL_KEY {
                match raw.parse() {
                    Ok(id) => map.text_channel = Some(id),
                    Err(e) => warn!(error = %e, "Skipping bad text channel id in legacy identity file"),
                }
            } else {
                match raw.parse() {
                    Ok(id) => {
                        map.messages.insert(key.clone(), id);
                    }
                    Err(e) => warn!(server = %key, error = %e, "Skipping bad message id in legacy identity file"),
                }
            }
        }
        map
    }
}

fn is_format_version(value: &Value) -> bool {
    value.as_u64().is_some_and(|v| u32::try_from(v).is_ok())
}
