//! Presentation gateway: the chat platform as seen by the reconciler.
//!
//! The [`Gateway`] trait covers the handful of REST calls the daemon makes.
//! [`DiscordGateway`] implements it over serenity's HTTP client; tests use
//! an in-memory fake.

use async_trait::async_trait;
use thiserror::Error;

mod discord;
mod ids;

pub use discord::DiscordGateway;
pub use ids::{ChannelId, GuildId, InvalidId, MessageId};

use crate::status::StatusCard;

/// Channel kinds the daemon cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    Category,
    Text,
    Voice,
    Other,
}

/// A guild channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    pub id: ChannelId,
    pub name: String,
    pub kind: ChannelKind,
    /// Category the channel sits in.
    pub parent: Option<ChannelId>,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The channel or message no longer exists.
    #[error("not found")]
    NotFound,
    #[error("rate limited")]
    RateLimited,
    #[error("http error{}: {message}", status.map(|s| format!(" {s}")).unwrap_or_default())]
    Http { status: Option<u16>, message: String },
    #[error(transparent)]
    InvalidId(#[from] InvalidId),
}

impl GatewayError {
    /// Get a static error code string for metrics labeling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::RateLimited => "rate_limited",
            Self::Http { .. } => "http",
            Self::InvalidId(_) => "invalid_id",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

#[async_trait]
pub trait Gateway: Send + Sync {
    /// Every channel in the guild.
    async fn channels(&self) -> Result<Vec<ChannelInfo>, GatewayError>;

    /// A single channel, or `None` if it was deleted.
    async fn channel(&self, id: ChannelId) -> Result<Option<ChannelInfo>, GatewayError>;

    async fn create_channel(
        &self,
        name: &str,
        kind: ChannelKind,
        parent: Option<ChannelId>,
    ) -> Result<ChannelInfo, GatewayError>;

    async fn rename_channel(&self, id: ChannelId, name: &str) -> Result<(), GatewayError>;

    /// Post a new status card.
    async fn send_card(&self, channel: ChannelId, card: &StatusCard)
    -> Result<MessageId, GatewayError>;

    /// Replace the content of an existing status card.
    ///
    /// Fails with [`GatewayError::NotFound`] if the message was deleted.
    async fn edit_card(
        &self,
        channel: ChannelId,
        message: MessageId,
        card: &StatusCard,
    ) -> Result<(), GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = GatewayError::Http {
            status: Some(500),
            message: "Internal Server Error".into(),
        };
        assert_eq!(e.to_string(), "http error 500: Internal Server Error");
        let e = GatewayError::Http {
            status: None,
            message: "connection reset".into(),
        };
        assert_eq!(e.to_string(), "http error: connection reset");
        assert_eq!(e.error_code(), "http");
        assert!(GatewayError::NotFound.is_not_found());
    }
}
