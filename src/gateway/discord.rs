//! Discord REST implementation of the gateway.

use async_trait::async_trait;
use serenity::builder::{
    CreateActionRow, CreateButton, CreateChannel, CreateEmbed, CreateEmbedFooter, CreateMessage,
    EditChannel, EditMessage,
};
use serenity::http::{Http, HttpError};
use serenity::model::Timestamp;
use serenity::model::channel::{Channel, ChannelType, GuildChannel};
use serenity::model::id as sid;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::{ChannelId, ChannelInfo, ChannelKind, Gateway, GatewayError, GuildId, MessageId};
use crate::status::StatusCard;

/// Longest wait for a channel rename. Discord allows two renames per
/// channel every ten minutes and serenity sleeps through the limit, which
/// would stall the whole pass.
const RENAME_TIMEOUT: Duration = Duration::from_secs(10);

/// Talks to one guild through serenity's HTTP client. No websocket session
/// is opened; everything the daemon needs is plain REST.
pub struct DiscordGateway {
    http: Arc<Http>,
    guild: sid::GuildId,
}

impl DiscordGateway {
    /// Create a client and check the token by fetching the bot user.
    pub async fn connect(token: &str, guild: GuildId) -> Result<Self, GatewayError> {
        let http = Arc::new(Http::new(token));
        let user = http.get_current_user().await.map_err(map_error)?;
        info!(user = %user.name, guild = %guild, "Authenticated with Discord");
        Ok(Self {
            http,
            guild: sid::GuildId::new(guild.get()),
        })
    }
}

#[async_trait]
impl Gateway for DiscordGateway {
    async fn channels(&self) -> Result<Vec<ChannelInfo>, GatewayError> {
        let channels = self
            .guild
            .channels(self.http.as_ref())
            .await
            .map_err(map_error)?;
        channels.values().map(channel_info).collect()
    }

    async fn channel(&self, id: ChannelId) -> Result<Option<ChannelInfo>, GatewayError> {
        match to_serenity_channel(id).to_channel(self.http.as_ref()).await {
            Ok(Channel::Guild(channel)) => channel_info(&channel).map(Some),
            Ok(_) => Ok(None),
            Err(e) => match map_error(e) {
                GatewayError::NotFound => Ok(None),
                other => Err(other),
            },
        }
    }

    async fn create_channel(
        &self,
        name: &str,
        kind: ChannelKind,
        parent: Option<ChannelId>,
    ) -> Result<ChannelInfo, GatewayError> {
        let mut builder = CreateChannel::new(name).kind(match kind {
            ChannelKind::Category => ChannelType::Category,
            ChannelKind::Voice => ChannelType::Voice,
            ChannelKind::Text | ChannelKind::Other => ChannelType::Text,
        });
        if let Some(parent) = parent {
            builder = builder.category(to_serenity_channel(parent));
        }
        let created = self
            .guild
            .create_channel(self.http.as_ref(), builder)
            .await
            .map_err(map_error)?;
        debug!(channel_id = %created.id, name = %name, "Channel created");
        channel_info(&created)
    }

    async fn rename_channel(&self, id: ChannelId, name: &str) -> Result<(), GatewayError> {
        let edit = to_serenity_channel(id).edit(self.http.as_ref(), EditChannel::new().name(name));
        match tokio::time::timeout(RENAME_TIMEOUT, edit).await {
            Ok(result) => result.map(|_| ()).map_err(map_error),
            Err(_) => Err(GatewayError::RateLimited),
        }
    }

    async fn send_card(
        &self,
        channel: ChannelId,
        card: &StatusCard,
    ) -> Result<MessageId, GatewayError> {
        let mut builder = CreateMessage::new().embed(build_embed(card));
        if let Some(row) = build_buttons(card) {
            builder = builder.components(vec![row]);
        }
        let message = to_serenity_channel(channel)
            .send_message(self.http.as_ref(), builder)
            .await
            .map_err(map_error)?;
        MessageId::new(message.id.get()).ok_or_else(|| GatewayError::Http {
            status: None,
            message: "discord returned message id 0".into(),
        })
    }

    async fn edit_card(
        &self,
        channel: ChannelId,
        message: MessageId,
        card: &StatusCard,
    ) -> Result<(), GatewayError> {
        let mut builder = EditMessage::new().embed(build_embed(card));
        if let Some(row) = build_buttons(card) {
            builder = builder.components(vec![row]);
        }
        to_serenity_channel(channel)
            .edit_message(
                self.http.as_ref(),
                sid::MessageId::new(message.get()),
                builder,
            )
            .await
            .map_err(map_error)?;
        Ok(())
    }
}

fn to_serenity_channel(id: ChannelId) -> sid::ChannelId {
    sid::ChannelId::new(id.get())
}

fn channel_info(channel: &GuildChannel) -> Result<ChannelInfo, GatewayError> {
    let id = ChannelId::new(channel.id.get()).ok_or_else(|| GatewayError::Http {
        status: None,
        message: "discord returned channel id 0".into(),
    })?;
    Ok(ChannelInfo {
        id,
        name: channel.name.clone(),
        kind: match channel.kind {
            ChannelType::Category => ChannelKind::Category,
            ChannelType::Text => ChannelKind::Text,
            ChannelType::Voice => ChannelKind::Voice,
            _ => ChannelKind::Other,
        },
        parent: channel.parent_id.and_then(|p| ChannelId::new(p.get())),
    })
}

/// Convert a status card into an embed, stamped with the current time.
fn build_embed(card: &StatusCard) -> CreateEmbed {
    let mut builder = CreateEmbed::new()
        .title(&card.title)
        .color(card.color)
        .footer(CreateEmbedFooter::new(&card.footer))
        .timestamp(Timestamp::now());
    if let Some(ref description) = card.description {
        builder = builder.description(description);
    }
    if let Some(ref thumbnail) = card.thumbnail {
        builder = builder.thumbnail(thumbnail);
    }
    for field in &card.fields {
        builder = builder.field(&field.name, &field.value, field.inline);
    }
    builder
}

fn build_buttons(card: &StatusCard) -> Option<CreateActionRow> {
    card.button.as_ref().map(|button| {
        CreateActionRow::Buttons(vec![
            CreateButton::new_link(&button.url).label(&button.label),
        ])
    })
}

/// Translate a serenity error into the gateway taxonomy.
fn map_error(e: serenity::Error) -> GatewayError {
    match e {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) => {
            match response.status_code.as_u16() {
                404 => GatewayError::NotFound,
                429 => GatewayError::RateLimited,
                status => GatewayError::Http {
                    status: Some(status),
                    message: response.error.message,
                },
            }
        }
        other => GatewayError::Http {
            status: None,
            message: other.to_string(),
        },
    }
}
