//! Startup provisioning of the guild layout.
//!
//! Makes sure the monitoring category, one voice channel per server and the
//! status text channel exist before the first pass, creating what is
//! missing and recording ids in the identity store. Unlike per-pass work,
//! a failure here stops the daemon.

use tracing::{info, warn};

use crate::config::{DiscordConfig, ServerConfig};
use crate::error::{GatewayContext, ProvisionError};
use crate::gateway::{ChannelId, ChannelInfo, ChannelKind, Gateway, GatewayError};
use crate::identity::IdentityStore;
use crate::status::{ServerStatus, label_name, parse_label_name, voice_label};

/// Where the reconciler writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Targets {
    pub category: ChannelId,
    pub text_channel: ChannelId,
}

/// Find or create every channel the daemon needs.
pub async fn provision(
    gateway: &dyn Gateway,
    store: &mut IdentityStore,
    discord: &DiscordConfig,
    servers: &[ServerConfig],
) -> Result<Targets, ProvisionError> {
    let mut channels = gateway.channels().await.during_startup("list_channels")?;

    let category = match channels
        .iter()
        .find(|c| c.kind == ChannelKind::Category && c.name == discord.category)
    {
        Some(category) => category.id,
        None => {
            let created = gateway
                .create_channel(&discord.category, ChannelKind::Category, None)
                .await
                .during_startup("create_category")?;
            info!(channel_id = %created.id, name = %created.name, "Created category");
            let id = created.id;
            channels.push(created);
            id
        }
    };

    for server in servers {
        ensure_voice_channel(gateway, store, &mut channels, category, server).await?;
    }

    let text_channel = ensure_text_channel(gateway, store, &channels, category, discord).await?;

    Ok(Targets {
        category,
        text_channel,
    })
}

/// Voice channel for `server` under `category`, matched by the exact name
/// embedded in its label.
pub fn find_voice_channel<'a>(
    channels: &'a [ChannelInfo],
    category: ChannelId,
    server: &ServerConfig,
) -> Option<&'a ChannelInfo> {
    let wanted = label_name(&server.name);
    channels.iter().find(|c| {
        c.kind == ChannelKind::Voice
            && c.parent == Some(category)
            && parse_label_name(&c.name) == Some(wanted)
    })
}

async fn ensure_voice_channel(
    gateway: &dyn Gateway,
    store: &mut IdentityStore,
    channels: &mut Vec<ChannelInfo>,
    category: ChannelId,
    server: &ServerConfig,
) -> Result<(), ProvisionError> {
    if let Some(id) = store.voice_channel(&server.name)
        && channels
            .iter()
            .any(|c| c.id == id && c.kind == ChannelKind::Voice)
    {
        return Ok(());
    }

    let id = match find_voice_channel(channels, category, server) {
        Some(existing) => existing.id,
        None => {
            let label = voice_label(&server.name, &ServerStatus::offline(server));
            let created = gateway
                .create_channel(&label, ChannelKind::Voice, Some(category))
                .await
                .during_startup("create_voice_channel")?;
            info!(server = %server.name, channel_id = %created.id, "Created voice channel");
            let id = created.id;
            channels.push(created);
            id
        }
    };

    if let Err(e) = store.set_voice_channel(&server.name, id) {
        warn!(server = %server.name, error = %e, "Failed to persist voice channel id");
    }
    Ok(())
}

async fn ensure_text_channel(
    gateway: &dyn Gateway,
    store: &mut IdentityStore,
    channels: &[ChannelInfo],
    category: ChannelId,
    discord: &DiscordConfig,
) -> Result<ChannelId, ProvisionError> {
    if let Some(id) = store.text_channel() {
        match gateway.channel(id).await.during_startup("fetch_text_channel")? {
            Some(channel) if channel.kind == ChannelKind::Text => return Ok(id),
            Some(_) => warn!(channel_id = %id, "Stored status channel is not a text channel"),
            None => warn!(channel_id = %id, "Stored status channel was deleted"),
        }
    }

    let id = find_or_create_text_channel(gateway, channels, category, &discord.text_channel)
        .await
        .during_startup("create_text_channel")?;

    if let Err(e) = store.set_text_channel(id) {
        warn!(error = %e, "Failed to persist status channel id");
    }
    Ok(id)
}

/// Text channel named `name` under `category`, created if none exists.
pub async fn find_or_create_text_channel(
    gateway: &dyn Gateway,
    channels: &[ChannelInfo],
    category: ChannelId,
    name: &str,
) -> Result<ChannelId, GatewayError> {
    if let Some(existing) = channels
        .iter()
        .find(|c| c.kind == ChannelKind::Text && c.parent == Some(category) && c.name == name)
    {
        return Ok(existing.id);
    }
    let created = gateway
        .create_channel(name, ChannelKind::Text, Some(category))
        .await?;
    info!(channel_id = %created.id, name = %created.name, "Created status channel");
    Ok(created.id)
}
