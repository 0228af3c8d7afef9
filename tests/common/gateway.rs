//! In-memory guild that records every call made to it.

use async_trait::async_trait;
use parking_lot::Mutex;
use serverboard::gateway::{
    ChannelId, ChannelInfo, ChannelKind, Gateway, GatewayError, MessageId,
};
use serverboard::status::StatusCard;
use std::collections::BTreeMap;

/// One call seen by the fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListChannels,
    FetchChannel(ChannelId),
    CreateChannel { name: String, kind: ChannelKind },
    Rename { id: ChannelId, name: String },
    Send { channel: ChannelId, message: MessageId },
    Edit { channel: ChannelId, message: MessageId },
}

#[derive(Debug, Default)]
struct Guild {
    next_id: u64,
    channels: BTreeMap<ChannelId, ChannelInfo>,
    messages: BTreeMap<MessageId, (ChannelId, StatusCard)>,
    calls: Vec<Call>,
    fail_edits: Option<u16>,
}

impl Guild {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        1_000 + self.next_id
    }
}

#[derive(Debug, Default)]
pub struct FakeGateway {
    guild: Mutex<Guild>,
}

#[allow(dead_code)]
impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a channel as if someone created it by hand.
    pub fn add_channel(&self, name: &str, kind: ChannelKind, parent: Option<ChannelId>) -> ChannelId {
        let mut guild = self.guild.lock();
        let id = ChannelId::new(guild.next_id()).unwrap();
        guild.channels.insert(
            id,
            ChannelInfo {
                id,
                name: name.to_string(),
                kind,
                parent,
            },
        );
        id
    }

    /// Delete a channel and every message posted in it.
    pub fn delete_channel(&self, id: ChannelId) {
        let mut guild = self.guild.lock();
        guild.channels.remove(&id);
        guild.messages.retain(|_, (channel, _)| *channel != id);
    }

    pub fn delete_message(&self, id: MessageId) {
        self.guild.lock().messages.remove(&id);
    }

    /// Make every edit fail with this HTTP status (`None` to stop).
    pub fn fail_edits(&self, status: Option<u16>) {
        self.guild.lock().fail_edits = status;
    }

    pub fn channel_info(&self, id: ChannelId) -> Option<ChannelInfo> {
        self.guild.lock().channels.get(&id).cloned()
    }

    pub fn channels_named(&self, name: &str) -> Vec<ChannelInfo> {
        self.guild
            .lock()
            .channels
            .values()
            .filter(|c| c.name == name)
            .cloned()
            .collect()
    }

    pub fn channel_count(&self) -> usize {
        self.guild.lock().channels.len()
    }

    pub fn voice_channels(&self) -> Vec<ChannelInfo> {
        self.guild
            .lock()
            .channels
            .values()
            .filter(|c| c.kind == ChannelKind::Voice)
            .cloned()
            .collect()
    }

    pub fn card(&self, id: MessageId) -> Option<StatusCard> {
        self.guild.lock().messages.get(&id).map(|(_, card)| card.clone())
    }

    pub fn message_ids(&self) -> Vec<MessageId> {
        self.guild.lock().messages.keys().copied().collect()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.guild.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.guild.lock().calls.clear();
    }

    pub fn count_calls(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.guild.lock().calls.iter().filter(|c| pred(c)).count()
    }
}

#[async_trait]
impl Gateway for FakeGateway {
    async fn channels(&self) -> Result<Vec<ChannelInfo>, GatewayError> {
        let mut guild = self.guild.lock();
        guild.calls.push(Call::ListChannels);
        Ok(guild.channels.values().cloned().collect())
    }

    async fn channel(&self, id: ChannelId) -> Result<Option<ChannelInfo>, GatewayError> {
        let mut guild = self.guild.lock();
        guild.calls.push(Call::FetchChannel(id));
        Ok(guild.channels.get(&id).cloned())
    }

    async fn create_channel(
        &self,
        name: &str,
        kind: ChannelKind,
        parent: Option<ChannelId>,
    ) -> Result<ChannelInfo, GatewayError> {
        let mut guild = self.guild.lock();
        guild.calls.push(Call::CreateChannel {
            name: name.to_string(),
            kind,
        });
        let id = ChannelId::new(guild.next_id()).unwrap();
        let info = ChannelInfo {
            id,
            name: name.to_string(),
            kind,
            parent,
        };
        guild.channels.insert(id, info.clone());
        Ok(info)
    }

    async fn rename_channel(&self, id: ChannelId, name: &str) -> Result<(), GatewayError> {
        let mut guild = self.guild.lock();
        guild.calls.push(Call::Rename {
            id,
            name: name.to_string(),
        });
        match guild.channels.get_mut(&id) {
            Some(channel) => {
                channel.name = name.to_string();
                Ok(())
            }
            None => Err(GatewayError::NotFound),
        }
    }

    async fn send_card(
        &self,
        channel: ChannelId,
        card: &StatusCard,
    ) -> Result<MessageId, GatewayError> {
        let mut guild = self.guild.lock();
        if !guild.channels.contains_key(&channel) {
            return Err(GatewayError::NotFound);
        }
        let message = MessageId::new(guild.next_id()).unwrap();
        guild.calls.push(Call::Send { channel, message });
        guild.messages.insert(message, (channel, card.clone()));
        Ok(message)
    }

    async fn edit_card(
        &self,
        channel: ChannelId,
        message: MessageId,
        card: &StatusCard,
    ) -> Result<(), GatewayError> {
        let mut guild = self.guild.lock();
        guild.calls.push(Call::Edit { channel, message });
        if let Some(status) = guild.fail_edits {
            return Err(GatewayError::Http {
                status: Some(status),
                message: "scripted failure".into(),
            });
        }
        if !guild.channels.contains_key(&channel) {
            return Err(GatewayError::NotFound);
        }
        match guild.messages.get_mut(&message) {
            Some((in_channel, stored)) if *in_channel == channel => {
                *stored = card.clone();
                Ok(())
            }
            _ => Err(GatewayError::NotFound),
        }
    }
}
