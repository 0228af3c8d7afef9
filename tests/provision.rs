//! Startup provisioning against a fake guild.

mod common;

use common::{Call, FakeGateway, server};
use serverboard::config::{DiscordConfig, ServerConfig};
use serverboard::gateway::ChannelKind;
use serverboard::identity::{IdentityStore, MemoryStore};
use serverboard::provision::provision;

fn roster() -> Vec<ServerConfig> {
    vec![server("Alpha", 32), server("Beta", 16)]
}

#[tokio::test]
async fn test_empty_guild_gets_full_layout() {
    let gateway = FakeGateway::new();
    let mut store = IdentityStore::open(MemoryStore::new());
    let discord = DiscordConfig::default();

    let targets = provision(&gateway, &mut store, &discord, &roster())
        .await
        .unwrap();

    let category = gateway.channel_info(targets.category).unwrap();
    assert_eq!(category.kind, ChannelKind::Category);
    assert_eq!(category.name, discord.category);

    let text = gateway.channel_info(targets.text_channel).unwrap();
    assert_eq!(text.kind, ChannelKind::Text);
    assert_eq!(text.name, discord.text_channel);
    assert_eq!(text.parent, Some(targets.category));

    let mut voice: Vec<_> = gateway
        .voice_channels()
        .into_iter()
        .map(|c| (c.name, c.parent))
        .collect();
    voice.sort();
    assert_eq!(
        voice,
        vec![
            ("🔴 Alpha (Offline)".to_string(), Some(targets.category)),
            ("🔴 Beta (Offline)".to_string(), Some(targets.category)),
        ]
    );

    assert_eq!(store.text_channel(), Some(targets.text_channel));
    assert!(store.voice_channel("Alpha").is_some());
    assert!(store.voice_channel("Beta").is_some());
}

#[tokio::test]
async fn test_second_provision_creates_nothing() {
    let gateway = FakeGateway::new();
    let backend = MemoryStore::new();
    let discord = DiscordConfig::default();

    let mut store = IdentityStore::open(backend.clone());
    let first = provision(&gateway, &mut store, &discord, &roster())
        .await
        .unwrap();
    drop(store);
    gateway.clear_calls();

    let mut store = IdentityStore::open(backend);
    let second = provision(&gateway, &mut store, &discord, &roster())
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(
        gateway.count_calls(|c| matches!(c, Call::CreateChannel { .. })),
        0
    );
    assert_eq!(gateway.channel_count(), 4);
}

#[tokio::test]
async fn test_existing_channels_are_adopted_by_name() {
    let gateway = FakeGateway::new();
    let discord = DiscordConfig::default();
    let category = gateway.add_channel(&discord.category, ChannelKind::Category, None);
    let alpha = gateway.add_channel("🟢 Alpha (3 / 32)", ChannelKind::Voice, Some(category));
    let text = gateway.add_channel(&discord.text_channel, ChannelKind::Text, Some(category));
    // Same name outside the category is not ours.
    gateway.add_channel("🔴 Beta (Offline)", ChannelKind::Voice, None);

    let mut store = IdentityStore::open(MemoryStore::new());
    let targets = provision(&gateway, &mut store, &discord, &roster())
        .await
        .unwrap();

    assert_eq!(targets.category, category);
    assert_eq!(targets.text_channel, text);
    assert_eq!(store.voice_channel("Alpha"), Some(alpha));

    let beta = store.voice_channel("Beta").unwrap();
    assert_eq!(gateway.channel_info(beta).unwrap().parent, Some(category));
    assert_eq!(gateway.channels_named("🔴 Beta (Offline)").len(), 2);
    assert_eq!(
        gateway.count_calls(|c| matches!(c, Call::CreateChannel { .. })),
        1
    );
}

#[tokio::test]
async fn test_deleted_text_channel_is_recreated() {
    let gateway = FakeGateway::new();
    let backend = MemoryStore::new();
    let discord = DiscordConfig::default();

    let mut store = IdentityStore::open(backend.clone());
    let first = provision(&gateway, &mut store, &discord, &roster())
        .await
        .unwrap();
    gateway.delete_channel(first.text_channel);

    let second = provision(&gateway, &mut store, &discord, &roster())
        .await
        .unwrap();
    assert_ne!(second.text_channel, first.text_channel);
    assert_eq!(second.category, first.category);
    assert_eq!(
        gateway.channel_info(second.text_channel).unwrap().kind,
        ChannelKind::Text
    );
    assert_eq!(backend.stored().unwrap().text_channel, Some(second.text_channel));
}
