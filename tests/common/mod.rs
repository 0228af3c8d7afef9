//! Integration test common infrastructure.
//!
//! Provides a fake guild, scripted query adapters, and a harness that wires
//! them into a provisioned [`Reconciler`].

pub mod adapter;
pub mod gateway;

#[allow(unused_imports)]
pub use adapter::{Script, ScriptedAdapter};
#[allow(unused_imports)]
pub use gateway::{Call, FakeGateway};

use serverboard::adapters::AdapterRegistry;
use serverboard::config::{DiscordConfig, Layout, PresentationConfig, ServerConfig};
use serverboard::gateway::{ChannelInfo, Gateway};
use serverboard::identity::{IdentityStore, MemoryStore, Persist};
use serverboard::provision::{Targets, provision};
use serverboard::reconcile::Reconciler;
use std::sync::Arc;

/// Kind served by the scripted adapter.
pub const SCRIPTED: &str = "simple";

/// Simple-layout roster entry served by the scripted adapter.
#[allow(dead_code)]
pub fn server(name: &str, max_players: u32) -> ServerConfig {
    ServerConfig::new(name, SCRIPTED, format!("https://example.net/join/{name}"))
        .with_max_players(max_players)
        .with_layout(Layout::Simple)
}

pub struct Harness {
    pub gateway: Arc<FakeGateway>,
    pub adapter: ScriptedAdapter,
    pub backend: MemoryStore,
    pub targets: Targets,
    pub reconciler: Reconciler,
}

#[allow(dead_code)]
impl Harness {
    pub async fn new(servers: Vec<ServerConfig>) -> Self {
        let backend = MemoryStore::new();
        let gateway = Arc::new(FakeGateway::new());
        let adapter = ScriptedAdapter::new(SCRIPTED);
        let (targets, reconciler) =
            build(&gateway, &adapter, backend.clone(), servers).await;
        Self {
            gateway,
            adapter,
            backend,
            targets,
            reconciler,
        }
    }

    /// The voice channel currently recorded for `server`.
    pub fn voice_channel(&self, server: &str) -> Option<ChannelInfo> {
        self.reconciler
            .store()
            .voice_channel(server)
            .and_then(|id| self.gateway.channel_info(id))
    }
}

/// Provision `servers` into `gateway` and build a reconciler over them.
pub async fn build<P: Persist + 'static>(
    gateway: &Arc<FakeGateway>,
    adapter: &ScriptedAdapter,
    backend: P,
    servers: Vec<ServerConfig>,
) -> (Targets, Reconciler) {
    let mut registry = AdapterRegistry::new();
    registry.register(adapter.clone());

    let mut store = IdentityStore::open(backend);
    let targets = provision(
        gateway.as_ref(),
        &mut store,
        &DiscordConfig::default(),
        &servers,
    )
    .await
    .expect("provisioning the fake guild");

    let dyn_gateway: Arc<dyn Gateway> = gateway.clone();
    let reconciler = Reconciler::new(
        registry,
        dyn_gateway,
        store,
        servers,
        PresentationConfig::default(),
        targets,
    );
    (targets, reconciler)
}
