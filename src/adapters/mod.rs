//! Query adapter abstraction.
//!
//! Each adapter wraps one protocol family from `serverboard-query`. The
//! [`AdapterRegistry`] maps a server's `kind` to its adapter, so adding a
//! backend means registering one more adapter and nothing else.

use async_trait::async_trait;
use serverboard_query::{Probe, QueryError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub mod a2s;
pub mod http_json;

pub use a2s::A2sAdapter;
pub use http_json::HttpJsonAdapter;

use crate::config::{Layout, ServerConfig, ValidationError};

#[async_trait]
pub trait QueryAdapter: Send + Sync {
    /// Registry key, matched against `ServerConfig::kind`.
    fn kind(&self) -> &str;

    /// Layout used when a server of this kind does not pick one.
    fn default_layout(&self) -> Layout {
        Layout::Simple
    }

    /// Check that a server entry carries what [`query`](Self::query) needs.
    fn check(&self, server: &ServerConfig) -> Result<(), String>;

    /// Ask the server for its status. Must bound its own latency.
    async fn query(&self, server: &ServerConfig) -> Result<Probe, QueryError>;
}

/// Adapters keyed by server kind.
#[derive(Default, Clone)]
pub struct AdapterRegistry {
    adapters: HashMap<String, Arc<dyn QueryAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in `a2s` and `http-json` adapters.
    pub fn with_defaults(timeout: Duration, user_agent: &str) -> Self {
        let mut registry = Self::new();
        registry.register(A2sAdapter::new(timeout));
        registry.register(HttpJsonAdapter::new(timeout, user_agent));
        registry
    }

    /// Add or replace the adapter for its kind.
    pub fn register<A: QueryAdapter + 'static>(&mut self, adapter: A) {
        self.adapters
            .insert(adapter.kind().to_string(), Arc::new(adapter));
    }

    pub fn get(&self, kind: &str) -> Option<&Arc<dyn QueryAdapter>> {
        self.adapters.get(kind)
    }

    /// Registered kinds, sorted.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.adapters.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Query a server through the adapter for its kind.
    pub async fn query(&self, server: &ServerConfig) -> Result<Probe, QueryError> {
        match self.adapters.get(&server.kind) {
            Some(adapter) => adapter.query(server).await,
            None => Err(QueryError::UnsupportedKind(server.kind.clone())),
        }
    }

    /// Report roster entries whose kind is unknown or whose connection
    /// details do not suit their adapter.
    pub fn check_roster(&self, servers: &[ServerConfig]) -> Result<(), Vec<ValidationError>> {
        let errors: Vec<ValidationError> = servers
            .iter()
            .filter_map(|server| match self.adapters.get(&server.kind) {
                None => Some(ValidationError::UnknownKind {
                    server: server.name.clone(),
                    kind: server.kind.clone(),
                }),
                Some(adapter) => adapter.check(server).err().map(|reason| {
                    ValidationError::InvalidConnection {
                        server: server.name.clone(),
                        reason,
                    }
                }),
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Fill in the layout of every server that did not choose one.
    pub fn resolve_layouts(&self, servers: &mut [ServerConfig]) {
        for server in servers.iter_mut().filter(|s| s.layout.is_none()) {
            server.layout = Some(
                self.adapters
                    .get(&server.kind)
                    .map_or(Layout::Simple, |a| a.default_layout()),
            );
        }
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}
