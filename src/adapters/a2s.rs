//! Source engine servers (Garry's Mod and friends) over A2S.

use async_trait::async_trait;
use serverboard_query::a2s::{A2sClient, A2sReport};
use serverboard_query::{OnlineProbe, Probe, QueryError};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::debug;

use super::QueryAdapter;
use crate::config::{Layout, ServerConfig};

pub struct A2sAdapter {
    client: A2sClient,
}

impl A2sAdapter {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: A2sClient::new(timeout),
        }
    }

    async fn resolve(&self, host: &str, port: u16) -> Result<SocketAddr, QueryError> {
        let timeout = self.client.timeout();
        let mut addrs = tokio::time::timeout(timeout, tokio::net::lookup_host((host, port)))
            .await
            .map_err(|_| QueryError::Timeout(timeout))?
            .map_err(|_| QueryError::Resolve(format!("{host}:{port}")))?;
        addrs
            .next()
            .ok_or_else(|| QueryError::Resolve(format!("{host}:{port}")))
    }
}

#[async_trait]
impl QueryAdapter for A2sAdapter {
    fn kind(&self) -> &str {
        "a2s"
    }

    fn default_layout(&self) -> Layout {
        Layout::Rich
    }

    fn check(&self, server: &ServerConfig) -> Result<(), String> {
        match (&server.connection.host, server.connection.port) {
            (Some(host), Some(port)) if !host.trim().is_empty() && port != 0 => Ok(()),
            _ => Err("a2s servers need host and a non-zero port".to_string()),
        }
    }

    async fn query(&self, server: &ServerConfig) -> Result<Probe, QueryError> {
        let (Some(host), Some(port)) = (&server.connection.host, server.connection.port) else {
            return Err(QueryError::invalid("a2s server has no host/port configured"));
        };
        let addr = self.resolve(host, port).await?;
        let with_players = server.layout() == Layout::Rich;
        let report = self.client.query(addr, with_players).await?;
        debug!(
            server = %server.name,
            map = %report.info.map,
            players = report.info.players,
            "A2S reply"
        );
        Ok(probe_from_report(report))
    }
}

/// A Source server that answers is up; there is no explicit offline reply.
fn probe_from_report(report: A2sReport) -> Probe {
    let mut probe = OnlineProbe {
        players: u32::from(report.info.players),
        max_players: Some(u32::from(report.info.max_players)),
        map: Some(report.info.map),
        player_names: None,
    };
    if let Some(players) = report.players {
        probe.player_names = Some(players.into_iter().map(|p| p.name).collect());
    }
    Probe::Online(probe)
}
