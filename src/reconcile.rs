//! One pass of query, normalize and upsert over the whole roster.
//!
//! Servers are handled one after another in roster order. Each server runs
//! behind its own failure boundary: errors and panics are logged and
//! counted, and the pass moves on to the next server.

use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::adapters::AdapterRegistry;
use crate::config::{DiscordConfig, PresentationConfig, ServerConfig};
use crate::error::{GatewayContext, ReconcileError};
use crate::gateway::{ChannelId, ChannelInfo, ChannelKind, Gateway, GatewayError};
use crate::identity::IdentityStore;
use crate::metrics;
use crate::provision::{Targets, find_or_create_text_channel, find_voice_channel};
use crate::status::{ServerStatus, normalize, render_card, voice_label};

/// What happened to one server's status message.
#[derive(Debug)]
pub enum ServerOutcome {
    /// The existing message was edited in place.
    Updated { online: bool },
    /// A new message was sent (first run, or the old one was deleted).
    Created { online: bool },
    Failed(ReconcileError),
}

/// Summary of one pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PassReport {
    pub updated: usize,
    pub created: usize,
    pub failed: usize,
    /// Servers shown as offline, whether or not their message was updated.
    pub offline: usize,
}

impl PassReport {
    fn record(&mut self, outcome: &ServerOutcome) {
        match outcome {
            ServerOutcome::Updated { online } => {
                self.updated += 1;
                self.offline += usize::from(!online);
            }
            ServerOutcome::Created { online } => {
                self.created += 1;
                self.offline += usize::from(!online);
            }
            ServerOutcome::Failed(_) => self.failed += 1,
        }
    }
}

pub struct Reconciler {
    registry: AdapterRegistry,
    gateway: Arc<dyn Gateway>,
    store: IdentityStore,
    servers: Arc<[ServerConfig]>,
    presentation: PresentationConfig,
    targets: Targets,
    /// Name used when the status channel has to be recreated.
    text_channel_name: String,
    passes: u64,
}

impl Reconciler {
    pub fn new(
        registry: AdapterRegistry,
        gateway: Arc<dyn Gateway>,
        store: IdentityStore,
        servers: Vec<ServerConfig>,
        presentation: PresentationConfig,
        targets: Targets,
    ) -> Self {
        Self {
            registry,
            gateway,
            store,
            servers: servers.into(),
            presentation,
            targets,
            text_channel_name: DiscordConfig::default().text_channel,
            passes: 0,
        }
    }

    /// Name given to the status channel if it is deleted while running.
    pub fn with_text_channel_name(mut self, name: impl Into<String>) -> Self {
        self.text_channel_name = name.into();
        self
    }

    pub fn targets(&self) -> Targets {
        self.targets
    }

    pub fn store(&self) -> &IdentityStore {
        &self.store
    }

    /// Reconcile every server once, in roster order.
    pub async fn run_pass(&mut self) -> PassReport {
        self.passes += 1;
        let span = info_span!("pass", seq = self.passes);
        let started = Instant::now();
        let servers = Arc::clone(&self.servers);
        let mut report = PassReport::default();

        async {
            for (index, server) in servers.iter().enumerate() {
                let outcome = AssertUnwindSafe(self.reconcile_server(index, server))
                    .catch_unwind()
                    .instrument(info_span!("server", name = %server.name, index))
                    .await
                    .unwrap_or_else(|payload| Err(ReconcileError::from_panic(payload)));

                let outcome = match outcome {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        warn!(server = %server.name, error = %e, "Server update failed");
                        ServerOutcome::Failed(e)
                    }
                };
                report.record(&outcome);
            }

            let elapsed = started.elapsed();
            metrics::record_pass(elapsed.as_secs_f64());
            info!(
                updated = report.updated,
                created = report.created,
                failed = report.failed,
                offline = report.offline,
                elapsed_ms = elapsed.as_millis() as u64,
                "Pass complete"
            );
        }
        .instrument(span)
        .await;

        report
    }

    async fn reconcile_server(
        &mut self,
        index: usize,
        server: &ServerConfig,
    ) -> Result<ServerOutcome, ReconcileError> {
        // 1. Query and normalize
        let outcome = self.registry.query(server).await;
        if let Err(ref e) = outcome {
            metrics::record_query_error(&server.name, e.error_code());
            debug!(server = %server.name, error = %e, "Query failed, showing offline");
        }
        let status = normalize(outcome, server);
        metrics::record_server_status(&server.name, status.online, status.players);

        // 2. Voice channel label. Failures here do not block the message.
        if let Err(e) = self.sync_voice_channel(server, &status).await {
            warn!(server = %server.name, error = %e, "Voice channel update failed");
        }

        // 3. Render
        let card = render_card(index, server, &status, &self.presentation);

        // 4. Upsert the message
        let channel = self.targets.text_channel;
        if let Some(message) = self.store.message(&server.name) {
            match self.gateway.edit_card(channel, message, &card).await {
                Ok(()) => {
                    debug!(server = %server.name, message_id = %message, "Message updated");
                    return Ok(ServerOutcome::Updated {
                        online: status.online,
                    });
                }
                Err(GatewayError::NotFound) => {
                    info!(server = %server.name, message_id = %message, "Status message was deleted, sending a new one");
                }
                Err(e) => return Err(e).during("edit_card"),
            }
        }

        let message = match self.gateway.send_card(channel, &card).await {
            Err(GatewayError::NotFound) => {
                let channel = self.replace_text_channel(channel).await?;
                self.gateway.send_card(channel, &card).await.during("send_card")?
            }
            sent => sent.during("send_card")?,
        };
        metrics::record_message_created();
        info!(server = %server.name, message_id = %message, "Status message created");
        if let Err(e) = self.store.set_message(&server.name, message) {
            warn!(server = %server.name, error = %e, "Failed to persist message id");
        }
        Ok(ServerOutcome::Created {
            online: status.online,
        })
    }

    /// Called when sending into the status channel failed with NotFound.
    /// If the channel is really gone, find or create a new one under the
    /// category and make it the target for the rest of the run.
    async fn replace_text_channel(&mut self, gone: ChannelId) -> Result<ChannelId, ReconcileError> {
        if let Some(channel) = self.gateway.channel(gone).await.during("fetch_text_channel")?
            && channel.kind == ChannelKind::Text
        {
            return Err(GatewayError::NotFound).during("send_card");
        }
        warn!(channel_id = %gone, "Status channel was deleted, replacing it");

        let channels = self.gateway.channels().await.during("list_channels")?;
        let id = find_or_create_text_channel(
            self.gateway.as_ref(),
            &channels,
            self.targets.category,
            &self.text_channel_name,
        )
        .await
        .during("create_text_channel")?;

        self.targets.text_channel = id;
        if let Err(e) = self.store.set_text_channel(id) {
            warn!(error = %e, "Failed to persist status channel id");
        }
        Ok(id)
    }

    async fn sync_voice_channel(
        &mut self,
        server: &ServerConfig,
        status: &ServerStatus,
    ) -> Result<(), ReconcileError> {
        let label = voice_label(&server.name, status);
        let Some(channel) = self.resolve_voice_channel(server).await? else {
            warn!(server = %server.name, "No voice channel found; it is created at startup");
            return Ok(());
        };
        if channel.name != label {
            self.gateway
                .rename_channel(channel.id, &label)
                .await
                .during("rename_channel")?;
            debug!(server = %server.name, channel_id = %channel.id, label = %label, "Voice channel renamed");
        }
        Ok(())
    }

    /// Stored id first; if that channel is gone, look for one by name and
    /// remember what was found.
    async fn resolve_voice_channel(
        &mut self,
        server: &ServerConfig,
    ) -> Result<Option<ChannelInfo>, ReconcileError> {
        if let Some(id) = self.store.voice_channel(&server.name) {
            match self.gateway.channel(id).await.during("fetch_voice_channel")? {
                Some(channel) if channel.kind == ChannelKind::Voice => return Ok(Some(channel)),
                _ => {
                    info!(server = %server.name, channel_id = %id, "Stored voice channel is gone");
                    if let Err(e) = self.store.forget_voice_channel(&server.name) {
                        warn!(server = %server.name, error = %e, "Failed to persist voice channel removal");
                    }
                }
            }
        }

        let channels = self.gateway.channels().await.during("list_channels")?;
        let Some(found) = find_voice_channel(&channels, self.targets.category, server).cloned()
        else {
            return Ok(None);
        };
        info!(server = %server.name, channel_id = %found.id, "Voice channel rediscovered");
        if let Err(e) = self.store.set_voice_channel(&server.name, found.id) {
            warn!(server = %server.name, error = %e, "Failed to persist voice channel id");
        }
        Ok(Some(found))
    }
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("servers", &self.servers.len())
            .field("targets", &self.targets)
            .field("passes", &self.passes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts() {
        let mut report = PassReport::default();
        report.record(&ServerOutcome::Updated { online: true });
        report.record(&ServerOutcome::Updated { online: false });
        report.record(&ServerOutcome::Created { online: false });
        report.record(&ServerOutcome::Failed(ReconcileError::Panicked("x".into())));
        assert_eq!(
            report,
            PassReport {
                updated: 2,
                created: 1,
                failed: 1,
                offline: 2,
            }
        );
    }
}
