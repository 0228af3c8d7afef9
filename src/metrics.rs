//! Prometheus metrics collection for serverboard.
//!
//! Live gauges and counters only; nothing is kept historically. Exposed by
//! [`crate::http`] when `[metrics].port` is set.
//!
//! - `serverboard_passes_total` - Reconciliation passes completed
//! - `serverboard_pass_duration_seconds` - Pass latency histogram
//! - `serverboard_server_online{server}` - 1 if the last query succeeded
//! - `serverboard_server_players{server}` - Players seen by the last query
//! - `serverboard_query_errors_total{server,error}` - Failed queries by kind
//! - `serverboard_gateway_errors_total{op,error}` - Failed platform calls
//! - `serverboard_messages_created_total` - Status messages (re)created

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGaugeVec, Opts, Registry,
    TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters (monotonic increasing)
// ========================================================================

/// Completed reconciliation passes.
pub static PASSES: OnceLock<IntCounter> = OnceLock::new();

/// Status messages sent because none existed or the old one was deleted.
pub static MESSAGES_CREATED: OnceLock<IntCounter> = OnceLock::new();

/// Failed queries by server and error kind.
pub static QUERY_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

/// Failed platform calls by operation and error kind.
pub static GATEWAY_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

// ========================================================================
// Gauges (can increase/decrease)
// ========================================================================

pub static SERVER_ONLINE: OnceLock<IntGaugeVec> = OnceLock::new();

pub static SERVER_PLAYERS: OnceLock<IntGaugeVec> = OnceLock::new();

// ========================================================================
// Histograms
// ========================================================================

pub static PASS_DURATION: OnceLock<Histogram> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Call once at startup. Recording before `init` is a silent no-op.
pub fn init() {
    let r = registry();

    // Helper macro to register metric
    macro_rules! register {
        ($metric:ident, $init:expr) => {
            match $init {
                Ok(m) => {
                    if let Err(e) = r.register(Box::new(m.clone())) {
                        tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                    }
                    let _ = $metric.set(m);
                }
                Err(e) => {
                    tracing::error!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                }
            }
        };
    }

    register!(PASSES, IntCounter::new("serverboard_passes_total", "Reconciliation passes completed"));
    register!(MESSAGES_CREATED, IntCounter::new("serverboard_messages_created_total", "Status messages created"));
    register!(QUERY_ERRORS, IntCounterVec::new(Opts::new("serverboard_query_errors_total", "Failed server queries by error kind"), &["server", "error"]));
    register!(GATEWAY_ERRORS, IntCounterVec::new(Opts::new("serverboard_gateway_errors_total", "Failed platform calls by operation"), &["op", "error"]));
    register!(SERVER_ONLINE, IntGaugeVec::new(Opts::new("serverboard_server_online", "1 if the server answered the last query"), &["server"]));
    register!(SERVER_PLAYERS, IntGaugeVec::new(Opts::new("serverboard_server_players", "Players reported by the last query"), &["server"]));
    register!(PASS_DURATION, Histogram::with_opts(
        HistogramOpts::new("serverboard_pass_duration_seconds", "Time to reconcile the whole roster")
            .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0])));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Helper functions for metric updates
// ============================================================================

/// Record a finished pass.
#[inline]
pub fn record_pass(duration_secs: f64) {
    if let Some(c) = PASSES.get() {
        c.inc();
    }
    if let Some(h) = PASS_DURATION.get() {
        h.observe(duration_secs);
    }
}

/// Record the outcome of one server's query.
#[inline]
pub fn record_server_status(server: &str, online: bool, players: u32) {
    if let Some(g) = SERVER_ONLINE.get() {
        g.with_label_values(&[server]).set(i64::from(online));
    }
    if let Some(g) = SERVER_PLAYERS.get() {
        g.with_label_values(&[server]).set(i64::from(players));
    }
}

#[inline]
pub fn record_query_error(server: &str, error: &str) {
    if let Some(c) = QUERY_ERRORS.get() {
        c.with_label_values(&[server, error]).inc();
    }
}

#[inline]
pub fn record_gateway_error(op: &str, error: &str) {
    if let Some(c) = GATEWAY_ERRORS.get() {
        c.with_label_values(&[op, error]).inc();
    }
}

#[inline]
pub fn record_message_created() {
    if let Some(c) = MESSAGES_CREATED.get() {
        c.inc();
    }
}
