//! JSON status endpoints over HTTP.
//!
//! Some backends are not reachable through a game protocol at all and
//! publish their state through a small REST endpoint instead. The body
//! is expected to look like one of:
//!
//! ```text
//! { "online": 12 }                  -> up, 12 players
//! { "online": 12, "max": 40 }       -> up, 12 of 40 slots
//! { "offline": 0 }                  -> explicitly down
//! ```
//!
//! Anything else is an invalid response.

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::error::{QueryError, Result};
use crate::probe::{OnlineProbe, Probe};

/// Keys checked, in order, for a slot count next to `online`.
const MAX_PLAYER_KEYS: [&str; 3] = ["max", "maxplayers", "max_players"];

/// Fetches and interprets JSON status documents.
#[derive(Debug, Clone)]
pub struct HttpStatusClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpStatusClient {
    /// Create a client whose requests give up after `timeout`.
    pub fn new(timeout: Duration, user_agent: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client, timeout }
    }

    /// Request `url` and interpret the body.
    pub async fn probe(&self, url: &str) -> Result<Probe> {
        let response = match tokio::time::timeout(self.timeout, self.client.get(url).send()).await
        {
            Ok(Ok(resp)) => resp,
            Ok(Err(e)) if e.is_timeout() => return Err(QueryError::Timeout(self.timeout)),
            Ok(Err(e)) => return Err(QueryError::Http(e)),
            Err(_) => return Err(QueryError::Timeout(self.timeout)),
        };

        let status = response.status();
        if !status.is_success() {
            return Err(QueryError::Status(status.as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| QueryError::invalid(format!("body is not JSON: {e}")))?;
        debug!(url = %url, body = %body, "Status document received");
        parse_status(&body)
    }
}

/// Interpret a status document.
pub fn parse_status(body: &Value) -> Result<Probe> {
    if let Some(online) = body.get("online") {
        let players = count(online)
            .ok_or_else(|| QueryError::invalid(format!("'online' is not a count: {online}")))?;
        let mut probe = OnlineProbe {
            players,
            ..OnlineProbe::default()
        };
        if let Some(max) = MAX_PLAYER_KEYS
            .iter()
            .find_map(|key| body.get(*key).and_then(count))
        {
            probe = probe.with_max_players(max);
        }
        return Ok(Probe::Online(probe));
    }

    if body.get("offline").and_then(Value::as_i64) == Some(0) {
        return Ok(Probe::Offline);
    }

    Err(QueryError::invalid(format!(
        "document has neither 'online' count nor 'offline' marker: {body}"
    )))
}

/// A non-negative integer, also accepting integral floats like `5.0`.
fn count(value: &Value) -> Option<u32> {
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).ok();
    }
    let f = value.as_f64()?;
    if f >= 0.0 && f.fract() == 0.0 && f <= f64::from(u32::MAX) {
        Some(f as u32)
    } else {
        None
    }
}
