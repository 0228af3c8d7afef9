//! Unified error handling for serverboard.
//!
//! Query failures never show up here: they are folded into an offline
//! status by the normalizer. What remains are failures talking to the
//! platform, during startup or while reconciling one server.

use thiserror::Error;

use crate::gateway::GatewayError;

// ============================================================================
// Reconcile Errors (one server, one pass)
// ============================================================================

/// Why one server's status could not be brought up to date.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("{op} failed: {source}")]
    Gateway {
        op: &'static str,
        #[source]
        source: GatewayError,
    },

    #[error("panicked: {0}")]
    Panicked(String),
}

impl ReconcileError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Gateway { source, .. } => source.error_code(),
            Self::Panicked(_) => "panic",
        }
    }

    /// Describe a caught panic payload.
    pub fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        Self::Panicked(message)
    }
}

// ============================================================================
// Provision Errors (startup)
// ============================================================================

/// Startup could not find or create the channels the daemon writes to.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("{op} failed: {source}")]
    Gateway {
        op: &'static str,
        #[source]
        source: GatewayError,
    },
}

/// Tag a gateway error with the operation that produced it.
pub trait GatewayContext<T> {
    fn during(self, op: &'static str) -> Result<T, ReconcileError>;
    fn during_startup(self, op: &'static str) -> Result<T, ProvisionError>;
}

impl<T> GatewayContext<T> for Result<T, GatewayError> {
    fn during(self, op: &'static str) -> Result<T, ReconcileError> {
        self.map_err(|source| {
            crate::metrics::record_gateway_error(op, source.error_code());
            ReconcileError::Gateway { op, source }
        })
    }

    fn during_startup(self, op: &'static str) -> Result<T, ProvisionError> {
        self.map_err(|source| {
            crate::metrics::record_gateway_error(op, source.error_code());
            ProvisionError::Gateway { op, source }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let e = ReconcileError::Gateway {
            op: "edit_card",
            source: GatewayError::RateLimited,
        };
        assert_eq!(e.error_code(), "rate_limited");
        assert_eq!(e.to_string(), "edit_card failed: rate limited");
        assert_eq!(ReconcileError::Panicked("boom".into()).error_code(), "panic");
    }

    #[test]
    fn test_from_panic_payloads() {
        let e = ReconcileError::from_panic(Box::new("static str"));
        assert_eq!(e.to_string(), "panicked: static str");
        let e = ReconcileError::from_panic(Box::new(String::from("owned")));
        assert_eq!(e.to_string(), "panicked: owned");
        let e = ReconcileError::from_panic(Box::new(42_u8));
        assert_eq!(e.to_string(), "panicked: unknown panic payload");
    }

    #[test]
    fn test_context_tags_operation() {
        let result: Result<(), GatewayError> = Err(GatewayError::NotFound);
        let err = result.during("rename_channel").unwrap_err();
        assert!(matches!(err, ReconcileError::Gateway { op: "rename_channel", .. }));
    }
}
