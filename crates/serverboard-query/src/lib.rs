//! # serverboard-query
//!
//! Status queries for remote game servers.
//!
//! Each backend family speaks its own wire protocol. This crate hides that
//! behind one result shape, [`Probe`], and one error type, [`QueryError`]:
//!
//! - [`a2s`]: the Source engine query protocol (A2S) over UDP, including
//!   challenge handling and split-packet reassembly.
//! - [`http`]: a JSON status endpoint reachable over HTTP(S).
//!
//! Every client bounds its own latency. Nothing here knows about the
//! presentation layer.
//!
//! ## Quick Start
//!
//! ```no_run
//! use serverboard_query::a2s::A2sClient;
//! use std::time::Duration;
//!
//! # async fn run() -> Result<(), serverboard_query::QueryError> {
//! let client = A2sClient::new(Duration::from_secs(3));
//! let addr = "203.0.113.7:27015".parse().expect("address");
//! let report = client.query(addr, true).await?;
//! println!("{} on {} ({}/{})", report.info.name, report.info.map, report.info.players, report.info.max_players);
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

#[cfg(feature = "a2s")]
pub mod a2s;
pub mod error;
#[cfg(feature = "http")]
pub mod http;
pub mod probe;

pub use self::error::{QueryError, Result};
pub use self::probe::{OnlineProbe, Probe};
