//! Source engine server queries (A2S) over UDP.
//!
//! The module is split into:
//! - [`packet`]: request encoding and response payload parsing
//! - [`codec`]: a `tokio-util` codec turning datagrams into [`Frame`]s
//! - [`split`]: reassembly of multi-packet responses
//! - [`client`]: the async query client with challenge handling
//!
//! Only the Source flavour of the protocol is handled. GoldSource info
//! replies and bzip2-compressed split responses are rejected as invalid.

pub mod client;
pub mod codec;
pub mod packet;
pub mod split;

pub use client::{A2sClient, A2sReport};
pub use codec::{A2sCodec, Frame};
pub use packet::{PlayerEntry, Request, RequestKind, Response, ServerInfo};
pub use split::{SplitAssembler, SplitFragment};

/// Header of a response that fits in a single datagram.
pub const SINGLE_PACKET: i32 = -1;

/// Header of one fragment of a multi-datagram response.
pub const SPLIT_PACKET: i32 = -2;
