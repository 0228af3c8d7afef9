//! Reassembly of multi-packet A2S replies.
//!
//! Large replies (long player rosters, mostly) arrive as several datagrams
//! sharing one response id. Fragments may arrive out of order; the payload
//! is only released once every slot is filled.

use bytes::{Bytes, BytesMut};
use tracing::debug;

use crate::error::{QueryError, Result};

/// Upper bound on fragments per reply. Real servers stay far below this.
pub const MAX_FRAGMENTS: u8 = 32;

/// Set on the response id when the payload is bzip2-compressed.
const COMPRESSED_FLAG: u32 = 0x8000_0000;

/// One datagram of a split reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitFragment {
    /// Response id shared by all fragments of one reply.
    pub id: i32,
    /// Total number of fragments.
    pub total: u8,
    /// Zero-based position of this fragment.
    pub number: u8,
    /// Fragment body.
    pub payload: Bytes,
}

impl SplitFragment {
    /// Whether the sender compressed the reassembled payload.
    pub fn is_compressed(&self) -> bool {
        (self.id as u32) & COMPRESSED_FLAG != 0
    }
}

/// Collects fragments of a single in-flight reply.
#[derive(Debug, Default)]
pub struct SplitAssembler {
    id: Option<i32>,
    parts: Vec<Option<Bytes>>,
}

impl SplitAssembler {
    /// Add a fragment. Returns the whole payload once the last missing
    /// fragment arrives.
    ///
    /// A fragment with a different id than the one being collected starts
    /// over: the older reply is stale.
    pub fn push(&mut self, fragment: SplitFragment) -> Result<Option<Bytes>> {
        if fragment.is_compressed() {
            return Err(QueryError::invalid(
                "compressed split replies are not supported",
            ));
        }
        if fragment.total == 0 || fragment.total > MAX_FRAGMENTS {
            return Err(QueryError::invalid(format!(
                "split reply announces {} fragments",
                fragment.total
            )));
        }
        if fragment.number >= fragment.total {
            return Err(QueryError::invalid(format!(
                "fragment {} of {} is out of range",
                fragment.number, fragment.total
            )));
        }

        if self.id != Some(fragment.id) || self.parts.len() != usize::from(fragment.total) {
            if self.id.is_some() {
                debug!(old = ?self.id, new = fragment.id, "Discarding stale split reply");
            }
            self.id = Some(fragment.id);
            self.parts = vec![None; usize::from(fragment.total)];
        }

        let slot = usize::from(fragment.number);
        self.parts[slot] = Some(fragment.payload);

        if self.parts.iter().any(Option::is_none) {
            return Ok(None);
        }

        let mut whole = BytesMut::new();
        for part in self.parts.drain(..).flatten() {
            whole.extend_from_slice(&part);
        }
        self.id = None;
        Ok(Some(whole.freeze()))
    }

    /// Whether a reply is partially collected.
    pub fn is_pending(&self) -> bool {
        self.id.is_some()
    }
}
