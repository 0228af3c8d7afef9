//! Datagram codec for A2S.
//!
//! Used with [`tokio_util::udp::UdpFramed`]: every datagram is decoded on
//! its own into a [`Frame`], and every [`Request`] is encoded into one
//! datagram.

use bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use super::packet::{Reader, Request};
use super::split::SplitFragment;
use super::{SINGLE_PACKET, SPLIT_PACKET};
use crate::error::QueryError;

/// One decoded datagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A complete reply; the `0xFFFFFFFF` header is stripped.
    Single(Bytes),
    /// One piece of a multi-datagram reply.
    Split(SplitFragment),
}

impl Frame {
    /// Classify a raw datagram by its header.
    pub fn parse(datagram: Bytes) -> Result<Self, QueryError> {
        let mut reader = Reader::new(&datagram);
        let header = reader.i32("packet header")?;
        match header {
            SINGLE_PACKET => Ok(Self::Single(datagram.slice(4..))),
            SPLIT_PACKET => {
                let id = reader.i32("split id")?;
                let total = reader.u8("split total")?;
                let number = reader.u8("split number")?;
                // Maximum packet size; informational only.
                let _size = reader.u16("split size")?;
                let offset = datagram.len() - reader.rest().len();
                Ok(Self::Split(SplitFragment {
                    id,
                    total,
                    number,
                    payload: datagram.slice(offset..),
                }))
            }
            other => Err(QueryError::invalid(format!(
                "unknown packet header {other:#x}"
            ))),
        }
    }
}

/// Stateless A2S datagram codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct A2sCodec;

impl Decoder for A2sCodec {
    type Item = Frame;
    type Error = QueryError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, QueryError> {
        if src.is_empty() {
            return Ok(None);
        }
        // One datagram per call: consume it whole.
        let datagram = src.split().freeze();
        Frame::parse(datagram).map(Some)
    }
}

impl Encoder<Request> for A2sCodec {
    type Error = QueryError;

    fn encode(&mut self, item: Request, dst: &mut BytesMut) -> Result<(), QueryError> {
        item.encode(dst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::a2s::packet::RequestKind;

    #[test]
    fn test_decode_single() {
        let mut codec = A2sCodec;
        let mut buf = BytesMut::from(&[0xFF, 0xFF, 0xFF, 0xFF, b'A', 1, 0, 0, 0][..]);
        let frame = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(frame, Frame::Single(Bytes::from_static(&[b'A', 1, 0, 0, 0])));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_split_header() {
        let mut codec = A2sCodec;
        let mut raw = vec![0xFE, 0xFF, 0xFF, 0xFF];
        raw.extend_from_slice(&42i32.to_le_bytes());
        raw.extend_from_slice(&[3, 1]);
        raw.extend_from_slice(&1248u16.to_le_bytes());
        raw.extend_from_slice(b"body");
        let mut buf = BytesMut::from(&raw[..]);
        let Some(Frame::Split(fragment)) = codec.decode(&mut buf).unwrap() else {
            panic!("expected split frame");
        };
        assert_eq!(fragment.id, 42);
        assert_eq!(fragment.total, 3);
        assert_eq!(fragment.number, 1);
        assert_eq!(&fragment.payload[..], b"body");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let mut codec = A2sCodec;
        let mut buf = BytesMut::from(&b"HTTP/1.1 400"[..]);
        assert!(matches!(
            codec.decode(&mut buf),
            Err(QueryError::InvalidResponse(_))
        ));
        let mut short = BytesMut::from(&[0xFF, 0xFF][..]);
        assert!(codec.decode(&mut short).is_err());
    }

    #[test]
    fn test_decode_empty_is_none() {
        let mut codec = A2sCodec;
        assert_eq!(codec.decode(&mut BytesMut::new()).unwrap(), None);
    }

    #[test]
    fn test_encode_request() {
        let mut codec = A2sCodec;
        let mut dst = BytesMut::new();
        codec
            .encode(Request::new(RequestKind::Players), &mut dst)
            .unwrap();
        assert_eq!(dst.len(), 9);
    }
}
