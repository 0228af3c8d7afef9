//! A2S request encoding and response parsing.
//!
//! All integers on the wire are little-endian. Strings are NUL-terminated
//! and decoded lossily, since servers routinely put arbitrary bytes in
//! hostnames and player names.

use bytes::{Buf, BufMut, BytesMut};

use super::SINGLE_PACKET;
use crate::error::{QueryError, Result};

const INFO_REQUEST: u8 = b'T';
const PLAYER_REQUEST: u8 = b'U';

const INFO_RESPONSE: u8 = b'I';
const PLAYER_RESPONSE: u8 = b'D';
const CHALLENGE_RESPONSE: u8 = b'A';
const GOLDSOURCE_INFO_RESPONSE: u8 = b'm';

const INFO_PAYLOAD: &[u8] = b"Source Engine Query\0";

/// App id of "The Ship", which carries three extra bytes in its info reply.
const THE_SHIP_APP_ID: u16 = 2400;

/// Which query is being made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// `A2S_INFO`: name, map, player counts.
    Info,
    /// `A2S_PLAYER`: connected player roster.
    Players,
}

/// One outgoing query datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    /// Query type.
    pub kind: RequestKind,
    /// Challenge number handed out by the server, if one was received.
    pub challenge: Option<i32>,
}

impl Request {
    /// First request of an exchange (no challenge yet).
    pub fn new(kind: RequestKind) -> Self {
        Self {
            kind,
            challenge: None,
        }
    }

    /// Write the datagram into `dst`.
    pub fn encode(&self, dst: &mut BytesMut) {
        dst.put_i32_le(SINGLE_PACKET);
        match self.kind {
            RequestKind::Info => {
                dst.put_u8(INFO_REQUEST);
                dst.put_slice(INFO_PAYLOAD);
                if let Some(challenge) = self.challenge {
                    dst.put_i32_le(challenge);
                }
            }
            RequestKind::Players => {
                dst.put_u8(PLAYER_REQUEST);
                // -1 asks the server for a fresh challenge.
                dst.put_i32_le(self.challenge.unwrap_or(-1));
            }
        }
    }
}

/// `A2S_INFO` reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    /// Protocol version.
    pub protocol: u8,
    /// Server hostname.
    pub name: String,
    /// Current map.
    pub map: String,
    /// Game directory.
    pub folder: String,
    /// Game description.
    pub game: String,
    /// Steam app id (low 16 bits).
    pub app_id: u16,
    /// Connected players, bots included.
    pub players: u8,
    /// Player slots.
    pub max_players: u8,
    /// Connected bots.
    pub bots: u8,
    /// `d` dedicated, `l` listen, `p` SourceTV.
    pub server_type: char,
    /// `l` Linux, `w` Windows, `m`/`o` macOS.
    pub environment: char,
    /// Whether a password is required.
    pub password: bool,
    /// Whether VAC is enabled.
    pub vac: bool,
    /// Game version string.
    pub version: String,
}

/// One row of an `A2S_PLAYER` reply.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerEntry {
    /// Slot index (often always 0).
    pub index: u8,
    /// Player name; empty while the client is still connecting.
    pub name: String,
    /// Score.
    pub score: i32,
    /// Seconds connected.
    pub duration: f32,
}

/// A fully reassembled reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// The server wants the request repeated with this challenge.
    Challenge(i32),
    /// `A2S_INFO` reply.
    Info(ServerInfo),
    /// `A2S_PLAYER` reply.
    Players(Vec<PlayerEntry>),
}

impl Response {
    /// Parse a single-packet payload (the `0xFFFFFFFF` header already removed).
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(payload);
        let header = reader.u8("response header")?;
        let response = match header {
            CHALLENGE_RESPONSE => Self::Challenge(reader.i32("challenge")?),
            INFO_RESPONSE => Self::Info(parse_info(&mut reader)?),
            PLAYER_RESPONSE => Self::Players(parse_players(&mut reader)?),
            GOLDSOURCE_INFO_RESPONSE => {
                return Err(QueryError::invalid("GoldSource info replies are not supported"));
            }
            other => {
                return Err(QueryError::invalid(format!(
                    "unknown response header 0x{other:02x}"
                )));
            }
        };
        Ok(response)
    }

    /// Parse a payload rebuilt from split fragments. It carries its own
    /// single-packet header, which is checked and stripped here.
    pub fn parse_assembled(payload: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(payload);
        let header = reader.i32("packet header")?;
        if header != SINGLE_PACKET {
            return Err(QueryError::invalid(format!(
                "reassembled payload has header {header}"
            )));
        }
        Self::parse(reader.rest())
    }

    /// Short name used in diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Challenge(_) => "challenge",
            Self::Info(_) => "info",
            Self::Players(_) => "players",
        }
    }
}

fn parse_info(reader: &mut Reader<'_>) -> Result<ServerInfo> {
    let protocol = reader.u8("protocol")?;
    let name = reader.string("name")?;
    let map = reader.string("map")?;
    let folder = reader.string("folder")?;
    let game = reader.string("game")?;
    let app_id = reader.u16("app id")?;
    let players = reader.u8("players")?;
    let max_players = reader.u8("max players")?;
    let bots = reader.u8("bots")?;
    let server_type = char::from(reader.u8("server type")?);
    let environment = char::from(reader.u8("environment")?);
    let password = reader.u8("visibility")? != 0;
    let vac = reader.u8("vac")? != 0;
    if app_id == THE_SHIP_APP_ID {
        reader.skip(3, "the ship fields")?;
    }
    let version = reader.string("version")?;
    // The extra data flag and whatever follows it are not needed.

    Ok(ServerInfo {
        protocol,
        name,
        map,
        folder,
        game,
        app_id,
        players,
        max_players,
        bots,
        server_type,
        environment,
        password,
        vac,
        version,
    })
}

fn parse_players(reader: &mut Reader<'_>) -> Result<Vec<PlayerEntry>> {
    let count = reader.u8("player count")?;
    let mut players = Vec::with_capacity(usize::from(count));
    for _ in 0..count {
        players.push(PlayerEntry {
            index: reader.u8("player index")?,
            name: reader.string("player name")?,
            score: reader.i32("player score")?,
            duration: reader.f32("player duration")?,
        });
    }
    Ok(players)
}

/// Bounds-checked cursor. `bytes::Buf` panics on short reads, so every
/// read checks `remaining()` first and reports which field was cut off.
pub(crate) struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    fn need(&self, len: usize, field: &str) -> Result<()> {
        if self.buf.remaining() < len {
            return Err(QueryError::invalid(format!(
                "truncated {field}: need {len} bytes, have {}",
                self.buf.remaining()
            )));
        }
        Ok(())
    }

    pub(crate) fn u8(&mut self, field: &str) -> Result<u8> {
        self.need(1, field)?;
        Ok(self.buf.get_u8())
    }

    pub(crate) fn u16(&mut self, field: &str) -> Result<u16> {
        self.need(2, field)?;
        Ok(self.buf.get_u16_le())
    }

    pub(crate) fn i32(&mut self, field: &str) -> Result<i32> {
        self.need(4, field)?;
        Ok(self.buf.get_i32_le())
    }

    pub(crate) fn f32(&mut self, field: &str) -> Result<f32> {
        self.need(4, field)?;
        Ok(self.buf.get_f32_le())
    }

    pub(crate) fn skip(&mut self, len: usize, field: &str) -> Result<()> {
        self.need(len, field)?;
        self.buf.advance(len);
        Ok(())
    }

    pub(crate) fn string(&mut self, field: &str) -> Result<String> {
        let end = self
            .buf
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| QueryError::invalid(format!("unterminated {field}")))?;
        let value = String::from_utf8_lossy(&self.buf[..end]).into_owned();
        self.buf.advance(end + 1);
        Ok(value)
    }

    pub(crate) fn rest(&self) -> &'a [u8] {
        self.buf
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build an `A2S_INFO` payload (without the 0xFFFFFFFF header).
    pub(crate) fn info_payload(name: &str, map: &str, players: u8, max: u8) -> Vec<u8> {
        let mut buf = BytesMut::new();
        buf.put_u8(INFO_RESPONSE);
        buf.put_u8(17);
        for s in [name, map, "garrysmod", "Garry's Mod"] {
            buf.put_slice(s.as_bytes());
            buf.put_u8(0);
        }
        buf.put_u16_le(4000);
        buf.put_u8(players);
        buf.put_u8(max);
        buf.put_u8(0);
        buf.put_u8(b'd');
        buf.put_u8(b'l');
        buf.put_u8(0);
        buf.put_u8(1);
        buf.put_slice(b"2023.06.28\0");
        buf.put_u8(0x80);
        buf.put_u16_le(27015);
        buf.to_vec()
    }

    /// Build an `A2S_PLAYER` payload (without the 0xFFFFFFFF header).
    pub(crate) fn players_payload(names: &[&str]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        buf.put_u8(PLAYER_RESPONSE);
        buf.put_u8(names.len() as u8);
        for name in names {
            buf.put_u8(0);
            buf.put_slice(name.as_bytes());
            buf.put_u8(0);
            buf.put_i32_le(3);
            buf.put_f32_le(61.5);
        }
        buf.to_vec()
    }

    #[test]
    fn test_info_request_layout() {
        let mut buf = BytesMut::new();
        Request::new(RequestKind::Info).encode(&mut buf);
        assert_eq!(&buf[..5], &[0xFF, 0xFF, 0xFF, 0xFF, b'T']);
        assert_eq!(&buf[5..], INFO_PAYLOAD);
    }

    #[test]
    fn test_info_request_appends_challenge() {
        let mut buf = BytesMut::new();
        Request {
            kind: RequestKind::Info,
            challenge: Some(0x0102_0304),
        }
        .encode(&mut buf);
        assert_eq!(&buf[buf.len() - 4..], &[0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn test_player_request_without_challenge_asks_for_one() {
        let mut buf = BytesMut::new();
        Request::new(RequestKind::Players).encode(&mut buf);
        assert_eq!(&buf[..], &[0xFF, 0xFF, 0xFF, 0xFF, b'U', 0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_parse_info() {
        let payload = info_payload("Metro #1", "gm_metro_crossline", 5, 32);
        let Response::Info(info) = Response::parse(&payload).unwrap() else {
            panic!("expected info");
        };
        assert_eq!(info.name, "Metro #1");
        assert_eq!(info.map, "gm_metro_crossline");
        assert_eq!(info.folder, "garrysmod");
        assert_eq!(info.app_id, 4000);
        assert_eq!(info.players, 5);
        assert_eq!(info.max_players, 32);
        assert_eq!(info.server_type, 'd');
        assert!(info.vac);
        assert_eq!(info.version, "2023.06.28");
    }

    #[test]
    fn test_parse_players_keeps_empty_names() {
        let payload = players_payload(&["alice", "", "bob"]);
        let Response::Players(players) = Response::parse(&payload).unwrap() else {
            panic!("expected players");
        };
        let names: Vec<_> = players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["alice", "", "bob"]);
        assert_eq!(players[0].score, 3);
    }

    #[test]
    fn test_parse_challenge() {
        let payload = [CHALLENGE_RESPONSE, 0x78, 0x56, 0x34, 0x12];
        assert_eq!(Response::parse(&payload).unwrap(), Response::Challenge(0x1234_5678));
    }

    #[test]
    fn test_truncated_info_is_invalid() {
        let payload = info_payload("Metro", "gm_flatgrass", 1, 2);
        let err = Response::parse(&payload[..12]).unwrap_err();
        assert!(matches!(err, QueryError::InvalidResponse(_)));
    }

    #[test]
    fn test_player_count_beyond_entries_is_invalid() {
        let mut payload = players_payload(&["alice"]);
        payload[1] = 2;
        assert!(matches!(
            Response::parse(&payload),
            Err(QueryError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_unknown_header_is_invalid() {
        assert!(matches!(
            Response::parse(&[b'Z', 0, 0]),
            Err(QueryError::InvalidResponse(_))
        ));
        assert!(matches!(
            Response::parse(&[GOLDSOURCE_INFO_RESPONSE]),
            Err(QueryError::InvalidResponse(_))
        ));
        assert!(matches!(Response::parse(&[]), Err(QueryError::InvalidResponse(_))));
    }

    #[test]
    fn test_assembled_payload_requires_header() {
        let mut payload = vec![0xFF, 0xFF, 0xFF, 0xFF];
        payload.extend(players_payload(&["carol"]));
        assert!(matches!(
            Response::parse_assembled(&payload).unwrap(),
            Response::Players(_)
        ));
        assert!(Response::parse_assembled(&payload[4..]).is_err());
    }

    #[test]
    fn test_lossy_names() {
        let mut payload = vec![PLAYER_RESPONSE, 1, 0];
        payload.extend_from_slice(&[0x66, 0xFF, 0x6F, 0]);
        payload.extend_from_slice(&0i32.to_le_bytes());
        payload.extend_from_slice(&1.0f32.to_le_bytes());
        let Response::Players(players) = Response::parse(&payload).unwrap() else {
            panic!("expected players");
        };
        assert_eq!(players[0].name, "f\u{FFFD}o");
    }
}
