//! Async A2S query client.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::UdpSocket;
use tokio_util::udp::UdpFramed;
use tracing::debug;

use super::codec::{A2sCodec, Frame};
use super::packet::{PlayerEntry, Request, RequestKind, Response, ServerInfo};
use super::split::SplitAssembler;
use crate::error::{QueryError, Result};

/// Challenge round trips tolerated per request before giving up.
const MAX_CHALLENGE_ROUNDS: usize = 3;

/// Everything learned from one server.
#[derive(Debug, Clone, PartialEq)]
pub struct A2sReport {
    /// `A2S_INFO` reply.
    pub info: ServerInfo,
    /// `A2S_PLAYER` reply, when requested.
    pub players: Option<Vec<PlayerEntry>>,
}

/// Queries Source engine servers.
///
/// Each query opens its own ephemeral UDP socket, so concurrent queries
/// never see each other's datagrams.
#[derive(Debug, Clone)]
pub struct A2sClient {
    timeout: Duration,
}

impl A2sClient {
    /// Create a client whose queries give up after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Time budget for one whole query (info plus roster).
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Ask `addr` for its info and, if `with_players`, its player roster.
    ///
    /// Either both replies arrive intact or the query fails: a roster that
    /// cannot be read is not silently dropped.
    pub async fn query(&self, addr: SocketAddr, with_players: bool) -> Result<A2sReport> {
        match tokio::time::timeout(self.timeout, exchange(addr, with_players)).await {
            Ok(result) => result,
            Err(_) => Err(QueryError::Timeout(self.timeout)),
        }
    }
}

async fn exchange(addr: SocketAddr, with_players: bool) -> Result<A2sReport> {
    let local: SocketAddr = if addr.is_ipv4() {
        (Ipv4Addr::UNSPECIFIED, 0).into()
    } else {
        (Ipv6Addr::UNSPECIFIED, 0).into()
    };
    let socket = UdpSocket::bind(local).await?;
    let mut session = Session {
        framed: UdpFramed::new(socket, A2sCodec),
        peer: addr,
        assembler: SplitAssembler::default(),
    };

    let info = match session.request(RequestKind::Info).await? {
        Response::Info(info) => info,
        other => return Err(unexpected("info", &other)),
    };

    let players = if with_players {
        match session.request(RequestKind::Players).await? {
            Response::Players(players) => Some(players),
            other => return Err(unexpected("players", &other)),
        }
    } else {
        None
    };

    Ok(A2sReport { info, players })
}

fn unexpected(wanted: &str, got: &Response) -> QueryError {
    QueryError::invalid(format!("expected {wanted} reply, got {}", got.label()))
}

struct Session {
    framed: UdpFramed<A2sCodec>,
    peer: SocketAddr,
    assembler: SplitAssembler,
}

impl Session {
    /// Send a request, answering challenges until a real reply arrives.
    async fn request(&mut self, kind: RequestKind) -> Result<Response> {
        let mut request = Request::new(kind);
        for _ in 0..=MAX_CHALLENGE_ROUNDS {
            self.framed.send((request, self.peer)).await?;
            match self.receive().await? {
                Response::Challenge(challenge) => {
                    debug!(peer = %self.peer, ?kind, "A2S challenge received");
                    request.challenge = Some(challenge);
                }
                response => return Ok(response),
            }
        }
        Err(QueryError::invalid("server kept answering with challenges"))
    }

    /// Wait for the next complete reply from the peer.
    async fn receive(&mut self) -> Result<Response> {
        loop {
            let (frame, from) = match self.framed.next().await {
                Some(item) => item?,
                None => return Err(QueryError::invalid("socket closed")),
            };
            if from != self.peer {
                debug!(peer = %self.peer, from = %from, "Ignoring datagram from unexpected source");
                continue;
            }
            match frame {
                Frame::Single(payload) => return Response::parse(&payload),
                Frame::Split(fragment) => {
                    if let Some(payload) = self.assembler.push(fragment)? {
                        return Response::parse_assembled(&payload);
                    }
                }
            }
        }
    }
}
