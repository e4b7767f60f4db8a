//! Websocket connection listener and topic dispatch
//!
//! The client is receive-only: it opens `ws://<host>/websocket`, reads text
//! frames without blocking the render loop, and routes each decoded snapshot
//! to a [`MessageHandler`]. Reconnecting is left to whoever runs the client.

use crate::error::ClientError;
use crate::message::{self, MeterSnapshot, Parsed, StatusSnapshot, TelemetryMessage};
use log::{debug, info, warn};
use std::io::ErrorKind;
use std::net::TcpStream;
use tungstenite::client::IntoClientRequest;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{connect, Message, WebSocket};

pub const WEBSOCKET_PATH: &str = "/websocket";

/// One method per telemetry topic
pub trait MessageHandler {
    fn on_status(&mut self, snapshot: &StatusSnapshot);
    fn on_meters(&mut self, snapshot: &MeterSnapshot);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Status,
    Meters,
    Ignored,
    Malformed,
}

/// Decode one text frame and hand it to `handler`.
///
/// Unparseable frames and unknown topics leave the handler untouched.
pub fn dispatch<H: MessageHandler + ?Sized>(text: &str, handler: &mut H) -> Outcome {
    match message::parse(text) {
        Parsed::Message(TelemetryMessage::Status(status)) => {
            handler.on_status(&status);
            Outcome::Status
        }
        Parsed::Message(TelemetryMessage::Meters(meters)) => {
            handler.on_meters(&meters);
            Outcome::Meters
        }
        Parsed::Ignored(topic) => {
            debug!("ignoring message with topic {:?}", topic);
            Outcome::Ignored
        }
        Parsed::Malformed(e) => {
            debug!("dropping malformed message ({} bytes): {}", text.len(), e);
            Outcome::Malformed
        }
    }
}

/// Message counters shown in the footer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub received: u64,
    pub applied: u64,
    pub ignored: u64,
    pub dropped: u64,
}

impl Stats {
    pub fn record(&mut self, outcome: Outcome) {
        self.received += 1;
        match outcome {
            Outcome::Status | Outcome::Meters => self.applied += 1,
            Outcome::Ignored => self.ignored += 1,
            Outcome::Malformed => self.dropped += 1,
        }
    }
}

/// Holds the newest snapshot per topic until the next frame is drawn
#[derive(Debug, Default)]
pub struct LatestSnapshots {
    status: Option<StatusSnapshot>,
    meters: Option<MeterSnapshot>,
}

impl MessageHandler for LatestSnapshots {
    fn on_status(&mut self, snapshot: &StatusSnapshot) {
        self.status = Some(snapshot.clone());
    }

    fn on_meters(&mut self, snapshot: &MeterSnapshot) {
        self.meters = Some(snapshot.clone());
    }
}

impl LatestSnapshots {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.meters.is_none()
    }

    /// Forward and forget the pending snapshots. Returns true if any were pending.
    pub fn flush_into<H: MessageHandler + ?Sized>(&mut self, handler: &mut H) -> bool {
        let pending = !self.is_empty();
        if let Some(status) = self.status.take() {
            handler.on_status(&status);
        }
        if let Some(meters) = self.meters.take() {
            handler.on_meters(&meters);
        }
        pending
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connected,
    Disconnected,
}

impl ConnectionState {
    pub fn label(self) -> &'static str {
        match self {
            ConnectionState::Idle => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnected => "disconnected",
        }
    }
}

/// Owns the single websocket for the lifetime of a watch session
pub struct Client {
    url: String,
    socket: Option<WebSocket<MaybeTlsStream<TcpStream>>>,
    state: ConnectionState,
    stats: Stats,
}

/// Websocket URL for a `host[:port]` string
pub fn websocket_url(host: &str) -> Result<String, ClientError> {
    let invalid = |reason: &str| ClientError::InvalidHost {
        host: host.to_string(),
        reason: reason.to_string(),
    };
    let host = host.trim();
    if host.is_empty() {
        return Err(invalid("empty"));
    }
    if host.contains("://") || host.contains('/') || host.chars().any(char::is_whitespace) {
        return Err(invalid("expected host[:port]"));
    }
    let url = format!("ws://{host}{WEBSOCKET_PATH}");
    url.as_str()
        .into_client_request()
        .map_err(|e| invalid(&e.to_string()))?;
    Ok(url)
}

impl Client {
    pub fn new(host: &str) -> Result<Self, ClientError> {
        Ok(Self {
            url: websocket_url(host)?,
            socket: None,
            state: ConnectionState::Idle,
            stats: Stats::default(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Open the connection. The handshake blocks; reads afterwards do not.
    pub fn start(&mut self) -> Result<(), ClientError> {
        let (mut socket, response) = connect(self.url.as_str())?;
        debug!("handshake response status {}", response.status());
        if let MaybeTlsStream::Plain(stream) = socket.get_mut() {
            stream.set_nonblocking(true)?;
        }
        info!("connected to {}", self.url);
        self.socket = Some(socket);
        self.state = ConnectionState::Connected;
        Ok(())
    }

    /// Dispatch every frame currently buffered. Returns frames handled.
    pub fn poll<H: MessageHandler + ?Sized>(&mut self, handler: &mut H) -> usize {
        let Some(socket) = self.socket.as_mut() else { return 0 };

        let mut handled = 0;
        let mut closed = false;
        loop {
            match socket.read() {
                Ok(Message::Text(text)) => {
                    self.stats.record(dispatch(&text, handler));
                    handled += 1;
                }
                Ok(Message::Close(frame)) => {
                    info!("server closed connection: {:?}", frame);
                    closed = true;
                    break;
                }
                Ok(_) => continue,
                Err(tungstenite::Error::Io(ref e)) if e.kind() == ErrorKind::WouldBlock => break,
                Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                    info!("connection closed");
                    closed = true;
                    break;
                }
                Err(e) => {
                    warn!("websocket read error: {}", e);
                    closed = true;
                    break;
                }
            }
        }

        if closed {
            self.socket = None;
            self.state = ConnectionState::Disconnected;
        }
        handled
    }

    /// Close the connection if it is still open.
    pub fn stop(&mut self) {
        if let Some(mut socket) = self.socket.take() {
            if let Err(e) = socket.close(None) {
                debug!("close: {}", e);
            }
            let _ = socket.flush();
            info!("disconnected from {}", self.url);
        }
        self.state = ConnectionState::Disconnected;
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.stop();
    }
}
