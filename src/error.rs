use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while setting up or driving the client.
///
/// Problems with individual telemetry messages are never errors; they are
/// dropped or ignored by the dispatcher and only logged.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid server host {host:?}: {reason}")]
    InvalidHost { host: String, reason: String },
    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),
    #[error("cannot read replay file {}: {source}", .path.display())]
    Replay {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
