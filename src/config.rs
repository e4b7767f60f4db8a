use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "127.0.0.1:8080";
/// Seconds between frames in the live view
pub const DEFAULT_FRAME_TIME: f32 = 0.05;
/// Cap at ~60fps
pub const MIN_FRAME_TIME: f32 = 0.016;
/// Slowest refresh accepted from flags or settings
pub const MAX_FRAME_TIME: f32 = 5.0;
pub const DEFAULT_LOG_PATH: &str = "/tmp/meterview.log";

/// Configuration for a live watch session
#[derive(Clone, Debug)]
pub struct WatchConfig {
    pub host: String,
    pub frame_time: f32,
    pub scheme: u8,
}

/// Where replayed telemetry comes from
#[derive(Clone, Debug, PartialEq)]
pub enum ReplaySource {
    Stdin,
    File(PathBuf),
}

impl ReplaySource {
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            ReplaySource::Stdin
        } else {
            ReplaySource::File(PathBuf::from(arg))
        }
    }

    pub fn label(&self) -> String {
        match self {
            ReplaySource::Stdin => "stdin".to_string(),
            ReplaySource::File(path) => path.display().to_string(),
        }
    }
}

/// Configuration for replaying recorded messages
#[derive(Clone, Debug)]
pub struct ReplayConfig {
    pub source: ReplaySource,
    pub print: bool,
    pub frame_time: f32,
    pub scheme: u8,
}

/// Where log records go
#[derive(Clone, Debug, PartialEq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    pub level: String,
    pub target: LogTarget,
}

/// Frame interval from an optional override, kept within the fps bounds
pub fn frame_time(value: Option<f32>) -> f32 {
    match value {
        Some(t) if t.is_finite() => t.clamp(MIN_FRAME_TIME, MAX_FRAME_TIME),
        _ => DEFAULT_FRAME_TIME,
    }
}
