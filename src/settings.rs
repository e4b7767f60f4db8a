use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Optional user settings from `<config_dir>/meterview/config.toml`
///
/// ```toml
/// [server]
/// host = "studio.local:8080"
///
/// [display]
/// scheme = 7
/// frame_time = 0.05
///
/// [log]
/// level = "debug"
/// file = "/tmp/meterview.log"
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub display: DisplaySettings,
    #[serde(default)]
    pub log: LogSettings,
    /// Why the file was ignored, reported once logging is up
    #[serde(skip)]
    pub load_warning: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServerSettings {
    pub host: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DisplaySettings {
    pub scheme: Option<u8>,
    pub frame_time: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LogSettings {
    pub level: Option<String>,
    pub file: Option<PathBuf>,
}

impl Settings {
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => Self::from_toml(&content).unwrap_or_else(|e| Self {
                load_warning: Some(format!("ignoring {}: {}", path.display(), e)),
                ..Self::default()
            }),
            Err(e) => Self {
                load_warning: Some(format!("cannot read {}: {}", path.display(), e)),
                ..Self::default()
            },
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("meterview")
            .join("config.toml")
    }
}
