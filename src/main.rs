mod app;
mod canvas;
mod client;
mod colors;
mod config;
mod error;
mod message;
mod meter;
mod panel;
mod settings;
mod status;
mod terminal;

use clap::{Parser, Subcommand};
use config::{LogConfig, LogTarget, ReplayConfig, ReplaySource, WatchConfig};
use env_logger::{Env, Target};
use error::ClientError;
use log::{error, info, warn};
use settings::Settings;
use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Log file permissions (owner read/write only)
const LOG_FILE_MODE: u32 = 0o600;

#[derive(Parser)]
#[command(name = "meterview")]
#[command(version)]
#[command(about = "Terminal client for audio server status and level meters", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to a server and show live status and meters
    Watch {
        /// Server host[:port]; the client connects to ws://HOST/websocket
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Seconds per frame
        #[arg(short, long)]
        time: Option<f32>,

        /// Color scheme (0-9, 7 = mono)
        #[arg(short, long)]
        scheme: Option<u8>,

        /// Debug logging
        #[arg(short, long)]
        debug: bool,

        /// Log file (defaults to /tmp/meterview.log)
        #[arg(long)]
        log_file: Option<PathBuf>,
    },

    /// Render recorded telemetry, one JSON message per line
    Replay {
        /// File to read, or - for stdin
        input: String,

        /// Print the final screen to stdout instead of animating
        #[arg(short, long)]
        print: bool,

        /// Seconds per replayed message
        #[arg(short, long)]
        time: Option<f32>,

        /// Color scheme (0-9, 7 = mono)
        #[arg(short, long)]
        scheme: Option<u8>,

        /// Debug logging
        #[arg(short, long)]
        debug: bool,
    },
}

fn open_log_file(path: &Path) -> io::Result<File> {
    // Exclusive create first, fall back to truncating the user's own file
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(LOG_FILE_MODE)
        .open(path)
        .or_else(|_| OpenOptions::new().write(true).truncate(true).open(path))
}

fn init_logging(config: &LogConfig) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or(config.level.as_str()));
    builder.format_timestamp_secs();

    if let LogTarget::File(path) = &config.target {
        match open_log_file(path) {
            Ok(file) => {
                builder.target(Target::Pipe(Box::new(file)));
            }
            Err(e) => {
                // stderr would draw over the live view
                eprintln!("meterview: cannot open log file {}: {}", path.display(), e);
                builder.filter_level(log::LevelFilter::Off);
            }
        }
    }
    builder.init();
}

fn log_level(debug: bool, settings: &Settings) -> String {
    if debug {
        "debug".to_string()
    } else {
        settings.log.level.clone().unwrap_or_else(|| "info".to_string())
    }
}

fn run(cli: Cli, settings: Settings) -> Result<(), ClientError> {
    let scheme_default = settings.display.scheme.unwrap_or(0);

    match cli.command {
        Commands::Watch {
            host,
            time,
            scheme,
            debug,
            log_file,
        } => {
            let log_path = log_file
                .or_else(|| settings.log.file.clone())
                .unwrap_or_else(|| PathBuf::from(config::DEFAULT_LOG_PATH));
            init_logging(&LogConfig {
                level: log_level(debug, &settings),
                target: LogTarget::File(log_path),
            });
            if let Some(warning) = &settings.load_warning {
                warn!("{}", warning);
            }

            let config = WatchConfig {
                host: host
                    .or_else(|| settings.server.host.clone())
                    .unwrap_or_else(|| config::DEFAULT_HOST.to_string()),
                frame_time: config::frame_time(time.or(settings.display.frame_time)),
                scheme: scheme.unwrap_or(scheme_default),
            };
            info!("{} v{} watching {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), config.host);
            app::watch(&config)
        }
        Commands::Replay {
            input,
            print,
            time,
            scheme,
            debug,
        } => {
            let target = if print {
                LogTarget::Stderr
            } else {
                LogTarget::File(
                    settings
                        .log
                        .file
                        .clone()
                        .unwrap_or_else(|| PathBuf::from(config::DEFAULT_LOG_PATH)),
                )
            };
            init_logging(&LogConfig {
                level: log_level(debug, &settings),
                target,
            });
            if let Some(warning) = &settings.load_warning {
                warn!("{}", warning);
            }

            let config = ReplayConfig {
                source: ReplaySource::from_arg(&input),
                print,
                frame_time: config::frame_time(time.or(settings.display.frame_time)),
                scheme: scheme.unwrap_or(scheme_default),
            };
            app::replay(&config)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let settings = Settings::load();

    match run(cli, settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("meterview: {}", e);
            ExitCode::FAILURE
        }
    }
}
