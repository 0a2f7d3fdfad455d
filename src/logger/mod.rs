//! Structured logging built on `tracing-subscriber`.
//!
//! - Console output in full, compact or JSON format with optional colours
//! - File output with size-based rotation and gzip compression of rotated files

pub mod compression;
pub mod config;
pub mod error;
pub mod rotation;
pub(crate) mod writer;

pub use config::*;
pub use error::LoggerError;

use std::io::IsTerminal;

use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};
use writer::RotatingFileWriter;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Installs the global subscriber. Fails if one is already installed.
pub fn init_logger(config: LoggerConfig) -> Result<(), LoggerError> {
    config.validate()?;

    let filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let layers = build_layers(&config)?;

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| LoggerError::Init {
            message: e.to_string(),
        })
}

fn build_layers(config: &LoggerConfig) -> Result<Vec<BoxedLayer>, LoggerError> {
    let mut layers = Vec::with_capacity(2);

    // The file layer goes first so span fields are never formatted with ANSI
    // codes (tokio-rs/tracing#1817).
    if config.file.enabled {
        let writer = RotatingFileWriter::new(&config.file)?;
        layers.push(file_layer(config.file.format, writer));
    }

    if config.console.enabled {
        let use_ansi = config.console.colored && std::io::stdout().is_terminal();
        layers.push(console_layer(config.console.format, use_ansi));
    }

    Ok(layers)
}

fn console_layer(format: LogFormat, ansi: bool) -> BoxedLayer {
    let base = fmt::layer().with_ansi(ansi).with_target(true).with_level(true);
    match format {
        LogFormat::Full => base.boxed(),
        LogFormat::Compact => base.compact().boxed(),
        LogFormat::Json => base.json().flatten_event(true).boxed(),
    }
}

fn file_layer(format: LogFormat, writer: RotatingFileWriter) -> BoxedLayer {
    let base = fmt::layer().with_ansi(false).with_target(true).with_writer(writer);
    match format {
        LogFormat::Full => base.boxed(),
        LogFormat::Compact => base.compact().boxed(),
        LogFormat::Json => base.json().flatten_event(true).boxed(),
    }
}
