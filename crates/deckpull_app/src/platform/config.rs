//! Settings for one run: built-in defaults, overlaid by the optional RON file, overlaid by CLI flags.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use deck_logging::{deck_info, deck_warn};
use deckpull_core::SubmissionOptions;
use deckpull_engine::EngineConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use super::cli::Cli;

const DEFAULT_SERVER: &str = "http://127.0.0.1:5002/";
const DEFAULT_OUTPUT_DIR: &str = "downloads";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid server url {url:?}: {source}")]
    InvalidServerUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Shape of `deckpull.ron`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FileConfig {
    pub server_url: Option<String>,
    pub column_sort: Option<bool>,
    pub keep_format: Option<bool>,
    pub output_dir: Option<PathBuf>,
    pub connect_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub stream_idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub engine: EngineConfig,
    pub options: SubmissionOptions,
    pub download: bool,
    pub files: Vec<PathBuf>,
}

/// Reads the config file. A missing file means defaults; a broken one is reported and ignored.
pub(crate) fn load_file_config(path: &Path) -> FileConfig {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return FileConfig::default();
        }
        Err(err) => {
            deck_warn!("Failed to read config from {:?}: {}", path, err);
            return FileConfig::default();
        }
    };

    match ron::from_str(&content) {
        Ok(config) => {
            deck_info!("Loaded config from {:?}", path);
            config
        }
        Err(err) => {
            deck_warn!("Failed to parse config from {:?}: {}", path, err);
            FileConfig::default()
        }
    }
}

pub(crate) fn resolve(cli: &Cli, file: FileConfig) -> Result<Settings, ConfigError> {
    let server = cli
        .server
        .clone()
        .or(file.server_url)
        .unwrap_or_else(|| DEFAULT_SERVER.to_string());
    let base_url = Url::parse(&server).map_err(|source| ConfigError::InvalidServerUrl {
        url: server.clone(),
        source,
    })?;

    let mut engine = EngineConfig::new(base_url);
    engine.output_dir = cli
        .output_dir
        .clone()
        .or(file.output_dir)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
    if let Some(secs) = file.connect_timeout_secs {
        engine.connect_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = file.request_timeout_secs {
        engine.request_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = file.stream_idle_timeout_secs {
        engine.stream_idle_timeout = Duration::from_secs(secs);
    }

    let defaults = SubmissionOptions::default();
    let options = SubmissionOptions {
        column_sort: !cli.no_column_sort && file.column_sort.unwrap_or(defaults.column_sort),
        keep_format: !cli.no_keep_format && file.keep_format.unwrap_or(defaults.keep_format),
    };

    Ok(Settings {
        engine,
        options,
        download: cli.download,
        files: cli.files.clone(),
    })
}
