//! Configuration management for the OCR engine server

use serde::Deserialize;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;
const DEFAULT_SERVING_URL: &str = "http://localhost:8868/ocr";

/// Env vars the engine consults when deciding where to put its model
/// caches. All of them get pointed at [`EngineConfig::cache_dir`] before
/// the engine is constructed.
const CACHE_ENV_VARS: [&str; 5] = [
    "PADDLE_HOME",
    "PADDLEX_HOME",
    "PADDLEOCR_HOME",
    "HOME",
    "USERPROFILE",
];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound for an uploaded request body, in bytes.
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    pub backend: EngineBackend,
    /// Helper program plus leading arguments, for the `command` backend.
    pub command: Vec<String>,
    /// Sidecar endpoint, for the `serving` backend.
    pub serving_url: String,
    /// Recognition language passed through to the engine.
    pub lang: String,
    /// Where the engine's cache/home directories get redirected.
    pub cache_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineBackend {
    Command,
    Serving,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            },
            engine: EngineConfig {
                backend: EngineBackend::Serving,
                command: Vec::new(),
                serving_url: DEFAULT_SERVING_URL.to_string(),
                lang: "en".to_string(),
                cache_dir: PathBuf::from("./paddle_cache"),
            },
        }
    }
}

impl Config {
    /// Build from environment variables, falling back to defaults field by
    /// field. Nothing is required; a bare environment yields the same
    /// configuration as [`Config::default`].
    pub fn from_env() -> Self {
        Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("SERVER_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8000),
                max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            },
            engine: EngineConfig {
                backend: match env::var("OCR_ENGINE_BACKEND")
                    .unwrap_or_default()
                    .as_str()
                {
                    "command" => EngineBackend::Command,
                    _ => EngineBackend::Serving,
                },
                command: env::var("OCR_ENGINE_COMMAND")
                    .map(|cmd| cmd.split_whitespace().map(str::to_string).collect())
                    .unwrap_or_default(),
                serving_url: env::var("OCR_SERVING_URL")
                    .unwrap_or_else(|_| DEFAULT_SERVING_URL.to_string()),
                lang: env::var("OCR_LANG").unwrap_or_else(|_| "en".to_string()),
                cache_dir: env::var("OCR_CACHE_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("./paddle_cache")),
            },
        }
    }
}

/// Create the cache directory and point every engine cache/home variable
/// at it. One-time process setup, done before the engine exists; keeps the
/// engine from writing under the real $HOME on hosts where that is not
/// writable.
pub fn redirect_engine_cache(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    let dir = dir.canonicalize()?;
    for var in CACHE_ENV_VARS {
        env::set_var(var, &dir);
    }
    Ok(())
}
