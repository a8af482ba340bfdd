//! Application-level configuration loading: room capacity, operation limits and event buffering.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "LIVE_ROOM_BACK_CONFIG_PATH";
const DEFAULT_ROOM_CAPACITY: u32 = 4;
const DEFAULT_OPERATION_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_EVENT_BUFFER: usize = 16;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    room_capacity: u32,
    operation_timeout: Duration,
    event_buffer: usize,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        room_capacity = app_config.room_capacity,
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Override the room capacity, clamped to at least one seat for the host.
    pub fn with_room_capacity(mut self, capacity: u32) -> Self {
        self.room_capacity = capacity.max(1);
        self
    }

    /// Override the per-operation time limit.
    pub fn with_operation_timeout(mut self, limit: Duration) -> Self {
        self.operation_timeout = limit;
        self
    }

    /// Number of seats (host included) given to newly created rooms.
    pub fn room_capacity(&self) -> u32 {
        self.room_capacity
    }

    /// Upper bound for lock acquisition and each storage call.
    pub fn operation_timeout(&self) -> Duration {
        self.operation_timeout
    }

    /// Capacity of the room event broadcast channel.
    pub fn event_buffer(&self) -> usize {
        self.event_buffer
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            room_capacity: DEFAULT_ROOM_CAPACITY,
            operation_timeout: Duration::from_millis(DEFAULT_OPERATION_TIMEOUT_MS),
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    room_capacity: Option<u32>,
    #[serde(default)]
    operation_timeout_ms: Option<u64>,
    #[serde(default)]
    event_buffer: Option<usize>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let room_capacity = match value.room_capacity {
            Some(0) => {
                warn!("room_capacity must be at least 1; using the default");
                DEFAULT_ROOM_CAPACITY
            }
            Some(capacity) => capacity,
            None => DEFAULT_ROOM_CAPACITY,
        };

        Self {
            room_capacity,
            operation_timeout: Duration::from_millis(
                value
                    .operation_timeout_ms
                    .unwrap_or(DEFAULT_OPERATION_TIMEOUT_MS),
            ),
            event_buffer: value.event_buffer.unwrap_or(DEFAULT_EVENT_BUFFER).max(1),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
