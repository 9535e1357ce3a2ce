//! Server endpoints.
//!
//! The REST base URL is required. The socket URL defaults to the REST URL
//! with `http` swapped for `ws` (or `https` for `wss`) and `/ws` appended.

use std::time::Duration;

use crate::error::ConfigError;

/// How often the galaxy map snapshot is refetched.
pub const DEFAULT_MAP_REFRESH: Duration = Duration::from_secs(30);

/// Resolved endpoints for one game server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// REST base, without trailing slash.
    pub http_url: String,
    /// WebSocket endpoint.
    pub ws_url: String,
    /// Galaxy map refresh interval.
    pub map_refresh: Duration,
}

impl ClientConfig {
    /// Resolve endpoints. `ws_url` is derived when not given.
    ///
    /// # Errors
    ///
    /// - `ConfigError::Empty` if `http_url` is blank.
    /// - `ConfigError::Scheme` if either URL has the wrong scheme.
    pub fn new(http_url: &str, ws_url: Option<&str>) -> Result<Self, ConfigError> {
        let http_url = http_url.trim().trim_end_matches('/');
        if http_url.is_empty() {
            return Err(ConfigError::Empty);
        }
        if !(http_url.starts_with("http://") || http_url.starts_with("https://")) {
            return Err(ConfigError::Scheme { url: http_url.to_string(), expected: "http(s)" });
        }

        let ws_url = match ws_url.map(str::trim).filter(|u| !u.is_empty()) {
            Some(url) if url.starts_with("ws://") || url.starts_with("wss://") => url.to_string(),
            Some(url) => {
                return Err(ConfigError::Scheme { url: url.to_string(), expected: "ws(s)" });
            },
            None => derive_ws_url(http_url),
        };

        Ok(Self { http_url: http_url.to_string(), ws_url, map_refresh: DEFAULT_MAP_REFRESH })
    }

    /// Override the map refresh interval.
    #[must_use]
    pub fn with_map_refresh(mut self, interval: Duration) -> Self {
        self.map_refresh = interval;
        self
    }

    /// Galaxy map snapshot.
    pub fn map_url(&self) -> String {
        format!("{}/api/map", self.http_url)
    }

    /// Points of interest for one system.
    pub fn system_url(&self, system_id: &str) -> String {
        format!("{}/api/map/system/{system_id}", self.http_url)
    }

    /// Battle metadata.
    pub fn battle_url(&self, battle_id: &str) -> String {
        format!("{}/api/battles/{battle_id}", self.http_url)
    }

    /// One page of a battle log.
    pub fn battle_log_url(&self, battle_id: &str, tick_start: u64, limit: usize) -> String {
        format!("{}/api/battles/{battle_id}/log?tick_start={tick_start}&limit={limit}", self.http_url)
    }

    /// Server-sent activity stream.
    pub fn activity_url(&self) -> String {
        format!("{}/api/activity/stream", self.http_url)
    }
}

/// `http://host` becomes `ws://host/ws`; `https` becomes `wss`.
pub fn derive_ws_url(http_url: &str) -> String {
    let base = http_url.trim_end_matches('/');
    let swapped = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        base.to_string()
    };
    if swapped.ends_with("/ws") { swapped } else { format!("{swapped}/ws") }
}
