//! REST client for map and battle data.

use std::future::Future;

use nebula_proto::{
    battle::{BattleInfo, BattlePage},
    map::{GalaxyMap, SystemDetail},
};
use nebula_render::BattleSource;
use serde::de::DeserializeOwned;

use crate::{config::ClientConfig, error::ApiError};

/// Typed access to the server's REST endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl ApiClient {
    /// Client for the configured server.
    pub fn new(config: ClientConfig) -> Self {
        Self { http: reqwest::Client::new(), config }
    }

    /// Endpoint configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Underlying HTTP client, shared with the activity stream.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Full galaxy snapshot.
    pub async fn galaxy_map(&self) -> Result<GalaxyMap, ApiError> {
        self.get_json(self.config.map_url()).await
    }

    /// Points of interest in one system.
    pub async fn system_detail(&self, system_id: &str) -> Result<SystemDetail, ApiError> {
        self.get_json(self.config.system_url(system_id)).await
    }

    /// Battle metadata.
    pub async fn battle_info(&self, battle_id: &str) -> Result<BattleInfo, ApiError> {
        self.get_json(self.config.battle_url(battle_id)).await
    }

    /// One page of a battle log.
    pub async fn battle_page(
        &self,
        battle_id: &str,
        tick_start: u64,
        limit: usize,
    ) -> Result<BattlePage, ApiError> {
        self.get_json(self.config.battle_log_url(battle_id, tick_start, limit)).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, ApiError> {
        let request_failed =
            |e: reqwest::Error| ApiError::Request { url: url.clone(), reason: e.to_string() };

        let response = self.http.get(&url).send().await.map_err(request_failed)?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = status.as_u16(), "request rejected");
            return Err(ApiError::Status { url: url.clone(), status: status.as_u16() });
        }

        let body = response.text().await.map_err(request_failed)?;
        let value = serde_json::from_str(&body).inspect_err(|e| {
            tracing::warn!(url = %url, error = %e, "malformed response body");
        })?;
        Ok(value)
    }
}

impl BattleSource for ApiClient {
    type Error = ApiError;

    fn fetch_page(
        &self,
        battle_id: &str,
        tick_start: u64,
        limit: usize,
    ) -> impl Future<Output = Result<BattlePage, ApiError>> + Send {
        self.battle_page(battle_id, tick_start, limit)
    }
}
