//! REST client for the scene service.
//!
//! Calls block; the store is only driven from the sync worker thread.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tabletop_core::storage::BoxFuture;
use tabletop_core::{
    Campaign, FogCell, Scene, SceneInit, ScenePatch, SceneStore, SceneSummary, StoreError, StoreResult, Token,
    TokenInit, TokenPatch,
};

/// [`SceneStore`] backed by the tabletop server.
pub struct HttpStore {
    base_url: String,
    agent: ureq::Agent,
}

#[derive(Serialize)]
struct RevealBody<'a> {
    cells: &'a [FogCell],
}

impl HttpStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(Duration::from_secs(10)).build();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            agent,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn get<T: DeserializeOwned>(&self, endpoint: &str) -> StoreResult<T> {
        let response = self.agent.get(&self.url(endpoint)).call().map_err(convert_error)?;
        parse(response)
    }

    fn send<B: Serialize>(&self, method: &str, endpoint: &str, body: &B) -> StoreResult<ureq::Response> {
        self.agent
            .request(method, &self.url(endpoint))
            .send_json(body)
            .map_err(convert_error)
    }

    fn delete(&self, endpoint: &str) -> StoreResult<()> {
        self.agent.delete(&self.url(endpoint)).call().map_err(convert_error)?;
        Ok(())
    }
}

fn ready<'a, T: Send + 'a>(value: T) -> BoxFuture<'a, T> {
    Box::pin(std::future::ready(value))
}

fn parse<T: DeserializeOwned>(response: ureq::Response) -> StoreResult<T> {
    response
        .into_json::<T>()
        .map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Pull the `error` field out of a JSON error body, if there is one.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

/// Convert ureq error to StoreError
fn convert_error(e: ureq::Error) -> StoreError {
    match e {
        ureq::Error::Status(code, response) => {
            let message = error_message(&response.into_string().unwrap_or_default());
            match code {
                404 => StoreError::NotFound(message),
                400 | 422 => StoreError::Validation(message),
                _ => StoreError::Network(format!("HTTP {}: {}", code, message)),
            }
        }
        other => StoreError::Network(other.to_string()),
    }
}

impl SceneStore for HttpStore {
    fn list_campaigns(&self) -> BoxFuture<'_, StoreResult<Vec<Campaign>>> {
        ready(self.get("/campaigns"))
    }

    fn list_scenes(&self, campaign_id: &str) -> BoxFuture<'_, StoreResult<Vec<SceneSummary>>> {
        ready(self.get(&format!("/campaigns/{}/scenes", campaign_id)))
    }

    fn get_scene(&self, id: &str) -> BoxFuture<'_, StoreResult<Scene>> {
        let result = self.get::<Scene>(&format!("/scenes/{}", id)).map(|mut scene| {
            scene.normalize_fog();
            scene
        });
        ready(result)
    }

    fn create_scene(&self, campaign_id: &str, init: SceneInit) -> BoxFuture<'_, StoreResult<Scene>> {
        let result = self
            .send("POST", &format!("/campaigns/{}/scenes", campaign_id), &init)
            .and_then(parse);
        ready(result)
    }

    fn update_scene(&self, id: &str, patch: ScenePatch) -> BoxFuture<'_, StoreResult<()>> {
        ready(self.send("PATCH", &format!("/scenes/{}", id), &patch).map(|_| ()))
    }

    fn add_token(&self, scene_id: &str, init: TokenInit) -> BoxFuture<'_, StoreResult<Token>> {
        let result = self
            .send("POST", &format!("/scenes/{}/tokens", scene_id), &init)
            .and_then(parse);
        ready(result)
    }

    fn update_token(&self, token_id: &str, patch: TokenPatch) -> BoxFuture<'_, StoreResult<()>> {
        ready(self.send("PATCH", &format!("/tokens/{}", token_id), &patch).map(|_| ()))
    }

    fn remove_token(&self, token_id: &str) -> BoxFuture<'_, StoreResult<()>> {
        ready(self.delete(&format!("/tokens/{}", token_id)))
    }

    fn reveal_fog(&self, scene_id: &str, cells: Vec<FogCell>) -> BoxFuture<'_, StoreResult<()>> {
        let body = RevealBody { cells: &cells };
        ready(self.send("POST", &format!("/scenes/{}/fog", scene_id), &body).map(|_| ()))
    }
}
