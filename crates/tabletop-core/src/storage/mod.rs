//! Storage abstraction for scene persistence.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::scene::{Campaign, FogCell, Scene, SceneInit, ScenePatch, SceneSummary, Token, TokenInit, TokenPatch};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Persistence errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Boxed future returned by [`SceneStore`] methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Remote (or local) source of truth for scenes.
///
/// Writes return once applied; callers reload with [`SceneStore::get_scene`]
/// to observe the authoritative state.
pub trait SceneStore: Send + Sync {
    /// Campaigns the current user may create scenes under.
    fn list_campaigns(&self) -> BoxFuture<'_, StoreResult<Vec<Campaign>>>;

    fn list_scenes(&self, campaign_id: &str) -> BoxFuture<'_, StoreResult<Vec<SceneSummary>>>;

    /// Full scene including tokens, drawings and fog.
    fn get_scene(&self, id: &str) -> BoxFuture<'_, StoreResult<Scene>>;

    fn create_scene(&self, campaign_id: &str, init: SceneInit) -> BoxFuture<'_, StoreResult<Scene>>;

    fn update_scene(&self, id: &str, patch: ScenePatch) -> BoxFuture<'_, StoreResult<()>>;

    fn add_token(&self, scene_id: &str, init: TokenInit) -> BoxFuture<'_, StoreResult<Token>>;

    fn update_token(&self, token_id: &str, patch: TokenPatch) -> BoxFuture<'_, StoreResult<()>>;

    fn remove_token(&self, token_id: &str) -> BoxFuture<'_, StoreResult<()>>;

    /// Mark cells revealed. Out-of-range cells are ignored.
    fn reveal_fog(&self, scene_id: &str, cells: Vec<FogCell>) -> BoxFuture<'_, StoreResult<()>>;
}

/// Wrap an already computed result as a [`BoxFuture`].
pub(crate) fn ready<'a, T: Send + 'a>(value: T) -> BoxFuture<'a, T> {
    Box::pin(std::future::ready(value))
}

/// Fresh identifier for scenes and tokens.
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Validate creation fields, mapping failures to [`StoreError::Validation`].
pub fn validate_scene_init(init: &SceneInit) -> StoreResult<()> {
    init.validate().map_err(StoreError::Validation)
}

/// Build a new scene record from creation fields.
pub(crate) fn build_scene(campaign_id: &str, init: SceneInit) -> StoreResult<Scene> {
    validate_scene_init(&init)?;
    Ok(Scene::new(new_id(), campaign_id, init))
}

/// Find the scene owning `token_id` among `scenes`.
pub(crate) fn owner_of<'a>(scenes: impl Iterator<Item = &'a mut Scene>, token_id: &str) -> Option<&'a mut Scene> {
    scenes.into_iter().find(|s| s.token(token_id).is_some())
}

pub(crate) fn scene_not_found(id: &str) -> StoreError {
    StoreError::NotFound(format!("scene {id}"))
}

pub(crate) fn token_not_found(id: &str) -> StoreError {
    StoreError::NotFound(format!("token {id}"))
}

/// Reveal `cells` on `scene`, returning how many changed.
pub(crate) fn reveal_on(scene: &mut Scene, cells: &[FogCell]) -> usize {
    let changed = scene.reveal_cells(cells);
    log::debug!("revealed {changed} of {} requested cells on {}", cells.len(), scene.id);
    changed
}
