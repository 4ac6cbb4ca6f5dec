//! File-based scene store for native platforms.

use super::{
    BoxFuture, SceneStore, StoreError, StoreResult, build_scene, new_id, ready, reveal_on, scene_not_found,
    token_not_found,
};
use crate::scene::{Campaign, FogCell, Scene, SceneInit, ScenePatch, SceneSummary, Token, TokenInit, TokenPatch};
use std::fs;
use std::path::{Path, PathBuf};

const CAMPAIGNS_FILE: &str = "campaigns.json";
const SCENE_EXTENSION: &str = "scene.json";

/// Campaign created on first use so local play has somewhere to put scenes.
pub const LOCAL_CAMPAIGN_ID: &str = "local";

/// File-based store.
///
/// Each scene is a JSON file `<id>.scene.json` in the base directory, next to
/// a `campaigns.json` listing.
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    /// Create a store in `base_path`, creating the directory and a default
    /// campaign listing if needed.
    pub fn new(base_path: PathBuf) -> StoreResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .map_err(|e| StoreError::Io(format!("Failed to create storage directory: {}", e)))?;
        }
        let store = Self { base_path };
        if !store.campaigns_path().exists() {
            store.write_campaigns(&[Campaign {
                id: LOCAL_CAMPAIGN_ID.to_string(),
                name: "Local campaign".to_string(),
            }])?;
        }
        Ok(store)
    }

    /// Store in the default location.
    ///
    /// On Unix: `~/.local/share/tabletop/scenes/`
    /// On Windows: `%LOCALAPPDATA%\tabletop\scenes\`
    pub fn default_location() -> StoreResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StoreError::Io("Could not determine home directory".to_string()))?;
        Self::new(base.join("tabletop").join("scenes"))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn campaigns_path(&self) -> PathBuf {
        self.base_path.join(CAMPAIGNS_FILE)
    }

    fn scene_path(&self, id: &str) -> PathBuf {
        let safe_id: String = id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{}.{}", safe_id, SCENE_EXTENSION))
    }

    fn read_campaigns(&self) -> StoreResult<Vec<Campaign>> {
        let path = self.campaigns_path();
        let json = fs::read_to_string(&path)
            .map_err(|e| StoreError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        serde_json::from_str(&json)
            .map_err(|e| StoreError::Serialization(format!("Failed to parse {}: {}", path.display(), e)))
    }

    fn write_campaigns(&self, campaigns: &[Campaign]) -> StoreResult<()> {
        let path = self.campaigns_path();
        let json = serde_json::to_string_pretty(campaigns).map_err(|e| StoreError::Serialization(e.to_string()))?;
        fs::write(&path, json).map_err(|e| StoreError::Io(format!("Failed to write {}: {}", path.display(), e)))
    }

    fn load(&self, id: &str) -> StoreResult<Scene> {
        let path = self.scene_path(id);
        if !path.exists() {
            return Err(scene_not_found(id));
        }
        self.load_path(&path)
    }

    fn load_path(&self, path: &Path) -> StoreResult<Scene> {
        let json = fs::read_to_string(path)
            .map_err(|e| StoreError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Scene::from_json(&json)
            .map_err(|e| StoreError::Serialization(format!("Failed to parse {}: {}", path.display(), e)))
    }

    fn save(&self, scene: &Scene) -> StoreResult<()> {
        let path = self.scene_path(&scene.id);
        let json = scene.to_json().map_err(|e| StoreError::Serialization(e.to_string()))?;
        fs::write(&path, json).map_err(|e| StoreError::Io(format!("Failed to write {}: {}", path.display(), e)))
    }

    /// Every scene on disk. Unreadable files are skipped with a warning.
    fn load_all(&self) -> StoreResult<Vec<Scene>> {
        let entries = fs::read_dir(&self.base_path)
            .map_err(|e| StoreError::Io(format!("Failed to read directory: {}", e)))?;

        let suffix = format!(".{}", SCENE_EXTENSION);
        let mut scenes = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let is_scene = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(&suffix));
            if !is_scene {
                continue;
            }
            match self.load_path(&path) {
                Ok(scene) => scenes.push(scene),
                Err(e) => log::warn!("Skipping {}: {}", path.display(), e),
            }
        }
        scenes.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(scenes)
    }

    fn modify(&self, id: &str, f: impl FnOnce(&mut Scene)) -> StoreResult<()> {
        let mut scene = self.load(id)?;
        f(&mut scene);
        self.save(&scene)
    }

    fn modify_token_owner(&self, token_id: &str, f: impl FnOnce(&mut Scene)) -> StoreResult<()> {
        let mut scene = self
            .load_all()?
            .into_iter()
            .find(|s| s.token(token_id).is_some())
            .ok_or_else(|| token_not_found(token_id))?;
        f(&mut scene);
        self.save(&scene)
    }

    fn create(&self, campaign_id: &str, init: SceneInit) -> StoreResult<Scene> {
        if !self.read_campaigns()?.iter().any(|c| c.id == campaign_id) {
            return Err(StoreError::NotFound(format!("campaign {campaign_id}")));
        }
        let scene = build_scene(campaign_id, init)?;
        self.save(&scene)?;
        log::info!("created scene {} at {}", scene.id, self.scene_path(&scene.id).display());
        Ok(scene)
    }

    fn summaries(&self, campaign_id: &str) -> StoreResult<Vec<SceneSummary>> {
        Ok(self
            .load_all()?
            .iter()
            .filter(|s| s.campaign_id == campaign_id)
            .map(Scene::summary)
            .collect())
    }

    fn insert_token(&self, scene_id: &str, init: TokenInit) -> StoreResult<Token> {
        let token = Token::from_init(new_id(), init);
        let added = token.clone();
        self.modify(scene_id, move |scene| scene.tokens.push(added))?;
        Ok(token)
    }
}

impl SceneStore for FileStore {
    fn list_campaigns(&self) -> BoxFuture<'_, StoreResult<Vec<Campaign>>> {
        ready(self.read_campaigns())
    }

    fn list_scenes(&self, campaign_id: &str) -> BoxFuture<'_, StoreResult<Vec<SceneSummary>>> {
        ready(self.summaries(campaign_id))
    }

    fn get_scene(&self, id: &str) -> BoxFuture<'_, StoreResult<Scene>> {
        ready(self.load(id))
    }

    fn create_scene(&self, campaign_id: &str, init: SceneInit) -> BoxFuture<'_, StoreResult<Scene>> {
        ready(self.create(campaign_id, init))
    }

    fn update_scene(&self, id: &str, patch: ScenePatch) -> BoxFuture<'_, StoreResult<()>> {
        ready(self.modify(id, |scene| scene.apply_patch(&patch)))
    }

    fn add_token(&self, scene_id: &str, init: TokenInit) -> BoxFuture<'_, StoreResult<Token>> {
        ready(self.insert_token(scene_id, init))
    }

    fn update_token(&self, token_id: &str, patch: TokenPatch) -> BoxFuture<'_, StoreResult<()>> {
        let result = self.modify_token_owner(token_id, |scene| {
            if let Some(token) = scene.token_mut(token_id) {
                token.apply_patch(&patch);
            }
        });
        ready(result)
    }

    fn remove_token(&self, token_id: &str) -> BoxFuture<'_, StoreResult<()>> {
        ready(self.modify_token_owner(token_id, |scene| {
            scene.remove_token(token_id);
        }))
    }

    fn reveal_fog(&self, scene_id: &str, cells: Vec<FogCell>) -> BoxFuture<'_, StoreResult<()>> {
        ready(self.modify(scene_id, |scene| {
            reveal_on(scene, &cells);
        }))
    }
}
