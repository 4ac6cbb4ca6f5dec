//! In-memory scene store.

use super::{
    BoxFuture, SceneStore, StoreError, StoreResult, build_scene, new_id, owner_of, ready, reveal_on, scene_not_found,
    token_not_found,
};
use crate::scene::{Campaign, FogCell, Scene, SceneInit, ScenePatch, SceneSummary, Token, TokenInit, TokenPatch};
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Inner {
    campaigns: Vec<Campaign>,
    scenes: BTreeMap<String, Scene>,
}

/// In-memory store for tests, local play and the HTTP service.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with campaigns.
    pub fn with_campaigns(campaigns: impl IntoIterator<Item = Campaign>) -> Self {
        Self {
            inner: RwLock::new(Inner {
                campaigns: campaigns.into_iter().collect(),
                scenes: BTreeMap::new(),
            }),
        }
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::Other(format!("Lock error: {}", e)))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::Other(format!("Lock error: {}", e)))
    }

    fn with_scene<T>(&self, id: &str, f: impl FnOnce(&mut Scene) -> T) -> StoreResult<T> {
        let mut inner = self.write()?;
        let scene = inner.scenes.get_mut(id).ok_or_else(|| scene_not_found(id))?;
        Ok(f(scene))
    }

    fn with_token_owner<T>(&self, token_id: &str, f: impl FnOnce(&mut Scene) -> T) -> StoreResult<T> {
        let mut inner = self.write()?;
        let scene = owner_of(inner.scenes.values_mut(), token_id).ok_or_else(|| token_not_found(token_id))?;
        Ok(f(scene))
    }

    fn create(&self, campaign_id: &str, init: SceneInit) -> StoreResult<Scene> {
        let mut inner = self.write()?;
        if !inner.campaigns.iter().any(|c| c.id == campaign_id) {
            return Err(StoreError::NotFound(format!("campaign {campaign_id}")));
        }
        let scene = build_scene(campaign_id, init)?;
        inner.scenes.insert(scene.id.clone(), scene.clone());
        log::info!("created scene {} in campaign {}", scene.id, campaign_id);
        Ok(scene)
    }
}

impl SceneStore for MemoryStore {
    fn list_campaigns(&self) -> BoxFuture<'_, StoreResult<Vec<Campaign>>> {
        ready(self.read().map(|inner| inner.campaigns.clone()))
    }

    fn list_scenes(&self, campaign_id: &str) -> BoxFuture<'_, StoreResult<Vec<SceneSummary>>> {
        let result = self.read().map(|inner| {
            inner
                .scenes
                .values()
                .filter(|s| s.campaign_id == campaign_id)
                .map(Scene::summary)
                .collect()
        });
        ready(result)
    }

    fn get_scene(&self, id: &str) -> BoxFuture<'_, StoreResult<Scene>> {
        let result = self
            .read()
            .and_then(|inner| inner.scenes.get(id).cloned().ok_or_else(|| scene_not_found(id)));
        ready(result)
    }

    fn create_scene(&self, campaign_id: &str, init: SceneInit) -> BoxFuture<'_, StoreResult<Scene>> {
        ready(self.create(campaign_id, init))
    }

    fn update_scene(&self, id: &str, patch: ScenePatch) -> BoxFuture<'_, StoreResult<()>> {
        ready(self.with_scene(id, |scene| scene.apply_patch(&patch)))
    }

    fn add_token(&self, scene_id: &str, init: TokenInit) -> BoxFuture<'_, StoreResult<Token>> {
        let result = self.with_scene(scene_id, |scene| {
            let token = Token::from_init(new_id(), init);
            scene.tokens.push(token.clone());
            token
        });
        ready(result)
    }

    fn update_token(&self, token_id: &str, patch: TokenPatch) -> BoxFuture<'_, StoreResult<()>> {
        let result = self.with_token_owner(token_id, |scene| {
            if let Some(token) = scene.token_mut(token_id) {
                token.apply_patch(&patch);
            }
        });
        ready(result)
    }

    fn remove_token(&self, token_id: &str) -> BoxFuture<'_, StoreResult<()>> {
        let result = self.with_token_owner(token_id, |scene| {
            scene.remove_token(token_id);
        });
        ready(result)
    }

    fn reveal_fog(&self, scene_id: &str, cells: Vec<FogCell>) -> BoxFuture<'_, StoreResult<()>> {
        let result = self.with_scene(scene_id, |scene| {
            reveal_on(scene, &cells);
        });
        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Cell, Drawing, DrawingKind, PrecisePoint};
    use pollster::block_on;

    fn store() -> MemoryStore {
        MemoryStore::with_campaigns([Campaign {
            id: "c1".into(),
            name: "Curse".into(),
        }])
    }

    #[test]
    fn test_create_and_get() {
        let store = store();
        let scene = block_on(store.create_scene("c1", SceneInit::new("Crypt", 10, 10))).unwrap();
        let loaded = block_on(store.get_scene(&scene.id)).unwrap();
        assert_eq!(loaded, scene);
        assert_eq!(loaded.fog_revealed.len(), 10);

        let listed = block_on(store.list_scenes("c1")).unwrap();
        assert_eq!(listed, vec![scene.summary()]);
        assert!(block_on(store.list_scenes("other")).unwrap().is_empty());
    }

    #[test]
    fn test_create_validation() {
        let store = store();
        let result = block_on(store.create_scene("c1", SceneInit::new("", 10, 10)));
        assert!(matches!(result, Err(StoreError::Validation(_))));
        let result = block_on(store.create_scene("c1", SceneInit::new("Crypt", 0, 10)));
        assert!(matches!(result, Err(StoreError::Validation(_))));
        let result = block_on(store.create_scene("missing", SceneInit::new("Crypt", 5, 5)));
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_token_lifecycle() {
        let store = store();
        let scene = block_on(store.create_scene("c1", SceneInit::new("Crypt", 10, 10))).unwrap();
        let token = block_on(store.add_token(&scene.id, TokenInit::new("Goblin", 5, 5))).unwrap();

        block_on(store.update_token(&token.id, TokenPatch::position(7, 2))).unwrap();
        let loaded = block_on(store.get_scene(&scene.id)).unwrap();
        assert_eq!(loaded.token_at(Cell::new(7, 2)).map(|t| t.id.clone()), Some(token.id.clone()));

        block_on(store.remove_token(&token.id)).unwrap();
        let loaded = block_on(store.get_scene(&scene.id)).unwrap();
        assert!(loaded.tokens.is_empty());

        let missing = block_on(store.update_token(&token.id, TokenPatch::default()));
        assert!(matches!(missing, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_reveal_and_drawings() {
        let store = store();
        let scene = block_on(store.create_scene("c1", SceneInit::new("Crypt", 4, 3))).unwrap();
        block_on(store.reveal_fog(&scene.id, vec![FogCell { row: 2, col: 3 }, FogCell { row: 9, col: 9 }])).unwrap();

        let drawing = Drawing::new(
            DrawingKind::Rectangle,
            vec![PrecisePoint::new(2.0, 2.0), PrecisePoint::new(5.0, 4.0)],
            "#fff",
            2.0,
        );
        block_on(store.update_scene(&scene.id, ScenePatch::drawings(vec![drawing.clone()]))).unwrap();

        let loaded = block_on(store.get_scene(&scene.id)).unwrap();
        assert!(loaded.is_revealed(2, 3));
        assert_eq!(loaded.fog_revealed.iter().flatten().filter(|c| **c).count(), 1);
        assert_eq!(loaded.drawings, vec![drawing]);
    }

    #[test]
    fn test_missing_scene() {
        let store = store();
        assert!(matches!(block_on(store.get_scene("nope")), Err(StoreError::NotFound(_))));
        let result = block_on(store.add_token("nope", TokenInit::new("Orc", 0, 0)));
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }
}
