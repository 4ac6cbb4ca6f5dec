//! Persistence synchronizer.
//!
//! The controller never awaits persistence. It queues [`SyncRequest`]s; a host
//! (background worker, test, ...) runs them through [`Synchronizer::execute`]
//! and feeds the [`SyncReply`]s back. Every committed write is followed by a
//! full reload of the scene.

use crate::scene::{Campaign, Drawing, FogCell, Scene, SceneId, SceneInit, ScenePatch, SceneSummary, TokenId, TokenInit, TokenPatch};
use crate::storage::{SceneStore, StoreError, StoreResult};
use std::sync::Arc;

/// Identifies which scene a request targets and when it was issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTicket {
    pub scene_id: SceneId,
    pub seq: u64,
}

/// A single remote write.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    MoveToken { token_id: TokenId, x: i32, y: i32 },
    AddToken(TokenInit),
    UpdateToken { token_id: TokenId, patch: TokenPatch },
    RemoveToken { token_id: TokenId },
    /// Replace the scene's full drawing list.
    ReplaceDrawings(Vec<Drawing>),
    RevealFog(Vec<FogCell>),
}

impl Mutation {
    /// Short description used in logs and notices.
    pub fn describe(&self) -> &'static str {
        match self {
            Mutation::MoveToken { .. } => "move token",
            Mutation::AddToken(_) => "add token",
            Mutation::UpdateToken { .. } => "update token",
            Mutation::RemoveToken { .. } => "remove token",
            Mutation::ReplaceDrawings(_) => "save drawings",
            Mutation::RevealFog(_) => "reveal fog",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncRequest {
    ListCampaigns,
    ListScenes { campaign_id: String },
    CreateScene { campaign_id: String, init: SceneInit },
    Load(SyncTicket),
    /// Write, then reload the scene.
    Commit { ticket: SyncTicket, mutation: Mutation },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncReply {
    Campaigns(StoreResult<Vec<Campaign>>),
    Scenes {
        campaign_id: String,
        result: StoreResult<Vec<SceneSummary>>,
    },
    Created {
        campaign_id: String,
        result: StoreResult<Scene>,
    },
    /// Result of a load or of the reload following a successful write.
    Scene {
        ticket: SyncTicket,
        result: StoreResult<Scene>,
    },
    /// A write failed; no reload was issued.
    WriteFailed {
        ticket: SyncTicket,
        action: &'static str,
        error: StoreError,
    },
}

/// Runs [`SyncRequest`]s against a [`SceneStore`].
#[derive(Clone)]
pub struct Synchronizer {
    store: Arc<dyn SceneStore>,
}

impl Synchronizer {
    pub fn new(store: Arc<dyn SceneStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn SceneStore> {
        &self.store
    }

    pub async fn execute(&self, request: SyncRequest) -> SyncReply {
        match request {
            SyncRequest::ListCampaigns => SyncReply::Campaigns(self.store.list_campaigns().await),
            SyncRequest::ListScenes { campaign_id } => {
                let result = self.store.list_scenes(&campaign_id).await;
                SyncReply::Scenes { campaign_id, result }
            }
            SyncRequest::CreateScene { campaign_id, init } => {
                let result = self.store.create_scene(&campaign_id, init).await;
                SyncReply::Created { campaign_id, result }
            }
            SyncRequest::Load(ticket) => {
                let result = self.store.get_scene(&ticket.scene_id).await;
                SyncReply::Scene { ticket, result }
            }
            SyncRequest::Commit { ticket, mutation } => {
                let action = mutation.describe();
                if let Err(error) = self.write(&ticket.scene_id, mutation).await {
                    log::warn!("Failed to {} on scene {}: {}", action, ticket.scene_id, error);
                    return SyncReply::WriteFailed { ticket, action, error };
                }
                log::debug!("{} on scene {} (seq {}), reloading", action, ticket.scene_id, ticket.seq);
                let result = self.store.get_scene(&ticket.scene_id).await;
                SyncReply::Scene { ticket, result }
            }
        }
    }

    async fn write(&self, scene_id: &str, mutation: Mutation) -> StoreResult<()> {
        match mutation {
            Mutation::MoveToken { token_id, x, y } => {
                self.store.update_token(&token_id, TokenPatch::position(x, y)).await
            }
            Mutation::AddToken(init) => self.store.add_token(scene_id, init).await.map(|_| ()),
            Mutation::UpdateToken { token_id, patch } => self.store.update_token(&token_id, patch).await,
            Mutation::RemoveToken { token_id } => self.store.remove_token(&token_id).await,
            Mutation::ReplaceDrawings(drawings) => {
                self.store.update_scene(scene_id, ScenePatch::drawings(drawings)).await
            }
            Mutation::RevealFog(cells) => self.store.reveal_fog(scene_id, cells).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Cell;
    use crate::storage::MemoryStore;
    use pollster::block_on;

    fn setup() -> (Synchronizer, Scene) {
        let store = MemoryStore::with_campaigns([Campaign {
            id: "c".into(),
            name: "Campaign".into(),
        }]);
        let scene = block_on(store.create_scene("c", SceneInit::new("Map", 10, 10))).unwrap();
        (Synchronizer::new(Arc::new(store)), scene)
    }

    fn ticket(scene: &Scene, seq: u64) -> SyncTicket {
        SyncTicket {
            scene_id: scene.id.clone(),
            seq,
        }
    }

    #[test]
    fn test_commit_reloads_scene() {
        let (sync, scene) = setup();
        let reply = block_on(sync.execute(SyncRequest::Commit {
            ticket: ticket(&scene, 1),
            mutation: Mutation::AddToken(TokenInit::new("Goblin", 5, 5)),
        }));
        let SyncReply::Scene { ticket: t, result } = reply else {
            panic!("expected reload, got {reply:?}");
        };
        assert_eq!(t.seq, 1);
        let reloaded = result.unwrap();
        assert_eq!(reloaded.tokens.len(), 1);
        assert!(reloaded.token_at(Cell::new(5, 5)).is_some());
    }

    #[test]
    fn test_move_then_reload_yields_position() {
        let (sync, scene) = setup();
        let token = block_on(sync.store().add_token(&scene.id, TokenInit::new("Goblin", 5, 5))).unwrap();
        let reply = block_on(sync.execute(SyncRequest::Commit {
            ticket: ticket(&scene, 2),
            mutation: Mutation::MoveToken {
                token_id: token.id.clone(),
                x: 8,
                y: 1,
            },
        }));
        let SyncReply::Scene { result: Ok(reloaded), .. } = reply else {
            panic!("expected reload");
        };
        let moved = reloaded.token(&token.id).unwrap();
        assert_eq!((moved.x, moved.y), (8, 1));
    }

    #[test]
    fn test_failed_write_skips_reload() {
        let (sync, scene) = setup();
        let reply = block_on(sync.execute(SyncRequest::Commit {
            ticket: ticket(&scene, 3),
            mutation: Mutation::RemoveToken {
                token_id: "ghost".into(),
            },
        }));
        assert!(matches!(
            reply,
            SyncReply::WriteFailed {
                action: "remove token",
                error: StoreError::NotFound(_),
                ..
            }
        ));
    }

    #[test]
    fn test_listing_requests() {
        let (sync, scene) = setup();
        let reply = block_on(sync.execute(SyncRequest::ListCampaigns));
        assert!(matches!(reply, SyncReply::Campaigns(Ok(ref c)) if c.len() == 1));

        let reply = block_on(sync.execute(SyncRequest::ListScenes { campaign_id: "c".into() }));
        let SyncReply::Scenes { result: Ok(scenes), .. } = reply else {
            panic!("expected scenes");
        };
        assert_eq!(scenes, vec![scene.summary()]);
    }
}
