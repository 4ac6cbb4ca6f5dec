//! REST handlers over a [`SceneStore`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use tabletop_core::{
    Campaign, FogCell, Scene, SceneInit, ScenePatch, SceneStore, SceneSummary, Token, TokenInit, TokenPatch,
};
use tracing::info;

use crate::error::ApiResult;

pub type SharedStore = Arc<dyn SceneStore>;

#[derive(Debug, Deserialize)]
pub struct RevealRequest {
    pub cells: Vec<FogCell>,
}

pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/campaigns", get(list_campaigns))
        .route("/campaigns/{id}/scenes", get(list_scenes).post(create_scene))
        .route("/scenes/{id}", get(get_scene).patch(update_scene))
        .route("/scenes/{id}/tokens", post(add_token))
        .route("/scenes/{id}/fog", post(reveal_fog))
        .route("/tokens/{id}", patch(update_token).delete(remove_token))
        .with_state(store)
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn list_campaigns(State(store): State<SharedStore>) -> ApiResult<Json<Vec<Campaign>>> {
    Ok(Json(store.list_campaigns().await?))
}

pub async fn list_scenes(
    State(store): State<SharedStore>,
    Path(campaign_id): Path<String>,
) -> ApiResult<Json<Vec<SceneSummary>>> {
    Ok(Json(store.list_scenes(&campaign_id).await?))
}

pub async fn create_scene(
    State(store): State<SharedStore>,
    Path(campaign_id): Path<String>,
    Json(init): Json<SceneInit>,
) -> ApiResult<(StatusCode, Json<Scene>)> {
    let scene = store.create_scene(&campaign_id, init).await?;
    info!("Created scene {} ({}) in {}", scene.id, scene.name, campaign_id);
    Ok((StatusCode::CREATED, Json(scene)))
}

pub async fn get_scene(State(store): State<SharedStore>, Path(id): Path<String>) -> ApiResult<Json<Scene>> {
    Ok(Json(store.get_scene(&id).await?))
}

pub async fn update_scene(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
    Json(patch): Json<ScenePatch>,
) -> ApiResult<StatusCode> {
    store.update_scene(&id, patch).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_token(
    State(store): State<SharedStore>,
    Path(scene_id): Path<String>,
    Json(init): Json<TokenInit>,
) -> ApiResult<(StatusCode, Json<Token>)> {
    let token = store.add_token(&scene_id, init).await?;
    info!("Added token {} to scene {}", token.name, scene_id);
    Ok((StatusCode::CREATED, Json(token)))
}

pub async fn update_token(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
    Json(patch): Json<TokenPatch>,
) -> ApiResult<StatusCode> {
    store.update_token(&id, patch).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_token(State(store): State<SharedStore>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    store.remove_token(&id).await?;
    info!("Removed token {}", id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reveal_fog(
    State(store): State<SharedStore>,
    Path(scene_id): Path<String>,
    Json(request): Json<RevealRequest>,
) -> ApiResult<StatusCode> {
    store.reveal_fog(&scene_id, request.cells).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;
    use tabletop_core::MemoryStore;

    fn store() -> SharedStore {
        Arc::new(MemoryStore::with_campaigns([Campaign {
            id: "c1".to_string(),
            name: "Test campaign".to_string(),
        }]))
    }

    async fn scene(store: &SharedStore) -> Scene {
        let (status, Json(scene)) = create_scene(
            State(store.clone()),
            Path("c1".to_string()),
            Json(SceneInit::new("Cave", 10, 10)),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        scene
    }

    #[tokio::test]
    async fn test_create_and_list_scenes() {
        let store = store();
        let created = scene(&store).await;

        let Json(scenes) = list_scenes(State(store.clone()), Path("c1".to_string())).await.unwrap();
        assert_eq!(scenes.len(), 1);
        assert_eq!(scenes[0].id, created.id);

        let Json(loaded) = get_scene(State(store), Path(created.id.clone())).await.unwrap();
        assert_eq!(loaded.fog_revealed.len(), 10);
    }

    #[tokio::test]
    async fn test_empty_scene_name_is_unprocessable() {
        let err = create_scene(State(store()), Path("c1".to_string()), Json(SceneInit::new("", 10, 10)))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_missing_scene_is_not_found() {
        let err = get_scene(State(store()), Path("nope".to_string())).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_token_move_then_reload() {
        let store = store();
        let created = scene(&store).await;

        let (_, Json(token)) = add_token(
            State(store.clone()),
            Path(created.id.clone()),
            Json(TokenInit::new("Goblin", 5, 5)),
        )
        .await
        .unwrap();
        let status = update_token(State(store.clone()), Path(token.id.clone()), Json(TokenPatch::position(7, 3)))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let Json(loaded) = get_scene(State(store.clone()), Path(created.id.clone())).await.unwrap();
        let moved = loaded.token(&token.id).unwrap();
        assert_eq!((moved.x, moved.y), (7, 3));

        remove_token(State(store.clone()), Path(token.id.clone())).await.unwrap();
        let Json(loaded) = get_scene(State(store), Path(created.id)).await.unwrap();
        assert!(loaded.tokens.is_empty());
    }

    #[tokio::test]
    async fn test_reveal_fog_sets_only_requested_cells() {
        let store = store();
        let created = scene(&store).await;

        reveal_fog(
            State(store.clone()),
            Path(created.id.clone()),
            Json(RevealRequest {
                cells: vec![FogCell { row: 2, col: 3 }],
            }),
        )
        .await
        .unwrap();

        let Json(loaded) = get_scene(State(store), Path(created.id)).await.unwrap();
        let revealed: usize = loaded.fog_revealed.iter().flatten().filter(|r| **r).count();
        assert_eq!(revealed, 1);
        assert!(loaded.is_revealed(2, 3));
    }

    #[tokio::test]
    async fn test_unknown_token_update_is_not_found() {
        let err = update_token(State(store()), Path("ghost".to_string()), Json(TokenPatch::position(1, 1)))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
