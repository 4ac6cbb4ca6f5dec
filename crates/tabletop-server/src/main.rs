//! Tabletop Scene Server
//!
//! Serves campaigns, scenes, tokens and fog over REST, kept in memory.
//!
//! ## Routes
//!
//! ```text
//! GET    /health
//! GET    /campaigns
//! GET    /campaigns/{id}/scenes      POST (SceneInit) -> 201 Scene
//! GET    /scenes/{id}                PATCH (ScenePatch) -> 204
//! POST   /scenes/{id}/tokens         (TokenInit) -> 201 Token
//! PATCH  /tokens/{id}                (TokenPatch) -> 204
//! DELETE /tokens/{id}                -> 204
//! POST   /scenes/{id}/fog            {"cells": [{"row", "col"}]} -> 204
//! ```
//!
//! Errors are `{"error": "..."}` with 404, 422 or 500.

mod error;
mod routes;

use std::net::SocketAddr;
use std::sync::Arc;
use tabletop_core::{Campaign, MemoryStore, SceneInit, SceneStore, StoreResult, TokenInit};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::routes::SharedStore;

const ADDR_ENV: &str = "TABLETOP_ADDR";
const DEFAULT_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 3030);

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tabletop_server=info,tower_http=info".into()),
        )
        .init();

    let store: SharedStore = Arc::new(MemoryStore::with_campaigns([Campaign {
        id: "demo".to_string(),
        name: "Demo campaign".to_string(),
    }]));
    if let Err(e) = seed(store.as_ref()).await {
        warn!("Failed to seed demo scene: {}", e);
    }

    let app = routes::router(store)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = bind_addr();
    info!("Tabletop scene server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

fn bind_addr() -> SocketAddr {
    match std::env::var(ADDR_ENV) {
        Ok(value) => value.parse().unwrap_or_else(|e| {
            warn!("Ignoring {}={:?}: {}", ADDR_ENV, value, e);
            SocketAddr::from(DEFAULT_ADDR)
        }),
        Err(_) => SocketAddr::from(DEFAULT_ADDR),
    }
}

/// One small scene so a fresh server has something to open.
async fn seed(store: &dyn SceneStore) -> StoreResult<()> {
    let scene = store.create_scene("demo", SceneInit::new("Goblin cave", 20, 15)).await?;
    store
        .add_token(&scene.id, TokenInit::new("Goblin", 5, 5).with_hp(7, 7))
        .await?;
    let mut hero = TokenInit::new("Hero", 2, 2).with_hp(12, 12);
    hero.is_pc = true;
    hero.color = "#3b82f6".to_string();
    store.add_token(&scene.id, hero).await?;
    info!("Seeded demo scene {}", scene.id);
    Ok(())
}
