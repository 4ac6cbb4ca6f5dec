//! Tabletop Core Library
//!
//! Platform-agnostic scene model, view transform, tool state machine and
//! persistence plumbing for the tabletop battle map.

pub mod camera;
pub mod config;
pub mod controller;
pub mod input;
pub mod notify;
pub mod scene;
pub mod storage;
pub mod sync;
pub mod tools;

pub use camera::Camera;
pub use config::{ConfigError, EngineConfig, ReloadPolicy};
pub use controller::{InteractionController, ViewState};
pub use input::{MouseButton, PointerEvent};
pub use notify::{ChangeNotifier, Notice, NoticeLevel, Notices, Subscription};
pub use scene::{
    CONDITIONS, Campaign, Cell, Drawing, DrawingKind, FogCell, GridType, Hp, PrecisePoint, Scene, SceneInit,
    ScenePatch, SceneSummary, Token, TokenInit, TokenPatch,
};
pub use storage::{FileStore, MemoryStore, SceneStore, StoreError, StoreResult};
pub use sync::{Mutation, SyncReply, SyncRequest, SyncTicket, Synchronizer};
pub use tools::{DrawStyle, InteractionState, Preview, ToolKind};
