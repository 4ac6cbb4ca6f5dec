//! Tabletop Application
//!
//! The native shell: window, UI panels, pointer input, painting of the
//! battle map and the background persistence worker.

mod app;
mod canvas;
mod painter;
mod remote;
mod shortcuts;
mod ui;
mod worker;

pub use app::{App, AppConfig, AppError, SERVER_ENV, run};
pub use canvas::{CanvasInput, wheel_event};
pub use painter::paint_frame;
pub use remote::HttpStore;
pub use shortcuts::{Shortcut, ShortcutRegistry};
pub use ui::{SceneForm, TokenForm, UiAction, UiState, render_ui};
pub use worker::SyncWorker;
