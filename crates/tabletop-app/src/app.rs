//! Core application state and lifecycle.

use kurbo::Size;
use std::sync::Arc;
use std::time::Instant;
use tabletop_core::{
    DrawStyle, EngineConfig, FileStore, InteractionController, SceneStore, StoreError, Synchronizer,
};
use tabletop_render::{FrameRenderer, RenderContext, RenderScheduler};
use thiserror::Error;

use crate::canvas::{CanvasInput, wheel_event};
use crate::painter::paint_frame;
use crate::remote::HttpStore;
use crate::shortcuts::ShortcutRegistry;
use crate::ui::{UiAction, UiState, render_ui};
use crate::worker::SyncWorker;

/// Environment variable naming the scene server base URL.
pub const SERVER_ENV: &str = "TABLETOP_SERVER";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Storage unavailable: {0}")]
    Store(#[from] StoreError),
    #[error("Window error: {0}")]
    Ui(#[from] eframe::Error),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    pub width: f32,
    pub height: f32,
    /// Scene server; local file storage when `None`.
    pub server_url: Option<String>,
    pub engine: EngineConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Tabletop".to_string(),
            width: 1280.0,
            height: 800.0,
            server_url: None,
            engine: EngineConfig::default(),
        }
    }
}

impl AppConfig {
    /// Defaults, with the server from the environment and the engine
    /// settings from the user config file.
    pub fn from_env() -> Self {
        Self {
            server_url: std::env::var(SERVER_ENV).ok().filter(|url| !url.trim().is_empty()),
            engine: EngineConfig::load_default(),
            ..Self::default()
        }
    }

    /// Open the configured scene store.
    pub fn open_store(&self) -> Result<Arc<dyn SceneStore>, StoreError> {
        match &self.server_url {
            Some(url) => {
                log::info!("Using scene server at {}", url);
                Ok(Arc::new(HttpStore::new(url.clone())))
            }
            None => {
                let store = FileStore::default_location()?;
                log::info!("Using local scenes in {:?}", store.base_path());
                Ok(Arc::new(store))
            }
        }
    }
}

/// Open the store and run the native window until it closes.
pub fn run(config: AppConfig) -> Result<(), AppError> {
    let store = config.open_store()?;
    ShortcutRegistry::log_all();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(config.title.clone())
            .with_inner_size([config.width, config.height]),
        ..Default::default()
    };
    let title = config.title.clone();
    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| Ok(Box::new(App::new(cc, config, store)))),
    )?;
    Ok(())
}

pub struct App {
    controller: InteractionController,
    worker: SyncWorker,
    ui_state: UiState,
    canvas_input: CanvasInput,
    renderer: FrameRenderer,
    scheduler: RenderScheduler,
}

impl App {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig, store: Arc<dyn SceneStore>) -> Self {
        egui_extras::install_image_loaders(&cc.egui_ctx);
        cc.egui_ctx.set_visuals(egui::Visuals::dark());

        let ctx = cc.egui_ctx.clone();
        let worker = SyncWorker::spawn(Synchronizer::new(store), Box::new(move || ctx.request_repaint()));

        let mut controller = InteractionController::new(config.engine);
        controller.refresh_campaigns();
        let scheduler = RenderScheduler::new(controller.subscribe());

        Self {
            controller,
            worker,
            ui_state: UiState::default(),
            canvas_input: CanvasInput::new(),
            renderer: FrameRenderer::new(),
            scheduler,
        }
    }

    fn handle_action(&mut self, action: UiAction) {
        let c = &mut self.controller;
        match action {
            UiAction::SetTool(tool) => c.set_tool(tool),
            UiAction::SetDrawColor(color) => {
                let style = DrawStyle {
                    color,
                    ..c.style().clone()
                };
                c.set_style(style);
            }
            UiAction::ZoomIn => c.zoom_in(),
            UiAction::ZoomOut => c.zoom_out(),
            UiAction::ResetView => c.reset_view(),
            UiAction::ToggleGrid => c.toggle_grid(),
            UiAction::ToggleFog => c.toggle_fog(),
            UiAction::SelectCampaign(id) => c.select_campaign(&id),
            UiAction::SelectScene(id) => c.select_scene(&id),
            UiAction::Reload => c.reload(),
            UiAction::CreateScene(init) => {
                if let Err(e) = c.create_scene(init) {
                    log::warn!("Scene not created: {}", e);
                    c.notices_mut().error(format!("Could not create scene: {}", e));
                }
            }
            UiAction::AddToken(init) => {
                if let Err(e) = c.add_token(init) {
                    log::warn!("Token not added: {}", e);
                    c.notices_mut().error(format!("Could not add token: {}", e));
                }
            }
            UiAction::SelectToken(id) => c.select_token(id.as_deref()),
            UiAction::SetTokenHp { token_id, current } => c.set_token_hp(&token_id, current),
            UiAction::ToggleCondition { token_id, condition } => c.toggle_condition(&token_id, &condition),
            UiAction::ToggleHidden(token_id) => c.toggle_hidden(&token_id),
            UiAction::RemoveToken(token_id) => c.remove_token(&token_id),
            UiAction::DismissNotice(index) => c.notices_mut().dismiss(index),
        }
    }

    /// The battle map fills whatever the side panel leaves.
    fn show_canvas(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().frame(egui::Frame::NONE).show(ctx, |ui| {
            let rect = ui.max_rect();
            let response = ui.allocate_rect(rect, egui::Sense::click_and_drag());
            let over_canvas = response.contains_pointer();

            let (events, scroll) = ctx.input(|i| (i.events.clone(), i.raw_scroll_delta));
            for event in self.canvas_input.translate(&events, rect, over_canvas) {
                self.controller.handle_event(&event);
            }
            if let Some(event) = wheel_event(scroll, over_canvas) {
                self.controller.handle_event(&event);
            }

            let viewport = Size::new(f64::from(rect.width()), f64::from(rect.height()));
            let render_ctx = RenderContext::new(self.controller.scene(), self.controller.camera(), viewport)
                .with_view(self.controller.view())
                .with_preview(self.controller.preview(), self.controller.style())
                .with_selected(self.controller.selected());
            if let Err(e) = self.scheduler.render_if_needed(&mut self.renderer, &render_ctx) {
                log::warn!("Skipping frame: {}", e);
            }

            let painter = ui.painter_at(rect);
            paint_frame(&painter, self.renderer.frame(), rect.min);
        });
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        for reply in self.worker.poll() {
            self.controller.apply_reply(reply);
        }
        let now = Instant::now();
        self.controller.tick(now);

        for action in ShortcutRegistry::collect(ctx) {
            self.handle_action(action);
        }
        if let Some(action) = render_ui(ctx, &mut self.ui_state, &self.controller) {
            self.handle_action(action);
        }
        self.show_canvas(ctx);

        self.worker.submit(self.controller.take_requests());

        if let Some(wait) = self.controller.notices().next_expiry(now) {
            ctx.request_repaint_after(wait);
        }
    }
}
