//! Interaction controller.
//!
//! Owns the live [`Scene`] while editing. Pointer events go through the tool
//! state machine; the resulting effects are applied to the local model first
//! and then queued as [`SyncRequest`]s. Reload replies replace the model
//! wholesale.

use crate::camera::Camera;
use crate::config::{EngineConfig, ReloadPolicy};
use crate::input::PointerEvent;
use crate::notify::{ChangeNotifier, Notices, Subscription};
use crate::scene::{
    Campaign, Cell, FogCell, Scene, SceneId, SceneInit, SceneSummary, Token, TokenId, TokenInit, TokenPatch,
};
use crate::storage::StoreError;
use crate::sync::{Mutation, SyncReply, SyncRequest, SyncTicket};
use crate::tools::{DrawStyle, Effect, InteractionState, Preview, ToolContext, ToolKind, transition};
use std::time::{Duration, Instant};

/// Grid and fog visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    pub show_grid: bool,
    pub show_fog: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            show_grid: true,
            show_fog: true,
        }
    }
}

pub struct InteractionController {
    config: EngineConfig,
    camera: Camera,
    tool: ToolKind,
    state: InteractionState,
    style: DrawStyle,
    view: ViewState,

    campaigns: Vec<Campaign>,
    campaign_id: Option<String>,
    scenes: Vec<SceneSummary>,

    active_scene: Option<SceneId>,
    scene: Option<Scene>,
    selected: Option<TokenId>,

    next_seq: u64,
    last_applied_seq: u64,
    outbox: Vec<SyncRequest>,

    notifier: ChangeNotifier,
    notices: Notices,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl InteractionController {
    pub fn new(config: EngineConfig) -> Self {
        let camera = Camera {
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            ..Camera::default()
        };
        let notices = Notices::new(Duration::from_secs(config.notice_ttl_secs));
        Self {
            config,
            camera,
            tool: ToolKind::default(),
            state: InteractionState::Idle,
            style: DrawStyle::default(),
            view: ViewState::default(),
            campaigns: Vec::new(),
            campaign_id: None,
            scenes: Vec::new(),
            active_scene: None,
            scene: None,
            selected: None,
            next_seq: 0,
            last_applied_seq: 0,
            outbox: Vec::new(),
            notifier: ChangeNotifier::new(),
            notices,
        }
    }

    // --- Accessors ---

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn preview(&self) -> Option<Preview<'_>> {
        self.state.preview()
    }

    pub fn style(&self) -> &DrawStyle {
        &self.style
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn active_scene_id(&self) -> Option<&str> {
        self.active_scene.as_deref()
    }

    pub fn campaigns(&self) -> &[Campaign] {
        &self.campaigns
    }

    pub fn active_campaign_id(&self) -> Option<&str> {
        self.campaign_id.as_deref()
    }

    pub fn scenes(&self) -> &[SceneSummary] {
        &self.scenes
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// The selected token; the inspector is open while this is `Some`.
    pub fn selected_token(&self) -> Option<&Token> {
        let id = self.selected.as_deref()?;
        self.scene.as_ref()?.token(id)
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut Notices {
        &mut self.notices
    }

    pub fn subscribe(&self) -> Subscription {
        self.notifier.subscribe()
    }

    pub fn revision(&self) -> u64 {
        self.notifier.revision()
    }

    /// Drain queued persistence requests.
    pub fn take_requests(&mut self) -> Vec<SyncRequest> {
        std::mem::take(&mut self.outbox)
    }

    pub fn has_pending_requests(&self) -> bool {
        !self.outbox.is_empty()
    }

    // --- View ---

    pub fn set_tool(&mut self, tool: ToolKind) {
        if self.tool == tool {
            return;
        }
        log::debug!("tool: {:?} -> {:?}", self.tool, tool);
        self.tool = tool;
        self.state = InteractionState::Idle;
        self.notifier.notify();
    }

    pub fn set_style(&mut self, style: DrawStyle) {
        self.style = style;
    }

    pub fn toggle_grid(&mut self) {
        self.view.show_grid = !self.view.show_grid;
        self.notifier.notify();
    }

    pub fn toggle_fog(&mut self) {
        self.view.show_fog = !self.view.show_fog;
        self.notifier.notify();
    }

    pub fn zoom_in(&mut self) {
        self.camera.zoom_step(self.config.zoom_step);
        self.notifier.notify();
    }

    pub fn zoom_out(&mut self) {
        self.camera.zoom_step(-self.config.zoom_step);
        self.notifier.notify();
    }

    pub fn reset_view(&mut self) {
        self.camera.reset();
        self.notifier.notify();
    }

    /// Expire old notices. Returns true if anything changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let changed = self.notices.expire(now);
        if changed {
            self.notifier.notify();
        }
        changed
    }

    // --- Pointer input ---

    pub fn handle_event(&mut self, event: &PointerEvent) {
        if let PointerEvent::Wheel { delta_y } = event {
            self.camera.zoom_by_wheel(*delta_y, self.config.wheel_zoom_factor);
            self.notifier.notify();
            return;
        }

        let was_idle = self.state.is_idle();
        let state = std::mem::take(&mut self.state);
        let (next, effects) = {
            let ctx = ToolContext {
                tool: self.tool,
                camera: &self.camera,
                scene: self.scene.as_ref(),
                style: &self.style,
                erase_radius: self.config.erase_radius,
                freehand: self.config.freehand_limits(),
            };
            transition(state, event, &ctx)
        };
        self.state = next;

        let changed = !effects.is_empty() || !(was_idle && self.state.is_idle());
        for effect in effects {
            self.apply_effect(effect);
        }
        if changed {
            self.notifier.notify();
        }
    }

    fn apply_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Select(id) => self.selected = id,
            Effect::SetPan(offset) => self.camera.set_offset(offset),
            Effect::MoveTokenLocal { token_id, cell } => {
                if let Some(token) = self.scene.as_mut().and_then(|s| s.token_mut(&token_id)) {
                    token.x = cell.x;
                    token.y = cell.y;
                }
            }
            Effect::CommitTokenMove { token_id, cell } => self.commit_token_move(token_id, cell),
            Effect::AddDrawing(drawing) => {
                let Some(scene) = self.scene.as_mut() else { return };
                scene.drawings.push(drawing);
                let drawings = scene.drawings.clone();
                self.commit(Mutation::ReplaceDrawings(drawings));
            }
            Effect::EraseDrawing(id) => {
                let Some(scene) = self.scene.as_mut() else { return };
                if scene.remove_drawing(&id).is_none() {
                    return;
                }
                let drawings = scene.drawings.clone();
                self.commit(Mutation::ReplaceDrawings(drawings));
            }
            Effect::RevealCell(cell) => self.reveal_cell(cell),
        }
    }

    fn commit_token_move(&mut self, token_id: TokenId, cell: Cell) {
        let Some(scene) = self.scene.as_mut() else { return };
        let Some(size) = scene.token(&token_id).map(|t| t.size) else {
            return;
        };
        let (x, y) = scene.clamp_token_position(size, cell.x, cell.y);
        if let Some(token) = scene.token_mut(&token_id) {
            token.x = x;
            token.y = y;
        }
        self.commit(Mutation::MoveToken { token_id, x, y });
    }

    fn reveal_cell(&mut self, cell: Cell) {
        let Some(scene) = self.scene.as_mut() else { return };
        if !scene.in_bounds(cell) {
            return;
        }
        let (row, col) = (cell.y as u32, cell.x as u32);
        if !scene.reveal(row, col) {
            return;
        }
        self.commit(Mutation::RevealFog(vec![FogCell { row, col }]));
    }

    /// Queue a write against the active scene, followed by a reload.
    fn commit(&mut self, mutation: Mutation) {
        let Some(ticket) = self.issue_ticket() else {
            log::debug!("dropping {} without an active scene", mutation.describe());
            return;
        };
        self.outbox.push(SyncRequest::Commit { ticket, mutation });
    }

    fn issue_ticket(&mut self) -> Option<SyncTicket> {
        let scene_id = self.active_scene.clone()?;
        self.next_seq += 1;
        Some(SyncTicket {
            scene_id,
            seq: self.next_seq,
        })
    }

    // --- Inspector ---

    /// Set a token's current HP, clamped to `[0, max]`. Tokens without HP are
    /// left unchanged.
    pub fn set_token_hp(&mut self, token_id: &str, current: i32) {
        let Some(token) = self.scene.as_mut().and_then(|s| s.token_mut(token_id)) else {
            return;
        };
        let Some(hp) = token.hp else { return };
        let hp = hp.with_current(current);
        if token.hp == Some(hp) {
            return;
        }
        token.hp = Some(hp);
        self.update_token(token_id, TokenPatch {
            hp: Some(hp),
            ..Default::default()
        });
    }

    pub fn toggle_condition(&mut self, token_id: &str, condition: &str) {
        let Some(token) = self.scene.as_mut().and_then(|s| s.token_mut(token_id)) else {
            return;
        };
        if !token.conditions.remove(condition) {
            token.conditions.insert(condition.to_string());
        }
        let conditions = token.conditions.clone();
        self.update_token(token_id, TokenPatch {
            conditions: Some(conditions),
            ..Default::default()
        });
    }

    pub fn toggle_hidden(&mut self, token_id: &str) {
        let Some(token) = self.scene.as_mut().and_then(|s| s.token_mut(token_id)) else {
            return;
        };
        token.hidden = !token.hidden;
        let hidden = token.hidden;
        self.update_token(token_id, TokenPatch {
            hidden: Some(hidden),
            ..Default::default()
        });
    }

    fn update_token(&mut self, token_id: &str, patch: TokenPatch) {
        self.commit(Mutation::UpdateToken {
            token_id: token_id.to_string(),
            patch,
        });
        self.notifier.notify();
    }

    pub fn remove_token(&mut self, token_id: &str) {
        let Some(scene) = self.scene.as_mut() else { return };
        if scene.remove_token(token_id).is_none() {
            return;
        }
        if self.selected.as_deref() == Some(token_id) {
            self.selected = None;
        }
        self.commit(Mutation::RemoveToken {
            token_id: token_id.to_string(),
        });
        self.notifier.notify();
    }

    pub fn select_token(&mut self, token_id: Option<&str>) {
        self.selected = token_id.map(str::to_string);
        self.notifier.notify();
    }

    /// Add a token to the active scene. The token appears after the reload,
    /// since the store assigns its id.
    pub fn add_token(&mut self, mut init: TokenInit) -> Result<(), StoreError> {
        if init.name.trim().is_empty() {
            return Err(StoreError::Validation("token name must not be empty".to_string()));
        }
        let Some(scene) = self.scene.as_ref() else {
            return Err(StoreError::Validation("no scene is loaded".to_string()));
        };
        init.size = init.size.max(1);
        (init.x, init.y) = scene.clamp_token_position(init.size, init.x, init.y);
        self.commit(Mutation::AddToken(init));
        Ok(())
    }

    // --- Scene management ---

    pub fn refresh_campaigns(&mut self) {
        self.outbox.push(SyncRequest::ListCampaigns);
    }

    pub fn select_campaign(&mut self, campaign_id: &str) {
        self.campaign_id = Some(campaign_id.to_string());
        self.scenes.clear();
        self.outbox.push(SyncRequest::ListScenes {
            campaign_id: campaign_id.to_string(),
        });
        self.notifier.notify();
    }

    /// Switch to a scene. The previous scene is dropped immediately; replies
    /// still in flight for it are ignored when they arrive.
    pub fn select_scene(&mut self, scene_id: &str) {
        log::info!("loading scene {}", scene_id);
        self.active_scene = Some(scene_id.to_string());
        self.scene = None;
        self.selected = None;
        self.state = InteractionState::Idle;
        self.last_applied_seq = 0;
        if let Some(ticket) = self.issue_ticket() {
            self.outbox.push(SyncRequest::Load(ticket));
        }
        self.notifier.notify();
    }

    /// Reload the active scene from the store.
    pub fn reload(&mut self) {
        if let Some(ticket) = self.issue_ticket() {
            self.outbox.push(SyncRequest::Load(ticket));
        }
    }

    /// Request a new scene in the active campaign.
    pub fn create_scene(&mut self, init: SceneInit) -> Result<(), StoreError> {
        init.validate().map_err(StoreError::Validation)?;
        let Some(campaign_id) = self.campaign_id.clone() else {
            return Err(StoreError::Validation("no campaign selected".to_string()));
        };
        self.outbox.push(SyncRequest::CreateScene { campaign_id, init });
        Ok(())
    }

    // --- Replies ---

    pub fn apply_reply(&mut self, reply: SyncReply) {
        match reply {
            SyncReply::Campaigns(Ok(campaigns)) => {
                let first = campaigns.first().map(|c| c.id.clone());
                self.campaigns = campaigns;
                if let (true, Some(first)) = (self.campaign_id.is_none(), first) {
                    self.select_campaign(&first);
                } else {
                    self.notifier.notify();
                }
            }
            SyncReply::Campaigns(Err(e)) => self.report("load campaigns", &e),
            SyncReply::Scenes { campaign_id, result } => {
                if self.campaign_id.as_deref() != Some(campaign_id.as_str()) {
                    return;
                }
                match result {
                    Ok(scenes) => {
                        self.scenes = scenes;
                        self.notifier.notify();
                    }
                    Err(e) => self.report("list scenes", &e),
                }
            }
            SyncReply::Created { campaign_id, result } => match result {
                Ok(scene) => {
                    self.notices.info(format!("Created scene \"{}\"", scene.name));
                    if self.campaign_id.as_deref() == Some(campaign_id.as_str()) {
                        self.scenes.push(scene.summary());
                    }
                    self.select_scene(&scene.id);
                }
                Err(e) => self.report("create scene", &e),
            },
            SyncReply::Scene { ticket, result } => self.apply_scene_reply(ticket, result),
            SyncReply::WriteFailed { ticket, action, error } => {
                if self.active_scene.as_deref() == Some(ticket.scene_id.as_str()) {
                    self.report(action, &error);
                }
            }
        }
    }

    fn apply_scene_reply(&mut self, ticket: SyncTicket, result: Result<Scene, StoreError>) {
        if self.active_scene.as_deref() != Some(ticket.scene_id.as_str()) {
            log::debug!("ignoring reply for inactive scene {}", ticket.scene_id);
            return;
        }
        let scene = match result {
            Ok(scene) => scene,
            Err(e) => {
                self.report("load scene", &e);
                return;
            }
        };
        if self.config.reload_policy == ReloadPolicy::LatestRequestWins && ticket.seq < self.last_applied_seq {
            log::debug!(
                "dropping stale reload of {} (seq {} < {})",
                ticket.scene_id,
                ticket.seq,
                self.last_applied_seq
            );
            return;
        }
        self.last_applied_seq = self.last_applied_seq.max(ticket.seq);
        self.install_scene(scene);
    }

    fn install_scene(&mut self, mut scene: Scene) {
        scene.normalize_fog();
        self.camera.grid_size = scene.grid_size;
        if let Some(summary) = self.scenes.iter_mut().find(|s| s.id == scene.id) {
            *summary = scene.summary();
        }
        if let Some(id) = &self.selected {
            if scene.token(id).is_none() {
                self.selected = None;
            }
        }
        self.scene = Some(scene);
        self.notifier.notify();
    }

    /// Log a persistence failure and raise a notice. The local model is kept.
    fn report(&mut self, action: &str, error: &StoreError) {
        log::warn!("Failed to {}: {}", action, error);
        self.notices.error(format!("Failed to {}: {}", action, error));
        self.notifier.notify();
    }
}
