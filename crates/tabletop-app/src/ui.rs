//! UI panels: tool palette, zoom bar, scene and token lists, inspector,
//! creation forms and toasts.

use egui::{Align2, Color32, Context, RichText, Vec2};
use tabletop_core::{
    CONDITIONS, GridType, InteractionController, NoticeLevel, SceneInit, Token, TokenInit, ToolKind,
};
use tabletop_widgets::{
    ColorSwatch, TOKEN_COLORS, TextButton, ToastKind, ToggleButton, ToolButton, hp_bar, list_row, panel_frame,
    section_label, separator, toast_frame, toolbar_frame,
};

/// Actions that can be triggered by the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    /// Change the current tool.
    SetTool(ToolKind),
    /// Change the color of new drawings.
    SetDrawColor(String),
    ZoomIn,
    ZoomOut,
    /// Reset pan and zoom.
    ResetView,
    ToggleGrid,
    ToggleFog,
    SelectCampaign(String),
    SelectScene(String),
    /// Reload the active scene from the store.
    Reload,
    CreateScene(SceneInit),
    AddToken(TokenInit),
    SelectToken(Option<String>),
    SetTokenHp { token_id: String, current: i32 },
    ToggleCondition { token_id: String, condition: String },
    ToggleHidden(String),
    RemoveToken(String),
    DismissNotice(usize),
}

/// Fields of the scene creation form.
#[derive(Debug, Clone)]
pub struct SceneForm {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub grid_size: f64,
    pub show_grid: bool,
    pub background_image: String,
    pub background_color: String,
}

impl Default for SceneForm {
    fn default() -> Self {
        let init = SceneInit::new("", 20, 15);
        Self {
            name: String::new(),
            width: init.width,
            height: init.height,
            grid_size: init.grid_size,
            show_grid: true,
            background_image: String::new(),
            background_color: init.background_color,
        }
    }
}

impl SceneForm {
    /// Submission is disabled until a name is entered.
    pub fn can_submit(&self) -> bool {
        !self.name.trim().is_empty()
    }

    pub fn to_init(&self) -> SceneInit {
        let mut init = SceneInit::new(self.name.trim(), self.width, self.height);
        init.grid_size = self.grid_size;
        init.grid_type = if self.show_grid { GridType::Square } else { GridType::None };
        init.background_color = self.background_color.clone();
        let image = self.background_image.trim();
        if !image.is_empty() {
            init.background_image = Some(image.to_string());
        }
        init
    }
}

/// Fields of the token creation form.
#[derive(Debug, Clone)]
pub struct TokenForm {
    pub name: String,
    pub label: String,
    pub x: i32,
    pub y: i32,
    pub size: u32,
    pub color: String,
    pub hp_max: i32,
    pub is_pc: bool,
    pub hidden: bool,
}

impl Default for TokenForm {
    fn default() -> Self {
        let init = TokenInit::new("", 0, 0);
        Self {
            name: String::new(),
            label: String::new(),
            x: 0,
            y: 0,
            size: 1,
            color: init.color,
            hp_max: 0,
            is_pc: false,
            hidden: false,
        }
    }
}

impl TokenForm {
    /// Submission is disabled until a name is entered.
    pub fn can_submit(&self) -> bool {
        !self.name.trim().is_empty()
    }

    pub fn to_init(&self) -> TokenInit {
        let mut init = TokenInit::new(self.name.trim(), self.x, self.y).with_size(self.size.max(1));
        init.label = self.label.trim().to_string();
        init.color = self.color.clone();
        init.is_pc = self.is_pc;
        init.hidden = self.hidden;
        if self.hp_max > 0 {
            init = init.with_hp(self.hp_max, self.hp_max);
        }
        init
    }
}

/// UI-only state that persists between frames.
#[derive(Debug, Default)]
pub struct UiState {
    /// Open scene creation form.
    pub scene_form: Option<SceneForm>,
    /// Open token creation form.
    pub token_form: Option<TokenForm>,
    /// HP value being edited in the inspector, by token id.
    pub hp_draft: Option<(String, i32)>,
}

/// Render all UI panels and return the first triggered action.
pub fn render_ui(ctx: &Context, ui_state: &mut UiState, controller: &InteractionController) -> Option<UiAction> {
    let side_action = render_side_panel(ctx, ui_state, controller);
    let toolbar_action = render_toolbar(ctx, controller);
    let zoom_action = render_zoom_bar(ctx, controller);
    let scene_form_action = render_scene_form(ctx, ui_state);
    let token_form_action = render_token_form(ctx, ui_state);
    let toast_action = render_toasts(ctx, controller);

    toolbar_action
        .or(zoom_action)
        .or(side_action)
        .or(scene_form_action)
        .or(token_form_action)
        .or(toast_action)
}

/// Tool palette and draw colors, floating on the left.
fn render_toolbar(ctx: &Context, controller: &InteractionController) -> Option<UiAction> {
    let mut action = None;

    egui::Area::new(egui::Id::new("toolbar"))
        .anchor(Align2::LEFT_TOP, Vec2::new(12.0, 12.0))
        .show(ctx, |ui| {
            panel_frame().show(ui, |ui| {
                ui.vertical(|ui| {
                    ui.spacing_mut().item_spacing = Vec2::new(0.0, 2.0);
                    for tool in ToolKind::ALL {
                        if ToolButton::new(tool.label(), tool.label())
                            .shortcut(tool.shortcut())
                            .selected(controller.tool() == tool)
                            .width(96.0)
                            .show(ui)
                        {
                            action = Some(UiAction::SetTool(tool));
                        }
                    }

                    ui.add_space(6.0);
                    section_label(ui, "Draw color");
                    let current = controller.style().color.as_str();
                    for row in TOKEN_COLORS.chunks(4) {
                        ui.horizontal(|ui| {
                            ui.spacing_mut().item_spacing = Vec2::new(4.0, 0.0);
                            for swatch in row {
                                let (clicked, _) = ColorSwatch::new(swatch.color, swatch.name)
                                    .selected(current.eq_ignore_ascii_case(swatch.hex))
                                    .show(ui);
                                if clicked {
                                    action = Some(UiAction::SetDrawColor(swatch.hex.to_string()));
                                }
                            }
                        });
                        ui.add_space(4.0);
                    }
                });
            });
        });

    action
}

/// Zoom controls with live readout, plus grid/fog toggles.
fn render_zoom_bar(ctx: &Context, controller: &InteractionController) -> Option<UiAction> {
    let mut action = None;
    let camera = controller.camera();
    let view = controller.view();

    egui::Area::new(egui::Id::new("zoom_bar"))
        .anchor(Align2::LEFT_BOTTOM, Vec2::new(12.0, -12.0))
        .show(ctx, |ui| {
            toolbar_frame().show(ui, |ui| {
                ui.horizontal(|ui| {
                    if TextButton::new("−", "Zoom out")
                        .enabled(camera.zoom > camera.min_zoom)
                        .show(ui)
                    {
                        action = Some(UiAction::ZoomOut);
                    }
                    if ui
                        .add(egui::Label::new(format!("{}%", camera.zoom_percent())).sense(egui::Sense::click()))
                        .on_hover_text("Reset view")
                        .clicked()
                    {
                        action = Some(UiAction::ResetView);
                    }
                    if TextButton::new("+", "Zoom in")
                        .enabled(camera.zoom < camera.max_zoom)
                        .show(ui)
                    {
                        action = Some(UiAction::ZoomIn);
                    }
                    ui.add_space(8.0);
                    if ToggleButton::new("Grid", view.show_grid).min_width(48.0).show(ui) {
                        action = Some(UiAction::ToggleGrid);
                    }
                    if ToggleButton::new("Fog", view.show_fog).min_width(48.0).show(ui) {
                        action = Some(UiAction::ToggleFog);
                    }
                });
            });
        });

    action
}

/// Campaign picker, scene list, token list and inspector.
fn render_side_panel(ctx: &Context, ui_state: &mut UiState, controller: &InteractionController) -> Option<UiAction> {
    let mut action = None;

    egui::SidePanel::right("scene_panel")
        .resizable(false)
        .default_width(260.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                section_label(ui, "CAMPAIGN");
                let active_campaign = controller.active_campaign_id();
                let selected_name = controller
                    .campaigns()
                    .iter()
                    .find(|c| Some(c.id.as_str()) == active_campaign)
                    .map(|c| c.name.as_str())
                    .unwrap_or("None");
                egui::ComboBox::from_id_salt("campaign")
                    .selected_text(selected_name)
                    .width(ui.available_width())
                    .show_ui(ui, |ui| {
                        for campaign in controller.campaigns() {
                            let is_active = Some(campaign.id.as_str()) == active_campaign;
                            if ui.selectable_label(is_active, &campaign.name).clicked() && !is_active {
                                action = Some(UiAction::SelectCampaign(campaign.id.clone()));
                            }
                        }
                    });

                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    section_label(ui, "SCENES");
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui
                            .add_enabled(active_campaign.is_some(), egui::Button::new("New").small())
                            .clicked()
                        {
                            ui_state.scene_form = Some(SceneForm::default());
                        }
                        if ui
                            .add_enabled(controller.active_scene_id().is_some(), egui::Button::new("Reload").small())
                            .clicked()
                        {
                            action = Some(UiAction::Reload);
                        }
                    });
                });
                if controller.scenes().is_empty() {
                    ui.label(RichText::new("No scenes yet").italics().weak());
                }
                for summary in controller.scenes() {
                    let active = controller.active_scene_id() == Some(summary.id.as_str());
                    let detail = format!("{}×{}", summary.width, summary.height);
                    if list_row(ui, &summary.name, &detail, active) && !active {
                        action = Some(UiAction::SelectScene(summary.id.clone()));
                    }
                }

                separator(ui);

                let Some(scene) = controller.scene() else {
                    if controller.active_scene_id().is_some() {
                        ui.label(RichText::new("Loading scene…").weak());
                    }
                    return;
                };

                ui.horizontal(|ui| {
                    section_label(ui, "TOKENS");
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.add(egui::Button::new("Add").small()).clicked() {
                            ui_state.token_form = Some(TokenForm::default());
                        }
                    });
                });
                for token in &scene.tokens {
                    let selected = controller.selected() == Some(token.id.as_str());
                    let detail = match token.hp {
                        Some(hp) => format!("{}/{}", hp.current, hp.max),
                        None => String::new(),
                    };
                    let name = if token.hidden {
                        format!("{} (hidden)", token.name)
                    } else {
                        token.name.clone()
                    };
                    if list_row(ui, &name, &detail, selected) {
                        let next = if selected { None } else { Some(token.id.clone()) };
                        action = Some(UiAction::SelectToken(next));
                    }
                }

                if let Some(token) = controller.selected_token() {
                    separator(ui);
                    if let Some(inspector_action) = render_inspector(ui, ui_state, token) {
                        action = Some(inspector_action);
                    }
                }
            });
        });

    action
}

/// HP editor, condition toggles, hidden toggle and delete for one token.
fn render_inspector(ui: &mut egui::Ui, ui_state: &mut UiState, token: &Token) -> Option<UiAction> {
    let mut action = None;

    ui.heading(&token.name);
    if token.is_pc {
        ui.label(RichText::new("Player character").small().weak());
    }
    ui.label(RichText::new(format!("Cell ({}, {}), size {}", token.x, token.y, token.size)).small());

    if let Some(hp) = token.hp {
        ui.add_space(6.0);
        section_label(ui, "HIT POINTS");
        hp_bar(ui, hp.ratio() as f32);

        let mut value = match &ui_state.hp_draft {
            Some((id, value)) if *id == token.id => *value,
            _ => hp.current,
        };
        ui.horizontal(|ui| {
            if ui.button("−1").clicked() {
                action = Some(UiAction::SetTokenHp {
                    token_id: token.id.clone(),
                    current: hp.current - 1,
                });
            }
            let response = ui.add(egui::DragValue::new(&mut value).range(0..=hp.max.max(0)));
            if response.changed() {
                ui_state.hp_draft = Some((token.id.clone(), value));
            }
            if (response.drag_stopped() || response.lost_focus()) && value != hp.current {
                ui_state.hp_draft = None;
                action = Some(UiAction::SetTokenHp {
                    token_id: token.id.clone(),
                    current: value,
                });
            }
            ui.label(format!("/ {}", hp.max));
            if ui.button("+1").clicked() {
                action = Some(UiAction::SetTokenHp {
                    token_id: token.id.clone(),
                    current: hp.current + 1,
                });
            }
        });
    }

    ui.add_space(6.0);
    section_label(ui, "CONDITIONS");
    ui.horizontal_wrapped(|ui| {
        for condition in CONDITIONS {
            let active = token.conditions.contains(*condition);
            if ToggleButton::new(condition, active).show(ui) {
                action = Some(UiAction::ToggleCondition {
                    token_id: token.id.clone(),
                    condition: condition.to_string(),
                });
            }
        }
    });

    ui.add_space(6.0);
    ui.horizontal(|ui| {
        let label = if token.hidden { "Show token" } else { "Hide token" };
        if ui.button(label).clicked() {
            action = Some(UiAction::ToggleHidden(token.id.clone()));
        }
        if ui
            .button(RichText::new("Delete").color(tabletop_widgets::theme::DANGER))
            .clicked()
        {
            action = Some(UiAction::RemoveToken(token.id.clone()));
        }
    });

    action
}

fn render_scene_form(ctx: &Context, ui_state: &mut UiState) -> Option<UiAction> {
    let form = ui_state.scene_form.as_mut()?;
    let mut action = None;
    let mut close = false;

    egui::Window::new("New scene")
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
        .show(ctx, |ui| {
            egui::Grid::new("scene_form").num_columns(2).spacing([12.0, 6.0]).show(ui, |ui| {
                ui.label("Name");
                ui.text_edit_singleline(&mut form.name);
                ui.end_row();

                ui.label("Width (cells)");
                ui.add(egui::DragValue::new(&mut form.width).range(1..=200));
                ui.end_row();

                ui.label("Height (cells)");
                ui.add(egui::DragValue::new(&mut form.height).range(1..=200));
                ui.end_row();

                ui.label("Grid size (px)");
                ui.add(egui::DragValue::new(&mut form.grid_size).range(10.0..=200.0));
                ui.end_row();

                ui.label("Show grid");
                ui.checkbox(&mut form.show_grid, "");
                ui.end_row();

                ui.label("Background image");
                ui.text_edit_singleline(&mut form.background_image);
                ui.end_row();

                ui.label("Background color");
                ui.text_edit_singleline(&mut form.background_color);
                ui.end_row();
            });

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.add_enabled(form.can_submit(), egui::Button::new("Create")).clicked() {
                    action = Some(UiAction::CreateScene(form.to_init()));
                    close = true;
                }
                if ui.button("Cancel").clicked() {
                    close = true;
                }
            });
        });

    if close {
        ui_state.scene_form = None;
    }
    action
}

fn render_token_form(ctx: &Context, ui_state: &mut UiState) -> Option<UiAction> {
    let form = ui_state.token_form.as_mut()?;
    let mut action = None;
    let mut close = false;

    egui::Window::new("Add token")
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
        .show(ctx, |ui| {
            egui::Grid::new("token_form").num_columns(2).spacing([12.0, 6.0]).show(ui, |ui| {
                ui.label("Name");
                ui.text_edit_singleline(&mut form.name);
                ui.end_row();

                ui.label("Label");
                ui.text_edit_singleline(&mut form.label);
                ui.end_row();

                ui.label("Position");
                ui.horizontal(|ui| {
                    ui.add(egui::DragValue::new(&mut form.x).prefix("x "));
                    ui.add(egui::DragValue::new(&mut form.y).prefix("y "));
                });
                ui.end_row();

                ui.label("Size (cells)");
                ui.add(egui::DragValue::new(&mut form.size).range(1..=10));
                ui.end_row();

                ui.label("Max HP");
                ui.add(egui::DragValue::new(&mut form.hp_max).range(0..=9999));
                ui.end_row();

                ui.label("Color");
                ui.horizontal(|ui| {
                    ui.spacing_mut().item_spacing = Vec2::new(4.0, 0.0);
                    for swatch in TOKEN_COLORS {
                        let (clicked, _) = ColorSwatch::new(swatch.color, swatch.name)
                            .selected(form.color.eq_ignore_ascii_case(swatch.hex))
                            .show(ui);
                        if clicked {
                            form.color = swatch.hex.to_string();
                        }
                    }
                });
                ui.end_row();

                ui.label("Player character");
                ui.checkbox(&mut form.is_pc, "");
                ui.end_row();

                ui.label("Hidden");
                ui.checkbox(&mut form.hidden, "");
                ui.end_row();
            });

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.add_enabled(form.can_submit(), egui::Button::new("Add")).clicked() {
                    action = Some(UiAction::AddToken(form.to_init()));
                    close = true;
                }
                if ui.button("Cancel").clicked() {
                    close = true;
                }
            });
        });

    if close {
        ui_state.token_form = None;
    }
    action
}

/// Transient notices, bottom right. Click to dismiss.
fn render_toasts(ctx: &Context, controller: &InteractionController) -> Option<UiAction> {
    let notices = controller.notices();
    if notices.is_empty() {
        return None;
    }
    let mut action = None;

    egui::Area::new(egui::Id::new("toasts"))
        .anchor(Align2::RIGHT_BOTTOM, Vec2::new(-280.0, -12.0))
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            for (index, notice) in notices.iter().enumerate() {
                let kind = match notice.level {
                    NoticeLevel::Info => ToastKind::Info,
                    NoticeLevel::Error => ToastKind::Error,
                };
                let response = toast_frame(kind)
                    .show(ui, |ui| {
                        ui.label(RichText::new(&notice.message).color(Color32::WHITE));
                    })
                    .response
                    .interact(egui::Sense::click());
                if response.clicked() {
                    action = Some(UiAction::DismissNotice(index));
                }
                ui.add_space(4.0);
            }
        });

    action
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_form_requires_name() {
        let mut form = SceneForm::default();
        assert!(!form.can_submit());
        form.name = "   ".to_string();
        assert!(!form.can_submit());
        form.name = "Crypt".to_string();
        assert!(form.can_submit());
    }

    #[test]
    fn test_scene_form_to_init() {
        let form = SceneForm {
            name: " Crypt ".to_string(),
            show_grid: false,
            background_image: "https://maps.example/crypt.png".to_string(),
            ..SceneForm::default()
        };
        let init = form.to_init();
        assert_eq!(init.name, "Crypt");
        assert_eq!(init.grid_type, GridType::None);
        assert_eq!(init.background_image.as_deref(), Some("https://maps.example/crypt.png"));
        assert!(init.validate().is_ok());
    }

    #[test]
    fn test_token_form_to_init() {
        let mut form = TokenForm::default();
        assert!(!form.can_submit());
        form.name = "Goblin".to_string();
        form.x = 5;
        form.y = 5;
        form.hp_max = 7;
        let init = form.to_init();
        assert_eq!((init.x, init.y, init.size), (5, 5, 1));
        assert_eq!(init.hp.map(|hp| (hp.current, hp.max)), Some((7, 7)));

        form.hp_max = 0;
        assert!(form.to_init().hp.is_none());
    }
}
