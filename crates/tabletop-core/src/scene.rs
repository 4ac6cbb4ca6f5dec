//! Scene model: the in-memory representation of one battle map.
//!
//! The field names serialize in camelCase to match the record layout the
//! persistence service stores (`gridSize`, `fogRevealed`, `isPC`, ...).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Identifier of a scene, assigned by the persistence service.
pub type SceneId = String;
/// Identifier of a token, assigned by the persistence service.
pub type TokenId = String;
/// Identifier of a drawing, minted client-side.
pub type DrawingId = String;

/// Standard conditions offered by the token inspector.
pub const CONDITIONS: &[&str] = &[
    "blinded",
    "charmed",
    "deafened",
    "exhaustion",
    "frightened",
    "grappled",
    "incapacitated",
    "invisible",
    "paralyzed",
    "petrified",
    "poisoned",
    "prone",
    "restrained",
    "stunned",
    "unconscious",
];

/// Default pixels per cell at zoom 1.
pub const DEFAULT_GRID_SIZE: f64 = 40.0;
/// Default scene background.
pub const DEFAULT_BACKGROUND_COLOR: &str = "#1f2937";
/// Default token fill.
pub const DEFAULT_TOKEN_COLOR: &str = "#ef4444";

fn default_grid_size() -> f64 {
    DEFAULT_GRID_SIZE
}

fn default_background_color() -> String {
    DEFAULT_BACKGROUND_COLOR.to_string()
}

fn default_token_color() -> String {
    DEFAULT_TOKEN_COLOR.to_string()
}

fn default_token_size() -> u32 {
    1
}

/// Stored tokens always cover at least one cell.
fn token_size_at_least_one<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    u32::deserialize(deserializer).map(|size| size.max(1))
}

/// Grid style of a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridType {
    #[default]
    Square,
    /// No grid lines are drawn; cells still exist for tokens and fog.
    None,
}

/// An integer grid cell (`x` = column, `y` = row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A fog cell addressed the way the persistence service expects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FogCell {
    pub row: u32,
    pub col: u32,
}

/// Fractional cell coordinates used by drawings.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PrecisePoint {
    pub x: f64,
    pub y: f64,
}

impl PrecisePoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in cell units.
    pub fn distance(&self, other: PrecisePoint) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Hit points of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hp {
    pub current: i32,
    pub max: i32,
}

impl Hp {
    pub fn new(current: i32, max: i32) -> Self {
        Self { current, max }
    }

    /// Fraction of max HP remaining, in `[0, 1]`.
    pub fn ratio(&self) -> f64 {
        if self.max <= 0 {
            return 0.0;
        }
        (self.current as f64 / self.max as f64).clamp(0.0, 1.0)
    }

    /// Copy with `current` clamped into `[0, max]`.
    pub fn with_current(&self, current: i32) -> Self {
        Self {
            current: current.clamp(0, self.max.max(0)),
            max: self.max,
        }
    }
}

/// A movable circular marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub id: TokenId,
    pub name: String,
    #[serde(default)]
    pub label: String,
    pub x: i32,
    pub y: i32,
    #[serde(default = "default_token_size", deserialize_with = "token_size_at_least_one")]
    pub size: u32,
    #[serde(default = "default_token_color")]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hp: Option<Hp>,
    #[serde(default)]
    pub conditions: BTreeSet<String>,
    #[serde(default, rename = "isPC")]
    pub is_pc: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub vision: bool,
    #[serde(default)]
    pub darkvision: u32,
    #[serde(default)]
    pub light_radius: u32,
    #[serde(default)]
    pub dim_light_radius: u32,
}

impl Token {
    /// Build a token from creation fields and a service-assigned id.
    pub fn from_init(id: TokenId, init: TokenInit) -> Self {
        Self {
            id,
            name: init.name,
            label: init.label,
            x: init.x,
            y: init.y,
            size: init.size.max(1),
            color: init.color,
            hp: init.hp,
            conditions: init.conditions,
            is_pc: init.is_pc,
            hidden: init.hidden,
            vision: init.vision,
            darkvision: init.darkvision,
            light_radius: init.light_radius,
            dim_light_radius: init.dim_light_radius,
        }
    }

    /// Whether the token's footprint covers `cell`.
    pub fn contains(&self, cell: Cell) -> bool {
        let size = self.size as i32;
        cell.x >= self.x && cell.x < self.x + size && cell.y >= self.y && cell.y < self.y + size
    }

    /// Text drawn on the token: the label, or the first letter of the name.
    pub fn display_label(&self) -> String {
        if !self.label.is_empty() {
            return self.label.clone();
        }
        self.name
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default()
    }

    /// Apply every field present in `patch`.
    pub fn apply_patch(&mut self, patch: &TokenPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(label) = &patch.label {
            self.label = label.clone();
        }
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(size) = patch.size {
            self.size = size.max(1);
        }
        if let Some(color) = &patch.color {
            self.color = color.clone();
        }
        if let Some(hp) = patch.hp {
            self.hp = Some(hp);
        }
        if let Some(conditions) = &patch.conditions {
            self.conditions = conditions.clone();
        }
        if let Some(is_pc) = patch.is_pc {
            self.is_pc = is_pc;
        }
        if let Some(hidden) = patch.hidden {
            self.hidden = hidden;
        }
        if let Some(vision) = patch.vision {
            self.vision = vision;
        }
        if let Some(darkvision) = patch.darkvision {
            self.darkvision = darkvision;
        }
        if let Some(light_radius) = patch.light_radius {
            self.light_radius = light_radius;
        }
        if let Some(dim_light_radius) = patch.dim_light_radius {
            self.dim_light_radius = dim_light_radius;
        }
    }
}

/// Fields for creating a token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInit {
    pub name: String,
    #[serde(default)]
    pub label: String,
    pub x: i32,
    pub y: i32,
    #[serde(default = "default_token_size")]
    pub size: u32,
    #[serde(default = "default_token_color")]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hp: Option<Hp>,
    #[serde(default)]
    pub conditions: BTreeSet<String>,
    #[serde(default, rename = "isPC")]
    pub is_pc: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub vision: bool,
    #[serde(default)]
    pub darkvision: u32,
    #[serde(default)]
    pub light_radius: u32,
    #[serde(default)]
    pub dim_light_radius: u32,
}

impl TokenInit {
    /// A size-1 token with default styling.
    pub fn new(name: impl Into<String>, x: i32, y: i32) -> Self {
        Self {
            name: name.into(),
            label: String::new(),
            x,
            y,
            size: 1,
            color: default_token_color(),
            hp: None,
            conditions: BTreeSet::new(),
            is_pc: false,
            hidden: false,
            vision: false,
            darkvision: 0,
            light_radius: 0,
            dim_light_radius: 0,
        }
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn with_hp(mut self, current: i32, max: i32) -> Self {
        self.hp = Some(Hp::new(current, max));
        self
    }
}

/// Partial token update; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hp: Option<Hp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<BTreeSet<String>>,
    #[serde(default, rename = "isPC", skip_serializing_if = "Option::is_none")]
    pub is_pc: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vision: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub darkvision: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light_radius: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dim_light_radius: Option<u32>,
}

impl TokenPatch {
    pub fn position(x: i32, y: i32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Default::default()
        }
    }
}

/// Kind of a persisted drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawingKind {
    Freehand,
    Rectangle,
    Circle,
}

/// A persisted freehand stroke or shape, in fractional cell coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drawing {
    pub id: DrawingId,
    #[serde(rename = "type")]
    pub kind: DrawingKind,
    pub points: Vec<PrecisePoint>,
    pub color: String,
    pub line_width: f64,
}

impl Drawing {
    /// Create a drawing with a fresh id.
    pub fn new(kind: DrawingKind, points: Vec<PrecisePoint>, color: impl Into<String>, line_width: f64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            points,
            color: color.into(),
            line_width,
        }
    }

    /// Rectangles and circles need exactly two points, freehand at least two.
    pub fn is_persistable(&self) -> bool {
        match self.kind {
            DrawingKind::Rectangle | DrawingKind::Circle => self.points.len() == 2,
            DrawingKind::Freehand => self.points.len() >= 2,
        }
    }

    /// Circle radius in cell units (distance from center to edge point).
    pub fn radius(&self) -> Option<f64> {
        match (self.kind, self.points.as_slice()) {
            (DrawingKind::Circle, [center, edge]) => Some(center.distance(*edge)),
            _ => None,
        }
    }

    /// Smallest distance from `point` to any of this drawing's points.
    pub fn nearest_distance(&self, point: PrecisePoint) -> Option<f64> {
        self.points
            .iter()
            .map(|p| p.distance(point))
            .fold(None, |best, d| match best {
                Some(b) if b <= d => Some(b),
                _ => Some(d),
            })
    }
}

/// Fields for creating a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneInit {
    pub name: String,
    pub width: u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    #[serde(default = "default_grid_size")]
    pub grid_size: f64,
    #[serde(default)]
    pub grid_type: GridType,
    #[serde(default = "default_background_color")]
    pub background_color: String,
}

impl SceneInit {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            background_image: None,
            grid_size: DEFAULT_GRID_SIZE,
            grid_type: GridType::Square,
            background_color: default_background_color(),
        }
    }

    /// Check the fields a scene cannot exist without.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("scene name must not be empty".to_string());
        }
        if self.width == 0 || self.height == 0 {
            return Err(format!("scene size {}x{} must be positive", self.width, self.height));
        }
        if !(self.grid_size > 0.0) {
            return Err(format!("grid size {} must be positive", self.grid_size));
        }
        Ok(())
    }
}

/// Partial scene update; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_type: Option<GridType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drawings: Option<Vec<Drawing>>,
}

impl ScenePatch {
    pub fn drawings(drawings: Vec<Drawing>) -> Self {
        Self {
            drawings: Some(drawings),
            ..Default::default()
        }
    }
}

/// Listing entry for a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSummary {
    pub id: SceneId,
    pub name: String,
    pub width: u32,
    pub height: u32,
}

/// A campaign the current user may create scenes under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    pub name: String,
}

/// The full persisted map state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub id: SceneId,
    #[serde(default)]
    pub campaign_id: String,
    pub name: String,
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_grid_size")]
    pub grid_size: f64,
    #[serde(default)]
    pub grid_type: GridType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    #[serde(default = "default_background_color")]
    pub background_color: String,
    /// `fog_revealed[row][col]`; dimensions are always `(height, width)`.
    #[serde(default)]
    pub fog_revealed: Vec<Vec<bool>>,
    #[serde(default)]
    pub tokens: Vec<Token>,
    #[serde(default)]
    pub drawings: Vec<Drawing>,
}

impl Scene {
    /// Create an empty, fully fogged scene.
    pub fn new(id: SceneId, campaign_id: impl Into<String>, init: SceneInit) -> Self {
        let fog_revealed = vec![vec![false; init.width as usize]; init.height as usize];
        Self {
            id,
            campaign_id: campaign_id.into(),
            name: init.name,
            width: init.width,
            height: init.height,
            grid_size: init.grid_size,
            grid_type: init.grid_type,
            background_image: init.background_image,
            background_color: init.background_color,
            fog_revealed,
            tokens: Vec::new(),
            drawings: Vec::new(),
        }
    }

    /// Pad or truncate the fog grid to `(height, width)`.
    /// Missing cells are hidden.
    pub fn normalize_fog(&mut self) {
        let (width, height) = (self.width as usize, self.height as usize);
        self.fog_revealed.resize_with(height, Vec::new);
        for row in &mut self.fog_revealed {
            row.resize(width, false);
        }
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as u32) < self.width && (cell.y as u32) < self.height
    }

    pub fn is_revealed(&self, row: u32, col: u32) -> bool {
        self.fog_revealed
            .get(row as usize)
            .and_then(|r| r.get(col as usize))
            .copied()
            .unwrap_or(false)
    }

    /// Reveal one cell. Returns true if the cell changed state.
    pub fn reveal(&mut self, row: u32, col: u32) -> bool {
        match self
            .fog_revealed
            .get_mut(row as usize)
            .and_then(|r| r.get_mut(col as usize))
        {
            Some(cell) if !*cell => {
                *cell = true;
                true
            }
            _ => false,
        }
    }

    /// Reveal a batch of cells, returning how many changed.
    pub fn reveal_cells(&mut self, cells: &[FogCell]) -> usize {
        cells.iter().filter(|c| self.reveal(c.row, c.col)).count()
    }

    pub fn token(&self, id: &str) -> Option<&Token> {
        self.tokens.iter().find(|t| t.id == id)
    }

    pub fn token_mut(&mut self, id: &str) -> Option<&mut Token> {
        self.tokens.iter_mut().find(|t| t.id == id)
    }

    /// First token (in list order) whose footprint covers `cell`.
    pub fn token_at(&self, cell: Cell) -> Option<&Token> {
        self.tokens.iter().find(|t| t.contains(cell))
    }

    /// Clamp a position so a token of `size` fits inside the scene.
    pub fn clamp_token_position(&self, size: u32, x: i32, y: i32) -> (i32, i32) {
        let max_x = self.width.saturating_sub(size) as i32;
        let max_y = self.height.saturating_sub(size) as i32;
        (x.clamp(0, max_x), y.clamp(0, max_y))
    }

    pub fn remove_token(&mut self, id: &str) -> Option<Token> {
        let index = self.tokens.iter().position(|t| t.id == id)?;
        Some(self.tokens.remove(index))
    }

    pub fn remove_drawing(&mut self, id: &str) -> Option<Drawing> {
        let index = self.drawings.iter().position(|d| d.id == id)?;
        Some(self.drawings.remove(index))
    }

    /// Apply every field present in `patch`.
    pub fn apply_patch(&mut self, patch: &ScenePatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(image) = &patch.background_image {
            self.background_image = if image.is_empty() { None } else { Some(image.clone()) };
        }
        if let Some(color) = &patch.background_color {
            self.background_color = color.clone();
        }
        if let Some(grid_size) = patch.grid_size {
            if grid_size > 0.0 {
                self.grid_size = grid_size;
            }
        }
        if let Some(grid_type) = patch.grid_type {
            self.grid_type = grid_type;
        }
        if let Some(drawings) = &patch.drawings {
            self.drawings = drawings.iter().filter(|d| d.is_persistable()).cloned().collect();
        }
    }

    pub fn summary(&self) -> SceneSummary {
        SceneSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            width: self.width,
            height: self.height,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a scene and repair its fog grid dimensions.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut scene: Scene = serde_json::from_str(json)?;
        scene.normalize_fog();
        Ok(scene)
    }
}
