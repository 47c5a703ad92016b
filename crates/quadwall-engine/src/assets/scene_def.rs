use std::collections::{BTreeMap, HashSet};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::wall::WallDirection;
use crate::error::SceneError;
use crate::modifiers::{ModifierKind, ModifierValue};
use crate::systems::particles::ParticleKind;

/// Scene definition, authored as `programs/{program}/scenes/{scene}.json`.
/// Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Loop length in seconds. No duration means the clock runs forever.
    #[serde(default)]
    pub duration: Option<f32>,
    pub environment: EnvironmentDefinition,
    pub walls: Vec<WallDefinition>,
    #[serde(default)]
    pub layers: Vec<LayerDefinition>,
    #[serde(default)]
    pub modifiers: Vec<ModifierDeclaration>,
    #[serde(default)]
    pub timeline: Option<TimelineDefinition>,
}

/// JSON-facing 3-vector. Converted to `glam::Vec3` at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const ONE: Vector3 = Vector3 { x: 1.0, y: 1.0, z: 1.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl From<Vector3> for Vec3 {
    fn from(v: Vector3) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

impl From<Vec3> for Vector3 {
    fn from(v: Vec3) -> Self {
        Vector3::new(v.x, v.y, v.z)
    }
}

/// Linear RGB, each channel 0..1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0 };

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentDefinition {
    pub background_color: Color,
    #[serde(default)]
    pub fog: Option<FogDefinition>,
    #[serde(default)]
    pub skybox: Option<SkyboxDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FogDefinition {
    pub color: Color,
    pub near: f32,
    pub far: f32,
    #[serde(default)]
    pub density: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkyboxDefinition {
    pub src: String,
    #[serde(default)]
    pub rotation: Option<Vector3>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraDefinition {
    pub position: Vector3,
    #[serde(default)]
    pub target: Vector3,
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

/// One physical projection surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WallDefinition {
    pub id: u32,
    pub name: String,
    pub direction: WallDirection,
    pub camera: CameraDefinition,
    /// Explicit layer subset for this wall. Absent means every layer.
    #[serde(default)]
    pub specific_layers: Option<Vec<String>>,
}

impl WallDefinition {
    pub fn shows_layer(&self, layer_id: &str) -> bool {
        match &self.specific_layers {
            Some(ids) => ids.iter().any(|id| id == layer_id),
            None => true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerDefinition {
    pub id: String,
    pub name: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default)]
    pub render_order: i32,
    #[serde(default)]
    pub models: Vec<ModelDefinition>,
    #[serde(default)]
    pub lights: Vec<LightDefinition>,
    #[serde(default)]
    pub particles: Vec<ParticleSystemDefinition>,
    #[serde(default)]
    pub audio: Vec<AudioCueDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDefinition {
    pub id: String,
    /// Asset URL, or `primitive:{name}` for a built-in placeholder shape.
    pub src: String,
    pub position: Vector3,
    #[serde(default)]
    pub rotation: Vector3,
    #[serde(default = "default_scale")]
    pub scale: Vector3,
    #[serde(default)]
    pub animations: Vec<String>,
    #[serde(default)]
    pub cast_shadow: bool,
    #[serde(default)]
    pub receive_shadow: bool,
}

impl ModelDefinition {
    pub const PRIMITIVE_PREFIX: &'static str = "primitive:";

    pub fn is_primitive(&self) -> bool {
        self.src.starts_with(Self::PRIMITIVE_PREFIX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightKind {
    Ambient,
    Directional,
    Point,
    Spot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightDefinition {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: LightKind,
    pub color: Color,
    pub intensity: f32,
    #[serde(default)]
    pub position: Option<Vector3>,
    #[serde(default)]
    pub target: Option<Vector3>,
    #[serde(default)]
    pub distance: Option<f32>,
    #[serde(default)]
    pub angle: Option<f32>,
    #[serde(default)]
    pub penumbra: Option<f32>,
    #[serde(default)]
    pub cast_shadow: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticleSystemDefinition {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ParticleKind,
    pub count: usize,
    pub position: Vector3,
    pub area: Vector3,
    pub speed: f32,
    #[serde(default)]
    pub color: Color,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default = "default_particle_size")]
    pub size: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioCueDefinition {
    pub id: String,
    pub src: String,
    #[serde(default = "default_opacity")]
    pub volume: f32,
    #[serde(rename = "loop", default)]
    pub looping: bool,
    #[serde(default)]
    pub spatial: bool,
    #[serde(default)]
    pub position: Option<Vector3>,
    #[serde(default)]
    pub fade_in: Option<f32>,
    #[serde(default)]
    pub fade_out: Option<f32>,
}

/// A named, typed, overridable scene parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifierDeclaration {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ModifierKind,
    pub default: ModifierValue,
    #[serde(default)]
    pub min: Option<f32>,
    #[serde(default)]
    pub max: Option<f32>,
    #[serde(default)]
    pub step: Option<f32>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    /// Layers this modifier is documented to affect. Informational only.
    #[serde(default)]
    pub affects: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimelineDefinition {
    #[serde(default)]
    pub events: Vec<TimelineEventDefinition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineAction {
    Show,
    Hide,
    Animate,
    Audio,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEventDefinition {
    pub time: f32,
    pub action: TimelineAction,
    pub target: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, ModifierValue>,
}

fn default_true() -> bool {
    true
}

fn default_opacity() -> f32 {
    1.0
}

fn default_scale() -> Vector3 {
    Vector3::ONE
}

fn default_particle_size() -> f32 {
    0.1
}

impl SceneDefinition {
    /// Parse a scene definition from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Look up a wall by id.
    pub fn wall(&self, id: u32) -> Result<&WallDefinition, SceneError> {
        self.walls
            .iter()
            .find(|w| w.id == id)
            .ok_or_else(|| SceneError::WallNotFound {
                scene: self.id.clone(),
                requested: id,
                available: self.wall_ids(),
            })
    }

    pub fn wall_ids(&self) -> Vec<u32> {
        self.walls.iter().map(|w| w.id).collect()
    }

    pub fn modifier(&self, id: &str) -> Option<&ModifierDeclaration> {
        self.modifiers.iter().find(|m| m.id == id)
    }

    /// Authoring checks. Problems are reported, never fatal: the scene still
    /// renders with the documented fallback behavior.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        let mut seen = HashSet::new();
        for m in &self.modifiers {
            if !seen.insert(m.id.as_str()) {
                problems.push(format!("modifier '{}' is declared more than once", m.id));
            }
            if !m.kind.accepts(&m.default) {
                problems.push(format!(
                    "modifier '{}' default {:?} does not match kind {:?}",
                    m.id, m.default, m.kind
                ));
            }
        }

        for layer in &self.layers {
            let show = format!("show_{}", layer.id);
            let hide = format!("hide_{}", layer.id);
            if seen.contains(show.as_str()) && seen.contains(hide.as_str()) {
                problems.push(format!(
                    "layer '{}' declares both '{}' and '{}'; '{}' takes precedence",
                    layer.id, show, hide, hide
                ));
            }
        }

        let mut entity_ids = HashSet::new();
        for layer in &self.layers {
            let ids = layer
                .models
                .iter()
                .map(|m| &m.id)
                .chain(layer.lights.iter().map(|l| &l.id))
                .chain(layer.particles.iter().map(|p| &p.id))
                .chain(layer.audio.iter().map(|a| &a.id));
            for id in ids {
                if !entity_ids.insert(id.as_str()) {
                    problems.push(format!("entity id '{}' is not unique within the scene", id));
                }
            }
        }

        problems
    }
}
