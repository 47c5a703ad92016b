//! Per-tick output for the drawing capability.
//!
//! A [`RenderSet`] is built fresh every tick and only ever contains visible
//! layers, already in draw order. It serializes to camelCase JSON for the
//! browser host; particle vertices can also be read as flat `f32` slices.

use serde::Serialize;

use crate::api::types::TimelineNotice;
use crate::assets::scene_def::{CameraDefinition, EnvironmentDefinition};
use crate::core::wall::WallDirection;
use crate::systems::audio::CueStatus;
use crate::systems::lighting::ResolvedLight;
use crate::systems::models::ResolvedModel;
use crate::systems::particles::ParticleRender;

/// The wall this set was composed for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WallView {
    pub id: u32,
    pub name: String,
    pub direction: WallDirection,
    pub camera: CameraDefinition,
}

/// One visible layer with all of its resolved children.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerRender {
    pub id: String,
    pub opacity: f32,
    pub render_order: i32,
    pub models: Vec<ResolvedModel>,
    pub lights: Vec<ResolvedLight>,
    pub particles: Vec<ParticleRender>,
    pub audio: Vec<CueStatus>,
}

impl LayerRender {
    /// Number of drawable children (models, lights, particle systems).
    pub fn renderables(&self) -> usize {
        self.models.len() + self.lights.len() + self.particles.len()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderSet {
    pub scene: String,
    pub wall: WallView,
    /// Scene time in seconds.
    pub time: f32,
    pub playing: bool,
    pub environment: EnvironmentDefinition,
    pub layers: Vec<LayerRender>,
    /// Program-wide cues, which no layer can hide.
    pub global_audio: Vec<CueStatus>,
    /// Timeline events that fired this tick.
    pub notices: Vec<TimelineNotice>,
}

impl RenderSet {
    pub fn layer(&self, id: &str) -> Option<&LayerRender> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// Serialize for the JS host.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
