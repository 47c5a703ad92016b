use serde::{Deserialize, Serialize};

use super::scene_def::AudioCueDefinition;
use crate::error::SceneError;

/// Program configuration, authored as `programs/{program}/config.json`.
/// A program is an ordered playlist of scenes plus audio shared by all of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub scenes: Vec<SceneSummary>,
    /// Audio cues that play independently of any layer.
    #[serde(default)]
    pub global_audio: Vec<AudioCueDefinition>,
    #[serde(default)]
    pub preload_assets: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub duration: Option<f32>,
}

impl ProgramConfig {
    /// Parse a program configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn scene(&self, scene_id: &str) -> Result<&SceneSummary, SceneError> {
        self.scenes
            .iter()
            .find(|s| s.id == scene_id)
            .ok_or_else(|| SceneError::SceneNotInProgram {
                program: self.id.clone(),
                scene: scene_id.to_string(),
            })
    }
}
