use std::collections::HashMap;

use serde::Serialize;

use crate::assets::scene_def::{ModelDefinition, SceneDefinition};

/// Load state of one model asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "camelCase")]
pub enum AssetState {
    Loading,
    Ready,
    Failed(String),
}

impl AssetState {
    /// Whether the model should draw its placeholder instead of the asset.
    pub fn needs_placeholder(&self) -> bool {
        !matches!(self, Self::Ready)
    }
}

/// Per-model asset states for a mounted scene, keyed by model id.
///
/// Transitions only happen through host notifications; the tick loop just
/// reads the current state.
#[derive(Debug, Clone, Default)]
pub struct AssetRegistry {
    states: HashMap<String, AssetState>,
    /// Model id → source URL, for requests to the host.
    sources: Vec<(String, String)>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every model in the scene. `primitive:` sources never load.
    pub fn from_scene(scene: &SceneDefinition) -> Self {
        let mut registry = Self::new();
        for model in scene.layers.iter().flat_map(|l| l.models.iter()) {
            registry.register(model);
        }
        registry
    }

    pub fn register(&mut self, model: &ModelDefinition) {
        if model.is_primitive() {
            // Primitives render their placeholder for good.
            self.states.insert(model.id.clone(), AssetState::Failed("primitive".into()));
            return;
        }
        self.states.insert(model.id.clone(), AssetState::Loading);
        self.sources.push((model.id.clone(), model.src.clone()));
    }

    /// Look up a model's state. Unknown ids read as `Loading`.
    pub fn get(&self, model_id: &str) -> &AssetState {
        static LOADING: AssetState = AssetState::Loading;
        self.states.get(model_id).unwrap_or(&LOADING)
    }

    /// Sources the host must fetch, as `(model id, src)` pairs.
    pub fn pending(&self) -> impl Iterator<Item = (&str, &str)> {
        self.sources
            .iter()
            .filter(|(id, _)| matches!(self.states.get(id), Some(AssetState::Loading)))
            .map(|(id, src)| (id.as_str(), src.as_str()))
    }

    /// Returns false when the id is unknown or already settled.
    pub fn mark_ready(&mut self, model_id: &str) -> bool {
        self.settle(model_id, AssetState::Ready)
    }

    pub fn mark_failed(&mut self, model_id: &str, reason: &str) -> bool {
        let settled = self.settle(model_id, AssetState::Failed(reason.to_string()));
        if settled {
            log::warn!("model '{}' failed to load ({}); using placeholder", model_id, reason);
        }
        settled
    }

    fn settle(&mut self, model_id: &str, next: AssetState) -> bool {
        match self.states.get_mut(model_id) {
            Some(state) if *state == AssetState::Loading => {
                *state = next;
                true
            }
            Some(_) => false,
            None => {
                log::debug!("asset notification for unknown model '{}'", model_id);
                false
            }
        }
    }
}
