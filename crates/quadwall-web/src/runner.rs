use serde::Serialize;

use quadwall_engine::{
    AudioCommand, EngineConfig, MountedScene, RenderSet, SceneBundle, SceneError,
};

use crate::devtools::{self, ModifierControl};
use crate::overrides;

/// What the wall page shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum PageState {
    /// Nothing mounted yet, or the last scene was unmounted.
    Loading,
    LoadFailed { message: String },
    /// The scene does not declare the requested wall.
    WallNotFound { wall: String, available: Vec<u32> },
    Running,
}

/// Drives one mounted scene for the page.
///
/// The wasm exports in `lib.rs` keep a single `WallRunner` in a `thread_local!`
/// because wasm-bindgen cannot export generic structs. Audio commands the
/// engine emits are queued here until the host drains them.
pub struct WallRunner {
    config: EngineConfig,
    state: PageState,
    scene: Option<MountedScene<Vec<AudioCommand>>>,
    frame: Option<RenderSet>,
    audio: Vec<AudioCommand>,
}

impl WallRunner {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            state: PageState::Loading,
            scene: None,
            frame: None,
            audio: Vec::new(),
        }
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == PageState::Running
    }

    /// Mount a scene from fetched JSON for the wall named in the URL.
    ///
    /// Any previously mounted scene is unmounted first so its audio stops.
    pub fn load(
        &mut self,
        program_json: &str,
        scene_json: &str,
        wall: &str,
        modifiers: &str,
    ) -> &PageState {
        self.unmount();

        let parsed = SceneBundle::from_json("program config", program_json, "scene", scene_json);
        let bundle = match parsed {
            Ok(bundle) => bundle,
            Err(err) => {
                log::error!("{}", err);
                self.state = PageState::LoadFailed { message: err.to_string() };
                return &self.state;
            }
        };

        let Ok(wall_id) = wall.trim().parse::<u32>() else {
            log::error!("wall '{}' is not a wall number", wall);
            self.state = PageState::WallNotFound {
                wall: wall.to_string(),
                available: bundle.scene.wall_ids(),
            };
            return &self.state;
        };

        let overrides = overrides::parse(modifiers);
        match MountedScene::mount(
            &bundle.program,
            bundle.scene,
            wall_id,
            overrides,
            self.config.clone(),
            Vec::new(),
        ) {
            Ok(scene) => {
                self.scene = Some(scene);
                self.state = PageState::Running;
            }
            Err(SceneError::WallNotFound { requested, available, .. }) => {
                log::error!("wall {} not found, available: {:?}", requested, available);
                self.state = PageState::WallNotFound {
                    wall: requested.to_string(),
                    available,
                };
            }
            Err(err) => {
                log::error!("{}", err);
                self.state = PageState::LoadFailed { message: err.to_string() };
            }
        }
        &self.state
    }

    /// Advance one frame. Renders nothing unless a scene is running.
    pub fn tick(&mut self, dt: f32) -> bool {
        let Some(scene) = self.scene.as_mut() else {
            self.frame = None;
            return false;
        };
        let frame = scene.tick(dt);
        self.audio.append(scene.audio_sink_mut());
        self.frame = Some(frame);
        true
    }

    pub fn frame(&self) -> Option<&RenderSet> {
        self.frame.as_ref()
    }

    /// Last frame as JSON, `null` when nothing is rendered.
    pub fn frame_json(&self) -> String {
        match &self.frame {
            Some(frame) => frame.to_json().unwrap_or_else(|err| {
                log::error!("frame serialization failed: {}", err);
                "null".to_string()
            }),
            None => "null".to_string(),
        }
    }

    /// Hand over every queued audio command.
    pub fn take_audio_commands(&mut self) -> Vec<AudioCommand> {
        std::mem::take(&mut self.audio)
    }

    /// Flat `x, y, z` vertices of a particle system in the last frame.
    pub fn particle_floats(&self, particle_id: &str) -> Option<&[f32]> {
        self.frame
            .as_ref()?
            .layers
            .iter()
            .flat_map(|layer| layer.particles.iter())
            .find(|p| p.id == particle_id)
            .map(|p| p.geometry.as_floats())
    }

    // ---- Modifiers ----

    /// Current override map in query form.
    pub fn modifiers(&self) -> String {
        self.scene
            .as_ref()
            .map(|s| overrides::format(s.overrides()))
            .unwrap_or_default()
    }

    /// Replace the overrides from a query string.
    pub fn set_modifiers(&mut self, modifiers: &str) {
        if let Some(scene) = self.scene.as_mut() {
            scene.set_overrides(overrides::parse(modifiers));
        }
    }

    /// Set one modifier from the panel. Returns the new query string.
    pub fn update_modifier(&mut self, id: &str, value: &str) -> String {
        let Some(scene) = self.scene.as_mut() else {
            return String::new();
        };
        if scene.scene().modifier(id).is_none() {
            // Kept in the query, but resolution ignores it.
            log::warn!("modifier '{}' is not declared by scene '{}'", id, scene.scene().id);
        }
        let next = devtools::update(scene.overrides(), id, value);
        let query = overrides::format(&next);
        scene.set_overrides(next);
        query
    }

    /// Write every declared default into the overrides. Returns the new query string.
    pub fn reset_modifiers(&mut self) -> String {
        let Some(scene) = self.scene.as_mut() else {
            return String::new();
        };
        let defaults = devtools::reset(&scene.scene().modifiers);
        let query = overrides::format(&defaults);
        scene.set_overrides(defaults);
        query
    }

    pub fn controls(&self) -> Vec<ModifierControl> {
        self.scene
            .as_ref()
            .map(|s| devtools::controls(&s.scene().modifiers, s.overrides()))
            .unwrap_or_default()
    }

    // ---- Playback and host notifications ----

    pub fn set_playing(&mut self, playing: bool) {
        if let Some(scene) = self.scene.as_mut() {
            scene.set_playing(playing);
        }
    }

    pub fn reset_time(&mut self) {
        if let Some(scene) = self.scene.as_mut() {
            scene.reset_time();
        }
    }

    pub fn asset_loaded(&mut self, model_id: &str) -> bool {
        self.scene.as_mut().is_some_and(|s| s.notify_asset_loaded(model_id))
    }

    pub fn asset_failed(&mut self, model_id: &str, reason: &str) -> bool {
        self.scene
            .as_mut()
            .is_some_and(|s| s.notify_asset_failed(model_id, reason))
    }

    pub fn audio_loaded(&mut self, cue_id: &str) -> bool {
        self.scene.as_mut().is_some_and(|s| s.notify_audio_loaded(cue_id))
    }

    /// Sources the host should start fetching.
    pub fn pending_assets(&self) -> Vec<(String, String)> {
        self.scene
            .as_ref()
            .map(|s| {
                s.assets()
                    .pending()
                    .map(|(id, src)| (id.to_string(), src.to_string()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Audio cues to fetch, as `(id, src, loop)`.
    pub fn audio_sources(&self) -> Vec<(String, String, bool)> {
        self.scene
            .as_ref()
            .map(|s| {
                s.audio()
                    .sources()
                    .map(|(id, src, looping)| (id.to_string(), src.to_string(), looping))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Unmount the current scene. Its Stop commands stay queued for the host.
    pub fn unmount(&mut self) {
        if let Some(mut scene) = self.scene.take() {
            scene.unmount();
            self.audio.append(scene.audio_sink_mut());
        }
        self.frame = None;
        self.state = PageState::Loading;
    }
}

impl Default for WallRunner {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
