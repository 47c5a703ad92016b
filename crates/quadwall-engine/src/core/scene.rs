use std::collections::HashSet;

use crate::api::config::EngineConfig;
use crate::assets::program::ProgramConfig;
use crate::assets::registry::{AssetRegistry, AssetState};
use crate::assets::scene_def::{LayerDefinition, SceneDefinition, WallDefinition};
use crate::components::layer::compose_layers;
use crate::core::time::TimelineDriver;
use crate::error::SceneError;
use crate::modifiers::{Bindings, ModifierState, RuntimeModifierOverrides};
use crate::renderer::render_set::{LayerRender, RenderSet, WallView};
use crate::renderer::traits::{AudioSink, RenderSink};
use crate::systems::audio::AudioDirector;
use crate::systems::lighting::LightRuntime;
use crate::systems::models::ModelRuntime;
use crate::systems::particles::ParticleSystem;
use crate::systems::rng::Rng;

/// Runtime children of one layer, created at mount.
struct LayerRuntime {
    models: Vec<ModelRuntime>,
    lights: Vec<LightRuntime>,
    particles: Vec<ParticleSystem>,
}

impl LayerRuntime {
    fn new(layer: &LayerDefinition, scene: &SceneDefinition, config: &EngineConfig) -> Self {
        let decls = &scene.modifiers;
        Self {
            models: layer
                .models
                .iter()
                .map(|m| ModelRuntime::new(m.clone(), Bindings::build(&m.id, decls)))
                .collect(),
            lights: layer
                .lights
                .iter()
                .map(|l| {
                    LightRuntime::new(
                        l.clone(),
                        Bindings::build(&l.id, decls),
                        Rng::for_stream(config.seed, &l.id),
                    )
                })
                .collect(),
            particles: layer
                .particles
                .iter()
                .map(|p| {
                    ParticleSystem::new(
                        p.clone(),
                        Bindings::build(&p.id, decls),
                        config.shooting_stars,
                        Rng::for_stream(config.seed, &p.id),
                    )
                })
                .collect(),
        }
    }
}

/// One scene mounted on one wall.
///
/// Owns every piece of cross-tick state: particle buffers, model spin, asset
/// and audio flags, and the scene clock. Dropping a mounted scene releases
/// its audio through the sink, so every exit path stops playback.
pub struct MountedScene<A: AudioSink> {
    scene: SceneDefinition,
    wall: WallDefinition,
    config: EngineConfig,
    overrides: RuntimeModifierOverrides,
    state: ModifierState,
    layers: Vec<LayerRuntime>,
    assets: AssetRegistry,
    audio: AudioDirector,
    audio_sink: A,
    timeline: TimelineDriver,
    playing: bool,
    mounted: bool,
}

impl<A: AudioSink> MountedScene<A> {
    /// Mount `scene` for `wall_id`. Fails only when the wall is not declared.
    pub fn mount(
        program: &ProgramConfig,
        scene: SceneDefinition,
        wall_id: u32,
        overrides: RuntimeModifierOverrides,
        config: EngineConfig,
        audio_sink: A,
    ) -> Result<Self, SceneError> {
        let wall = scene.wall(wall_id)?.clone();
        let state = ModifierState::resolve(&scene.modifiers, &overrides);
        let layers = scene
            .layers
            .iter()
            .map(|layer| LayerRuntime::new(layer, &scene, &config))
            .collect();
        let assets = AssetRegistry::from_scene(&scene);
        let audio = AudioDirector::new(&program.global_audio, &scene.layers, &scene.modifiers);
        let timeline =
            TimelineDriver::new(scene.timeline.as_ref(), scene.duration, config.event_tolerance);
        let playing = config.playing;

        log::info!(
            "mounted '{}/{}' on wall {} ({}), {} layer(s), {} modifier(s)",
            program.id,
            scene.id,
            wall.id,
            wall.direction.as_str(),
            scene.layers.len(),
            state.len()
        );

        Ok(Self {
            scene,
            wall,
            config,
            overrides,
            state,
            layers,
            assets,
            audio,
            audio_sink,
            timeline,
            playing,
            mounted: true,
        })
    }

    pub fn scene(&self) -> &SceneDefinition {
        &self.scene
    }

    pub fn wall(&self) -> &WallDefinition {
        &self.wall
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn modifiers(&self) -> &ModifierState {
        &self.state
    }

    pub fn overrides(&self) -> &RuntimeModifierOverrides {
        &self.overrides
    }

    pub fn assets(&self) -> &AssetRegistry {
        &self.assets
    }

    pub fn audio(&self) -> &AudioDirector {
        &self.audio
    }

    pub fn audio_sink(&self) -> &A {
        &self.audio_sink
    }

    pub fn audio_sink_mut(&mut self) -> &mut A {
        &mut self.audio_sink
    }

    pub fn time(&self) -> f32 {
        self.timeline.time()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Replace the override map wholesale and re-resolve the modifier state.
    pub fn set_overrides(&mut self, overrides: RuntimeModifierOverrides) {
        self.state = ModifierState::resolve(&self.scene.modifiers, &overrides);
        self.overrides = overrides;
        log::debug!("overrides replaced ({} key(s))", self.overrides.len());
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    /// Restart the scene clock.
    pub fn reset_time(&mut self) {
        self.timeline.reset();
    }

    pub fn notify_asset_loaded(&mut self, model_id: &str) -> bool {
        self.assets.mark_ready(model_id)
    }

    pub fn notify_asset_failed(&mut self, model_id: &str, reason: &str) -> bool {
        self.assets.mark_failed(model_id, reason)
    }

    pub fn notify_audio_loaded(&mut self, cue_id: &str) -> bool {
        self.audio.mark_loaded(cue_id)
    }

    /// Advance one frame and compose this wall's render set.
    ///
    /// The modifier state is fixed for the whole tick. Hidden layers, and
    /// layers this wall does not show, are skipped entirely: their particles
    /// do not advance and their audio is paused.
    pub fn tick(&mut self, dt: f32) -> RenderSet {
        let notices = self.timeline.tick(dt, self.playing && self.mounted);
        let time = self.timeline.time();
        let wall = &self.wall;

        let composed: Vec<_> = if self.mounted {
            compose_layers(&self.scene.layers, &self.state)
                .into_iter()
                .filter(|l| wall.shows_layer(&l.id))
                .collect()
        } else {
            Vec::new()
        };

        let mut layers = Vec::with_capacity(composed.len());
        for composed_layer in &composed {
            let runtime = &mut self.layers[composed_layer.index];
            let opacity = composed_layer.opacity;

            let models = runtime
                .models
                .iter_mut()
                .map(|m| {
                    let asset: &AssetState = self.assets.get(&m.def.id);
                    m.resolve(wall.direction, &self.state, asset, time, dt)
                })
                .collect();
            let lights = runtime
                .lights
                .iter_mut()
                .map(|l| l.tick(&self.state, opacity, time))
                .collect();
            let particles = runtime
                .particles
                .iter_mut()
                .map(|p| p.tick(&self.state, opacity, time, dt, self.config.trail))
                .collect();

            layers.push(LayerRender {
                id: composed_layer.id.clone(),
                opacity,
                render_order: composed_layer.render_order,
                models,
                lights,
                particles,
                audio: self.audio.layer_statuses(&composed_layer.id),
            });
        }

        let audible: HashSet<&str> = composed.iter().map(|l| l.id.as_str()).collect();
        for command in self.audio.direct(&self.state, self.playing, |id| audible.contains(id)) {
            self.audio_sink.apply(command);
        }

        RenderSet {
            scene: self.scene.id.clone(),
            wall: WallView {
                id: wall.id,
                name: wall.name.clone(),
                direction: wall.direction,
                camera: wall.camera,
            },
            time,
            playing: self.playing,
            environment: self.scene.environment.clone(),
            layers,
            global_audio: self.audio.global_statuses(),
            notices,
        }
    }

    /// Tick and hand the frame to the drawing capability.
    pub fn present<R: RenderSink>(&mut self, dt: f32, sink: &mut R) -> RenderSet {
        let frame = self.tick(dt);
        sink.draw(&frame);
        frame
    }

    /// Stop every audio cue and drop all simulation state. Safe to call more
    /// than once; later ticks render nothing.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        for command in self.audio.release() {
            self.audio_sink.apply(command);
        }
        self.layers.clear();
        log::info!("unmounted '{}' from wall {}", self.scene.id, self.wall.id);
    }

    /// Unmount and let the drawing capability release what it retained.
    /// `clear` runs only on the call that actually unmounts.
    pub fn unmount_with<R: RenderSink>(&mut self, sink: &mut R) {
        if !self.mounted {
            return;
        }
        self.unmount();
        sink.clear();
    }
}

impl<A: AudioSink> Drop for MountedScene<A> {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::AudioCommand;
    use crate::assets::scene_def::TimelineAction;
    use crate::fixtures::{FOREST, PROGRAM};
    use crate::systems::particles::ParticleGeometry;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn overrides(s: &[(&str, &str)]) -> RuntimeModifierOverrides {
        s.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn mount(wall: u32, o: &[(&str, &str)]) -> MountedScene<Vec<AudioCommand>> {
        let program = ProgramConfig::from_json(PROGRAM).unwrap();
        let scene = SceneDefinition::from_json(FOREST).unwrap();
        let config = EngineConfig::default();
        MountedScene::mount(&program, scene, wall, overrides(o), config, Vec::new()).unwrap()
    }

    /// Shares its queue so commands sent during drop stay observable.
    #[derive(Clone, Default)]
    struct SharedQueue(Rc<RefCell<Vec<AudioCommand>>>);

    impl AudioSink for SharedQueue {
        fn apply(&mut self, command: AudioCommand) {
            self.0.borrow_mut().push(command);
        }
    }

    #[derive(Default)]
    struct CountingRenderer {
        frames: usize,
        clears: usize,
    }

    impl RenderSink for CountingRenderer {
        fn draw(&mut self, _frame: &RenderSet) {
            self.frames += 1;
        }

        fn clear(&mut self) {
            self.clears += 1;
        }
    }

    #[test]
    fn missing_wall_lists_valid_ids() {
        let program = ProgramConfig::from_json(PROGRAM).unwrap();
        let scene = SceneDefinition::from_json(FOREST).unwrap();
        let config = EngineConfig::default();
        let result = MountedScene::mount(&program, scene, 7, overrides(&[]), config, Vec::new());
        match result {
            Err(SceneError::WallNotFound { requested, available, .. }) => {
                assert_eq!(requested, 7);
                assert_eq!(available, vec![1, 2]);
            }
            _ => panic!("expected WallNotFound"),
        }
    }

    #[test]
    fn layers_come_out_in_render_order() {
        let mut mounted = mount(1, &[]);
        let frame = mounted.tick(0.016);
        let ids: Vec<_> = frame.layers.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["sky", "forest"]);
        assert_eq!(frame.wall.direction, crate::core::wall::WallDirection::North);
    }

    #[test]
    fn hidden_forest_with_reduced_snow() {
        let mut mounted = mount(1, &[("show_forest", "false"), ("snow_count", "10")]);
        assert_eq!(mounted.modifiers().get("show_forest").unwrap().is_truthy(), false);
        assert_eq!(mounted.modifiers().get("snow_count").unwrap().as_number(), Some(10.0));

        let frame = mounted.tick(0.016);
        assert!(frame.layer("forest").is_none());
        assert_eq!(frame.layers.len(), 1);
        // Only the sun remains drawable.
        let drawn: usize = frame.layers.iter().map(|l| l.renderables()).sum();
        assert_eq!(drawn, 1);

        // Showing the layer again: only 10 snowflakes, falling, inside the box.
        mounted.set_overrides(overrides(&[("snow_count", "10")]));
        for _ in 0..120 {
            mounted.tick(1.0 / 60.0);
        }
        let frame = mounted.tick(1.0 / 60.0);
        let snow = &frame.layer("forest").unwrap().particles[0];
        assert_eq!(snow.active, 10);
        let ParticleGeometry::Points(points) = &snow.geometry else {
            panic!("snow renders as points");
        };
        assert_eq!(points.len(), 10);
        for p in points {
            assert!(p.x.abs() <= 10.0 && p.y >= 0.0 && p.y <= 10.0 && p.z.abs() <= 10.0);
        }
    }

    #[test]
    fn hidden_layer_does_not_advance_its_particles() {
        let mut mounted = mount(1, &[("show_forest", "false")]);
        let before = mounted.layers[0].particles[0].field().positions().to_vec();
        for _ in 0..30 {
            mounted.tick(0.05);
        }
        assert_eq!(mounted.layers[0].particles[0].field().positions(), &before[..]);
    }

    #[test]
    fn wall_specific_layers_and_transform() {
        let mut south = mount(2, &[]);
        let frame = south.tick(0.016);
        let ids: Vec<_> = frame.layers.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["sky"]);

        let mut north = mount(1, &[]);
        let frame = north.tick(0.016);
        let tree = &frame.layer("forest").unwrap().models[0];
        assert_eq!(tree.position, glam::Vec3::new(1.0, 0.0, -3.0));
        assert!(tree.placeholder.is_some(), "still loading");
    }

    #[test]
    fn asset_notifications_swap_out_the_placeholder() {
        let mut mounted = mount(1, &[]);
        assert!(mounted.notify_asset_loaded("oak_tree"));
        let frame = mounted.tick(0.016);
        assert!(frame.layer("forest").unwrap().models[0].placeholder.is_none());
    }

    #[test]
    fn timeline_notice_and_loop() {
        let mut mounted = mount(1, &[]);
        let mut notices = Vec::new();
        for _ in 0..300 {
            notices.extend(mounted.tick(1.0 / 30.0).notices);
        }
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].action, TimelineAction::Audio);
        assert_eq!(notices[0].target, "forest_ambient");
        assert!(mounted.time() < 10.0);
    }

    #[test]
    fn paused_scene_keeps_its_clock() {
        let mut mounted = mount(1, &[]);
        mounted.tick(0.5);
        mounted.set_playing(false);
        mounted.tick(0.5);
        assert_eq!(mounted.time(), 0.5);
    }

    #[test]
    fn audio_plays_after_load_and_stops_on_unmount() {
        let mut mounted = mount(1, &[]);
        mounted.notify_audio_loaded("forest_ambient");
        mounted.notify_audio_loaded("background_music");
        mounted.tick(0.016);
        let plays: Vec<_> = mounted
            .audio_sink()
            .iter()
            .filter(|c| matches!(c, AudioCommand::Play { .. }))
            .map(|c| c.cue().to_string())
            .collect();
        assert_eq!(plays, vec!["background_music", "forest_ambient"]);

        mounted.audio_sink_mut().clear();
        mounted.unmount();
        assert_eq!(mounted.audio_sink().len(), 2);
        assert!(mounted.audio_sink().iter().all(|c| matches!(c, AudioCommand::Stop { .. })));
        assert!(mounted.tick(0.016).layers.is_empty());

        mounted.unmount();
        assert_eq!(mounted.audio_sink().len(), 2);
    }

    #[test]
    fn drop_releases_audio() {
        let queue = SharedQueue::default();
        {
            let program = ProgramConfig::from_json(PROGRAM).unwrap();
            let scene = SceneDefinition::from_json(FOREST).unwrap();
            let config = EngineConfig::default();
            let _mounted =
                MountedScene::mount(&program, scene, 1, overrides(&[]), config, queue.clone())
                    .unwrap();
        }
        let sent = queue.0.borrow();
        assert_eq!(sent.iter().filter(|c| matches!(c, AudioCommand::Stop { .. })).count(), 2);
    }

    #[test]
    fn present_hands_the_frame_to_the_renderer() {
        let mut mounted = mount(1, &[]);
        let mut renderer = CountingRenderer::default();
        mounted.present(0.016, &mut renderer);
        mounted.present(0.016, &mut renderer);
        assert_eq!(renderer.frames, 2);
        assert_eq!(renderer.clears, 0);
    }

    #[test]
    fn unmount_with_clears_the_renderer_once() {
        let mut mounted = mount(1, &[]);
        let mut renderer = CountingRenderer::default();
        mounted.present(0.016, &mut renderer);
        mounted.unmount_with(&mut renderer);
        mounted.unmount_with(&mut renderer);
        assert_eq!(renderer.clears, 1);
        assert!(!mounted.is_mounted());
        assert!(mounted.audio_sink().iter().any(|c| matches!(c, AudioCommand::Stop { .. })));

        // Already unmounted through the plain path: nothing left to clear.
        let mut other = mount(1, &[]);
        other.unmount();
        other.unmount_with(&mut renderer);
        assert_eq!(renderer.clears, 1);
    }

    #[test]
    fn render_set_serializes_for_the_host() {
        let mut mounted = mount(1, &[]);
        let json = mounted.tick(0.016).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["scene"], "forest");
        assert_eq!(value["layers"][0]["id"], "sky");
        assert_eq!(value["layers"][1]["renderOrder"], 1);
        assert!(value["globalAudio"].is_array());
    }
}
