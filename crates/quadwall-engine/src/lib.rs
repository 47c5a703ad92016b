pub mod api;
pub mod assets;
pub mod components;
pub mod core;
pub mod error;
pub mod modifiers;
pub mod renderer;
pub mod systems;

#[cfg(test)]
mod fixtures;

// Re-export key types at crate root for convenience
pub use api::config::EngineConfig;
pub use api::types::{AudioCommand, TimelineNotice};
pub use assets::loader::{load_program, load_scene, SceneBundle};
pub use assets::program::{ProgramConfig, SceneSummary};
pub use assets::registry::{AssetRegistry, AssetState};
pub use assets::scene_def::{
    AudioCueDefinition, Color, LayerDefinition, LightDefinition, LightKind, ModelDefinition,
    ModifierDeclaration, ParticleSystemDefinition, SceneDefinition, TimelineAction, Vector3,
    WallDefinition,
};
pub use components::layer::{compose_layers, ComposedLayer};
pub use components::placeholder::Placeholder;
pub use crate::core::scene::MountedScene;
pub use crate::core::time::TimelineDriver;
pub use crate::core::wall::WallDirection;
pub use error::SceneError;
pub use modifiers::{ModifierKind, ModifierState, ModifierValue, RuntimeModifierOverrides};
pub use renderer::{AudioSink, LayerRender, RenderSet, RenderSink};
pub use systems::audio::{AudioDirector, CueStatus};
pub use systems::lighting::{resolve_light, ResolvedLight};
pub use systems::models::{ModelRuntime, ResolvedModel};
pub use systems::particles::{ParticleField, ParticleGeometry, ParticleKind, ParticleRender};
pub use systems::rng::Rng;
