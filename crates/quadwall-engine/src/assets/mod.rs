pub mod loader;
pub mod program;
pub mod registry;
pub mod scene_def;
