//! Definition source: the `programs/{program}/...` path convention.
//!
//! The browser host fetches these paths itself and hands the JSON to
//! [`SceneBundle::from_json`]; native tools read them from a content root.

use std::fs;
use std::path::Path;

use super::program::ProgramConfig;
use super::scene_def::SceneDefinition;
use crate::error::SceneError;

/// Relative path of a program's configuration file.
pub fn program_config_path(program: &str) -> String {
    format!("programs/{}/config.json", program)
}

/// Relative path of a scene definition file.
pub fn scene_path(program: &str, scene: &str) -> String {
    format!("programs/{}/scenes/{}.json", program, scene)
}

/// A program together with one of its scenes, both parsed.
#[derive(Debug, Clone)]
pub struct SceneBundle {
    pub program: ProgramConfig,
    pub scene: SceneDefinition,
}

impl SceneBundle {
    /// Parse a bundle from host-fetched JSON. `origin` names the source in errors.
    pub fn from_json(
        program_origin: &str,
        program_json: &str,
        scene_origin: &str,
        scene_json: &str,
    ) -> Result<Self, SceneError> {
        let program = ProgramConfig::from_json(program_json).map_err(|source| SceneError::Parse {
            origin: program_origin.to_string(),
            source,
        })?;
        let scene = SceneDefinition::from_json(scene_json).map_err(|source| SceneError::Parse {
            origin: scene_origin.to_string(),
            source,
        })?;
        for problem in scene.validate() {
            log::warn!("scene '{}': {}", scene.id, problem);
        }
        Ok(Self { program, scene })
    }

    /// Read a bundle from a content root laid out by the path convention.
    pub fn load(root: &Path, program: &str, scene: &str) -> Result<Self, SceneError> {
        let program_config = load_program(root, program)?;
        // A scene missing from the program listing is still loadable; the
        // listing only drives navigation.
        if program_config.scene(scene).is_err() {
            log::warn!("scene '{}' is not listed in program '{}'", scene, program);
        }
        let scene_def = load_scene(root, program, scene)?;
        Ok(Self {
            program: program_config,
            scene: scene_def,
        })
    }
}

/// Read and parse `programs/{program}/config.json` under `root`.
pub fn load_program(root: &Path, program: &str) -> Result<ProgramConfig, SceneError> {
    let rel = program_config_path(program);
    let json = read(&root.join(&rel))?;
    log::debug!("loaded {}", rel);
    ProgramConfig::from_json(&json).map_err(|source| SceneError::Parse { origin: rel, source })
}

/// Read and parse `programs/{program}/scenes/{scene}.json` under `root`.
pub fn load_scene(root: &Path, program: &str, scene: &str) -> Result<SceneDefinition, SceneError> {
    let rel = scene_path(program, scene);
    let json = read(&root.join(&rel))?;
    log::debug!("loaded {}", rel);
    let scene = SceneDefinition::from_json(&json)
        .map_err(|source| SceneError::Parse { origin: rel, source })?;
    for problem in scene.validate() {
        log::warn!("scene '{}': {}", scene.id, problem);
    }
    Ok(scene)
}

fn read(path: &Path) -> Result<String, SceneError> {
    fs::read_to_string(path).map_err(|source| SceneError::Io {
        path: path.to_path_buf(),
        source,
    })
}
