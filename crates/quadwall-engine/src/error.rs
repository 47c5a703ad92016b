use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced while loading or mounting a scene.
///
/// Recovered faults (missing assets, malformed modifier values, unknown
/// override keys) never show up here; they are logged and substituted.
#[derive(Debug, Error)]
pub enum SceneError {
    /// A definition file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A definition file was read but is not valid definition JSON.
    #[error("failed to parse {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    /// The requested wall is not declared by the scene.
    #[error(
        "wall {requested} is not configured for scene '{scene}' (available walls: {})",
        join_ids(.available)
    )]
    WallNotFound {
        scene: String,
        requested: u32,
        available: Vec<u32>,
    },

    /// The program does not list the requested scene.
    #[error("scene '{scene}' is not part of program '{program}'")]
    SceneNotInProgram { program: String, scene: String },
}

fn join_ids(ids: &[u32]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
