use std::collections::BTreeMap;

use serde::Serialize;

use crate::assets::scene_def::TimelineAction;
use crate::modifiers::ModifierValue;

/// An instruction for the audio capability, addressed by cue id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum AudioCommand {
    /// Start from the beginning.
    Play { cue: String },
    Pause { cue: String },
    /// Stop and detach the source. Sent for every cue on unmount.
    Stop { cue: String },
    SetVolume { cue: String, volume: f32 },
    SetRate { cue: String, rate: f32 },
}

impl AudioCommand {
    pub fn cue(&self) -> &str {
        match self {
            Self::Play { cue }
            | Self::Pause { cue }
            | Self::Stop { cue }
            | Self::SetVolume { cue, .. }
            | Self::SetRate { cue, .. } => cue,
        }
    }
}

/// A timeline event that fired this tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineNotice {
    /// Scheduled time of the event in seconds.
    pub time: f32,
    pub action: TimelineAction,
    pub target: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, ModifierValue>,
}
