//! Audio cue direction.
//!
//! The director never decodes or plays anything. It keeps a `loaded` and
//! `playing` flag per cue and turns changes in the desired state into
//! [`AudioCommand`]s for the host's audio capability.

use serde::Serialize;

use crate::api::types::AudioCommand;
use crate::assets::scene_def::{AudioCueDefinition, LayerDefinition, ModifierDeclaration};
use crate::modifiers::{AudioAttr, Bindings, ModifierState};

const MIN_RATE: f32 = 0.25;
const MAX_RATE: f32 = 4.0;

/// Snapshot of one cue, carried in the render set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CueStatus {
    pub id: String,
    pub loaded: bool,
    pub playing: bool,
    pub volume: f32,
    pub rate: f32,
}

#[derive(Debug, Clone)]
struct Cue {
    def: AudioCueDefinition,
    bindings: Bindings<AudioAttr>,
    /// Owning layer; `None` for program-wide cues.
    layer: Option<String>,
    loaded: bool,
    playing: bool,
    sent_volume: Option<f32>,
    sent_rate: f32,
}

impl Cue {
    fn new(
        def: AudioCueDefinition,
        layer: Option<String>,
        declarations: &[ModifierDeclaration],
    ) -> Self {
        let bindings = Bindings::build(&def.id, declarations);
        Self {
            def,
            bindings,
            layer,
            loaded: false,
            playing: false,
            sent_volume: None,
            sent_rate: 1.0,
        }
    }

    /// `{id}_enabled` decides when bound; otherwise ambient and background
    /// cues play by default.
    fn wants_to_play(&self, state: &ModifierState) -> bool {
        match self.bindings.value(&AudioAttr::Enabled, state) {
            Some(v) => v.is_truthy(),
            None => self.def.id.contains("ambient") || self.def.id.contains("background"),
        }
    }

    fn volume(&self, state: &ModifierState) -> f32 {
        self.bindings
            .number_or(&AudioAttr::Volume, state, self.def.volume)
            .clamp(0.0, 1.0)
    }

    fn rate(&self, state: &ModifierState) -> Option<f32> {
        self.bindings
            .number(&AudioAttr::Speed, state)
            .map(|r| r.clamp(MIN_RATE, MAX_RATE))
    }

    fn status(&self) -> CueStatus {
        CueStatus {
            id: self.def.id.clone(),
            loaded: self.loaded,
            playing: self.playing,
            volume: self.sent_volume.unwrap_or(self.def.volume),
            rate: self.sent_rate,
        }
    }
}

/// All audio cues of a mounted scene: program-wide cues first, then layer
/// cues in declaration order.
#[derive(Debug, Clone, Default)]
pub struct AudioDirector {
    cues: Vec<Cue>,
    released: bool,
}

impl AudioDirector {
    pub fn new(
        global: &[AudioCueDefinition],
        layers: &[LayerDefinition],
        declarations: &[ModifierDeclaration],
    ) -> Self {
        let mut cues: Vec<Cue> = global
            .iter()
            .map(|def| Cue::new(def.clone(), None, declarations))
            .collect();
        for layer in layers {
            for def in &layer.audio {
                cues.push(Cue::new(def.clone(), Some(layer.id.clone()), declarations));
            }
        }
        log::debug!("audio director: {} cue(s)", cues.len());
        Self { cues, released: false }
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Source URLs the host must load, as `(cue id, src, loop)`.
    pub fn sources(&self) -> impl Iterator<Item = (&str, &str, bool)> {
        self.cues
            .iter()
            .map(|c| (c.def.id.as_str(), c.def.src.as_str(), c.def.looping))
    }

    /// Record the host's load-completion notification. Returns false for an
    /// unknown cue.
    pub fn mark_loaded(&mut self, cue_id: &str) -> bool {
        match self.cues.iter_mut().find(|c| c.def.id == cue_id) {
            Some(cue) => {
                cue.loaded = true;
                true
            }
            None => {
                log::debug!("load notification for unknown audio cue '{}'", cue_id);
                false
            }
        }
    }

    /// Bring every cue in line with the desired state.
    ///
    /// A cue plays when the timeline is playing, its layer (if any) is
    /// visible, and it wants to play. Play/pause are only sent once the cue
    /// has loaded; volume and rate are sent whenever they change.
    pub fn direct<F>(
        &mut self,
        state: &ModifierState,
        playing: bool,
        layer_visible: F,
    ) -> Vec<AudioCommand>
    where
        F: Fn(&str) -> bool,
    {
        let mut commands = Vec::new();
        if self.released {
            return commands;
        }

        for cue in &mut self.cues {
            let cue_id = &cue.def.id;

            let volume = cue.volume(state);
            if cue.sent_volume != Some(volume) {
                cue.sent_volume = Some(volume);
                commands.push(AudioCommand::SetVolume { cue: cue_id.clone(), volume });
            }
            if let Some(rate) = cue.rate(state) {
                if rate != cue.sent_rate {
                    cue.sent_rate = rate;
                    commands.push(AudioCommand::SetRate { cue: cue_id.clone(), rate });
                }
            }

            if !cue.loaded {
                continue;
            }
            let audible = cue.layer.as_deref().map_or(true, &layer_visible);
            let should_play = playing && audible && cue.wants_to_play(state);
            if should_play && !cue.playing {
                cue.playing = true;
                commands.push(AudioCommand::Play { cue: cue_id.clone() });
            } else if !should_play && cue.playing {
                cue.playing = false;
                commands.push(AudioCommand::Pause { cue: cue_id.clone() });
            }
        }
        commands
    }

    /// Status of the cues owned by one layer.
    pub fn layer_statuses(&self, layer_id: &str) -> Vec<CueStatus> {
        self.cues
            .iter()
            .filter(|c| c.layer.as_deref() == Some(layer_id))
            .map(Cue::status)
            .collect()
    }

    pub fn global_statuses(&self) -> Vec<CueStatus> {
        self.cues.iter().filter(|c| c.layer.is_none()).map(Cue::status).collect()
    }

    /// Stop and detach every cue. Only the first call emits commands.
    pub fn release(&mut self) -> Vec<AudioCommand> {
        if self.released {
            return Vec::new();
        }
        self.released = true;
        self.cues
            .iter_mut()
            .map(|cue| {
                cue.playing = false;
                AudioCommand::Stop { cue: cue.def.id.clone() }
            })
            .collect()
    }
}
