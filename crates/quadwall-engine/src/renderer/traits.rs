//! Capabilities the engine drives but does not implement.
//!
//! The browser host rasterizes frames and plays audio; the engine only
//! describes what it wants through these traits.

use super::render_set::RenderSet;
use crate::api::types::AudioCommand;

/// The drawing capability: rasterizes one composed frame.
pub trait RenderSink {
    fn draw(&mut self, frame: &RenderSet);

    /// Called once from [`MountedScene::unmount_with`]. Drop any retained
    /// GPU objects.
    ///
    /// [`MountedScene::unmount_with`]: crate::core::scene::MountedScene::unmount_with
    fn clear(&mut self) {}
}

/// The audio capability: decodes and plays cues by id.
pub trait AudioSink {
    fn apply(&mut self, command: AudioCommand);
}

/// Queue commands for a host that polls once per frame.
impl AudioSink for Vec<AudioCommand> {
    fn apply(&mut self, command: AudioCommand) {
        self.push(command);
    }
}
