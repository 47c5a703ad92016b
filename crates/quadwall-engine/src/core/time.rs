use crate::api::types::TimelineNotice;
use crate::assets::scene_def::{TimelineDefinition, TimelineEventDefinition};

/// Scene clock and timeline event dispatcher.
///
/// Time advances only while playing and resets hard to zero when it reaches
/// the scene duration. Events are polled: an event fires on the first tick
/// whose time lies within `tolerance` of its scheduled time, and fires again
/// only after the clock has left that window. A single tick longer than
/// `2 × tolerance` can step over the window and miss the event.
#[derive(Debug, Clone)]
pub struct TimelineDriver {
    time: f32,
    duration: Option<f32>,
    tolerance: f32,
    events: Vec<TimelineEventDefinition>,
    /// Whether each event has fired during the current pass through its window.
    fired: Vec<bool>,
}

impl TimelineDriver {
    pub fn new(
        timeline: Option<&TimelineDefinition>,
        duration: Option<f32>,
        tolerance: f32,
    ) -> Self {
        let events = timeline.map(|t| t.events.clone()).unwrap_or_default();
        let fired = vec![false; events.len()];
        Self {
            time: 0.0,
            // A non-positive duration never loops.
            duration: duration.filter(|d| *d > 0.0),
            tolerance,
            events,
            fired,
        }
    }

    /// Current scene time in seconds.
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn duration(&self) -> Option<f32> {
        self.duration
    }

    /// Back to time zero, as on mount.
    pub fn reset(&mut self) {
        self.time = 0.0;
        self.fired.iter_mut().for_each(|f| *f = false);
    }

    /// Advance the clock by `dt` when `playing` and return the events that fired.
    pub fn tick(&mut self, dt: f32, playing: bool) -> Vec<TimelineNotice> {
        if !playing {
            return Vec::new();
        }

        self.time += dt;
        if let Some(duration) = self.duration {
            if self.time >= duration {
                self.time = 0.0;
            }
        }

        let mut notices = Vec::new();
        for (event, fired) in self.events.iter().zip(self.fired.iter_mut()) {
            let inside = (self.time - event.time).abs() <= self.tolerance;
            if inside && !*fired {
                log::info!("timeline {:?} '{}' at {:.2}s", event.action, event.target, self.time);
                notices.push(TimelineNotice {
                    time: event.time,
                    action: event.action,
                    target: event.target.clone(),
                    parameters: event.parameters.clone(),
                });
            }
            *fired = inside;
        }
        notices
    }
}
