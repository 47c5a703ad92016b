use crate::systems::particles::ShootingStarBounds;

/// Engine configuration for one mounted wall.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Base seed for every particle field and flicker source (default: 42).
    pub seed: u64,
    /// Half-width of the timeline event window in seconds (default: 0.1).
    pub event_tolerance: f32,
    /// Shooting-star exit and respawn windows (default: ±1000 / ±200).
    pub shooting_stars: ShootingStarBounds,
    /// Seconds of velocity a shooting-star trail spans (default: 0.15).
    pub trail: f32,
    /// Whether the timeline starts running on mount (default: true).
    pub playing: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            event_tolerance: 0.1,
            shooting_stars: ShootingStarBounds::default(),
            trail: 0.15,
            playing: true,
        }
    }
}

impl EngineConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_event_tolerance(mut self, tolerance: f32) -> Self {
        self.event_tolerance = tolerance;
        self
    }

    pub fn with_shooting_stars(mut self, bounds: ShootingStarBounds) -> Self {
        self.shooting_stars = bounds;
        self
    }

    pub fn with_trail(mut self, trail: f32) -> Self {
        self.trail = trail;
        self
    }

    pub fn paused(mut self) -> Self {
        self.playing = false;
        self
    }
}
