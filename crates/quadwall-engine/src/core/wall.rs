use std::f32::consts::{FRAC_PI_2, PI};

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Cardinal direction a wall's projector faces. One physical display each.
///
/// All four walls view the same authored scene; each derives its view by a
/// fixed 90°-stepped transform, so a scene is authored once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WallDirection {
    North,
    South,
    East,
    West,
}

impl WallDirection {
    pub const ALL: [WallDirection; 4] = [Self::North, Self::South, Self::East, Self::West];

    /// Map an authored position and Y rotation onto this wall's view.
    /// Applied before any modifier-driven offsets.
    pub fn transform(self, position: Vec3, rotation_y: f32) -> (Vec3, f32) {
        (self.transform_position(position), rotation_y + self.rotation_delta())
    }

    pub fn transform_position(self, p: Vec3) -> Vec3 {
        match self {
            Self::North => p,
            Self::South => Vec3::new(-p.x, p.y, p.z),
            Self::East => Vec3::new(-p.z, p.y, p.x),
            Self::West => Vec3::new(p.z, p.y, -p.x),
        }
    }

    pub fn rotation_delta(self) -> f32 {
        match self {
            Self::North => 0.0,
            Self::South => PI,
            Self::East => FRAC_PI_2,
            Self::West => -FRAC_PI_2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::North => "north",
            Self::South => "south",
            Self::East => "east",
            Self::West => "west",
        }
    }
}
