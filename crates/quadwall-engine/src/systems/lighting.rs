//! Light parameter resolution.
//!
//! Lights are mounted once per scene. Each tick their effective parameters
//! are recomputed from the authored definition, the current modifier state
//! and the layer opacity; nothing from one tick carries into the next
//! except the flicker noise source.

use std::f32::consts::FRAC_PI_4;

use glam::Vec3;
use serde::Serialize;

use crate::assets::scene_def::{LightDefinition, LightKind};
use crate::modifiers::{Bindings, LightAttr, ModifierState};

use super::rng::Rng;

const DEFAULT_FLICKER_AMOUNT: f32 = 0.2;
const DEFAULT_PULSE_SPEED: f32 = 2.0;
const DEFAULT_PULSE_AMOUNT: f32 = 0.5;

/// Effective light parameters for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLight {
    pub id: String,
    pub kind: LightKind,
    pub color: [f32; 3],
    pub intensity: f32,
    pub position: Option<Vec3>,
    pub target: Option<Vec3>,
    pub distance: f32,
    pub angle: f32,
    pub penumbra: f32,
    pub cast_shadow: bool,
}

/// Compute a light's parameters for this frame.
///
/// Static overrides are applied first; flicker and pulse then add on top of
/// the resolved intensity.
pub fn resolve_light(
    def: &LightDefinition,
    bindings: &Bindings<LightAttr>,
    state: &ModifierState,
    layer_opacity: f32,
    time: f32,
    rng: &mut Rng,
) -> ResolvedLight {
    let channel =
        |attr: LightAttr, base: f32| bindings.number_or(&attr, state, base).clamp(0.0, 1.0);
    let color = [
        channel(LightAttr::ColorR, def.color.r),
        channel(LightAttr::ColorG, def.color.g),
        channel(LightAttr::ColorB, def.color.b),
    ];

    let base = bindings.number_or(&LightAttr::Intensity, state, def.intensity * layer_opacity);
    let mut intensity = base;
    if bindings.truthy(&LightAttr::Flicker, state) {
        let amount = bindings.number_or(&LightAttr::FlickerAmount, state, DEFAULT_FLICKER_AMOUNT);
        intensity += rng.centered(amount);
    }
    if bindings.truthy(&LightAttr::Pulse, state) {
        let speed = bindings.number_or(&LightAttr::PulseSpeed, state, DEFAULT_PULSE_SPEED);
        let amount = bindings.number_or(&LightAttr::PulseAmount, state, DEFAULT_PULSE_AMOUNT);
        intensity += (time * speed).sin() * amount;
    }

    // Position overrides only apply to lights that have a position.
    let position = def.position.map(|p| {
        Vec3::new(
            bindings.number_or(&LightAttr::X, state, p.x),
            bindings.number_or(&LightAttr::Y, state, p.y),
            bindings.number_or(&LightAttr::Z, state, p.z),
        )
    });

    ResolvedLight {
        id: def.id.clone(),
        kind: def.kind,
        color,
        intensity: intensity.max(0.0),
        position,
        target: def.target.map(Vec3::from),
        distance: def.distance.unwrap_or(0.0),
        angle: def.angle.unwrap_or(FRAC_PI_4),
        penumbra: def.penumbra.unwrap_or(0.0),
        cast_shadow: def.cast_shadow,
    }
}

/// A mounted light: definition, its modifier bindings and a private noise source.
#[derive(Debug, Clone)]
pub struct LightRuntime {
    pub def: LightDefinition,
    bindings: Bindings<LightAttr>,
    rng: Rng,
}

impl LightRuntime {
    pub fn new(def: LightDefinition, bindings: Bindings<LightAttr>, rng: Rng) -> Self {
        Self { def, bindings, rng }
    }

    pub fn tick(&mut self, state: &ModifierState, layer_opacity: f32, time: f32) -> ResolvedLight {
        resolve_light(&self.def, &self.bindings, state, layer_opacity, time, &mut self.rng)
    }
}
