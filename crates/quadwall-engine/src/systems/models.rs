//! Model transform resolution.
//!
//! Order of application each tick: authored transform, wall transform,
//! static modifier overrides, then the continuous float/spin effects on top.

use glam::Vec3;
use serde::Serialize;

use crate::assets::registry::AssetState;
use crate::assets::scene_def::ModelDefinition;
use crate::components::placeholder::Placeholder;
use crate::core::wall::WallDirection;
use crate::modifiers::{Bindings, ModelAttr, ModifierState};

const DEFAULT_FLOAT_SPEED: f32 = 1.0;
const DEFAULT_FLOAT_AMOUNT: f32 = 0.1;
const DEFAULT_ROTATE_SPEED: f32 = 1.0;

/// Desired playback of one declared animation clip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnimationDirective {
    pub name: String,
    pub playing: bool,
}

/// Effective model parameters for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedModel {
    pub id: String,
    pub src: String,
    pub position: Vec3,
    /// Euler angles in radians (XYZ).
    pub rotation: Vec3,
    pub scale: Vec3,
    pub animations: Vec<AnimationDirective>,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    /// Set while the asset is loading or failed, and always for `primitive:` sources.
    pub placeholder: Option<Placeholder>,
}

/// A mounted model. Owns the accumulated spin angle, the only state that
/// persists between ticks.
#[derive(Debug, Clone)]
pub struct ModelRuntime {
    pub def: ModelDefinition,
    bindings: Bindings<ModelAttr>,
    placeholder: Placeholder,
    spin: f32,
}

impl ModelRuntime {
    pub fn new(def: ModelDefinition, bindings: Bindings<ModelAttr>) -> Self {
        let placeholder = Placeholder::for_id(&def.id);
        Self {
            def,
            bindings,
            placeholder,
            spin: 0.0,
        }
    }

    /// Accumulated `rotate_y` spin in radians.
    pub fn spin(&self) -> f32 {
        self.spin
    }

    pub fn resolve(
        &mut self,
        wall: WallDirection,
        state: &ModifierState,
        asset: &AssetState,
        time: f32,
        dt: f32,
    ) -> ResolvedModel {
        let b = &self.bindings;
        let def = &self.def;

        let (walled, rot_y) = wall.transform(def.position.into(), def.rotation.y);
        let mut position = Vec3::new(
            b.number_or(&ModelAttr::X, state, walled.x),
            b.number_or(&ModelAttr::Y, state, walled.y),
            b.number_or(&ModelAttr::Z, state, walled.z),
        );
        let mut rotation = Vec3::new(
            b.number_or(&ModelAttr::RotX, state, def.rotation.x),
            b.number_or(&ModelAttr::RotY, state, rot_y),
            b.number_or(&ModelAttr::RotZ, state, def.rotation.z),
        );
        let scale = match b.number(&ModelAttr::Scale, state) {
            Some(uniform) => Vec3::splat(uniform),
            None => Vec3::new(
                b.number_or(&ModelAttr::ScaleX, state, def.scale.x),
                b.number_or(&ModelAttr::ScaleY, state, def.scale.y),
                b.number_or(&ModelAttr::ScaleZ, state, def.scale.z),
            ),
        };

        if b.truthy(&ModelAttr::Float, state) {
            let speed = b.number_or(&ModelAttr::FloatSpeed, state, DEFAULT_FLOAT_SPEED);
            let amount = b.number_or(&ModelAttr::FloatAmount, state, DEFAULT_FLOAT_AMOUNT);
            position.y += (time * speed).sin() * amount;
        }
        if b.truthy(&ModelAttr::RotateY, state) {
            self.spin += dt * b.number_or(&ModelAttr::RotateSpeed, state, DEFAULT_ROTATE_SPEED);
        }
        rotation.y += self.spin;

        let animations = def
            .animations
            .iter()
            .map(|name| {
                let attr = ModelAttr::Anim(name.clone());
                // Only an explicit false stops a clip.
                let playing = match b.value(&attr, state) {
                    Some(v) => v.is_truthy(),
                    None => true,
                };
                AnimationDirective {
                    name: name.clone(),
                    playing,
                }
            })
            .collect();

        ResolvedModel {
            id: def.id.clone(),
            src: def.src.clone(),
            position,
            rotation,
            scale,
            animations,
            cast_shadow: def.cast_shadow,
            receive_shadow: def.receive_shadow,
            placeholder: asset.needs_placeholder().then_some(self.placeholder),
        }
    }
}
