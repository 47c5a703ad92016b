//! Convention-based attribute addressing.
//!
//! A modifier id of the form `{entityId}_{attribute}` overrides `attribute`
//! on entity `entityId`. Each entity kind has a closed attribute set; the
//! bindings for an entity are computed once at mount from the declared
//! modifiers, and read every tick from the resolved [`ModifierState`].

use crate::assets::scene_def::ModifierDeclaration;

use super::state::{ModifierState, ModifierValue};

/// A closed set of attributes addressable on one kind of entity.
pub trait Attribute: Clone + PartialEq + Sized {
    /// Parse the part of a modifier id after `{entityId}_`.
    fn parse(suffix: &str) -> Option<Self>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightAttr {
    ColorR,
    ColorG,
    ColorB,
    Intensity,
    X,
    Y,
    Z,
    Flicker,
    FlickerAmount,
    Pulse,
    PulseSpeed,
    PulseAmount,
}

impl Attribute for LightAttr {
    fn parse(suffix: &str) -> Option<Self> {
        Some(match suffix {
            "color_r" => Self::ColorR,
            "color_g" => Self::ColorG,
            "color_b" => Self::ColorB,
            "intensity" => Self::Intensity,
            "x" => Self::X,
            "y" => Self::Y,
            "z" => Self::Z,
            "flicker" => Self::Flicker,
            "flicker_amount" => Self::FlickerAmount,
            "pulse" => Self::Pulse,
            "pulse_speed" => Self::PulseSpeed,
            "pulse_amount" => Self::PulseAmount,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelAttr {
    X,
    Y,
    Z,
    RotX,
    RotY,
    RotZ,
    Scale,
    ScaleX,
    ScaleY,
    ScaleZ,
    /// `anim_{animationName}`
    Anim(String),
    Float,
    FloatSpeed,
    FloatAmount,
    RotateY,
    RotateSpeed,
}

impl Attribute for ModelAttr {
    fn parse(suffix: &str) -> Option<Self> {
        if let Some(name) = suffix.strip_prefix("anim_") {
            return (!name.is_empty()).then(|| Self::Anim(name.to_string()));
        }
        Some(match suffix {
            "x" => Self::X,
            "y" => Self::Y,
            "z" => Self::Z,
            "rot_x" => Self::RotX,
            "rot_y" => Self::RotY,
            "rot_z" => Self::RotZ,
            "scale" => Self::Scale,
            "scale_x" => Self::ScaleX,
            "scale_y" => Self::ScaleY,
            "scale_z" => Self::ScaleZ,
            "float" => Self::Float,
            "float_speed" => Self::FloatSpeed,
            "float_amount" => Self::FloatAmount,
            "rotate_y" => Self::RotateY,
            "rotate_speed" => Self::RotateSpeed,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleAttr {
    Count,
    Size,
    Opacity,
}

impl Attribute for ParticleAttr {
    fn parse(suffix: &str) -> Option<Self> {
        match suffix {
            "count" => Some(Self::Count),
            "size" => Some(Self::Size),
            "opacity" => Some(Self::Opacity),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioAttr {
    Enabled,
    Volume,
    Speed,
}

impl Attribute for AudioAttr {
    fn parse(suffix: &str) -> Option<Self> {
        match suffix {
            "enabled" => Some(Self::Enabled),
            "volume" => Some(Self::Volume),
            "speed" => Some(Self::Speed),
            _ => None,
        }
    }
}

/// Attribute → modifier id table for a single entity.
#[derive(Debug, Clone)]
pub struct Bindings<A: Attribute> {
    entries: Vec<(A, String)>,
}

impl<A: Attribute> Bindings<A> {
    /// Collect every declared modifier addressed to `entity_id`.
    pub fn build(entity_id: &str, declarations: &[ModifierDeclaration]) -> Self {
        let prefix = format!("{}_", entity_id);
        let entries: Vec<(A, String)> = declarations
            .iter()
            .filter_map(|decl| {
                let suffix = decl.id.strip_prefix(&prefix)?;
                A::parse(suffix).map(|attr| (attr, decl.id.clone()))
            })
            .collect();
        if !entries.is_empty() {
            log::debug!("'{}': {} modifier binding(s)", entity_id, entries.len());
        }
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Modifier id bound to `attr`, if any.
    pub fn key(&self, attr: &A) -> Option<&str> {
        self.entries
            .iter()
            .find(|(a, _)| a == attr)
            .map(|(_, id)| id.as_str())
    }

    pub fn value<'s>(&self, attr: &A, state: &'s ModifierState) -> Option<&'s ModifierValue> {
        self.key(attr).and_then(|id| state.get(id))
    }

    /// Numeric override, or `None` when unbound or not a finite number.
    pub fn number(&self, attr: &A, state: &ModifierState) -> Option<f32> {
        self.value(attr, state).and_then(ModifierValue::as_number)
    }

    /// Numeric override applied on top of `current`; non-numeric keeps `current`.
    pub fn number_or(&self, attr: &A, state: &ModifierState, current: f32) -> f32 {
        self.number(attr, state).unwrap_or(current)
    }

    pub fn truthy(&self, attr: &A, state: &ModifierState) -> bool {
        self.value(attr, state).is_some_and(ModifierValue::is_truthy)
    }

    /// Iterate over bound attributes.
    pub fn attributes(&self) -> impl Iterator<Item = &A> {
        self.entries.iter().map(|(a, _)| a)
    }
}

impl<A: Attribute> Default for Bindings<A> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}
