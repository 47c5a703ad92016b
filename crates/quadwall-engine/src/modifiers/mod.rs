//! Runtime modifiers: resolving raw override strings into typed values, and
//! addressing entity attributes through `{entity}_{attribute}` modifier ids.

pub mod keys;
pub mod state;

pub use keys::{Attribute, AudioAttr, Bindings, LightAttr, ModelAttr, ParticleAttr};
pub use state::{ModifierKind, ModifierState, ModifierValue, RuntimeModifierOverrides};
