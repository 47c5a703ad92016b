use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::assets::scene_def::ModifierDeclaration;

/// Raw overrides keyed by modifier id, as parsed from `key:value,key:value`.
/// Replaced wholesale on navigation; never merged.
pub type RuntimeModifierOverrides = BTreeMap<String, String>;

/// Value kind of a declared modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModifierKind {
    Boolean,
    Number,
    String,
    /// Enumerated string set; the allowed values live in `options`.
    #[serde(alias = "enum")]
    Select,
}

impl ModifierKind {
    /// Whether a value has the shape this kind produces.
    pub fn accepts(self, value: &ModifierValue) -> bool {
        matches!(
            (self, value),
            (ModifierKind::Boolean, ModifierValue::Bool(_))
                | (ModifierKind::Number, ModifierValue::Number(_))
                | (ModifierKind::String, ModifierValue::Text(_))
                | (ModifierKind::Select, ModifierValue::Text(_))
        )
    }
}

/// A resolved modifier value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModifierValue {
    Bool(bool),
    Number(f32),
    Text(String),
}

impl ModifierValue {
    /// Numeric reading of the value. `None` for anything that is not a finite
    /// number, so callers keep their previous value instead of taking NaN.
    pub fn as_number(&self) -> Option<f32> {
        match self {
            ModifierValue::Number(n) if n.is_finite() => Some(*n),
            ModifierValue::Number(_) => None,
            ModifierValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            ModifierValue::Text(s) => parse_number(s),
        }
    }

    /// Truthiness used by effect toggles (`flicker`, `float`, ...).
    pub fn is_truthy(&self) -> bool {
        match self {
            ModifierValue::Bool(b) => *b,
            ModifierValue::Number(n) => *n != 0.0 && !n.is_nan(),
            ModifierValue::Text(s) => !s.is_empty() && s != "false" && s != "0",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ModifierValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ModifierValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModifierValue::Bool(b) => write!(f, "{}", b),
            ModifierValue::Number(n) => write!(f, "{}", n),
            ModifierValue::Text(s) => f.write_str(s),
        }
    }
}

/// Parse a finite float. Rejects `NaN`, `inf` and anything unparsable.
pub(crate) fn parse_number(raw: &str) -> Option<f32> {
    raw.trim().parse::<f32>().ok().filter(|n| n.is_finite())
}

/// Fully resolved modifier values for one tick.
///
/// Holds exactly one entry per declared modifier and nothing else. There is
/// no mutation API: a new override map produces a new state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModifierState {
    values: BTreeMap<String, ModifierValue>,
}

impl ModifierState {
    /// Resolve overrides against the scene's declarations.
    ///
    /// Absent overrides take the declared default. Booleans are `true` only for
    /// the exact string `"true"`. Numbers that fail to parse fall back to the
    /// default. Strings and enumerated values pass through verbatim, without a
    /// membership check. Override keys with no declaration are ignored.
    pub fn resolve(
        declarations: &[ModifierDeclaration],
        overrides: &RuntimeModifierOverrides,
    ) -> Self {
        let mut values = BTreeMap::new();
        for decl in declarations {
            let value = match overrides.get(&decl.id) {
                None => decl.default.clone(),
                Some(raw) => coerce(decl, raw),
            };
            values.insert(decl.id.clone(), value);
        }

        for key in overrides.keys().filter(|k| !values.contains_key(k.as_str())) {
            log::debug!("ignoring override for undeclared modifier '{}'", key);
        }

        Self { values }
    }

    pub fn get(&self, id: &str) -> Option<&ModifierValue> {
        self.values.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.values.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModifierValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn coerce(decl: &ModifierDeclaration, raw: &str) -> ModifierValue {
    match decl.kind {
        ModifierKind::Boolean => ModifierValue::Bool(raw == "true"),
        ModifierKind::Number => match parse_number(raw) {
            Some(n) => ModifierValue::Number(n),
            None => {
                log::warn!(
                    "modifier '{}': '{}' is not a number, using default {}",
                    decl.id,
                    raw,
                    decl.default
                );
                decl.default.clone()
            }
        },
        ModifierKind::String | ModifierKind::Select => ModifierValue::Text(raw.to_string()),
    }
}
