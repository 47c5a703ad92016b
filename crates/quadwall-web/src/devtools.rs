//! Developer control panel model: one control per declared modifier, and the
//! override maps produced by editing or resetting them.
//!
//! Edits never mutate state in place. Each produces a complete replacement
//! map that the host writes back into the `modifiers` query parameter.

use serde::Serialize;

use quadwall_engine::{ModifierDeclaration, ModifierKind, RuntimeModifierOverrides};

const DEFAULT_STEP: f32 = 0.1;

/// Descriptor for one control in the panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifierControl {
    pub id: String,
    pub name: String,
    pub description: String,
    pub kind: ModifierKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f32>,
    /// Only set for numeric controls.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Current raw value: the override when present, else the default.
    pub value: String,
}

pub fn controls(
    decls: &[ModifierDeclaration],
    overrides: &RuntimeModifierOverrides,
) -> Vec<ModifierControl> {
    decls
        .iter()
        .map(|decl| ModifierControl {
            id: decl.id.clone(),
            name: decl.name.clone(),
            description: decl.description.clone(),
            kind: decl.kind,
            min: decl.min,
            max: decl.max,
            step: (decl.kind == ModifierKind::Number).then(|| decl.step.unwrap_or(DEFAULT_STEP)),
            options: decl.options.clone().unwrap_or_default(),
            value: overrides
                .get(&decl.id)
                .cloned()
                .unwrap_or_else(|| decl.default.to_string()),
        })
        .collect()
}

/// `current` with `id` set to `value`.
pub fn update(
    current: &RuntimeModifierOverrides,
    id: &str,
    value: &str,
) -> RuntimeModifierOverrides {
    let mut next = current.clone();
    next.insert(id.to_string(), value.to_string());
    next
}

/// Every declared modifier written out at its default.
pub fn reset(decls: &[ModifierDeclaration]) -> RuntimeModifierOverrides {
    decls
        .iter()
        .map(|decl| (decl.id.clone(), decl.default.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overrides;

    fn decls() -> Vec<ModifierDeclaration> {
        serde_json::from_str(
            r#"[
                { "id": "show_forest", "name": "Show forest", "type": "boolean", "default": true },
                { "id": "snow_count", "name": "Snow", "type": "number", "default": 100, "min": 0,
                  "max": 200 },
                { "id": "sky_mood", "name": "Mood", "type": "select", "default": "calm",
                  "options": ["calm", "storm"], "description": "Sky preset" }
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn controls_show_defaults_and_overrides() {
        let decls = decls();
        let controls = controls(&decls, &overrides::parse("snow_count:10"));
        assert_eq!(controls.len(), 3);
        assert_eq!(controls[0].value, "true");
        assert_eq!(controls[0].step, None);
        assert_eq!(controls[1].value, "10");
        assert_eq!(controls[1].step, Some(0.1));
        assert_eq!(controls[1].max, Some(200.0));
        assert_eq!(controls[2].value, "calm");
        assert_eq!(controls[2].options, vec!["calm", "storm"]);
        assert_eq!(controls[2].description, "Sky preset");
    }

    #[test]
    fn update_returns_a_full_replacement() {
        let current = overrides::parse("show_forest:false");
        let next = update(&current, "snow_count", "42");
        assert_eq!(overrides::format(&next), "show_forest:false,snow_count:42");
        assert_eq!(current.len(), 1);
    }

    #[test]
    fn reset_writes_every_default() {
        let map = reset(&decls());
        assert_eq!(overrides::format(&map), "show_forest:true,sky_mood:calm,snow_count:100");
    }

    #[test]
    fn control_json_is_camel_case() {
        let decls = decls();
        let json = serde_json::to_string(&controls(&decls, &Default::default())).unwrap();
        assert!(json.contains(r#""kind":"number""#));
        assert!(!json.contains("\"options\":[]"));
    }
}
