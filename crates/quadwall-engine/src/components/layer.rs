use crate::assets::scene_def::LayerDefinition;
use crate::modifiers::ModifierState;

/// A layer that survived visibility resolution, with its effective opacity.
///
/// Layers are drawn back-to-front in ascending `render_order`; ties keep
/// declaration order (`index`).
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedLayer {
    /// Position in the scene's layer list.
    pub index: usize,
    pub id: String,
    pub opacity: f32,
    pub render_order: i32,
}

/// Resolve a layer's visibility: authored flag, then `show_{id}`, then
/// `hide_{id}`. When both are declared `hide_{id}` is applied last and wins.
pub fn layer_visible(layer: &LayerDefinition, state: &ModifierState) -> bool {
    let mut visible = layer.visible;
    if let Some(show) = state.get(&format!("show_{}", layer.id)) {
        visible = show.is_truthy();
    }
    if let Some(hide) = state.get(&format!("hide_{}", layer.id)) {
        visible = !hide.is_truthy();
    }
    visible
}

/// Authored opacity, replaced by a numeric `{id}_opacity`, clamped to `[0, 1]`.
pub fn layer_opacity(layer: &LayerDefinition, state: &ModifierState) -> f32 {
    state
        .get(&format!("{}_opacity", layer.id))
        .and_then(|v| v.as_number())
        .unwrap_or(layer.opacity)
        .clamp(0.0, 1.0)
}

/// Compose the visible layers in draw order. Hidden layers are dropped.
pub fn compose_layers(layers: &[LayerDefinition], state: &ModifierState) -> Vec<ComposedLayer> {
    let mut composed: Vec<ComposedLayer> = layers
        .iter()
        .enumerate()
        .filter(|(_, layer)| layer_visible(layer, state))
        .map(|(index, layer)| ComposedLayer {
            index,
            id: layer.id.clone(),
            opacity: layer_opacity(layer, state),
            render_order: layer.render_order,
        })
        .collect();
    // Stable, so equal render orders keep declaration order.
    composed.sort_by_key(|l| l.render_order);
    composed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::scene_def::{ModifierDeclaration, SceneDefinition};
    use crate::fixtures::FOREST;
    use crate::modifiers::{ModifierKind, ModifierValue, RuntimeModifierOverrides};

    fn layer(id: &str, order: i32) -> LayerDefinition {
        let json = format!(
            r#"{{ "id": "{}", "name": "{}", "renderOrder": {} }}"#,
            id, id, order
        );
        serde_json::from_str(&json).unwrap()
    }

    fn decl(id: &str, kind: ModifierKind, default: ModifierValue) -> ModifierDeclaration {
        ModifierDeclaration {
            id: id.into(),
            name: id.into(),
            description: String::new(),
            kind,
            default,
            min: None,
            max: None,
            step: None,
            options: None,
            affects: Vec::new(),
        }
    }

    fn state(decls: &[ModifierDeclaration], overrides: &[(&str, &str)]) -> ModifierState {
        let overrides: RuntimeModifierOverrides =
            overrides.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        ModifierState::resolve(decls, &overrides)
    }

    fn ids(composed: &[ComposedLayer]) -> Vec<&str> {
        composed.iter().map(|l| l.id.as_str()).collect()
    }

    #[test]
    fn ascending_render_order_with_stable_ties() {
        let layers = [layer("c", 2), layer("a", 0), layer("b2", 1), layer("b1", 1)];
        let composed = compose_layers(&layers, &ModifierState::default());
        assert_eq!(ids(&composed), vec!["a", "b2", "b1", "c"]);
        assert_eq!(composed[0].index, 1);
    }

    #[test]
    fn show_modifier_hides_a_layer() {
        let scene = SceneDefinition::from_json(FOREST).unwrap();
        let s = state(&scene.modifiers, &[("show_forest", "false"), ("snow_count", "10")]);
        let composed = compose_layers(&scene.layers, &s);
        assert_eq!(ids(&composed), vec!["sky"]);
    }

    #[test]
    fn show_modifier_reveals_an_authored_hidden_layer() {
        let mut night = layer("night", 0);
        night.visible = false;
        let decls = [decl("show_night", ModifierKind::Boolean, ModifierValue::Bool(false))];
        assert!(!layer_visible(&night, &state(&decls, &[])));
        assert!(layer_visible(&night, &state(&decls, &[("show_night", "true")])));
    }

    #[test]
    fn hide_wins_over_show() {
        let l = layer("fog", 0);
        let decls = [
            decl("show_fog", ModifierKind::Boolean, ModifierValue::Bool(true)),
            decl("hide_fog", ModifierKind::Boolean, ModifierValue::Bool(false)),
        ];
        assert!(layer_visible(&l, &state(&decls, &[])));
        assert!(!layer_visible(&l, &state(&decls, &[("hide_fog", "true")])));
    }

    #[test]
    fn opacity_override_is_clamped() {
        let l = layer("fog", 0);
        let decls = [decl("fog_opacity", ModifierKind::Number, ModifierValue::Number(1.0))];
        assert_eq!(layer_opacity(&l, &state(&decls, &[("fog_opacity", "5")])), 1.0);
        assert_eq!(layer_opacity(&l, &state(&decls, &[("fog_opacity", "-3")])), 0.0);
        assert_eq!(layer_opacity(&l, &state(&decls, &[("fog_opacity", "0.4")])), 0.4);
        assert_eq!(layer_opacity(&l, &state(&decls, &[("fog_opacity", "thick")])), 1.0);
    }

    #[test]
    fn undeclared_override_has_no_effect() {
        let l = layer("fog", 0);
        // Only declared modifiers reach the state.
        assert!(layer_visible(&l, &state(&[], &[("hide_fog", "true")])));
    }
}
