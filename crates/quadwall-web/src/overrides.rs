//! The `modifiers` query parameter: `key:value` pairs joined by commas.

use quadwall_engine::RuntimeModifierOverrides;

/// Parse `show_forest:false,snow_count:10` into an override map.
///
/// Items without both a key and a value are skipped. Anything after a second
/// `:` in an item is ignored, so values cannot contain colons.
pub fn parse(query: &str) -> RuntimeModifierOverrides {
    query
        .split(',')
        .filter_map(|item| {
            let mut parts = item.split(':');
            let key = parts.next()?;
            let value = parts.next()?;
            if key.is_empty() || value.is_empty() {
                return None;
            }
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

/// Inverse of [`parse`] for maps whose keys and values hold no `,` or `:`.
pub fn format(overrides: &RuntimeModifierOverrides) -> String {
    overrides
        .iter()
        .map(|(key, value)| format!("{}:{}", key, value))
        .collect::<Vec<_>>()
        .join(",")
}
