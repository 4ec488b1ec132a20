//! JSON merge helpers for layered configuration.

use serde_json::Value;

/// Merge an overlay layer into the accumulated config.
///
/// Objects merge key by key; any other overlay value replaces the base. An
/// explicit `null` removes the key so the built-in default applies again.
pub(super) fn merge_layer(base: &mut Value, overlay: &Value) {
    let (Value::Object(base_map), Value::Object(overlay_map)) = (&mut *base, overlay) else {
        *base = without_nulls(overlay);
        return;
    };
    for (key, value) in overlay_map {
        if value.is_null() {
            base_map.remove(key);
            continue;
        }
        let nested = match base_map.get_mut(key) {
            Some(existing) if existing.is_object() && value.is_object() => {
                merge_layer(existing, value);
                true
            }
            _ => false,
        };
        if !nested {
            base_map.insert(key.clone(), without_nulls(value));
        }
    }
}

/// Copy `value`, dropping null members of every nested object.
fn without_nulls(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(_, member)| !member.is_null())
                .map(|(key, member)| (key.clone(), without_nulls(member)))
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::merge_layer;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn nested_objects_merge_and_scalars_replace() {
        let mut base = json!({ "retrieval": { "top_k": 3, "namespace": "a" } });
        merge_layer(&mut base, &json!({ "retrieval": { "top_k": 4 } }));
        assert_eq!(base, json!({ "retrieval": { "top_k": 4, "namespace": "a" } }));
    }

    #[test]
    fn null_resets_a_key() {
        let mut base = json!({ "retrieval": { "min_score": 0.5 } });
        merge_layer(&mut base, &json!({ "retrieval": { "min_score": null } }));
        assert_eq!(base, json!({ "retrieval": {} }));
    }

    #[test]
    fn null_is_dropped_from_a_new_section() {
        let mut base = json!({});
        merge_layer(
            &mut base,
            &json!({ "retrieval": { "top_k": null, "namespace": "b" }, "client": null }),
        );
        assert_eq!(base, json!({ "retrieval": { "namespace": "b" } }));
    }
}
