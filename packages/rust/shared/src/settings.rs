//! Deep merge of JSON settings objects.

use serde_json::{Map, Value};

/// Merge `source` into `target`.
///
/// Nested objects merge key by key; arrays, scalars and `null` replace the
/// existing value. A `source` that is not an object leaves `target` untouched.
pub fn merge_settings(target: &mut Map<String, Value>, source: &Value) {
    let Value::Object(source) = source else {
        return;
    };

    for (key, incoming) in source {
        if incoming.is_object() {
            if let Some(Value::Object(existing)) = target.get_mut(key) {
                merge_settings(existing, incoming);
                continue;
            }
        }
        target.insert(key.clone(), incoming.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn nested_objects_merge() {
        let mut target = obj(json!({
            "ContentTypeSettings": { "Creatable": true, "Listable": false }
        }));
        merge_settings(
            &mut target,
            &json!({ "ContentTypeSettings": { "Listable": true, "Draftable": true } }),
        );
        assert_eq!(
            Value::Object(target),
            json!({
                "ContentTypeSettings": { "Creatable": true, "Listable": true, "Draftable": true }
            })
        );
    }

    #[test]
    fn arrays_and_nulls_replace() {
        let mut target = obj(json!({ "Options": [1, 2, 3], "Hint": "old" }));
        merge_settings(&mut target, &json!({ "Options": [4], "Hint": null }));
        assert_eq!(target["Options"], json!([4]));
        assert_eq!(target["Hint"], Value::Null);
    }

    #[test]
    fn non_object_source_is_ignored() {
        let mut target = obj(json!({ "A": 1 }));
        merge_settings(&mut target, &Value::Null);
        merge_settings(&mut target, &json!([1, 2]));
        assert_eq!(Value::Object(target), json!({ "A": 1 }));
    }
}
