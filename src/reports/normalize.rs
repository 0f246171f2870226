use serde_json::{Map, Value};

/// Coerces the model's `extracted_data` into the persisted shape.
///
/// The parameter vocabulary is open-ended; only value shapes are enforced.
/// A structured entry keeps `value` (number), `unit` (string) and
/// `reference_range` (string), each optional, wrong-typed fields dropped.
/// Legacy string entries ("14.5 g/dL") and bare numbers pass through for the
/// trend aggregator to decode. Anything that is not an object at the top
/// level becomes an empty mapping rather than failing the upload.
pub fn normalize_extracted(raw: Option<&Value>) -> Map<String, Value> {
    let Some(Value::Object(entries)) = raw else {
        return Map::new();
    };

    let mut out = Map::new();
    for (name, entry) in entries {
        match entry {
            Value::Object(fields) => {
                let mut clean = Map::new();
                if let Some(v) = fields.get("value") {
                    if v.is_number() {
                        clean.insert("value".into(), v.clone());
                    }
                }
                if let Some(u) = fields.get("unit") {
                    if u.is_string() {
                        clean.insert("unit".into(), u.clone());
                    }
                }
                if let Some(r) = fields.get("reference_range") {
                    if r.is_string() {
                        clean.insert("reference_range".into(), r.clone());
                    }
                }
                if !clean.is_empty() {
                    out.insert(name.clone(), Value::Object(clean));
                }
            }
            Value::String(_) | Value::Number(_) => {
                out.insert(name.clone(), entry.clone());
            }
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_shaped_input_becomes_empty_mapping() {
        let raw = json!(["hemoglobin", "cholesterol"]);
        assert!(normalize_extracted(Some(&raw)).is_empty());
    }

    #[test]
    fn missing_input_becomes_empty_mapping() {
        assert!(normalize_extracted(None).is_empty());
    }

    #[test]
    fn structured_entry_survives_intact() {
        let raw = json!({
            "hemoglobin": {"value": 13.2, "unit": "g/dL", "reference_range": "13-17"}
        });
        let out = normalize_extracted(Some(&raw));
        assert_eq!(
            out.get("hemoglobin"),
            Some(&json!({"value": 13.2, "unit": "g/dL", "reference_range": "13-17"}))
        );
    }

    #[test]
    fn wrong_typed_fields_are_dropped_per_entry() {
        let raw = json!({
            "tsh": {"value": "not-a-number", "unit": "mIU/L", "reference_range": 5}
        });
        let out = normalize_extracted(Some(&raw));
        assert_eq!(out.get("tsh"), Some(&json!({"unit": "mIU/L"})));
    }

    #[test]
    fn legacy_string_entries_pass_through() {
        let raw = json!({"hemoglobin": "14.5 g/dL"});
        let out = normalize_extracted(Some(&raw));
        assert_eq!(out.get("hemoglobin"), Some(&json!("14.5 g/dL")));
    }

    #[test]
    fn unusable_entries_are_dropped() {
        let raw = json!({
            "a": [1, 2, 3],
            "b": true,
            "c": null,
            "d": {"comment": "no recognized fields"}
        });
        assert!(normalize_extracted(Some(&raw)).is_empty());
    }
}
