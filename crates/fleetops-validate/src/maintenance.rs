//! Maintenance request ruleset

use crate::{FieldRule, Ruleset};
use serde_json::Value;

/// The single maintenance ruleset; comments and approver stay optional.
pub fn ruleset() -> Ruleset {
    Ruleset::new("maintenance")
        .with_rule(FieldRule::required("car", "vehicle is required"))
        .with_rule(FieldRule::required(
            "date_maintenance",
            "maintenance date is required",
        ))
        .with_rule(FieldRule::required("types", "maintenance type is required"))
        .with_rule(FieldRule::required(
            "details",
            "maintenance detail is required",
        ))
        .with_rule(FieldRule::required("status", "status is required"))
        .with_default("comments", Value::Null)
        .with_default("approver", Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_fields_all_reported() {
        let errors = ruleset().validate(&Default::default()).unwrap_err();
        assert_eq!(errors.len(), 5);
    }

    #[test]
    fn test_complete_request_passes() {
        let input = [
            ("car", json!(210)),
            ("date_maintenance", json!("12/04/2024")),
            ("types", json!(2)),
            ("details", json!(7)),
            ("status", json!(1)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let normalized = ruleset().validate(&input).unwrap();
        assert_eq!(normalized.get("comments"), Some(&Value::Null));
        assert_eq!(normalized.get("approver"), Some(&Value::Null));
    }
}
