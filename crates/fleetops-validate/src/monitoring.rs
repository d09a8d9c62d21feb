//! Monitoring occurrence rulesets
//!
//! One base ruleset for every operation, plus the inspector supplement that
//! applies when a record leaves the awaiting-inspector stage.

use crate::{Check, FieldRule, Ruleset};
use serde_json::Value;

pub fn ruleset() -> Ruleset {
    Ruleset::new("monitoring")
        .with_rule(FieldRule::required(
            "monitor_registration",
            "monitor registration is required",
        ))
        .with_rule(FieldRule::min_len(
            "monitor_registration",
            4,
            "monitor registration must have at least 4 digits",
        ))
        .with_rule(FieldRule::required("date_check", "monitoring date is required"))
        .with_rule(FieldRule::required("car", "vehicle is required"))
        .with_rule(FieldRule::required(
            "driver_registration",
            "driver registration is required",
        ))
        .with_rule(FieldRule::min_len(
            "driver_registration",
            4,
            "driver registration must have at least 4 digits",
        ))
        .with_rule(FieldRule::required(
            "date_occurrence",
            "occurrence date is required",
        ))
        .with_rule(FieldRule::new(
            "date_occurrence",
            Check::NotAfter { peer: "date_check" },
            "occurrence date cannot be after the monitoring date",
        ))
        .with_rule(FieldRule::required(
            "type_occurrence",
            "occurrence type is required",
        ))
        .with_rule(FieldRule::required("occurrence", "occurrence is required"))
        .with_rule(FieldRule::required("monitoring_status", "status is required"))
        .with_rule(FieldRule::min_len(
            "treatment",
            10,
            "treatment must be at least 10 characters",
        ))
        .with_default("ra_globus", Value::Null)
        .with_default("video_path", Value::Null)
        .with_default("comment", Value::Null)
        .with_default("treatment", Value::Null)
        .with_default("inspector_registration", Value::Null)
        .with_default("date_inspector", Value::Null)
}

/// Extra requirements once an inspector signs off.
pub fn inspector_supplement() -> Ruleset {
    Ruleset::new("monitoring-inspection")
        .with_rule(FieldRule::required("treatment", "treatment is required"))
        .with_rule(FieldRule::required(
            "date_inspector",
            "inspection date is required",
        ))
        .with_rule(FieldRule::new(
            "date_inspector",
            Check::ValidDateTime,
            "inspection date is not a valid date",
        ))
        .with_rule(FieldRule::required(
            "inspector_registration",
            "inspector registration is required",
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetops_types::Payload;
    use serde_json::json;

    fn complete() -> Payload {
        [
            ("monitor_registration", json!(4511)),
            ("date_check", json!("04/03/2024")),
            ("car", json!(210)),
            ("driver_registration", json!(39021)),
            ("date_occurrence", json!("03/03/2024")),
            ("type_occurrence", json!(2)),
            ("occurrence", json!(12)),
            ("monitoring_status", json!(1)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    #[test]
    fn test_complete_record_passes() {
        let normalized = ruleset().validate(&complete()).unwrap();
        assert_eq!(normalized.get("treatment"), Some(&Value::Null));
    }

    #[test]
    fn test_occurrence_date_must_precede_check_date() {
        let mut input = complete();
        input.insert("date_occurrence".into(), json!("05/03/2024"));
        let errors = ruleset().validate(&input).unwrap_err();
        assert!(errors.contains("date_occurrence"));
    }

    #[test]
    fn test_short_treatment_rejected_when_present() {
        let mut input = complete();
        input.insert("treatment".into(), json!("too short"));
        let errors = ruleset().validate(&input).unwrap_err();
        assert!(errors.contains("treatment"));
    }

    #[test]
    fn test_inspector_supplement() {
        let errors = inspector_supplement()
            .validate(&Default::default())
            .unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains("treatment"));
        assert!(errors.contains("date_inspector"));
        assert!(errors.contains("inspector_registration"));

        let mut input: Payload = Default::default();
        input.insert("treatment".into(), json!("driver cleared after review"));
        input.insert("date_inspector".into(), json!("not a date"));
        input.insert("inspector_registration".into(), json!(8731));
        let errors = inspector_supplement().validate(&input).unwrap_err();
        assert_eq!(
            errors.message_for("date_inspector"),
            Some("inspection date is not a valid date")
        );
    }
}
