//! R.O. occurrence report rulesets
//!
//! Six rulesets keyed by occurrence type. All share the base rules; the
//! vehicle mileage requirement is lifted for deviations (type 3), and
//! deviation-by-line reports carry no vehicle fields at all.

use crate::{Check, FieldRule, Ruleset};
use fleetops_types::RoOccurrenceType;
use serde_json::json;

const KILOMETER_RULE: FieldRule = FieldRule::new(
    "vehicle_kilometer",
    Check::RequiredUnless {
        peer: "ro_occurrence_type",
        equals: RoOccurrenceType::Deviation as u8 as i64,
    },
    "vehicle mileage is required",
);

fn base_rules() -> Vec<FieldRule> {
    vec![
        FieldRule::required("occurrence_date", "occurrence date is required"),
        FieldRule::required("ro_status", "status is required"),
        FieldRule::required("ro_bus_line", "bus line is required"),
        FieldRule::required("location", "location is required"),
        FieldRule::min_len("location", 10, "location must be at least 10 characters"),
        FieldRule::required("ro_city", "city is required"),
        FieldRule::required("ro_sector", "affected sector is required"),
    ]
}

fn vehicle_rules() -> Vec<FieldRule> {
    vec![
        FieldRule::required("ro_car", "vehicle is required"),
        KILOMETER_RULE,
        FieldRule::required("employee_involved", "involved driver is required"),
    ]
}

/// Resolve the ruleset for an occurrence type. This is the single dispatch
/// point; callers never hold schema objects of their own.
pub fn ruleset(occurrence_type: RoOccurrenceType) -> Ruleset {
    let ruleset = match occurrence_type {
        RoOccurrenceType::Delay => Ruleset::new("ro-delay")
            .with_rules(base_rules())
            .with_rules(vehicle_rules())
            .with_rule(FieldRule::required("direction", "direction is required"))
            .with_rule(FieldRule::required("ro_motive", "occurrence motive is required")),

        RoOccurrenceType::Cancellation => Ruleset::new("ro-cancellation")
            .with_rules(base_rules())
            .with_rules(vehicle_rules())
            .with_rule(FieldRule::required("sos", "S.O.S. answer is required"))
            .with_rule(FieldRule::required("collected", "collection answer is required"))
            .with_rule(FieldRule::required("substitution", "substitution answer is required"))
            .with_rule(FieldRule::required(
                "occurrence_detail",
                "occurrence detail is required",
            ))
            .with_rule(FieldRule::min_len(
                "occurrence_detail",
                5,
                "occurrence detail must be at least 5 characters",
            ))
            .with_rule(FieldRule::required("ro_occurrence", "occurrence is required"))
            .with_rule(FieldRule::required("ro_motive", "occurrence motive is required")),

        RoOccurrenceType::Deviation => Ruleset::new("ro-deviation")
            .with_rules(base_rules())
            .with_rules(vehicle_rules())
            .with_rule(FieldRule::required(
                "deviation_realized",
                "deviation description is required",
            ))
            .with_rule(FieldRule::required("direction", "direction is required"))
            .with_rule(FieldRule::required("ro_motive", "occurrence motive is required")),

        RoOccurrenceType::TransmissionFailure => Ruleset::new("ro-transmission-failure")
            .with_rules(base_rules())
            .with_rules(vehicle_rules())
            .with_rule(FieldRule::required(
                "date_restore",
                "transmission restore date is required",
            ))
            .with_rule(FieldRule::required("direction", "direction is required")),

        RoOccurrenceType::NonOccurrence => Ruleset::new("ro-non-occurrence")
            .with_rules(base_rules())
            .with_rules(vehicle_rules())
            .with_rule(FieldRule::required("sos", "S.O.S. answer is required"))
            .with_rule(FieldRule::required("collected", "collection answer is required"))
            .with_rule(FieldRule::required("substitution", "substitution answer is required"))
            .with_rule(FieldRule::required(
                "occurrence_detail",
                "occurrence detail is required",
            ))
            .with_rule(FieldRule::min_len(
                "occurrence_detail",
                5,
                "occurrence detail must be at least 5 characters",
            ))
            .with_rule(FieldRule::required("ro_occurrence", "occurrence is required"))
            .with_rule(FieldRule::required("direction", "direction is required")),

        RoOccurrenceType::DeviationByLine => Ruleset::new("ro-deviation-by-line")
            .with_rules(base_rules())
            .with_rule(FieldRule::required(
                "deviation_realized",
                "deviation description is required",
            ))
            .with_rule(FieldRule::required("direction", "direction is required"))
            .with_rule(FieldRule::required("ro_motive", "occurrence motive is required")),
    };

    // Optional foreign keys default the way update payloads are shaped.
    ruleset
        .with_default("direction", json!(0))
        .with_default("ro_occurrence", json!(1))
        .with_default("ro_motive", json!(1))
        .with_default("observation", serde_json::Value::Null)
        .with_default("occurrence_response", serde_json::Value::Null)
        .with_default("substitute_vehicle", serde_json::Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetops_types::Payload;
    use serde_json::json;

    fn base_payload(occurrence_type: RoOccurrenceType) -> Payload {
        [
            ("occurrence_date", json!("07/06/2024 22:15:00")),
            ("ro_status", json!(1)),
            ("ro_bus_line", json!(42)),
            ("location", json!("Rodovia BR-101, km 34, northbound")),
            ("ro_city", json!(3)),
            ("ro_sector", json!(2)),
            ("ro_occurrence_type", json!(occurrence_type.code())),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    #[test]
    fn test_deviation_by_line_without_deviation_text() {
        let errors = ruleset(RoOccurrenceType::DeviationByLine)
            .validate(&base_payload(RoOccurrenceType::DeviationByLine))
            .unwrap_err();
        assert!(errors.contains("deviation_realized"));
        assert!(errors.contains("direction"));
        assert!(errors.contains("ro_motive"));
        // No vehicle fields for this type.
        assert!(!errors.contains("ro_car"));
        assert!(!errors.contains("vehicle_kilometer"));
    }

    #[test]
    fn test_kilometer_lifted_for_deviation_type() {
        let mut input = base_payload(RoOccurrenceType::Deviation);
        input.insert("ro_car".into(), json!(210));
        input.insert("employee_involved".into(), json!(39021));
        input.insert("deviation_realized".into(), json!("rerouted via harbor road"));
        input.insert("direction".into(), json!(1));
        input.insert("ro_motive".into(), json!(4));
        // vehicle_kilometer deliberately absent — type 3 lifts it.
        assert!(ruleset(RoOccurrenceType::Deviation).validate(&input).is_ok());
    }

    #[test]
    fn test_kilometer_required_for_delay() {
        let mut input = base_payload(RoOccurrenceType::Delay);
        input.insert("ro_car".into(), json!(210));
        input.insert("employee_involved".into(), json!(39021));
        input.insert("direction".into(), json!(2));
        input.insert("ro_motive".into(), json!(4));
        let errors = ruleset(RoOccurrenceType::Delay).validate(&input).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.contains("vehicle_kilometer"));
    }

    #[test]
    fn test_cancellation_has_no_direction_rule() {
        let required = ruleset(RoOccurrenceType::Cancellation).required_fields();
        assert!(!required.contains(&"direction"));
        assert!(required.contains(&"occurrence_detail"));
    }

    #[test]
    fn test_defaults_applied_on_success() {
        let mut input = base_payload(RoOccurrenceType::TransmissionFailure);
        input.insert("ro_car".into(), json!(210));
        input.insert("vehicle_kilometer".into(), json!(123000));
        input.insert("employee_involved".into(), json!(39021));
        input.insert("date_restore".into(), json!("08/06/2024 06:00:00"));
        input.insert("direction".into(), json!(3));
        let normalized = ruleset(RoOccurrenceType::TransmissionFailure)
            .validate(&input)
            .unwrap();
        assert_eq!(normalized.get("ro_occurrence"), Some(&json!(1)));
        assert_eq!(normalized.get("ro_motive"), Some(&json!(1)));
        assert_eq!(normalized.get("observation"), Some(&serde_json::Value::Null));
    }
}
