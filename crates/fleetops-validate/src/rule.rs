//! Field rules and ruleset evaluation
//!
//! A ruleset is a flat table of field rules. Evaluation runs every rule and
//! collects every violation — it never stops at the first bad field — and on
//! success hands back a normalized copy of the payload: blank strings become
//! nulls and per-kind defaults fill absent optional foreign keys.

use fleetops_types::{not_after, parse_form_date, FieldErrors, Payload};
use serde_json::Value;

/// What a single rule checks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Check {
    /// The field must be present and non-blank.
    Required,
    /// When present, the field must be at least this many characters
    /// (digits, for numeric fields).
    MinLen(usize),
    /// Required unless the named peer field equals the given value.
    RequiredUnless { peer: &'static str, equals: i64 },
    /// Required when the named peer field equals the given value.
    RequiredIf { peer: &'static str, equals: i64 },
    /// When both fields are present and parse, this one must not be later
    /// than the named peer.
    NotAfter { peer: &'static str },
    /// When present, the field must parse in the form date-time
    /// representation.
    ValidDateTime,
}

/// One rule of a ruleset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldRule {
    pub field: &'static str,
    pub check: Check,
    pub message: &'static str,
}

impl FieldRule {
    pub const fn new(field: &'static str, check: Check, message: &'static str) -> Self {
        Self {
            field,
            check,
            message,
        }
    }

    pub const fn required(field: &'static str, message: &'static str) -> Self {
        Self::new(field, Check::Required, message)
    }

    pub const fn min_len(field: &'static str, len: usize, message: &'static str) -> Self {
        Self::new(field, Check::MinLen(len), message)
    }
}

/// A named table of field rules plus normalization defaults.
#[derive(Clone, Debug)]
pub struct Ruleset {
    pub name: &'static str,
    rules: Vec<FieldRule>,
    defaults: Vec<(&'static str, Value)>,
}

impl Ruleset {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            rules: Vec::new(),
            defaults: Vec::new(),
        }
    }

    pub fn with_rule(mut self, rule: FieldRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_rules(mut self, rules: impl IntoIterator<Item = FieldRule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Default applied to an absent or blank field during normalization.
    pub fn with_default(mut self, field: &'static str, value: Value) -> Self {
        self.defaults.push((field, value));
        self
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    /// Fields this ruleset marks `Required`.
    pub fn required_fields(&self) -> Vec<&'static str> {
        self.rules
            .iter()
            .filter(|rule| matches!(rule.check, Check::Required))
            .map(|rule| rule.field)
            .collect()
    }

    /// Run every rule against `input`. Returns the normalized payload, or
    /// the complete set of field violations.
    pub fn validate(&self, input: &Payload) -> Result<Payload, FieldErrors> {
        let mut errors = FieldErrors::new();

        for rule in &self.rules {
            let value = input.get(rule.field);
            let violated = match rule.check {
                Check::Required => !is_present(value),
                Check::MinLen(len) => is_present(value) && rendered_len(value) < len,
                Check::RequiredUnless { peer, equals } => {
                    !peer_equals(input, peer, equals) && !is_present(value)
                }
                Check::RequiredIf { peer, equals } => {
                    peer_equals(input, peer, equals) && !is_present(value)
                }
                Check::NotAfter { peer } => match (as_str(value), as_str(input.get(peer))) {
                    (Some(this), Some(other)) => !not_after(this, other),
                    _ => false,
                },
                Check::ValidDateTime => match as_str(value) {
                    Some(text) => parse_form_date(text).is_none(),
                    None => false,
                },
            };
            if violated {
                errors.push(rule.field, rule.message);
            }
        }

        if errors.is_empty() {
            Ok(self.normalize(input))
        } else {
            Err(errors)
        }
    }

    fn normalize(&self, input: &Payload) -> Payload {
        let mut normalized = Payload::new();
        for (field, value) in input {
            let value = match value {
                Value::String(s) if s.trim().is_empty() => Value::Null,
                other => other.clone(),
            };
            normalized.insert(field.clone(), value);
        }
        for (field, default) in &self.defaults {
            let absent = !is_present(normalized.get(*field));
            if absent {
                normalized.insert((*field).to_string(), default.clone());
            }
        }
        normalized
    }
}

/// Present means: there, non-null, and not a blank string.
fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

fn as_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.trim().is_empty())
}

fn peer_equals(input: &Payload, peer: &str, equals: i64) -> bool {
    input.get(peer).and_then(Value::as_i64) == Some(equals)
}

/// Character count for strings, digit count for numbers.
fn rendered_len(value: Option<&Value>) -> usize {
    match value {
        Some(Value::String(s)) => s.trim().chars().count(),
        Some(Value::Number(n)) => n.to_string().chars().filter(char::is_ascii_digit).count(),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(entries: &[(&str, Value)]) -> Payload {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    fn ruleset() -> Ruleset {
        Ruleset::new("test")
            .with_rule(FieldRule::required("car", "vehicle is required"))
            .with_rule(FieldRule::required("location", "location is required"))
            .with_rule(FieldRule::min_len(
                "location",
                10,
                "location must be at least 10 characters",
            ))
            .with_rule(FieldRule::new(
                "vehicle_kilometer",
                Check::RequiredUnless {
                    peer: "ro_occurrence_type",
                    equals: 3,
                },
                "vehicle mileage is required",
            ))
            .with_default("direction", json!(0))
    }

    #[test]
    fn test_collects_every_violation() {
        let errors = ruleset().validate(&payload(&[])).unwrap_err();
        // car, location (required), vehicle_kilometer — MinLen stays quiet
        // on an absent field.
        assert_eq!(errors.len(), 3);
        assert!(errors.contains("car"));
        assert!(errors.contains("location"));
        assert!(errors.contains("vehicle_kilometer"));
    }

    #[test]
    fn test_min_len_fires_only_when_present() {
        let errors = ruleset()
            .validate(&payload(&[
                ("car", json!(12)),
                ("location", json!("short")),
                ("vehicle_kilometer", json!(88000)),
            ]))
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.message_for("location"),
            Some("location must be at least 10 characters")
        );
    }

    #[test]
    fn test_conditional_requirement_lifted_by_peer() {
        let normalized = ruleset()
            .validate(&payload(&[
                ("car", json!(12)),
                ("location", json!("Av. Central, 1200 - bay 4")),
                ("ro_occurrence_type", json!(3)),
            ]))
            .unwrap();
        assert_eq!(normalized.get("direction"), Some(&json!(0)));
    }

    #[test]
    fn test_blank_strings_are_absent_and_normalize_to_null() {
        let normalized = ruleset()
            .validate(&payload(&[
                ("car", json!(12)),
                ("location", json!("Av. Central, 1200 - bay 4")),
                ("vehicle_kilometer", json!(1000)),
                ("observation", json!("   ")),
            ]))
            .unwrap();
        assert_eq!(normalized.get("observation"), Some(&Value::Null));
    }

    #[test]
    fn test_not_after_rule() {
        let rules = Ruleset::new("dates").with_rule(FieldRule::new(
            "date_occurrence",
            Check::NotAfter { peer: "date_check" },
            "occurrence date cannot be after the check date",
        ));

        let bad = payload(&[
            ("date_occurrence", json!("05/03/2024")),
            ("date_check", json!("04/03/2024")),
        ]);
        assert!(rules.validate(&bad).is_err());

        let good = payload(&[
            ("date_occurrence", json!("03/03/2024")),
            ("date_check", json!("04/03/2024")),
        ]);
        assert!(rules.validate(&good).is_ok());
    }

    #[test]
    fn test_numeric_min_len_counts_digits() {
        let rules = Ruleset::new("reg").with_rule(FieldRule::min_len(
            "monitor_registration",
            4,
            "registration must have at least 4 digits",
        ));
        assert!(rules
            .validate(&payload(&[("monitor_registration", json!(123))]))
            .is_err());
        assert!(rules
            .validate(&payload(&[("monitor_registration", json!(4511))]))
            .is_ok());
    }
}
