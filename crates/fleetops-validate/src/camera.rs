//! Camera review rulesets
//!
//! One base ruleset, plus the review supplement applied when a record
//! leaves the awaiting-review stage.

use crate::{Check, FieldRule, Ruleset};
use serde_json::Value;

/// Answer code for "is there video?".
pub const HAS_VIDEO: i64 = 1;

pub fn ruleset() -> Ruleset {
    Ruleset::new("camera-review")
        .with_rule(FieldRule::required(
            "monitor_registration",
            "monitor registration is required",
        ))
        .with_rule(FieldRule::min_len(
            "monitor_registration",
            4,
            "monitor registration must have at least 4 digits",
        ))
        .with_rule(FieldRule::required("car", "vehicle is required"))
        .with_rule(FieldRule::required("date_camera", "entry date is required"))
        .with_rule(FieldRule::required(
            "date_occurrence",
            "occurrence date is required",
        ))
        .with_rule(FieldRule::new(
            "date_occurrence",
            Check::NotAfter { peer: "date_camera" },
            "occurrence date cannot be after the entry date",
        ))
        .with_rule(FieldRule::required(
            "camera_occurrence",
            "occurrence is required",
        ))
        .with_rule(FieldRule::required("camera_status", "status is required"))
        .with_rule(FieldRule::required("there_video", "video answer is required"))
        .with_rule(FieldRule::required("comment", "comment is required"))
        .with_rule(FieldRule::min_len(
            "comment",
            10,
            "comment must be at least 10 characters",
        ))
        .with_default("video_path", Value::Null)
        .with_default("date_review", Value::Null)
        .with_default("reviewed_by", Value::Null)
        .with_default("driver_registration", Value::Null)
        .with_default("ra_globus", Value::Null)
}

/// Extra requirements once the review stage signs off.
pub fn review_supplement() -> Ruleset {
    Ruleset::new("camera-review-signoff")
        .with_rule(FieldRule::required("date_review", "review date is required"))
        .with_rule(FieldRule::new(
            "date_review",
            Check::ValidDateTime,
            "review date is not a valid date",
        ))
        .with_rule(FieldRule::required("reviewed_by", "reviewer is required"))
        .with_rule(FieldRule::new(
            "video_path",
            Check::RequiredIf {
                peer: "there_video",
                equals: HAS_VIDEO,
            },
            "video path is required when video exists",
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
            ("car", json!(315)),
            ("date_camera", json!("10/05/2024")),
            ("date_occurrence", json!("09/05/2024")),
            ("camera_occurrence", json!(4)),
            ("camera_status", json!(1)),
            ("there_video", json!(2)),
            ("comment", json!("passenger complaint at terminal stop")),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    #[test]
    fn test_complete_record_passes() {
        assert!(ruleset().validate(&complete()).is_ok());
    }

    #[test]
    fn test_short_comment_rejected() {
        let mut input = complete();
        input.insert("comment".into(), json!("short"));
        let errors = ruleset().validate(&input).unwrap_err();
        assert!(errors.contains("comment"));
    }

    #[test]
    fn test_video_path_required_only_with_video() {
        let mut input: Payload = Default::default();
        input.insert("date_review".into(), json!("10/05/2024 14:00:00"));
        input.insert("reviewed_by".into(), json!("C. PRADO"));
        input.insert("there_video".into(), json!(HAS_VIDEO));
        let errors = review_supplement().validate(&input).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.contains("video_path"));

        input.insert("there_video".into(), json!(2));
        assert!(review_supplement().validate(&input).is_ok());
    }
}
