//! Validation Selector for fleetops
//!
//! Each record kind maps its discriminator to exactly one ruleset: R.O. has
//! six keyed by occurrence-type code, SAC has a create variant and a
//! stricter update superset, and the remaining kinds have one each with a
//! stage supplement that kicks in when a record leaves its verification
//! stage.
//!
//! Rulesets are closed tables resolved once per `validate` call — never
//! runtime-assembled schema objects. Evaluation collects every violation
//! before reporting, and a payload is only ever applied whole.

#![deny(unsafe_code)]

mod rule;

pub mod camera;
pub mod maintenance;
pub mod monitoring;
pub mod ro;
pub mod sac;

pub use rule::{Check, FieldRule, Ruleset};

use fleetops_types::{
    CameraStatus, MonitoringStatus, RecordKind, RoOccurrenceType, StatusCode, WorkflowError,
    WorkflowResult,
};

/// Whether a payload is being created or applied to an existing record.
/// Only SAC distinguishes the two.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
}

/// Resolve the ruleset for a record kind and discriminator.
///
/// R.O. requires a discriminator (the occurrence-type code); the other
/// kinds ignore it.
pub fn select_ruleset(
    kind: RecordKind,
    operation: Operation,
    discriminator: Option<u8>,
) -> WorkflowResult<Ruleset> {
    match kind {
        RecordKind::Maintenance => Ok(maintenance::ruleset()),
        RecordKind::Monitoring => Ok(monitoring::ruleset()),
        RecordKind::CameraReview => Ok(camera::ruleset()),
        RecordKind::Sac => Ok(match operation {
            Operation::Create => sac::create_ruleset(),
            Operation::Update => sac::update_ruleset(),
        }),
        RecordKind::OccurrenceReport => {
            let code = discriminator.ok_or(WorkflowError::UnknownDiscriminator(0))?;
            Ok(ro::ruleset(RoOccurrenceType::from_code(code)?))
        }
    }
}

/// Stage supplement applied when a status action leaves the given stage,
/// if the kind has one.
pub fn supplement_for(kind: RecordKind, status: StatusCode) -> Option<Ruleset> {
    match kind {
        RecordKind::Monitoring
            if status == MonitoringStatus::AwaitingInspector.code() =>
        {
            Some(monitoring::inspector_supplement())
        }
        RecordKind::CameraReview if status == CameraStatus::AwaitingReview.code() => {
            Some(camera::review_supplement())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetops_types::Payload;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_ro_requires_discriminator() {
        let err =
            select_ruleset(RecordKind::OccurrenceReport, Operation::Update, None).unwrap_err();
        assert!(matches!(err, WorkflowError::UnknownDiscriminator(0)));

        let err =
            select_ruleset(RecordKind::OccurrenceReport, Operation::Update, Some(9)).unwrap_err();
        assert!(matches!(err, WorkflowError::UnknownDiscriminator(9)));
    }

    #[test]
    fn test_sac_operation_split() {
        let create = select_ruleset(RecordKind::Sac, Operation::Create, None).unwrap();
        let update = select_ruleset(RecordKind::Sac, Operation::Update, None).unwrap();
        assert_eq!(create.name, "sac-create");
        assert_eq!(update.name, "sac-update");
    }

    #[test]
    fn test_supplements() {
        assert!(supplement_for(RecordKind::Monitoring, StatusCode(2)).is_some());
        assert!(supplement_for(RecordKind::Monitoring, StatusCode(1)).is_none());
        assert!(supplement_for(RecordKind::CameraReview, StatusCode(2)).is_some());
        assert!(supplement_for(RecordKind::Maintenance, StatusCode(2)).is_none());
    }

    proptest! {
        /// Dropping N required fields yields exactly N violations — the
        /// evaluator never stops at the first bad field.
        #[test]
        fn validation_never_fails_fast(mask in proptest::collection::vec(any::<bool>(), 5)) {
            let ruleset = maintenance::ruleset();
            let fields = ["car", "date_maintenance", "types", "details", "status"];
            let mut input = Payload::new();
            let mut kept = 0usize;
            for (field, keep) in fields.iter().zip(&mask) {
                if *keep {
                    input.insert((*field).to_string(), json!(1));
                    kept += 1;
                }
            }
            let missing = fields.len() - kept;
            match ruleset.validate(&input) {
                Ok(_) => prop_assert_eq!(missing, 0),
                Err(errors) => prop_assert_eq!(errors.len(), missing),
            }
        }
    }
}
