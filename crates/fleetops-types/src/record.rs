//! The common record envelope shared by all five kinds
//!
//! Field sets vary per kind, but the shape is structurally identical: a
//! server-assigned id, a status code, an owning department, discriminators,
//! a dynamic field payload, and an append-only audit trail.

use crate::{
    AuditEntry, DepartmentId, Registration, StatusCode, UserId, WorkflowError, CAMERA_REVIEW,
    DISPATCH, MAINTENANCE, MONITORING,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-assigned record id. Absent until the backend persists the record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub u64);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The five record kinds this workflow engine serves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    Maintenance,
    Monitoring,
    CameraReview,
    Sac,
    OccurrenceReport,
}

impl RecordKind {
    /// Name of the payload field carrying this kind's status code.
    pub fn status_field(self) -> &'static str {
        match self {
            Self::Maintenance => "status",
            Self::Monitoring => "monitoring_status",
            Self::CameraReview => "camera_status",
            Self::Sac => "sac_status",
            Self::OccurrenceReport => "ro_status",
        }
    }

    /// Name of the payload field carrying the owning department, for the
    /// kinds that persist it explicitly.
    pub fn department_field(self) -> Option<&'static str> {
        match self {
            Self::Sac => Some("sac_department"),
            Self::OccurrenceReport => Some("ro_department"),
            _ => None,
        }
    }

    /// The fixed owning department, for the kinds that have one. SAC and
    /// R.O. carry theirs in the record instead.
    pub fn home_department(self) -> Option<DepartmentId> {
        match self {
            Self::Maintenance => Some(MAINTENANCE),
            Self::Monitoring => Some(MONITORING),
            Self::CameraReview => Some(CAMERA_REVIEW),
            Self::Sac => None,
            Self::OccurrenceReport => None,
        }
    }

    /// Department that owns newly created records of this kind, when it is
    /// not the creator's own department.
    pub fn creation_department(self) -> Option<DepartmentId> {
        match self {
            Self::OccurrenceReport => Some(DISPATCH),
            _ => self.home_department(),
        }
    }

    /// Name of the payload field carrying the assigned user, for the kinds
    /// that track one.
    pub fn holder_field(self) -> Option<&'static str> {
        match self {
            Self::Sac => Some("sac_user"),
            Self::OccurrenceReport => Some("ro_user"),
            _ => None,
        }
    }

    /// Name of the payload field recording who filed the record.
    pub fn creator_field(self) -> &'static str {
        match self {
            Self::Maintenance => "registration_source",
            _ => "monitor_registration",
        }
    }

    /// Name of the payload field carrying the audit history, for the kinds
    /// that return one.
    pub fn audit_field(self) -> Option<&'static str> {
        match self {
            Self::OccurrenceReport => Some("ro_audit_log"),
            _ => None,
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Maintenance => "maintenance",
            Self::Monitoring => "monitoring",
            Self::CameraReview => "camera-review",
            Self::Sac => "sac",
            Self::OccurrenceReport => "ro",
        };
        write!(f, "{name}")
    }
}

/// Dynamic field payload, as exchanged with the persistence collaborator.
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// A persisted record of any kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub kind: RecordKind,
    /// Absent for records not yet created.
    pub id: Option<RecordId>,
    pub status: StatusCode,
    /// The department currently responsible for acting on this record.
    pub department: DepartmentId,
    /// The user the record is assigned to, where the kind tracks one.
    pub holder: Option<UserId>,
    /// Registration of the employee who filed the record.
    pub created_by: Registration,
    /// Kind-specific fields, keyed by their wire names.
    pub fields: Payload,
    /// Append-only change history.
    pub audit: Vec<AuditEntry>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record {
    /// Start a new, not-yet-persisted record in the kind's initial status.
    pub fn draft(kind: RecordKind, department: DepartmentId, created_by: Registration) -> Self {
        Self {
            kind,
            id: None,
            status: kind.initial_status(),
            department,
            holder: None,
            created_by,
            fields: Payload::new(),
            audit: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with_holder(mut self, holder: UserId) -> Self {
        self.holder = Some(holder);
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.status == self.kind.terminal_status()
    }

    pub fn is_first_stage(&self) -> bool {
        self.status == self.kind.first_stage()
    }

    /// The id, or a typed NotFound-style error for records that were never
    /// persisted.
    pub fn require_id(&self) -> Result<RecordId, WorkflowError> {
        self.id
            .ok_or_else(|| WorkflowError::InvalidTransition("record has not been created yet".into()))
    }

    /// Integer value of a payload field, when present and numeric.
    pub fn field_i64(&self, name: &str) -> Option<i64> {
        self.fields.get(name).and_then(serde_json::Value::as_i64)
    }

    /// String value of a payload field, when present and non-empty.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(serde_json::Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_draft_starts_at_first_stage() {
        let record = Record::draft(RecordKind::Monitoring, MONITORING, Registration(100));
        assert_eq!(record.status, StatusCode(1));
        assert!(record.is_first_stage());
        assert!(record.id.is_none());
        assert!(record.require_id().is_err());
    }

    #[test]
    fn test_field_accessors() {
        let record = Record::draft(RecordKind::OccurrenceReport, DISPATCH, Registration(1))
            .with_field("vehicle_kilometer", json!(123456))
            .with_field("location", json!("Av. Central, 1200 - platform 3"))
            .with_field("observation", json!("   "));

        assert_eq!(record.field_i64("vehicle_kilometer"), Some(123456));
        assert!(record.field_str("location").is_some());
        assert_eq!(record.field_str("observation"), None);
        assert_eq!(record.field_str("missing"), None);
    }

    #[test]
    fn test_kind_wiring() {
        assert_eq!(RecordKind::Sac.status_field(), "sac_status");
        assert_eq!(RecordKind::Sac.department_field(), Some("sac_department"));
        assert_eq!(RecordKind::Sac.home_department(), None);
        assert_eq!(
            RecordKind::OccurrenceReport.creation_department(),
            Some(DISPATCH)
        );
        assert_eq!(RecordKind::Maintenance.home_department(), Some(MAINTENANCE));
    }

    #[test]
    fn test_terminal_detection() {
        let record = Record::draft(RecordKind::OccurrenceReport, DISPATCH, Registration(1))
            .with_status(StatusCode(2));
        assert!(record.is_terminal());
    }
}
