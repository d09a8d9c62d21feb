//! Access gates: who may perform an action on a record
//!
//! The engine names the gate; the orchestrator clears it with the Access
//! Policy before any validation runs. Gates are data, not checks — the
//! engine never sees the actor.

use crate::{Action, RecordHead};
use fleetops_types::{DepartmentId, RecordKind, SacStatus, WorkflowError, WorkflowResult, DISPATCH};

/// The access requirements of one action on one record.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Gate {
    /// Actor must belong to this department.
    pub membership: Option<DepartmentId>,
    /// Actor must hold an elevated grant in this department.
    pub elevated: Option<DepartmentId>,
    /// Actor must be the user currently holding the record.
    pub holder_match: bool,
    /// A creator-registration match may stand in for the elevated grant
    /// (deletion of own first-stage records).
    pub creator_override: bool,
}

impl Gate {
    pub fn open() -> Self {
        Self::default()
    }

    pub fn membership(department: DepartmentId) -> Self {
        Self {
            membership: Some(department),
            ..Self::default()
        }
    }

    pub fn elevated(department: DepartmentId) -> Self {
        Self {
            elevated: Some(department),
            ..Self::default()
        }
    }

    pub fn and_membership(mut self, department: DepartmentId) -> Self {
        self.membership = Some(department);
        self
    }

    pub fn and_elevated(mut self, department: DepartmentId) -> Self {
        self.elevated = Some(department);
        self
    }

    pub fn and_holder_match(mut self) -> Self {
        self.holder_match = true;
        self
    }

    pub fn with_creator_override(mut self) -> Self {
        self.creator_override = true;
        self
    }
}

/// Resolve the gate for `action` on the record described by `head`.
///
/// Unsupported kind/action pairs are invalid transitions, not forbidden
/// ones: no actor could ever perform them.
pub fn gate_for(head: &RecordHead, action: Action) -> WorkflowResult<Gate> {
    let kind = head.kind;
    match action {
        Action::Create | Action::Save => Ok(save_gate(head)),

        Action::Approve => match kind {
            RecordKind::Maintenance => Ok(Gate::elevated(head.department)),
            RecordKind::Monitoring | RecordKind::CameraReview => {
                Ok(Gate::elevated(head.department))
            }
            RecordKind::Sac => {
                if head.status == SacStatus::InAttention.code() {
                    Ok(Gate::elevated(head.department).and_holder_match())
                } else {
                    Ok(Gate::elevated(head.department).and_membership(head.department))
                }
            }
            RecordKind::OccurrenceReport => {
                Ok(Gate::elevated(head.department).and_membership(DISPATCH))
            }
        },

        Action::Return => match kind {
            RecordKind::Monitoring | RecordKind::CameraReview => {
                Ok(Gate::elevated(head.department))
            }
            _ => Err(unsupported(kind, action)),
        },

        Action::Assign => match kind {
            RecordKind::OccurrenceReport => Ok(Gate::membership(head.department)),
            _ => Err(unsupported(kind, action)),
        },

        Action::Delete => Ok(Gate::elevated(head.department).with_creator_override()),
    }
}

fn save_gate(head: &RecordHead) -> Gate {
    match head.kind {
        // Maintenance, monitoring, and SAC edits are compliance-weighted:
        // ordinary membership is not enough.
        RecordKind::Maintenance | RecordKind::Monitoring | RecordKind::Sac => {
            Gate::elevated(head.department)
        }
        RecordKind::CameraReview | RecordKind::OccurrenceReport => {
            Gate::membership(head.department)
        }
    }
}

fn unsupported(kind: RecordKind, action: Action) -> WorkflowError {
    WorkflowError::InvalidTransition(format!("{kind} records do not support {action}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetops_types::{RecordKind, Registration, StatusCode, MAINTENANCE, MONITORING};

    fn head(kind: RecordKind, status: u8, department: DepartmentId) -> RecordHead {
        RecordHead {
            kind,
            id: Some(fleetops_types::RecordId(1)),
            status: StatusCode(status),
            department,
            holder: None,
            created_by: Registration(4511),
        }
    }

    #[test]
    fn test_ro_finalize_needs_dispatch_membership_and_local_elevation() {
        let head = head(RecordKind::OccurrenceReport, 1, MAINTENANCE);
        let gate = gate_for(&head, Action::Approve).unwrap();
        assert_eq!(gate.membership, Some(DISPATCH));
        assert_eq!(gate.elevated, Some(MAINTENANCE));
    }

    #[test]
    fn test_sac_resolve_requires_holder() {
        let head1 = head(RecordKind::Sac, 2, MAINTENANCE);
        let gate = gate_for(&head1, Action::Approve).unwrap();
        assert!(gate.holder_match);
        assert_eq!(gate.elevated, Some(MAINTENANCE));

        let head2 = head(RecordKind::Sac, 1, MAINTENANCE);
        let gate = gate_for(&head2, Action::Approve).unwrap();
        assert!(!gate.holder_match);
        assert_eq!(gate.membership, Some(MAINTENANCE));
    }

    #[test]
    fn test_delete_allows_creator_override() {
        let head = head(RecordKind::Monitoring, 1, MONITORING);
        let gate = gate_for(&head, Action::Delete).unwrap();
        assert!(gate.creator_override);
        assert_eq!(gate.elevated, Some(MONITORING));
    }

    #[test]
    fn test_unsupported_pairs_are_invalid_transitions() {
        let head = head(RecordKind::Maintenance, 1, MAINTENANCE);
        assert!(matches!(
            gate_for(&head, Action::Return),
            Err(WorkflowError::InvalidTransition(_))
        ));
        assert!(matches!(
            gate_for(&head, Action::Assign),
            Err(WorkflowError::InvalidTransition(_))
        ));
    }
}
