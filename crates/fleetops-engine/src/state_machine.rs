//! Transition planning: the state machine proper
//!
//! `plan` assumes the caller already cleared the access gate and ran the
//! validation selector; it only decides status legality and computes the
//! resulting patch. Every refusal is typed.

use crate::{Action, ActionContext, RecordHead};
use fleetops_types::{
    CameraStatus, DepartmentId, MaintenanceStatus, MonitoringStatus, RecordKind, SacStatus,
    StatusCode, UserId, WorkflowError, WorkflowResult,
};

/// The persisted effect of a legal transition.
#[derive(Clone, Debug, PartialEq)]
pub enum Transition {
    /// A new record enters the kind's initial status.
    Created {
        status: StatusCode,
        department: DepartmentId,
    },
    /// In-place edit; status and ownership unchanged.
    Saved,
    /// Forward move along the kind's path.
    Advanced(StatusPatch),
    /// Backward move to the previous stage.
    Returned(StatusPatch),
    /// Reassignment without a status change.
    Assigned(StatusPatch),
    /// Hard delete.
    Removed,
}

/// Field changes a status action persists. `None` means unchanged.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusPatch {
    pub status: StatusCode,
    pub department: Option<DepartmentId>,
    pub holder: Option<UserId>,
    /// Stamp the acting user's registration as approver.
    pub stamp_approver: bool,
}

impl StatusPatch {
    fn to(status: StatusCode) -> Self {
        Self {
            status,
            department: None,
            holder: None,
            stamp_approver: false,
        }
    }
}

/// Plans transitions for every record kind.
#[derive(Clone, Debug, Default)]
pub struct TransitionEngine;

impl TransitionEngine {
    pub fn new() -> Self {
        Self
    }

    /// Decide whether `action` is legal from the record's current status
    /// and compute the patch to persist.
    pub fn plan(
        &self,
        head: &RecordHead,
        action: Action,
        ctx: &ActionContext,
    ) -> WorkflowResult<Transition> {
        match action {
            Action::Create => self.plan_create(head),
            Action::Save => self.plan_save(head),
            Action::Approve => self.plan_approve(head, ctx),
            Action::Return => self.plan_return(head),
            Action::Assign => self.plan_assign(head, ctx),
            Action::Delete => self.plan_delete(head),
        }
    }

    fn plan_create(&self, head: &RecordHead) -> WorkflowResult<Transition> {
        if head.id.is_some() {
            return Err(WorkflowError::InvalidTransition(
                "record has already been created".into(),
            ));
        }
        Ok(Transition::Created {
            status: head.kind.initial_status(),
            department: head.department,
        })
    }

    fn plan_save(&self, head: &RecordHead) -> WorkflowResult<Transition> {
        self.require_open(head)?;
        Ok(Transition::Saved)
    }

    fn plan_approve(&self, head: &RecordHead, ctx: &ActionContext) -> WorkflowResult<Transition> {
        self.require_open(head)?;

        let patch = match head.kind {
            RecordKind::Maintenance => {
                if ctx.dirty {
                    return Err(WorkflowError::StaleEdit);
                }
                MaintenanceStatus::from_code(head.status)?;
                let mut patch = StatusPatch::to(MaintenanceStatus::Approved.code());
                patch.stamp_approver = true;
                patch
            }

            RecordKind::Monitoring => {
                // Terminal was guarded above, so only the two open stages
                // remain.
                let status = MonitoringStatus::from_code(head.status)?;
                let next = if ctx.no_occurrence {
                    MonitoringStatus::Completed
                } else {
                    match status {
                        MonitoringStatus::AwaitingMonitoring => MonitoringStatus::AwaitingInspector,
                        _ => MonitoringStatus::Completed,
                    }
                };
                StatusPatch::to(next.code())
            }

            RecordKind::CameraReview => {
                let status = CameraStatus::from_code(head.status)?;
                let next = match status {
                    CameraStatus::AwaitingMonitoring => CameraStatus::AwaitingReview,
                    CameraStatus::AwaitingReview if ctx.needs_cut => CameraStatus::AwaitingCut,
                    CameraStatus::AwaitingReview => CameraStatus::Finished,
                    _ => CameraStatus::Finished,
                };
                StatusPatch::to(next.code())
            }

            RecordKind::Sac => match SacStatus::from_code(head.status)? {
                SacStatus::New => {
                    if ctx.dirty {
                        return Err(WorkflowError::StaleEdit);
                    }
                    let assignment = ctx.assignment.as_ref().ok_or_else(|| {
                        WorkflowError::field("assign_to", "an assignee must be selected")
                    })?;
                    let mut patch = StatusPatch::to(SacStatus::InAttention.code());
                    patch.department = Some(assignment.department);
                    patch.holder = Some(assignment.user);
                    patch
                }
                SacStatus::InAttention => {
                    let treatments = ctx.treatments.unwrap_or_default();
                    if treatments.pending_edit {
                        return Err(WorkflowError::StaleEdit);
                    }
                    if treatments.recorded == 0 || treatments.any_blank {
                        return Err(WorkflowError::field(
                            "treatments",
                            "the ticket has no recorded treatments, or a blank one",
                        ));
                    }
                    let assignment = ctx.assignment.as_ref().ok_or_else(|| {
                        WorkflowError::field("assign_to", "an assignee must be selected")
                    })?;
                    let mut patch = StatusPatch::to(SacStatus::Resolved.code());
                    patch.department = Some(assignment.department);
                    patch.holder = Some(assignment.user);
                    patch
                }
                SacStatus::Resolved => {
                    return Err(WorkflowError::InvalidTransition(
                        "ticket is already resolved".into(),
                    ))
                }
            },

            RecordKind::OccurrenceReport => {
                if ctx.dirty {
                    return Err(WorkflowError::StaleEdit);
                }
                StatusPatch::to(fleetops_types::RoStatus::Closed.code())
            }
        };

        Ok(Transition::Advanced(patch))
    }

    fn plan_return(&self, head: &RecordHead) -> WorkflowResult<Transition> {
        self.require_open(head)?;
        if head.is_first_stage() {
            return Err(WorkflowError::InvalidTransition(
                "record is already at its first stage".into(),
            ));
        }

        // First stage and terminal were guarded above; what remains is a
        // middle stage with a well-defined predecessor.
        let previous = match head.kind {
            RecordKind::Monitoring => {
                MonitoringStatus::from_code(head.status)?;
                MonitoringStatus::AwaitingMonitoring.code()
            }
            RecordKind::CameraReview => {
                let status = CameraStatus::from_code(head.status)?;
                match status {
                    CameraStatus::AwaitingCut => CameraStatus::AwaitingReview.code(),
                    _ => CameraStatus::AwaitingMonitoring.code(),
                }
            }
            kind => {
                return Err(WorkflowError::InvalidTransition(format!(
                    "{kind} records do not support return"
                )))
            }
        };

        Ok(Transition::Returned(StatusPatch::to(previous)))
    }

    fn plan_assign(&self, head: &RecordHead, ctx: &ActionContext) -> WorkflowResult<Transition> {
        self.require_open(head)?;
        if head.kind != RecordKind::OccurrenceReport {
            return Err(WorkflowError::InvalidTransition(format!(
                "{} records do not support assign",
                head.kind
            )));
        }
        let assignment = ctx
            .assignment
            .as_ref()
            .ok_or_else(|| WorkflowError::field("assign_to", "an assignee must be selected"))?;
        if head.department == fleetops_types::MAINTENANCE && !ctx.response_recorded {
            return Err(WorkflowError::field(
                "occurrence_response",
                "maintenance must answer the occurrence before reassigning",
            ));
        }

        let mut patch = StatusPatch::to(head.status);
        patch.department = Some(assignment.department);
        patch.holder = Some(assignment.user);
        Ok(Transition::Assigned(patch))
    }

    fn plan_delete(&self, head: &RecordHead) -> WorkflowResult<Transition> {
        head.id
            .ok_or_else(|| WorkflowError::InvalidTransition("record has not been created yet".into()))?;
        if !head.is_first_stage() {
            return Err(WorkflowError::InvalidTransition(
                "only records at their first stage can be deleted".into(),
            ));
        }
        Ok(Transition::Removed)
    }

    fn require_open(&self, head: &RecordHead) -> WorkflowResult<()> {
        if head.is_terminal() {
            return Err(WorkflowError::InvalidTransition(format!(
                "{} record {} is closed",
                head.kind,
                head.id.map(|id| id.to_string()).unwrap_or_else(|| "?".into())
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Assignment;
    use fleetops_types::{
        RecordId, Registration, DISPATCH, MAINTENANCE, MONITORING,
    };

    fn head(kind: RecordKind, status: u8, department: DepartmentId) -> RecordHead {
        RecordHead {
            kind,
            id: Some(RecordId(7)),
            status: StatusCode(status),
            department,
            holder: Some(UserId(3)),
            created_by: Registration(4511),
        }
    }

    fn engine() -> TransitionEngine {
        TransitionEngine::new()
    }

    #[test]
    fn test_maintenance_approve_jumps_to_approved() {
        let plan = engine()
            .plan(
                &head(RecordKind::Maintenance, 1, MAINTENANCE),
                Action::Approve,
                &ActionContext::new(),
            )
            .unwrap();
        match plan {
            Transition::Advanced(patch) => {
                assert_eq!(patch.status, StatusCode(4));
                assert_eq!(patch.department, None);
                assert!(patch.stamp_approver);
            }
            other => panic!("unexpected plan: {other:?}"),
        }
    }

    #[test]
    fn test_dirty_form_blocks_status_only_approvals() {
        let ctx = ActionContext::new().with_dirty(true);
        for (kind, dept) in [
            (RecordKind::Maintenance, MAINTENANCE),
            (RecordKind::OccurrenceReport, DISPATCH),
        ] {
            let err = engine().plan(&head(kind, 1, dept), Action::Approve, &ctx).unwrap_err();
            assert!(matches!(err, WorkflowError::StaleEdit));
        }
    }

    #[test]
    fn test_monitoring_advances_one_stage() {
        let plan = engine()
            .plan(
                &head(RecordKind::Monitoring, 1, MONITORING),
                Action::Approve,
                &ActionContext::new(),
            )
            .unwrap();
        assert_eq!(plan, Transition::Advanced(StatusPatch::to(StatusCode(2))));
    }

    #[test]
    fn test_monitoring_no_occurrence_jumps_to_terminal() {
        let ctx = ActionContext::new().with_no_occurrence(true);
        let plan = engine()
            .plan(&head(RecordKind::Monitoring, 1, MONITORING), Action::Approve, &ctx)
            .unwrap();
        assert_eq!(plan, Transition::Advanced(StatusPatch::to(StatusCode(3))));
    }

    #[test]
    fn test_camera_skips_cut_stage_without_flag() {
        let plain = engine()
            .plan(
                &head(RecordKind::CameraReview, 2, fleetops_types::CAMERA_REVIEW),
                Action::Approve,
                &ActionContext::new(),
            )
            .unwrap();
        assert_eq!(plain, Transition::Advanced(StatusPatch::to(StatusCode(4))));

        let flagged = engine()
            .plan(
                &head(RecordKind::CameraReview, 2, fleetops_types::CAMERA_REVIEW),
                Action::Approve,
                &ActionContext::new().with_needs_cut(true),
            )
            .unwrap();
        assert_eq!(flagged, Transition::Advanced(StatusPatch::to(StatusCode(3))));
    }

    #[test]
    fn test_sac_forward_requires_assignee() {
        let err = engine()
            .plan(&head(RecordKind::Sac, 1, MAINTENANCE), Action::Approve, &ActionContext::new())
            .unwrap_err();
        match err {
            WorkflowError::Validation(errors) => assert!(errors.contains("assign_to")),
            other => panic!("unexpected error: {other:?}"),
        }

        let ctx = ActionContext::new()
            .with_assignment(Assignment::new(UserId(9), DISPATCH, "J. Lima (88)"));
        let plan = engine()
            .plan(&head(RecordKind::Sac, 1, MAINTENANCE), Action::Approve, &ctx)
            .unwrap();
        match plan {
            Transition::Advanced(patch) => {
                assert_eq!(patch.status, StatusCode(2));
                assert_eq!(patch.department, Some(DISPATCH));
                assert_eq!(patch.holder, Some(UserId(9)));
            }
            other => panic!("unexpected plan: {other:?}"),
        }
    }

    #[test]
    fn test_sac_resolve_requires_treatments() {
        let base = ActionContext::new()
            .with_assignment(Assignment::new(UserId(3), MAINTENANCE, "Ana (4511)"));

        let err = engine()
            .plan(&head(RecordKind::Sac, 2, MAINTENANCE), Action::Approve, &base.clone())
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));

        let pending = base.clone().with_treatments(crate::TreatmentsState {
            recorded: 2,
            any_blank: false,
            pending_edit: true,
        });
        let err = engine()
            .plan(&head(RecordKind::Sac, 2, MAINTENANCE), Action::Approve, &pending)
            .unwrap_err();
        assert!(matches!(err, WorkflowError::StaleEdit));

        let ok = base.with_treatments(crate::TreatmentsState {
            recorded: 2,
            any_blank: false,
            pending_edit: false,
        });
        let plan = engine()
            .plan(&head(RecordKind::Sac, 2, MAINTENANCE), Action::Approve, &ok)
            .unwrap();
        assert!(matches!(
            plan,
            Transition::Advanced(StatusPatch {
                status: StatusCode(3),
                ..
            })
        ));
    }

    #[test]
    fn test_return_walks_back_one_stage() {
        let plan = engine()
            .plan(
                &head(RecordKind::Monitoring, 2, MONITORING),
                Action::Return,
                &ActionContext::new(),
            )
            .unwrap();
        assert_eq!(plan, Transition::Returned(StatusPatch::to(StatusCode(1))));

        let err = engine()
            .plan(
                &head(RecordKind::Monitoring, 1, MONITORING),
                Action::Return,
                &ActionContext::new(),
            )
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition(_)));
    }

    #[test]
    fn test_ro_assign_keeps_status_and_moves_ownership() {
        let ctx = ActionContext::new()
            .with_assignment(Assignment::new(UserId(12), MAINTENANCE, "R. Costa (901)"));
        let plan = engine()
            .plan(&head(RecordKind::OccurrenceReport, 1, DISPATCH), Action::Assign, &ctx)
            .unwrap();
        match plan {
            Transition::Assigned(patch) => {
                assert_eq!(patch.status, StatusCode(1));
                assert_eq!(patch.department, Some(MAINTENANCE));
            }
            other => panic!("unexpected plan: {other:?}"),
        }
    }

    #[test]
    fn test_ro_assign_from_maintenance_needs_response() {
        let ctx = ActionContext::new()
            .with_assignment(Assignment::new(UserId(12), DISPATCH, "R. Costa (901)"));
        let err = engine()
            .plan(
                &head(RecordKind::OccurrenceReport, 1, MAINTENANCE),
                Action::Assign,
                &ctx.clone(),
            )
            .unwrap_err();
        match err {
            WorkflowError::Validation(errors) => assert!(errors.contains("occurrence_response")),
            other => panic!("unexpected error: {other:?}"),
        }

        let ctx = ctx.with_response_recorded(true);
        assert!(engine()
            .plan(
                &head(RecordKind::OccurrenceReport, 1, MAINTENANCE),
                Action::Assign,
                &ctx,
            )
            .is_ok());
    }

    #[test]
    fn test_delete_only_from_first_stage() {
        for (kind, status, dept) in [
            (RecordKind::Monitoring, 2, MONITORING),
            (RecordKind::Sac, 2, MAINTENANCE),
            (RecordKind::CameraReview, 3, fleetops_types::CAMERA_REVIEW),
        ] {
            let err = engine()
                .plan(&head(kind, status, dept), Action::Delete, &ActionContext::new())
                .unwrap_err();
            assert!(matches!(err, WorkflowError::InvalidTransition(_)));
        }

        assert_eq!(
            engine()
                .plan(
                    &head(RecordKind::Monitoring, 1, MONITORING),
                    Action::Delete,
                    &ActionContext::new(),
                )
                .unwrap(),
            Transition::Removed
        );
    }

    #[test]
    fn test_terminal_records_accept_nothing() {
        let closed = head(RecordKind::OccurrenceReport, 2, DISPATCH);
        for action in [Action::Save, Action::Approve, Action::Assign] {
            let err = engine().plan(&closed, action, &ActionContext::new()).unwrap_err();
            assert!(matches!(err, WorkflowError::InvalidTransition(_)));
        }
    }

    #[test]
    fn test_create_assigns_initial_status() {
        let draft = RecordHead {
            kind: RecordKind::Sac,
            id: None,
            status: StatusCode(1),
            department: MAINTENANCE,
            holder: None,
            created_by: Registration(4511),
        };
        let plan = engine().plan(&draft, Action::Create, &ActionContext::new()).unwrap();
        assert_eq!(
            plan,
            Transition::Created {
                status: StatusCode(1),
                department: MAINTENANCE,
            }
        );

        let already = head(RecordKind::Sac, 1, MAINTENANCE);
        assert!(engine()
            .plan(&already, Action::Create, &ActionContext::new())
            .is_err());
    }
}
