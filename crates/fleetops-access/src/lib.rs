//! Access Policy - who may act on a department-owned record
//!
//! Two pure checks gate every workflow action: ordinary department
//! membership ("may this actor edit records owned by department X?") and
//! elevated access ("may this actor approve, finalize, delete, or assign
//! there?"). Both fail closed: an empty membership or grant list means no
//! access, never an error.
//!
//! Every orchestrator calls these identically; no record kind carries its
//! own variant of the check.

#![deny(unsafe_code)]

use fleetops_types::{AccessGrant, Actor, DepartmentId, WorkflowError, WorkflowResult};

/// True iff `target` is one of the actor's departments.
pub fn can_act_on_department(departments: &[DepartmentId], target: DepartmentId) -> bool {
    departments.contains(&target)
}

/// True iff the actor holds an elevated grant (level 1) for `target`.
pub fn has_elevated_access(grants: &[AccessGrant], target: DepartmentId) -> bool {
    grants
        .iter()
        .any(|grant| grant.department == target && grant.is_elevated())
}

/// Membership check as a gate: `Forbidden` when the actor does not belong
/// to the owning department.
pub fn ensure_department(actor: &Actor, target: DepartmentId) -> WorkflowResult<()> {
    if can_act_on_department(&actor.departments, target) {
        Ok(())
    } else {
        Err(WorkflowError::Forbidden(format!(
            "record is owned by department {target}"
        )))
    }
}

/// Elevated-access check as a gate: `Forbidden` when the actor lacks a
/// level-1 grant in the owning department.
pub fn ensure_elevated(actor: &Actor, target: DepartmentId) -> WorkflowResult<()> {
    if has_elevated_access(&actor.access_levels, target) {
        Ok(())
    } else {
        Err(WorkflowError::Forbidden(format!(
            "elevated access in department {target} is required"
        )))
    }
}
