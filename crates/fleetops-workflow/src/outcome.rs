//! Apply inputs and outcomes
//!
//! `ApplyInput` is what the caller hands an orchestrator alongside the
//! action; `Outcome` is what a successful apply reports back — the new
//! record state plus the UI side effects to run.

use fleetops_engine::TreatmentsState;
use fleetops_types::{DepartmentId, Payload, Record, UserId};

/// Target of an assign/forward, as selected by the caller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AssignTarget {
    pub user: UserId,
    pub department: DepartmentId,
}

/// Caller-supplied input to one `apply` call.
#[derive(Clone, Debug, Default)]
pub struct ApplyInput {
    /// The form's field payload, keyed by wire names.
    pub fields: Payload,
    /// Unsaved edits are pending in the form.
    pub dirty: bool,
    /// The caller wants to leave the screen after a successful save.
    pub close: bool,
    pub assign_to: Option<AssignTarget>,
    /// SAC only: state of the treatments pane.
    pub treatments: Option<TreatmentsState>,
}

impl ApplyInput {
    pub fn new(fields: Payload) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    pub fn dirty(mut self) -> Self {
        self.dirty = true;
        self
    }

    pub fn closing(mut self) -> Self {
        self.close = true;
        self
    }

    pub fn assigning(mut self, target: AssignTarget) -> Self {
        self.assign_to = Some(target);
        self
    }

    pub fn with_treatments(mut self, treatments: TreatmentsState) -> Self {
        self.treatments = Some(treatments);
        self
    }
}

/// UI follow-ups a successful apply asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SideEffect {
    NavigateBack,
    RefreshList,
    ResetForm,
}

/// Result of a successful apply.
#[derive(Clone, Debug)]
pub struct Outcome {
    /// The record's new state; `None` after deletion.
    pub record: Option<Record>,
    pub side_effects: Vec<SideEffect>,
}

impl Outcome {
    pub fn of(record: Record, side_effects: Vec<SideEffect>) -> Self {
        Self {
            record: Some(record),
            side_effects,
        }
    }

    pub fn removed() -> Self {
        Self {
            record: None,
            side_effects: vec![SideEffect::NavigateBack, SideEffect::RefreshList],
        }
    }
}
