//! Action vocabulary and the context a transition is planned against

use fleetops_types::{DepartmentId, Record, RecordId, RecordKind, Registration, StatusCode, UserId};

/// The actions every orchestrator speaks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Create,
    Save,
    Approve,
    Return,
    Assign,
    Delete,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Create => "create",
            Self::Save => "save",
            Self::Approve => "approve",
            Self::Return => "return",
            Self::Assign => "assign",
            Self::Delete => "delete",
        };
        write!(f, "{name}")
    }
}

/// The slice of a record the engine reasons about.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RecordHead {
    pub kind: RecordKind,
    pub id: Option<RecordId>,
    pub status: StatusCode,
    pub department: DepartmentId,
    pub holder: Option<UserId>,
    pub created_by: Registration,
}

impl RecordHead {
    pub fn of(record: &Record) -> Self {
        Self {
            kind: record.kind,
            id: record.id,
            status: record.status,
            department: record.department,
            holder: record.holder,
            created_by: record.created_by,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status == self.kind.terminal_status()
    }

    pub fn is_first_stage(&self) -> bool {
        self.status == self.kind.first_stage()
    }
}

/// Target of an assignment or forward.
#[derive(Clone, Debug, PartialEq)]
pub struct Assignment {
    pub user: UserId,
    pub department: DepartmentId,
    pub user_name: String,
    /// Display name of the previous holder, for the audit patch.
    pub previous_name: Option<String>,
}

impl Assignment {
    pub fn new(user: UserId, department: DepartmentId, user_name: impl Into<String>) -> Self {
        Self {
            user,
            department,
            user_name: user_name.into(),
            previous_name: None,
        }
    }

    pub fn with_previous_name(mut self, name: impl Into<String>) -> Self {
        self.previous_name = Some(name.into());
        self
    }
}

/// SAC treatment-pane state, supplied by the caller when resolving.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TreatmentsState {
    pub recorded: usize,
    pub any_blank: bool,
    pub pending_edit: bool,
}

/// Everything the plan step needs beyond the record head. Orchestrators
/// assemble this from the validated payload and the reference cache.
#[derive(Clone, Debug, Default)]
pub struct ActionContext {
    /// Unsaved form edits are pending in the caller's UI.
    pub dirty: bool,
    /// Monitoring: the selected occurrence is the "no occurrence" code.
    pub no_occurrence: bool,
    /// Camera: the selected occurrence requires the video-cut stage.
    pub needs_cut: bool,
    /// R.O. held by maintenance: the occurrence response has been filled.
    pub response_recorded: bool,
    pub assignment: Option<Assignment>,
    pub treatments: Option<TreatmentsState>,
}

impl ActionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dirty(mut self, dirty: bool) -> Self {
        self.dirty = dirty;
        self
    }

    pub fn with_no_occurrence(mut self, no_occurrence: bool) -> Self {
        self.no_occurrence = no_occurrence;
        self
    }

    pub fn with_needs_cut(mut self, needs_cut: bool) -> Self {
        self.needs_cut = needs_cut;
        self
    }

    pub fn with_response_recorded(mut self, recorded: bool) -> Self {
        self.response_recorded = recorded;
        self
    }

    pub fn with_assignment(mut self, assignment: Assignment) -> Self {
        self.assignment = Some(assignment);
        self
    }

    pub fn with_treatments(mut self, treatments: TreatmentsState) -> Self {
        self.treatments = Some(treatments);
        self
    }
}
