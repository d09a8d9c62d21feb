//! Per-kind status enumerations
//!
//! Each record kind carries a small closed set of positive integer statuses
//! mirroring the backend's status reference list, with a fixed forward path
//! and one terminal value. Raw codes cross the wire; the enums give the
//! workflow engine names to reason with.

use crate::{RecordKind, WorkflowError};
use serde::{Deserialize, Serialize};

/// Raw status code as persisted by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StatusCode(pub u8);

impl StatusCode {
    pub const fn code(self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maintenance request lifecycle. Scheduled and InShop appear in the
/// reference list but are not produced by this workflow: approval moves any
/// open request straight to Approved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MaintenanceStatus {
    Awaiting = 1,
    Scheduled = 2,
    InShop = 3,
    Approved = 4,
}

impl MaintenanceStatus {
    pub const fn code(self) -> StatusCode {
        StatusCode(self as u8)
    }

    pub fn from_code(code: StatusCode) -> Result<Self, WorkflowError> {
        match code.0 {
            1 => Ok(Self::Awaiting),
            2 => Ok(Self::Scheduled),
            3 => Ok(Self::InShop),
            4 => Ok(Self::Approved),
            other => Err(WorkflowError::UnknownStatus {
                kind: RecordKind::Maintenance,
                code: other,
            }),
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Self::Approved
    }
}

/// Monitoring occurrence lifecycle: monitor files, inspector verifies,
/// record completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MonitoringStatus {
    AwaitingMonitoring = 1,
    AwaitingInspector = 2,
    Completed = 3,
}

impl MonitoringStatus {
    pub const fn code(self) -> StatusCode {
        StatusCode(self as u8)
    }

    pub fn from_code(code: StatusCode) -> Result<Self, WorkflowError> {
        match code.0 {
            1 => Ok(Self::AwaitingMonitoring),
            2 => Ok(Self::AwaitingInspector),
            3 => Ok(Self::Completed),
            other => Err(WorkflowError::UnknownStatus {
                kind: RecordKind::Monitoring,
                code: other,
            }),
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Self::Completed
    }
}

/// Camera review lifecycle. AwaitingCut is skipped for occurrences that do
/// not require a video cut.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CameraStatus {
    AwaitingMonitoring = 1,
    AwaitingReview = 2,
    AwaitingCut = 3,
    Finished = 4,
}

impl CameraStatus {
    pub const fn code(self) -> StatusCode {
        StatusCode(self as u8)
    }

    pub fn from_code(code: StatusCode) -> Result<Self, WorkflowError> {
        match code.0 {
            1 => Ok(Self::AwaitingMonitoring),
            2 => Ok(Self::AwaitingReview),
            3 => Ok(Self::AwaitingCut),
            4 => Ok(Self::Finished),
            other => Err(WorkflowError::UnknownStatus {
                kind: RecordKind::CameraReview,
                code: other,
            }),
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Self::Finished
    }
}

/// SAC ticket lifecycle: opened, forwarded into attention, resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SacStatus {
    New = 1,
    InAttention = 2,
    Resolved = 3,
}

impl SacStatus {
    pub const fn code(self) -> StatusCode {
        StatusCode(self as u8)
    }

    pub fn from_code(code: StatusCode) -> Result<Self, WorkflowError> {
        match code.0 {
            1 => Ok(Self::New),
            2 => Ok(Self::InAttention),
            3 => Ok(Self::Resolved),
            other => Err(WorkflowError::UnknownStatus {
                kind: RecordKind::Sac,
                code: other,
            }),
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Self::Resolved
    }
}

/// Occurrence report (R.O.) lifecycle: open until dispatch finalizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum RoStatus {
    Open = 1,
    Closed = 2,
}

impl RoStatus {
    pub const fn code(self) -> StatusCode {
        StatusCode(self as u8)
    }

    pub fn from_code(code: StatusCode) -> Result<Self, WorkflowError> {
        match code.0 {
            1 => Ok(Self::Open),
            2 => Ok(Self::Closed),
            other => Err(WorkflowError::UnknownStatus {
                kind: RecordKind::OccurrenceReport,
                code: other,
            }),
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Self::Closed
    }
}

impl RecordKind {
    /// Status assigned to newly created records of this kind.
    pub fn initial_status(self) -> StatusCode {
        match self {
            Self::Maintenance => MaintenanceStatus::Awaiting.code(),
            Self::Monitoring => MonitoringStatus::AwaitingMonitoring.code(),
            Self::CameraReview => CameraStatus::AwaitingMonitoring.code(),
            Self::Sac => SacStatus::New.code(),
            Self::OccurrenceReport => RoStatus::Open.code(),
        }
    }

    /// The first ("awaiting") stage — the only stage records may be deleted
    /// from.
    pub fn first_stage(self) -> StatusCode {
        self.initial_status()
    }

    /// The terminal status for this kind.
    pub fn terminal_status(self) -> StatusCode {
        match self {
            Self::Maintenance => MaintenanceStatus::Approved.code(),
            Self::Monitoring => MonitoringStatus::Completed.code(),
            Self::CameraReview => CameraStatus::Finished.code(),
            Self::Sac => SacStatus::Resolved.code(),
            Self::OccurrenceReport => RoStatus::Closed.code(),
        }
    }

    /// True when `code` is a known status for this kind.
    pub fn knows_status(self, code: StatusCode) -> bool {
        match self {
            Self::Maintenance => MaintenanceStatus::from_code(code).is_ok(),
            Self::Monitoring => MonitoringStatus::from_code(code).is_ok(),
            Self::CameraReview => CameraStatus::from_code(code).is_ok(),
            Self::Sac => SacStatus::from_code(code).is_ok(),
            Self::OccurrenceReport => RoStatus::from_code(code).is_ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        assert_eq!(
            MonitoringStatus::from_code(StatusCode(2)).unwrap(),
            MonitoringStatus::AwaitingInspector
        );
        assert_eq!(MaintenanceStatus::Approved.code(), StatusCode(4));
        assert_eq!(RoStatus::Closed.code(), StatusCode(2));
    }

    #[test]
    fn test_unknown_code_is_typed() {
        let err = SacStatus::from_code(StatusCode(9)).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::UnknownStatus {
                kind: RecordKind::Sac,
                code: 9
            }
        ));
    }

    #[test]
    fn test_terminal_predicates() {
        assert!(CameraStatus::Finished.is_terminal());
        assert!(!CameraStatus::AwaitingCut.is_terminal());
        assert_eq!(RecordKind::Maintenance.terminal_status(), StatusCode(4));
        assert_eq!(RecordKind::OccurrenceReport.initial_status(), StatusCode(1));
    }

    #[test]
    fn test_knows_status() {
        assert!(RecordKind::Monitoring.knows_status(StatusCode(3)));
        assert!(!RecordKind::Monitoring.knows_status(StatusCode(4)));
    }
}
