//! Department identity
//!
//! Departments are the owners of workflow stages. The backend identifies
//! them by numeric code; the named constants below cover the departments
//! this workflow routes through.

use serde::{Deserialize, Serialize};

/// Numeric identifier of a department, as assigned by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DepartmentId(pub u32);

impl DepartmentId {
    pub const fn new(code: u32) -> Self {
        Self(code)
    }

    pub const fn code(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for DepartmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Vehicle and driver monitoring.
pub const MONITORING: DepartmentId = DepartmentId(10);

/// Vehicle maintenance; also the maintenance stage of an R.O.
pub const MAINTENANCE: DepartmentId = DepartmentId(14);

/// GPS/dispatch — owns occurrence reports (R.O.).
pub const DISPATCH: DepartmentId = DepartmentId(15);

/// Camera review.
pub const CAMERA_REVIEW: DepartmentId = DepartmentId(16);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_department_codes() {
        assert_eq!(MONITORING.code(), 10);
        assert_eq!(MAINTENANCE.code(), 14);
        assert_eq!(DISPATCH.code(), 15);
        assert_eq!(CAMERA_REVIEW.code(), 16);
        assert_eq!(format!("{}", DISPATCH), "15");
    }
}
