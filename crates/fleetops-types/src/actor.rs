//! Actor: the logged-in user as seen by the workflow engine
//!
//! The authentication collaborator supplies this shape; the engine never
//! inspects credentials, only the decoded memberships and access grants.

use crate::DepartmentId;
use serde::{Deserialize, Serialize};

/// Server-assigned user id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub u64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Employee registration number (badge).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Registration(pub u64);

impl std::fmt::Display for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A department-scoped permission level held by an actor.
///
/// Level 1 is elevated access: approval, finalization, deletion, and
/// assignment beyond ordinary department editing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGrant {
    pub department: DepartmentId,
    pub level: u8,
}

impl AccessGrant {
    pub const ELEVATED: u8 = 1;

    pub fn new(department: DepartmentId, level: u8) -> Self {
        Self { department, level }
    }

    pub fn elevated(department: DepartmentId) -> Self {
        Self::new(department, Self::ELEVATED)
    }

    pub fn is_elevated(&self) -> bool {
        self.level == Self::ELEVATED
    }
}

/// The logged-in user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
    pub registration: Registration,
    pub name: String,
    /// Departments the actor belongs to. May be empty (no access).
    pub departments: Vec<DepartmentId>,
    /// Department-scoped access grants. May be empty (no elevated access).
    pub access_levels: Vec<AccessGrant>,
}

impl Actor {
    pub fn new(id: UserId, registration: Registration, name: impl Into<String>) -> Self {
        Self {
            id,
            registration,
            name: name.into(),
            departments: Vec::new(),
            access_levels: Vec::new(),
        }
    }

    pub fn with_department(mut self, department: DepartmentId) -> Self {
        self.departments.push(department);
        self
    }

    pub fn with_access(mut self, grant: AccessGrant) -> Self {
        self.access_levels.push(grant);
        self
    }

    /// The actor's primary department, if any. New SAC tickets are pinned
    /// to this department.
    pub fn primary_department(&self) -> Option<DepartmentId> {
        self.departments.first().copied()
    }

    /// Display name in the "NAME (registration)" form used on audit trails
    /// and assignment patches.
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.name, self.registration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MAINTENANCE, MONITORING};

    #[test]
    fn test_actor_builder() {
        let actor = Actor::new(UserId(7), Registration(4511), "Ana Souza")
            .with_department(MAINTENANCE)
            .with_access(AccessGrant::elevated(MAINTENANCE));

        assert_eq!(actor.primary_department(), Some(MAINTENANCE));
        assert!(actor.access_levels[0].is_elevated());
        assert_eq!(actor.display_name(), "Ana Souza (4511)");
    }

    #[test]
    fn test_non_elevated_grant() {
        let grant = AccessGrant::new(MONITORING, 2);
        assert!(!grant.is_elevated());
    }

    #[test]
    fn test_empty_actor_has_no_primary_department() {
        let actor = Actor::new(UserId(1), Registration(1), "x");
        assert_eq!(actor.primary_department(), None);
    }
}
