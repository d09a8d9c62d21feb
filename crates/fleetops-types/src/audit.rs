//! Audit trail entries
//!
//! Every record carries an append-only history of the actions applied to
//! it. Entries are never rewritten or deleted, terminal status included.

use crate::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One applied action in a record's history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Server-assigned entry id; 0 for entries not yet persisted.
    pub id: u64,
    /// Short description of what was done.
    pub action: String,
    pub user_id: UserId,
    pub user_name: String,
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(
        action: impl Into<String>,
        user_id: UserId,
        user_name: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: 0,
            action: action.into(),
            user_id,
            user_name: user_name.into(),
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_has_no_server_id() {
        let entry = AuditEntry::new("record finalized", UserId(3), "Ana (4511)", Utc::now());
        assert_eq!(entry.id, 0);
        assert_eq!(entry.action, "record finalized");
    }
}
