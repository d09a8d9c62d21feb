//! Shared orchestration plumbing
//!
//! The per-kind orchestrators all sequence the same pipeline — access gate,
//! validation to completion, transition plan, persistence — over the same
//! collaborator bundle. The pieces they share live here.

use crate::{ListFilter, RecordGateway, ReferenceGateway, SideEffect};
use chrono::{DateTime, Utc};
use fleetops_engine::Gate;
use fleetops_engine::RecordHead;
use fleetops_store::{ReferenceCache, SessionStore};
use fleetops_types::{
    Actor, AuditEntry, DepartmentId, FieldErrors, Payload, Record, RecordId, RecordKind,
    ReferenceKey, Registration, StatusCode, UserId, WorkflowError, WorkflowResult,
};
use fleetops_validate::Ruleset;
use serde_json::{json, Value};
use std::sync::Arc;

/// The collaborator bundle every orchestrator runs against.
#[derive(Clone)]
pub struct Services {
    pub records: Arc<dyn RecordGateway>,
    pub references: Arc<dyn ReferenceGateway>,
    pub cache: ReferenceCache,
}

impl Services {
    pub fn new(
        records: Arc<dyn RecordGateway>,
        references: Arc<dyn ReferenceGateway>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            records,
            references,
            cache: ReferenceCache::new(store),
        }
    }

    /// Read a lookup list through the cache, fetching on first miss.
    pub async fn reference(&self, key: ReferenceKey) -> WorkflowResult<Vec<fleetops_types::ReferenceItem>> {
        self.cache
            .get_or_populate(key, || self.references.fetch(key))
            .await
    }

    /// Populate every listed key that is still cold. Awaited sequentially;
    /// a warm key costs nothing.
    pub async fn warm(&self, keys: &[ReferenceKey]) -> WorkflowResult<()> {
        for key in keys {
            self.reference(*key).await?;
        }
        Ok(())
    }
}

/// Clear an engine gate with the access policy. Runs before any validation:
/// a forbidden actor never reaches the validators.
pub(crate) fn enforce_gate(gate: &Gate, head: &RecordHead, actor: &Actor) -> WorkflowResult<()> {
    if let Some(department) = gate.membership {
        fleetops_access::ensure_department(actor, department)?;
    }
    if let Some(department) = gate.elevated {
        let creator_matches = gate.creator_override && actor.registration == head.created_by;
        if !creator_matches {
            fleetops_access::ensure_elevated(actor, department)?;
        }
    }
    if gate.holder_match && head.holder != Some(actor.id) {
        return Err(WorkflowError::Forbidden(
            "only the user holding this record may perform this action".into(),
        ));
    }
    Ok(())
}

/// Run the base ruleset and an optional stage supplement, collecting every
/// violation from both before failing.
pub(crate) fn validate_all(
    base: &Ruleset,
    supplement: Option<&Ruleset>,
    fields: &Payload,
) -> WorkflowResult<Payload> {
    let mut errors = FieldErrors::new();
    let validated = match base.validate(fields) {
        Ok(validated) => Some(validated),
        Err(base_errors) => {
            errors.merge(base_errors);
            None
        }
    };
    if let Some(supplement) = supplement {
        if let Err(supplement_errors) = supplement.validate(fields) {
            errors.merge(supplement_errors);
        }
    }
    if !errors.is_empty() {
        return Err(WorkflowError::Validation(errors));
    }
    Ok(validated.unwrap_or_else(|| fields.clone()))
}

/// Decode a backend record payload into the common envelope.
pub(crate) fn record_from_payload(kind: RecordKind, payload: Payload) -> WorkflowResult<Record> {
    let id = payload
        .get("id")
        .and_then(Value::as_u64)
        .map(RecordId);

    let status = payload
        .get(kind.status_field())
        .and_then(Value::as_u64)
        .map(|code| StatusCode(code as u8))
        .ok_or_else(|| malformed(kind, kind.status_field()))?;
    if !kind.knows_status(status) {
        return Err(WorkflowError::UnknownStatus {
            kind,
            code: status.0,
        });
    }

    let department = match kind.department_field() {
        Some(field) => payload
            .get(field)
            .and_then(Value::as_u64)
            .map(|code| DepartmentId(code as u32))
            .ok_or_else(|| malformed(kind, field))?,
        None => kind
            .home_department()
            .ok_or_else(|| malformed(kind, "department"))?,
    };

    let holder = kind
        .holder_field()
        .and_then(|field| payload.get(field))
        .and_then(Value::as_u64)
        .map(UserId);

    let created_by = payload
        .get(kind.creator_field())
        .and_then(Value::as_u64)
        .map(Registration)
        .unwrap_or(Registration(0));

    let audit = kind
        .audit_field()
        .and_then(|field| payload.get(field))
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| serde_json::from_value::<AuditEntry>(entry.clone()).ok())
                .collect()
        })
        .unwrap_or_default();

    let created_at = timestamp(&payload, "created_at");
    let updated_at = timestamp(&payload, "updated_at");

    Ok(Record {
        kind,
        id,
        status,
        department,
        holder,
        created_by,
        fields: payload,
        audit,
        created_at,
        updated_at,
    })
}

fn timestamp(payload: &Payload, field: &str) -> Option<DateTime<Utc>> {
    payload
        .get(field)
        .and_then(Value::as_str)
        .and_then(|text| DateTime::parse_from_rfc3339(text).ok())
        .map(|parsed| parsed.with_timezone(&Utc))
}

fn malformed(kind: RecordKind, field: &str) -> WorkflowError {
    WorkflowError::Backend(format!("malformed {kind} record: missing {field}"))
}

/// Fetch one record or fail with a typed NotFound.
pub(crate) async fn load_record(
    services: &Services,
    kind: RecordKind,
    id: RecordId,
) -> WorkflowResult<Record> {
    let payload = services
        .records
        .get(kind, id)
        .await?
        .ok_or(WorkflowError::NotFound(id))?;
    record_from_payload(kind, payload)
}

/// Fetch a listing page as decoded records.
pub(crate) async fn list_records(
    services: &Services,
    kind: RecordKind,
    filter: &ListFilter,
) -> WorkflowResult<Vec<Record>> {
    let payloads = services.records.list(kind, filter).await?;
    payloads
        .into_iter()
        .map(|payload| record_from_payload(kind, payload))
        .collect()
}

/// Append one audit entry; history is never rewritten.
pub(crate) fn push_audit(record: &mut Record, action: &str, actor: &Actor, at: DateTime<Utc>) {
    record
        .audit
        .push(AuditEntry::new(action, actor.id, actor.display_name(), at));
}

/// Side effects after a successful save.
pub(crate) fn save_effects(is_new: bool, close: bool) -> Vec<SideEffect> {
    if close {
        vec![SideEffect::NavigateBack]
    } else if is_new {
        vec![SideEffect::ResetForm]
    } else {
        Vec::new()
    }
}

/// Stamp a payload with an RFC 3339 timestamp field.
pub(crate) fn stamp(payload: &mut Payload, field: &str, at: DateTime<Utc>) {
    payload.insert(field.to_string(), json!(at.to_rfc3339()));
}
