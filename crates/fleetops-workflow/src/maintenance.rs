//! Maintenance request workflow
//!
//! Requests live in the maintenance department from creation to approval.
//! Approval is a status-only patch that closes the request and stamps the
//! approver; there is no return or assignment.

use crate::orchestrator::{
    enforce_gate, list_records, load_record, push_audit, record_from_payload, save_effects,
    stamp, validate_all, Services,
};
use crate::{ApplyInput, ListFilter, Outcome, SideEffect};
use chrono::Utc;
use fleetops_engine::{gate_for, Action, ActionContext, RecordHead, Transition, TransitionEngine};
use fleetops_types::{
    Actor, Payload, Record, RecordId, RecordKind, ReferenceKey, WorkflowError, WorkflowResult,
    MAINTENANCE,
};
use fleetops_validate::{select_ruleset, Operation};
use serde_json::{json, Value};
use tracing::{info, warn};

const KIND: RecordKind = RecordKind::Maintenance;

const WARM_KEYS: &[ReferenceKey] = &[
    ReferenceKey::MaintenanceTypes,
    ReferenceKey::MaintenanceDetails,
    ReferenceKey::MaintenanceStatuses,
    ReferenceKey::Vehicles,
];

pub struct MaintenanceWorkflow {
    services: Services,
    engine: TransitionEngine,
}

impl MaintenanceWorkflow {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            engine: TransitionEngine::new(),
        }
    }

    /// A blank request for the form, owned by maintenance.
    pub fn draft(&self, actor: &Actor) -> Record {
        Record::draft(KIND, MAINTENANCE, actor.registration)
    }

    pub async fn load(&self, id: RecordId) -> WorkflowResult<Record> {
        self.services.warm(WARM_KEYS).await?;
        load_record(&self.services, KIND, id).await
    }

    pub async fn list(&self, filter: &ListFilter) -> WorkflowResult<Vec<Record>> {
        list_records(&self.services, KIND, filter).await
    }

    pub async fn apply(
        &self,
        record: &Record,
        action: Action,
        input: ApplyInput,
        actor: &Actor,
    ) -> WorkflowResult<Outcome> {
        match self.apply_inner(record, action, input, actor).await {
            Ok(outcome) => {
                info!(kind = %KIND, %action, id = ?record.id, "transition applied");
                Ok(outcome)
            }
            Err(error) => {
                warn!(kind = %KIND, %action, id = ?record.id, %error, "transition rejected");
                Err(error)
            }
        }
    }

    async fn apply_inner(
        &self,
        record: &Record,
        action: Action,
        input: ApplyInput,
        actor: &Actor,
    ) -> WorkflowResult<Outcome> {
        let now = Utc::now();
        let head = RecordHead::of(record);

        let gate = gate_for(&head, action)?;
        enforce_gate(&gate, &head, actor)?;

        let validated = if action == Action::Delete {
            Payload::new()
        } else {
            let operation = if record.id.is_none() {
                Operation::Create
            } else {
                Operation::Update
            };
            let ruleset = select_ruleset(KIND, operation, None)?;
            validate_all(&ruleset, None, &input.fields)?
        };

        let ctx = ActionContext::new().with_dirty(input.dirty);
        match self.engine.plan(&head, action, &ctx)? {
            Transition::Created { status, .. } => {
                let mut payload = validated;
                payload.insert("status".into(), json!(status.0));
                payload.insert("registration_source".into(), json!(actor.registration.0));
                stamp(&mut payload, "created_at", now);
                payload.insert("updated_at".into(), Value::Null);

                let persisted = self.services.records.create(KIND, payload).await?;
                let mut created = record_from_payload(KIND, persisted)?;
                push_audit(&mut created, "request created", actor, now);
                Ok(Outcome::of(created, save_effects(true, input.close)))
            }

            Transition::Saved => {
                let id = record.require_id()?;
                let mut payload = validated;
                payload.remove("created_at");
                stamp(&mut payload, "updated_at", now);

                let persisted = self.services.records.update(KIND, id, payload).await?;
                let mut saved = record_from_payload(KIND, persisted)?;
                saved.audit = record.audit.clone();
                push_audit(&mut saved, "request saved", actor, now);
                Ok(Outcome::of(saved, save_effects(false, input.close)))
            }

            Transition::Advanced(patch) => {
                let id = record.require_id()?;
                let mut body = Payload::new();
                body.insert("status".into(), json!(patch.status.0));
                if patch.stamp_approver {
                    body.insert("approver".into(), json!(actor.registration.0));
                }
                stamp(&mut body, "updated_at", now);
                self.services.records.patch(KIND, id, body).await?;

                let mut approved = record.clone().with_status(patch.status);
                approved.updated_at = Some(now);
                push_audit(&mut approved, "request approved", actor, now);
                Ok(Outcome::of(approved, vec![SideEffect::NavigateBack]))
            }

            Transition::Removed => {
                self.services.records.delete(KIND, record.require_id()?).await?;
                Ok(Outcome::removed())
            }

            Transition::Returned(_) | Transition::Assigned(_) => Err(
                WorkflowError::InvalidTransition(
                    "maintenance requests do not support this action".into(),
                ),
            ),
        }
    }
}
