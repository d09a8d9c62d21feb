//! Monitoring occurrence workflow
//!
//! Monitors file occurrences, inspectors verify them. Approval advances one
//! stage — or straight to Completed when the selected occurrence is the "no
//! occurrence" reference code — and returning walks one stage back. The
//! inspector supplement applies whenever a record leaves the
//! awaiting-inspector stage.

use crate::orchestrator::{
    enforce_gate, list_records, load_record, push_audit, record_from_payload, save_effects,
    stamp, validate_all, Services,
};
use crate::{ApplyInput, ListFilter, Outcome, SideEffect};
use chrono::Utc;
use fleetops_engine::{gate_for, Action, ActionContext, RecordHead, Transition, TransitionEngine};
use fleetops_types::{
    Actor, MonitoringStatus, Payload, Record, RecordId, RecordKind, ReferenceKey, WorkflowError,
    WorkflowResult, MONITORING, NO_OCCURRENCE,
};
use fleetops_validate::monitoring as rules;
use serde_json::{json, Value};
use tracing::{info, warn};

const KIND: RecordKind = RecordKind::Monitoring;

const WARM_KEYS: &[ReferenceKey] = &[
    ReferenceKey::MonitoringOccurrenceTypes,
    ReferenceKey::MonitoringOccurrences,
    ReferenceKey::MonitoringStatuses,
    ReferenceKey::Vehicles,
];

/// Fields an inspector's verdict carries back on a return.
const RETURN_FIELDS: &[&str] = &["treatment", "inspector_registration", "date_inspector"];

pub struct MonitoringWorkflow {
    services: Services,
    engine: TransitionEngine,
}

impl MonitoringWorkflow {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            engine: TransitionEngine::new(),
        }
    }

    pub fn draft(&self, actor: &Actor) -> Record {
        Record::draft(KIND, MONITORING, actor.registration)
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
            let leaving_inspection = matches!(action, Action::Approve | Action::Return)
                && head.status == MonitoringStatus::AwaitingInspector.code();
            let supplement = leaving_inspection.then(rules::inspector_supplement);
            validate_all(&rules::ruleset(), supplement.as_ref(), &input.fields)?
        };

        let no_occurrence = validated
            .get("occurrence")
            .and_then(Value::as_u64)
            .is_some_and(|code| code as u32 == NO_OCCURRENCE);
        let ctx = ActionContext::new()
            .with_dirty(input.dirty)
            .with_no_occurrence(no_occurrence);

        match self.engine.plan(&head, action, &ctx)? {
            Transition::Created { status, .. } => {
                let mut payload = validated;
                payload.insert(KIND.status_field().into(), json!(status.0));
                stamp(&mut payload, "created_at", now);
                payload.insert("updated_at".into(), Value::Null);

                let persisted = self.services.records.create(KIND, payload).await?;
                let mut created = record_from_payload(KIND, persisted)?;
                push_audit(&mut created, "occurrence filed", actor, now);
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
                push_audit(&mut saved, "occurrence saved", actor, now);
                Ok(Outcome::of(saved, save_effects(false, input.close)))
            }

            // Approval persists the whole verified form with the new
            // status, so pending edits ride along instead of going stale.
            Transition::Advanced(patch) => {
                let id = record.require_id()?;
                let mut payload = validated;
                payload.insert(KIND.status_field().into(), json!(patch.status.0));
                payload.remove("created_at");
                stamp(&mut payload, "updated_at", now);

                let persisted = self.services.records.update(KIND, id, payload).await?;
                let mut advanced = record_from_payload(KIND, persisted)?;
                advanced.audit = record.audit.clone();
                push_audit(&mut advanced, "occurrence approved", actor, now);
                Ok(Outcome::of(advanced, vec![SideEffect::NavigateBack]))
            }

            // Returning sends only the inspector's verdict fields back.
            Transition::Returned(patch) => {
                let id = record.require_id()?;
                let mut body = Payload::new();
                body.insert(KIND.status_field().into(), json!(patch.status.0));
                for field in RETURN_FIELDS {
                    if let Some(value) = validated.get(*field) {
                        body.insert((*field).to_string(), value.clone());
                    }
                }
                stamp(&mut body, "updated_at", now);
                self.services.records.patch(KIND, id, body).await?;

                let mut returned = record.clone().with_status(patch.status);
                returned.updated_at = Some(now);
                push_audit(&mut returned, "occurrence returned to monitoring", actor, now);
                Ok(Outcome::of(returned, vec![SideEffect::NavigateBack]))
            }

            Transition::Removed => {
                self.services.records.delete(KIND, record.require_id()?).await?;
                Ok(Outcome::removed())
            }

            Transition::Assigned(_) => Err(WorkflowError::InvalidTransition(
                "monitoring occurrences do not support assignment".into(),
            )),
        }
    }
}
