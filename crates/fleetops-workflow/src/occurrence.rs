//! R.O. occurrence report workflow
//!
//! Reports open under dispatch, shuttle between dispatch and maintenance by
//! assignment, and close when dispatch finalizes them. The occurrence type
//! picks the ruleset; every patch carries the acting user for the audit
//! trail.

use crate::numbering::record_number;
use crate::orchestrator::{
    enforce_gate, list_records, load_record, push_audit, record_from_payload, save_effects,
    stamp, validate_all, Services,
};
use crate::{ApplyInput, AssignTarget, ListFilter, Outcome, SideEffect};
use chrono::Utc;
use fleetops_engine::{
    gate_for, Action, ActionContext, Assignment, RecordHead, Transition, TransitionEngine,
};
use fleetops_types::{
    Actor, Payload, Record, RecordId, RecordKind, ReferenceItem, ReferenceKey, RoOccurrenceType,
    UserId, WorkflowError, WorkflowResult, DISPATCH,
};
use fleetops_validate::ro as rules;
use serde_json::{json, Value};
use tracing::{info, warn};

const KIND: RecordKind = RecordKind::OccurrenceReport;

const WARM_KEYS: &[ReferenceKey] = &[
    ReferenceKey::AssignableUsers,
    ReferenceKey::RoMotives,
    ReferenceKey::RoStatuses,
    ReferenceKey::Cities,
    ReferenceKey::RoOccurrenceTypes,
    ReferenceKey::RoSectors,
    ReferenceKey::RoOccurrences,
    ReferenceKey::Vehicles,
    ReferenceKey::BusLines,
];

pub struct OccurrenceReportWorkflow {
    services: Services,
    engine: TransitionEngine,
}

impl OccurrenceReportWorkflow {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            engine: TransitionEngine::new(),
        }
    }

    /// A blank report of the given occurrence type, owned by dispatch.
    pub fn draft(&self, occurrence_type: RoOccurrenceType, actor: &Actor) -> Record {
        Record::draft(KIND, DISPATCH, actor.registration)
            .with_holder(actor.id)
            .with_field("ro_occurrence_type", json!(occurrence_type.code()))
    }

    pub async fn load(&self, id: RecordId) -> WorkflowResult<Record> {
        self.services.warm(WARM_KEYS).await?;
        load_record(&self.services, KIND, id).await
    }

    pub async fn list(&self, filter: &ListFilter) -> WorkflowResult<Vec<Record>> {
        list_records(&self.services, KIND, filter).await
    }

    /// Motives applicable to one occurrence type.
    pub async fn motives_for(&self, occurrence_type: RoOccurrenceType) -> WorkflowResult<Vec<ReferenceItem>> {
        let motives = self.services.reference(ReferenceKey::RoMotives).await?;
        Ok(motives
            .into_iter()
            .filter(|item| item.flags.occurrence_types.contains(&occurrence_type.code()))
            .collect())
    }

    /// Occurrences applicable to one affected sector.
    pub async fn occurrences_for_sector(&self, sector: u32) -> WorkflowResult<Vec<ReferenceItem>> {
        let occurrences = self.services.reference(ReferenceKey::RoOccurrences).await?;
        Ok(occurrences
            .into_iter()
            .filter(|item| item.flags.sectors.contains(&sector))
            .collect())
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

    /// Swap the report's occurrence type, recording the old and new names.
    /// Dispatch-only; the status does not move.
    pub async fn change_occurrence_type(
        &self,
        record: &Record,
        new_type: RoOccurrenceType,
        actor: &Actor,
    ) -> WorkflowResult<Outcome> {
        let now = Utc::now();
        fleetops_access::ensure_department(actor, DISPATCH)?;
        if record.is_terminal() {
            return Err(WorkflowError::InvalidTransition(
                "ro record is closed".into(),
            ));
        }
        let id = record.require_id()?;

        let types = self.services.reference(ReferenceKey::RoOccurrenceTypes).await?;
        let name_of = |code: u32| {
            types
                .iter()
                .find(|item| item.id == code)
                .map(|item| item.name.clone())
                .ok_or_else(|| {
                    WorkflowError::field("ro_occurrence_type", "unknown occurrence type")
                })
        };
        let old_code = record
            .field_i64("ro_occurrence_type")
            .map(|code| code as u32)
            .unwrap_or_default();

        let mut body = Payload::new();
        body.insert("occurrence_type_id".into(), json!(new_type.code()));
        body.insert("occurrence_type".into(), json!(name_of(new_type.code() as u32)?));
        body.insert("old_occurrence_type".into(), json!(name_of(old_code)?));
        stamp_active_user(&mut body, actor);
        stamp(&mut body, "updated_at", now);
        self.services.records.patch(KIND, id, body).await?;

        let mut changed = record
            .clone()
            .with_field("ro_occurrence_type", json!(new_type.code()));
        changed.updated_at = Some(now);
        push_audit(&mut changed, "occurrence type changed", actor, now);
        Ok(Outcome::of(changed, vec![SideEffect::NavigateBack]))
    }

    fn discriminator(&self, record: &Record, input: &ApplyInput) -> WorkflowResult<RoOccurrenceType> {
        let code = input
            .fields
            .get("ro_occurrence_type")
            .and_then(Value::as_i64)
            .or_else(|| record.field_i64("ro_occurrence_type"))
            .unwrap_or_default();
        RoOccurrenceType::from_code(code as u8)
    }

    async fn assignment_for(
        &self,
        target: AssignTarget,
        previous: Option<UserId>,
    ) -> WorkflowResult<Assignment> {
        let users = self.services.reference(ReferenceKey::AssignableUsers).await?;
        let name = users
            .iter()
            .find(|user| u64::from(user.id) == target.user.0)
            .map(|user| user.name.clone())
            .ok_or_else(|| {
                WorkflowError::field("assign_to", "assignee is not in the assignable user list")
            })?;
        let mut assignment = Assignment::new(target.user, target.department, name);
        if let Some(previous) = previous {
            if let Some(user) = users.iter().find(|user| u64::from(user.id) == previous.0) {
                assignment = assignment.with_previous_name(user.name.clone());
            }
        }
        Ok(assignment)
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
            let ruleset = rules::ruleset(self.discriminator(record, &input)?);
            validate_all(&ruleset, None, &input.fields)?
        };

        let mut ctx = ActionContext::new()
            .with_dirty(input.dirty)
            .with_response_recorded(
                validated
                    .get("occurrence_response")
                    .and_then(Value::as_str)
                    .is_some_and(|text| !text.trim().is_empty()),
            );
        if let Some(target) = input.assign_to {
            ctx = ctx.with_assignment(self.assignment_for(target, record.holder).await?);
        }

        match self.engine.plan(&head, action, &ctx)? {
            Transition::Created { status, department } => {
                let mut payload = validated;
                payload.insert(KIND.status_field().into(), json!(status.0));
                payload.insert("ro_department".into(), json!(department.code()));
                payload.insert("ro_user".into(), json!(actor.id.0));
                if !payload.contains_key("monitor_registration") {
                    payload.insert("monitor_registration".into(), json!(actor.registration.0));
                }
                if record.field_str("occurrence_number").is_none()
                    && !payload.contains_key("occurrence_number")
                {
                    payload.insert("occurrence_number".into(), json!(record_number(now)));
                }
                stamp_active_user(&mut payload, actor);
                stamp(&mut payload, "created_at", now);
                payload.insert("updated_at".into(), Value::Null);

                let persisted = self.services.records.create(KIND, payload).await?;
                let mut created = record_from_payload(KIND, persisted)?;
                push_audit(&mut created, "report opened", actor, now);
                Ok(Outcome::of(created, save_effects(true, input.close)))
            }

            Transition::Saved => {
                let id = record.require_id()?;
                let mut payload = validated;
                if !payload.contains_key("ro_department") {
                    payload.insert("ro_department".into(), json!(record.department.code()));
                }
                payload.remove("created_at");
                stamp_active_user(&mut payload, actor);
                stamp(&mut payload, "updated_at", now);

                let persisted = self.services.records.update(KIND, id, payload).await?;
                let mut saved = record_from_payload(KIND, persisted)?;
                saved.audit = record.audit.clone();
                push_audit(&mut saved, "report saved", actor, now);
                Ok(Outcome::of(saved, save_effects(false, input.close)))
            }

            // Finalization persists the verified form with the closed
            // status; ownership stays where it is.
            Transition::Advanced(patch) => {
                let id = record.require_id()?;
                let mut payload = validated;
                payload.insert(KIND.status_field().into(), json!(patch.status.0));
                if !payload.contains_key("ro_department") {
                    payload.insert("ro_department".into(), json!(record.department.code()));
                }
                payload.remove("created_at");
                stamp_active_user(&mut payload, actor);
                stamp(&mut payload, "updated_at", now);

                let persisted = self.services.records.update(KIND, id, payload).await?;
                let mut finalized = record_from_payload(KIND, persisted)?;
                finalized.audit = record.audit.clone();
                push_audit(&mut finalized, "report finalized", actor, now);
                Ok(Outcome::of(finalized, vec![SideEffect::NavigateBack]))
            }

            Transition::Assigned(patch) => {
                let id = record.require_id()?;
                let assignment = ctx.assignment.as_ref().ok_or_else(|| {
                    WorkflowError::field("assign_to", "an assignee must be selected")
                })?;

                let mut body = Payload::new();
                if let Some(department) = patch.department {
                    body.insert("ro_department".into(), json!(department.code()));
                }
                if let Some(holder) = patch.holder {
                    body.insert("ro_user".into(), json!(holder.0));
                }
                body.insert("username".into(), json!(assignment.user_name.clone()));
                if let Some(previous) = &assignment.previous_name {
                    body.insert("username_old".into(), json!(previous.clone()));
                }
                if let Some(response) = validated.get("occurrence_response") {
                    body.insert("occurrence_response".into(), response.clone());
                }
                stamp_active_user(&mut body, actor);
                stamp(&mut body, "updated_at", now);
                self.services.records.patch(KIND, id, body).await?;

                let mut assigned = record.clone();
                if let Some(department) = patch.department {
                    assigned.department = department;
                }
                assigned.holder = patch.holder.or(assigned.holder);
                assigned.updated_at = Some(now);
                push_audit(&mut assigned, "report assigned", actor, now);
                Ok(Outcome::of(assigned, vec![SideEffect::NavigateBack]))
            }

            Transition::Removed => {
                self.services.records.delete(KIND, record.require_id()?).await?;
                Ok(Outcome::removed())
            }

            Transition::Returned(_) => Err(WorkflowError::InvalidTransition(
                "ro reports do not support return".into(),
            )),
        }
    }
}

fn stamp_active_user(payload: &mut Payload, actor: &Actor) {
    payload.insert("active_user_id".into(), json!(actor.id.0));
    payload.insert("active_user".into(), json!(actor.display_name()));
}
