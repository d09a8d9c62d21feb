//! SAC ticket workflow
//!
//! Tickets open in the creating actor's department, are forwarded to
//! whoever will treat them, and resolve once the holder has recorded the
//! treatments given. Forwarding and resolving are both status patches that
//! move ownership.

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
    Actor, Payload, Record, RecordId, RecordKind, ReferenceKey, SacStatus, UserId, WorkflowError,
    WorkflowResult,
};
use fleetops_validate::{sac as rules, select_ruleset, Operation};
use serde_json::{json, Value};
use tracing::{info, warn};

const KIND: RecordKind = RecordKind::Sac;

/// New tickets open at medium priority until triage says otherwise.
const PRIORITY_MEDIUM: u8 = 3;

const WARM_KEYS: &[ReferenceKey] = &[
    ReferenceKey::SacGenders,
    ReferenceKey::SacOccurrenceTypes,
    ReferenceKey::SacSourceChannels,
    ReferenceKey::SacGroups,
    ReferenceKey::SacStatuses,
    ReferenceKey::Vehicles,
    ReferenceKey::BusLines,
    ReferenceKey::AssignableUsers,
];

pub struct SacWorkflow {
    services: Services,
    engine: TransitionEngine,
}

impl SacWorkflow {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            engine: TransitionEngine::new(),
        }
    }

    /// A blank ticket pinned to the actor's primary department.
    pub fn draft(&self, actor: &Actor) -> WorkflowResult<Record> {
        let department = actor
            .primary_department()
            .ok_or_else(|| WorkflowError::Forbidden("actor belongs to no department".into()))?;
        Ok(Record::draft(KIND, department, actor.registration).with_holder(actor.id))
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

    /// Save the triage pane (group, priority, proceeding verdict) without
    /// touching the rest of the ticket.
    pub async fn save_triage(
        &self,
        record: &Record,
        fields: Payload,
        actor: &Actor,
    ) -> WorkflowResult<Outcome> {
        let now = Utc::now();
        let head = RecordHead::of(record);

        let gate = gate_for(&head, Action::Save)?;
        enforce_gate(&gate, &head, actor)?;
        let validated = validate_all(&rules::treatment_ruleset(), None, &fields)?;

        let id = record.require_id()?;
        let mut body = Payload::new();
        for field in ["sac_group", "sac_priority", "employee_involved", "proceeding", "video_path"] {
            if let Some(value) = validated.get(field) {
                body.insert(field.to_string(), value.clone());
            }
        }
        stamp(&mut body, "updated_at", now);
        self.services.records.patch(KIND, id, body).await?;

        let mut saved = record.clone();
        saved.updated_at = Some(now);
        push_audit(&mut saved, "triage saved", actor, now);
        Ok(Outcome::of(saved, vec![SideEffect::NavigateBack]))
    }

    /// Resolve an assignment target against the cached user list.
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

        let operation = if record.id.is_none() {
            Operation::Create
        } else {
            Operation::Update
        };
        let validated = if action == Action::Delete {
            Payload::new()
        } else {
            let ruleset = select_ruleset(KIND, operation, None)?;
            validate_all(&ruleset, None, &input.fields)?
        };

        let mut ctx = ActionContext::new().with_dirty(input.dirty);
        if action == Action::Approve {
            if head.status == SacStatus::InAttention.code() {
                // Resolution lands the ticket on the resolving user.
                let department = actor.primary_department().ok_or_else(|| {
                    WorkflowError::Forbidden("actor belongs to no department".into())
                })?;
                ctx = ctx.with_assignment(Assignment::new(
                    actor.id,
                    department,
                    actor.display_name(),
                ));
            } else if let Some(target) = input.assign_to {
                ctx = ctx.with_assignment(self.assignment_for(target, record.holder).await?);
            }
        }
        if let Some(treatments) = input.treatments {
            ctx = ctx.with_treatments(treatments);
        }

        match self.engine.plan(&head, action, &ctx)? {
            Transition::Created { status, department } => {
                let mut payload = validated;
                payload.insert(KIND.status_field().into(), json!(status.0));
                payload.insert("sac_department".into(), json!(department.code()));
                payload.insert("sac_user".into(), json!(actor.id.0));
                if !payload.contains_key("sac_priority") {
                    payload.insert("sac_priority".into(), json!(PRIORITY_MEDIUM));
                }
                if record.field_str("ticket_number").is_none()
                    && !payload.contains_key("ticket_number")
                {
                    payload.insert("ticket_number".into(), json!(record_number(now)));
                }
                let customer = payload
                    .get("name_cli")
                    .and_then(Value::as_str)
                    .map(str::to_uppercase);
                if let Some(customer) = customer {
                    payload.insert("name_cli".into(), json!(customer));
                }
                stamp(&mut payload, "created_at", now);
                stamp(&mut payload, "updated_at", now);

                let persisted = self.services.records.create(KIND, payload).await?;
                let mut created = record_from_payload(KIND, persisted)?;
                push_audit(&mut created, "ticket opened", actor, now);
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
                push_audit(&mut saved, "ticket saved", actor, now);
                Ok(Outcome::of(saved, save_effects(false, input.close)))
            }

            // Forward and resolve are the same patch shape: new status, new
            // owner.
            Transition::Advanced(patch) => {
                let id = record.require_id()?;
                let mut body = Payload::new();
                body.insert(KIND.status_field().into(), json!(patch.status.0));
                if let Some(department) = patch.department {
                    body.insert("sac_department".into(), json!(department.code()));
                }
                if let Some(holder) = patch.holder {
                    body.insert("sac_user".into(), json!(holder.0));
                }
                stamp(&mut body, "updated_at", now);
                self.services.records.patch(KIND, id, body).await?;

                let mut advanced = record.clone().with_status(patch.status);
                if let Some(department) = patch.department {
                    advanced.department = department;
                }
                advanced.holder = patch.holder.or(advanced.holder);
                advanced.updated_at = Some(now);
                let note = if patch.status == SacStatus::Resolved.code() {
                    "ticket resolved"
                } else {
                    "ticket forwarded"
                };
                push_audit(&mut advanced, note, actor, now);
                Ok(Outcome::of(advanced, vec![SideEffect::NavigateBack]))
            }

            Transition::Removed => {
                self.services.records.delete(KIND, record.require_id()?).await?;
                Ok(Outcome::removed())
            }

            Transition::Returned(_) | Transition::Assigned(_) => Err(
                WorkflowError::InvalidTransition("tickets move only by forwarding".into()),
            ),
        }
    }
}
