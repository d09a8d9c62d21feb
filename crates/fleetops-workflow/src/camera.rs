//! Camera review workflow
//!
//! Review requests pass monitoring, review, and — only when the occurrence
//! demands footage — a video-cut stage before finishing. The review
//! supplement applies when a record is approved out of the review stage.

use crate::orchestrator::{
    enforce_gate, list_records, load_record, push_audit, record_from_payload, save_effects,
    stamp, validate_all, Services,
};
use crate::{ApplyInput, ListFilter, Outcome, SideEffect};
use chrono::Utc;
use fleetops_engine::{gate_for, Action, ActionContext, RecordHead, Transition, TransitionEngine};
use fleetops_types::{
    Actor, CameraStatus, Payload, Record, RecordId, RecordKind, ReferenceKey, WorkflowError,
    WorkflowResult, CAMERA_REVIEW,
};
use fleetops_validate::camera as rules;
use serde_json::{json, Value};
use tracing::{info, warn};

const KIND: RecordKind = RecordKind::CameraReview;

const WARM_KEYS: &[ReferenceKey] = &[
    ReferenceKey::CameraOccurrences,
    ReferenceKey::CameraStatuses,
    ReferenceKey::Vehicles,
];

/// Fields a rejected review carries back.
const RETURN_FIELDS: &[&str] = &[
    "comment",
    "video_path",
    "date_review",
    "reviewed_by",
    "there_video",
];

pub struct CameraReviewWorkflow {
    services: Services,
    engine: TransitionEngine,
}

impl CameraReviewWorkflow {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            engine: TransitionEngine::new(),
        }
    }

    pub fn draft(&self, actor: &Actor) -> Record {
        Record::draft(KIND, CAMERA_REVIEW, actor.registration)
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

    /// Whether the occurrence requires the video-cut stage, per its
    /// reference flags.
    async fn needs_cut(&self, occurrence: Option<u32>) -> WorkflowResult<bool> {
        let Some(occurrence) = occurrence else {
            return Ok(false);
        };
        let items = self.services.reference(ReferenceKey::CameraOccurrences).await?;
        Ok(items
            .iter()
            .find(|item| item.id == occurrence)
            .is_some_and(|item| item.flags.needs_cut))
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
            let leaving_review = action == Action::Approve
                && head.status == CameraStatus::AwaitingReview.code();
            let supplement = leaving_review.then(rules::review_supplement);
            validate_all(&rules::ruleset(), supplement.as_ref(), &input.fields)?
        };

        let occurrence = validated
            .get("camera_occurrence")
            .and_then(Value::as_u64)
            .map(|id| id as u32);
        let ctx = ActionContext::new()
            .with_dirty(input.dirty)
            .with_needs_cut(self.needs_cut(occurrence).await?);

        match self.engine.plan(&head, action, &ctx)? {
            Transition::Created { status, .. } => {
                let mut payload = validated;
                payload.insert(KIND.status_field().into(), json!(status.0));
                stamp(&mut payload, "created_at", now);
                payload.insert("updated_at".into(), Value::Null);

                let persisted = self.services.records.create(KIND, payload).await?;
                let mut created = record_from_payload(KIND, persisted)?;
                push_audit(&mut created, "review requested", actor, now);
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
                push_audit(&mut saved, "review saved", actor, now);
                Ok(Outcome::of(saved, save_effects(false, input.close)))
            }

            Transition::Advanced(patch) => {
                let id = record.require_id()?;
                let mut payload = validated;
                payload.insert(KIND.status_field().into(), json!(patch.status.0));
                payload.remove("created_at");
                stamp(&mut payload, "updated_at", now);

                let persisted = self.services.records.update(KIND, id, payload).await?;
                let mut advanced = record_from_payload(KIND, persisted)?;
                advanced.audit = record.audit.clone();
                push_audit(&mut advanced, "review approved", actor, now);
                Ok(Outcome::of(advanced, vec![SideEffect::NavigateBack]))
            }

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
                push_audit(&mut returned, "review returned", actor, now);
                Ok(Outcome::of(returned, vec![SideEffect::NavigateBack]))
            }

            Transition::Removed => {
                self.services.records.delete(KIND, record.require_id()?).await?;
                Ok(Outcome::removed())
            }

            Transition::Assigned(_) => Err(WorkflowError::InvalidTransition(
                "camera reviews do not support assignment".into(),
            )),
        }
    }
}
