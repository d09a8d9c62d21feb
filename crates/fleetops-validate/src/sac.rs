//! SAC ticket rulesets
//!
//! Creation takes the base set; updates demand a strict superset once the
//! ticket has been through triage (group, priority, proceeding verdict,
//! vehicle, and line become mandatory).

use crate::{FieldRule, Ruleset};
use serde_json::Value;

fn base_rules() -> Vec<FieldRule> {
    vec![
        FieldRule::required("title", "title is required"),
        FieldRule::required("history", "history is required"),
        FieldRule::required("name_cli", "customer name is required"),
        FieldRule::required("sac_gender", "gender is required"),
        FieldRule::required("sac_occurrence_type", "occurrence type is required"),
        FieldRule::required("sac_source_channel", "source channel is required"),
        FieldRule::required("sac_status", "ticket status is required"),
        FieldRule::required("monitor_registration", "monitor registration is required"),
        FieldRule::required("created_at", "creation date is required"),
        FieldRule::required("date_occurrence", "occurrence date is required"),
        FieldRule::required("ticket_number", "ticket number is required"),
    ]
}

pub fn create_ruleset() -> Ruleset {
    Ruleset::new("sac-create")
        .with_rules(base_rules())
        .with_default("phone", Value::Null)
        .with_default("email", Value::Null)
        .with_default("rg_cli", Value::Null)
}

/// Update ruleset: the create rules plus the triage fields.
pub fn update_ruleset() -> Ruleset {
    Ruleset::new("sac-update")
        .with_rules(base_rules())
        .with_rule(FieldRule::required("sac_group", "complaint group is required"))
        .with_rule(FieldRule::required("sac_priority", "priority is required"))
        .with_rule(FieldRule::required("proceeding", "proceeding verdict is required"))
        .with_rule(FieldRule::required("car", "vehicle is required"))
        .with_rule(FieldRule::required("line_bus", "bus line is required"))
        .with_rule(FieldRule::required("updated_at", "update date is required"))
        .with_default("phone", Value::Null)
        .with_default("email", Value::Null)
        .with_default("rg_cli", Value::Null)
        .with_default("video_path", Value::Null)
        .with_default("related_ticket_list", Value::Null)
        .with_default("employee_involved", Value::Null)
}

/// Treatment-pane ruleset used when saving triage data alone.
pub fn treatment_ruleset() -> Ruleset {
    Ruleset::new("sac-treatment")
        .with_rule(FieldRule::required("sac_group", "complaint group is required"))
        .with_rule(FieldRule::required("sac_priority", "priority is required"))
        .with_rule(FieldRule::required("proceeding", "proceeding verdict is required"))
        .with_default("employee_involved", Value::Null)
        .with_default("video_path", Value::Null)
}
