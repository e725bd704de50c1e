use std::collections::HashSet;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use curtain_common::domain::{
    RenderDecision, RoleId, Schedule, ViewerContext, format_instant, parse_instant,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderDecisionRequest {
    /// The container's raw attribute object, as saved by the editor.
    #[serde(default)]
    pub schedule: Map<String, Value>,
    #[serde(default)]
    pub viewer: ViewerDto,
    /// Optional evaluation instant override for authoring previews.
    #[serde(default)]
    pub at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewerDto {
    pub authenticated: bool,
    pub roles: HashSet<RoleId>,
    pub editor_preview: bool,
}

impl ViewerDto {
    pub fn into_domain(self) -> ViewerContext {
        ViewerContext {
            is_authenticated: self.authenticated,
            roles: self.roles,
            is_editor_preview: self.editor_preview,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderDecisionResponse {
    outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    placeholder: Option<String>,
    /// The window restated in the reference zone, for authoring badges.
    window: WindowSummary,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
enum Outcome {
    Content,
    Placeholder,
    Nothing,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct WindowSummary {
    start: Option<String>,
    end: Option<String>,
    timezone: String,
}

impl RenderDecisionResponse {
    pub fn new(decision: RenderDecision, schedule: &Schedule, reference: Tz) -> Self {
        let (outcome, placeholder) = match decision {
            RenderDecision::ShowContent => (Outcome::Content, None),
            RenderDecision::ShowPlaceholder(text) => (Outcome::Placeholder, Some(text)),
            RenderDecision::ShowNothing => (Outcome::Nothing, None),
        };
        Self {
            outcome,
            placeholder,
            window: WindowSummary::new(schedule, reference),
        }
    }
}

impl WindowSummary {
    fn new(schedule: &Schedule, reference: Tz) -> Self {
        let localized = |bound: &Option<String>| {
            bound
                .as_deref()
                .and_then(|text| parse_instant(text, reference))
                .map(|instant| format_instant(instant, reference))
        };
        Self {
            start: localized(&schedule.start),
            end: localized(&schedule.end),
            timezone: reference.to_string(),
        }
    }
}
