use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::domain::evaluate::{ResolvedSchedule, Verdict, evaluate};
use crate::domain::policy::{ViewerContext, VisibilityPolicy, can_bypass};
use crate::domain::schedule::Schedule;

/// What the rendering layer should emit for one scheduled container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderDecision {
    ShowContent,
    /// Hidden, with pre-escaped placeholder text to embed instead.
    ShowPlaceholder(String),
    ShowNothing,
}

/// Full per-request decision for one container.
///
/// Check order is fixed: editor preview first (authors always see their own
/// content), role bypass second, the schedule last. Bypassed requests never
/// evaluate the schedule at all.
pub fn decide(
    now: DateTime<Utc>,
    schedule: &Schedule,
    viewer: &ViewerContext,
    policy: &VisibilityPolicy,
    reference: Tz,
) -> RenderDecision {
    if viewer.is_editor_preview {
        return RenderDecision::ShowContent;
    }
    if can_bypass(viewer, policy) {
        return RenderDecision::ShowContent;
    }

    let resolved = ResolvedSchedule::resolve(schedule, reference);
    match evaluate(now, &resolved) {
        Verdict::Visible => RenderDecision::ShowContent,
        Verdict::Hidden if schedule.show_placeholder => {
            RenderDecision::ShowPlaceholder(escape_html(schedule.placeholder_text.trim()))
        }
        Verdict::Hidden => RenderDecision::ShowNothing,
    }
}

/// Escapes text for embedding into HTML element content or attributes.
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RoleId;
    use crate::domain::timeparse::parse_instant;
    use chrono_tz::UTC;

    fn now(text: &str) -> DateTime<Utc> {
        parse_instant(text, UTC).unwrap()
    }

    fn strict_policy() -> VisibilityPolicy {
        VisibilityPolicy {
            allowed_bypass_roles: Some(Default::default()),
            purge_scheduling_enabled: true,
        }
    }

    fn anonymous() -> ViewerContext {
        ViewerContext::default()
    }

    #[test]
    fn test_visible_window_shows_content() {
        let schedule = Schedule {
            start: Some("2025-01-01T00:00:00Z".into()),
            end: Some("2025-01-02T00:00:00Z".into()),
            ..Schedule::default()
        };

        let decision = decide(
            now("2025-01-01T12:00:00Z"),
            &schedule,
            &anonymous(),
            &strict_policy(),
            UTC,
        );
        assert_eq!(decision, RenderDecision::ShowContent);
    }

    #[test]
    fn test_hidden_without_placeholder_shows_nothing() {
        let schedule = Schedule {
            start: Some("2025-01-01T00:00:00Z".into()),
            end: Some("2025-01-02T00:00:00Z".into()),
            ..Schedule::default()
        };

        let decision = decide(
            now("2024-12-31T23:59:59Z"),
            &schedule,
            &anonymous(),
            &strict_policy(),
            UTC,
        );
        assert_eq!(decision, RenderDecision::ShowNothing);
    }

    #[test]
    fn test_unreadable_start_with_placeholder() {
        let schedule = Schedule {
            start: Some("bad-input".into()),
            end: None,
            show_placeholder: true,
            placeholder_text: "Coming soon".into(),
        };

        let decision = decide(
            now("2025-01-01T00:00:00Z"),
            &schedule,
            &anonymous(),
            &strict_policy(),
            UTC,
        );
        assert_eq!(decision, RenderDecision::ShowPlaceholder("Coming soon".into()));
    }

    #[test]
    fn test_placeholder_text_is_escaped() {
        let schedule = Schedule {
            start: Some("2999-01-01T00:00:00Z".into()),
            end: None,
            show_placeholder: true,
            placeholder_text: r#"<b>Soon</b> & "later""#.into(),
        };

        let decision = decide(
            now("2025-01-01T00:00:00Z"),
            &schedule,
            &anonymous(),
            &strict_policy(),
            UTC,
        );
        assert_eq!(
            decision,
            RenderDecision::ShowPlaceholder("&lt;b&gt;Soon&lt;/b&gt; &amp; &quot;later&quot;".into())
        );
    }

    #[test]
    fn test_editor_preview_wins_before_bypass_and_schedule() {
        let schedule = Schedule {
            start: Some("bad-input".into()),
            ..Schedule::default()
        };
        let viewer = ViewerContext {
            is_editor_preview: true,
            ..ViewerContext::default()
        };

        let decision = decide(
            now("2025-01-01T00:00:00Z"),
            &schedule,
            &viewer,
            &strict_policy(),
            UTC,
        );
        assert_eq!(decision, RenderDecision::ShowContent);
    }

    #[test]
    fn test_bypass_role_skips_schedule_evaluation() {
        // Even an unreadable schedule shows for an allow-listed role.
        let schedule = Schedule {
            start: Some("bad-input".into()),
            ..Schedule::default()
        };
        let viewer = ViewerContext {
            is_authenticated: true,
            roles: [RoleId::try_new("editor").unwrap()].into_iter().collect(),
            is_editor_preview: false,
        };
        let policy = VisibilityPolicy {
            allowed_bypass_roles: Some([RoleId::try_new("editor").unwrap()].into_iter().collect()),
            purge_scheduling_enabled: true,
        };

        let decision = decide(now("2025-01-01T00:00:00Z"), &schedule, &viewer, &policy, UTC);
        assert_eq!(decision, RenderDecision::ShowContent);
    }
}
