use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::RoleId;

/// The synthetic role marking anonymous viewers in the bypass allow-list.
pub const VISITOR_ROLE: &str = "visitor";

/// Who is looking at the page, built per request from the host environment.
#[derive(Debug, Clone, Default)]
pub struct ViewerContext {
    pub is_authenticated: bool,
    pub roles: HashSet<RoleId>,
    /// Set when the request comes from the host's authoring canvas.
    pub is_editor_preview: bool,
}

/// Process-wide visibility configuration, read from the policy store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityPolicy {
    /// Roles exempt from schedule enforcement. `None` means the policy was
    /// never restricted: every viewer class bypasses, visitors included.
    pub allowed_bypass_roles: Option<HashSet<RoleId>>,
    pub purge_scheduling_enabled: bool,
}

impl Default for VisibilityPolicy {
    fn default() -> Self {
        Self {
            allowed_bypass_roles: None,
            purge_scheduling_enabled: true,
        }
    }
}

/// Whether this viewer is exempt from schedule enforcement.
///
/// Authenticated viewers bypass when any of their roles is allow-listed;
/// anonymous viewers only when the allow-list names [`VISITOR_ROLE`].
pub fn can_bypass(viewer: &ViewerContext, policy: &VisibilityPolicy) -> bool {
    let Some(allowed) = &policy.allowed_bypass_roles else {
        return true;
    };

    if viewer.is_authenticated {
        viewer.roles.iter().any(|role| allowed.contains(role))
    } else {
        allowed.contains(&RoleId::visitor())
    }
}
