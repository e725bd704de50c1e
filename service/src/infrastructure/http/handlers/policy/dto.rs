use std::collections::HashSet;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use curtain_common::domain::{RoleId, VisibilityPolicy};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRequest {
    /// Omitted or null means unrestricted: every viewer class bypasses.
    #[serde(default)]
    pub allowed_bypass_roles: Option<HashSet<RoleId>>,
    pub purge_scheduling_enabled: bool,
}

impl PolicyRequest {
    pub fn into_domain(self) -> VisibilityPolicy {
        VisibilityPolicy {
            allowed_bypass_roles: self.allowed_bypass_roles,
            purge_scheduling_enabled: self.purge_scheduling_enabled,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyResponse {
    allowed_bypass_roles: Option<Vec<String>>,
    purge_scheduling_enabled: bool,
}

impl From<VisibilityPolicy> for PolicyResponse {
    fn from(policy: VisibilityPolicy) -> Self {
        let allowed_bypass_roles = policy.allowed_bypass_roles.map(|roles| {
            roles
                .into_iter()
                .map(|role| role.into_inner())
                .sorted()
                .collect::<Vec<_>>()
        });
        Self {
            allowed_bypass_roles,
            purge_scheduling_enabled: policy.purge_scheduling_enabled,
        }
    }
}
