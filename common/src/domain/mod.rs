use std::sync::LazyLock;
use nutype::nutype;
use regex::Regex;

pub mod boundary;
pub mod content;
pub mod evaluate;
pub mod policy;
pub mod render;
pub mod schedule;
pub mod timeparse;

pub use boundary::{Boundary, BoundaryKind, extract_boundaries};
pub use content::{ContentNode, SCHEDULED_CONTAINER_KIND, collect_schedules, parse_forest};
pub use evaluate::{Bound, ResolvedSchedule, Verdict, evaluate};
pub use policy::{VISITOR_ROLE, ViewerContext, VisibilityPolicy, can_bypass};
pub use render::{RenderDecision, decide};
pub use schedule::Schedule;
pub use timeparse::{format_instant, parse_instant};

// A regex for IDs that may contain only ASCII letters, digits, underscore,
// dash, and slash. Example: "landing/hero-2" is valid; "my id" is not.
pub const ELIGIBLE_SYMBOLS_REGEX: &str = r"^[A-Za-z0-9_/-]+$";

static ELIGIBLE_SYMBOLS_REGEX_COMPILED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(ELIGIBLE_SYMBOLS_REGEX).expect("ELIGIBLE_SYMBOLS_REGEX must be a valid regex")
});

pub fn is_eligible_id(id: &str) -> bool {
    ELIGIBLE_SYMBOLS_REGEX_COMPILED.is_match(id)
}

/// Identifier of one content item in the host CMS.
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 64, predicate = is_eligible_id),
    derive(
        Clone,
        Debug,
        Display,
        FromStr,
        AsRef,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        Serialize,
        Deserialize
    )
)]
pub struct ContentId(String);

/// Identifier of a viewer role as the host reports it.
#[nutype(
    sanitize(trim, lowercase),
    validate(not_empty, len_char_max = 64, predicate = is_eligible_id),
    derive(
        Clone,
        Debug,
        Display,
        FromStr,
        AsRef,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        Serialize,
        Deserialize
    )
)]
pub struct RoleId(String);

impl RoleId {
    /// The synthetic role standing in for anonymous viewers in the bypass allow-list.
    pub fn visitor() -> Self {
        RoleId::try_new(VISITOR_ROLE).expect("VISITOR_ROLE must be a valid role id")
    }
}
