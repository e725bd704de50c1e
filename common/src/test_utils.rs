use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use crate::domain::content::{ContentNode, parse_forest};
use crate::domain::schedule::Schedule;
use crate::domain::timeparse::parse_instant;

/// Test builders shared across the workspace.
///
/// Public so that the service crate can reuse them for reconciler tests.

/// Parses RFC 3339 text into an instant, panicking on typos in test data.
pub fn instant(text: &str) -> DateTime<Utc> {
    parse_instant(text, chrono_tz::UTC)
        .unwrap_or_else(|| panic!("test instant {:?} must parse", text))
}

/// A schedule with the given raw bounds and no placeholder.
pub fn schedule(start: Option<&str>, end: Option<&str>) -> Schedule {
    Schedule {
        start: start.map(str::to_owned),
        end: end.map(str::to_owned),
        ..Schedule::default()
    }
}

/// JSON for one scheduled container wrapping a paragraph.
pub fn scheduled_node_json(start: Option<&str>, end: Option<&str>) -> Value {
    let mut attributes = serde_json::Map::new();
    if let Some(start) = start {
        attributes.insert("start".into(), json!(start));
    }
    if let Some(end) = end {
        attributes.insert("end".into(), json!(end));
    }
    json!({
        "kind": "scheduled-container",
        "attributes": attributes,
        "children": [{"kind": "paragraph"}],
    })
}

/// JSON for a plain section node with the given children.
pub fn section_json(children: Vec<Value>) -> Value {
    json!({"kind": "section", "children": children})
}

/// Parses builder JSON into domain nodes.
pub fn forest(values: Vec<Value>) -> Vec<ContentNode> {
    parse_forest(&Value::Array(values))
}
