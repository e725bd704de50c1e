use serde_json::Value;

use crate::domain::schedule::Schedule;

/// Node type that marks a scheduled container in a saved content tree.
pub const SCHEDULED_CONTAINER_KIND: &str = "scheduled-container";

/// One node of a saved content tree: a typed component with attributes and
/// ordered children. Only scheduled containers carry a schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentNode {
    pub kind: String,
    pub schedule: Option<Schedule>,
    pub children: Vec<ContentNode>,
}

impl ContentNode {
    /// Reads one node from saved JSON, leniently.
    ///
    /// Returns `None` for anything that is not an object with a string
    /// `kind`; such foreign values are skipped, not errors. Missing
    /// attributes or children are fine, and a malformed child never takes
    /// its siblings down with it.
    pub fn from_value(value: &Value) -> Option<ContentNode> {
        let object = value.as_object()?;
        let kind = object.get("kind")?.as_str()?.to_owned();

        let schedule = if kind == SCHEDULED_CONTAINER_KIND {
            let attributes = object
                .get("attributes")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();
            Some(Schedule::from_attributes(&attributes))
        } else {
            None
        };

        let children = object
            .get("children")
            .and_then(Value::as_array)
            .map(|values| values.iter().filter_map(ContentNode::from_value).collect())
            .unwrap_or_default();

        Some(ContentNode {
            kind,
            schedule,
            children,
        })
    }
}

/// Reads a saved tree (an ordered forest) from JSON, skipping foreign nodes.
pub fn parse_forest(value: &Value) -> Vec<ContentNode> {
    match value {
        Value::Array(values) => values.iter().filter_map(ContentNode::from_value).collect(),
        other => ContentNode::from_value(other).into_iter().collect(),
    }
}

/// Collects every schedule in the forest, depth first.
///
/// Written as a pure fold over the tree so it can be tested without any
/// scheduler wiring.
pub fn collect_schedules(nodes: &[ContentNode]) -> Vec<&Schedule> {
    nodes.iter().fold(Vec::new(), |mut found, node| {
        if let Some(schedule) = &node.schedule {
            found.push(schedule);
        }
        found.extend(collect_schedules(&node.children));
        found
    })
}
