use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::domain::content::{ContentNode, collect_schedules};
use crate::domain::timeparse::parse_instant;
use crate::{END_KIND_NAME, START_KIND_NAME};

/// Which edge of a schedule window a boundary belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryKind {
    Start,
    End,
}

impl BoundaryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoundaryKind::Start => START_KIND_NAME,
            BoundaryKind::End => END_KIND_NAME,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            START_KIND_NAME => Some(BoundaryKind::Start),
            END_KIND_NAME => Some(BoundaryKind::End),
            _ => None,
        }
    }
}

/// A future instant at which some schedule in a content tree takes effect,
/// and therefore a moment the page cache goes stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Boundary {
    pub kind: BoundaryKind,
    pub fires_at: DateTime<Utc>,
}

/// Extracts every future schedule boundary from a saved tree.
///
/// Bounds at or before `now` yield nothing: they have already taken effect
/// and need no purge. Unreadable bounds yield nothing either; failing safe
/// on render is the evaluator's job, not the extractor's. The result is
/// de-duplicated by `(kind, fires_at)` and sorted by firing time.
pub fn extract_boundaries(nodes: &[ContentNode], now: DateTime<Utc>, reference: Tz) -> Vec<Boundary> {
    let mut boundaries: Vec<Boundary> = collect_schedules(nodes)
        .into_iter()
        .flat_map(|schedule| {
            let start = schedule
                .start
                .as_deref()
                .and_then(|text| parse_instant(text, reference))
                .map(|fires_at| Boundary {
                    kind: BoundaryKind::Start,
                    fires_at,
                });
            let end = schedule
                .end
                .as_deref()
                .and_then(|text| parse_instant(text, reference))
                .map(|fires_at| Boundary {
                    kind: BoundaryKind::End,
                    fires_at,
                });
            [start, end]
        })
        .flatten()
        .filter(|boundary| boundary.fires_at > now)
        .collect();

    boundaries.sort_by_key(|boundary| (boundary.fires_at, boundary.kind));
    boundaries.dedup();
    boundaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::content::parse_forest;
    use chrono_tz::{Europe::Berlin, UTC};
    use serde_json::json;

    fn now(text: &str) -> DateTime<Utc> {
        parse_instant(text, UTC).unwrap()
    }

    #[test]
    fn test_extracts_future_bounds_only() {
        let forest = parse_forest(&json!([
            {"kind": "scheduled-container", "attributes": {
                "start": "2025-01-01T00:00:00Z",
                "end": "2025-06-01T00:00:00Z",
            }},
        ]));

        let boundaries = extract_boundaries(&forest, now("2025-03-01T00:00:00Z"), UTC);

        assert_eq!(
            boundaries,
            vec![Boundary {
                kind: BoundaryKind::End,
                fires_at: now("2025-06-01T00:00:00Z"),
            }]
        );
    }

    #[test]
    fn test_bound_exactly_at_now_is_not_future() {
        let forest = parse_forest(&json!([
            {"kind": "scheduled-container", "attributes": {"start": "2025-01-01T00:00:00Z"}},
        ]));

        assert!(extract_boundaries(&forest, now("2025-01-01T00:00:00Z"), UTC).is_empty());
    }

    #[test]
    fn test_unreadable_bounds_yield_no_boundary() {
        let forest = parse_forest(&json!([
            {"kind": "scheduled-container", "attributes": {
                "start": "bad-input",
                "end": "2025-06-01T00:00:00Z",
            }},
        ]));

        let boundaries = extract_boundaries(&forest, now("2025-01-01T00:00:00Z"), UTC);
        assert_eq!(boundaries.len(), 1);
        assert_eq!(boundaries[0].kind, BoundaryKind::End);
    }

    #[test]
    fn test_duplicate_instants_collapse_per_kind() {
        // Two containers opening at the same moment need one purge, not two;
        // a start and an end at the same instant stay distinct.
        let forest = parse_forest(&json!([
            {"kind": "scheduled-container", "attributes": {"start": "2025-06-01T00:00:00Z"}},
            {"kind": "section", "children": [
                {"kind": "scheduled-container", "attributes": {
                    "start": "2025-06-01T00:00:00Z",
                    "end": "2025-07-01T00:00:00Z",
                }},
            ]},
            {"kind": "scheduled-container", "attributes": {"end": "2025-06-01T00:00:00Z"}},
        ]));

        let boundaries = extract_boundaries(&forest, now("2025-01-01T00:00:00Z"), UTC);

        assert_eq!(
            boundaries,
            vec![
                Boundary { kind: BoundaryKind::Start, fires_at: now("2025-06-01T00:00:00Z") },
                Boundary { kind: BoundaryKind::End, fires_at: now("2025-06-01T00:00:00Z") },
                Boundary { kind: BoundaryKind::End, fires_at: now("2025-07-01T00:00:00Z") },
            ]
        );
    }

    #[test]
    fn test_naive_bounds_resolve_in_reference_zone() {
        let forest = parse_forest(&json!([
            {"kind": "scheduled-container", "attributes": {"start": "2025-01-15T09:00:00"}},
        ]));

        let boundaries = extract_boundaries(&forest, now("2025-01-01T00:00:00Z"), Berlin);

        assert_eq!(boundaries[0].fires_at, now("2025-01-15T08:00:00Z"));
    }

    #[test]
    fn test_kind_names_round_trip() {
        for kind in [BoundaryKind::Start, BoundaryKind::End] {
            assert_eq!(BoundaryKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(BoundaryKind::from_name("middle"), None);
    }
}
