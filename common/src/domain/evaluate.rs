use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::domain::schedule::Schedule;
use crate::domain::timeparse::parse_instant;

/// Whether a scheduled container's content may be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Visible,
    Hidden,
}

/// One bound of a schedule after parsing.
///
/// `Invalid` means the author supplied text that could not be read; that is
/// deliberately distinct from `Unset` because it must fail safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Unset,
    At(DateTime<Utc>),
    Invalid,
}

impl Bound {
    fn resolve(raw: Option<&str>, reference: Tz) -> Self {
        match raw {
            None => Bound::Unset,
            Some(text) => match parse_instant(text, reference) {
                Some(instant) => Bound::At(instant),
                None => Bound::Invalid,
            },
        }
    }
}

/// A schedule with both bounds parsed against the reference zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSchedule {
    pub start: Bound,
    pub end: Bound,
}

impl ResolvedSchedule {
    pub fn resolve(schedule: &Schedule, reference: Tz) -> Self {
        Self {
            start: Bound::resolve(schedule.start.as_deref(), reference),
            end: Bound::resolve(schedule.end.as_deref(), reference),
        }
    }
}

/// Applies the visibility rules, in order:
///
/// 1. a bound the author wrote but we could not read hides the content;
/// 2. no bounds: always visible;
/// 3. start only: visible once `now` reaches it;
/// 4. end only: visible until `now` passes it;
/// 5. both: visible inside the closed window. An inverted window (start
///    after end) matches nothing.
pub fn evaluate(now: DateTime<Utc>, schedule: &ResolvedSchedule) -> Verdict {
    use Bound::*;

    let visible = match (schedule.start, schedule.end) {
        (Invalid, _) | (_, Invalid) => false,
        (Unset, Unset) => true,
        (At(start), Unset) => now >= start,
        (Unset, At(end)) => now <= end,
        (At(start), At(end)) => start <= now && now <= end,
    };

    if visible { Verdict::Visible } else { Verdict::Hidden }
}
