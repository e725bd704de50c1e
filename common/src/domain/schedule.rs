use serde_json::{Map, Value};

// Attribute names as the authoring surface persists them.

pub const START_ATTRIBUTE: &str = "start";
pub const END_ATTRIBUTE: &str = "end";
pub const SHOW_PLACEHOLDER_ATTRIBUTE: &str = "showPlaceholder";
pub const PLACEHOLDER_TEXT_ATTRIBUTE: &str = "placeholderText";

/// The schedule an author attached to one container, as raw attribute text.
///
/// Both bounds are independently optional. An inverted window (start after
/// end) is allowed; it never matches any instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub start: Option<String>,
    pub end: Option<String>,
    pub show_placeholder: bool,
    pub placeholder_text: String,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            show_placeholder: false,
            placeholder_text: String::new(),
        }
    }
}

impl Schedule {
    /// Builds a schedule from a saved attribute object, applying defaults once.
    ///
    /// Authoring surfaces store attributes as a loose JSON object; anything
    /// missing, blank, or of the wrong type counts as unset.
    pub fn from_attributes(attributes: &Map<String, Value>) -> Self {
        Self {
            start: non_blank_string(attributes.get(START_ATTRIBUTE)),
            end: non_blank_string(attributes.get(END_ATTRIBUTE)),
            show_placeholder: attributes
                .get(SHOW_PLACEHOLDER_ATTRIBUTE)
                .and_then(Value::as_bool)
                .unwrap_or(false),
            placeholder_text: attributes
                .get(PLACEHOLDER_TEXT_ATTRIBUTE)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned(),
        }
    }

    pub fn has_bounds(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }
}

fn non_blank_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}
