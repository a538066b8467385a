//! Platform-neutral element attributes
//!
//! Android (`resource-id`, `content-desc`, ...) and iOS (`name`, `label`, `type`, ...)
//! snapshot dialects both map onto [`ElementAttributes`]; candidates carry the flattened
//! [`AttributeMap`] form so callers can filter on exact key/value pairs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Flattened attribute map keyed by the neutral attribute names below.
pub type AttributeMap = BTreeMap<String, String>;

pub const IDENTIFIER: &str = "identifier";
pub const ACCESSIBILITY_NAME: &str = "accessibility_name";
pub const TEXT: &str = "text";
pub const CONTENT_DESCRIPTION: &str = "content_description";
pub const CLASS_NAME: &str = "class_name";
pub const CLICKABLE: &str = "clickable";
pub const ENABLED: &str = "enabled";
pub const BOUNDS: &str = "bounds";

/// Attributes of one UI element after dialect normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementAttributes {
    pub identifier: Option<String>,
    pub accessibility_name: Option<String>,
    pub text: Option<String>,
    pub content_description: Option<String>,
    pub class_name: Option<String>,
    pub clickable: bool,
    pub enabled: bool,
    pub bounds: Option<String>,
}

impl ElementAttributes {
    /// Flatten into a map containing only populated attributes.
    pub fn to_map(&self) -> AttributeMap {
        let mut map = AttributeMap::new();
        let optional = [
            (IDENTIFIER, &self.identifier),
            (ACCESSIBILITY_NAME, &self.accessibility_name),
            (TEXT, &self.text),
            (CONTENT_DESCRIPTION, &self.content_description),
            (CLASS_NAME, &self.class_name),
            (BOUNDS, &self.bounds),
        ];
        for (key, value) in optional {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                map.insert(key.to_string(), value.to_string());
            }
        }
        map.insert(CLICKABLE.to_string(), self.clickable.to_string());
        map.insert(ENABLED.to_string(), self.enabled.to_string());
        map
    }

    /// True when every `(key, value)` in `required` is present with the same value.
    pub fn matches_all(map: &AttributeMap, required: &AttributeMap) -> bool {
        required
            .iter()
            .all(|(key, value)| map.get(key).is_some_and(|have| have == value))
    }

    pub fn text(&self) -> Option<&str> {
        non_empty(&self.text)
    }

    pub fn class_name(&self) -> Option<&str> {
        non_empty(&self.class_name)
    }

    pub fn identifier(&self) -> Option<&str> {
        non_empty(&self.identifier)
    }

    pub fn accessibility_name(&self) -> Option<&str> {
        non_empty(&self.accessibility_name)
    }

    pub fn content_description(&self) -> Option<&str> {
        non_empty(&self.content_description)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
