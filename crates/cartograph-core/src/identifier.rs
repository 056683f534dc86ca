//! Identifier extraction from diagram shapes and the server-supplied identifier map.

use crate::error::Result;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// SVG extension namespace written by Visio exports (`v:mID`, `v:groupContext`, ...).
pub const VISIO_SVG_NAMESPACE: &str = "http://schemas.microsoft.com/visio/2003/SVGExtensions/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityId(pub i64);

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read-only mapping from a shape's embedded identifier to an activity id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierMap {
    entries: FxHashMap<String, ActivityId>,
}

impl IdentifierMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the JSON object injected into the page, e.g. `{"A1": 42, "7": "13"}`.
    ///
    /// Values may be integers (also written as integral floats such as `42.0`) or integer
    /// strings. Entries with any other value are dropped.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::from_json_value(&value))
    }

    pub fn from_json_value(value: &Value) -> Self {
        let mut out = Self::new();
        let Some(obj) = value.as_object() else {
            tracing::warn!("identifier map is not a JSON object; treating it as empty");
            return out;
        };
        for (key, raw) in obj {
            let id = match raw {
                Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral_f64)),
                Value::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            };
            match id {
                Some(id) => out.insert(key.clone(), ActivityId(id)),
                None => {
                    tracing::warn!(key = %key, value = %raw, "dropping non-integer activity id");
                }
            }
        }
        out
    }

    pub fn insert(&mut self, embedded_id: impl Into<String>, activity: ActivityId) {
        self.entries.insert(embedded_id.into(), activity);
    }

    pub fn get(&self, embedded_id: &str) -> Option<ActivityId> {
        self.entries.get(embedded_id).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, i64)> for IdentifierMap {
    fn from_iter<T: IntoIterator<Item = (K, i64)>>(iter: T) -> Self {
        let mut out = Self::new();
        for (k, v) in iter {
            out.insert(k, ActivityId(v));
        }
        out
    }
}

/// One way of reading an embedded identifier off an element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum IdentifierStrategy {
    /// An attribute in a specific XML namespace, e.g. Visio's `v:mID`.
    Namespaced { namespace: String, name: String },
    /// A plain (un-namespaced) attribute with an exact name.
    Attribute { name: String },
    /// The first attribute whose local name contains `needle`, ASCII case-insensitively.
    ///
    /// Deliberately permissive: it also matches plain `id` attributes.
    AnyContaining { needle: String },
}

impl IdentifierStrategy {
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::Namespaced {
                namespace: VISIO_SVG_NAMESPACE.to_string(),
                name: "mID".to_string(),
            },
            Self::Attribute {
                name: "v-mID".to_string(),
            },
            Self::Attribute {
                name: "data-shape-id".to_string(),
            },
            Self::AnyContaining {
                needle: "id".to_string(),
            },
        ]
    }

    pub fn extract<'a>(&self, node: roxmltree::Node<'a, '_>) -> Option<&'a str> {
        match self {
            Self::Namespaced { namespace, name } => {
                non_empty(node.attribute((namespace.as_str(), name.as_str())))
            }
            Self::Attribute { name } => non_empty(node.attribute(name.as_str())),
            Self::AnyContaining { needle } => {
                let needle = needle.to_ascii_lowercase();
                node.attributes()
                    .filter(|a| a.name().to_ascii_lowercase().contains(&needle))
                    .find_map(|a| non_empty(Some(a.value())))
            }
        }
    }
}

fn integral_f64(v: f64) -> Option<i64> {
    // i64::MAX is not representable; the exclusive upper bound is 2^63.
    let in_range = v >= i64::MIN as f64 && v < -(i64::MIN as f64);
    (v.is_finite() && v.fract() == 0.0 && in_range).then_some(v as i64)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Runs `strategies` in order; the first non-empty value wins.
pub fn extract_identifier<'a>(
    node: roxmltree::Node<'a, '_>,
    strategies: &[IdentifierStrategy],
) -> Option<&'a str> {
    strategies.iter().find_map(|s| s.extract(node))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_child_ids(svg: &str) -> Vec<Option<String>> {
        let doc = roxmltree::Document::parse(svg).unwrap();
        let strategies = IdentifierStrategy::defaults();
        doc.root_element()
            .children()
            .filter(|n| n.is_element())
            .map(|n| extract_identifier(n, &strategies).map(str::to_string))
            .collect()
    }

    #[test]
    fn strategies_are_prioritized() {
        let svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:v="{VISIO_SVG_NAMESPACE}">
                <g id="shape1" v:mID="A1" data-shape-id="B1"/>
                <g id="shape2" v-mID="A2" data-shape-id="B2"/>
                <g id="shape3" data-shape-id=" B3 "/>
                <g class="x" ShapeID="C4"/>
                <g id="shape5"/>
                <rect x="1"/>
            </svg>"#
        );
        assert_eq!(
            first_child_ids(&svg),
            vec![
                Some("A1".to_string()),
                Some("A2".to_string()),
                Some("B3".to_string()),
                Some("C4".to_string()),
                Some("shape5".to_string()),
                None,
            ]
        );
    }

    #[test]
    fn fallback_matches_any_attribute_containing_id() {
        // `width` contains "id"; the fallback takes it, the map lookup later drops it.
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><rect width="30"/></svg>"#;
        assert_eq!(first_child_ids(svg), vec![Some("30".to_string())]);
    }

    #[test]
    fn empty_values_fall_through() {
        let svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:v="{VISIO_SVG_NAMESPACE}">
                <g v:mID="  " data-shape-id="B1"/>
            </svg>"#
        );
        assert_eq!(first_child_ids(&svg), vec![Some("B1".to_string())]);
    }

    #[test]
    fn map_accepts_numbers_and_numeric_strings() {
        let map = IdentifierMap::from_json_str(r#"{"A1": 42, "A2": "7", "A3": null, "A4": 1.5}"#)
            .unwrap();
        assert_eq!(map.get("A1"), Some(ActivityId(42)));
        assert_eq!(map.get("A2"), Some(ActivityId(7)));
        assert_eq!(map.get("A3"), None);
        assert_eq!(map.get("A4"), None);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn map_accepts_integral_floats() {
        let map =
            IdentifierMap::from_json_str(r#"{"A1": 42.0, "A2": 1e2, "A3": -3.0, "A4": 1e300}"#)
                .unwrap();
        assert_eq!(map.get("A1"), Some(ActivityId(42)));
        assert_eq!(map.get("A2"), Some(ActivityId(100)));
        assert_eq!(map.get("A3"), Some(ActivityId(-3)));
        assert_eq!(map.get("A4"), None);
    }

    #[test]
    fn non_object_map_is_empty() {
        assert!(IdentifierMap::from_json_str("[1, 2]").unwrap().is_empty());
        assert!(IdentifierMap::from_json_str("not json").is_err());
    }
}
