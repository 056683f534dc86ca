//! Re-emits diagram markup with bound shapes marked as interactive.

use crate::binder::{BindingSet, Diagram};
use crate::config::BinderConfig;
use crate::error::Result;

pub const ACTIVITY_ATTRIBUTE: &str = "data-activity-id";

/// Adds `data-activity-id="<id>"` and a `cursor` presentation attribute to the start tag of
/// every bound element. All other bytes of the markup are kept as-is, and attributes already
/// present on an element are never duplicated.
pub fn annotate(diagram: &Diagram, bindings: &BindingSet, config: &BinderConfig) -> Result<String> {
    let markup = diagram.markup();
    let doc = diagram.document()?;

    let mut inserts: Vec<(usize, String)> = Vec::with_capacity(bindings.len());
    for binding in bindings {
        let Some(node) = doc.get_node(binding.node) else {
            continue;
        };
        let mut attrs = String::new();
        if node.attribute(ACTIVITY_ATTRIBUTE).is_none() {
            attrs.push_str(&format!(r#" {ACTIVITY_ATTRIBUTE}="{}""#, binding.activity_id));
        }
        if node.attribute("cursor").is_none() && !config.cursor.is_empty() {
            attrs.push_str(&format!(r#" cursor="{}""#, escape_attr(&config.cursor)));
        }
        if attrs.is_empty() {
            continue;
        }
        inserts.push((tag_name_end(markup, binding.range.start), attrs));
    }
    inserts.sort_by_key(|(at, _)| *at);

    let mut out = String::with_capacity(markup.len() + inserts.len() * 40);
    let mut cursor = 0;
    for (at, attrs) in inserts {
        out.push_str(&markup[cursor..at]);
        out.push_str(&attrs);
        cursor = at;
    }
    out.push_str(&markup[cursor..]);
    Ok(out)
}

/// Byte offset just past the element name of the start tag beginning at `start` (`<`).
fn tag_name_end(markup: &str, start: usize) -> usize {
    let name_start = start + 1;
    markup[name_start..]
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .map_or(markup.len(), |i| name_start + i)
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}
