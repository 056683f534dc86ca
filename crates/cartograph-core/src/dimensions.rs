//! Content size of an inlined diagram, read from its root element.

use crate::geom::{Size, positive_size};
use std::str::FromStr;
use svgtypes::{Length, LengthUnit, ViewBox};

/// `viewBox` width/height first, then `width`/`height` (unitless or `px`).
///
/// Percentages and other relative units are unknown. `None` means the caller should fall back
/// to the default scale.
pub fn content_size(root: roxmltree::Node<'_, '_>) -> Option<Size> {
    if let Some(size) = root
        .attribute("viewBox")
        .and_then(|vb| ViewBox::from_str(vb).ok())
        .and_then(|vb| positive_size(vb.w, vb.h))
    {
        return Some(size);
    }

    let width = root.attribute("width").and_then(absolute_px);
    let height = root.attribute("height").and_then(absolute_px);
    let size = positive_size(width?, height?);
    if size.is_none() {
        tracing::warn!(?width, ?height, "diagram has non-positive dimensions");
    }
    size
}

fn absolute_px(raw: &str) -> Option<f64> {
    let len = Length::from_str(raw.trim()).ok()?;
    match len.unit {
        LengthUnit::None | LengthUnit::Px => Some(len.number),
        _ => None,
    }
}
