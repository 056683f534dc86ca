//! The CSS transform applied to the diagram content layer.
//!
//! Numbers are written with the shortest round-trippable decimal (JS `Number#toString`
//! semantics via `ryu-js`), so parsing the emitted string recovers the exact `f64` values.

use crate::error::{Error, Result};
use crate::geom::{Vector, vector};
use regex::Regex;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentTransform {
    pub pan_x: f64,
    pub pan_y: f64,
    pub scale: f64,
}

impl ContentTransform {
    pub fn new(pan: Vector, scale: f64) -> Self {
        Self {
            pan_x: pan.x,
            pan_y: pan.y,
            scale,
        }
    }

    pub fn pan(&self) -> Vector {
        vector(self.pan_x, self.pan_y)
    }

    /// `translate(<x>px, <y>px) scale(<s>)`
    pub fn to_css(&self) -> String {
        let mut buf = ryu_js::Buffer::new();
        let mut out = String::with_capacity(48);
        out.push_str("translate(");
        out.push_str(js_number(self.pan_x, &mut buf));
        out.push_str("px, ");
        out.push_str(js_number(self.pan_y, &mut buf));
        out.push_str("px) scale(");
        out.push_str(js_number(self.scale, &mut buf));
        out.push(')');
        out
    }

    pub fn parse_css(input: &str) -> Result<Self> {
        let err = || Error::Transform {
            input: input.to_string(),
        };
        let caps = css_transform_regex().captures(input.trim()).ok_or_else(err)?;
        let num = |i: usize| -> Result<f64> {
            caps.get(i)
                .and_then(|m| m.as_str().parse::<f64>().ok())
                .ok_or_else(err)
        };
        Ok(Self {
            pan_x: num(1)?,
            pan_y: num(2)?,
            scale: num(3)?,
        })
    }

    /// Zoom percentage shown next to the zoom buttons, e.g. `35%`.
    pub fn readout(&self) -> String {
        format!("{}%", (self.scale * 100.0).round())
    }
}

impl fmt::Display for ContentTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

impl FromStr for ContentTransform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_css(s)
    }
}

fn css_transform_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| {
        let num = r"([-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)";
        Regex::new(&format!(
            r"^translate\(\s*{num}(?:px)?\s*,\s*{num}(?:px)?\s*\)\s*scale\(\s*{num}\s*\)$"
        ))
        .expect("valid regex")
    })
}

fn js_number(v: f64, buf: &mut ryu_js::Buffer) -> &str {
    if !v.is_finite() {
        return "0";
    }
    buf.format_finite(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_uses_js_number_formatting() {
        let t = ContentTransform {
            pan_x: 50.0,
            pan_y: 20.0,
            scale: 0.35,
        };
        assert_eq!(t.to_css(), "translate(50px, 20px) scale(0.35)");
    }

    #[test]
    fn parse_recovers_exact_values() {
        let t = ContentTransform {
            pan_x: -123.456_789_012_345_6,
            pan_y: 1.0 / 3.0,
            scale: 0.1 * 1.15 * 1.15 * 1.15,
        };
        let back: ContentTransform = t.to_css().parse().unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn parse_accepts_exponents_and_unitless_translate() {
        let t = ContentTransform::parse_css("translate(1e+21, -2.5e-7px) scale(2)").unwrap();
        assert_eq!(t.pan_x, 1e21);
        assert_eq!(t.pan_y, -2.5e-7);
        assert_eq!(t.scale, 2.0);
    }

    #[test]
    fn parse_rejects_other_transforms() {
        assert!(ContentTransform::parse_css("rotate(45deg)").is_err());
        assert!(ContentTransform::parse_css("scale(2) translate(1px, 2px)").is_err());
    }

    #[test]
    fn readout_rounds_to_whole_percent() {
        let t = ContentTransform::new(vector(0.0, 0.0), 0.35);
        assert_eq!(t.readout(), "35%");
        let t = ContentTransform::new(vector(0.0, 0.0), 1.15 * 1.15);
        assert_eq!(t.readout(), "132%");
    }
}
