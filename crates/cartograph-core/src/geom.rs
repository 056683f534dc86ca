#![forbid(unsafe_code)]

pub type Unit = euclid::UnknownUnit;

pub type Point = euclid::Point2D<f64, Unit>;
pub type Vector = euclid::Vector2D<f64, Unit>;
pub type Size = euclid::Size2D<f64, Unit>;

pub fn point(x: f64, y: f64) -> Point {
    euclid::point2(x, y)
}

pub fn vector(x: f64, y: f64) -> Vector {
    euclid::vec2(x, y)
}

pub fn size(width: f64, height: f64) -> Size {
    euclid::size2(width, height)
}

/// Returns the size when both sides are finite and strictly positive.
pub fn positive_size(width: f64, height: f64) -> Option<Size> {
    let ok = |v: f64| v.is_finite() && v > 0.0;
    (ok(width) && ok(height)).then(|| size(width, height))
}
