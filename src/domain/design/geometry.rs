//! Placement geometry for artwork on a garment.
//!
//! All coordinates are CSS pixels in the space of the rendered product image,
//! origin at its top-left corner. Artwork offsets are measured from the centre
//! of the printable area. Every function here is total: out-of-range and
//! non-finite inputs are clamped, never rejected.

use serde::{Deserialize, Serialize};
use crate::domain::aggregates::PrintableArea;

/// Edge length of the unscaled artwork square.
pub const BASE_FOOTPRINT: f64 = 128.0;
/// Smallest scale the artwork may take.
pub const MIN_SCALE: f64 = 0.5;
/// Increment applied by the `+`/`-` scale buttons.
pub const SCALE_STEP: f64 = 0.1;
/// Share of the printable area the artwork may cover at maximum scale.
pub const EDGE_MARGIN: f64 = 0.9;
/// Pointer travel in pixels that doubles the scale during a handle drag.
pub const SCALE_DRAG_DISTANCE: f64 = 100.0;

/// A point or displacement.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        let d = self - other;
        d.x.hypot(d.y)
    }
}

impl std::ops::Add for Point {
    type Output = Point;
    fn add(self, other: Point) -> Point { Point::new(self.x + other.x, self.y + other.y) }
}

impl std::ops::Sub for Point {
    type Output = Point;
    fn sub(self, other: Point) -> Point { Point::new(self.x - other.x, self.y - other.y) }
}

/// Rendered size of the product image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// Negative or non-finite dimensions collapse to zero.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        let dim = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        Self { width: dim(width), height: dim(height) }
    }
}

/// Pixel rectangle of the printable area inside the rendered image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundaryBox {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundaryBox {
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// Whether artwork of the given scale, centred at `offset` from this box's
    /// centre, lies entirely inside the box (within `tolerance` pixels).
    #[must_use]
    pub fn contains_artwork(&self, offset: Point, scale: f64, tolerance: f64) -> bool {
        let half = BASE_FOOTPRINT * scale / 2.0;
        offset.x.abs() + half <= self.width / 2.0 + tolerance && offset.y.abs() + half <= self.height / 2.0 + tolerance
    }
}

/// Scales the fractional printable area by the rendered image size.
#[must_use]
pub fn compute_boundary_box(rendered: Size, area: &PrintableArea) -> BoundaryBox {
    let rendered = Size::new(rendered.width, rendered.height);
    BoundaryBox {
        top: rendered.height * area.top(),
        left: rendered.width * area.left(),
        width: rendered.width * (area.right() - area.left()),
        height: rendered.height * (area.bottom() - area.top()),
    }
}

/// Largest legal scale: the artwork may cover 90% of the shorter side of the
/// boundary, and never less than [`MIN_SCALE`].
#[must_use]
pub fn max_scale(boundary: &BoundaryBox, base_footprint: f64) -> f64 {
    let limit = EDGE_MARGIN * boundary.width.min(boundary.height) / base_footprint;
    if limit.is_finite() { limit.max(MIN_SCALE) } else { MIN_SCALE }
}

/// Clamps a requested scale into `[MIN_SCALE, max_scale]`. NaN maps to the minimum.
#[must_use]
pub fn clamp_scale(scale: f64, boundary: &BoundaryBox, base_footprint: f64) -> f64 {
    let upper = max_scale(boundary, base_footprint);
    if scale.is_nan() { MIN_SCALE } else { scale.clamp(MIN_SCALE, upper) }
}

/// Clamps an offset so the scaled artwork stays inside the boundary.
///
/// When the artwork is wider or taller than the boundary even at this scale the
/// legal range on that axis collapses to zero.
#[must_use]
pub fn clamp_position(offset: Point, scale: f64, boundary: &BoundaryBox, base_footprint: f64) -> Point {
    let half = base_footprint * scale / 2.0;
    let max_x = (boundary.width / 2.0 - half).max(0.0);
    let max_y = (boundary.height / 2.0 - half).max(0.0);
    Point::new(clamp_axis(offset.x, max_x), clamp_axis(offset.y, max_y))
}

fn clamp_axis(value: f64, max: f64) -> f64 {
    if value.is_nan() || max.is_nan() { 0.0 } else { value.clamp(-max, max) }
}
