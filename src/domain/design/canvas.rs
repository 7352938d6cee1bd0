//! Design canvas: artwork placement and the pointer gesture state machine.
//!
//! `DesignCanvas` owns the placement of the uploaded artwork inside one
//! product's printable area. Pointer events drive a small state machine:
//! a press on the scale handle starts a scale gesture, a press anywhere else on
//! the artwork starts a drag, and release (or the pointer leaving the canvas)
//! returns to idle. Every change to offset or scale goes through the same clamp
//! path, so the artwork never leaves the printable area.

use serde::{Deserialize, Serialize};
use std::f64::consts::SQRT_2;

use super::geometry::{
    clamp_position, clamp_scale, compute_boundary_box, max_scale, BoundaryBox, Point, Size, BASE_FOOTPRINT, SCALE_DRAG_DISTANCE,
    SCALE_STEP,
};
use crate::domain::aggregates::PrintableArea;

/// Radius of the scale handle's hit region, centred on the artwork's
/// bottom-right corner.
pub const HANDLE_RADIUS: f64 = 12.0;

/// Offset and scale of the artwork.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DesignPlacement {
    pub offset: Point,
    pub scale: f64,
}

impl Default for DesignPlacement {
    fn default() -> Self {
        Self { offset: Point::ORIGIN, scale: 1.0 }
    }
}

/// The default placement, with scale pulled into the legal range for `boundary`.
#[must_use]
pub fn reset_placement(boundary: &BoundaryBox) -> DesignPlacement {
    let scale = clamp_scale(1.0, boundary, BASE_FOOTPRINT);
    DesignPlacement { offset: clamp_position(Point::ORIGIN, scale, boundary, BASE_FOOTPRINT), scale }
}

/// Active gesture between pointer-down and pointer-up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Gesture {
    Idle,
    Dragging {
        /// Pointer position minus the artwork offset at press time.
        anchor: Point,
    },
    Scaling {
        /// Pointer position at press time.
        start: Point,
        /// Scale at press time.
        start_scale: f64,
    },
}

/// What a pointer press landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Hit {
    ScaleHandle,
    Artwork,
}

/// Raw pointer input, in rendered-image coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up,
    Leave,
}

/// Direction for the discrete scale buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleStep {
    Up,
    Down,
}

#[derive(Debug, Clone)]
pub struct DesignCanvas {
    area: PrintableArea,
    rendered: Size,
    boundary: BoundaryBox,
    placement: DesignPlacement,
    gesture: Gesture,
    has_artwork: bool,
}

impl DesignCanvas {
    #[must_use]
    pub fn new(area: PrintableArea, rendered: Size) -> Self {
        let boundary = compute_boundary_box(rendered, &area);
        Self { area, rendered, boundary, placement: reset_placement(&boundary), gesture: Gesture::Idle, has_artwork: false }
    }

    pub fn boundary(&self) -> &BoundaryBox {
        &self.boundary
    }

    pub fn placement(&self) -> DesignPlacement {
        self.placement
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn rendered(&self) -> Size {
        self.rendered
    }

    pub fn has_artwork(&self) -> bool {
        self.has_artwork
    }

    pub fn max_scale(&self) -> f64 {
        max_scale(&self.boundary, BASE_FOOTPRINT)
    }

    /// Centre of the artwork in rendered-image coordinates.
    pub fn artwork_center(&self) -> Point {
        self.boundary.center() + self.placement.offset
    }

    fn half_extent(&self) -> f64 {
        BASE_FOOTPRINT * self.placement.scale / 2.0
    }

    pub fn handle_center(&self) -> Point {
        let half = self.half_extent();
        self.artwork_center() + Point::new(half, half)
    }

    /// Switches to another product's printable area. Placement resets.
    pub fn set_product(&mut self, area: PrintableArea) {
        self.area = area;
        self.boundary = compute_boundary_box(self.rendered, &self.area);
        self.reset_placement();
    }

    /// The product image was re-laid out; keep the placement but re-clamp it.
    /// Ends any gesture in flight.
    pub fn resize(&mut self, rendered: Size) {
        self.rendered = Size::new(rendered.width, rendered.height);
        self.boundary = compute_boundary_box(self.rendered, &self.area);
        self.gesture = Gesture::Idle;
        self.apply_scale(self.placement.scale);
    }

    /// A new artwork file replaced the previous one. Placement resets.
    pub fn artwork_uploaded(&mut self) {
        self.has_artwork = true;
        self.reset_placement();
    }

    pub fn reset_placement(&mut self) {
        self.placement = reset_placement(&self.boundary);
        self.gesture = Gesture::Idle;
    }

    /// Hit-tests against the artwork. The scale handle wins over the body.
    pub fn hit_test(&self, point: Point) -> Option<Hit> {
        if !self.has_artwork {
            return None;
        }
        if point.distance(self.handle_center()) <= HANDLE_RADIUS {
            return Some(Hit::ScaleHandle);
        }
        let d = point - self.artwork_center();
        let half = self.half_extent();
        (d.x.abs() <= half && d.y.abs() <= half).then_some(Hit::Artwork)
    }

    pub fn handle(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down(p) => {
                self.pointer_down(p);
            }
            PointerEvent::Move(p) => self.pointer_move(p),
            PointerEvent::Up | PointerEvent::Leave => self.pointer_up(),
        }
    }

    /// Starts a gesture if the press lands on the artwork. A press during a
    /// gesture first ends it, as if the release had been seen.
    pub fn pointer_down(&mut self, point: Point) -> Option<Hit> {
        self.pointer_up();
        let hit = self.hit_test(point)?;
        self.gesture = match hit {
            Hit::ScaleHandle => Gesture::Scaling { start: point, start_scale: self.placement.scale },
            Hit::Artwork => Gesture::Dragging { anchor: point - self.placement.offset },
        };
        Some(hit)
    }

    pub fn pointer_move(&mut self, point: Point) {
        match self.gesture {
            Gesture::Idle => {}
            Gesture::Dragging { anchor } => {
                let raw = point - anchor;
                self.placement.offset = clamp_position(raw, self.placement.scale, &self.boundary, BASE_FOOTPRINT);
            }
            Gesture::Scaling { start, start_scale } => {
                // Project onto the outward diagonal: dragging away from the
                // artwork grows it, dragging inward shrinks it.
                let d = point - start;
                let outward = (d.x + d.y) / SQRT_2;
                self.apply_scale(start_scale * (1.0 + outward / SCALE_DRAG_DISTANCE));
            }
        }
    }

    pub fn pointer_up(&mut self) {
        self.gesture = Gesture::Idle;
    }

    pub fn step_scale(&mut self, step: ScaleStep) {
        let delta = match step {
            ScaleStep::Up => SCALE_STEP,
            ScaleStep::Down => -SCALE_STEP,
        };
        self.apply_scale(self.placement.scale + delta);
    }

    /// Sets the scale, then re-clamps the offset for the new footprint.
    pub fn apply_scale(&mut self, requested: f64) {
        let scale = clamp_scale(requested, &self.boundary, BASE_FOOTPRINT);
        self.placement.scale = scale;
        self.placement.offset = clamp_position(self.placement.offset, scale, &self.boundary, BASE_FOOTPRINT);
    }
}
