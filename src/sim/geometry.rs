//! Primitive intersection tests
//!
//! Everything here is pure and allocation-free. Rectangles are stored by their
//! top-left corner; rotated rectangles turn about their own center.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Parallel segments (cross product below this) are treated as non-intersecting
const PARALLEL_EPSILON: f32 = 1e-6;

/// Axis-aligned rectangle, top-left origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle of the given size centered on `center`
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        Self::new(center.x - size.x / 2.0, center.y - size.y / 2.0, size.x, size.y)
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.width, self.y + self.height)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Strict containment (points on the boundary are outside)
    pub fn contains_strict(&self, p: Vec2) -> bool {
        p.x > self.x && p.x < self.x + self.width && p.y > self.y && p.y < self.y + self.height
    }

    /// The four edges, clockwise from the top-left corner
    pub fn edges(&self) -> [(Vec2, Vec2); 4] {
        let tl = self.min();
        let br = self.max();
        let tr = Vec2::new(br.x, tl.y);
        let bl = Vec2::new(tl.x, br.y);
        [(tl, tr), (tr, br), (br, bl), (bl, tl)]
    }

    /// Same size, centered on the origin (a rotated rect's local frame)
    pub fn local(&self) -> Self {
        Self::centered(Vec2::ZERO, Vec2::new(self.width, self.height))
    }
}

/// Rotate `p` by `degrees` about `pivot`
#[inline]
pub fn rotate_about(p: Vec2, pivot: Vec2, degrees: f32) -> Vec2 {
    pivot + Vec2::from_angle(degrees.to_radians()).rotate(p - pivot)
}

/// Intersection of segments `p1-p2` and `q1-q2`.
///
/// Returns the parameter along `p1-p2` (0..=1) and the hit point.
pub fn segment_intersection(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2) -> Option<(f32, Vec2)> {
    let r = p2 - p1;
    let s = q2 - q1;
    let denom = r.perp_dot(s);
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }

    let qp = q1 - p1;
    let t = qp.perp_dot(s) / denom;
    let u = qp.perp_dot(r) / denom;

    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some((t, p1 + r * t))
    } else {
        None
    }
}

#[inline]
pub fn segments_intersect(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2) -> bool {
    segment_intersection(p1, p2, q1, q2).is_some()
}

/// Does segment `p1-p2` touch the axis-aligned `rect`?
///
/// A segment that starts strictly inside the rectangle counts as a hit even
/// if it never crosses an edge. Rotation is not handled here; see
/// [`segment_intersects_rotated_rect`].
pub fn segment_intersects_rect(p1: Vec2, p2: Vec2, rect: &Rect) -> bool {
    // Broad phase: segment bounds vs rect
    let seg_min = p1.min(p2);
    let seg_max = p1.max(p2);
    let r_min = rect.min();
    let r_max = rect.max();
    if seg_max.x < r_min.x || seg_min.x > r_max.x || seg_max.y < r_min.y || seg_min.y > r_max.y {
        return false;
    }

    if rect.contains_strict(p1) {
        return true;
    }

    rect.edges()
        .iter()
        .any(|&(a, b)| segments_intersect(p1, p2, a, b))
}

/// Segment test against a rectangle rotated `rotation_deg` about its center.
///
/// The segment is moved into the rectangle's local frame and tested against
/// the unrotated, origin-centered box.
pub fn segment_intersects_rotated_rect(p1: Vec2, p2: Vec2, rect: &Rect, rotation_deg: f32) -> bool {
    if rotation_deg == 0.0 {
        return segment_intersects_rect(p1, p2, rect);
    }
    let center = rect.center();
    let inv = Vec2::from_angle(-rotation_deg.to_radians());
    let l1 = inv.rotate(p1 - center);
    let l2 = inv.rotate(p2 - center);
    segment_intersects_rect(l1, l2, &rect.local())
}

/// Circle vs rectangle rotated `rotation_deg` about its own center.
///
/// Exact: the circle center is taken into the box's local frame and clamped
/// to the half-extents to find the closest point.
pub fn circle_intersects_rotated_rect(
    center: Vec2,
    radius: f32,
    rect: &Rect,
    rotation_deg: f32,
) -> bool {
    let half = rect.half_extents();
    let inv = Vec2::from_angle(-rotation_deg.to_radians());
    let local = inv.rotate(center - rect.center());
    let closest = local.clamp(-half, half);
    local.distance(closest) < radius
}
