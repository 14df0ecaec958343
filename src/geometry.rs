// Drag-vector geometry: direction, length, and how far the gradient box grows.

use crate::types::{Point, Rect};

/// Direction used when the drag has no length yet (straight down).
pub const ZERO_DRAG_ANGLE: f64 = 90.0;

/// Direction from `p1` to `p2` in degrees, in `[0, 360)`.
/// y grows downward, so 90° points down the image.
pub fn angle_deg(p1: Point, p2: Point) -> f64 {
    if p1 == p2 {
        return ZERO_DRAG_ANGLE;
    }
    let dy = p2.y as f64 - p1.y as f64;
    let dx = p2.x as f64 - p1.x as f64;
    (dy.atan2(dx).to_degrees() + 360.0) % 360.0
}

/// Euclidean distance, floored.
pub fn distance(p1: Point, p2: Point) -> u32 {
    let dx = p1.x as f64 - p2.x as f64;
    let dy = p1.y as f64 - p2.y as f64;
    (dx * dx + dy * dy).sqrt().floor() as u32
}

/// `1 + 2*dist/maxDim`. No upper clamp: a drag across the whole canvas
/// triples the box, and longer drags on small fills keep growing it.
pub fn growth_factor(dist: u32, max_dim: usize) -> f64 {
    if dist == 0 || max_dim == 0 {
        return 1.0;
    }
    1.0 + (dist as f64 * 2.0) / max_dim as f64
}

/// Scale `rect` by `factor` about its own centre.
pub fn enlarged_rect(rect: Rect, factor: f64) -> Rect {
    let width = rect.width * factor;
    let height = rect.height * factor;
    Rect {
        x: rect.x - (width - rect.width) / 2.0,
        y: rect.y - (height - rect.height) / 2.0,
        width,
        height,
    }
}

/// Everything the compositor needs from one drag position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragGeometry {
    pub angle: f64,
    pub distance: u32,
    pub factor: f64,
    pub rect: Rect,
}

impl DragGeometry {
    /// `canvas` is `(width, height)` of the surface being painted.
    pub fn from_drag(source: Point, current: Point, bounds: Rect, canvas: (usize, usize)) -> Self {
        let angle = angle_deg(source, current);
        let distance = distance(source, current);
        let factor = growth_factor(distance, canvas.0.max(canvas.1));
        Self { angle, distance, factor, rect: enlarged_rect(bounds, factor) }
    }
}
