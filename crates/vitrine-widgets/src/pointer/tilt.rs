#![forbid(unsafe_code)]

//! 3D tilt on the carousel container.

use vitrine_core::config::TiltConfig;
use vitrine_core::{DomHandle, NodeId, Point, Rect};

/// Class added to the tilted container.
pub const TILT_CLASS: &str = "hero-tilt";

/// Rotation in degrees for a pointer at `at` over `rect`: a linear function
/// of the offset from center, normalized to [-1, 1] per axis and scaled by
/// `max_deg`. Returns `(rotate_y, rotate_x)`.
#[must_use]
pub fn tilt_angles(rect: Rect, at: Point, max_deg: f64) -> (f64, f64) {
    if rect.is_empty() {
        return (0.0, 0.0);
    }
    let center = rect.center();
    let nx = ((at.x - center.x) / (rect.width / 2.0)).clamp(-1.0, 1.0);
    let ny = ((at.y - center.y) / (rect.height / 2.0)).clamp(-1.0, 1.0);
    (nx * max_deg, -ny * max_deg)
}

fn fixed2(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{rounded:.2}")
}

/// CSS transform for the given angles.
#[must_use]
pub fn tilt_transform(perspective_px: f64, rotate_y: f64, rotate_x: f64) -> String {
    format!(
        "perspective({}px) rotateY({}deg) rotateX({}deg)",
        super::css_px(perspective_px),
        fixed2(rotate_y),
        fixed2(rotate_x)
    )
}

#[derive(Clone)]
pub struct Tilt {
    dom: DomHandle,
    target: NodeId,
    max_deg: f64,
    perspective_px: f64,
    tilted: bool,
}

impl std::fmt::Debug for Tilt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tilt")
            .field("target", &self.target)
            .field("max_deg", &self.max_deg)
            .field("tilted", &self.tilted)
            .finish_non_exhaustive()
    }
}

impl Tilt {
    pub fn new(dom: DomHandle, target: NodeId, cfg: &TiltConfig) -> Self {
        dom.add_class(target, TILT_CLASS);
        Self {
            dom,
            target,
            max_deg: cfg.max_deg,
            perspective_px: cfg.perspective_px,
            tilted: false,
        }
    }

    #[inline]
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Tilt toward `at` if it is over the container, otherwise reset.
    pub fn pointer_move(&mut self, at: Point) {
        let rect = self.dom.bounding_rect(self.target);
        if !rect.contains(at) {
            self.reset();
            return;
        }
        let (ry, rx) = tilt_angles(rect, at, self.max_deg);
        self.dom.set_style(
            self.target,
            "transform",
            &tilt_transform(self.perspective_px, ry, rx),
        );
        self.tilted = true;
    }

    /// Whether leaving `node` takes the pointer off this target.
    pub fn left_by(&self, node: NodeId) -> bool {
        self.dom.contains(node, self.target)
    }

    /// Back to flat. No-op when already flat.
    pub fn reset(&mut self) {
        if !self.tilted {
            return;
        }
        self.dom.set_style(
            self.target,
            "transform",
            &tilt_transform(self.perspective_px, 0.0, 0.0),
        );
        self.tilted = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_reaches_max() {
        let rect = Rect::new(0.0, 0.0, 200.0, 100.0);
        assert_eq!(tilt_angles(rect, Point { x: 200.0, y: 0.0 }, 8.0), (8.0, 8.0));
        assert_eq!(tilt_angles(rect, Point { x: 100.0, y: 50.0 }, 8.0), (0.0, -0.0));
        assert_eq!(tilt_angles(rect, Point { x: 150.0, y: 75.0 }, 8.0), (4.0, -4.0));
    }

    #[test]
    fn transform_text() {
        assert_eq!(
            tilt_transform(900.0, 4.0, -0.0),
            "perspective(900px) rotateY(4.00deg) rotateX(0.00deg)"
        );
        assert_eq!(
            tilt_transform(900.0, 1.23456, -7.999),
            "perspective(900px) rotateY(1.23deg) rotateX(-8.00deg)"
        );
    }
}
