#![forbid(unsafe_code)]

//! Depth-scaled pointer parallax.

use tracing::warn;
use vitrine_core::config::ParallaxConfig;
use vitrine_core::{DomHandle, NodeId, Point, Rect};

/// Normalized pointer offset from the center of `rect`, in [-0.5, 0.5].
#[must_use]
pub fn normalized_offset(rect: Rect, at: Point) -> (f64, f64) {
    if rect.is_empty() {
        return (0.0, 0.0);
    }
    let nx = ((at.x - rect.x) / rect.width - 0.5).clamp(-0.5, 0.5);
    let ny = ((at.y - rect.y) / rect.height - 0.5).clamp(-0.5, 0.5);
    (nx, ny)
}

/// Depth factors with magnitude up to 1 are fractions of a 100 px range.
#[must_use]
pub fn effective_depth(depth: f64) -> f64 {
    if depth.abs() <= 1.0 { depth * 100.0 } else { depth }
}

/// Translation for one element, clamped to `±max_px`.
#[must_use]
pub fn parallax_offset(offset: (f64, f64), depth: f64, max_px: f64) -> (f64, f64) {
    let depth = effective_depth(depth);
    (
        (offset.0 * depth).clamp(-max_px, max_px),
        (offset.1 * depth).clamp(-max_px, max_px),
    )
}

fn translate(x: f64, y: f64) -> String {
    let fix = |v: f64| {
        let r = (v * 100.0).round() / 100.0;
        if r == 0.0 { 0.0 } else { r }
    };
    format!("translate3d({:.2}px, {:.2}px, 0)", fix(x), fix(y))
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Layer {
    node: NodeId,
    depth: f64,
}

/// One reference container and its depth-tagged layers.
#[derive(Clone)]
pub struct ParallaxScene {
    dom: DomHandle,
    root: NodeId,
    layers: Vec<Layer>,
    max_offset_px: f64,
    displaced: bool,
}

impl std::fmt::Debug for ParallaxScene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParallaxScene")
            .field("root", &self.root)
            .field("layers", &self.layers)
            .field("displaced", &self.displaced)
            .finish_non_exhaustive()
    }
}

impl ParallaxScene {
    /// Collect `[data-depth]` layers under `root`. Layers whose depth does
    /// not parse are skipped.
    pub fn new(dom: DomHandle, root: NodeId, cfg: &ParallaxConfig) -> Self {
        let layers = dom
            .query_all(Some(root), &cfg.item)
            .into_iter()
            .filter_map(|node| {
                let raw = dom.attribute(node, "data-depth")?;
                match raw.trim().parse::<f64>() {
                    Ok(depth) if depth.is_finite() => Some(Layer { node, depth }),
                    _ => {
                        warn!(?node, raw = %raw, "ignoring malformed data-depth");
                        None
                    }
                }
            })
            .collect();
        Self {
            dom,
            root,
            layers,
            max_offset_px: cfg.max_offset_px,
            displaced: false,
        }
    }

    #[inline]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn pointer_move(&mut self, at: Point) {
        let rect = self.dom.bounding_rect(self.root);
        if !rect.contains(at) {
            self.reset();
            return;
        }
        let offset = normalized_offset(rect, at);
        for layer in &self.layers {
            let (x, y) = parallax_offset(offset, layer.depth, self.max_offset_px);
            self.dom.set_style(layer.node, "transform", &translate(x, y));
        }
        self.displaced = true;
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Whether leaving `node` takes the pointer out of this scene.
    pub fn left_by(&self, node: NodeId) -> bool {
        self.dom.contains(node, self.root)
    }

    pub fn reset(&mut self) {
        if !self.displaced {
            return;
        }
        for layer in &self.layers {
            self.dom.set_style(layer.node, "transform", &translate(0.0, 0.0));
        }
        self.displaced = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::rc::Rc;
    use vitrine_core::dom::memory::MemoryDom;

    #[test]
    fn fractional_depth_is_rescaled() {
        assert_eq!(effective_depth(0.3), 30.0);
        assert_eq!(effective_depth(-1.0), -100.0);
        assert_eq!(effective_depth(20.0), 20.0);
    }

    #[test]
    fn offset_is_centered() {
        let rect = Rect::new(100.0, 100.0, 200.0, 100.0);
        assert_eq!(normalized_offset(rect, Point { x: 200.0, y: 150.0 }), (0.0, 0.0));
        assert_eq!(normalized_offset(rect, Point { x: 300.0, y: 100.0 }), (0.5, -0.5));
    }

    #[test]
    fn scene_writes_translations_and_resets() {
        let dom = Rc::new(MemoryDom::new());
        let root = dom.append_with(dom.body(), "section", &[("data-parallax", "")]);
        dom.set_rect(root, Rect::new(0.0, 0.0, 400.0, 200.0));
        let near = dom.append_with(root, "img", &[("data-depth", "0.2")]);
        let far = dom.append_with(root, "img", &[("data-depth", "120")]);
        let _bad = dom.append_with(root, "img", &[("data-depth", "deep")]);

        let mut scene = ParallaxScene::new(dom.clone(), root, &ParallaxConfig::default());
        assert_eq!(scene.layer_count(), 2);

        scene.pointer_move(Point { x: 400.0, y: 100.0 });
        assert_eq!(
            dom.style(near, "transform").as_deref(),
            Some("translate3d(10.00px, 0.00px, 0)")
        );
        assert_eq!(
            dom.style(far, "transform").as_deref(),
            Some("translate3d(40.00px, 0.00px, 0)")
        );

        scene.pointer_move(Point { x: 900.0, y: 100.0 });
        assert_eq!(
            dom.style(far, "transform").as_deref(),
            Some("translate3d(0.00px, 0.00px, 0)")
        );
    }

    proptest! {
        #[test]
        fn offsets_stay_clamped(x in -500.0f64..1500.0, y in -500.0f64..1500.0, depth in -200.0f64..200.0) {
            let rect = Rect::new(0.0, 0.0, 1000.0, 1000.0);
            let (dx, dy) = parallax_offset(normalized_offset(rect, Point { x, y }), depth, 40.0);
            prop_assert!(dx.abs() <= 40.0);
            prop_assert!(dy.abs() <= 40.0);
        }
    }
}
