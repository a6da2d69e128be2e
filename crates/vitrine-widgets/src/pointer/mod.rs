#![forbid(unsafe_code)]

//! Pointer-driven effects: parallax translation and 3D tilt.
//!
//! Both are decorative. They are mounted only for fine pointers without
//! reduced motion (tilt additionally needs hover), and reset to zero when
//! the pointer leaves them.

mod parallax;
mod tilt;

pub use parallax::{ParallaxScene, effective_depth, normalized_offset, parallax_offset};
pub use tilt::{TILT_CLASS, Tilt, tilt_angles, tilt_transform};

use tracing::debug;
use vitrine_core::config::{CarouselConfig, ParallaxConfig, TiltConfig};
use vitrine_core::{NodeId, Point};
use vitrine_runtime::AppContext;

fn css_px(value: f64) -> String {
    crate::carousel::css_number(value)
}

/// All pointer effects on the page.
#[derive(Debug, Default)]
pub struct PointerLayer {
    tilt: Option<Tilt>,
    scenes: Vec<ParallaxScene>,
}

impl PointerLayer {
    /// Mount tilt on the carousel root and a scene per parallax container.
    /// Returns an empty layer when the environment rules the effects out.
    #[must_use]
    pub fn mount(
        ctx: &AppContext,
        carousel: &CarouselConfig,
        tilt: &TiltConfig,
        parallax: &ParallaxConfig,
    ) -> Self {
        let pointer = ctx.pointer();
        if ctx.reduced_motion() || !pointer.fine {
            debug!(reduced_motion = ctx.reduced_motion(), ?pointer, "pointer effects disabled");
            return Self::default();
        }
        let dom = ctx.dom();

        let tilt = if pointer.supports_hover_effects() {
            dom.query(None, &carousel.root)
                .map(|root| Tilt::new(dom.clone(), root, tilt))
        } else {
            None
        };
        let scenes: Vec<ParallaxScene> = dom
            .query_all(None, &parallax.root)
            .into_iter()
            .map(|root| ParallaxScene::new(dom.clone(), root, parallax))
            .collect();

        debug!(tilt = tilt.is_some(), scenes = scenes.len(), "pointer effects mounted");
        Self { tilt, scenes }
    }

    pub fn is_active(&self) -> bool {
        self.tilt.is_some() || !self.scenes.is_empty()
    }

    pub fn has_tilt(&self) -> bool {
        self.tilt.is_some()
    }

    pub fn pointer_move(&mut self, at: Point) {
        if let Some(tilt) = self.tilt.as_mut() {
            tilt.pointer_move(at);
        }
        for scene in &mut self.scenes {
            scene.pointer_move(at);
        }
    }

    /// Flatten the effects the pointer left. Leaving `target` resets the
    /// tilt and scenes at or under it; `None` (the document) resets all.
    pub fn pointer_leave(&mut self, target: Option<NodeId>) {
        let left = |owned: bool| target.is_none() || owned;
        if let Some(tilt) = self.tilt.as_mut() {
            if left(target.is_some_and(|node| tilt.left_by(node))) {
                tilt.reset();
            }
        }
        for scene in &mut self.scenes {
            if left(target.is_some_and(|node| scene.left_by(node))) {
                scene.reset();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use vitrine_core::dom::memory::MemoryDom;
    use vitrine_core::{Dom, Environment, ManualClock, PointerCapabilities, Rect};

    fn page(env: Environment) -> (Rc<MemoryDom>, PointerLayer, NodeId) {
        let dom = Rc::new(MemoryDom::new());
        let hero = dom.append_with(dom.body(), "div", &[("id", "hero-left")]);
        dom.set_rect(hero, Rect::new(0.0, 0.0, 400.0, 300.0));
        let scene = dom.append_with(dom.body(), "section", &[("data-parallax", "")]);
        dom.append_with(scene, "img", &[("data-depth", "0.5")]);
        let ctx = AppContext::new(dom.clone(), Rc::new(ManualClock::new()), &env);
        let layer = PointerLayer::mount(
            &ctx,
            &CarouselConfig::default(),
            &TiltConfig::default(),
            &ParallaxConfig::default(),
        );
        (dom, layer, hero)
    }

    #[test]
    fn tilt_follows_pointer_and_resets_on_leave() {
        let (dom, mut layer, hero) = page(Environment::default());
        assert!(layer.has_tilt());
        assert!(dom.has_class(hero, TILT_CLASS));

        layer.pointer_move(Point { x: 400.0, y: 150.0 });
        assert_eq!(
            dom.style(hero, "transform").as_deref(),
            Some("perspective(900px) rotateY(8.00deg) rotateX(0.00deg)")
        );
        layer.pointer_leave(Some(hero));
        assert_eq!(
            dom.style(hero, "transform").as_deref(),
            Some("perspective(900px) rotateY(0.00deg) rotateX(0.00deg)")
        );
    }

    #[test]
    fn coarse_pointer_or_reduced_motion_disables() {
        let (_, layer, _) = page(Environment::default().with_pointer(PointerCapabilities::COARSE));
        assert!(!layer.is_active());
        let (_, layer, _) = page(Environment::default().with_reduced_motion(true));
        assert!(!layer.is_active());
    }

    #[test]
    fn fine_pointer_without_hover_keeps_parallax_only() {
        let caps = PointerCapabilities {
            fine: true,
            hover: false,
        };
        let (_, layer, _) = page(Environment::default().with_pointer(caps));
        assert!(layer.is_active());
        assert!(!layer.has_tilt());
    }

    #[test]
    fn leaving_one_effect_keeps_the_other() {
        let (dom, mut layer, hero) = page(Environment::default());
        let scene = dom.query(None, "[data-parallax]").unwrap();
        dom.set_rect(scene, Rect::new(0.0, 0.0, 400.0, 300.0));
        let item = dom.query(Some(scene), "[data-depth]").unwrap();

        layer.pointer_move(Point { x: 400.0, y: 150.0 });
        let tilted = dom.style(hero, "transform");
        let shifted = dom.style(item, "transform");
        assert!(tilted.as_deref().is_some_and(|t| t.contains("rotateY(8.00deg)")));

        layer.pointer_leave(Some(scene));
        assert_eq!(dom.style(hero, "transform"), tilted);
        assert_ne!(dom.style(item, "transform"), shifted);
        assert_eq!(
            dom.style(item, "transform").as_deref(),
            Some("translate3d(0.00px, 0.00px, 0)")
        );

        layer.pointer_leave(Some(item));
        assert_eq!(dom.style(hero, "transform"), tilted);

        layer.pointer_leave(None);
        assert_eq!(
            dom.style(hero, "transform").as_deref(),
            Some("perspective(900px) rotateY(0.00deg) rotateX(0.00deg)")
        );
    }

    #[test]
    fn debug_lists_effects() {
        let (_, layer, _) = page(Environment::default());
        let shown = format!("{layer:?}");
        assert!(shown.contains("Tilt"));
        assert!(shown.contains("ParallaxScene"));
        assert!(shown.contains("tilted: false"));
    }
}
