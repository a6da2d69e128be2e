#![forbid(unsafe_code)]

//! Detail modal opened from cards.
//!
//! A card carries its content in `data-image`, `data-title`, `data-date` and
//! `data-description`. Clicking it copies those values into the modal's
//! slots and opens the modal with the card as trigger, so focus returns to
//! the card on close.

use tracing::debug;
use vitrine_core::config::ModalConfig;
use vitrine_core::{DomHandle, EventOutcome, InteractionError, NodeId};
use vitrine_runtime::AppContext;

use super::OverlayId;
use super::controller::OverlayController;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Slots {
    image: Option<NodeId>,
    title: Option<NodeId>,
    date: Option<NodeId>,
    description: Option<NodeId>,
}

#[derive(Clone)]
pub struct DetailModal {
    dom: DomHandle,
    overlay: OverlayId,
    container: NodeId,
    card_selector: String,
    slots: Slots,
}

impl std::fmt::Debug for DetailModal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetailModal")
            .field("overlay", &self.overlay)
            .field("card_selector", &self.card_selector)
            .finish_non_exhaustive()
    }
}

impl DetailModal {
    /// Register the modal container with `overlays` and resolve its slots.
    pub fn mount(
        ctx: &AppContext,
        overlays: &mut OverlayController,
        cfg: &ModalConfig,
    ) -> Result<Self, InteractionError> {
        let overlay = overlays.register_modal(cfg)?;
        let dom = ctx.dom().clone();
        let container = overlays
            .container(overlay)
            .ok_or_else(|| InteractionError::missing("modal", &cfg.container))?;
        let slot = |selector: &str| dom.query(Some(container), selector);
        let slots = Slots {
            image: slot(&cfg.image),
            title: slot(&cfg.title),
            date: slot(&cfg.date),
            description: slot(&cfg.description),
        };
        debug!(?overlay, ?slots, "detail modal mounted");
        Ok(Self {
            dom,
            overlay,
            container,
            card_selector: cfg.card.clone(),
            slots,
        })
    }

    #[inline]
    pub fn overlay(&self) -> OverlayId {
        self.overlay
    }

    /// Copy a card's data into the modal slots.
    pub fn fill(&self, card: NodeId) {
        let dom = self.dom.as_ref();
        let data = |name: &str| dom.attribute(card, name).unwrap_or_default();
        let title = data("data-title");

        if let Some(image) = self.slots.image {
            match dom.attribute(card, "data-image") {
                Some(src) => dom.set_attribute(image, "src", &src),
                None => dom.remove_attribute(image, "src"),
            }
            dom.set_attribute(image, "alt", &title);
        }
        if let Some(slot) = self.slots.title {
            dom.set_text(slot, &title);
        }
        if let Some(slot) = self.slots.date {
            dom.set_text(slot, &data("data-date"));
        }
        if let Some(slot) = self.slots.description {
            dom.set_text(slot, &data("data-description"));
        }
    }

    /// Open from a click on (or inside) a card.
    pub fn handle_click(&self, overlays: &mut OverlayController, target: NodeId) -> EventOutcome {
        if overlays.is_open(self.overlay) || self.dom.contains(self.container, target) {
            return EventOutcome::IGNORED;
        }
        let Some(card) = self.dom.closest(target, &self.card_selector) else {
            return EventOutcome::IGNORED;
        };
        self.fill(card);
        overlays.open_with_trigger(self.overlay, Some(card));
        EventOutcome::PREVENTED
    }
}
