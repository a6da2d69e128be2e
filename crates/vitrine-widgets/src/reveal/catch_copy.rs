#![forbid(unsafe_code)]

//! Staggered catch-copy lines.

use tracing::debug;
use vitrine_core::config::CatchCopyConfig;
use vitrine_core::InteractionError;
use vitrine_runtime::AppContext;

/// Class that starts the line transitions.
pub const READY_CLASS: &str = "ready";

/// Give each line of every catch card its transition delay, then mark the
/// card ready on the next frame so the delays are committed first. Returns
/// the number of cards primed.
pub fn prime_catch_copy(ctx: &AppContext, cfg: &CatchCopyConfig) -> Result<usize, InteractionError> {
    let dom = ctx.dom();
    let cards = dom.query_all(None, &cfg.root);
    if cards.is_empty() {
        return Err(InteractionError::missing("catch copy", &cfg.root));
    }
    let reduced = ctx.reduced_motion();

    for &card in &cards {
        for (i, line) in dom.query_all(Some(card), &cfg.line).into_iter().enumerate() {
            let delay = if reduced { 0.0 } else { i as f64 * cfg.step_ms };
            dom.set_style(
                line,
                "transition-delay",
                &format!("{}ms", crate::carousel::css_number(delay)),
            );
        }
        if reduced {
            dom.add_class(card, READY_CLASS);
        } else {
            let dom = dom.clone();
            ctx.request_frame(move |_| dom.add_class(card, READY_CLASS));
        }
    }
    debug!(cards = cards.len(), reduced, "catch copy primed");
    Ok(cards.len())
}
