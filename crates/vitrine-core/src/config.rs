//! Page configuration: selectors and timings for every subsystem.
//!
//! Every section is `#[serde(default)]`, so a host may send `{}` or override
//! a single field. Selectors use the simple grammar understood by every
//! [`Dom`](crate::dom::Dom) host: compounds of tag, `#id`, `.class`,
//! `[attr]` and `[attr=value]`, joined by descendant whitespace or `,`.

use serde::Deserialize;

use crate::error::InteractionError;

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub menu: MenuConfig,
    pub modal: ModalConfig,
    pub carousel: CarouselConfig,
    pub tilt: TiltConfig,
    pub reveal: RevealConfig,
    pub catch_copy: CatchCopyConfig,
    pub counter: CounterConfig,
    pub parallax: ParallaxConfig,
    pub form: FormConfig,
}

fn positive(field: &str, value: f64) -> Result<(), InteractionError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(InteractionError::Config(format!("{field} must be a positive number, got {value}")))
    }
}

fn non_negative(field: &str, value: f64) -> Result<(), InteractionError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(InteractionError::Config(format!("{field} must be zero or more, got {value}")))
    }
}

fn ratio(field: &str, value: f64) -> Result<(), InteractionError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(InteractionError::Config(format!("{field} must lie in [0, 1], got {value}")))
    }
}

impl PageConfig {
    /// Reject timings and ratios no subsystem can honor. A zero carousel
    /// cycle would advance the deck on every pump.
    pub fn validate(&self) -> Result<(), InteractionError> {
        non_negative("menu.hide_delay_ms", self.menu.hide_delay_ms)?;
        non_negative("modal.hide_delay_ms", self.modal.hide_delay_ms)?;
        positive("carousel.cycle_ms", self.carousel.cycle_ms)?;
        non_negative("carousel.swipe_threshold_px", self.carousel.swipe_threshold_px)?;
        ratio("carousel.visibility_threshold", self.carousel.visibility_threshold)?;
        non_negative("tilt.max_deg", self.tilt.max_deg)?;
        positive("tilt.perspective_px", self.tilt.perspective_px)?;
        ratio("reveal.threshold", self.reveal.threshold)?;
        non_negative("reveal.step_ms", self.reveal.step_ms)?;
        non_negative("reveal.max_delay_ms", self.reveal.max_delay_ms)?;
        non_negative("catch_copy.step_ms", self.catch_copy.step_ms)?;
        ratio("counter.threshold", self.counter.threshold)?;
        non_negative("counter.duration_ms", self.counter.duration_ms)?;
        non_negative("parallax.max_offset_px", self.parallax.max_offset_px)?;
        non_negative("form.retry_ms", self.form.retry_ms)
    }
}

/// Mobile navigation drawer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    pub toggle: String,
    pub container: String,
    pub backdrop: String,
    /// Links inside the drawer that close it when followed.
    pub link: String,
    /// Viewport widths above this close the drawer.
    pub close_above_width: f64,
    /// Close transition window before the drawer is hidden from assistive tech.
    pub hide_delay_ms: f64,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            toggle: ".menu-toggle".to_string(),
            container: "#menu".to_string(),
            backdrop: ".nav-overlay".to_string(),
            link: "a".to_string(),
            close_above_width: 900.0,
            hide_delay_ms: 200.0,
        }
    }
}

/// Detail modal opened from cards.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModalConfig {
    pub container: String,
    pub backdrop: String,
    pub close: String,
    pub card: String,
    pub image: String,
    pub title: String,
    pub date: String,
    pub description: String,
    pub hide_delay_ms: f64,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            container: "#detail-modal".to_string(),
            backdrop: ".modal-backdrop".to_string(),
            close: ".modal-close".to_string(),
            card: "[data-modal-card]".to_string(),
            image: ".modal-image".to_string(),
            title: ".modal-title".to_string(),
            date: ".modal-date".to_string(),
            description: ".modal-description".to_string(),
            hide_delay_ms: 200.0,
        }
    }
}

/// Hero carousel.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CarouselConfig {
    pub root: String,
    pub slide: String,
    pub dots: String,
    pub prev: String,
    pub next: String,
    /// Width-bearing child of the progress container.
    pub progress: String,
    pub cycle_ms: f64,
    pub swipe_threshold_px: f64,
    pub visibility_threshold: f64,
    pub autoplay: bool,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            root: "#hero-left".to_string(),
            slide: "img".to_string(),
            dots: ".hero-dots".to_string(),
            prev: ".hero-prev".to_string(),
            next: ".hero-next".to_string(),
            progress: ".hero-progress span".to_string(),
            cycle_ms: 4000.0,
            swipe_threshold_px: 40.0,
            visibility_threshold: 0.2,
            autoplay: true,
        }
    }
}

/// 3D tilt layered on the carousel container.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TiltConfig {
    pub max_deg: f64,
    pub perspective_px: f64,
}

impl Default for TiltConfig {
    fn default() -> Self {
        Self {
            max_deg: 8.0,
            perspective_px: 900.0,
        }
    }
}

/// Scroll reveal.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub selector: String,
    pub threshold: f64,
    pub root_margin: String,
    pub step_ms: f64,
    pub max_delay_ms: f64,
    /// Ancestors matching any of these start a new stagger group.
    pub group_roles: Vec<String>,
    pub default_variant: String,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            selector: "[data-reveal]".to_string(),
            threshold: 0.1,
            root_margin: "0px 0px -10% 0px".to_string(),
            step_ms: 80.0,
            max_delay_ms: 480.0,
            group_roles: vec![
                "[data-reveal-group]".to_string(),
                "section".to_string(),
                "ul".to_string(),
                "ol".to_string(),
            ],
            default_variant: "fade-up".to_string(),
        }
    }
}

/// Staggered catch-copy lines.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CatchCopyConfig {
    pub root: String,
    pub line: String,
    pub step_ms: f64,
}

impl Default for CatchCopyConfig {
    fn default() -> Self {
        Self {
            root: "[data-catch]".to_string(),
            line: ".fx-line".to_string(),
            step_ms: 120.0,
        }
    }
}

/// Count-up numbers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    pub selector: String,
    pub threshold: f64,
    pub duration_ms: f64,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            selector: "[data-count-to]".to_string(),
            threshold: 0.5,
            duration_ms: 1600.0,
        }
    }
}

/// Pointer parallax.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParallaxConfig {
    pub root: String,
    pub item: String,
    pub max_offset_px: f64,
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            root: "[data-parallax]".to_string(),
            item: "[data-depth]".to_string(),
            max_offset_px: 40.0,
        }
    }
}

/// Contact form gating.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    pub form: String,
    pub agreement: String,
    pub submit: String,
    pub captcha: String,
    pub error_slot: String,
    /// Single bounded re-check after mount, for captcha state changes the
    /// widget failed to report.
    pub retry_ms: f64,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            form: ".contact-form".to_string(),
            agreement: "#agree-terms".to_string(),
            submit: "button[type=submit]".to_string(),
            captcha: ".g-recaptcha".to_string(),
            error_slot: ".form-error".to_string(),
            retry_ms: 2000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_object_yields_defaults() {
        let cfg: PageConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, PageConfig::default());
    }

    #[test]
    fn single_field_override() {
        let cfg: PageConfig =
            serde_json::from_str(r##"{"carousel":{"cycle_ms":6000},"menu":{"toggle":"#burger"}}"##)
                .unwrap();
        assert_eq!(cfg.carousel.cycle_ms, 6000.0);
        assert_eq!(cfg.carousel.root, "#hero-left");
        assert_eq!(cfg.menu.toggle, "#burger");
        assert_eq!(cfg.menu.close_above_width, 900.0);
    }

    #[test]
    fn defaults_validate() {
        assert!(PageConfig::default().validate().is_ok());
    }

    #[test]
    fn unusable_timings_are_rejected() {
        let mut cfg = PageConfig::default();
        for cycle in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            cfg.carousel.cycle_ms = cycle;
            let err = cfg.validate().unwrap_err();
            assert!(err.to_string().contains("carousel.cycle_ms"), "{err}");
        }

        let mut cfg = PageConfig::default();
        cfg.counter.threshold = 1.5;
        assert!(matches!(cfg.validate(), Err(InteractionError::Config(_))));

        let mut cfg = PageConfig::default();
        cfg.form.retry_ms = -1.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn documented_defaults() {
        let cfg = PageConfig::default();
        assert_eq!(cfg.menu.hide_delay_ms, 200.0);
        assert_eq!(cfg.carousel.swipe_threshold_px, 40.0);
        assert_eq!(cfg.reveal.threshold, 0.1);
        assert_eq!(cfg.counter.threshold, 0.5);
        assert_eq!(cfg.form.retry_ms, 2000.0);
    }
}
