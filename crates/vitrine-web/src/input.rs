#![forbid(unsafe_code)]

//! JSON wire format between the JavaScript host and the session.
//!
//! Events are internally tagged on `type`; element references are the raw
//! [`NodeId`] values the session handed out. Configuration and environment
//! documents are partial: missing fields take their defaults.
//!
//! ```json
//! {"type":"click","target":12}
//! {"type":"key","key":"Tab","shift":true}
//! {"type":"intersection","target":7,"ratio":0.4,"intersecting":true}
//! ```

use serde::Deserialize;
use vitrine_core::config::PageConfig;
use vitrine_core::{
    Environment, InteractionError, IntersectionEntry, Key, KeyEvent, Modifiers, NodeId, PageEvent,
    Point,
};

/// One host event as sent over the wire.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireEvent {
    Click {
        target: u64,
    },
    Key {
        key: String,
        #[serde(default)]
        shift: bool,
        #[serde(default)]
        ctrl: bool,
        #[serde(default)]
        alt: bool,
        #[serde(default)]
        meta: bool,
    },
    PointerMove {
        /// Element under the pointer. Effects work from viewport coordinates.
        #[serde(default)]
        target: Option<u64>,
        x: f64,
        y: f64,
    },
    PointerLeave {
        #[serde(default)]
        target: Option<u64>,
    },
    TouchStart {
        x: f64,
        y: f64,
    },
    TouchEnd {
        x: f64,
        y: f64,
    },
    Intersection {
        target: u64,
        ratio: f64,
        intersecting: bool,
    },
    Resize {
        width: f64,
    },
    Change {
        target: u64,
    },
    Submit {
        target: u64,
    },
    CaptchaCompleted,
    CaptchaExpired,
}

impl From<WireEvent> for PageEvent {
    fn from(wire: WireEvent) -> Self {
        let node = NodeId::from_raw;
        match wire {
            WireEvent::Click { target } => Self::Click {
                target: node(target),
            },
            WireEvent::Key {
                key,
                shift,
                ctrl,
                alt,
                meta,
            } => {
                let mut modifiers = Modifiers::empty();
                modifiers.set(Modifiers::SHIFT, shift);
                modifiers.set(Modifiers::CTRL, ctrl);
                modifiers.set(Modifiers::ALT, alt);
                modifiers.set(Modifiers::META, meta);
                Self::Key(KeyEvent::new(Key::from_dom_key(&key)).with_modifiers(modifiers))
            }
            WireEvent::PointerMove { x, y, .. } => Self::PointerMove {
                position: Point::new(x, y),
            },
            WireEvent::PointerLeave { target } => Self::PointerLeave {
                target: target.map(NodeId::from_raw),
            },
            WireEvent::TouchStart { x, y } => Self::TouchStart {
                position: Point::new(x, y),
            },
            WireEvent::TouchEnd { x, y } => Self::TouchEnd {
                position: Point::new(x, y),
            },
            WireEvent::Intersection {
                target,
                ratio,
                intersecting,
            } => Self::Intersection(IntersectionEntry {
                target: node(target),
                ratio: ratio.clamp(0.0, 1.0),
                is_intersecting: intersecting,
            }),
            WireEvent::Resize { width } => Self::Resize { width },
            WireEvent::Change { target } => Self::Change {
                target: node(target),
            },
            WireEvent::Submit { target } => Self::Submit {
                target: node(target),
            },
            WireEvent::CaptchaCompleted => Self::CaptchaCompleted,
            WireEvent::CaptchaExpired => Self::CaptchaExpired,
        }
    }
}

/// Decode one event.
pub fn parse_event(json: &str) -> Result<PageEvent, InteractionError> {
    serde_json::from_str::<WireEvent>(json)
        .map(PageEvent::from)
        .map_err(|e| InteractionError::Input(e.to_string()))
}

/// Decode a JSON array of events. One malformed entry rejects the batch.
pub fn parse_batch(json: &str) -> Result<Vec<PageEvent>, InteractionError> {
    serde_json::from_str::<Vec<WireEvent>>(json)
        .map(|events| events.into_iter().map(PageEvent::from).collect())
        .map_err(|e| InteractionError::Input(e.to_string()))
}

fn load<T: Default + for<'de> Deserialize<'de>>(json: &str) -> Result<T, InteractionError> {
    if json.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(json).map_err(|e| InteractionError::Config(e.to_string()))
}

/// Parse and validate a (possibly partial) page configuration. Blank input
/// is the default.
pub fn load_config(json: &str) -> Result<PageConfig, InteractionError> {
    let cfg: PageConfig = load(json)?;
    cfg.validate()?;
    Ok(cfg)
}

/// Parse a (possibly partial) environment report. Blank input is the default.
pub fn load_environment(json: &str) -> Result<Environment, InteractionError> {
    load(json)
}
