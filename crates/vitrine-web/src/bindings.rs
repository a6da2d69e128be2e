#![forbid(unsafe_code)]

//! `wasm-bindgen` surface.
//!
//! ```js
//! const session = new WebSession(JSON.stringify(config));
//! document.addEventListener("click", (e) => {
//!   const target = session.nodeId(e.target);
//!   if (session.dispatch(JSON.stringify({ type: "click", target }))) e.preventDefault();
//! });
//! const tick = () => { session.frame(); requestAnimationFrame(tick); };
//! requestAnimationFrame(tick);
//! ```

use std::rc::Rc;

use js_sys::{Function, Reflect};
use tracing::debug;
use vitrine_core::{Environment, InteractionError, MonotonicClock};
use vitrine_runtime::AppContext;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, Window};

use crate::host::WebDom;
use crate::input::load_environment;
use crate::session::Session;
use vitrine_widgets::Captcha;

fn js_error(err: InteractionError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn media_matches(window: &Window, query: &str) -> bool {
    window
        .match_media(query)
        .ok()
        .flatten()
        .is_some_and(|list| list.matches())
}

/// Read media preferences and language from the browser.
fn detect_environment(window: &Window) -> Environment {
    Environment {
        reduced_motion: media_matches(window, "(prefers-reduced-motion: reduce)"),
        pointer_fine: media_matches(window, "(pointer: fine)"),
        hover: media_matches(window, "(hover: hover)"),
        locale: window
            .navigator()
            .language()
            .unwrap_or_else(|| "en".to_string()),
    }
}

/// Google reCAPTCHA through the page's global `grecaptcha` object.
struct Grecaptcha {
    window: Window,
}

impl Captcha for Grecaptcha {
    fn response(&self) -> Result<String, InteractionError> {
        let unavailable = || InteractionError::ExternalApiUnavailable("grecaptcha");
        let api = Reflect::get(&self.window, &"grecaptcha".into()).map_err(|_| unavailable())?;
        if api.is_undefined() || api.is_null() {
            return Err(unavailable());
        }
        let get_response = Reflect::get(&api, &"getResponse".into())
            .ok()
            .and_then(|f| f.dyn_into::<Function>().ok())
            .ok_or_else(unavailable)?;
        let token = get_response.call0(&api).map_err(|_| unavailable())?;
        Ok(token.as_string().unwrap_or_default())
    }
}

#[wasm_bindgen]
pub struct WebSession {
    dom: Rc<WebDom>,
    session: Session,
}

impl WebSession {
    fn mount(window: Window, config_json: &str, env: &Environment) -> Result<WebSession, JsValue> {
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let dom = Rc::new(WebDom::new(document));
        let ctx = AppContext::new(dom.clone(), Rc::new(MonotonicClock::new()), env);
        let session = Session::new(&ctx, config_json, Rc::new(Grecaptcha { window }));
        debug!(?env, "web session started");
        Ok(Self { dom, session })
    }
}

#[wasm_bindgen]
impl WebSession {
    /// Mount on the current document, reading preferences from the browser.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<WebSession, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let env = detect_environment(&window);
        Self::mount(window, config_json, &env)
    }

    /// Mount with an explicit environment document instead of browser
    /// detection.
    #[wasm_bindgen(js_name = withEnvironment)]
    pub fn with_environment(config_json: &str, environment_json: &str) -> Result<WebSession, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let env = load_environment(environment_json).map_err(js_error)?;
        Self::mount(window, config_json, &env)
    }

    /// Stable id for `element`, for use as an event `target`.
    #[wasm_bindgen(js_name = nodeId)]
    pub fn node_id(&self, element: &Element) -> f64 {
        self.dom.node_id(element).raw() as f64
    }

    /// Dispatch one JSON event. Returns whether to call `preventDefault()`.
    pub fn dispatch(&mut self, event_json: &str) -> Result<bool, JsValue> {
        self.session.dispatch_json(event_json).map_err(js_error)
    }

    /// Dispatch a JSON array of events.
    #[wasm_bindgen(js_name = dispatchBatch)]
    pub fn dispatch_batch(&mut self, events_json: &str) -> Result<bool, JsValue> {
        self.session.dispatch_batch_json(events_json).map_err(js_error)
    }

    /// Call once per `requestAnimationFrame`. Returns how many scheduled
    /// tasks ran.
    pub fn frame(&mut self) -> u32 {
        let pending = self.dom.drain_notifications();
        self.session.frame(pending) as u32
    }
}
