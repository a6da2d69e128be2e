#![forbid(unsafe_code)]

//! Contact form submit gating.
//!
//! Submission requires the agreement checkbox (when present) and a captcha
//! response (when a widget is present). Eligibility is written to the submit
//! control's `disabled` attribute and re-evaluated on checkbox changes, on
//! the captcha's completion and expiry callbacks, and once by a bounded
//! retry timer armed at mount.
//!
//! A captcha library that never loaded counts as a pass: the gate must not
//! block legitimate submissions because a third-party script is missing.

use std::rc::{Rc, Weak};

use tracing::{debug, info};
use vitrine_core::config::FormConfig;
use vitrine_core::{DomHandle, InteractionError, NodeId};
use vitrine_runtime::{AppContext, Message, TimerId};

/// The third-party captcha widget.
pub trait Captcha {
    /// Current response token. Empty when the challenge is not solved;
    /// `Err(ExternalApiUnavailable)` when the library is not loaded.
    fn response(&self) -> Result<String, InteractionError>;
}

/// Captcha stand-in for pages that load no captcha library.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCaptcha;

impl Captcha for NoCaptcha {
    fn response(&self) -> Result<String, InteractionError> {
        Err(InteractionError::ExternalApiUnavailable("captcha"))
    }
}

/// What to do with a submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitDecision {
    Allow,
    /// Agreement or captcha missing; the error message is shown.
    Blocked,
    /// The host reported an invalid field; it was focused and scrolled to.
    Invalid(NodeId),
}

impl SubmitDecision {
    #[inline]
    pub fn prevents_default(self) -> bool {
        !matches!(self, Self::Allow)
    }
}

struct GateInner {
    dom: DomHandle,
    form: NodeId,
    agreement: Option<NodeId>,
    submit: Option<NodeId>,
    widget: Option<NodeId>,
    error_slot: NodeId,
    captcha: Rc<dyn Captcha>,
}

impl GateInner {
    fn captcha_ok(&self) -> bool {
        if self.widget.is_none() {
            return true;
        }
        match self.captcha.response() {
            Ok(token) => !token.trim().is_empty(),
            Err(InteractionError::ExternalApiUnavailable(api)) => {
                debug!(api, "captcha library unavailable, not gating");
                true
            }
            Err(err) => {
                debug!(%err, "captcha response failed");
                false
            }
        }
    }

    fn can_submit(&self) -> bool {
        let agreed = self.agreement.is_none_or(|a| self.dom.is_checked(a));
        agreed && self.captcha_ok()
    }

    fn refresh(&self) -> bool {
        let ok = self.can_submit();
        if let Some(submit) = self.submit {
            if ok {
                self.dom.remove_attribute(submit, "disabled");
            } else {
                self.dom.set_attribute(submit, "disabled", "");
            }
        }
        if ok {
            self.dom.set_hidden(self.error_slot, true);
        }
        ok
    }
}

pub struct FormGate {
    ctx: AppContext,
    inner: Rc<GateInner>,
    retry: Option<TimerId>,
    message: &'static str,
}

impl std::fmt::Debug for FormGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormGate")
            .field("form", &self.inner.form)
            .field("has_captcha", &self.inner.widget.is_some())
            .field("retry_armed", &self.retry.is_some())
            .finish_non_exhaustive()
    }
}

impl FormGate {
    pub fn mount(
        ctx: &AppContext,
        cfg: &FormConfig,
        captcha: Rc<dyn Captcha>,
    ) -> Result<Self, InteractionError> {
        let dom = ctx.dom();
        let form = dom
            .query(None, &cfg.form)
            .ok_or_else(|| InteractionError::missing("form", &cfg.form))?;

        let error_slot = match dom.query(Some(form), &cfg.error_slot) {
            Some(slot) => slot,
            None => {
                let slot = dom
                    .create_element(form, "p")
                    .ok_or_else(|| InteractionError::missing("form", &cfg.error_slot))?;
                dom.add_class(slot, "form-error");
                dom.set_hidden(slot, true);
                slot
            }
        };

        let inner = Rc::new(GateInner {
            dom: Rc::clone(dom),
            form,
            agreement: dom.query(Some(form), &cfg.agreement),
            submit: dom.query(Some(form), &cfg.submit),
            widget: dom.query(Some(form), &cfg.captcha),
            error_slot,
            captcha,
        });
        inner.refresh();

        let retry = inner.widget.map(|_| {
            let weak: Weak<GateInner> = Rc::downgrade(&inner);
            ctx.set_timeout(cfg.retry_ms, move || {
                if let Some(inner) = weak.upgrade() {
                    let ok = inner.refresh();
                    debug!(ok, "form eligibility retry");
                }
            })
        });

        debug!(
            ?form,
            agreement = inner.agreement.is_some(),
            captcha = inner.widget.is_some(),
            "form gate mounted"
        );
        Ok(Self {
            ctx: ctx.clone(),
            message: ctx.locale().message(Message::SubmitBlocked),
            inner,
            retry,
        })
    }

    #[inline]
    pub fn form(&self) -> NodeId {
        self.inner.form
    }

    #[inline]
    pub fn error_slot(&self) -> NodeId {
        self.inner.error_slot
    }

    /// Agreement checked (or absent) and captcha satisfied.
    pub fn can_submit(&self) -> bool {
        self.inner.can_submit()
    }

    /// Re-evaluate eligibility and write it to the submit control.
    pub fn refresh(&self) -> bool {
        self.inner.refresh()
    }

    /// A control changed. Only controls inside this form are considered.
    pub fn handle_change(&self, target: NodeId) {
        if self.ctx.dom().contains(self.inner.form, target) {
            self.refresh();
        }
    }

    pub fn handle_captcha_completed(&self) {
        self.refresh();
    }

    pub fn handle_captcha_expired(&self) {
        self.refresh();
    }

    /// Decide a submit of `target`. Returns `None` for other forms.
    pub fn submit(&self, target: NodeId) -> Option<SubmitDecision> {
        let inner = &self.inner;
        if target != inner.form {
            return None;
        }
        let dom = &inner.dom;

        if !inner.refresh() {
            dom.set_text(inner.error_slot, self.message);
            dom.set_attribute(inner.error_slot, "role", "alert");
            dom.set_hidden(inner.error_slot, false);
            info!("submit blocked");
            return Some(SubmitDecision::Blocked);
        }

        if let Some(field) = dom.first_invalid(inner.form) {
            dom.focus(field);
            dom.scroll_into_view(field);
            debug!(?field, "submit stopped at invalid field");
            return Some(SubmitDecision::Invalid(field));
        }

        dom.set_hidden(inner.error_slot, true);
        Some(SubmitDecision::Allow)
    }
}

impl Drop for FormGate {
    fn drop(&mut self) {
        if let Some(retry) = self.retry.take() {
            self.ctx.scheduler().clear_timeout(retry);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use vitrine_core::dom::memory::MemoryDom;
    use vitrine_core::{Dom, Environment, ManualClock};

    #[derive(Default)]
    struct Token(RefCell<String>);

    impl Captcha for Token {
        fn response(&self) -> Result<String, InteractionError> {
            Ok(self.0.borrow().clone())
        }
    }

    struct Page {
        dom: Rc<MemoryDom>,
        clock: Rc<ManualClock>,
        ctx: AppContext,
        form: NodeId,
        agree: NodeId,
        submit: NodeId,
        error: NodeId,
    }

    fn page(with_widget: bool, env: &Environment) -> Page {
        let dom = Rc::new(MemoryDom::new());
        let form = dom.append_with(dom.body(), "form", &[("class", "contact-form")]);
        let agree = dom.append_with(form, "input", &[("type", "checkbox"), ("id", "agree-terms")]);
        if with_widget {
            dom.append_with(form, "div", &[("class", "g-recaptcha")]);
        }
        let error = dom.append_with(form, "p", &[("class", "form-error"), ("hidden", "")]);
        let submit = dom.append_with(form, "button", &[("type", "submit")]);
        let clock = Rc::new(ManualClock::new());
        let ctx = AppContext::new(dom.clone(), clock.clone(), env);
        Page {
            dom,
            clock,
            ctx,
            form,
            agree,
            submit,
            error,
        }
    }

    #[test]
    fn blocked_until_agreed_and_solved() {
        let p = page(true, &Environment::default());
        let token = Rc::new(Token::default());
        let gate = FormGate::mount(&p.ctx, &FormConfig::default(), token.clone()).unwrap();
        assert!(p.dom.attribute(p.submit, "disabled").is_some());

        assert_eq!(gate.submit(p.form), Some(SubmitDecision::Blocked));
        assert!(!p.dom.is_hidden(p.error));
        assert_eq!(p.dom.attribute(p.error, "role").as_deref(), Some("alert"));
        assert_eq!(
            p.dom.text(p.error),
            "Please accept the terms and complete the reCAPTCHA before sending."
        );

        p.dom.set_checked(p.agree, true);
        gate.handle_change(p.agree);
        assert!(!gate.can_submit());

        *token.0.borrow_mut() = "tok".to_string();
        gate.handle_captcha_completed();
        assert!(p.dom.attribute(p.submit, "disabled").is_none());
        assert!(p.dom.is_hidden(p.error));
        assert_eq!(gate.submit(p.form), Some(SubmitDecision::Allow));

        token.0.borrow_mut().clear();
        gate.handle_captcha_expired();
        assert!(p.dom.attribute(p.submit, "disabled").is_some());
    }

    #[test]
    fn unavailable_captcha_is_a_pass() {
        let p = page(true, &Environment::default());
        p.dom.set_checked(p.agree, true);
        let gate = FormGate::mount(&p.ctx, &FormConfig::default(), Rc::new(NoCaptcha)).unwrap();
        assert!(gate.can_submit());
        assert!(p.dom.attribute(p.submit, "disabled").is_none());
    }

    #[test]
    fn invalid_field_is_focused_and_scrolled() {
        let p = page(false, &Environment::default());
        let email = p.dom.append_with(p.form, "input", &[("type", "email")]);
        p.dom.set_invalid(email, true);
        p.dom.set_checked(p.agree, true);
        let gate = FormGate::mount(&p.ctx, &FormConfig::default(), Rc::new(NoCaptcha)).unwrap();

        let decision = gate.submit(p.form).unwrap();
        assert_eq!(decision, SubmitDecision::Invalid(email));
        assert!(decision.prevents_default());
        assert_eq!(p.dom.active_element(), Some(email));
        assert_eq!(p.dom.scrolled_into_view(), vec![email]);
    }

    #[test]
    fn retry_picks_up_unreported_solve() {
        let p = page(true, &Environment::default());
        p.dom.set_checked(p.agree, true);
        let token = Rc::new(Token::default());
        let _gate = FormGate::mount(&p.ctx, &FormConfig::default(), token.clone()).unwrap();
        assert_eq!(p.ctx.scheduler().pending_timers(), 1);

        *token.0.borrow_mut() = "late".to_string();
        p.clock.advance(2000.0);
        p.ctx.scheduler().run_frame(p.ctx.now());
        assert!(p.dom.attribute(p.submit, "disabled").is_none());
        assert_eq!(p.ctx.scheduler().pending_timers(), 0);
    }

    #[test]
    fn no_widget_means_no_retry() {
        let p = page(false, &Environment::default());
        let _gate = FormGate::mount(&p.ctx, &FormConfig::default(), Rc::new(NoCaptcha)).unwrap();
        assert_eq!(p.ctx.scheduler().pending_timers(), 0);
    }

    #[test]
    fn missing_error_slot_is_created() {
        let dom = Rc::new(MemoryDom::new());
        let form = dom.append_with(dom.body(), "form", &[("class", "contact-form")]);
        let ctx = AppContext::new(dom.clone(), Rc::new(ManualClock::new()), &Environment::default());
        let gate = FormGate::mount(&ctx, &FormConfig::default(), Rc::new(NoCaptcha)).unwrap();
        let slot = gate.error_slot();
        assert_eq!(dom.parent(slot), Some(form));
        assert!(dom.has_class(slot, "form-error"));
        assert!(dom.is_hidden(slot));
    }

    #[test]
    fn japanese_message() {
        let p = page(false, &Environment::default().with_locale("ja-JP"));
        let gate = FormGate::mount(&p.ctx, &FormConfig::default(), Rc::new(NoCaptcha)).unwrap();
        assert_eq!(gate.submit(p.form), Some(SubmitDecision::Blocked));
        assert_eq!(
            p.dom.text(p.error),
            "送信前に規約へ同意し、reCAPTCHAを完了してください。"
        );
    }

    #[test]
    fn foreign_submit_is_ignored() {
        let p = page(false, &Environment::default());
        let other = p.dom.append(p.dom.body(), "form");
        let gate = FormGate::mount(&p.ctx, &FormConfig::default(), Rc::new(NoCaptcha)).unwrap();
        assert_eq!(gate.submit(other), None);
    }
}
