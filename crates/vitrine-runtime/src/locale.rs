#![forbid(unsafe_code)]

//! Session locale: number formatting and user-facing messages.
//!
//! The [`LocaleContext`] is fixed at startup from the host's reported
//! language. It owns the [`NumberFormat`] used by counters and the small
//! message catalog used by the form gate.

use std::fmt;
use std::rc::Rc;

use icu_decimal::DecimalFormatter;
use icu_decimal::input::Decimal;
use icu_decimal::options::DecimalFormatterOptions;
use icu_locale_core::{Locale as IcuLocale, locale};
use tracing::warn;

/// Normalized BCP-47-ish tag (`ja`, `en-US`, `fr-FR`).
pub type Locale = String;

/// Messages shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// Submission blocked: agreement unchecked or captcha incomplete.
    SubmitBlocked,
}

/// Locale-aware decimal formatting backed by CLDR data.
///
/// Cloning shares the formatter.
#[derive(Clone)]
pub struct NumberFormat {
    tag: String,
    formatter: Option<Rc<DecimalFormatter>>,
}

impl fmt::Debug for NumberFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NumberFormat")
            .field("locale", &self.tag)
            .field("localized", &self.formatter.is_some())
            .finish()
    }
}

impl PartialEq for NumberFormat {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag
    }
}

impl Eq for NumberFormat {}

impl NumberFormat {
    /// Formatter for `locale`. Tags ICU cannot parse fall back to `en`.
    #[must_use]
    pub fn for_locale(locale: &str) -> Self {
        let parsed = locale.parse::<IcuLocale>().unwrap_or_else(|err| {
            warn!(locale, %err, "unparseable locale, formatting numbers as en");
            locale!("en")
        });
        let tag = parsed.to_string();
        let options = DecimalFormatterOptions::default();
        let formatter = match DecimalFormatter::try_new(parsed.into(), options) {
            Ok(formatter) => Some(Rc::new(formatter)),
            Err(err) => {
                warn!(locale = %tag, %err, "no decimal data, numbers stay ungrouped");
                None
            }
        };
        Self { tag, formatter }
    }

    /// The ICU tag the formatter was built for.
    #[must_use]
    pub fn locale(&self) -> &str {
        &self.tag
    }

    /// Format `value` with exactly `decimals` fraction digits, rounding half
    /// away from zero. Never renders a negative zero. Non-finite input
    /// renders as zero.
    #[must_use]
    pub fn format(&self, value: f64, decimals: u32) -> String {
        let decimals = decimals.min(MAX_DECIMALS);
        let value = if value.is_finite() { value } else { 0.0 };
        // `f64::round` is half away from zero; the cast saturates and maps
        // -0.0 to 0.
        let units = (value * 10f64.powi(decimals as i32)).round() as i64;
        let shift = -(decimals as i16);
        let mut number = Decimal::from(units);
        number.multiply_pow10(shift);
        number.pad_end(shift);
        match &self.formatter {
            Some(formatter) => formatter.format(&number).to_string(),
            None => number.to_string(),
        }
    }
}

const MAX_DECIMALS: u32 = 10;

/// Session locale with its derived formatting rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleContext {
    locale: Locale,
    number: NumberFormat,
}

impl LocaleContext {
    /// Build from a raw host language tag, falling back to `en`.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        let locale = normalize_locale_raw(raw).unwrap_or_else(|| "en".to_string());
        let number = NumberFormat::for_locale(&locale);
        Self { locale, number }
    }

    #[must_use]
    pub fn current_locale(&self) -> &str {
        &self.locale
    }

    #[must_use]
    pub fn number_format(&self) -> &NumberFormat {
        &self.number
    }

    /// Localized text for `message`. Japanese pages get Japanese copy, every
    /// other locale gets English.
    #[must_use]
    pub fn message(&self, message: Message) -> &'static str {
        let ja = primary_language(&self.locale) == "ja";
        match (message, ja) {
            (Message::SubmitBlocked, true) => {
                "送信前に規約へ同意し、reCAPTCHAを完了してください。"
            }
            (Message::SubmitBlocked, false) => {
                "Please accept the terms and complete the reCAPTCHA before sending."
            }
        }
    }
}

impl Default for LocaleContext {
    fn default() -> Self {
        Self::new("en")
    }
}

fn primary_language(locale: &str) -> String {
    locale
        .split('-')
        .next()
        .unwrap_or(locale)
        .to_ascii_lowercase()
}

/// Normalize `ja_JP.UTF-8@euro` style tags to `ja-JP`. `C`/`POSIX` map to
/// `en`; blank input yields `None`.
#[must_use]
pub fn normalize_locale_raw(raw: &str) -> Option<Locale> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let raw = raw.split('@').next().unwrap_or(raw);
    let raw = raw.split('.').next().unwrap_or(raw);
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let mut normalized = raw.replace('_', "-");
    if normalized.eq_ignore_ascii_case("c") || normalized.eq_ignore_ascii_case("posix") {
        normalized.clear();
        normalized.push_str("en");
    }
    Some(normalized)
}
