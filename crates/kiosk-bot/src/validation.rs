// SPDX-FileCopyrightText: 2026 Kiosk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Validation of operator-supplied HTML and prices.
//!
//! Telegram renders a small allow-list of inline tags; anything else is
//! rejected before it reaches the API, with messages the operator sees
//! verbatim. Sanitization strips containers that should never appear in a
//! chat message (scripts, styles, comments) and runs after validation.

use std::sync::LazyLock;

use kiosk_core::error::KioskError;
use regex::Regex;

/// Upper bound for a product price; larger values are assumed to be typos.
pub const MAX_PRICE: f64 = 100_000.0;

const ALLOWED_TAGS: [&str; 9] = ["b", "i", "u", "s", "code", "pre", "a", "strong", "em"];

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?([a-zA-Z]+)[^>]*>").unwrap());
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<a\s*([^>]*)>").unwrap());
static HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href\s*=\s*["']([^"']*)["']"#).unwrap());
static SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").unwrap());
static STYLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").unwrap());
static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

/// Check that `html` uses only Telegram-renderable markup.
///
/// Verifies tag balance, the tag allow-list, and link attributes. The
/// returned [`KioskError::Validation`] message is shown to the operator.
pub fn validate_html(html: &str) -> Result<(), KioskError> {
    check_tag_balance(html)?;
    check_allowed_tags(html)?;
    check_link_attributes(html)?;
    Ok(())
}

/// Every opening tag must be closed in order, innermost first.
fn check_tag_balance(html: &str) -> Result<(), KioskError> {
    let mut stack: Vec<String> = Vec::new();

    for caps in TAG_RE.captures_iter(html) {
        let full = &caps[0];
        let name = caps[1].to_ascii_lowercase();

        // Telegram has no self-closing tags, but tolerate the syntax.
        if full.ends_with("/>") {
            continue;
        }

        if full.starts_with("</") {
            match stack.pop() {
                Some(open) if open == name => {}
                Some(open) => {
                    return Err(KioskError::Validation(format!(
                        "mismatched closing tag: expected </{open}>, found </{name}>"
                    )));
                }
                None => {
                    return Err(KioskError::Validation(format!(
                        "closing tag </{name}> has no matching opening tag"
                    )));
                }
            }
        } else {
            stack.push(name);
        }
    }

    if !stack.is_empty() {
        return Err(KioskError::Validation(format!(
            "unclosed tags: {}",
            stack.join(", ")
        )));
    }
    Ok(())
}

fn check_allowed_tags(html: &str) -> Result<(), KioskError> {
    for caps in TAG_RE.captures_iter(html) {
        let name = caps[1].to_ascii_lowercase();
        if !ALLOWED_TAGS.contains(&name.as_str()) {
            return Err(KioskError::Validation(format!(
                "tag <{name}> is not supported; allowed tags: {}",
                ALLOWED_TAGS.join(", ")
            )));
        }
    }
    Ok(())
}

/// Links must carry a non-empty `href` with a scheme Telegram accepts.
fn check_link_attributes(html: &str) -> Result<(), KioskError> {
    const VALID_PREFIXES: [&str; 4] = ["http://", "https://", "mailto:", "tg://"];

    for caps in LINK_RE.captures_iter(html) {
        let attributes = caps[1].trim();

        let href = match HREF_RE.captures(attributes) {
            Some(href_caps) => href_caps[1].to_string(),
            None => {
                return Err(KioskError::Validation(
                    "<a> tags must carry an href attribute".into(),
                ));
            }
        };

        if href.trim().is_empty() {
            return Err(KioskError::Validation(
                "the href attribute cannot be empty".into(),
            ));
        }

        if !VALID_PREFIXES.iter().any(|prefix| href.starts_with(prefix)) {
            return Err(KioskError::Validation(format!(
                "invalid URL in href: {href} (must start with http://, https://, mailto: or tg://)"
            )));
        }
    }
    Ok(())
}

/// Strip script and style blocks and HTML comments, case-insensitively.
///
/// Runs after [`validate_html`] on text that is about to be stored, as a
/// second line of defense.
pub fn sanitize_html(html: &str) -> String {
    let html = SCRIPT_RE.replace_all(html, "");
    let html = STYLE_RE.replace_all(&html, "");
    COMMENT_RE.replace_all(&html, "").into_owned()
}

/// Check that a price is plausible for a catalog product.
pub fn validate_price(price: f64) -> Result<(), KioskError> {
    if !price.is_finite() {
        return Err(KioskError::Validation("the price must be a number".into()));
    }
    if price < 0.0 {
        return Err(KioskError::Validation(
            "the price cannot be negative".into(),
        ));
    }
    if price > MAX_PRICE {
        return Err(KioskError::Validation(format!(
            "the price is too high (maximum {MAX_PRICE:.2}); did you mistype?"
        )));
    }
    Ok(())
}
