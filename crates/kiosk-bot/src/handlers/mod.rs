// SPDX-FileCopyrightText: 2026 Kiosk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command, callback, and dialog handlers, grouped by concern.
//!
//! All handlers live as `impl Dispatcher` blocks; the dispatcher routes to
//! them after rate limiting and permission checks.

mod admin;
mod broadcast;
mod catalog;
mod commands;
mod dialog;
mod orders;

use kiosk_core::types::Product;

/// Flag emoji for a region code; unknown codes get the globe.
pub(crate) fn region_flag(code: &str) -> &'static str {
    match code {
        "KZ" => "🇰🇿",
        "UA" => "🇺🇦",
        "EU" => "🇪🇺",
        "TUR" => "🇹🇷",
        _ => "🌍",
    }
}

/// Escape text that originates from users before embedding it in HTML.
pub(crate) fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub(crate) fn format_price(price: f64) -> String {
    format!("${price:.2}")
}

/// HTML card shown when a buyer opens a product.
pub(crate) fn product_card(product: &Product) -> String {
    let mut card = format!("<b>{}</b>\n", product.name);
    if !product.description.is_empty() {
        card.push('\n');
        card.push_str(&product.description);
        card.push('\n');
    }
    card.push_str(&format!("\n💰 Price: {}", format_price(product.price)));
    card
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn known_region_codes_have_flags() {
        assert_eq!(region_flag("KZ"), "🇰🇿");
        assert_eq!(region_flag("EU"), "🇪🇺");
        assert_eq!(region_flag("XX"), "🌍");
    }

    #[test]
    fn escape_covers_html_specials() {
        assert_eq!(html_escape("a<b>&c"), "a&lt;b&gt;&amp;c");
        assert_eq!(html_escape("plain"), "plain");
    }

    #[test]
    fn product_card_includes_name_description_and_price() {
        let product = Product {
            id: 1,
            category_id: 1,
            name: "Gold Card".into(),
            description: "A <b>shiny</b> card".into(),
            price: 25.0,
            is_visible: true,
            sort_order: 0,
            created_at: Utc::now(),
        };
        let card = product_card(&product);
        assert!(card.contains("<b>Gold Card</b>"));
        assert!(card.contains("A <b>shiny</b> card"));
        assert!(card.contains("$25.00"));

        let bare = Product {
            description: String::new(),
            ..product
        };
        assert!(!product_card(&bare).contains("\n\n\n"));
    }
}
