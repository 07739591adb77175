// SPDX-FileCopyrightText: 2026 Kiosk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalog navigation: region, category, and product menus.
//!
//! Navigation edits the menu message in place instead of stacking new
//! messages, so the chat stays a single live menu. Every level carries a
//! back button encoding its parent as `back:<level>:<id>`.

use kiosk_core::error::KioskError;
use kiosk_core::types::{CallbackEvent, Keyboard};
use tracing::debug;

use super::{format_price, product_card, region_flag};
use crate::dispatcher::{Dispatcher, parse_id};

const GONE: &str = "⚠️ This section is no longer available.";

impl Dispatcher {
    /// Region menu content, shared by `/products` and the catalog button.
    pub(crate) async fn regions_view(&self) -> Result<(String, Option<Keyboard>), KioskError> {
        let regions = self.store_call(self.store.list_regions()).await?;
        if regions.is_empty() {
            return Ok((
                "🛒 The catalog is empty for now. Check back soon!".into(),
                None,
            ));
        }
        let mut keyboard = Keyboard::new();
        for region in &regions {
            keyboard = keyboard.button(
                format!("{} {}", region_flag(&region.code), region.name),
                format!("region:{}", region.id),
            );
        }
        Ok(("🌍 Choose a region:".into(), Some(keyboard)))
    }

    pub(crate) async fn show_regions(&self, cb: &CallbackEvent) {
        match self.regions_view().await {
            Ok((text, keyboard)) => {
                let _ = self.channel.edit_html(cb.chat, cb.message, &text, keyboard).await;
            }
            Err(e) => self.reply_store_failure(cb.chat, "list regions", &e).await,
        }
    }

    pub(crate) async fn show_categories(&self, cb: &CallbackEvent, args: &str) {
        let Some(region_id) = parse_id(args) else {
            debug!(args, "bad region callback args");
            return;
        };
        self.render_categories(cb, region_id).await;
    }

    pub(crate) async fn render_categories(&self, cb: &CallbackEvent, region_id: i64) {
        let result = async {
            let region = self.store_call(self.store.get_region(region_id)).await?;
            let categories = self.store_call(self.store.list_categories(region_id)).await?;
            Ok::<_, KioskError>((region, categories))
        }
        .await;

        let (region, categories) = match result {
            Ok(pair) => pair,
            Err(e) => return self.reply_store_failure(cb.chat, "list categories", &e).await,
        };

        let Some(region) = region else {
            let keyboard = Keyboard::new().button("⬅️ Back", "back:regions");
            let _ = self.channel.edit_html(cb.chat, cb.message, GONE, Some(keyboard)).await;
            return;
        };

        let mut keyboard = Keyboard::new();
        let text = if categories.is_empty() {
            format!(
                "{} <b>{}</b>\n\nNothing here yet.",
                region_flag(&region.code),
                region.name
            )
        } else {
            for category in &categories {
                keyboard = keyboard.button(
                    format!("📂 {}", category.name),
                    format!("category:{}", category.id),
                );
            }
            format!(
                "{} <b>{}</b>\n\nChoose a category:",
                region_flag(&region.code),
                region.name
            )
        };
        keyboard = keyboard.button("⬅️ Back", "back:regions");
        let _ = self.channel.edit_html(cb.chat, cb.message, &text, Some(keyboard)).await;
    }

    pub(crate) async fn show_category_products(&self, cb: &CallbackEvent, args: &str) {
        let Some(category_id) = parse_id(args) else {
            debug!(args, "bad category callback args");
            return;
        };
        self.render_products(cb, category_id).await;
    }

    pub(crate) async fn render_products(&self, cb: &CallbackEvent, category_id: i64) {
        let result = async {
            let category = self.store_call(self.store.get_category(category_id)).await?;
            let products = self
                .store_call(self.store.list_products(category_id, false))
                .await?;
            Ok::<_, KioskError>((category, products))
        }
        .await;

        let (category, products) = match result {
            Ok(pair) => pair,
            Err(e) => return self.reply_store_failure(cb.chat, "list products", &e).await,
        };

        let Some(category) = category else {
            let keyboard = Keyboard::new().button("⬅️ Back", "back:regions");
            let _ = self.channel.edit_html(cb.chat, cb.message, GONE, Some(keyboard)).await;
            return;
        };

        let mut text = format!("📂 <b>{}</b>\n", category.name);
        if !category.description.is_empty() {
            text.push('\n');
            text.push_str(&category.description);
            text.push('\n');
        }

        let mut keyboard = Keyboard::new();
        if products.is_empty() {
            text.push_str("\nNo products available here yet.");
        } else {
            text.push_str("\nChoose a product:");
            for product in &products {
                keyboard = keyboard.button(
                    format!("{} — {}", product.name, format_price(product.price)),
                    format!("product:{}", product.id),
                );
            }
        }
        keyboard = keyboard.button("⬅️ Back", format!("back:categories:{}", category.region_id));
        let _ = self.channel.edit_html(cb.chat, cb.message, &text, Some(keyboard)).await;
    }

    /// Product card with a buy button. Hidden and deleted products read as
    /// gone to buyers.
    pub(crate) async fn show_product_card(&self, cb: &CallbackEvent, args: &str) {
        let Some(product_id) = parse_id(args) else {
            debug!(args, "bad product callback args");
            return;
        };

        let product = match self.store_call(self.store.get_product(product_id)).await {
            Ok(product) => product,
            Err(e) => return self.reply_store_failure(cb.chat, "load product", &e).await,
        };

        match product {
            Some(product) if product.is_visible => {
                let keyboard = Keyboard::new()
                    .button("🛒 Buy", format!("buy:{}", product.id))
                    .button("⬅️ Back", format!("back:products:{}", product.category_id));
                let _ = self
                    .channel
                    .edit_html(cb.chat, cb.message, &product_card(&product), Some(keyboard))
                    .await;
            }
            _ => {
                let keyboard = Keyboard::new().button("⬅️ Back", "back:regions");
                let _ = self
                    .channel
                    .edit_html(
                        cb.chat,
                        cb.message,
                        "⚠️ This product is no longer available.",
                        Some(keyboard),
                    )
                    .await;
            }
        }
    }

    /// `back:<level>` and `back:<level>:<id>` navigation.
    pub(crate) async fn handle_back(&self, cb: &CallbackEvent, args: &str) {
        let (target, id) = match args.split_once(':') {
            Some((target, id)) => (target, id),
            None => (args, ""),
        };
        match target {
            "regions" => self.show_regions(cb).await,
            "categories" => match parse_id(id) {
                Some(region_id) => self.render_categories(cb, region_id).await,
                None => debug!(args, "bad back target"),
            },
            "products" => match parse_id(id) {
                Some(category_id) => self.render_products(cb, category_id).await,
                None => debug!(args, "bad back target"),
            },
            other => debug!(target = other, "unknown back target"),
        }
    }
}
