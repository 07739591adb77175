// SPDX-FileCopyrightText: 2026 Kiosk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Admin panel: statistics, product management, and dialog entry points.
//!
//! Every handler here is reached only after the dispatcher's admin check;
//! the `/admin` command itself stays silent for ordinary users so the
//! surface is not discoverable.

use kiosk_core::error::KioskError;
use kiosk_core::types::{CallbackEvent, IncomingMessage, Keyboard, OrderStatus, Product};
use tracing::debug;

use super::{format_price, region_flag};
use crate::dispatcher::{DISPLAYED_ORDERS_LIMIT, Dispatcher, RECENT_ORDERS_LIMIT, parse_id};
use crate::fsm::DialogState;

impl Dispatcher {
    /// `/admin`: the panel, or silence for everyone else.
    pub(crate) async fn handle_admin(&self, msg: &IncomingMessage) {
        if !self.is_admin(msg.from.id) {
            debug!(user = msg.from.id.0, "ignoring /admin from non-admin");
            return;
        }
        match self.admin_panel_view().await {
            Ok((text, keyboard)) => {
                let _ = self.channel.send_html(msg.chat, &text, Some(keyboard)).await;
            }
            Err(e) => self.reply_store_failure(msg.chat, "admin panel", &e).await,
        }
    }

    pub(crate) async fn show_admin_panel_callback(&self, cb: &CallbackEvent) {
        match self.admin_panel_view().await {
            Ok((text, keyboard)) => {
                let _ = self.channel.edit_html(cb.chat, cb.message, &text, Some(keyboard)).await;
            }
            Err(e) => self.reply_store_failure(cb.chat, "admin panel", &e).await,
        }
    }

    async fn admin_panel_view(&self) -> Result<(String, Keyboard), KioskError> {
        let stats = self.store_call(self.store.order_stats()).await?;
        let recent = self
            .store_call(self.store.get_recent_orders(RECENT_ORDERS_LIMIT))
            .await?;
        let product_ids: Vec<i64> = recent.iter().map(|o| o.product_id).collect();
        let products = self
            .store_call(self.store.get_products_by_ids(&product_ids))
            .await?;

        let mut text = format!(
            "🛠 <b>Admin panel</b>\n\n\
             📊 Orders: {} total · {} pending · {} paid · {} completed\n\
             💰 Revenue: {}\n",
            stats.total_orders,
            stats.pending_orders,
            stats.paid_orders,
            stats.completed_orders,
            format_price(stats.total_revenue),
        );

        let mut keyboard = Keyboard::new();
        if !recent.is_empty() {
            text.push_str("\n🧾 Recent orders:\n");
            for order in recent.iter().take(DISPLAYED_ORDERS_LIMIT) {
                let name = products
                    .get(&order.product_id)
                    .map(|p| p.name.as_str())
                    .unwrap_or("(removed product)");
                text.push_str(&format!(
                    "• <b>{}</b> — {} — {} — {}\n",
                    order.order_id,
                    name,
                    format_price(order.price),
                    order.status,
                ));
                if order.status == OrderStatus::Created {
                    keyboard = keyboard.button(
                        format!("✅ Confirm {}", order.order_id),
                        format!("confirm_payment:{}", order.order_id),
                    );
                }
            }
        }

        keyboard = keyboard
            .button("📦 Manage products", "admin_products")
            .button("✏️ Edit welcome message", "admin_edit_welcome")
            .button("📣 Broadcasts", "broadcast_menu");
        Ok((text, keyboard))
    }

    /// Full catalog grouped by region and category, hidden products included.
    pub(crate) async fn show_admin_products(&self, cb: &CallbackEvent) {
        let result = async {
            let regions = self.store_call(self.store.list_regions()).await?;
            let mut text = String::from("📦 <b>Products</b>\n");
            let mut keyboard = Keyboard::new();

            for region in &regions {
                let categories = self.store_call(self.store.list_categories(region.id)).await?;
                if categories.is_empty() {
                    continue;
                }
                text.push_str(&format!(
                    "\n{} <b>{}</b>\n",
                    region_flag(&region.code),
                    region.name
                ));
                for category in &categories {
                    let products = self
                        .store_call(self.store.list_products(category.id, true))
                        .await?;
                    let visible = products.iter().filter(|p| p.is_visible).count();
                    text.push_str(&format!(
                        "📂 {} — {} products ({} visible)\n",
                        category.name,
                        products.len(),
                        visible
                    ));
                    keyboard = keyboard.button(
                        format!("📝 {} description", category.name),
                        format!("admin_edit_category_desc:{}", category.id),
                    );
                    for product in &products {
                        let eye = if product.is_visible { "👁" } else { "🙈" };
                        keyboard = keyboard.button(
                            format!("{eye} {} — {}", product.name, format_price(product.price)),
                            format!("admin_edit_product:{}", product.id),
                        );
                    }
                }
            }

            keyboard = keyboard.button("⬅️ Back", "back_to_admin");
            Ok::<_, KioskError>((text, keyboard))
        }
        .await;

        match result {
            Ok((text, keyboard)) => {
                let _ = self.channel.edit_html(cb.chat, cb.message, &text, Some(keyboard)).await;
            }
            Err(e) => self.reply_store_failure(cb.chat, "list products", &e).await,
        }
    }

    /// `admin_edit_product:<id>`: the management card for one product.
    pub(crate) async fn show_admin_product(&self, cb: &CallbackEvent, args: &str) {
        let Some(product_id) = parse_id(args) else {
            debug!(args, "bad admin product callback args");
            return;
        };
        self.render_admin_product(cb, product_id).await;
    }

    async fn render_admin_product(&self, cb: &CallbackEvent, product_id: i64) {
        let product = match self.store_call(self.store.get_product(product_id)).await {
            Ok(Some(product)) => product,
            Ok(None) => {
                let keyboard = Keyboard::new().button("⬅️ Back", "admin_products");
                let _ = self
                    .channel
                    .edit_html(cb.chat, cb.message, "⚠️ Product not found.", Some(keyboard))
                    .await;
                return;
            }
            Err(e) => return self.reply_store_failure(cb.chat, "load product", &e).await,
        };

        let (text, keyboard) = admin_product_card(&product);
        let _ = self.channel.edit_html(cb.chat, cb.message, &text, Some(keyboard)).await;
    }

    /// `admin_toggle_visibility:<id>`: flip and re-render the card.
    pub(crate) async fn handle_toggle_visibility(&self, cb: &CallbackEvent, args: &str) {
        let Some(product_id) = parse_id(args) else {
            debug!(args, "bad visibility callback args");
            return;
        };

        let product = match self.store_call(self.store.get_product(product_id)).await {
            Ok(Some(product)) => product,
            Ok(None) => {
                let _ = self.channel.send_text(cb.chat, "⚠️ Product not found.").await;
                return;
            }
            Err(e) => return self.reply_store_failure(cb.chat, "load product", &e).await,
        };

        if let Err(e) = self
            .store_call(self.store.set_product_visibility(product_id, !product.is_visible))
            .await
        {
            return self.reply_store_failure(cb.chat, "toggle visibility", &e).await;
        }
        self.render_admin_product(cb, product_id).await;
    }

    // --- Dialog entry points ---

    pub(crate) async fn start_price_edit(&self, cb: &CallbackEvent, args: &str) {
        self.start_product_dialog(cb, args, |product_id| DialogState::AwaitingPrice { product_id },
            "💰 Send the new price as a number, e.g. <code>199.99</code>.\n/cancel to abort.")
            .await;
    }

    pub(crate) async fn start_name_edit(&self, cb: &CallbackEvent, args: &str) {
        self.start_product_dialog(cb, args, |product_id| DialogState::AwaitingName { product_id },
            "✏️ Send the new product name.\n/cancel to abort.")
            .await;
    }

    pub(crate) async fn start_description_edit(&self, cb: &CallbackEvent, args: &str) {
        self.start_product_dialog(
            cb,
            args,
            |product_id| DialogState::AwaitingDescription { product_id },
            "📝 Send the new description. HTML tags b, i, u, s, code, pre, a, strong, em are allowed.\n/cancel to abort.",
        )
        .await;
    }

    async fn start_product_dialog<F>(&self, cb: &CallbackEvent, args: &str, state: F, prompt: &str)
    where
        F: FnOnce(i64) -> DialogState,
    {
        let Some(product_id) = parse_id(args) else {
            debug!(args, "bad product dialog callback args");
            return;
        };
        match self.store_call(self.store.get_product(product_id)).await {
            Ok(Some(_)) => {
                self.dialogs.set_state(cb.from.id, state(product_id)).await;
                let _ = self.channel.send_html(cb.chat, prompt, None).await;
            }
            Ok(None) => {
                let _ = self.channel.send_text(cb.chat, "⚠️ Product not found.").await;
            }
            Err(e) => self.reply_store_failure(cb.chat, "load product", &e).await,
        }
    }

    pub(crate) async fn start_category_description_edit(&self, cb: &CallbackEvent, args: &str) {
        let Some(category_id) = parse_id(args) else {
            debug!(args, "bad category dialog callback args");
            return;
        };
        match self.store_call(self.store.get_category(category_id)).await {
            Ok(Some(category)) => {
                self.dialogs
                    .set_state(cb.from.id, DialogState::AwaitingCategoryDescription { category_id })
                    .await;
                let _ = self
                    .channel
                    .send_html(
                        cb.chat,
                        &format!(
                            "📝 Send the new description for <b>{}</b>. HTML tags are allowed.\n/cancel to abort.",
                            category.name
                        ),
                        None,
                    )
                    .await;
            }
            Ok(None) => {
                let _ = self.channel.send_text(cb.chat, "⚠️ Category not found.").await;
            }
            Err(e) => self.reply_store_failure(cb.chat, "load category", &e).await,
        }
    }

    pub(crate) async fn start_welcome_edit(&self, cb: &CallbackEvent) {
        self.dialogs
            .set_state(cb.from.id, DialogState::AwaitingWelcomeMessage)
            .await;
        let _ = self
            .channel
            .send_html(
                cb.chat,
                "✏️ Send the new welcome message. HTML is allowed and <code>{name}</code> \
                 is replaced with the user's name.\n/cancel to abort.",
                None,
            )
            .await;
    }
}

fn admin_product_card(product: &Product) -> (String, Keyboard) {
    let visibility = if product.is_visible {
        "👁 Visible to buyers"
    } else {
        "🙈 Hidden from buyers"
    };
    let text = format!(
        "🛠 <b>{}</b>\n\n{}\n\n💰 {}\n{}",
        product.name,
        product.description,
        format_price(product.price),
        visibility,
    );
    let toggle_label = if product.is_visible {
        "🙈 Hide"
    } else {
        "👁 Show"
    };
    let keyboard = Keyboard::new()
        .row(vec![
            kiosk_core::types::Button::new("💰 Change price", format!("admin_edit_price:{}", product.id)),
            kiosk_core::types::Button::new("✏️ Rename", format!("admin_edit_name:{}", product.id)),
        ])
        .row(vec![
            kiosk_core::types::Button::new("📝 Edit description", format!("admin_edit_desc:{}", product.id)),
            kiosk_core::types::Button::new(toggle_label, format!("admin_toggle_visibility:{}", product.id)),
        ])
        .button("⬅️ Back", "admin_products");
    (text, keyboard)
}
