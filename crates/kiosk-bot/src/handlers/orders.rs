// SPDX-FileCopyrightText: 2026 Kiosk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Order placement and payment confirmation.

use kiosk_core::types::{CallbackEvent, ChatId, IncomingMessage, Keyboard, Order, OrderStatus};
use tracing::{debug, info, warn};

use super::{format_price, html_escape};
use crate::dispatcher::{Dispatcher, parse_id};

fn status_label(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Created => "🕓 awaiting payment",
        OrderStatus::Paid => "✅ paid",
        OrderStatus::Completed => "📦 completed",
        OrderStatus::Cancelled => "❌ cancelled",
    }
}

impl Dispatcher {
    /// `buy:<product_id>`: create the order and send payment instructions.
    ///
    /// The order captures the product's price at this moment; later price
    /// edits do not touch it.
    pub(crate) async fn handle_buy(&self, cb: &CallbackEvent, args: &str) {
        let Some(product_id) = parse_id(args) else {
            debug!(args, "bad buy callback args");
            return;
        };

        let product = match self.store_call(self.store.get_product(product_id)).await {
            Ok(Some(product)) if product.is_visible => product,
            Ok(_) => {
                let _ = self
                    .channel
                    .send_text(cb.chat, "⚠️ This product is no longer available.")
                    .await;
                return;
            }
            Err(e) => return self.reply_store_failure(cb.chat, "load product", &e).await,
        };

        let order = match self
            .store_call(self.store.create_order(cb.from.id, product.id, product.price))
            .await
        {
            Ok(order) => order,
            Err(e) => return self.reply_store_failure(cb.chat, "create order", &e).await,
        };
        info!(order_id = %order.order_id, user = cb.from.id.0, "order created");

        let instructions = format!(
            "🧾 Order <b>{}</b>\n\n\
             {} — {}\n\n\
             💳 Pay to card:\n<code>{}</code>\n\n\
             After payment, an administrator will confirm your order and you \
             will get a message here.",
            order.order_id,
            product.name,
            format_price(order.price),
            self.payment_card,
        );
        let _ = self.channel.send_html(cb.chat, &instructions, None).await;

        self.notify_admins_of_order(&order, &product.name, cb).await;
    }

    async fn notify_admins_of_order(&self, order: &Order, product_name: &str, cb: &CallbackEvent) {
        let text = format!(
            "🆕 New order <b>{}</b>\n\n\
             {} — {}\n\
             From: {}",
            order.order_id,
            product_name,
            format_price(order.price),
            html_escape(&cb.from.display_name()),
        );
        let keyboard =
            Keyboard::new().button("✅ Confirm payment", format!("confirm_payment:{}", order.order_id));

        for admin_id in &self.admin_ids {
            if let Err(e) = self
                .channel
                .send_html(ChatId(*admin_id), &text, Some(keyboard.clone()))
                .await
            {
                warn!(admin = admin_id, error = %e, "could not notify admin of order");
            }
        }
    }

    /// `confirm_payment:<order_id>` (admin): mark paid and tell the buyer.
    pub(crate) async fn handle_confirm_payment(&self, cb: &CallbackEvent, order_id: &str) {
        let order = match self.store_call(self.store.get_order(order_id)).await {
            Ok(Some(order)) => order,
            Ok(None) => {
                let _ = self
                    .channel
                    .send_text(cb.chat, &format!("⚠️ Order {order_id} not found."))
                    .await;
                return;
            }
            Err(e) => return self.reply_store_failure(cb.chat, "load order", &e).await,
        };

        if order.status != OrderStatus::Created {
            let _ = self
                .channel
                .send_text(
                    cb.chat,
                    &format!("Order {} is already {}.", order.order_id, order.status),
                )
                .await;
            return;
        }

        if let Err(e) = self
            .store_call(self.store.update_order_status(order_id, OrderStatus::Paid))
            .await
        {
            return self.reply_store_failure(cb.chat, "update order", &e).await;
        }
        info!(order_id, admin = cb.from.id.0, "payment confirmed");

        let _ = self
            .channel
            .send_html(
                ChatId(order.user_id.0),
                &format!(
                    "✅ Payment for order <b>{}</b> is confirmed. Thank you for your purchase!",
                    order.order_id
                ),
                None,
            )
            .await;
        let _ = self
            .channel
            .send_text(cb.chat, &format!("✅ Order {} marked as paid.", order.order_id))
            .await;
    }

    /// `/my_orders`: the caller's order history with product names resolved
    /// in one batch lookup.
    pub(crate) async fn handle_my_orders(&self, msg: &IncomingMessage) {
        let orders = match self.store_call(self.store.get_user_orders(msg.from.id)).await {
            Ok(orders) => orders,
            Err(e) => return self.reply_store_failure(msg.chat, "load orders", &e).await,
        };

        if orders.is_empty() {
            let _ = self
                .channel
                .send_text(msg.chat, "📭 You have no orders yet. Try /products!")
                .await;
            return;
        }

        let product_ids: Vec<i64> = orders.iter().map(|o| o.product_id).collect();
        let products = match self.store_call(self.store.get_products_by_ids(&product_ids)).await {
            Ok(products) => products,
            Err(e) => return self.reply_store_failure(msg.chat, "load products", &e).await,
        };

        let mut text = String::from("🗂 <b>Your orders</b>\n");
        for order in &orders {
            let name = products
                .get(&order.product_id)
                .map(|p| p.name.as_str())
                .unwrap_or("(removed product)");
            text.push_str(&format!(
                "\n🧾 <b>{}</b> — {}\n{} · {} · {}\n",
                order.order_id,
                name,
                status_label(order.status),
                format_price(order.price),
                order.created_at.format("%d.%m.%Y"),
            ));
        }
        let _ = self.channel.send_html(msg.chat, &text, None).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::testing::{MockChannel, MockStore, callback, dispatcher_with, message};
    use kiosk_core::traits::CommerceStore;
    use kiosk_core::types::{InboundEvent, OrderStatus, UserId};

    fn seeded_store() -> Arc<MockStore> {
        let store = Arc::new(MockStore::new());
        store.add_region(1, "Europe", "EU");
        store.add_category(10, 1, "Gift Cards");
        store.add_product(100, 10, "Gold Card", 25.0, true);
        store
    }

    #[tokio::test(start_paused = true)]
    async fn buy_creates_order_and_notifies_admins() {
        let store = seeded_store();
        let channel = Arc::new(MockChannel::new());
        let dispatcher = dispatcher_with(Arc::clone(&store), Arc::clone(&channel));

        dispatcher.dispatch(InboundEvent::Callback(callback(1, "buy:100"))).await;

        let orders = store.orders.lock().unwrap().clone();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].user_id, UserId(1));
        assert_eq!(orders[0].price, 25.0);
        assert_eq!(orders[0].status, OrderStatus::Created);

        // Buyer gets instructions with the card number and order id.
        let buyer_texts = channel.texts_for(1);
        assert!(buyer_texts[0].contains(&orders[0].order_id));
        assert!(buyer_texts[0].contains("1234 5678 9012 3456"));

        // Admin 900 gets a notification with a confirm button.
        let sent = channel.sent.lock().unwrap().clone();
        let admin_note = sent.iter().find(|m| m.chat == 900).unwrap();
        assert!(admin_note.text.contains("New order"));
        let keyboard = admin_note.keyboard.as_ref().unwrap();
        assert_eq!(
            keyboard.rows[0][0].action,
            format!("confirm_payment:{}", orders[0].order_id)
        );

        dispatcher.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn buying_a_vanished_product_is_refused() {
        let store = seeded_store();
        let channel = Arc::new(MockChannel::new());
        let dispatcher = dispatcher_with(store, Arc::clone(&channel));

        dispatcher.dispatch(InboundEvent::Callback(callback(1, "buy:404"))).await;

        assert!(channel.texts_for(1)[0].contains("no longer available"));
        dispatcher.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn confirm_payment_marks_paid_and_notifies_buyer() {
        let store = seeded_store();
        let channel = Arc::new(MockChannel::new());
        let dispatcher = dispatcher_with(Arc::clone(&store), Arc::clone(&channel));

        let order = store.create_order(UserId(5), 100, 25.0).await.unwrap();
        let data = format!("confirm_payment:{}", order.order_id);
        dispatcher.dispatch(InboundEvent::Callback(callback(900, &data))).await;

        let stored = store.get_order(&order.order_id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Paid);

        assert!(channel.texts_for(5)[0].contains("confirmed"));
        assert!(channel.texts_for(900)[0].contains("marked as paid"));

        dispatcher.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn confirm_payment_is_idempotent_about_status() {
        let store = seeded_store();
        let channel = Arc::new(MockChannel::new());
        let dispatcher = dispatcher_with(Arc::clone(&store), Arc::clone(&channel));

        let order = store.create_order(UserId(5), 100, 25.0).await.unwrap();
        store
            .update_order_status(&order.order_id, OrderStatus::Paid)
            .await
            .unwrap();

        let data = format!("confirm_payment:{}", order.order_id);
        dispatcher.dispatch(InboundEvent::Callback(callback(900, &data))).await;

        assert!(channel.texts_for(900)[0].contains("already paid"));
        assert!(channel.texts_for(5).is_empty(), "buyer must not be pinged twice");

        dispatcher.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn confirm_payment_reports_unknown_order() {
        let store = seeded_store();
        let channel = Arc::new(MockChannel::new());
        let dispatcher = dispatcher_with(store, Arc::clone(&channel));

        dispatcher
            .dispatch(InboundEvent::Callback(callback(900, "confirm_payment:NOPE")))
            .await;

        assert!(channel.texts_for(900)[0].contains("not found"));
        dispatcher.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn my_orders_lists_history_with_product_names() {
        let store = seeded_store();
        let channel = Arc::new(MockChannel::new());
        let dispatcher = dispatcher_with(Arc::clone(&store), Arc::clone(&channel));

        store.create_order(UserId(7), 100, 25.0).await.unwrap();
        store.create_order(UserId(7), 404, 9.0).await.unwrap(); // product gone

        dispatcher.dispatch(InboundEvent::Message(message(7, "/my_orders"))).await;

        let texts = channel.texts_for(7);
        assert!(texts[0].contains("Gold Card"));
        assert!(texts[0].contains("(removed product)"));
        assert!(texts[0].contains("awaiting payment"));

        dispatcher.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn my_orders_with_no_history_points_to_catalog() {
        let store = seeded_store();
        let channel = Arc::new(MockChannel::new());
        let dispatcher = dispatcher_with(store, Arc::clone(&channel));

        dispatcher.dispatch(InboundEvent::Message(message(8, "/my_orders"))).await;

        assert!(channel.texts_for(8)[0].contains("no orders yet"));
        dispatcher.shutdown();
    }
}
