// SPDX-FileCopyrightText: 2026 Kiosk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory collaborator fakes for engine and handler tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use kiosk_core::error::KioskError;
use kiosk_core::traits::{ChatChannel, CommerceStore};
use kiosk_core::types::{
    BotSettings, Broadcast, BroadcastPhoto, BroadcastStatus, Category, ChatId, Keyboard, Order,
    OrderStats, OrderStatus, Product, Region, ShopUser, UserId, UserProfile,
};

use crate::dispatcher::Dispatcher;
use kiosk_config::model::KioskConfig;
use kiosk_core::types::{CallbackEvent, IncomingMessage, MessageRef};

/// Config with user 900 as admin and a payment card set.
pub(crate) fn test_config() -> KioskConfig {
    let mut config = KioskConfig::default();
    config.bot.admin_ids = vec![900];
    config.bot.payment_card = "1234 5678 9012 3456".into();
    config
}

pub(crate) fn dispatcher_with(store: Arc<MockStore>, channel: Arc<MockChannel>) -> Dispatcher {
    Dispatcher::new(
        store as Arc<dyn CommerceStore>,
        channel as Arc<dyn ChatChannel>,
        &test_config(),
    )
}

pub(crate) fn profile(id: i64) -> UserProfile {
    UserProfile {
        id: UserId(id),
        username: None,
        first_name: format!("user{id}"),
        last_name: None,
    }
}

/// Message from user `id` in their DM chat; a leading `/` becomes a command.
pub(crate) fn message(id: i64, text: &str) -> IncomingMessage {
    IncomingMessage {
        from: profile(id),
        chat: ChatId(id),
        command: text
            .strip_prefix('/')
            .and_then(|t| t.split_whitespace().next())
            .map(str::to_string),
        text: Some(text.to_string()),
        photo_id: None,
    }
}

/// Photo message with an optional caption.
pub(crate) fn photo_message(id: i64, file_id: &str, caption: Option<&str>) -> IncomingMessage {
    IncomingMessage {
        from: profile(id),
        chat: ChatId(id),
        command: None,
        text: caption.map(str::to_string),
        photo_id: Some(file_id.to_string()),
    }
}

pub(crate) fn callback(id: i64, data: &str) -> CallbackEvent {
    CallbackEvent {
        id: format!("cb-{id}"),
        from: profile(id),
        chat: ChatId(id),
        message: MessageRef(1),
        data: data.to_string(),
    }
}

fn storage_err(msg: &str) -> KioskError {
    KioskError::Storage {
        source: msg.to_string().into(),
    }
}

/// In-memory [`CommerceStore`] with data exposed for assertions.
#[derive(Default)]
pub(crate) struct MockStore {
    pub regions: Mutex<Vec<Region>>,
    pub categories: Mutex<Vec<Category>>,
    pub products: Mutex<Vec<Product>>,
    pub orders: Mutex<Vec<Order>>,
    pub users: Mutex<Vec<ShopUser>>,
    pub welcome_message: Mutex<String>,
    pub broadcasts: Mutex<Vec<Broadcast>>,
    pub photos: Mutex<Vec<BroadcastPhoto>>,
    /// When set, every call fails with a storage error.
    pub fail: Mutex<bool>,
    order_seq: AtomicI32,
    broadcast_seq: AtomicI32,
}

impl MockStore {
    pub fn new() -> Self {
        let store = Self::default();
        *store.welcome_message.lock().unwrap() = "Hello, {name}!".to_string();
        store
    }

    fn check_fail(&self) -> Result<(), KioskError> {
        if *self.fail.lock().unwrap() {
            return Err(storage_err("mock store failure"));
        }
        Ok(())
    }

    pub fn add_region(&self, id: i64, name: &str, code: &str) {
        self.regions.lock().unwrap().push(Region {
            id,
            name: name.to_string(),
            code: code.to_string(),
            created_at: Utc::now(),
        });
    }

    pub fn add_category(&self, id: i64, region_id: i64, name: &str) {
        self.categories.lock().unwrap().push(Category {
            id,
            region_id,
            name: name.to_string(),
            description: String::new(),
            sort_order: 0,
            created_at: Utc::now(),
        });
    }

    pub fn add_product(&self, id: i64, category_id: i64, name: &str, price: f64, visible: bool) {
        self.products.lock().unwrap().push(Product {
            id,
            category_id,
            name: name.to_string(),
            description: format!("{name} description"),
            price,
            is_visible: visible,
            sort_order: 0,
            created_at: Utc::now(),
        });
    }

    pub fn add_user(&self, user_id: i64, blocked: bool) {
        self.users.lock().unwrap().push(ShopUser {
            user_id: UserId(user_id),
            username: None,
            first_name: format!("user{user_id}"),
            last_name: None,
            is_blocked: blocked,
            created_at: Utc::now(),
            last_activity: Utc::now(),
        });
    }
}

#[async_trait]
impl CommerceStore for MockStore {
    async fn list_regions(&self) -> Result<Vec<Region>, KioskError> {
        self.check_fail()?;
        Ok(self.regions.lock().unwrap().clone())
    }

    async fn get_region(&self, region_id: i64) -> Result<Option<Region>, KioskError> {
        self.check_fail()?;
        Ok(self
            .regions
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == region_id)
            .cloned())
    }

    async fn list_categories(&self, region_id: i64) -> Result<Vec<Category>, KioskError> {
        self.check_fail()?;
        Ok(self
            .categories
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.region_id == region_id)
            .cloned()
            .collect())
    }

    async fn get_category(&self, category_id: i64) -> Result<Option<Category>, KioskError> {
        self.check_fail()?;
        Ok(self
            .categories
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == category_id)
            .cloned())
    }

    async fn list_products(
        &self,
        category_id: i64,
        include_hidden: bool,
    ) -> Result<Vec<Product>, KioskError> {
        self.check_fail()?;
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.category_id == category_id && (include_hidden || p.is_visible))
            .cloned()
            .collect())
    }

    async fn list_all_products(&self) -> Result<Vec<Product>, KioskError> {
        self.check_fail()?;
        Ok(self.products.lock().unwrap().clone())
    }

    async fn get_product(&self, product_id: i64) -> Result<Option<Product>, KioskError> {
        self.check_fail()?;
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == product_id)
            .cloned())
    }

    async fn get_products_by_ids(
        &self,
        product_ids: &[i64],
    ) -> Result<HashMap<i64, Product>, KioskError> {
        self.check_fail()?;
        let products = self.products.lock().unwrap();
        Ok(product_ids
            .iter()
            .filter_map(|id| products.iter().find(|p| p.id == *id).cloned())
            .map(|p| (p.id, p))
            .collect())
    }

    async fn update_product_price(&self, product_id: i64, price: f64) -> Result<(), KioskError> {
        self.check_fail()?;
        let mut products = self.products.lock().unwrap();
        let product = products
            .iter_mut()
            .find(|p| p.id == product_id)
            .ok_or_else(|| storage_err("no such product"))?;
        product.price = price;
        Ok(())
    }

    async fn update_product(
        &self,
        product_id: i64,
        name: &str,
        price: f64,
        description: &str,
    ) -> Result<(), KioskError> {
        self.check_fail()?;
        let mut products = self.products.lock().unwrap();
        let product = products
            .iter_mut()
            .find(|p| p.id == product_id)
            .ok_or_else(|| storage_err("no such product"))?;
        product.name = name.to_string();
        product.price = price;
        product.description = description.to_string();
        Ok(())
    }

    async fn set_product_visibility(
        &self,
        product_id: i64,
        is_visible: bool,
    ) -> Result<(), KioskError> {
        self.check_fail()?;
        let mut products = self.products.lock().unwrap();
        let product = products
            .iter_mut()
            .find(|p| p.id == product_id)
            .ok_or_else(|| storage_err("no such product"))?;
        product.is_visible = is_visible;
        Ok(())
    }

    async fn update_category_description(
        &self,
        category_id: i64,
        description: &str,
    ) -> Result<(), KioskError> {
        self.check_fail()?;
        let mut categories = self.categories.lock().unwrap();
        let category = categories
            .iter_mut()
            .find(|c| c.id == category_id)
            .ok_or_else(|| storage_err("no such category"))?;
        category.description = description.to_string();
        Ok(())
    }

    async fn create_order(
        &self,
        user_id: UserId,
        product_id: i64,
        price: f64,
    ) -> Result<Order, KioskError> {
        self.check_fail()?;
        let n = self.order_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let order = Order {
            order_id: format!("TST000000{n:03}"),
            user_id,
            product_id,
            price,
            status: OrderStatus::Created,
            created_at: Utc::now(),
        };
        self.orders.lock().unwrap().push(order.clone());
        Ok(order)
    }

    async fn get_order(&self, order_id: &str) -> Result<Option<Order>, KioskError> {
        self.check_fail()?;
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.order_id == order_id)
            .cloned())
    }

    async fn get_user_orders(&self, user_id: UserId) -> Result<Vec<Order>, KioskError> {
        self.check_fail()?;
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_recent_orders(&self, limit: u32) -> Result<Vec<Order>, KioskError> {
        self.check_fail()?;
        let orders = self.orders.lock().unwrap();
        Ok(orders.iter().rev().take(limit as usize).cloned().collect())
    }

    async fn update_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> Result<(), KioskError> {
        self.check_fail()?;
        let mut orders = self.orders.lock().unwrap();
        let order = orders
            .iter_mut()
            .find(|o| o.order_id == order_id)
            .ok_or_else(|| storage_err("no such order"))?;
        order.status = status;
        Ok(())
    }

    async fn order_stats(&self) -> Result<OrderStats, KioskError> {
        self.check_fail()?;
        let orders = self.orders.lock().unwrap();
        let mut stats = OrderStats::default();
        for order in orders.iter() {
            stats.total_orders += 1;
            match order.status {
                OrderStatus::Created => stats.pending_orders += 1,
                OrderStatus::Paid => {
                    stats.paid_orders += 1;
                    stats.total_revenue += order.price;
                }
                OrderStatus::Completed => {
                    stats.completed_orders += 1;
                    stats.total_revenue += order.price;
                }
                OrderStatus::Cancelled => {}
            }
        }
        Ok(stats)
    }

    async fn get_settings(&self) -> Result<BotSettings, KioskError> {
        self.check_fail()?;
        Ok(BotSettings {
            welcome_message: self.welcome_message.lock().unwrap().clone(),
            updated_at: Utc::now(),
        })
    }

    async fn update_welcome_message(&self, message: &str) -> Result<(), KioskError> {
        self.check_fail()?;
        *self.welcome_message.lock().unwrap() = message.to_string();
        Ok(())
    }

    async fn upsert_user(&self, profile: &UserProfile) -> Result<(), KioskError> {
        self.check_fail()?;
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.user_id == profile.id) {
            user.username = profile.username.clone();
            user.first_name = profile.first_name.clone();
            user.last_name = profile.last_name.clone();
            user.last_activity = Utc::now();
        } else {
            users.push(ShopUser {
                user_id: profile.id,
                username: profile.username.clone(),
                first_name: profile.first_name.clone(),
                last_name: profile.last_name.clone(),
                is_blocked: false,
                created_at: Utc::now(),
                last_activity: Utc::now(),
            });
        }
        Ok(())
    }

    async fn list_active_users(&self) -> Result<Vec<ShopUser>, KioskError> {
        self.check_fail()?;
        let mut active: Vec<ShopUser> = self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| !u.is_blocked)
            .cloned()
            .collect();
        active.sort_by_key(|u| u.user_id.0);
        Ok(active)
    }

    async fn count_active_users(&self) -> Result<u64, KioskError> {
        Ok(self.list_active_users().await?.len() as u64)
    }

    async fn mark_user_blocked(&self, user_id: UserId) -> Result<(), KioskError> {
        self.check_fail()?;
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.user_id == user_id) {
            user.is_blocked = true;
        }
        Ok(())
    }

    async fn create_broadcast(
        &self,
        admin_id: UserId,
        text: &str,
    ) -> Result<Broadcast, KioskError> {
        self.check_fail()?;
        let id = (self.broadcast_seq.fetch_add(1, Ordering::SeqCst) + 1) as i64;
        let broadcast = Broadcast {
            id,
            admin_id,
            text: text.to_string(),
            status: BroadcastStatus::Draft,
            total_users: 0,
            sent_count: 0,
            failed_count: 0,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        };
        self.broadcasts.lock().unwrap().push(broadcast.clone());
        Ok(broadcast)
    }

    async fn get_broadcast(&self, broadcast_id: i64) -> Result<Option<Broadcast>, KioskError> {
        self.check_fail()?;
        Ok(self
            .broadcasts
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.id == broadcast_id)
            .cloned())
    }

    async fn update_broadcast_status(
        &self,
        broadcast_id: i64,
        status: BroadcastStatus,
        total_users: u32,
        sent_count: u32,
        failed_count: u32,
    ) -> Result<(), KioskError> {
        self.check_fail()?;
        let mut broadcasts = self.broadcasts.lock().unwrap();
        let broadcast = broadcasts
            .iter_mut()
            .find(|b| b.id == broadcast_id)
            .ok_or_else(|| storage_err("no such broadcast"))?;
        if broadcast.status == BroadcastStatus::Draft && status == BroadcastStatus::Sending {
            broadcast.started_at = Some(Utc::now());
        }
        if matches!(status, BroadcastStatus::Completed | BroadcastStatus::Failed) {
            broadcast.completed_at = Some(Utc::now());
        }
        broadcast.status = status;
        broadcast.total_users = total_users;
        broadcast.sent_count = sent_count;
        broadcast.failed_count = failed_count;
        Ok(())
    }

    async fn delete_broadcast(&self, broadcast_id: i64) -> Result<(), KioskError> {
        self.check_fail()?;
        let mut broadcasts = self.broadcasts.lock().unwrap();
        let before = broadcasts.len();
        broadcasts.retain(|b| !(b.id == broadcast_id && b.status == BroadcastStatus::Draft));
        if broadcasts.len() == before {
            return Err(storage_err("broadcast not found or not a draft"));
        }
        self.photos
            .lock()
            .unwrap()
            .retain(|p| p.broadcast_id != broadcast_id);
        Ok(())
    }

    async fn add_broadcast_photo(
        &self,
        broadcast_id: i64,
        file_id: &str,
        sort_order: i64,
    ) -> Result<(), KioskError> {
        self.check_fail()?;
        let mut photos = self.photos.lock().unwrap();
        let id = photos.len() as i64 + 1;
        photos.push(BroadcastPhoto {
            id,
            broadcast_id,
            file_id: file_id.to_string(),
            sort_order,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn list_broadcast_photos(
        &self,
        broadcast_id: i64,
    ) -> Result<Vec<BroadcastPhoto>, KioskError> {
        self.check_fail()?;
        let mut photos: Vec<BroadcastPhoto> = self
            .photos
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.broadcast_id == broadcast_id)
            .cloned()
            .collect();
        photos.sort_by_key(|p| (p.sort_order, p.id));
        Ok(photos)
    }
}

/// What a [`MockChannel`] delivered, in order.
#[derive(Debug, Clone)]
pub(crate) struct SentMessage {
    pub chat: i64,
    pub text: String,
    pub photo_id: Option<String>,
    pub keyboard: Option<Keyboard>,
}

/// Recording [`ChatChannel`] fake; chats in `blocked` reject sends with
/// [`KioskError::RecipientBlocked`].
#[derive(Default)]
pub(crate) struct MockChannel {
    pub sent: Mutex<Vec<SentMessage>>,
    pub edited: Mutex<Vec<SentMessage>>,
    pub answered: Mutex<Vec<(String, Option<String>, bool)>>,
    pub blocked: Mutex<HashSet<i64>>,
    message_seq: AtomicI32,
}

impl MockChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn block_chat(&self, chat: i64) {
        self.blocked.lock().unwrap().insert(chat);
    }

    fn record(&self, message: SentMessage) -> Result<kiosk_core::types::MessageRef, KioskError> {
        if self.blocked.lock().unwrap().contains(&message.chat) {
            return Err(KioskError::RecipientBlocked);
        }
        self.sent.lock().unwrap().push(message);
        let id = self.message_seq.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(kiosk_core::types::MessageRef(id))
    }

    /// All texts delivered to `chat`, in order.
    pub fn texts_for(&self, chat: i64) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.chat == chat)
            .map(|m| m.text.clone())
            .collect()
    }
}

#[async_trait]
impl ChatChannel for MockChannel {
    async fn send_text(
        &self,
        chat: ChatId,
        text: &str,
    ) -> Result<kiosk_core::types::MessageRef, KioskError> {
        self.record(SentMessage {
            chat: chat.0,
            text: text.to_string(),
            photo_id: None,
            keyboard: None,
        })
    }

    async fn send_html(
        &self,
        chat: ChatId,
        html: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<kiosk_core::types::MessageRef, KioskError> {
        self.record(SentMessage {
            chat: chat.0,
            text: html.to_string(),
            photo_id: None,
            keyboard,
        })
    }

    async fn send_photo(
        &self,
        chat: ChatId,
        file_id: &str,
        caption_html: Option<&str>,
        keyboard: Option<Keyboard>,
    ) -> Result<kiosk_core::types::MessageRef, KioskError> {
        self.record(SentMessage {
            chat: chat.0,
            text: caption_html.unwrap_or_default().to_string(),
            photo_id: Some(file_id.to_string()),
            keyboard,
        })
    }

    async fn edit_html(
        &self,
        chat: ChatId,
        _message: kiosk_core::types::MessageRef,
        html: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<(), KioskError> {
        if self.blocked.lock().unwrap().contains(&chat.0) {
            return Err(KioskError::RecipientBlocked);
        }
        self.edited.lock().unwrap().push(SentMessage {
            chat: chat.0,
            text: html.to_string(),
            photo_id: None,
            keyboard,
        });
        Ok(())
    }

    async fn answer_callback(
        &self,
        callback_id: &str,
        text: Option<&str>,
        alert: bool,
    ) -> Result<(), KioskError> {
        self.answered.lock().unwrap().push((
            callback_id.to_string(),
            text.map(str::to_string),
            alert,
        ));
        Ok(())
    }
}
