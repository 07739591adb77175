// SPDX-FileCopyrightText: 2026 Kiosk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store trait for catalog, order, user, settings, and broadcast persistence.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::KioskError;
use crate::types::{
    BotSettings, Broadcast, BroadcastPhoto, BroadcastStatus, Category, Order, OrderStats,
    OrderStatus, Product, Region, ShopUser, UserId, UserProfile,
};

/// Persistence collaborator for the whole bot.
///
/// Every failure is a [`KioskError::Storage`] and is treated as retryable by
/// the user; get-by-id operations return `Ok(None)` for missing rows.
#[async_trait]
pub trait CommerceStore: Send + Sync {
    // --- Catalog reads ---

    async fn list_regions(&self) -> Result<Vec<Region>, KioskError>;

    async fn get_region(&self, region_id: i64) -> Result<Option<Region>, KioskError>;

    async fn list_categories(&self, region_id: i64) -> Result<Vec<Category>, KioskError>;

    async fn get_category(&self, category_id: i64) -> Result<Option<Category>, KioskError>;

    /// Products of a category in sort order. Hidden products are excluded
    /// unless `include_hidden` is set (admin views).
    async fn list_products(
        &self,
        category_id: i64,
        include_hidden: bool,
    ) -> Result<Vec<Product>, KioskError>;

    /// All products regardless of category or visibility (admin panel).
    async fn list_all_products(&self) -> Result<Vec<Product>, KioskError>;

    async fn get_product(&self, product_id: i64) -> Result<Option<Product>, KioskError>;

    /// Batch lookup keyed by product id, for rendering order lists without
    /// a query per row.
    async fn get_products_by_ids(
        &self,
        product_ids: &[i64],
    ) -> Result<HashMap<i64, Product>, KioskError>;

    // --- Product admin writes ---

    async fn update_product_price(&self, product_id: i64, price: f64) -> Result<(), KioskError>;

    async fn update_product(
        &self,
        product_id: i64,
        name: &str,
        price: f64,
        description: &str,
    ) -> Result<(), KioskError>;

    async fn set_product_visibility(
        &self,
        product_id: i64,
        is_visible: bool,
    ) -> Result<(), KioskError>;

    async fn update_category_description(
        &self,
        category_id: i64,
        description: &str,
    ) -> Result<(), KioskError>;

    // --- Orders ---

    /// Create an order with a generated id and the given price snapshot.
    async fn create_order(
        &self,
        user_id: UserId,
        product_id: i64,
        price: f64,
    ) -> Result<Order, KioskError>;

    async fn get_order(&self, order_id: &str) -> Result<Option<Order>, KioskError>;

    async fn get_user_orders(&self, user_id: UserId) -> Result<Vec<Order>, KioskError>;

    async fn get_recent_orders(&self, limit: u32) -> Result<Vec<Order>, KioskError>;

    async fn update_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> Result<(), KioskError>;

    async fn order_stats(&self) -> Result<OrderStats, KioskError>;

    // --- Settings ---

    async fn get_settings(&self) -> Result<BotSettings, KioskError>;

    async fn update_welcome_message(&self, message: &str) -> Result<(), KioskError>;

    // --- Users ---

    /// Insert or refresh a user profile, bumping last activity.
    async fn upsert_user(&self, profile: &UserProfile) -> Result<(), KioskError>;

    /// All non-blocked users, in a fixed order (broadcast targets).
    async fn list_active_users(&self) -> Result<Vec<ShopUser>, KioskError>;

    async fn count_active_users(&self) -> Result<u64, KioskError>;

    /// Permanently exclude a user from future broadcasts.
    async fn mark_user_blocked(&self, user_id: UserId) -> Result<(), KioskError>;

    // --- Broadcasts ---

    /// Create a broadcast in `Draft` status.
    async fn create_broadcast(
        &self,
        admin_id: UserId,
        text: &str,
    ) -> Result<Broadcast, KioskError>;

    async fn get_broadcast(&self, broadcast_id: i64) -> Result<Option<Broadcast>, KioskError>;

    /// Update lifecycle status and cumulative counters.
    async fn update_broadcast_status(
        &self,
        broadcast_id: i64,
        status: BroadcastStatus,
        total_users: u32,
        sent_count: u32,
        failed_count: u32,
    ) -> Result<(), KioskError>;

    /// Delete a broadcast; only `Draft` broadcasts are deletable.
    async fn delete_broadcast(&self, broadcast_id: i64) -> Result<(), KioskError>;

    async fn add_broadcast_photo(
        &self,
        broadcast_id: i64,
        file_id: &str,
        sort_order: i64,
    ) -> Result<(), KioskError>;

    async fn list_broadcast_photos(
        &self,
        broadcast_id: i64,
    ) -> Result<Vec<BroadcastPhoto>, KioskError>;
}
