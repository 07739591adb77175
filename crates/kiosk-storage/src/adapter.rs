// SPDX-FileCopyrightText: 2026 Kiosk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the CommerceStore trait.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use kiosk_config::model::StorageConfig;
use kiosk_core::types::{
    BotSettings, Broadcast, BroadcastPhoto, BroadcastStatus, Category, Order, OrderStats,
    OrderStatus, Product, Region, ShopUser, UserId, UserProfile,
};
use kiosk_core::{AdapterType, CommerceStore, HealthStatus, KioskError, PluginAdapter};

use crate::database::Database;
use crate::order_id::generate_order_id;
use crate::queries;

/// SQLite-backed commerce store.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`SqliteStore::initialize`].
pub struct SqliteStore {
    config: StorageConfig,
    order_prefix: String,
    db: OnceCell<Database>,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given configuration.
    ///
    /// The database connection is not opened until [`initialize`] is called.
    ///
    /// [`initialize`]: SqliteStore::initialize
    pub fn new(config: StorageConfig, order_prefix: impl Into<String>) -> Self {
        Self {
            config,
            order_prefix: order_prefix.into(),
            db: OnceCell::new(),
        }
    }

    /// Open the database, running migrations. Must be called exactly once.
    pub async fn initialize(&self) -> Result<(), KioskError> {
        let db = Database::open(&self.config.database_path).await?;
        self.db.set(db).map_err(|_| KioskError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    /// Checkpoint the WAL ahead of process exit.
    pub async fn close(&self) -> Result<(), KioskError> {
        self.db()?.close().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    fn db(&self) -> Result<&Database, KioskError> {
        self.db.get().ok_or_else(|| KioskError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, KioskError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), KioskError> {
        // Shutdown delegates to close if the DB was initialized.
        if let Some(db) = self.db.get() {
            db.close().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl CommerceStore for SqliteStore {
    // --- Catalog reads ---

    async fn list_regions(&self) -> Result<Vec<Region>, KioskError> {
        queries::catalog::list_regions(self.db()?).await
    }

    async fn get_region(&self, region_id: i64) -> Result<Option<Region>, KioskError> {
        queries::catalog::get_region(self.db()?, region_id).await
    }

    async fn list_categories(&self, region_id: i64) -> Result<Vec<Category>, KioskError> {
        queries::catalog::list_categories(self.db()?, region_id).await
    }

    async fn get_category(&self, category_id: i64) -> Result<Option<Category>, KioskError> {
        queries::catalog::get_category(self.db()?, category_id).await
    }

    async fn list_products(
        &self,
        category_id: i64,
        include_hidden: bool,
    ) -> Result<Vec<Product>, KioskError> {
        queries::catalog::list_products(self.db()?, category_id, include_hidden).await
    }

    async fn list_all_products(&self) -> Result<Vec<Product>, KioskError> {
        queries::catalog::list_all_products(self.db()?).await
    }

    async fn get_product(&self, product_id: i64) -> Result<Option<Product>, KioskError> {
        queries::catalog::get_product(self.db()?, product_id).await
    }

    async fn get_products_by_ids(
        &self,
        product_ids: &[i64],
    ) -> Result<HashMap<i64, Product>, KioskError> {
        queries::catalog::get_products_by_ids(self.db()?, product_ids).await
    }

    // --- Product admin writes ---

    async fn update_product_price(&self, product_id: i64, price: f64) -> Result<(), KioskError> {
        queries::catalog::update_product_price(self.db()?, product_id, price).await
    }

    async fn update_product(
        &self,
        product_id: i64,
        name: &str,
        price: f64,
        description: &str,
    ) -> Result<(), KioskError> {
        queries::catalog::update_product(self.db()?, product_id, name, price, description).await
    }

    async fn set_product_visibility(
        &self,
        product_id: i64,
        is_visible: bool,
    ) -> Result<(), KioskError> {
        queries::catalog::set_product_visibility(self.db()?, product_id, is_visible).await
    }

    async fn update_category_description(
        &self,
        category_id: i64,
        description: &str,
    ) -> Result<(), KioskError> {
        queries::catalog::update_category_description(self.db()?, category_id, description).await
    }

    // --- Orders ---

    async fn create_order(
        &self,
        user_id: UserId,
        product_id: i64,
        price: f64,
    ) -> Result<Order, KioskError> {
        let order_id = generate_order_id(&self.order_prefix);
        queries::orders::create_order(self.db()?, &order_id, user_id, product_id, price).await
    }

    async fn get_order(&self, order_id: &str) -> Result<Option<Order>, KioskError> {
        queries::orders::get_order(self.db()?, order_id).await
    }

    async fn get_user_orders(&self, user_id: UserId) -> Result<Vec<Order>, KioskError> {
        queries::orders::get_user_orders(self.db()?, user_id).await
    }

    async fn get_recent_orders(&self, limit: u32) -> Result<Vec<Order>, KioskError> {
        queries::orders::get_recent_orders(self.db()?, limit).await
    }

    async fn update_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> Result<(), KioskError> {
        queries::orders::update_order_status(self.db()?, order_id, status).await
    }

    async fn order_stats(&self) -> Result<OrderStats, KioskError> {
        queries::orders::order_stats(self.db()?).await
    }

    // --- Settings ---

    async fn get_settings(&self) -> Result<BotSettings, KioskError> {
        queries::settings::get_settings(self.db()?).await
    }

    async fn update_welcome_message(&self, message: &str) -> Result<(), KioskError> {
        queries::settings::update_welcome_message(self.db()?, message).await
    }

    // --- Users ---

    async fn upsert_user(&self, profile: &UserProfile) -> Result<(), KioskError> {
        queries::users::upsert_user(self.db()?, profile).await
    }

    async fn list_active_users(&self) -> Result<Vec<ShopUser>, KioskError> {
        queries::users::list_active_users(self.db()?).await
    }

    async fn count_active_users(&self) -> Result<u64, KioskError> {
        queries::users::count_active_users(self.db()?).await
    }

    async fn mark_user_blocked(&self, user_id: UserId) -> Result<(), KioskError> {
        queries::users::mark_user_blocked(self.db()?, user_id).await
    }

    // --- Broadcasts ---

    async fn create_broadcast(
        &self,
        admin_id: UserId,
        text: &str,
    ) -> Result<Broadcast, KioskError> {
        queries::broadcasts::create_broadcast(self.db()?, admin_id, text).await
    }

    async fn get_broadcast(&self, broadcast_id: i64) -> Result<Option<Broadcast>, KioskError> {
        queries::broadcasts::get_broadcast(self.db()?, broadcast_id).await
    }

    async fn update_broadcast_status(
        &self,
        broadcast_id: i64,
        status: BroadcastStatus,
        total_users: u32,
        sent_count: u32,
        failed_count: u32,
    ) -> Result<(), KioskError> {
        queries::broadcasts::update_broadcast_status(
            self.db()?,
            broadcast_id,
            status,
            total_users,
            sent_count,
            failed_count,
        )
        .await
    }

    async fn delete_broadcast(&self, broadcast_id: i64) -> Result<(), KioskError> {
        queries::broadcasts::delete_broadcast(self.db()?, broadcast_id).await
    }

    async fn add_broadcast_photo(
        &self,
        broadcast_id: i64,
        file_id: &str,
        sort_order: i64,
    ) -> Result<(), KioskError> {
        queries::broadcasts::add_broadcast_photo(self.db()?, broadcast_id, file_id, sort_order)
            .await
    }

    async fn list_broadcast_photos(
        &self,
        broadcast_id: i64,
    ) -> Result<Vec<BroadcastPhoto>, KioskError> {
        queries::broadcasts::list_broadcast_photos(self.db()?, broadcast_id).await
    }
}
