// SPDX-FileCopyrightText: 2026 Kiosk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Order queries: creation with price snapshot, lookups, status updates,
//! and aggregate statistics.

use kiosk_core::KioskError;
use kiosk_core::types::{Order, OrderStats, OrderStatus, UserId};
use rusqlite::params;

use crate::database::Database;
use crate::queries::parse_status;

fn order_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Order> {
    Ok(Order {
        order_id: row.get(0)?,
        user_id: UserId(row.get(1)?),
        product_id: row.get(2)?,
        price: row.get(3)?,
        status: parse_status(4, row.get(4)?)?,
        created_at: row.get(5)?,
    })
}

const ORDER_COLS: &str = "order_id, user_id, product_id, price, status, created_at";

/// Insert an order with the given pre-generated id and price snapshot,
/// returning the stored row.
pub async fn create_order(
    db: &Database,
    order_id: &str,
    user_id: UserId,
    product_id: i64,
    price: f64,
) -> Result<Order, KioskError> {
    let order_id = order_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO orders (order_id, user_id, product_id, price)
                 VALUES (?1, ?2, ?3, ?4)",
                params![order_id, user_id.0, product_id, price],
            )?;
            let order = conn.query_row(
                &format!("SELECT {ORDER_COLS} FROM orders WHERE order_id = ?1"),
                params![order_id],
                order_from_row,
            )?;
            Ok(order)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn get_order(db: &Database, order_id: &str) -> Result<Option<Order>, KioskError> {
    let order_id = order_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {ORDER_COLS} FROM orders WHERE order_id = ?1"))?;
            match stmt.query_row(params![order_id], order_from_row) {
                Ok(order) => Ok(Some(order)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// A user's order history, newest first.
pub async fn get_user_orders(db: &Database, user_id: UserId) -> Result<Vec<Order>, KioskError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ORDER_COLS} FROM orders WHERE user_id = ?1 ORDER BY created_at DESC"
            ))?;
            let rows = stmt.query_map(params![user_id.0], order_from_row)?;
            let mut orders = Vec::new();
            for row in rows {
                orders.push(row?);
            }
            Ok(orders)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The most recent orders across all users (admin panel).
pub async fn get_recent_orders(db: &Database, limit: u32) -> Result<Vec<Order>, KioskError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ORDER_COLS} FROM orders ORDER BY created_at DESC LIMIT ?1"
            ))?;
            let rows = stmt.query_map(params![limit], order_from_row)?;
            let mut orders = Vec::new();
            for row in rows {
                orders.push(row?);
            }
            Ok(orders)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn update_order_status(
    db: &Database,
    order_id: &str,
    status: OrderStatus,
) -> Result<(), KioskError> {
    let order_id = order_id.to_string();
    let status = status.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE orders SET status = ?1 WHERE order_id = ?2",
                params![status, order_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Aggregate counts and revenue. Revenue counts paid and completed orders only.
pub async fn order_stats(db: &Database) -> Result<OrderStats, KioskError> {
    db.connection()
        .call(|conn| {
            let stats = conn.query_row(
                "SELECT COUNT(*),
                        COUNT(CASE WHEN status = 'created' THEN 1 END),
                        COUNT(CASE WHEN status = 'paid' THEN 1 END),
                        COUNT(CASE WHEN status = 'completed' THEN 1 END),
                        COALESCE(SUM(CASE WHEN status IN ('paid', 'completed') THEN price ELSE 0 END), 0)
                 FROM orders",
                [],
                |row| {
                    Ok(OrderStats {
                        total_orders: row.get(0)?,
                        pending_orders: row.get(1)?,
                        paid_orders: row.get(2)?,
                        completed_orders: row.get(3)?,
                        total_revenue: row.get(4)?,
                    })
                },
            )?;
            Ok(stats)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_catalog, setup_db};

    #[tokio::test]
    async fn create_and_get_order_round_trips() {
        let (db, _dir) = setup_db().await;
        let seeded = seed_catalog(&db).await;

        let order = create_order(&db, "WOW260830001", UserId(7), seeded.product_id, 25.0)
            .await
            .unwrap();
        assert_eq!(order.order_id, "WOW260830001");
        assert_eq!(order.status, OrderStatus::Created);
        assert_eq!(order.price, 25.0);

        let fetched = get_order(&db, "WOW260830001").await.unwrap().unwrap();
        assert_eq!(fetched, order);
    }

    #[tokio::test]
    async fn get_order_returns_none_for_unknown_id() {
        let (db, _dir) = setup_db().await;
        assert!(get_order(&db, "WOW000000000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn price_snapshot_survives_product_price_change() {
        let (db, _dir) = setup_db().await;
        let seeded = seed_catalog(&db).await;

        create_order(&db, "WOW260830002", UserId(7), seeded.product_id, 25.0)
            .await
            .unwrap();
        crate::queries::catalog::update_product_price(&db, seeded.product_id, 99.0)
            .await
            .unwrap();

        let order = get_order(&db, "WOW260830002").await.unwrap().unwrap();
        assert_eq!(order.price, 25.0, "stored order keeps the original price");
    }

    #[tokio::test]
    async fn user_orders_are_scoped_and_newest_first() {
        let (db, _dir) = setup_db().await;
        let seeded = seed_catalog(&db).await;

        create_order(&db, "WOW260830003", UserId(1), seeded.product_id, 10.0)
            .await
            .unwrap();
        create_order(&db, "WOW260830004", UserId(2), seeded.product_id, 20.0)
            .await
            .unwrap();

        let orders = get_user_orders(&db, UserId(1)).await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].order_id, "WOW260830003");
    }

    #[tokio::test]
    async fn recent_orders_respects_limit() {
        let (db, _dir) = setup_db().await;
        let seeded = seed_catalog(&db).await;

        for n in 0..5 {
            create_order(&db, &format!("WOW26083010{n}"), UserId(1), seeded.product_id, 1.0)
                .await
                .unwrap();
        }

        let recent = get_recent_orders(&db, 3).await.unwrap();
        assert_eq!(recent.len(), 3);
    }

    #[tokio::test]
    async fn status_update_round_trips() {
        let (db, _dir) = setup_db().await;
        let seeded = seed_catalog(&db).await;

        create_order(&db, "WOW260830005", UserId(1), seeded.product_id, 5.0)
            .await
            .unwrap();
        update_order_status(&db, "WOW260830005", OrderStatus::Paid)
            .await
            .unwrap();

        let order = get_order(&db, "WOW260830005").await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Paid);
    }

    #[tokio::test]
    async fn stats_count_revenue_for_paid_and_completed_only() {
        let (db, _dir) = setup_db().await;
        let seeded = seed_catalog(&db).await;

        create_order(&db, "WOW260830006", UserId(1), seeded.product_id, 10.0)
            .await
            .unwrap();
        create_order(&db, "WOW260830007", UserId(1), seeded.product_id, 20.0)
            .await
            .unwrap();
        create_order(&db, "WOW260830008", UserId(2), seeded.product_id, 40.0)
            .await
            .unwrap();
        update_order_status(&db, "WOW260830007", OrderStatus::Paid)
            .await
            .unwrap();
        update_order_status(&db, "WOW260830008", OrderStatus::Completed)
            .await
            .unwrap();

        let stats = order_stats(&db).await.unwrap();
        assert_eq!(stats.total_orders, 3);
        assert_eq!(stats.pending_orders, 1);
        assert_eq!(stats.paid_orders, 1);
        assert_eq!(stats.completed_orders, 1);
        assert_eq!(stats.total_revenue, 60.0);
    }

    #[tokio::test]
    async fn stats_on_empty_table_are_zero() {
        let (db, _dir) = setup_db().await;
        let stats = order_stats(&db).await.unwrap();
        assert_eq!(stats, OrderStats::default());
    }
}
