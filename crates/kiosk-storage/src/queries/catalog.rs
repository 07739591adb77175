// SPDX-FileCopyrightText: 2026 Kiosk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalog queries: regions, categories, products.

use std::collections::HashMap;

use kiosk_core::KioskError;
use kiosk_core::types::{Category, Product, Region};
use rusqlite::params;

use crate::database::Database;

fn region_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Region> {
    Ok(Region {
        id: row.get(0)?,
        name: row.get(1)?,
        code: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn category_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        region_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        sort_order: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn product_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get(0)?,
        category_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        price: row.get(4)?,
        is_visible: row.get(5)?,
        sort_order: row.get(6)?,
        created_at: row.get(7)?,
    })
}

const PRODUCT_COLS: &str = "id, category_id, name, description, price, is_visible, sort_order, created_at";

/// All regions in display order.
pub async fn list_regions(db: &Database) -> Result<Vec<Region>, KioskError> {
    db.connection()
        .call(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, name, code, created_at FROM regions ORDER BY name")?;
            let rows = stmt.query_map([], region_from_row)?;
            let mut regions = Vec::new();
            for row in rows {
                regions.push(row?);
            }
            Ok(regions)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn get_region(db: &Database, region_id: i64) -> Result<Option<Region>, KioskError> {
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare("SELECT id, name, code, created_at FROM regions WHERE id = ?1")?;
            match stmt.query_row(params![region_id], region_from_row) {
                Ok(region) => Ok(Some(region)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Categories of a region in sort order.
pub async fn list_categories(db: &Database, region_id: i64) -> Result<Vec<Category>, KioskError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, region_id, name, description, sort_order, created_at
                 FROM categories WHERE region_id = ?1 ORDER BY sort_order, name",
            )?;
            let rows = stmt.query_map(params![region_id], category_from_row)?;
            let mut categories = Vec::new();
            for row in rows {
                categories.push(row?);
            }
            Ok(categories)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn get_category(db: &Database, category_id: i64) -> Result<Option<Category>, KioskError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, region_id, name, description, sort_order, created_at
                 FROM categories WHERE id = ?1",
            )?;
            match stmt.query_row(params![category_id], category_from_row) {
                Ok(category) => Ok(Some(category)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Products of a category in sort order. Hidden products are filtered out
/// unless `include_hidden` is set.
pub async fn list_products(
    db: &Database,
    category_id: i64,
    include_hidden: bool,
) -> Result<Vec<Product>, KioskError> {
    db.connection()
        .call(move |conn| {
            let sql = if include_hidden {
                format!(
                    "SELECT {PRODUCT_COLS} FROM products
                     WHERE category_id = ?1 ORDER BY sort_order, name"
                )
            } else {
                format!(
                    "SELECT {PRODUCT_COLS} FROM products
                     WHERE category_id = ?1 AND is_visible = 1 ORDER BY sort_order, name"
                )
            };
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![category_id], product_from_row)?;
            let mut products = Vec::new();
            for row in rows {
                products.push(row?);
            }
            Ok(products)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Every product, including hidden ones (admin panel view).
pub async fn list_all_products(db: &Database) -> Result<Vec<Product>, KioskError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PRODUCT_COLS} FROM products ORDER BY category_id, sort_order, name"
            ))?;
            let rows = stmt.query_map([], product_from_row)?;
            let mut products = Vec::new();
            for row in rows {
                products.push(row?);
            }
            Ok(products)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn get_product(db: &Database, product_id: i64) -> Result<Option<Product>, KioskError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PRODUCT_COLS} FROM products WHERE id = ?1"
            ))?;
            match stmt.query_row(params![product_id], product_from_row) {
                Ok(product) => Ok(Some(product)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Batch product lookup keyed by id. Unknown ids are silently absent.
pub async fn get_products_by_ids(
    db: &Database,
    product_ids: &[i64],
) -> Result<HashMap<i64, Product>, KioskError> {
    if product_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let ids = product_ids.to_vec();
    db.connection()
        .call(move |conn| {
            let placeholders = vec!["?"; ids.len()].join(", ");
            let mut stmt = conn.prepare(&format!(
                "SELECT {PRODUCT_COLS} FROM products WHERE id IN ({placeholders})"
            ))?;
            let rows = stmt.query_map(rusqlite::params_from_iter(ids.iter()), product_from_row)?;
            let mut products = HashMap::new();
            for row in rows {
                let product = row?;
                products.insert(product.id, product);
            }
            Ok(products)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn update_product_price(
    db: &Database,
    product_id: i64,
    price: f64,
) -> Result<(), KioskError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE products SET price = ?1 WHERE id = ?2",
                params![price, product_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn update_product(
    db: &Database,
    product_id: i64,
    name: &str,
    price: f64,
    description: &str,
) -> Result<(), KioskError> {
    let name = name.to_string();
    let description = description.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE products SET name = ?1, price = ?2, description = ?3 WHERE id = ?4",
                params![name, price, description, product_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn set_product_visibility(
    db: &Database,
    product_id: i64,
    is_visible: bool,
) -> Result<(), KioskError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE products SET is_visible = ?1 WHERE id = ?2",
                params![is_visible, product_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn update_category_description(
    db: &Database,
    category_id: i64,
    description: &str,
) -> Result<(), KioskError> {
    let description = description.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE categories SET description = ?1 WHERE id = ?2",
                params![description, category_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_catalog, setup_db};

    #[tokio::test]
    async fn list_regions_is_sorted_by_name() {
        let (db, _dir) = setup_db().await;
        seed_catalog(&db).await;

        let regions = list_regions(&db).await.unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].name, "Asia");
        assert_eq!(regions[1].name, "Europe");
    }

    #[tokio::test]
    async fn get_region_returns_none_for_unknown_id() {
        let (db, _dir) = setup_db().await;
        assert!(get_region(&db, 999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_categories_is_scoped_to_region() {
        let (db, _dir) = setup_db().await;
        let seeded = seed_catalog(&db).await;

        let categories = list_categories(&db, seeded.europe_id).await.unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "Gift Cards");

        let empty = list_categories(&db, seeded.asia_id).await.unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn list_products_hides_invisible_by_default() {
        let (db, _dir) = setup_db().await;
        let seeded = seed_catalog(&db).await;

        let visible = list_products(&db, seeded.category_id, false).await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].name, "Gold Card");

        let all = list_products(&db, seeded.category_id, true).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().any(|p| p.id == seeded.hidden_product_id));
    }

    #[tokio::test]
    async fn get_products_by_ids_skips_unknown() {
        let (db, _dir) = setup_db().await;
        let seeded = seed_catalog(&db).await;

        let map = get_products_by_ids(&db, &[seeded.product_id, 9999])
            .await
            .unwrap();
        assert_eq!(map.len(), 1);
        assert!(map.contains_key(&seeded.product_id));

        let empty = get_products_by_ids(&db, &[]).await.unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn update_product_price_persists() {
        let (db, _dir) = setup_db().await;
        let seeded = seed_catalog(&db).await;

        update_product_price(&db, seeded.product_id, 49.5)
            .await
            .unwrap();
        let product = get_product(&db, seeded.product_id).await.unwrap().unwrap();
        assert_eq!(product.price, 49.5);
    }

    #[tokio::test]
    async fn update_product_rewrites_all_editable_fields() {
        let (db, _dir) = setup_db().await;
        let seeded = seed_catalog(&db).await;

        update_product(&db, seeded.product_id, "Platinum Card", 99.0, "shiny")
            .await
            .unwrap();
        let product = get_product(&db, seeded.product_id).await.unwrap().unwrap();
        assert_eq!(product.name, "Platinum Card");
        assert_eq!(product.price, 99.0);
        assert_eq!(product.description, "shiny");
    }

    #[tokio::test]
    async fn visibility_toggle_round_trips() {
        let (db, _dir) = setup_db().await;
        let seeded = seed_catalog(&db).await;

        set_product_visibility(&db, seeded.product_id, false)
            .await
            .unwrap();
        let product = get_product(&db, seeded.product_id).await.unwrap().unwrap();
        assert!(!product.is_visible);

        set_product_visibility(&db, seeded.product_id, true)
            .await
            .unwrap();
        let product = get_product(&db, seeded.product_id).await.unwrap().unwrap();
        assert!(product.is_visible);
    }

    #[tokio::test]
    async fn update_category_description_persists() {
        let (db, _dir) = setup_db().await;
        let seeded = seed_catalog(&db).await;

        update_category_description(&db, seeded.category_id, "new blurb")
            .await
            .unwrap();
        let category = get_category(&db, seeded.category_id).await.unwrap().unwrap();
        assert_eq!(category.description, "new blurb");
    }
}
