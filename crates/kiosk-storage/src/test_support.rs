// SPDX-FileCopyrightText: 2026 Kiosk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared fixtures for query tests.

use tempfile::TempDir;

use crate::database::Database;

pub(crate) async fn setup_db() -> (Database, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test.db");
    let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
    (db, dir)
}

pub(crate) struct SeededCatalog {
    pub europe_id: i64,
    pub asia_id: i64,
    pub category_id: i64,
    pub product_id: i64,
    pub hidden_product_id: i64,
}

/// Insert two regions, one category under Europe, and one visible plus one
/// hidden product under that category.
pub(crate) async fn seed_catalog(db: &Database) -> SeededCatalog {
    db.connection()
        .call(|conn| -> Result<SeededCatalog, rusqlite::Error> {
            conn.execute(
                "INSERT INTO regions (name, code) VALUES ('Europe', 'EU')",
                [],
            )?;
            let europe_id = conn.last_insert_rowid();
            conn.execute("INSERT INTO regions (name, code) VALUES ('Asia', 'KZ')", [])?;
            let asia_id = conn.last_insert_rowid();

            conn.execute(
                "INSERT INTO categories (region_id, name, description, sort_order)
                 VALUES (?1, 'Gift Cards', 'prepaid cards', 0)",
                [europe_id],
            )?;
            let category_id = conn.last_insert_rowid();

            conn.execute(
                "INSERT INTO products (category_id, name, description, price, is_visible, sort_order)
                 VALUES (?1, 'Gold Card', '50 EUR value', 25.0, 1, 0)",
                [category_id],
            )?;
            let product_id = conn.last_insert_rowid();
            conn.execute(
                "INSERT INTO products (category_id, name, description, price, is_visible, sort_order)
                 VALUES (?1, 'Hidden Card', '', 5.0, 0, 1)",
                [category_id],
            )?;
            let hidden_product_id = conn.last_insert_rowid();

            Ok(SeededCatalog {
                europe_id,
                asia_id,
                category_id,
                product_id,
                hidden_product_id,
            })
        })
        .await
        .unwrap()
}
