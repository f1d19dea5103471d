//! Product creation persistence tests
//!
//! Exercises the atomic dual-write against a live Postgres: both records or
//! neither, and one product per SKU. Each test gets a fresh database with
//! the migrations applied. They are ignored by default because they need a
//! running server; point DATABASE_URL at a scratch Postgres and run
//! `cargo test -- --ignored`.

use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

use stockwatch::error::AppError;
use stockwatch::services::product::{CreateProductInput, ProductService};

async fn seed_warehouse(pool: &PgPool) -> Uuid {
    let company_id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO companies (name) VALUES ('Acme Retail') RETURNING id",
    )
    .fetch_one(pool)
    .await
    .unwrap();

    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO warehouses (company_id, name) VALUES ($1, 'Central') RETURNING id",
    )
    .bind(company_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

fn input(sku: &str, warehouse_id: Uuid) -> CreateProductInput {
    CreateProductInput {
        name: Some("Beeswax Candle".to_string()),
        sku: Some(sku.to_string()),
        price: Some(json!("4.25")),
        warehouse_id: Some(warehouse_id),
        initial_quantity: None,
    }
}

async fn products_with_sku(pool: &PgPool, sku: &str) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products WHERE sku = $1")
        .bind(sku)
        .fetch_one(pool)
        .await
        .unwrap()
}

/// After a successful call a reader finds both the product and its
/// inventory row, with the defaulted quantity
#[sqlx::test]
#[ignore = "requires a live Postgres (set DATABASE_URL)"]
async fn test_create_persists_product_and_inventory(pool: PgPool) {
    let warehouse_id = seed_warehouse(&pool).await;
    let service = ProductService::new(pool.clone());

    let created = service
        .create_product(input("CANDLE-001", warehouse_id))
        .await
        .unwrap();

    let (name, price) = sqlx::query_as::<_, (String, Decimal)>(
        "SELECT name, price FROM products WHERE id = $1",
    )
    .bind(created.product_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(name, "Beeswax Candle");
    assert_eq!(price, Decimal::from_str("4.25").unwrap());

    let (inv_warehouse, quantity) = sqlx::query_as::<_, (Uuid, i32)>(
        "SELECT warehouse_id, quantity FROM inventories WHERE product_id = $1",
    )
    .bind(created.product_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(inv_warehouse, warehouse_id);
    assert_eq!(quantity, 0);
}

/// A failure between the two inserts leaves neither record behind. The
/// inventory insert is forced to fail with an unknown warehouse, after the
/// product insert has already run inside the transaction.
#[sqlx::test]
#[ignore = "requires a live Postgres (set DATABASE_URL)"]
async fn test_failed_inventory_insert_rolls_back_product(pool: PgPool) {
    seed_warehouse(&pool).await;
    let service = ProductService::new(pool.clone());

    let err = service
        .create_product(input("CANDLE-002", Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Database(_)));

    assert_eq!(products_with_sku(&pool, "CANDLE-002").await, 0);
    let inventories = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM inventories")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(inventories, 0);
}

/// Submitting the same SKU twice never yields two products; the second call
/// is rejected as a conflict
#[sqlx::test]
#[ignore = "requires a live Postgres (set DATABASE_URL)"]
async fn test_duplicate_sku_rejected(pool: PgPool) {
    let warehouse_id = seed_warehouse(&pool).await;
    let service = ProductService::new(pool.clone());

    service
        .create_product(input("CANDLE-003", warehouse_id))
        .await
        .unwrap();

    let err = service
        .create_product(input("CANDLE-003", warehouse_id))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    assert_eq!(products_with_sku(&pool, "CANDLE-003").await, 1);
}
