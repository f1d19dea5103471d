//! Low-stock alert engine
//!
//! Walks company -> warehouses -> inventory -> product -> supplier and emits
//! one alert per stock position that is both under its threshold and still
//! selling. The decision logic is kept in pure functions so it can be tested
//! without a database.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Threshold applied when a product has none configured. A configured
/// threshold of 0 is honored as 0, not replaced by this default.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 10;

/// A product only alerts if it sold within this window; stale products are
/// excluded regardless of stock level.
pub const RECENT_SALE_WINDOW_DAYS: i64 = 30;

/// Low-stock alert service
#[derive(Clone)]
pub struct LowStockService {
    db: PgPool,
}

/// One alert record in the batch
#[derive(Debug, Clone, Serialize)]
pub struct LowStockAlert {
    pub product_id: Uuid,
    pub product_name: String,
    pub sku: String,
    pub warehouse_id: Uuid,
    pub warehouse_name: String,
    pub current_stock: i32,
    pub threshold: i32,
    pub days_until_stockout: Option<i64>,
    pub supplier: Option<SupplierContact>,
}

/// Supplier reference attached to an alert. Absent when the product has no
/// supplier link; the alert is still emitted.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SupplierContact {
    pub id: Uuid,
    pub name: String,
    pub contact_email: String,
}

/// Complete alert batch for one company
#[derive(Debug, Serialize)]
pub struct LowStockReport {
    pub alerts: Vec<LowStockAlert>,
    pub total_alerts: usize,
}

/// Outcome of evaluating a single stock position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertDecision {
    pub threshold: i32,
    pub days_until_stockout: Option<i64>,
}

/// Row for the inventory-with-product join
#[derive(Debug, FromRow)]
struct StockRow {
    product_id: Uuid,
    product_name: String,
    sku: String,
    quantity: i32,
    low_stock_threshold: Option<i32>,
    last_sale_date: Option<DateTime<Utc>>,
    daily_sales_avg: Option<Decimal>,
}

#[derive(Debug, FromRow)]
struct WarehouseRow {
    id: Uuid,
    name: String,
}

/// Resolve the effective threshold for a product. Absent means the default;
/// zero is a real configured value.
pub fn resolve_threshold(configured: Option<i32>) -> i32 {
    configured.unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD)
}

/// True iff the product sold strictly within the recent-sale window.
/// A product never sold is never considered recent.
pub fn sold_recently(last_sale_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match last_sale_date {
        Some(sold_at) => now - sold_at < Duration::days(RECENT_SALE_WINDOW_DAYS),
        None => false,
    }
}

/// Naive linear stockout projection: floor(quantity / daily average).
///
/// Returns `None` when the average is absent or not positive — unknown is
/// distinct from 0, which means stockout is imminent.
pub fn days_until_stockout(quantity: i32, daily_sales_avg: Option<Decimal>) -> Option<i64> {
    match daily_sales_avg {
        Some(avg) if avg > Decimal::ZERO => (Decimal::from(quantity) / avg).floor().to_i64(),
        _ => None,
    }
}

/// Evaluate one stock position. Returns `Some` with the resolved threshold
/// and stockout estimate iff the position is under threshold AND the product
/// sold recently; flipping either condition alone yields no alert.
pub fn evaluate_stock(
    quantity: i32,
    configured_threshold: Option<i32>,
    last_sale_date: Option<DateTime<Utc>>,
    daily_sales_avg: Option<Decimal>,
    now: DateTime<Utc>,
) -> Option<AlertDecision> {
    let threshold = resolve_threshold(configured_threshold);
    if quantity < threshold && sold_recently(last_sale_date, now) {
        Some(AlertDecision {
            threshold,
            days_until_stockout: days_until_stockout(quantity, daily_sales_avg),
        })
    } else {
        None
    }
}

impl LowStockService {
    /// Create a new LowStockService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Compute the complete low-stock alert batch for a company
    ///
    /// A company with no warehouses is a not-found condition, not an empty
    /// success. Any query failure aborts the whole computation; a partial
    /// batch is never returned.
    pub async fn low_stock_report(&self, company_id: Uuid) -> AppResult<LowStockReport> {
        let warehouses = sqlx::query_as::<_, WarehouseRow>(
            "SELECT id, name FROM warehouses WHERE company_id = $1",
        )
        .bind(company_id)
        .fetch_all(&self.db)
        .await?;

        if warehouses.is_empty() {
            return Err(AppError::NotFound(
                "No warehouses found for this company".to_string(),
            ));
        }

        let now = Utc::now();
        let mut alerts = Vec::new();

        for warehouse in &warehouses {
            let rows = sqlx::query_as::<_, StockRow>(
                r#"
                SELECT p.id AS product_id, p.name AS product_name, p.sku,
                       i.quantity, p.low_stock_threshold, p.last_sale_date,
                       p.daily_sales_avg
                FROM inventories i
                JOIN products p ON p.id = i.product_id
                WHERE i.warehouse_id = $1
                "#,
            )
            .bind(warehouse.id)
            .fetch_all(&self.db)
            .await?;

            for row in rows {
                let Some(decision) = evaluate_stock(
                    row.quantity,
                    row.low_stock_threshold,
                    row.last_sale_date,
                    row.daily_sales_avg,
                    now,
                ) else {
                    continue;
                };

                let supplier = self.first_supplier(row.product_id).await?;

                alerts.push(LowStockAlert {
                    product_id: row.product_id,
                    product_name: row.product_name,
                    sku: row.sku,
                    warehouse_id: warehouse.id,
                    warehouse_name: warehouse.name.clone(),
                    current_stock: row.quantity,
                    threshold: decision.threshold,
                    days_until_stockout: decision.days_until_stockout,
                    supplier,
                });
            }
        }

        let total_alerts = alerts.len();
        Ok(LowStockReport {
            alerts,
            total_alerts,
        })
    }

    /// Resolve at most one supplier for a product. The link table is
    /// many-to-many; alerting deliberately takes the first match with an
    /// arbitrary tie-break when several links exist.
    async fn first_supplier(&self, product_id: Uuid) -> AppResult<Option<SupplierContact>> {
        let supplier = sqlx::query_as::<_, SupplierContact>(
            r#"
            SELECT s.id, s.name, s.contact_email
            FROM supplier_products sp
            JOIN suppliers s ON s.id = sp.supplier_id
            WHERE sp.product_id = $1
            LIMIT 1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(supplier)
    }
}
