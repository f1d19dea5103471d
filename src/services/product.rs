//! Product catalog service: creates a product together with its initial
//! stock record as a single transaction.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Product service for catalog writes
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// Input for creating a product with its initial stock record
///
/// All fields are optional at the wire level so that presence checks report
/// the offending field instead of failing in deserialization. `price` is
/// taken as a raw JSON value and coerced during validation, so a malformed
/// price gets the same error shape as any other bad field.
#[derive(Debug, Deserialize)]
pub struct CreateProductInput {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub price: Option<Value>,
    pub warehouse_id: Option<Uuid>,
    pub initial_quantity: Option<i32>,
}

/// Validated creation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub sku: String,
    pub price: Decimal,
    pub warehouse_id: Uuid,
    pub quantity: i32,
}

/// Result of a successful creation
#[derive(Debug, Serialize)]
pub struct ProductCreated {
    pub product_id: Uuid,
    pub message: String,
}

impl CreateProductInput {
    /// Check presence and shape of every field, resolving defaults.
    ///
    /// `initial_quantity` is optional and defaults to 0 when absent; an
    /// explicit 0 is a real value, not a missing one. Everything else is
    /// required and must be non-empty.
    pub fn validate(self) -> Result<NewProduct, AppError> {
        let name = require_text("name", self.name)?;
        let sku = require_text("sku", self.sku)?;

        let price = parse_price(self.price)?;
        if price < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "price".to_string(),
                message: "Price must not be negative".to_string(),
            });
        }

        let warehouse_id = self.warehouse_id.ok_or_else(|| missing("warehouse_id"))?;

        let quantity = self.initial_quantity.unwrap_or(0);
        if quantity < 0 {
            return Err(AppError::Validation {
                field: "initial_quantity".to_string(),
                message: "Initial quantity must not be negative".to_string(),
            });
        }

        Ok(NewProduct {
            name,
            sku,
            price,
            warehouse_id,
            quantity,
        })
    }
}

/// Coerce the wire-level price into a decimal. JSON numbers and numeric
/// strings are accepted; null counts as missing, anything else is malformed.
fn parse_price(value: Option<Value>) -> Result<Decimal, AppError> {
    let value = match value {
        None | Some(Value::Null) => return Err(missing("price")),
        Some(v) => v,
    };

    let parsed = match &value {
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    };

    parsed.ok_or_else(|| AppError::Validation {
        field: "price".to_string(),
        message: "Price must be a number".to_string(),
    })
}

fn require_text(field: &str, value: Option<String>) -> Result<String, AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(missing(field)),
    }
}

fn missing(field: &str) -> AppError {
    AppError::Validation {
        field: field.to_string(),
        message: format!("Missing required field: {}", field),
    }
}

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a product and its initial inventory row atomically
    ///
    /// The SKU lookup is a fast-path rejection only; the durable guarantee
    /// is the unique index on `products.sku`, and constraint violations from
    /// a concurrent writer surface as a conflict as well.
    pub async fn create_product(&self, input: CreateProductInput) -> AppResult<ProductCreated> {
        let new_product = input.validate()?;

        let sku_taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE sku = $1)",
        )
        .bind(&new_product.sku)
        .fetch_one(&self.db)
        .await?;

        if sku_taken {
            return Err(AppError::Conflict("SKU already exists".to_string()));
        }

        // Both inserts commit together; dropping the transaction on any
        // failure rolls back so no partial state becomes visible.
        let mut tx = self.db.begin().await?;

        let product_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO products (name, sku, price)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&new_product.name)
        .bind(&new_product.sku)
        .bind(new_product.price)
        .fetch_one(&mut *tx)
        .await
        .map_err(sku_conflict_or_db)?;

        sqlx::query(
            r#"
            INSERT INTO inventories (product_id, warehouse_id, quantity)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(product_id)
        .bind(new_product.warehouse_id)
        .bind(new_product.quantity)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(%product_id, sku = %new_product.sku, "product created");

        Ok(ProductCreated {
            product_id,
            message: "Product created".to_string(),
        })
    }
}

/// Translate a unique-index violation on the SKU into a conflict; any other
/// store failure stays a database error.
fn sku_conflict_or_db(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("SKU already exists".to_string())
        }
        _ => AppError::Database(err),
    }
}
