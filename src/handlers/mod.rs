//! HTTP handlers for the Stockwatch inventory API

pub mod alerts;
pub mod health;
pub mod products;

pub use alerts::get_low_stock_alerts;
pub use health::health_check;
pub use products::create_product;
