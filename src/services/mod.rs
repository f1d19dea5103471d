//! Business logic services for the Stockwatch inventory API

pub mod low_stock;
pub mod product;

pub use low_stock::LowStockService;
pub use product::ProductService;
