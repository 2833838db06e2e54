// src/domain/mod.rs
pub mod catalog;
pub mod errors;
pub mod models;

// Re-export common types for convenience
pub use catalog::{Category, ItemsKind, LookupKey, PriceCatalog};
pub use errors::{AppError, AppResult, OrderError, OrderResult};
pub use models::{
    CustomerDetails, DiscreteLine, Fulfilment, Order, OrderStatus, OrderTerms, Totals,
};
