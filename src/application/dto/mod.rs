// src/application/dto/mod.rs
// Application-level data transfer objects and errors

pub mod parser;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::domain::errors::OrderError;
use crate::domain::models::{Order, Totals};

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Order(#[from] OrderError),

    #[error("{0}")]
    Parse(String),

    #[error("The current order is empty!")]
    EmptyOrder,

    #[error("There is no order in progress")]
    NoActiveOrder,
}

/// What a finished order looked like at the moment it was closed
#[derive(Debug, Clone, Serialize)]
pub struct Receipt {
    pub order: Order,
    pub totals: Totals,
    pub finished_at: DateTime<Utc>,
}

impl Receipt {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// A line taken out of the order by its listing number
#[derive(Debug, Clone, PartialEq)]
pub enum RemovedLine {
    Discrete { item: String, quantity: u32 },
    Bulk { quantity: rust_decimal::Decimal },
}
