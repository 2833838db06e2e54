// src/domain/models.rs
use rand::Rng;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::config::ShopConfig;
use crate::domain::catalog::{LookupKey, PriceCatalog};
use crate::domain::errors::{OrderError, OrderResult};

/// Limits and pricing rules injected into every new order
#[derive(Debug, Clone, PartialEq)]
pub struct OrderTerms {
    /// Maximum quantity of each fixed item, keyed by item name
    pub item_caps: HashMap<String, u32>,
    /// Maximum number of bulk purchases in one order
    pub max_bulk_entries: usize,
    /// Largest single bulk purchase
    pub max_bulk_unit_size: Decimal,
    /// Flat reduction per discrete unit on frozen orders
    pub frozen_discount_per_unit: Decimal,
    /// Fraction of the subtotal charged as tax
    pub tax_rate: Decimal,
    pub delivery_charge: Decimal,
}

impl OrderTerms {
    /// Resolve per-category caps from the catalog against the shop defaults
    pub fn from_config(shop: &ShopConfig, catalog: &PriceCatalog) -> Self {
        let item_caps = catalog
            .fixed_items()
            .filter_map(|(_, item)| {
                catalog
                    .max_per_item(item, shop.max_per_item)
                    .map(|cap| (item.to_string(), cap))
            })
            .collect();

        Self {
            item_caps,
            max_bulk_entries: shop.max_bulk_entries,
            max_bulk_unit_size: shop.max_bulk_unit_size,
            frozen_discount_per_unit: shop.frozen_discount_per_unit,
            tax_rate: shop.tax_rate,
            delivery_charge: shop.delivery_charge,
        }
    }

    fn cap(&self, item: &str) -> OrderResult<u32> {
        self.item_caps
            .get(item)
            .copied()
            .ok_or_else(|| OrderError::NotFound(format!("item \"{}\"", item)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Fulfilment {
    Pickup,
    Delivery { address: String },
}

/// Who the order is for and how it leaves the shop
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerDetails {
    pub name: String,
    pub phone: String,
    pub frozen: bool,
    pub fulfilment: Fulfilment,
}

impl CustomerDetails {
    pub fn address(&self) -> Option<&str> {
        match &self.fulfilment {
            Fulfilment::Delivery { address } => Some(address),
            Fulfilment::Pickup => None,
        }
    }

    fn validate(&self) -> OrderResult<()> {
        if self.name.trim().is_empty() {
            return Err(OrderError::Validation("A customer name is required".to_string()));
        }
        if self.phone.trim().is_empty() {
            return Err(OrderError::Validation("A phone number is required".to_string()));
        }
        if let Some(address) = self.address() {
            if address.trim().is_empty() {
                return Err(OrderError::Validation(
                    "Delivery orders need an address".to_string(),
                ));
            }
        }
        Ok(())
    }
}

impl Default for CustomerDetails {
    fn default() -> Self {
        Self {
            name: String::new(),
            phone: String::new(),
            frozen: false,
            fulfilment: Fulfilment::Pickup,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Open,
    Closed,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OrderStatus::Open => write!(f, "OPEN"),
            OrderStatus::Closed => write!(f, "CLOSED"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscreteLine {
    pub item: String,
    pub quantity: u32,
}

/// Price breakdown of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Totals {
    pub discount: Decimal,
    /// Delivery charge already folded into the subtotal
    pub delivery: Decimal,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub grand_total: Decimal,
}

impl Totals {
    pub fn zero() -> Self {
        Self::default()
    }
}

/// One customer's order for the length of a session
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    order_id: String,
    details: CustomerDetails,
    discrete_items: Vec<DiscreteLine>,
    bulk_entries: Vec<Decimal>,
    status: OrderStatus,
    #[serde(skip)]
    terms: OrderTerms,
}

impl Order {
    pub fn new(terms: OrderTerms) -> Self {
        Self::with_id(generate_order_id(), terms)
    }

    pub fn with_id(order_id: impl Into<String>, terms: OrderTerms) -> Self {
        Self {
            order_id: order_id.into(),
            details: CustomerDetails::default(),
            discrete_items: Vec::new(),
            bulk_entries: Vec::new(),
            status: OrderStatus::Open,
            terms,
        }
    }

    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    pub fn details(&self) -> &CustomerDetails {
        &self.details
    }

    pub fn discrete_items(&self) -> &[DiscreteLine] {
        &self.discrete_items
    }

    pub fn bulk_entries(&self) -> &[Decimal] {
        &self.bulk_entries
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn terms(&self) -> &OrderTerms {
        &self.terms
    }

    pub fn is_frozen(&self) -> bool {
        self.details.frozen
    }

    pub fn is_delivery(&self) -> bool {
        matches!(self.details.fulfilment, Fulfilment::Delivery { .. })
    }

    /// Current quantity of an item, 0 when absent
    pub fn quantity_of(&self, item: &str) -> u32 {
        self.discrete_items
            .iter()
            .find(|line| line.item == item)
            .map(|line| line.quantity)
            .unwrap_or(0)
    }

    pub fn set_details(&mut self, details: CustomerDetails) -> OrderResult<()> {
        self.ensure_open()?;
        details.validate()?;
        log::debug!("Order {}: customer details set for {}", self.order_id, details.name);
        self.details = details;
        Ok(())
    }

    /// How many more units of `item` fit; answers on closed orders too
    pub fn remaining_capacity(&self, item: &str) -> OrderResult<u32> {
        let cap = self.terms.cap(item)?;
        Ok(cap.saturating_sub(self.quantity_of(item)))
    }

    /// Add units of a fixed item; returns the item's new quantity
    pub fn add_discrete(&mut self, item: &str, quantity: u32) -> OrderResult<u32> {
        self.ensure_open()?;
        let remaining = self.remaining_capacity(item)?;
        if quantity < 1 {
            return Err(OrderError::Validation(
                "Quantity must be at least 1".to_string(),
            ));
        }
        if quantity > remaining {
            return Err(OrderError::Validation(format!(
                "Cannot add {} {}: only {} more allowed",
                quantity, item, remaining
            )));
        }

        let total = match self.discrete_items.iter_mut().find(|line| line.item == item) {
            Some(line) => {
                line.quantity += quantity;
                line.quantity
            }
            None => {
                self.discrete_items.push(DiscreteLine {
                    item: item.to_string(),
                    quantity,
                });
                quantity
            }
        };

        log::debug!("Order {}: {} x{} (now {})", self.order_id, item, quantity, total);
        Ok(total)
    }

    /// Remove every unit of an item; returns how many were removed
    pub fn remove_discrete(&mut self, item: &str) -> OrderResult<u32> {
        self.ensure_open()?;
        let position = self
            .discrete_items
            .iter()
            .position(|line| line.item == item)
            .ok_or_else(|| OrderError::NotFound(format!("\"{}\" is not in the order", item)))?;

        let line = self.discrete_items.remove(position);
        log::debug!("Order {}: removed {} {}", self.order_id, line.quantity, item);
        Ok(line.quantity)
    }

    /// Bulk entries still allowed; answers on closed orders too
    pub fn remaining_bulk_slots(&self) -> usize {
        self.terms
            .max_bulk_entries
            .saturating_sub(self.bulk_entries.len())
    }

    /// Append a bulk purchase rounded to one decimal place
    pub fn add_bulk(&mut self, quantity: Decimal) -> OrderResult<Decimal> {
        self.ensure_open()?;
        if self.remaining_bulk_slots() == 0 {
            return Err(OrderError::Validation(format!(
                "No more than {} bulk entries per order",
                self.terms.max_bulk_entries
            )));
        }

        let max = self.terms.max_bulk_unit_size;
        let rounded = quantity.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
        if quantity <= Decimal::ZERO || rounded <= Decimal::ZERO {
            return Err(OrderError::Validation(format!(
                "Amount must be greater than 0, you picked {}",
                quantity
            )));
        }
        if quantity > max || rounded > max {
            return Err(OrderError::Validation(format!(
                "Amount cannot be greater than {}, you picked {}",
                max, quantity
            )));
        }

        let mut stored = rounded;
        stored.rescale(1);
        self.bulk_entries.push(stored);
        log::debug!("Order {}: bulk entry {} added", self.order_id, stored);
        Ok(stored)
    }

    /// Remove the bulk entry at a 1-based position
    pub fn remove_bulk_at(&mut self, index: usize) -> OrderResult<Decimal> {
        self.ensure_open()?;
        let len = self.bulk_entries.len();
        if index < 1 || index > len {
            return Err(OrderError::IndexOutOfRange { index, len });
        }

        let removed = self.bulk_entries.remove(index - 1);
        log::debug!("Order {}: bulk entry {} removed", self.order_id, removed);
        Ok(removed)
    }

    pub fn is_empty(&self) -> bool {
        self.discrete_items.is_empty() && self.bulk_entries.is_empty()
    }

    /// Price the order; overflow is a validation error rather than a panic
    pub fn compute_totals(&self, catalog: &PriceCatalog) -> OrderResult<Totals> {
        if self.is_empty() {
            return Ok(Totals::zero());
        }

        let mut subtotal = Decimal::ZERO;
        let mut discount = Decimal::ZERO;

        for line in &self.discrete_items {
            let unit_price = catalog.price_of(&LookupKey::ByItem(line.item.clone()))?;
            let quantity = Decimal::from(line.quantity);
            let mut line_total = unit_price.checked_mul(quantity).ok_or_else(overflow)?;
            if self.details.frozen {
                let reduction = self
                    .terms
                    .frozen_discount_per_unit
                    .checked_mul(quantity)
                    .ok_or_else(overflow)?;
                line_total = line_total.checked_sub(reduction).ok_or_else(overflow)?;
                discount = discount.checked_add(reduction).ok_or_else(overflow)?;
            }
            subtotal = subtotal.checked_add(line_total).ok_or_else(overflow)?;
        }

        if !self.bulk_entries.is_empty() {
            let bulk = catalog
                .bulk_category()
                .ok_or_else(|| OrderError::NotFound("bulk category".to_string()))?;
            let unit_price = catalog.price_of(&LookupKey::ByCategory(bulk.name.clone()))?;
            for entry in &self.bulk_entries {
                let line_total = unit_price.checked_mul(*entry).ok_or_else(overflow)?;
                subtotal = subtotal.checked_add(line_total).ok_or_else(overflow)?;
            }
        }

        let delivery = if self.is_delivery() {
            self.terms.delivery_charge
        } else {
            Decimal::ZERO
        };
        subtotal = subtotal.checked_add(delivery).ok_or_else(overflow)?;

        let tax = subtotal
            .checked_mul(self.terms.tax_rate)
            .ok_or_else(overflow)?;
        let grand_total = subtotal.checked_add(tax).ok_or_else(overflow)?;
        Ok(Totals {
            discount,
            delivery,
            subtotal,
            tax,
            grand_total,
        })
    }

    /// Finalise or cancel; further mutations are rejected
    pub fn close(&mut self) {
        if self.status == OrderStatus::Open {
            log::debug!("Order {} closed", self.order_id);
        }
        self.status = OrderStatus::Closed;
    }

    fn ensure_open(&self) -> OrderResult<()> {
        match self.status {
            OrderStatus::Open => Ok(()),
            OrderStatus::Closed => Err(OrderError::InvalidState(format!(
                "order {} is closed",
                self.order_id
            ))),
        }
    }
}

fn overflow() -> OrderError {
    OrderError::Validation("Order total is too large to price".to_string())
}

fn generate_order_id() -> String {
    rand::rng().random_range(1000..=10000).to_string()
}
