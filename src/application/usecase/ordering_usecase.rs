// src/application/usecase/ordering_usecase.rs
// Ordering session: owns the current order from start to finish or cancel

use chrono::Utc;

use crate::application::dto::{ApplicationError, Receipt, RemovedLine};
use crate::domain::catalog::PriceCatalog;
use crate::domain::errors::OrderError;
use crate::domain::models::{CustomerDetails, Order, OrderStatus, OrderTerms, Totals};

/// Order lifecycle operations driven by the operator
pub trait OrderingUseCase {
    /// Begin a new order for a customer, replacing any previous one
    fn start_order(&mut self, details: CustomerDetails) -> Result<&mut Order, ApplicationError>;

    /// Remove a line by its number in the order listing
    fn remove_line(&mut self, index: usize) -> Result<RemovedLine, ApplicationError>;

    /// Price the current order
    fn totals(&self) -> Result<Totals, ApplicationError>;

    /// Close the current order and hand back its receipt
    fn finish(&mut self) -> Result<Receipt, ApplicationError>;

    /// Close and discard the current order
    fn cancel(&mut self) -> Result<(), ApplicationError>;
}

pub struct OrderSession {
    catalog: PriceCatalog,
    terms: OrderTerms,
    current: Option<Order>,
    last_order_id: Option<String>,
}

impl OrderSession {
    pub fn new(catalog: PriceCatalog, terms: OrderTerms) -> Self {
        Self {
            catalog,
            terms,
            current: None,
            last_order_id: None,
        }
    }

    pub fn catalog(&self) -> &PriceCatalog {
        &self.catalog
    }

    pub fn terms(&self) -> &OrderTerms {
        &self.terms
    }

    pub fn current(&self) -> Result<&Order, ApplicationError> {
        self.current.as_ref().ok_or(ApplicationError::NoActiveOrder)
    }

    pub fn current_mut(&mut self) -> Result<&mut Order, ApplicationError> {
        self.current.as_mut().ok_or(ApplicationError::NoActiveOrder)
    }

    fn next_order(&self) -> Order {
        loop {
            let order = Order::new(self.terms.clone());
            if self.last_order_id.as_deref() != Some(order.order_id()) {
                return order;
            }
        }
    }
}

impl OrderingUseCase for OrderSession {
    fn start_order(&mut self, details: CustomerDetails) -> Result<&mut Order, ApplicationError> {
        let mut order = self.next_order();
        order.set_details(details)?;

        log::info!("Order {} started", order.order_id());
        self.last_order_id = Some(order.order_id().to_string());
        Ok(self.current.insert(order))
    }

    fn remove_line(&mut self, index: usize) -> Result<RemovedLine, ApplicationError> {
        let order = self.current_mut()?;
        let discrete_count = order.discrete_items().len();
        let len = discrete_count + order.bulk_entries().len();
        if index < 1 || index > len {
            return Err(OrderError::IndexOutOfRange { index, len }.into());
        }

        if index <= discrete_count {
            let item = order.discrete_items()[index - 1].item.clone();
            let quantity = order.remove_discrete(&item)?;
            Ok(RemovedLine::Discrete { item, quantity })
        } else {
            let quantity = order.remove_bulk_at(index - discrete_count)?;
            Ok(RemovedLine::Bulk { quantity })
        }
    }

    fn totals(&self) -> Result<Totals, ApplicationError> {
        Ok(self.current()?.compute_totals(&self.catalog)?)
    }

    fn finish(&mut self) -> Result<Receipt, ApplicationError> {
        let order = self.current.as_mut().ok_or(ApplicationError::NoActiveOrder)?;
        if order.status() == OrderStatus::Closed {
            return Err(OrderError::InvalidState(format!(
                "order {} is already closed",
                order.order_id()
            ))
            .into());
        }
        if order.is_empty() {
            log::warn!("Order {} cannot be finished while empty", order.order_id());
            return Err(ApplicationError::EmptyOrder);
        }

        let totals = order.compute_totals(&self.catalog)?;
        order.close();

        let receipt = Receipt {
            order: order.clone(),
            totals,
            finished_at: Utc::now(),
        };
        log::info!(
            "Order {} finished, total inc tax {}",
            receipt.order.order_id(),
            receipt.totals.grand_total.round_dp(2)
        );
        match receipt.to_json() {
            Ok(json) => log::debug!("Receipt: {}", json),
            Err(e) => log::warn!("Could not serialize receipt: {}", e),
        }
        Ok(receipt)
    }

    fn cancel(&mut self) -> Result<(), ApplicationError> {
        let mut order = self.current.take().ok_or(ApplicationError::NoActiveOrder)?;
        order.close();
        log::info!("Order {} cancelled", order.order_id());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShopConfig;
    use crate::domain::catalog::Category;
    use crate::domain::models::Fulfilment;
    use rust_decimal_macros::dec;

    fn session() -> OrderSession {
        let catalog = PriceCatalog::new(vec![
            Category::fixed("Cheap", dec!(4.10), &["Shark", "Cod"]),
            Category::bulk("Chips", dec!(2.00), "Specify custom amount"),
        ])
        .unwrap();
        let terms = OrderTerms::from_config(&ShopConfig::default(), &catalog);
        OrderSession::new(catalog, terms)
    }

    fn customer() -> CustomerDetails {
        CustomerDetails {
            name: "Ana".to_string(),
            phone: "021 555 0101".to_string(),
            frozen: false,
            fulfilment: Fulfilment::Pickup,
        }
    }

    #[test]
    fn no_order_before_start() {
        let mut session = session();
        assert!(matches!(session.current(), Err(ApplicationError::NoActiveOrder)));
        assert!(matches!(session.finish(), Err(ApplicationError::NoActiveOrder)));
    }

    #[test]
    fn removes_lines_by_listing_number() {
        let mut session = session();
        let order = session.start_order(customer()).unwrap();
        order.add_discrete("Shark", 2).unwrap();
        order.add_discrete("Cod", 1).unwrap();
        order.add_bulk(dec!(1.5)).unwrap();
        order.add_bulk(dec!(2.5)).unwrap();

        assert_eq!(
            session.remove_line(4).unwrap(),
            RemovedLine::Bulk { quantity: dec!(2.5) }
        );
        assert_eq!(
            session.remove_line(1).unwrap(),
            RemovedLine::Discrete {
                item: "Shark".to_string(),
                quantity: 2
            }
        );
        // Cod is now line 1 and the remaining chips line 2
        assert_eq!(
            session.remove_line(2).unwrap(),
            RemovedLine::Bulk { quantity: dec!(1.5) }
        );
        assert!(matches!(
            session.remove_line(2),
            Err(ApplicationError::Order(OrderError::IndexOutOfRange { index: 2, len: 1 }))
        ));
    }

    #[test]
    fn empty_orders_cannot_finish() {
        let mut session = session();
        session.start_order(customer()).unwrap();
        assert!(matches!(session.finish(), Err(ApplicationError::EmptyOrder)));
        assert_eq!(session.current().unwrap().status(), OrderStatus::Open);
    }

    #[test]
    fn finish_closes_and_prices_the_order() {
        let mut session = session();
        session
            .start_order(customer())
            .unwrap()
            .add_discrete("Cod", 2)
            .unwrap();

        let receipt = session.finish().unwrap();
        assert_eq!(receipt.totals.subtotal, dec!(8.20));
        assert_eq!(receipt.order.status(), OrderStatus::Closed);
        assert!(matches!(
            session.current_mut().unwrap().add_discrete("Cod", 1),
            Err(OrderError::InvalidState(_))
        ));
        assert!(receipt.to_json().unwrap().contains("\"order_id\""));
        assert!(matches!(
            session.finish(),
            Err(ApplicationError::Order(OrderError::InvalidState(_)))
        ));
    }

    #[test]
    fn cancel_discards_and_next_order_gets_a_new_id() {
        let mut session = session();
        let first_id = session.start_order(customer()).unwrap().order_id().to_string();
        session.cancel().unwrap();
        assert!(matches!(session.current(), Err(ApplicationError::NoActiveOrder)));
        assert!(matches!(session.cancel(), Err(ApplicationError::NoActiveOrder)));

        let second = session.start_order(customer()).unwrap();
        assert_ne!(second.order_id(), first_id);
        assert!(second.is_empty());
    }

    #[test]
    fn start_rejects_invalid_details() {
        let mut session = session();
        let details = CustomerDetails {
            name: String::new(),
            ..customer()
        };
        assert!(matches!(
            session.start_order(details),
            Err(ApplicationError::Order(OrderError::Validation(_)))
        ));
        assert!(session.current().is_err());
    }
}
