// src/domain/catalog.rs
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::fmt;

use crate::domain::errors::{OrderError, OrderResult};

/// How a category is sold
#[derive(Debug, Clone, PartialEq)]
pub enum ItemsKind {
    /// Individually counted items, listed in menu order
    Fixed(Vec<String>),
    /// A single free-size offering, e.g. scoops of chips
    Bulk { label: String },
}

/// A named pricing group on the menu
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub name: String,
    pub unit_price: Decimal,
    pub price_format: Option<String>,
    pub kind: ItemsKind,
    /// Cap on the quantity of each item in this category, when it differs
    /// from the shop-wide default
    pub max_per_item: Option<u32>,
}

impl Category {
    pub fn fixed(name: &str, unit_price: Decimal, items: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            unit_price,
            price_format: None,
            kind: ItemsKind::Fixed(items.iter().map(|s| s.to_string()).collect()),
            max_per_item: None,
        }
    }

    pub fn bulk(name: &str, unit_price: Decimal, label: &str) -> Self {
        Self {
            name: name.to_string(),
            unit_price,
            price_format: None,
            kind: ItemsKind::Bulk {
                label: label.to_string(),
            },
            max_per_item: None,
        }
    }

    pub fn with_price_format(mut self, format: &str) -> Self {
        self.price_format = Some(format.to_string());
        self
    }

    pub fn with_max_per_item(mut self, max: u32) -> Self {
        self.max_per_item = Some(max);
        self
    }

    /// Number of selectable menu entries this category contributes
    pub fn entry_count(&self) -> usize {
        match &self.kind {
            ItemsKind::Fixed(items) => items.len(),
            ItemsKind::Bulk { .. } => 1,
        }
    }

    pub fn is_bulk(&self) -> bool {
        matches!(self.kind, ItemsKind::Bulk { .. })
    }

    pub fn contains_item(&self, item: &str) -> bool {
        match &self.kind {
            ItemsKind::Fixed(items) => items.iter().any(|i| i == item),
            ItemsKind::Bulk { .. } => false,
        }
    }
}

/// Key used to resolve a price.
///
/// A bulk category is priced by its own name, a fixed item by the item name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LookupKey {
    ByItem(String),
    ByCategory(String),
}

impl LookupKey {
    pub fn name(&self) -> &str {
        match self {
            LookupKey::ByItem(name) | LookupKey::ByCategory(name) => name,
        }
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LookupKey::ByItem(name) => write!(f, "item \"{}\"", name),
            LookupKey::ByCategory(name) => write!(f, "category \"{}\"", name),
        }
    }
}

/// Immutable price list shared by every order
#[derive(Debug, Clone)]
pub struct PriceCatalog {
    categories: Vec<Category>,
}

impl PriceCatalog {
    /// Build a catalog, rejecting duplicate or colliding names
    pub fn new(categories: Vec<Category>) -> OrderResult<Self> {
        if categories.is_empty() {
            return Err(OrderError::Validation(
                "A catalog needs at least one category".to_string(),
            ));
        }

        let mut category_names = HashSet::new();
        for category in &categories {
            if category.name.trim().is_empty() {
                return Err(OrderError::Validation(
                    "Category names cannot be blank".to_string(),
                ));
            }
            if !category_names.insert(category.name.as_str()) {
                return Err(OrderError::Validation(format!(
                    "Duplicate category \"{}\"",
                    category.name
                )));
            }
            if category.unit_price.is_sign_negative() {
                return Err(OrderError::Validation(format!(
                    "Category \"{}\" has a negative price",
                    category.name
                )));
            }
        }

        if categories.iter().filter(|c| c.is_bulk()).count() > 1 {
            return Err(OrderError::Validation(
                "A catalog can have at most one bulk category".to_string(),
            ));
        }

        let mut item_names = HashSet::new();
        for category in &categories {
            if let ItemsKind::Fixed(items) = &category.kind {
                if items.is_empty() {
                    return Err(OrderError::Validation(format!(
                        "Category \"{}\" has no items",
                        category.name
                    )));
                }
                for item in items {
                    if category_names.contains(item.as_str()) {
                        return Err(OrderError::Validation(format!(
                            "Item \"{}\" collides with a category name",
                            item
                        )));
                    }
                    if !item_names.insert(item.as_str()) {
                        return Err(OrderError::Validation(format!(
                            "Item \"{}\" appears more than once",
                            item
                        )));
                    }
                }
            }
        }

        Ok(Self { categories })
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Unit price for an item or bulk category
    pub fn price_of(&self, key: &LookupKey) -> OrderResult<Decimal> {
        let found = match key {
            LookupKey::ByItem(item) => self.category_of(item),
            LookupKey::ByCategory(name) => self.categories.iter().find(|c| match &c.kind {
                ItemsKind::Bulk { label } => &c.name == name || label == name,
                ItemsKind::Fixed(_) => false,
            }),
        };

        found
            .map(|c| c.unit_price)
            .ok_or_else(|| OrderError::NotFound(key.to_string()))
    }

    /// Total number of selectable menu entries
    pub fn category_count(&self) -> usize {
        self.categories.iter().map(Category::entry_count).sum()
    }

    /// Map a 1-based menu number back to what it selects
    pub fn resolve_index(&self, index: usize) -> OrderResult<LookupKey> {
        let len = self.category_count();
        if index < 1 || index > len {
            return Err(OrderError::IndexOutOfRange { index, len });
        }

        let mut remaining = index - 1;
        for category in &self.categories {
            match &category.kind {
                ItemsKind::Fixed(items) => {
                    if remaining < items.len() {
                        return Ok(LookupKey::ByItem(items[remaining].clone()));
                    }
                    remaining -= items.len();
                }
                ItemsKind::Bulk { .. } => {
                    if remaining == 0 {
                        return Ok(LookupKey::ByCategory(category.name.clone()));
                    }
                    remaining -= 1;
                }
            }
        }

        Err(OrderError::IndexOutOfRange { index, len })
    }

    /// The fixed category an item belongs to
    pub fn category_of(&self, item: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.contains_item(item))
    }

    /// Per-order cap for an item, falling back to `default` when its category sets none
    pub fn max_per_item(&self, item: &str, default: u32) -> Option<u32> {
        self.category_of(item)
            .map(|c| c.max_per_item.unwrap_or(default))
    }

    /// The first bulk category on the menu
    pub fn bulk_category(&self) -> Option<&Category> {
        self.categories.iter().find(|c| c.is_bulk())
    }

    /// Every fixed item paired with its category
    pub fn fixed_items(&self) -> impl Iterator<Item = (&Category, &str)> {
        self.categories.iter().flat_map(|c| {
            let items: &[String] = match &c.kind {
                ItemsKind::Fixed(items) => items,
                ItemsKind::Bulk { .. } => &[],
            };
            items.iter().map(move |item| (c, item.as_str()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn catalog() -> PriceCatalog {
        PriceCatalog::new(vec![
            Category::fixed("Cheap", dec!(4.10), &["Shark", "Flounder"]),
            Category::fixed("Delux", dec!(7.20), &["Snapper"]).with_max_per_item(3),
            Category::bulk("Chips", dec!(2.00), "Specify custom amount"),
        ])
        .unwrap()
    }

    #[test]
    fn prices_items_and_bulk_categories() {
        let catalog = catalog();
        assert_eq!(
            catalog.price_of(&LookupKey::ByItem("Flounder".into())),
            Ok(dec!(4.10))
        );
        assert_eq!(
            catalog.price_of(&LookupKey::ByItem("Snapper".into())),
            Ok(dec!(7.20))
        );
        assert_eq!(
            catalog.price_of(&LookupKey::ByCategory("Chips".into())),
            Ok(dec!(2.00))
        );
    }

    #[test]
    fn lookup_kind_must_match() {
        let catalog = catalog();
        assert!(matches!(
            catalog.price_of(&LookupKey::ByItem("Chips".into())),
            Err(OrderError::NotFound(_))
        ));
        assert!(matches!(
            catalog.price_of(&LookupKey::ByCategory("Cheap".into())),
            Err(OrderError::NotFound(_))
        ));
        assert!(matches!(
            catalog.price_of(&LookupKey::ByItem("Whale".into())),
            Err(OrderError::NotFound(_))
        ));
    }

    #[test]
    fn counts_and_resolves_flattened_indices() {
        let catalog = catalog();
        assert_eq!(catalog.category_count(), 4);
        assert_eq!(catalog.resolve_index(1), Ok(LookupKey::ByItem("Shark".into())));
        assert_eq!(catalog.resolve_index(3), Ok(LookupKey::ByItem("Snapper".into())));
        assert_eq!(
            catalog.resolve_index(4),
            Ok(LookupKey::ByCategory("Chips".into()))
        );
        assert_eq!(
            catalog.resolve_index(0),
            Err(OrderError::IndexOutOfRange { index: 0, len: 4 })
        );
        assert_eq!(
            catalog.resolve_index(5),
            Err(OrderError::IndexOutOfRange { index: 5, len: 4 })
        );
    }

    #[test]
    fn rejects_duplicates_and_collisions() {
        let duplicate_item = PriceCatalog::new(vec![
            Category::fixed("Cheap", dec!(1), &["Cod"]),
            Category::fixed("Delux", dec!(2), &["Cod"]),
        ]);
        assert!(matches!(duplicate_item, Err(OrderError::Validation(_))));

        let duplicate_category = PriceCatalog::new(vec![
            Category::fixed("Cheap", dec!(1), &["Cod"]),
            Category::bulk("Cheap", dec!(2), "scoops"),
        ]);
        assert!(matches!(duplicate_category, Err(OrderError::Validation(_))));

        let collision = PriceCatalog::new(vec![
            Category::fixed("Cheap", dec!(1), &["Chips"]),
            Category::bulk("Chips", dec!(2), "scoops"),
        ]);
        assert!(matches!(collision, Err(OrderError::Validation(_))));

        assert!(PriceCatalog::new(Vec::new()).is_err());
    }

    #[test]
    fn rejects_a_second_bulk_category() {
        let two_bulk = PriceCatalog::new(vec![
            Category::fixed("Cheap", dec!(4.10), &["Shark"]),
            Category::bulk("Chips", dec!(2.00), "Specify custom amount"),
            Category::bulk("Wedges", dec!(5.00), "Specify custom amount"),
        ]);
        assert!(matches!(two_bulk, Err(OrderError::Validation(_))));
    }

    #[test]
    fn finds_item_categories() {
        let catalog = catalog();
        assert_eq!(catalog.category_of("Snapper").map(|c| c.name.as_str()), Some("Delux"));
        assert!(catalog.category_of("Chips").is_none());
        assert_eq!(catalog.bulk_category().map(|c| c.name.as_str()), Some("Chips"));
        assert_eq!(catalog.fixed_items().count(), 3);
    }

    #[test]
    fn item_caps_fall_back_to_the_default() {
        let catalog = catalog();
        assert_eq!(catalog.max_per_item("Shark", 7), Some(7));
        assert_eq!(catalog.max_per_item("Snapper", 7), Some(3));
        assert_eq!(catalog.max_per_item("Chips", 7), None);
    }
}
