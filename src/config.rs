// src/config.rs
use crate::domain::catalog::{Category, ItemsKind, PriceCatalog};
use crate::domain::errors::{AppError, AppResult};
use clap::Parser;
use dotenv::dotenv;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// JSON configuration file; defaults plus environment variables when absent
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write the effective configuration to this path and exit
    #[arg(long)]
    pub write_config: Option<PathBuf>,

    /// Override the configured log level
    #[arg(long)]
    pub log_level: Option<String>,
}

/// Ordering system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Order limits and pricing rules
    pub shop: ShopConfig,

    /// Categories and prices shown on the menu
    pub menu: MenuConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Order limits and pricing rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopConfig {
    /// Default maximum of each fixed item per order
    pub max_per_item: u32,

    /// Maximum number of bulk purchases per order
    pub max_bulk_entries: usize,

    /// Largest single bulk purchase (e.g. scoops of chips)
    pub max_bulk_unit_size: Decimal,

    /// Discount per discrete item on frozen orders
    pub frozen_discount_per_unit: Decimal,

    /// Tax rate applied to the subtotal (0.15 = 15%)
    pub tax_rate: Decimal,

    /// Flat delivery charge
    pub delivery_charge: Decimal,
}

/// Menu configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuConfig {
    pub categories: Vec<CategoryConfig>,
}

/// A menu category as written in the config file.
///
/// Exactly one of `items` and `text` must be present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub name: String,

    pub price: Decimal,

    /// Display format, `{}` is replaced by the price
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_format: Option<String>,

    /// Fixed items sold in this category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<String>>,

    /// Menu text for a bulk category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Per-item cap overriding `shop.max_per_item`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_per_item: Option<u32>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "info", "debug", "warn", "error")
    pub level: String,

    /// Log to file
    pub to_file: bool,

    /// Log file path
    pub file_path: Option<String>,
}

impl Config {
    /// Load configuration from a file when given, otherwise from the environment
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::from_env()?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Default configuration overlaid with environment variables
    pub fn from_env() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let mut config = Config::default();
        let shop = &mut config.shop;

        if let Some(value) = env_parse::<u32>("MAX_PER_ITEM")? {
            shop.max_per_item = value;
        }
        if let Some(value) = env_parse::<usize>("MAX_BULK_ENTRIES")? {
            shop.max_bulk_entries = value;
        }
        if let Some(value) = env_parse::<Decimal>("MAX_BULK_UNIT_SIZE")? {
            shop.max_bulk_unit_size = value;
        }
        if let Some(value) = env_parse::<Decimal>("FROZEN_DISCOUNT")? {
            shop.frozen_discount_per_unit = value;
        }
        if let Some(value) = env_parse::<Decimal>("TAX_RATE")? {
            shop.tax_rate = value;
        }
        if let Some(value) = env_parse::<Decimal>("DELIVERY_CHARGE")? {
            shop.delivery_charge = value;
        }

        let logging = &mut config.logging;
        if let Ok(level) = env::var("LOG_LEVEL") {
            logging.level = level;
        }
        if let Some(value) = env_parse::<bool>("LOG_TO_FILE")? {
            logging.to_file = value;
        }
        if let Ok(path) = env::var("LOG_FILE_PATH") {
            logging.file_path = Some(path);
        }

        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let mut file = File::open(path).map_err(|e| {
            AppError::Config(format!("Failed to open config file: {}", e))
        })?;

        let mut contents = String::new();
        file.read_to_string(&mut contents).map_err(|e| {
            AppError::Config(format!("Failed to read config file: {}", e))
        })?;

        let config: Config = serde_json::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file: {}", e))
        })?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> AppResult<()> {
        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            AppError::Config(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, contents).map_err(|e| {
            AppError::Config(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Reject limits that would make every order impossible
    pub fn validate(&self) -> AppResult<()> {
        let shop = &self.shop;
        if shop.max_per_item == 0 {
            return Err(AppError::Config("max_per_item must be at least 1".to_string()));
        }
        if shop.max_bulk_entries == 0 {
            return Err(AppError::Config(
                "max_bulk_entries must be at least 1".to_string(),
            ));
        }
        if shop.max_bulk_unit_size <= Decimal::ZERO {
            return Err(AppError::Config(
                "max_bulk_unit_size must be positive".to_string(),
            ));
        }
        for (name, value) in [
            ("frozen_discount_per_unit", shop.frozen_discount_per_unit),
            ("tax_rate", shop.tax_rate),
            ("delivery_charge", shop.delivery_charge),
        ] {
            if value.is_sign_negative() {
                return Err(AppError::Config(format!("{} cannot be negative", name)));
            }
        }
        if self.menu.categories.iter().any(|c| c.max_per_item == Some(0)) {
            return Err(AppError::Config(
                "Category max_per_item must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Initialize logging based on configuration
    pub fn init_logging(&self) -> AppResult<()> {
        let mut builder = env_logger::Builder::new();

        // Set log level
        let log_level = match self.logging.level.to_lowercase().as_str() {
            "trace" => log::LevelFilter::Trace,
            "debug" => log::LevelFilter::Debug,
            "info" => log::LevelFilter::Info,
            "warn" => log::LevelFilter::Warn,
            "error" => log::LevelFilter::Error,
            "off" => log::LevelFilter::Off,
            _ => log::LevelFilter::Warn,
        };

        builder.filter_level(log_level);

        // Configure output
        if self.logging.to_file {
            if let Some(file_path) = &self.logging.file_path {
                let file = File::create(file_path).map_err(|e| {
                    AppError::Config(format!("Failed to create log file: {}", e))
                })?;

                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
        }

        builder.try_init().map_err(|e| {
            AppError::Config(format!("Failed to initialize logging: {}", e))
        })?;

        Ok(())
    }
}

impl MenuConfig {
    /// Resolve the menu into a validated price catalog
    pub fn to_catalog(&self) -> AppResult<PriceCatalog> {
        let categories = self
            .categories
            .iter()
            .map(CategoryConfig::to_category)
            .collect::<AppResult<Vec<_>>>()?;

        PriceCatalog::new(categories)
            .map_err(|e| AppError::Config(format!("Invalid menu: {}", e)))
    }
}

impl CategoryConfig {
    fn to_category(&self) -> AppResult<Category> {
        let kind = match (&self.items, &self.text) {
            (Some(items), None) => ItemsKind::Fixed(items.clone()),
            (None, Some(text)) => ItemsKind::Bulk {
                label: text.clone(),
            },
            (Some(_), Some(_)) => {
                return Err(AppError::Config(format!(
                    "Category \"{}\" cannot have both items and text",
                    self.name
                )))
            }
            (None, None) => {
                return Err(AppError::Config(format!(
                    "Category \"{}\" needs either items or text",
                    self.name
                )))
            }
        };

        Ok(Category {
            name: self.name.clone(),
            unit_price: self.price,
            price_format: self.price_format.clone(),
            kind,
            max_per_item: self.max_per_item,
        })
    }
}

fn env_parse<T: FromStr>(key: &str) -> AppResult<Option<T>> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AppError::Config(format!("Invalid value for {}: {}", key, raw))),
        Err(_) => Ok(None),
    }
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            max_per_item: 7,
            max_bulk_entries: 5,
            max_bulk_unit_size: dec!(10),
            frozen_discount_per_unit: dec!(1.05),
            tax_rate: dec!(0.15),
            delivery_charge: dec!(5),
        }
    }
}

impl Default for MenuConfig {
    fn default() -> Self {
        let fixed = |name: &str, price: Decimal, items: &[&str]| CategoryConfig {
            name: name.to_string(),
            price,
            price_format: Some("{} each".to_string()),
            items: Some(items.iter().map(|s| s.to_string()).collect()),
            text: None,
            max_per_item: None,
        };

        Self {
            categories: vec![
                fixed(
                    "Cheap",
                    dec!(4.10),
                    &["Shark", "Flounder", "Cod", "Gurnet", "Blue Moki", "Arrow Squid"],
                ),
                fixed(
                    "Delux",
                    dec!(7.20),
                    &["Snapper", "Pink Salmon", "Tuna", "Smoked Marlin", "Kingfish", "Trevally"],
                ),
                CategoryConfig {
                    name: "Chips".to_string(),
                    price: dec!(2.00),
                    price_format: Some("{} per scoop".to_string()),
                    items: None,
                    text: Some("Specify custom amount".to_string()),
                    max_per_item: None,
                },
            ],
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shop: ShopConfig::default(),
            menu: MenuConfig::default(),
            logging: LoggingConfig {
                level: "warn".to_string(),
                to_file: false,
                file_path: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::LookupKey;

    #[test]
    fn default_menu_builds_a_catalog() {
        let catalog = Config::default().menu.to_catalog().unwrap();
        assert_eq!(catalog.category_count(), 13);
        assert_eq!(
            catalog.price_of(&LookupKey::ByItem("Trevally".into())).unwrap(),
            dec!(7.20)
        );
        assert_eq!(
            catalog.resolve_index(13).unwrap(),
            LookupKey::ByCategory("Chips".into())
        );
    }

    #[test]
    fn category_needs_exactly_one_of_items_or_text() {
        let mut menu = MenuConfig::default();
        menu.categories[2].items = Some(vec!["Fries".to_string()]);
        assert!(matches!(menu.to_catalog(), Err(AppError::Config(_))));

        menu.categories[2].items = None;
        menu.categories[2].text = None;
        assert!(matches!(menu.to_catalog(), Err(AppError::Config(_))));
    }

    #[test]
    fn parses_a_config_file() {
        let json = r#"{
            "shop": {
                "max_per_item": 3,
                "max_bulk_entries": 2,
                "max_bulk_unit_size": "4.5",
                "frozen_discount_per_unit": "0.50",
                "tax_rate": "0.1",
                "delivery_charge": "2"
            },
            "menu": { "categories": [
                { "name": "Fish", "price": "3.00", "items": ["Hoki"], "max_per_item": 9 },
                { "name": "Chips", "price": "1.50", "text": "Scoops" }
            ] },
            "logging": { "level": "debug", "to_file": false, "file_path": null }
        }"#;

        let path = std::env::temp_dir().join(format!("takeaway-config-{}.json", std::process::id()));
        std::fs::write(&path, json).unwrap();
        let config = Config::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.shop.max_per_item, 3);
        assert_eq!(config.shop.max_bulk_unit_size, dec!(4.5));
        assert_eq!(config.menu.categories[0].max_per_item, Some(9));
        assert_eq!(config.logging.level, "debug");

        let catalog = config.menu.to_catalog().unwrap();
        assert_eq!(catalog.category_count(), 2);
    }

    #[test]
    fn round_trips_through_a_file() {
        let path = std::env::temp_dir().join(format!("takeaway-roundtrip-{}.json", std::process::id()));
        let config = Config::default();
        config.to_file(&path).unwrap();
        let loaded = Config::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }

    #[test]
    fn rejects_unusable_limits() {
        let mut config = Config::default();
        config.shop.max_bulk_entries = 0;
        assert!(matches!(config.validate(), Err(AppError::Config(_))));

        let mut config = Config::default();
        config.shop.tax_rate = dec!(-0.1);
        assert!(matches!(config.validate(), Err(AppError::Config(_))));

        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn second_bulk_category_is_a_config_error() {
        let mut menu = MenuConfig::default();
        menu.categories.push(CategoryConfig {
            name: "Wedges".to_string(),
            price: dec!(5.00),
            price_format: None,
            items: None,
            text: Some("Specify custom amount".to_string()),
            max_per_item: None,
        });
        assert!(matches!(menu.to_catalog(), Err(AppError::Config(_))));
    }

    #[test]
    fn env_values_parse_or_fail_as_config_errors() {
        std::env::set_var("TAKEAWAY_TEST_TAX_BAD", "abc");
        assert!(matches!(
            env_parse::<Decimal>("TAKEAWAY_TEST_TAX_BAD"),
            Err(AppError::Config(_))
        ));

        std::env::set_var("TAKEAWAY_TEST_TAX_GOOD", " 0.125 ");
        assert_eq!(
            env_parse::<Decimal>("TAKEAWAY_TEST_TAX_GOOD").unwrap(),
            Some(dec!(0.125))
        );

        std::env::set_var("TAKEAWAY_TEST_TO_FILE", "true");
        assert_eq!(env_parse::<bool>("TAKEAWAY_TEST_TO_FILE").unwrap(), Some(true));

        std::env::remove_var("TAKEAWAY_TEST_UNSET");
        assert_eq!(env_parse::<u32>("TAKEAWAY_TEST_UNSET").unwrap(), None);
    }

    #[test]
    fn from_env_overlays_defaults() {
        std::env::set_var("MAX_BULK_ENTRIES", "3");
        let config = Config::from_env();
        std::env::remove_var("MAX_BULK_ENTRIES");

        let config = config.unwrap();
        assert_eq!(config.shop.max_bulk_entries, 3);
        assert_eq!(config.menu, MenuConfig::default());
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let result = Config::from_file("/nonexistent/takeaway.json");
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
