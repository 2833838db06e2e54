// tests/console_session.rs
use std::io::Cursor;

use takeaway_order::adapter::Console;
use takeaway_order::application::usecase::OrderSession;
use takeaway_order::config::Config;
use takeaway_order::domain::{OrderStatus, OrderTerms};

fn run(script: &str) -> (String, Option<OrderStatus>) {
    colored::control::set_override(false);
    let config = Config::default();
    let catalog = config.menu.to_catalog().unwrap();
    let terms = OrderTerms::from_config(&config.shop, &catalog);

    let mut output = Vec::new();
    let mut console = Console::new(
        OrderSession::new(catalog, terms),
        Cursor::new(script.as_bytes().to_vec()),
        &mut output,
    );
    console.run().unwrap();
    let status = console.session().current().ok().map(|o| o.status());
    drop(console);

    (String::from_utf8(output).unwrap(), status)
}

#[test]
fn frozen_delivery_order_from_start_to_finish() {
    // customer, frozen, delivery, 2 Shark, 2.5 chips, finish, confirm, quit
    let script = "Ana\n021 555 0101\ny\ny\n1 Wharf Rd\n2\n1\n2\n13\n2.5\nback\n5\ny\nn\n";
    let (text, status) = run(script);

    assert!(text.contains("Ordering System Version:"));
    assert!(text.contains("Address: 1 Wharf Rd"));
    assert!(text.contains("Frozen: Yes"));
    assert!(text.contains("1) Shark 2"));
    assert!(text.contains("2) Chips 2.5"));
    assert!(text.contains("DELIVERY: $5.00"));
    assert!(text.contains("DISCOUNT: $2.10"));
    // 8.20 - 2.10 + 5.00 + 5.00
    assert!(text.contains("TOTAL: $16.10"));
    assert!(text.contains("TOTAL INC GST: $18.52"));
    assert!(text.contains("finalised at"));
    assert_eq!(status, Some(OrderStatus::Closed));
}

#[test]
fn starting_again_opens_a_fresh_order() {
    let script = "Ana\n021\nn\nn\n6\ny\nBo\n022\nn\nn\n4\n";
    let (text, status) = run(script);

    assert!(text.contains("Current order cancelled"));
    assert!(text.contains("Name: Bo"));
    assert!(text.contains("No Items"));
    assert_eq!(status, Some(OrderStatus::Open));
}

#[test]
fn menu_lists_every_entry() {
    let (text, _) = run("Ana\n021\nn\nn\n1\n");
    assert!(text.contains("1) Shark"));
    assert!(text.contains("12) Trevally"));
    assert!(text.contains("13) Specify custom amount"));
    assert!(text.contains("$7.20 each"));
}

#[test]
fn declining_confirmation_keeps_the_order_open() {
    let script = "Ana\n021\nn\nn\n2\n3\n1\nback\n5\nn\n";
    let (text, status) = run(script);
    assert!(text.contains("Is the listed order correct?"));
    assert!(!text.contains("finalised at"));
    assert_eq!(status, Some(OrderStatus::Open));
}
