// src/adapter/render.rs
// Box-drawn screens for the terminal

use colored::Colorize;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::application::dto::Receipt;
use crate::domain::catalog::{ItemsKind, PriceCatalog};
use crate::domain::models::{Order, Totals};

/// Inner width of every box, excluding the two side lines
pub const BOX_WIDTH: usize = 78;

const BOX_CTL: char = '┌';
const BOX_CTR: char = '┐';
const BOX_CBL: char = '└';
const BOX_CBR: char = '┘';
const BOX_SVL: char = '├';
const BOX_SVR: char = '┤';
const BOX_V: char = '│';
const BOX_H: char = '─';
const ARROW: char = '»';

const TITLE: &str = r#"
 ______            _     _            ______        _    ______              _
 |  ___|          | |   | |           |  ___|      | |   |  ___|            | |
 | |_ _ __ ___  __| | __| |_   _ ___  | |_ __ _ ___| |_  | |_ ___   ___   __| |
 |  _| '__/ _ \/ _` |/ _` | | | / __| |  _/ _` / __| __| |  _/ _ \ / _ \ / _` |
 | | | | |  __/ (_| | (_| | |_| \__ \ | || (_| \__ \ |_  | || (_) | (_) | (_| |
 \_| |_|  \___|\__,_|\__,_|\__, |___/ \_| \__,_|___/\__| \_| \___/ \___/ \__,_|
                            __/ |
                           |___/   Ordering System Version: "#;

/// Format a money amount as `$1,234.56`, rounding half away from zero
pub fn format_price(price: Decimal) -> String {
    let rounded = price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::new();
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}${}.{}", sign, grouped, cents)
}

pub fn error(text: &str) -> String {
    text.red().to_string()
}

pub fn good(text: &str) -> String {
    text.green().to_string()
}

pub fn banner(version: &str) -> String {
    format!("{}{}{}\n{}", splitter(), TITLE, version, splitter())
}

/// A prompt box; numbers and quoted text are highlighted
pub fn prompt(lines: &[String]) -> String {
    let mut output = format!("{}\n", BOX_CTL);
    for line in lines {
        output.push_str(&format!("{} {}\n", BOX_V, highlight(line)));
    }
    output.push_str(&format!(": {} ", ARROW));
    output
}

pub fn splitter() -> String {
    format!("{}{}{}\n", BOX_SVL, horizontal(), BOX_SVR)
}

fn top() -> String {
    format!("{}{}{}\n", BOX_CTL, horizontal(), BOX_CTR)
}

fn bottom() -> String {
    format!("{}{}{}", BOX_CBL, horizontal(), BOX_CBR)
}

fn horizontal() -> String {
    BOX_H.to_string().repeat(BOX_WIDTH)
}

/// Centered line; `styled` is what gets printed, `plain` what gets measured
fn title_styled(plain: &str, styled: &str) -> String {
    let len = plain.chars().count();
    let left = BOX_WIDTH.saturating_sub(len) / 2;
    let right = BOX_WIDTH.saturating_sub(len + left);
    format!("{}{}{}{}{}\n", BOX_V, " ".repeat(left), styled, " ".repeat(right), BOX_V)
}

fn title(text: &str) -> String {
    let text = fit(text, BOX_WIDTH);
    title_styled(&text, &text)
}

fn row(text: &str) -> String {
    let padded = fit(&format!(" {}", text), BOX_WIDTH);
    let len = padded.chars().count();
    format!(
        "{}{}{}{}\n",
        BOX_V,
        padded,
        " ".repeat(BOX_WIDTH.saturating_sub(len)),
        BOX_V
    )
}

/// Cut `text` to `width` characters, marking the cut with "..."
fn fit(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}

fn highlight(line: &str) -> String {
    let chars: Vec<char> = line.chars().collect();
    let mut output = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '"' {
            if let Some(end) = chars[i + 1..].iter().position(|&ch| ch == '"') {
                let quoted: String = chars[i..=i + 1 + end].iter().collect();
                output.push_str(&quoted.yellow().to_string());
                i += end + 2;
                continue;
            }
        }

        let starts_number = c.is_ascii_digit()
            || (c == '$' && chars.get(i + 1).map_or(false, |n| n.is_ascii_digit()));
        if starts_number {
            let start = i;
            i += 1;
            let mut seen_point = false;
            while i < chars.len() {
                let ch = chars[i];
                let next_is_digit = chars.get(i + 1).map_or(false, |n| n.is_ascii_digit());
                if ch.is_ascii_digit() || (ch == ',' && next_is_digit) {
                    i += 1;
                } else if ch == '.' && !seen_point && next_is_digit {
                    seen_point = true;
                    i += 1;
                } else {
                    break;
                }
            }
            let number: String = chars[start..i].iter().collect();
            output.push_str(&number.yellow().to_string());
            continue;
        }

        output.push(c);
        i += 1;
    }

    output
}

fn price_text(price: Decimal, format: Option<&str>) -> String {
    let price = format_price(price);
    match format {
        Some(format) => format.replacen("{}", &price, 1),
        None => price,
    }
}

/// The numbered menu, numbering matching `PriceCatalog::resolve_index`
pub fn menu(catalog: &PriceCatalog) -> String {
    let mut output = top();
    let mut index = 0;

    for (position, category) in catalog.categories().iter().enumerate() {
        if position > 0 {
            output.push_str(&splitter());
        }

        let price = price_text(category.unit_price, category.price_format.as_deref());
        output.push_str(&title(&category.name));
        output.push_str(&title_styled(&price, &price.yellow().to_string()));
        output.push_str(&splitter());

        match &category.kind {
            ItemsKind::Fixed(items) => {
                for item in items {
                    index += 1;
                    output.push_str(&row(&format!("{}) {}", index, item)));
                }
            }
            ItemsKind::Bulk { label } => {
                index += 1;
                output.push_str(&row(&format!("{}) {}", index, label)));
            }
        }
    }

    output.push_str(&bottom());
    output
}

/// The order listing with numbered lines and totals
pub fn order_list(order: &Order, catalog: &PriceCatalog, totals: &Totals) -> String {
    let details = order.details();
    let mut output = top();
    output.push_str(&title(&format!("Order # {}", order.order_id())));
    output.push_str(&splitter());

    output.push_str(&row(&format!("Name: {}", details.name)));
    output.push_str(&row(&format!("Phone: {}", details.phone)));
    if let Some(address) = details.address() {
        output.push_str(&row(&format!("Address: {}", address)));
    }
    if details.frozen {
        output.push_str(&row("Frozen: Yes"));
    }

    if order.is_empty() {
        output.push_str(&splitter());
        output.push_str(&title("No Items"));
        output.push_str(&bottom());
        return output;
    }

    let mut index = 0;
    if !order.discrete_items().is_empty() {
        output.push_str(&splitter());
        output.push_str(&title("Items (Quantity):"));
        output.push_str(&splitter());
        for line in order.discrete_items() {
            index += 1;
            output.push_str(&row(&format!("{}) {} {}", index, line.item, line.quantity)));
        }
    }

    if !order.bulk_entries().is_empty() {
        let bulk_name = catalog
            .bulk_category()
            .map(|c| c.name.as_str())
            .unwrap_or("Bulk");
        output.push_str(&splitter());
        output.push_str(&title(&format!("{} (Amount):", bulk_name)));
        output.push_str(&splitter());
        for amount in order.bulk_entries() {
            index += 1;
            output.push_str(&row(&format!("{}) {} {}", index, bulk_name, amount)));
        }
    }

    output.push_str(&splitter());
    if order.is_delivery() {
        output.push_str(&row(&format!("DELIVERY: {}", format_price(totals.delivery))));
    }
    output.push_str(&row(&format!("TOTAL: {}", format_price(totals.subtotal))));
    output.push_str(&row(&format!("DISCOUNT: {}", format_price(totals.discount))));
    output.push_str(&row(&format!("TOTAL GST: {}", format_price(totals.tax))));
    output.push_str(&row(&format!(
        "TOTAL INC GST: {}",
        format_price(totals.grand_total)
    )));
    output.push_str(&bottom());
    output
}

pub fn receipt(receipt: &Receipt, catalog: &PriceCatalog) -> String {
    format!(
        "{}\n{}",
        order_list(&receipt.order, catalog, &receipt.totals),
        good(&format!(
            "Order #{} finalised at {}",
            receipt.order.order_id(),
            receipt.finished_at.format("%Y-%m-%d %H:%M:%S UTC")
        ))
    )
}
