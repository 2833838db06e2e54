// src/application/dto/parser.rs
// Parsers for operator input

use rust_decimal::Decimal;
use std::str::FromStr;

use super::ApplicationError;

/// Words accepted as "yes"
pub const BOOLEAN_YES: [&str; 5] = ["y", "yes", "t", "true", "1"];
/// Words accepted as "no"
pub const BOOLEAN_NO: [&str; 5] = ["n", "no", "f", "false", "0"];

/// A menu answer: either one of the offered keywords or a number
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    Keyword(String),
    Index(usize),
}

/// Any non-blank text, trimmed
pub fn parse_text(input: &str) -> Result<String, ApplicationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ApplicationError::Parse("You must provide something!".to_string()));
    }
    Ok(trimmed.to_string())
}

pub fn parse_yes_no(input: &str) -> Result<bool, ApplicationError> {
    let value = parse_text(input)?.to_lowercase();
    if BOOLEAN_YES.contains(&value.as_str()) {
        Ok(true)
    } else if BOOLEAN_NO.contains(&value.as_str()) {
        Ok(false)
    } else {
        Err(ApplicationError::Parse("You must pick yes or no!".to_string()))
    }
}

/// A number within `[min, max]`
pub fn parse_number_in_range<T>(input: &str, min: T, max: T) -> Result<T, ApplicationError>
where
    T: FromStr + PartialOrd + std::fmt::Display + Copy,
{
    let raw = parse_text(input)?;
    let value: T = raw.parse().map_err(|_| {
        ApplicationError::Parse(format!("Provided input \"{}\" is not a valid number", raw))
    })?;

    if value < min {
        return Err(ApplicationError::Parse(format!(
            "Number cannot be less than {} you picked {}",
            min, value
        )));
    }
    if value > max {
        return Err(ApplicationError::Parse(format!(
            "Number cannot be greater than {} you picked {}",
            max, value
        )));
    }
    Ok(value)
}

/// A decimal amount; range checks are left to the order
pub fn parse_decimal(input: &str) -> Result<Decimal, ApplicationError> {
    let raw = parse_text(input)?;
    Decimal::from_str(&raw).map_err(|_| {
        ApplicationError::Parse(format!("Provided input \"{}\" is not a valid number", raw))
    })
}

/// One of `keywords` (case-insensitive) or an index in `[1, max]`
pub fn parse_choice(input: &str, keywords: &[&str], max: usize) -> Result<Choice, ApplicationError> {
    let raw = parse_text(input)?;
    let lowered = raw.to_lowercase();
    if let Some(keyword) = keywords.iter().find(|k| **k == lowered) {
        return Ok(Choice::Keyword(keyword.to_string()));
    }
    parse_number_in_range(&raw, 1, max).map(Choice::Index)
}
