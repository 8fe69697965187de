//! Parsing helpers for the free-text values typed at the terminal.
//!
//! Everything here runs before any database work, so a rejected value never
//! leaves side effects behind.

use crate::error::CoreError;

fn invalid(field: &str, message: impl Into<String>) -> CoreError {
    CoreError::InvalidInput(field.to_string(), message.into())
}

/// Trims `raw` and rejects it when nothing is left.
pub fn required(field: &str, raw: &str) -> Result<String, CoreError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(invalid(field, "a value is required"));
    }
    Ok(value.to_string())
}

/// Trims `raw`, mapping an empty answer to `None`.
pub fn optional(raw: &str) -> Option<String> {
    let value = raw.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Parses a database identity typed by the user (member id, copy id, ...).
pub fn parse_id(field: &str, raw: &str) -> Result<i32, CoreError> {
    let id: i32 = raw
        .trim()
        .parse()
        .map_err(|_| invalid(field, format!("'{}' is not a valid id", raw.trim())))?;
    if id < 1 {
        return Err(invalid(field, "ids start at 1"));
    }
    Ok(id)
}

/// Parses the number of copies to create. Must be a positive integer.
pub fn parse_copy_count(raw: &str) -> Result<u32, CoreError> {
    match raw.trim().parse::<u32>() {
        Ok(count) if count >= 1 => Ok(count),
        _ => Err(invalid(
            "number of copies",
            "please enter a positive integer",
        )),
    }
}

/// Parses an optional four digit publication year.
pub fn parse_year(raw: &str) -> Result<Option<i32>, CoreError> {
    let Some(value) = optional(raw) else {
        return Ok(None);
    };
    match value.parse::<i32>() {
        Ok(year) if (1..=9999).contains(&year) => Ok(Some(year)),
        _ => Err(invalid("publication year", format!("'{value}' is not a YYYY year"))),
    }
}

/// Normalises an optional ISBN by dropping hyphens and spaces.
///
/// Accepts ISBN-13 (13 digits) and ISBN-10 (9 digits plus a digit or `X`).
pub fn normalize_isbn(raw: &str) -> Result<Option<String>, CoreError> {
    let isbn: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if isbn.is_empty() {
        return Ok(None);
    }

    let valid = match isbn.len() {
        13 => isbn.chars().all(|c| c.is_ascii_digit()),
        10 => {
            let (body, check) = isbn.split_at(9);
            body.chars().all(|c| c.is_ascii_digit())
                && check.chars().all(|c| c.is_ascii_digit() || c == 'X')
        }
        _ => false,
    };
    if !valid {
        return Err(invalid("ISBN", format!("'{}' is not an ISBN-10 or ISBN-13", raw.trim())));
    }
    Ok(Some(isbn))
}

/// Trims a person's name and collapses runs of inner whitespace.
///
/// Author lookup compares normalised names, so "Frank  Herbert " and
/// "Frank Herbert" resolve to the same author.
pub fn normalize_name(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
