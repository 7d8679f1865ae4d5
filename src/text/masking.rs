// src/text/masking.rs

use std::borrow::Cow;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref GUID: Regex = Regex::new(
        r"\b[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}\b"
    ).unwrap();
    static ref TIMESTAMP: Regex = Regex::new(
        r"\b\d{4}[-/]\d{2}[-/]\d{2}(?:[T ]\d{2}:\d{2}:\d{2}(?:[.,]\d+)?(?:Z|[+-]\d{2}:?\d{2})?)?|\b\d{1,2}:\d{2}:\d{2}(?:[.,]\d+)?"
    ).unwrap();
    static ref HEX: Regex = Regex::new(r"\b0[xX][0-9a-fA-F]+\b").unwrap();
    static ref NUMBER: Regex = Regex::new(r"\d+(?:\.\d+)?").unwrap();
}

pub const GUID_PLACEHOLDER: &str = "<guid>";
pub const TIME_PLACEHOLDER: &str = "<time>";
pub const HEX_PLACEHOLDER: &str = "<hex>";
pub const NUMBER_PLACEHOLDER: &str = "<num>";

/// Replaces every match of `pattern`, borrowing when nothing matched.
fn replace<'a>(text: Cow<'a, str>, pattern: &Regex, placeholder: &str) -> Cow<'a, str> {
    match text {
        Cow::Borrowed(s) => pattern.replace_all(s, placeholder),
        Cow::Owned(s) => {
            let replaced = match pattern.replace_all(&s, placeholder) {
                Cow::Borrowed(_) => None,
                Cow::Owned(replaced) => Some(replaced),
            };
            Cow::Owned(replaced.unwrap_or(s))
        },
    }
}

pub fn mask_guids(text: Cow<'_, str>) -> Cow<'_, str> {
    replace(text, &GUID, GUID_PLACEHOLDER)
}

pub fn mask_timestamps(text: Cow<'_, str>) -> Cow<'_, str> {
    replace(text, &TIMESTAMP, TIME_PLACEHOLDER)
}

pub fn mask_hex(text: Cow<'_, str>) -> Cow<'_, str> {
    replace(text, &HEX, HEX_PLACEHOLDER)
}

pub fn mask_numbers(text: Cow<'_, str>) -> Cow<'_, str> {
    replace(text, &NUMBER, NUMBER_PLACEHOLDER)
}
