//! Exact-match token classification
//!
//! Matching is exact equality after lowercasing; there is no fuzzy or
//! substring matching.

use super::Category;
use std::collections::BTreeSet;

/// Returns the category word equal to `token`, ignoring case
pub fn match_one<'a>(token: &str, category: &'a Category) -> Option<&'a str> {
    let token = token.to_lowercase();
    category
        .words()
        .iter()
        .find(|word| **word == token)
        .map(String::as_str)
}

/// Returns the match of the first token that matches the category
///
/// The result depends on token order.
pub fn match_ones<'a, S: AsRef<str>>(tokens: &[S], category: &'a Category) -> Option<&'a str> {
    tokens
        .iter()
        .find_map(|token| match_one(token.as_ref(), category))
}

/// Returns every category word matched by any token
pub fn match_alls<S: AsRef<str>>(tokens: &[S], category: &Category) -> BTreeSet<String> {
    tokens
        .iter()
        .filter_map(|token| match_one(token.as_ref(), category))
        .map(str::to_string)
        .collect()
}
