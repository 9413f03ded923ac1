//! Free-text search over products and batches
//!
//! Matching ignores all whitespace and letter case on both sides, so
//! `"ab 12"` finds `"AB12-20260215-001"`.

use std::ops::Range;

use crate::entities::{BatchWithProduct, Product};

/// Lowercased non-whitespace chars, each tagged with its byte range in the source
fn normalize(text: &str) -> Vec<(char, Range<usize>)> {
    text.char_indices()
        .filter(|(_, c)| !c.is_whitespace())
        .flat_map(|(i, c)| {
            let range = i..i + c.len_utf8();
            c.to_lowercase().map(move |lc| (lc, range.clone()))
        })
        .collect()
}

fn normalize_query(query: &str) -> Vec<char> {
    query
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Whether `text` contains `query`, ignoring whitespace and case
///
/// A blank query matches everything.
pub fn matches(text: &str, query: &str) -> bool {
    let needle = normalize_query(query);
    needle.is_empty() || find_in(&normalize(text), &needle).is_some()
}

/// Byte range of the first match of `query` in the original `text`
///
/// The range covers the matched characters including any whitespace
/// between them. Returns `None` for a blank query or no match.
pub fn find_match_span(text: &str, query: &str) -> Option<Range<usize>> {
    let needle = normalize_query(query);
    if needle.is_empty() {
        return None;
    }
    let hay = normalize(text);
    let start = find_in(&hay, &needle)?;
    let first = &hay[start].1;
    let last = &hay[start + needle.len() - 1].1;
    Some(first.start..last.end)
}

fn find_in(hay: &[(char, Range<usize>)], needle: &[char]) -> Option<usize> {
    if needle.len() > hay.len() {
        return None;
    }
    (0..=hay.len() - needle.len()).find(|&i| {
        hay[i..i + needle.len()]
            .iter()
            .zip(needle)
            .all(|((c, _), n)| c == n)
    })
}

/// Product search: part number, type code, or description
pub fn product_matches(product: &Product, query: &str) -> bool {
    matches(&product.part_number, query)
        || matches(product.product_type.as_str(), query)
        || product
            .description
            .as_deref()
            .is_some_and(|d| matches(d, query))
}

/// Batch search: batch code or the product's part number
pub fn batch_matches(batch: &BatchWithProduct, query: &str) -> bool {
    matches(&batch.batch.batch_code, query)
        || batch
            .part_number
            .as_deref()
            .is_some_and(|pn| matches(pn, query))
}

/// Filter products by a search query, keeping input order
pub fn filter_products<'a>(products: &'a [Product], query: &str) -> Vec<&'a Product> {
    products
        .iter()
        .filter(|p| product_matches(p, query))
        .collect()
}

/// Filter batches by a search query, keeping input order
pub fn filter_batches<'a>(
    batches: &'a [BatchWithProduct],
    query: &str,
) -> Vec<&'a BatchWithProduct> {
    batches
        .iter()
        .filter(|b| batch_matches(b, query))
        .collect()
}
