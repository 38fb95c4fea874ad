//! Pattern-based signal extraction over retrieved context.
//!
//! Two small declarative patterns — a labeled-product field and a
//! currency amount — plus a keyword detector for price-sensitive
//! queries. These are substring/regex matches, not NLP classification;
//! partial-word false positives are accepted behavior.
//!
//! All functions are pure and independent of any prompt template, so
//! they unit-test in isolation.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

/// Fixed bilingual keyword set covering price, quoting, discount,
/// minimum-order-quantity, and cost vocabulary. Stored lowercase; the
/// input is lowercased before matching.
const PRICE_KEYWORDS: &[&str] = &[
    "价格", "多少钱", "price", "报价", "quote", "$/pc", "贵", "便宜", "expensive", "cheap",
    "discount", "折扣", "moq", "批发", "wholesale", "成本",
];

fn product_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Labeled-product field: everything after the marker up to end of line.
    RE.get_or_init(|| Regex::new(r"产品:\s*([^\n]+)").expect("valid product pattern"))
}

fn price_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Currency amount, optionally with a per-unit suffix: $8.50/pc, $12.00
    RE.get_or_init(|| Regex::new(r"\$[0-9][0-9.]*(?:/pc)?").expect("valid price pattern"))
}

/// True iff `message` contains any price-related keyword,
/// case-insensitively.
pub fn detect_price_sensitive(message: &str) -> bool {
    let lower = message.to_lowercase();
    PRICE_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// All labeled-product mentions in scan order, trimmed, duplicates kept.
pub fn extract_products(context: &str) -> Vec<String> {
    product_pattern()
        .captures_iter(context)
        .map(|c| c[1].trim().to_string())
        .collect()
}

/// All currency amounts in scan order, duplicates kept.
pub fn extract_prices(context: &str) -> Vec<String> {
    price_pattern()
        .find_iter(context)
        .map(|m| m.as_str().to_string())
        .collect()
}

fn dedup_first_seen(values: Vec<String>, cap: usize) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for v in values {
        if seen.insert(v.clone()) {
            out.push(v);
            if out.len() == cap {
                break;
            }
        }
    }
    out
}

/// Build a two-line price-reference summary from retrieved context.
///
/// Products are deduplicated in first-seen order and capped at 3,
/// prices at 5. Returns `None` when either list is empty.
pub fn extract_price_reference(context: &str) -> Option<String> {
    let products = dedup_first_seen(extract_products(context), 3);
    let prices = dedup_first_seen(extract_prices(context), 5);

    if products.is_empty() || prices.is_empty() {
        return None;
    }

    Some(format!(
        "涉及产品: {}\n参考价格: {}",
        products.join(", "),
        prices.join(", ")
    ))
}

/// The most frequent labeled product in `context`, ties broken by first
/// occurrence in scan order. Falls back to the generic label when no
/// product is mentioned.
pub fn extract_dominant_product(context: &str) -> String {
    let products = extract_products(context);

    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (pos, p) in products.iter().enumerate() {
        let entry = counts.entry(p.as_str()).or_insert((0, pos));
        entry.0 += 1;
    }

    counts
        .into_iter()
        .max_by(|a, b| a.1 .0.cmp(&b.1 .0).then(b.1 .1.cmp(&a.1 .1)))
        .map(|(p, _)| p.to_string())
        .unwrap_or_else(|| "通用产品".to_string())
}
