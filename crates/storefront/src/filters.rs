//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Stock at or below which the "only N left" label is shown.
const LOW_STOCK_THRESHOLD: u32 = 5;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Returns the content hash for main.css, computed at build time.
///
/// Usage in templates: `{{ ""|css_hash }}`
#[askama::filter_fn]
pub fn css_hash(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(env!("CSS_HASH"))
}

/// Availability label for a stock count.
///
/// Usage in templates: `{{ product.stock|stock_label }}`
#[askama::filter_fn]
pub fn stock_label(stock: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(availability(&stock.to_string()))
}

fn availability(stock: &str) -> String {
    match stock.trim().parse::<u32>() {
        Ok(0) | Err(_) => "Out of stock".to_string(),
        Ok(n) if n <= LOW_STOCK_THRESHOLD => format!("Only {n} left"),
        Ok(_) => "In stock".to_string(),
    }
}
