//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Rating scale used by product cards.
const MAX_STARS: usize = 5;

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

/// Returns the content hash for app.js, computed at build time.
///
/// Usage in templates: `{{ ""|js_hash }}`
#[askama::filter_fn]
pub fn js_hash(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(env!("JS_HASH"))
}

/// Renders a whole-star rating, filled then empty.
///
/// Usage in templates: `{{ product.full_stars()|stars }}`
#[askama::filter_fn]
pub fn stars(full: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let full = full.to_string().parse::<usize>().unwrap_or(0).min(MAX_STARS);
    Ok(format!("{}{}", "★".repeat(full), "☆".repeat(MAX_STARS - full)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use askama::Template;

    use crate::filters;

    #[derive(Template)]
    #[template(source = "{{ rating|stars }}", ext = "txt")]
    struct Stars {
        rating: u8,
    }

    #[test]
    fn test_stars_fill_and_clamp() {
        assert_eq!(Stars { rating: 3 }.render().unwrap(), "★★★☆☆");
        assert_eq!(Stars { rating: 0 }.render().unwrap(), "☆☆☆☆☆");
        assert_eq!(Stars { rating: 9 }.render().unwrap(), "★★★★★");
    }
}
