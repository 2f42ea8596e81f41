//! Search results and the search bar's suggestion dropdown.
//!
//! The browser sends `/search/suggest` on every keystroke with the page's
//! search token (`sid`). Each request waits out the debounce window and only
//! the newest one per token reaches the backend; superseded requests answer
//! `204` with `HX-Reswap: none` so nothing is swapped.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use kivu_core::{Product, RecentSearches};

use crate::filters;
use crate::models::session_keys;
use crate::state::AppState;
use crate::views::{Layout, PageContext};

/// Shorter queries show recent searches instead of suggestions.
pub const MIN_QUERY_CHARS: usize = 2;

/// Most suggestions shown in the dropdown.
pub const MAX_SUGGESTIONS: usize = 8;

/// Results on the full search page.
const MAX_RESULTS: usize = 48;

/// Query parameters for the suggestion dropdown.
#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    #[serde(default)]
    pub q: String,
    /// Search token minted with the page.
    pub sid: String,
}

/// Query parameters for the results page.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Search results page template.
#[derive(Template, WebTemplate)]
#[template(path = "search/results.html")]
pub struct SearchResultsTemplate {
    pub layout: Layout,
    pub query: String,
    pub products: Vec<Product>,
}

/// Suggestion dropdown fragment (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/search_suggestions.html")]
pub struct SuggestionsTemplate {
    pub query: String,
    pub suggestions: Vec<Product>,
}

/// Recent searches dropdown fragment (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/recent_searches.html")]
pub struct RecentSearchesTemplate {
    pub recent: Vec<String>,
}

async fn load_recent(session: &Session) -> RecentSearches {
    session
        .get::<RecentSearches>(session_keys::RECENT_SEARCHES)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

async fn store_recent(session: &Session, recent: &RecentSearches) {
    if let Err(e) = session.insert(session_keys::RECENT_SEARCHES, recent).await {
        tracing::warn!(error = %e, "Failed to store recent searches");
    }
}

/// Whether a query is long enough to fetch suggestions for.
fn is_searchable(query: &str) -> bool {
    query.trim().chars().count() >= MIN_QUERY_CHARS
}

/// Response for a request a newer keystroke replaced.
fn superseded() -> Response {
    (StatusCode::NO_CONTENT, [("hx-reswap", "none")]).into_response()
}

/// Suggestion dropdown (HTMX).
#[instrument(skip(state, session), fields(q = %query.q))]
pub async fn suggest(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<SuggestQuery>,
) -> Response {
    let q = query.q.trim();
    if !is_searchable(q) {
        // A shorter input still replaces whatever was pending.
        state.debouncer().supersede(&query.sid).await;
        let recent = load_recent(&session).await;
        return RecentSearchesTemplate {
            recent: recent.entries().to_vec(),
        }
        .into_response();
    }

    if !state.debouncer().settle(&query.sid).await {
        return superseded();
    }

    let suggestions = match state.api().product_suggestions(q, MAX_SUGGESTIONS).await {
        Ok(mut products) => {
            products.truncate(MAX_SUGGESTIONS);
            products
        }
        Err(e) if e.is_timeout() => {
            tracing::warn!(error = %e, "Suggestion fetch timed out; is the product service slow?");
            Vec::new()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Suggestion fetch failed");
            Vec::new()
        }
    };

    SuggestionsTemplate {
        query: q.to_string(),
        suggestions,
    }
    .into_response()
}

/// Full search results page; records the query in recent searches.
#[instrument(skip(state, page), fields(q = %query.q))]
pub async fn results(
    State(state): State<AppState>,
    page: PageContext,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    let q = query.q.trim().to_string();

    let products = if q.is_empty() {
        Vec::new()
    } else {
        let mut recent = load_recent(page.session()).await;
        recent.record(&q);
        store_recent(page.session(), &recent).await;

        state
            .api()
            .search_products(&q, MAX_RESULTS)
            .await
            .unwrap_or_else(|e| {
                tracing::error!(error = %e, "Search failed");
                Vec::new()
            })
    };

    let title = if q.is_empty() {
        "Search".to_string()
    } else {
        format!("Results for \"{q}\"")
    };

    SearchResultsTemplate {
        layout: page.layout(title).await,
        query: q,
        products,
    }
}

/// Forget recent searches (HTMX); returns the now-empty dropdown.
#[instrument(skip(session))]
pub async fn clear_recent(session: Session) -> impl IntoResponse {
    let mut recent = load_recent(&session).await;
    recent.clear();
    store_recent(&session, &recent).await;
    RecentSearchesTemplate { recent: Vec::new() }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::header::COOKIE;
    use tower::ServiceExt;

    use super::*;
    use crate::routes::tests::{body_text, get, post_form, session_cookie, test_app};

    #[test]
    fn test_is_searchable() {
        assert!(!is_searchable(""));
        assert!(!is_searchable(" a "));
        assert!(is_searchable("tv"));
        assert!(is_searchable("é4"));
    }

    #[tokio::test]
    async fn test_short_query_shows_recent_searches_without_waiting() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(get("/search?q=brake%20pads"))
            .await
            .unwrap();
        let cookie = session_cookie(&response).unwrap();

        let mut request = get("/search/suggest?q=b&sid=abc");
        request.headers_mut().insert(COOKIE, cookie.parse().unwrap());
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("Recent searches"));
        assert!(body.contains("brake pads"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_keystroke_supersedes_pending_request() {
        let app = test_app();

        let (first, second) = tokio::join!(
            app.clone().oneshot(get("/search/suggest?q=ph&sid=tab-1")),
            app.clone().oneshot(get("/search/suggest?q=pho&sid=tab-1")),
        );
        let first = first.unwrap();
        assert_eq!(first.status(), StatusCode::NO_CONTENT);
        assert_eq!(first.headers()["hx-reswap"], "none");

        // The newest request fetches; the backend is down so the list is empty.
        let second = second.unwrap();
        assert_eq!(second.status(), StatusCode::OK);
        assert!(body_text(second).await.contains("No matches"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shortened_query_cancels_pending_fetch() {
        let app = test_app();

        let (longer, shorter) = tokio::join!(
            app.clone().oneshot(get("/search/suggest?q=ph&sid=tab-9")),
            app.clone().oneshot(get("/search/suggest?q=p&sid=tab-9")),
        );
        let longer = longer.unwrap();
        assert_eq!(longer.status(), StatusCode::NO_CONTENT);
        assert_eq!(longer.headers()["hx-reswap"], "none");

        let shorter = shorter.unwrap();
        assert_eq!(shorter.status(), StatusCode::OK);
        assert!(!body_text(shorter).await.contains("No matches"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_tokens_do_not_cancel_each_other() {
        let app = test_app();
        let (a, b) = tokio::join!(
            app.clone().oneshot(get("/search/suggest?q=tv&sid=tab-a")),
            app.clone().oneshot(get("/search/suggest?q=tv&sid=tab-b")),
        );
        assert_eq!(a.unwrap().status(), StatusCode::OK);
        assert_eq!(b.unwrap().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_clear_recent_empties_dropdown() {
        let response = test_app()
            .oneshot(post_form("/search/recent/clear", ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(!body_text(response).await.contains("Recent searches"));
    }
}
