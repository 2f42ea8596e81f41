//! Promotional widgets: the flash-sale popup and product sliders.
//!
//! Both are HTMX fragments loaded by the home page. The popup's countdown
//! ticks over SSE; sliders move with prev/next buttons and an auto-advance
//! poll that the script tags with whether the pointer is over the slider.

use std::convert::Infallible;
use std::time::Duration;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use chrono::Utc;
use futures_util::{Stream, StreamExt, stream};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use kivu_core::{Carousel, Countdown, Product};

use crate::filters;
use crate::live::countdown_frames;
use crate::models::session_keys;
use crate::state::AppState;

/// Tiles visible at once.
pub const SLIDER_VISIBLE: usize = 4;

/// Products fetched per slider.
const SLIDER_LIMIT: i64 = 12;

/// Auto-advance period, in seconds (used by the template's poll trigger).
pub const SLIDER_AUTO_ADVANCE_SECS: u64 = 5;

/// Where a slider gets its products.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SliderSource {
    /// Featured products from the product service.
    Featured,
    /// A category from the content endpoint.
    Category(String),
}

impl SliderSource {
    /// `featured` or a category slug.
    #[must_use]
    pub fn parse(source: &str) -> Self {
        match source {
            "featured" => Self::Featured,
            slug => Self::Category(slug.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Featured => "featured",
            Self::Category(slug) => slug,
        }
    }
}

/// Slider query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct SliderQuery {
    /// Index of the first visible tile before this request.
    #[serde(default)]
    pub offset: usize,
    /// Tiles to move (negative moves back).
    #[serde(default)]
    pub step: i64,
    /// Set by the auto-advance poll.
    #[serde(default)]
    pub auto: bool,
    /// Whether the pointer was over the slider when the poll fired.
    #[serde(default)]
    pub hovered: bool,
}

/// Product slider fragment (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "widgets/slider.html")]
pub struct SliderTemplate {
    pub source: String,
    pub title: String,
    pub index: usize,
    pub can_scroll: bool,
    pub auto_advance_secs: u64,
    pub products: Vec<Product>,
}

/// Flash-sale popup fragment (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "widgets/flash_sale.html")]
pub struct FlashSaleTemplate {
    pub countdown: Countdown,
    pub visible_secs: u64,
}

/// Dismiss form data.
#[derive(Debug, Deserialize)]
pub struct DismissForm {
    /// `closed` (the customer clicked close) or `timeout` (auto-hide).
    #[serde(default)]
    pub reason: Option<String>,
}

/// Nothing to show; leave the page as it is.
fn nothing() -> Response {
    (StatusCode::NO_CONTENT, [("hx-reswap", "none")]).into_response()
}

/// Products and heading for a slider source; empty on failure.
async fn slider_products(state: &AppState, source: &SliderSource) -> (String, Vec<Product>) {
    match source {
        SliderSource::Featured => {
            let products = state.api().featured_products().await.unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to fetch featured products");
                Vec::new()
            });
            ("Featured products".to_string(), products)
        }
        SliderSource::Category(slug) => {
            match state.content_api().category_products(slug, SLIDER_LIMIT).await {
                Ok(category) => (category.name, category.products),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to fetch category {slug}");
                    (slug.replace('-', " "), Vec::new())
                }
            }
        }
    }
}

/// Slider window (HTMX).
#[instrument(skip(state))]
pub async fn slider(
    State(state): State<AppState>,
    Path(source): Path<String>,
    Query(query): Query<SliderQuery>,
) -> impl IntoResponse {
    let source = SliderSource::parse(&source);
    let (title, products) = slider_products(&state, &source).await;

    let start = Carousel::new(products.len(), SLIDER_VISIBLE, query.offset);
    let carousel = if query.auto {
        start.auto_advance(query.hovered)
    } else {
        start.shift(query.step)
    };

    let visible: Vec<Product> = carousel
        .window()
        .into_iter()
        .filter_map(|i| products.get(i).cloned())
        .collect();

    SliderTemplate {
        source: source.as_str().to_string(),
        title,
        index: carousel.index(),
        can_scroll: carousel.can_scroll(),
        auto_advance_secs: SLIDER_AUTO_ADVANCE_SECS,
        products: visible,
    }
}

async fn is_dismissed(session: &Session) -> bool {
    session
        .get::<bool>(session_keys::FLASH_SALE_DISMISSED)
        .await
        .ok()
        .flatten()
        .unwrap_or(false)
}

/// Flash-sale popup (HTMX); empty when disabled, over, or dismissed.
#[instrument(skip(state, session))]
pub async fn flash_sale(State(state): State<AppState>, session: Session) -> Response {
    let flash_sale = &state.config().shop.flash_sale;
    if !flash_sale.enabled || is_dismissed(&session).await {
        return nothing();
    }

    let countdown = Countdown::until(state.flash_sale_ends_at(), Utc::now());
    if countdown.is_finished() {
        return nothing();
    }

    FlashSaleTemplate {
        countdown,
        visible_secs: flash_sale.visible_for.as_secs(),
    }
    .into_response()
}

/// Countdown frames as SSE: a `tick` per second, then `end`.
fn countdown_events(
    countdown: Countdown,
) -> impl Stream<Item = Result<Event, Infallible>> + Send + 'static {
    countdown_frames(countdown, Duration::from_secs(1))
        .map(|frame| Ok(Event::default().event("tick").data(frame.to_string())))
        .chain(stream::once(async {
            Ok(Event::default().event("end").data(""))
        }))
}

/// Flash-sale countdown stream.
#[instrument(skip(state))]
pub async fn countdown(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let countdown = Countdown::until(state.flash_sale_ends_at(), Utc::now());
    Sse::new(countdown_events(countdown)).keep_alive(KeepAlive::default())
}

/// Close the popup. Only an explicit close keeps it away for the session.
#[instrument(skip(session))]
pub async fn dismiss(session: Session, Form(form): Form<DismissForm>) -> impl IntoResponse {
    if form.reason.as_deref().unwrap_or("closed") == "closed"
        && let Err(e) = session.insert(session_keys::FLASH_SALE_DISMISSED, true).await
    {
        tracing::warn!(error = %e, "Failed to record flash-sale dismissal");
    }
    StatusCode::OK
}
