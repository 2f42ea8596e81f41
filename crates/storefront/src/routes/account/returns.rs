//! Return requests (RMA).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use kivu_core::{ProductId, ProductReturn, ReturnRequest};

use super::{AccountTab, session_expired};
use crate::backend::BackendError;
use crate::filters;
use crate::middleware::auth::RequireAuth;
use crate::models::Toast;
use crate::state::AppState;
use crate::views::{Layout, PageContext};

/// Reasons offered in the return form.
pub const RETURN_REASONS: [&str; 5] = [
    "Arrived damaged",
    "Not as described",
    "Wrong item sent",
    "Stopped working",
    "No longer needed",
];

/// New return form data.
#[derive(Debug, Deserialize)]
pub struct ReturnForm {
    pub product_id: ProductId,
    #[serde(default = "one")]
    pub quantity: u32,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub description: Option<String>,
}

const fn one() -> u32 {
    1
}

/// Returns page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/returns.html")]
pub struct ReturnsTemplate {
    pub layout: Layout,
    pub tab: AccountTab,
    pub returns: Vec<ProductReturn>,
    pub reasons: &'static [&'static str],
}

/// List the customer's return requests and the new-return form.
#[instrument(skip(state, customer, page))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    page: PageContext,
) -> Response {
    let returns = match state.api().returns(customer.token()).await {
        Ok(returns) => returns,
        Err(BackendError::Unauthorized) => {
            return session_expired(page.session(), "/account/returns").await;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch returns");
            Toast::error("We couldn't load your returns. Please refresh in a moment.")
                .push(page.session())
                .await;
            Vec::new()
        }
    };

    ReturnsTemplate {
        layout: page.layout("Returns").await,
        tab: AccountTab::Returns,
        returns,
        reasons: &RETURN_REASONS,
    }
    .into_response()
}

/// Open a return request.
#[instrument(skip(state, customer, page, form))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    page: PageContext,
    Form(form): Form<ReturnForm>,
) -> Response {
    let request = match ReturnRequest::new(
        form.product_id,
        form.quantity,
        &form.reason,
        form.description.as_deref(),
    ) {
        Ok(request) => request,
        Err(e) => {
            Toast::error(capitalize(&e.to_string())).push(page.session()).await;
            return Redirect::to("/account/returns").into_response();
        }
    };

    match state.api().create_return(customer.token(), &request).await {
        Ok(created) => {
            tracing::info!(return_number = %created.return_number, "Return opened");
            Toast::success(format!(
                "Return {} opened. We'll be in touch about collection.",
                created.return_number
            ))
            .push(page.session())
            .await;
        }
        Err(BackendError::Unauthorized) => {
            return session_expired(page.session(), "/account/returns").await;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to open return");
            Toast::error(e.user_message()).push(page.session()).await;
        }
    }
    Redirect::to("/account/returns").into_response()
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
