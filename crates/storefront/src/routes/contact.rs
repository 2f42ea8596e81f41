//! Contact form route handlers.
//!
//! Messages are forwarded to the REST service's `POST /contact`; support
//! staff pick them up from there.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use kivu_core::Email;

use crate::backend::ContactMessage;
use crate::error::add_breadcrumb;
use crate::filters;
use crate::models::Toast;
use crate::state::AppState;
use crate::views::{Layout, PageContext};

/// Contact form data.
#[derive(Debug, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: String,
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl ContactForm {
    /// Check the required fields, returning the first problem as a
    /// customer-facing sentence.
    fn validate(&self) -> Result<ContactMessage, &'static str> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Please tell us your name.");
        }
        let email = Email::parse(&self.email).map_err(|_| "Please enter a valid email address.")?;
        let message = self.message.trim();
        if message.is_empty() {
            return Err("Please write a message.");
        }

        Ok(ContactMessage {
            name: name.to_string(),
            email: email.into_inner(),
            phone: non_empty(self.phone.as_deref()),
            subject: non_empty(self.subject.as_deref()),
            message: message.to_string(),
        })
    }
}

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub layout: Layout,
    pub name: String,
    pub email: String,
}

/// Display the contact form and the shop's contact details.
#[instrument(skip(page))]
pub async fn show(page: PageContext) -> impl IntoResponse {
    let (name, email) = page
        .customer()
        .map(|c| (c.name.clone(), c.email.as_str().to_string()))
        .unwrap_or_default();

    ContactTemplate {
        layout: page.layout("Contact us").await,
        name,
        email,
    }
}

/// Send a contact message.
#[instrument(skip(state, page, form))]
pub async fn submit(
    State(state): State<AppState>,
    page: PageContext,
    Form(form): Form<ContactForm>,
) -> Response {
    let message = match form.validate() {
        Ok(message) => message,
        Err(problem) => {
            Toast::error(problem).push(page.session()).await;
            return Redirect::to("/contact").into_response();
        }
    };

    match state.api().send_contact(&message).await {
        Ok(()) => {
            tracing::info!("Contact message sent");
            add_breadcrumb("contact", "Message sent", None);
            Toast::success("Thanks! We'll get back to you within one working day.")
                .push(page.session())
                .await;
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to send contact message");
            Toast::error("We couldn't send your message. Please try again or call us.")
                .push(page.session())
                .await;
        }
    }
    Redirect::to("/contact").into_response()
}
