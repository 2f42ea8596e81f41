//! Authentication route handlers.
//!
//! The REST service owns credentials and issues the customer token; the
//! storefront only keeps the token in the session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use kivu_core::Email;

use crate::backend::{AuthSession, BackendError, Credentials, FieldErrors, Registration};
use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::auth::{clear_current_customer, set_current_customer};
use crate::models::{CurrentCustomer, Toast};
use crate::state::AppState;
use crate::views::{Layout, PageContext};

/// Shortest password accepted at registration.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Where to go after signing in. Only same-site paths are honoured.
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => "/account",
    }
}

// =============================================================================
// Forms and Templates
// =============================================================================

/// `?next=` on the login and register pages.
#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

/// Registration form data.
#[derive(Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub password: String,
    pub password_confirm: String,
    #[serde(default)]
    pub next: Option<String>,
}

impl RegisterForm {
    fn validate(&self) -> Result<Registration, FieldErrors> {
        let mut errors = FieldErrors::default();

        let name = self.name.trim();
        if name.is_empty() {
            errors.insert("name", "Name is required");
        }
        let email = match Email::parse(&self.email) {
            Ok(email) => Some(email),
            Err(e) => {
                errors.insert("email", e.to_string());
                None
            }
        };
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.insert(
                "password",
                format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
            );
        }
        if self.password != self.password_confirm {
            errors.insert("password_confirm", "Passwords do not match");
        }

        match email {
            Some(email) if errors.is_empty() => Ok(Registration {
                name: name.to_string(),
                email: email.into_inner(),
                phone: self
                    .phone
                    .as_deref()
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string),
                password: self.password.clone(),
            }),
            _ => Err(errors),
        }
    }
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub error: Option<String>,
    pub email: String,
    pub next: String,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub layout: Layout,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub errors: FieldErrors,
    pub next: String,
}

/// Remember the customer and point Sentry at them.
async fn sign_in(session: &Session, auth: AuthSession) -> Result<CurrentCustomer, Toast> {
    let customer = CurrentCustomer::from_user(auth.user, auth.token);
    if let Err(e) = set_current_customer(session, &customer).await {
        tracing::error!(error = %e, "Failed to store signed-in customer");
        return Err(Toast::error("We couldn't sign you in. Please try again."));
    }
    set_sentry_user(&customer.id, Some(customer.email.as_str()));
    add_breadcrumb("auth", "Signed in", None);
    Ok(customer)
}

/// Re-render the login form with an error.
async fn login_error(
    page: &PageContext,
    form: &LoginForm,
    next: &str,
    message: impl Into<String>,
) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        LoginTemplate {
            layout: page.layout("Sign in").await,
            error: Some(message.into()),
            email: form.email.clone(),
            next: next.to_string(),
        },
    )
        .into_response()
}

/// Re-render the registration form with field errors.
async fn register_errors(
    page: &PageContext,
    form: &RegisterForm,
    next: &str,
    errors: FieldErrors,
) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        RegisterTemplate {
            layout: page.layout("Create an account").await,
            name: form.name.clone(),
            email: form.email.clone(),
            phone: form.phone.clone().unwrap_or_default(),
            errors,
            next: next.to_string(),
        },
    )
        .into_response()
}

// =============================================================================
// Login
// =============================================================================

/// Display the login page.
#[instrument(skip(page))]
pub async fn login_page(page: PageContext, Query(query): Query<NextQuery>) -> Response {
    let next = safe_next(query.next.as_deref()).to_string();
    if page.customer().is_some() {
        return Redirect::to(&next).into_response();
    }
    LoginTemplate {
        layout: page.layout("Sign in").await,
        error: None,
        email: String::new(),
        next,
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip(state, page, form))]
pub async fn login(
    State(state): State<AppState>,
    page: PageContext,
    Form(form): Form<LoginForm>,
) -> Response {
    let next = safe_next(form.next.as_deref()).to_string();

    let Ok(email) = Email::parse(&form.email) else {
        return login_error(&page, &form, &next, "Please enter a valid email address.").await;
    };
    if form.password.is_empty() {
        return login_error(&page, &form, &next, "Please enter your password.").await;
    }

    let credentials = Credentials {
        email: email.into_inner(),
        password: form.password.clone(),
    };
    match state.api().login(&credentials).await {
        Ok(auth) => match sign_in(page.session(), auth).await {
            Ok(customer) => {
                Toast::success(format!("Welcome back, {}!", customer.first_name()))
                    .push(page.session())
                    .await;
                Redirect::to(&next).into_response()
            }
            Err(toast) => login_error(&page, &form, &next, toast.message).await,
        },
        Err(BackendError::Unauthorized | BackendError::Envelope(_)) => {
            tracing::info!("Login rejected");
            login_error(&page, &form, &next, "Incorrect email or password.").await
        }
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            login_error(&page, &form, &next, e.user_message()).await
        }
    }
}

// =============================================================================
// Registration
// =============================================================================

/// Display the registration page.
#[instrument(skip(page))]
pub async fn register_page(page: PageContext, Query(query): Query<NextQuery>) -> Response {
    let next = safe_next(query.next.as_deref()).to_string();
    if page.customer().is_some() {
        return Redirect::to(&next).into_response();
    }
    RegisterTemplate {
        layout: page.layout("Create an account").await,
        name: String::new(),
        email: String::new(),
        phone: String::new(),
        errors: FieldErrors::default(),
        next,
    }
    .into_response()
}

/// Handle registration form submission.
#[instrument(skip(state, page, form))]
pub async fn register(
    State(state): State<AppState>,
    page: PageContext,
    Form(form): Form<RegisterForm>,
) -> Response {
    let next = safe_next(form.next.as_deref()).to_string();

    let registration = match form.validate() {
        Ok(registration) => registration,
        Err(errors) => return register_errors(&page, &form, &next, errors).await,
    };

    match state.api().register(&registration).await {
        Ok(auth) => match sign_in(page.session(), auth).await {
            Ok(customer) => {
                tracing::info!(customer_id = %customer.id, "Customer registered");
                Toast::success(format!("Welcome to Kivu Imports, {}!", customer.first_name()))
                    .push(page.session())
                    .await;
                Redirect::to(&next).into_response()
            }
            Err(toast) => {
                toast.push(page.session()).await;
                register_errors(&page, &form, &next, FieldErrors::default()).await
            }
        },
        Err(BackendError::Validation(errors)) => register_errors(&page, &form, &next, errors).await,
        Err(e) => {
            tracing::warn!(error = %e, "Registration failed");
            Toast::error(e.user_message()).push(page.session()).await;
            register_errors(&page, &form, &next, FieldErrors::default()).await
        }
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Sign out. The cart survives.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_customer(&session).await {
        tracing::error!(error = %e, "Failed to clear customer on logout");
    }
    clear_sentry_user();
    Toast::info("You have been signed out.").push(&session).await;
    Redirect::to("/").into_response()
}
