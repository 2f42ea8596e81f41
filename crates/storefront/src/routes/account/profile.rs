//! Profile settings.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use kivu_core::{Email, User};

use super::{AccountTab, session_expired};
use crate::backend::{BackendError, FieldErrors, ProfileUpdate};
use crate::filters;
use crate::middleware::auth::{RequireAuth, set_current_customer};
use crate::models::{CurrentCustomer, Toast};
use crate::state::AppState;
use crate::views::{Layout, PageContext};

/// Profile form data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

impl ProfileForm {
    fn from_customer(customer: &CurrentCustomer) -> Self {
        Self {
            name: customer.name.clone(),
            email: customer.email.as_str().to_string(),
            phone: customer.phone.clone(),
        }
    }

    fn from_user(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.as_str().to_string(),
            phone: user.phone.clone(),
        }
    }

    #[must_use]
    pub fn phone_value(&self) -> &str {
        self.phone.as_deref().unwrap_or_default()
    }

    /// Check the form before it reaches the user service.
    fn validate(&self) -> Result<ProfileUpdate, FieldErrors> {
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

        match email {
            Some(email) if errors.is_empty() => Ok(ProfileUpdate {
                name: name.to_string(),
                email: email.into_inner(),
                phone: self
                    .phone
                    .as_deref()
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string),
            }),
            _ => Err(errors),
        }
    }
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/profile.html")]
pub struct ProfileTemplate {
    pub layout: Layout,
    pub tab: AccountTab,
    pub form: ProfileForm,
    pub avatar: Option<String>,
    pub errors: FieldErrors,
}

/// Display the profile form.
#[instrument(skip(state, customer, page))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    page: PageContext,
) -> Response {
    let (form, avatar) = match state.api().profile(customer.token()).await {
        Ok(user) => (ProfileForm::from_user(&user), user.avatar),
        Err(BackendError::Unauthorized) => {
            return session_expired(page.session(), "/account/profile").await;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch profile");
            (ProfileForm::from_customer(&customer), None)
        }
    };

    ProfileTemplate {
        layout: page.layout("Profile settings").await,
        tab: AccountTab::Profile,
        form,
        avatar,
        errors: FieldErrors::default(),
    }
    .into_response()
}

async fn render_errors(page: &PageContext, form: ProfileForm, errors: FieldErrors) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        ProfileTemplate {
            layout: page.layout("Profile settings").await,
            tab: AccountTab::Profile,
            form,
            avatar: None,
            errors,
        },
    )
        .into_response()
}

/// Save the profile.
#[instrument(skip(state, customer, page, form))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    page: PageContext,
    Form(form): Form<ProfileForm>,
) -> Response {
    let update = match form.validate() {
        Ok(update) => update,
        Err(errors) => return render_errors(&page, form, errors).await,
    };

    match state.api().update_profile(customer.token(), &update).await {
        Ok(user) => {
            let refreshed = CurrentCustomer::from_user(user, customer.access_token.clone());
            if let Err(e) = set_current_customer(page.session(), &refreshed).await {
                tracing::warn!(error = %e, "Failed to refresh session customer");
            }
            Toast::success("Profile updated").push(page.session()).await;
            Redirect::to("/account/profile").into_response()
        }
        Err(BackendError::Validation(errors)) => render_errors(&page, form, errors).await,
        Err(BackendError::Unauthorized) => session_expired(page.session(), "/account/profile").await,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to update profile");
            Toast::error(e.user_message()).push(page.session()).await;
            render_errors(&page, form, FieldErrors::default()).await
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::header::COOKIE;
    use tower::ServiceExt;
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::routes::tests::{body_text, get, post_form, signed_in_cookie, test_app_with_store};

    fn form(name: &str, email: &str) -> ProfileForm {
        ProfileForm {
            name: name.to_string(),
            email: email.to_string(),
            phone: Some(" ".to_string()),
        }
    }

    #[test]
    fn test_validate_collects_every_field_error() {
        let errors = form("  ", "nope").validate().unwrap_err();
        assert!(errors.has("name"));
        assert!(errors.has("email"));
    }

    #[test]
    fn test_validate_normalizes() {
        let update = form(" Amina Uwase ", "Amina@Example.rw").validate().unwrap();
        assert_eq!(update.name, "Amina Uwase");
        assert_eq!(update.phone, None);
    }

    #[tokio::test]
    async fn test_profile_falls_back_to_session_details() {
        let store = MemoryStore::default();
        let cookie = signed_in_cookie(&store).await;
        let mut request = get("/account/profile");
        request.headers_mut().insert(COOKIE, cookie.parse().unwrap());

        let response = test_app_with_store(store).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("amina@example.rw"));
    }

    #[tokio::test]
    async fn test_invalid_update_shows_field_errors() {
        let store = MemoryStore::default();
        let cookie = signed_in_cookie(&store).await;
        let mut request = post_form("/account/profile", "name=&email=amina%40example.rw");
        request.headers_mut().insert(COOKIE, cookie.parse().unwrap());

        let response = test_app_with_store(store).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(response).await.contains("Name is required"));
    }
}
