/// Signup, login and logout
///
/// # Endpoints
///
/// - `GET|POST /signup` - Create an account and sign in
/// - `GET|POST /login` - Sign in
/// - `GET /logout` - Sign out
///
/// Form problems, duplicate usernames and bad credentials are rendered back
/// into the form page with a 200. Storage failures become a 500.

use crate::{
    app::AppState,
    error::ApiResult,
    middleware::session::{end_session, start_session},
    views,
};
use agriscan_shared::auth::credentials::{normalize_username, CredentialError};
use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use validator::{Validate, ValidationErrors};

const FIELDS_REQUIRED: &str = "All fields required";
const USERNAME_TAKEN: &str = "Username taken";
const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Signup form
#[derive(Debug, Deserialize, Validate)]
pub struct SignupForm {
    /// Username
    #[serde(default)]
    #[validate(length(min = 1, max = 64, message = "Username must be 1-64 characters"))]
    pub u: String,

    /// Password
    #[serde(default)]
    #[validate(length(min = 1, max = 256, message = "Password must be 1-256 characters"))]
    pub p: String,

    /// Optional phone number for weather alerts
    #[serde(default)]
    #[validate(length(max = 20, message = "Phone number must be at most 20 characters"))]
    pub phone: Option<String>,
}

/// Login form
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// Username
    #[serde(default)]
    pub u: String,

    /// Password
    #[serde(default)]
    pub p: String,
}

/// First validation message, in form field order
fn first_message(errors: &ValidationErrors) -> String {
    const ORDER: [&str; 3] = ["u", "p", "phone"];

    let mut messages: Vec<(usize, String)> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = field.to_string();
            let rank = ORDER.iter().position(|f| *f == field).unwrap_or(ORDER.len());
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| FIELDS_REQUIRED.to_string());
                (rank, message)
            })
        })
        .collect();

    messages.sort_by_key(|(rank, _)| *rank);
    messages
        .into_iter()
        .next()
        .map(|(_, message)| message)
        .unwrap_or_else(|| FIELDS_REQUIRED.to_string())
}

/// `GET /signup`
pub async fn signup_page() -> Html<String> {
    Html(views::signup(None))
}

/// `POST /signup`
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<SignupForm>,
) -> ApiResult<Response> {
    if normalize_username(&form.u).is_empty() || form.p.is_empty() {
        return Ok(Html(views::signup(Some(FIELDS_REQUIRED))).into_response());
    }

    if let Err(errors) = form.validate() {
        return Ok(Html(views::signup(Some(&first_message(&errors)))).into_response());
    }

    let phone = form
        .phone
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());

    match state.credentials.create(&form.u, &form.p, phone).await {
        Ok(user) => {
            let jar = start_session(&state, jar, &user.username)?;
            Ok((jar, Redirect::to("/dashboard")).into_response())
        }
        Err(CredentialError::DuplicateUsername(_)) => {
            Ok(Html(views::signup(Some(USERNAME_TAKEN))).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// `GET /login`
pub async fn login_page() -> Html<String> {
    Html(views::login(None))
}

/// `POST /login`
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> ApiResult<Response> {
    if normalize_username(&form.u).is_empty() || form.p.is_empty() {
        return Ok(Html(views::login(Some(INVALID_CREDENTIALS))).into_response());
    }

    match state.credentials.verify(&form.u, &form.p).await {
        Ok(user) => {
            tracing::info!(username = %user.username, "User logged in");
            let jar = start_session(&state, jar, &user.username)?;
            Ok((jar, Redirect::to("/dashboard")).into_response())
        }
        Err(e) if e.is_expected() => {
            Ok(Html(views::login(Some(INVALID_CREDENTIALS))).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// `GET /logout`
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (end_session(jar), Redirect::to("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(u: &str, p: &str, phone: Option<&str>) -> SignupForm {
        SignupForm {
            u: u.to_string(),
            p: p.to_string(),
            phone: phone.map(str::to_string),
        }
    }

    #[test]
    fn test_valid_signup_form() {
        assert!(form("Farmer1", "secret", Some("+254700000001")).validate().is_ok());
        assert!(form("Farmer1", "secret", None).validate().is_ok());
    }

    #[test]
    fn test_first_message_follows_field_order() {
        let long = "x".repeat(65);
        let errors = form(&long, "", Some(&"9".repeat(21))).validate().unwrap_err();

        assert_eq!(first_message(&errors), "Username must be 1-64 characters");
    }

    #[test]
    fn test_phone_length_message() {
        let errors = form("farmer1", "secret", Some(&"9".repeat(21)))
            .validate()
            .unwrap_err();

        assert_eq!(
            first_message(&errors),
            "Phone number must be at most 20 characters"
        );
    }
}
