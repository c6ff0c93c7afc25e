//! Authentication handlers: signup, login and logout.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use yatube_core::domain::{User, validate_username};
use yatube_core::error::RepoError;
use yatube_shared::dto::{LoginForm, NextQuery, SignupForm};

use crate::middleware::auth::{OptionalIdentity, is_safe_next, removal_cookie, session_cookie};
use crate::middleware::error::AppResult;
use crate::render::{iri_to_uri, render};
use crate::state::AppState;

/// Shortest password accepted at signup.
const MIN_PASSWORD_LEN: usize = 8;

const DUPLICATE_USERNAME_MESSAGE: &str = "A user with that username already exists.";

const BAD_CREDENTIALS_MESSAGE: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

#[derive(Serialize)]
struct LoginContext<'a> {
    viewer: Option<&'a str>,
    username: &'a str,
    next: &'a str,
    error: Option<&'a str>,
}

#[derive(Serialize)]
struct SignupContext<'a> {
    viewer: Option<&'a str>,
    username: &'a str,
    errors: &'a [String],
}

fn render_login(
    viewer: Option<&str>,
    username: &str,
    next: &str,
    error: Option<&str>,
) -> AppResult<HttpResponse> {
    render(
        "users/login.html",
        &LoginContext {
            viewer,
            username,
            next,
            error,
        },
    )
}

/// Issue a session for `user` and redirect to `location`.
fn start_session(state: &AppState, user: &User, location: &str) -> AppResult<HttpResponse> {
    let token = state.tokens.generate_token(user.id, &user.username)?;
    let cookie = session_cookie(&state.session, token, state.tokens.expiration_seconds());

    Ok(HttpResponse::Found()
        .insert_header((actix_web::http::header::LOCATION, iri_to_uri(location)))
        .cookie(cookie)
        .finish())
}

fn signup_errors(form: &SignupForm) -> Vec<String> {
    let mut errors = Vec::new();

    if let Err(yatube_core::DomainError::Validation(msg)) =
        validate_username(form.username.trim())
    {
        errors.push(msg);
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        ));
    }
    if form.password != form.password_confirm {
        errors.push("The two password fields didn't match.".to_string());
    }

    errors
}

/// GET /auth/login/
pub async fn login_form(
    viewer: OptionalIdentity,
    query: web::Query<NextQuery>,
) -> AppResult<HttpResponse> {
    let next = query.next.as_deref().unwrap_or_default();
    render_login(viewer.username(), "", next, None)
}

/// POST /auth/login/
pub async fn login(
    state: web::Data<AppState>,
    body: web::Form<LoginForm>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let username = req.username.trim();

    let user = state.users.find_by_username(username).await?;

    let verified = match &user {
        Some(user) => state.passwords.verify(&req.password, &user.password_hash)?,
        None => false,
    };

    let Some(user) = user.filter(|_| verified) else {
        tracing::info!(%username, "Failed login attempt");
        return render_login(None, username, &req.next, Some(BAD_CREDENTIALS_MESSAGE));
    };

    let location = if is_safe_next(&req.next) {
        req.next.as_str()
    } else {
        "/"
    };

    tracing::info!(user_id = %user.id, "User logged in");
    start_session(&state, &user, location)
}

/// GET /auth/signup/
pub async fn signup_form(viewer: OptionalIdentity) -> AppResult<HttpResponse> {
    render(
        "users/signup.html",
        &SignupContext {
            viewer: viewer.username(),
            username: "",
            errors: &[],
        },
    )
}

/// POST /auth/signup/
pub async fn signup(
    state: web::Data<AppState>,
    body: web::Form<SignupForm>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let username = req.username.trim();

    let mut errors = signup_errors(&req);
    if errors.is_empty() && state.users.find_by_username(username).await?.is_some() {
        errors.push(DUPLICATE_USERNAME_MESSAGE.to_string());
    }

    if errors.is_empty() {
        let password_hash = state.passwords.hash(&req.password)?;

        match state
            .users
            .create(User::new(username.to_string(), password_hash))
            .await
        {
            Ok(user) => {
                tracing::info!(user_id = %user.id, username = %user.username, "User signed up");
                return start_session(&state, &user, "/");
            }
            // Lost a race with a concurrent signup for the same name.
            Err(RepoError::Constraint(_)) => {
                errors.push(DUPLICATE_USERNAME_MESSAGE.to_string());
            }
            Err(e) => return Err(e.into()),
        }
    }

    render(
        "users/signup.html",
        &SignupContext {
            viewer: None,
            username,
            errors: &errors,
        },
    )
}

/// GET|POST /auth/logout/
pub async fn logout(state: web::Data<AppState>, viewer: OptionalIdentity) -> HttpResponse {
    if let Some(user_id) = viewer.user_id() {
        tracing::info!(%user_id, "User logged out");
    }

    HttpResponse::Found()
        .insert_header((actix_web::http::header::LOCATION, "/"))
        .cookie(removal_cookie(&state.session))
        .finish()
}

