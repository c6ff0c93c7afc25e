//! HTTP handlers and route configuration.

mod auth;
mod health;
mod posts;

#[cfg(test)]
mod tests;

use actix_web::web;
use yatube_core::domain::{PostDetails, PostScope};
use yatube_core::pagination::{Page, Paginator};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::NotFound(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::FormConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .route("/", web::get().to(posts::index))
    .route("/group/{slug}/", web::get().to(posts::group_posts))
    .route("/profile/{username}/", web::get().to(posts::profile))
    .route("/posts/{post_id}/", web::get().to(posts::post_detail))
    .service(
        web::resource("/create/")
            .route(web::get().to(posts::post_create_form))
            .route(web::post().to(posts::post_create)),
    )
    .service(
        web::resource("/posts/{post_id}/edit/")
            .route(web::get().to(posts::post_edit_form))
            .route(web::post().to(posts::post_edit)),
    )
    .service(
        web::scope("/auth")
            .service(
                web::resource("/login/")
                    .route(web::get().to(auth::login_form))
                    .route(web::post().to(auth::login)),
            )
            .service(
                web::resource("/signup/")
                    .route(web::get().to(auth::signup_form))
                    .route(web::post().to(auth::signup)),
            )
            .service(
                web::resource("/logout/")
                    .route(web::get().to(auth::logout))
                    .route(web::post().to(auth::logout)),
            ),
    )
    .route("/health/", web::get().to(health::health_check));
}

/// One feed page of posts in `scope`.
async fn fetch_page(
    state: &AppState,
    scope: PostScope,
    requested: Option<&str>,
) -> AppResult<Page<PostDetails>> {
    let total = state.posts.count(scope).await?;
    let window = Paginator::default().window(total, requested);
    let items = if window.limit == 0 {
        Vec::new()
    } else {
        state.posts.list(scope, window).await?
    };

    tracing::debug!(
        ?scope,
        page = window.number,
        num_pages = window.num_pages,
        count = total,
        "Feed page resolved"
    );

    Ok(Page::new(items, &window))
}
