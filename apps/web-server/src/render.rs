//! HTML rendering - Tera templates compiled into the binary.

use std::sync::LazyLock;

use actix_web::{HttpResponse, http::StatusCode, http::header};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::Serialize;
use tera::{Context, Tera};

use crate::middleware::error::{AppError, AppResult};

/// Bytes escaped when an IRI becomes a `Location` value. Non-ASCII is always
/// escaped; URI delimiters and existing `%` escapes pass through.
const IRI_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

static TEMPLATES: LazyLock<tera::Result<Tera>> = LazyLock::new(load_templates);

const SOURCES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    (
        "includes/macros.html",
        include_str!("../templates/includes/macros.html"),
    ),
    ("posts/index.html", include_str!("../templates/posts/index.html")),
    (
        "posts/group_list.html",
        include_str!("../templates/posts/group_list.html"),
    ),
    (
        "posts/profile.html",
        include_str!("../templates/posts/profile.html"),
    ),
    (
        "posts/post_detail.html",
        include_str!("../templates/posts/post_detail.html"),
    ),
    (
        "posts/create_post.html",
        include_str!("../templates/posts/create_post.html"),
    ),
    ("users/login.html", include_str!("../templates/users/login.html")),
    ("users/signup.html", include_str!("../templates/users/signup.html")),
    ("core/error.html", include_str!("../templates/core/error.html")),
];

fn load_templates() -> tera::Result<Tera> {
    let mut tera = Tera::default();
    tera.add_raw_templates(SOURCES.iter().copied())?;
    Ok(tera)
}

/// Render a template against a serializable context.
pub fn render_to_string<C: Serialize>(template: &str, context: &C) -> AppResult<String> {
    let tera = TEMPLATES
        .as_ref()
        .map_err(|e| AppError::Internal(format!("template set failed to load: {e}")))?;
    let context = Context::from_serialize(context)
        .map_err(|e| AppError::Internal(format!("bad context for {template}: {e}")))?;

    tera.render(template, &context)
        .map_err(|e| AppError::Internal(format!("rendering {template} failed: {e}")))
}

/// Render a template into a `200 OK` HTML response.
pub fn render<C: Serialize>(template: &str, context: &C) -> AppResult<HttpResponse> {
    render_with_status(StatusCode::OK, template, context)
}

pub fn render_with_status<C: Serialize>(
    status: StatusCode,
    template: &str,
    context: &C,
) -> AppResult<HttpResponse> {
    let body = render_to_string(template, context)?;
    Ok(HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(body))
}

/// ASCII-only form of a same-site IRI, e.g. `/profile/Иван/`.
pub fn iri_to_uri(iri: &str) -> String {
    utf8_percent_encode(iri, IRI_ENCODE_SET).to_string()
}

/// `302 Found` pointing at `location`.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, iri_to_uri(location)))
        .finish()
}
