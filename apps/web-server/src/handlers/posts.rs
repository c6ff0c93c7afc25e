//! Post pages: feeds, detail, create and edit.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use yatube_core::domain::{Author, Group, NewPost, Post, PostDetails, PostScope, User};
use yatube_core::error::RepoError;
use yatube_core::forms::{FormErrors, INVALID_GROUP_MESSAGE, PostForm};
use yatube_core::pagination::Page;
use yatube_shared::dto::PageQuery;

use super::fetch_page;
use crate::middleware::auth::{Identity, LoginRequired, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::render::{redirect, render};
use crate::state::AppState;

const FEED_TITLE: &str = "Latest updates on the site";

#[derive(Serialize)]
struct FeedContext<'a> {
    viewer: Option<&'a str>,
    title: &'static str,
    page_obj: Page<PostDetails>,
}

#[derive(Serialize)]
struct GroupContext<'a> {
    viewer: Option<&'a str>,
    group: Group,
    page_obj: Page<PostDetails>,
}

#[derive(Serialize)]
struct ProfileContext<'a> {
    viewer: Option<&'a str>,
    author: Author,
    post_count: u64,
    page_obj: Page<PostDetails>,
}

#[derive(Serialize)]
struct DetailContext<'a> {
    viewer: Option<&'a str>,
    label: String,
    post: PostDetails,
    author_post_count: u64,
    can_edit: bool,
}

#[derive(Serialize)]
struct PostFormContext<'a> {
    viewer: Option<&'a str>,
    form: &'a PostForm,
    errors: &'a FormErrors,
    groups: &'a [Group],
    selected_group: Option<i64>,
    is_edit: bool,
    post_id: Option<i64>,
}

fn render_post_form(
    viewer: &str,
    form: &PostForm,
    errors: &FormErrors,
    groups: &[Group],
    post_id: Option<i64>,
) -> AppResult<HttpResponse> {
    render(
        "posts/create_post.html",
        &PostFormContext {
            viewer: Some(viewer),
            form,
            errors,
            groups,
            selected_group: form.group.trim().parse().ok(),
            is_edit: post_id.is_some(),
            post_id,
        },
    )
}

/// The stored user behind a session.
///
/// A token whose user no longer exists is treated like no session at all.
async fn session_user(
    state: &AppState,
    identity: &Identity,
    next: &str,
) -> Result<User, actix_web::Error> {
    match state
        .users
        .find_by_id(identity.user_id)
        .await
        .map_err(AppError::from)?
    {
        Some(user) => Ok(user),
        None => {
            tracing::warn!(user_id = %identity.user_id, "Session refers to a missing user");
            Err(LoginRequired {
                next: next.to_string(),
                reason: yatube_core::ports::AuthError::InvalidCredentials,
            }
            .into())
        }
    }
}

/// A group chosen from the form vanished before the write.
fn stale_group(err: &RepoError, group_id: Option<i64>) -> Option<FormErrors> {
    match (err, group_id) {
        (RepoError::Constraint(_), Some(_)) => Some(FormErrors {
            group: vec![INVALID_GROUP_MESSAGE.to_string()],
            ..FormErrors::default()
        }),
        _ => None,
    }
}

async fn load_post(state: &AppState, post_id: i64) -> AppResult<Post> {
    state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {} not found", post_id)))
}

/// GET /
pub async fn index(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page_obj = fetch_page(&state, PostScope::All, query.page.as_deref()).await?;

    render(
        "posts/index.html",
        &FeedContext {
            viewer: viewer.username(),
            title: FEED_TITLE,
            page_obj,
        },
    )
}

/// GET /group/{slug}/
pub async fn group_posts(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    slug: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let group = state
        .groups
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Group {} not found", slug)))?;

    let page_obj = fetch_page(&state, PostScope::Group(group.id), query.page.as_deref()).await?;

    render(
        "posts/group_list.html",
        &GroupContext {
            viewer: viewer.username(),
            group,
            page_obj,
        },
    )
}

/// GET /profile/{username}/
pub async fn profile(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    username: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let author = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", username)))?;

    let page_obj = fetch_page(&state, PostScope::Author(author.id), query.page.as_deref()).await?;

    render(
        "posts/profile.html",
        &ProfileContext {
            viewer: viewer.username(),
            author: Author::from(&author),
            post_count: page_obj.count,
            page_obj,
        },
    )
}

/// GET /posts/{post_id}/
pub async fn post_detail(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    post_id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let post_id = post_id.into_inner();
    let details = state
        .posts
        .find_details(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {} not found", post_id)))?;

    let author_post_count = state
        .posts
        .count(PostScope::Author(details.author.id))
        .await?;
    let can_edit = viewer
        .user_id()
        .is_some_and(|user_id| details.post.is_owned_by(user_id));

    render(
        "posts/post_detail.html",
        &DetailContext {
            viewer: viewer.username(),
            label: details.post.label(),
            post: details,
            author_post_count,
            can_edit,
        },
    )
}

/// GET /create/
pub async fn post_create_form(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let groups = state.groups.list_all().await?;

    render_post_form(
        &identity.username,
        &PostForm::default(),
        &FormErrors::default(),
        &groups,
        None,
    )
}

/// POST /create/
pub async fn post_create(
    state: web::Data<AppState>,
    identity: Identity,
    form: web::Form<PostForm>,
) -> Result<HttpResponse, actix_web::Error> {
    let author = session_user(&state, &identity, "/create/").await?;
    let form = form.into_inner();
    let groups = state.groups.list_all().await.map_err(AppError::from)?;

    let valid = match form.validate(&groups) {
        Ok(valid) => valid,
        Err(errors) => {
            tracing::debug!(author = %author.username, ?errors, "Post form rejected");
            return Ok(render_post_form(&author.username, &form, &errors, &groups, None)?);
        }
    };

    let group_id = valid.group_id;
    let post = match state.posts.create(NewPost::new(author.id, valid)).await {
        Ok(post) => post,
        Err(e) => {
            let Some(errors) = stale_group(&e, group_id) else {
                return Err(AppError::from(e).into());
            };
            return Ok(render_post_form(&author.username, &form, &errors, &groups, None)?);
        }
    };

    tracing::info!(post_id = post.id, author = %author.username, "Post created");

    Ok(redirect(&format!("/profile/{}/", author.username)))
}

/// GET /posts/{post_id}/edit/
pub async fn post_edit_form(
    state: web::Data<AppState>,
    identity: Identity,
    post_id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let post = load_post(&state, post_id.into_inner()).await?;

    if !post.is_owned_by(identity.user_id) {
        return Ok(redirect(&format!("/posts/{}/", post.id)));
    }

    let groups = state.groups.list_all().await?;
    render_post_form(
        &identity.username,
        &PostForm::from_post(&post),
        &FormErrors::default(),
        &groups,
        Some(post.id),
    )
}

/// POST /posts/{post_id}/edit/
pub async fn post_edit(
    state: web::Data<AppState>,
    identity: Identity,
    post_id: web::Path<i64>,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let mut post = load_post(&state, post_id.into_inner()).await?;

    if !post.is_owned_by(identity.user_id) {
        tracing::warn!(
            post_id = post.id,
            user_id = %identity.user_id,
            "Edit attempted by someone other than the author"
        );
        return Ok(redirect(&format!("/posts/{}/", post.id)));
    }

    let form = form.into_inner();
    let groups = state.groups.list_all().await?;

    match form.validate(&groups) {
        Ok(valid) => {
            let post_id = post.id;
            let group_id = valid.group_id;
            post.apply_edit(valid);
            match state.posts.update(post).await {
                Ok(post) => {
                    tracing::info!(post_id = post.id, "Post updated");
                    Ok(redirect(&format!("/posts/{}/", post.id)))
                }
                Err(e) => match stale_group(&e, group_id) {
                    Some(errors) => render_post_form(
                        &identity.username,
                        &form,
                        &errors,
                        &groups,
                        Some(post_id),
                    ),
                    None => Err(e.into()),
                },
            }
        }
        Err(errors) => render_post_form(
            &identity.username,
            &form,
            &errors,
            &groups,
            Some(post.id),
        ),
    }
}
