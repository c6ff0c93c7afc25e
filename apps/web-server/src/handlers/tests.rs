use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use async_trait::async_trait;
use chrono::{Duration, Utc};

use yatube_core::domain::{Group, NewGroup, NewPost, Post, PostScope, User};
use yatube_core::error::RepoError;
use yatube_core::ports::{BaseRepository, GroupRepository};
use yatube_core::forms::{EMPTY_TEXT_MESSAGE, INVALID_GROUP_MESSAGE};
use yatube_infra::{Argon2PasswordService, JwtConfig, JwtTokenService};

use super::configure_routes;
use crate::config::{SESSION_COOKIE, SessionConfig};
use crate::state::AppState;

const PASSWORD: &str = "correct-horse";

fn test_state() -> AppState {
    let tokens = Arc::new(JwtTokenService::new(JwtConfig {
        secret: "test-secret".to_string(),
        expiration_hours: 1,
        issuer: "yatube".to_string(),
    }));
    let passwords = Arc::new(Argon2PasswordService::with_params(8, 1, 1).unwrap());
    AppState::in_memory(tokens, passwords, SessionConfig::default())
}

macro_rules! test_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .configure(configure_routes),
        )
        .await
    };
}

async fn create_user(state: &AppState, username: &str) -> User {
    let hash = state.passwords.hash(PASSWORD).unwrap();
    state
        .users
        .create(User::new(username.to_string(), hash))
        .await
        .unwrap()
}

async fn create_group(state: &AppState, slug: &str) -> Group {
    state
        .groups
        .create(NewGroup::new("Test group", slug, "Test description").unwrap())
        .await
        .unwrap()
}

async fn create_post(state: &AppState, author: &User, text: &str, group_id: Option<i64>) -> Post {
    state
        .posts
        .create(NewPost {
            text: text.to_string(),
            pub_date: Utc::now(),
            author_id: author.id,
            group_id,
        })
        .await
        .unwrap()
}

fn session_for(state: &AppState, user: &User) -> Cookie<'static> {
    let token = state.tokens.generate_token(user.id, &user.username).unwrap();
    Cookie::new(SESSION_COOKIE, token)
}

fn location<B>(resp: &ServiceResponse<B>) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .expect("redirect should carry a Location header")
        .to_str()
        .unwrap()
}

async fn body_text(resp: ServiceResponse) -> String {
    String::from_utf8(test::read_body(resp).await.to_vec()).unwrap()
}

async fn post_count(state: &AppState) -> u64 {
    state.posts.count(PostScope::All).await.unwrap()
}

#[actix_web::test]
async fn test_index_lists_newest_first() {
    let state = test_state();
    let author = create_user(&state, "auth").await;
    create_post(&state, &author, "First post", None).await;
    create_post(&state, &author, "Second post", None).await;
    let app = test_app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_text(resp).await;
    let first = body.find("First post").unwrap();
    let second = body.find("Second post").unwrap();
    assert!(second < first);
    assert!(body.contains("Log in"));
}

#[actix_web::test]
async fn test_eleven_posts_paginate_ten_and_one() {
    let state = test_state();
    let author = create_user(&state, "auth").await;
    let group = create_group(&state, "test-slug").await;
    for i in 0..11 {
        create_post(&state, &author, &format!("Post number {i}"), Some(group.id)).await;
    }
    let app = test_app!(state);

    for uri in ["/", "/group/test-slug/", "/profile/auth/"] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
        assert_eq!(body_text(resp).await.matches("<article>").count(), 10, "{uri}");

        let uri = format!("{uri}?page=2");
        let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
        assert_eq!(body_text(resp).await.matches("<article>").count(), 1, "{uri}");
    }
}

#[actix_web::test]
async fn test_bad_page_numbers_fall_back() {
    let state = test_state();
    let author = create_user(&state, "auth").await;
    for i in 0..11 {
        create_post(&state, &author, &format!("Post number {i}"), None).await;
    }
    let app = test_app!(state);

    let resp =
        test::call_service(&app, test::TestRequest::get().uri("/?page=abc").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await.matches("<article>").count(), 10);

    let resp =
        test::call_service(&app, test::TestRequest::get().uri("/?page=99").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert_eq!(body.matches("<article>").count(), 1);
    assert!(body.contains("Page 2 of 2"));
}

#[actix_web::test]
async fn test_repeated_page_parameter_is_bad_request() {
    let state = test_state();
    let app = test_app!(state);

    let req = test::TestRequest::get().uri("/?page=1&page=2").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let content_type = resp.headers().get(header::CONTENT_TYPE).unwrap().to_str().unwrap();
    assert!(content_type.starts_with("text/html"));
    assert!(body_text(resp).await.contains("400 Bad Request"));
}

#[actix_web::test]
async fn test_empty_group_renders_empty_page() {
    let state = test_state();
    create_group(&state, "empty").await;
    let app = test_app!(state);

    let resp =
        test::call_service(&app, test::TestRequest::get().uri("/group/empty/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_text(resp).await;
    assert_eq!(body.matches("<article>").count(), 0);
    assert!(body.contains("This group has no posts yet."));
}

#[actix_web::test]
async fn test_group_page_lists_only_its_posts() {
    let state = test_state();
    let author = create_user(&state, "auth").await;
    let group = create_group(&state, "test-slug").await;
    create_post(&state, &author, "In the group", Some(group.id)).await;
    create_post(&state, &author, "Outside the group", None).await;
    let app = test_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/group/test-slug/").to_request(),
    )
    .await;
    let body = body_text(resp).await;
    assert!(body.contains("In the group"));
    assert!(!body.contains("Outside the group"));
}

#[actix_web::test]
async fn test_unknown_group_and_profile_are_404() {
    let state = test_state();
    let app = test_app!(state);

    for uri in ["/group/missing/", "/profile/nobody/"] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[actix_web::test]
async fn test_profile_shows_post_count() {
    let state = test_state();
    let author = create_user(&state, "auth").await;
    let other = create_user(&state, "other").await;
    create_post(&state, &author, "Mine", None).await;
    create_post(&state, &author, "Also mine", None).await;
    create_post(&state, &other, "Not mine", None).await;
    let app = test_app!(state);

    let resp =
        test::call_service(&app, test::TestRequest::get().uri("/profile/auth/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_text(resp).await;
    assert!(body.contains("Total posts: 2"));
    assert!(!body.contains("Not mine"));
}

#[actix_web::test]
async fn test_post_detail() {
    let state = test_state();
    let author = create_user(&state, "auth").await;
    let reader = create_user(&state, "reader").await;
    let group = create_group(&state, "test-slug").await;
    let post = create_post(&state, &author, "Detailed post", Some(group.id)).await;
    let app = test_app!(state);
    let uri = format!("/posts/{}/", post.id);
    let edit_link = format!("/posts/{}/edit/", post.id);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&uri)
            .cookie(session_for(&state, &author))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("Detailed post"));
    assert!(body.contains("Posts by this author: 1"));
    assert!(body.contains("/group/test-slug/"));
    assert!(body.contains(&edit_link));

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&uri)
            .cookie(session_for(&state, &reader))
            .to_request(),
    )
    .await;
    assert!(!body_text(resp).await.contains(&edit_link));
}

#[actix_web::test]
async fn test_missing_or_malformed_post_id_is_404() {
    let state = test_state();
    let app = test_app!(state);

    for uri in ["/posts/999/", "/posts/abc/"] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
        assert!(body_text(resp).await.contains("404 Not Found"));
    }
}

#[actix_web::test]
async fn test_anonymous_create_redirects_to_login() {
    let state = test_state();
    let app = test_app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/create/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/auth/login/?next=/create/");

    let req = test::TestRequest::post()
        .uri("/create/")
        .set_form([("text", "Hello"), ("group", "")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/auth/login/?next=/create/");
    assert_eq!(post_count(&state).await, 0);
}

#[actix_web::test]
async fn test_create_form_lists_groups() {
    let state = test_state();
    let author = create_user(&state, "auth").await;
    create_group(&state, "test-slug").await;
    let app = test_app!(state);

    let req = test::TestRequest::get()
        .uri("/create/")
        .cookie(session_for(&state, &author))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_text(resp).await;
    assert!(body.contains("New post"));
    assert!(body.contains("Test group"));
}

#[actix_web::test]
async fn test_create_post_redirects_to_profile() {
    let state = test_state();
    let author = create_user(&state, "auth").await;
    let group = create_group(&state, "test-slug").await;
    let app = test_app!(state);

    let group_id = group.id.to_string();
    let req = test::TestRequest::post()
        .uri("/create/")
        .cookie(session_for(&state, &author))
        .set_form([("text", "Hello"), ("group", group_id.as_str())])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/profile/auth/");

    assert_eq!(post_count(&state).await, 1);
    let created = state.posts.find_details(1).await.unwrap().unwrap();
    assert_eq!(created.post.text, "Hello");
    assert_eq!(created.author.username, "auth");
    assert_eq!(created.group, Some(group));
}

#[actix_web::test]
async fn test_create_redirect_escapes_non_ascii_username() {
    let state = test_state();
    let author = create_user(&state, "Иван").await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/create/")
        .cookie(session_for(&state, &author))
        .set_form([("text", "Привет"), ("group", "")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/profile/%D0%98%D0%B2%D0%B0%D0%BD/");

    let req = test::TestRequest::get().uri(location(&resp)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Привет"));
}

/// Offers a group choice that the store has never heard of.
struct PhantomGroups;

#[async_trait]
impl BaseRepository<Group, i64> for PhantomGroups {
    async fn find_by_id(&self, _id: i64) -> Result<Option<Group>, RepoError> {
        Ok(None)
    }
}

#[async_trait]
impl GroupRepository for PhantomGroups {
    async fn create(&self, _group: NewGroup) -> Result<Group, RepoError> {
        Err(RepoError::Query("read-only".to_string()))
    }

    async fn find_by_slug(&self, _slug: &str) -> Result<Option<Group>, RepoError> {
        Ok(None)
    }

    async fn list_all(&self) -> Result<Vec<Group>, RepoError> {
        Ok(vec![Group {
            id: 42,
            title: "Gone".to_string(),
            slug: "gone".to_string(),
            description: "Deleted after the form was validated".to_string(),
        }])
    }
}

#[actix_web::test]
async fn test_group_deleted_mid_request_becomes_form_error() {
    let mut state = test_state();
    let author = create_user(&state, "auth").await;
    let post = create_post(&state, &author, "Original", None).await;
    state.groups = Arc::new(PhantomGroups);
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/create/")
        .cookie(session_for(&state, &author))
        .set_form([("text", "Keep this text"), ("group", "42")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains(INVALID_GROUP_MESSAGE));
    assert!(body.contains("Keep this text"));
    assert_eq!(post_count(&state).await, 1);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/edit/", post.id))
        .cookie(session_for(&state, &author))
        .set_form([("text", "Edited"), ("group", "42")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains(INVALID_GROUP_MESSAGE));
    let stored = state.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "Original");
    assert_eq!(stored.group_id, None);
}

#[actix_web::test]
async fn test_create_rejects_empty_text() {
    let state = test_state();
    let author = create_user(&state, "auth").await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/create/")
        .cookie(session_for(&state, &author))
        .set_form([("text", "   "), ("group", "")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains(EMPTY_TEXT_MESSAGE));
    assert_eq!(post_count(&state).await, 0);
}

#[actix_web::test]
async fn test_create_rejects_unknown_group_and_keeps_input() {
    let state = test_state();
    let author = create_user(&state, "auth").await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/create/")
        .cookie(session_for(&state, &author))
        .set_form([("text", "Keep this text"), ("group", "999")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_text(resp).await;
    assert!(body.contains(INVALID_GROUP_MESSAGE));
    assert!(body.contains("Keep this text"));
    assert_eq!(post_count(&state).await, 0);
}

#[actix_web::test]
async fn test_session_for_deleted_user_is_sent_to_login() {
    let state = test_state();
    let ghost = User::new("ghost".to_string(), "unused".to_string());
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/create/")
        .cookie(session_for(&state, &ghost))
        .set_form([("text", "Hello"), ("group", "")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/auth/login/?next=/create/");
    assert_eq!(post_count(&state).await, 0);
}

#[actix_web::test]
async fn test_owner_edits_post_in_place() {
    let state = test_state();
    let author = create_user(&state, "auth").await;
    let group = create_group(&state, "test-slug").await;
    let original = create_post(&state, &author, "Original", Some(group.id)).await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/edit/", original.id))
        .cookie(session_for(&state, &author))
        .set_form([("text", "Updated"), ("group", "")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/posts/{}/", original.id));

    let edited = state.posts.find_by_id(original.id).await.unwrap().unwrap();
    assert_eq!(edited.text, "Updated");
    assert_eq!(edited.group_id, None);
    assert_eq!(edited.author_id, original.author_id);
    assert_eq!(edited.pub_date, original.pub_date);
    assert_eq!(post_count(&state).await, 1);
}

#[actix_web::test]
async fn test_edit_form_is_prefilled_for_owner() {
    let state = test_state();
    let author = create_user(&state, "auth").await;
    let post = create_post(&state, &author, "Original", None).await;
    let app = test_app!(state);

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/edit/", post.id))
        .cookie(session_for(&state, &author))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_text(resp).await;
    assert!(body.contains("Edit post"));
    assert!(body.contains("Original"));
}

#[actix_web::test]
async fn test_non_owner_edit_changes_nothing() {
    let state = test_state();
    let author = create_user(&state, "auth").await;
    let intruder = create_user(&state, "intruder").await;
    let post = create_post(&state, &author, "Original", None).await;
    let app = test_app!(state);
    let edit_uri = format!("/posts/{}/edit/", post.id);
    let detail_uri = format!("/posts/{}/", post.id);

    let req = test::TestRequest::get()
        .uri(&edit_uri)
        .cookie(session_for(&state, &intruder))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), detail_uri);

    let req = test::TestRequest::post()
        .uri(&edit_uri)
        .cookie(session_for(&state, &intruder))
        .set_form([("text", "Hijacked"), ("group", "")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), detail_uri);

    let stored = state.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored, post);
}

#[actix_web::test]
async fn test_edit_rejects_empty_text() {
    let state = test_state();
    let author = create_user(&state, "auth").await;
    let post = create_post(&state, &author, "Original", None).await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/edit/", post.id))
        .cookie(session_for(&state, &author))
        .set_form([("text", ""), ("group", "")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains(EMPTY_TEXT_MESSAGE));

    let stored = state.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "Original");
}

#[actix_web::test]
async fn test_edit_requires_login_and_existing_post() {
    let state = test_state();
    let author = create_user(&state, "auth").await;
    let post = create_post(&state, &author, "Original", None).await;
    let app = test_app!(state);

    let edit_uri = format!("/posts/{}/edit/", post.id);
    let resp = test::call_service(&app, test::TestRequest::get().uri(&edit_uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/auth/login/?next={edit_uri}"));

    let req = test::TestRequest::get()
        .uri("/posts/999/edit/")
        .cookie(session_for(&state, &author))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_expired_session_is_anonymous() {
    let state = test_state();
    let author = create_user(&state, "auth").await;
    let app = test_app!(state);

    // Signed with the same secret but already expired.
    let expired = JwtTokenService::new(JwtConfig {
        secret: "test-secret".to_string(),
        expiration_hours: -2,
        issuer: "yatube".to_string(),
    });
    let token = yatube_core::ports::TokenService::generate_token(&expired, author.id, "auth")
        .unwrap();

    let req = test::TestRequest::get()
        .uri("/create/")
        .cookie(Cookie::new(SESSION_COOKIE, token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/auth/login/?next=/create/");
}

#[actix_web::test]
async fn test_bearer_token_is_accepted() {
    let state = test_state();
    let author = create_user(&state, "auth").await;
    let token = state.tokens.generate_token(author.id, "auth").unwrap();
    let app = test_app!(state);

    let req = test::TestRequest::get()
        .uri("/create/")
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_login_sets_cookie_and_honours_local_next() {
    let state = test_state();
    create_user(&state, "auth").await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_form([("username", "auth"), ("password", PASSWORD), ("next", "/create/")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/create/");

    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .expect("login should set the session cookie")
        .into_owned();
    assert_eq!(cookie.http_only(), Some(true));

    let req = test::TestRequest::get()
        .uri("/create/")
        .cookie(Cookie::new(SESSION_COOKIE, cookie.value().to_string()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_login_escapes_non_ascii_next() {
    let state = test_state();
    create_user(&state, "auth").await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_form([("username", "auth"), ("password", PASSWORD), ("next", "/profile/Иван/")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/profile/%D0%98%D0%B2%D0%B0%D0%BD/");
}

#[actix_web::test]
async fn test_login_ignores_external_next() {
    let state = test_state();
    create_user(&state, "auth").await;
    let app = test_app!(state);

    for next in ["https://evil.example.com/", "//evil.example.com/", ""] {
        let req = test::TestRequest::post()
            .uri("/auth/login/")
            .set_form([("username", "auth"), ("password", PASSWORD), ("next", next)])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), "/", "{next}");
    }
}

#[actix_web::test]
async fn test_login_with_wrong_password_rerenders() {
    let state = test_state();
    create_user(&state, "auth").await;
    let app = test_app!(state);

    for (username, password) in [("auth", "wrong-password"), ("nobody", PASSWORD)] {
        let req = test::TestRequest::post()
            .uri("/auth/login/")
            .set_form([("username", username), ("password", password), ("next", "/create/")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.response().cookies().next().is_none());

        let body = body_text(resp).await;
        assert!(body.contains("Please enter a correct username and password"));
        // Tera escapes `/` inside HTML output.
        assert!(body.contains(r#"name="next" value="&#x2F;create&#x2F;""#));
    }
}

#[actix_web::test]
async fn test_login_form_carries_next() {
    let state = test_state();
    let app = test_app!(state);

    let req = test::TestRequest::get()
        .uri("/auth/login/?next=/posts/1/edit/")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(
        body_text(resp)
            .await
            .contains(r#"value="&#x2F;posts&#x2F;1&#x2F;edit&#x2F;""#)
    );
}

#[actix_web::test]
async fn test_signup_creates_user_and_session() {
    let state = test_state();
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/auth/signup/")
        .set_form([
            ("username", "newbie"),
            ("password", PASSWORD),
            ("password_confirm", PASSWORD),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");
    assert!(resp.response().cookies().any(|c| c.name() == SESSION_COOKIE));

    let user = state.users.find_by_username("newbie").await.unwrap().unwrap();
    assert!(state.passwords.verify(PASSWORD, &user.password_hash).unwrap());
}

#[actix_web::test]
async fn test_signup_rejects_bad_input() {
    let state = test_state();
    create_user(&state, "taken").await;
    let app = test_app!(state);

    let cases = [
        ("taken", PASSWORD, PASSWORD, "already exists"),
        ("fresh", "short", "short", "at least 8 characters"),
        ("fresh", PASSWORD, "different-one", "fields didn"),
        ("bad name", PASSWORD, PASSWORD, "may contain only letters"),
    ];

    for (username, password, confirm, expected) in cases {
        let req = test::TestRequest::post()
            .uri("/auth/signup/")
            .set_form([
                ("username", username),
                ("password", password),
                ("password_confirm", confirm),
            ])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "{username}");
        assert!(body_text(resp).await.contains(expected), "{expected}");
    }

    assert!(state.users.find_by_username("fresh").await.unwrap().is_none());
}

#[actix_web::test]
async fn test_logout_clears_cookie() {
    let state = test_state();
    let author = create_user(&state, "auth").await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/auth/logout/")
        .cookie(session_for(&state, &author))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");

    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .expect("logout should overwrite the session cookie");
    assert_eq!(cookie.value(), "");
}

#[actix_web::test]
async fn test_logged_in_nav_links_profile() {
    let state = test_state();
    let author = create_user(&state, "auth").await;
    let app = test_app!(state);

    let req = test::TestRequest::get()
        .uri("/")
        .cookie(session_for(&state, &author))
        .to_request();
    let body = body_text(test::call_service(&app, req).await).await;
    assert!(body.contains("/profile/auth/"));
    assert!(body.contains("Log out"));
}

#[actix_web::test]
async fn test_health() {
    let state = test_state();
    let app = test_app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[actix_web::test]
async fn test_older_posts_sort_after_newer_ones() {
    let state = test_state();
    let author = create_user(&state, "auth").await;
    state
        .posts
        .create(NewPost {
            text: "Backdated".to_string(),
            pub_date: Utc::now() - Duration::days(1),
            author_id: author.id,
            group_id: None,
        })
        .await
        .unwrap();
    create_post(&state, &author, "Fresh", None).await;
    let app = test_app!(state);

    let body = body_text(
        test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await,
    )
    .await;
    assert!(body.find("Fresh").unwrap() < body.find("Backdated").unwrap());
}
