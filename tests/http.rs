use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use doomscroll::{
    auth::{session::FlashLevel, Session, SessionKeys},
    build_app,
    config::AppConfig,
    AppState,
};
use http_body_util::BodyExt;
use tower::ServiceExt;
use uuid::Uuid;

async fn spawn_app() -> Router {
    let state = AppState::from_config(AppConfig::in_memory("test-secret"))
        .await
        .expect("failed to create app state");
    build_app(state)
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_form(uri: &str, form: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(form.to_string())).unwrap()
}

fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .expect("missing Location header")
}

/// `name=value` part of the Set-Cookie header, ready to send back.
fn session_cookie(response: &Response<Body>) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("missing Set-Cookie header");
    set_cookie.split(';').next().unwrap().to_string()
}

/// Decodes the session the server just set, with the same secret as `spawn_app`.
fn response_session(response: &Response<Body>) -> Session {
    let mut headers = axum::http::HeaderMap::new();
    headers.insert(
        header::COOKIE,
        session_cookie(response).parse().expect("cookie header"),
    );
    session_keys().from_headers(&headers)
}

fn session_keys() -> SessionKeys {
    SessionKeys::new(&AppConfig::in_memory("test-secret").session)
}

fn focus_seconds(page: &str) -> i64 {
    let start = page
        .find(r#"id="focus" data-seconds=""#)
        .expect("focus counter on dashboard")
        + r#"id="focus" data-seconds=""#.len();
    let end = start + page[start..].find('"').expect("closing quote");
    page[start..end].parse().expect("numeric focus seconds")
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Registers and logs in, returning the authenticated session cookie.
async fn login_as(app: &Router, username: &str, password: &str) -> String {
    let form = format!("username={username}&password={password}");
    let response = app
        .clone()
        .oneshot(post_form("/register", &form, None))
        .await
        .unwrap();
    assert_eq!(location(&response), "/login");

    let response = app
        .clone()
        .oneshot(post_form("/login", &form, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");
    session_cookie(&response)
}

#[tokio::test]
async fn unauthenticated_dashboard_redirects_to_login() {
    let app = spawn_app().await;

    for _ in 0..2 {
        let response = app.clone().oneshot(get("/dashboard", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");

        let cookie = session_cookie(&response);
        let page = app
            .clone()
            .oneshot(get("/login", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(page.status(), StatusCode::OK);
        assert!(body_text(page)
            .await
            .contains("You must be logged in to access this page."));
    }
}

#[tokio::test]
async fn forged_session_is_not_trusted() {
    let app = spawn_app().await;
    let response = app
        .clone()
        .oneshot(get("/block/reddit.com", Some("session=not-a-token")))
        .await
        .unwrap();
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn index_follows_session_state() {
    let app = spawn_app().await;

    let response = app.clone().oneshot(get("/", None)).await.unwrap();
    assert_eq!(location(&response), "/login");

    let cookie = login_as(&app, "testuser", "password123").await;
    let response = app.clone().oneshot(get("/", Some(&cookie))).await.unwrap();
    assert_eq!(location(&response), "/dashboard");
}

#[tokio::test]
async fn registration_errors_return_to_the_form() {
    let app = spawn_app().await;
    login_as(&app, "admin", "admin").await;

    let response = app
        .clone()
        .oneshot(post_form("/register", "username=admin&password=other", None))
        .await
        .unwrap();
    assert_eq!(location(&response), "/register");
    let page = app
        .clone()
        .oneshot(get("/register", Some(&session_cookie(&response))))
        .await
        .unwrap();
    assert!(body_text(page).await.contains("That username is already taken."));

    let response = app
        .clone()
        .oneshot(post_form("/register", "username=&password=", None))
        .await
        .unwrap();
    assert_eq!(location(&response), "/register");
}

#[tokio::test]
async fn wrong_password_is_rejected_generically() {
    let app = spawn_app().await;
    login_as(&app, "admin", "admin").await;

    for form in ["username=admin&password=wrong", "username=ghost&password=admin"] {
        let response = app
            .clone()
            .oneshot(post_form("/login", form, None))
            .await
            .unwrap();
        assert_eq!(location(&response), "/login");
        let page = app
            .clone()
            .oneshot(get("/login", Some(&session_cookie(&response))))
            .await
            .unwrap();
        assert!(body_text(page).await.contains("Invalid username or password."));
    }
}

#[tokio::test]
async fn block_flow_records_attempt_and_updates_dashboard() {
    let app = spawn_app().await;
    let cookie = login_as(&app, "testuser", "password123").await;

    let response = app
        .clone()
        .oneshot(get("/dashboard", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_text(response).await;
    assert!(page.contains("Welcome, testuser"));
    assert!(page.contains("No Data"));
    assert!(page.contains(r#"<strong id="streak">0</strong>"#));

    let response = app
        .clone()
        .oneshot(get("/block/example.com", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response)
        .await
        .contains("you think your goals finish themselves while you doom scroll?"));

    let response = app
        .clone()
        .oneshot(post_form(
            "/block/example.com",
            "task=finish+report",
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");
    let cookie = session_cookie(&response);

    let response = app
        .clone()
        .oneshot(get("/dashboard", Some(&cookie)))
        .await
        .unwrap();
    let page = body_text(response).await;
    assert!(page.contains("<td>example.com</td><td>finish report</td>"));
    assert!(page.contains(r#"<strong id="streak">1</strong>"#));
    assert!(!page.contains("No Data"));
}

#[tokio::test]
async fn recorded_attempt_restarts_the_focus_timer() {
    let app = spawn_app().await;
    let cookie = login_as(&app, "testuser", "password123").await;
    let response = app
        .clone()
        .oneshot(get("/dashboard", Some(&cookie)))
        .await
        .unwrap();
    assert!(response_session(&response).checkpoint.is_none());

    let response = app
        .clone()
        .oneshot(post_form("/block/reddit.com", "task=write+tests", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(location(&response), "/dashboard");
    let session = response_session(&response);
    let checkpoint = session.checkpoint.expect("checkpoint set after recording");
    assert!(time::OffsetDateTime::now_utc() - checkpoint < time::Duration::minutes(1));

    let response = app
        .clone()
        .oneshot(get("/dashboard", Some(&session_cookie(&response))))
        .await
        .unwrap();
    let focus = focus_seconds(&body_text(response).await);
    assert!((0..60).contains(&focus), "focus was {focus}");
}

#[tokio::test]
async fn failed_record_returns_to_block_page_with_error() {
    let app = spawn_app().await;
    // signed session for an account that does not exist, so the insert hits the FK
    let cookie = session_keys()
        .cookie(&Session::logged_in(Uuid::new_v4(), "ghost"))
        .unwrap();
    let cookie = cookie.to_str().unwrap().split(';').next().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(post_form("/block/my%20site", "task=x", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/block/my%20site");

    let session = response_session(&response);
    assert!(session.checkpoint.is_none());
    let flash = session.flash.as_ref().expect("error flash");
    assert_eq!(flash.level, FlashLevel::Error);
    assert_eq!(flash.message, "Could not save your task, please try again.");
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn logout_clears_identity() {
    let app = spawn_app().await;
    let cookie = login_as(&app, "testuser", "password123").await;

    let response = app
        .clone()
        .oneshot(get("/logout", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(location(&response), "/login");
    let cookie = session_cookie(&response);

    let response = app
        .clone()
        .oneshot(get("/dashboard", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn health_endpoint_responds() {
    let app = spawn_app().await;
    let response = app.oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}
