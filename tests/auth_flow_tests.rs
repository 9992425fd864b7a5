//! Registration, login and `/auth/me` over HTTP.

use anyhow::Result;
use axum::{body::Body, http::Method, http::StatusCode};
use ong::auth::verify_token;
use ong::models::role::STANDARD_ROLE;
use serde_json::json;

#[path = "test_utils/mod.rs"]
mod test_utils;
use test_utils::{FilePart, TestApp, json_request, multipart_body, multipart_request, request};

fn registration(email: &str) -> Vec<u8> {
    multipart_body(
        &[
            ("firstName", "Ana"),
            ("lastName", "Gómez"),
            ("email", email),
            ("password", "Secreto123"),
        ],
        None,
    )
}

#[tokio::test]
async fn register_login_and_me() -> Result<()> {
    let app = TestApp::seeded().await?;

    let (status, body) = app
        .send(multipart_request(
            Method::POST,
            "/auth/register",
            None,
            registration("ana@example.org"),
        ))
        .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["isSuccess"], true);
    assert_eq!(body["message"], "Register successfully.");
    assert_eq!(body["data"]["role"], STANDARD_ROLE);
    assert_eq!(body["data"]["user"]["email"], "ana@example.org");
    assert!(body["data"]["user"].get("password").is_none());

    let token = body["data"]["token"].as_str().unwrap().to_string();
    let claims = verify_token(&app.state.config, &token)?;
    assert_eq!(claims.role, STANDARD_ROLE);
    assert_eq!(claims.email, "ana@example.org");

    let sent = app.mailer.sent.lock().await.clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "ana@example.org");
    assert_eq!(sent[0].subject, "Welcome to Somos Más");
    assert!(sent[0].body.starts_with("Hola Ana Gómez,"));
    assert_eq!(sent[0].reply_to.as_deref(), Some("somomasong@gmail.com"));

    let (status, body) = app
        .send(json_request(
            Method::POST,
            "/auth/login",
            &json!({ "email": "ana@example.org", "password": "Secreto123" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successfully.");
    let login_token = body["data"]["token"].as_str().unwrap().to_string();

    let (status, body) = app
        .send(request(Method::GET, "/auth/me", Some(&login_token), Body::empty()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Get data successfully.");
    assert_eq!(body["data"]["firstName"], "Ana");
    assert_eq!(body["data"]["lastName"], "Gómez");
    Ok(())
}

#[tokio::test]
async fn register_stores_uploaded_photo() -> Result<()> {
    let app = TestApp::seeded().await?;

    let body = multipart_body(
        &[
            ("firstName", "Luis"),
            ("lastName", "Pérez"),
            ("email", "luis@example.org"),
            ("password", "Secreto123"),
        ],
        Some(FilePart {
            name: "photo",
            file_name: "me.jpg",
            content_type: "image/jpeg",
            bytes: b"\xff\xd8\xff\xe0jpeg",
        }),
    );
    let (status, body) = app
        .send(multipart_request(Method::POST, "/auth/register", None, body))
        .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    let photo = body["data"]["user"]["photo"].as_str().unwrap();
    assert!(photo.ends_with(".jpg"));
    let file_name = photo.rsplit('/').next().unwrap();
    assert!(app.uploads.path().join(file_name).exists());
    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_rejected() -> Result<()> {
    let app = TestApp::seeded().await?;

    let (status, body) = app
        .send(multipart_request(
            Method::POST,
            "/auth/register",
            None,
            registration("mail3@Mail.com"),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["isSuccess"], false);
    assert_eq!(body["message"], "Error Register.");
    assert!(app.mailer.sent.lock().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn register_requires_every_field() -> Result<()> {
    let app = TestApp::seeded().await?;

    let body = multipart_body(&[("firstName", "Ana"), ("email", "ana@example.org")], None);
    let (status, body) = app
        .send(multipart_request(Method::POST, "/auth/register", None, body))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Error Register.");
    Ok(())
}

#[tokio::test]
async fn seeded_admin_can_log_in() -> Result<()> {
    let app = TestApp::seeded().await?;

    let (status, body) = app
        .send(json_request(
            Method::POST,
            "/auth/login",
            &json!({ "email": "mail1@Mail.com", "password": "Admin123" }),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "Admin");
    assert_eq!(body["data"]["user"]["id"], 1);
    Ok(())
}

#[tokio::test]
async fn wrong_password_and_unknown_email_look_the_same() -> Result<()> {
    let app = TestApp::seeded().await?;

    for payload in [
        json!({ "email": "mail1@Mail.com", "password": "wrong" }),
        json!({ "email": "nobody@example.org", "password": "Admin123" }),
    ] {
        let (status, body) = app
            .send(json_request(Method::POST, "/auth/login", &payload))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["isSuccess"], false);
        assert_eq!(body["message"], "User or password do not exist.");
    }
    Ok(())
}

#[tokio::test]
async fn malformed_login_body_is_a_bad_request() -> Result<()> {
    let app = TestApp::seeded().await?;

    let (status, body) = app
        .send(json_request(Method::POST, "/auth/login", &json!({ "email": 42 })))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid request body.");
    Ok(())
}

#[tokio::test]
async fn me_for_deleted_user_fails() -> Result<()> {
    let app = TestApp::seeded().await?;
    let token = app.token_for(5, "mail5@Mail.com", "Admin");

    let (status, _) = app
        .send(request(Method::DELETE, "/users/5", Some(&token), Body::empty()))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .send(request(Method::GET, "/auth/me", Some(&token), Body::empty()))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Get data failed.");
    Ok(())
}
