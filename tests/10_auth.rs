mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/health", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["status"], "ok");

    // Banner route names the service
    let res = client.get(&server.base_url).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["name"], "Contacts API");

    Ok(())
}

#[tokio::test]
async fn registration_returns_the_public_profile() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let email = common::unique_email("register");

    let res = client
        .post(format!("{}/api/auth/register", server.base_url))
        .json(&json!({ "email": email, "password": "secret1" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::CREATED);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["user"]["email"], email);
    assert_eq!(body["user"]["subscription"], "starter");
    // No token before verification and nothing secret in the payload
    assert!(body.get("token").is_none());
    assert!(body["user"].get("password").is_none());

    // Same email again, case shifted, still conflicts
    let res = client
        .post(format!("{}/api/auth/register", server.base_url))
        .json(&json!({ "email": email.to_uppercase(), "password": "secret1" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Email in use");

    Ok(())
}

#[tokio::test]
async fn login_is_gated_on_verification() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let email = common::unique_email("verify-gate");

    let res = client
        .post(format!("{}/api/auth/register", server.base_url))
        .json(&json!({ "email": email, "password": "secret1" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    // Correct password, not yet verified
    let res = client
        .post(format!("{}/api/auth/login", server.base_url))
        .json(&json!({ "email": email, "password": "secret1" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Email not verified");

    // A made-up verification token misses
    let res = client
        .get(format!(
            "{}/api/auth/verify/{}",
            server.base_url, "0123456789abcdef0123456789abcdef"
        ))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "User not found");

    // The emailed token works exactly once
    let token = common::verification_token_for(server, &email)?;
    let res = client
        .get(format!("{}/api/auth/verify/{}", server.base_url, token))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Verification successful");

    let res = client
        .get(format!("{}/api/auth/verify/{}", server.base_url, token))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .post(format!("{}/api/auth/login", server.base_url))
        .json(&json!({ "email": email, "password": "secret1" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert!(body["token"].is_string());
    assert_eq!(body["user"]["email"], email);
    assert_eq!(body["user"]["subscription"], "starter");

    Ok(())
}

#[tokio::test]
async fn bad_credentials_are_indistinguishable() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let email = common::unique_email("bad-credentials");
    common::register_and_login(server, &client, &email, "secret1").await?;

    let wrong_password = client
        .post(format!("{}/api/auth/login", server.base_url))
        .json(&json!({ "email": email, "password": "not-it" }))
        .send()
        .await?;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    let wrong_password = wrong_password.json::<serde_json::Value>().await?;

    let unknown_email = client
        .post(format!("{}/api/auth/login", server.base_url))
        .json(&json!({ "email": common::unique_email("never-registered"), "password": "not-it" }))
        .send()
        .await?;
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    let unknown_email = unknown_email.json::<serde_json::Value>().await?;

    // Same body either way, no account enumeration
    assert_eq!(wrong_password, unknown_email);
    assert_eq!(wrong_password["message"], "Email or password is wrong");

    Ok(())
}

#[tokio::test]
async fn resend_reuses_the_outstanding_link() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let email = common::unique_email("resend");

    let res = client
        .post(format!("{}/api/auth/register", server.base_url))
        .json(&json!({ "email": email, "password": "secret1" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let first_token = common::verification_token_for(server, &email)?;

    let res = client
        .post(format!("{}/api/auth/verify", server.base_url))
        .json(&json!({ "email": email }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Verification email sent");

    // No rotation: the resent link carries the same token
    let second_token = common::verification_token_for(server, &email)?;
    assert_eq!(first_token, second_token);

    // Unknown address
    let res = client
        .post(format!("{}/api/auth/verify", server.base_url))
        .json(&json!({ "email": common::unique_email("resend-unknown") }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Email not found");

    // Already verified
    let res = client
        .get(format!("{}/api/auth/verify/{}", server.base_url, first_token))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .post(format!("{}/api/auth/verify", server.base_url))
        .json(&json!({ "email": email }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Verification has already been passed");

    Ok(())
}

#[tokio::test]
async fn logout_invalidates_the_bearer_token() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let email = common::unique_email("logout");
    let token = common::register_and_login(server, &client, &email, "secret1").await?;

    let res = client
        .get(format!("{}/api/auth/current", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["email"], email);
    assert_eq!(body["subscription"], "starter");

    let res = client
        .post(format!("{}/api/auth/logout", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    // Token is cryptographically fine but no longer matches the stored
    // session, so the guard turns it away
    let res = client
        .get(format!("{}/api/auth/current", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Not authorized");

    // A fresh login issues a working replacement
    let res = client
        .post(format!("{}/api/auth/login", server.base_url))
        .json(&json!({ "email": email, "password": "secret1" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn missing_and_malformed_tokens_are_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/auth/current", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(format!("{}/api/auth/current", server.base_url))
        .bearer_auth("definitely-not-a-jwt")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(format!("{}/api/auth/current", server.base_url))
        .header("Authorization", "Basic dXNlcjpwYXNz")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn validation_failures_name_the_field() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/auth/register", server.base_url))
        .json(&json!({ "email": "not-an-email", "password": "secret1" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Validation failed");
    assert!(body["errors"]["email"].is_string());

    let res = client
        .post(format!("{}/api/auth/register", server.base_url))
        .json(&json!({ "email": common::unique_email("short-password") }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert!(body["errors"]["password"].is_string());

    Ok(())
}

#[tokio::test]
async fn subscription_tier_can_be_changed() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let email = common::unique_email("subscription");
    let token = common::register_and_login(server, &client, &email, "secret1").await?;

    let res = client
        .patch(format!("{}/api/auth/subscription", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "subscription": "pro" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "The subscription was updated successfully");

    let res = client
        .patch(format!("{}/api/auth/subscription", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "subscription": "platinum" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .get(format!("{}/api/auth/current", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["subscription"], "pro");

    Ok(())
}

#[tokio::test]
async fn avatar_upload_normalizes_and_serves_the_file() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let email = common::unique_email("avatar");
    let token = common::register_and_login(server, &client, &email, "secret1").await?;

    // A deliberately non-square source image
    let mut png = Vec::new();
    let source = image::DynamicImage::ImageRgb8(image::RgbImage::new(64, 48));
    source.write_to(
        &mut std::io::Cursor::new(&mut png),
        image::ImageFormat::Png,
    )?;

    let part = reqwest::multipart::Part::bytes(png)
        .file_name("me.png")
        .mime_str("image/png")?;
    let form = reqwest::multipart::Form::new().part("avatar", part);

    let res = client
        .patch(format!("{}/api/auth/avatars", server.base_url))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    let avatar_url = body["avatarURL"].as_str().unwrap_or_default().to_string();
    assert!(avatar_url.starts_with("avatars/"), "got {}", avatar_url);
    assert!(avatar_url.ends_with(".png"));

    // Served statically, resized to the fixed square
    let res = client
        .get(format!("{}/{}", server.base_url, avatar_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let bytes = res.bytes().await?;
    let stored = image::load_from_memory(&bytes)?;
    assert_eq!((stored.width(), stored.height()), (250, 250));

    // A form without the avatar file field is rejected
    let form = reqwest::multipart::Form::new().text("note", "no file here");
    let res = client
        .patch(format!("{}/api/auth/avatars", server.base_url))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "File is not transferred");

    Ok(())
}
