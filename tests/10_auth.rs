mod common;

use anyhow::Result;
use serde_json::json;

use common::{MockBackend, EMAIL, PASSWORD, TOKEN};
use personas_admin::navigation::Route;
use personas_admin::session::{Storage, TOKEN_KEY, USER_KEY};
use personas_admin::ApiError;

#[tokio::test]
async fn login_stores_token_and_profile_together() -> Result<()> {
    let backend = MockBackend::start().await?;
    let (app, storage) = backend.app()?;

    let session = app.auth.login(EMAIL, PASSWORD).await?;

    assert!(session.is_authenticated());
    assert_eq!(session.token.as_deref(), Some(TOKEN));
    assert_eq!(storage.get(TOKEN_KEY)?.as_deref(), Some(TOKEN));
    let stored_user: serde_json::Value = serde_json::from_str(&storage.get(USER_KEY)?.unwrap())?;
    assert_eq!(stored_user["fullName"], "Ana Pérez");
    assert_eq!(app.auth.current_user().map(|u| u.email), Some(EMAIL.to_string()));
    assert!(app.auth.is_authenticated());
    Ok(())
}

#[tokio::test]
async fn login_notifies_session_subscribers() -> Result<()> {
    let backend = MockBackend::start().await?;
    let (app, _storage) = backend.app()?;
    let mut changes = app.store.subscribe();

    app.auth.login(EMAIL, PASSWORD).await?;

    changes.changed().await?;
    assert_eq!(changes.borrow().as_ref().map(|u| u.id), Some(1));
    Ok(())
}

#[tokio::test]
async fn failed_login_leaves_store_untouched() -> Result<()> {
    let backend = MockBackend::start().await?;
    let (app, storage) = backend.app()?;

    let err = app.auth.login(EMAIL, "wrong").await.unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized(_)));
    assert_eq!(err.to_string(), "Invalid credentials");
    assert_eq!(storage.get(TOKEN_KEY)?, None);
    assert_eq!(storage.get(USER_KEY)?, None);
    assert!(!app.auth.is_authenticated());
    // No token was attached, so nothing to tear down.
    assert!(app.navigator.history().is_empty());
    Ok(())
}

#[tokio::test]
async fn requests_carry_bearer_token_after_login() -> Result<()> {
    let backend = MockBackend::start().await?;
    let (app, _storage) = common::logged_in_app(&backend).await?;

    let profile = app.auth.me().await?;

    assert_eq!(profile.full_name, "Ana Pérez");
    let login = backend.last_request("POST", "/api/auth/login").unwrap();
    assert_eq!(login.authorization, None);
    let me = backend.last_request("GET", "/api/auth/me").unwrap();
    assert_eq!(me.authorization, Some(format!("Bearer {}", TOKEN)));
    Ok(())
}

#[tokio::test]
async fn register_does_not_sign_in() -> Result<()> {
    let backend = MockBackend::start().await?;
    let (app, _storage) = backend.app()?;

    let response = app.auth.register("Luis Gómez", "luis@example.com", "pw123456").await?;

    assert!(response.success);
    assert_eq!(response.data.map(|p| p.full_name), Some("Luis Gómez".to_string()));
    let sent = backend.last_request("POST", "/api/auth/register").unwrap();
    assert_eq!(
        sent.body,
        Some(json!({"fullName": "Luis Gómez", "email": "luis@example.com", "password": "pw123456"}))
    );
    assert!(!app.auth.is_authenticated());
    Ok(())
}

#[tokio::test]
async fn register_validation_errors_are_formatted() -> Result<()> {
    let backend = MockBackend::start().await?;
    let (app, _storage) = backend.app()?;

    let err = app.auth.register("Luis", "not-an-email", "pw").await.unwrap_err();

    assert_eq!(err.status_code(), 422);
    assert_eq!(err.formatted_errors(), Some("email: invalid"));
    assert_eq!(err.to_string(), "email: invalid");
    assert_eq!(err.body().map(|b| b.message.as_str()), Some("Validation failure"));
    Ok(())
}

#[tokio::test]
async fn logout_clears_session_even_when_backend_fails() -> Result<()> {
    let backend = MockBackend::start().await?;
    let (app, storage) = common::logged_in_app(&backend).await?;
    app.enter(Route::Dashboard);
    backend.set_logout_fails(true);

    app.auth.logout().await?;

    assert!(backend.last_request("POST", "/api/auth/logout").is_some());
    assert_eq!(storage.get(TOKEN_KEY)?, None);
    assert_eq!(storage.get(USER_KEY)?, None);
    assert!(app.auth.current_user().is_none());
    assert_eq!(app.navigator.current(), Some(Route::Login));
    Ok(())
}

#[tokio::test]
async fn logout_revokes_token_on_backend() -> Result<()> {
    let backend = MockBackend::start().await?;
    let (app, _storage) = common::logged_in_app(&backend).await?;

    app.auth.logout().await?;

    let sent = backend.last_request("POST", "/api/auth/logout").unwrap();
    assert_eq!(sent.authorization, Some(format!("Bearer {}", TOKEN)));
    assert_eq!(sent.body, Some(json!({})));
    assert!(!app.auth.is_authenticated());
    Ok(())
}

#[tokio::test]
async fn guard_routes_follow_session_state() -> Result<()> {
    let backend = MockBackend::start().await?;
    let (app, _storage) = backend.app()?;

    app.enter(Route::Charts);
    assert_eq!(app.navigator.current(), Some(Route::Login));

    app.auth.login(EMAIL, PASSWORD).await?;
    app.enter(Route::Register);
    assert_eq!(app.navigator.current(), Some(Route::Dashboard));
    app.enter(Route::Audit);
    assert_eq!(app.navigator.current(), Some(Route::Audit));
    Ok(())
}
