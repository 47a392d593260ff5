//! Integration tests for login, self-registration and logout.

use aula_integration_tests::TestContext;
use reqwest::StatusCode;

#[tokio::test]
async fn test_visitor_sees_login_form() {
    let ctx = TestContext::start().await;
    let body = ctx.page(&TestContext::browser(), "/").await;

    assert!(body.contains("action=\"/auth/login\""));
    assert!(!body.contains("action=\"/auth/register\""));
}

#[tokio::test]
async fn test_register_mode_shows_registration_form() {
    let ctx = TestContext::start().await;
    let body = ctx.page(&TestContext::browser(), "/?mode=register").await;

    assert!(body.contains("action=\"/auth/register\""));
    assert!(body.contains("name=\"company\""));
}

#[tokio::test]
async fn test_unknown_email_is_rejected() {
    let ctx = TestContext::start().await;
    let client = TestContext::browser();

    let body = ctx
        .login(&client, "ghost@example.com")
        .await
        .text()
        .await
        .expect("read body");

    assert!(body.contains("Account non trovato. Per favore registrati."));
    assert!(body.contains("action=\"/auth/login\""));
}

#[tokio::test]
async fn test_allowlisted_user_logs_in_case_insensitively() {
    let ctx = TestContext::start().await;
    ctx.seed_user("anna@example.com", "Anna Rossi", false).await;
    let client = TestContext::browser();

    let response = ctx.login(&client, "  ANNA@example.com ").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.expect("read body");

    assert!(body.contains("Anna Rossi"));
    assert!(body.contains("Nessun corso disponibile"));
    // Regular users get no admin links
    assert!(!body.contains("Gestisci Utenti"));
}

#[tokio::test]
async fn test_registration_logs_in_as_regular_user() {
    let ctx = TestContext::start().await;
    let client = TestContext::browser();

    let body = client
        .post(ctx.url("/auth/register"))
        .form(&[
            ("email", "Luca@Example.com"),
            ("name", "Luca Bianchi"),
            ("company", "Acme"),
            ("role", "Magazziniere"),
        ])
        .send()
        .await
        .expect("register request")
        .text()
        .await
        .expect("read body");

    assert!(body.contains("Registrazione completata con successo!"));
    assert!(body.contains("Luca Bianchi"));

    let email = aula_core::Email::parse("luca@example.com").expect("valid email");
    let user = ctx.data.find_user(&email).await.expect("registered user");
    assert!(!user.is_admin);
}

#[tokio::test]
async fn test_duplicate_registration_is_rejected() {
    let ctx = TestContext::start().await;
    ctx.seed_user("anna@example.com", "Anna Rossi", false).await;
    let client = TestContext::browser();

    let body = client
        .post(ctx.url("/auth/register"))
        .form(&[
            ("email", "anna@example.com"),
            ("name", "Altra Anna"),
            ("company", "Acme"),
            ("role", "Tecnico"),
        ])
        .send()
        .await
        .expect("register request")
        .text()
        .await
        .expect("read body");

    assert!(body.contains("Questa email è già registrata. Accedi."));
    assert!(body.contains("action=\"/auth/register\""));
}

#[tokio::test]
async fn test_logout_returns_to_login() {
    let ctx = TestContext::start().await;
    ctx.seed_user("anna@example.com", "Anna Rossi", false).await;
    let client = TestContext::browser();
    ctx.login(&client, "anna@example.com").await;

    let body = ctx.post(&client, "/auth/logout").await;
    assert!(body.contains("action=\"/auth/login\""));

    let body = ctx.page(&client, "/").await;
    assert!(!body.contains("Anna Rossi"));
}

#[tokio::test]
async fn test_removed_user_loses_access() {
    let ctx = TestContext::start().await;
    let anna = ctx.seed_user("anna@example.com", "Anna Rossi", false).await;
    let client = TestContext::browser();
    ctx.login(&client, "anna@example.com").await;

    ctx.data.delete_authorized_user(&anna).await;

    let body = ctx.page(&client, "/").await;
    assert!(body.contains("action=\"/auth/login\""));
}
