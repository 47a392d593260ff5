//! Integration tests for the per-course chat.

use aula_integration_tests::TestContext;
use reqwest::{Client, StatusCode};

async fn send(ctx: &TestContext, client: &Client, path: &str, message: &str) -> String {
    client
        .post(ctx.url(path))
        .header("hx-request", "true")
        .form(&[("message", message)])
        .send()
        .await
        .expect("send request")
        .text()
        .await
        .expect("read body")
}

#[tokio::test]
async fn test_enrolled_user_sees_chat_and_posts_escaped_text() {
    let ctx = TestContext::start().await;
    let anna = ctx.seed_user("anna@example.com", "Anna Rossi", false).await;
    let course = ctx.seed_course("PRIMO SOCCORSO", None).await;
    ctx.data.enroll_user(course, &anna).await;

    let client = TestContext::browser();
    ctx.login(&client, "anna@example.com").await;

    let body = ctx.page(&client, &format!("/courses/{course}")).await;
    assert!(body.contains("Chat del Corso"));
    assert!(body.contains("Nessun messaggio ancora. Inizia la conversazione!"));

    let fragment = send(&ctx, &client, &format!("/courses/{course}/chat"), "<b>ciao</b>").await;
    assert!(fragment.contains("&lt;b&gt;ciao&lt;/b&gt;"));
    assert!(fragment.contains("own-message"));
    assert!(!fragment.contains("<html"));

    let messages = ctx.data.course_messages(course).await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].user_name, "Anna Rossi");
}

#[tokio::test]
async fn test_blank_message_is_not_saved() {
    let ctx = TestContext::start().await;
    let anna = ctx.seed_user("anna@example.com", "Anna", false).await;
    let course = ctx.seed_course("PRIMO SOCCORSO", None).await;
    ctx.data.enroll_user(course, &anna).await;

    let client = TestContext::browser();
    ctx.login(&client, "anna@example.com").await;
    ctx.page(&client, &format!("/courses/{course}")).await;

    send(&ctx, &client, &format!("/courses/{course}/chat"), "   ").await;
    assert!(ctx.data.course_messages(course).await.is_empty());
}

#[tokio::test]
async fn test_outsider_cannot_read_chat() {
    let ctx = TestContext::start().await;
    ctx.seed_user("luca@example.com", "Luca", false).await;
    let course = ctx.seed_course("PRIMO SOCCORSO", None).await;

    let client = TestContext::browser();
    ctx.login(&client, "luca@example.com").await;

    let body = ctx.page(&client, &format!("/courses/{course}")).await;
    assert!(!body.contains("Chat del Corso"));

    let response = client
        .get(ctx.url(&format!("/courses/{course}/chat")))
        .send()
        .await
        .expect("chat request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_poll_notifies_about_messages_from_others() {
    let ctx = TestContext::start().await;
    let anna = ctx.seed_user("anna@example.com", "Anna Rossi", false).await;
    let luca = ctx.seed_user("luca@example.com", "Luca Bianchi", false).await;
    let course = ctx.seed_course("PRIMO SOCCORSO", None).await;
    ctx.data.enroll_user(course, &anna).await;
    ctx.data.enroll_user(course, &luca).await;
    let chat = format!("/courses/{course}/chat");
    let poll = format!("{chat}/poll");

    let anna_client = TestContext::browser();
    ctx.login(&anna_client, "anna@example.com").await;
    let luca_client = TestContext::browser();
    ctx.login(&luca_client, "luca@example.com").await;

    // Both open the course; Anna writes first so the baseline is non-zero
    ctx.page(&anna_client, &format!("/courses/{course}")).await;
    ctx.page(&luca_client, &format!("/courses/{course}")).await;
    send(&ctx, &anna_client, &chat, "buongiorno").await;
    let first = ctx.page(&luca_client, &poll).await;
    assert!(first.contains("buongiorno"));

    send(&ctx, &anna_client, &chat, "ci vediamo alle 9").await;
    let second = ctx.page(&luca_client, &poll).await;
    assert!(second.contains("data-notification="));
    assert!(second.contains("Nuovo messaggio da Anna Rossi"));

    // Own messages never notify
    let own = ctx.page(&anna_client, &poll).await;
    assert!(!own.contains("data-notification="));
}

#[tokio::test]
async fn test_poll_stops_after_leaving_the_course() {
    let ctx = TestContext::start().await;
    let anna = ctx.seed_user("anna@example.com", "Anna", false).await;
    let course = ctx.seed_course("PRIMO SOCCORSO", None).await;
    ctx.data.enroll_user(course, &anna).await;

    let client = TestContext::browser();
    ctx.login(&client, "anna@example.com").await;
    ctx.page(&client, &format!("/courses/{course}")).await;
    ctx.page(&client, "/").await;

    let response = client
        .get(ctx.url(&format!("/courses/{course}/chat/poll")))
        .header("hx-request", "true")
        .send()
        .await
        .expect("poll request");
    assert_eq!(response.status().as_u16(), 286);
}

#[tokio::test]
async fn test_admin_clears_chat() {
    let ctx = TestContext::start().await;
    ctx.seed_user("admin@example.com", "Admin", true).await;
    let course = ctx.seed_course("PRIMO SOCCORSO", None).await;

    let client = TestContext::browser();
    ctx.login(&client, "admin@example.com").await;
    let body = ctx.page(&client, &format!("/courses/{course}")).await;
    assert!(body.contains("Pulisci Chat"));

    send(&ctx, &client, &format!("/courses/{course}/chat"), "avviso").await;
    assert_eq!(ctx.data.course_messages(course).await.len(), 1);

    let body = ctx.post(&client, &format!("/courses/{course}/chat/clear")).await;
    assert!(body.contains("Chat pulita con successo."));
    assert!(body.contains("Nessun messaggio ancora. Inizia la conversazione!"));
    assert!(ctx.data.course_messages(course).await.is_empty());
}
