mod common;

use barnacle_shop_api::{
    dto::newsletter::SendNewsletterRequest,
    error::AppError,
    services::newsletter_service::{self, Subscription},
};
use common::{CapturingMailer, create_admin};
use uuid::Uuid;

fn address() -> String {
    format!("reader-{}@example.com", Uuid::new_v4().simple())
}

fn issue() -> SendNewsletterRequest {
    SendNewsletterRequest {
        subject: "New rugs this week".into(),
        body: "Three new bath mats just landed.".into(),
    }
}

#[tokio::test]
async fn subscribe_lifecycle() -> anyhow::Result<()> {
    let Some(ctx) = common::setup().await? else {
        return Ok(());
    };
    let email = address();

    let (first, subscriber) = newsletter_service::subscribe(&ctx.state, &email).await?;
    assert_eq!(first, Subscription::Created);
    assert!(subscriber.is_subscribed);

    let (again, _) =
        newsletter_service::subscribe(&ctx.state, &email.to_uppercase()).await?;
    assert_eq!(again, Subscription::AlreadySubscribed);

    let left = newsletter_service::unsubscribe(&ctx.state, &email).await?;
    assert!(!left.is_subscribed);

    let (back, subscriber) = newsletter_service::subscribe(&ctx.state, &email).await?;
    assert_eq!(back, Subscription::Renewed);
    assert!(subscriber.is_subscribed);
    Ok(())
}

#[tokio::test]
async fn unknown_and_invalid_addresses_are_rejected() -> anyhow::Result<()> {
    let Some(ctx) = common::setup().await? else {
        return Ok(());
    };
    let err = newsletter_service::unsubscribe(&ctx.state, &address())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFoundMsg(_)));

    let err = newsletter_service::subscribe(&ctx.state, "not-an-email")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    Ok(())
}

#[tokio::test]
async fn second_send_within_cooldown_is_refused() -> anyhow::Result<()> {
    let Some(ctx) = common::setup().await? else {
        return Ok(());
    };
    let admin = create_admin(&ctx.state).await?;
    newsletter_service::subscribe(&ctx.state, &address()).await?;

    let report = newsletter_service::send_newsletter(&ctx.state, &admin, issue()).await?;
    assert!(report.delivered >= 1);
    assert_eq!(report.failed, 0);

    let err = newsletter_service::send_newsletter(&ctx.state, &admin, issue())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::TooManyRequests(_)));
    Ok(())
}

#[tokio::test]
async fn failed_delivery_releases_the_cooldown() -> anyhow::Result<()> {
    let failing = CapturingMailer {
        fail: true,
        ..Default::default()
    };
    let Some(ctx) = common::setup_with_mailer(failing).await? else {
        return Ok(());
    };
    let admin = create_admin(&ctx.state).await?;
    newsletter_service::subscribe(&ctx.state, &address()).await?;

    let report = newsletter_service::send_newsletter(&ctx.state, &admin, issue()).await?;
    assert_eq!(report.delivered, 0);
    assert_eq!(report.failed, report.recipients);

    // Not a 429: nothing went out, so the window never started.
    let retry = newsletter_service::send_newsletter(&ctx.state, &admin, issue()).await?;
    assert_eq!(retry.delivered, 0);
    Ok(())
}
