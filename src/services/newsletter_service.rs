use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    audit,
    dto::newsletter::{NewsletterSendReport, SendNewsletterRequest},
    entity::{
        NewsletterSubscribers,
        newsletter_subscribers::{ActiveModel as SubscriberActive, Column as SubscriberCol},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::NewsletterSubscriber,
    notifications::messages,
    services::is_valid_email,
    state::AppState,
};

/// The cooldown covers every send, not a single audience.
const COOLDOWN_KEY: &str = "batch";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subscription {
    Created,
    Renewed,
    AlreadySubscribed,
}

fn normalize_email(raw: &str) -> AppResult<String> {
    let email = raw.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(AppError::BadRequest("Invalid email address".into()));
    }
    Ok(email)
}

pub async fn subscribe(
    state: &AppState,
    email: &str,
) -> AppResult<(Subscription, NewsletterSubscriber)> {
    let email = normalize_email(email)?;

    let existing = NewsletterSubscribers::find()
        .filter(SubscriberCol::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?;

    let (outcome, subscriber) = match existing {
        Some(subscriber) if subscriber.is_subscribed => (Subscription::AlreadySubscribed, subscriber),
        Some(subscriber) => {
            let mut active: SubscriberActive = subscriber.into();
            active.is_subscribed = Set(true);
            (Subscription::Renewed, active.update(&state.orm).await?)
        }
        None => {
            let subscriber = SubscriberActive {
                id: Set(Uuid::new_v4()),
                email: Set(email.clone()),
                is_subscribed: Set(true),
                subscribed_at: NotSet,
            }
            .insert(&state.orm)
            .await?;
            (Subscription::Created, subscriber)
        }
    };

    if outcome != Subscription::AlreadySubscribed {
        state.notifier.newsletter_welcome(&email);
    }
    Ok((outcome, subscriber.into()))
}

pub async fn unsubscribe(state: &AppState, email: &str) -> AppResult<NewsletterSubscriber> {
    let email = email.trim().to_lowercase();
    let subscriber = NewsletterSubscribers::find()
        .filter(SubscriberCol::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?
        .ok_or_else(|| {
            AppError::NotFoundMsg("Email not found in our subscription list.".into())
        })?;

    let mut active: SubscriberActive = subscriber.into();
    active.is_subscribed = Set(false);
    Ok(active.update(&state.orm).await?.into())
}

/// Send one issue to every active subscriber, at most once per cooldown
/// window. The window only starts when at least one delivery succeeds.
pub async fn send_newsletter(
    state: &AppState,
    user: &AuthUser,
    payload: SendNewsletterRequest,
) -> AppResult<NewsletterSendReport> {
    ensure_admin(user)?;
    if payload.subject.trim().is_empty() || payload.body.trim().is_empty() {
        return Err(AppError::BadRequest("subject and body are required".into()));
    }

    if !state.newsletter_cooldown.try_claim(COOLDOWN_KEY).await {
        return Err(AppError::TooManyRequests(
            "A newsletter was already sent in the last 24 hours".into(),
        ));
    }

    let recipients = match active_subscribers(state).await {
        Ok(recipients) if !recipients.is_empty() => recipients,
        Ok(_) => {
            state.newsletter_cooldown.release(COOLDOWN_KEY).await;
            return Err(AppError::BadRequest("There are no active subscribers".into()));
        }
        Err(err) => {
            state.newsletter_cooldown.release(COOLDOWN_KEY).await;
            return Err(err);
        }
    };

    let mut delivered = 0;
    for address in &recipients {
        let email = messages::newsletter_issue(address, &payload.subject, &payload.body);
        match state.notifier.deliver(email).await {
            Ok(()) => delivered += 1,
            Err(err) => tracing::warn!(error = %err, to = %address, "newsletter delivery failed"),
        }
    }

    let report = NewsletterSendReport {
        recipients: recipients.len(),
        delivered,
        failed: recipients.len() - delivered,
    };

    if delivered == 0 {
        state.newsletter_cooldown.release(COOLDOWN_KEY).await;
        tracing::warn!(recipients = report.recipients, "newsletter not delivered, cooldown released");
    } else {
        tracing::info!(
            recipients = report.recipients,
            delivered = report.delivered,
            "newsletter sent"
        );
        audit::record(
            &state.pool,
            Some(user.user_id),
            "newsletter_send",
            "newsletter_subscribers",
            serde_json::json!({ "subject": payload.subject, "delivered": delivered }),
        )
        .await;
    }

    Ok(report)
}

async fn active_subscribers(state: &AppState) -> AppResult<Vec<String>> {
    Ok(NewsletterSubscribers::find()
        .filter(SubscriberCol::IsSubscribed.eq(true))
        .order_by_asc(SubscriberCol::SubscribedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|subscriber| subscriber.email)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email("  Fan@Example.COM ").unwrap(), "fan@example.com");
        assert!(normalize_email("not-an-email").is_err());
    }
}
