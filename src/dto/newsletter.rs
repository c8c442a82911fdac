use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubscribeRequest {
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendNewsletterRequest {
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NewsletterSendReport {
    pub recipients: usize,
    pub delivered: usize,
    pub failed: usize,
}
