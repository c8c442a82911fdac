use std::sync::Arc;

use secrecy::SecretString;

use crate::{
    cache::ClaimCache,
    config::{AppConfig, PaymentConfig, ShippingRates},
    db::{DbPool, OrmConn, orm_from_pool},
    notifications::{Mailer, Notifier},
    payments::PaymentGateway,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub gateway: Arc<dyn PaymentGateway>,
    pub notifier: Notifier,
    /// Payment sessions whose stock deduction is done or in flight.
    pub settlement_claims: ClaimCache,
    pub newsletter_cooldown: ClaimCache,
    pub payments: PaymentConfig,
    pub shipping: ShippingRates,
    pub jwt_secret: SecretString,
}

impl AppState {
    pub fn new(
        pool: DbPool,
        gateway: Arc<dyn PaymentGateway>,
        mailer: Arc<dyn Mailer>,
        config: &AppConfig,
    ) -> Self {
        let orm = orm_from_pool(&pool);
        Self {
            pool,
            orm,
            gateway,
            notifier: Notifier::new(mailer, config.email.owner_address.clone()),
            settlement_claims: ClaimCache::settlements(),
            newsletter_cooldown: ClaimCache::newsletter(),
            payments: config.payments.clone(),
            shipping: config.shipping.clone(),
            jwt_secret: config.jwt_secret.clone(),
        }
    }
}
