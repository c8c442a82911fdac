//! Set-if-absent claims with expiry, backed by `moka`.
//!
//! A claim marks a unit of work as done (or in flight) for the lifetime of
//! the entry. Used for settlement idempotency and the newsletter cooldown.

use std::time::Duration;

use moka::future::Cache;

pub const SETTLEMENT_CLAIM_TTL: Duration = Duration::from_secs(60 * 60);
pub const NEWSLETTER_COOLDOWN: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Clone)]
pub struct ClaimCache {
    prefix: &'static str,
    inner: Cache<String, ()>,
}

impl ClaimCache {
    pub fn new(prefix: &'static str, ttl: Duration) -> Self {
        let inner = Cache::builder()
            .max_capacity(100_000)
            .time_to_live(ttl)
            .build();
        Self { prefix, inner }
    }

    pub fn settlements() -> Self {
        Self::new("payment_session_processed", SETTLEMENT_CLAIM_TTL)
    }

    pub fn newsletter() -> Self {
        Self::new("newsletter_sent", NEWSLETTER_COOLDOWN)
    }

    fn key(&self, id: &str) -> String {
        format!("{}_{}", self.prefix, id)
    }

    /// Atomically insert the claim. Returns `false` when it was already held.
    pub async fn try_claim(&self, id: &str) -> bool {
        self.inner.entry(self.key(id)).or_insert(()).await.is_fresh()
    }

    /// Drop a claim so the work can be attempted again.
    pub async fn release(&self, id: &str) {
        self.inner.invalidate(&self.key(id)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn second_claim_is_rejected() {
        let cache = ClaimCache::settlements();
        assert!(cache.try_claim("cs_test_1").await);
        assert!(!cache.try_claim("cs_test_1").await);
        assert!(cache.try_claim("cs_test_2").await);
    }

    #[tokio::test]
    async fn released_claim_can_be_taken_again() {
        let cache = ClaimCache::settlements();
        assert!(cache.try_claim("cs_retry").await);
        assert!(!cache.try_claim("cs_retry").await);
        cache.release("cs_retry").await;
        assert!(cache.try_claim("cs_retry").await);
    }

    #[tokio::test]
    async fn concurrent_claims_have_one_winner() {
        let cache = ClaimCache::settlements();
        let mut handles = Vec::new();
        for _ in 0..16 {
            let cache = cache.clone();
            handles.push(tokio::spawn(
                async move { cache.try_claim("cs_race").await },
            ));
        }
        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn claims_expire() {
        let cache = ClaimCache::new("short", Duration::from_millis(50));
        assert!(cache.try_claim("x").await);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(cache.try_claim("x").await);
    }
}
