//! Cookie session to cart key mapping.

use tower_sessions::{
    Expiry, Session, SessionManagerLayer,
    cookie::{SameSite, time::Duration},
};
use tower_sessions_sqlx_store::PostgresStore;
use uuid::Uuid;

use crate::error::AppResult;

pub const CART_SESSION_KEY: &str = "cart_session_key";
pub const SESSION_COOKIE_NAME: &str = "barnacle_session";

/// Carts survive two weeks of inactivity.
const SESSION_EXPIRY_DAYS: i64 = 14;

pub fn create_session_layer(
    store: PostgresStore,
    secure: bool,
) -> SessionManagerLayer<PostgresStore> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::days(SESSION_EXPIRY_DAYS)))
        .with_secure(secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// The browser's cart key, generated and stored on first use.
pub async fn ensure_cart_key(session: &Session) -> AppResult<String> {
    if let Some(key) = existing_cart_key(session).await? {
        return Ok(key);
    }
    let key = Uuid::new_v4().simple().to_string();
    session.insert(CART_SESSION_KEY, &key).await?;
    Ok(key)
}

/// Read-only lookup; `None` when the browser never touched its cart.
pub async fn existing_cart_key(session: &Session) -> AppResult<Option<String>> {
    Ok(session.get::<String>(CART_SESSION_KEY).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tower_sessions::MemoryStore;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn key_is_created_once() {
        let session = session();
        assert_eq!(existing_cart_key(&session).await.unwrap(), None);

        let first = ensure_cart_key(&session).await.unwrap();
        let second = ensure_cart_key(&session).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 32);
        assert_eq!(existing_cart_key(&session).await.unwrap(), Some(first));
    }
}
