use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use secrecy::ExposeSecret;
use uuid::Uuid;

use crate::{dto::auth::Claims, error::AppError, state::AppState};

pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: String,
}

pub fn ensure_role(user: &AuthUser, role: &str) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, ADMIN_ROLE)
}

pub fn decode_token(token: &str, secret: &str) -> Result<AuthUser, AppError> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized)?;

    let user_id = Uuid::parse_str(&decoded.claims.sub).map_err(|_| AppError::Unauthorized)?;

    Ok(AuthUser {
        user_id,
        role: decoded.claims.role,
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AppError::Unauthorized)?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::BadRequest("Invalid Authorization header".into()))?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::BadRequest("Invalid Authorization scheme".into()))?
            .trim();

        decode_token(token, state.jwt_secret.expose_secret())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    fn token(secret: &str, role: &str, exp: usize) -> String {
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            role: role.into(),
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn future() -> usize {
        (chrono::Utc::now().timestamp() + 3600) as usize
    }

    #[test]
    fn decodes_admin_token() {
        let user = decode_token(&token("s3cret", "admin", future()), "s3cret").unwrap();
        assert!(ensure_admin(&user).is_ok());
    }

    #[test]
    fn wrong_secret_or_expired_is_unauthorized() {
        assert!(matches!(
            decode_token(&token("other", "admin", future()), "s3cret"),
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            decode_token(&token("s3cret", "admin", 1), "s3cret"),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn non_admin_is_forbidden() {
        let user = AuthUser {
            user_id: Uuid::new_v4(),
            role: "staff".into(),
        };
        assert!(matches!(ensure_admin(&user), Err(AppError::Forbidden)));
    }
}
