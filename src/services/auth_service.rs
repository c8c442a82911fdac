use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordVerifier},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use secrecy::ExposeSecret;

use crate::{
    audit,
    dto::auth::{Claims, LoginRequest, LoginResponse},
    error::{AppError, AppResult},
    middleware::auth::ADMIN_ROLE,
    models::User,
    response::ApiResponse,
    state::AppState,
};

pub const TOKEN_TTL_HOURS: i64 = 24;

pub fn issue_token(user: &User, secret: &str) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(TOKEN_TTL_HOURS))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.id.to_string(),
        role: user.role.clone(),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

/// Admin login. Only admin accounts exist; anything else is rejected the
/// same way as a bad password.
pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;
    let user: Option<User> = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email.trim().to_lowercase())
        .fetch_optional(&state.pool)
        .await?;

    let user = match user {
        Some(u) if u.role == ADMIN_ROLE => u,
        _ => return Err(AppError::BadRequest("Invalid email or password".into())),
    };

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::BadRequest("Invalid email or password".into()));
    }

    let token = issue_token(&user, state.jwt_secret.expose_secret())?;

    audit::record(
        &state.pool,
        Some(user.id),
        "user_login",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::single(
        "Logged in",
        LoginResponse {
            token: format!("Bearer {}", token),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth::{decode_token, ensure_admin};
    use uuid::Uuid;

    #[test]
    fn issued_token_round_trips_through_extractor_logic() {
        let user = User {
            id: Uuid::new_v4(),
            email: "admin@example.com".into(),
            password_hash: String::new(),
            created_at: Utc::now(),
            role: ADMIN_ROLE.into(),
        };
        let token = issue_token(&user, "s3cret").unwrap();
        let auth = decode_token(&token, "s3cret").unwrap();
        assert_eq!(auth.user_id, user.id);
        assert!(ensure_admin(&auth).is_ok());
    }
}
