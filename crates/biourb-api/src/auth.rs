use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::{info, warn};

use biourb_types::api::{
    Claims, ErrorResponse, LoginRequest, LoginResponse, MessageResponse, RegisterRequest, UserProfile,
};

use crate::error::ApiError;
use crate::validate::{missing, required};
use crate::{AppState, db_call};

#[utoipa::path(
    post,
    path = "/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = MessageResponse),
        (status = 400, description = "Missing field or email already registered", body = MessageResponse),
        (status = 500, description = "Database or hashing failure", body = ErrorResponse),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;

    let (Some(cpf), Some(name), Some(email), Some(password)) = (
        required(req.cpf),
        required(req.name),
        required(req.email),
        // Passwords are taken verbatim, surrounding spaces included.
        req.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(missing("cpf, name, email and password are required."));
    };

    let user_id = db_call(&state, move |db| {
        // Hash password with Argon2id
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))?
            .to_string();

        db.create_user(&cpf, &name, &email, &password_hash)
    })
    .await?
    .ok_or(ApiError::DuplicateEmail)?;

    info!("Registered user {}", user_id);

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully")),
    ))
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Profile and session token", body = LoginResponse),
        (status = 401, description = "Incorrect password", body = MessageResponse),
        (status = 404, description = "Email not registered", body = MessageResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;

    let (Some(email), Some(password)) = (required(req.email), req.password) else {
        return Err(missing("email and password are required."));
    };

    let lookup = email.clone();
    let user = db_call(&state, move |db| db.get_user_by_email(&lookup))
        .await?
        .ok_or(ApiError::NotFound)?;

    // Verify password
    let parsed_hash = PasswordHash::new(&user.senha)
        .map_err(|e| ApiError::Internal(format!("stored hash for user {} is corrupt: {}", user.id, e)))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| {
            warn!("Wrong password for user {}", user.id);
            ApiError::InvalidCredentials
        })?;

    let expires_at = Utc::now()
        .checked_add_signed(state.token_ttl)
        .ok_or_else(|| ApiError::Internal(format!("token lifetime {} overflows the clock", state.token_ttl)))?;
    let token = create_token(&state.jwt_secret, user.id, &user.email, expires_at)?;

    Ok(Json(LoginResponse {
        msg: "User logged in".to_string(),
        user: UserProfile {
            id: user.id,
            nome: user.nome,
            email: user.email,
            is_admin: user.is_admin,
        },
        token,
        expires_at,
    }))
}

pub fn create_token(
    secret: &str,
    user_id: i64,
    email: &str,
    expires_at: DateTime<Utc>,
) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        exp: expires_at.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::decode_token;

    #[test]
    fn issued_token_decodes_to_the_user() {
        let expires = Utc::now() + chrono::Duration::hours(1);
        let token = create_token("s3cret", 42, "ana@example.com", expires).unwrap();

        let claims = decode_token("s3cret", &token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.email, "ana@example.com");
        assert_eq!(claims.exp, expires.timestamp() as usize);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let expires = Utc::now() + chrono::Duration::hours(1);
        let token = create_token("s3cret", 42, "ana@example.com", expires).unwrap();
        assert!(decode_token("other", &token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let expires = Utc::now() - chrono::Duration::hours(2);
        let token = create_token("s3cret", 1, "a@b.c", expires).unwrap();
        assert!(decode_token("s3cret", &token).is_err());
    }
}
