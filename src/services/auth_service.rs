use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use password_hash::rand_core::OsRng;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::auth::{
        Claims, LoginRequest, LoginResponse, LogoutRequest, RefreshRequest, RefreshResponse,
        RegisterRequest,
    },
    entity::{
        refresh_tokens::{ActiveModel as RefreshTokenActive, Column as RefreshTokenCol, Entity as RefreshTokens},
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::User,
    response::ApiResponse,
    state::AppState,
};

const ACCESS_TOKEN_TTL_MINUTES: i64 = 15;
const REFRESH_TOKEN_TTL_DAYS: i64 = 7;

pub fn jwt_secret() -> AppResult<String> {
    std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))
}

pub fn issue_token(
    user_id: Uuid,
    email: &str,
    role: &str,
    ttl: Duration,
    secret: &str,
) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(ttl)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role: role.to_string(),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

/// Signature and expiry are both checked; callers map the error to their own message.
pub fn decode_claims(token: &str, secret: &str) -> AppResult<Claims> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;
    Ok(decoded.claims)
}

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<User>> {
    let RegisterRequest {
        user_name,
        first_name,
        last_name,
        email,
        password,
    } = payload;

    if email.trim().is_empty() || password.is_empty() {
        return Err(AppError::Validation("Email and password are required".into()));
    }

    let exists = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?;
    if exists.is_some() {
        return Err(AppError::Conflict("Email is already registered".into()));
    }

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();

    let user = UserActive {
        id: Set(Uuid::new_v4()),
        user_name: Set(user_name),
        first_name: Set(first_name),
        last_name: Set(last_name),
        email: Set(email),
        password_hash: Set(password_hash),
        role: Set("USER".into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.id),
        "user_register",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("User created", user.into(), None))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;

    let user = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?;

    // Identical message whether the email is unknown or the password is wrong.
    let user = match user {
        Some(u) => u,
        None => return Err(AppError::Unauthorized("Invalid email or password".into())),
    };

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    let argon2 = Argon2::default();
    if argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::Unauthorized("Invalid email or password".into()));
    }

    let secret = jwt_secret()?;
    let access_token = issue_token(
        user.id,
        &user.email,
        &user.role,
        Duration::minutes(ACCESS_TOKEN_TTL_MINUTES),
        &secret,
    )?;
    let refresh_token = issue_token(
        user.id,
        &user.email,
        &user.role,
        Duration::days(REFRESH_TOKEN_TTL_DAYS),
        &secret,
    )?;

    let expires_at = Utc::now() + Duration::days(REFRESH_TOKEN_TTL_DAYS);
    RefreshTokenActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.id),
        token: Set(refresh_token.clone()),
        expires_at: Set(expires_at.into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.id),
        "user_login",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let resp = LoginResponse {
        access_token,
        refresh_token,
        user: user.into(),
    };

    Ok(ApiResponse::success("Logged in", resp, None))
}

/// Deletes the persisted refresh-token rows; succeeds even when none match.
pub async fn logout_user(
    state: &AppState,
    payload: LogoutRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    RefreshTokens::delete_many()
        .filter(RefreshTokenCol::Token.eq(payload.refresh_token.as_str()))
        .exec(&state.orm)
        .await?;

    Ok(ApiResponse::success("Logged out", serde_json::json!({}), None))
}

pub async fn refresh_access_token(
    state: &AppState,
    payload: RefreshRequest,
) -> AppResult<ApiResponse<RefreshResponse>> {
    let secret = jwt_secret()?;
    let claims = decode_claims(&payload.refresh_token, &secret)
        .map_err(|_| AppError::Unauthorized("Invalid refresh token".into()))?;

    let row = RefreshTokens::find()
        .filter(RefreshTokenCol::Token.eq(payload.refresh_token.as_str()))
        .one(&state.orm)
        .await?;
    let row = match row {
        Some(r) => r,
        None => return Err(AppError::Unauthorized("Invalid refresh token".into())),
    };

    if row.expires_at.with_timezone(&Utc) < Utc::now() {
        // Stale rows are reaped as they are discovered.
        RefreshTokens::delete_by_id(row.id).exec(&state.orm).await?;
        return Err(AppError::Unauthorized("Refresh token has expired".into()));
    }

    let access_token = issue_token(
        row.user_id,
        &claims.email,
        &claims.role,
        Duration::minutes(ACCESS_TOKEN_TTL_MINUTES),
        &secret,
    )?;

    Ok(ApiResponse::success(
        "Token refreshed",
        RefreshResponse { access_token },
        None,
    ))
}

pub async fn current_user(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<User>> {
    let found = Users::find_by_id(user.user_id).one(&state.orm).await?;
    let found = match found {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("OK", found.into(), None))
}
