use axum::{extract::FromRequestParts, http::header};
use uuid::Uuid;

use crate::{error::AppError, services::auth_service};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: String,
}

/// How far an owner check reaches for the requester: regular users see only
/// their own rows, admins see everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessScope {
    Owner(Uuid),
    Unrestricted,
}

impl AccessScope {
    pub fn permits(&self, owner_id: Uuid) -> bool {
        match self {
            AccessScope::Owner(user_id) => *user_id == owner_id,
            AccessScope::Unrestricted => true,
        }
    }

    /// The concrete requester, when the scope names one.
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            AccessScope::Owner(user_id) => Some(*user_id),
            AccessScope::Unrestricted => None,
        }
    }
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == "ADMIN"
    }

    pub fn scope(&self) -> AccessScope {
        if self.is_admin() {
            AccessScope::Unrestricted
        } else {
            AccessScope::Owner(self.user_id)
        }
    }
}

pub fn ensure_role(user: &AuthUser, role: &str) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, "ADMIN")
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

        if !auth_str.starts_with("Bearer ") {
            return Err(AppError::Unauthorized("Invalid Authorization scheme".into()));
        }
        let token = auth_str.trim_start_matches("Bearer ").trim();

        let secret = auth_service::jwt_secret()?;
        let claims = auth_service::decode_claims(token, &secret)?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;

        Ok(AuthUser {
            user_id,
            email: claims.email,
            role: claims.role,
        })
    }
}
