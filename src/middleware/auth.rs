use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode, errors::ErrorKind};
use sea_orm::EntityTrait;
use uuid::Uuid;

use crate::{
    db::OrmConn,
    dto::auth::Claims,
    entity::users::{Entity as Users, Role},
    error::AppError,
    state::AppState,
};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

pub fn ensure_role(user: &AuthUser, role: Role) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::forbidden(format!(
            "This action requires the {} role",
            role.as_str()
        )));
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, Role::Admin)
}

pub fn decode_token(token: &str, secret: &str) -> Result<AuthUser, AppError> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|err| match err.kind() {
        ErrorKind::ExpiredSignature => AppError::Unauthorized("Token has expired".into()),
        _ => AppError::Unauthorized("Invalid token".into()),
    })?;

    let user_id = Uuid::parse_str(&decoded.claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;

    Ok(AuthUser {
        user_id,
        role: decoded.claims.role,
    })
}

/// Decodes the token and reloads its user. The role is taken from the users
/// table so a demotion or deletion applies to tokens issued before it.
pub async fn authenticate(orm: &OrmConn, token: &str, secret: &str) -> Result<AuthUser, AppError> {
    let claimed = decode_token(token, secret)?;
    let user = Users::find_by_id(claimed.user_id)
        .one(orm)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User no longer exists".into()))?;

    if user.role != claimed.role {
        tracing::debug!(
            user_id = %user.id,
            token_role = claimed.role.as_str(),
            role = user.role.as_str(),
            "role changed since token was issued"
        );
    }
    Ok(AuthUser {
        user_id: user.id,
        role: user.role,
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
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization scheme".into()))?;

        authenticate(&state.orm, token, &state.config.jwt_secret).await
    }
}
