use axum::{
    extract::{FromRef, FromRequestParts},
    http::header,
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use crate::{dto::auth::Claims, error::AppError, models::Role, state::AppState};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin.as_str()
    }
}

pub fn ensure_role(user: &AuthUser, role: Role) -> Result<(), AppError> {
    if user.role != role.as_str() {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, Role::Admin)
}

/// Educators author courses; admins may do anything an educator can.
pub fn ensure_educator(user: &AuthUser) -> Result<(), AppError> {
    if user.is_admin() {
        return Ok(());
    }
    ensure_role(user, Role::Educator)
}

pub fn decode_token(secret: &str, token: &str) -> Result<AuthUser, AppError> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

    let user_id = Uuid::parse_str(&decoded.claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;

    Ok(AuthUser {
        user_id,
        role: decoded.claims.role,
    })
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

        if !auth_str.starts_with("Bearer ") {
            return Err(AppError::Unauthorized(
                "Invalid Authorization scheme".into(),
            ));
        }
        let token = auth_str.trim_start_matches("Bearer ").trim();

        let state = AppState::from_ref(state);
        decode_token(&state.config.jwt_secret, token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth_service::issue_token;

    fn user(role: &str) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            role: role.into(),
        }
    }

    #[test]
    fn role_gates() {
        assert!(ensure_admin(&user("admin")).is_ok());
        assert!(matches!(
            ensure_admin(&user("educator")),
            Err(AppError::Forbidden)
        ));
        assert!(ensure_educator(&user("educator")).is_ok());
        assert!(ensure_educator(&user("admin")).is_ok());
        assert!(ensure_educator(&user("user")).is_err());
        assert!(ensure_role(&user("user"), Role::User).is_ok());
    }

    #[test]
    fn issued_tokens_decode_with_same_secret() {
        let id = Uuid::new_v4();
        let token = issue_token("s3cret", id, "educator").unwrap();
        let decoded = decode_token("s3cret", &token).unwrap();
        assert_eq!(decoded.user_id, id);
        assert_eq!(decoded.role, "educator");
    }

    #[test]
    fn tokens_signed_with_other_secret_are_rejected() {
        let token = issue_token("one", Uuid::new_v4(), "user").unwrap();
        assert!(matches!(
            decode_token("two", &token),
            Err(AppError::Unauthorized(_))
        ));
        assert!(decode_token("one", "not-a-jwt").is_err());
    }
}
