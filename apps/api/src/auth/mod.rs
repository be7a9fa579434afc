pub mod handlers;
pub mod password;
pub mod token;

use std::ops::Deref;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::User;
use crate::state::AppState;

/// The authenticated, active user behind a request.
///
/// Resolved from `Authorization: Bearer <jwt>`. Missing or invalid tokens and
/// unknown users are 401; deactivated users are rejected with 400.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.0.is_admin() {
            Ok(())
        } else {
            Err(AppError::forbidden())
        }
    }

    /// Admins may touch any record; employees only records pointing at themselves.
    pub fn require_admin_or(&self, owner_id: Option<Uuid>) -> Result<(), AppError> {
        if self.0.is_admin() || owner_id == Some(self.0.id) {
            Ok(())
        } else {
            Err(AppError::forbidden())
        }
    }

    /// `None` for admins (no scoping), the caller's id otherwise.
    pub fn scope(&self) -> Option<Uuid> {
        if self.0.is_admin() {
            None
        } else {
            Some(self.0.id)
        }
    }
}

impl Deref for CurrentUser {
    type Target = User;

    fn deref(&self) -> &User {
        &self.0
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = bearer_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        let claims = token::decode_token(token, &state.config.jwt_secret).map_err(|e| {
            debug!("Rejected bearer token: {e}");
            AppError::Unauthorized
        })?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::Unauthorized)?;

        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&state.db)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !user.is_active {
            return Err(AppError::InactiveUser);
        }
        Ok(CurrentUser(user))
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::{test_user, Role};
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn test_employee_access_rules() {
        let employee = CurrentUser(test_user(Role::Employee));
        assert!(employee.require_admin().is_err());
        assert!(employee.require_admin_or(Some(employee.id)).is_ok());
        assert!(employee.require_admin_or(Some(Uuid::new_v4())).is_err());
        assert!(employee.require_admin_or(None).is_err());
        assert_eq!(employee.scope(), Some(employee.id));
    }

    #[test]
    fn test_admin_access_rules() {
        let admin = CurrentUser(test_user(Role::Admin));
        assert!(admin.require_admin().is_ok());
        assert!(admin.require_admin_or(Some(Uuid::new_v4())).is_ok());
        assert_eq!(admin.scope(), None);
    }
}
