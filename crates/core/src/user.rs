//! Users and authentication payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Email, Role, UserId};

/// A registered user as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Successful login or registration: a bearer token and its owner.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// Credentials for `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: Email,
    pub password: String,
}

/// Body for `POST /auth/register`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: Email,
    pub password: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_defaults_to_customer_role() {
        let user: User =
            serde_json::from_str(r#"{"id":"u1","name":"Ada","email":"ada@example.com"}"#).unwrap();
        assert_eq!(user.role, Role::Customer);
    }

    #[test]
    fn test_auth_response_parses() {
        let json = r#"{"token":"t0k","user":{"id":"u9","name":"Root","email":"root@example.com","role":"admin"}}"#;
        let auth: AuthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(auth.token, "t0k");
        assert!(auth.user.role.is_admin());
    }
}
