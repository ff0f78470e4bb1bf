use serde::{Deserialize, Serialize};

/// Account role as issued by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub enum Role {
    #[serde(rename = "USER")]
    User,
    #[serde(rename = "ADMIN")]
    Admin,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "USER"),
            Role::Admin => write!(f, "ADMIN"),
        }
    }
}

/// The authenticated user's identity snapshot, captured at login or
/// registration time. May go stale until the next authentication; the
/// backend does not push identity updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct Principal {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
}

/// Body of `POST /auth/login`. The backend accepts either a username or an
/// email; only one of the two is sent.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub password: String,
}

impl LoginRequest {
    /// Build a login request from a single identifier, sent as an email
    /// when it contains `@` and as a username otherwise.
    pub fn for_identifier(identifier: &str, password: &str) -> Self {
        if identifier.contains('@') {
            Self {
                username: None,
                email: Some(identifier.to_string()),
                password: password.to_string(),
            }
        } else {
            Self {
                username: Some(identifier.to_string()),
                email: None,
                password: password.to_string(),
            }
        }
    }
}

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Success response of both authentication endpoints. Registration
/// returns a usable credential as well, so a fresh account is logged in
/// without a second round-trip.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl AuthResponse {
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_auth_response_from_backend_json() {
        let json = r#"{
            "id": 7,
            "username": "maria",
            "email": "maria@example.com",
            "role": "ADMIN",
            "accessToken": "aaa.bbb.ccc",
            "refreshToken": null
        }"#;

        let response: AuthResponse = serde_json::from_str(json).expect("valid auth response");
        assert_eq!(response.id, 7);
        assert_eq!(response.role, Role::Admin);
        assert!(response.role.is_admin());
        assert_eq!(response.access_token, "aaa.bbb.ccc");
        assert!(response.refresh_token.is_none());

        let principal = response.principal();
        assert_eq!(principal.username, "maria");
        assert_eq!(principal.email, "maria@example.com");
    }

    #[test]
    fn login_request_picks_email_or_username() {
        let by_email = LoginRequest::for_identifier("maria@example.com", "pw");
        assert_eq!(by_email.email.as_deref(), Some("maria@example.com"));
        assert!(by_email.username.is_none());

        let by_name = LoginRequest::for_identifier("maria", "pw");
        assert_eq!(by_name.username.as_deref(), Some("maria"));
        assert!(by_name.email.is_none());

        // The unused identifier field stays off the wire entirely.
        let body = serde_json::to_value(&by_name).expect("serializable");
        assert!(body.get("email").is_none());
    }
}
