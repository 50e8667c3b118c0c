//! Request/response types for auth endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub role: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserSummary,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct VerifyResponse {
    pub user: UserProfile,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};

    #[test]
    fn reset_password_request_uses_camel_case() -> Result<()> {
        let decoded: ResetPasswordRequest =
            serde_json::from_str(r#"{"token":"t","newPassword":"secret"}"#)?;
        assert_eq!(decoded.new_password, "secret");
        Ok(())
    }

    #[test]
    fn signup_role_is_optional() -> Result<()> {
        let decoded: SignupRequest =
            serde_json::from_str(r#"{"name":"A","email":"a@b.co","password":"p"}"#)?;
        assert!(decoded.role.is_none());
        Ok(())
    }

    #[test]
    fn auth_response_shape() -> Result<()> {
        let response = AuthResponse {
            token: "jwt".to_string(),
            user: UserSummary {
                id: "1".to_string(),
                name: "Alice".to_string(),
                role: "user".to_string(),
            },
        };
        let value = serde_json::to_value(&response)?;
        let role = value
            .get("user")
            .and_then(|user| user.get("role"))
            .and_then(serde_json::Value::as_str)
            .context("missing role")?;
        assert_eq!(role, "user");
        Ok(())
    }
}
