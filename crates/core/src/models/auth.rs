//! Login request/response DTOs.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::roles::Role;

#[derive(Debug, Clone, Serialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// Token produced by the CAPTCHA widget, when one is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captcha_token: Option<String>,
}

/// Body returned by `auth/login/`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(alias = "access")]
    pub token: String,
    #[serde(default)]
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_access_alias() {
        let resp: LoginResponse =
            serde_json::from_value(serde_json::json!({ "access": "t0k", "role": "admin" }))
                .unwrap();
        assert_eq!(resp.token, "t0k");
        assert_eq!(resp.role, Role::Admin);
    }

    #[test]
    fn captcha_token_omitted_when_absent() {
        let req = LoginRequest {
            email: "a@b.co".into(),
            password: "pw".into(),
            captcha_token: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("captcha_token").is_none());
        assert!(req.validate().is_ok());
    }
}
