use serde::{Deserialize, Serialize};

// ==================================================================================================
// Models for /auth/signin
// ==================================================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_two_factor: Option<bool>,
}

impl SignInResponse {
    pub fn requires_two_factor(&self) -> bool {
        self.requires_two_factor.unwrap_or(false)
    }
}

// ==================================================================================================
// Models for /auth/signin/verify-2fa
// ==================================================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verify2faRequest {
    pub email: String,
    pub code: String,
}

#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verify2faResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl std::fmt::Debug for Verify2faResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Verify2faResponse")
            .field("access_token", &self.access_token.as_deref().map(crate::auth::redact))
            .field("refresh_token", &self.refresh_token.as_deref().map(crate::auth::redact))
            .field("message", &self.message)
            .finish()
    }
}

// ==================================================================================================
// Models for /auth/profile
// ==================================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthProfile {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl AuthProfile {
    /// Name to greet the customer with: full name, then first/last, then email
    pub fn display_name(&self) -> String {
        if let Some(name) = non_blank(self.name.as_deref()) {
            return name.to_string();
        }

        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .filter_map(non_blank)
            .collect();
        if !parts.is_empty() {
            return parts.join(" ");
        }

        non_blank(self.email.as_deref())
            .unwrap_or("Customer")
            .to_string()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(json: serde_json::Value) -> AuthProfile {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_sign_in_response_two_factor() {
        let resp: SignInResponse =
            serde_json::from_str(r#"{"message":"OTP sent","requiresTwoFactor":true}"#).unwrap();
        assert!(resp.requires_two_factor());

        let resp: SignInResponse = serde_json::from_str("{}").unwrap();
        assert!(!resp.requires_two_factor());
    }

    #[test]
    fn test_verify_request_wire_shape() {
        let req = Verify2faRequest {
            email: "customer@example.com".to_string(),
            code: "123456".to_string(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["email"], "customer@example.com");
        assert_eq!(json["code"], "123456");
    }

    #[test]
    fn test_verify_response_debug_redacts() {
        let resp: Verify2faResponse =
            serde_json::from_str(r#"{"accessToken":"supersecrettoken","refreshToken":"r"}"#)
                .unwrap();
        assert_eq!(resp.access_token.as_deref(), Some("supersecrettoken"));
        assert!(!format!("{:?}", resp).contains("supersecrettoken"));
    }

    #[test]
    fn test_profile_ignores_unknown_fields() {
        let p = profile(serde_json::json!({
            "id": "u1",
            "email": "a@b.c",
            "accountType": "customer"
        }));
        assert_eq!(p.id, "u1");
        assert_eq!(p.email.as_deref(), Some("a@b.c"));
    }

    #[test]
    fn test_display_name_fallbacks() {
        let p = profile(serde_json::json!({"id": "u1", "name": "Juan Dela Cruz"}));
        assert_eq!(p.display_name(), "Juan Dela Cruz");

        let p = profile(serde_json::json!({"id": "u1", "firstName": "Juan", "lastName": " "}));
        assert_eq!(p.display_name(), "Juan");

        let p = profile(serde_json::json!({"id": "u1", "email": "juan@example.com"}));
        assert_eq!(p.display_name(), "juan@example.com");

        let p = profile(serde_json::json!({"id": "u1"}));
        assert_eq!(p.display_name(), "Customer");
    }
}
