// Sign-in, two-factor verification, sign-out and profile

use crate::error::{ErrorKind, HttpError, Result};
use crate::http_client::{GatewayClient, GetOptions, RequestConfig};
use crate::models::{AuthProfile, SignInRequest, SignInResponse, Verify2faRequest, Verify2faResponse};

const AUTH_SIGNIN_PATH: &str = "/auth/signin";
const AUTH_VERIFY_2FA_PATH: &str = "/auth/signin/verify-2fa";
const AUTH_PROFILE_PATH: &str = "/auth/profile";

#[derive(Debug, Clone)]
pub struct AuthService {
    client: GatewayClient,
}

impl AuthService {
    pub fn new(client: GatewayClient) -> Self {
        Self { client }
    }

    /// First sign-in step; stores nothing, the backend normally asks for a 2FA code next
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SignInResponse> {
        let payload = SignInRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };

        let response = self
            .client
            .post::<SignInResponse, _>(
                AUTH_SIGNIN_PATH,
                Some(&payload),
                RequestConfig::new(),
            )
            .await?;

        let data = response.into_data();
        tracing::info!(
            requires_two_factor = data.requires_two_factor(),
            "Sign-in accepted"
        );
        Ok(data)
    }

    /// Second sign-in step; persists the issued tokens when the backend returns them
    pub async fn verify_2fa(&self, email: &str, code: &str) -> Result<Verify2faResponse> {
        let payload = Verify2faRequest {
            email: email.trim().to_string(),
            code: code.trim().to_string(),
        };

        let response = self
            .client
            .post::<Verify2faResponse, _>(
                AUTH_VERIFY_2FA_PATH,
                Some(&payload),
                RequestConfig::new(),
            )
            .await?;
        let data = response.into_data();

        match data.access_token.as_deref().filter(|t| !t.is_empty()) {
            Some(access_token) => {
                let refresh_token = data.refresh_token.as_deref().unwrap_or_default();
                self.client
                    .credentials()
                    .set_tokens(access_token, refresh_token)
                    .await
                    .map_err(|e| {
                        tracing::error!(error = %e, "Failed to store credentials");
                        HttpError::new(
                            ErrorKind::Unknown,
                            format!("Signed in, but the session could not be saved: {}", e),
                            0,
                        )
                    })?;
                tracing::info!("Two-factor verification succeeded, session stored");
            }
            None => {
                tracing::warn!("Two-factor verification returned no access token");
            }
        }

        Ok(data)
    }

    /// Forget the stored session; succeeds when already signed out
    pub async fn sign_out(&self) -> anyhow::Result<()> {
        self.client.credentials().clear().await?;
        tracing::info!("Signed out");
        Ok(())
    }

    pub async fn profile(&self) -> Result<AuthProfile> {
        let response = self
            .client
            .get::<AuthProfile>(AUTH_PROFILE_PATH, GetOptions::new())
            .await?;
        Ok(response.into_data())
    }
}
