use async_trait::async_trait;
use casebridge_core::backend::{IssuedToken, TokenIssuer};
use casebridge_core::error::AuthError;
use serde::Deserialize;
use url::Url;

use crate::util::error_body_excerpt;

/// Refresh-token grant against an OpenID Connect token endpoint.
pub struct SsoTokenIssuer {
    http: reqwest::Client,
    token_url: Url,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

impl SsoTokenIssuer {
    pub fn new(http: reqwest::Client, token_url: &str) -> Result<Self, String> {
        let token_url =
            Url::parse(token_url).map_err(|e| format!("Invalid SSO token URL '{token_url}': {e}"))?;
        Ok(Self { http, token_url })
    }
}

#[async_trait]
impl TokenIssuer for SsoTokenIssuer {
    async fn issue_token(
        &self,
        client_id: &str,
        refresh_secret: &str,
    ) -> Result<IssuedToken, AuthError> {
        let response = self
            .http
            .post(self.token_url.clone())
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", client_id),
                ("refresh_token", refresh_secret),
            ])
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body: error_body_excerpt(&bytes),
            });
        }

        let token: TokenResponse =
            serde_json::from_slice(&bytes).map_err(|e| AuthError::Malformed(e.to_string()))?;
        Ok(IssuedToken {
            access_token: token.access_token,
            expires_in: token.expires_in,
        })
    }
}
