use std::sync::Arc;
use std::time::Duration;

use casebridge_core::credential::{CredentialStore, DEFAULT_CLIENT_ID};
use casebridge_core::repository::{
    CaseService, DEFAULT_MAX_RESULTS, DEFAULT_SORT_FIELD, DEFAULT_SORT_ORDER, ListSettings,
};
use clap::Args;

use crate::http_backend::{HttpCaseBackend, HttpProductCatalog};
use crate::sso::SsoTokenIssuer;
use crate::util::client;

pub const DEFAULT_SSO_TOKEN_URL: &str =
    "https://sso.redhat.com/auth/realms/redhat-external/protocol/openid-connect/token";
pub const DEFAULT_CASES_BASE_URL: &str = "https://api.access.redhat.com/support";
pub const DEFAULT_CATALOG_BASE_URL: &str = "https://api.access.redhat.com/hydra/rest";

/// Connection settings shared by `serve` and `diagnose`.
#[derive(Args, Clone, Debug)]
pub struct ServiceArgs {
    /// Offline (refresh) token generated at https://access.redhat.com/management/api
    #[arg(long, env = "CASEBRIDGE_OFFLINE_TOKEN", hide_env_values = true)]
    pub offline_token: Option<String>,
    /// SSO token endpoint used to exchange the offline token
    #[arg(long, env = "CASEBRIDGE_SSO_TOKEN_URL", default_value = DEFAULT_SSO_TOKEN_URL)]
    pub sso_token_url: String,
    /// OAuth client id sent with the refresh grant
    #[arg(long, env = "CASEBRIDGE_SSO_CLIENT_ID", default_value = DEFAULT_CLIENT_ID)]
    pub sso_client_id: String,
    /// Seconds before expiry at which the access token is renewed
    #[arg(long, env = "CASEBRIDGE_TOKEN_RENEWAL_BUFFER_SECS", default_value_t = 60)]
    pub token_renewal_buffer_secs: u64,
    /// Case API base URL
    #[arg(long, env = "CASEBRIDGE_CASES_BASE_URL", default_value = DEFAULT_CASES_BASE_URL)]
    pub cases_base_url: String,
    /// Product catalog base URL
    #[arg(long, env = "CASEBRIDGE_CATALOG_BASE_URL", default_value = DEFAULT_CATALOG_BASE_URL)]
    pub catalog_base_url: String,
    /// Maximum cases requested per listing
    #[arg(long, env = "CASEBRIDGE_MAX_RESULTS", default_value_t = DEFAULT_MAX_RESULTS)]
    pub max_results: u32,
    #[arg(long, env = "CASEBRIDGE_SORT_FIELD", default_value = DEFAULT_SORT_FIELD)]
    pub sort_field: String,
    #[arg(long, env = "CASEBRIDGE_SORT_ORDER", default_value = DEFAULT_SORT_ORDER)]
    pub sort_order: String,
    #[arg(long, env = "CASEBRIDGE_CONNECT_TIMEOUT_SECS", default_value_t = 30)]
    pub connect_timeout_secs: u64,
    #[arg(long, env = "CASEBRIDGE_REQUEST_TIMEOUT_SECS", default_value_t = 60)]
    pub request_timeout_secs: u64,
    /// Product names offered to callers (comma separated)
    #[arg(long, env = "CASEBRIDGE_PRODUCTS", value_delimiter = ',')]
    pub products: Vec<String>,
}

impl Default for ServiceArgs {
    fn default() -> Self {
        Self {
            offline_token: None,
            sso_token_url: DEFAULT_SSO_TOKEN_URL.to_string(),
            sso_client_id: DEFAULT_CLIENT_ID.to_string(),
            token_renewal_buffer_secs: 60,
            cases_base_url: DEFAULT_CASES_BASE_URL.to_string(),
            catalog_base_url: DEFAULT_CATALOG_BASE_URL.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
            sort_field: DEFAULT_SORT_FIELD.to_string(),
            sort_order: DEFAULT_SORT_ORDER.to_string(),
            connect_timeout_secs: 30,
            request_timeout_secs: 60,
            products: Vec::new(),
        }
    }
}

impl ServiceArgs {
    pub fn list_settings(&self) -> ListSettings {
        ListSettings {
            max_results: self.max_results,
            sort_field: self.sort_field.clone(),
            sort_order: self.sort_order.clone(),
        }
    }

    pub fn configured_products(&self) -> Vec<String> {
        self.products
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Wire the HTTP collaborators into a case service. One reqwest client
    /// is shared by the token endpoint, case API and catalog.
    pub fn build_service(&self) -> Result<CaseService<SsoTokenIssuer>, String> {
        let http = client(
            Duration::from_secs(self.connect_timeout_secs),
            Duration::from_secs(self.request_timeout_secs),
        )
        .map_err(|e| format!("Failed to build HTTP client: {e}"))?;

        let issuer = SsoTokenIssuer::new(http.clone(), &self.sso_token_url)?;
        let backend = HttpCaseBackend::new(http.clone(), &self.cases_base_url)?;
        let catalog = HttpProductCatalog::new(http, &self.catalog_base_url)?;

        let credentials = CredentialStore::new(
            issuer,
            self.sso_client_id.clone(),
            self.offline_token.clone(),
            Duration::from_secs(self.token_renewal_buffer_secs),
        );
        Ok(CaseService::new(
            Arc::new(credentials),
            Arc::new(backend),
            Arc::new(catalog),
            self.list_settings(),
            self.configured_products(),
        ))
    }
}
