//! reqwest implementations of the case backend and product catalog.

use async_trait::async_trait;
use casebridge_core::backend::{CaseBackend, ProductCatalog, WriteAck};
use casebridge_core::error::RepositoryError;
use casebridge_core::records::{
    AccountRecord, CaseFilter, CaseListPage, CaseLocation, CaseRecord, CaseUpdate,
    CommentRecord, EntitlementRecord, NewCaseRecord, NewCommentRecord, ProductRecord,
    VersionRecord,
};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::util::{error_body_excerpt, parse_response_body};

struct RawResponse {
    status: StatusCode,
    body: Vec<u8>,
}

impl RawResponse {
    fn decode<T: DeserializeOwned>(&self) -> Result<T, RepositoryError> {
        serde_json::from_slice(&self.body).map_err(|e| RepositoryError::Malformed(e.to_string()))
    }

    fn into_error(self) -> RepositoryError {
        RepositoryError::Status {
            status: self.status.as_u16(),
            body: error_body_excerpt(&self.body),
        }
    }
}

/// Shared request plumbing: path building under a base URL and bearer auth.
struct Endpoint {
    http: reqwest::Client,
    base: Url,
}

impl Endpoint {
    fn new(http: reqwest::Client, base_url: &str) -> Result<Self, String> {
        let base = Url::parse(base_url).map_err(|e| format!("Invalid base URL '{base_url}': {e}"))?;
        if base.cannot_be_a_base() {
            return Err(format!("Invalid base URL '{base_url}': cannot hold a path"));
        }
        Ok(Self { http, base })
    }

    /// Segments are percent-encoded individually, so case numbers and
    /// product names cannot escape their path position.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        token: &str,
        body: Option<&B>,
    ) -> Result<RawResponse, RepositoryError> {
        let url = self.url(segments);
        tracing::debug!(method = %method, path = url.path(), "case api request");
        let mut request = self
            .http
            .request(method, url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request
            .send()
            .await
            .map_err(|e| RepositoryError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| RepositoryError::Transport(e.to_string()))?
            .to_vec();
        Ok(RawResponse { status, body })
    }

    async fn get(&self, segments: &[&str], token: &str) -> Result<RawResponse, RepositoryError> {
        self.send::<Value>(Method::GET, segments, token, None).await
    }
}

pub struct HttpCaseBackend {
    endpoint: Endpoint,
}

impl HttpCaseBackend {
    pub fn new(http: reqwest::Client, base_url: &str) -> Result<Self, String> {
        Ok(Self {
            endpoint: Endpoint::new(http, base_url)?,
        })
    }
}

/// 200 with a case document, 200 with an empty body, 204 or 404.
fn write_ack(response: RawResponse) -> Result<WriteAck, RepositoryError> {
    match response.status {
        StatusCode::NOT_FOUND => Ok(WriteAck::NotFound),
        StatusCode::NO_CONTENT => Ok(WriteAck::Empty),
        status if status.is_success() => match parse_response_body(&response.body) {
            Value::Object(map) if !map.is_empty() => serde_json::from_value(Value::Object(map))
                .map(WriteAck::Record)
                .map_err(|e| RepositoryError::Malformed(e.to_string())),
            _ => Ok(WriteAck::Empty),
        },
        _ => Err(response.into_error()),
    }
}

#[async_trait]
impl CaseBackend for HttpCaseBackend {
    async fn filter(
        &self,
        token: &str,
        filter: &CaseFilter,
    ) -> Result<CaseListPage, RepositoryError> {
        let response = self
            .endpoint
            .send(Method::POST, &["v1", "cases", "filter"], token, Some(filter))
            .await?;
        if response.status != StatusCode::OK {
            return Err(response.into_error());
        }
        if response.body.is_empty() {
            return Ok(CaseListPage::default());
        }
        response.decode()
    }

    async fn get(
        &self,
        token: &str,
        case_number: &str,
    ) -> Result<Option<CaseRecord>, RepositoryError> {
        let response = self
            .endpoint
            .get(&["v1", "cases", case_number], token)
            .await?;
        match response.status {
            StatusCode::OK => response.decode().map(Some),
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(response.into_error()),
        }
    }

    async fn create(
        &self,
        token: &str,
        case: &NewCaseRecord,
    ) -> Result<CaseLocation, RepositoryError> {
        let response = self
            .endpoint
            .send(Method::POST, &["v1", "cases"], token, Some(case))
            .await?;
        match response.status {
            StatusCode::OK | StatusCode::CREATED => response.decode(),
            _ => Err(response.into_error()),
        }
    }

    async fn update(
        &self,
        token: &str,
        case_number: &str,
        update: &CaseUpdate,
    ) -> Result<WriteAck, RepositoryError> {
        let response = self
            .endpoint
            .send(Method::PUT, &["v1", "cases", case_number], token, Some(update))
            .await?;
        write_ack(response)
    }

    async fn add_comment(
        &self,
        token: &str,
        case_number: &str,
        comment: &NewCommentRecord,
    ) -> Result<WriteAck, RepositoryError> {
        let response = self
            .endpoint
            .send(
                Method::POST,
                &["v1", "cases", case_number, "comments"],
                token,
                Some(comment),
            )
            .await?;
        match response.status {
            StatusCode::OK | StatusCode::CREATED => Ok(WriteAck::Empty),
            StatusCode::NOT_FOUND => Ok(WriteAck::NotFound),
            _ => Err(response.into_error()),
        }
    }

    async fn comments(
        &self,
        token: &str,
        case_number: &str,
    ) -> Result<Vec<CommentRecord>, RepositoryError> {
        let response = self
            .endpoint
            .get(&["v1", "cases", case_number, "comments"], token)
            .await?;
        if response.status != StatusCode::OK {
            return Err(response.into_error());
        }
        response.decode()
    }

    async fn current_account(&self, token: &str) -> Result<AccountRecord, RepositoryError> {
        let response = self
            .endpoint
            .get(&["v1", "accounts", "current"], token)
            .await?;
        if response.status != StatusCode::OK {
            return Err(response.into_error());
        }
        response.decode()
    }

    async fn entitlements(&self, token: &str) -> Result<Vec<EntitlementRecord>, RepositoryError> {
        let response = self.endpoint.get(&["v1", "entitlements"], token).await?;
        if response.status != StatusCode::OK {
            return Err(response.into_error());
        }
        // Some deployments wrap the list: {"entitlement": [...]}
        match parse_response_body(&response.body) {
            Value::Null => Ok(Vec::new()),
            Value::Object(mut map) => {
                let inner = map
                    .remove("entitlement")
                    .or_else(|| map.remove("entitlements"))
                    .ok_or_else(|| {
                        RepositoryError::Malformed(
                            "entitlements response has no entitlement list".to_string(),
                        )
                    })?;
                serde_json::from_value(inner).map_err(|e| RepositoryError::Malformed(e.to_string()))
            }
            _ => response.decode(),
        }
    }
}

pub struct HttpProductCatalog {
    endpoint: Endpoint,
}

impl HttpProductCatalog {
    pub fn new(http: reqwest::Client, base_url: &str) -> Result<Self, String> {
        Ok(Self {
            endpoint: Endpoint::new(http, base_url)?,
        })
    }
}

#[async_trait]
impl ProductCatalog for HttpProductCatalog {
    async fn products(&self, token: &str) -> Result<Vec<ProductRecord>, RepositoryError> {
        let response = self.endpoint.get(&["products"], token).await?;
        if response.status != StatusCode::OK {
            return Err(response.into_error());
        }
        response.decode()
    }

    async fn versions(
        &self,
        token: &str,
        product_code: &str,
    ) -> Result<Vec<VersionRecord>, RepositoryError> {
        let response = self
            .endpoint
            .get(&["products", product_code, "versions"], token)
            .await?;
        match response.status {
            StatusCode::OK => response.decode(),
            StatusCode::NOT_FOUND => Ok(Vec::new()),
            _ => Err(response.into_error()),
        }
    }
}
