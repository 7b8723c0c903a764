//! Collaborator seams: the token endpoint, the case backend and the product
//! catalog. The runtime crate provides HTTP implementations; tests provide
//! in-memory doubles.

use async_trait::async_trait;

use crate::error::{AuthError, RepositoryError};
use crate::records::{
    AccountRecord, CaseFilter, CaseListPage, CaseLocation, CaseRecord, CaseUpdate,
    CommentRecord, EntitlementRecord, NewCaseRecord, NewCommentRecord, ProductRecord,
    VersionRecord,
};

/// Access token answered by the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub access_token: String,
    /// Lifetime in seconds as reported upstream.
    pub expires_in: u64,
}

#[async_trait]
pub trait TokenIssuer: Send + Sync {
    /// Exchange the long-lived refresh secret for a short-lived access token.
    async fn issue_token(
        &self,
        client_id: &str,
        refresh_secret: &str,
    ) -> Result<IssuedToken, AuthError>;
}

/// Backend answer to a write that may or may not echo the case back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteAck {
    /// The backend returned the updated case document.
    Record(CaseRecord),
    /// Accepted with an empty body; the caller re-fetches.
    Empty,
    NotFound,
}

#[async_trait]
pub trait CaseBackend: Send + Sync {
    async fn filter(&self, token: &str, filter: &CaseFilter)
        -> Result<CaseListPage, RepositoryError>;

    /// `Ok(None)` when the backend does not know the case.
    async fn get(&self, token: &str, case_number: &str)
        -> Result<Option<CaseRecord>, RepositoryError>;

    async fn create(&self, token: &str, case: &NewCaseRecord)
        -> Result<CaseLocation, RepositoryError>;

    async fn update(
        &self,
        token: &str,
        case_number: &str,
        update: &CaseUpdate,
    ) -> Result<WriteAck, RepositoryError>;

    async fn add_comment(
        &self,
        token: &str,
        case_number: &str,
        comment: &NewCommentRecord,
    ) -> Result<WriteAck, RepositoryError>;

    async fn comments(&self, token: &str, case_number: &str)
        -> Result<Vec<CommentRecord>, RepositoryError>;

    async fn current_account(&self, token: &str) -> Result<AccountRecord, RepositoryError>;

    async fn entitlements(&self, token: &str)
        -> Result<Vec<EntitlementRecord>, RepositoryError>;
}

#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn products(&self, token: &str) -> Result<Vec<ProductRecord>, RepositoryError>;

    /// Empty when the catalog does not know the product code.
    async fn versions(&self, token: &str, product_code: &str)
        -> Result<Vec<VersionRecord>, RepositoryError>;
}
