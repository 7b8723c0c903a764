use thiserror::Error;

/// Failure to obtain a bearer credential from the token endpoint.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// No usable refresh secret is configured; nothing was sent upstream.
    #[error("offline token is not configured")]
    NotConfigured,
    /// The token endpoint answered with a non-success status.
    #[error("token endpoint returned HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
    /// The token endpoint could not be reached (connect failure, timeout).
    #[error("token endpoint unreachable: {0}")]
    Transport(String),
    /// The token endpoint answered 200 but the body lacked usable fields.
    #[error("token response malformed: {0}")]
    Malformed(String),
}

impl AuthError {
    pub fn status(&self) -> Option<u16> {
        match self {
            AuthError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failure talking to the case backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    /// Non-2xx answer other than the not-found cases the caller maps to `None`.
    #[error("case backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("case backend unreachable: {0}")]
    Transport(String),
    #[error("case backend response malformed: {0}")]
    Malformed(String),
}

impl RepositoryError {
    pub fn status(&self) -> Option<u16> {
        match self {
            RepositoryError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Error surfaced by the case service to tool-facing callers.
///
/// Not-found is never an error: lookups return `Option::None` instead.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CaseError {
    /// Reported before any network access.
    #[error("service is not configured: set CASEBRIDGE_OFFLINE_TOKEN")]
    NotConfigured,
    /// A required argument is missing or blank; reported before any network access.
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("authentication failed: {0}")]
    Authentication(#[from] AuthError),
    #[error("{0}")]
    Repository(#[from] RepositoryError),
}

impl CaseError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        CaseError::Validation {
            field,
            message: message.into(),
        }
    }

    /// Machine-readable code for agents.
    pub fn code(&self) -> &'static str {
        match self {
            CaseError::NotConfigured => codes::NOT_CONFIGURED,
            CaseError::Validation { .. } => codes::VALIDATION_FAILED,
            CaseError::Authentication(AuthError::NotConfigured) => codes::NOT_CONFIGURED,
            CaseError::Authentication(_) => codes::AUTHENTICATION_FAILED,
            CaseError::Repository(_) => codes::UPSTREAM_ERROR,
        }
    }

    /// Upstream HTTP status, when the failure carried one.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            CaseError::Authentication(err) => err.status(),
            CaseError::Repository(err) => err.status(),
            _ => None,
        }
    }

    pub fn field(&self) -> Option<&'static str> {
        match self {
            CaseError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Error codes used across the tool surface
pub mod codes {
    pub const NOT_CONFIGURED: &str = "not_configured";
    pub const VALIDATION_FAILED: &str = "validation_failed";
    pub const NOT_FOUND: &str = "not_found";
    pub const AUTHENTICATION_FAILED: &str = "authentication_failed";
    pub const UPSTREAM_ERROR: &str = "upstream_error";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_error_kind() {
        assert_eq!(CaseError::NotConfigured.code(), codes::NOT_CONFIGURED);
        assert_eq!(
            CaseError::validation("title", "Title is required.").code(),
            codes::VALIDATION_FAILED
        );
        assert_eq!(
            CaseError::from(AuthError::NotConfigured).code(),
            codes::NOT_CONFIGURED
        );
        assert_eq!(
            CaseError::from(AuthError::Transport("timeout".into())).code(),
            codes::AUTHENTICATION_FAILED
        );
        assert_eq!(
            CaseError::from(RepositoryError::Malformed("eof".into())).code(),
            codes::UPSTREAM_ERROR
        );
    }

    #[test]
    fn upstream_status_is_carried_through() {
        let err = CaseError::from(RepositoryError::Status {
            status: 503,
            body: "maintenance".into(),
        });
        assert_eq!(err.upstream_status(), Some(503));
        assert!(err.to_string().contains("503"));

        let err = CaseError::from(AuthError::Rejected {
            status: 400,
            body: "invalid_grant".into(),
        });
        assert_eq!(err.upstream_status(), Some(400));
        assert!(err.to_string().contains("invalid_grant"));
    }
}
