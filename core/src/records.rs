//! Transport records exchanged with the case backend and product catalog.
//!
//! These mirror the remote JSON documents field for field. Unknown fields are
//! ignored on read and absent optionals are omitted on write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cases::{CaseComment, SupportCase};
use crate::vocabulary::{api_status_to_status, severity_to_priority};

pub const SELF_SUPPORTED: &str = "SELF-SUPPORTED";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseRecord {
    #[serde(default)]
    pub case_number: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default, rename = "contactSSOName")]
    pub contact_sso_name: Option<String>,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_modified_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_closed: Option<bool>,
    #[serde(default)]
    pub comments: Vec<CommentRecord>,
}

impl CaseRecord {
    /// Domain view of this record. Status and severity go through the
    /// vocabulary fallbacks, so this never fails.
    pub fn into_case(self) -> SupportCase {
        SupportCase {
            id: self.case_number.unwrap_or_default(),
            title: self.summary.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            product: self.product,
            version: self.version,
            reporter: self.contact_sso_name,
            assignee: self.contact_name,
            status: api_status_to_status(self.status.as_deref()),
            priority: severity_to_priority(self.severity.as_deref()),
            created_at: self.created_date,
            updated_at: self.last_modified_date,
            comments: self
                .comments
                .into_iter()
                .map(CommentRecord::into_comment)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub comment_body: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_draft: Option<bool>,
}

impl CommentRecord {
    pub fn into_comment(self) -> CaseComment {
        CaseComment {
            id: self.id,
            author: self.created_by,
            content: self.comment_body.unwrap_or_default(),
            created_at: self.created_date,
            is_internal: self.is_draft.unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseListPage {
    #[serde(default)]
    pub total_count: Option<u64>,
    #[serde(default)]
    pub cases: Vec<CaseRecord>,
}

/// Body of `POST /v1/cases/filter`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseFilter {
    pub max_results: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_closed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCaseRecord {
    pub summary: String,
    pub description: String,
    pub product: String,
    pub version: String,
    pub severity: String,
    #[serde(rename = "contactSSOName", skip_serializing_if = "Option::is_none")]
    pub contact_sso_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "contactSSOName", skip_serializing_if = "Option::is_none")]
    pub contact_sso_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCommentRecord {
    pub comment_body: String,
}

/// Answer to `POST /v1/cases`: the new case's URI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CaseLocation {
    #[serde(default)]
    pub location: Vec<String>,
}

impl CaseLocation {
    /// Case number taken from the last path segment of the first location.
    pub fn case_number(&self) -> Option<String> {
        let uri = self.location.first()?;
        uri.trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub account_alias: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub super_region: Option<String>,
    #[serde(default)]
    pub identifying_address_country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub service_level: Option<String>,
    #[serde(default)]
    pub support_level: Option<String>,
}

impl EntitlementRecord {
    pub fn allows_case_creation(&self) -> bool {
        self.support_level
            .as_deref()
            .is_some_and(|level| !level.eq_ignore_ascii_case(SELF_SUPPORTED))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub line: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_default: Option<bool>,
}
