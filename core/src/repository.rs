//! Case service: the operations tool callers invoke.
//!
//! Each operation checks configuration, then validates its arguments, and
//! only then obtains a credential and talks to the backend. Transport records
//! are converted into domain values on the way out.

use std::sync::Arc;

use crate::backend::{CaseBackend, ProductCatalog, TokenIssuer, WriteAck};
use crate::cases::{CaseComment, FilterCriteria, SupportCase};
use crate::credential::CredentialStore;
use crate::error::{CaseError, RepositoryError};
use crate::records::{
    AccountRecord, CaseFilter, CaseRecord, CaseUpdate, EntitlementRecord, NewCaseRecord,
    NewCommentRecord, ProductRecord, VersionRecord,
};
use crate::search;
use crate::statistics::{self, Statistics};
use crate::vocabulary::{
    priority_to_severity, severity_for, severity_to_priority, status_to_api_status,
};

pub const DEFAULT_MAX_RESULTS: u32 = 100;
pub const DEFAULT_SORT_FIELD: &str = "lastModifiedDate";
pub const DEFAULT_SORT_ORDER: &str = "DESC";

/// Listing parameters sent with every filter request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSettings {
    pub max_results: u32,
    pub sort_field: String,
    pub sort_order: String,
}

impl Default for ListSettings {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            sort_field: DEFAULT_SORT_FIELD.to_string(),
            sort_order: DEFAULT_SORT_ORDER.to_string(),
        }
    }
}

/// Arguments for [`CaseService::create_case`]. Title, description, product
/// and version are required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCase {
    pub title: Option<String>,
    pub description: Option<String>,
    pub product: Option<String>,
    pub version: Option<String>,
    pub priority: Option<String>,
    pub reporter: Option<String>,
}

pub struct CaseService<I> {
    credentials: Arc<CredentialStore<I>>,
    backend: Arc<dyn CaseBackend>,
    catalog: Arc<dyn ProductCatalog>,
    list: ListSettings,
    products: Vec<String>,
}

impl<I: TokenIssuer> CaseService<I> {
    pub fn new(
        credentials: Arc<CredentialStore<I>>,
        backend: Arc<dyn CaseBackend>,
        catalog: Arc<dyn ProductCatalog>,
        list: ListSettings,
        products: Vec<String>,
    ) -> Self {
        Self {
            credentials,
            backend,
            catalog,
            list,
            products,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_configured()
    }

    pub fn credentials(&self) -> &CredentialStore<I> {
        &self.credentials
    }

    pub async fn create_case(&self, new_case: NewCase) -> Result<SupportCase, CaseError> {
        self.ensure_configured()?;
        let title = required(new_case.title.as_deref(), "title", "Title is required.")?;
        let description = required(
            new_case.description.as_deref(),
            "description",
            "Description is required.",
        )?;
        let product = required(
            new_case.product.as_deref(),
            "product",
            "Product is required. Use list_products to see available products.",
        )?;
        let version = required(
            new_case.version.as_deref(),
            "version",
            "Version is required. Use list_versions to see available versions for the product.",
        )?;

        let body = NewCaseRecord {
            summary: title,
            description,
            product,
            version,
            severity: priority_to_severity(new_case.priority.as_deref()).to_string(),
            contact_sso_name: optional(new_case.reporter.as_deref()),
        };

        let token = self.token().await?;
        let location = self.backend.create(&token, &body).await?;
        let case_number = location.case_number().ok_or_else(|| {
            RepositoryError::Malformed("create response did not include a case location".into())
        })?;
        tracing::info!(case_number = %case_number, "support case created");

        match self.backend.get(&token, &case_number).await? {
            Some(record) => Ok(record.into_case()),
            None => Err(RepositoryError::Malformed(format!(
                "case {case_number} was created but could not be read back"
            ))
            .into()),
        }
    }

    /// `Ok(None)` when the backend does not know the case.
    pub async fn get_case(&self, case_number: &str) -> Result<Option<SupportCase>, CaseError> {
        self.ensure_configured()?;
        let case_number = required_case_number(case_number)?;
        let token = self.token().await?;
        Ok(self
            .backend
            .get(&token, &case_number)
            .await?
            .map(CaseRecord::into_case))
    }

    pub async fn list_cases(&self, include_closed: bool) -> Result<Vec<SupportCase>, CaseError> {
        self.ensure_configured()?;
        let filter = self.base_filter(include_closed);
        self.fetch(&filter).await
    }

    /// Backend filter followed by local matching and ordering.
    pub async fn search_cases(
        &self,
        criteria: &FilterCriteria,
    ) -> Result<Vec<SupportCase>, CaseError> {
        self.ensure_configured()?;
        let mut filter = self.base_filter(criteria.include_closed);
        filter.keyword = optional(criteria.keyword.as_deref());
        filter.status = optional(criteria.status.as_deref()).map(|s| status_to_api_status(&s));
        filter.severity = optional(criteria.priority.as_deref())
            .map(|p| severity_for(severity_to_priority(Some(&p))).to_string());
        filter.product = optional(criteria.product.as_deref());

        let cases = self.fetch(&filter).await?;
        Ok(search::search(cases, criteria))
    }

    pub async fn update_status(
        &self,
        case_number: &str,
        status: &str,
    ) -> Result<Option<SupportCase>, CaseError> {
        self.ensure_configured()?;
        let case_number = required_case_number(case_number)?;
        let status = required(Some(status), "status", "Status is required.")?;
        let update = CaseUpdate {
            status: Some(status_to_api_status(&status)),
            ..CaseUpdate::default()
        };
        self.apply_update(&case_number, &update).await
    }

    /// Change the case's primary contact.
    pub async fn reassign(
        &self,
        case_number: &str,
        contact: &str,
    ) -> Result<Option<SupportCase>, CaseError> {
        self.ensure_configured()?;
        let case_number = required_case_number(case_number)?;
        let contact = required(Some(contact), "contact_sso_name", "Contact is required.")?;
        let update = CaseUpdate {
            contact_sso_name: Some(contact),
            ..CaseUpdate::default()
        };
        self.apply_update(&case_number, &update).await
    }

    /// Status first, then contact. The contact change is skipped when the
    /// status update did not find the case.
    pub async fn update_case(
        &self,
        case_number: &str,
        status: Option<&str>,
        contact: Option<&str>,
    ) -> Result<Option<SupportCase>, CaseError> {
        self.ensure_configured()?;
        required_case_number(case_number)?;
        let status = optional(status);
        let contact = optional(contact);
        if status.is_none() && contact.is_none() {
            return Err(CaseError::validation(
                "status",
                "At least one field must be provided: status or contact_sso_name.",
            ));
        }

        let mut result = None;
        if let Some(status) = &status {
            result = self.update_status(case_number, status).await?;
            if result.is_none() {
                return Ok(None);
            }
        }
        if let Some(contact) = &contact {
            result = self.reassign(case_number, contact).await?;
        }
        Ok(result)
    }

    /// Post a comment and return the case as it reads afterwards.
    pub async fn add_comment(
        &self,
        case_number: &str,
        content: &str,
    ) -> Result<Option<SupportCase>, CaseError> {
        self.ensure_configured()?;
        let case_number = required_case_number(case_number)?;
        let comment_body = required(Some(content), "comment", "Comment text is required.")?;

        let token = self.token().await?;
        let ack = self
            .backend
            .add_comment(&token, &case_number, &NewCommentRecord { comment_body })
            .await?;
        if ack == WriteAck::NotFound {
            return Ok(None);
        }
        tracing::info!(case_number = %case_number, "comment added");
        Ok(self
            .backend
            .get(&token, &case_number)
            .await?
            .map(CaseRecord::into_case))
    }

    pub async fn get_comments(&self, case_number: &str) -> Result<Vec<CaseComment>, CaseError> {
        self.ensure_configured()?;
        let case_number = required_case_number(case_number)?;
        let token = self.token().await?;
        Ok(self
            .backend
            .comments(&token, &case_number)
            .await?
            .into_iter()
            .map(|c| c.into_comment())
            .collect())
    }

    /// Counts over open cases. Never fails: any error becomes the marker.
    pub async fn statistics(&self) -> Statistics {
        match self.list_cases(false).await {
            Ok(cases) => statistics::aggregate(&cases),
            Err(err) => {
                tracing::warn!(error = %err, "statistics unavailable");
                Statistics::unavailable(err.to_string())
            }
        }
    }

    /// Product names from local configuration.
    pub fn products(&self) -> &[String] {
        &self.products
    }

    pub async fn account_info(&self) -> Result<AccountRecord, CaseError> {
        self.ensure_configured()?;
        let token = self.token().await?;
        Ok(self.backend.current_account(&token).await?)
    }

    pub async fn entitlements(&self) -> Result<Vec<EntitlementRecord>, CaseError> {
        self.ensure_configured()?;
        let token = self.token().await?;
        Ok(self.backend.entitlements(&token).await?)
    }

    /// Active catalog products ordered by product line, then name.
    pub async fn catalog_products(&self) -> Result<Vec<ProductRecord>, CaseError> {
        self.ensure_configured()?;
        let token = self.token().await?;
        let mut products: Vec<ProductRecord> = self
            .catalog
            .products(&token)
            .await?
            .into_iter()
            .filter(|p| p.active == Some(true))
            .collect();
        products.sort_by(|a, b| {
            let line = |p: &ProductRecord| p.line.clone().unwrap_or_default();
            line(a).cmp(&line(b)).then_with(|| a.name.cmp(&b.name))
        });
        Ok(products)
    }

    pub async fn catalog_versions(&self, product_code: &str) -> Result<Vec<VersionRecord>, CaseError> {
        self.ensure_configured()?;
        let Some(product_code) = optional(Some(product_code)) else {
            return Ok(Vec::new());
        };
        let token = self.token().await?;
        Ok(self.catalog.versions(&token, &product_code).await?)
    }

    fn ensure_configured(&self) -> Result<(), CaseError> {
        if self.credentials.is_configured() {
            Ok(())
        } else {
            Err(CaseError::NotConfigured)
        }
    }

    async fn token(&self) -> Result<String, CaseError> {
        Ok(self.credentials.get_token().await?.token().to_string())
    }

    fn base_filter(&self, include_closed: bool) -> CaseFilter {
        CaseFilter {
            max_results: self.list.max_results,
            include_closed: Some(include_closed),
            sort_field: Some(self.list.sort_field.clone()),
            sort_order: Some(self.list.sort_order.clone()),
            ..CaseFilter::default()
        }
    }

    async fn fetch(&self, filter: &CaseFilter) -> Result<Vec<SupportCase>, CaseError> {
        let token = self.token().await?;
        let page = self.backend.filter(&token, filter).await?;
        tracing::debug!(
            returned = page.cases.len(),
            total = page.total_count.unwrap_or_default(),
            "case filter answered"
        );
        Ok(page.cases.into_iter().map(CaseRecord::into_case).collect())
    }

    async fn apply_update(
        &self,
        case_number: &str,
        update: &CaseUpdate,
    ) -> Result<Option<SupportCase>, CaseError> {
        let token = self.token().await?;
        match self.backend.update(&token, case_number, update).await? {
            WriteAck::Record(record) => Ok(Some(record.into_case())),
            WriteAck::Empty => Ok(self
                .backend
                .get(&token, case_number)
                .await?
                .map(CaseRecord::into_case)),
            WriteAck::NotFound => Ok(None),
        }
    }
}

fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn required(
    value: Option<&str>,
    field: &'static str,
    message: &str,
) -> Result<String, CaseError> {
    optional(value).ok_or_else(|| CaseError::validation(field, message))
}

fn required_case_number(case_number: &str) -> Result<String, CaseError> {
    required(Some(case_number), "case_number", "Case number is required.")
}
