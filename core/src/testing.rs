//! In-memory collaborators shared by the unit tests.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::backend::{CaseBackend, IssuedToken, ProductCatalog, TokenIssuer, WriteAck};
use crate::error::{AuthError, RepositoryError};
use crate::records::{
    AccountRecord, CaseFilter, CaseListPage, CaseLocation, CaseRecord, CaseUpdate,
    CommentRecord, EntitlementRecord, NewCaseRecord, NewCommentRecord, ProductRecord,
    VersionRecord,
};

pub struct ScriptedIssuer {
    expires_in: u64,
    delay: Duration,
    calls: Arc<AtomicUsize>,
    failures: Mutex<VecDeque<AuthError>>,
}

impl ScriptedIssuer {
    pub fn new(expires_in: u64) -> Self {
        Self {
            expires_in,
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
            failures: Mutex::new(VecDeque::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn fail_next(self, err: AuthError) -> Self {
        self.push_failure(err);
        self
    }

    pub fn push_failure(&self, err: AuthError) {
        self.failures.lock().unwrap().push_back(err);
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    pub fn count(calls: &Arc<AtomicUsize>) -> usize {
        calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenIssuer for ScriptedIssuer {
    async fn issue_token(
        &self,
        _client_id: &str,
        _refresh_secret: &str,
    ) -> Result<IssuedToken, AuthError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(err) = self.failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        Ok(IssuedToken {
            access_token: format!("token-{n}"),
            expires_in: self.expires_in,
        })
    }
}

/// Case backend and product catalog backed by maps. Every trait call is
/// counted so tests can assert that validation happened before any I/O.
#[derive(Default)]
pub struct FakeBackend {
    pub cases: Mutex<BTreeMap<String, CaseRecord>>,
    pub filters: Mutex<Vec<CaseFilter>>,
    pub created: Mutex<Vec<NewCaseRecord>>,
    pub updates: Mutex<Vec<(String, CaseUpdate)>>,
    pub comments_added: Mutex<Vec<(String, String)>>,
    pub echo_updates: bool,
    pub fail_with: Option<RepositoryError>,
    pub account: AccountRecord,
    pub entitlements: Vec<EntitlementRecord>,
    pub products: Vec<ProductRecord>,
    pub versions: BTreeMap<String, Vec<VersionRecord>>,
    pub call_count: AtomicUsize,
}

impl FakeBackend {
    pub fn with_cases(cases: impl IntoIterator<Item = CaseRecord>) -> Self {
        let backend = Self::default();
        {
            let mut map = backend.cases.lock().unwrap();
            for case in cases {
                map.insert(case.case_number.clone().unwrap_or_default(), case);
            }
        }
        backend
    }

    pub fn failing(err: RepositoryError) -> Self {
        Self {
            fail_with: Some(err),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    fn enter(&self) -> Result<(), RepositoryError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        match &self.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

pub fn case_record(number: &str, status: &str, severity: &str) -> CaseRecord {
    CaseRecord {
        case_number: Some(number.to_string()),
        summary: Some(format!("case {number}")),
        description: Some("details".to_string()),
        status: Some(status.to_string()),
        severity: Some(severity.to_string()),
        ..CaseRecord::default()
    }
}

#[async_trait]
impl CaseBackend for FakeBackend {
    async fn filter(
        &self,
        _token: &str,
        filter: &CaseFilter,
    ) -> Result<CaseListPage, RepositoryError> {
        self.enter()?;
        self.filters.lock().unwrap().push(filter.clone());
        let cases: Vec<CaseRecord> = self
            .cases
            .lock()
            .unwrap()
            .values()
            .filter(|case| {
                filter.include_closed.unwrap_or(false)
                    || !case
                        .status
                        .as_deref()
                        .is_some_and(|s| s.eq_ignore_ascii_case("closed"))
            })
            .cloned()
            .collect();
        Ok(CaseListPage {
            total_count: Some(cases.len() as u64),
            cases,
        })
    }

    async fn get(
        &self,
        _token: &str,
        case_number: &str,
    ) -> Result<Option<CaseRecord>, RepositoryError> {
        self.enter()?;
        Ok(self.cases.lock().unwrap().get(case_number).cloned())
    }

    async fn create(
        &self,
        _token: &str,
        case: &NewCaseRecord,
    ) -> Result<CaseLocation, RepositoryError> {
        self.enter()?;
        self.created.lock().unwrap().push(case.clone());
        let mut cases = self.cases.lock().unwrap();
        let number = format!("0400{:04}", cases.len() + 1);
        cases.insert(
            number.clone(),
            CaseRecord {
                case_number: Some(number.clone()),
                summary: Some(case.summary.clone()),
                description: Some(case.description.clone()),
                status: Some("Waiting on Red Hat".to_string()),
                severity: Some(case.severity.clone()),
                product: Some(case.product.clone()),
                version: Some(case.version.clone()),
                contact_sso_name: case.contact_sso_name.clone(),
                ..CaseRecord::default()
            },
        );
        Ok(CaseLocation {
            location: vec![format!("https://cases.example.test/v1/cases/{number}")],
        })
    }

    async fn update(
        &self,
        _token: &str,
        case_number: &str,
        update: &CaseUpdate,
    ) -> Result<WriteAck, RepositoryError> {
        self.enter()?;
        self.updates
            .lock()
            .unwrap()
            .push((case_number.to_string(), update.clone()));
        let mut cases = self.cases.lock().unwrap();
        let Some(case) = cases.get_mut(case_number) else {
            return Ok(WriteAck::NotFound);
        };
        if let Some(status) = &update.status {
            case.status = Some(status.clone());
        }
        if let Some(contact) = &update.contact_sso_name {
            case.contact_sso_name = Some(contact.clone());
        }
        Ok(if self.echo_updates {
            WriteAck::Record(case.clone())
        } else {
            WriteAck::Empty
        })
    }

    async fn add_comment(
        &self,
        _token: &str,
        case_number: &str,
        comment: &NewCommentRecord,
    ) -> Result<WriteAck, RepositoryError> {
        self.enter()?;
        let mut cases = self.cases.lock().unwrap();
        let Some(case) = cases.get_mut(case_number) else {
            return Ok(WriteAck::NotFound);
        };
        self.comments_added
            .lock()
            .unwrap()
            .push((case_number.to_string(), comment.comment_body.clone()));
        case.comments.push(CommentRecord {
            id: Some(format!("c{}", case.comments.len() + 1)),
            comment_body: Some(comment.comment_body.clone()),
            created_by: Some("tester".to_string()),
            ..CommentRecord::default()
        });
        Ok(WriteAck::Empty)
    }

    async fn comments(
        &self,
        _token: &str,
        case_number: &str,
    ) -> Result<Vec<CommentRecord>, RepositoryError> {
        self.enter()?;
        Ok(self
            .cases
            .lock()
            .unwrap()
            .get(case_number)
            .map(|case| case.comments.clone())
            .unwrap_or_default())
    }

    async fn current_account(&self, _token: &str) -> Result<AccountRecord, RepositoryError> {
        self.enter()?;
        Ok(self.account.clone())
    }

    async fn entitlements(&self, _token: &str) -> Result<Vec<EntitlementRecord>, RepositoryError> {
        self.enter()?;
        Ok(self.entitlements.clone())
    }
}

#[async_trait]
impl ProductCatalog for FakeBackend {
    async fn products(&self, _token: &str) -> Result<Vec<ProductRecord>, RepositoryError> {
        self.enter()?;
        Ok(self.products.clone())
    }

    async fn versions(
        &self,
        _token: &str,
        product_code: &str,
    ) -> Result<Vec<VersionRecord>, RepositoryError> {
        self.enter()?;
        Ok(self.versions.get(product_code).cloned().unwrap_or_default())
    }
}
