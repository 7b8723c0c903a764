use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub const CASE_PORTAL_URL: &str = "https://access.redhat.com/support/cases/#/case/";

/// Lifecycle state of a support case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseStatus {
    New,
    InProgress,
    WaitingCustomer,
    WaitingVendor,
    Resolved,
    Closed,
}

impl CaseStatus {
    pub const ALL: [CaseStatus; 6] = [
        CaseStatus::New,
        CaseStatus::InProgress,
        CaseStatus::WaitingCustomer,
        CaseStatus::WaitingVendor,
        CaseStatus::Resolved,
        CaseStatus::Closed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CaseStatus::New => "New",
            CaseStatus::InProgress => "In Progress",
            CaseStatus::WaitingCustomer => "Waiting on Customer",
            CaseStatus::WaitingVendor => "Waiting on Vendor",
            CaseStatus::Resolved => "Resolved",
            CaseStatus::Closed => "Closed",
        }
    }

    /// Resolved and closed cases no longer need attention from either side.
    pub fn is_open(self) -> bool {
        !matches!(self, CaseStatus::Resolved | CaseStatus::Closed)
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Case priority. Declaration order is the sort order: most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CasePriority {
    Urgent,
    High,
    Normal,
    Low,
}

impl CasePriority {
    pub const ALL: [CasePriority; 4] = [
        CasePriority::Urgent,
        CasePriority::High,
        CasePriority::Normal,
        CasePriority::Low,
    ];

    /// Sort rank, lower is more urgent.
    pub fn rank(self) -> u8 {
        match self {
            CasePriority::Urgent => 1,
            CasePriority::High => 2,
            CasePriority::Normal => 3,
            CasePriority::Low => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CasePriority::Urgent => "Urgent",
            CasePriority::High => "High",
            CasePriority::Normal => "Normal",
            CasePriority::Low => "Low",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CasePriority::Urgent => "URGENT",
            CasePriority::High => "HIGH",
            CasePriority::Normal => "NORMAL",
            CasePriority::Low => "LOW",
        }
    }
}

impl fmt::Display for CasePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseComment {
    pub id: Option<String>,
    pub author: Option<String>,
    pub content: String,
    pub created_at: Option<DateTime<Utc>>,
    pub is_internal: bool,
}

impl fmt::Display for CaseComment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_internal {
            f.write_str("[INTERNAL] ")?;
        }
        let when = self
            .created_at
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "unknown date".to_string());
        write!(
            f,
            "[{when}] {}:\n  {}",
            self.author.as_deref().unwrap_or("unknown"),
            self.content
        )
    }
}

/// A support case as seen by tool callers, built fresh from every backend response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupportCase {
    pub id: String,
    pub title: String,
    pub description: String,
    pub product: Option<String>,
    pub version: Option<String>,
    pub reporter: Option<String>,
    pub assignee: Option<String>,
    pub status: CaseStatus,
    pub priority: CasePriority,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub comments: Vec<CaseComment>,
}

impl SupportCase {
    pub fn case_url(&self) -> String {
        format!("{CASE_PORTAL_URL}{}", self.id)
    }

    /// Multi-line rendering used for single-case tool responses.
    pub fn detailed(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("=== Case: {} ===\n", self.id));
        out.push_str(&format!("URL: {}\n", self.case_url()));
        out.push_str(&format!("Title: {}\n", self.title));
        out.push_str(&format!("Status: {}\n", self.status));
        out.push_str(&format!("Priority: {}\n", self.priority));
        out.push_str(&format!(
            "Product: {}",
            self.product.as_deref().unwrap_or("N/A")
        ));
        if let Some(version) = &self.version {
            out.push_str(&format!(" {version}"));
        }
        out.push('\n');
        out.push_str(&format!(
            "Reported by: {}\n",
            self.reporter.as_deref().unwrap_or("N/A")
        ));
        out.push_str(&format!(
            "Assigned to: {}\n",
            self.assignee.as_deref().unwrap_or("Unassigned")
        ));
        out.push_str(&format!("Created: {}\n", format_timestamp(self.created_at)));
        out.push_str(&format!("Updated: {}\n", format_timestamp(self.updated_at)));
        out.push_str(&format!("\nDescription:\n{}\n", self.description));

        if !self.comments.is_empty() {
            out.push_str(&format!("\n--- Comments ({}) ---\n", self.comments.len()));
            for comment in &self.comments {
                out.push_str(&format!("{comment}\n"));
            }
        }
        out
    }
}

impl fmt::Display for SupportCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} - {} ({}) - {}",
            self.id,
            self.title,
            self.status,
            self.priority,
            self.product.as_deref().unwrap_or("N/A")
        )
    }
}

fn format_timestamp(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|ts| ts.to_rfc3339())
        .unwrap_or_else(|| "N/A".to_string())
}

/// Search constraints. Every field is optional; absence means no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub keyword: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub product: Option<String>,
    pub include_closed: bool,
}

impl FilterCriteria {
    pub fn has_constraints(&self) -> bool {
        self.keyword.is_some()
            || self.status.is_some()
            || self.priority.is_some()
            || self.product.is_some()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn sample_case() -> SupportCase {
        SupportCase {
            id: "03881234".to_string(),
            title: "Router pods crash looping".to_string(),
            description: "ingress pods restart every 30s".to_string(),
            product: Some("OpenShift Container Platform".to_string()),
            version: Some("4.14".to_string()),
            reporter: Some("jdoe".to_string()),
            assignee: None,
            status: CaseStatus::WaitingCustomer,
            priority: CasePriority::High,
            created_at: Some(Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap()),
            updated_at: None,
            comments: vec![CaseComment {
                id: Some("c1".to_string()),
                author: Some("support".to_string()),
                content: "Please attach a must-gather.".to_string(),
                created_at: Some(Utc.with_ymd_and_hms(2024, 1, 15, 11, 30, 0).unwrap()),
                is_internal: false,
            }],
        }
    }

    #[test]
    fn priority_rank_matches_declaration_order() {
        let ranks: Vec<u8> = CasePriority::ALL.iter().map(|p| p.rank()).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
        assert!(CasePriority::Urgent < CasePriority::Low);
    }

    #[test]
    fn only_resolved_and_closed_are_not_open() {
        let open: Vec<CaseStatus> = CaseStatus::ALL
            .into_iter()
            .filter(|s| s.is_open())
            .collect();
        assert_eq!(open.len(), 4);
        assert!(!CaseStatus::Resolved.is_open());
        assert!(!CaseStatus::Closed.is_open());
    }

    #[test]
    fn summary_line_uses_display_labels() {
        let case = sample_case();
        assert_eq!(
            case.to_string(),
            "[03881234] Router pods crash looping - Waiting on Customer (High) - OpenShift Container Platform"
        );
    }

    #[test]
    fn detailed_rendering_includes_url_and_comments() {
        let text = sample_case().detailed();
        assert!(text.contains("URL: https://access.redhat.com/support/cases/#/case/03881234"));
        assert!(text.contains("Product: OpenShift Container Platform 4.14"));
        assert!(text.contains("Assigned to: Unassigned"));
        assert!(text.contains("Updated: N/A"));
        assert!(text.contains("--- Comments (1) ---"));
        assert!(text.contains("[2024-01-15 11:30] support:\n  Please attach a must-gather."));
    }

    #[test]
    fn serializes_enums_in_screaming_snake_case() {
        let value = serde_json::to_value(sample_case()).unwrap();
        assert_eq!(value["status"], "WAITING_CUSTOMER");
        assert_eq!(value["priority"], "HIGH");
    }

    #[test]
    fn empty_criteria_has_no_constraints() {
        assert!(!FilterCriteria::default().has_constraints());
        let criteria = FilterCriteria {
            product: Some("RHEL".to_string()),
            ..FilterCriteria::default()
        };
        assert!(criteria.has_constraints());
    }
}
