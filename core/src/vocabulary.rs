//! Mapping between the backend's free-text status/severity strings and the
//! closed [`CaseStatus`] / [`CasePriority`] enums.
//!
//! Every function here is total: unknown input maps to a documented default
//! instead of failing. Reads are many-to-one; status writes accept a small
//! alias table and pass anything else through verbatim so callers can use
//! backend statuses the enum cannot represent.

use crate::cases::{CasePriority, CaseStatus};

pub const DEFAULT_SEVERITY: &str = "3 (Normal)";
pub const STATUS_WAITING_ON_VENDOR: &str = "Waiting on Red Hat";
pub const STATUS_WAITING_ON_CUSTOMER: &str = "Waiting on Customer";
pub const STATUS_CLOSED: &str = "Closed";

/// Backend severity (`"1 (Urgent)"`, `"urgent"`, `"1"`, ...) to priority.
pub fn severity_to_priority(severity: Option<&str>) -> CasePriority {
    let Some(severity) = severity else {
        return CasePriority::Normal;
    };
    match severity.trim().to_lowercase().as_str() {
        "1 (urgent)" | "urgent" | "1" => CasePriority::Urgent,
        "2 (high)" | "high" | "2" => CasePriority::High,
        "3 (normal)" | "normal" | "3" => CasePriority::Normal,
        "4 (low)" | "low" | "4" => CasePriority::Low,
        _ => CasePriority::Normal,
    }
}

/// Canonical backend severity for a priority.
pub fn severity_for(priority: CasePriority) -> &'static str {
    match priority {
        CasePriority::Urgent => "1 (Urgent)",
        CasePriority::High => "2 (High)",
        CasePriority::Normal => "3 (Normal)",
        CasePriority::Low => "4 (Low)",
    }
}

/// Priority name (`"URGENT"`, `"high"`, ...) to canonical backend severity.
pub fn priority_to_severity(priority: Option<&str>) -> &'static str {
    let Some(priority) = priority else {
        return DEFAULT_SEVERITY;
    };
    match priority.trim().to_uppercase().as_str() {
        "URGENT" => severity_for(CasePriority::Urgent),
        "HIGH" => severity_for(CasePriority::High),
        "NORMAL" => severity_for(CasePriority::Normal),
        "LOW" => severity_for(CasePriority::Low),
        _ => DEFAULT_SEVERITY,
    }
}

/// Backend status string to the closed status enum.
///
/// Unknown and missing statuses collapse into `InProgress`.
pub fn api_status_to_status(status: Option<&str>) -> CaseStatus {
    let Some(status) = status else {
        return CaseStatus::InProgress;
    };
    let normalized = status.trim().to_lowercase().replace(' ', "_");
    match normalized.as_str() {
        "new" | "waiting_on_red_hat" => CaseStatus::New,
        "in_progress" | "working" => CaseStatus::InProgress,
        "waiting_on_customer" | "waiting_for_customer" => CaseStatus::WaitingCustomer,
        "waiting_on_vendor" | "waiting_on_engineering" => CaseStatus::WaitingVendor,
        "resolved" | "solution_proposed" => CaseStatus::Resolved,
        "closed" => CaseStatus::Closed,
        _ => CaseStatus::InProgress,
    }
}

/// Caller-supplied status to the string written to the backend.
///
/// Logical aliases are translated; any other value is returned unchanged.
pub fn status_to_api_status(status: &str) -> String {
    let normalized = status.trim().to_uppercase().replace([' ', '-'], "_");
    match normalized.as_str() {
        "NEW" | "IN_PROGRESS" | "WAITING_ON_RED_HAT" | "OPEN" | "REOPEN" | "REOPENED" => {
            STATUS_WAITING_ON_VENDOR.to_string()
        }
        "WAITING_CUSTOMER" | "WAITING_ON_CUSTOMER" => STATUS_WAITING_ON_CUSTOMER.to_string(),
        "CLOSED" | "CLOSE" => STATUS_CLOSED.to_string(),
        _ => status.to_string(),
    }
}

/// Status a caller-supplied filter value denotes once written and read back.
pub fn requested_status(status: &str) -> CaseStatus {
    api_status_to_status(Some(&status_to_api_status(status)))
}
