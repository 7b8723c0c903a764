use std::cmp::Ordering;

use crate::cases::{CaseStatus, FilterCriteria, SupportCase};
use crate::vocabulary::{requested_status, severity_to_priority};

/// Filter `cases` by every present criterion and order the survivors.
///
/// Keyword matching is left to the backend, which already applied it when
/// producing `cases`. Without `include_closed`, closed cases are dropped
/// unless the status criterion itself asks for them.
pub fn search(cases: Vec<SupportCase>, criteria: &FilterCriteria) -> Vec<SupportCase> {
    let status = non_blank(criteria.status.as_deref()).map(requested_status);
    let priority = non_blank(criteria.priority.as_deref()).map(|p| severity_to_priority(Some(p)));
    let product = non_blank(criteria.product.as_deref()).map(str::to_lowercase);
    let keep_closed = criteria.include_closed || status == Some(CaseStatus::Closed);

    let mut matched: Vec<SupportCase> = cases
        .into_iter()
        .filter(|case| status.is_none_or(|s| case.status == s))
        .filter(|case| priority.is_none_or(|p| case.priority == p))
        .filter(|case| {
            product.as_deref().is_none_or(|wanted| {
                case.product
                    .as_deref()
                    .is_some_and(|have| have.trim().to_lowercase() == wanted)
            })
        })
        .filter(|case| keep_closed || case.status != CaseStatus::Closed)
        .collect();

    sort_cases(&mut matched);
    matched
}

/// Most urgent first, then most recently updated. Cases without an update
/// timestamp sort after those with one. Stable for remaining ties.
pub fn sort_cases(cases: &mut [SupportCase]) {
    cases.sort_by(|a, b| {
        a.priority
            .rank()
            .cmp(&b.priority.rank())
            .then_with(|| match (a.updated_at, b.updated_at) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
    });
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::cases::CasePriority;

    fn case(id: &str, status: CaseStatus, priority: CasePriority) -> SupportCase {
        SupportCase {
            id: id.to_string(),
            title: format!("case {id}"),
            description: String::new(),
            product: Some("Red Hat Enterprise Linux".to_string()),
            version: None,
            reporter: None,
            assignee: None,
            status,
            priority,
            created_at: None,
            updated_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
            comments: Vec::new(),
        }
    }

    fn ids(cases: &[SupportCase]) -> Vec<&str> {
        cases.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn equal_timestamps_sort_by_rank_keeping_original_order() {
        let cases = vec![
            case("low", CaseStatus::New, CasePriority::Low),
            case("urgent-a", CaseStatus::New, CasePriority::Urgent),
            case("normal", CaseStatus::New, CasePriority::Normal),
            case("urgent-b", CaseStatus::New, CasePriority::Urgent),
        ];
        let sorted = search(cases, &FilterCriteria::default());
        assert_eq!(ids(&sorted), vec!["urgent-a", "urgent-b", "normal", "low"]);
    }

    #[test]
    fn newer_updates_first_within_rank_and_missing_timestamps_last() {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut stale = case("stale", CaseStatus::New, CasePriority::High);
        stale.updated_at = Some(base - Duration::days(3));
        let mut fresh = case("fresh", CaseStatus::New, CasePriority::High);
        fresh.updated_at = Some(base);
        let mut undated = case("undated", CaseStatus::New, CasePriority::High);
        undated.updated_at = None;

        let sorted = search(vec![undated, stale, fresh], &FilterCriteria::default());
        assert_eq!(ids(&sorted), vec!["fresh", "stale", "undated"]);
    }

    #[test]
    fn closed_cases_hidden_unless_requested() {
        let cases = vec![
            case("open", CaseStatus::WaitingCustomer, CasePriority::Normal),
            case("done", CaseStatus::Closed, CasePriority::Normal),
        ];

        let default = search(cases.clone(), &FilterCriteria::default());
        assert_eq!(ids(&default), vec!["open"]);

        let include = FilterCriteria {
            include_closed: true,
            ..FilterCriteria::default()
        };
        assert_eq!(search(cases.clone(), &include).len(), 2);

        let only_closed = FilterCriteria {
            status: Some("closed".to_string()),
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&search(cases, &only_closed)), vec!["done"]);
    }

    #[test]
    fn status_criterion_goes_through_write_then_read_mapping() {
        let cases = vec![
            case("new", CaseStatus::New, CasePriority::Normal),
            case("working", CaseStatus::InProgress, CasePriority::Normal),
            case("customer", CaseStatus::WaitingCustomer, CasePriority::Normal),
        ];
        // "IN_PROGRESS" is written as "Waiting on Red Hat", which reads back as NEW
        let criteria = FilterCriteria {
            status: Some("IN_PROGRESS".to_string()),
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&search(cases.clone(), &criteria)), vec!["new"]);

        let criteria = FilterCriteria {
            status: Some("Waiting on Customer".to_string()),
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&search(cases, &criteria)), vec!["customer"]);
    }

    #[test]
    fn priority_criterion_accepts_severity_forms() {
        let cases = vec![
            case("u", CaseStatus::New, CasePriority::Urgent),
            case("h", CaseStatus::New, CasePriority::High),
        ];
        for raw in ["1", "urgent", "1 (Urgent)"] {
            let criteria = FilterCriteria {
                priority: Some(raw.to_string()),
                ..FilterCriteria::default()
            };
            assert_eq!(ids(&search(cases.clone(), &criteria)), vec!["u"], "{raw}");
        }
    }

    #[test]
    fn product_match_is_trimmed_and_case_insensitive() {
        let mut ocp = case("ocp", CaseStatus::New, CasePriority::Normal);
        ocp.product = Some("OpenShift Container Platform ".to_string());
        let mut none = case("none", CaseStatus::New, CasePriority::Normal);
        none.product = None;
        let rhel = case("rhel", CaseStatus::New, CasePriority::Normal);

        let criteria = FilterCriteria {
            product: Some("  openshift container platform".to_string()),
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&search(vec![ocp, none, rhel], &criteria)), vec!["ocp"]);
    }

    #[test]
    fn blank_criteria_are_ignored() {
        let cases = vec![case("a", CaseStatus::New, CasePriority::Low)];
        let criteria = FilterCriteria {
            status: Some("  ".to_string()),
            priority: Some(String::new()),
            product: Some(" ".to_string()),
            ..FilterCriteria::default()
        };
        assert_eq!(search(cases, &criteria).len(), 1);
    }
}
