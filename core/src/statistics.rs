use std::collections::BTreeMap;

use serde::Serialize;

use crate::cases::{CasePriority, SupportCase};

/// Counts over a case collection, keyed by display label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub total: usize,
    pub by_status: BTreeMap<String, usize>,
    pub by_priority: BTreeMap<String, usize>,
    pub by_product: BTreeMap<String, usize>,
    /// Urgent cases that are neither resolved nor closed.
    pub urgent_open: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Statistics {
    /// Empty counts carrying an error marker.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn is_available(&self) -> bool {
        self.error.is_none()
    }
}

pub fn aggregate(cases: &[SupportCase]) -> Statistics {
    let mut stats = Statistics {
        total: cases.len(),
        ..Statistics::default()
    };
    for case in cases {
        *stats.by_status.entry(case.status.label().to_string()).or_default() += 1;
        *stats
            .by_priority
            .entry(case.priority.label().to_string())
            .or_default() += 1;
        if let Some(product) = &case.product {
            *stats.by_product.entry(product.clone()).or_default() += 1;
        }
        if case.priority == CasePriority::Urgent && case.status.is_open() {
            stats.urgent_open += 1;
        }
    }
    stats
}
