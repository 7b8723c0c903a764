//! Tool catalogue and executors for the support case surface.
//!
//! Each executor returns the human-readable text block agents read plus the
//! structured data carried in `structuredContent`.

use casebridge_core::backend::TokenIssuer;
use casebridge_core::cases::{FilterCriteria, SupportCase};
use casebridge_core::error::{CaseError, codes};
use casebridge_core::records::{AccountRecord, EntitlementRecord, ProductRecord, VersionRecord};
use casebridge_core::repository::{CaseService, NewCase};
use casebridge_core::statistics::Statistics;
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::ToolError;

const TOKEN_DOCS_HINT: &str = "Generate an offline token at https://access.redhat.com/management/api and set CASEBRIDGE_OFFLINE_TOKEN, then restart the server.";
const EXPIRED_TOKEN_DOCS_HINT: &str = "The offline token may be expired or revoked. Generate a new one at https://access.redhat.com/management/api.";

pub(crate) struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

/// Outcome of a successful tool call.
#[derive(Debug)]
pub(crate) struct ToolOutput {
    pub text: String,
    pub data: Value,
}

impl From<CaseError> for ToolError {
    fn from(err: CaseError) -> Self {
        let code = err.code();
        let mut tool_error = ToolError::new(code, err.to_string());
        if let Some(field) = err.field() {
            tool_error = tool_error.with_field(field);
        }
        if let Some(status) = err.upstream_status() {
            tool_error = tool_error.with_details(json!({ "upstream_status": status }));
        }
        match code {
            codes::NOT_CONFIGURED => tool_error.with_docs_hint(TOKEN_DOCS_HINT),
            codes::AUTHENTICATION_FAILED => tool_error.with_docs_hint(EXPIRED_TOKEN_DOCS_HINT),
            _ => tool_error,
        }
    }
}

pub(crate) fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "get_account_info",
            description: "Verify the Red Hat API connection and show account details (name, number, status, region, country). Call this first to confirm the server is configured.",
            input_schema: json!({
                "type": "object",
                "properties": {},
                "additionalProperties": false
            }),
        },
        ToolDefinition {
            name: "get_entitlements",
            description: "List the account's subscriptions and which of them allow opening support cases. SELF-SUPPORTED entitlements cannot be used for case creation.",
            input_schema: json!({
                "type": "object",
                "properties": {},
                "additionalProperties": false
            }),
        },
        ToolDefinition {
            name: "create_case",
            description: "Open a new support case. Use list_products and list_versions first to get valid product and version values.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "title": { "type": "string", "description": "Brief problem summary (max 255 chars)" },
                    "description": { "type": "string", "description": "What happened, error messages, steps to reproduce, business impact" },
                    "product": { "type": "string", "description": "Exact product name, e.g. 'OpenShift Container Platform'" },
                    "version": { "type": "string", "description": "Product version, e.g. '4.14' or '9.3'" },
                    "priority": {
                        "type": "string",
                        "enum": ["LOW", "NORMAL", "HIGH", "URGENT"],
                        "default": "NORMAL",
                        "description": "LOW (questions), NORMAL (affecting operations), HIGH (critical functionality), URGENT (production down)"
                    },
                    "reporter": { "type": "string", "description": "SSO username of the case contact" }
                },
                "required": ["title", "description", "product", "version"],
                "additionalProperties": false
            }),
        },
        ToolDefinition {
            name: "get_case",
            description: "Full details of a support case: status, priority, product, description, dates, contacts and comment history.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "case_number": { "type": "string", "description": "8-digit case number, e.g. '03881234'" },
                    "include_comments": { "type": "boolean", "default": true }
                },
                "required": ["case_number"],
                "additionalProperties": false
            }),
        },
        ToolDefinition {
            name: "search_cases",
            description: "List and filter support cases. Without filters lists open cases. Results are ordered by priority, then most recently updated.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Text to search in title, description or case number" },
                    "status": { "type": "string", "description": "'Waiting on Red Hat', 'Waiting on Customer' or 'Closed'" },
                    "priority": { "type": "string", "enum": ["LOW", "NORMAL", "HIGH", "URGENT"] },
                    "product": { "type": "string", "description": "Product name, e.g. 'OpenShift Container Platform'" },
                    "include_closed": { "type": "boolean", "default": false }
                },
                "additionalProperties": false
            }),
        },
        ToolDefinition {
            name: "update_case",
            description: "Change a case's status (reopen with 'Waiting on Red Hat', or 'Waiting on Customer', 'Closed') and/or reassign its contact. At least one of status or contact_sso_name is required.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "case_number": { "type": "string" },
                    "status": { "type": "string" },
                    "contact_sso_name": { "type": "string", "description": "SSO username of the new primary contact" }
                },
                "required": ["case_number"],
                "additionalProperties": false
            }),
        },
        ToolDefinition {
            name: "add_comment",
            description: "Add a comment to an existing case: additional details, logs, or answers to questions from support.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "case_number": { "type": "string" },
                    "comment": { "type": "string" }
                },
                "required": ["case_number", "comment"],
                "additionalProperties": false
            }),
        },
        ToolDefinition {
            name: "get_statistics",
            description: "Counts over open cases: total, open urgent cases, and distribution by status, priority and product.",
            input_schema: json!({
                "type": "object",
                "properties": {},
                "additionalProperties": false
            }),
        },
        ToolDefinition {
            name: "list_products",
            description: "Active Red Hat products available for case creation, with their codes. Use the product NAME in create_case and the code in list_versions.",
            input_schema: json!({
                "type": "object",
                "properties": {},
                "additionalProperties": false
            }),
        },
        ToolDefinition {
            name: "list_versions",
            description: "Available versions for a product code returned by list_products.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "product_code": { "type": "string" }
                },
                "required": ["product_code"],
                "additionalProperties": false
            }),
        },
        ToolDefinition {
            name: "get_configured_products",
            description: "Product names configured for this server (CASEBRIDGE_PRODUCTS). Works without an API token.",
            input_schema: json!({
                "type": "object",
                "properties": {},
                "additionalProperties": false
            }),
        },
    ]
}

pub(crate) async fn execute_tool<I: TokenIssuer>(
    service: &CaseService<I>,
    name: &str,
    args: &Map<String, Value>,
) -> Result<ToolOutput, ToolError> {
    match name {
        "get_account_info" => {
            let account = service.account_info().await?;
            Ok(ToolOutput {
                text: render_account(&account),
                data: to_data(&account)?,
            })
        }
        "get_entitlements" => {
            let entitlements = service.entitlements().await?;
            Ok(ToolOutput {
                text: render_entitlements(&entitlements),
                data: json!({
                    "entitlements": to_data(&entitlements)?,
                    "with_support": entitlements.iter().filter(|e| e.allows_case_creation()).count(),
                }),
            })
        }
        "create_case" => {
            let new_case = NewCase {
                title: arg_optional_string(args, "title")?,
                description: arg_optional_string(args, "description")?,
                product: arg_optional_string(args, "product")?,
                version: arg_optional_string(args, "version")?,
                priority: arg_optional_string(args, "priority")?,
                reporter: arg_optional_string(args, "reporter")?,
            };
            let case = service.create_case(new_case).await?;
            Ok(ToolOutput {
                text: format!("Case created successfully:\n{}", case.detailed()),
                data: case_data(&case)?,
            })
        }
        "get_case" => {
            let case_number = arg_optional_string(args, "case_number")?.unwrap_or_default();
            let include_comments = arg_bool(args, "include_comments", true)?;
            let Some(mut case) = service.get_case(&case_number).await? else {
                return Err(case_not_found(&case_number));
            };
            if !include_comments {
                case.comments.clear();
            } else if case.comments.is_empty() {
                case.comments = service.get_comments(&case_number).await?;
            }
            Ok(ToolOutput {
                text: case.detailed(),
                data: case_data(&case)?,
            })
        }
        "search_cases" => {
            let criteria = FilterCriteria {
                keyword: arg_optional_string(args, "query")?,
                status: arg_optional_string(args, "status")?,
                priority: arg_optional_string(args, "priority")?,
                product: arg_optional_string(args, "product")?,
                include_closed: arg_bool(args, "include_closed", false)?,
            };
            let cases = service.search_cases(&criteria).await?;
            Ok(ToolOutput {
                text: render_search(&cases, &criteria),
                data: json!({
                    "count": cases.len(),
                    "cases": to_data(&cases)?,
                }),
            })
        }
        "update_case" => {
            let case_number = arg_optional_string(args, "case_number")?.unwrap_or_default();
            let status = arg_optional_string(args, "status")?;
            let contact = arg_optional_string(args, "contact_sso_name")?;
            let updated = service
                .update_case(&case_number, status.as_deref(), contact.as_deref())
                .await?;
            let Some(case) = updated else {
                return Err(ToolError::new(
                    codes::NOT_FOUND,
                    "Could not update the case. Verify that the case number is valid.",
                )
                .with_field("case_number"));
            };
            Ok(ToolOutput {
                text: format!("Case updated successfully:\n{}", case.detailed()),
                data: case_data(&case)?,
            })
        }
        "add_comment" => {
            let case_number = arg_optional_string(args, "case_number")?.unwrap_or_default();
            let comment = arg_optional_string(args, "comment")?.unwrap_or_default();
            let Some(case) = service.add_comment(&case_number, &comment).await? else {
                return Err(ToolError::new(
                    codes::NOT_FOUND,
                    "Could not add comment. Verify that the case exists.",
                )
                .with_field("case_number"));
            };
            Ok(ToolOutput {
                text: format!("Comment added successfully to case {}", case.id),
                data: case_data(&case)?,
            })
        }
        "get_statistics" => {
            if !service.is_configured() {
                return Err(CaseError::NotConfigured.into());
            }
            let stats = service.statistics().await;
            if let Some(message) = &stats.error {
                return Err(ToolError::new(
                    codes::UPSTREAM_ERROR,
                    format!("Statistics unavailable: {message}"),
                ));
            }
            Ok(ToolOutput {
                text: render_statistics(&stats),
                data: to_data(&stats)?,
            })
        }
        "list_products" => {
            let products = service.catalog_products().await?;
            Ok(ToolOutput {
                text: render_products(&products),
                data: json!({ "products": to_data(&products)? }),
            })
        }
        "list_versions" => {
            let product_code = required_string(args, "product_code")?;
            let product_code = product_code.trim();
            let versions = service.catalog_versions(product_code).await?;
            Ok(ToolOutput {
                text: render_versions(product_code, &versions),
                data: json!({
                    "product_code": product_code,
                    "versions": to_data(&versions)?,
                }),
            })
        }
        "get_configured_products" => {
            let products = service.products();
            Ok(ToolOutput {
                text: render_configured_products(products),
                data: json!({ "products": products }),
            })
        }
        _ => Err(ToolError::new("unknown_tool", format!("Unknown tool '{name}'"))
            .with_field("name")
            .with_docs_hint("Call tools/list to see the available tools.")),
    }
}

fn case_not_found(case_number: &str) -> ToolError {
    ToolError::new(codes::NOT_FOUND, format!("Case not found: {case_number}"))
        .with_field("case_number")
}

fn to_data<T: Serialize + ?Sized>(value: &T) -> Result<Value, ToolError> {
    serde_json::to_value(value)
        .map_err(|e| ToolError::new("internal_error", format!("Failed to encode result: {e}")))
}

fn case_data(case: &SupportCase) -> Result<Value, ToolError> {
    let mut data = to_data(case)?;
    data["url"] = Value::String(case.case_url());
    Ok(data)
}

fn render_account(account: &AccountRecord) -> String {
    let mut out = String::from("=== Red Hat Account ===\n\n");
    out.push_str(&format!(
        "Name: {}\n",
        account.name.as_deref().unwrap_or("N/A")
    ));
    out.push_str(&format!(
        "Account Number: {}\n",
        account.account_number.as_deref().unwrap_or("N/A")
    ));
    if let Some(alias) = &account.account_alias {
        out.push_str(&format!("Alias: {alias}\n"));
    }
    let status = if account.is_active == Some(true) {
        "Active"
    } else {
        "Unknown"
    };
    out.push_str(&format!("Status: {status}\n"));
    if let Some(region) = &account.super_region {
        out.push_str(&format!("Region: {region}\n"));
    }
    if let Some(country) = &account.identifying_address_country {
        out.push_str(&format!("Country: {country}\n"));
    }
    out.push_str("\nRed Hat API Connection: OK");
    out
}

fn entitlement_line(entitlement: &EntitlementRecord) -> String {
    let mut line = format!("- {}", entitlement.name.as_deref().unwrap_or("unnamed"));
    if let Some(level) = &entitlement.support_level {
        line.push_str(&format!(" [{level}]"));
    }
    if let Some(end) = &entitlement.end_date {
        line.push_str(&format!(" (expires: {})", end.replace('Z', "")));
    }
    line
}

fn render_entitlements(entitlements: &[EntitlementRecord]) -> String {
    if entitlements.is_empty() {
        return "No entitlements found for this account.\n\n\
                To create support cases, you need an active Red Hat subscription with support (not Self-Support)."
            .to_string();
    }
    let (with_support, self_support): (Vec<&EntitlementRecord>, Vec<&EntitlementRecord>) =
        entitlements.iter().partition(|e| e.allows_case_creation());

    let mut out = String::from("=== Red Hat Entitlements ===\n\n");
    if !with_support.is_empty() {
        out.push_str("** Products WITH Support (can create cases): **\n");
        for entitlement in &with_support {
            out.push_str(&entitlement_line(entitlement));
            out.push('\n');
        }
        out.push('\n');
    }
    if !self_support.is_empty() {
        out.push_str("** Self-Support (NO case creation): **\n");
        for entitlement in &self_support {
            out.push_str(&entitlement_line(entitlement));
            out.push('\n');
        }
        out.push('\n');
    }
    out.push_str("---\n");
    out.push_str(&format!("Total: {} entitlements\n", entitlements.len()));
    out.push_str(&format!("With support: {}\n", with_support.len()));
    out.push_str(&format!("Self-support: {}\n", self_support.len()));
    if with_support.is_empty() {
        out.push_str("\nNOTE: You cannot create support cases with Self-Support subscriptions.\n");
        out.push_str(
            "Consider upgrading to a subscription with support if you need case assistance.",
        );
    }
    out
}

fn render_search(cases: &[SupportCase], criteria: &FilterCriteria) -> String {
    let filtered = criteria.has_constraints();
    if cases.is_empty() {
        return match (filtered, criteria.include_closed) {
            (true, _) => "No cases found with the specified criteria.",
            (false, true) => "No support cases in this account.",
            (false, false) => "No active support cases in this account.",
        }
        .to_string();
    }
    let title = match (filtered, criteria.include_closed) {
        (true, _) => "Search Results",
        (false, true) => "All Cases",
        (false, false) => "Active Cases",
    };
    let mut out = format!("=== {title} ({}) ===\n\n", cases.len());
    for case in cases {
        out.push_str(&format!("{case}\n"));
    }
    out
}

fn render_statistics(stats: &Statistics) -> String {
    let mut out = String::from("=== Red Hat Case Statistics ===\n\n");
    out.push_str(&format!("Total cases: {}\n", stats.total));
    out.push_str(&format!("Open urgent cases: {}\n", stats.urgent_open));
    for (heading, counts) in [
        ("\nBy Status:\n", &stats.by_status),
        ("\nBy Priority:\n", &stats.by_priority),
        ("\nBy Product:\n", &stats.by_product),
    ] {
        out.push_str(heading);
        for (key, count) in counts {
            out.push_str(&format!("  - {key}: {count}\n"));
        }
    }
    out
}

fn render_products(products: &[ProductRecord]) -> String {
    if products.is_empty() {
        return "No products available.".to_string();
    }
    let mut out = format!("=== Red Hat Products ({}) ===\n\n", products.len());
    for product in products {
        out.push_str(&format!(
            "- {} [code: {}]",
            product.name.as_deref().unwrap_or("unnamed"),
            product.code.as_deref().unwrap_or("N/A")
        ));
        if let Some(line) = product.line.as_deref().filter(|l| !l.trim().is_empty()) {
            out.push_str(&format!(" ({line})"));
        }
        out.push('\n');
    }
    out.push_str("\nUse list_versions with the product code to see available versions.");
    out
}

fn render_versions(product_code: &str, versions: &[VersionRecord]) -> String {
    if versions.is_empty() {
        return format!(
            "No versions found for product: {product_code}\n\
             Make sure you're using the correct product code from list_products."
        );
    }
    let mut out = format!(
        "=== Versions for {product_code} ({}) ===\n\n",
        versions.len()
    );
    for version in versions {
        out.push_str(&format!("- {}", version.name.as_deref().unwrap_or("unnamed")));
        if version.is_default == Some(true) {
            out.push_str(" (default)");
        }
        if let Some(description) = version.description.as_deref().filter(|d| !d.trim().is_empty())
        {
            out.push_str(&format!(" - {description}"));
        }
        out.push('\n');
    }
    out
}

fn render_configured_products(products: &[String]) -> String {
    if products.is_empty() {
        return "No products configured. Set CASEBRIDGE_PRODUCTS to a comma separated list, or use list_products for the full catalog.".to_string();
    }
    let mut out = format!("=== Configured Products ({}) ===\n\n", products.len());
    for product in products {
        out.push_str(&format!("- {product}\n"));
    }
    out
}

fn arg_bool(args: &Map<String, Value>, key: &str, default: bool) -> Result<bool, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Bool(v)) => Ok(*v),
        Some(_) => Err(
            ToolError::new(codes::VALIDATION_FAILED, format!("'{key}' must be a boolean"))
                .with_field(key),
        ),
    }
}

fn required_string(args: &Map<String, Value>, key: &str) -> Result<String, ToolError> {
    let value = args.get(key).ok_or_else(|| {
        ToolError::new(
            codes::VALIDATION_FAILED,
            format!("Missing required field '{key}'"),
        )
        .with_field(key)
    })?;
    match value {
        Value::String(v) if !v.trim().is_empty() => Ok(v.clone()),
        Value::String(_) => Err(ToolError::new(
            codes::VALIDATION_FAILED,
            format!("'{key}' must not be empty"),
        )
        .with_field(key)),
        _ => Err(
            ToolError::new(codes::VALIDATION_FAILED, format!("'{key}' must be a string"))
                .with_field(key),
        ),
    }
}

/// Blank strings count as absent.
fn arg_optional_string(args: &Map<String, Value>, key: &str) -> Result<Option<String>, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(v)) if v.trim().is_empty() => Ok(None),
        Some(Value::String(v)) => Ok(Some(v.clone())),
        Some(_) => Err(
            ToolError::new(codes::VALIDATION_FAILED, format!("'{key}' must be a string"))
                .with_field(key),
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use casebridge_core::cases::{CasePriority, CaseStatus};
    use casebridge_core::error::{AuthError, RepositoryError};

    use super::*;

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    fn case(id: &str, priority: CasePriority) -> SupportCase {
        SupportCase {
            id: id.to_string(),
            title: "Pods pending".to_string(),
            description: String::new(),
            product: Some("OpenShift Container Platform".to_string()),
            version: None,
            reporter: None,
            assignee: None,
            status: CaseStatus::WaitingVendor,
            priority,
            created_at: None,
            updated_at: None,
            comments: Vec::new(),
        }
    }

    #[test]
    fn definitions_cover_every_tool_once() {
        let names: Vec<&str> = tool_definitions().iter().map(|t| t.name).collect();
        assert_eq!(names.len(), 11);
        let mut unique = names.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), names.len());
        for tool in tool_definitions() {
            assert_eq!(tool.input_schema["type"], "object", "{}", tool.name);
        }
    }

    #[test]
    fn case_errors_map_to_tool_codes() {
        let err = ToolError::from(CaseError::NotConfigured);
        assert_eq!(err.code, "not_configured");
        assert!(err.docs_hint.is_some());

        let err = ToolError::from(CaseError::validation("product", "Product is required."));
        assert_eq!(err.code, "validation_failed");
        assert_eq!(err.field.as_deref(), Some("product"));

        let err = ToolError::from(CaseError::from(RepositoryError::Status {
            status: 503,
            body: "maintenance".into(),
        }));
        assert_eq!(err.code, "upstream_error");
        assert_eq!(err.details, Some(json!({ "upstream_status": 503 })));

        let err = ToolError::from(CaseError::from(AuthError::Rejected {
            status: 400,
            body: "invalid_grant".into(),
        }));
        assert_eq!(err.code, "authentication_failed");
        assert!(err.message.contains("invalid_grant"));
    }

    #[test]
    fn arg_helpers_treat_blank_as_absent_and_reject_wrong_types() {
        let map = args(json!({"a": "  ", "b": 3, "c": "x", "d": null}));
        assert_eq!(arg_optional_string(&map, "a").unwrap(), None);
        assert_eq!(arg_optional_string(&map, "c").unwrap().as_deref(), Some("x"));
        assert_eq!(arg_optional_string(&map, "d").unwrap(), None);
        assert_eq!(arg_optional_string(&map, "b").unwrap_err().field.as_deref(), Some("b"));
        assert!(arg_bool(&map, "missing", true).unwrap());
        assert!(arg_bool(&map, "c", false).is_err());
        assert_eq!(
            required_string(&map, "a").unwrap_err().message,
            "'a' must not be empty"
        );
        assert_eq!(
            required_string(&map, "zz").unwrap_err().message,
            "Missing required field 'zz'"
        );
    }

    #[test]
    fn entitlements_split_by_case_creation() {
        let entitlements = vec![
            EntitlementRecord {
                name: Some("RHEL Server".into()),
                support_level: Some("PREMIUM".into()),
                end_date: Some("2026-12-31T00:00:00Z".into()),
                ..EntitlementRecord::default()
            },
            EntitlementRecord {
                name: Some("Developer Subscription".into()),
                support_level: Some("SELF-SUPPORTED".into()),
                ..EntitlementRecord::default()
            },
        ];
        let text = render_entitlements(&entitlements);
        assert!(text.contains(
            "** Products WITH Support (can create cases): **\n- RHEL Server [PREMIUM] (expires: 2026-12-31T00:00:00)\n"
        ));
        assert!(text.contains("** Self-Support (NO case creation): **\n- Developer Subscription [SELF-SUPPORTED]\n"));
        assert!(text.contains("With support: 1\nSelf-support: 1\n"));
        assert!(!text.contains("NOTE:"));
    }

    #[test]
    fn search_headings_follow_criteria() {
        let unfiltered = FilterCriteria::default();
        assert_eq!(
            render_search(&[], &unfiltered),
            "No active support cases in this account."
        );
        let all = FilterCriteria {
            include_closed: true,
            ..FilterCriteria::default()
        };
        assert_eq!(render_search(&[], &all), "No support cases in this account.");

        let urgent = FilterCriteria {
            priority: Some("URGENT".into()),
            ..FilterCriteria::default()
        };
        let text = render_search(&[case("03880001", CasePriority::Urgent)], &urgent);
        assert!(text.starts_with("=== Search Results (1) ===\n\n[03880001] Pods pending"));
        assert!(render_search(&[case("1", CasePriority::Low)], &all).starts_with("=== All Cases (1) ==="));
    }

    #[test]
    fn statistics_text_lists_each_grouping() {
        let stats = Statistics {
            total: 2,
            by_status: BTreeMap::from([("Waiting on Vendor".to_string(), 2)]),
            by_priority: BTreeMap::from([("High".to_string(), 1), ("Urgent".to_string(), 1)]),
            by_product: BTreeMap::new(),
            urgent_open: 1,
            error: None,
        };
        let text = render_statistics(&stats);
        assert!(text.starts_with("=== Red Hat Case Statistics ===\n\nTotal cases: 2\nOpen urgent cases: 1\n"));
        assert!(text.contains("\nBy Priority:\n  - High: 1\n  - Urgent: 1\n"));
        assert!(text.ends_with("\nBy Product:\n"));
    }

    #[test]
    fn product_and_version_lines() {
        let products = vec![ProductRecord {
            code: Some("rhel".into()),
            name: Some("Red Hat Enterprise Linux".into()),
            line: Some("Platforms".into()),
            active: Some(true),
        }];
        assert!(render_products(&products)
            .contains("- Red Hat Enterprise Linux [code: rhel] (Platforms)\n"));

        let versions = vec![
            VersionRecord {
                name: Some("9.4".into()),
                description: Some("Current".into()),
                is_default: Some(true),
            },
            VersionRecord {
                name: Some("8.10".into()),
                description: Some(" ".into()),
                is_default: None,
            },
        ];
        let text = render_versions("rhel", &versions);
        assert!(text.starts_with("=== Versions for rhel (2) ===\n\n"));
        assert!(text.contains("- 9.4 (default) - Current\n- 8.10\n"));
        assert!(render_versions("nope", &[]).starts_with("No versions found for product: nope\n"));
    }

    #[test]
    fn account_text_marks_connection_ok() {
        let account = AccountRecord {
            account_number: Some("5512345".into()),
            name: Some("Example Corp".into()),
            is_active: Some(true),
            identifying_address_country: Some("DE".into()),
            ..AccountRecord::default()
        };
        let text = render_account(&account);
        assert!(text.contains("Name: Example Corp\nAccount Number: 5512345\nStatus: Active\nCountry: DE\n"));
        assert!(text.ends_with("Red Hat API Connection: OK"));
        assert!(!text.contains("Alias:"));
    }
}
