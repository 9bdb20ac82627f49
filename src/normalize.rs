//! Cross-cloud resource-type normalization.
//!
//! Maps `(provider, native_type)` pairs onto a small provider-neutral
//! vocabulary so scoring and policy rules never have to name
//! provider-specific types. Unmapped pairs normalize to `"unknown"`, which is
//! a valid canonical value rather than an error.

/// Canonical asset categories recognized by the normalizer.
pub const CANONICAL_TYPES: [&str; 8] = [
    "object_storage",
    "relational_db",
    "key_value_store",
    "serverless_function",
    "event_bus",
    "api_gateway",
    "vpc_network",
    "log_store",
];

/// Fallback canonical type for unmapped resources.
pub const UNKNOWN_TYPE: &str = "unknown";

/// Normalize a provider-native resource type to its canonical category.
pub fn normalize_resource_type(provider: &str, native_type: &str) -> &'static str {
    match provider.to_ascii_lowercase().as_str() {
        "aws" => match native_type {
            "aws_s3_bucket" => "object_storage",
            "aws_db_instance" => "relational_db",
            "aws_lambda_function" => "serverless_function",
            "aws_cloudwatch_log_group" => "log_store",
            "aws_apigatewayv2_api" => "api_gateway",
            "aws_cloudwatch_event_rule" => "event_bus",
            "aws_vpc" => "vpc_network",
            _ => UNKNOWN_TYPE,
        },
        "azure" => match native_type {
            "azurerm_storage_account" => "object_storage",
            "azurerm_mssql_server" => "relational_db",
            "azurerm_function_app" => "serverless_function",
            "azurerm_log_analytics_workspace" => "log_store",
            "azurerm_api_management" => "api_gateway",
            "azurerm_eventgrid_topic" => "event_bus",
            "azurerm_virtual_network" => "vpc_network",
            _ => UNKNOWN_TYPE,
        },
        "gcp" => match native_type {
            "google_storage_bucket" => "object_storage",
            "google_sql_database_instance" => "relational_db",
            "google_cloudfunctions_function" => "serverless_function",
            "google_logging_project_sink" => "log_store",
            "google_api_gateway_api" => "api_gateway",
            "google_pubsub_topic" => "event_bus",
            "google_compute_network" => "vpc_network",
            _ => UNKNOWN_TYPE,
        },
        "ibm" => match native_type {
            "ibm_cos_bucket" => "object_storage",
            "ibm_db2" => "relational_db",
            "ibm_function" => "serverless_function",
            "ibm_log_analysis" => "log_store",
            "ibm_api_gateway" => "api_gateway",
            "ibm_event_streams" => "event_bus",
            "ibm_is_vpc" => "vpc_network",
            _ => UNKNOWN_TYPE,
        },
        _ => UNKNOWN_TYPE,
    }
}
