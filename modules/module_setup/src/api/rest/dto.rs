//! REST DTOs with serde derives for HTTP API

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ===== Module DTOs =====

/// Installed module response DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ModuleConfigurationDto {
    /// Module id
    #[schema(example = "oepaypal")]
    pub id: String,

    /// Module version
    #[schema(example = "2.1.0")]
    pub version: String,

    /// Module path relative to the modules directory
    pub path: String,

    /// Whether the module was last left active
    pub auto_active: bool,

    /// Full normalized module metadata
    pub metadata: serde_json::Value,
}

/// Activation state of one module in one shop
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ModuleStatusDto {
    pub module_id: String,
    pub shop_id: i64,
    pub active: bool,
}

// ===== Class Extension DTOs =====

/// Active class extension chain of a shop
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClassExtensionsChainDto {
    pub shop_id: i64,

    /// Base class -> extension classes, innermost first
    #[schema(value_type = Object)]
    pub chain: IndexMap<String, Vec<String>>,
}
