//! Contract error types for module setup
//!
//! These errors are transport-agnostic and used for inter-module communication.

use super::model::ShopId;

/// Module setup domain errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModuleSetupError {
    /// Module or shop configuration missing
    #[error("{resource} configuration not found: {id}")]
    ConfigurationNotFound {
        /// Resource type (module, shop)
        resource: String,
        /// Resource identifier
        id: String,
    },

    /// A required shop setting is absent from the store
    #[error("Shop setting '{name}' does not exist for shop {shop_id}")]
    EntryDoesNotExist { name: String, shop_id: ShopId },

    /// Controller id or class already registered
    #[error("Controllers duplication: {details}")]
    ControllerDuplication { details: String },

    /// Base class may not be extended by modules
    #[error("Invalid class extension namespace '{namespace}': {reason}")]
    InvalidClassExtensionNamespace { namespace: String, reason: String },

    /// Module metadata carries a key outside the recognized set
    #[error("Unsupported metadata key: {key}")]
    UnsupportedMetadataKey { key: String },

    /// Module metadata value has the wrong shape
    #[error("Unsupported value type for metadata key '{key}': {details}")]
    UnsupportedMetadataValueType { key: String, details: String },

    /// Module id missing after normalization
    #[error("Module id is missing or empty")]
    ModuleIdNotValid,

    /// Storage or other unexpected failure
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ModuleSetupError {
    pub fn module_not_found(module_id: &str, shop_id: ShopId) -> Self {
        Self::ConfigurationNotFound {
            resource: "module".to_string(),
            id: format!("{}/{}", shop_id, module_id),
        }
    }

    pub fn shop_not_found(shop_id: ShopId) -> Self {
        Self::ConfigurationNotFound {
            resource: "shop".to_string(),
            id: shop_id.to_string(),
        }
    }

    /// Wrap a storage failure, logging the full chain
    pub fn internal(error: anyhow::Error) -> Self {
        tracing::error!(error = ?error, "Module setup storage failure");
        Self::Internal {
            message: error.to_string(),
        }
    }
}
