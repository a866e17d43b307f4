//! Native client trait for inter-module communication
//!
//! This trait defines the API that other modules use to drive module setup.
//! NO HTTP - direct function calls for performance.

use super::{
    error::ModuleSetupError,
    model::{ClassExtensionsChain, ModuleConfiguration, ShopId},
};
use async_trait::async_trait;

/// Module setup API for inter-module communication
#[async_trait]
pub trait ModuleSetupApi: Send + Sync {
    // ===== Configuration =====

    /// Merge a freshly declared module configuration into the shop configuration
    async fn install_module(
        &self,
        shop_id: ShopId,
        configuration: ModuleConfiguration,
    ) -> Result<ModuleConfiguration, ModuleSetupError>;

    /// Remove a module from the shop configuration, deactivating it first if needed
    async fn uninstall_module(&self, shop_id: ShopId, module_id: &str)
        -> Result<(), ModuleSetupError>;

    /// Get the stored configuration of one module
    async fn get_module_configuration(
        &self,
        shop_id: ShopId,
        module_id: &str,
    ) -> Result<ModuleConfiguration, ModuleSetupError>;

    // ===== Activation =====

    async fn activate(&self, module_id: &str, shop_id: ShopId) -> Result<(), ModuleSetupError>;

    async fn deactivate(&self, module_id: &str, shop_id: ShopId) -> Result<(), ModuleSetupError>;

    async fn is_active(&self, module_id: &str, shop_id: ShopId) -> Result<bool, ModuleSetupError>;

    // ===== Runtime =====

    /// Extension chain restricted to active modules, in declaration order
    async fn get_active_extension_chain(
        &self,
        shop_id: ShopId,
    ) -> Result<ClassExtensionsChain, ModuleSetupError>;
}
