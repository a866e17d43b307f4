//! Native client implementation - wraps domain service for in-process calls

use crate::contract::{ClassExtensionsChain, ModuleConfiguration, ModuleSetupApi, ModuleSetupError, ShopId};
use crate::domain::Service;
use async_trait::async_trait;
use std::sync::Arc;

/// Native client implementation that directly calls the domain service
///
/// This client is used for in-process communication without HTTP overhead.
#[derive(Clone)]
pub struct NativeClient {
    service: Arc<Service>,
}

impl NativeClient {
    /// Create a new native client
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl ModuleSetupApi for NativeClient {
    async fn install_module(
        &self,
        shop_id: ShopId,
        configuration: ModuleConfiguration,
    ) -> Result<ModuleConfiguration, ModuleSetupError> {
        self.service.install_module(shop_id, configuration).await
    }

    async fn uninstall_module(&self, shop_id: ShopId, module_id: &str) -> Result<(), ModuleSetupError> {
        self.service.uninstall_module(shop_id, module_id).await
    }

    async fn get_module_configuration(
        &self,
        shop_id: ShopId,
        module_id: &str,
    ) -> Result<ModuleConfiguration, ModuleSetupError> {
        self.service.get_module_configuration(shop_id, module_id).await
    }

    async fn activate(&self, module_id: &str, shop_id: ShopId) -> Result<(), ModuleSetupError> {
        self.service.activate(module_id, shop_id).await
    }

    async fn deactivate(&self, module_id: &str, shop_id: ShopId) -> Result<(), ModuleSetupError> {
        self.service.deactivate(module_id, shop_id).await
    }

    async fn is_active(&self, module_id: &str, shop_id: ShopId) -> Result<bool, ModuleSetupError> {
        self.service.is_active(module_id, shop_id).await
    }

    async fn get_active_extension_chain(
        &self,
        shop_id: ShopId,
    ) -> Result<ClassExtensionsChain, ModuleSetupError> {
        self.service.get_active_extension_chain(shop_id).await
    }
}
