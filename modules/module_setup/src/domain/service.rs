//! Domain service - business logic orchestration

use super::activation::ModuleActivationService;
use super::events::{EventPublisher, ModuleEvent, ON_DEACTIVATE};
use super::handlers::default_handlers;
use super::merging::ModuleConfigurationMergingService;
use super::repository::{load_shop_configuration, save_shop_configuration, ShopConfigurationSettingDao};
use super::resolver::ActiveClassExtensionChainResolver;
use super::shop_adapter::ShopAdapter;
use super::staging::StagedSettingDao;
use super::state::{ModuleStateProvider, SettingModuleStateProvider};
use super::validation::{ClassExtensionsValidator, ControllersValidator, ModuleConfigurationValidator};
use crate::config::Config;
use crate::contract::{ClassExtensionsChain, ModuleConfiguration, ModuleSetupError, ShopConfiguration, ShopId};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Domain service for module setup
///
/// Every read-modify-write on a shop runs under that shop's lock, so concurrent
/// installs and toggles of the same shop are serialized.
pub struct Service {
    dao: Arc<dyn ShopConfigurationSettingDao>,
    merging: ModuleConfigurationMergingService,
    activation: ModuleActivationService,
    resolver: ActiveClassExtensionChainResolver,
    state: Arc<dyn ModuleStateProvider>,
    /// Per-shop mutual exclusion
    shop_locks: RwLock<HashMap<ShopId, Arc<Mutex<()>>>>,
}

impl Service {
    /// Create a service with the default validators and handlers
    pub fn new(
        dao: Arc<dyn ShopConfigurationSettingDao>,
        shop_adapter: Arc<dyn ShopAdapter>,
        event_publisher: Arc<dyn EventPublisher>,
        config: &Config,
    ) -> Self {
        let validators: Vec<Box<dyn ModuleConfigurationValidator>> = vec![
            Box::new(ControllersValidator::new(shop_adapter.clone())),
            Box::new(
                ClassExtensionsValidator::new(shop_adapter)
                    .with_namespace_checks(config.validate_class_extensions),
            ),
        ];

        let activation =
            ModuleActivationService::new(dao.clone(), default_handlers(), validators, event_publisher);
        Self::with_activation_service(dao, activation)
    }

    /// Create a service around a custom activation pipeline
    pub fn with_activation_service(
        dao: Arc<dyn ShopConfigurationSettingDao>,
        activation: ModuleActivationService,
    ) -> Self {
        let state: Arc<dyn ModuleStateProvider> = Arc::new(SettingModuleStateProvider::new(dao.clone()));
        Self {
            merging: ModuleConfigurationMergingService::new(),
            resolver: ActiveClassExtensionChainResolver::new(dao.clone(), state.clone()),
            state,
            activation,
            dao,
            shop_locks: RwLock::new(HashMap::new()),
        }
    }

    fn shop_lock(&self, shop_id: ShopId) -> Arc<Mutex<()>> {
        if let Some(lock) = self.shop_locks.read().get(&shop_id) {
            return lock.clone();
        }
        self.shop_locks.write().entry(shop_id).or_default().clone()
    }

    /// Drop the lock of a shop nobody else is waiting on
    fn release_shop_lock(&self, shop_id: ShopId, lock: &Arc<Mutex<()>>) {
        let mut locks = self.shop_locks.write();
        // One reference in the map, one held by the caller
        if Arc::strong_count(lock) == 2 {
            locks.remove(&shop_id);
        }
    }

    // ===== Installation =====

    /// Merge a freshly declared module into the shop configuration
    ///
    /// When the module is already active its projections are refreshed in the same
    /// commit, after the new declaration passed the validators.
    pub async fn install_module(
        &self,
        shop_id: ShopId,
        configuration: ModuleConfiguration,
    ) -> Result<ModuleConfiguration, ModuleSetupError> {
        if configuration.id.trim().is_empty() {
            return Err(ModuleSetupError::ModuleIdNotValid);
        }

        let lock = self.shop_lock(shop_id);
        let _guard = lock.lock().await;

        let module_id = configuration.id.clone();
        let shop_configuration = load_shop_configuration(self.dao.as_ref(), shop_id)
            .await?
            .unwrap_or_default();
        let previous = shop_configuration.module_configuration(&module_id).cloned();
        let mut merged = self.merging.merge(shop_configuration, configuration);
        let active = self.state.is_active(&module_id, shop_id).await?;

        let staged = StagedSettingDao::new(self.dao.as_ref());
        if active {
            if let Some(stored) = merged.module_configuration_mut(&module_id) {
                stored.auto_active = true;
            }
        }
        save_shop_configuration(&staged, shop_id, &merged).await?;

        let installed = merged
            .module_configuration(&module_id)
            .cloned()
            .ok_or_else(|| ModuleSetupError::module_not_found(&module_id, shop_id))?;

        if let (true, Some(previous)) = (active, previous) {
            self.activation.project_deactivation(&staged, &previous, shop_id).await?;
            self.activation.validate(&staged, &installed, shop_id).await?;
            self.activation.project_activation(&staged, &installed, shop_id).await?;
        }
        staged.commit().await.map_err(ModuleSetupError::internal)?;

        tracing::info!(module_id = %module_id, shop_id, version = %installed.version, "Module installed");
        Ok(installed)
    }

    /// Remove a module from the shop, deactivating it first when needed
    pub async fn uninstall_module(&self, shop_id: ShopId, module_id: &str) -> Result<(), ModuleSetupError> {
        let lock = self.shop_lock(shop_id);
        let _guard = lock.lock().await;

        let mut shop_configuration = self.require_shop_configuration(shop_id).await?;
        let configuration = shop_configuration
            .remove_module_configuration(module_id)
            .ok_or_else(|| ModuleSetupError::module_not_found(module_id, shop_id))?;
        let was_active = self.state.is_active(module_id, shop_id).await?;

        let staged = StagedSettingDao::new(self.dao.as_ref());
        for extension in configuration.class_extensions() {
            if shop_configuration.is_class_extension_declared_by_other(module_id, extension) {
                continue;
            }
            shop_configuration.class_extensions_chain.remove(
                &extension.shop_class_namespace,
                &extension.module_extension_class_namespace,
            );
        }
        save_shop_configuration(&staged, shop_id, &shop_configuration).await?;
        if was_active {
            self.activation
                .project_deactivation(&staged, &configuration, shop_id)
                .await?;
        }
        staged.commit().await.map_err(ModuleSetupError::internal)?;

        if shop_configuration.module_ids().next().is_none() {
            self.release_shop_lock(shop_id, &lock);
        }

        tracing::info!(module_id, shop_id, was_active, "Module uninstalled");
        if was_active {
            self.activation
                .publish(ModuleEvent::deactivated(module_id, shop_id, configuration.event(ON_DEACTIVATE)))
                .await;
        }
        Ok(())
    }

    // ===== Activation =====

    pub async fn activate(&self, module_id: &str, shop_id: ShopId) -> Result<(), ModuleSetupError> {
        let lock = self.shop_lock(shop_id);
        let _guard = lock.lock().await;
        self.activation.activate(module_id, shop_id).await
    }

    pub async fn deactivate(&self, module_id: &str, shop_id: ShopId) -> Result<(), ModuleSetupError> {
        let lock = self.shop_lock(shop_id);
        let _guard = lock.lock().await;
        self.activation.deactivate(module_id, shop_id).await
    }

    pub async fn is_active(&self, module_id: &str, shop_id: ShopId) -> Result<bool, ModuleSetupError> {
        self.state.is_active(module_id, shop_id).await
    }

    // ===== Queries =====

    pub async fn get_module_configuration(
        &self,
        shop_id: ShopId,
        module_id: &str,
    ) -> Result<ModuleConfiguration, ModuleSetupError> {
        self.require_shop_configuration(shop_id)
            .await?
            .module_configuration(module_id)
            .cloned()
            .ok_or_else(|| ModuleSetupError::module_not_found(module_id, shop_id))
    }

    pub async fn get_shop_configuration(&self, shop_id: ShopId) -> Result<ShopConfiguration, ModuleSetupError> {
        self.require_shop_configuration(shop_id).await
    }

    pub async fn get_active_extension_chain(
        &self,
        shop_id: ShopId,
    ) -> Result<ClassExtensionsChain, ModuleSetupError> {
        self.resolver.get_active_extension_chain(shop_id).await
    }

    async fn require_shop_configuration(&self, shop_id: ShopId) -> Result<ShopConfiguration, ModuleSetupError> {
        load_shop_configuration(self.dao.as_ref(), shop_id)
            .await?
            .ok_or_else(|| ModuleSetupError::shop_not_found(shop_id))
    }
}
