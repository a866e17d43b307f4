//! Module activation state machine
//!
//! `activate` validates against committed state, then projects the module through
//! every handler into a staged overlay together with the active flag and the updated
//! shop configuration. The overlay is committed with a single `apply`; any failure
//! before that leaves the store untouched.

use super::events::{EventPublisher, ModuleEvent, ON_ACTIVATE, ON_DEACTIVATE};
use super::handlers::ModuleConfigurationHandler;
use super::repository::{load_shop_configuration, save_shop_configuration, ShopConfigurationSettingDao};
use super::staging::StagedSettingDao;
use super::state::{active_module_ids, set_module_active};
use super::validation::ModuleConfigurationValidator;
use crate::contract::{ModuleConfiguration, ModuleSetupError, ShopConfiguration, ShopId};
use std::sync::Arc;

pub struct ModuleActivationService {
    dao: Arc<dyn ShopConfigurationSettingDao>,
    handlers: Vec<Box<dyn ModuleConfigurationHandler>>,
    validators: Vec<Box<dyn ModuleConfigurationValidator>>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl ModuleActivationService {
    pub fn new(
        dao: Arc<dyn ShopConfigurationSettingDao>,
        handlers: Vec<Box<dyn ModuleConfigurationHandler>>,
        validators: Vec<Box<dyn ModuleConfigurationValidator>>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            dao,
            handlers,
            validators,
            event_publisher,
        }
    }

    /// Activate a module for a shop. The caller holds the shop lock.
    pub async fn activate(&self, module_id: &str, shop_id: ShopId) -> Result<(), ModuleSetupError> {
        let (mut shop_configuration, configuration) = self.load(module_id, shop_id).await?;

        self.validate(self.dao.as_ref(), &configuration, shop_id).await?;

        let staged = StagedSettingDao::new(self.dao.as_ref());
        self.project_activation(&staged, &configuration, shop_id).await?;
        if let Some(stored) = shop_configuration.module_configuration_mut(module_id) {
            stored.auto_active = true;
        }
        save_shop_configuration(&staged, shop_id, &shop_configuration).await?;
        staged.commit().await.map_err(ModuleSetupError::internal)?;

        tracing::info!(module_id, shop_id, "Module activated");
        self.publish(ModuleEvent::activated(module_id, shop_id, configuration.event(ON_ACTIVATE)))
            .await;
        Ok(())
    }

    /// Deactivate a module for a shop. Validators are not consulted, and the
    /// deactivation event is only published when the module was active.
    pub async fn deactivate(&self, module_id: &str, shop_id: ShopId) -> Result<(), ModuleSetupError> {
        let (mut shop_configuration, configuration) = self.load(module_id, shop_id).await?;
        let was_active = active_module_ids(self.dao.as_ref(), shop_id)
            .await?
            .iter()
            .any(|id| id == module_id);

        let staged = StagedSettingDao::new(self.dao.as_ref());
        self.project_deactivation(&staged, &configuration, shop_id).await?;
        if let Some(stored) = shop_configuration.module_configuration_mut(module_id) {
            stored.auto_active = false;
        }
        save_shop_configuration(&staged, shop_id, &shop_configuration).await?;
        staged.commit().await.map_err(ModuleSetupError::internal)?;

        tracing::info!(module_id, shop_id, was_active, "Module deactivated");
        if was_active {
            self.publish(ModuleEvent::deactivated(module_id, shop_id, configuration.event(ON_DEACTIVATE)))
                .await;
        }
        Ok(())
    }

    /// Run every validator; the first failure wins
    pub async fn validate(
        &self,
        dao: &dyn ShopConfigurationSettingDao,
        configuration: &ModuleConfiguration,
        shop_id: ShopId,
    ) -> Result<(), ModuleSetupError> {
        for validator in &self.validators {
            if let Err(e) = validator.validate(dao, configuration, shop_id).await {
                tracing::warn!(module_id = %configuration.id, shop_id, error = %e, "Module validation failed");
                return Err(e);
            }
        }
        Ok(())
    }

    /// Project a module and mark it active, writing only to `dao`
    pub async fn project_activation(
        &self,
        dao: &dyn ShopConfigurationSettingDao,
        configuration: &ModuleConfiguration,
        shop_id: ShopId,
    ) -> Result<(), ModuleSetupError> {
        for handler in &self.handlers {
            if handler.can_handle(configuration) {
                tracing::debug!(module_id = %configuration.id, shop_id, handler = handler.name(), "Projecting module");
                handler
                    .handle_on_module_activation(dao, configuration, shop_id)
                    .await?;
            }
        }
        set_module_active(dao, &configuration.id, shop_id, true).await
    }

    /// Retract a module's projections and mark it inactive, writing only to `dao`
    pub async fn project_deactivation(
        &self,
        dao: &dyn ShopConfigurationSettingDao,
        configuration: &ModuleConfiguration,
        shop_id: ShopId,
    ) -> Result<(), ModuleSetupError> {
        for handler in &self.handlers {
            if handler.can_handle(configuration) {
                tracing::debug!(module_id = %configuration.id, shop_id, handler = handler.name(), "Retracting module");
                handler
                    .handle_on_module_deactivation(dao, configuration, shop_id)
                    .await?;
            }
        }
        set_module_active(dao, &configuration.id, shop_id, false).await
    }

    /// Hand an event to the publisher; a failure is logged and otherwise ignored
    pub async fn publish(&self, event: ModuleEvent) {
        let data = event.data().clone();
        if let Err(e) = self.event_publisher.publish(event).await {
            tracing::error!(
                module_id = %data.module_id,
                shop_id = data.shop_id,
                error = ?e,
                "Failed to publish module event"
            );
        }
    }

    async fn load(
        &self,
        module_id: &str,
        shop_id: ShopId,
    ) -> Result<(ShopConfiguration, ModuleConfiguration), ModuleSetupError> {
        let shop_configuration = load_shop_configuration(self.dao.as_ref(), shop_id)
            .await?
            .ok_or_else(|| ModuleSetupError::shop_not_found(shop_id))?;
        let configuration = shop_configuration
            .module_configuration(module_id)
            .cloned()
            .ok_or_else(|| ModuleSetupError::module_not_found(module_id, shop_id))?;
        Ok((shop_configuration, configuration))
    }
}
