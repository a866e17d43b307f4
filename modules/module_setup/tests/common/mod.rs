//! Common test utilities and shared module fixtures

#![allow(dead_code)]

use async_trait::async_trait;
use module_setup::contract::*;
use module_setup::domain::repository::ShopConfigurationSettingDao;
use module_setup::domain::{
    ConfiguredShopAdapter, EventPublisher, ModuleConfigurationHandler, ModuleEvent, Service,
};
use module_setup::infra::storage::InMemoryShopConfigurationSettingDao;
use module_setup::Config;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;

pub const SHOP: ShopId = 1;
pub const OTHER_SHOP: ShopId = 2;

pub fn print_test_header(test_name: &str, purpose: &[&str]) {
    println!("\nTEST: {}", test_name);
    for line in purpose {
        println!("   {}", line);
    }
}

/// Host configuration with a couple of built-in controllers
pub fn shop_config() -> Config {
    let mut config = Config::default();
    config
        .shop_controllers
        .insert("start".to_string(), "OxidEsales\\Eshop\\Application\\Controller\\StartController".to_string());
    config
        .shop_controllers
        .insert("basket".to_string(), "OxidEsales\\Eshop\\Application\\Controller\\BasketController".to_string());
    config
}

pub struct TestContext {
    pub dao: Arc<InMemoryShopConfigurationSettingDao>,
    pub service: Arc<Service>,
    pub events: Arc<RecordingEventPublisher>,
}

/// Service over an in-memory store with a recording event publisher
pub fn setup() -> TestContext {
    let config = shop_config();
    let dao = Arc::new(InMemoryShopConfigurationSettingDao::new());
    let events = Arc::new(RecordingEventPublisher::default());
    let service = Arc::new(Service::new(
        dao.clone(),
        Arc::new(ConfiguredShopAdapter::new(&config)),
        events.clone(),
        &config,
    ));
    TestContext { dao, service, events }
}

/// Module declaring one extension per `(base, extension)` pair
pub fn module(id: &str, extensions: &[(&str, &str)]) -> ModuleConfiguration {
    let mut configuration = ModuleConfiguration::new(id);
    configuration.version = "1.0.0".to_string();
    configuration.path = format!("vendor/{}", id);
    for (base, extension) in extensions {
        configuration.add_class_extension(ClassExtension::new(*base, *extension));
    }
    configuration
}

pub fn module_with_controller(id: &str, controller_id: &str, class: &str) -> ModuleConfiguration {
    let mut configuration = module(id, &[]);
    configuration.add_controller(Controller::new(controller_id, class));
    configuration
}

/// Value of a stored setting, `None` when absent
pub async fn stored(dao: &InMemoryShopConfigurationSettingDao, name: &str, shop_id: ShopId) -> Option<Value> {
    dao.find(name, shop_id).await.unwrap().map(|s| match s.value {
        ShopSettingValue::Array(value) => value,
        ShopSettingValue::Bool(flag) => Value::Bool(flag),
        ShopSettingValue::Int(number) => Value::from(number),
        ShopSettingValue::String(text) => Value::String(text),
    })
}

/// Every shop-wide aggregate an activation may touch
pub async fn projection_snapshot(dao: &InMemoryShopConfigurationSettingDao, shop_id: ShopId) -> Vec<Option<Value>> {
    let mut snapshot = Vec::new();
    for name in [
        setting_names::MODULE_CONTROLLERS,
        setting_names::MODULE_TEMPLATES,
        setting_names::MODULE_SMARTY_PLUGIN_DIRECTORIES,
        setting_names::MODULE_TEMPLATE_BLOCKS,
        setting_names::MODULE_EVENTS,
        setting_names::MODULE_FILES,
        setting_names::MODULE_CLASS_EXTENSIONS,
        setting_names::MODULE_CLASS_EXTENSIONS_CHAIN,
        setting_names::ACTIVE_MODULES,
    ] {
        snapshot.push(stored(dao, name, shop_id).await);
    }
    snapshot
}

// ===== Test doubles =====

#[derive(Default)]
pub struct RecordingEventPublisher {
    pub events: Mutex<Vec<ModuleEvent>>,
}

#[async_trait]
impl EventPublisher for RecordingEventPublisher {
    async fn publish(&self, event: ModuleEvent) -> anyhow::Result<()> {
        self.events.lock().push(event);
        Ok(())
    }
}

pub struct FailingEventPublisher;

#[async_trait]
impl EventPublisher for FailingEventPublisher {
    async fn publish(&self, _event: ModuleEvent) -> anyhow::Result<()> {
        anyhow::bail!("broker unavailable")
    }
}

/// Handler that always fails, to exercise rollback of earlier projections
pub struct FailingHandler;

#[async_trait]
impl ModuleConfigurationHandler for FailingHandler {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn can_handle(&self, _configuration: &ModuleConfiguration) -> bool {
        true
    }

    async fn handle_on_module_activation(
        &self,
        _dao: &dyn ShopConfigurationSettingDao,
        _configuration: &ModuleConfiguration,
        _shop_id: ShopId,
    ) -> Result<(), ModuleSetupError> {
        Err(ModuleSetupError::Internal {
            message: "projection failed".to_string(),
        })
    }

    async fn handle_on_module_deactivation(
        &self,
        _dao: &dyn ShopConfigurationSettingDao,
        _configuration: &ModuleConfiguration,
        _shop_id: ShopId,
    ) -> Result<(), ModuleSetupError> {
        Err(ModuleSetupError::Internal {
            message: "projection failed".to_string(),
        })
    }
}
