//! Module declaration and lifecycle implementation

use crate::config::Config;
use crate::domain::{
    ConfiguredShopAdapter, EventPublisher, NoOpEventPublisher, Service, ShopAdapter,
    ShopConfigurationSettingDao,
};
use anyhow::Result;
use parking_lot::RwLock;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Module setup module
///
/// Owns the configuration and the domain service; the embedding application calls
/// `init` (or `init_with_database`) once and then mounts `router()`.
pub struct ModuleSetupModule {
    config: RwLock<Config>,
    service: RwLock<Option<Arc<Service>>>,
    event_publisher: RwLock<Arc<dyn EventPublisher>>,
}

impl Default for ModuleSetupModule {
    fn default() -> Self {
        Self {
            config: RwLock::new(Config::default()),
            service: RwLock::new(None),
            event_publisher: RwLock::new(Arc::new(NoOpEventPublisher)),
        }
    }
}

impl ModuleSetupModule {
    pub fn new(config: Config) -> Self {
        Self {
            config: RwLock::new(config),
            ..Self::default()
        }
    }

    /// Replace the default no-op event publisher; call before `init`
    pub fn with_event_publisher(self, event_publisher: Arc<dyn EventPublisher>) -> Self {
        *self.event_publisher.write() = event_publisher;
        self
    }

    /// Build the domain service over an existing settings store
    pub fn init(&self, dao: Arc<dyn ShopConfigurationSettingDao>) -> Result<Arc<Service>> {
        let config = self.config.read().clone();
        let shop_adapter: Arc<dyn ShopAdapter> = Arc::new(ConfiguredShopAdapter::new(&config));
        let event_publisher = self.event_publisher.read().clone();

        let service = Arc::new(Service::new(dao, shop_adapter, event_publisher, &config));
        *self.service.write() = Some(service.clone());

        tracing::info!(
            validate_class_extensions = config.validate_class_extensions,
            "Module setup initialized"
        );
        Ok(service)
    }

    /// Run migrations and build the domain service over the SeaORM settings store
    pub async fn init_with_database(&self, db: Arc<DatabaseConnection>) -> Result<Arc<Service>> {
        use crate::infra::storage::{Migrator, SeaOrmShopConfigurationSettingDao};
        use sea_orm_migration::MigratorTrait;

        Migrator::up(db.as_ref(), None).await?;
        tracing::info!("Module setup migrations completed");

        let shop_adapter = Arc::new(ConfiguredShopAdapter::new(&self.config.read()));
        let dao = Arc::new(SeaOrmShopConfigurationSettingDao::new(db, shop_adapter));
        self.init(dao)
    }

    /// Native client for in-process callers
    pub fn client(&self) -> Result<Arc<dyn crate::contract::ModuleSetupApi>> {
        let service = self.service()?;
        Ok(Arc::new(crate::api::native::NativeClient::new(service)))
    }

    /// REST routes of the module
    pub fn router(&self) -> Result<axum::Router> {
        let service = self.service()?;
        tracing::info!("Registering module setup REST routes");
        Ok(crate::api::rest::router(service))
    }

    fn service(&self) -> Result<Arc<Service>> {
        self.service
            .read()
            .as_ref()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Service not initialized"))
    }
}
