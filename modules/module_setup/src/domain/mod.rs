//! Domain layer - business logic and services

pub mod activation;
pub mod events;
pub mod handlers;
pub mod mapper;
pub mod merging;
pub mod repository;
pub mod resolver;
pub mod service;
pub mod shop_adapter;
pub mod staging;
pub mod state;
pub mod validation;

pub use activation::ModuleActivationService;
pub use events::{EventPublisher, ModuleEvent, NoOpEventPublisher};
pub use handlers::{default_handlers, ModuleConfigurationHandler};
pub use mapper::ModuleConfigurationDataMapper;
pub use merging::ModuleConfigurationMergingService;
pub use repository::{SettingChange, ShopConfigurationSettingDao};
pub use resolver::ActiveClassExtensionChainResolver;
pub use service::Service;
pub use shop_adapter::{ConfiguredShopAdapter, ShopAdapter};
pub use validation::ModuleConfigurationValidator;
