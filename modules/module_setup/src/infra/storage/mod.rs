//! Storage layer - settings store implementations
//!
//! `memory` backs embedded use and tests, the SeaORM store backs deployments.

pub mod entity;
pub mod mapper;
pub mod memory;
pub mod migrations;
pub mod repositories;

pub use memory::InMemoryShopConfigurationSettingDao;
pub use migrations::Migrator;
pub use repositories::SeaOrmShopConfigurationSettingDao;
