//! Repository traits for data access
//!
//! These traits define the settings store the module setup core is built on.
//! Implementations are in infra/storage.

use super::mapper::ModuleConfigurationDataMapper;
use crate::contract::{
    setting_names, ModuleSetupError, ShopConfiguration, ShopConfigurationSetting, ShopId,
    ShopSettingValue,
};
use anyhow::Result;
use async_trait::async_trait;

/// One pending write against the settings store
#[derive(Debug, Clone, PartialEq)]
pub enum SettingChange {
    Save(ShopConfigurationSetting),
    Delete { name: String, shop_id: ShopId },
}

impl SettingChange {
    pub fn name(&self) -> &str {
        match self {
            SettingChange::Save(setting) => &setting.name,
            SettingChange::Delete { name, .. } => name,
        }
    }

    pub fn shop_id(&self) -> ShopId {
        match self {
            SettingChange::Save(setting) => setting.shop_id,
            SettingChange::Delete { shop_id, .. } => *shop_id,
        }
    }
}

/// Named, shop-scoped, typed settings store
#[async_trait]
pub trait ShopConfigurationSettingDao: Send + Sync {
    /// Find a setting by name
    async fn find(&self, name: &str, shop_id: ShopId) -> Result<Option<ShopConfigurationSetting>>;

    /// Create or replace a setting
    async fn save(&self, setting: &ShopConfigurationSetting) -> Result<()>;

    /// Delete a setting; deleting an absent setting is not an error
    async fn delete(&self, name: &str, shop_id: ShopId) -> Result<()>;

    /// Commit a batch of changes; implementations must apply all or none
    async fn apply(&self, changes: Vec<SettingChange>) -> Result<()>;
}

/// Read a setting the caller requires to exist
pub async fn get_setting(
    dao: &dyn ShopConfigurationSettingDao,
    name: &str,
    shop_id: ShopId,
) -> Result<ShopConfigurationSetting, ModuleSetupError> {
    dao.find(name, shop_id)
        .await
        .map_err(ModuleSetupError::internal)?
        .ok_or_else(|| ModuleSetupError::EntryDoesNotExist {
            name: name.to_string(),
            shop_id,
        })
}

/// Read a shop-wide mapping aggregate, substituting an empty mapping when absent
pub async fn get_aggregate(
    dao: &dyn ShopConfigurationSettingDao,
    name: &str,
    shop_id: ShopId,
) -> Result<serde_json::Map<String, serde_json::Value>, ModuleSetupError> {
    match get_setting(dao, name, shop_id).await {
        Ok(setting) => match setting.value {
            ShopSettingValue::Array(serde_json::Value::Object(map)) => Ok(map),
            other => Err(ModuleSetupError::Internal {
                message: format!("Shop setting '{}' is not a mapping: {:?}", name, other),
            }),
        },
        Err(ModuleSetupError::EntryDoesNotExist { .. }) => Ok(serde_json::Map::new()),
        Err(e) => Err(e),
    }
}

/// Write a mapping aggregate back; an empty aggregate removes the entry
pub async fn put_aggregate(
    dao: &dyn ShopConfigurationSettingDao,
    name: &str,
    shop_id: ShopId,
    aggregate: serde_json::Map<String, serde_json::Value>,
) -> Result<(), ModuleSetupError> {
    let result = if aggregate.is_empty() {
        dao.delete(name, shop_id).await
    } else {
        let setting = ShopConfigurationSetting::new(
            name,
            ShopSettingValue::Array(serde_json::Value::Object(aggregate)),
            shop_id,
        );
        dao.save(&setting).await
    };
    result.map_err(ModuleSetupError::internal)
}

/// Load the stored shop configuration, `None` when nothing was installed for the shop
pub async fn load_shop_configuration(
    dao: &dyn ShopConfigurationSettingDao,
    shop_id: ShopId,
) -> Result<Option<ShopConfiguration>, ModuleSetupError> {
    let setting = match get_setting(dao, setting_names::SHOP_CONFIGURATION, shop_id).await {
        Ok(setting) => setting,
        Err(ModuleSetupError::EntryDoesNotExist { .. }) => return Ok(None),
        Err(e) => return Err(e),
    };
    match setting.value {
        ShopSettingValue::Array(data) => ModuleConfigurationDataMapper
            .shop_configuration_from_data(&data)
            .map(Some),
        other => Err(ModuleSetupError::Internal {
            message: format!("Shop configuration of shop {} has type {}", shop_id, other.setting_type().as_str()),
        }),
    }
}

/// Persist the whole shop configuration as one setting
pub async fn save_shop_configuration(
    dao: &dyn ShopConfigurationSettingDao,
    shop_id: ShopId,
    shop_configuration: &ShopConfiguration,
) -> Result<(), ModuleSetupError> {
    let data = ModuleConfigurationDataMapper.shop_configuration_to_data(shop_configuration);
    dao.save(&ShopConfigurationSetting::new(
        setting_names::SHOP_CONFIGURATION,
        ShopSettingValue::Array(data),
        shop_id,
    ))
    .await
    .map_err(ModuleSetupError::internal)
}
