//! Module activation state
//!
//! Active module ids per shop, persisted as the `active_modules` setting.

use super::repository::ShopConfigurationSettingDao;
use crate::contract::{setting_names, ModuleSetupError, ShopConfigurationSetting, ShopId, ShopSettingValue};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Read the active module ids of a shop, in activation order
pub async fn active_module_ids(
    dao: &dyn ShopConfigurationSettingDao,
    shop_id: ShopId,
) -> Result<Vec<String>, ModuleSetupError> {
    let setting = dao
        .find(setting_names::ACTIVE_MODULES, shop_id)
        .await
        .map_err(ModuleSetupError::internal)?;

    match setting.map(|s| s.value) {
        None => Ok(Vec::new()),
        Some(ShopSettingValue::Array(Value::Array(ids))) => Ok(ids
            .into_iter()
            .filter_map(|id| id.as_str().map(str::to_string))
            .collect()),
        Some(other) => Err(ModuleSetupError::Internal {
            message: format!("Active module list for shop {} is malformed: {:?}", shop_id, other),
        }),
    }
}

/// Mark a module active or inactive; repeated transitions are no-ops
pub async fn set_module_active(
    dao: &dyn ShopConfigurationSettingDao,
    module_id: &str,
    shop_id: ShopId,
    active: bool,
) -> Result<(), ModuleSetupError> {
    let mut ids = active_module_ids(dao, shop_id).await?;
    let present = ids.iter().any(|id| id == module_id);

    match (active, present) {
        (true, false) => ids.push(module_id.to_string()),
        (false, true) => ids.retain(|id| id != module_id),
        _ => return Ok(()),
    }

    let result = if ids.is_empty() {
        dao.delete(setting_names::ACTIVE_MODULES, shop_id).await
    } else {
        dao.save(&ShopConfigurationSetting::new(
            setting_names::ACTIVE_MODULES,
            ShopSettingValue::Array(Value::from(ids)),
            shop_id,
        ))
        .await
    };
    result.map_err(ModuleSetupError::internal)
}

/// Current activation state of modules
#[async_trait]
pub trait ModuleStateProvider: Send + Sync {
    async fn is_active(&self, module_id: &str, shop_id: ShopId) -> Result<bool, ModuleSetupError>;

    async fn active_module_ids(&self, shop_id: ShopId) -> Result<Vec<String>, ModuleSetupError>;
}

/// State provider reading the persisted active module list
pub struct SettingModuleStateProvider {
    dao: Arc<dyn ShopConfigurationSettingDao>,
}

impl SettingModuleStateProvider {
    pub fn new(dao: Arc<dyn ShopConfigurationSettingDao>) -> Self {
        Self { dao }
    }
}

#[async_trait]
impl ModuleStateProvider for SettingModuleStateProvider {
    async fn is_active(&self, module_id: &str, shop_id: ShopId) -> Result<bool, ModuleSetupError> {
        let ids = active_module_ids(self.dao.as_ref(), shop_id).await?;
        Ok(ids.iter().any(|id| id == module_id))
    }

    async fn active_module_ids(&self, shop_id: ShopId) -> Result<Vec<String>, ModuleSetupError> {
        active_module_ids(self.dao.as_ref(), shop_id).await
    }
}
