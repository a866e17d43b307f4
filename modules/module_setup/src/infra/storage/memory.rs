//! In-memory settings store

use crate::contract::{ShopConfigurationSetting, ShopId};
use crate::domain::repository::{SettingChange, ShopConfigurationSettingDao};
use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

type SettingKey = (ShopId, String);

/// Settings store kept in process memory
///
/// `apply` takes the write lock once, so a batch is visible all at once or not at all.
#[derive(Default)]
pub struct InMemoryShopConfigurationSettingDao {
    settings: RwLock<HashMap<SettingKey, ShopConfigurationSetting>>,
}

impl InMemoryShopConfigurationSettingDao {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored settings across all shops
    pub fn len(&self) -> usize {
        self.settings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.read().is_empty()
    }
}

#[async_trait]
impl ShopConfigurationSettingDao for InMemoryShopConfigurationSettingDao {
    async fn find(&self, name: &str, shop_id: ShopId) -> Result<Option<ShopConfigurationSetting>> {
        Ok(self.settings.read().get(&(shop_id, name.to_string())).cloned())
    }

    async fn save(&self, setting: &ShopConfigurationSetting) -> Result<()> {
        self.settings
            .write()
            .insert((setting.shop_id, setting.name.clone()), setting.clone());
        Ok(())
    }

    async fn delete(&self, name: &str, shop_id: ShopId) -> Result<()> {
        self.settings.write().remove(&(shop_id, name.to_string()));
        Ok(())
    }

    async fn apply(&self, changes: Vec<SettingChange>) -> Result<()> {
        let mut settings = self.settings.write();
        for change in changes {
            match change {
                SettingChange::Save(setting) => {
                    settings.insert((setting.shop_id, setting.name.clone()), setting);
                }
                SettingChange::Delete { name, shop_id } => {
                    settings.remove(&(shop_id, name));
                }
            }
        }
        Ok(())
    }
}
