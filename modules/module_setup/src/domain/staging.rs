//! Staged settings overlay
//!
//! Buffers writes on top of a base store so a multi-step operation can be committed
//! with one `apply` call, or dropped without a trace.

use super::repository::{SettingChange, ShopConfigurationSettingDao};
use crate::contract::{ShopConfigurationSetting, ShopId};
use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;

/// Write-buffering view over a settings store
pub struct StagedSettingDao<'a> {
    base: &'a dyn ShopConfigurationSettingDao,
    /// Pending changes, last write per (shop, name) wins
    changes: Mutex<Vec<SettingChange>>,
}

impl<'a> StagedSettingDao<'a> {
    pub fn new(base: &'a dyn ShopConfigurationSettingDao) -> Self {
        Self {
            base,
            changes: Mutex::new(Vec::new()),
        }
    }

    fn stage(&self, change: SettingChange) {
        let mut changes = self.changes.lock();
        changes.retain(|c| !(c.name() == change.name() && c.shop_id() == change.shop_id()));
        changes.push(change);
    }

    pub fn pending(&self) -> usize {
        self.changes.lock().len()
    }

    /// Commit all staged changes to the base store in one batch
    pub async fn commit(self) -> Result<()> {
        let changes = self.changes.into_inner();
        if changes.is_empty() {
            return Ok(());
        }
        self.base.apply(changes).await
    }
}

#[async_trait]
impl ShopConfigurationSettingDao for StagedSettingDao<'_> {
    async fn find(&self, name: &str, shop_id: ShopId) -> Result<Option<ShopConfigurationSetting>> {
        let staged = self
            .changes
            .lock()
            .iter()
            .find(|c| c.name() == name && c.shop_id() == shop_id)
            .cloned();
        match staged {
            Some(SettingChange::Save(setting)) => Ok(Some(setting)),
            Some(SettingChange::Delete { .. }) => Ok(None),
            None => self.base.find(name, shop_id).await,
        }
    }

    async fn save(&self, setting: &ShopConfigurationSetting) -> Result<()> {
        self.stage(SettingChange::Save(setting.clone()));
        Ok(())
    }

    async fn delete(&self, name: &str, shop_id: ShopId) -> Result<()> {
        self.stage(SettingChange::Delete {
            name: name.to_string(),
            shop_id,
        });
        Ok(())
    }

    async fn apply(&self, changes: Vec<SettingChange>) -> Result<()> {
        for change in changes {
            self.stage(change);
        }
        Ok(())
    }
}
