//! SeaORM repository implementations

use crate::contract::{ShopConfigurationSetting, ShopId};
use crate::domain::repository::{SettingChange, ShopConfigurationSettingDao};
use crate::domain::shop_adapter::ShopAdapter;
use anyhow::Result;
use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait,
};
use std::sync::Arc;

use super::entity;
use super::mapper::to_active_model;

// ===== Shop Configuration Setting Store =====

pub struct SeaOrmShopConfigurationSettingDao {
    db: Arc<DatabaseConnection>,
    shop_adapter: Arc<dyn ShopAdapter>,
}

impl SeaOrmShopConfigurationSettingDao {
    pub fn new(db: Arc<DatabaseConnection>, shop_adapter: Arc<dyn ShopAdapter>) -> Self {
        Self { db, shop_adapter }
    }

    async fn delete_on<C: ConnectionTrait>(conn: &C, name: &str, shop_id: ShopId) -> Result<()> {
        entity::Entity::delete_many()
            .filter(entity::Column::ShopId.eq(shop_id))
            .filter(entity::Column::Name.eq(name))
            .exec(conn)
            .await?;
        Ok(())
    }

    /// Replace the row: delete, then insert with a fresh id
    async fn save_on<C: ConnectionTrait>(
        &self,
        conn: &C,
        setting: &ShopConfigurationSetting,
    ) -> Result<()> {
        Self::delete_on(conn, &setting.name, setting.shop_id).await?;
        let active = to_active_model(setting, self.shop_adapter.generate_unique_id());
        entity::Entity::insert(active).exec(conn).await?;
        Ok(())
    }
}

#[async_trait]
impl ShopConfigurationSettingDao for SeaOrmShopConfigurationSettingDao {
    async fn find(&self, name: &str, shop_id: ShopId) -> Result<Option<ShopConfigurationSetting>> {
        let result = entity::Entity::find()
            .filter(entity::Column::ShopId.eq(shop_id))
            .filter(entity::Column::Name.eq(name))
            .one(&*self.db)
            .await?;

        result.map(ShopConfigurationSetting::try_from).transpose()
    }

    async fn save(&self, setting: &ShopConfigurationSetting) -> Result<()> {
        let txn = self.db.begin().await?;
        self.save_on(&txn, setting).await?;
        txn.commit().await?;
        Ok(())
    }

    async fn delete(&self, name: &str, shop_id: ShopId) -> Result<()> {
        Self::delete_on(&*self.db, name, shop_id).await
    }

    async fn apply(&self, changes: Vec<SettingChange>) -> Result<()> {
        let txn = self.db.begin().await?;
        for change in &changes {
            match change {
                SettingChange::Save(setting) => self.save_on(&txn, setting).await?,
                SettingChange::Delete { name, shop_id } => Self::delete_on(&txn, name, *shop_id).await?,
            }
        }
        txn.commit().await?;

        tracing::debug!(changes = changes.len(), "Applied module setting changes");
        Ok(())
    }
}
