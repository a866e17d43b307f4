//! SeaORM entities for database tables

use sea_orm::entity::prelude::*;

/// Shop-scoped module setting row
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "module_shop_settings")]
pub struct Model {
    /// Row id
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Shop the setting belongs to
    pub shop_id: i64,

    /// Setting name, unique per shop
    pub name: String,

    /// Value type tag (`arr`, `bool`, `int`, `str`)
    pub var_type: String,

    /// Setting value as JSON
    pub value: Json,

    /// Last update timestamp
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
