//! Entity to model mappers
//!
//! Conversions between SeaORM entities and contract models

use super::entity;
use crate::contract::{ShopConfigurationSetting, ShopSettingType, ShopSettingValue};
use serde_json::Value;

impl TryFrom<entity::Model> for ShopConfigurationSetting {
    type Error = anyhow::Error;

    fn try_from(entity: entity::Model) -> Result<Self, Self::Error> {
        let setting_type = ShopSettingType::parse(&entity.var_type)
            .ok_or_else(|| anyhow::anyhow!("Unknown setting type '{}' for '{}'", entity.var_type, entity.name))?;

        let value = match (setting_type, entity.value) {
            (ShopSettingType::Array, value) => ShopSettingValue::Array(value),
            (ShopSettingType::Bool, Value::Bool(flag)) => ShopSettingValue::Bool(flag),
            (ShopSettingType::Int, Value::Number(number)) => ShopSettingValue::Int(
                number
                    .as_i64()
                    .ok_or_else(|| anyhow::anyhow!("Setting '{}' is not an integer", entity.name))?,
            ),
            (ShopSettingType::String, Value::String(text)) => ShopSettingValue::String(text),
            (setting_type, value) => anyhow::bail!(
                "Setting '{}' of type {} holds {}",
                entity.name,
                setting_type.as_str(),
                value
            ),
        };

        Ok(Self {
            name: entity.name,
            value,
            shop_id: entity.shop_id,
        })
    }
}

/// Build a fresh row for a setting
pub fn to_active_model(setting: &ShopConfigurationSetting, id: String) -> entity::ActiveModel {
    use sea_orm::ActiveValue::*;

    let value = match &setting.value {
        ShopSettingValue::Array(value) => value.clone(),
        ShopSettingValue::Bool(flag) => Value::Bool(*flag),
        ShopSettingValue::Int(number) => Value::from(*number),
        ShopSettingValue::String(text) => Value::String(text.clone()),
    };

    entity::ActiveModel {
        id: Set(id),
        shop_id: Set(setting.shop_id),
        name: Set(setting.name.clone()),
        var_type: Set(setting.setting_type().as_str().to_string()),
        value: Set(value),
        updated_at: Set(chrono::Utc::now()),
    }
}
