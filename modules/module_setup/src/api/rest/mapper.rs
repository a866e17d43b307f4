//! Mapper implementations for converting between DTOs and contract models

use super::dto::*;
use crate::contract;
use crate::domain::ModuleConfigurationDataMapper;

// ===== Module conversions =====

impl From<contract::ModuleConfiguration> for ModuleConfigurationDto {
    fn from(configuration: contract::ModuleConfiguration) -> Self {
        let metadata = ModuleConfigurationDataMapper.to_data(&configuration);
        Self {
            id: configuration.id,
            version: configuration.version,
            path: configuration.path,
            auto_active: configuration.auto_active,
            metadata,
        }
    }
}

// ===== Chain conversions =====

impl ClassExtensionsChainDto {
    pub fn new(shop_id: contract::ShopId, chain: &contract::ClassExtensionsChain) -> Self {
        Self {
            shop_id,
            chain: chain
                .iter()
                .map(|(base, extensions)| (base.clone(), extensions.clone()))
                .collect(),
        }
    }
}
