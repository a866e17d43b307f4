//! Contract layer - public API for inter-module communication
//!
//! This layer contains transport-agnostic models and the native client trait.

pub mod client;
pub mod error;
pub mod model;

pub use client::ModuleSetupApi;
pub use error::ModuleSetupError;
pub use model::{
    setting_names, ClassExtension, ClassExtensionsChain, Controller, ModuleConfiguration,
    ModuleSetting, SettingKind, ShopConfiguration, ShopConfigurationSetting, ShopId,
    ShopModuleSetting, ShopSettingType, ShopSettingValue, TemplateBlock,
};
