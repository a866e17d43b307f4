//! Module Setup
//!
//! Reconciles the class extensions, controllers, templates and settings declared by
//! independently distributed modules into one deterministic configuration per shop,
//! and keeps it consistent across install, upgrade, activation and deactivation.

// Public exports
pub mod contract;
pub use contract::{
    client::ModuleSetupApi, error::ModuleSetupError, ClassExtension, ClassExtensionsChain,
    Controller, ModuleConfiguration, ModuleSetting, SettingKind, ShopConfiguration, ShopId,
    ShopModuleSetting, TemplateBlock,
};

pub mod module;
pub use module::ModuleSetupModule;

pub use config::Config;

// Internal modules (hidden from public API)
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
