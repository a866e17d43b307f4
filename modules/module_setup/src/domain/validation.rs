//! Activation validators and JSON Schema checks
//!
//! Validators run against committed state before anything is staged; the first
//! failure aborts the activation with no state change.

use super::repository::{get_aggregate, ShopConfigurationSettingDao};
use super::shop_adapter::ShopAdapter;
use crate::contract::{setting_names, ModuleConfiguration, ModuleSetupError, ShopId};
use async_trait::async_trait;
use indexmap::IndexMap;
use jsonschema::Validator;
use serde_json::Value;
use std::sync::Arc;

/// Validate a value against a JSON Schema, returning the first violation
pub fn validate_against_schema(data: &Value, schema: &Value) -> Result<(), String> {
    let validator = Validator::new(schema).map_err(|e| format!("Invalid JSON Schema: {}", e))?;

    if let Err(error) = validator.validate(data) {
        return Err(error.to_string());
    }

    Ok(())
}

/// Pre-activation check of a module configuration
#[async_trait]
pub trait ModuleConfigurationValidator: Send + Sync {
    async fn validate(
        &self,
        dao: &dyn ShopConfigurationSettingDao,
        configuration: &ModuleConfiguration,
        shop_id: ShopId,
    ) -> Result<(), ModuleSetupError>;
}

/// Rejects controller ids or classes already taken by the host or another module
pub struct ControllersValidator {
    shop_adapter: Arc<dyn ShopAdapter>,
}

impl ControllersValidator {
    pub fn new(shop_adapter: Arc<dyn ShopAdapter>) -> Self {
        Self { shop_adapter }
    }

    /// Host controllers plus every other registered module's controllers
    async fn registered_controllers(
        &self,
        dao: &dyn ShopConfigurationSettingDao,
        own_module_key: &str,
        shop_id: ShopId,
    ) -> Result<IndexMap<String, String>, ModuleSetupError> {
        let mut registered = self.shop_adapter.get_shop_controller_class_map();

        let modules = get_aggregate(dao, setting_names::MODULE_CONTROLLERS, shop_id).await?;
        for (module_key, controllers) in modules {
            if module_key == own_module_key {
                continue;
            }
            if let Value::Object(controllers) = controllers {
                for (id, class) in controllers {
                    if let Value::String(class) = class {
                        registered.insert(id.to_lowercase(), class);
                    }
                }
            }
        }

        Ok(registered)
    }
}

#[async_trait]
impl ModuleConfigurationValidator for ControllersValidator {
    async fn validate(
        &self,
        dao: &dyn ShopConfigurationSettingDao,
        configuration: &ModuleConfiguration,
        shop_id: ShopId,
    ) -> Result<(), ModuleSetupError> {
        let controllers = configuration.controllers();
        if controllers.is_empty() {
            return Ok(());
        }

        let registered = self
            .registered_controllers(dao, &configuration.id.to_lowercase(), shop_id)
            .await?;

        let duplicated_keys: Vec<&str> = controllers
            .iter()
            .filter(|c| registered.contains_key(&c.id.to_lowercase()))
            .map(|c| c.id.as_str())
            .collect();
        if !duplicated_keys.is_empty() {
            return Err(ModuleSetupError::ControllerDuplication {
                details: format!("controller keys {}", duplicated_keys.join(", ")),
            });
        }

        let duplicated_classes: Vec<&str> = controllers
            .iter()
            .filter(|c| registered.values().any(|class| *class == c.controller_class_namespace))
            .map(|c| c.controller_class_namespace.as_str())
            .collect();
        if !duplicated_classes.is_empty() {
            return Err(ModuleSetupError::ControllerDuplication {
                details: format!("controller namespaces {}", duplicated_classes.join(", ")),
            });
        }

        Ok(())
    }
}

/// Rejects empty extensions and extensions of classes that are not meant to be extended
///
/// Empty class names are always rejected; the namespace checks can be switched off.
pub struct ClassExtensionsValidator {
    shop_adapter: Arc<dyn ShopAdapter>,
    check_namespaces: bool,
}

impl ClassExtensionsValidator {
    pub fn new(shop_adapter: Arc<dyn ShopAdapter>) -> Self {
        Self {
            shop_adapter,
            check_namespaces: true,
        }
    }

    pub fn with_namespace_checks(mut self, enabled: bool) -> Self {
        self.check_namespaces = enabled;
        self
    }

    fn validate_namespace(&self, shop_class: &str) -> Result<(), ModuleSetupError> {
        let invalid = |reason: &str| ModuleSetupError::InvalidClassExtensionNamespace {
            namespace: shop_class.to_string(),
            reason: reason.to_string(),
        };

        if !self.shop_adapter.is_namespace(shop_class) {
            // Legacy class names are resolved by the host at runtime
            return Ok(());
        }
        if self.shop_adapter.is_shop_edition_namespace(shop_class) {
            return Err(invalid("edition namespaces are reserved, extend the unified namespace instead"));
        }
        if self.shop_adapter.is_shop_unified_namespace(shop_class)
            && !self.shop_adapter.class_exists(shop_class)
        {
            return Err(invalid("class does not exist in the unified namespace"));
        }
        Ok(())
    }
}

#[async_trait]
impl ModuleConfigurationValidator for ClassExtensionsValidator {
    async fn validate(
        &self,
        _dao: &dyn ShopConfigurationSettingDao,
        configuration: &ModuleConfiguration,
        _shop_id: ShopId,
    ) -> Result<(), ModuleSetupError> {
        for extension in configuration.class_extensions() {
            if extension.shop_class_namespace.trim().is_empty()
                || extension.module_extension_class_namespace.trim().is_empty()
            {
                return Err(ModuleSetupError::InvalidClassExtensionNamespace {
                    namespace: extension.shop_class_namespace.clone(),
                    reason: format!(
                        "empty class name in extension '{}' => '{}'",
                        extension.shop_class_namespace, extension.module_extension_class_namespace
                    ),
                });
            }
            if self.check_namespaces {
                self.validate_namespace(&extension.shop_class_namespace)?;
            }
        }
        Ok(())
    }
}
