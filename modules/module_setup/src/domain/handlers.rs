//! Projection of module settings into shop-wide aggregates
//!
//! Every handler reads one aggregate, adds or removes the module's entry, and writes
//! the aggregate back. Handlers receive the settings store per call so the activation
//! service can point them at a staged overlay.

use super::repository::{get_aggregate, load_shop_configuration, put_aggregate, ShopConfigurationSettingDao};
use super::resolver::resolve_active_chain;
use super::state::active_module_ids;
use crate::contract::{
    setting_names, ModuleConfiguration, ModuleSetting, ModuleSetupError, SettingKind, ShopId,
};
use async_trait::async_trait;
use serde_json::{json, Map, Value};

/// Projects one part of a module configuration on activation, and retracts it on deactivation
#[async_trait]
pub trait ModuleConfigurationHandler: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Whether the configuration declares anything this handler projects
    fn can_handle(&self, configuration: &ModuleConfiguration) -> bool;

    async fn handle_on_module_activation(
        &self,
        dao: &dyn ShopConfigurationSettingDao,
        configuration: &ModuleConfiguration,
        shop_id: ShopId,
    ) -> Result<(), ModuleSetupError>;

    async fn handle_on_module_deactivation(
        &self,
        dao: &dyn ShopConfigurationSettingDao,
        configuration: &ModuleConfiguration,
        shop_id: ShopId,
    ) -> Result<(), ModuleSetupError>;
}

/// Handlers in projection order
pub fn default_handlers() -> Vec<Box<dyn ModuleConfigurationHandler>> {
    vec![
        Box::new(ClassExtensionsHandler),
        Box::new(SettingAggregateHandler::new(SettingKind::Controllers)),
        Box::new(SettingAggregateHandler::new(SettingKind::Templates)),
        Box::new(SettingAggregateHandler::new(SettingKind::SmartyPluginDirectories)),
        Box::new(SettingAggregateHandler::new(SettingKind::TemplateBlocks)),
        Box::new(SettingAggregateHandler::new(SettingKind::Events)),
        Box::new(SettingAggregateHandler::new(SettingKind::ClassesWithoutNamespace)),
    ]
}

async fn set_aggregate_entry(
    dao: &dyn ShopConfigurationSettingDao,
    setting: &str,
    shop_id: ShopId,
    key: String,
    value: Value,
) -> Result<(), ModuleSetupError> {
    let mut aggregate = get_aggregate(dao, setting, shop_id).await?;
    aggregate.insert(key, value);
    put_aggregate(dao, setting, shop_id, aggregate).await
}

async fn remove_aggregate_entry(
    dao: &dyn ShopConfigurationSettingDao,
    setting: &str,
    shop_id: ShopId,
    key: &str,
) -> Result<(), ModuleSetupError> {
    let mut aggregate = get_aggregate(dao, setting, shop_id).await?;
    if aggregate.shift_remove(key).is_none() {
        return Ok(());
    }
    put_aggregate(dao, setting, shop_id, aggregate).await
}

/// Maintains the per-module extension list and the resolved active chain
pub struct ClassExtensionsHandler;

impl ClassExtensionsHandler {
    /// Recompute the active chain with `module_id` forced on or off
    async fn save_active_chain(
        &self,
        dao: &dyn ShopConfigurationSettingDao,
        module_id: &str,
        active: bool,
        shop_id: ShopId,
    ) -> Result<(), ModuleSetupError> {
        let shop_configuration = load_shop_configuration(dao, shop_id).await?.unwrap_or_default();
        let active_ids = active_module_ids(dao, shop_id).await?;

        let chain = resolve_active_chain(&shop_configuration, |id| {
            if id == module_id {
                active
            } else {
                active_ids.iter().any(|active_id| active_id == id)
            }
        });

        let aggregate: Map<String, Value> = chain
            .iter()
            .map(|(base, extensions)| (base.clone(), json!(extensions)))
            .collect();
        put_aggregate(dao, setting_names::MODULE_CLASS_EXTENSIONS_CHAIN, shop_id, aggregate).await
    }
}

#[async_trait]
impl ModuleConfigurationHandler for ClassExtensionsHandler {
    fn name(&self) -> &'static str {
        "class_extensions"
    }

    fn can_handle(&self, configuration: &ModuleConfiguration) -> bool {
        configuration.has_class_extensions()
    }

    async fn handle_on_module_activation(
        &self,
        dao: &dyn ShopConfigurationSettingDao,
        configuration: &ModuleConfiguration,
        shop_id: ShopId,
    ) -> Result<(), ModuleSetupError> {
        let extensions: Vec<&str> = configuration
            .class_extensions()
            .iter()
            .map(|e| e.module_extension_class_namespace.as_str())
            .collect();
        set_aggregate_entry(
            dao,
            setting_names::MODULE_CLASS_EXTENSIONS,
            shop_id,
            configuration.id.clone(),
            json!(extensions),
        )
        .await?;

        self.save_active_chain(dao, &configuration.id, true, shop_id).await
    }

    async fn handle_on_module_deactivation(
        &self,
        dao: &dyn ShopConfigurationSettingDao,
        configuration: &ModuleConfiguration,
        shop_id: ShopId,
    ) -> Result<(), ModuleSetupError> {
        remove_aggregate_entry(dao, setting_names::MODULE_CLASS_EXTENSIONS, shop_id, &configuration.id).await?;

        self.save_active_chain(dao, &configuration.id, false, shop_id).await
    }
}

/// Projects one setting kind into its shop-wide `module id -> payload` aggregate
pub struct SettingAggregateHandler {
    kind: SettingKind,
}

impl SettingAggregateHandler {
    pub fn new(kind: SettingKind) -> Self {
        Self { kind }
    }

    /// Aggregate the kind is projected into; shop module settings stay in the shop configuration
    fn setting_name(&self) -> Option<&'static str> {
        match self.kind {
            SettingKind::Controllers => Some(setting_names::MODULE_CONTROLLERS),
            SettingKind::Templates => Some(setting_names::MODULE_TEMPLATES),
            SettingKind::TemplateBlocks => Some(setting_names::MODULE_TEMPLATE_BLOCKS),
            SettingKind::Events => Some(setting_names::MODULE_EVENTS),
            SettingKind::SmartyPluginDirectories => Some(setting_names::MODULE_SMARTY_PLUGIN_DIRECTORIES),
            SettingKind::ClassesWithoutNamespace => Some(setting_names::MODULE_FILES),
            SettingKind::ShopModuleSettings => None,
        }
    }

    /// Controllers are keyed by lowercase module id, everything else by the id as declared
    fn module_key(&self, configuration: &ModuleConfiguration) -> String {
        match self.kind {
            SettingKind::Controllers => configuration.id.to_lowercase(),
            _ => configuration.id.clone(),
        }
    }
}

fn project(setting: &ModuleSetting) -> Option<Value> {
    let value = match setting {
        ModuleSetting::Controllers(controllers) => Value::Object(
            controllers
                .iter()
                .map(|c| (c.id.to_lowercase(), Value::String(c.controller_class_namespace.clone())))
                .collect(),
        ),
        ModuleSetting::Templates(map)
        | ModuleSetting::Events(map)
        | ModuleSetting::ClassesWithoutNamespace(map) => json!(map),
        ModuleSetting::TemplateBlocks(blocks) => Value::Array(
            blocks
                .iter()
                .map(|b| {
                    json!({
                        "block": b.block,
                        "template": b.template,
                        "file": b.file,
                        "position": b.position,
                        "theme": b.theme,
                    })
                })
                .collect(),
        ),
        ModuleSetting::SmartyPluginDirectories(directories) => json!(directories),
        ModuleSetting::ShopModuleSettings(_) => return None,
    };
    Some(value)
}

#[async_trait]
impl ModuleConfigurationHandler for SettingAggregateHandler {
    fn name(&self) -> &'static str {
        self.kind.as_str()
    }

    fn can_handle(&self, configuration: &ModuleConfiguration) -> bool {
        self.setting_name().is_some()
            && configuration
                .setting(self.kind)
                .is_some_and(|setting| !setting.is_empty())
    }

    async fn handle_on_module_activation(
        &self,
        dao: &dyn ShopConfigurationSettingDao,
        configuration: &ModuleConfiguration,
        shop_id: ShopId,
    ) -> Result<(), ModuleSetupError> {
        let (Some(name), Some(value)) = (
            self.setting_name(),
            configuration.setting(self.kind).and_then(project),
        ) else {
            return Ok(());
        };
        set_aggregate_entry(dao, name, shop_id, self.module_key(configuration), value).await
    }

    async fn handle_on_module_deactivation(
        &self,
        dao: &dyn ShopConfigurationSettingDao,
        configuration: &ModuleConfiguration,
        shop_id: ShopId,
    ) -> Result<(), ModuleSetupError> {
        let Some(name) = self.setting_name() else {
            return Ok(());
        };
        remove_aggregate_entry(dao, name, shop_id, &self.module_key(configuration)).await
    }
}
