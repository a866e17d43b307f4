//! Contract models for module setup
//!
//! These models are transport-agnostic and used for inter-module communication.
//! NO serde derives - encoding lives in the domain data mapper and the REST DTOs.

use indexmap::IndexMap;

/// Shop (tenant) identifier. Configuration and activation state are scoped by it.
pub type ShopId = i64;

/// Declared override of one host class by one module-provided class
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassExtension {
    /// The base class being overridden
    pub shop_class_namespace: String,
    /// The overriding module class
    pub module_extension_class_namespace: String,
}

impl ClassExtension {
    pub fn new(
        shop_class_namespace: impl Into<String>,
        module_extension_class_namespace: impl Into<String>,
    ) -> Self {
        Self {
            shop_class_namespace: shop_class_namespace.into(),
            module_extension_class_namespace: module_extension_class_namespace.into(),
        }
    }
}

/// Controller registered by a module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Controller {
    pub id: String,
    pub controller_class_namespace: String,
}

impl Controller {
    pub fn new(id: impl Into<String>, controller_class_namespace: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            controller_class_namespace: controller_class_namespace.into(),
        }
    }
}

/// Template block override declared by a module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateBlock {
    pub block: String,
    pub template: String,
    pub file: String,
    pub position: Option<String>,
    pub theme: Option<String>,
}

/// User-editable admin setting declared by a module
#[derive(Debug, Clone, PartialEq)]
pub struct ShopModuleSetting {
    pub name: String,
    pub group: Option<String>,
    /// Declared setting type (`str`, `bool`, `select`, `arr`, ...)
    pub r#type: String,
    pub position: Option<serde_json::Value>,
    pub constraints: Option<Vec<String>>,
    pub value: Option<serde_json::Value>,
}

/// Closed set of recognized module setting kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SettingKind {
    Controllers,
    Templates,
    TemplateBlocks,
    Events,
    ShopModuleSettings,
    SmartyPluginDirectories,
    ClassesWithoutNamespace,
}

impl SettingKind {
    pub const ALL: [SettingKind; 7] = [
        SettingKind::Controllers,
        SettingKind::Templates,
        SettingKind::TemplateBlocks,
        SettingKind::Events,
        SettingKind::ShopModuleSettings,
        SettingKind::SmartyPluginDirectories,
        SettingKind::ClassesWithoutNamespace,
    ];

    /// Key used for this kind in the normalized module data
    pub fn as_str(self) -> &'static str {
        match self {
            SettingKind::Controllers => "controllers",
            SettingKind::Templates => "templates",
            SettingKind::TemplateBlocks => "blocks",
            SettingKind::Events => "events",
            SettingKind::ShopModuleSettings => "settings",
            SettingKind::SmartyPluginDirectories => "smartyPluginDirectories",
            SettingKind::ClassesWithoutNamespace => "files",
        }
    }
}

impl std::fmt::Display for SettingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Module setting, tagged by kind with a typed payload
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleSetting {
    /// Controller id -> controller class
    Controllers(Vec<Controller>),
    /// Template name -> template path
    Templates(IndexMap<String, String>),
    TemplateBlocks(Vec<TemplateBlock>),
    /// Event name (`onActivate`, `onDeactivate`) -> callback
    Events(IndexMap<String, String>),
    ShopModuleSettings(Vec<ShopModuleSetting>),
    SmartyPluginDirectories(Vec<String>),
    /// Legacy class name -> file
    ClassesWithoutNamespace(IndexMap<String, String>),
}

impl ModuleSetting {
    pub fn kind(&self) -> SettingKind {
        match self {
            ModuleSetting::Controllers(_) => SettingKind::Controllers,
            ModuleSetting::Templates(_) => SettingKind::Templates,
            ModuleSetting::TemplateBlocks(_) => SettingKind::TemplateBlocks,
            ModuleSetting::Events(_) => SettingKind::Events,
            ModuleSetting::ShopModuleSettings(_) => SettingKind::ShopModuleSettings,
            ModuleSetting::SmartyPluginDirectories(_) => SettingKind::SmartyPluginDirectories,
            ModuleSetting::ClassesWithoutNamespace(_) => SettingKind::ClassesWithoutNamespace,
        }
    }

    /// Whether the setting carries anything worth projecting
    pub fn is_empty(&self) -> bool {
        match self {
            ModuleSetting::Controllers(v) => v.is_empty(),
            ModuleSetting::Templates(v) => v.is_empty(),
            ModuleSetting::TemplateBlocks(v) => v.is_empty(),
            ModuleSetting::Events(v) => v.is_empty(),
            ModuleSetting::ShopModuleSettings(v) => v.is_empty(),
            ModuleSetting::SmartyPluginDirectories(v) => v.is_empty(),
            ModuleSetting::ClassesWithoutNamespace(v) => v.is_empty(),
        }
    }
}

/// Declared configuration of one module
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModuleConfiguration {
    pub id: String,
    pub path: String,
    pub version: String,
    pub auto_active: bool,
    /// Language code -> title
    pub title: IndexMap<String, String>,
    /// Language code -> description
    pub description: IndexMap<String, String>,
    pub lang: String,
    pub thumbnail: String,
    pub author: String,
    pub url: String,
    pub email: String,
    settings: IndexMap<SettingKind, ModuleSetting>,
    class_extensions: Vec<ClassExtension>,
}

impl ModuleConfiguration {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Add or replace the setting of the same kind
    pub fn add_setting(&mut self, setting: ModuleSetting) -> &mut Self {
        self.settings.insert(setting.kind(), setting);
        self
    }

    pub fn setting(&self, kind: SettingKind) -> Option<&ModuleSetting> {
        self.settings.get(&kind)
    }

    pub fn has_setting(&self, kind: SettingKind) -> bool {
        self.settings.contains_key(&kind)
    }

    pub fn remove_setting(&mut self, kind: SettingKind) -> Option<ModuleSetting> {
        self.settings.shift_remove(&kind)
    }

    pub fn settings(&self) -> impl Iterator<Item = &ModuleSetting> {
        self.settings.values()
    }

    /// Append a class extension; a repeated declaration is ignored
    pub fn add_class_extension(&mut self, extension: ClassExtension) -> &mut Self {
        if !self.class_extensions.contains(&extension) {
            self.class_extensions.push(extension);
        }
        self
    }

    pub fn class_extensions(&self) -> &[ClassExtension] {
        &self.class_extensions
    }

    pub fn has_class_extensions(&self) -> bool {
        !self.class_extensions.is_empty()
    }

    pub fn has_class_extension(&self, module_extension_class_namespace: &str) -> bool {
        self.class_extensions
            .iter()
            .any(|e| e.module_extension_class_namespace == module_extension_class_namespace)
    }

    /// Register a controller, replacing any controller with the same id
    pub fn add_controller(&mut self, controller: Controller) -> &mut Self {
        let entry = self
            .settings
            .entry(SettingKind::Controllers)
            .or_insert_with(|| ModuleSetting::Controllers(Vec::new()));
        if let ModuleSetting::Controllers(controllers) = entry {
            match controllers.iter_mut().find(|c| c.id == controller.id) {
                Some(existing) => *existing = controller,
                None => controllers.push(controller),
            }
        }
        self
    }

    pub fn controllers(&self) -> &[Controller] {
        match self.settings.get(&SettingKind::Controllers) {
            Some(ModuleSetting::Controllers(controllers)) => controllers,
            _ => &[],
        }
    }

    /// Callback declared for a lifecycle event, if any
    pub fn event(&self, name: &str) -> Option<&str> {
        match self.settings.get(&SettingKind::Events) {
            Some(ModuleSetting::Events(events)) => events.get(name).map(String::as_str),
            _ => None,
        }
    }
}

/// Ordered extension classes per base class, across all modules ever merged
///
/// Order is the only carrier of override precedence: the earliest entry wraps innermost.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClassExtensionsChain {
    chain: IndexMap<String, Vec<String>>,
}

impl ClassExtensionsChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a chain from raw entries, dropping duplicate extensions and empty sequences
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<S>)>,
        S: Into<String>,
    {
        let mut chain = Self::new();
        for (base, extensions) in entries {
            let base = base.into();
            for extension in extensions {
                chain.append(&base, extension);
            }
        }
        chain
    }

    /// Append `extension` at the tail of `base`'s sequence unless it is already present
    pub fn append(&mut self, base: &str, extension: impl Into<String>) {
        let extension = extension.into();
        let sequence = self.chain.entry(base.to_string()).or_default();
        if !sequence.contains(&extension) {
            sequence.push(extension);
        }
    }

    /// Remove one occurrence of `extension`; an emptied base entry is dropped
    pub fn remove(&mut self, base: &str, extension: &str) {
        let Some(sequence) = self.chain.get_mut(base) else {
            return;
        };
        if let Some(position) = sequence.iter().position(|e| e == extension) {
            sequence.remove(position);
        }
        if sequence.is_empty() {
            self.chain.shift_remove(base);
        }
    }

    pub fn get(&self, base: &str) -> &[String] {
        self.chain.get(base).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.chain.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }
}

/// Everything installed for one shop
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShopConfiguration {
    module_configurations: IndexMap<String, ModuleConfiguration>,
    pub class_extensions_chain: ClassExtensionsChain,
}

impl ShopConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the configuration keyed by its id
    pub fn add_module_configuration(&mut self, configuration: ModuleConfiguration) -> &mut Self {
        self.module_configurations
            .insert(configuration.id.clone(), configuration);
        self
    }

    pub fn module_configuration(&self, module_id: &str) -> Option<&ModuleConfiguration> {
        self.module_configurations.get(module_id)
    }

    pub fn module_configuration_mut(&mut self, module_id: &str) -> Option<&mut ModuleConfiguration> {
        self.module_configurations.get_mut(module_id)
    }

    pub fn remove_module_configuration(&mut self, module_id: &str) -> Option<ModuleConfiguration> {
        self.module_configurations.shift_remove(module_id)
    }

    pub fn module_configurations(&self) -> impl Iterator<Item = &ModuleConfiguration> {
        self.module_configurations.values()
    }

    pub fn module_ids(&self) -> impl Iterator<Item = &String> {
        self.module_configurations.keys()
    }

    /// Whether a module other than `module_id` declares the same extension
    pub fn is_class_extension_declared_by_other(&self, module_id: &str, extension: &ClassExtension) -> bool {
        self.module_configurations
            .values()
            .filter(|module| module.id != module_id)
            .any(|module| module.class_extensions().contains(extension))
    }
}

/// Type tag of a persisted shop setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShopSettingType {
    Array,
    Bool,
    Int,
    String,
}

impl ShopSettingType {
    pub fn as_str(self) -> &'static str {
        match self {
            ShopSettingType::Array => "arr",
            ShopSettingType::Bool => "bool",
            ShopSettingType::Int => "int",
            ShopSettingType::String => "str",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "arr" => Some(ShopSettingType::Array),
            "bool" => Some(ShopSettingType::Bool),
            "int" => Some(ShopSettingType::Int),
            "str" => Some(ShopSettingType::String),
            _ => None,
        }
    }
}

/// Typed value of a persisted shop setting
#[derive(Debug, Clone, PartialEq)]
pub enum ShopSettingValue {
    /// Nested mapping or sequence
    Array(serde_json::Value),
    Bool(bool),
    Int(i64),
    String(String),
}

impl ShopSettingValue {
    pub fn setting_type(&self) -> ShopSettingType {
        match self {
            ShopSettingValue::Array(_) => ShopSettingType::Array,
            ShopSettingValue::Bool(_) => ShopSettingType::Bool,
            ShopSettingValue::Int(_) => ShopSettingType::Int,
            ShopSettingValue::String(_) => ShopSettingType::String,
        }
    }

    pub fn empty_array() -> Self {
        ShopSettingValue::Array(serde_json::Value::Object(serde_json::Map::new()))
    }
}

/// Well-known shop-wide setting names
pub mod setting_names {
    /// module id -> { controller id -> controller class }
    pub const MODULE_CONTROLLERS: &str = "module_controllers";
    /// module id -> { template -> path }
    pub const MODULE_TEMPLATES: &str = "module_templates";
    /// module id -> [ directory ]
    pub const MODULE_SMARTY_PLUGIN_DIRECTORIES: &str = "module_smarty_plugin_directories";
    /// module id -> [ template block ]
    pub const MODULE_TEMPLATE_BLOCKS: &str = "module_template_blocks";
    /// module id -> { event -> callback }
    pub const MODULE_EVENTS: &str = "module_events";
    /// module id -> { class -> file }
    pub const MODULE_FILES: &str = "module_files";
    /// module id -> [ extension class ]
    pub const MODULE_CLASS_EXTENSIONS: &str = "module_class_extensions";
    /// base class -> [ active extension class ]
    pub const MODULE_CLASS_EXTENSIONS_CHAIN: &str = "module_class_extensions_chain";
    /// [ module id ]
    pub const ACTIVE_MODULES: &str = "active_modules";
    /// Encoded shop configuration aggregate
    pub const SHOP_CONFIGURATION: &str = "shop_configuration";
}

/// Persisted, shop-scoped, typed setting
#[derive(Debug, Clone, PartialEq)]
pub struct ShopConfigurationSetting {
    pub name: String,
    pub value: ShopSettingValue,
    pub shop_id: ShopId,
}

impl ShopConfigurationSetting {
    pub fn new(name: impl Into<String>, value: ShopSettingValue, shop_id: ShopId) -> Self {
        Self {
            name: name.into(),
            value,
            shop_id,
        }
    }

    pub fn setting_type(&self) -> ShopSettingType {
        self.value.setting_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_is_idempotent() {
        let mut once = ClassExtensionsChain::new();
        once.append("shopClass", "ext");

        let mut twice = ClassExtensionsChain::new();
        twice.append("shopClass", "ext");
        twice.append("shopClass", "ext");

        assert_eq!(once, twice);
        assert_eq!(twice.get("shopClass"), ["ext".to_string()]);
    }

    #[test]
    fn test_append_keeps_existing_order() {
        let mut chain = ClassExtensionsChain::from_entries([(
            "shopClass",
            vec!["already1", "already2"],
        )]);
        chain.append("shopClass", "new1");

        assert_eq!(chain.get("shopClass"), ["already1", "already2", "new1"]);
    }

    #[test]
    fn test_remove_preserves_rest_and_drops_empty_base() {
        let mut chain = ClassExtensionsChain::from_entries([
            ("shopClass", vec!["a", "b", "c"]),
            ("x", vec!["onlyExt"]),
        ]);

        chain.remove("shopClass", "b");
        chain.remove("x", "onlyExt");
        chain.remove("missing", "whatever");

        assert_eq!(chain.get("shopClass"), ["a", "c"]);
        assert!(chain.get("x").is_empty());
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn test_chain_equality_is_structural() {
        let left = ClassExtensionsChain::from_entries([("a", vec!["1"]), ("b", vec!["2"])]);
        let right = ClassExtensionsChain::from_entries([("b", vec!["2"]), ("a", vec!["1"])]);
        let reordered = ClassExtensionsChain::from_entries([("a", vec!["1", "3"])]);

        assert_eq!(left, right);
        assert_ne!(left, reordered);
    }

    #[test]
    fn test_module_configuration_settings_unique_by_kind() {
        let mut configuration = ModuleConfiguration::new("module");
        configuration.add_setting(ModuleSetting::SmartyPluginDirectories(vec!["a".into()]));
        configuration.add_setting(ModuleSetting::SmartyPluginDirectories(vec!["b".into()]));

        assert_eq!(configuration.settings().count(), 1);
        assert_eq!(
            configuration.setting(SettingKind::SmartyPluginDirectories),
            Some(&ModuleSetting::SmartyPluginDirectories(vec!["b".into()]))
        );
    }

    #[test]
    fn test_controllers_unique_by_id() {
        let mut configuration = ModuleConfiguration::new("module");
        configuration
            .add_controller(Controller::new("ctrl", "Old"))
            .add_controller(Controller::new("other", "Other"))
            .add_controller(Controller::new("ctrl", "New"));

        assert_eq!(
            configuration.controllers(),
            [Controller::new("ctrl", "New"), Controller::new("other", "Other")]
        );
        assert!(configuration.has_setting(SettingKind::Controllers));
    }
}
