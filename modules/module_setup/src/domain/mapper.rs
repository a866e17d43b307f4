//! Module configuration data mapper
//!
//! Converts between the normalized key/value module data (as produced by the
//! metadata normalizer, or as persisted inside the shop configuration) and the
//! contract models. Input is checked against the recognized key set and a JSON
//! schema per key before it is deserialized.

use crate::contract::{
    ClassExtension, ClassExtensionsChain, Controller, ModuleConfiguration, ModuleSetting,
    ModuleSetupError, SettingKind, ShopConfiguration, ShopModuleSetting, TemplateBlock,
};
use crate::domain::validation::validate_against_schema;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

const KEY_ID: &str = "id";
const KEY_PATH: &str = "path";
const KEY_VERSION: &str = "version";
const KEY_AUTO_ACTIVE: &str = "autoActive";
const KEY_TITLE: &str = "title";
const KEY_DESCRIPTION: &str = "description";
const KEY_LANG: &str = "lang";
const KEY_THUMBNAIL: &str = "thumbnail";
const KEY_AUTHOR: &str = "author";
const KEY_URL: &str = "url";
const KEY_EMAIL: &str = "email";
const KEY_EXTEND: &str = "extend";

const SHOP_KEY_MODULES: &str = "modules";
const SHOP_KEY_CHAIN: &str = "classExtensionsChain";

/// Fallback language for a plain-string title or description
const DEFAULT_LANG: &str = "en";

/// Keys accepted in normalized module data
pub const RECOGNIZED_KEYS: [&str; 19] = [
    KEY_ID,
    KEY_PATH,
    KEY_VERSION,
    KEY_AUTO_ACTIVE,
    KEY_TITLE,
    KEY_DESCRIPTION,
    KEY_LANG,
    KEY_THUMBNAIL,
    KEY_AUTHOR,
    KEY_URL,
    KEY_EMAIL,
    KEY_EXTEND,
    "controllers",
    "templates",
    "blocks",
    "settings",
    "events",
    "smartyPluginDirectories",
    "files",
];

/// JSON schema for the value of one recognized key
fn schema_for(key: &str) -> Value {
    let string_map = json!({ "type": "object", "additionalProperties": { "type": "string" } });
    match key {
        KEY_AUTO_ACTIVE => json!({ "type": "boolean" }),
        KEY_VERSION => json!({ "type": ["string", "number"] }),
        KEY_TITLE | KEY_DESCRIPTION => json!({
            "type": ["string", "object"],
            "additionalProperties": { "type": "string" }
        }),
        KEY_EXTEND | "controllers" | "templates" | "events" | "files" => string_map,
        "smartyPluginDirectories" => json!({ "type": "array", "items": { "type": "string" } }),
        "blocks" => json!({
            "type": "array",
            "items": {
                "type": "object",
                "required": ["block", "template", "file"],
                "additionalProperties": false,
                "properties": {
                    "block": { "type": "string" },
                    "template": { "type": "string" },
                    "file": { "type": "string" },
                    "theme": { "type": "string" },
                    "position": { "type": ["string", "integer"] }
                }
            }
        }),
        "settings" => json!({
            "type": "array",
            "items": {
                "type": "object",
                "required": ["name", "type"],
                "additionalProperties": false,
                "properties": {
                    "name": { "type": "string", "minLength": 1 },
                    "group": { "type": "string" },
                    "type": { "type": "string" },
                    "position": { "type": ["string", "integer"] },
                    "constraints": {
                        "type": ["string", "array"],
                        "items": { "type": "string" }
                    },
                    "value": {}
                }
            }
        }),
        _ => json!({ "type": "string" }),
    }
}

// ===== Wire shapes =====

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LocalizedJson {
    Text(String),
    Map(IndexMap<String, String>),
}

#[derive(Debug, Serialize, Deserialize)]
struct TemplateBlockJson {
    block: String,
    template: String,
    file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    position: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ConstraintsJson {
    List(Vec<String>),
    /// Legacy `a|b|c` notation
    Piped(String),
}

#[derive(Debug, Deserialize)]
struct ShopModuleSettingIn {
    name: String,
    #[serde(default)]
    group: Option<String>,
    r#type: String,
    #[serde(default)]
    position: Option<Value>,
    #[serde(default)]
    constraints: Option<ConstraintsJson>,
    #[serde(default)]
    value: Option<Value>,
}

#[derive(Debug, Serialize)]
struct ShopModuleSettingOut<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<&'a str>,
    r#type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    constraints: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<&'a Value>,
}

/// Maps normalized module data to and from `ModuleConfiguration`
#[derive(Debug, Clone, Copy, Default)]
pub struct ModuleConfigurationDataMapper;

impl ModuleConfigurationDataMapper {
    /// Build a configuration from normalized module data
    pub fn from_data(&self, data: &Value) -> Result<ModuleConfiguration, ModuleSetupError> {
        let object = data
            .as_object()
            .ok_or_else(|| ModuleSetupError::UnsupportedMetadataValueType {
                key: "<root>".to_string(),
                details: "module data must be a mapping".to_string(),
            })?;

        if let Some(key) = object
            .keys()
            .find(|key| !RECOGNIZED_KEYS.contains(&key.as_str()))
        {
            return Err(ModuleSetupError::UnsupportedMetadataKey { key: key.clone() });
        }

        for (key, value) in object {
            validate_against_schema(value, &schema_for(key)).map_err(|details| {
                ModuleSetupError::UnsupportedMetadataValueType {
                    key: key.clone(),
                    details,
                }
            })?;
        }

        let id = string_field(object, KEY_ID);
        if id.trim().is_empty() {
            return Err(ModuleSetupError::ModuleIdNotValid);
        }

        let lang = string_field(object, KEY_LANG);
        let mut configuration = ModuleConfiguration::new(id);
        configuration.path = string_field(object, KEY_PATH);
        configuration.version = object.get(KEY_VERSION).map(scalar_to_string).unwrap_or_default();
        configuration.auto_active = object
            .get(KEY_AUTO_ACTIVE)
            .and_then(Value::as_bool)
            .unwrap_or(false);
        configuration.title = localized(object, KEY_TITLE, &lang)?;
        configuration.description = localized(object, KEY_DESCRIPTION, &lang)?;
        configuration.thumbnail = string_field(object, KEY_THUMBNAIL);
        configuration.author = string_field(object, KEY_AUTHOR);
        configuration.url = string_field(object, KEY_URL);
        configuration.email = string_field(object, KEY_EMAIL);
        configuration.lang = lang;

        if let Some(extend) = object.get(KEY_EXTEND) {
            for (shop_class, module_class) in decode::<IndexMap<String, String>>(KEY_EXTEND, extend)? {
                configuration.add_class_extension(ClassExtension::new(shop_class, module_class));
            }
        }

        for kind in SettingKind::ALL {
            if let Some(value) = object.get(kind.as_str()) {
                configuration.add_setting(setting_from_value(kind, value)?);
            }
        }

        Ok(configuration)
    }

    /// Render a configuration as normalized module data
    pub fn to_data(&self, configuration: &ModuleConfiguration) -> Value {
        let mut data = Map::new();
        data.insert(KEY_ID.into(), Value::String(configuration.id.clone()));
        data.insert(KEY_PATH.into(), Value::String(configuration.path.clone()));
        data.insert(KEY_VERSION.into(), Value::String(configuration.version.clone()));
        data.insert(KEY_AUTO_ACTIVE.into(), Value::Bool(configuration.auto_active));
        data.insert(KEY_TITLE.into(), string_map_value(&configuration.title));
        data.insert(KEY_DESCRIPTION.into(), string_map_value(&configuration.description));
        data.insert(KEY_LANG.into(), Value::String(configuration.lang.clone()));
        data.insert(KEY_THUMBNAIL.into(), Value::String(configuration.thumbnail.clone()));
        data.insert(KEY_AUTHOR.into(), Value::String(configuration.author.clone()));
        data.insert(KEY_URL.into(), Value::String(configuration.url.clone()));
        data.insert(KEY_EMAIL.into(), Value::String(configuration.email.clone()));

        if configuration.has_class_extensions() {
            let extend: Map<String, Value> = configuration
                .class_extensions()
                .iter()
                .map(|e| {
                    (
                        e.shop_class_namespace.clone(),
                        Value::String(e.module_extension_class_namespace.clone()),
                    )
                })
                .collect();
            data.insert(KEY_EXTEND.into(), Value::Object(extend));
        }

        for setting in configuration.settings() {
            data.insert(setting.kind().as_str().into(), setting_to_value(setting));
        }

        Value::Object(data)
    }

    /// Encode a whole shop configuration for persistence
    pub fn shop_configuration_to_data(&self, shop_configuration: &ShopConfiguration) -> Value {
        let modules: Map<String, Value> = shop_configuration
            .module_configurations()
            .map(|c| (c.id.clone(), self.to_data(c)))
            .collect();
        let chain: Map<String, Value> = shop_configuration
            .class_extensions_chain
            .iter()
            .map(|(base, extensions)| (base.clone(), json!(extensions)))
            .collect();

        json!({ SHOP_KEY_MODULES: modules, SHOP_KEY_CHAIN: chain })
    }

    /// Decode a persisted shop configuration
    pub fn shop_configuration_from_data(
        &self,
        data: &Value,
    ) -> Result<ShopConfiguration, ModuleSetupError> {
        let mut shop_configuration = ShopConfiguration::new();

        if let Some(modules) = data.get(SHOP_KEY_MODULES) {
            let modules = modules.as_object().ok_or_else(|| ModuleSetupError::Internal {
                message: "stored module configurations are not a mapping".to_string(),
            })?;
            for module_data in modules.values() {
                shop_configuration.add_module_configuration(self.from_data(module_data)?);
            }
        }

        if let Some(chain) = data.get(SHOP_KEY_CHAIN) {
            let entries: IndexMap<String, Vec<String>> = serde_json::from_value(chain.clone())
                .map_err(|e| ModuleSetupError::Internal {
                    message: format!("stored class extensions chain is malformed: {}", e),
                })?;
            shop_configuration.class_extensions_chain = ClassExtensionsChain::from_entries(entries);
        }

        Ok(shop_configuration)
    }
}

// ===== Helpers =====

fn decode<T: for<'de> Deserialize<'de>>(key: &str, value: &Value) -> Result<T, ModuleSetupError> {
    serde_json::from_value(value.clone()).map_err(|e| ModuleSetupError::UnsupportedMetadataValueType {
        key: key.to_string(),
        details: e.to_string(),
    })
}

fn string_field(object: &Map<String, Value>, key: &str) -> String {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn localized(
    object: &Map<String, Value>,
    key: &str,
    lang: &str,
) -> Result<IndexMap<String, String>, ModuleSetupError> {
    let Some(value) = object.get(key) else {
        return Ok(IndexMap::new());
    };
    Ok(match decode::<LocalizedJson>(key, value)? {
        LocalizedJson::Map(map) => map,
        LocalizedJson::Text(text) => {
            let lang = if lang.is_empty() { DEFAULT_LANG } else { lang };
            IndexMap::from([(lang.to_string(), text)])
        }
    })
}

fn string_map_value(map: &IndexMap<String, String>) -> Value {
    Value::Object(
        map.iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}

fn setting_from_value(kind: SettingKind, value: &Value) -> Result<ModuleSetting, ModuleSetupError> {
    let key = kind.as_str();
    Ok(match kind {
        SettingKind::Controllers => ModuleSetting::Controllers(
            decode::<IndexMap<String, String>>(key, value)?
                .into_iter()
                .map(|(id, class)| Controller::new(id, class))
                .collect(),
        ),
        SettingKind::Templates => ModuleSetting::Templates(decode(key, value)?),
        SettingKind::Events => ModuleSetting::Events(decode(key, value)?),
        SettingKind::ClassesWithoutNamespace => ModuleSetting::ClassesWithoutNamespace(decode(key, value)?),
        SettingKind::SmartyPluginDirectories => ModuleSetting::SmartyPluginDirectories(decode(key, value)?),
        SettingKind::TemplateBlocks => ModuleSetting::TemplateBlocks(
            decode::<Vec<TemplateBlockJson>>(key, value)?
                .into_iter()
                .map(|b| TemplateBlock {
                    block: b.block,
                    template: b.template,
                    file: b.file,
                    position: b.position.as_ref().map(scalar_to_string),
                    theme: b.theme,
                })
                .collect(),
        ),
        SettingKind::ShopModuleSettings => ModuleSetting::ShopModuleSettings(
            decode::<Vec<ShopModuleSettingIn>>(key, value)?
                .into_iter()
                .map(|s| ShopModuleSetting {
                    name: s.name,
                    group: s.group,
                    r#type: s.r#type,
                    position: s.position,
                    constraints: s.constraints.map(|c| match c {
                        ConstraintsJson::List(list) => list,
                        ConstraintsJson::Piped(piped) => piped.split('|').map(str::to_string).collect(),
                    }),
                    value: s.value,
                })
                .collect(),
        ),
    })
}

fn setting_to_value(setting: &ModuleSetting) -> Value {
    match setting {
        ModuleSetting::Controllers(controllers) => Value::Object(
            controllers
                .iter()
                .map(|c| (c.id.clone(), Value::String(c.controller_class_namespace.clone())))
                .collect(),
        ),
        ModuleSetting::Templates(map)
        | ModuleSetting::Events(map)
        | ModuleSetting::ClassesWithoutNamespace(map) => string_map_value(map),
        ModuleSetting::SmartyPluginDirectories(directories) => json!(directories),
        ModuleSetting::TemplateBlocks(blocks) => Value::Array(
            blocks
                .iter()
                .map(|b| {
                    json!(TemplateBlockJson {
                        block: b.block.clone(),
                        template: b.template.clone(),
                        file: b.file.clone(),
                        theme: b.theme.clone(),
                        position: b.position.clone().map(Value::String),
                    })
                })
                .collect(),
        ),
        ModuleSetting::ShopModuleSettings(settings) => Value::Array(
            settings
                .iter()
                .map(|s| {
                    json!(ShopModuleSettingOut {
                        name: &s.name,
                        group: s.group.as_deref(),
                        r#type: &s.r#type,
                        position: s.position.as_ref(),
                        constraints: s.constraints.as_deref(),
                        value: s.value.as_ref(),
                    })
                })
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_metadata() -> Value {
        json!({
            "id": "TestModule",
            "title": { "en": "Module title" },
            "description": { "de": "de description", "en": "en description" },
            "lang": "en",
            "thumbnail": "picture.png",
            "version": "1.0",
            "author": "Vendor",
            "url": "https://example.com",
            "email": "info@example.com",
            "extend": {
                "Shop\\Model\\Payment": "TestModule\\Payment",
                "Shop\\Model\\Article": "TestModule\\Article"
            },
            "controllers": {
                "myvendor_mymodule_MyModuleController": "TestModule\\Controller"
            },
            "templates": { "mymodule.tpl": "TestModule/mymodule.tpl" },
            "blocks": [
                { "theme": "theme_id", "template": "template_1.tpl", "block": "block_1",
                  "file": "/blocks/template_1.tpl", "position": "1" },
                { "template": "template_2.tpl", "block": "block_2",
                  "file": "/blocks/template_2.tpl", "position": 2 }
            ],
            "settings": [
                { "group": "main", "name": "setting_1", "type": "select", "value": "0",
                  "constraints": "0|1|2|3", "position": 3 },
                { "group": "main", "name": "setting_2", "type": "arr", "value": ["value1", "value2"] }
            ],
            "events": {
                "onActivate": "TestModule\\Events::onActivate",
                "onDeactivate": "TestModule\\Events::onDeactivate"
            },
            "smartyPluginDirectories": ["Smarty/PluginDirectory"]
        })
    }

    #[test]
    fn test_from_data_maps_every_key() {
        let configuration = ModuleConfigurationDataMapper.from_data(&full_metadata()).unwrap();

        assert_eq!(configuration.id, "TestModule");
        assert_eq!(configuration.version, "1.0");
        assert_eq!(configuration.title.get("en").map(String::as_str), Some("Module title"));
        assert_eq!(configuration.description.len(), 2);
        assert_eq!(
            configuration.class_extensions(),
            [
                ClassExtension::new("Shop\\Model\\Payment", "TestModule\\Payment"),
                ClassExtension::new("Shop\\Model\\Article", "TestModule\\Article"),
            ]
        );
        assert_eq!(
            configuration.controllers(),
            [Controller::new("myvendor_mymodule_MyModuleController", "TestModule\\Controller")]
        );
        assert_eq!(configuration.event("onActivate"), Some("TestModule\\Events::onActivate"));

        match configuration.setting(SettingKind::TemplateBlocks) {
            Some(ModuleSetting::TemplateBlocks(blocks)) => {
                assert_eq!(blocks.len(), 2);
                assert_eq!(blocks[1].position.as_deref(), Some("2"));
                assert_eq!(blocks[1].theme, None);
            }
            other => panic!("Expected template blocks, got {:?}", other),
        }

        match configuration.setting(SettingKind::ShopModuleSettings) {
            Some(ModuleSetting::ShopModuleSettings(settings)) => {
                assert_eq!(
                    settings[0].constraints,
                    Some(vec!["0".to_string(), "1".into(), "2".into(), "3".into()])
                );
                assert_eq!(settings[1].value, Some(json!(["value1", "value2"])));
            }
            other => panic!("Expected shop module settings, got {:?}", other),
        }
    }

    #[test]
    fn test_plain_title_uses_default_language() {
        let configuration = ModuleConfigurationDataMapper
            .from_data(&json!({ "id": "m", "title": "Plain", "lang": "de" }))
            .unwrap();
        assert_eq!(configuration.title.get("de").map(String::as_str), Some("Plain"));

        let configuration = ModuleConfigurationDataMapper
            .from_data(&json!({ "id": "m", "title": "Plain" }))
            .unwrap();
        assert_eq!(configuration.title.get("en").map(String::as_str), Some("Plain"));
    }

    #[test]
    fn test_partial_metadata_gets_empty_defaults() {
        let configuration = ModuleConfigurationDataMapper
            .from_data(&json!({ "id": "partial", "extend": { "a": "b" } }))
            .unwrap();

        assert!(configuration.title.is_empty());
        assert_eq!(configuration.lang, "");
        assert_eq!(configuration.author, "");
        assert!(!configuration.auto_active);
        assert_eq!(configuration.settings().count(), 0);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = ModuleConfigurationDataMapper.from_data(&json!({ "id": "m", "surplus": 1 }));
        assert_eq!(
            result,
            Err(ModuleSetupError::UnsupportedMetadataKey { key: "surplus".to_string() })
        );
    }

    #[test]
    fn test_wrong_value_type_rejected() {
        let result = ModuleConfigurationDataMapper
            .from_data(&json!({ "id": "m", "smartyPluginDirectories": "not-a-list" }));
        assert!(matches!(
            result,
            Err(ModuleSetupError::UnsupportedMetadataValueType { ref key, .. }) if key == "smartyPluginDirectories"
        ));

        let result = ModuleConfigurationDataMapper
            .from_data(&json!({ "id": "m", "settings": [{ "type": "str" }] }));
        assert!(matches!(
            result,
            Err(ModuleSetupError::UnsupportedMetadataValueType { ref key, .. }) if key == "settings"
        ));
    }

    #[test]
    fn test_missing_or_empty_id_rejected() {
        assert_eq!(
            ModuleConfigurationDataMapper.from_data(&json!({ "extend": {} })),
            Err(ModuleSetupError::ModuleIdNotValid)
        );
        assert_eq!(
            ModuleConfigurationDataMapper.from_data(&json!({ "id": "  " })),
            Err(ModuleSetupError::ModuleIdNotValid)
        );
    }

    #[test]
    fn test_shop_configuration_survives_persistence() {
        let mapper = ModuleConfigurationDataMapper;
        let mut shop_configuration = ShopConfiguration::new();
        shop_configuration.add_module_configuration(mapper.from_data(&full_metadata()).unwrap());
        shop_configuration.class_extensions_chain =
            ClassExtensionsChain::from_entries([("Shop\\Model\\Payment", vec!["Other\\Payment", "TestModule\\Payment"])]);

        let stored = mapper.shop_configuration_to_data(&shop_configuration);
        let loaded = mapper.shop_configuration_from_data(&stored).unwrap();

        assert_eq!(loaded, shop_configuration);
        assert_eq!(
            loaded.class_extensions_chain.get("Shop\\Model\\Payment"),
            ["Other\\Payment", "TestModule\\Payment"]
        );
    }
}
