//! Configuration for module setup

use serde::Deserialize;
use std::collections::HashMap;

/// Module setup configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Host application controllers (controller id -> controller class)
    #[serde(default)]
    pub shop_controllers: HashMap<String, String>,

    /// Namespace prefixes modules are allowed to extend
    #[serde(default = "default_unified_namespaces")]
    pub unified_namespaces: Vec<String>,

    /// Namespace prefixes reserved for edition internals
    #[serde(default = "default_edition_namespaces")]
    pub edition_namespaces: Vec<String>,

    /// Known classes of the unified namespace; empty disables the existence check
    #[serde(default)]
    pub shop_classes: Vec<String>,

    /// Check extended classes against the edition and unified namespaces on activation.
    /// Empty class names are rejected either way.
    #[serde(default = "default_true")]
    pub validate_class_extensions: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shop_controllers: HashMap::new(),
            unified_namespaces: default_unified_namespaces(),
            edition_namespaces: default_edition_namespaces(),
            shop_classes: Vec::new(),
            validate_class_extensions: true,
        }
    }
}

impl Config {
    /// Parse configuration from YAML
    pub fn from_yaml(source: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(source)?)
    }
}

fn default_unified_namespaces() -> Vec<String> {
    vec!["OxidEsales\\Eshop\\".to_string()]
}

fn default_edition_namespaces() -> Vec<String> {
    vec![
        "OxidEsales\\EshopCommunity\\".to_string(),
        "OxidEsales\\EshopProfessional\\".to_string(),
        "OxidEsales\\EshopEnterprise\\".to_string(),
    ]
}

fn default_true() -> bool {
    true
}
