//! Host application adapter
//!
//! Everything the module setup core needs to know about the host shop itself.

use crate::config::Config;
use indexmap::IndexMap;

/// Host application facts consulted by validators and the settings store
pub trait ShopAdapter: Send + Sync {
    /// Built-in controllers, keyed by lowercase controller id
    fn get_shop_controller_class_map(&self) -> IndexMap<String, String>;

    /// Whether the identifier is a namespaced class name
    fn is_namespace(&self, class: &str) -> bool;

    /// Whether the class lives in a namespace reserved for edition internals
    fn is_shop_edition_namespace(&self, class: &str) -> bool;

    /// Whether the class lives in the unified, extendable namespace
    fn is_shop_unified_namespace(&self, class: &str) -> bool;

    /// Whether the host provides the class at all
    fn class_exists(&self, class: &str) -> bool;

    fn generate_unique_id(&self) -> String;
}

/// Shop adapter driven by module configuration
#[derive(Debug, Clone)]
pub struct ConfiguredShopAdapter {
    controllers: IndexMap<String, String>,
    unified_namespaces: Vec<String>,
    edition_namespaces: Vec<String>,
    shop_classes: Vec<String>,
}

impl ConfiguredShopAdapter {
    pub fn new(config: &Config) -> Self {
        let mut controllers: IndexMap<String, String> = config
            .shop_controllers
            .iter()
            .map(|(id, class)| (id.to_lowercase(), class.clone()))
            .collect();
        controllers.sort_keys();

        Self {
            controllers,
            unified_namespaces: config.unified_namespaces.clone(),
            edition_namespaces: config.edition_namespaces.clone(),
            shop_classes: config.shop_classes.clone(),
        }
    }
}

impl ShopAdapter for ConfiguredShopAdapter {
    fn get_shop_controller_class_map(&self) -> IndexMap<String, String> {
        self.controllers.clone()
    }

    fn is_namespace(&self, class: &str) -> bool {
        class.trim_start_matches('\\').contains('\\')
    }

    fn is_shop_edition_namespace(&self, class: &str) -> bool {
        let class = class.trim_start_matches('\\');
        self.edition_namespaces.iter().any(|ns| class.starts_with(ns.as_str()))
    }

    fn is_shop_unified_namespace(&self, class: &str) -> bool {
        let class = class.trim_start_matches('\\');
        self.unified_namespaces.iter().any(|ns| class.starts_with(ns.as_str()))
    }

    /// Without a configured class list every class is assumed to exist
    fn class_exists(&self, class: &str) -> bool {
        let class = class.trim_start_matches('\\');
        self.shop_classes.is_empty() || self.shop_classes.iter().any(|c| c == class)
    }

    fn generate_unique_id(&self) -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }
}
