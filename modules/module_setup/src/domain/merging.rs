//! Merging of freshly declared module configurations into the stored shop configuration

use crate::contract::{
    ModuleConfiguration, ModuleSetting, SettingKind, ShopConfiguration, ShopModuleSetting,
};

/// Folds a module's declaration into a shop configuration
///
/// The class extensions chain is reconciled in place: extensions the module no longer
/// declares are removed unless another module still declares them, new ones are appended
/// at the tail of their base class. Entries of other modules keep their position. Settings are replaced kind by kind, except
/// shop module settings, whose stored values survive an upgrade.
#[derive(Debug, Default, Clone, Copy)]
pub struct ModuleConfigurationMergingService;

impl ModuleConfigurationMergingService {
    pub fn new() -> Self {
        Self
    }

    pub fn merge(
        &self,
        mut shop_configuration: ShopConfiguration,
        mut module_configuration: ModuleConfiguration,
    ) -> ShopConfiguration {
        let old = shop_configuration
            .module_configuration(&module_configuration.id)
            .cloned();

        if let Some(old) = &old {
            for extension in old.class_extensions() {
                let still_declared = module_configuration.class_extensions().contains(extension)
                    || shop_configuration.is_class_extension_declared_by_other(&old.id, extension);
                if !still_declared {
                    shop_configuration.class_extensions_chain.remove(
                        &extension.shop_class_namespace,
                        &extension.module_extension_class_namespace,
                    );
                }
            }
        }
        for extension in module_configuration.class_extensions() {
            shop_configuration.class_extensions_chain.append(
                &extension.shop_class_namespace,
                extension.module_extension_class_namespace.clone(),
            );
        }

        if let Some(old) = &old {
            merge_shop_module_settings(old, &mut module_configuration);
        }

        shop_configuration.add_module_configuration(module_configuration);
        shop_configuration
    }
}

/// Carry stored setting values over into the new declaration, matched by name
fn merge_shop_module_settings(old: &ModuleConfiguration, new: &mut ModuleConfiguration) {
    let Some(ModuleSetting::ShopModuleSettings(old_settings)) =
        old.setting(SettingKind::ShopModuleSettings)
    else {
        return;
    };
    let Some(ModuleSetting::ShopModuleSettings(new_settings)) =
        new.setting(SettingKind::ShopModuleSettings)
    else {
        return;
    };

    let merged: Vec<ShopModuleSetting> = new_settings
        .iter()
        .map(|declared| {
            let stored_value = old_settings
                .iter()
                .find(|stored| stored.name == declared.name)
                .and_then(|stored| stored.value.clone());
            match stored_value {
                Some(value) => ShopModuleSetting {
                    value: Some(value),
                    ..declared.clone()
                },
                None => declared.clone(),
            }
        })
        .collect();

    new.add_setting(ModuleSetting::ShopModuleSettings(merged));
}
