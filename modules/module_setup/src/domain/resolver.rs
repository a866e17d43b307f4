//! Active class extension chain resolution

use super::repository::{load_shop_configuration, ShopConfigurationSettingDao};
use super::state::ModuleStateProvider;
use crate::contract::{ClassExtensionsChain, ModuleSetupError, ShopConfiguration, ShopId};
use std::collections::HashMap;
use std::sync::Arc;

/// Derive the runtime chain from the stored one, keeping extensions of active modules only
///
/// Relative order of the stored chain is preserved; activation recency plays no role.
/// An extension declared by several modules stays while any of them is active.
pub fn resolve_active_chain<F>(shop_configuration: &ShopConfiguration, is_active: F) -> ClassExtensionsChain
where
    F: Fn(&str) -> bool,
{
    let mut owners: HashMap<(&str, &str), Vec<&str>> = HashMap::new();
    for module in shop_configuration.module_configurations() {
        for extension in module.class_extensions() {
            owners
                .entry((
                    extension.shop_class_namespace.as_str(),
                    extension.module_extension_class_namespace.as_str(),
                ))
                .or_default()
                .push(module.id.as_str());
        }
    }

    let mut active_chain = ClassExtensionsChain::new();
    for (base, extensions) in shop_configuration.class_extensions_chain.iter() {
        for extension in extensions {
            let owner_active = owners
                .get(&(base.as_str(), extension.as_str()))
                .is_some_and(|module_ids| module_ids.iter().any(|id| is_active(*id)));
            if owner_active {
                active_chain.append(base, extension.clone());
            }
        }
    }
    active_chain
}

/// Serves the active chain of a shop from the settings store
pub struct ActiveClassExtensionChainResolver {
    dao: Arc<dyn ShopConfigurationSettingDao>,
    state: Arc<dyn ModuleStateProvider>,
}

impl ActiveClassExtensionChainResolver {
    pub fn new(dao: Arc<dyn ShopConfigurationSettingDao>, state: Arc<dyn ModuleStateProvider>) -> Self {
        Self { dao, state }
    }

    pub async fn get_active_extension_chain(
        &self,
        shop_id: ShopId,
    ) -> Result<ClassExtensionsChain, ModuleSetupError> {
        let Some(shop_configuration) = load_shop_configuration(self.dao.as_ref(), shop_id).await? else {
            return Ok(ClassExtensionsChain::new());
        };
        let active = self.state.active_module_ids(shop_id).await?;

        let chain = resolve_active_chain(&shop_configuration, |module_id| {
            active.iter().any(|id| id == module_id)
        });
        tracing::debug!(shop_id, bases = chain.len(), "Resolved active class extension chain");
        Ok(chain)
    }
}
