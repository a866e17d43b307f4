/// Module lifecycle events
///
/// Published after an activation or deactivation has been committed. The event
/// carries the callback the module declared for that transition (`onActivate`,
/// `onDeactivate`) so a host runtime can invoke it.
use crate::contract::ShopId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event name a module declares its activation callback under
pub const ON_ACTIVATE: &str = "onActivate";
/// Event name a module declares its deactivation callback under
pub const ON_DEACTIVATE: &str = "onDeactivate";

/// Domain event types for module lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum ModuleEvent {
    /// Module was activated for a shop
    ModuleActivated(ModuleLifecycleEvent),
    /// Module was deactivated for a shop
    ModuleDeactivated(ModuleLifecycleEvent),
}

/// Event data shared by both transitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleLifecycleEvent {
    pub module_id: String,
    pub shop_id: ShopId,
    /// Callback the module declared for this transition
    pub callback: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ModuleEvent {
    pub fn activated(module_id: &str, shop_id: ShopId, callback: Option<&str>) -> Self {
        ModuleEvent::ModuleActivated(ModuleLifecycleEvent::new(module_id, shop_id, callback))
    }

    pub fn deactivated(module_id: &str, shop_id: ShopId, callback: Option<&str>) -> Self {
        ModuleEvent::ModuleDeactivated(ModuleLifecycleEvent::new(module_id, shop_id, callback))
    }

    pub fn data(&self) -> &ModuleLifecycleEvent {
        match self {
            ModuleEvent::ModuleActivated(e) | ModuleEvent::ModuleDeactivated(e) => e,
        }
    }
}

impl ModuleLifecycleEvent {
    fn new(module_id: &str, shop_id: ShopId, callback: Option<&str>) -> Self {
        Self {
            module_id: module_id.to_string(),
            shop_id,
            callback: callback.map(str::to_string),
            timestamp: Utc::now(),
        }
    }
}

/// Event publisher trait for module lifecycle events
///
/// Publishing happens after the state change is committed; a failing publisher
/// never rolls an activation back.
#[async_trait::async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: ModuleEvent) -> anyhow::Result<()>;
}

/// No-op event publisher for testing or when events are disabled
pub struct NoOpEventPublisher;

#[async_trait::async_trait]
impl EventPublisher for NoOpEventPublisher {
    async fn publish(&self, _event: ModuleEvent) -> anyhow::Result<()> {
        Ok(())
    }
}
