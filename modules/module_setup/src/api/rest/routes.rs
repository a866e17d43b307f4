//! Route registration

use super::{dto::*, error::Problem, handlers};
use crate::contract::ShopId;
use crate::domain::Service;
use axum::{
    extract::Path,
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use std::sync::Arc;

/// Build the module setup router
pub fn router(service: Arc<Service>) -> Router {
    Router::new()
        // Module endpoints
        .route("/shops/{shop_id}/modules", post(install_module_handler))
        .route(
            "/shops/{shop_id}/modules/{module_id}",
            get(get_module_handler).delete(uninstall_module_handler),
        )
        .route(
            "/shops/{shop_id}/modules/{module_id}/activation",
            put(activate_module_handler).delete(deactivate_module_handler),
        )
        // Runtime endpoints
        .route("/shops/{shop_id}/class-extensions/active", get(get_active_chain_handler))
        .layer(Extension(service))
}

// ===== Handler wrappers that extract service from Extension =====

async fn install_module_handler(
    Extension(service): Extension<Arc<Service>>,
    path: Path<ShopId>,
    json: Json<serde_json::Value>,
) -> Result<(StatusCode, Json<ModuleConfigurationDto>), Problem> {
    handlers::install_module(service, path, json).await
}

async fn get_module_handler(
    Extension(service): Extension<Arc<Service>>,
    path: Path<(ShopId, String)>,
) -> Result<Json<ModuleConfigurationDto>, Problem> {
    handlers::get_module(service, path).await
}

async fn uninstall_module_handler(
    Extension(service): Extension<Arc<Service>>,
    path: Path<(ShopId, String)>,
) -> Result<StatusCode, Problem> {
    handlers::uninstall_module(service, path).await
}

async fn activate_module_handler(
    Extension(service): Extension<Arc<Service>>,
    path: Path<(ShopId, String)>,
) -> Result<Json<ModuleStatusDto>, Problem> {
    handlers::activate_module(service, path).await
}

async fn deactivate_module_handler(
    Extension(service): Extension<Arc<Service>>,
    path: Path<(ShopId, String)>,
) -> Result<Json<ModuleStatusDto>, Problem> {
    handlers::deactivate_module(service, path).await
}

async fn get_active_chain_handler(
    Extension(service): Extension<Arc<Service>>,
    path: Path<ShopId>,
) -> Result<Json<ClassExtensionsChainDto>, Problem> {
    handlers::get_active_chain(service, path).await
}
