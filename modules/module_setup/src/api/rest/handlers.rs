//! HTTP request handlers - thin layer that delegates to domain service

use super::{
    dto::*,
    error::{map_domain_error, Problem},
};
use crate::contract::ShopId;
use crate::domain::{ModuleConfigurationDataMapper, Service};
use axum::{extract::Path, http::StatusCode, Json};
use std::sync::Arc;

// ===== Module Handlers =====

/// Install (or upgrade) a module from its normalized metadata
pub async fn install_module(
    service: Arc<Service>,
    Path(shop_id): Path<ShopId>,
    Json(metadata): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<ModuleConfigurationDto>), Problem> {
    let configuration = ModuleConfigurationDataMapper
        .from_data(&metadata)
        .map_err(map_domain_error)?;

    let installed = service
        .install_module(shop_id, configuration)
        .await
        .map_err(map_domain_error)?;

    Ok((StatusCode::CREATED, Json(installed.into())))
}

/// Get a module's stored configuration
pub async fn get_module(
    service: Arc<Service>,
    Path((shop_id, module_id)): Path<(ShopId, String)>,
) -> Result<Json<ModuleConfigurationDto>, Problem> {
    let configuration = service
        .get_module_configuration(shop_id, &module_id)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(configuration.into()))
}

/// Remove a module from a shop
pub async fn uninstall_module(
    service: Arc<Service>,
    Path((shop_id, module_id)): Path<(ShopId, String)>,
) -> Result<StatusCode, Problem> {
    service
        .uninstall_module(shop_id, &module_id)
        .await
        .map_err(map_domain_error)?;

    Ok(StatusCode::NO_CONTENT)
}

// ===== Activation Handlers =====

pub async fn activate_module(
    service: Arc<Service>,
    Path((shop_id, module_id)): Path<(ShopId, String)>,
) -> Result<Json<ModuleStatusDto>, Problem> {
    service
        .activate(&module_id, shop_id)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(ModuleStatusDto {
        module_id,
        shop_id,
        active: true,
    }))
}

pub async fn deactivate_module(
    service: Arc<Service>,
    Path((shop_id, module_id)): Path<(ShopId, String)>,
) -> Result<Json<ModuleStatusDto>, Problem> {
    service
        .deactivate(&module_id, shop_id)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(ModuleStatusDto {
        module_id,
        shop_id,
        active: false,
    }))
}

// ===== Class Extension Handlers =====

pub async fn get_active_chain(
    service: Arc<Service>,
    Path(shop_id): Path<ShopId>,
) -> Result<Json<ClassExtensionsChainDto>, Problem> {
    let chain = service
        .get_active_extension_chain(shop_id)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(ClassExtensionsChainDto::new(shop_id, &chain)))
}
