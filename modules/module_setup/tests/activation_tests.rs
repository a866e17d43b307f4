//! Integration tests for module activation and deactivation

mod common;

use common::*;
use indexmap::IndexMap;
use module_setup::contract::*;
use module_setup::domain::events::ModuleEvent;
use module_setup::domain::handlers::default_handlers;
use module_setup::domain::{ModuleActivationService, ModuleConfigurationHandler, Service};
use serde_json::json;
use std::sync::Arc;

fn full_module(id: &str) -> ModuleConfiguration {
    let mut configuration = module(id, &[("OxidEsales\\Eshop\\Application\\Model\\Article", "Payments\\Article")]);
    configuration
        .add_controller(Controller::new("PaymentsCheckout", "Payments\\CheckoutController"))
        .add_setting(ModuleSetting::Templates(IndexMap::from([(
            "checkout.tpl".to_string(),
            "payments/views/checkout.tpl".to_string(),
        )])))
        .add_setting(ModuleSetting::SmartyPluginDirectories(vec!["payments/smarty".to_string()]))
        .add_setting(ModuleSetting::TemplateBlocks(vec![TemplateBlock {
            block: "basket_btn".to_string(),
            template: "page/checkout/basket.tpl".to_string(),
            file: "views/blocks/basket_btn.tpl".to_string(),
            position: None,
            theme: None,
        }]))
        .add_setting(ModuleSetting::Events(IndexMap::from([
            ("onActivate".to_string(), "Payments\\Events::onActivate".to_string()),
            ("onDeactivate".to_string(), "Payments\\Events::onDeactivate".to_string()),
        ])))
        .add_setting(ModuleSetting::ClassesWithoutNamespace(IndexMap::from([(
            "payments_legacy".to_string(),
            "payments/core/payments_legacy.php".to_string(),
        )])));
    configuration
}

#[tokio::test]
async fn test_activation_projects_every_setting_kind() {
    print_test_header(
        "test_activation_projects_every_setting_kind",
        &["Activation writes each declared setting kind into its shop-wide aggregate"],
    );
    let ctx = setup();
    ctx.service.install_module(SHOP, full_module("payments")).await.unwrap();

    ctx.service.activate("payments", SHOP).await.unwrap();

    assert!(ctx.service.is_active("payments", SHOP).await.unwrap());
    assert_eq!(
        stored(&ctx.dao, setting_names::MODULE_CONTROLLERS, SHOP).await,
        Some(json!({ "payments": { "paymentscheckout": "Payments\\CheckoutController" } }))
    );
    assert_eq!(
        stored(&ctx.dao, setting_names::MODULE_TEMPLATES, SHOP).await,
        Some(json!({ "payments": { "checkout.tpl": "payments/views/checkout.tpl" } }))
    );
    assert_eq!(
        stored(&ctx.dao, setting_names::MODULE_SMARTY_PLUGIN_DIRECTORIES, SHOP).await,
        Some(json!({ "payments": ["payments/smarty"] }))
    );
    assert_eq!(
        stored(&ctx.dao, setting_names::MODULE_EVENTS, SHOP).await.unwrap()["payments"]["onActivate"],
        "Payments\\Events::onActivate"
    );
    assert!(stored(&ctx.dao, setting_names::MODULE_TEMPLATE_BLOCKS, SHOP).await.is_some());
    assert!(stored(&ctx.dao, setting_names::MODULE_FILES, SHOP).await.is_some());
    assert_eq!(
        stored(&ctx.dao, setting_names::MODULE_CLASS_EXTENSIONS_CHAIN, SHOP).await,
        Some(json!({ "OxidEsales\\Eshop\\Application\\Model\\Article": ["Payments\\Article"] }))
    );

    let stored_module = ctx.service.get_module_configuration(SHOP, "payments").await.unwrap();
    assert!(stored_module.auto_active);

    let events = ctx.events.events.lock();
    assert_eq!(events.len(), 1);
    match &events[0] {
        ModuleEvent::ModuleActivated(e) => {
            assert_eq!(e.module_id, "payments");
            assert_eq!(e.callback.as_deref(), Some("Payments\\Events::onActivate"));
        }
        other => panic!("Expected ModuleActivated, got {:?}", other),
    }
}

#[tokio::test]
async fn test_activate_then_deactivate_restores_aggregates() {
    print_test_header(
        "test_activate_then_deactivate_restores_aggregates",
        &["Deactivation is the exact inverse of activation for every shop-wide aggregate"],
    );
    let ctx = setup();
    ctx.service
        .install_module(SHOP, module_with_controller("other", "otherctrl", "Other\\Controller"))
        .await
        .unwrap();
    ctx.service.activate("other", SHOP).await.unwrap();
    ctx.service.install_module(SHOP, full_module("payments")).await.unwrap();

    let before = projection_snapshot(&ctx.dao, SHOP).await;

    ctx.service.activate("payments", SHOP).await.unwrap();
    assert_ne!(projection_snapshot(&ctx.dao, SHOP).await, before);

    ctx.service.deactivate("payments", SHOP).await.unwrap();
    assert_eq!(projection_snapshot(&ctx.dao, SHOP).await, before);
    assert!(!ctx.service.is_active("payments", SHOP).await.unwrap());
    assert!(!ctx.service.get_module_configuration(SHOP, "payments").await.unwrap().auto_active);

    let events = ctx.events.events.lock();
    assert!(matches!(
        events.last(),
        Some(ModuleEvent::ModuleDeactivated(e)) if e.callback.as_deref() == Some("Payments\\Events::onDeactivate")
    ));
}

#[tokio::test]
async fn test_controller_duplication_rejected_before_mutation() {
    print_test_header(
        "test_controller_duplication_rejected_before_mutation",
        &["A controller id already taken by an active module fails activation and changes nothing"],
    );
    let ctx = setup();
    ctx.service
        .install_module(SHOP, module_with_controller("first", "shared", "First\\Controller"))
        .await
        .unwrap();
    ctx.service.activate("first", SHOP).await.unwrap();

    let mut second = module_with_controller("second", "SHARED", "Second\\Controller");
    second.add_class_extension(ClassExtension::new("oxarticle", "Second\\Article"));
    ctx.service.install_module(SHOP, second).await.unwrap();

    let before = projection_snapshot(&ctx.dao, SHOP).await;
    let result = ctx.service.activate("second", SHOP).await;

    assert!(matches!(result, Err(ModuleSetupError::ControllerDuplication { .. })));
    assert_eq!(projection_snapshot(&ctx.dao, SHOP).await, before);
    assert!(!ctx.service.is_active("second", SHOP).await.unwrap());
    assert_eq!(ctx.events.events.lock().len(), 1);
}

#[tokio::test]
async fn test_host_controller_class_collision_rejected() {
    let ctx = setup();
    ctx.service
        .install_module(
            SHOP,
            module_with_controller("m", "mystart", "OxidEsales\\Eshop\\Application\\Controller\\StartController"),
        )
        .await
        .unwrap();

    let result = ctx.service.activate("m", SHOP).await;
    assert!(matches!(result, Err(ModuleSetupError::ControllerDuplication { .. })));
}

#[tokio::test]
async fn test_reactivation_is_not_a_self_collision() {
    let ctx = setup();
    ctx.service
        .install_module(SHOP, module_with_controller("m", "ctrl", "M\\Controller"))
        .await
        .unwrap();

    ctx.service.activate("m", SHOP).await.unwrap();
    ctx.service.activate("m", SHOP).await.unwrap();

    assert!(ctx.service.is_active("m", SHOP).await.unwrap());
    assert_eq!(
        stored(&ctx.dao, setting_names::ACTIVE_MODULES, SHOP).await,
        Some(json!(["m"]))
    );
}

#[tokio::test]
async fn test_edition_namespace_extension_rejected() {
    let ctx = setup();
    ctx.service
        .install_module(
            SHOP,
            module("m", &[("OxidEsales\\EshopCommunity\\Application\\Model\\Article", "M\\Article")]),
        )
        .await
        .unwrap();

    let result = ctx.service.activate("m", SHOP).await;

    assert!(matches!(
        result,
        Err(ModuleSetupError::InvalidClassExtensionNamespace { .. })
    ));
    assert!(stored(&ctx.dao, setting_names::MODULE_CLASS_EXTENSIONS_CHAIN, SHOP).await.is_none());
}

#[tokio::test]
async fn test_unknown_module_or_shop_is_not_found() {
    let ctx = setup();

    let result = ctx.service.activate("ghost", SHOP).await;
    assert!(matches!(
        result,
        Err(ModuleSetupError::ConfigurationNotFound { ref resource, .. }) if resource == "shop"
    ));

    ctx.service.install_module(SHOP, module("real", &[])).await.unwrap();
    let result = ctx.service.activate("ghost", SHOP).await;
    assert!(matches!(
        result,
        Err(ModuleSetupError::ConfigurationNotFound { ref resource, .. }) if resource == "module"
    ));
}

#[tokio::test]
async fn test_failing_handler_rolls_back_earlier_projections() {
    print_test_header(
        "test_failing_handler_rolls_back_earlier_projections",
        &["A handler failure after other handlers ran leaves the store untouched"],
    );
    let ctx = setup();
    ctx.service.install_module(SHOP, full_module("payments")).await.unwrap();

    let mut handlers: Vec<Box<dyn ModuleConfigurationHandler>> = default_handlers();
    handlers.push(Box::new(FailingHandler));
    let activation = ModuleActivationService::new(ctx.dao.clone(), handlers, Vec::new(), ctx.events.clone());
    let service = Service::with_activation_service(ctx.dao.clone(), activation);

    let before = projection_snapshot(&ctx.dao, SHOP).await;
    let settings_before = ctx.dao.len();

    let result = service.activate("payments", SHOP).await;

    assert!(matches!(result, Err(ModuleSetupError::Internal { .. })));
    assert_eq!(projection_snapshot(&ctx.dao, SHOP).await, before);
    assert_eq!(ctx.dao.len(), settings_before);
    assert!(!service.get_module_configuration(SHOP, "payments").await.unwrap().auto_active);
    assert!(ctx.events.events.lock().is_empty());
}

#[tokio::test]
async fn test_event_publisher_failure_does_not_fail_activation() {
    let config = shop_config();
    let dao = Arc::new(module_setup::infra::storage::InMemoryShopConfigurationSettingDao::new());
    let service = Service::new(
        dao.clone(),
        Arc::new(module_setup::domain::ConfiguredShopAdapter::new(&config)),
        Arc::new(FailingEventPublisher),
        &config,
    );
    service.install_module(SHOP, module("m", &[])).await.unwrap();

    service.activate("m", SHOP).await.unwrap();

    assert!(service.is_active("m", SHOP).await.unwrap());
}

#[tokio::test]
async fn test_activation_is_shop_scoped() {
    let ctx = setup();
    ctx.service
        .install_module(SHOP, module("m", &[("shopClass", "M\\Ext")]))
        .await
        .unwrap();
    ctx.service
        .install_module(OTHER_SHOP, module("m", &[("shopClass", "M\\Ext")]))
        .await
        .unwrap();

    ctx.service.activate("m", SHOP).await.unwrap();

    assert!(ctx.service.is_active("m", SHOP).await.unwrap());
    assert!(!ctx.service.is_active("m", OTHER_SHOP).await.unwrap());
    assert!(ctx.service.get_active_extension_chain(OTHER_SHOP).await.unwrap().is_empty());
    assert_eq!(
        ctx.service.get_active_extension_chain(SHOP).await.unwrap().get("shopClass"),
        ["M\\Ext"]
    );
}

#[tokio::test]
async fn test_empty_class_names_rejected_without_namespace_checks() {
    print_test_header(
        "test_empty_class_names_rejected_without_namespace_checks",
        &["Turning off namespace checks still keeps empty class names out of the chain"],
    );
    let mut config = shop_config();
    config.validate_class_extensions = false;
    let dao = Arc::new(module_setup::infra::storage::InMemoryShopConfigurationSettingDao::new());
    let service = Service::new(
        dao.clone(),
        Arc::new(module_setup::domain::ConfiguredShopAdapter::new(&config)),
        Arc::new(module_setup::domain::NoOpEventPublisher),
        &config,
    );
    service.install_module(SHOP, module("m", &[("", "M\\Ext"), ("Base", "")])).await.unwrap();

    let result = service.activate("m", SHOP).await;

    assert!(matches!(
        result,
        Err(ModuleSetupError::InvalidClassExtensionNamespace { .. })
    ));
    assert!(!service.is_active("m", SHOP).await.unwrap());
    assert!(stored(&dao, setting_names::MODULE_CLASS_EXTENSIONS_CHAIN, SHOP).await.is_none());

    service
        .install_module(
            SHOP,
            module("edition", &[("OxidEsales\\EshopCommunity\\Application\\Model\\Article", "E\\Article")]),
        )
        .await
        .unwrap();
    service.activate("edition", SHOP).await.unwrap();
}

#[tokio::test]
async fn test_deactivating_inactive_module_publishes_nothing() {
    let ctx = setup();
    ctx.service.install_module(SHOP, full_module("payments")).await.unwrap();

    ctx.service.deactivate("payments", SHOP).await.unwrap();
    assert!(ctx.events.events.lock().is_empty());

    ctx.service.activate("payments", SHOP).await.unwrap();
    ctx.service.deactivate("payments", SHOP).await.unwrap();
    ctx.service.deactivate("payments", SHOP).await.unwrap();

    let events = ctx.events.events.lock();
    assert_eq!(events.len(), 2);
    assert!(matches!(events[1], ModuleEvent::ModuleDeactivated(_)));
}
