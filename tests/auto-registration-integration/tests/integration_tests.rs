//! auto-registration 集中集成测试
//!
//! 通过派生宏声明目录，再用内存服务容器和 JSON 配置完成整个启动流程。

use auto_registration::{
    rest_client, AutoRegistrar, DefaultSerializer, Module, OptionsMonitor, Registrable,
};
use config_impl::JsonConfiguration;
use di_abstractions::{DelegatingHandler, PrimaryHandler};
use di_impl::ServiceCollection;
use infrastructure_common::{Disposable, Lifetime, RegistrationError};
use serde::Deserialize;
use serde_json::json;
use std::sync::{Arc, Once};
use std::time::Duration;

static INIT_LOGGER: Once = Once::new();

fn init_test_logger() {
    INIT_LOGGER.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub trait IOrderService: Send + Sync {}
pub trait IOrderReader: Send + Sync {}
pub trait IQuoteClient: Send + Sync {}

#[derive(Default)]
pub struct CorrelationHandler;
impl DelegatingHandler for CorrelationHandler {}

#[derive(Default)]
pub struct LoggingHandler;
impl DelegatingHandler for LoggingHandler {}

#[derive(Default)]
pub struct PooledHandler;
impl PrimaryHandler for PooledHandler {}

#[derive(Registrable)]
#[service(scoped)]
#[implements(dyn IOrderService, dyn IOrderReader, dyn Disposable)]
pub struct OrderService;

impl Disposable for OrderService {
    fn dispose(&mut self) {}
}

#[derive(Debug, Deserialize, Registrable)]
#[bind_options]
pub struct CheckoutConfiguration {
    pub currency: String,
    pub max_items: u32,
}

#[derive(Debug, Deserialize, Registrable)]
#[bind_options(optional)]
pub struct LoyaltyConfig {
    pub points_per_order: u32,
}

#[rest_client(handlers(CorrelationHandler, LoggingHandler), primary = PooledHandler)]
pub trait IPricingClient: Send + Sync {
    #[get("/prices/{sku}")]
    fn get_price(&self, sku: String) -> f64;
}

#[derive(Registrable)]
#[implements(dyn IQuoteClient)]
#[http_client(handlers(LoggingHandler))]
pub struct QuoteClient;

fn checkout_module() -> Module {
    Module::new("checkout")
        .with::<OrderService>()
        .and_then(|m| m.with::<CheckoutConfiguration>())
        .and_then(|m| m.with::<LoyaltyConfig>())
        .and_then(|m| m.with::<dyn IPricingClient>())
        .and_then(|m| m.with::<QuoteClient>())
        .unwrap()
}

fn checkout_configuration() -> JsonConfiguration {
    JsonConfiguration::from_json_str(
        r#"{
            "Checkout": {"Currency": "EUR", "MaxItems": "25"},
            "Pricing": {"BaseAddress": "https://pricing.example.test/api/", "TimeoutSeconds": 30}
        }"#,
    )
    .unwrap()
}

#[test]
fn test_full_bootstrap() {
    init_test_logger();
    let registrar = AutoRegistrar::new();
    let mut services = ServiceCollection::new();
    let configuration = checkout_configuration();

    let report = registrar
        .bootstrap_with_report(&mut services, &configuration, &[checkout_module()])
        .unwrap();

    assert_eq!(report.modules_processed, vec!["checkout"]);
    assert_eq!(report.services_registered, 2);
    assert_eq!(report.options_registered, 1);
    assert_eq!(report.clients_registered, 2);
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].section, "Loyalty");

    // 服务
    assert_eq!(services.lifetime_of::<dyn IOrderService>(), Some(Lifetime::Scoped));
    assert_eq!(services.lifetime_of::<dyn IOrderReader>(), Some(Lifetime::Scoped));
    assert!(!services.contains::<dyn Disposable>());

    // 选项
    let checkout = services
        .singleton::<OptionsMonitor<CheckoutConfiguration>>()
        .unwrap()
        .current()
        .unwrap();
    assert_eq!(checkout.currency, "EUR");
    assert_eq!(checkout.max_items, 25);
    assert!(!services.contains::<OptionsMonitor<LoyaltyConfig>>());

    // REST 客户端
    let pricing = services.typed_client::<dyn IPricingClient>().unwrap();
    assert_eq!(
        pricing.base_address.as_ref().map(|u| u.as_str()),
        Some("https://pricing.example.test/api/")
    );
    assert_eq!(pricing.timeout, Some(Duration::from_secs(30)));
    assert_eq!(pricing.handler_names(), vec!["CorrelationHandler", "LoggingHandler"]);
    assert!(pricing.create_primary_handler().is_some());
    assert!(Arc::ptr_eq(
        pricing.serializer.as_ref().unwrap(),
        &DefaultSerializer::get()
    ));

    // 具体类型客户端
    let quote = services.typed_client::<dyn IQuoteClient>().unwrap();
    assert_eq!(
        quote.implementation.as_ref().map(|i| i.short_name()),
        Some("QuoteClient")
    );
    assert!(quote.base_address.is_none());

    // 处理器只注册一次
    assert_eq!(services.descriptors_for::<LoggingHandler>().len(), 1);
    assert_eq!(services.lifetime_of::<CorrelationHandler>(), Some(Lifetime::Transient));
}

#[test]
fn test_options_follow_configuration_reload() {
    let registrar = AutoRegistrar::new();
    let mut services = ServiceCollection::new();
    let configuration = checkout_configuration();

    registrar
        .bootstrap(&mut services, &configuration, &[checkout_module()])
        .unwrap();
    let monitor = services
        .singleton::<OptionsMonitor<CheckoutConfiguration>>()
        .unwrap();
    assert_eq!(monitor.current().unwrap().currency, "EUR");

    configuration.reload(json!({
        "Checkout": {"Currency": "USD", "MaxItems": 5},
        "Pricing": {"BaseAddress": "https://pricing.example.test/api/"}
    }));

    let current = monitor.current().unwrap();
    assert_eq!(current.currency, "USD");
    assert_eq!(current.max_items, 5);
}

#[test]
fn test_missing_required_section_aborts() {
    let registrar = AutoRegistrar::new();
    let mut services = ServiceCollection::new();
    let configuration = JsonConfiguration::new(json!({
        "Pricing": {"BaseAddress": "https://pricing.example.test/"}
    }));

    let result = registrar.bootstrap(&mut services, &configuration, &[checkout_module()]);
    match result {
        Err(RegistrationError::MissingConfiguration { section }) => {
            assert_eq!(section, "Checkout");
        }
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }

    // 服务阶段在选项阶段之前完成
    assert!(services.contains::<dyn IOrderService>());
    assert!(services.typed_clients().is_empty());
}

#[test]
fn test_repeated_bootstrap_is_noop() {
    let registrar = AutoRegistrar::new();
    let mut services = ServiceCollection::new();
    let configuration = checkout_configuration();

    let count = registrar
        .bootstrap(&mut services, &configuration, &[checkout_module()])
        .map(|services| services.len())
        .unwrap();
    let report = registrar
        .bootstrap_with_report(&mut services, &configuration, &[checkout_module()])
        .unwrap();

    assert_eq!(services.len(), count);
    assert_eq!(report.modules_skipped, vec!["checkout"]);
    assert_eq!(services.typed_clients().len(), 2);
}

#[test]
fn test_separate_registrars_do_not_share_state() {
    let configuration = checkout_configuration();

    let mut first = ServiceCollection::new();
    AutoRegistrar::new()
        .bootstrap(&mut first, &configuration, &[checkout_module()])
        .unwrap();

    let mut second = ServiceCollection::new();
    AutoRegistrar::new()
        .bootstrap(&mut second, &configuration, &[checkout_module()])
        .unwrap();

    assert_eq!(first.len(), second.len());
    assert!(!second.is_empty());
}
