//! registration-macros 集中集成测试

use auto_registration::{
    rest_client, HttpVerb, Module, Registrable, RestCall, ServiceMarker, TypeRegistration,
};
use di_abstractions::{DelegatingHandler, PrimaryHandler};
use infrastructure_common::{LifetimeFlags, MarkerError, TypeKind};
use serde::Deserialize;

pub trait IWidget: Send + Sync {}
pub trait IGadget: Send + Sync {}
pub trait IQuoteClient: Send + Sync {}

#[derive(Default)]
pub struct AuthHandler;
impl DelegatingHandler for AuthHandler {}

#[derive(Default)]
pub struct RetryHandler;
impl DelegatingHandler for RetryHandler {}

#[derive(Default)]
pub struct SocketsHandler;
impl PrimaryHandler for SocketsHandler {}

#[derive(Registrable)]
#[service(transient, singleton)]
#[implements(dyn IWidget, dyn IGadget)]
pub struct WidgetImpl;

#[derive(Registrable)]
#[scoped_service]
#[singleton_service]
#[implements(dyn IWidget)]
pub struct ScopedWidget;

#[derive(Registrable)]
#[service]
#[implements(dyn IWidget)]
pub struct NoLifetimeWidget;

#[derive(Debug, Deserialize, Registrable)]
#[bind_options]
pub struct FooConfiguration {
    pub name: String,
}

#[derive(Debug, Deserialize, Registrable)]
#[bind_options(section = "Legacy:Payments", optional)]
pub struct PaymentConfiguration {
    pub merchant_id: String,
}

#[derive(Registrable)]
#[implements(dyn IQuoteClient)]
#[http_client(handlers(RetryHandler, AuthHandler), primary = SocketsHandler)]
pub struct QuoteClient;

#[derive(Registrable)]
#[implements(dyn IQuoteClient)]
#[http_client(handlers(AuthHandler, AuthHandler))]
pub struct DuplicateHandlerClient;

#[derive(Registrable)]
#[transient_service]
#[inherit(QuoteClient)]
pub struct CachedQuoteClient;

#[rest_client(handlers(AuthHandler), optional)]
pub trait IBarClient: Send + Sync {
    #[get("/bars/{id}")]
    fn get_bar(&self, id: u32) -> String;

    #[post("/bars")]
    fn create_bar(&self, name: String) -> u32;
}

#[rest_client]
pub trait IInventoryClient: Send + Sync {
    #[delete("/items/{id}")]
    fn remove_item(&self, id: u32);

    fn describe(&self) -> String;
}

#[test]
fn test_service_lifetimes_and_interfaces() {
    let registration = WidgetImpl::registration().unwrap();

    assert!(registration.type_ref().is::<WidgetImpl>());
    assert_eq!(
        registration.service_markers(),
        &[ServiceMarker::new(LifetimeFlags::TRANSIENT | LifetimeFlags::SINGLETON).unwrap()]
    );
    let interfaces: Vec<&str> = registration.interfaces().iter().map(|i| i.name()).collect();
    assert_eq!(interfaces, vec!["IWidget", "IGadget"]);
    assert!(registration.interfaces().iter().all(|i| i.kind() == TypeKind::Interface));
}

#[test]
fn test_shorthand_service_markers_accumulate() {
    let registration = ScopedWidget::registration().unwrap();

    assert_eq!(
        registration.service_markers(),
        &[ServiceMarker::ScopedOnly, ServiceMarker::SingletonOnly]
    );
}

#[test]
fn test_service_without_lifetime_is_rejected() {
    assert!(matches!(
        NoLifetimeWidget::registration(),
        Err(MarkerError::InvalidLifetime)
    ));
}

#[test]
fn test_bind_options_markers() {
    let foo = FooConfiguration::registration().unwrap();
    let marker = foo.options_marker().unwrap();
    assert!(marker.section().is_none());
    assert!(marker.is_required());

    let payments = PaymentConfiguration::registration().unwrap();
    let marker = payments.options_marker().unwrap();
    assert_eq!(marker.section(), Some("Legacy:Payments"));
    assert!(!marker.is_required());
}

#[test]
fn test_http_client_marker_keeps_handler_order() {
    let registration = QuoteClient::registration().unwrap();
    let marker = registration.http_client_marker().unwrap();

    let handlers: Vec<&str> = marker.handlers().iter().map(|h| h.name()).collect();
    assert_eq!(handlers, vec!["RetryHandler", "AuthHandler"]);
    assert!(marker.is_required());

    let primary = marker.primary_handler().unwrap();
    assert!(primary.is::<SocketsHandler>());
    assert!(primary.activator().is_some());
}

#[test]
fn test_duplicate_handlers_are_rejected() {
    match DuplicateHandlerClient::registration() {
        Err(MarkerError::DuplicateHandlers { handlers }) => {
            assert!(handlers.contains("AuthHandler"));
        }
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_inherit_copies_parent_markers() {
    let registration = CachedQuoteClient::registration().unwrap();

    assert!(registration.type_ref().is::<CachedQuoteClient>());
    assert_eq!(registration.service_markers(), &[ServiceMarker::TransientOnly]);
    assert_eq!(registration.interfaces().len(), 1);
    assert!(registration.interfaces()[0].is::<dyn IQuoteClient>());
    assert_eq!(
        registration.http_client_marker().unwrap().handlers().len(),
        2
    );
}

#[test]
fn test_rest_client_records_calls() {
    let registration = <dyn IBarClient as Registrable>::registration().unwrap();

    assert!(registration.type_ref().is::<dyn IBarClient>());
    assert!(registration.type_ref().kind().is_interface());
    assert!(registration.is_rest_client());

    let methods = registration.methods();
    assert_eq!(methods.len(), 2);
    assert_eq!(methods[0].name, "get_bar");
    assert_eq!(methods[0].call, Some(RestCall::new(HttpVerb::Get, "/bars/{id}")));
    assert_eq!(methods[1].call, Some(RestCall::new(HttpVerb::Post, "/bars")));

    let marker = registration.http_client_marker().unwrap();
    assert!(!marker.is_required());
    assert_eq!(marker.handlers()[0].name(), "AuthHandler");
}

#[test]
fn test_trait_with_plain_method_is_not_rest_client() {
    let registration = <dyn IInventoryClient as Registrable>::registration().unwrap();

    assert!(!registration.is_rest_client());
    assert_eq!(registration.methods()[0].call.as_ref().map(|c| c.verb), Some(HttpVerb::Delete));
    assert!(registration.methods()[1].call.is_none());
}

#[test]
fn test_module_collects_derived_registrations() {
    let module = Module::new("macros")
        .with::<WidgetImpl>()
        .and_then(|m| m.with::<FooConfiguration>())
        .and_then(|m| m.with::<dyn IBarClient>())
        .unwrap();

    assert_eq!(module.name(), "macros");
    assert_eq!(module.registrations().len(), 3);
    assert!(module.find::<dyn IBarClient>().is_some());
    assert!(module.find::<QuoteClient>().is_none());

    let manual = Module::new("manual").register(TypeRegistration::class::<WidgetImpl>());
    assert!(manual.find::<WidgetImpl>().unwrap().service_markers().is_empty());
}
