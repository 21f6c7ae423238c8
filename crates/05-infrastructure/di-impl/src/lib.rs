//! # 依赖注入具体实现
//!
//! 提供记录注册意图的服务集合 [`ServiceCollection`]，同时实现
//! [`ServiceContainer`] 和 [`HttpClientFactory`]。

use di_abstractions::{HttpClientBuilder, HttpClientFactory, ServiceContainer};
use infrastructure_common::{
    Activator, DependencyError, DependencyResult, Lifetime, SerializerSettings, TypeInfo, TypeRef,
};
use parking_lot::Mutex;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// 服务描述符
#[derive(Clone)]
pub struct ServiceDescriptor {
    /// 服务类型
    pub service: TypeInfo,
    /// 实现类型，单例实例注册时为 `None`
    pub implementation: Option<TypeInfo>,
    /// 生命周期
    pub lifetime: Lifetime,
    /// 单例实例
    pub instance: Option<Arc<dyn Any + Send + Sync>>,
}

impl ServiceDescriptor {
    /// 服务与实现是否为指定类型
    pub fn binds(&self, service: TypeId, implementation: TypeId) -> bool {
        self.service.id == service
            && self
                .implementation
                .as_ref()
                .is_some_and(|info| info.id == implementation)
    }
}

impl fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("service", &self.service.full_name())
            .field(
                "implementation",
                &self.implementation.as_ref().map(TypeInfo::full_name),
            )
            .field("lifetime", &self.lifetime)
            .field("instance", &self.instance.as_ref().map(|_| "<instance>"))
            .finish()
    }
}

/// 类型化客户端注册信息
#[derive(Clone)]
pub struct TypedClientRegistration {
    /// 客户端名称
    pub name: String,
    /// 客户端类型
    pub client: TypeInfo,
    /// 实现类型，由接口生成的客户端为 `None`
    pub implementation: Option<TypeInfo>,
    /// 基础地址
    pub base_address: Option<Url>,
    /// 请求超时
    pub timeout: Option<Duration>,
    /// 负载序列化设置
    pub serializer: Option<Arc<SerializerSettings>>,
    /// 主处理器类型
    pub primary_handler: Option<TypeInfo>,
    /// 委托处理器，第一个在最外层
    pub handlers: Vec<TypeInfo>,
    primary_activator: Option<Activator>,
}

impl TypedClientRegistration {
    fn new(client: &TypeRef, implementation: Option<&TypeRef>) -> Self {
        Self {
            name: client.name().to_string(),
            client: client.info().clone(),
            implementation: implementation.map(|r| r.info().clone()),
            base_address: None,
            timeout: None,
            serializer: None,
            primary_handler: None,
            handlers: Vec::new(),
            primary_activator: None,
        }
    }

    /// 使用已配置的构造函数创建主处理器实例
    pub fn create_primary_handler(&self) -> Option<Arc<dyn Any + Send + Sync>> {
        self.primary_activator.as_ref().map(|activator| activator())
    }

    /// 委托处理器的简单名称，按管道顺序
    pub fn handler_names(&self) -> Vec<&str> {
        self.handlers.iter().map(TypeInfo::short_name).collect()
    }
}

impl fmt::Debug for TypedClientRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedClientRegistration")
            .field("name", &self.name)
            .field("client", &self.client.full_name())
            .field(
                "implementation",
                &self.implementation.as_ref().map(TypeInfo::full_name),
            )
            .field("base_address", &self.base_address.as_ref().map(Url::as_str))
            .field("timeout", &self.timeout)
            .field("serializer", &self.serializer)
            .field(
                "primary_handler",
                &self.primary_handler.as_ref().map(TypeInfo::full_name),
            )
            .field("handlers", &self.handler_names())
            .finish()
    }
}

type ClientTable = Arc<Mutex<Vec<TypedClientRegistration>>>;

/// 服务集合
///
/// 按调用顺序记录所有注册意图，不负责解析依赖。同一服务的多个注册
/// 全部保留，查询时以最后一个为准。
#[derive(Debug, Default)]
pub struct ServiceCollection {
    descriptors: Vec<ServiceDescriptor>,
    clients: ClientTable,
}

impl ServiceCollection {
    /// 创建新的服务集合
    pub fn new() -> Self {
        Self::default()
    }

    /// 所有服务描述符，按注册顺序
    pub fn descriptors(&self) -> &[ServiceDescriptor] {
        &self.descriptors
    }

    /// 服务描述符数量
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// 是否没有任何注册
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// 指定服务类型的所有描述符
    pub fn descriptors_for<T: ?Sized + 'static>(&self) -> Vec<&ServiceDescriptor> {
        let id = TypeId::of::<T>();
        self.descriptors
            .iter()
            .filter(|descriptor| descriptor.service.id == id)
            .collect()
    }

    /// 服务类型是否已注册
    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.contains_id(TypeId::of::<T>())
    }

    /// 服务类型是否已注册（使用 TypeId）
    pub fn contains_id(&self, id: TypeId) -> bool {
        self.descriptors.iter().any(|descriptor| descriptor.service.id == id)
    }

    /// 服务类型生效的生命周期（最后一次注册）
    pub fn lifetime_of<T: ?Sized + 'static>(&self) -> Option<Lifetime> {
        self.descriptors_for::<T>().last().map(|descriptor| descriptor.lifetime)
    }

    /// 获取最后注册的单例实例
    pub fn singleton<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        let id = TypeId::of::<T>();
        self.descriptors
            .iter()
            .rev()
            .filter(|descriptor| descriptor.service.id == id)
            .find_map(|descriptor| descriptor.instance.clone())
            .and_then(|instance| instance.downcast::<T>().ok())
    }

    /// 所有类型化客户端注册
    pub fn typed_clients(&self) -> Vec<TypedClientRegistration> {
        self.clients.lock().clone()
    }

    /// 获取指定客户端类型的注册
    pub fn typed_client<T: ?Sized + 'static>(&self) -> Option<TypedClientRegistration> {
        let id = TypeId::of::<T>();
        self.clients
            .lock()
            .iter()
            .find(|registration| registration.client.id == id)
            .cloned()
    }

    fn push(&mut self, descriptor: ServiceDescriptor) {
        debug!(
            "注册服务: {} -> {:?} ({})",
            descriptor.service,
            descriptor.implementation.as_ref().map(TypeInfo::full_name),
            descriptor.lifetime
        );
        self.descriptors.push(descriptor);
    }
}

impl ServiceContainer for ServiceCollection {
    fn register_factory(
        &mut self,
        service: &TypeRef,
        implementation: &TypeRef,
        lifetime: Lifetime,
    ) -> DependencyResult<()> {
        if !implementation.kind().is_class() {
            return Err(DependencyError::RegistrationError {
                type_name: implementation.full_name().to_string(),
                message: "实现类型必须是具体类型".to_string(),
            });
        }

        self.push(ServiceDescriptor {
            service: service.info().clone(),
            implementation: Some(implementation.info().clone()),
            lifetime,
            instance: None,
        });
        Ok(())
    }

    fn try_register_transient(&mut self, implementation: &TypeRef) -> DependencyResult<bool> {
        if self.contains_id(implementation.id()) {
            debug!("服务已注册, 跳过: {}", implementation);
            return Ok(false);
        }
        self.register_factory(implementation, implementation, Lifetime::Transient)?;
        Ok(true)
    }

    fn register_singleton(
        &mut self,
        service: TypeInfo,
        instance: Arc<dyn Any + Send + Sync>,
    ) -> DependencyResult<()> {
        self.push(ServiceDescriptor {
            service,
            implementation: None,
            lifetime: Lifetime::Singleton,
            instance: Some(instance),
        });
        Ok(())
    }
}

impl HttpClientFactory for ServiceCollection {
    fn add_typed_client(
        &mut self,
        client: &TypeRef,
        implementation: Option<&TypeRef>,
    ) -> DependencyResult<Box<dyn HttpClientBuilder>> {
        if let Some(implementation) = implementation {
            if !implementation.kind().is_class() {
                return Err(DependencyError::RegistrationError {
                    type_name: implementation.full_name().to_string(),
                    message: "客户端实现类型必须是具体类型".to_string(),
                });
            }
        }

        let index = {
            let mut clients = self.clients.lock();
            match clients.iter().position(|r| r.client.id == client.id()) {
                Some(index) => index,
                None => {
                    clients.push(TypedClientRegistration::new(client, implementation));
                    clients.len() - 1
                }
            }
        };

        // 类型化客户端本身以瞬时服务暴露
        self.push(ServiceDescriptor {
            service: client.info().clone(),
            implementation: Some(implementation.unwrap_or(client).info().clone()),
            lifetime: Lifetime::Transient,
            instance: None,
        });

        info!("添加类型化客户端: {}", client.name());
        Ok(Box::new(TypedClientBuilder {
            name: client.name().to_string(),
            index,
            clients: Arc::clone(&self.clients),
        }))
    }
}

/// 类型化客户端构建器
pub struct TypedClientBuilder {
    name: String,
    index: usize,
    clients: ClientTable,
}

impl TypedClientBuilder {
    fn update(&self, apply: impl FnOnce(&mut TypedClientRegistration)) {
        if let Some(registration) = self.clients.lock().get_mut(self.index) {
            apply(registration);
        }
    }
}

impl HttpClientBuilder for TypedClientBuilder {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_base_address(&mut self, base_address: Url) {
        debug!("客户端 {} 基础地址: {}", self.name, base_address);
        self.update(|r| r.base_address = Some(base_address));
    }

    fn set_timeout(&mut self, timeout: Duration) {
        self.update(|r| r.timeout = Some(timeout));
    }

    fn set_serializer(&mut self, settings: Arc<SerializerSettings>) {
        self.update(|r| r.serializer = Some(settings));
    }

    fn set_primary_handler(&mut self, handler: TypeInfo, activator: Activator) {
        debug!("客户端 {} 主处理器: {}", self.name, handler);
        self.update(|r| {
            r.primary_handler = Some(handler);
            r.primary_activator = Some(activator);
        });
    }

    fn add_handler(&mut self, handler: &TypeRef) {
        debug!("客户端 {} 委托处理器: {}", self.name, handler);
        let handler = handler.info().clone();
        self.update(|r| r.handlers.push(handler));
    }
}
