//! 注册目录
//!
//! [`Module`] 是一组显式列出的 [`TypeRegistration`]，替代按程序集反射扫描。
//! 条目可以手工构建，也可以由 `#[derive(Registrable)]` / `#[rest_client]` 生成。

use crate::annotations::{HttpClientMarker, OptionsMarker, ServiceMarker};
use crate::options::install_options;
use config_abstractions::ConfigurationSection;
use di_abstractions::ServiceContainer;
use infrastructure_common::{DependencyResult, MarkerError, MarkerResult, TypeRef};
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;

/// 选项安装函数
///
/// 把某个具体配置类型的变更源、配置提供者和选项监视器注册到容器。
pub type OptionsInstaller =
    fn(&mut dyn ServiceContainer, Arc<dyn ConfigurationSection>) -> DependencyResult<()>;

/// HTTP 方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        };
        f.write_str(verb)
    }
}

/// REST 调用标注
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestCall {
    /// HTTP 方法
    pub verb: HttpVerb,
    /// 相对路径
    pub path: String,
}

impl RestCall {
    /// 创建 REST 调用标注
    pub fn new(verb: HttpVerb, path: impl Into<String>) -> Self {
        Self {
            verb,
            path: path.into(),
        }
    }
}

/// 接口方法描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestMethod {
    /// 方法名称
    pub name: String,
    /// REST 调用标注，未标注时为 `None`
    pub call: Option<RestCall>,
}

/// 选项绑定声明：标注及其对应配置类型的安装函数
#[derive(Clone)]
pub(crate) struct OptionsDeclaration {
    pub(crate) marker: OptionsMarker,
    pub(crate) installer: OptionsInstaller,
}

/// 注册目录条目
#[derive(Clone)]
pub struct TypeRegistration {
    type_ref: TypeRef,
    interfaces: Vec<TypeRef>,
    services: Vec<ServiceMarker>,
    options: Option<OptionsDeclaration>,
    http_client: Option<HttpClientMarker>,
    methods: Vec<RestMethod>,
}

impl TypeRegistration {
    /// 从类型引用创建条目
    pub fn new(type_ref: TypeRef) -> Self {
        Self {
            type_ref,
            interfaces: Vec::new(),
            services: Vec::new(),
            options: None,
            http_client: None,
            methods: Vec::new(),
        }
    }

    /// 具体类型条目
    pub fn class<T: 'static>() -> Self {
        Self::new(TypeRef::class::<T>())
    }

    /// 接口条目，`T` 通常是 `dyn Trait`
    pub fn interface<T: ?Sized + 'static>() -> Self {
        Self::new(TypeRef::interface::<T>())
    }

    /// 声明实现的接口
    pub fn implements(mut self, interface: TypeRef) -> Self {
        if !self.interfaces.contains(&interface) {
            self.interfaces.push(interface);
        }
        self
    }

    /// 声明实现的接口，`T` 通常是 `dyn Trait`
    pub fn implements_interface<T: ?Sized + 'static>(self) -> Self {
        self.implements(TypeRef::interface::<T>())
    }

    /// 附加服务标注，可以多次附加
    pub fn with_service(mut self, marker: ServiceMarker) -> Self {
        self.services.push(marker);
        self
    }

    /// 附加选项绑定标注
    ///
    /// `T` 是被绑定的配置类型，通常就是条目自身的类型。每个条目只能有一个
    /// 选项绑定标注。
    pub fn with_options<T>(mut self, marker: OptionsMarker) -> MarkerResult<Self>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        if self.options.is_some() {
            return Err(self.duplicate("BindOptions"));
        }
        self.options = Some(OptionsDeclaration {
            marker,
            installer: install_options::<T>,
        });
        Ok(self)
    }

    /// 附加 HTTP 客户端标注，每个条目只能有一个
    pub fn with_http_client(mut self, marker: HttpClientMarker) -> MarkerResult<Self> {
        if self.http_client.is_some() {
            return Err(self.duplicate("HttpClient"));
        }
        self.http_client = Some(marker);
        Ok(self)
    }

    /// 声明接口方法
    pub fn with_method(mut self, name: impl Into<String>, call: Option<RestCall>) -> Self {
        self.methods.push(RestMethod {
            name: name.into(),
            call,
        });
        self
    }

    /// 声明带 REST 调用标注的接口方法
    pub fn with_rest_call(self, name: impl Into<String>, verb: HttpVerb, path: impl Into<String>) -> Self {
        self.with_method(name, Some(RestCall::new(verb, path)))
    }

    /// 继承父类型条目的标注和接口
    ///
    /// 服务标注与父类型合并；自身没有 HTTP 客户端标注时沿用父类型的。
    /// 选项绑定标注绑定的是具体配置类型，不会被继承。
    pub fn inherit_from(mut self, parent: &TypeRegistration) -> Self {
        for interface in &parent.interfaces {
            if !self.interfaces.contains(interface) {
                self.interfaces.push(interface.clone());
            }
        }

        let own = std::mem::take(&mut self.services);
        self.services = parent.services.iter().copied().chain(own).collect();

        if self.http_client.is_none() {
            self.http_client = parent.http_client.clone();
        }
        self
    }

    /// 类型引用
    pub fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    /// 实现的接口
    pub fn interfaces(&self) -> &[TypeRef] {
        &self.interfaces
    }

    /// 服务标注
    pub fn service_markers(&self) -> &[ServiceMarker] {
        &self.services
    }

    /// 选项绑定标注
    pub fn options_marker(&self) -> Option<&OptionsMarker> {
        self.options.as_ref().map(|declaration| &declaration.marker)
    }

    pub(crate) fn options_declaration(&self) -> Option<&OptionsDeclaration> {
        self.options.as_ref()
    }

    /// HTTP 客户端标注
    pub fn http_client_marker(&self) -> Option<&HttpClientMarker> {
        self.http_client.as_ref()
    }

    /// 接口方法
    pub fn methods(&self) -> &[RestMethod] {
        &self.methods
    }

    /// 是否为类型化 REST 客户端接口
    ///
    /// 至少声明一个方法，且每个方法都有 REST 调用标注。
    pub fn is_rest_client(&self) -> bool {
        !self.methods.is_empty() && self.methods.iter().all(|method| method.call.is_some())
    }

    fn duplicate(&self, marker: &'static str) -> MarkerError {
        MarkerError::DuplicateMarker {
            type_name: self.type_ref.full_name().to_string(),
            marker,
        }
    }
}

impl fmt::Debug for TypeRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistration")
            .field("type", &self.type_ref)
            .field("interfaces", &self.interfaces)
            .field("services", &self.services)
            .field("options", &self.options_marker())
            .field("http_client", &self.http_client)
            .field("methods", &self.methods)
            .finish()
    }
}

/// 可注册类型
///
/// 由 `#[derive(Registrable)]` 或 `#[rest_client]` 实现，也可以手工实现。
pub trait Registrable {
    /// 构建注册目录条目，标注无效时失败
    fn registration() -> MarkerResult<TypeRegistration>;
}

/// 注册模块
///
/// 自动注册的扫描单元，按名称去重。
#[derive(Debug, Clone)]
pub struct Module {
    name: String,
    registrations: Vec<TypeRegistration>,
}

impl Module {
    /// 创建空模块
    ///
    /// 名称是模块的身份：注册器按名称记录已处理的模块，之后再遇到同名模块
    /// 时整体跳过（记入 `BootstrapReport::modules_skipped`），即使其中的注册
    /// 条目不同。不同的模块应使用不同的名称，例如 crate 路径 `module_path!()`。
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            registrations: Vec::new(),
        }
    }

    /// 添加注册目录条目
    pub fn register(mut self, registration: TypeRegistration) -> Self {
        self.registrations.push(registration);
        self
    }

    /// 添加可注册类型
    pub fn with<T: Registrable + ?Sized>(self) -> MarkerResult<Self> {
        Ok(self.register(T::registration()?))
    }

    /// 模块名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 注册目录条目
    pub fn registrations(&self) -> &[TypeRegistration] {
        &self.registrations
    }

    /// 按类型查找条目
    pub fn find<T: ?Sized + 'static>(&self) -> Option<&TypeRegistration> {
        self.registrations
            .iter()
            .find(|registration| registration.type_ref.is::<T>())
    }
}
