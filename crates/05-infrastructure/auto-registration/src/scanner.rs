//! 类型扫描
//!
//! 从模块的注册目录中提取三类绑定：服务、选项和 HTTP 客户端。
//! 扫描只读取已经校验过的标注，不会失败。

use crate::annotations::HttpClientMarker;
use crate::registration::{Module, OptionsInstaller, TypeRegistration};
use infrastructure_common::{
    AsyncDisposable, Disposable, LifetimeFlags, NamingConventions, TypeRef,
};
use std::any::TypeId;
use std::fmt;
use tracing::debug;

/// 服务绑定
#[derive(Debug, Clone)]
pub struct ServiceBinding {
    /// 实现类型
    pub implementation: TypeRef,
    /// 合并后的生命周期
    pub lifetimes: LifetimeFlags,
    /// 暴露的接口，不含释放协议接口
    pub interfaces: Vec<TypeRef>,
}

/// 选项绑定
#[derive(Clone)]
pub struct OptionsBinding {
    /// 配置类型
    pub config_type: TypeRef,
    /// 配置节名称
    pub section: String,
    /// 配置节是否必须存在
    pub required: bool,
    pub(crate) installer: OptionsInstaller,
}

impl fmt::Debug for OptionsBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionsBinding")
            .field("config_type", &self.config_type)
            .field("section", &self.section)
            .field("required", &self.required)
            .finish()
    }
}

/// HTTP 客户端绑定
#[derive(Debug, Clone)]
pub struct HttpClientBinding {
    /// 客户端类型，接口或具体类型
    pub client: TypeRef,
    /// 具体类型实现的接口
    pub interfaces: Vec<TypeRef>,
    /// 接口是否为类型化 REST 客户端
    pub is_rest_client: bool,
    /// 客户端标注
    pub marker: HttpClientMarker,
}

/// 单个模块的扫描结果
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    pub services: Vec<ServiceBinding>,
    pub options: Vec<OptionsBinding>,
    pub http_clients: Vec<HttpClientBinding>,
}

impl ScanResult {
    /// 是否没有任何绑定
    pub fn is_empty(&self) -> bool {
        self.services.is_empty() && self.options.is_empty() && self.http_clients.is_empty()
    }
}

/// 类型扫描器
#[derive(Debug, Default, Clone, Copy)]
pub struct TypeScanner;

impl TypeScanner {
    /// 扫描模块中的全部绑定
    pub fn scan(module: &Module) -> ScanResult {
        let result = ScanResult {
            services: Self::services(module),
            options: Self::options(module),
            http_clients: Self::http_clients(module),
        };
        debug!(
            "扫描模块 {}: 服务 {}, 选项 {}, HTTP 客户端 {}",
            module.name(),
            result.services.len(),
            result.options.len(),
            result.http_clients.len()
        );
        result
    }

    /// 带服务标注的具体类型
    pub fn services(module: &Module) -> Vec<ServiceBinding> {
        module
            .registrations()
            .iter()
            .filter(|registration| registration.type_ref().kind().is_class())
            .filter_map(|registration| {
                let markers = registration.service_markers();
                if markers.is_empty() {
                    return None;
                }
                let lifetimes = markers
                    .iter()
                    .fold(LifetimeFlags::NONE, |flags, marker| flags | marker.lifetimes());
                Some(ServiceBinding {
                    implementation: registration.type_ref().clone(),
                    lifetimes,
                    interfaces: exposed_interfaces(registration),
                })
            })
            .collect()
    }

    /// 带选项绑定标注的具体类型
    pub fn options(module: &Module) -> Vec<OptionsBinding> {
        module
            .registrations()
            .iter()
            .filter(|registration| registration.type_ref().kind().is_class())
            .filter_map(|registration| {
                let declaration = registration.options_declaration()?;
                Some(OptionsBinding {
                    config_type: registration.type_ref().clone(),
                    section: NamingConventions::options_section_key(
                        registration.type_ref().info(),
                        declaration.marker.section(),
                    ),
                    required: declaration.marker.is_required(),
                    installer: declaration.installer,
                })
            })
            .collect()
    }

    /// 带 HTTP 客户端标注的具体类型和接口
    pub fn http_clients(module: &Module) -> Vec<HttpClientBinding> {
        module
            .registrations()
            .iter()
            .filter_map(|registration| {
                let marker = registration.http_client_marker()?;
                Some(HttpClientBinding {
                    client: registration.type_ref().clone(),
                    interfaces: registration.interfaces().to_vec(),
                    is_rest_client: registration.is_rest_client(),
                    marker: marker.clone(),
                })
            })
            .collect()
    }
}

/// 释放协议接口不会作为服务暴露
fn is_disposal_interface(id: TypeId) -> bool {
    id == TypeId::of::<dyn Disposable>() || id == TypeId::of::<dyn AsyncDisposable>()
}

fn exposed_interfaces(registration: &TypeRegistration) -> Vec<TypeRef> {
    registration
        .interfaces()
        .iter()
        .filter(|interface| !is_disposal_interface(interface.id()))
        .cloned()
        .collect()
}
