//! HTTP 客户端注册

use crate::bootstrapper::Diagnostic;
use crate::options::{lookup_section, SectionLookup};
use crate::scanner::HttpClientBinding;
use crate::serializer::DefaultSerializer;
use config_abstractions::{ConfigurationSource, SectionExt};
use di_abstractions::{HttpClientBuilder, HttpClientFactory, ServiceContainer};
use infrastructure_common::{
    DependencyError, NamingConventions, RegistrationError, RegistrationResult,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};
use url::Url;

/// 默认请求超时秒数
pub const DEFAULT_TIMEOUT_SECONDS: i64 = 100;

fn default_timeout_seconds() -> i64 {
    DEFAULT_TIMEOUT_SECONDS
}

/// HTTP 客户端配置节
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpClientSettings {
    /// 基础地址
    #[serde(default)]
    pub base_address: Option<Url>,
    /// 请求超时秒数，按绝对值使用
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: i64,
}

impl HttpClientSettings {
    /// 请求超时
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.unsigned_abs())
    }
}

impl Default for HttpClientSettings {
    fn default() -> Self {
        Self {
            base_address: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

/// HTTP 客户端注册阶段
///
/// 返回完成注册的客户端数量。
pub(crate) fn register_http_clients<C>(
    container: &mut C,
    configuration: &dyn ConfigurationSource,
    bindings: &[HttpClientBinding],
    diagnostics: &mut Vec<Diagnostic>,
) -> RegistrationResult<usize>
where
    C: ServiceContainer + HttpClientFactory,
{
    let mut registered = 0;

    for binding in bindings {
        let builder = if binding.client.kind().is_interface() {
            register_rest_client(container, configuration, binding, diagnostics)?
        } else {
            Some(register_class_client(container, binding)?)
        };

        let Some(mut builder) = builder else {
            continue;
        };

        configure_handlers(container, builder.as_mut(), binding)?;
        registered += 1;
    }

    Ok(registered)
}

/// 由接口生成的类型化 REST 客户端，配置节缺失且非必需时返回 `None`
fn register_rest_client<C>(
    container: &mut C,
    configuration: &dyn ConfigurationSource,
    binding: &HttpClientBinding,
    diagnostics: &mut Vec<Diagnostic>,
) -> RegistrationResult<Option<Box<dyn HttpClientBuilder>>>
where
    C: HttpClientFactory,
{
    let client = &binding.client;
    if !binding.is_rest_client {
        error!("类型不是 REST 客户端: {}", client.full_name());
        return Err(RegistrationError::NotARestClient {
            type_name: client.full_name().to_string(),
        });
    }

    let key = NamingConventions::client_section_key(client.info());
    let section = match lookup_section(configuration, client, &key, binding.marker.is_required())? {
        SectionLookup::Found(section) => section,
        SectionLookup::Skipped(diagnostic) => {
            diagnostics.push(diagnostic);
            return Ok(None);
        }
    };

    let settings: HttpClientSettings = section.try_bind().map_err(|e| {
        error!("HTTP 客户端配置无效: '{}', {}", key, e);
        RegistrationError::invalid_configuration(key.as_str())
    })?;
    let base_address = settings.base_address.clone().ok_or_else(|| {
        error!("HTTP 客户端缺少基础地址: '{}.BaseAddress'", key);
        RegistrationError::missing_configuration(format!("{key}.BaseAddress"))
    })?;

    let mut builder = container.add_typed_client(client, None)?;
    builder.set_base_address(base_address);
    builder.set_timeout(settings.timeout());
    builder.set_serializer(
        binding
            .marker
            .serializer()
            .map(Arc::clone)
            .unwrap_or_else(DefaultSerializer::get),
    );

    debug!(
        "注册 REST 客户端: {} -> '{}', 超时 {:?}",
        client.name(),
        key,
        settings.timeout()
    );
    Ok(Some(builder))
}

/// 具体类型实现的客户端，必须且只能实现一个接口
fn register_class_client<C>(
    container: &mut C,
    binding: &HttpClientBinding,
) -> RegistrationResult<Box<dyn HttpClientBuilder>>
where
    C: HttpClientFactory,
{
    let client = &binding.client;
    let [interface] = binding.interfaces.as_slice() else {
        error!(
            "HTTP 客户端 {} 实现了 {} 个接口",
            client.full_name(),
            binding.interfaces.len()
        );
        return Err(RegistrationError::InterfaceCardinality {
            type_name: client.full_name().to_string(),
            count: binding.interfaces.len(),
        });
    };

    debug!("注册 HTTP 客户端: {} -> {}", interface.name(), client.name());
    Ok(container.add_typed_client(interface, Some(client))?)
}

fn configure_handlers<C>(
    container: &mut C,
    builder: &mut dyn HttpClientBuilder,
    binding: &HttpClientBinding,
) -> RegistrationResult<()>
where
    C: ServiceContainer,
{
    if let Some(primary) = binding.marker.primary_handler() {
        let activator = primary.activator().ok_or_else(|| {
            RegistrationError::from(DependencyError::ComponentCreationFailed {
                type_name: primary.full_name().to_string(),
                message: "主处理器缺少默认构造函数".to_string(),
            })
        })?;
        builder.set_primary_handler(primary.info().clone(), Arc::clone(activator));
    }

    for handler in binding.marker.handlers() {
        container.try_register_transient(handler)?;
        builder.add_handler(handler);
    }

    Ok(())
}
