//! 自动注册启动器
//!
//! 按模块依次执行服务、选项和 HTTP 客户端三个注册阶段。每个模块在进程内
//! 只处理一次，模块名称在注册阶段开始之前登记。

use crate::http_clients::register_http_clients;
use crate::options::register_options;
use crate::registration::Module;
use crate::scanner::{ServiceBinding, TypeScanner};
use config_abstractions::ConfigurationSource;
use di_abstractions::{HttpClientFactory, ServiceContainer};
use infrastructure_common::{RegistrationError, RegistrationResult, TypeRef};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, error, info};

/// 已处理模块集合
///
/// 只增不减；登记是原子的检查并插入。
#[derive(Debug, Default)]
pub struct ProcessedModules {
    names: Mutex<HashSet<String>>,
}

impl ProcessedModules {
    /// 创建空集合
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记模块，已经登记过时返回 `false`
    pub fn try_claim(&self, name: &str) -> bool {
        self.names.lock().insert(name.to_string())
    }

    /// 模块是否已经登记
    pub fn contains(&self, name: &str) -> bool {
        self.names.lock().contains(name)
    }

    /// 已登记模块数量
    pub fn len(&self) -> usize {
        self.names.lock().len()
    }

    /// 是否没有登记任何模块
    pub fn is_empty(&self) -> bool {
        self.names.lock().is_empty()
    }
}

/// 注册诊断信息
///
/// 非必需的配置节缺失时产生，不会中断启动。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 相关类型的完整名称
    pub type_name: String,
    /// 缺失的配置节
    pub section: String,
}

impl Diagnostic {
    /// 配置节缺失
    pub fn missing_section(owner: &TypeRef, section: impl Into<String>) -> Self {
        Self {
            type_name: owner.full_name().to_string(),
            section: section.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "配置节缺失, 跳过类型 '{}' 的绑定: '{}'",
            self.type_name, self.section
        )
    }
}

/// 启动报告
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    /// 本次处理的模块
    pub modules_processed: Vec<String>,
    /// 之前已经处理过而跳过的模块
    pub modules_skipped: Vec<String>,
    /// 服务注册数量（接口 × 生命周期）
    pub services_registered: usize,
    /// 完成绑定的选项类型数量
    pub options_registered: usize,
    /// 完成注册的 HTTP 客户端数量
    pub clients_registered: usize,
    /// 诊断信息
    pub diagnostics: Vec<Diagnostic>,
}

/// 自动注册器
///
/// 持有已处理模块集合。进程级实例由 [`AutoRegistrar::process`] 提供，
/// 第一次访问时创建且不会重置；测试等场景可以自行创建独立实例。
#[derive(Debug, Default)]
pub struct AutoRegistrar {
    processed: ProcessedModules,
}

static PROCESS_REGISTRAR: Lazy<AutoRegistrar> = Lazy::new(AutoRegistrar::new);

impl AutoRegistrar {
    /// 创建独立的自动注册器
    pub fn new() -> Self {
        Self::default()
    }

    /// 进程级自动注册器
    pub fn process() -> &'static AutoRegistrar {
        &PROCESS_REGISTRAR
    }

    /// 已处理模块集合
    pub fn processed_modules(&self) -> &ProcessedModules {
        &self.processed
    }

    /// 自动注册模块中的服务、选项和 HTTP 客户端
    pub fn bootstrap<'c, C>(
        &self,
        container: &'c mut C,
        configuration: &dyn ConfigurationSource,
        modules: &[Module],
    ) -> RegistrationResult<&'c mut C>
    where
        C: ServiceContainer + HttpClientFactory,
    {
        self.bootstrap_with_report(container, configuration, modules)?;
        Ok(container)
    }

    /// 自动注册并返回启动报告
    pub fn bootstrap_with_report<C>(
        &self,
        container: &mut C,
        configuration: &dyn ConfigurationSource,
        modules: &[Module],
    ) -> RegistrationResult<BootstrapReport>
    where
        C: ServiceContainer + HttpClientFactory,
    {
        if modules.is_empty() {
            error!("自动注册至少需要一个模块");
            return Err(RegistrationError::NoModules);
        }

        let mut report = BootstrapReport::default();
        for module in modules {
            if !self.processed.try_claim(module.name()) {
                debug!(
                    "同名模块已处理, 跳过: {} ({} 个注册条目)",
                    module.name(),
                    module.registrations().len()
                );
                report.modules_skipped.push(module.name().to_string());
                continue;
            }

            info!("开始自动注册模块: {}", module.name());
            self.register_module(container, configuration, module, &mut report)?;
            report.modules_processed.push(module.name().to_string());
            info!("模块自动注册完成: {}", module.name());
        }

        Ok(report)
    }

    fn register_module<C>(
        &self,
        container: &mut C,
        configuration: &dyn ConfigurationSource,
        module: &Module,
        report: &mut BootstrapReport,
    ) -> RegistrationResult<()>
    where
        C: ServiceContainer + HttpClientFactory,
    {
        let scan = TypeScanner::scan(module);

        report.services_registered += register_services(container, &scan.services)?;
        report.options_registered += register_options(
            container,
            configuration,
            &scan.options,
            &mut report.diagnostics,
        )?;
        report.clients_registered += register_http_clients(
            container,
            configuration,
            &scan.http_clients,
            &mut report.diagnostics,
        )?;

        Ok(())
    }
}

/// 服务注册阶段
///
/// 每个接口按 Transient、Scoped、Singleton 的顺序注册所有声明的生命周期，
/// 返回注册数量。
pub(crate) fn register_services<C>(
    container: &mut C,
    bindings: &[ServiceBinding],
) -> RegistrationResult<usize>
where
    C: ServiceContainer + ?Sized,
{
    let mut registered = 0;

    for binding in bindings {
        if binding.lifetimes.is_empty() || binding.lifetimes.has_unknown_bits() {
            error!(
                "未处理的生命周期: {:?}, 服务: {}",
                binding.lifetimes,
                binding.implementation.full_name()
            );
            return Err(RegistrationError::UnhandledLifetime {
                type_name: binding.implementation.full_name().to_string(),
                bits: binding.lifetimes.bits(),
            });
        }

        for interface in &binding.interfaces {
            for lifetime in binding.lifetimes.iter() {
                container.register_factory(interface, &binding.implementation, lifetime)?;
                debug!(
                    "注册服务: {} -> {} ({})",
                    interface.name(),
                    binding.implementation.name(),
                    lifetime
                );
                registered += 1;
            }
        }
    }

    Ok(registered)
}

/// 使用进程级自动注册器注册模块
pub fn bootstrap<'c, C>(
    container: &'c mut C,
    configuration: &dyn ConfigurationSource,
    modules: &[Module],
) -> RegistrationResult<&'c mut C>
where
    C: ServiceContainer + HttpClientFactory,
{
    AutoRegistrar::process().bootstrap(container, configuration, modules)
}

/// 使用进程级自动注册器注册模块并返回启动报告
pub fn bootstrap_with_report<C>(
    container: &mut C,
    configuration: &dyn ConfigurationSource,
    modules: &[Module],
) -> RegistrationResult<BootstrapReport>
where
    C: ServiceContainer + HttpClientFactory,
{
    AutoRegistrar::process().bootstrap_with_report(container, configuration, modules)
}
