//! # Auto Registration
//!
//! 按模块扫描注册目录，把带标注的类型自动注册到三个目标：
//!
//! - 服务容器：服务类型按声明的生命周期绑定到它实现的每个接口
//! - 类型化配置：选项类型绑定到约定名称的配置节
//! - HTTP 客户端工厂：REST 客户端接口或具体客户端，以及它们的处理管道
//!
//! ## 基本使用
//!
//! ```rust,ignore
//! use auto_registration::{bootstrap, Module, Registrable};
//!
//! #[derive(Registrable, Default)]
//! #[transient_service]
//! #[implements(dyn IWidget)]
//! struct WidgetImpl;
//!
//! let module = Module::new("widgets").with::<WidgetImpl>()?;
//! bootstrap(&mut services, &configuration, &[module])?;
//! ```

pub mod annotations;
pub mod bootstrapper;
pub mod http_clients;
pub mod options;
pub mod registration;
pub mod scanner;
pub mod serializer;

pub use annotations::*;
pub use bootstrapper::*;
pub use http_clients::{HttpClientSettings, DEFAULT_TIMEOUT_SECONDS};
pub use options::{
    install_options, lookup_section, ConfigureFromSection, OptionsMonitor, SectionChangeSource,
    SectionLookup,
};
pub use registration::*;
pub use scanner::*;
pub use serializer::*;

pub use registration_macros::{rest_client, Registrable};

/// 过程宏生成代码使用的路径，不属于公开接口
#[doc(hidden)]
pub mod __private {
    pub use di_abstractions::{delegating_handler, primary_handler};
    pub use infrastructure_common::{LifetimeFlags, MarkerResult, TypeRef};
}

#[cfg(test)]
mod tests;
