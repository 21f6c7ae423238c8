//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义自动注册引擎写入的外部协作者接口。
//!
//! ## 核心接口
//!
//! - [`ServiceContainer`] - 服务容器注册接口
//! - [`HttpClientFactory`] - 类型化 HTTP 客户端工厂接口
//! - [`HttpClientBuilder`] - 单个客户端的配置构建器
//! - [`DelegatingHandler`] / [`PrimaryHandler`] - HTTP 处理管道中的处理器

pub mod container;
pub mod http;

pub use container::*;
pub use http::*;
