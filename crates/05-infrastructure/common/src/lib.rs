//! # Infrastructure Common
//!
//! 这个 crate 提供了自动注册引擎各层共享的基础类型。
//!
//! ## 核心类型
//!
//! - [`Lifetime`] / [`LifetimeFlags`] - 服务生命周期及其组合位集
//! - [`TypeInfo`] / [`TypeRef`] - 替代运行时反射的显式类型描述
//! - [`NamingConventions`] - 配置节名称推导约定
//! - [`SerializerSettings`] - HTTP 客户端负载序列化设置
//! - [`BindOptions`] / [`from_value_with`] - 按目标类型宽松绑定 JSON 值
//! - [`MarkerError`] / [`RegistrationError`] - 标注与注册错误
//!
//! ## 设计原则
//!
//! - 基于 Rust 类型系统的编译时安全
//! - 约定优于配置
//! - 显式注册表代替运行时类型内省

pub mod binding;
pub mod conventions;
pub mod errors;
pub mod lifecycle;
pub mod metadata;
pub mod serialization;

pub use binding::*;
pub use conventions::*;
pub use errors::*;
pub use lifecycle::*;
pub use metadata::*;
pub use serialization::*;
