//! # Configuration Abstractions
//! 
//! 配置源抽象层，自动注册引擎通过这些接口读取配置。
//! 
//! ## 核心接口
//! 
//! - [`ConfigurationSource`] - 按键获取配置节
//! - [`ConfigurationSection`] - 配置节句柄
//! - [`SectionExt`] - 配置节类型化绑定

pub mod binder;
pub mod provider;
pub mod section;

pub use binder::*;
pub use provider::*;
pub use section::*;
