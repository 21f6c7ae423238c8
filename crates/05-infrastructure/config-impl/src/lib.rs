//! # Configuration Implementation
//! 
//! 配置源的具体实现。
//! 
//! ## 主要组件
//! 
//! - [`JsonConfiguration`] - 支持热重载的 JSON 配置树
//! - [`JsonSection`] - 读取实时配置的配置节句柄

pub mod providers;

pub use providers::*;
