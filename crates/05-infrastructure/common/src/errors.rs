//! 错误类型定义

use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败: {source}")]
    FileReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("配置解析失败: {source}")]
    ParseError {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("配置序列化失败: {source}")]
    SerializationError {
        #[from]
        source: serde_json::Error,
    },

    #[error("配置键不存在: {key}")]
    KeyNotFound { key: String },

    #[error("配置类型转换失败: {message}")]
    TypeConversionError { message: String },
}

/// 依赖注入错误类型
#[derive(Error, Debug)]
pub enum DependencyError {
    #[error("组件注册失败: {type_name}, 原因: {message}")]
    RegistrationError { type_name: String, message: String },

    #[error("组件创建失败: {type_name}, 原因: {message}")]
    ComponentCreationFailed { type_name: String, message: String },
}

/// 标注构造错误类型
///
/// 只会在类型定义（构建注册目录条目）时产生，扫描阶段不会产生此类错误。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarkerError {
    #[error("生命周期不能为 None")]
    InvalidLifetime,

    #[error("HTTP 客户端标注包含无效的处理器: '{handlers}'")]
    InvalidHandlers { handlers: String },

    #[error("HTTP 客户端标注包含重复的处理器: '{handlers}'")]
    DuplicateHandlers { handlers: String },

    #[error("主处理器必须是 PrimaryHandler 类型: '{type_name}'")]
    InvalidPrimaryHandler { type_name: String },

    #[error("类型 '{type_name}' 上不允许重复的 {marker} 标注")]
    DuplicateMarker {
        type_name: String,
        marker: &'static str,
    },
}

/// 自动注册错误类型
#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("找不到配置节: '{section}'")]
    MissingConfiguration { section: String },

    #[error("配置节缺失或无效: '{section}'")]
    InvalidConfiguration { section: String },

    #[error("类型 '{type_name}' 看起来不是 REST 客户端")]
    NotARestClient { type_name: String },

    #[error("HTTP 客户端类型 '{type_name}' 必须且只能实现一个接口, 实际: {count}")]
    InterfaceCardinality { type_name: String, count: usize },

    #[error("未处理的生命周期: '{bits:#05b}', 服务: '{type_name}'")]
    UnhandledLifetime { type_name: String, bits: u8 },

    #[error("至少需要提供一个模块")]
    NoModules,

    #[error("依赖注入错误: {source}")]
    Dependency {
        #[from]
        source: DependencyError,
    },
}

impl RegistrationError {
    /// 创建配置缺失错误
    pub fn missing_configuration(section: impl Into<String>) -> Self {
        Self::MissingConfiguration {
            section: section.into(),
        }
    }

    /// 创建配置无效错误
    pub fn invalid_configuration(section: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            section: section.into(),
        }
    }
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type DependencyResult<T> = Result<T, DependencyError>;
pub type MarkerResult<T> = Result<T, MarkerError>;
pub type RegistrationResult<T> = Result<T, RegistrationError>;
