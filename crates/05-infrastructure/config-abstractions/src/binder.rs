//! 配置值绑定
//!
//! 配置来源（环境变量、键值对）中的标量通常是字符串，属性名称通常是
//! PascalCase。结构体字段大小写不敏感地匹配，字符串只在目标字段是数值
//! 或布尔值时才转换；映射（例如请求头表）的键原样保留。

use infrastructure_common::{from_value_with, BindOptions, ConfigError};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// 将配置值绑定到具体类型
pub fn bind_value<T: DeserializeOwned>(value: Value) -> Result<T, ConfigError> {
    from_value_with(value, BindOptions::configuration()).map_err(|e| {
        ConfigError::TypeConversionError {
            message: format!("无法绑定到 {}: {}", std::any::type_name::<T>(), e),
        }
    })
}
