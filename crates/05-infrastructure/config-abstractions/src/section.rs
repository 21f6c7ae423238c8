//! 配置节抽象接口

use crate::binder::bind_value;
use infrastructure_common::ConfigError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::Debug;
use tracing::debug;

/// 配置节 trait
///
/// 配置节是配置树中按键定位的一棵子树，读取始终反映配置源的当前状态。
pub trait ConfigurationSection: Send + Sync + Debug {
    /// 配置节在父节点中的键
    fn key(&self) -> &str;

    /// 配置节的完整路径
    fn path(&self) -> &str;

    /// 配置节当前的值，不存在时返回 `None`
    fn value(&self) -> Option<Value>;

    /// 配置变更版本号，每次配置源重新加载后递增
    fn version(&self) -> u64;

    /// 配置节是否存在
    ///
    /// 有标量值或者有子节点的配置节视为存在。
    fn exists(&self) -> bool {
        match self.value() {
            None | Some(Value::Null) => false,
            Some(Value::Object(map)) => !map.is_empty(),
            Some(Value::Array(items)) => !items.is_empty(),
            Some(_) => true,
        }
    }
}

/// 配置节类型化绑定扩展
pub trait SectionExt {
    /// 绑定到具体类型，不存在或类型不匹配时返回 `None`
    fn bind<T: DeserializeOwned>(&self) -> Option<T>;

    /// 绑定到具体类型
    fn try_bind<T: DeserializeOwned>(&self) -> Result<T, ConfigError>;
}

impl<S> SectionExt for S
where
    S: ConfigurationSection + ?Sized,
{
    fn bind<T: DeserializeOwned>(&self) -> Option<T> {
        match self.try_bind() {
            Ok(value) => Some(value),
            Err(e) => {
                debug!("配置节绑定失败: path={}, error={}", self.path(), e);
                None
            }
        }
    }

    fn try_bind<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        if !self.exists() {
            return Err(ConfigError::KeyNotFound {
                key: self.path().to_string(),
            });
        }
        let value = self.value().unwrap_or(Value::Null);
        bind_value(value)
    }
}
