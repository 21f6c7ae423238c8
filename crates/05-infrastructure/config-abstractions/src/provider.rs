//! 配置源抽象接口

use crate::section::ConfigurationSection;
use std::sync::Arc;

/// 配置路径分隔符
pub const KEY_DELIMITER: char = ':';

/// 配置源 trait
///
/// 按 `:` 分隔的键获取配置节。即使配置节不存在也会返回句柄，
/// 由 [`ConfigurationSection::exists`] 判断是否存在。
pub trait ConfigurationSource: Send + Sync {
    /// 获取配置节
    fn get_section(&self, key: &str) -> Arc<dyn ConfigurationSection>;

    /// 获取配置源名称
    fn name(&self) -> &str;
}

impl<T> ConfigurationSource for Arc<T>
where
    T: ConfigurationSource + ?Sized,
{
    fn get_section(&self, key: &str) -> Arc<dyn ConfigurationSection> {
        (**self).get_section(key)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// 组合配置路径
pub fn combine_path(parent: &str, key: &str) -> String {
    match (parent.is_empty(), key.is_empty()) {
        (true, _) => key.to_string(),
        (_, true) => parent.to_string(),
        _ => format!("{parent}{KEY_DELIMITER}{key}"),
    }
}
