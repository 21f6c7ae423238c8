//! 默认负载序列化设置

use infrastructure_common::{NamingPolicy, NumberHandling, SerializerSettings, ValueConverter};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::debug;

static DEFAULT_SETTINGS: OnceCell<Arc<SerializerSettings>> = OnceCell::new();

/// 默认负载序列化设置提供者
///
/// 第一次访问时创建，之后所有 HTTP 客户端共享同一个实例。
#[derive(Debug)]
pub struct DefaultSerializer;

impl DefaultSerializer {
    /// 获取共享的默认设置
    pub fn get() -> Arc<SerializerSettings> {
        Arc::clone(DEFAULT_SETTINGS.get_or_init(|| {
            debug!("创建默认负载序列化设置");
            Arc::new(Self::build())
        }))
    }

    /// 构建一份新的默认设置
    ///
    /// 属性名称大小写不敏感、小驼峰命名、数值可以从字符串读取，
    /// 枚举以字符串读写，十进制数可以从带 `,` 分组符的字符串读取。
    pub fn build() -> SerializerSettings {
        SerializerSettings {
            property_name_case_insensitive: true,
            property_naming_policy: NamingPolicy::CamelCase,
            number_handling: NumberHandling::AllowReadingFromString,
            converters: vec![ValueConverter::StringEnum, ValueConverter::StringDecimal],
        }
    }
}
