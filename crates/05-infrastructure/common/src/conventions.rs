//! 约定规范定义
//!
//! 提供配置节名称推导和属性命名转换的约定规范

use crate::metadata::TypeInfo;

/// 配置类型名称中会被移除的约定片段
pub const CONFIGURATION_SEGMENT: &str = "Configuration";
/// `CONFIGURATION_SEGMENT` 不存在时会被移除的约定后缀
pub const CONFIG_SUFFIX: &str = "Config";
/// HTTP 客户端接口名称中会被移除的约定片段
pub const CLIENT_SEGMENT: &str = "Client";

/// 命名约定规范
#[derive(Debug)]
pub struct NamingConventions;

impl NamingConventions {
    /// 获取选项类型绑定的配置节名称
    ///
    /// 非空的显式名称优先；否则移除类型名称中第一个 `Configuration`，
    /// 名称中没有 `Configuration` 时移除 `Config` 后缀。
    pub fn options_section_key(type_info: &TypeInfo, explicit: Option<&str>) -> String {
        match explicit {
            Some(section) if !section.trim().is_empty() => section.to_string(),
            _ => Self::strip_configuration_segment(type_info.short_name()),
        }
    }

    /// 从配置类型名称推导配置节名称
    pub fn strip_configuration_segment(name: &str) -> String {
        if name.contains(CONFIGURATION_SEGMENT) {
            name.replacen(CONFIGURATION_SEGMENT, "", 1)
        } else {
            name.strip_suffix(CONFIG_SUFFIX).unwrap_or(name).to_string()
        }
    }

    /// 获取 REST 客户端接口对应的配置节名称
    ///
    /// `IBarClient` -> `Bar`：移除接口前缀 `I` 以及所有 `Client` 片段。
    pub fn client_section_key(type_info: &TypeInfo) -> String {
        Self::strip_interface_prefix(type_info.short_name()).replace(CLIENT_SEGMENT, "")
    }

    /// 移除接口名称的类型前缀字符
    ///
    /// 只有形如 `IFoo`（`I` 后面紧跟大写字母）的名称才视为带前缀。
    pub fn strip_interface_prefix(name: &str) -> &str {
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some('I'), Some(next)) if next.is_uppercase() => &name[1..],
            _ => name,
        }
    }

    /// 将驼峰命名转换为蛇形命名
    pub fn to_snake_case(s: &str) -> String {
        let mut result = String::new();
        let mut chars = s.chars().peekable();
        let mut previous_lower = false;

        while let Some(ch) = chars.next() {
            if ch.is_uppercase() && !result.is_empty() && !result.ends_with('_') {
                let next_lower = chars.peek().is_some_and(|next| next.is_lowercase());
                if previous_lower || next_lower {
                    result.push('_');
                }
            }
            previous_lower = ch.is_lowercase() || ch.is_ascii_digit();
            result.extend(ch.to_lowercase());
        }

        result
    }

    /// 将蛇形命名转换为小驼峰命名
    pub fn to_camel_case(s: &str) -> String {
        let mut result = String::with_capacity(s.len());
        let mut upper_next = false;

        for (index, ch) in s.chars().enumerate() {
            if ch == '_' {
                upper_next = !result.is_empty();
                continue;
            }
            if index == 0 || result.is_empty() {
                result.extend(ch.to_lowercase());
            } else if upper_next {
                result.extend(ch.to_uppercase());
            } else {
                result.push(ch);
            }
            upper_next = false;
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FooConfiguration;
    struct RetryConfig;
    struct Plain;
    trait IBarClient {}
    trait InventoryClient {}

    #[test]
    fn test_options_section_key_strips_configuration() {
        let key = NamingConventions::options_section_key(&TypeInfo::of::<FooConfiguration>(), None);
        assert_eq!(key, "Foo");
    }

    #[test]
    fn test_options_section_key_falls_back_to_config_suffix() {
        assert_eq!(
            NamingConventions::options_section_key(&TypeInfo::of::<RetryConfig>(), None),
            "Retry"
        );
        assert_eq!(
            NamingConventions::options_section_key(&TypeInfo::of::<Plain>(), None),
            "Plain"
        );
    }

    #[test]
    fn test_explicit_section_wins_unless_blank() {
        let info = TypeInfo::of::<FooConfiguration>();
        assert_eq!(
            NamingConventions::options_section_key(&info, Some("Custom:Path")),
            "Custom:Path"
        );
        assert_eq!(NamingConventions::options_section_key(&info, Some("   ")), "Foo");
    }

    #[test]
    fn test_only_first_configuration_segment_is_removed() {
        assert_eq!(
            NamingConventions::strip_configuration_segment("ConfigurationConfiguration"),
            "Configuration"
        );
    }

    #[test]
    fn test_client_section_key() {
        assert_eq!(
            NamingConventions::client_section_key(&TypeInfo::of::<dyn IBarClient>()),
            "Bar"
        );
        // `In` 不是接口前缀
        assert_eq!(
            NamingConventions::client_section_key(&TypeInfo::of::<dyn InventoryClient>()),
            "Inventory"
        );
    }

    #[test]
    fn test_case_conversions() {
        assert_eq!(NamingConventions::to_snake_case("BaseAddress"), "base_address");
        assert_eq!(NamingConventions::to_snake_case("baseAddress"), "base_address");
        assert_eq!(NamingConventions::to_snake_case("base_address"), "base_address");
        assert_eq!(NamingConventions::to_snake_case("HTTPTimeout"), "http_timeout");
        assert_eq!(NamingConventions::to_camel_case("base_address"), "baseAddress");
        assert_eq!(NamingConventions::to_camel_case("timeout"), "timeout");
    }
}
