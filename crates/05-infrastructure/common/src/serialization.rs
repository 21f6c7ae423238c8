//! HTTP 客户端负载序列化设置
//!
//! 属性名称在 Rust 侧统一为蛇形命名，负载侧由 [`NamingPolicy`] 决定。
//! 读取时结构体字段大小写不敏感地匹配，因此 `BaseAddress`、`baseAddress`
//! 和 `base_address` 都能匹配同一个字段；映射的键保持原样。

use crate::binding::{from_value_with, BindOptions};
use crate::conventions::NamingConventions;
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// 属性命名策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingPolicy {
    /// 保持 Rust 字段名称
    AsIs,
    /// 小驼峰命名
    CamelCase,
}

/// 数值处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberHandling {
    /// 只接受原生数值
    Strict,
    /// 允许从字符串读取数值
    AllowReadingFromString,
    /// 允许从字符串读取，并以字符串写出
    WriteAsString,
}

impl NumberHandling {
    /// 是否允许从字符串读取数值
    pub const fn allows_reading_from_string(self) -> bool {
        !matches!(self, Self::Strict)
    }
}

/// 附加的值转换器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueConverter {
    /// 枚举以字符串读写
    StringEnum,
    /// 十进制数可以从字符串读取（去除 `,` 分组符）
    StringDecimal,
}

/// 负载序列化设置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializerSettings {
    /// 属性名称是否大小写不敏感
    pub property_name_case_insensitive: bool,
    /// 属性命名策略
    pub property_naming_policy: NamingPolicy,
    /// 数值处理方式
    pub number_handling: NumberHandling,
    /// 转换器列表
    pub converters: Vec<ValueConverter>,
}

impl Default for SerializerSettings {
    fn default() -> Self {
        Self {
            property_name_case_insensitive: false,
            property_naming_policy: NamingPolicy::AsIs,
            number_handling: NumberHandling::Strict,
            converters: Vec::new(),
        }
    }
}

impl SerializerSettings {
    /// 是否启用了指定转换器
    pub fn has_converter(&self, converter: ValueConverter) -> bool {
        self.converters.contains(&converter)
    }

    /// 序列化为负载字符串
    pub fn to_string<T: Serialize>(&self, value: &T) -> Result<String, serde_json::Error> {
        let value = self.to_value(value)?;
        serde_json::to_string(&value)
    }

    /// 序列化为负载值
    ///
    /// 按命名策略重命名蛇形标识符形式的属性，其他键（例如 `X-Api-Key`）保持原样；
    /// `WriteAsString` 时数值以字符串写出。
    pub fn to_value<T: Serialize>(&self, value: &T) -> Result<Value, serde_json::Error> {
        let value = serde_json::to_value(value)?;
        Ok(self.write_payload(value))
    }

    /// 从负载字符串反序列化
    pub fn from_str<T: DeserializeOwned>(&self, payload: &str) -> Result<T, serde_json::Error> {
        let value: Value = serde_json::from_str(payload)?;
        self.from_value(value)
    }

    /// 从负载值反序列化
    pub fn from_value<T: DeserializeOwned>(&self, value: Value) -> Result<T, serde_json::Error> {
        from_value_with(value, self.bind_options())
    }

    /// 读取负载时使用的绑定选项
    pub fn bind_options(&self) -> BindOptions {
        BindOptions {
            case_insensitive: self.property_name_case_insensitive
                || self.property_naming_policy != NamingPolicy::AsIs,
            numbers_from_strings: self.number_handling.allows_reading_from_string(),
            decimals_from_strings: self.has_converter(ValueConverter::StringDecimal),
            bools_from_strings: false,
        }
    }

    /// 按设置读取十进制数
    pub fn read_decimal(&self, value: &Value) -> Result<f64, String> {
        match value {
            Value::Number(number) => number
                .as_f64()
                .ok_or_else(|| format!("无法表示的数值: {number}")),
            Value::String(text)
                if self.has_converter(ValueConverter::StringDecimal)
                    || self.number_handling.allows_reading_from_string() =>
            {
                parse_decimal_str(text)
            }
            Value::String(text) => Err(format!("不允许从字符串读取数值: '{text}'")),
            _ => Ok(0.0),
        }
    }

    /// 按设置写出十进制数
    pub fn write_decimal(&self, value: f64) -> Value {
        if self.number_handling == NumberHandling::WriteAsString {
            return Value::String(value.to_string());
        }
        Number::from_f64(value).map_or(Value::Null, Value::Number)
    }
}

impl SerializerSettings {
    fn write_payload(&self, value: Value) -> Value {
        match value {
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, value)| (self.property_name(key), self.write_payload(value)))
                    .collect::<Map<String, Value>>(),
            ),
            Value::Array(items) => {
                Value::Array(items.into_iter().map(|item| self.write_payload(item)).collect())
            }
            Value::Number(number) if self.number_handling == NumberHandling::WriteAsString => {
                match number.as_f64().filter(|_| number.is_f64()) {
                    Some(decimal) => self.write_decimal(decimal),
                    None => Value::String(number.to_string()),
                }
            }
            other => other,
        }
    }

    fn property_name(&self, key: String) -> String {
        match self.property_naming_policy {
            NamingPolicy::CamelCase if is_snake_identifier(&key) => {
                NamingConventions::to_camel_case(&key)
            }
            _ => key,
        }
    }
}

/// 是否为蛇形命名的标识符（字段名称的形式）
fn is_snake_identifier(key: &str) -> bool {
    key.starts_with(|ch: char| ch.is_ascii_lowercase())
        && key
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_')
}

/// 解析字符串形式的十进制数，空白字符串视为 0
pub fn parse_decimal_str(text: &str) -> Result<f64, String> {
    if text.trim().is_empty() {
        return Ok(0.0);
    }
    text.replace(',', "")
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("无效的十进制数 '{text}': {e}"))
}

/// 十进制字段的宽松读取
///
/// 用法: `#[serde(deserialize_with = "infrastructure_common::lenient_decimal")]`。
/// 接受数值或字符串（去除 `,` 分组符），其他记号读取为 0。
pub fn lenient_decimal<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| de::Error::custom(format!("无法表示的数值: {number}"))),
        Value::String(text) => parse_decimal_str(&text).map_err(de::Error::custom),
        _ => Ok(0.0),
    }
}

/// 整数字段的宽松读取，允许字符串形式的整数
pub fn lenient_integer<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(number) => number
            .as_i64()
            .ok_or_else(|| de::Error::custom(format!("不是整数: {number}"))),
        Value::String(text) => text
            .trim()
            .parse::<i64>()
            .map_err(|e| de::Error::custom(format!("无效的整数 '{text}': {e}"))),
        other => Err(de::Error::custom(format!("期望整数, 实际: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    enum Status {
        Active,
        Suspended,
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Order {
        order_id: String,
        status: Status,
        #[serde(deserialize_with = "lenient_decimal")]
        total: f64,
        #[serde(deserialize_with = "lenient_integer")]
        quantity: i64,
    }

    fn camel_case_settings() -> SerializerSettings {
        SerializerSettings {
            property_name_case_insensitive: true,
            property_naming_policy: NamingPolicy::CamelCase,
            number_handling: NumberHandling::AllowReadingFromString,
            converters: vec![ValueConverter::StringEnum, ValueConverter::StringDecimal],
        }
    }

    #[test]
    fn test_reads_mixed_case_properties_and_string_numbers() {
        let settings = camel_case_settings();
        let order: Order = settings
            .from_str(r#"{"OrderId":"A-1","status":"Active","TOTAL":"1,234.50","quantity":"3"}"#)
            .unwrap();

        assert_eq!(order.order_id, "A-1");
        assert_eq!(order.status, Status::Active);
        assert!((order.total - 1234.5).abs() < f64::EPSILON);
        assert_eq!(order.quantity, 3);
    }

    #[test]
    fn test_writes_camel_case_properties_and_string_enums() {
        let settings = camel_case_settings();
        let order = Order {
            order_id: "A-2".to_string(),
            status: Status::Suspended,
            total: 10.0,
            quantity: 1,
        };

        let value = settings.to_value(&order).unwrap();
        assert_eq!(value["orderId"], json!("A-2"));
        assert_eq!(value["status"], json!("Suspended"));
    }

    #[test]
    fn test_decimal_read_and_write() {
        let mut settings = camel_case_settings();

        assert_eq!(settings.read_decimal(&json!("")).unwrap(), 0.0);
        assert_eq!(settings.read_decimal(&json!(true)).unwrap(), 0.0);
        assert_eq!(settings.read_decimal(&json!("12,000")).unwrap(), 12000.0);
        assert!(settings.read_decimal(&json!("abc")).is_err());
        assert_eq!(settings.write_decimal(2.5), json!(2.5));

        settings.number_handling = NumberHandling::WriteAsString;
        assert_eq!(settings.write_decimal(2.5), json!("2.5"));
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct LineItem {
        count: u32,
        price: f64,
    }

    #[test]
    fn test_plain_numeric_fields_read_from_strings() {
        let settings = camel_case_settings();
        let item: LineItem = settings
            .from_str(r#"{"count":"3","price":"1,234.5"}"#)
            .unwrap();

        assert_eq!(item, LineItem { count: 3, price: 1234.5 });
    }

    #[test]
    fn test_strict_numbers_reject_strings() {
        let settings = SerializerSettings::default();

        assert!(settings
            .from_str::<LineItem>(r#"{"count":"3","price":2.5}"#)
            .is_err());
        assert!(settings.read_decimal(&json!("2.5")).is_err());
        assert_eq!(settings.read_decimal(&json!(2.5)).unwrap(), 2.5);
    }

    #[test]
    fn test_write_as_string_writes_numbers_as_strings() {
        let settings = SerializerSettings {
            number_handling: NumberHandling::WriteAsString,
            ..SerializerSettings::default()
        };

        let value = settings.to_value(&LineItem { count: 3, price: 2.5 }).unwrap();
        assert_eq!(value, json!({"count": "3", "price": "2.5"}));

        let item: LineItem = settings.from_value(value).unwrap();
        assert_eq!(item, LineItem { count: 3, price: 2.5 });
    }

    #[test]
    fn test_map_keys_survive_payload_round_trip() {
        use std::collections::HashMap;

        #[derive(Debug, Serialize, Deserialize, PartialEq)]
        struct Envelope {
            request_id: String,
            headers: HashMap<String, String>,
        }

        let settings = camel_case_settings();
        let envelope = Envelope {
            request_id: "r-1".to_string(),
            headers: HashMap::from([
                ("X-Api-Key".to_string(), "k".to_string()),
                ("UserAgent".to_string(), "ua".to_string()),
            ]),
        };

        let value = settings.to_value(&envelope).unwrap();
        assert_eq!(value["requestId"], json!("r-1"));
        assert_eq!(value["headers"]["X-Api-Key"], json!("k"));
        assert_eq!(value["headers"]["UserAgent"], json!("ua"));

        let read: Envelope = settings
            .from_value(json!({"RequestId": "r-2", "Headers": {"X-Api-Key": "k", "UserAgent": "ua"}}))
            .unwrap();
        assert_eq!(read.headers["X-Api-Key"], "k");
        assert_eq!(read.headers["UserAgent"], "ua");
    }
}
