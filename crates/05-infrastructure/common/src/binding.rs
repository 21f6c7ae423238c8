//! 宽松的值绑定
//!
//! 按目标类型的形状读取 `serde_json::Value`：结构体字段名称大小写不敏感地
//! 匹配，映射的键原样保留；目标是数值或布尔值时可以从字符串读取。

use crate::conventions::NamingConventions;
use crate::serialization::parse_decimal_str;
use serde::de::value::StringDeserializer;
use serde::de::{
    self, DeserializeOwned, DeserializeSeed, Deserializer, IntoDeserializer, MapAccess, SeqAccess,
    Visitor,
};
use serde_json::{Map, Number, Value};

/// 绑定选项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BindOptions {
    /// 结构体字段名称大小写不敏感（同时接受蛇形与驼峰形式）
    pub case_insensitive: bool,
    /// 整数和浮点数可以从字符串读取
    pub numbers_from_strings: bool,
    /// 浮点数可以从带 `,` 分组符的字符串读取，空白字符串读取为 0
    pub decimals_from_strings: bool,
    /// 布尔值可以从 `"true"` / `"false"` 读取
    pub bools_from_strings: bool,
}

impl BindOptions {
    /// 严格绑定，等同于 `serde_json::from_value`
    pub const fn strict() -> Self {
        Self {
            case_insensitive: false,
            numbers_from_strings: false,
            decimals_from_strings: false,
            bools_from_strings: false,
        }
    }

    /// 配置节绑定使用的选项
    pub const fn configuration() -> Self {
        Self {
            case_insensitive: true,
            numbers_from_strings: true,
            decimals_from_strings: false,
            bools_from_strings: true,
        }
    }
}

/// 按选项把值绑定到具体类型
pub fn from_value_with<T: DeserializeOwned>(
    value: Value,
    options: BindOptions,
) -> Result<T, serde_json::Error> {
    T::deserialize(LenientValue { value, options })
}

/// 去掉分隔符并转为小写后的名称
fn fold(name: &str) -> String {
    name.chars()
        .filter(|ch| *ch != '_' && *ch != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// 为配置中的键找到对应的结构体字段
fn match_field(key: &str, fields: &'static [&'static str]) -> Option<&'static str> {
    if fields.iter().any(|field| *field == key) {
        return None;
    }
    let snake = NamingConventions::to_snake_case(key);
    if let Some(field) = fields.iter().copied().find(|field| *field == snake) {
        return Some(field);
    }
    let folded = fold(key);
    fields.iter().copied().find(|field| fold(field) == folded)
}

struct LenientValue {
    value: Value,
    options: BindOptions,
}

/// 把配置中的键改写为匹配的字段名称，映射和未知键保持原样
fn struct_entries(
    map: Map<String, Value>,
    fields: &'static [&'static str],
    options: BindOptions,
) -> Map<String, Value> {
    if !options.case_insensitive {
        return map;
    }
    // 后出现的同名字段覆盖先出现的
    let mut entries = Map::new();
    for (key, value) in map {
        let key = match match_field(&key, fields) {
            Some(field) => field.to_string(),
            None => key,
        };
        entries.insert(key, value);
    }
    entries
}

impl LenientValue {
    fn text(&self) -> Option<&str> {
        match &self.value {
            Value::String(text) => Some(text.trim()),
            _ => None,
        }
    }

    fn coerced_integer(self) -> Value {
        let parsed = self
            .text()
            .filter(|_| self.options.numbers_from_strings)
            .and_then(|text| {
                text.parse::<i64>()
                    .map(Value::from)
                    .or_else(|_| text.parse::<u64>().map(Value::from))
                    .ok()
            });
        parsed.unwrap_or(self.value)
    }

    fn coerced_float(self) -> Value {
        let parsed = self.text().and_then(|text| {
            if self.options.decimals_from_strings {
                parse_decimal_str(text).ok()
            } else if self.options.numbers_from_strings {
                text.parse::<f64>().ok()
            } else {
                None
            }
        });
        match parsed.and_then(Number::from_f64) {
            Some(number) => Value::Number(number),
            None => self.value,
        }
    }

    fn coerced_bool(self) -> Value {
        let parsed = self
            .text()
            .filter(|_| self.options.bools_from_strings)
            .and_then(|text| {
                if text.eq_ignore_ascii_case("true") {
                    Some(true)
                } else if text.eq_ignore_ascii_case("false") {
                    Some(false)
                } else {
                    None
                }
            });
        parsed.map_or(self.value, Value::Bool)
    }
}

macro_rules! deserialize_coerced {
    ($coerce:ident => $($method:ident)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
                self.$coerce().$method(visitor)
            }
        )*
    };
}

macro_rules! deserialize_forward {
    ($($method:ident)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
                self.value.$method(visitor)
            }
        )*
    };
}

impl<'de> Deserializer<'de> for LenientValue {
    type Error = serde_json::Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.value {
            Value::Object(map) => visitor.visit_map(LenientMap::new(map, self.options)),
            Value::Array(items) => visitor.visit_seq(LenientSeq::new(items, self.options)),
            other => other.deserialize_any(visitor),
        }
    }

    deserialize_coerced!(coerced_integer =>
        deserialize_i8 deserialize_i16 deserialize_i32 deserialize_i64
        deserialize_u8 deserialize_u16 deserialize_u32 deserialize_u64);
    deserialize_coerced!(coerced_float => deserialize_f32 deserialize_f64);
    deserialize_coerced!(coerced_bool => deserialize_bool);
    deserialize_forward!(
        deserialize_char deserialize_str deserialize_string deserialize_bytes
        deserialize_byte_buf deserialize_unit deserialize_identifier deserialize_ignored_any);

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.value {
            Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.value.deserialize_unit_struct(name, visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.value {
            Value::Array(items) => visitor.visit_seq(LenientSeq::new(items, self.options)),
            other => other.deserialize_seq(visitor),
        }
    }

    fn deserialize_tuple<V: Visitor<'de>>(
        self,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.value {
            Value::Object(map) => visitor.visit_map(LenientMap::new(map, self.options)),
            other => other.deserialize_map(visitor),
        }
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        match self.value {
            Value::Object(map) => visitor.visit_map(LenientMap::new(
                struct_entries(map, fields, self.options),
                self.options,
            )),
            other => other.deserialize_struct(name, fields, visitor),
        }
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.value.deserialize_enum(name, variants, visitor)
    }
}

struct LenientMap {
    entries: serde_json::map::IntoIter,
    pending: Option<Value>,
    options: BindOptions,
}

impl LenientMap {
    fn new(map: Map<String, Value>, options: BindOptions) -> Self {
        Self {
            entries: map.into_iter(),
            pending: None,
            options,
        }
    }
}

impl<'de> MapAccess<'de> for LenientMap {
    type Error = serde_json::Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, Self::Error> {
        let Some((key, value)) = self.entries.next() else {
            return Ok(None);
        };
        self.pending = Some(value);
        let key: StringDeserializer<serde_json::Error> = key.into_deserializer();
        seed.deserialize(key).map(Some)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, Self::Error> {
        let value = self
            .pending
            .take()
            .ok_or_else(|| <serde_json::Error as de::Error>::custom("读取映射值之前没有读取键"))?;
        seed.deserialize(LenientValue {
            value,
            options: self.options,
        })
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.entries.len())
    }
}

struct LenientSeq {
    items: std::vec::IntoIter<Value>,
    options: BindOptions,
}

impl LenientSeq {
    fn new(items: Vec<Value>, options: BindOptions) -> Self {
        Self {
            items: items.into_iter(),
            options,
        }
    }
}

impl<'de> SeqAccess<'de> for LenientSeq {
    type Error = serde_json::Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, Self::Error> {
        match self.items.next() {
            Some(value) => seed
                .deserialize(LenientValue {
                    value,
                    options: self.options,
                })
                .map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.items.len())
    }
}
