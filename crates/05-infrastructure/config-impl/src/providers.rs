//! 配置源实现

use config_abstractions::{combine_path, ConfigurationSection, ConfigurationSource, KEY_DELIMITER};
use infrastructure_common::ConfigError;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// 配置树及其变更版本
#[derive(Debug)]
struct ConfigState {
    root: Value,
    version: u64,
}

/// JSON 配置源
///
/// 键按 `:` 分隔、大小写不敏感。[`JsonConfiguration::reload`] 替换整棵配置树并
/// 递增变更版本，已经取得的 [`JsonSection`] 会读到新值。
#[derive(Debug, Clone)]
pub struct JsonConfiguration {
    name: String,
    state: Arc<RwLock<ConfigState>>,
}

impl JsonConfiguration {
    /// 从 JSON 值创建配置源
    pub fn new(root: Value) -> Self {
        Self {
            name: "JsonConfiguration".to_string(),
            state: Arc::new(RwLock::new(ConfigState { root, version: 0 })),
        }
    }

    /// 设置配置源名称
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// 空配置源
    pub fn empty() -> Self {
        Self::new(Value::Object(Map::new()))
    }

    /// 从 `("Section:Key", "value")` 形式的键值对创建配置源
    ///
    /// 由连续数字键（`0`、`1`...）组成的节点会转换为数组。
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut root = Map::new();
        for (key, value) in pairs {
            insert_path(&mut root, key.as_ref(), value.into());
        }
        Self::new(arrays_from_indices(Value::Object(root))).with_name("InMemoryConfiguration")
    }

    /// 从 JSON 字符串创建配置源
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        Ok(Self::new(serde_json::from_str(content)?))
    }

    /// 从 JSON 文件创建配置源
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        debug!("加载 JSON 配置文件: {}", path.as_ref().display());
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(Self::from_json_str(&content)?.with_name(path.as_ref().display().to_string()))
    }

    /// 从 `config` crate 构建的分层配置创建配置源
    pub fn from_config(config: config::Config) -> Result<Self, ConfigError> {
        let root = config
            .try_deserialize::<Value>()
            .map_err(|e| ConfigError::ParseError {
                source: Box::new(e),
            })?;
        Ok(Self::new(root).with_name("LayeredConfiguration"))
    }

    /// 替换配置树并递增变更版本
    pub fn reload(&self, root: Value) {
        let mut state = self.state.write();
        state.root = root;
        state.version += 1;
        info!("配置源 {} 已重新加载, 版本: {}", self.name, state.version);
    }

    /// 当前变更版本
    pub fn version(&self) -> u64 {
        self.state.read().version
    }
}

impl Default for JsonConfiguration {
    fn default() -> Self {
        Self::empty()
    }
}

impl ConfigurationSource for JsonConfiguration {
    fn get_section(&self, key: &str) -> Arc<dyn ConfigurationSection> {
        Arc::new(JsonSection {
            key: key.rsplit(KEY_DELIMITER).next().unwrap_or(key).to_string(),
            path: key.to_string(),
            state: Arc::clone(&self.state),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// JSON 配置节
#[derive(Debug, Clone)]
pub struct JsonSection {
    key: String,
    path: String,
    state: Arc<RwLock<ConfigState>>,
}

impl JsonSection {
    /// 获取子配置节
    pub fn child(&self, key: &str) -> Self {
        Self {
            key: key.to_string(),
            path: combine_path(&self.path, key),
            state: Arc::clone(&self.state),
        }
    }
}

impl ConfigurationSection for JsonSection {
    fn key(&self) -> &str {
        &self.key
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn value(&self) -> Option<Value> {
        let state = self.state.read();
        lookup(&state.root, &self.path).cloned()
    }

    fn version(&self) -> u64 {
        self.state.read().version
    }
}

/// 大小写不敏感地按路径查找
fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(root);
    }
    path.split(KEY_DELIMITER).try_fold(root, |current, segment| match current {
        Value::Object(map) => map
            .get(segment)
            .or_else(|| {
                map.iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(segment))
                    .map(|(_, value)| value)
            }),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn insert_path(root: &mut Map<String, Value>, path: &str, value: String) {
    let mut segments = path.split(KEY_DELIMITER).peekable();
    let mut current = root;

    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            current.insert(segment.to_string(), Value::String(value));
            return;
        }
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        current = match entry {
            Value::Object(map) => map,
            _ => return,
        };
    }
}

fn arrays_from_indices(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let is_sequence = !map.is_empty()
                && (0..map.len()).all(|index| map.contains_key(&index.to_string()));
            if is_sequence {
                let mut map = map;
                Value::Array(
                    (0..map.len())
                        .filter_map(|index| map.remove(&index.to_string()))
                        .map(arrays_from_indices)
                        .collect(),
                )
            } else {
                Value::Object(
                    map.into_iter()
                        .map(|(key, value)| (key, arrays_from_indices(value)))
                        .collect(),
                )
            }
        }
        other => other,
    }
}
