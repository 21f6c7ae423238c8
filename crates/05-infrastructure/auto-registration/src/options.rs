//! 选项绑定
//!
//! 为每个带选项绑定标注的配置类型注册三个单例：
//! [`SectionChangeSource<T>`]、[`ConfigureFromSection<T>`] 和 [`OptionsMonitor<T>`]。

use crate::bootstrapper::Diagnostic;
use crate::scanner::OptionsBinding;
use config_abstractions::{ConfigurationSection, ConfigurationSource, SectionExt};
use di_abstractions::{ServiceContainer, ServiceContainerExt};
use infrastructure_common::{
    ConfigResult, DependencyResult, RegistrationError, RegistrationResult, TypeRef,
};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// 配置节变更源
///
/// 持有绑定的配置节，通过版本号判断配置是否发生变化。
pub struct SectionChangeSource<T> {
    section: Arc<dyn ConfigurationSection>,
    _options: PhantomData<fn() -> T>,
}

impl<T> SectionChangeSource<T> {
    /// 创建配置节变更源
    pub fn new(section: Arc<dyn ConfigurationSection>) -> Self {
        Self {
            section,
            _options: PhantomData,
        }
    }

    /// 绑定的配置节
    pub fn section(&self) -> &Arc<dyn ConfigurationSection> {
        &self.section
    }

    /// 当前变更版本
    pub fn version(&self) -> u64 {
        self.section.version()
    }

    /// 指定版本之后配置是否发生了变化
    pub fn has_changed_since(&self, version: u64) -> bool {
        self.section.version() != version
    }
}

impl<T> fmt::Debug for SectionChangeSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SectionChangeSource")
            .field("section", &self.section.path())
            .finish()
    }
}

/// 从配置节构建选项值
pub struct ConfigureFromSection<T> {
    section: Arc<dyn ConfigurationSection>,
    _options: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> ConfigureFromSection<T> {
    /// 创建选项提供者
    pub fn new(section: Arc<dyn ConfigurationSection>) -> Self {
        Self {
            section,
            _options: PhantomData,
        }
    }

    /// 配置节路径
    pub fn section_path(&self) -> &str {
        self.section.path()
    }

    /// 按配置节当前内容构建选项值
    pub fn configure(&self) -> ConfigResult<T> {
        self.section.try_bind()
    }
}

impl<T> fmt::Debug for ConfigureFromSection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigureFromSection")
            .field("section", &self.section.path())
            .finish()
    }
}

/// 选项监视器
///
/// 缓存绑定结果，配置节版本变化后重新绑定。
pub struct OptionsMonitor<T> {
    source: SectionChangeSource<T>,
    configure: ConfigureFromSection<T>,
    cache: RwLock<Option<(u64, Arc<T>)>>,
}

impl<T: DeserializeOwned> OptionsMonitor<T> {
    /// 创建选项监视器
    pub fn new(section: Arc<dyn ConfigurationSection>) -> Self {
        Self {
            source: SectionChangeSource::new(Arc::clone(&section)),
            configure: ConfigureFromSection::new(section),
            cache: RwLock::new(None),
        }
    }

    /// 当前选项值
    pub fn current(&self) -> ConfigResult<Arc<T>> {
        let version = self.source.version();
        if let Some((cached_version, value)) = self.cache.read().as_ref() {
            if *cached_version == version {
                return Ok(Arc::clone(value));
            }
        }

        let value = Arc::new(self.configure.configure()?);
        debug!(
            "选项已重新绑定: section={}, version={}",
            self.configure.section_path(),
            version
        );
        *self.cache.write() = Some((version, Arc::clone(&value)));
        Ok(value)
    }
}

impl<T> fmt::Debug for OptionsMonitor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionsMonitor")
            .field("section", &self.source.section.path())
            .field("cached_version", &self.cache.read().as_ref().map(|(v, _)| *v))
            .finish()
    }
}

/// 注册配置类型 `T` 的选项服务
pub fn install_options<T>(
    container: &mut dyn ServiceContainer,
    section: Arc<dyn ConfigurationSection>,
) -> DependencyResult<()>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    container.add_singleton(SectionChangeSource::<T>::new(Arc::clone(&section)))?;
    container.add_singleton(ConfigureFromSection::<T>::new(Arc::clone(&section)))?;
    container.add_singleton(OptionsMonitor::<T>::new(section))?;
    Ok(())
}

/// 配置节查找结果
#[derive(Debug)]
pub enum SectionLookup {
    /// 配置节存在
    Found(Arc<dyn ConfigurationSection>),
    /// 配置节缺失但非必需，跳过绑定
    Skipped(Diagnostic),
}

/// 查找绑定所需的配置节
///
/// 必需的配置节缺失时返回 [`RegistrationError::MissingConfiguration`]。
pub fn lookup_section(
    configuration: &dyn ConfigurationSource,
    owner: &TypeRef,
    key: &str,
    required: bool,
) -> RegistrationResult<SectionLookup> {
    let section = configuration.get_section(key);
    if section.exists() {
        return Ok(SectionLookup::Found(section));
    }

    if required {
        error!("找不到必需的配置节: '{}', 类型: '{}'", key, owner.full_name());
        return Err(RegistrationError::missing_configuration(key));
    }

    let diagnostic = Diagnostic::missing_section(owner, key);
    warn!("{}", diagnostic);
    Ok(SectionLookup::Skipped(diagnostic))
}

/// 选项绑定阶段
///
/// 返回完成注册的绑定数量。
pub(crate) fn register_options(
    container: &mut dyn ServiceContainer,
    configuration: &dyn ConfigurationSource,
    bindings: &[OptionsBinding],
    diagnostics: &mut Vec<Diagnostic>,
) -> RegistrationResult<usize> {
    let mut registered = 0;

    for binding in bindings {
        let lookup = lookup_section(
            configuration,
            &binding.config_type,
            &binding.section,
            binding.required,
        )?;

        match lookup {
            SectionLookup::Found(section) => {
                (binding.installer)(container, section)?;
                debug!(
                    "绑定选项: {} -> '{}'",
                    binding.config_type.name(),
                    binding.section
                );
                registered += 1;
            }
            SectionLookup::Skipped(diagnostic) => diagnostics.push(diagnostic),
        }
    }

    Ok(registered)
}
