//! 注册标注模型
//!
//! 标注在构建注册目录条目时完成校验，扫描阶段只读取已经校验过的标注。

use infrastructure_common::{
    LifetimeFlags, MarkerError, MarkerResult, SerializerSettings, TypeKind, TypeRef,
};
use std::collections::HashMap;
use std::sync::Arc;

/// 服务标注
///
/// 同一类型上的多个服务标注按位或合并生命周期。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceMarker {
    /// 任意生命周期组合
    Generic(LifetimeFlags),
    /// 瞬时服务
    TransientOnly,
    /// 作用域服务
    ScopedOnly,
    /// 单例服务
    SingletonOnly,
}

impl ServiceMarker {
    /// 创建任意生命周期组合的服务标注
    pub fn new(lifetimes: LifetimeFlags) -> MarkerResult<Self> {
        if lifetimes.is_empty() {
            return Err(MarkerError::InvalidLifetime);
        }
        Ok(Self::Generic(lifetimes))
    }

    /// 标注声明的生命周期
    pub const fn lifetimes(&self) -> LifetimeFlags {
        match self {
            Self::Generic(lifetimes) => *lifetimes,
            Self::TransientOnly => LifetimeFlags::TRANSIENT,
            Self::ScopedOnly => LifetimeFlags::SCOPED,
            Self::SingletonOnly => LifetimeFlags::SINGLETON,
        }
    }
}

/// 选项绑定标注
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionsMarker {
    section: Option<String>,
    required: bool,
}

impl OptionsMarker {
    /// 创建选项绑定标注，配置节名称由类型名称推导
    pub fn new() -> Self {
        Self {
            section: None,
            required: true,
        }
    }

    /// 使用显式配置节名称，空白名称等同于未设置
    pub fn with_section(section: impl Into<String>) -> Self {
        Self {
            section: Some(section.into()),
            required: true,
        }
    }

    /// 配置节缺失时跳过绑定而不是失败
    pub fn optional(self) -> Self {
        self.with_required(false)
    }

    /// 设置配置节是否必须存在
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// 显式配置节名称
    pub fn section(&self) -> Option<&str> {
        self.section.as_deref()
    }

    /// 配置节是否必须存在
    pub fn is_required(&self) -> bool {
        self.required
    }
}

impl Default for OptionsMarker {
    fn default() -> Self {
        Self::new()
    }
}

/// HTTP 客户端标注
///
/// 委托处理器按声明顺序组成处理管道，第一个在最外层。
#[derive(Debug, Clone)]
pub struct HttpClientMarker {
    handlers: Vec<TypeRef>,
    primary_handler: Option<TypeRef>,
    required: bool,
    serializer: Option<Arc<SerializerSettings>>,
}

impl HttpClientMarker {
    /// 创建不带处理器的客户端标注
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            primary_handler: None,
            required: true,
            serializer: None,
        }
    }

    /// 创建带委托处理器的客户端标注
    ///
    /// 所有处理器都必须是委托处理器，且按完整类型名称不能重复。
    pub fn with_handlers(handlers: Vec<TypeRef>) -> MarkerResult<Self> {
        validate_handlers(&handlers)?;
        Ok(Self {
            handlers,
            ..Self::new()
        })
    }

    /// 设置主处理器，`None` 清除已有设置
    pub fn set_primary_handler(&mut self, handler: Option<TypeRef>) -> MarkerResult<()> {
        if let Some(handler) = &handler {
            if handler.kind() != TypeKind::PrimaryHandler {
                return Err(MarkerError::InvalidPrimaryHandler {
                    type_name: handler.full_name().to_string(),
                });
            }
        }
        self.primary_handler = handler;
        Ok(())
    }

    /// 设置主处理器
    pub fn with_primary_handler(mut self, handler: TypeRef) -> MarkerResult<Self> {
        self.set_primary_handler(Some(handler))?;
        Ok(self)
    }

    /// 配置节缺失时跳过客户端而不是失败
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// 使用自定义负载序列化设置代替共享的默认设置
    pub fn with_serializer(mut self, settings: Arc<SerializerSettings>) -> Self {
        self.serializer = Some(settings);
        self
    }

    /// 委托处理器，按声明顺序
    pub fn handlers(&self) -> &[TypeRef] {
        &self.handlers
    }

    /// 主处理器
    pub fn primary_handler(&self) -> Option<&TypeRef> {
        self.primary_handler.as_ref()
    }

    /// 配置节是否必须存在
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// 自定义负载序列化设置
    pub fn serializer(&self) -> Option<&Arc<SerializerSettings>> {
        self.serializer.as_ref()
    }
}

impl Default for HttpClientMarker {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_handlers(handlers: &[TypeRef]) -> MarkerResult<()> {
    let invalid: Vec<&str> = handlers
        .iter()
        .filter(|handler| handler.kind() != TypeKind::DelegatingHandler)
        .map(TypeRef::full_name)
        .collect();
    if !invalid.is_empty() {
        return Err(MarkerError::InvalidHandlers {
            handlers: invalid.join(", "),
        });
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut repeated = Vec::new();
    for handler in handlers {
        let count = counts.entry(handler.full_name()).or_default();
        *count += 1;
        if *count == 2 {
            repeated.push(handler.full_name());
        }
    }
    if !repeated.is_empty() {
        return Err(MarkerError::DuplicateHandlers {
            handlers: repeated.join(", "),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use di_abstractions::{
        delegating_handler, primary_handler, DelegatingHandler, PrimaryHandler,
    };

    struct AuthHandler;
    impl DelegatingHandler for AuthHandler {}

    struct RetryHandler;
    impl DelegatingHandler for RetryHandler {}

    #[derive(Default)]
    struct SocketsHandler;
    impl PrimaryHandler for SocketsHandler {}

    struct NotAHandler;

    #[test]
    fn test_service_marker_rejects_none() {
        assert_eq!(
            ServiceMarker::new(LifetimeFlags::NONE),
            Err(MarkerError::InvalidLifetime)
        );
        let marker = ServiceMarker::new(LifetimeFlags::SCOPED | LifetimeFlags::SINGLETON).unwrap();
        assert_eq!(marker.lifetimes(), LifetimeFlags::SCOPED | LifetimeFlags::SINGLETON);
    }

    #[test]
    fn test_fixed_variants_resolve_to_single_lifetime() {
        assert_eq!(ServiceMarker::TransientOnly.lifetimes(), LifetimeFlags::TRANSIENT);
        assert_eq!(ServiceMarker::ScopedOnly.lifetimes(), LifetimeFlags::SCOPED);
        assert_eq!(ServiceMarker::SingletonOnly.lifetimes(), LifetimeFlags::SINGLETON);
    }

    #[test]
    fn test_options_marker_defaults() {
        let marker = OptionsMarker::new();
        assert!(marker.is_required());
        assert_eq!(marker.section(), None);

        let marker = OptionsMarker::with_section("Custom").optional();
        assert!(!marker.is_required());
        assert_eq!(marker.section(), Some("Custom"));
    }

    #[test]
    fn test_handlers_keep_declaration_order() {
        let marker = HttpClientMarker::with_handlers(vec![
            delegating_handler::<RetryHandler>(),
            delegating_handler::<AuthHandler>(),
        ])
        .unwrap();

        let names: Vec<_> = marker.handlers().iter().map(TypeRef::name).collect();
        assert_eq!(names, vec!["RetryHandler", "AuthHandler"]);
        assert!(marker.is_required());
    }

    #[test]
    fn test_duplicate_handlers_are_rejected() {
        let result = HttpClientMarker::with_handlers(vec![
            delegating_handler::<AuthHandler>(),
            delegating_handler::<RetryHandler>(),
            delegating_handler::<AuthHandler>(),
        ]);

        match result {
            Err(MarkerError::DuplicateHandlers { handlers }) => {
                assert!(handlers.ends_with("AuthHandler"));
                assert!(!handlers.contains("RetryHandler"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_handlers_name_every_offender() {
        let result = HttpClientMarker::with_handlers(vec![
            delegating_handler::<AuthHandler>(),
            TypeRef::class::<NotAHandler>(),
            primary_handler::<SocketsHandler>(),
        ]);

        match result {
            Err(MarkerError::InvalidHandlers { handlers }) => {
                assert!(handlers.contains("NotAHandler"));
                assert!(handlers.contains("SocketsHandler"));
                assert!(!handlers.contains("AuthHandler"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_primary_handler_validation() {
        let mut marker = HttpClientMarker::new();

        let result = marker.set_primary_handler(Some(delegating_handler::<AuthHandler>()));
        assert!(matches!(result, Err(MarkerError::InvalidPrimaryHandler { .. })));
        assert!(marker.primary_handler().is_none());

        marker
            .set_primary_handler(Some(primary_handler::<SocketsHandler>()))
            .unwrap();
        assert!(marker.primary_handler().is_some());

        marker.set_primary_handler(None).unwrap();
        assert!(marker.primary_handler().is_none());
    }
}
