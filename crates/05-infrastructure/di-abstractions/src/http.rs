//! 类型化 HTTP 客户端抽象接口

use infrastructure_common::{
    Activator, DependencyResult, SerializerSettings, TypeInfo, TypeKind, TypeRef,
};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// 委托处理器
///
/// 位于客户端处理管道中，按声明顺序包裹请求，先声明的在最外层。
pub trait DelegatingHandler: Send + Sync + 'static {}

/// 主处理器
///
/// 处理管道最内层，负责实际发送请求。
pub trait PrimaryHandler: Send + Sync + 'static {}

/// 委托处理器类型引用
pub fn delegating_handler<T: DelegatingHandler>() -> TypeRef {
    TypeRef::class::<T>().with_kind(TypeKind::DelegatingHandler)
}

/// 可默认构造的委托处理器类型引用
pub fn activatable_delegating_handler<T: DelegatingHandler + Default>() -> TypeRef {
    TypeRef::activatable::<T>().with_kind(TypeKind::DelegatingHandler)
}

/// 主处理器类型引用
///
/// 客户端工厂通过默认构造函数创建主处理器，因此要求 `Default`。
pub fn primary_handler<T: PrimaryHandler + Default>() -> TypeRef {
    TypeRef::activatable::<T>().with_kind(TypeKind::PrimaryHandler)
}

/// 类型化 HTTP 客户端工厂 trait
pub trait HttpClientFactory {
    /// 添加类型化客户端
    ///
    /// `implementation` 为 `None` 时客户端由接口的 REST 描述生成。
    fn add_typed_client(
        &mut self,
        client: &TypeRef,
        implementation: Option<&TypeRef>,
    ) -> DependencyResult<Box<dyn HttpClientBuilder>>;
}

/// HTTP 客户端构建器 trait
///
/// 构建器的修改直接作用于工厂中的客户端注册。
pub trait HttpClientBuilder: Send {
    /// 客户端名称
    fn name(&self) -> &str;

    /// 设置基础地址
    fn set_base_address(&mut self, base_address: Url);

    /// 设置请求超时
    fn set_timeout(&mut self, timeout: Duration);

    /// 设置负载序列化设置
    fn set_serializer(&mut self, settings: Arc<SerializerSettings>);

    /// 设置主处理器
    fn set_primary_handler(&mut self, handler: TypeInfo, activator: Activator);

    /// 追加委托处理器
    fn add_handler(&mut self, handler: &TypeRef);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct LoggingHandler;
    impl DelegatingHandler for LoggingHandler {}

    #[derive(Default)]
    struct SocketsHandler;
    impl PrimaryHandler for SocketsHandler {}

    #[test]
    fn test_handler_refs_carry_kind() {
        let delegating = delegating_handler::<LoggingHandler>();
        assert_eq!(delegating.kind(), TypeKind::DelegatingHandler);
        assert!(delegating.activator().is_none());

        let activatable = activatable_delegating_handler::<LoggingHandler>();
        assert!(activatable.activator().is_some());
        assert_eq!(activatable, delegating);

        let primary = primary_handler::<SocketsHandler>();
        assert_eq!(primary.kind(), TypeKind::PrimaryHandler);
        assert!(primary.activator().is_some());
    }
}
