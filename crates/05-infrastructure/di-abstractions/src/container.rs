//! 服务容器抽象接口
//!
//! 自动注册引擎只向容器写入注册意图，实例的创建和生命周期由容器负责。

use infrastructure_common::{DependencyResult, Lifetime, TypeInfo, TypeRef};
use std::any::Any;
use std::sync::Arc;

/// 服务容器 trait
pub trait ServiceContainer {
    /// 以指定生命周期把实现类型注册到服务类型上
    ///
    /// 同一服务重复注册时由容器决定取舍，引擎不做去重。
    fn register_factory(
        &mut self,
        service: &TypeRef,
        implementation: &TypeRef,
        lifetime: Lifetime,
    ) -> DependencyResult<()>;

    /// 尚未注册时把类型注册为瞬时服务，返回是否发生了注册
    fn try_register_transient(&mut self, implementation: &TypeRef) -> DependencyResult<bool>;

    /// 注册单例实例
    fn register_singleton(
        &mut self,
        service: TypeInfo,
        instance: Arc<dyn Any + Send + Sync>,
    ) -> DependencyResult<()>;
}

/// 服务容器扩展方法
pub trait ServiceContainerExt: ServiceContainer {
    /// 以值的静态类型注册单例实例
    fn add_singleton<T>(&mut self, instance: T) -> DependencyResult<()>
    where
        T: Send + Sync + 'static,
    {
        self.register_singleton(TypeInfo::of::<T>(), Arc::new(instance))
    }

    /// 以值的静态类型注册共享的单例实例
    fn add_shared_singleton<T>(&mut self, instance: Arc<T>) -> DependencyResult<()>
    where
        T: Send + Sync + 'static,
    {
        self.register_singleton(TypeInfo::of::<T>(), instance)
    }
}

impl<C: ServiceContainer + ?Sized> ServiceContainerExt for C {}
