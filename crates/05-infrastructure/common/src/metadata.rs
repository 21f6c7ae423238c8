//! 元数据定义
//!
//! 提供类型的元数据信息，代替运行时反射描述"一个类型是什么"。

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// 类型信息
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    /// 类型名称（不含模块路径）
    pub name: String,
    /// 类型ID
    pub id: TypeId,
    /// 完整类型名称
    pub module_path: String,
}

impl TypeInfo {
    /// 从类型获取类型信息
    ///
    /// 对 trait object 同样适用，`dyn crate::api::IWidget` 的名称为 `IWidget`。
    pub fn of<T: ?Sized + 'static>() -> Self {
        let full_name = std::any::type_name::<T>();
        Self {
            name: simple_name(full_name).to_string(),
            id: TypeId::of::<T>(),
            module_path: full_name.to_string(),
        }
    }

    /// 获取简短的类型名称（不包含模块路径）
    pub fn short_name(&self) -> &str {
        &self.name
    }

    /// 获取完整的类型名称
    pub fn full_name(&self) -> &str {
        &self.module_path
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.module_path)
    }
}

/// 从 `std::any::type_name` 的输出中提取简单名称
fn simple_name(full_name: &str) -> &str {
    // 泛型参数里也可能含有 `::`，先截掉 `<...>`
    let head = full_name.split('<').next().unwrap_or(full_name);
    let head = head.trim_start_matches("dyn ");
    let head = head.split(" + ").next().unwrap_or(head);
    head.rsplit("::").next().unwrap_or(head)
}

/// 类型种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// 具体类型（struct / enum）
    Class,
    /// 接口（trait object）
    Interface,
    /// 委托处理器，可以出现在 HTTP 客户端的处理管道中
    DelegatingHandler,
    /// 主处理器，负责实际发送请求
    PrimaryHandler,
}

impl TypeKind {
    /// 是否为具体类型（处理器也是具体类型）
    pub const fn is_class(self) -> bool {
        !matches!(self, Self::Interface)
    }

    /// 是否为接口
    pub const fn is_interface(self) -> bool {
        matches!(self, Self::Interface)
    }
}

/// 默认构造函数
pub type Activator = Arc<dyn Fn() -> Arc<dyn Any + Send + Sync> + Send + Sync>;

/// 类型引用
///
/// 由类型信息、类型种类和可选的默认构造函数组成。相等性由 `TypeId` 决定。
#[derive(Clone)]
pub struct TypeRef {
    info: TypeInfo,
    kind: TypeKind,
    activator: Option<Activator>,
}

impl TypeRef {
    /// 创建任意种类的类型引用
    pub fn new(info: TypeInfo, kind: TypeKind) -> Self {
        Self {
            info,
            kind,
            activator: None,
        }
    }

    /// 具体类型引用
    pub fn class<T: 'static>() -> Self {
        Self::new(TypeInfo::of::<T>(), TypeKind::Class)
    }

    /// 接口引用，`T` 通常是 `dyn Trait`
    pub fn interface<T: ?Sized + 'static>() -> Self {
        Self::new(TypeInfo::of::<T>(), TypeKind::Interface)
    }

    /// 可默认构造的具体类型引用
    pub fn activatable<T>() -> Self
    where
        T: Default + Send + Sync + 'static,
    {
        Self::class::<T>().with_activator(Arc::new(|| Arc::new(T::default())))
    }

    /// 设置默认构造函数
    pub fn with_activator(mut self, activator: Activator) -> Self {
        self.activator = Some(activator);
        self
    }

    /// 修改类型种类
    pub fn with_kind(mut self, kind: TypeKind) -> Self {
        self.kind = kind;
        self
    }

    /// 类型信息
    pub fn info(&self) -> &TypeInfo {
        &self.info
    }

    /// 类型种类
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// 类型ID
    pub fn id(&self) -> TypeId {
        self.info.id
    }

    /// 简单名称
    pub fn name(&self) -> &str {
        self.info.short_name()
    }

    /// 完整名称
    pub fn full_name(&self) -> &str {
        self.info.full_name()
    }

    /// 默认构造函数
    pub fn activator(&self) -> Option<&Activator> {
        self.activator.as_ref()
    }

    /// 是否为指定类型
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.info.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.info.id == other.info.id
    }
}

impl Eq for TypeRef {}

impl std::hash::Hash for TypeRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.info.id.hash(state);
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRef")
            .field("type", &self.info.module_path)
            .field("kind", &self.kind)
            .field("activator", &self.activator.as_ref().map(|_| "<function>"))
            .finish()
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.info, f)
    }
}
