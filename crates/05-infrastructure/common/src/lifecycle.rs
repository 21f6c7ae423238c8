//! 服务生命周期定义

use async_trait::async_trait;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// 组件生命周期类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// 瞬时模式 - 每次注入都创建新实例
    Transient,
    /// 作用域模式 - 在同一作用域（请求）内共享实例
    Scoped,
    /// 单例模式 - 整个进程内只创建一个实例
    Singleton,
}

impl Lifetime {
    /// 规范迭代顺序: Transient, Scoped, Singleton
    pub const ALL: [Lifetime; 3] = [Lifetime::Transient, Lifetime::Scoped, Lifetime::Singleton];

    /// 对应的标志位
    pub const fn flag(self) -> LifetimeFlags {
        match self {
            Self::Transient => LifetimeFlags::TRANSIENT,
            Self::Scoped => LifetimeFlags::SCOPED,
            Self::Singleton => LifetimeFlags::SINGLETON,
        }
    }
}

impl Default for Lifetime {
    fn default() -> Self {
        Self::Transient
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transient => f.write_str("Transient"),
            Self::Scoped => f.write_str("Scoped"),
            Self::Singleton => f.write_str("Singleton"),
        }
    }
}

/// 生命周期组合位集
///
/// 零值 [`LifetimeFlags::NONE`] 是无效值，服务标注拒绝接受它。
/// 同一类型上的多个标注按位或合并。
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LifetimeFlags(u8);

impl LifetimeFlags {
    /// 无效值，只用于表示"未设置"
    pub const NONE: Self = Self(0);
    pub const TRANSIENT: Self = Self(1);
    pub const SCOPED: Self = Self(1 << 1);
    pub const SINGLETON: Self = Self(1 << 2);
    pub const ALL: Self = Self(0b111);

    /// 从原始位构造，包含未知位时返回 `None`
    pub const fn from_bits(bits: u8) -> Option<Self> {
        if bits & !Self::ALL.0 == 0 {
            Some(Self(bits))
        } else {
            None
        }
    }

    /// 原始位
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// 是否为空（无效）集合
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// 是否包含指定生命周期
    pub const fn contains(self, lifetime: Lifetime) -> bool {
        self.0 & lifetime.flag().0 != 0
    }

    /// 是否包含已知生命周期之外的位
    pub const fn has_unknown_bits(self) -> bool {
        self.0 & !Self::ALL.0 != 0
    }

    /// 集合中的生命周期数量
    pub const fn len(self) -> usize {
        (self.0 & Self::ALL.0).count_ones() as usize
    }

    /// 按规范顺序迭代包含的生命周期
    pub fn iter(self) -> impl Iterator<Item = Lifetime> {
        Lifetime::ALL.into_iter().filter(move |lifetime| self.contains(*lifetime))
    }
}

impl BitOr for LifetimeFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for LifetimeFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl From<Lifetime> for LifetimeFlags {
    fn from(lifetime: Lifetime) -> Self {
        lifetime.flag()
    }
}

impl FromIterator<Lifetime> for LifetimeFlags {
    fn from_iter<I: IntoIterator<Item = Lifetime>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::NONE, |flags, lifetime| flags | lifetime.flag())
    }
}

impl fmt::Debug for LifetimeFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("None");
        }
        let names: Vec<String> = self.iter().map(|l| l.to_string()).collect();
        f.write_str(&names.join(" | "))
    }
}

/// 同步释放协议
///
/// 自动注册不会把服务绑定到这个接口上。
pub trait Disposable: Send + Sync {
    /// 释放资源
    fn dispose(&mut self);
}

/// 异步释放协议
///
/// 自动注册不会把服务绑定到这个接口上。
#[async_trait]
pub trait AsyncDisposable: Send + Sync {
    /// 异步释放资源
    async fn dispose_async(&mut self);
}
