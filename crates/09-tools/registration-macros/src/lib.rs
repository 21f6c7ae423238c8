//! # Registration Macros
//!
//! 这个 crate 提供了在编译时生成自动注册目录条目的过程宏。
//!
//! ## 核心宏
//!
//! - [`Registrable`] - 为具体类型实现 `Registrable`，读取服务、选项和 HTTP 客户端标注
//! - [`rest_client`] - 把 trait 标记为类型化 REST 客户端，并为 `dyn Trait` 实现 `Registrable`
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use auto_registration::{rest_client, Registrable};
//!
//! #[derive(Registrable)]
//! #[service(transient, singleton)]
//! #[implements(dyn IWidget)]
//! pub struct WidgetImpl;
//!
//! #[derive(Registrable, serde::Deserialize)]
//! #[bind_options(section = "Payments", optional)]
//! pub struct PaymentConfiguration {
//!     pub merchant_id: String,
//! }
//!
//! #[rest_client(handlers(AuthHandler))]
//! pub trait IBarClient: Send + Sync {
//!     #[get("/bars/{id}")]
//!     fn get_bar(&self, id: u32) -> String;
//! }
//! ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod registrable;
mod rest_client;
mod utils;

/// 可注册类型派生宏
///
/// # 属性
///
/// - `#[service(transient, scoped, singleton)]` - 任意生命周期组合，可重复
/// - `#[transient_service]` / `#[scoped_service]` / `#[singleton_service]`
/// - `#[implements(dyn A, dyn B)]` - 作为服务暴露的接口
/// - `#[bind_options(section = "Name", optional)]` - 绑定配置节
/// - `#[http_client(handlers(A, B), primary = P, optional)]` - HTTP 客户端
/// - `#[inherit(Parent)]` - 继承父类型条目的标注和接口
///
/// 标注不合法（例如空的生命周期组合、重复的处理器）时，`registration()`
/// 返回错误。
///
/// # 示例
///
/// ```rust,ignore
/// #[derive(Registrable)]
/// #[scoped_service]
/// #[implements(dyn IOrderService)]
/// pub struct OrderService;
/// ```
#[proc_macro_derive(
    Registrable,
    attributes(
        service,
        transient_service,
        scoped_service,
        singleton_service,
        implements,
        bind_options,
        http_client,
        inherit
    )
)]
pub fn derive_registrable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    registrable::derive_registrable_impl(input)
}

/// 类型化 REST 客户端宏
///
/// 方法上的 `#[get("/path")]`、`#[post]`、`#[put]`、`#[patch]`、`#[delete]`、
/// `#[head]`、`#[options]` 会被移除并记录到 REST 方法表中。
///
/// # 参数
///
/// - `handlers(A, B)` - 委托处理器
/// - `primary = P` - 主处理器
/// - `optional` - 配置节缺失时跳过
///
/// # 示例
///
/// ```rust,ignore
/// #[rest_client(optional)]
/// pub trait IInventoryClient: Send + Sync {
///     #[get("/items")]
///     fn list_items(&self) -> Vec<String>;
/// }
/// ```
#[proc_macro_attribute]
pub fn rest_client(args: TokenStream, input: TokenStream) -> TokenStream {
    rest_client::rest_client_impl(args, input)
}
