//! 宏工具函数

use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::meta::ParseNestedMeta;
use syn::punctuated::Punctuated;
use syn::{parenthesized, Attribute, LitBool, Meta, Result, Token, Type};

/// 生成代码中 auto-registration crate 的路径
pub fn crate_path() -> TokenStream2 {
    quote! { ::auto_registration }
}

/// `http_client(...)` 参数
#[derive(Default)]
pub struct HttpClientArgs {
    /// 委托处理器，按声明顺序
    pub handlers: Vec<Type>,
    /// 主处理器
    pub primary: Option<Type>,
    /// 配置节是否可选
    pub optional: bool,
}

impl HttpClientArgs {
    /// 解析单个参数
    pub fn parse_meta(&mut self, meta: ParseNestedMeta) -> Result<()> {
        if meta.path.is_ident("handlers") {
            let content;
            parenthesized!(content in meta.input);
            let handlers = Punctuated::<Type, Token![,]>::parse_terminated(&content)?;
            self.handlers.extend(handlers);
            Ok(())
        } else if meta.path.is_ident("primary") {
            self.primary = Some(meta.value()?.parse()?);
            Ok(())
        } else if meta.path.is_ident("optional") {
            self.optional = true;
            Ok(())
        } else {
            Err(meta.error("不支持的 http_client 参数, 可用: handlers(..), primary = Type, optional"))
        }
    }

    /// 从属性解析，允许不带参数
    pub fn from_attribute(attr: &Attribute) -> Result<Self> {
        let mut args = Self::default();
        if !matches!(attr.meta, Meta::Path(_)) {
            attr.parse_nested_meta(|meta| args.parse_meta(meta))?;
        }
        Ok(args)
    }

    /// 生成 `HttpClientMarker` 构造表达式，表达式内部使用 `?`
    pub fn marker_tokens(&self) -> TokenStream2 {
        let krate = crate_path();
        let handlers = self.handlers.iter().map(|handler| {
            quote! { #krate::__private::delegating_handler::<#handler>() }
        });
        let primary = self.primary.as_ref().map(|primary| {
            quote! {
                let marker = marker.with_primary_handler(
                    #krate::__private::primary_handler::<#primary>()
                )?;
            }
        });
        let optional = self.optional.then(|| quote! { let marker = marker.optional(); });

        quote! {
            {
                let marker = #krate::HttpClientMarker::with_handlers(::std::vec![#(#handlers),*])?;
                #primary
                #optional
                marker
            }
        }
    }
}

/// 解析 `required = true/false` 形式的布尔参数
pub fn parse_bool(meta: &ParseNestedMeta) -> Result<bool> {
    let value: LitBool = meta.value()?.parse()?;
    Ok(value.value)
}
