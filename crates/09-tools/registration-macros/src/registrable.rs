//! `#[derive(Registrable)]` 实现

use crate::utils::{crate_path, parse_bool, HttpClientArgs};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::{Attribute, DeriveInput, LitStr, Meta, Result, Token, Type};

/// 选项绑定参数
struct BindOptionsArgs {
    section: Option<LitStr>,
    required: bool,
}

impl BindOptionsArgs {
    fn from_attribute(attr: &Attribute) -> Result<Self> {
        let mut args = Self {
            section: None,
            required: true,
        };
        if matches!(attr.meta, Meta::Path(_)) {
            return Ok(args);
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("section") {
                args.section = Some(meta.value()?.parse()?);
                Ok(())
            } else if meta.path.is_ident("optional") {
                args.required = false;
                Ok(())
            } else if meta.path.is_ident("required") {
                args.required = parse_bool(&meta)?;
                Ok(())
            } else {
                Err(meta.error("不支持的 bind_options 参数, 可用: section = \"..\", optional, required = bool"))
            }
        })?;
        Ok(args)
    }

    fn marker_tokens(&self) -> TokenStream2 {
        let krate = crate_path();
        let required = self.required;
        let marker = match &self.section {
            Some(section) => quote! { #krate::OptionsMarker::with_section(#section) },
            None => quote! { #krate::OptionsMarker::new() },
        };
        quote! { #marker.with_required(#required) }
    }
}

/// 解析 `#[service(...)]` 声明的生命周期组合
fn service_flags(attr: &Attribute) -> Result<TokenStream2> {
    let krate = crate_path();
    let mut flags = vec![quote! { #krate::__private::LifetimeFlags::NONE }];

    if !matches!(attr.meta, Meta::Path(_)) {
        attr.parse_nested_meta(|meta| {
            let flag = if meta.path.is_ident("transient") {
                quote! { TRANSIENT }
            } else if meta.path.is_ident("scoped") {
                quote! { SCOPED }
            } else if meta.path.is_ident("singleton") {
                quote! { SINGLETON }
            } else {
                return Err(meta.error("不支持的生命周期, 可用: transient, scoped, singleton"));
            };
            flags.push(quote! { #krate::__private::LifetimeFlags::#flag });
            Ok(())
        })?;
    }

    Ok(quote! { #(#flags)|* })
}

fn expand(input: &DeriveInput) -> Result<TokenStream2> {
    let krate = crate_path();
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut steps = Vec::new();
    let mut inherits = Vec::new();

    for attr in &input.attrs {
        let Some(ident) = attr.path().get_ident() else {
            continue;
        };

        match ident.to_string().as_str() {
            "service" => {
                let flags = service_flags(attr)?;
                steps.push(quote! {
                    let registration = registration.with_service(#krate::ServiceMarker::new(#flags)?);
                });
            }
            "transient_service" => steps.push(quote! {
                let registration = registration.with_service(#krate::ServiceMarker::TransientOnly);
            }),
            "scoped_service" => steps.push(quote! {
                let registration = registration.with_service(#krate::ServiceMarker::ScopedOnly);
            }),
            "singleton_service" => steps.push(quote! {
                let registration = registration.with_service(#krate::ServiceMarker::SingletonOnly);
            }),
            "implements" => {
                let interfaces =
                    attr.parse_args_with(Punctuated::<Type, Token![,]>::parse_terminated)?;
                for interface in interfaces {
                    steps.push(quote! {
                        let registration = registration
                            .implements(#krate::__private::TypeRef::interface::<#interface>());
                    });
                }
            }
            "bind_options" => {
                let marker = BindOptionsArgs::from_attribute(attr)?.marker_tokens();
                steps.push(quote! {
                    let registration = registration.with_options::<Self>(#marker)?;
                });
            }
            "http_client" => {
                let marker = HttpClientArgs::from_attribute(attr)?.marker_tokens();
                steps.push(quote! {
                    let registration = registration.with_http_client(#marker)?;
                });
            }
            "inherit" => {
                let parent: Type = attr.parse_args()?;
                inherits.push(quote! {
                    let registration = registration.inherit_from(
                        &<#parent as #krate::Registrable>::registration()?
                    );
                });
            }
            _ => {}
        }
    }

    Ok(quote! {
        impl #impl_generics #krate::Registrable for #name #ty_generics #where_clause {
            fn registration() -> #krate::__private::MarkerResult<#krate::TypeRegistration> {
                let registration = #krate::TypeRegistration::class::<Self>();
                #(#steps)*
                #(#inherits)*
                ::core::result::Result::Ok(registration)
            }
        }
    })
}

/// 实现 #[derive(Registrable)] 宏
pub fn derive_registrable_impl(input: DeriveInput) -> TokenStream {
    match expand(&input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(e) => e.to_compile_error().into(),
    }
}
