//! `#[rest_client]` 实现

use crate::utils::{crate_path, HttpClientArgs};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Attribute, Error, ItemTrait, LitStr, Result, TraitItem};

const VERBS: [(&str, &str); 7] = [
    ("get", "Get"),
    ("post", "Post"),
    ("put", "Put"),
    ("patch", "Patch"),
    ("delete", "Delete"),
    ("head", "Head"),
    ("options", "Options"),
];

/// 方法上的 REST 调用标注
struct RestCallAttr {
    verb: &'static str,
    path: LitStr,
}

fn rest_call(attr: &Attribute) -> Result<Option<RestCallAttr>> {
    let Some(ident) = attr.path().get_ident() else {
        return Ok(None);
    };
    let Some(&(_, verb)) = VERBS.iter().find(|(name, _)| ident == name) else {
        return Ok(None);
    };
    Ok(Some(RestCallAttr {
        verb,
        path: attr.parse_args()?,
    }))
}

fn expand(args: HttpClientArgs, mut item: ItemTrait) -> Result<TokenStream2> {
    if !item.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &item.generics,
            "rest_client 不支持泛型 trait",
        ));
    }

    let krate = crate_path();
    let mut methods = Vec::new();

    for trait_item in &mut item.items {
        let TraitItem::Fn(method) = trait_item else {
            continue;
        };

        let mut call = None;
        let mut kept = Vec::with_capacity(method.attrs.len());
        for attr in method.attrs.drain(..) {
            match rest_call(&attr)? {
                Some(_) if call.is_some() => {
                    return Err(Error::new_spanned(attr, "每个方法只能有一个 REST 调用标注"));
                }
                Some(found) => call = Some(found),
                None => kept.push(attr),
            }
        }
        method.attrs = kept;

        let name = method.sig.ident.to_string();
        let call = match call {
            Some(RestCallAttr { verb, path }) => {
                let verb = syn::Ident::new(verb, proc_macro2::Span::call_site());
                quote! {
                    ::core::option::Option::Some(#krate::RestCall::new(#krate::HttpVerb::#verb, #path))
                }
            }
            None => quote! { ::core::option::Option::None },
        };
        methods.push(quote! { .with_method(#name, #call) });
    }

    let ident = &item.ident;
    let marker = args.marker_tokens();

    Ok(quote! {
        #item

        impl #krate::Registrable for dyn #ident {
            fn registration() -> #krate::__private::MarkerResult<#krate::TypeRegistration> {
                let registration = #krate::TypeRegistration::interface::<dyn #ident>()
                    #(#methods)*;
                let registration = registration.with_http_client(#marker)?;
                ::core::result::Result::Ok(registration)
            }
        }
    })
}

/// 实现 #[rest_client] 宏
pub fn rest_client_impl(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut http_args = HttpClientArgs::default();
    let parser = syn::meta::parser(|meta| http_args.parse_meta(meta));
    parse_macro_input!(args with parser);

    let item = parse_macro_input!(input as ItemTrait);
    match expand(http_args, item) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(e) => e.to_compile_error().into(),
    }
}
