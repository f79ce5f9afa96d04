use proc_macro_error::abort;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, ExprLit, Lit, LitStr, Meta, Token, Type};

/// 从属性中提取 bean 名称
/// 支持格式: #[component("name")] 或 #[component(name = "name")]
pub(crate) fn get_bean_name(attrs: &[Attribute]) -> Option<String> {
    for attr in attrs {
        if !attr.path().is_ident("component") {
            continue;
        }
        if let Ok(name_lit) = attr.parse_args::<LitStr>() {
            return Some(name_lit.value());
        }
        if let Ok(Meta::NameValue(name_value)) = attr.parse_args::<Meta>() {
            if name_value.path.is_ident("name") {
                if let Expr::Lit(ExprLit {
                    lit: Lit::Str(name_lit),
                    ..
                }) = &name_value.value
                {
                    return Some(name_lit.value());
                }
            }
        }
        abort!(
            attr,
            "expected #[component(\"beanName\")] or #[component(name = \"beanName\")]"
        );
    }
    None
}

/// 从属性中提取作用域；未指定时返回 None（容器默认单例）
pub(crate) fn get_scope(attrs: &[Attribute]) -> Option<proc_macro2::TokenStream> {
    for attr in attrs {
        if attr.path().is_ident("scope") {
            let scope_lit = match attr.parse_args::<LitStr>() {
                Ok(lit) => lit,
                Err(_) => abort!(attr, "expected #[scope(\"singleton\")] or #[scope(\"prototype\")]"),
            };
            return Some(match scope_lit.value().as_str() {
                "singleton" => quote! { ::sprig_core::Scope::Singleton },
                "prototype" => quote! { ::sprig_core::Scope::Prototype },
                other => abort!(
                    scope_lit,
                    "invalid scope '{}', expected 'singleton' or 'prototype'",
                    other
                ),
            });
        }
    }
    None
}

/// 检查是否存在标记属性，如 #[bean_name_aware]
pub(crate) fn has_flag(attrs: &[Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident(name))
}

/// 从 #[expose(dyn A, dyn B)] 中提取类型列表
pub(crate) fn get_exposed_types(attrs: &[Attribute]) -> Vec<Type> {
    let mut exposed = Vec::new();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("expose")) {
        match attr.parse_args_with(Punctuated::<Type, Token![,]>::parse_terminated) {
            Ok(types) => exposed.extend(types),
            Err(e) => abort!(attr, "expected #[expose(dyn Trait, ...)]: {}", e),
        }
    }
    exposed
}

/// 从 #[autowired] 或 #[autowired("beanName")] 中提取 bean 名称
///
/// 字段没有 #[autowired] 时返回 None；未指定名称时返回 Some(None)
pub(crate) fn get_autowired_target(attrs: &[Attribute]) -> Option<Option<String>> {
    for attr in attrs {
        if attr.path().is_ident("autowired") {
            return match &attr.meta {
                Meta::Path(_) => Some(None),
                Meta::List(_) => match attr.parse_args::<LitStr>() {
                    Ok(lit) => Some(Some(lit.value())),
                    Err(_) => abort!(attr, "expected #[autowired] or #[autowired(\"beanName\")]"),
                },
                Meta::NameValue(_) => {
                    abort!(attr, "expected #[autowired] or #[autowired(\"beanName\")]")
                }
            };
        }
    }
    None
}

/// 将 PascalCase 转换为 camelCase
pub(crate) fn to_camel_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
    }
}

/// 将 snake_case 字段名转换为 camelCase bean 名称
/// 例如: order_service -> orderService
pub(crate) fn snake_to_camel_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut upper_next = false;
    for ch in s.trim_start_matches('_').chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            result.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            result.push(ch);
        }
    }
    result
}
