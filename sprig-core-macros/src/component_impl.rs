use proc_macro::TokenStream;
use proc_macro_error::abort;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields};

use crate::attribute_helpers::{
    get_autowired_target, get_bean_name, get_exposed_types, get_scope, has_flag,
    snake_to_camel_case, to_camel_case,
};

pub(crate) fn derive_component_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;
    let type_name = name.to_string();

    if !input.generics.params.is_empty() {
        abort!(
            input.generics,
            "#[derive(Component)] does not support generic types; declare them with ComponentDeclaration::from_factory"
        );
    }

    // 默认使用类型名的 camelCase 形式，例如: UserService -> userService
    let bean_name = get_bean_name(&input.attrs).unwrap_or_else(|| to_camel_case(&type_name));

    let scope = get_scope(&input.attrs).map(|scope| quote! { .with_scope(#scope) });

    let name_aware = has_flag(&input.attrs, "bean_name_aware");
    let initializing = has_flag(&input.attrs, "initializing_bean");
    let post_processor = has_flag(&input.attrs, "post_processor");

    let mut exposed = get_exposed_types(&input.attrs);
    if post_processor {
        exposed.push(syn::parse_quote! { dyn ::sprig_core::BeanPostProcessor });
    }

    // 获取所有字段
    let all_fields = match &input.data {
        Data::Struct(data_struct) => match &data_struct.fields {
            Fields::Named(fields) => fields.named.iter().collect::<Vec<_>>(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(fields) => {
                if fields
                    .unnamed
                    .iter()
                    .any(|f| get_autowired_target(&f.attrs).is_some())
                {
                    abort!(fields, "#[autowired] requires named fields");
                }
                Vec::new()
            }
        },
        _ => abort!(input, "#[derive(Component)] can only be used on structs"),
    };

    // (字段名, 目标 bean 名称)
    let autowired: Vec<(String, String, &syn::Ident)> = all_fields
        .iter()
        .filter_map(|field| {
            let target = get_autowired_target(&field.attrs)?;
            let ident = field.ident.as_ref()?;
            let field_name = ident.to_string();
            let target = target.unwrap_or_else(|| snake_to_camel_case(&field_name));
            Some((field_name, target, ident))
        })
        .collect();

    let inject_arms = autowired.iter().map(|(field_name, _, ident)| {
        quote! {
            #field_name => self.#ident.wire(dependency),
        }
    });

    let dependency_decls = autowired.iter().map(|(field_name, target, _)| {
        quote! { .with_dependency(#field_name, #target) }
    });

    let name_aware_impl = name_aware.then(|| {
        quote! {
            fn as_bean_name_aware(&mut self) -> ::core::option::Option<&mut dyn ::sprig_core::BeanNameAware> {
                ::core::option::Option::Some(self)
            }
        }
    });

    let initializing_impl = initializing.then(|| {
        quote! {
            fn as_initializing_bean(&mut self) -> ::core::option::Option<&mut dyn ::sprig_core::InitializingBean> {
                ::core::option::Option::Some(self)
            }
        }
    });

    let capabilities_impl = (!exposed.is_empty()).then(|| {
        let views = exposed.iter().map(|ty| {
            quote! {
                .with::<#ty>(::std::sync::Arc::clone(&self) as ::std::sync::Arc<#ty>)
            }
        });
        quote! {
            fn capabilities(self: ::std::sync::Arc<Self>) -> ::sprig_core::Capabilities {
                ::sprig_core::Capabilities::of(::std::sync::Arc::clone(&self))
                    #(#views)*
            }
        }
    });

    let capability_decls = [
        (name_aware, quote! { ::sprig_core::Capability::NameAware }),
        (initializing, quote! { ::sprig_core::Capability::InitializingBean }),
        (post_processor, quote! { ::sprig_core::Capability::PostProcessor }),
    ]
    .into_iter()
    .filter(|(enabled, _)| *enabled)
    .map(|(_, capability)| quote! { .with_capability(#capability) });

    let expanded = quote! {
        impl ::sprig_core::Component for #name {
            #[allow(unused_variables)]
            fn inject(
                &mut self,
                field: &str,
                dependency: &::sprig_core::Bean,
            ) -> ::sprig_core::anyhow::Result<()> {
                match field {
                    #(#inject_arms)*
                    _ => ::core::result::Result::Err(::sprig_core::anyhow::anyhow!(
                        "'{}' has no injectable field named '{}'",
                        #type_name,
                        field
                    )),
                }
            }

            #name_aware_impl

            #initializing_impl

            #capabilities_impl
        }

        impl ::sprig_core::Declare for #name {
            fn declaration() -> ::sprig_core::ComponentDeclaration {
                ::sprig_core::ComponentDeclaration::of::<Self>(#bean_name)
                    #scope
                    #(#dependency_decls)*
                    #(#capability_decls)*
            }
        }

        // 自动向 inventory 注册 Component
        ::sprig_core::inventory::submit! {
            ::sprig_core::ComponentRegistration::new(
                #bean_name,
                #type_name,
                <#name as ::sprig_core::Declare>::declaration,
            )
        }
    };

    TokenStream::from(expanded)
}
