use super::attrs::{derived_trait_names, has_serde_key, lower_camel_case, parse_lit_str};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Attribute, Fields, ItemStruct, LitStr};

/// Expands the `#[twin_object]` attribute macro.
///
/// Adds serde derives routed through the engine's re-exported `serde`, applies the wire
/// naming policy (`camelCase`) and implements `WireValue` so the struct can be used as a
/// member of a twin.
pub fn expand(args: TokenStream, input: ItemStruct) -> TokenStream {
    if !args.is_empty() {
        return syn::Error::new_spanned(args, "twin_object takes no arguments").to_compile_error();
    }
    if !input.generics.params.is_empty() {
        return syn::Error::new_spanned(&input.generics, "twin_object cannot be generic")
            .to_compile_error();
    }
    let Fields::Named(named) = &input.fields else {
        return syn::Error::new_spanned(&input.ident, "twin_object requires named fields")
            .to_compile_error();
    };

    let derives = derived_trait_names(&input.attrs);
    let rename_attr = match has_serde_key(&input.attrs, "rename_all") {
        Ok(true) => {
            return syn::Error::new_spanned(
                &input.ident,
                "twin_object fixes rename_all = \"camelCase\"; use per-field rename instead",
            )
            .to_compile_error();
        },
        Ok(false) => quote! { #[serde(rename_all = "camelCase")] },
        Err(err) => return err,
    };
    let default_attr = if derives.contains("Default") {
        quote! { #[serde(default)] }
    } else {
        quote! {}
    };

    let mut object_fields = Vec::with_capacity(named.named.len());
    for field in &named.named {
        let Some(ident) = &field.ident else { continue };
        let wire_name = match field_rename(&field.attrs) {
            Ok(Some(lit)) => lit.value(),
            Ok(None) => lower_camel_case(&ident.to_string()),
            Err(err) => return err.to_compile_error(),
        };
        let ty = &field.ty;
        object_fields.push(quote! {
            ::dtwin::ObjectField {
                name: #wire_name,
                value_type: <#ty as ::dtwin::WireValue>::value_type(),
            }
        });
    }

    let mut derive_tokens = Vec::new();
    if !derives.contains("Debug") {
        derive_tokens.push(quote! { Debug });
    }
    if !derives.contains("Serialize") {
        derive_tokens.push(quote! { ::dtwin::serde::Serialize });
    }
    if !derives.contains("Deserialize") {
        derive_tokens.push(quote! { ::dtwin::serde::Deserialize });
    }
    let derive_attr = if derive_tokens.is_empty() {
        quote! {}
    } else {
        quote! { #[derive(#(#derive_tokens),*)] }
    };

    let name = &input.ident;
    quote! {
        #derive_attr
        #[serde(crate = "::dtwin::serde")]
        #rename_attr
        #default_attr
        #input

        #[automatically_derived]
        impl ::dtwin::WireValue for #name {
            fn value_type() -> ::dtwin::ValueType {
                ::dtwin::ValueType::Object(::std::vec![#(#object_fields),*])
            }

            fn to_wire(&self) -> ::std::result::Result<::std::option::Option<::dtwin::serde_json::Value>, ::dtwin::TwinError> {
                ::dtwin::__private::object_to_value(self).map(::std::option::Option::Some)
            }

            fn from_wire(value: ::dtwin::serde_json::Value) -> ::std::result::Result<Self, ::dtwin::TwinError> {
                ::dtwin::__private::object_from_value(value)
            }
        }
    }
}

fn field_rename(attrs: &[Attribute]) -> syn::Result<Option<LitStr>> {
    let mut rename = None;
    for attr in attrs {
        if !attr.path().is_ident("serde") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.input.peek(syn::Token![=]) {
                let expr: syn::Expr = meta.value()?.parse()?;
                if meta.path.is_ident("rename") {
                    rename = Some(parse_lit_str(&expr, "rename")?);
                }
            } else if meta.input.peek(syn::token::Paren) {
                meta.parse_nested_meta(|inner| {
                    if inner.input.peek(syn::Token![=]) {
                        let _: syn::Expr = inner.value()?.parse()?;
                    }
                    Ok(())
                })?;
            }
            Ok(())
        })?;
    }
    Ok(rename)
}
