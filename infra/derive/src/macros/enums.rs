use super::attrs::{derived_trait_names, parse_discriminant};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Fields, ItemEnum};

/// Expands the `#[twin_enum]` attribute macro.
///
/// Unit variants only. Each variant gets its explicit discriminant or the previous one plus
/// one, starting at zero. The wire form is the integer; reading also accepts a numeric string
/// or the variant name.
pub fn expand(args: TokenStream, input: ItemEnum) -> TokenStream {
    if !args.is_empty() {
        return syn::Error::new_spanned(args, "twin_enum takes no arguments").to_compile_error();
    }
    if !input.generics.params.is_empty() {
        return syn::Error::new_spanned(&input.generics, "twin_enum cannot be generic")
            .to_compile_error();
    }

    let mut next = 0i64;
    let mut variants = Vec::with_capacity(input.variants.len());
    for variant in &input.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return syn::Error::new_spanned(variant, "twin_enum supports unit variants only")
                .to_compile_error();
        }
        let value = match &variant.discriminant {
            Some((_, expr)) => match parse_discriminant(expr) {
                Ok(value) => value,
                Err(err) => return err.to_compile_error(),
            },
            None => next,
        };
        next = value.wrapping_add(1);
        variants.push((&variant.ident, value));
    }

    let derives = derived_trait_names(&input.attrs);
    let mut derive_tokens = Vec::new();
    for needed in ["Debug", "Clone", "Copy", "PartialEq", "Eq"] {
        if !derives.contains(needed) {
            let ident = syn::Ident::new(needed, proc_macro2::Span::call_site());
            derive_tokens.push(quote! { #ident });
        }
    }
    let derive_attr = if derive_tokens.is_empty() {
        quote! {}
    } else {
        quote! { #[derive(#(#derive_tokens),*)] }
    };

    let name = &input.ident;
    let type_name = name.to_string();
    let members = variants.iter().map(|(ident, value)| {
        let member = ident.to_string();
        quote! { ::dtwin::EnumMember { name: #member, value: #value } }
    });
    let to_arms = variants.iter().map(|(ident, value)| quote! { Self::#ident => #value, });
    let from_arms = variants.iter().map(|(ident, value)| quote! { #value => Ok(Self::#ident), });

    quote! {
        #derive_attr
        #input

        #[automatically_derived]
        impl #name {
            #[doc(hidden)]
            pub fn __twin_enum() -> &'static ::dtwin::EnumDescriptor {
                static DESCRIPTOR: ::dtwin::EnumDescriptor = ::dtwin::EnumDescriptor {
                    name: #type_name,
                    members: &[#(#members),*],
                };
                &DESCRIPTOR
            }

            /// Integer form written to the wire.
            pub const fn discriminant(self) -> i64 {
                match self {
                    #(#to_arms)*
                }
            }
        }

        #[automatically_derived]
        impl ::dtwin::WireValue for #name {
            fn value_type() -> ::dtwin::ValueType {
                ::dtwin::ValueType::Enum(Self::__twin_enum())
            }

            fn to_wire(&self) -> ::std::result::Result<::std::option::Option<::dtwin::serde_json::Value>, ::dtwin::TwinError> {
                Ok(Some(::dtwin::serde_json::Value::from(self.discriminant())))
            }

            fn from_wire(value: ::dtwin::serde_json::Value) -> ::std::result::Result<Self, ::dtwin::TwinError> {
                let descriptor = Self::__twin_enum();
                match ::dtwin::__private::enum_discriminant(descriptor, &value)? {
                    #(#from_arms)*
                    other => Err(::dtwin::TwinError::coercion(::std::format!(
                        "{other} is not a value of {}", descriptor.name
                    ))),
                }
            }
        }

        #[automatically_derived]
        impl ::dtwin::serde::Serialize for #name {
            fn serialize<S: ::dtwin::serde::Serializer>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error> {
                serializer.serialize_i64(self.discriminant())
            }
        }

        #[automatically_derived]
        impl<'de> ::dtwin::serde::Deserialize<'de> for #name {
            fn deserialize<D: ::dtwin::serde::Deserializer<'de>>(deserializer: D) -> ::std::result::Result<Self, D::Error> {
                let value = <::dtwin::serde_json::Value as ::dtwin::serde::Deserialize>::deserialize(deserializer)?;
                <Self as ::dtwin::WireValue>::from_wire(value)
                    .map_err(<D::Error as ::dtwin::serde::de::Error>::custom)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn implicit_discriminants_continue_from_previous() {
        let input: ItemEnum = syn::parse_quote! {
            enum State { Off, On = 5, Standby }
        };
        let out = expand(TokenStream::new(), input).to_string();
        assert!(out.contains("Self :: Off => 0i64"));
        assert!(out.contains("Self :: Standby => 6i64"));
    }

    #[test]
    fn rejects_tuple_variants() {
        let input: ItemEnum = syn::parse_quote! {
            enum Mixed { Plain, Carrying(u8) }
        };
        let out = expand(TokenStream::new(), input).to_string();
        assert!(out.contains("compile_error"));
    }
}
