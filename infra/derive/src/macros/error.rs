use super::attrs::{derived_trait_names, snake_case};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Attribute, Data, DeriveInput, Fields, Ident, Type, Variant};

struct VariantMeta<'a> {
    ident: &'a Ident,
    source: Option<(&'a Ident, &'a Type)>,
    text_fields: Vec<&'a Ident>,
    only_text: bool,
    has_context: bool,
    cfg_attrs: Vec<Attribute>,
}

pub fn expand(input: DeriveInput) -> TokenStream {
    let name = &input.ident;
    let ext_trait = format_ident!("{}Ext", name);

    let Data::Enum(data) = &input.data else {
        return quote! { compile_error!("dtwin_error can only be applied to enums"); };
    };

    let variants = match data.variants.iter().map(describe_variant).collect::<Result<Vec<_>, _>>()
    {
        Ok(variants) => variants,
        Err(err) => return err,
    };
    if let Some(err) = missing_context(&variants) {
        return err;
    }

    let derived = derived_trait_names(&input.attrs);
    let mut derives = Vec::new();
    if !derived.contains("Debug") {
        derives.push(quote! { Debug });
    }
    if !derived.contains("Error") {
        derives.push(quote! { ::thiserror::Error });
    }
    let derive_attr = if derives.is_empty() {
        quote! {}
    } else {
        quote! { #[derive(#(#derives),*)] }
    };

    let ext_impl = context_trait(name, &ext_trait, &variants);
    let source_impls = variants.iter().filter_map(|v| source_conversion(name, &ext_trait, v));
    let internal_impls = internal_conversions(name, &variants);
    let constructors = constructors(name, &variants);

    quote! {
        #[allow(non_shorthand_field_patterns)]
        #derive_attr
        #input

        #ext_impl
        #(#source_impls)*
        #internal_impls
        #constructors

        #[allow(dead_code)]
        fn format_context(context: &Option<::std::borrow::Cow<'static, str>>) -> ::std::borrow::Cow<'static, str> {
            context.as_ref().map_or(::std::borrow::Cow::Borrowed(""), |c| ::std::borrow::Cow::Owned(format!(" ({c})")))
        }
    }
}

fn describe_variant(variant: &Variant) -> Result<VariantMeta<'_>, TokenStream> {
    let Fields::Named(fields) = &variant.fields else {
        return Err(syn::Error::new_spanned(
            variant,
            "dtwin_error variants must use named fields",
        )
        .to_compile_error());
    };

    let mut has_context = false;
    let mut source = None;
    let mut text_fields = Vec::new();
    let mut only_text = true;

    for field in &fields.named {
        let Some(ident) = &field.ident else { continue };
        if ident == "context" {
            if !is_optional_cow(&field.ty) {
                return Err(syn::Error::new_spanned(
                    &field.ty,
                    "context field must be Option<Cow<'static, str>>",
                )
                .to_compile_error());
            }
            has_context = true;
            continue;
        }
        let marked_source =
            ident == "source" || has_attr(&field.attrs, "source") || has_attr(&field.attrs, "from");
        if marked_source && source.is_none() {
            source = Some((ident, &field.ty));
        }
        if !marked_source && is_cow(&field.ty) {
            text_fields.push(ident);
        } else {
            only_text = false;
        }
    }

    Ok(VariantMeta {
        ident: &variant.ident,
        source,
        text_fields,
        only_text,
        has_context,
        cfg_attrs: variant.attrs.iter().filter(|attr| attr.path().is_ident("cfg")).cloned().collect(),
    })
}

fn context_trait(name: &Ident, ext_trait: &Ident, variants: &[VariantMeta<'_>]) -> TokenStream {
    let arms = variants.iter().filter(|v| v.has_context).map(|v| {
        let cfg_attrs = &v.cfg_attrs;
        let ident = v.ident;
        quote! { #(#cfg_attrs)* #name::#ident { context: slot, .. } => *slot = Some(context.into()), }
    });

    quote! {
        /// Attaches a short description of the failing step to an error.
        pub trait #ext_trait<T> {
            fn context(self, context: impl Into<::std::borrow::Cow<'static, str>>) -> ::std::result::Result<T, #name>;
        }

        #[automatically_derived]
        impl<T> #ext_trait<T> for ::std::result::Result<T, #name> {
            #[inline]
            fn context(self, context: impl Into<::std::borrow::Cow<'static, str>>) -> Self {
                self.map_err(|mut err| {
                    match &mut err {
                        #( #arms )*
                        _ => {}
                    }
                    err
                })
            }
        }
    }
}

fn source_conversion(
    name: &Ident,
    ext_trait: &Ident,
    v: &VariantMeta<'_>,
) -> Option<TokenStream> {
    if v.ident == "Internal" {
        return None;
    }
    let (field, ty) = v.source?;
    let ident = v.ident;
    let cfg_attrs = &v.cfg_attrs;

    Some(quote! {
        #(#cfg_attrs)*
        #[automatically_derived]
        impl From<#ty> for #name {
            #[inline]
            fn from(#field: #ty) -> Self { Self::#ident { #field, context: None } }
        }

        #(#cfg_attrs)*
        impl<T> #ext_trait<T> for ::std::result::Result<T, #ty> {
            #[inline]
            fn context(self, context: impl Into<::std::borrow::Cow<'static, str>>) -> ::std::result::Result<T, #name> {
                self.map_err(|#field| #name::#ident { #field, context: Some(context.into()) })
            }
        }
    })
}

fn internal_conversions(name: &Ident, variants: &[VariantMeta<'_>]) -> TokenStream {
    let Some(internal) = variants.iter().find(|v| v.ident == "Internal") else {
        return quote!();
    };
    let cfg_attrs = &internal.cfg_attrs;

    quote! {
        #(#cfg_attrs)*
        impl From<&'static str> for #name {
            #[inline]
            fn from(s: &'static str) -> Self { Self::Internal { message: ::std::borrow::Cow::Borrowed(s), context: None } }
        }
        #(#cfg_attrs)*
        impl From<String> for #name {
            #[inline]
            fn from(s: String) -> Self { Self::Internal { message: ::std::borrow::Cow::Owned(s), context: None } }
        }
    }
}

/// Snake-case constructors for variants carrying only text fields and a context slot.
fn constructors(name: &Ident, variants: &[VariantMeta<'_>]) -> TokenStream {
    let fns = variants
        .iter()
        .filter(|v| v.only_text && v.has_context && !v.text_fields.is_empty())
        .map(|v| {
            let ident = v.ident;
            let fn_name = format_ident!("{}", snake_case(&ident.to_string()));
            let cfg_attrs = &v.cfg_attrs;
            let params = &v.text_fields;
            quote! {
                #(#cfg_attrs)*
                #[inline]
                #[allow(dead_code)]
                pub fn #fn_name(#( #params: impl Into<::std::borrow::Cow<'static, str>> ),*) -> Self {
                    Self::#ident { #( #params: #params.into(), )* context: None }
                }
            }
        })
        .collect::<Vec<_>>();

    if fns.is_empty() {
        return quote!();
    }

    quote! {
        #[automatically_derived]
        impl #name {
            #(#fns)*
        }
    }
}

fn missing_context(variants: &[VariantMeta<'_>]) -> Option<TokenStream> {
    variants.iter().find(|v| v.source.is_some() && !v.has_context).map(|v| {
        syn::Error::new_spanned(
            v.ident,
            "dtwin_error requires `context: Option<Cow<'static, str>>` next to a source field",
        )
        .to_compile_error()
    })
}

fn has_attr(attrs: &[Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident(name))
}

fn last_segment(ty: &Type) -> Option<&syn::PathSegment> {
    let Type::Path(path) = ty else { return None };
    path.path.segments.last()
}

fn is_cow(ty: &Type) -> bool {
    let Some(segment) = last_segment(ty) else { return false };
    if segment.ident != "Cow" {
        return false;
    }
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return false;
    };
    let mut args = args.args.iter();
    let Some(syn::GenericArgument::Lifetime(lt)) = args.next() else {
        return false;
    };
    if lt.ident != "static" {
        return false;
    }
    let Some(syn::GenericArgument::Type(inner)) = args.next() else {
        return false;
    };
    last_segment(inner).is_some_and(|seg| seg.ident == "str")
}

fn is_optional_cow(ty: &Type) -> bool {
    let Some(segment) = last_segment(ty) else { return false };
    if segment.ident != "Option" {
        return false;
    }
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return false;
    };
    matches!(args.args.first(), Some(syn::GenericArgument::Type(inner)) if is_cow(inner))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_context_slot_type() {
        let ty: Type = syn::parse_quote!(Option<Cow<'static, str>>);
        assert!(is_optional_cow(&ty));
        let ty: Type = syn::parse_quote!(Option<std::borrow::Cow<'static, str>>);
        assert!(is_optional_cow(&ty));
        let ty: Type = syn::parse_quote!(Option<String>);
        assert!(!is_optional_cow(&ty));
    }

    #[test]
    fn text_only_variants_get_constructors() {
        let input: DeriveInput = syn::parse_quote! {
            enum SampleError {
                #[error("bad {message}")]
                Coercion { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
            }
        };
        let out = expand(input).to_string();
        assert!(out.contains("fn coercion"));
        assert!(out.contains("SampleErrorExt"));
    }
}
