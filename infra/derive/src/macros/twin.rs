use super::attrs::{lower_camel_case, parse_u32, set_once};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Field, Fields, Ident, LitBool, LitInt, LitStr, Type};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Role {
    Base,
    Extends,
    Property,
    Telemetry,
    Component,
    Relationship,
}

#[derive(Default)]
struct ContainerOptions {
    model_id: Option<LitStr>,
    version: Option<LitInt>,
    display_name: Option<LitStr>,
    extends_model_id: Option<LitStr>,
    context: Option<LitStr>,
    is_abstract: bool,
    hooks: bool,
}

#[derive(Default)]
struct FieldOptions {
    role: Option<Role>,
    name: Option<LitStr>,
    read_only: bool,
    exclude: bool,
    min: Option<u32>,
    max: Option<u32>,
}

struct TwinField<'a> {
    ident: &'a Ident,
    ty: &'a Type,
    key: String,
    options: FieldOptions,
}

pub fn expand_derive(input: DeriveInput) -> syn::Result<TokenStream> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "DigitalTwin cannot be derived for generic types",
        ));
    }
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(&input.ident, "DigitalTwin requires a struct"));
    };
    let Fields::Named(named) = &data.fields else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "DigitalTwin requires a struct with named fields",
        ));
    };

    let container = parse_container(&input)?;
    let mut fields = Vec::with_capacity(named.named.len());
    let mut plain = Vec::new();
    for field in &named.named {
        match parse_field(field)? {
            Some(twin_field) => fields.push(twin_field),
            None => plain.extend(field.ident.as_ref()),
        }
    }

    let header_fields: Vec<&TwinField<'_>> = fields
        .iter()
        .filter(|f| matches!(f.options.role, Some(Role::Base | Role::Extends)))
        .collect();
    let header = match header_fields.as_slice() {
        [one] => *one,
        [] => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "a twin needs exactly one `#[twin(base)]` or `#[twin(extends)]` field",
            ));
        },
        [_, second, ..] => {
            return Err(syn::Error::new_spanned(
                second.ident,
                "only one `#[twin(base)]` or `#[twin(extends)]` field is allowed",
            ));
        },
    };

    let name = &input.ident;
    let member_access = member_access(name, header, &fields);
    let twin_impl = twin_impl(name, &container, header, &fields, &plain);
    let dyn_impl = dyn_impl(name, header);
    let value_impls = value_impls(name);
    let hooks = if container.hooks {
        quote! {}
    } else {
        quote! {
            #[automatically_derived]
            impl ::dtwin::TwinHooks for #name {}
        }
    };

    Ok(quote! {
        #member_access
        #twin_impl
        #dyn_impl
        #value_impls
        #hooks
    })
}

fn parse_container(input: &DeriveInput) -> syn::Result<ContainerOptions> {
    let mut options = ContainerOptions::default();

    for attr in &input.attrs {
        if !attr.path().is_ident("twin") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("model_id") {
                let lit: LitStr = meta.value()?.parse()?;
                set_once(&mut options.model_id, lit, &meta.path)
            } else if meta.path.is_ident("version") {
                let lit: LitInt = meta.value()?.parse()?;
                parse_u32(&lit)?;
                set_once(&mut options.version, lit, &meta.path)
            } else if meta.path.is_ident("display_name") {
                let lit: LitStr = meta.value()?.parse()?;
                set_once(&mut options.display_name, lit, &meta.path)
            } else if meta.path.is_ident("extends_model_id") {
                let lit: LitStr = meta.value()?.parse()?;
                set_once(&mut options.extends_model_id, lit, &meta.path)
            } else if meta.path.is_ident("context") {
                let lit: LitStr = meta.value()?.parse()?;
                set_once(&mut options.context, lit, &meta.path)
            } else if meta.path.is_ident("abstract") {
                options.is_abstract = flag(&meta)?;
                Ok(())
            } else if meta.path.is_ident("hooks") {
                options.hooks = flag(&meta)?;
                Ok(())
            } else {
                Err(meta.error("unknown twin container argument"))
            }
        })?;
    }

    Ok(options)
}

fn parse_field(field: &Field) -> syn::Result<Option<TwinField<'_>>> {
    let Some(ident) = &field.ident else { return Ok(None) };
    let mut options = FieldOptions::default();
    let mut seen = false;

    for attr in &field.attrs {
        if !attr.path().is_ident("twin") {
            continue;
        }
        seen = true;
        attr.parse_nested_meta(|meta| {
            let role = if meta.path.is_ident("base") {
                Some(Role::Base)
            } else if meta.path.is_ident("extends") {
                Some(Role::Extends)
            } else if meta.path.is_ident("property") {
                Some(Role::Property)
            } else if meta.path.is_ident("telemetry") {
                Some(Role::Telemetry)
            } else if meta.path.is_ident("component") {
                Some(Role::Component)
            } else if meta.path.is_ident("relationship") {
                Some(Role::Relationship)
            } else {
                None
            };
            if let Some(role) = role {
                return set_once(&mut options.role, role, &meta.path);
            }

            if meta.path.is_ident("name") {
                let lit: LitStr = meta.value()?.parse()?;
                set_once(&mut options.name, lit, &meta.path)
            } else if meta.path.is_ident("read_only") {
                options.read_only = flag(&meta)?;
                Ok(())
            } else if meta.path.is_ident("exclude") {
                options.exclude = flag(&meta)?;
                Ok(())
            } else if meta.path.is_ident("min") {
                let lit: LitInt = meta.value()?.parse()?;
                set_once(&mut options.min, parse_u32(&lit)?, &meta.path)
            } else if meta.path.is_ident("max") {
                let lit: LitInt = meta.value()?.parse()?;
                set_once(&mut options.max, parse_u32(&lit)?, &meta.path)
            } else {
                Err(meta.error("unknown twin field argument"))
            }
        })?;
    }

    if !seen {
        return Ok(None);
    }
    let Some(role) = options.role else {
        return Err(syn::Error::new_spanned(
            ident,
            "expected one of base, extends, property, telemetry, component, relationship",
        ));
    };
    let header = matches!(role, Role::Base | Role::Extends);
    if header && (options.name.is_some() || options.read_only || options.exclude) {
        return Err(syn::Error::new_spanned(ident, "header fields take no modifiers"));
    }
    if role != Role::Relationship && (options.min.is_some() || options.max.is_some()) {
        return Err(syn::Error::new_spanned(ident, "min/max apply to relationships only"));
    }

    let raw = ident.to_string();
    let key = raw.strip_prefix("r#").unwrap_or(&raw).to_owned();
    Ok(Some(TwinField { ident, ty: &field.ty, key, options }))
}

fn flag(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<bool> {
    if meta.input.peek(syn::Token![=]) {
        let lit: LitBool = meta.value()?.parse()?;
        Ok(lit.value)
    } else {
        Ok(true)
    }
}

fn member_access(name: &Ident, header: &TwinField<'_>, fields: &[TwinField<'_>]) -> TokenStream {
    let type_name = name.to_string();
    let header_ident = header.ident;

    let descriptors = fields.iter().map(|f| {
        let ty = f.ty;
        let role = f.options.role;
        if matches!(role, Some(Role::Base | Role::Extends)) {
            return quote! {
                members.extend(
                    <#ty as ::dtwin::MemberAccess>::members()
                        .into_iter()
                        .map(::dtwin::MemberDescriptor::inherit),
                );
            };
        }

        let key = &f.key;
        let (marker, value_type) = match role {
            Some(Role::Telemetry) => (
                quote! { ::dtwin::Marker::Telemetry },
                quote! { <#ty as ::dtwin::WireValue>::value_type() },
            ),
            Some(Role::Component) => (
                quote! { ::dtwin::Marker::Component },
                quote! { <#ty as ::dtwin::ComponentField>::value_type() },
            ),
            Some(Role::Relationship) => (
                quote! { ::dtwin::Marker::Relationship },
                quote! { <#ty as ::dtwin::RelationshipField>::value_type() },
            ),
            _ => (
                quote! { ::dtwin::Marker::Property },
                quote! { <#ty as ::dtwin::WireValue>::value_type() },
            ),
        };
        let wire_name = f.options.name.as_ref().map_or_else(|| lower_camel_case(key), LitStr::value);
        let writable = !f.options.read_only;
        let excluded = f.options.exclude;
        let min = f.options.min.map(|n| quote! { .min_multiplicity(#n) });
        let max = f.options.max.map(|n| quote! { .max_multiplicity(#n) });

        quote! {
            members.push(
                ::dtwin::MemberDescriptor::builder()
                    .member(#key)
                    .rename(#wire_name)
                    .marker(#marker)
                    .value_type(#value_type)
                    .writable(#writable)
                    .excluded(#excluded)
                    .declared_by(#type_name)
                    #min
                    #max
                    .build(),
            );
        }
    });

    let value_fields: Vec<&TwinField<'_>> = fields
        .iter()
        .filter(|f| {
            matches!(
                f.options.role,
                Some(Role::Property | Role::Telemetry | Role::Component)
            )
        })
        .collect();
    let read_arms = value_fields.iter().map(|f| {
        let (key, ident, ty) = (&f.key, f.ident, f.ty);
        quote! { #key => <#ty as ::dtwin::WireValue>::to_wire(&self.#ident), }
    });
    let write_arms = value_fields.iter().map(|f| {
        let (key, ident, ty) = (&f.key, f.ident, f.ty);
        quote! {
            #key => {
                self.#ident = <#ty as ::dtwin::WireValue>::from_wire(value)?;
                Ok(())
            },
        }
    });
    let component_arms = fields.iter().filter(|f| f.options.role == Some(Role::Component)).map(|f| {
        let (key, ident, ty) = (&f.key, f.ident, f.ty);
        quote! { #key => <#ty as ::dtwin::ComponentField>::component(&self.#ident), }
    });
    let related_arms =
        fields.iter().filter(|f| f.options.role == Some(Role::Relationship)).map(|f| {
            let (key, ident, ty) = (&f.key, f.ident, f.ty);
            quote! { #key => <#ty as ::dtwin::RelationshipField>::targets(&self.#ident), }
        });

    quote! {
        #[automatically_derived]
        impl ::dtwin::MemberAccess for #name {
            fn members() -> ::std::vec::Vec<::dtwin::MemberDescriptor> {
                let mut members = ::std::vec::Vec::new();
                #( #descriptors )*
                members
            }

            fn read_member(&self, member: &str) -> ::std::result::Result<::std::option::Option<::dtwin::serde_json::Value>, ::dtwin::TwinError> {
                match member {
                    #( #read_arms )*
                    _ => ::dtwin::MemberAccess::read_member(&self.#header_ident, member),
                }
            }

            fn write_member(&mut self, member: &str, value: ::dtwin::serde_json::Value) -> ::std::result::Result<(), ::dtwin::TwinError> {
                match member {
                    #( #write_arms )*
                    _ => ::dtwin::MemberAccess::write_member(&mut self.#header_ident, member, value),
                }
            }

            fn component(&self, member: &str) -> ::std::option::Option<&dyn ::dtwin::DynTwin> {
                match member {
                    #( #component_arms )*
                    _ => ::dtwin::MemberAccess::component(&self.#header_ident, member),
                }
            }

            fn related(&self, member: &str) -> ::std::vec::Vec<&dyn ::dtwin::DynTwin> {
                match member {
                    #( #related_arms )*
                    _ => ::dtwin::MemberAccess::related(&self.#header_ident, member),
                }
            }
        }
    }
}

fn twin_impl(
    name: &Ident,
    container: &ContainerOptions,
    header: &TwinField<'_>,
    fields: &[TwinField<'_>],
    plain: &[&Ident],
) -> TokenStream {
    let type_name = name.to_string();
    let model_id = container.model_id.as_ref().map_or_else(
        || quote! { ::dtwin::__private::default_model_id(::core::module_path!(), #type_name) },
        |lit| quote! { ::std::string::String::from(#lit) },
    );
    let version = container.version.as_ref().map_or_else(|| quote! { 1u32 }, |lit| quote! { #lit });
    let display_name = container.display_name.as_ref().map_or_else(
        || quote! { #type_name },
        |lit| quote! { #lit },
    );
    let context = container.context.as_ref().map(|lit| quote! { .context(#lit) });
    let extends = (header.options.role == Some(Role::Extends)).then(|| {
        let ty = header.ty;
        quote! { .extends(<#ty as ::dtwin::Twin>::descriptor as ::dtwin::TwinLink) }
    });
    let extends_model_id = container
        .extends_model_id
        .as_ref()
        .map(|lit| quote! { .extends_model_id(::std::string::String::from(#lit)) });
    let is_abstract = container.is_abstract;

    let blank_fields = fields.iter().map(|f| {
        let (ident, ty) = (f.ident, f.ty);
        match f.options.role {
            Some(Role::Extends) => quote! { #ident: <#ty as ::dtwin::Twin>::blank() },
            Some(Role::Component) => quote! { #ident: <#ty as ::dtwin::ComponentField>::vacant() },
            Some(Role::Relationship) => {
                quote! { #ident: <#ty as ::dtwin::RelationshipField>::vacant() }
            },
            _ => quote! { #ident: ::core::default::Default::default() },
        }
    });
    let blank_plain = plain.iter().map(|ident| quote! { #ident: ::core::default::Default::default() });
    let descriptor_static = format_ident!("__{}_DESCRIPTOR", type_name.to_uppercase());

    quote! {
        #[automatically_derived]
        impl ::dtwin::Twin for #name {
            fn descriptor() -> &'static ::dtwin::TwinDescriptor {
                static #descriptor_static: ::std::sync::OnceLock<::dtwin::TwinDescriptor> = ::std::sync::OnceLock::new();
                #descriptor_static.get_or_init(|| {
                    ::dtwin::TwinDescriptor::builder()
                        .type_id(::std::any::TypeId::of::<#name>())
                        .type_name(#type_name)
                        .model_id(#model_id)
                        .version(#version)
                        .display_name(#display_name)
                        #context
                        #extends
                        #extends_model_id
                        .is_abstract(#is_abstract)
                        .members(<#name as ::dtwin::MemberAccess>::members())
                        .blank(::dtwin::__private::blank_of::<#name>)
                        .build()
                })
            }

            fn blank() -> Self {
                Self {
                    #( #blank_fields, )*
                    #( #blank_plain, )*
                }
            }
        }
    }
}

fn dyn_impl(name: &Ident, header: &TwinField<'_>) -> TokenStream {
    let ident = header.ident;
    let (header_ref, header_mut) = if header.options.role == Some(Role::Base) {
        (quote! { &self.#ident }, quote! { &mut self.#ident })
    } else {
        (
            quote! { ::dtwin::DynTwin::header(&self.#ident) },
            quote! { ::dtwin::DynTwin::header_mut(&mut self.#ident) },
        )
    };

    quote! {
        #[automatically_derived]
        impl ::dtwin::DynTwin for #name {
            fn twin_type(&self) -> &'static ::dtwin::TwinDescriptor {
                <Self as ::dtwin::Twin>::descriptor()
            }

            fn header(&self) -> &::dtwin::TwinBase {
                #header_ref
            }

            fn header_mut(&mut self) -> &mut ::dtwin::TwinBase {
                #header_mut
            }

            fn validate(&self) -> ::std::result::Result<(), ::dtwin::TwinError> {
                <Self as ::dtwin::TwinHooks>::validate(self)
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn into_any(self: ::std::boxed::Box<Self>) -> ::std::boxed::Box<dyn ::std::any::Any> {
                self
            }
        }
    }
}

/// Impls that let the type sit in another twin's members: inline as a value or
/// component, or as the target of a relationship.
fn value_impls(name: &Ident) -> TokenStream {
    quote! {
        #[automatically_derived]
        impl ::dtwin::WireValue for #name {
            fn value_type() -> ::dtwin::ValueType {
                ::dtwin::ValueType::Twin {
                    target: <Self as ::dtwin::Twin>::descriptor,
                    many: false,
                }
            }

            fn to_wire(&self) -> ::std::result::Result<::std::option::Option<::dtwin::serde_json::Value>, ::dtwin::TwinError> {
                ::dtwin::__private::component_to_value(self).map(::std::option::Option::Some)
            }

            fn from_wire(value: ::dtwin::serde_json::Value) -> ::std::result::Result<Self, ::dtwin::TwinError> {
                ::dtwin::__private::component_from_value::<Self>(value)
            }
        }

        #[automatically_derived]
        impl ::dtwin::ComponentField for #name {
            fn value_type() -> ::dtwin::ValueType {
                <Self as ::dtwin::WireValue>::value_type()
            }

            fn component(&self) -> ::std::option::Option<&dyn ::dtwin::DynTwin> {
                ::std::option::Option::Some(self)
            }

            fn vacant() -> Self {
                <Self as ::dtwin::Twin>::blank()
            }
        }

        #[automatically_derived]
        impl ::dtwin::TwinRef for #name {
            fn target() -> ::dtwin::TwinLink {
                <Self as ::dtwin::Twin>::descriptor
            }

            fn twin(&self) -> &dyn ::dtwin::DynTwin {
                self
            }
        }

        #[automatically_derived]
        impl ::dtwin::RelationshipField for #name {
            fn value_type() -> ::dtwin::ValueType {
                <Self as ::dtwin::WireValue>::value_type()
            }

            fn targets(&self) -> ::std::vec::Vec<&dyn ::dtwin::DynTwin> {
                ::std::vec![self as &dyn ::dtwin::DynTwin]
            }

            fn vacant() -> Self {
                <Self as ::dtwin::Twin>::blank()
            }
        }
    }
}
