#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros for the twin engine.
//! This crate turns annotated Rust types into the registration tables the engine reads at
//! runtime: member descriptors, conversion impls and model metadata. It also provides the
//! error macro shared by the workspace crates.
//!
//! ## Usage
//! Depend on the engine crate, which re-exports these macros:
//! ```toml
//! [dependencies]
//! dtwin = { path = "../crates/dtwin" }
//! ```
//!
//! Generated code refers to the engine through `::dtwin::...` paths.
//! See each macro’s docstring for examples; they are `ignore`d to avoid compiling in this crate.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemEnum, ItemStruct, parse_macro_input};

/// Derives the twin registration table for a struct.
///
/// # Container arguments (`#[twin(...)]` on the struct)
///
/// * `model_id = "dtmi:..."` - Model identifier without version. Defaults to
///   `dtmi:{module path}:{TypeName}`.
/// * `version = N` - Schema version, default `1`.
/// * `display_name = "..."` - Defaults to the type name.
/// * `extends_model_id = "..."` - Parent model id for parents not modelled in Rust.
/// * `context = "..."` - DTDL context, default `dtmi:dtdl:context;2`.
/// * `abstract` - Marker type; never indexed by the registry.
/// * `hooks` - The type provides its own `TwinHooks` impl.
///
/// # Field arguments (`#[twin(...)]` on a field)
///
/// Exactly one role: `base` (embeds `TwinBase`), `extends` (embeds the parent twin),
/// `property`, `telemetry`, `component` or `relationship`. Modifiers: `name = "..."`,
/// `read_only`, `exclude`, and `min = N` / `max = N` on relationships.
/// Fields without a `twin` attribute are not members and start from `Default`.
///
/// # Example
///
/// ```rust,ignore
/// use dtwin::{DigitalTwin, TwinBase};
/// use std::sync::Arc;
///
/// #[derive(Debug, DigitalTwin)]
/// #[twin(model_id = "dtmi:facility:Building", display_name = "Building")]
/// pub struct Building {
///     #[twin(base)]
///     pub base: TwinBase,
///     #[twin(property)]
///     pub name: Option<String>,
///     #[twin(relationship, name = "contains")]
///     pub floors: Vec<Arc<Floor>>,
/// }
/// ```
#[proc_macro_derive(DigitalTwin, attributes(twin))]
pub fn digital_twin(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    macros::twin::expand_derive(input).unwrap_or_else(syn::Error::into_compile_error).into()
}

/// Attribute macro for plain structured values used inside twins.
///
/// # Injected Behaviors
///
/// * **Derives**: `Debug`, `Serialize` and `Deserialize` if missing, through `::dtwin::serde`.
/// * **Serde Policy**: `rename_all = "camelCase"`; `#[serde(default)]` when the struct
///   derives `Default`. Per-field `#[serde(rename = "...")]` is honored.
/// * **`WireValue`**: the struct converts as a JSON object and reports an `Object` schema.
///
/// # Example
///
/// ```rust,ignore
/// #[dtwin::twin_object]
/// #[derive(Clone, Default, PartialEq)]
/// pub struct Reading {
///     pub raw_value: Option<f64>,
///     pub unit: Option<String>,
/// }
/// ```
#[proc_macro_attribute]
pub fn twin_object(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::object::expand(args.into(), input).into()
}

/// Attribute macro for enumerations used inside twins.
///
/// Accepts unit variants with optional integer discriminants. Adds `Debug`, `Clone`, `Copy`,
/// `PartialEq` and `Eq` if missing, an integer serde form, and a `WireValue` impl that reads
/// a number, a numeric string or a variant name.
///
/// # Example
///
/// ```rust,ignore
/// #[dtwin::twin_enum]
/// pub enum PumpState {
///     Stopped = 0,
///     Running = 1,
///     Fault = 9,
/// }
/// ```
#[proc_macro_attribute]
pub fn twin_enum(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemEnum);
    macros::enums::expand(args.into(), input).into()
}

/// An attribute macro for defining the workspace error enums.
///
/// # Generated items
///
/// * `#[derive(Debug, thiserror::Error)]` on the enum.
/// * `<Name>Ext<T>` with `.context(..)`, implemented for `Result<T, Source>` of every wrapped
///   source type and for `Result<T, Name>` itself (the new context replaces the old one).
/// * `From<Source>` per source-carrying variant, so `?` lifts upstream errors.
/// * `From<&'static str>` and `From<String>` into `Internal`, when that variant exists.
/// * A snake-case constructor per text-only variant: `Coercion { message, .. }` becomes
///   `Name::coercion(msg)`.
///
/// # Rules
///
/// Variants use named fields. Every variant wrapping a `source` (or a field tagged `#[source]`
/// or `#[from]`) also declares `context: Option<Cow<'static, str>>`; the macro rejects it
/// otherwise.
///
/// # Example
///
/// ```rust,ignore
/// use dtwin_derive::dtwin_error;
/// use std::borrow::Cow;
///
/// #[dtwin_error]
/// pub enum TwinError {
///     #[error("Malformed JSON{}: {source}", format_context(.context))]
///     Json {
///         #[source]
///         source: serde_json::Error,
///         context: Option<Cow<'static, str>>,
///     },
///
///     #[error("Internal fault{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
/// ```
#[proc_macro_attribute]
pub fn dtwin_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand(input).into()
}
