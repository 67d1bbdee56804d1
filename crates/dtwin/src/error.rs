//! # Twin Errors
//!
//! This module defines the [`TwinError`] enum used throughout the engine for reporting
//! registry, metadata, conversion and traversal failures.

use std::borrow::Cow;

/// A specialized [`TwinError`] enum for engine failures.
#[dtwin_derive::dtwin_error]
pub enum TwinError {
    /// Two registered types resolve to the same full model identifier.
    #[error("Duplicate model id {model_id}{}", format_context(.context))]
    DuplicateModelId { model_id: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A lookup named a type that the registry never indexed.
    #[error("Type {type_name} is not registered{}", format_context(.context))]
    UnregisteredType { type_name: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Member metadata that cannot be mapped to a wire category.
    #[error("Classification error{}: {message}", format_context(.context))]
    Classification { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Malformed JSON or a serde failure while reading or writing a document.
    #[error("JSON error{}: {source}", format_context(.context))]
    Json {
        #[source]
        source: serde_json::Error,
        context: Option<Cow<'static, str>>,
    },

    /// A wire value that does not fit the declared member type.
    #[error("Coercion error{}: {message}", format_context(.context))]
    Coercion { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A member name not present in the type's member table.
    #[error("Unknown member {member}{}", format_context(.context))]
    UnknownMember { member: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A type's validation hook rejected a populated instance.
    #[error("Validation failed{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A cycle in the instance graph or the inheritance chain.
    #[error("Cycle detected{}: {message}", format_context(.context))]
    Cycle { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal twin error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
