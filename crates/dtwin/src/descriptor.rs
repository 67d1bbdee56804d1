//! Runtime description of twin types.
//!
//! A [`TwinDescriptor`] is generated once per type by `#[derive(DigitalTwin)]` and lives in a
//! `OnceLock` static for the rest of the process. Everything the engine knows about a type
//! (members, inheritance, model identity, the blank factory) is read from here.

use crate::classify::{Classification, classify};
use crate::error::TwinError;
use crate::twin::DynTwin;
use fxhash::FxHashSet;
use std::any::TypeId;
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;
use typed_builder::TypedBuilder;

/// Lazy handle to a descriptor. Function pointers keep type graphs with back edges
/// (a floor pointing at its building) free of initialization order problems.
pub type TwinLink = fn() -> &'static TwinDescriptor;

pub const DTDL_CONTEXT: &str = "dtmi:dtdl:context;2";

/// Scalar shapes of the closed conversion table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    String,
    Boolean,
    Integer,
    Long,
    Float,
    Double,
    Decimal,
    DateTime,
    Char,
    Uuid,
    ETag,
}

impl ScalarKind {
    /// DTDL primitive schema name.
    pub const fn schema(self) -> &'static str {
        match self {
            Self::String | Self::Char | Self::Uuid | Self::ETag => "string",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double | Self::Decimal => "double",
            Self::DateTime => "dateTime",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumMember {
    pub name: &'static str,
    pub value: i64,
}

#[derive(Debug, PartialEq, Eq)]
pub struct EnumDescriptor {
    pub name: &'static str,
    pub members: &'static [EnumMember],
}

impl EnumDescriptor {
    pub fn by_name(&self, name: &str) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.name == name)
    }
}

#[derive(Debug, Clone)]
pub struct ObjectField {
    pub name: &'static str,
    pub value_type: ValueType,
}

/// Declared shape of a member value.
#[derive(Clone)]
pub enum ValueType {
    Scalar(ScalarKind),
    Enum(&'static EnumDescriptor),
    Object(Vec<ObjectField>),
    Array(Box<ValueType>),
    Map(Box<ValueType>),
    /// A twin type used inline or as a relationship target; `many` for sequences.
    Twin { target: TwinLink, many: bool },
}

impl ValueType {
    pub fn twin_target(&self) -> Option<&'static TwinDescriptor> {
        match self {
            Self::Twin { target, .. } => Some(target()),
            _ => None,
        }
    }

    /// Values whose null fields are stripped when contents are rebuilt.
    pub const fn is_structured(&self) -> bool {
        matches!(self, Self::Object(_) | Self::Twin { .. })
    }
}

impl fmt::Debug for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(kind) => f.debug_tuple("Scalar").field(kind).finish(),
            Self::Enum(desc) => f.debug_tuple("Enum").field(&desc.name).finish(),
            Self::Object(fields) => f.debug_tuple("Object").field(fields).finish(),
            Self::Array(inner) => f.debug_tuple("Array").field(inner).finish(),
            Self::Map(inner) => f.debug_tuple("Map").field(inner).finish(),
            Self::Twin { target, many } => f
                .debug_struct("Twin")
                .field("target", &target().type_name)
                .field("many", many)
                .finish(),
        }
    }
}

/// How a member was declared on its type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Header members that only exist on the wire, never in the schema.
    TwinOnly,
    Property,
    Telemetry,
    Component,
    Relationship,
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct MemberDescriptor {
    /// Rust field name, the key used with `MemberAccess`.
    pub member: &'static str,
    /// Wire name. The derive always sets it (explicit `name` or lower camel case of the
    /// field); hand-built descriptors without one use `member` verbatim.
    #[builder(default, setter(strip_option))]
    pub rename: Option<&'static str>,
    pub marker: Marker,
    pub value_type: ValueType,
    #[builder(default = true)]
    pub writable: bool,
    #[builder(default)]
    pub excluded: bool,
    pub declared_by: &'static str,
    #[builder(default)]
    pub inherited: bool,
    #[builder(default, setter(strip_option))]
    pub min_multiplicity: Option<u32>,
    #[builder(default, setter(strip_option))]
    pub max_multiplicity: Option<u32>,
}

impl MemberDescriptor {
    #[must_use]
    pub fn inherit(mut self) -> Self {
        self.inherited = true;
        self
    }

    pub fn wire_name(&self) -> Cow<'static, str> {
        Cow::Borrowed(self.rename.unwrap_or(self.member))
    }
}

#[derive(TypedBuilder)]
pub struct TwinDescriptor {
    pub type_id: TypeId,
    pub type_name: &'static str,
    /// Model identifier without the version suffix.
    pub model_id: String,
    #[builder(default = 1)]
    pub version: u32,
    #[builder(setter(into))]
    pub display_name: String,
    #[builder(default = DTDL_CONTEXT.to_owned(), setter(into))]
    pub context: String,
    #[builder(default, setter(strip_option))]
    pub extends: Option<TwinLink>,
    #[builder(default, setter(strip_option))]
    pub extends_model_id: Option<String>,
    #[builder(default)]
    pub is_abstract: bool,
    pub members: Vec<MemberDescriptor>,
    pub blank: fn() -> Box<dyn DynTwin>,
    #[builder(default, setter(skip))]
    classification: OnceLock<Classification>,
}

impl TwinDescriptor {
    /// `{model_id};{version}`, the identifier used on the wire and in the registry.
    pub fn full_model_id(&self) -> String {
        full_model_id(&self.model_id, self.version)
    }

    pub fn parent(&self) -> Option<&'static Self> {
        self.extends.map(|link| link())
    }

    pub fn parent_model_id(&self) -> Option<String> {
        self.extends_model_id.clone().or_else(|| self.parent().map(Self::full_model_id))
    }

    /// Ancestors from the immediate parent upward.
    pub fn ancestors(&self) -> Result<Vec<&'static Self>, TwinError> {
        let mut seen = FxHashSet::default();
        seen.insert(self.type_id);
        let mut chain = Vec::new();
        let mut next = self.parent();

        while let Some(ancestor) = next {
            if !seen.insert(ancestor.type_id) {
                return Err(TwinError::cycle(format!(
                    "inheritance chain of {} revisits {}",
                    self.type_name, ancestor.type_name
                )));
            }
            chain.push(ancestor);
            next = ancestor.parent();
        }

        Ok(chain)
    }

    pub fn depth(&self) -> Result<usize, TwinError> {
        self.ancestors().map(|chain| chain.len())
    }

    pub fn is_descendant_of(&self, other: &Self) -> Result<bool, TwinError> {
        Ok(self.ancestors()?.iter().any(|ancestor| ancestor.type_id == other.type_id))
    }

    /// Members declared on this type itself.
    pub fn own_members(&self) -> impl Iterator<Item = &MemberDescriptor> {
        self.members.iter().filter(|m| !m.inherited)
    }

    /// Cached member classification, computed on first use.
    pub fn classification(&self) -> Result<&Classification, TwinError> {
        if let Some(cached) = self.classification.get() {
            return Ok(cached);
        }
        let computed = classify(self)?;
        Ok(self.classification.get_or_init(|| computed))
    }

    /// Zero-value instance that bypasses the type's constructors and validation.
    pub fn new_blank(&self) -> Box<dyn DynTwin> {
        (self.blank)()
    }
}

impl fmt::Debug for TwinDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwinDescriptor")
            .field("type_name", &self.type_name)
            .field("model_id", &self.full_model_id())
            .field("extends", &self.parent_model_id())
            .field("is_abstract", &self.is_abstract)
            .field("members", &self.members.len())
            .finish_non_exhaustive()
    }
}

impl PartialEq for TwinDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for TwinDescriptor {}

impl Hash for TwinDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

pub fn full_model_id(model_id: &str, version: u32) -> String {
    format!("{model_id};{version}")
}

/// `dtmi:{module path}:{TypeName}` with `::` separators turned into `:`.
pub fn default_model_id(module_path: &str, type_name: &str) -> String {
    format!("dtmi:{}:{type_name}", module_path.replace("::", ":"))
}
