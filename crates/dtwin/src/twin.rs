//! Traits implemented by twin types.
//!
//! `#[derive(DigitalTwin)]` writes all of these except [`TwinHooks`] when the type opts in
//! with `#[twin(hooks)]`. Hand-written impls are possible but must agree with the
//! descriptor returned by [`Twin::descriptor`].

use crate::descriptor::{TwinDescriptor, TwinLink, ValueType};
use crate::error::TwinError;
use crate::types::TwinBase;
use serde_json::Value;
use std::any::{Any, type_name};
use std::fmt::Debug;
use std::sync::Arc;

/// Member-level access keyed by Rust field name.
pub trait MemberAccess {
    /// Member table in declaration order, inherited members at their splice point.
    fn members() -> Vec<crate::descriptor::MemberDescriptor>
    where
        Self: Sized;

    /// `Ok(None)` for an absent value.
    fn read_member(&self, member: &str) -> Result<Option<Value>, TwinError>;

    fn write_member(&mut self, member: &str, value: Value) -> Result<(), TwinError>;

    fn component(&self, _member: &str) -> Option<&dyn DynTwin> {
        None
    }

    /// Targets of a relationship member in iteration order.
    fn related(&self, _member: &str) -> Vec<&dyn DynTwin> {
        Vec::new()
    }
}

/// Object-safe view of a twin instance.
pub trait DynTwin: MemberAccess + Any + Debug + Send + Sync {
    fn twin_type(&self) -> &'static TwinDescriptor;

    fn header(&self) -> &TwinBase;

    fn header_mut(&mut self) -> &mut TwinBase;

    fn validate(&self) -> Result<(), TwinError>;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl dyn DynTwin {
    pub fn id(&self) -> &str {
        &self.header().id
    }

    pub fn downcast_ref<T: Twin>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast<T: Twin>(self: Box<Self>) -> Result<T, TwinError> {
        let actual = self.twin_type().type_name;
        self.into_any().downcast::<T>().map(|twin| *twin).map_err(|_| {
            TwinError::internal(format!("expected {}, found {actual}", type_name::<T>()))
        })
    }
}

pub trait Twin: DynTwin + Sized {
    fn descriptor() -> &'static TwinDescriptor;

    /// Every field at its zero value; no constructor or validation runs.
    fn blank() -> Self;
}

/// Per-type checks run after a document has been read into an instance.
pub trait TwinHooks {
    fn validate(&self) -> Result<(), TwinError> {
        Ok(())
    }
}

/// Field types usable as a `#[twin(component)]` member.
pub trait ComponentField {
    fn value_type() -> ValueType;

    fn component(&self) -> Option<&dyn DynTwin>;

    fn vacant() -> Self;
}

impl<T: Twin> ComponentField for Option<T> {
    fn value_type() -> ValueType {
        ValueType::Twin { target: T::descriptor, many: false }
    }

    fn component(&self) -> Option<&dyn DynTwin> {
        self.as_ref().map(|twin| twin as &dyn DynTwin)
    }

    fn vacant() -> Self {
        None
    }
}

/// A handle to another twin in the graph.
pub trait TwinRef {
    fn target() -> TwinLink;

    fn twin(&self) -> &dyn DynTwin;
}

impl<T: Twin> TwinRef for Arc<T> {
    fn target() -> TwinLink {
        T::descriptor
    }

    fn twin(&self) -> &dyn DynTwin {
        &**self
    }
}

/// Field types usable as a `#[twin(relationship)]` member.
pub trait RelationshipField {
    fn value_type() -> ValueType;

    fn targets(&self) -> Vec<&dyn DynTwin>;

    fn vacant() -> Self;
}

impl<R: TwinRef> RelationshipField for Option<R> {
    fn value_type() -> ValueType {
        ValueType::Twin { target: R::target(), many: false }
    }

    fn targets(&self) -> Vec<&dyn DynTwin> {
        self.iter().map(TwinRef::twin).collect()
    }

    fn vacant() -> Self {
        None
    }
}

impl<R: TwinRef> RelationshipField for Vec<R> {
    fn value_type() -> ValueType {
        ValueType::Twin { target: R::target(), many: true }
    }

    fn targets(&self) -> Vec<&dyn DynTwin> {
        self.iter().map(TwinRef::twin).collect()
    }

    fn vacant() -> Self {
        Self::new()
    }
}

impl<T: Twin> RelationshipField for Arc<T> {
    fn value_type() -> ValueType {
        ValueType::Twin { target: T::descriptor, many: false }
    }

    fn targets(&self) -> Vec<&dyn DynTwin> {
        vec![&**self as &dyn DynTwin]
    }

    fn vacant() -> Self {
        Self::new(T::blank())
    }
}

/// Factory stored in every descriptor.
pub fn blank_of<T: Twin>() -> Box<dyn DynTwin> {
    Box::new(T::blank())
}
