#![forbid(unsafe_code)]

//! Class-file-level vocabulary for the lambda bootstrap machinery: method and
//! field descriptors, and the bootstrap-methods attribute model with its
//! javap-like dump format.
//!
//! This crate deliberately does not read or write whole class files; the
//! bootstrap table is produced by code generation and consumed by tests and
//! embedders through the dump format.

mod bootstrap;
mod descriptor;
mod error;

pub use crate::bootstrap::{
    alt_metafactory_ref, metafactory_ref, BootstrapArg, BootstrapEntry, BootstrapMethods,
    MethodRef, ReferenceKind,
};
pub use crate::descriptor::{parse_field_descriptor, parse_method_descriptor};
pub use crate::descriptor::{BaseType, FieldType, MethodDescriptor, ReturnType};
pub use crate::error::{Error, Result};
