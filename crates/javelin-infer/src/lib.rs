//! Generic type inference, overload resolution and raw-type analysis.
//!
//! The crate is organized around per-invocation values: a
//! [`constraint::Invocation`] plus a phase go in, a substitution (or a typed
//! failure) comes out, and nothing is cached between calls. Compiler options
//! are passed explicitly wherever behavior is configurable.

pub mod constraint;
pub mod diamond;
pub mod overload;
pub mod raw;

pub use crate::constraint::{
    check_type_arguments, compatible, infer, infer_with_vars, BoundMismatch, Compat, Inferred,
    InferenceFailure, Invocation, InvocationPhase, Substitution,
};
pub use crate::diamond::{check_diamond, infer_diamond, DiamondPosition};
pub use crate::overload::{
    check_varargs_override_consistency, collect_candidates, heap_pollution_message,
    is_potentially_polluting_varargs, resolve, unused_type_param_message, unused_type_params,
    CallSite, Candidate, Resolved, ResolutionError, VarargsOverrideConflict,
};
pub use crate::raw::{OverrideContext, RawTypeAnalyzer, RawUsage};
