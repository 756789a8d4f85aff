//! Lambda and method-reference instantiation at the class-file level: the
//! bootstrap-method entries `invokedynamic` sites link through, and the
//! per-class deserialization dispatcher serializable lambdas need.
//!
//! One [`ClassLambdaSynthesizer`] exists per enclosing class being
//! generated; it owns the `lambda$N` counter, the bootstrap method table
//! (indices in first-use order) and the lazily created dispatcher.

mod descriptor;
mod dispatcher;
mod synthesizer;

pub use crate::descriptor::{field_type_of, method_descriptor_of};
pub use crate::dispatcher::{
    CapturedValue, DeserializationError, DeserializeDispatcher, DispatchCase, ReconstructedLambda,
    SerializedLambdaRecord, DESERIALIZE_METHOD_NAME,
};
pub use crate::synthesizer::{ClassLambdaSynthesizer, LambdaSite, SynthesisError, SynthesizedLambda};
