use javelin_classfile::{
    alt_metafactory_ref, metafactory_ref, BootstrapArg, BootstrapEntry, BootstrapMethods,
    FieldType, MethodRef, ReferenceKind,
};
use javelin_types::{
    canonicalize_named, is_subtype, sam_method, ClassId, ClassType, Type, TypeEnv,
};
use thiserror::Error;
use tracing::debug;

use crate::descriptor::{field_type_of, method_descriptor_of};
use crate::dispatcher::{DeserializeDispatcher, DispatchCase};

/// `altMetafactory` flag word bits (java.lang.invoke.LambdaMetafactory).
const FLAG_SERIALIZABLE: i32 = 1 << 0;
const FLAG_MARKERS: i32 = 1 << 1;

/// One lambda or method-reference expression at code-generation time.
pub struct LambdaSite {
    /// The functional-interface target: a plain interface type or an
    /// intersection from an explicit cast `(I1 & I2 & ...)`.
    pub target: Type,
    /// Descriptors of captured variables, in capture order. The implicit
    /// receiver is *not* listed here.
    pub captures: Vec<FieldType>,
    /// The lambda body references the enclosing instance; the receiver
    /// occupies captured-argument slot 0 at deserialization time.
    pub captures_this: bool,
}

/// The synthesized artifacts for one lambda site.
#[derive(Clone, Debug, PartialEq)]
pub struct SynthesizedLambda {
    pub impl_method_name: String,
    pub impl_descriptor: String,
    pub sam_interface: ClassId,
    pub sam_method_name: String,
    pub sam_descriptor: String,
    pub serializable: bool,
    /// Marker interface internal names, in declaration order.
    pub markers: Vec<String>,
    pub bootstrap_index: u16,
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum SynthesisError {
    #[error("the target type is not a functional interface")]
    TargetNotFunctional,
}

/// Per-enclosing-class lambda synthesis state: the `lambda$N` counter (one
/// counter per class, shared by static/instance/field positions), the
/// bootstrap method table, and the deserialization dispatcher created
/// lazily on the first serializable lambda.
pub struct ClassLambdaSynthesizer<'e> {
    env: &'e dyn TypeEnv,
    class_internal_name: String,
    counter: u32,
    bootstrap: BootstrapMethods,
    dispatcher: Option<DeserializeDispatcher>,
}

impl<'e> ClassLambdaSynthesizer<'e> {
    pub fn new(env: &'e dyn TypeEnv, class_internal_name: impl Into<String>) -> Self {
        Self {
            env,
            class_internal_name: class_internal_name.into(),
            counter: 0,
            bootstrap: BootstrapMethods::new(),
            dispatcher: None,
        }
    }

    pub fn bootstrap_methods(&self) -> &BootstrapMethods {
        &self.bootstrap
    }

    /// The dispatcher, if any lambda in this class was serializable.
    pub fn dispatcher(&self) -> Option<&DeserializeDispatcher> {
        self.dispatcher.as_ref()
    }

    /// Process one lambda site: determine the SAM and markers, decide
    /// serializability, emit the bootstrap entry, and extend the dispatcher
    /// when needed.
    pub fn synthesize(&mut self, site: &LambdaSite) -> Result<SynthesizedLambda, SynthesisError> {
        // COLLECT_TARGET_TYPE: the SAM is the first functional interface in
        // the intersection, wherever it is listed.
        let parts: Vec<Type> = match &site.target {
            Type::Intersection(parts) => parts.clone(),
            other => vec![other.clone()],
        };
        let mut sam = None;
        for part in &parts {
            if let Some(found) = sam_method(self.env, part) {
                let Type::Class(ClassType { def, .. }) = canonicalize_named(self.env, part) else {
                    continue;
                };
                sam = Some((def, found));
                break;
            }
        }
        let (sam_interface, sam) = sam.ok_or(SynthesisError::TargetNotFunctional)?;

        // RESOLVE_MARKER_INTERFACES: everything else except Serializable, in
        // declaration order, duplicates dropped.
        let serializable_id = self.env.well_known().serializable;
        let mut markers: Vec<String> = Vec::new();
        for part in &parts {
            let Type::Class(ClassType { def, .. }) = canonicalize_named(self.env, part) else {
                continue;
            };
            if def == sam_interface || def == serializable_id {
                continue;
            }
            let Some(class_def) = self.env.class(def) else {
                continue;
            };
            let internal = class_def.internal_name();
            if !markers.contains(&internal) {
                markers.push(internal);
            }
        }

        // DETERMINE_SERIALIZABLE: the SAM extends Serializable, or
        // Serializable is listed explicitly in the intersection.
        let serializable_ty = Type::class(serializable_id, vec![]);
        let serializable = parts.iter().any(|part| {
            matches!(
                canonicalize_named(self.env, part),
                Type::Class(ClassType { def, .. }) if def == serializable_id
            )
        }) || is_subtype(
            self.env,
            &Type::class(sam_interface, vec![]),
            &serializable_ty,
        );

        // EMIT_BOOTSTRAP_ENTRY.
        let sam_descriptor = method_descriptor_of(self.env, &sam.params, &sam.return_type);
        let impl_params: Vec<FieldType> = site.captures.clone();
        let impl_descriptor = {
            let sam_desc = javelin_classfile::parse_method_descriptor(&sam_descriptor)
                .expect("descriptor built from erased types is well-formed");
            sam_desc.with_prefix_params(&impl_params).to_string()
        };
        let impl_method_name = format!("lambda${}", self.counter);
        self.counter += 1;

        let impl_handle = BootstrapArg::MethodHandle(
            ReferenceKind::InvokeStatic,
            MethodRef::new(
                self.class_internal_name.clone(),
                impl_method_name.clone(),
                impl_descriptor.clone(),
            ),
        );
        let mut args = vec![
            BootstrapArg::MethodType(sam_descriptor.clone()),
            impl_handle,
            BootstrapArg::MethodType(sam_descriptor.clone()),
        ];
        let extended = serializable || !markers.is_empty();
        let method = if extended {
            let mut flags = 0;
            if serializable {
                flags |= FLAG_SERIALIZABLE;
            }
            if !markers.is_empty() {
                flags |= FLAG_MARKERS;
            }
            args.push(BootstrapArg::Integer(flags));
            if !markers.is_empty() {
                args.push(BootstrapArg::Integer(markers.len() as i32));
                for marker in &markers {
                    args.push(BootstrapArg::ClassName(marker.clone()));
                }
            }
            alt_metafactory_ref()
        } else {
            metafactory_ref()
        };
        let bootstrap_index = self.bootstrap.push(BootstrapEntry {
            kind: ReferenceKind::InvokeStatic,
            method,
            args,
        });
        debug!(
            index = bootstrap_index,
            name = %impl_method_name,
            serializable,
            markers = markers.len(),
            "emitted bootstrap entry"
        );

        // ENSURE_DISPATCHER: one per class, created on the first
        // serializable lambda, extended for each subsequent one.
        if serializable {
            let sam_class_internal = self
                .env
                .class(sam_interface)
                .map(|def| def.internal_name())
                .unwrap_or_default();
            let dispatcher = self
                .dispatcher
                .get_or_insert_with(|| DeserializeDispatcher::new(&self.class_internal_name));
            dispatcher.add_case(DispatchCase {
                impl_method_name: impl_method_name.clone(),
                impl_method_signature: impl_descriptor.clone(),
                sam_interface: sam_class_internal,
                sam_method_name: sam.name.clone(),
                sam_method_signature: sam_descriptor.clone(),
                captures_this: site.captures_this,
                capture_count: site.captures.len(),
            });
        }

        Ok(SynthesizedLambda {
            impl_method_name,
            impl_descriptor,
            sam_interface,
            sam_method_name: sam.name,
            sam_descriptor,
            serializable,
            markers,
            bootstrap_index,
        })
    }
}
