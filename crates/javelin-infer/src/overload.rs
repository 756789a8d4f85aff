//! Overload resolution: three-phase applicability, most-specific selection,
//! and the override-compatibility rules around varargs.
//!
//! Inheritance is modeled explicitly (candidates collected over the
//! supertype graph with substitution applied, class methods masking
//! interface methods of identical erasure) rather than through any host
//! dispatch: the resolution rules themselves are the subject here.

use std::collections::HashMap;

use javelin_types::format::{display_argument_types, display_method, display_type};
use javelin_types::{
    canonicalize_named, erasure, is_subtype, substitute, ClassId, ClassKind, ClassType, MethodDef,
    TyContext, Type, TypeEnv, Visibility,
};
use thiserror::Error;
use tracing::debug;

use crate::constraint::{infer, Inferred, Invocation, InvocationPhase};

/// A method invocation site.
pub struct CallSite<'a> {
    /// Static type of the receiver (or the enclosing class for unqualified
    /// static calls).
    pub receiver: Type,
    pub method_name: &'a str,
    pub args: &'a [Type],
    pub expected_return: Option<&'a Type>,
    /// Package of the calling compilation unit, for accessibility checks.
    pub caller_package: &'a str,
}

/// One inherited or declared candidate, with supertype substitution already
/// applied to its signature.
#[derive(Clone, Debug)]
pub struct Candidate {
    pub owner: ClassId,
    pub method: MethodDef,
    /// Declared directly in the receiver's static type (not inherited).
    pub declared_in_receiver: bool,
    pub from_interface: bool,
}

/// Successful resolution.
#[derive(Clone, Debug)]
pub struct Resolved {
    pub owner: ClassId,
    pub method: MethodDef,
    pub phase: InvocationPhase,
    pub inferred: Inferred,
}

#[derive(Clone, Debug, Error)]
pub enum ResolutionError {
    #[error("no method named {name}")]
    NoSuchMethod { name: String },
    #[error("method not applicable for the given arguments")]
    NotApplicable {
        owner: ClassId,
        method: MethodDef,
        args: Vec<Type>,
    },
    #[error("method is overridden by an inapplicable method")]
    InapplicableOverride { owner: ClassId, method: MethodDef },
    #[error("formal varargs element type is not accessible")]
    VarargsElementInaccessible { owner: ClassId, method: MethodDef },
    #[error("ambiguous method invocation")]
    Ambiguous { receiver: ClassId, name: String },
}

impl ResolutionError {
    /// Transcript-facing message text.
    pub fn message(&self, env: &dyn TypeEnv) -> String {
        let owner_name = |id: ClassId| {
            env.class(id)
                .map(|def| def.source_name())
                .unwrap_or_else(|| "<unknown>".to_string())
        };
        match self {
            ResolutionError::NoSuchMethod { name } => {
                format!("The method {name} is undefined")
            }
            ResolutionError::NotApplicable {
                owner,
                method,
                args,
            } => format!(
                "The method {} in the type {} is not applicable for the arguments {}",
                display_method(env, method),
                owner_name(*owner),
                display_argument_types(env, args),
            ),
            ResolutionError::InapplicableOverride { owner, method } => format!(
                "The method {} of type {} cannot be invoked as it is overridden by an inapplicable method",
                display_method(env, method),
                owner_name(*owner),
            ),
            ResolutionError::VarargsElementInaccessible { owner, method } => {
                let elem = varargs_element(method);
                format!(
                    "The method {} of type {} is not applicable as the formal varargs element type {} is not accessible here",
                    display_method(env, method),
                    owner_name(*owner),
                    display_type(env, &elem),
                )
            }
            ResolutionError::Ambiguous { receiver, name } => format!(
                "The method {} is ambiguous for the type {}",
                name,
                owner_name(*receiver),
            ),
        }
    }
}

fn varargs_element(method: &MethodDef) -> Type {
    match method.params.last() {
        Some(Type::Array(elem)) => (**elem).clone(),
        Some(other) => other.clone(),
        None => Type::Unknown,
    }
}

/// A class method and an interface method that share an erased signature but
/// disagree on varargs-ness. Binary compatibility requires overriding to
/// preserve varargs-ness and erasure, so this pair is flagged at declaration
/// time and drives the "overridden by an inapplicable method" outcome at
/// call sites.
#[derive(Clone, Debug)]
pub struct VarargsOverrideConflict {
    pub class_owner: ClassId,
    pub class_method: MethodDef,
    pub iface_owner: ClassId,
    pub iface_method: MethodDef,
}

impl VarargsOverrideConflict {
    pub fn message(&self, env: &dyn TypeEnv) -> String {
        format!(
            "Varargs methods should only override or be overridden by other varargs methods unlike {}.{} and {}.{}",
            env.class(self.class_owner)
                .map(|d| d.source_name())
                .unwrap_or_default(),
            erased_signature(env, &self.class_method),
            env.class(self.iface_owner)
                .map(|d| d.source_name())
                .unwrap_or_default(),
            erased_signature(env, &self.iface_method),
        )
    }
}

/// `foo(Object[])` or `foo(Object...)`: erased parameters, varargs shown
/// with an ellipsis.
fn erased_signature(env: &dyn TypeEnv, method: &MethodDef) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(method.params.len());
    for (idx, param) in method.params.iter().enumerate() {
        let erased = erasure(env, param);
        let last = idx + 1 == method.params.len();
        if last && method.is_varargs {
            let elem = match erased {
                Type::Array(elem) => *elem,
                other => other,
            };
            parts.push(format!("{}...", display_type(env, &elem)));
        } else {
            parts.push(display_type(env, &erased));
        }
    }
    format!("{}({})", method.name, parts.join(", "))
}

/// Collect the named candidates over the receiver's supertype graph,
/// substituting type arguments along the way. Class methods mask interface
/// methods of identical erasure; masked pairs whose varargs-ness disagrees
/// are returned separately.
pub fn collect_candidates(
    env: &dyn TypeEnv,
    receiver: &Type,
    name: &str,
) -> (Vec<Candidate>, Vec<VarargsOverrideConflict>) {
    let mut candidates: Vec<Candidate> = Vec::new();
    let mut conflicts: Vec<VarargsOverrideConflict> = Vec::new();

    let receiver = canonicalize_named(env, receiver);
    let Type::Class(ClassType { def: receiver_def, .. }) = &receiver else {
        return (candidates, conflicts);
    };
    let receiver_def = *receiver_def;

    // Breadth-first over the hierarchy, carrying instantiations.
    let mut queue: Vec<Type> = vec![receiver.clone()];
    let mut seen: Vec<ClassId> = Vec::new();
    while let Some(current) = queue.pop() {
        let Type::Class(ClassType { def, args }) = canonicalize_named(env, &current) else {
            continue;
        };
        if seen.contains(&def) {
            continue;
        }
        seen.push(def);
        let Some(class_def) = env.class(def) else {
            continue;
        };

        let mut subst: HashMap<_, _> = HashMap::new();
        if !args.is_empty() {
            for (idx, formal) in class_def.type_params.iter().copied().enumerate() {
                subst.insert(formal, args.get(idx).cloned().unwrap_or(Type::Unknown));
            }
        }

        for method in &class_def.methods {
            if method.name != name {
                continue;
            }
            let mut instantiated = method.clone();
            if !subst.is_empty() {
                instantiated.params = instantiated
                    .params
                    .iter()
                    .map(|p| substitute(p, &subst))
                    .collect();
                instantiated.return_type = substitute(&instantiated.return_type, &subst);
            }
            let candidate = Candidate {
                owner: def,
                method: instantiated,
                declared_in_receiver: def == receiver_def,
                from_interface: class_def.kind == ClassKind::Interface,
            };

            // A more-derived method of the same erasure masks this one.
            if let Some(existing) = candidates
                .iter()
                .find(|c| same_erasure(env, &c.method, &candidate.method))
            {
                if existing.method.is_varargs != candidate.method.is_varargs
                    && !existing.from_interface
                    && candidate.from_interface
                {
                    conflicts.push(VarargsOverrideConflict {
                        class_owner: existing.owner,
                        class_method: existing.method.clone(),
                        iface_owner: candidate.owner,
                        iface_method: candidate.method.clone(),
                    });
                }
                continue;
            }
            candidates.push(candidate);
        }

        // Classes before interfaces: pop() takes the back, so push
        // interfaces first.
        for iface in &class_def.interfaces {
            queue.insert(0, substitute(iface, &subst));
        }
        if let Some(sc) = &class_def.super_class {
            queue.push(substitute(sc, &subst));
        }
    }

    (candidates, conflicts)
}

fn same_erasure(env: &dyn TypeEnv, a: &MethodDef, b: &MethodDef) -> bool {
    if a.params.len() != b.params.len() {
        return false;
    }
    a.params
        .iter()
        .zip(b.params.iter())
        .all(|(pa, pb)| erasure(env, pa) == erasure(env, pb))
}

/// Resolve `call` per the three-phase applicability algorithm, stopping at
/// the first phase with applicable candidates and tie-breaking by
/// most-specific.
pub fn resolve(env: &dyn TypeEnv, call: &CallSite<'_>) -> Result<Resolved, ResolutionError> {
    let mut ctx = TyContext::new(env);
    let receiver = ctx.capture_conversion(&canonicalize_named(env, &call.receiver));
    let Type::Class(ClassType { def: receiver_def, .. }) = receiver.clone() else {
        return Err(ResolutionError::NoSuchMethod {
            name: call.method_name.to_string(),
        });
    };

    let (candidates, conflicts) = collect_candidates(&ctx, &receiver, call.method_name);
    if candidates.is_empty() && conflicts.is_empty() {
        return Err(ResolutionError::NoSuchMethod {
            name: call.method_name.to_string(),
        });
    }

    for phase in [
        InvocationPhase::Strict,
        InvocationPhase::Loose,
        InvocationPhase::Varargs,
    ] {
        let mut applicable: Vec<(usize, Inferred)> = Vec::new();
        for (idx, candidate) in candidates.iter().enumerate() {
            if phase.allows_varargs() && !candidate.method.is_varargs {
                continue;
            }
            let invocation = Invocation {
                owner: candidate.owner,
                method: &candidate.method,
                args: call.args,
                expected_return: call.expected_return,
            };
            if let Ok(inferred) = infer(&ctx, &invocation, phase) {
                applicable.push((idx, inferred));
            }
        }
        if applicable.is_empty() {
            continue;
        }
        debug!(?phase, count = applicable.len(), "applicable candidates");

        let chosen = most_specific(&ctx, &candidates, applicable);
        let (idx, inferred) = match chosen {
            Ok(chosen) => chosen,
            Err(()) => {
                return Err(ResolutionError::Ambiguous {
                    receiver: receiver_def,
                    name: call.method_name.to_string(),
                })
            }
        };
        let candidate = &candidates[idx];

        if phase.allows_varargs() {
            check_varargs_accessibility(&ctx, candidate, &inferred, call.caller_package)?;
        }

        return Ok(Resolved {
            owner: candidate.owner,
            method: candidate.method.clone(),
            phase,
            inferred,
        });
    }

    // Nothing applicable. If an interface method masked by an erasure-equal
    // class method would have been applicable, the failure is the masking,
    // not the arguments.
    for conflict in &conflicts {
        let invocation = Invocation {
            owner: conflict.iface_owner,
            method: &conflict.iface_method,
            args: call.args,
            expected_return: call.expected_return,
        };
        let iface_applicable = [
            InvocationPhase::Strict,
            InvocationPhase::Loose,
            InvocationPhase::Varargs,
        ]
        .into_iter()
        .any(|phase| {
            (!phase.allows_varargs() || conflict.iface_method.is_varargs)
                && infer(&ctx, &invocation, phase).is_ok()
        });
        if !iface_applicable {
            continue;
        }
        let masking_declared_here = candidates
            .iter()
            .any(|c| c.declared_in_receiver && same_erasure(&ctx, &c.method, &conflict.iface_method));
        if masking_declared_here {
            return Err(ResolutionError::NotApplicable {
                owner: conflict.class_owner,
                method: conflict.class_method.clone(),
                args: call.args.to_vec(),
            });
        }
        return Err(ResolutionError::InapplicableOverride {
            owner: conflict.iface_owner,
            method: conflict.iface_method.clone(),
        });
    }

    let first = candidates
        .first()
        .ok_or_else(|| ResolutionError::NoSuchMethod {
            name: call.method_name.to_string(),
        })?;
    Err(ResolutionError::NotApplicable {
        owner: first.owner,
        method: first.method.clone(),
        args: call.args.to_vec(),
    })
}

/// Formal varargs element type accessibility (from the caller's point of
/// view), checked only when the varargs phase actually chose the method.
fn check_varargs_accessibility(
    env: &dyn TypeEnv,
    candidate: &Candidate,
    inferred: &Inferred,
    caller_package: &str,
) -> Result<(), ResolutionError> {
    let elem = varargs_element(&candidate.method);
    let elem = substitute(&elem, &inferred.substitution);
    let erased = erasure(env, &elem);
    if let Type::Class(ClassType { def, .. }) = erased {
        if let Some(class_def) = env.class(def) {
            if class_def.visibility == Visibility::Package && class_def.package() != caller_package
            {
                return Err(ResolutionError::VarargsElementInaccessible {
                    owner: candidate.owner,
                    method: candidate.method.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Most-specific selection among the applicable candidates of one phase.
/// Prefers pointwise more-specific parameter types, then non-generic over
/// generic, then the more derived declaring type. `Err(())` = ambiguous.
fn most_specific(
    env: &dyn TypeEnv,
    candidates: &[Candidate],
    applicable: Vec<(usize, Inferred)>,
) -> Result<(usize, Inferred), ()> {
    if applicable.len() == 1 {
        let mut applicable = applicable;
        return Ok(applicable.remove(0));
    }

    let mut survivors: Vec<(usize, Inferred)> = Vec::new();
    'outer: for (idx, inferred) in &applicable {
        for (other_idx, other_inferred) in &applicable {
            if idx == other_idx {
                continue;
            }
            let this = (&candidates[*idx], inferred);
            let other = (&candidates[*other_idx], other_inferred);
            if beats(env, other, this) && !beats(env, this, other) {
                continue 'outer;
            }
        }
        survivors.push((*idx, inferred.clone()));
    }

    match survivors.len() {
        1 => Ok(survivors.pop().expect("length checked")),
        _ => Err(()),
    }
}

/// Is `a` strictly preferable to `b`?
fn beats(
    env: &dyn TypeEnv,
    a: (&Candidate, &Inferred),
    b: (&Candidate, &Inferred),
) -> bool {
    let (a_cand, a_inf) = a;
    let (b_cand, b_inf) = b;
    if a_inf.params.len() != b_inf.params.len() {
        return false;
    }

    let pointwise = a_inf
        .params
        .iter()
        .zip(b_inf.params.iter())
        .all(|(pa, pb)| is_subtype(env, pa, pb));
    let identical = a_inf.params == b_inf.params;

    if pointwise && !identical {
        return true;
    }
    if identical {
        // Same formals: non-generic beats generic.
        if !a_cand.method.is_generic() && b_cand.method.is_generic() {
            return true;
        }
        // Then the more derived declaring type.
        if a_cand.owner != b_cand.owner
            && is_subtype(
                env,
                &Type::class(a_cand.owner, vec![]),
                &Type::class(b_cand.owner, vec![]),
            )
        {
            return true;
        }
    }
    false
}

/// Generic varargs whose element type is not reifiable create potential heap
/// pollution; reported at the declaration from source level 7 on.
pub fn is_potentially_polluting_varargs(method: &MethodDef) -> bool {
    if !method.is_varargs {
        return false;
    }
    fn non_reifiable(ty: &Type) -> bool {
        match ty {
            Type::TypeVar(_) => true,
            Type::Class(ClassType { args, .. }) => {
                !args.is_empty()
                    && !args.iter().all(|a| {
                        matches!(a, Type::Wildcard(javelin_types::WildcardBound::Unbounded))
                    })
            }
            Type::Array(elem) => non_reifiable(elem),
            _ => false,
        }
    }
    non_reifiable(&varargs_element(method))
}

pub fn heap_pollution_message(param_name: &str) -> String {
    format!("Type safety: Potential heap pollution via varargs parameter {param_name}")
}

/// Type parameters of a method never referenced by its signature.
pub fn unused_type_params(method: &MethodDef) -> Vec<javelin_types::TypeVarId> {
    fn mentions(ty: &Type, var: javelin_types::TypeVarId) -> bool {
        match ty {
            Type::TypeVar(id) => *id == var,
            Type::Class(ClassType { args, .. }) => args.iter().any(|a| mentions(a, var)),
            Type::Wildcard(javelin_types::WildcardBound::Extends(b))
            | Type::Wildcard(javelin_types::WildcardBound::Super(b)) => mentions(b, var),
            Type::Array(elem) => mentions(elem, var),
            Type::Intersection(parts) => parts.iter().any(|p| mentions(p, var)),
            _ => false,
        }
    }
    method
        .type_params
        .iter()
        .copied()
        .filter(|var| {
            !method.params.iter().any(|p| mentions(p, *var))
                && !mentions(&method.return_type, *var)
        })
        .collect()
}

pub fn unused_type_param_message(env: &dyn TypeEnv, var: javelin_types::TypeVarId) -> String {
    format!(
        "Unused type parameter {}",
        javelin_types::format::type_param_name(env, var)
    )
}

/// Per-class declaration check: every varargs/non-varargs override pair in
/// the supertype graph of `class_id`, for the declaration-site warnings.
pub fn check_varargs_override_consistency(
    env: &dyn TypeEnv,
    class_id: ClassId,
) -> Vec<VarargsOverrideConflict> {
    if env.class(class_id).is_none() {
        return Vec::new();
    }
    let mut names: Vec<&str> = Vec::new();
    collect_method_names(env, class_id, &mut names);

    let mut out = Vec::new();
    names.sort_unstable();
    names.dedup();
    for name in names {
        let (_, conflicts) = collect_candidates(env, &Type::class(class_id, vec![]), name);
        for conflict in conflicts {
            if !out
                .iter()
                .any(|existing: &VarargsOverrideConflict| {
                    existing.class_owner == conflict.class_owner
                        && existing.iface_owner == conflict.iface_owner
                        && existing.class_method.name == conflict.class_method.name
                })
            {
                out.push(conflict);
            }
        }
    }
    out
}

fn collect_method_names<'e>(env: &'e dyn TypeEnv, class_id: ClassId, out: &mut Vec<&'e str>) {
    let mut queue = vec![class_id];
    let mut seen = Vec::new();
    while let Some(current) = queue.pop() {
        if seen.contains(&current) {
            continue;
        }
        seen.push(current);
        let Some(def) = env.class(current) else {
            continue;
        };
        for method in &def.methods {
            out.push(&method.name);
        }
        for sup in def.super_class.iter().chain(def.interfaces.iter()) {
            if let Type::Class(ClassType { def, .. }) = canonicalize_named(env, sup) {
                queue.push(def);
            }
        }
    }
}

// Integration-style tests for this module live in `tests/overload.rs`; the
// inline tests cover the helpers.
#[cfg(test)]
mod tests {
    use super::*;
    use javelin_types::{ClassDef, TypeStore};

    #[test]
    fn erased_signature_renders_varargs_with_ellipsis() {
        let mut store = TypeStore::with_minimal_jdk();
        let wk = *store.well_known();
        let object = Type::class(wk.object, vec![]);
        let t = store.add_type_param("T", vec![object.clone()]);

        let varargs = MethodDef::new("foo", vec![Type::array(Type::TypeVar(t))], Type::Void)
            .varargs()
            .with_type_params(vec![t]);
        assert_eq!(erased_signature(&store, &varargs), "foo(Object...)");

        let plain = MethodDef::new("foo", vec![Type::array(object)], Type::Void);
        assert_eq!(erased_signature(&store, &plain), "foo(Object[])");
    }

    #[test]
    fn generic_varargs_is_potentially_polluting() {
        let mut store = TypeStore::with_minimal_jdk();
        let wk = *store.well_known();
        let object = Type::class(wk.object, vec![]);
        let t = store.add_type_param("T", vec![object.clone()]);

        let generic = MethodDef::new("foo", vec![Type::array(Type::TypeVar(t))], Type::Void)
            .varargs()
            .with_type_params(vec![t]);
        assert!(is_potentially_polluting_varargs(&generic));

        let reifiable = MethodDef::new("foo", vec![Type::array(object)], Type::Void).varargs();
        assert!(!is_potentially_polluting_varargs(&reifiable));
    }

    #[test]
    fn unused_type_param_detection() {
        let mut store = TypeStore::with_minimal_jdk();
        let wk = *store.well_known();
        let object = Type::class(wk.object, vec![]);
        let s = store.add_type_param("S", vec![object.clone()]);

        let method = MethodDef::new("ph", vec![Type::Primitive(javelin_types::PrimitiveType::Int)], Type::Void)
            .with_type_params(vec![s]);
        assert_eq!(unused_type_params(&method), vec![s]);
        assert_eq!(unused_type_param_message(&store, s), "Unused type parameter S");

        let used = MethodDef::new("id", vec![Type::TypeVar(s)], Type::TypeVar(s))
            .with_type_params(vec![s]);
        assert!(unused_type_params(&used).is_empty());
    }

    #[test]
    fn candidates_are_substituted_through_generic_supertypes() {
        let store = TypeStore::with_minimal_jdk();
        let wk = store.well_known();
        let string = Type::class(wk.string, vec![]);
        let receiver = Type::class(wk.array_list, vec![string.clone()]);

        let (candidates, _) = collect_candidates(&store, &receiver, "add");
        assert!(!candidates.is_empty());
        // List<E>.add(E) instantiated at String.
        assert_eq!(candidates[0].method.params, vec![string]);
    }

    #[test]
    fn class_method_masks_interface_method_of_same_erasure() {
        let mut store = TypeStore::with_minimal_jdk();
        let wk = *store.well_known();
        let object = Type::class(wk.object, vec![]);
        let t = store.add_type_param("T", vec![object.clone()]);

        let mut iface = ClassDef::new("I", ClassKind::Interface, None);
        iface.methods = vec![MethodDef::new(
            "foo",
            vec![Type::array(Type::TypeVar(t))],
            Type::Void,
        )
        .abstract_()
        .varargs()
        .with_type_params(vec![t])];
        let iface_id = store.add_class(iface);

        let mut class = ClassDef::new("A", ClassKind::Class, Some(object.clone()));
        class.interfaces = vec![Type::class(iface_id, vec![])];
        class.methods = vec![MethodDef::new("foo", vec![Type::array(object)], Type::Void)];
        let class_id = store.add_class(class);

        let (candidates, conflicts) =
            collect_candidates(&store, &Type::class(class_id, vec![]), "foo");
        assert_eq!(candidates.len(), 1, "interface method is masked");
        assert_eq!(candidates[0].owner, class_id);
        assert_eq!(conflicts.len(), 1, "varargs mismatch is recorded");
    }
}
