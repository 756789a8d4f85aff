use std::collections::{HashMap, HashSet, VecDeque};

use crate::{
    canonicalize_named, substitute, ClassId, ClassKind, ClassType, PrimitiveType, TyContext, Type,
    TypeEnv, TypeVarId, WildcardBound,
};

/// Widening primitive conversion (JLS 5.1.2). Identity is included.
pub fn primitive_widens(from: PrimitiveType, to: PrimitiveType) -> bool {
    use PrimitiveType::*;
    if from == to {
        return true;
    }
    let widened: &[PrimitiveType] = match from {
        Byte => &[Short, Int, Long, Float, Double],
        Short => &[Int, Long, Float, Double],
        Char => &[Int, Long, Float, Double],
        Int => &[Long, Float, Double],
        Long => &[Float, Double],
        Float => &[Double],
        Double | Boolean => &[],
    };
    widened.contains(&to)
}

/// Subtype check against a fresh capture context.
///
/// Wildcard-parameterized subjects are capture-converted before the check, so
/// `A extends SelfBound<?, A>` is assignable to
/// `SelfBound<? extends SelfBound<?, A>, ?>` the way direct assignment,
/// locals, fields and argument passing all agree on.
pub fn is_subtype(env: &dyn TypeEnv, sub: &Type, sup: &Type) -> bool {
    let mut ctx = TyContext::new(env);
    is_subtype_in(&mut ctx, sub, sup)
}

pub(crate) fn is_subtype_in(ctx: &mut TyContext<'_>, sub: &Type, sup: &Type) -> bool {
    let mut seen = HashSet::new();
    subtype_rec(ctx, sub, sup, &mut seen)
}

fn subtype_rec(
    ctx: &mut TyContext<'_>,
    sub: &Type,
    sup: &Type,
    seen: &mut HashSet<TypeVarId>,
) -> bool {
    let sub = canonicalize_named(ctx, sub);
    let sup = canonicalize_named(ctx, sup);

    if sub == sup {
        return true;
    }
    // Errorish types poison nothing: stay permissive so one failure does not
    // cascade into unrelated diagnostics.
    if sub.is_errorish() || sup.is_errorish() {
        return true;
    }

    if let Type::Class(ClassType { def, args }) = &sup {
        if *def == ctx.well_known().object && args.is_empty() {
            return sub.is_reference();
        }
    }

    match (&sub, &sup) {
        (Type::Primitive(a), Type::Primitive(b)) => primitive_widens(*a, *b),
        (Type::Primitive(_), _) | (_, Type::Primitive(_)) => false,
        (Type::Void, _) | (_, Type::Void) => false,

        (Type::Null, _) => sup.is_reference(),

        // Intersections decompose before type variables, so a variable with
        // several bounds can satisfy the components of an intersection
        // target through different bounds.
        (_, Type::Intersection(parts)) => {
            let parts = parts.clone();
            parts.iter().all(|part| subtype_rec(ctx, &sub, part, seen))
        }
        (Type::Intersection(parts), _) => {
            let parts = parts.clone();
            parts.iter().any(|part| subtype_rec(ctx, part, &sup, seen))
        }

        (Type::TypeVar(id), _) => {
            if !seen.insert(*id) {
                return false;
            }
            let bounds = ctx
                .type_param(*id)
                .map(|def| def.upper_bounds.clone())
                .unwrap_or_default();
            let found = bounds
                .iter()
                .any(|bound| subtype_rec(ctx, bound, &sup, seen));
            seen.remove(id);
            found
        }

        (_, Type::TypeVar(id)) => {
            // Only a lower-bounded (capture) variable admits subtypes.
            let lower = ctx.type_param(*id).and_then(|def| def.lower_bound.clone());
            match lower {
                Some(lower) => subtype_rec(ctx, &sub, &lower, seen),
                None => false,
            }
        }

        (Type::Array(sub_elem), Type::Array(sup_elem)) => match (&**sub_elem, &**sup_elem) {
            (Type::Primitive(a), Type::Primitive(b)) => a == b,
            (Type::Primitive(_), _) | (_, Type::Primitive(_)) => false,
            // Reference arrays are covariant.
            (a, b) => subtype_rec(ctx, a, b, seen),
        },
        (Type::Array(_), Type::Class(ClassType { def, .. })) => {
            let wk = ctx.well_known();
            *def == wk.object || *def == wk.cloneable || *def == wk.serializable
        }

        (Type::Class(sub_class), Type::Class(sup_class)) => {
            class_subtype(ctx, sub_class, sup_class, seen)
        }

        _ => false,
    }
}

fn class_subtype(
    ctx: &mut TyContext<'_>,
    sub: &ClassType,
    target: &ClassType,
    seen: &mut HashSet<TypeVarId>,
) -> bool {
    // Assignment-style conversion captures the subject's wildcards first.
    let captured = ctx.capture_conversion(&Type::Class(sub.clone()));

    let Some(instantiated) = instantiate_as_supertype(ctx, &captured, target.def) else {
        return false;
    };
    let Type::Class(ClassType { args: sub_args, .. }) = instantiated else {
        return false;
    };

    if target.args.is_empty() {
        // Raw target accepts any instantiation of the same class.
        return true;
    }
    if sub_args.len() != target.args.len() {
        // Raw subject (or malformed instantiation) needs unchecked
        // conversion, which is not subtyping.
        return false;
    }

    target
        .args
        .iter()
        .zip(sub_args.iter())
        .all(|(target_arg, sub_arg)| contains(ctx, target_arg, sub_arg, seen))
}

/// Type-argument containment (JLS 4.5.1): does `target_arg` contain
/// `sub_arg`?
fn contains(
    ctx: &mut TyContext<'_>,
    target_arg: &Type,
    sub_arg: &Type,
    seen: &mut HashSet<TypeVarId>,
) -> bool {
    let target_arg = canonicalize_named(ctx, target_arg);
    let sub_arg = canonicalize_named(ctx, sub_arg);
    if target_arg == sub_arg {
        return true;
    }
    if target_arg.is_errorish() || sub_arg.is_errorish() {
        return true;
    }

    let object = Type::class(ctx.well_known().object, vec![]);
    match &target_arg {
        Type::Wildcard(WildcardBound::Unbounded) => true,
        Type::Wildcard(WildcardBound::Extends(upper)) => {
            let upper = (**upper).clone();
            match &sub_arg {
                // `? extends S` fits under `? extends T` iff S <: T; an
                // unbounded or super wildcard only fits when T is Object.
                Type::Wildcard(WildcardBound::Extends(sub_upper)) => {
                    let sub_upper = (**sub_upper).clone();
                    subtype_rec(ctx, &sub_upper, &upper, seen)
                }
                Type::Wildcard(_) => subtype_rec(ctx, &object, &upper, seen),
                concrete => subtype_rec(ctx, concrete, &upper, seen),
            }
        }
        Type::Wildcard(WildcardBound::Super(lower)) => {
            let lower = (**lower).clone();
            match &sub_arg {
                // `? super S` fits under `? super T` iff T <: S.
                Type::Wildcard(WildcardBound::Super(sub_lower)) => {
                    let sub_lower = (**sub_lower).clone();
                    subtype_rec(ctx, &lower, &sub_lower, seen)
                }
                Type::Wildcard(_) => false,
                concrete => subtype_rec(ctx, &lower, concrete, seen),
            }
        }
        // Invariant position: only structural equality (checked above).
        _ => false,
    }
}

/// View `ty` as an instantiation of `target` by walking the supertype graph
/// and applying type-argument substitution along the way.
///
/// Best-effort: missing class metadata returns `None`, never panics. Raw
/// instantiations stay raw while walking (no type arguments can be
/// recovered through a raw supertype).
pub fn instantiate_as_supertype(env: &dyn TypeEnv, ty: &Type, target: ClassId) -> Option<Type> {
    let mut seen_type_vars = HashSet::new();
    instantiate_inner(env, ty, target, &mut seen_type_vars)
}

fn instantiate_inner(
    env: &dyn TypeEnv,
    ty: &Type,
    target: ClassId,
    seen_type_vars: &mut HashSet<TypeVarId>,
) -> Option<Type> {
    match ty {
        Type::Array(_) => {
            let wk = env.well_known();
            if target == wk.object || target == wk.cloneable || target == wk.serializable {
                return Some(Type::class(target, vec![]));
            }
            return None;
        }
        Type::Intersection(parts) => {
            let mut sorted: Vec<&Type> = parts.iter().collect();
            sorted.sort_by_cached_key(|part| crate::type_sort_key(env, part));
            for part in sorted {
                if let Some(found) = instantiate_inner(env, part, target, seen_type_vars) {
                    return Some(found);
                }
            }
            return None;
        }
        Type::TypeVar(id) => {
            if !seen_type_vars.insert(*id) {
                return None;
            }
            let bounds = env
                .type_param(*id)
                .map(|def| def.upper_bounds.clone())
                .unwrap_or_default();
            let mut found = None;
            for bound in &bounds {
                if let Some(instantiated) = instantiate_inner(env, bound, target, seen_type_vars) {
                    found = Some(instantiated);
                    break;
                }
            }
            seen_type_vars.remove(id);
            return found;
        }
        _ => {}
    }

    let ty = canonicalize_named(env, ty);
    let Type::Class(ClassType { def, args }) = ty else {
        return None;
    };

    let mut queue: VecDeque<Type> = VecDeque::new();
    let mut seen: HashSet<(ClassId, Vec<Type>)> = HashSet::new();
    queue.push_back(Type::class(def, args));

    while let Some(current) = queue.pop_front() {
        let Type::Class(ClassType { def, args }) = current.clone() else {
            continue;
        };
        if !seen.insert((def, args.clone())) {
            continue;
        }

        if def == target {
            return Some(current);
        }

        let Some(class_def) = env.class(def) else {
            continue;
        };

        let raw = args.is_empty() && !class_def.type_params.is_empty();
        if raw {
            if let Some(sc) = &class_def.super_class {
                if let Some(raw_sc) = raw_class_type(env, sc) {
                    queue.push_back(raw_sc);
                }
            }
            let mut ifaces: Vec<Type> = class_def
                .interfaces
                .iter()
                .filter_map(|iface| raw_class_type(env, iface))
                .collect();
            ifaces.sort_by_cached_key(|iface| crate::type_sort_key(env, iface));
            for iface in ifaces {
                queue.push_back(iface);
            }
            if class_def.kind == ClassKind::Interface {
                queue.push_back(Type::class(env.well_known().object, vec![]));
            }
            continue;
        }

        let mut subst: HashMap<TypeVarId, Type> =
            HashMap::with_capacity(class_def.type_params.len());
        for (idx, formal) in class_def.type_params.iter().copied().enumerate() {
            subst.insert(formal, args.get(idx).cloned().unwrap_or(Type::Unknown));
        }

        if let Some(sc) = &class_def.super_class {
            let sc = canonicalize_named(env, &substitute(sc, &subst));
            queue.push_back(sc);
        }
        let mut ifaces: Vec<Type> = class_def
            .interfaces
            .iter()
            .map(|iface| canonicalize_named(env, &substitute(iface, &subst)))
            .collect();
        ifaces.sort_by_cached_key(|iface| crate::type_sort_key(env, iface));
        for iface in ifaces {
            queue.push_back(iface);
        }

        // Every interface implicitly has `Object` as a supertype (JLS 4.10.2).
        if class_def.kind == ClassKind::Interface {
            queue.push_back(Type::class(env.well_known().object, vec![]));
        }
    }

    None
}

fn raw_class_type(env: &dyn TypeEnv, ty: &Type) -> Option<Type> {
    match canonicalize_named(env, ty) {
        Type::Class(ClassType { def, .. }) => Some(Type::class(def, vec![])),
        _ => None,
    }
}

/// Type erasure (JLS 4.6). Type variables erase to their leftmost bound;
/// cyclic bound graphs fall back to `Object` instead of recursing forever.
pub fn erasure(env: &dyn TypeEnv, ty: &Type) -> Type {
    fn inner(env: &dyn TypeEnv, ty: &Type, seen: &mut HashSet<TypeVarId>) -> Type {
        match ty {
            Type::Class(ClassType { def, .. }) => Type::class(*def, vec![]),
            Type::Named(_) => match canonicalize_named(env, ty) {
                Type::Class(ClassType { def, .. }) => Type::class(def, vec![]),
                other => other,
            },
            Type::TypeVar(id) => {
                if !seen.insert(*id) {
                    return Type::class(env.well_known().object, vec![]);
                }
                let erased = env
                    .type_param(*id)
                    .and_then(|def| def.upper_bounds.first().cloned())
                    .map(|bound| inner(env, &bound, seen))
                    .unwrap_or_else(|| Type::class(env.well_known().object, vec![]));
                seen.remove(id);
                erased
            }
            Type::Wildcard(WildcardBound::Extends(upper)) => inner(env, upper, seen),
            Type::Wildcard(_) => Type::class(env.well_known().object, vec![]),
            Type::Array(elem) => Type::array(inner(env, elem, seen)),
            Type::Intersection(parts) => parts
                .first()
                .map(|part| inner(env, part, seen))
                .unwrap_or_else(|| Type::class(env.well_known().object, vec![])),
            _ => ty.clone(),
        }
    }
    let mut seen = HashSet::new();
    inner(env, ty, &mut seen)
}

/// Greatest lower bound, best-effort: picks the tighter side when the two are
/// ordered, otherwise a deterministically ordered intersection.
pub fn glb(env: &dyn TypeEnv, a: &Type, b: &Type) -> Type {
    if a == b || is_subtype(env, a, b) {
        return a.clone();
    }
    if is_subtype(env, b, a) {
        return b.clone();
    }
    let mut parts = vec![a.clone(), b.clone()];
    parts.sort_by_cached_key(|part| component_rank_key(env, part));
    parts.dedup();
    Type::Intersection(parts)
}

fn component_rank_key(env: &dyn TypeEnv, ty: &Type) -> (u8, String) {
    let rank = match canonicalize_named(env, ty) {
        Type::Class(ClassType { def, .. }) => match env.class(def).map(|c| c.kind) {
            Some(ClassKind::Class) => 0,
            Some(ClassKind::Interface) => 1,
            None => 2,
        },
        _ => 2,
    };
    (rank, crate::type_sort_key(env, ty))
}

/// Least upper bound, best-effort: the most specific class every candidate
/// can be viewed as, with matching instantiations preserved and conflicting
/// ones degraded to the raw type.
pub fn lub(env: &dyn TypeEnv, types: &[Type]) -> Type {
    let object = Type::class(env.well_known().object, vec![]);
    let candidates: Vec<&Type> = types
        .iter()
        .filter(|ty| !ty.is_errorish() && !matches!(ty, Type::Null))
        .collect();

    let Some((first, rest)) = candidates.split_first() else {
        return object;
    };
    if rest.iter().all(|ty| *ty == *first) {
        return (*first).clone();
    }

    if candidates.iter().all(|ty| matches!(ty, Type::Array(_))) {
        let elems: Vec<Type> = candidates
            .iter()
            .map(|ty| match ty {
                Type::Array(elem) => (**elem).clone(),
                _ => unreachable!("filtered to arrays"),
            })
            .collect();
        if elems.iter().any(|e| matches!(e, Type::Primitive(_))) {
            return object;
        }
        return Type::array(lub(env, &elems));
    }

    // Intersect the erased supertype closures, then keep the most specific
    // survivors.
    let mut common: Option<HashSet<ClassId>> = None;
    for ty in &candidates {
        let closure = supertype_closure(env, ty);
        common = Some(match common {
            None => closure,
            Some(prev) => prev.intersection(&closure).copied().collect(),
        });
    }
    let common = common.unwrap_or_default();
    if common.is_empty() {
        return object;
    }

    let mut best: Vec<ClassId> = common
        .iter()
        .copied()
        .filter(|candidate| {
            // Most specific: no *other* common supertype is below it.
            !common.iter().any(|other| {
                other != candidate
                    && is_subtype(
                        env,
                        &Type::class(*other, vec![]),
                        &Type::class(*candidate, vec![]),
                    )
            })
        })
        .collect();
    best.sort_by_cached_key(|id| crate::type_sort_key(env, &Type::class(*id, vec![])));
    let Some(chosen) = best.first().copied() else {
        return object;
    };

    let mut instantiations: Vec<Type> = Vec::new();
    for ty in &candidates {
        match instantiate_as_supertype(env, ty, chosen) {
            Some(instantiated) => instantiations.push(instantiated),
            None => return object,
        }
    }
    let (first, rest) = instantiations
        .split_first()
        .expect("candidates are non-empty here");
    if rest.iter().all(|ty| ty == first) {
        first.clone()
    } else {
        // Conflicting instantiations: degrade to the raw type.
        Type::class(chosen, vec![])
    }
}

fn supertype_closure(env: &dyn TypeEnv, ty: &Type) -> HashSet<ClassId> {
    let mut out = HashSet::new();
    let mut queue: VecDeque<Type> = VecDeque::new();
    let mut seen_vars = HashSet::new();
    queue.push_back(erasure(env, ty));

    while let Some(current) = queue.pop_front() {
        match current {
            Type::Class(ClassType { def, .. }) => {
                if !out.insert(def) {
                    continue;
                }
                let Some(class_def) = env.class(def) else {
                    continue;
                };
                if let Some(sc) = &class_def.super_class {
                    queue.push_back(erasure(env, sc));
                }
                for iface in &class_def.interfaces {
                    queue.push_back(erasure(env, iface));
                }
                if class_def.kind == ClassKind::Interface || class_def.super_class.is_some() {
                    out.insert(env.well_known().object);
                }
            }
            Type::TypeVar(id) => {
                if seen_vars.insert(id) {
                    if let Some(def) = env.type_param(id) {
                        for bound in &def.upper_bounds {
                            queue.push_back(erasure(env, bound));
                        }
                    }
                }
            }
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClassDef, TypeStore};

    #[test]
    fn class_hierarchy_subtyping_with_substitution() {
        let store = TypeStore::with_minimal_jdk();
        let wk = store.well_known();
        let string = Type::class(wk.string, vec![]);
        let array_list_string = Type::class(wk.array_list, vec![string.clone()]);
        let list_string = Type::class(wk.list, vec![string.clone()]);
        let collection_string = Type::class(wk.collection, vec![string.clone()]);

        assert!(is_subtype(&store, &array_list_string, &list_string));
        assert!(is_subtype(&store, &array_list_string, &collection_string));
        assert!(!is_subtype(&store, &list_string, &array_list_string));
    }

    #[test]
    fn generic_arguments_are_invariant() {
        let store = TypeStore::with_minimal_jdk();
        let wk = store.well_known();
        let list_string = Type::class(wk.list, vec![Type::class(wk.string, vec![])]);
        let list_object = Type::class(wk.list, vec![Type::class(wk.object, vec![])]);

        assert!(!is_subtype(&store, &list_string, &list_object));
        assert!(!is_subtype(&store, &list_object, &list_string));
    }

    #[test]
    fn extends_wildcard_accepts_subtypes_of_the_bound() {
        let store = TypeStore::with_minimal_jdk();
        let wk = store.well_known();
        let list_integer = Type::class(wk.list, vec![Type::class(wk.integer, vec![])]);
        let list_ext_number = Type::class(
            wk.list,
            vec![Type::Wildcard(WildcardBound::Extends(Box::new(
                Type::class(wk.number, vec![]),
            )))],
        );

        assert!(is_subtype(&store, &list_integer, &list_ext_number));
    }

    #[test]
    fn super_wildcard_accepts_supertypes_of_the_bound() {
        let store = TypeStore::with_minimal_jdk();
        let wk = store.well_known();
        let list_number = Type::class(wk.list, vec![Type::class(wk.number, vec![])]);
        let list_sup_integer = Type::class(
            wk.list,
            vec![Type::Wildcard(WildcardBound::Super(Box::new(Type::class(
                wk.integer,
                vec![],
            ))))],
        );

        assert!(is_subtype(&store, &list_number, &list_sup_integer));
    }

    #[test]
    fn raw_types_fit_raw_targets_but_not_parameterized_ones() {
        let store = TypeStore::with_minimal_jdk();
        let wk = store.well_known();
        let raw_list = Type::class(wk.list, vec![]);
        let list_string = Type::class(wk.list, vec![Type::class(wk.string, vec![])]);

        assert!(is_subtype(&store, &list_string, &raw_list));
        assert!(!is_subtype(&store, &raw_list, &list_string));
    }

    #[test]
    fn arrays_are_covariant_for_references_only() {
        let store = TypeStore::with_minimal_jdk();
        let wk = store.well_known();
        let string_array = Type::array(Type::class(wk.string, vec![]));
        let object_array = Type::array(Type::class(wk.object, vec![]));
        let int_array = Type::array(Type::Primitive(PrimitiveType::Int));
        let long_array = Type::array(Type::Primitive(PrimitiveType::Long));

        assert!(is_subtype(&store, &string_array, &object_array));
        assert!(!is_subtype(&store, &int_array, &long_array));
        assert!(is_subtype(
            &store,
            &string_array,
            &Type::class(wk.serializable, vec![])
        ));
    }

    #[test]
    fn f_bounded_declarations_terminate() {
        let mut store = TypeStore::with_minimal_jdk();
        let a = store.add_type_param("A", vec![]);
        let b = store.add_type_param("B", vec![Type::TypeVar(a)]);
        store.set_type_param_bounds(a, vec![Type::TypeVar(b)]);

        let string = Type::class(store.well_known().string, vec![]);
        // No stack overflow, just a negative answer.
        assert!(!is_subtype(&store, &Type::TypeVar(a), &string));
        assert!(is_subtype(&store, &Type::TypeVar(a), &Type::TypeVar(b)));
    }

    #[test]
    fn erasure_uses_the_leftmost_bound() {
        let mut store = TypeStore::with_minimal_jdk();
        let wk = *store.well_known();
        let number = Type::class(wk.number, vec![]);
        let t = store.add_type_param("T", vec![number.clone()]);

        assert_eq!(erasure(&store, &Type::TypeVar(t)), number);
        assert_eq!(
            erasure(
                &store,
                &Type::class(wk.list, vec![Type::class(wk.string, vec![])])
            ),
            Type::class(wk.list, vec![])
        );
    }

    #[test]
    fn erasure_survives_cyclic_bounds() {
        let mut store = TypeStore::with_minimal_jdk();
        let a = store.add_type_param("A", vec![]);
        store.set_type_param_bounds(a, vec![Type::TypeVar(a)]);
        let object = Type::class(store.well_known().object, vec![]);
        assert_eq!(erasure(&store, &Type::TypeVar(a)), object);
    }

    #[test]
    fn lub_of_boxes_is_number() {
        let store = TypeStore::with_minimal_jdk();
        let wk = store.well_known();
        let integer = Type::class(wk.integer, vec![]);
        let long = Type::class(store.class_id("java.lang.Long").unwrap(), vec![]);

        assert_eq!(
            lub(&store, &[integer, long]),
            Type::class(wk.number, vec![])
        );
    }

    #[test]
    fn glb_prefers_the_tighter_type() {
        let store = TypeStore::with_minimal_jdk();
        let wk = store.well_known();
        let number = Type::class(wk.number, vec![]);
        let integer = Type::class(wk.integer, vec![]);

        assert_eq!(glb(&store, &number, &integer), integer.clone());
        assert_eq!(glb(&store, &integer, &number), integer);
    }

    #[test]
    fn unrelated_glb_builds_a_deterministic_intersection() {
        let store = TypeStore::with_minimal_jdk();
        let wk = store.well_known();
        let runnable = Type::class(wk.runnable, vec![]);
        let cloneable = Type::class(wk.cloneable, vec![]);

        let ab = glb(&store, &runnable, &cloneable);
        let ba = glb(&store, &cloneable, &runnable);
        assert_eq!(ab, ba);
        assert!(matches!(ab, Type::Intersection(_)));
    }

    #[test]
    fn instantiate_as_supertype_recovers_type_arguments() {
        let store = TypeStore::with_minimal_jdk();
        let wk = store.well_known();
        let string = Type::class(wk.string, vec![]);
        let array_list_string = Type::class(wk.array_list, vec![string.clone()]);

        assert_eq!(
            instantiate_as_supertype(&store, &array_list_string, wk.collection),
            Some(Type::class(wk.collection, vec![string]))
        );
    }

    #[test]
    fn instantiate_as_supertype_preserves_rawness() {
        let store = TypeStore::with_minimal_jdk();
        let wk = store.well_known();
        let raw_array_list = Type::class(wk.array_list, vec![]);

        assert_eq!(
            instantiate_as_supertype(&store, &raw_array_list, wk.list),
            Some(Type::class(wk.list, vec![]))
        );
    }

    #[test]
    fn null_is_below_any_reference_type() {
        let store = TypeStore::with_minimal_jdk();
        let wk = store.well_known();
        assert!(is_subtype(&store, &Type::Null, &Type::class(wk.string, vec![])));
        assert!(!is_subtype(
            &store,
            &Type::Null,
            &Type::Primitive(PrimitiveType::Int)
        ));
    }

    #[test]
    fn interface_reaches_object() {
        let mut store = TypeStore::with_minimal_jdk();
        let wk = *store.well_known();
        let iface = store.add_class(ClassDef::new("p.I", ClassKind::Interface, None));
        assert!(is_subtype(
            &store,
            &Type::class(iface, vec![]),
            &Type::class(wk.object, vec![])
        ));
    }
}
