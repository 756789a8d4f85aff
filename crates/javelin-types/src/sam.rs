use std::collections::{HashMap, HashSet, VecDeque};

use crate::{
    canonicalize_named, substitute, ClassId, ClassKind, ClassType, PrimitiveType, Type, TypeEnv,
    TypeVarId,
};

/// The single abstract method of a functional interface, with type-argument
/// substitution applied.
#[derive(Debug, Clone, PartialEq)]
pub struct SamMethod {
    pub name: String,
    pub params: Vec<Type>,
    pub return_type: Type,
}

/// Extract a functional interface's single abstract method (its SAM).
///
/// Walks the interface inheritance graph collecting abstract instance
/// methods, excluding redeclarations of `Object` methods (JLS 9.8), and
/// returns `None` unless exactly one abstract method remains.
pub fn sam_method(env: &dyn TypeEnv, ty: &Type) -> Option<SamMethod> {
    let ty = canonicalize_named(env, ty);
    let Type::Class(ClassType { def, args }) = ty else {
        return None;
    };

    let root = env.class(def)?;
    if root.kind != ClassKind::Interface {
        return None;
    }

    let mut queue: VecDeque<Type> = VecDeque::new();
    let mut seen: HashSet<(ClassId, Vec<Type>)> = HashSet::new();
    queue.push_back(Type::class(def, args));

    // (name, parameter types) -> return type.
    let mut candidates: HashMap<(String, Vec<Type>), Type> = HashMap::new();

    while let Some(current) = queue.pop_front() {
        let Type::Class(ClassType { def, args }) = canonicalize_named(env, &current) else {
            continue;
        };
        if !seen.insert((def, args.clone())) {
            continue;
        }
        let Some(class_def) = env.class(def) else {
            continue;
        };

        let mut subst: HashMap<TypeVarId, Type> =
            HashMap::with_capacity(class_def.type_params.len());
        for (idx, formal) in class_def.type_params.iter().copied().enumerate() {
            subst.insert(formal, args.get(idx).cloned().unwrap_or(Type::Unknown));
        }

        for method in &class_def.methods {
            if method.is_static || !method.is_abstract {
                continue;
            }
            let params: Vec<Type> = method
                .params
                .iter()
                .map(|p| substitute(p, &subst))
                .collect();
            let return_type = substitute(&method.return_type, &subst);

            if is_object_method(env, &method.name, &params, &return_type) {
                continue;
            }
            candidates
                .entry((method.name.clone(), params))
                .or_insert(return_type);
        }

        for iface in &class_def.interfaces {
            queue.push_back(substitute(iface, &subst));
        }
    }

    if candidates.len() != 1 {
        return None;
    }
    let ((name, params), return_type) = candidates.into_iter().next()?;
    Some(SamMethod {
        name,
        params,
        return_type,
    })
}

fn is_object_method(env: &dyn TypeEnv, name: &str, params: &[Type], return_type: &Type) -> bool {
    let return_type = canonicalize_named(env, return_type);
    match name {
        "equals" => {
            if params.len() != 1 {
                return false;
            }
            let object = Type::class(env.well_known().object, vec![]);
            canonicalize_named(env, &params[0]) == object
                && return_type == Type::Primitive(PrimitiveType::Boolean)
        }
        "hashCode" => params.is_empty() && return_type == Type::Primitive(PrimitiveType::Int),
        "toString" => {
            params.is_empty() && return_type == Type::class(env.well_known().string, vec![])
        }
        _ => false,
    }
}
