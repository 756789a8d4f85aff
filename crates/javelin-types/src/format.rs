//! Java-like rendering of types for diagnostics.
//!
//! The formatters are stable and source-facing: package prefixes are dropped,
//! nested classes print as `Outer.Inner`, capture variables print as
//! `capture#1-of ? extends X`. Messages built on top of these must match the
//! canonical transcripts character for character, so changes here are
//! breaking.

use crate::{
    canonicalize_named, erasure, ClassType, MethodDef, Type, TypeEnv, TypeVarId, WildcardBound,
};

/// Source-facing rendering: `List<String>`, `? extends Number`, `int[]`.
pub fn display_type(env: &dyn TypeEnv, ty: &Type) -> String {
    render(env, ty, false)
}

/// Fully qualified rendering, used for stable sort keys rather than user
/// messages.
pub fn display_type_qualified(env: &dyn TypeEnv, ty: &Type) -> String {
    render(env, ty, true)
}

fn render(env: &dyn TypeEnv, ty: &Type, qualified: bool) -> String {
    match ty {
        Type::Primitive(p) => p.keyword().to_string(),
        Type::Void => "void".to_string(),
        Type::Null => "null".to_string(),
        Type::Named(name) => match canonicalize_named(env, ty) {
            Type::Named(_) => name.clone(),
            resolved => render(env, &resolved, qualified),
        },
        Type::Class(ClassType { def, args }) => {
            let name = match env.class(*def) {
                Some(class_def) => {
                    if qualified {
                        class_def.name.clone()
                    } else {
                        class_def.source_name()
                    }
                }
                None => "<unknown>".to_string(),
            };
            if args.is_empty() {
                name
            } else {
                let rendered: Vec<String> =
                    args.iter().map(|arg| render(env, arg, qualified)).collect();
                format!("{}<{}>", name, rendered.join(", "))
            }
        }
        Type::TypeVar(id) => match env.type_param(*id) {
            Some(def) => match &def.captured_wildcard {
                Some(wildcard) => format!(
                    "{}-of {}",
                    def.name,
                    render_wildcard(env, wildcard, qualified)
                ),
                None => def.name.clone(),
            },
            None => "?".to_string(),
        },
        Type::Wildcard(bound) => render_wildcard(env, bound, qualified),
        Type::Array(elem) => format!("{}[]", render(env, elem, qualified)),
        Type::Intersection(parts) => {
            let rendered: Vec<String> = parts
                .iter()
                .map(|part| render(env, part, qualified))
                .collect();
            rendered.join(" & ")
        }
        Type::Unknown => "?".to_string(),
        Type::Error => "<error>".to_string(),
    }
}

fn render_wildcard(env: &dyn TypeEnv, bound: &WildcardBound, qualified: bool) -> String {
    match bound {
        WildcardBound::Unbounded => "?".to_string(),
        WildcardBound::Extends(upper) => format!("? extends {}", render(env, upper, qualified)),
        WildcardBound::Super(lower) => format!("? super {}", render(env, lower, qualified)),
    }
}

/// `List<E>` — the declaration shape of a generic class, used in raw-type
/// messages ("References to generic type List<E> should be parameterized").
pub fn display_generic_declaration(env: &dyn TypeEnv, def: crate::ClassId) -> String {
    let Some(class_def) = env.class(def) else {
        return "<unknown>".to_string();
    };
    let name = class_def.source_name();
    if class_def.type_params.is_empty() {
        return name;
    }
    let params: Vec<String> = class_def
        .type_params
        .iter()
        .map(|id| {
            env.type_param(*id)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| "?".to_string())
        })
        .collect();
    format!("{}<{}>", name, params.join(", "))
}

/// `foo(Object[])` / `foo(T...)` — method signature as it appears in
/// applicability diagnostics. Varargs render the trailing parameter with
/// `...` in place of the array brackets.
pub fn display_method(env: &dyn TypeEnv, method: &MethodDef) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(method.params.len());
    for (idx, param) in method.params.iter().enumerate() {
        let last = idx + 1 == method.params.len();
        if last && method.is_varargs {
            let elem = match param {
                Type::Array(elem) => (**elem).clone(),
                other => other.clone(),
            };
            parts.push(format!("{}...", display_type(env, &elem)));
        } else {
            parts.push(display_type(env, param));
        }
    }
    format!("{}({})", method.name, parts.join(", "))
}

/// Same as [`display_method`] but with every parameter erased, used when a
/// member is reached through a raw receiver ("The method add(Object) belongs
/// to the raw type List").
pub fn display_method_erased(env: &dyn TypeEnv, method: &MethodDef) -> String {
    let parts: Vec<String> = method
        .params
        .iter()
        .map(|param| display_type(env, &erasure(env, param)))
        .collect();
    format!("{}({})", method.name, parts.join(", "))
}

/// Argument-type list as rendered in "not applicable for the arguments"
/// messages: `(String, String)`.
pub fn display_argument_types(env: &dyn TypeEnv, args: &[Type]) -> String {
    let parts: Vec<String> = args.iter().map(|arg| display_type(env, arg)).collect();
    format!("({})", parts.join(", "))
}

/// Name of a type parameter.
pub fn type_param_name(env: &dyn TypeEnv, id: TypeVarId) -> String {
    env.type_param(id)
        .map(|def| def.name.clone())
        .unwrap_or_else(|| "?".to_string())
}
