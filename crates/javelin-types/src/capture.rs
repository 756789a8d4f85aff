use std::fmt;

use crate::{
    ClassId, ClassType, Type, TypeEnv, TypeParamDef, TypeVarId, WellKnownTypes, WildcardBound,
};

/// Per-invocation typing context used by subtyping, overload resolution and
/// inference.
///
/// Side-effect free with respect to the global [`crate::TypeStore`]: capture
/// conversion allocates context-local type parameters here, so two
/// invocations never see each other's capture variables and re-running an
/// algorithm on a fresh context yields identical results.
pub struct TyContext<'env> {
    base: &'env dyn TypeEnv,
    locals: Vec<TypeParamDef>,
}

impl fmt::Debug for TyContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TyContext")
            .field("locals", &self.locals)
            .finish_non_exhaustive()
    }
}

impl<'env> TyContext<'env> {
    pub fn new(base: &'env dyn TypeEnv) -> Self {
        Self {
            base,
            locals: Vec::new(),
        }
    }

    /// Clear all context-local allocations.
    ///
    /// Callers that want deterministic ids across repeated invocations should
    /// prefer a fresh context per invocation.
    pub fn reset(&mut self) {
        self.locals.clear();
    }

    fn reserve_capture(&mut self, wildcard: &WildcardBound) -> TypeVarId {
        let idx: u32 = self
            .locals
            .len()
            .try_into()
            .expect("too many context-local type params");
        let id = TypeVarId::new_context_local(idx);
        self.locals.push(TypeParamDef {
            name: format!("capture#{}", idx + 1),
            upper_bounds: Vec::new(),
            lower_bound: None,
            captured_wildcard: Some(wildcard.clone()),
        });
        id
    }

    fn set_capture_bounds(
        &mut self,
        id: TypeVarId,
        upper_bounds: Vec<Type>,
        lower_bound: Option<Type>,
    ) {
        let idx = id
            .context_local_index()
            .expect("capture bounds only apply to context-local vars");
        let def = &mut self.locals[idx];
        def.upper_bounds = upper_bounds;
        def.lower_bound = lower_bound;
    }

    /// Capture conversion for parameterized types containing wildcards
    /// (JLS 5.1.10).
    ///
    /// Every call allocates *fresh* capture variables: converting the same
    /// type twice yields two unrelated sets of variables, which is exactly
    /// the "two accesses of one wildcard-typed expression are not
    /// assignment-compatible" behavior of the language.
    ///
    /// Bounds of the declared parameters are substituted with the freshly
    /// captured arguments before being attached to the capture variables, so
    /// a self-referential bound (`S extends SelfBound<S, T>`) unrolls exactly
    /// one level into the capture's bound and no further.
    pub fn capture_conversion(&mut self, ty: &Type) -> Type {
        let Type::Class(ClassType { def, args }) = ty else {
            return ty.clone();
        };

        if args.iter().all(|a| !matches!(a, Type::Wildcard(_))) {
            return ty.clone();
        }

        let Some(class_def) = self.class(*def) else {
            return ty.clone();
        };
        let formals: Vec<TypeVarId> = class_def.type_params.clone();
        let object = Type::class(self.well_known().object, vec![]);

        // First pass: allocate capture variables and build the substitution
        // mapping every formal to its (captured or concrete) argument.
        let mut new_args: Vec<Type> = Vec::with_capacity(args.len());
        let mut captured: Vec<(usize, TypeVarId, WildcardBound)> = Vec::new();
        let mut subst = std::collections::HashMap::new();
        for (idx, arg) in args.iter().enumerate() {
            let new_arg = match arg {
                Type::Wildcard(bound) => {
                    let cap = self.reserve_capture(bound);
                    captured.push((idx, cap, bound.clone()));
                    Type::TypeVar(cap)
                }
                other => other.clone(),
            };
            if let Some(formal) = formals.get(idx) {
                subst.insert(*formal, new_arg.clone());
            }
            new_args.push(new_arg);
        }

        // Second pass: attach bounds with the substitution applied once.
        for (idx, cap, wildcard) in captured {
            let declared_bounds: Vec<Type> = formals
                .get(idx)
                .and_then(|formal| self.base.type_param(*formal))
                .map(|def| def.upper_bounds.clone())
                .unwrap_or_default();
            let mut upper_bounds: Vec<Type> = declared_bounds
                .iter()
                .map(|bound| crate::substitute(bound, &subst))
                .collect();

            let lower_bound = match wildcard {
                WildcardBound::Unbounded => None,
                WildcardBound::Extends(upper) => {
                    let upper = *upper;
                    if !upper_bounds.contains(&upper) {
                        upper_bounds.insert(0, upper);
                    }
                    None
                }
                WildcardBound::Super(lower) => Some(*lower),
            };
            if upper_bounds.is_empty() {
                upper_bounds.push(object.clone());
            }
            self.set_capture_bounds(cap, upper_bounds, lower_bound);
        }

        Type::class(*def, new_args)
    }

    /// Subtype check that may allocate capture variables in this context.
    pub fn is_subtype(&mut self, sub: &Type, sup: &Type) -> bool {
        crate::subtyping::is_subtype_in(self, sub, sup)
    }
}

impl TypeEnv for TyContext<'_> {
    fn class(&self, id: ClassId) -> Option<&crate::ClassDef> {
        self.base.class(id)
    }

    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef> {
        if let Some(idx) = id.context_local_index() {
            return self.locals.get(idx);
        }
        self.base.type_param(id)
    }

    fn lookup_class(&self, name: &str) -> Option<ClassId> {
        self.base.lookup_class(name)
    }

    fn well_known(&self) -> &WellKnownTypes {
        self.base.well_known()
    }
}

impl TypeVarId {
    const CONTEXT_LOCAL_BIT: u32 = 1 << 31;

    pub(crate) fn new_context_local(index: u32) -> Self {
        Self(Self::CONTEXT_LOCAL_BIT | index)
    }

    pub fn is_context_local(self) -> bool {
        self.context_local_index().is_some()
    }

    pub(crate) fn context_local_index(self) -> Option<usize> {
        if (self.0 & Self::CONTEXT_LOCAL_BIT) == 0 {
            return None;
        }
        Some((self.0 & !Self::CONTEXT_LOCAL_BIT) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClassDef, ClassKind, TypeStore};
    use pretty_assertions::assert_eq;

    #[test]
    fn capture_is_identity_without_wildcards() {
        let store = TypeStore::with_minimal_jdk();
        let list = store.well_known().list;
        let string = Type::class(store.well_known().string, vec![]);
        let ty = Type::class(list, vec![string]);

        let mut ctx = TyContext::new(&store);
        assert_eq!(ctx.capture_conversion(&ty), ty);
    }

    #[test]
    fn each_capture_allocates_fresh_variables() {
        let store = TypeStore::with_minimal_jdk();
        let list = store.well_known().list;
        let ty = Type::class(list, vec![Type::Wildcard(WildcardBound::Unbounded)]);

        let mut ctx = TyContext::new(&store);
        let first = ctx.capture_conversion(&ty);
        let second = ctx.capture_conversion(&ty);
        assert_ne!(first, second, "captures of the same wildcard never merge");
    }

    #[test]
    fn extends_wildcard_tightens_the_upper_bound() {
        let store = TypeStore::with_minimal_jdk();
        let list = store.well_known().list;
        let number = Type::class(store.well_known().number, vec![]);
        let ty = Type::class(
            list,
            vec![Type::Wildcard(WildcardBound::Extends(Box::new(
                number.clone(),
            )))],
        );

        let mut ctx = TyContext::new(&store);
        let captured = ctx.capture_conversion(&ty);
        let Type::Class(ClassType { args, .. }) = &captured else {
            panic!("capture of a class type stays a class type");
        };
        let Type::TypeVar(cap) = &args[0] else {
            panic!("wildcard argument becomes a capture variable");
        };
        let def = ctx.type_param(*cap).unwrap();
        assert!(def.upper_bounds.contains(&number));
        assert_eq!(def.lower_bound, None);
    }

    #[test]
    fn super_wildcard_records_the_lower_bound() {
        let store = TypeStore::with_minimal_jdk();
        let list = store.well_known().list;
        let string = Type::class(store.well_known().string, vec![]);
        let ty = Type::class(
            list,
            vec![Type::Wildcard(WildcardBound::Super(Box::new(
                string.clone(),
            )))],
        );

        let mut ctx = TyContext::new(&store);
        let captured = ctx.capture_conversion(&ty);
        let Type::Class(ClassType { args, .. }) = &captured else {
            panic!("capture of a class type stays a class type");
        };
        let Type::TypeVar(cap) = &args[0] else {
            panic!("wildcard argument becomes a capture variable");
        };
        let def = ctx.type_param(*cap).unwrap();
        assert_eq!(def.lower_bound, Some(string));
    }

    #[test]
    fn self_referential_bound_unrolls_one_level() {
        let mut store = TypeStore::with_minimal_jdk();
        let object = store.well_known().object;

        // interface SelfBound<S extends SelfBound<S, T>, T>
        let s = store.add_type_param("S", vec![]);
        let t = store.add_type_param("T", vec![Type::class(object, vec![])]);
        let mut def = ClassDef::new("SelfBound", ClassKind::Interface, None);
        def.type_params = vec![s, t];
        let self_bound = store.add_class(def);
        store.set_type_param_bounds(
            s,
            vec![Type::class(
                self_bound,
                vec![Type::TypeVar(s), Type::TypeVar(t)],
            )],
        );

        let a = store.add_type_param("A", vec![]);
        store.set_type_param_bounds(
            a,
            vec![Type::class(
                self_bound,
                vec![Type::Wildcard(WildcardBound::Unbounded), Type::TypeVar(a)],
            )],
        );

        // capture SelfBound<?, A>
        let mut ctx = TyContext::new(&store);
        let captured = ctx.capture_conversion(&Type::class(
            self_bound,
            vec![Type::Wildcard(WildcardBound::Unbounded), Type::TypeVar(a)],
        ));
        let Type::Class(ClassType { args, .. }) = &captured else {
            panic!("capture of a class type stays a class type");
        };
        let Type::TypeVar(cap) = &args[0] else {
            panic!("wildcard argument becomes a capture variable");
        };

        // The capture's bound is SelfBound<capture, A>: the formal's
        // self-reference was substituted with the capture variable itself.
        let def = ctx.type_param(*cap).unwrap();
        assert_eq!(
            def.upper_bounds,
            vec![Type::class(
                self_bound,
                vec![Type::TypeVar(*cap), Type::TypeVar(a)]
            )]
        );
    }
}
