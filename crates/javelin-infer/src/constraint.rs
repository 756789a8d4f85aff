//! Type inference for generic method and constructor invocations.
//!
//! A [`ConstraintSet`] is created per invocation and discarded after
//! resolution: there is no shared mutable state, so running the same call
//! site twice yields the same substitution. Bounds are gathered from the
//! argument/parameter pairs (and the expected return type when target typing
//! applies), incorporated against the declared bounds, and resolved in
//! declaration order.

use std::collections::HashMap;

use javelin_types::format::{display_generic_declaration, display_type, type_param_name};
use javelin_types::{
    boxed, canonicalize_named, erasure, glb, instantiate_as_supertype, is_subtype, lub, substitute,
    unboxed, ClassId, ClassType, MethodDef, TyContext, Type, TypeEnv, TypeVarId, WildcardBound,
};
use thiserror::Error;
use tracing::trace;

/// The three applicability phases of method invocation (JLS 15.12.2.2-4).
/// Boxing participates only from [`InvocationPhase::Loose`] on; varargs
/// expansion only in [`InvocationPhase::Varargs`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvocationPhase {
    Strict,
    Loose,
    Varargs,
}

impl InvocationPhase {
    pub fn allows_boxing(self) -> bool {
        !matches!(self, InvocationPhase::Strict)
    }

    pub fn allows_varargs(self) -> bool {
        matches!(self, InvocationPhase::Varargs)
    }
}

pub type Substitution = HashMap<TypeVarId, Type>;

/// Successful inference: the substitution plus the signature it induces.
#[derive(Clone, Debug, PartialEq)]
pub struct Inferred {
    pub substitution: Substitution,
    /// Formal parameter types after substitution (varargs already expanded
    /// to the call's arity when the varargs phase applied).
    pub params: Vec<Type>,
    pub return_type: Type,
    /// True when the invocation only went through via unchecked (raw)
    /// conversion; callers surface the unchecked-invocation warning.
    pub unchecked: bool,
}

/// Why an invocation is not applicable.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum InferenceFailure {
    #[error("argument {index} is not compatible with the formal parameter")]
    Incompatible {
        index: usize,
        actual: Type,
        formal: Type,
    },
    #[error("wrong number of arguments: expected {expected}, found {found}")]
    ArityMismatch { expected: usize, found: usize },
    #[error("inferred type argument violates a declared bound")]
    BoundMismatch(BoundMismatch),
}

/// An inferred or supplied type argument that violates a declared bound.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundMismatch {
    pub var: TypeVarId,
    pub inferred: Type,
    pub bound: Type,
}

impl BoundMismatch {
    /// `Bound mismatch: The type U is not a valid substitute for the bounded
    /// parameter <T extends Number> of the type Test<T>`
    pub fn message(&self, env: &dyn TypeEnv, declaring: ClassId) -> String {
        format!(
            "Bound mismatch: The type {} is not a valid substitute for the bounded parameter <{}> of the type {}",
            display_type(env, &self.inferred),
            bounded_param(env, self.var, &self.bound),
            display_generic_declaration(env, declaring),
        )
    }
}

fn bounded_param(env: &dyn TypeEnv, var: TypeVarId, bound: &Type) -> String {
    format!(
        "{} extends {}",
        type_param_name(env, var),
        display_type(env, bound)
    )
}

/// A generic (or plain) method invocation to type-check.
pub struct Invocation<'a> {
    pub owner: ClassId,
    pub method: &'a MethodDef,
    pub args: &'a [Type],
    /// Target type when the call is in assignment/argument context; feeds
    /// upper bounds into inference.
    pub expected_return: Option<&'a Type>,
}

/// Argument-to-parameter compatibility under an invocation phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compat {
    No,
    Yes,
    /// Compatible only via unchecked (raw) conversion.
    Unchecked,
}

pub fn compatible(env: &dyn TypeEnv, actual: &Type, formal: &Type, phase: InvocationPhase) -> Compat {
    let actual = canonicalize_named(env, actual);
    let formal = canonicalize_named(env, formal);

    if actual.is_errorish() || formal.is_errorish() {
        return Compat::Yes;
    }
    if matches!(actual, Type::Null) {
        return if formal.is_reference() {
            Compat::Yes
        } else {
            Compat::No
        };
    }
    if is_subtype(env, &actual, &formal) {
        return Compat::Yes;
    }

    if phase.allows_boxing() {
        if let Type::Primitive(p) = actual {
            if let Some(boxed_ty) = boxed(env, p) {
                if is_subtype(env, &boxed_ty, &formal) {
                    return Compat::Yes;
                }
            }
        }
        if let Type::Primitive(target) = formal {
            if let Some(unboxed_ty) = unboxed(env, &actual) {
                if javelin_types::primitive_widens(unboxed_ty, target) {
                    return Compat::Yes;
                }
            }
        }
    }

    // Raw actual against a parameterized formal of a related class: method
    // invocation conversion allows it as an unchecked conversion.
    if let (Type::Class(ClassType { args, .. }), Type::Class(_)) = (&actual, &formal) {
        if args.is_empty() && is_subtype(env, &erasure(env, &actual), &erasure(env, &formal)) {
            return Compat::Unchecked;
        }
    }

    Compat::No
}

/// Run inference for `invocation` under `phase`.
///
/// The method's own type parameters are the inference variables; a fresh
/// constraint set is built and discarded inside this call.
pub fn infer(
    env: &dyn TypeEnv,
    invocation: &Invocation<'_>,
    phase: InvocationPhase,
) -> Result<Inferred, InferenceFailure> {
    infer_with_vars(
        env,
        &invocation.method.type_params,
        &invocation.method.params,
        invocation.method.is_varargs,
        &invocation.method.return_type,
        invocation.args,
        invocation.expected_return,
        phase,
    )
}

/// Inference core, parameterized over the inference-variable list so diamond
/// constructor inference can add the class's own type parameters.
#[allow(clippy::too_many_arguments)]
pub fn infer_with_vars(
    env: &dyn TypeEnv,
    vars: &[TypeVarId],
    declared_params: &[Type],
    is_varargs: bool,
    return_type: &Type,
    args: &[Type],
    expected_return: Option<&Type>,
    phase: InvocationPhase,
) -> Result<Inferred, InferenceFailure> {
    let formals = phase_formals(declared_params, is_varargs, args.len(), phase)?;

    let mut set = ConstraintSet::new(vars);
    for (index, (actual, formal)) in args.iter().zip(formals.iter()).enumerate() {
        set.reduce_compatibility(env, actual, formal, phase, index)?;
    }
    if let Some(target) = expected_return {
        set.reduce_return(env, return_type, target);
    }

    let substitution = set.resolve(env)?;
    trace!(?substitution, "resolved inference variables");

    // Incorporation: every resolved variable must satisfy its declared
    // bounds under the full substitution.
    let mut unchecked = false;
    for &var in vars {
        let inferred = substitution
            .get(&var)
            .cloned()
            .unwrap_or(Type::Unknown);
        let declared = env
            .type_param(var)
            .map(|def| def.upper_bounds.clone())
            .unwrap_or_default();
        for bound in declared {
            let bound = substitute(&bound, &substitution);
            if bound.is_errorish() || inferred.is_errorish() {
                continue;
            }
            match compatible(env, &inferred, &bound, InvocationPhase::Strict) {
                Compat::Yes => {}
                Compat::Unchecked => unchecked = true,
                Compat::No => {
                    return Err(InferenceFailure::BoundMismatch(BoundMismatch {
                        var,
                        inferred,
                        bound,
                    }));
                }
            }
        }
    }

    // Final applicability pass over the substituted formals. Boxing is
    // consulted here according to the phase, so a candidate infeasible under
    // strict invocation is still tried with boxing by the loose phase.
    let params: Vec<Type> = formals
        .iter()
        .map(|formal| substitute(formal, &substitution))
        .collect();
    for (index, (actual, formal)) in args.iter().zip(params.iter()).enumerate() {
        match compatible(env, actual, formal, phase) {
            Compat::Yes => {}
            Compat::Unchecked => unchecked = true,
            Compat::No => {
                return Err(InferenceFailure::Incompatible {
                    index,
                    actual: actual.clone(),
                    formal: formal.clone(),
                });
            }
        }
    }

    Ok(Inferred {
        return_type: substitute(return_type, &substitution),
        substitution,
        params,
        unchecked,
    })
}

/// Validate an explicit parameterization `C<args>` against the declared
/// bounds of `C`'s type parameters. Bounds are substituted with the full
/// argument mapping first, so F-bounded parameters check against the
/// supplied arguments rather than against themselves.
pub fn check_type_arguments(env: &dyn TypeEnv, class: ClassId, args: &[Type]) -> Vec<BoundMismatch> {
    let Some(class_def) = env.class(class) else {
        return Vec::new();
    };
    let params = class_def.type_params.clone();
    let mut mapping: Substitution = HashMap::new();
    for (idx, param) in params.iter().copied().enumerate() {
        mapping.insert(param, args.get(idx).cloned().unwrap_or(Type::Unknown));
    }

    let mut mismatches = Vec::new();
    for (idx, param) in params.iter().copied().enumerate() {
        let Some(arg) = args.get(idx) else { continue };
        if arg.is_errorish() || arg.is_wildcard() {
            continue;
        }
        let declared = env
            .type_param(param)
            .map(|def| def.upper_bounds.clone())
            .unwrap_or_default();
        for bound in declared {
            let bound = substitute(&bound, &mapping);
            if bound.is_errorish() {
                continue;
            }
            if compatible(env, arg, &bound, InvocationPhase::Strict) == Compat::No {
                mismatches.push(BoundMismatch {
                    var: param,
                    inferred: arg.clone(),
                    bound,
                });
            }
        }
    }
    mismatches
}

/// The formal parameter list an invocation phase checks against: declared
/// formals for strict/loose, the expanded shape for varargs.
fn phase_formals(
    declared: &[Type],
    is_varargs: bool,
    arity: usize,
    phase: InvocationPhase,
) -> Result<Vec<Type>, InferenceFailure> {
    if phase.allows_varargs() && is_varargs {
        let fixed = declared.len().saturating_sub(1);
        if arity < fixed {
            return Err(InferenceFailure::ArityMismatch {
                expected: fixed,
                found: arity,
            });
        }
        let elem = match declared.last() {
            Some(Type::Array(elem)) => (**elem).clone(),
            Some(other) => other.clone(),
            None => Type::Unknown,
        };
        let mut formals: Vec<Type> = declared[..fixed].to_vec();
        formals.extend(std::iter::repeat(elem).take(arity - fixed));
        Ok(formals)
    } else {
        if declared.len() != arity {
            return Err(InferenceFailure::ArityMismatch {
                expected: declared.len(),
                found: arity,
            });
        }
        Ok(declared.to_vec())
    }
}

/// Per-invocation bounds on the inference variables. Contradictory bounds
/// surface as a typed [`BoundMismatch`], never a silent pick.
struct ConstraintSet {
    vars: Vec<TypeVarId>,
    equal: HashMap<TypeVarId, Vec<Type>>,
    lower: HashMap<TypeVarId, Vec<Type>>,
    upper: HashMap<TypeVarId, Vec<Type>>,
}

impl ConstraintSet {
    fn new(vars: &[TypeVarId]) -> Self {
        Self {
            vars: vars.to_vec(),
            equal: HashMap::new(),
            lower: HashMap::new(),
            upper: HashMap::new(),
        }
    }

    fn is_var(&self, ty: &Type) -> Option<TypeVarId> {
        match ty {
            Type::TypeVar(id) if self.vars.contains(id) => Some(*id),
            _ => None,
        }
    }

    fn add_equal(&mut self, var: TypeVarId, ty: Type) {
        trace!(?var, ?ty, "equality bound");
        self.equal.entry(var).or_default().push(ty);
    }

    fn add_lower(&mut self, var: TypeVarId, ty: Type) {
        trace!(?var, ?ty, "lower bound");
        self.lower.entry(var).or_default().push(ty);
    }

    fn add_upper(&mut self, var: TypeVarId, ty: Type) {
        trace!(?var, ?ty, "upper bound");
        self.upper.entry(var).or_default().push(ty);
    }

    /// Reduce `actual --> formal` (argument compatible with parameter) into
    /// bounds on the inference variables.
    fn reduce_compatibility(
        &mut self,
        env: &dyn TypeEnv,
        actual: &Type,
        formal: &Type,
        phase: InvocationPhase,
        index: usize,
    ) -> Result<(), InferenceFailure> {
        let actual = canonicalize_named(env, actual);
        let formal = canonicalize_named(env, formal);

        // Arguments that carry no information constrain nothing.
        if actual.is_errorish() || matches!(actual, Type::Null) {
            return Ok(());
        }

        if let Some(var) = self.is_var(&formal) {
            let bound = match &actual {
                Type::Primitive(p) => {
                    if !phase.allows_boxing() {
                        return Err(InferenceFailure::Incompatible {
                            index,
                            actual: actual.clone(),
                            formal: formal.clone(),
                        });
                    }
                    boxed(env, *p).unwrap_or(Type::Unknown)
                }
                other => other.clone(),
            };
            self.add_lower(var, bound);
            return Ok(());
        }

        match (&actual, &formal) {
            (Type::Array(actual_elem), Type::Array(formal_elem)) => {
                self.reduce_compatibility(env, actual_elem, formal_elem, phase, index)
            }
            (_, Type::Class(ClassType { def, args })) if !args.is_empty() => {
                // View the argument as an instantiation of the formal's class
                // and match type arguments pairwise.
                let mut ctx = TyContext::new(env);
                let captured = ctx.capture_conversion(&actual);
                let Some(instantiated) = instantiate_as_supertype(&ctx, &captured, *def) else {
                    // Leave the verdict to the final compatibility pass
                    // (boxing or unchecked conversion may still apply).
                    return Ok(());
                };
                let Type::Class(ClassType {
                    args: actual_args, ..
                }) = instantiated
                else {
                    return Ok(());
                };
                if actual_args.is_empty() {
                    // Raw reference: nothing to learn from type arguments.
                    return Ok(());
                }
                for (formal_arg, actual_arg) in args.iter().zip(actual_args.iter()) {
                    self.reduce_argument(env, actual_arg, formal_arg);
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Reduce a type-argument pair. Non-wildcard positions are invariant and
    /// produce equality bounds; wildcard positions produce directional
    /// bounds.
    fn reduce_argument(&mut self, env: &dyn TypeEnv, actual_arg: &Type, formal_arg: &Type) {
        match formal_arg {
            Type::TypeVar(_) => {
                if let Some(var) = self.is_var(formal_arg) {
                    if !actual_arg.is_errorish() && !actual_arg.is_wildcard() {
                        self.add_equal(var, actual_arg.clone());
                    } else if let Type::Wildcard(WildcardBound::Extends(upper)) = actual_arg {
                        self.add_lower(var, (**upper).clone());
                    }
                }
            }
            Type::Wildcard(WildcardBound::Extends(upper)) => {
                if let Some(var) = self.is_var(upper) {
                    match actual_arg {
                        Type::Wildcard(WildcardBound::Extends(actual_upper)) => {
                            self.add_lower(var, (**actual_upper).clone());
                        }
                        Type::Wildcard(_) => {}
                        concrete => self.add_lower(var, concrete.clone()),
                    }
                } else {
                    self.reduce_nested(env, actual_arg, upper);
                }
            }
            Type::Wildcard(WildcardBound::Super(lower)) => {
                if let Some(var) = self.is_var(lower) {
                    match actual_arg {
                        Type::Wildcard(WildcardBound::Super(actual_lower)) => {
                            self.add_upper(var, (**actual_lower).clone());
                        }
                        Type::Wildcard(_) => {}
                        concrete => self.add_upper(var, concrete.clone()),
                    }
                } else {
                    self.reduce_nested(env, actual_arg, lower);
                }
            }
            Type::Class(ClassType { args, .. }) if !args.is_empty() => {
                self.reduce_nested(env, actual_arg, formal_arg);
            }
            Type::Array(formal_elem) => {
                if let Type::Array(actual_elem) = actual_arg {
                    self.reduce_argument(env, actual_elem, formal_elem);
                }
            }
            _ => {}
        }
    }

    /// Structural descent into matching class shapes.
    fn reduce_nested(&mut self, env: &dyn TypeEnv, actual: &Type, formal: &Type) {
        if let Some(var) = self.is_var(formal) {
            if !actual.is_errorish() && !actual.is_wildcard() {
                self.add_equal(var, actual.clone());
            }
            return;
        }
        if let (
            Type::Class(ClassType {
                def: actual_def,
                args: actual_args,
            }),
            Type::Class(ClassType {
                def: formal_def,
                args: formal_args,
            }),
        ) = (actual, formal)
        {
            if actual_def == formal_def && actual_args.len() == formal_args.len() {
                for (actual_arg, formal_arg) in actual_args.iter().zip(formal_args.iter()) {
                    self.reduce_argument(env, actual_arg, formal_arg);
                }
            }
        }
    }

    /// Bounds from the expected return type (target typing): the substituted
    /// return must be assignable *to* the target, so variables in return
    /// position pick up upper bounds.
    fn reduce_return(&mut self, env: &dyn TypeEnv, return_type: &Type, target: &Type) {
        let return_type = canonicalize_named(env, return_type);
        let target = canonicalize_named(env, target);
        if target.is_errorish() {
            return;
        }

        if let Some(var) = self.is_var(&return_type) {
            self.add_upper(var, target.clone());
            return;
        }
        if let (
            Type::Class(ClassType {
                def: ret_def,
                args: ret_args,
            }),
            Type::Class(ClassType {
                def: target_def,
                args: target_args,
            }),
        ) = (&return_type, &target)
        {
            if ret_def == target_def && ret_args.len() == target_args.len() {
                for (ret_arg, target_arg) in ret_args.iter().zip(target_args.iter()) {
                    // Return position flips the matching direction.
                    match (ret_arg, target_arg) {
                        (Type::TypeVar(_), Type::Wildcard(WildcardBound::Extends(upper))) => {
                            if let Some(var) = self.is_var(ret_arg) {
                                self.add_upper(var, (**upper).clone());
                            }
                        }
                        (Type::TypeVar(_), Type::Wildcard(WildcardBound::Super(lower))) => {
                            if let Some(var) = self.is_var(ret_arg) {
                                self.add_lower(var, (**lower).clone());
                            }
                        }
                        (Type::TypeVar(_), concrete) => {
                            if let Some(var) = self.is_var(ret_arg) {
                                if !concrete.is_wildcard() {
                                    self.add_equal(var, concrete.clone());
                                }
                            }
                        }
                        _ => self.reduce_return(env, ret_arg, target_arg),
                    }
                }
            }
        }
        if let (Type::Array(ret_elem), Type::Array(target_elem)) = (&return_type, &target) {
            self.reduce_return(env, ret_elem, target_elem);
        }
    }

    /// Resolve every variable in declaration order: equality bounds win,
    /// then the least upper bound of the lower bounds, then the greatest
    /// lower bound of the upper bounds, then the declared bound.
    fn resolve(&self, env: &dyn TypeEnv) -> Result<Substitution, InferenceFailure> {
        let mut substitution: Substitution = HashMap::new();

        for &var in &self.vars {
            let chosen = if let Some(equals) = self.equal.get(&var) {
                let first = canonicalize_named(env, &equals[0]);
                for other in &equals[1..] {
                    let other = canonicalize_named(env, other);
                    if other != first {
                        return Err(InferenceFailure::BoundMismatch(BoundMismatch {
                            var,
                            inferred: first,
                            bound: other,
                        }));
                    }
                }
                first
            } else if let Some(lowers) = self.lower.get(&var) {
                lub(env, lowers)
            } else if let Some(uppers) = self.upper.get(&var) {
                let mut iter = uppers.iter();
                let first = iter.next().cloned().unwrap_or(Type::Unknown);
                iter.fold(first, |acc, upper| glb(env, &acc, upper))
            } else {
                // Unconstrained: fall back to the declared bound under the
                // substitution resolved so far.
                env.type_param(var)
                    .and_then(|def| def.upper_bounds.first().cloned())
                    .map(|bound| substitute(&bound, &substitution))
                    .unwrap_or_else(|| Type::class(env.well_known().object, vec![]))
            };

            // Cross-check every directional bound against the choice.
            for lower_bound in self.lower.get(&var).into_iter().flatten() {
                if lower_bound.is_errorish() || chosen.is_errorish() {
                    continue;
                }
                if compatible(env, lower_bound, &chosen, InvocationPhase::Loose) == Compat::No {
                    return Err(InferenceFailure::BoundMismatch(BoundMismatch {
                        var,
                        inferred: chosen.clone(),
                        bound: lower_bound.clone(),
                    }));
                }
            }
            for upper_bound in self.upper.get(&var).into_iter().flatten() {
                if upper_bound.is_errorish() || chosen.is_errorish() {
                    continue;
                }
                let upper_bound = substitute(upper_bound, &substitution);
                if compatible(env, &chosen, &upper_bound, InvocationPhase::Loose) == Compat::No {
                    return Err(InferenceFailure::BoundMismatch(BoundMismatch {
                        var,
                        inferred: chosen.clone(),
                        bound: upper_bound,
                    }));
                }
            }

            substitution.insert(var, chosen);
        }

        Ok(substitution)
    }
}
