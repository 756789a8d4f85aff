//! Raw-type classification and unchecked-operation warnings.
//!
//! Every finding here is a warning and never blocks compilation. The key
//! distinction is *who chose the rawness*: a raw reference written at the
//! use site is always reported, while rawness forced by a declaration the
//! user cannot change (an inherited raw signature, a raw-typed API return)
//! is reported only when the unavoidable-problems option is enabled.

use javelin_core::{CompilerOptions, Toggle};
use javelin_types::format::{
    display_argument_types, display_generic_declaration, display_method, display_method_erased,
    display_type,
};
use javelin_types::{ClassId, ClassType, MethodDef, Type, TypeEnv};

/// Static classification of a generic-type-involving expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RawUsage {
    /// Proper parameterized (or non-generic) type.
    Parameterized,
    /// Raw because the reference at this use site is written raw.
    RawDeclaredHere,
    /// Raw because a declaration elsewhere forces it: an inherited raw
    /// member, or an override of a raw super signature.
    RawForced,
}

impl RawUsage {
    pub fn is_raw(self) -> bool {
        !matches!(self, RawUsage::Parameterized)
    }
}

/// Context of a raw type reference appearing in an overriding signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OverrideContext {
    /// The overridden supertype signature is itself raw at this position.
    pub super_is_raw_at_position: bool,
}

pub struct RawTypeAnalyzer<'e> {
    env: &'e dyn TypeEnv,
    options: CompilerOptions,
}

impl<'e> RawTypeAnalyzer<'e> {
    pub fn new(env: &'e dyn TypeEnv, options: CompilerOptions) -> Self {
        Self { env, options }
    }

    fn report_unavoidable(&self) -> bool {
        self.options.report_unavoidable_generic_type_problems == Toggle::Enabled
    }

    /// Classify a written type reference.
    pub fn classify_reference(&self, class: ClassId, has_type_args: bool) -> RawUsage {
        let generic = self
            .env
            .class(class)
            .map(|def| def.is_generic())
            .unwrap_or(false);
        if !generic || has_type_args {
            RawUsage::Parameterized
        } else {
            RawUsage::RawDeclaredHere
        }
    }

    /// Classify the static type of an expression, given where its rawness
    /// originates. `from_api` is true when the type comes from a member
    /// declared elsewhere (field access, method return) rather than from a
    /// reference written at this site.
    pub fn classify_expression(&self, ty: &Type, from_api: bool) -> RawUsage {
        match ty {
            Type::Class(ClassType { def, args }) if args.is_empty() => {
                let generic = self
                    .env
                    .class(*def)
                    .map(|d| d.is_generic())
                    .unwrap_or(false);
                if !generic {
                    RawUsage::Parameterized
                } else if from_api {
                    RawUsage::RawForced
                } else {
                    RawUsage::RawDeclaredHere
                }
            }
            _ => RawUsage::Parameterized,
        }
    }

    /// `List is a raw type. References to generic type List<E> should be
    /// parameterized` — for a raw reference written in a declaration.
    ///
    /// An overriding signature position suppresses the warning when the
    /// overridden signature is raw there too (the override had no choice);
    /// an override that goes raw against a parameterized super signature
    /// chose the rawness itself and always warns.
    pub fn check_declared_reference(
        &self,
        class: ClassId,
        has_type_args: bool,
        override_context: Option<OverrideContext>,
    ) -> Option<String> {
        if !self
            .classify_reference(class, has_type_args)
            .is_raw()
        {
            return None;
        }
        if let Some(ctx) = override_context {
            if ctx.super_is_raw_at_position && !self.report_unavoidable() {
                return None;
            }
        }
        Some(self.raw_reference_message(class))
    }

    pub fn raw_reference_message(&self, class: ClassId) -> String {
        let name = self
            .env
            .class(class)
            .map(|def| def.source_name())
            .unwrap_or_else(|| "<unknown>".to_string());
        format!(
            "{} is a raw type. References to generic type {} should be parameterized",
            name,
            display_generic_declaration(self.env, class),
        )
    }

    /// `Type safety: The method add(Object) belongs to the raw type List.
    /// References to generic type List<E> should be parameterized` — for a
    /// member invocation on a raw-typed receiver.
    pub fn check_raw_method_access(
        &self,
        receiver_usage: RawUsage,
        owner: ClassId,
        method: &MethodDef,
    ) -> Option<String> {
        match receiver_usage {
            RawUsage::Parameterized => None,
            RawUsage::RawForced if !self.report_unavoidable() => None,
            _ => {
                let owner_name = self
                    .env
                    .class(owner)
                    .map(|def| def.source_name())
                    .unwrap_or_else(|| "<unknown>".to_string());
                Some(format!(
                    "Type safety: The method {} belongs to the raw type {}. References to generic type {} should be parameterized",
                    display_method_erased(self.env, method),
                    owner_name,
                    display_generic_declaration(self.env, owner),
                ))
            }
        }
    }

    /// `Type safety: The expression of type List needs unchecked conversion
    /// to conform to List<String>` — for an assignment of a raw-typed
    /// expression to a parameterized target. `forced` marks rawness that
    /// originates in an API declaration the user cannot change.
    pub fn check_unchecked_assignment(
        &self,
        expr_ty: &Type,
        target: &Type,
        forced: bool,
    ) -> Option<String> {
        let raw = matches!(
            expr_ty,
            Type::Class(ClassType { def, args })
                if args.is_empty()
                    && self.env.class(*def).map(|d| d.is_generic()).unwrap_or(false)
        );
        let parameterized_target =
            matches!(target, Type::Class(ClassType { args, .. }) if !args.is_empty());
        if !raw || !parameterized_target {
            return None;
        }
        if forced && !self.report_unavoidable() {
            return None;
        }
        Some(format!(
            "Type safety: The expression of type {} needs unchecked conversion to conform to {}",
            display_type(self.env, expr_ty),
            display_type(self.env, target),
        ))
    }

    /// Warnings for an override whose return type went raw against a
    /// parameterized supertype signature: the raw-type warning (always, the
    /// override chose it) plus the unchecked-conversion warning.
    ///
    /// `Type safety: The return type List for get() from the type Sub needs
    /// unchecked conversion to conform to List<String> from the type Top`
    pub fn check_override_return(
        &self,
        sub_owner: ClassId,
        sub_method: &MethodDef,
        super_owner: ClassId,
        super_method: &MethodDef,
    ) -> Vec<String> {
        let mut out = Vec::new();

        let sub_raw = matches!(
            &sub_method.return_type,
            Type::Class(ClassType { def, args })
                if args.is_empty()
                    && self.env.class(*def).map(|d| d.is_generic()).unwrap_or(false)
        );
        if !sub_raw {
            return out;
        }
        let super_raw = matches!(
            &super_method.return_type,
            Type::Class(ClassType { args, .. }) if args.is_empty()
        );
        if super_raw {
            // Super is raw too: the override is faithful, warning only when
            // unavoidable problems are surfaced.
            if self.report_unavoidable() {
                if let Type::Class(ClassType { def, .. }) = &sub_method.return_type {
                    out.push(self.raw_reference_message(*def));
                }
            }
            return out;
        }

        // The override chose rawness: both warnings, under either setting.
        if let Type::Class(ClassType { def, .. }) = &sub_method.return_type {
            out.push(self.raw_reference_message(*def));
        }
        let owner_name = |id: ClassId| {
            self.env
                .class(id)
                .map(|def| def.source_name())
                .unwrap_or_else(|| "<unknown>".to_string())
        };
        out.push(format!(
            "Type safety: The return type {} for {}() from the type {} needs unchecked conversion to conform to {} from the type {}",
            display_type(self.env, &sub_method.return_type),
            sub_method.name,
            owner_name(sub_owner),
            display_type(self.env, &super_method.return_type),
            owner_name(super_owner),
        ));
        out
    }

    /// `Type safety: Unchecked invocation condense(X.EntityKey) of the
    /// generic method condense(K) of type X.EntityCondenser` — when a
    /// generic method resolves only through unchecked conversion.
    pub fn unchecked_invocation_message(
        &self,
        owner: ClassId,
        method: &MethodDef,
        args: &[Type],
    ) -> String {
        let owner_name = self
            .env
            .class(owner)
            .map(|def| def.source_name())
            .unwrap_or_else(|| "<unknown>".to_string());
        format!(
            "Type safety: Unchecked invocation {}{} of the generic method {} of type {}",
            method.name,
            display_argument_types(self.env, args),
            display_method(self.env, method),
            owner_name,
        )
    }
}
