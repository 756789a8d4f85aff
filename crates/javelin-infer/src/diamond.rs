//! Diamond operator (`<>`) gating and constructor type-argument inference.
//!
//! The diamond is a constrained inference case: zero explicit type
//! arguments, legal only as the immediate target of a constructor call, and
//! gated on the language level.

use javelin_core::CompilerOptions;
use javelin_types::format::display_generic_declaration;
use javelin_types::{ClassId, MethodDef, Type, TypeEnv};

use crate::constraint::{infer_with_vars, InferenceFailure, Inferred, InvocationPhase};

/// Where a `<>` occurrence sits syntactically.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiamondPosition {
    ConstructorCall,
    AnonymousClass,
    Cast,
    Instanceof,
    FieldType,
    VariableType,
    TypeBound,
    ArrayCreation,
}

/// Validate a diamond occurrence; `Err` carries the diagnostic text.
pub fn check_diamond(
    env: &dyn TypeEnv,
    class: ClassId,
    position: DiamondPosition,
    options: &CompilerOptions,
) -> Result<(), String> {
    if !options.source_level.supports_diamond() {
        return Err("'<>' operator is not allowed for source level below 1.7".to_string());
    }
    match position {
        DiamondPosition::ConstructorCall => Ok(()),
        DiamondPosition::AnonymousClass => {
            Err("'<>' cannot be used with anonymous classes".to_string())
        }
        _ => Err(format!(
            "Incorrect number of arguments for type {}; it cannot be parameterized with arguments <>",
            display_generic_declaration(env, class),
        )),
    }
}

/// Infer the class type arguments for `new C<>(args)`.
///
/// The class's own type parameters join the constructor's as inference
/// variables; the assignment target (if any) supplies the return-position
/// bounds.
pub fn infer_diamond(
    env: &dyn TypeEnv,
    class: ClassId,
    constructor: &MethodDef,
    args: &[Type],
    target: Option<&Type>,
    phase: InvocationPhase,
) -> Result<Inferred, InferenceFailure> {
    let class_def = env.class(class);
    let mut vars: Vec<_> = class_def
        .map(|def| def.type_params.clone())
        .unwrap_or_default();
    vars.extend(constructor.type_params.iter().copied());

    let created = Type::class(
        class,
        class_def
            .map(|def| def.type_params.iter().map(|id| Type::TypeVar(*id)).collect())
            .unwrap_or_default(),
    );

    infer_with_vars(
        env,
        &vars,
        &constructor.params,
        constructor.is_varargs,
        &created,
        args,
        target,
        phase,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use javelin_core::{SourceLevel, Toggle, UnusedTypeParameter};
    use javelin_types::{ClassDef, ClassKind, TypeStore};
    use pretty_assertions::assert_eq;

    fn options(level: SourceLevel) -> CompilerOptions {
        CompilerOptions {
            source_level: level,
            report_unavoidable_generic_type_problems: Toggle::Enabled,
            report_unused_type_parameter: UnusedTypeParameter::Ignore,
        }
    }

    #[test]
    fn diamond_is_gated_below_java_7() {
        let store = TypeStore::with_minimal_jdk();
        let list = store.well_known().array_list;
        assert_eq!(
            check_diamond(
                &store,
                list,
                DiamondPosition::ConstructorCall,
                &options(SourceLevel::Java6)
            ),
            Err("'<>' operator is not allowed for source level below 1.7".to_string())
        );
        assert_eq!(
            check_diamond(
                &store,
                list,
                DiamondPosition::ConstructorCall,
                &options(SourceLevel::Java7)
            ),
            Ok(())
        );
    }

    #[test]
    fn diamond_is_rejected_outside_constructor_calls() {
        let store = TypeStore::with_minimal_jdk();
        let list = store.well_known().list;
        for position in [
            DiamondPosition::Cast,
            DiamondPosition::Instanceof,
            DiamondPosition::FieldType,
            DiamondPosition::VariableType,
            DiamondPosition::TypeBound,
            DiamondPosition::ArrayCreation,
        ] {
            let err = check_diamond(&store, list, position, &options(SourceLevel::Java8))
                .unwrap_err();
            assert_eq!(
                err,
                "Incorrect number of arguments for type List<E>; it cannot be parameterized with arguments <>"
            );
        }
        assert_eq!(
            check_diamond(
                &store,
                list,
                DiamondPosition::AnonymousClass,
                &options(SourceLevel::Java8)
            ),
            Err("'<>' cannot be used with anonymous classes".to_string())
        );
    }

    #[test]
    fn diamond_infers_from_the_assignment_target() {
        let mut store = TypeStore::with_minimal_jdk();
        let wk = *store.well_known();
        let array_list = wk.array_list;
        let ctor = MethodDef::new("<init>", vec![], Type::Void);

        // ArrayList<String> x = new ArrayList<>();
        let string = Type::class(wk.string, vec![]);
        let target = Type::class(array_list, vec![string.clone()]);
        let inferred = infer_diamond(
            &store,
            array_list,
            &ctor,
            &[],
            Some(&target),
            InvocationPhase::Strict,
        )
        .unwrap();
        assert_eq!(inferred.return_type, target);

        let e = store.class(array_list).unwrap().type_params[0];
        assert_eq!(inferred.substitution.get(&e), Some(&string));
    }

    #[test]
    fn diamond_infers_from_constructor_arguments() {
        let mut store = TypeStore::with_minimal_jdk();
        let wk = *store.well_known();
        let object = Type::class(wk.object, vec![]);

        // class Box<T> { Box(T value) {} }
        let t = store.add_type_param("T", vec![object.clone()]);
        let mut def = ClassDef::new("Box", ClassKind::Class, Some(object));
        def.type_params = vec![t];
        def.constructors = vec![MethodDef::new("<init>", vec![Type::TypeVar(t)], Type::Void)];
        let box_ = store.add_class(def);

        let string = Type::class(wk.string, vec![]);
        let ctor = store.class(box_).unwrap().constructors[0].clone();
        let inferred = infer_diamond(
            &store,
            box_,
            &ctor,
            &[string.clone()],
            None,
            InvocationPhase::Strict,
        )
        .unwrap();
        assert_eq!(inferred.return_type, Type::class(box_, vec![string]));
    }
}
