//! Raw-type warning suppression across the unavoidable-problems toggle,
//! rendered through the canonical transcript format.

use javelin_core::{CompilerOptions, DiagnosticReporter, Span, Toggle};
use javelin_infer::{infer, Invocation, InvocationPhase, OverrideContext, RawTypeAnalyzer};
use javelin_types::{ClassDef, ClassKind, MethodDef, Type, TypeEnv, TypeStore};
use pretty_assertions::assert_eq;

fn options(unavoidable: Toggle) -> CompilerOptions {
    CompilerOptions {
        report_unavoidable_generic_type_problems: unavoidable,
        ..CompilerOptions::default()
    }
}

fn find_nth(source: &str, needle: &str, n: usize) -> Span {
    let mut from = 0;
    let mut seen = 0;
    loop {
        let at = source[from..].find(needle).expect("needle present") + from;
        if seen == n {
            return Span::new(at, at + needle.len());
        }
        seen += 1;
        from = at + needle.len();
    }
}

const ADAPTABLE: &str = "\
interface Adaptable {
    public Object getAdapter(Class clazz);
}
public class X implements Adaptable {
    public Object getAdapter(Class clazz) {
        return null;
    }
}
";

/// An interface declares a raw `Class` parameter; the implementing class has
/// no choice but to repeat it. With unavoidable problems disabled only the
/// interface's own declaration warns; enabled, both do.
#[test]
fn unavoidable_override_rawness_is_suppressed_when_disabled() {
    let store = TypeStore::with_minimal_jdk();
    let class_id = store.well_known().class_;

    let analyzer = RawTypeAnalyzer::new(&store, options(Toggle::Disabled));
    let mut reporter = DiagnosticReporter::new();
    reporter.add_unit("X.java", ADAPTABLE);

    // Interface declaration: raw written here, no override involved.
    if let Some(message) = analyzer.check_declared_reference(class_id, false, None) {
        reporter.warning("X.java", find_nth(ADAPTABLE, "Class", 0), message);
    }
    // Implementing class: overrides a signature that is raw at the same
    // position.
    if let Some(message) = analyzer.check_declared_reference(
        class_id,
        false,
        Some(OverrideContext {
            super_is_raw_at_position: true,
        }),
    ) {
        reporter.warning("X.java", find_nth(ADAPTABLE, "Class", 1), message);
    }

    assert_eq!(
        reporter.render(),
        "----------\n\
         1. WARNING in X.java (at line 2)\n\
         \tpublic Object getAdapter(Class clazz);\n\
         \t                         ^^^^^\n\
         Class is a raw type. References to generic type Class<T> should be parameterized\n\
         ----------\n"
    );
}

#[test]
fn unavoidable_override_rawness_is_reported_when_enabled() {
    let store = TypeStore::with_minimal_jdk();
    let class_id = store.well_known().class_;

    let analyzer = RawTypeAnalyzer::new(&store, options(Toggle::Enabled));
    let mut reporter = DiagnosticReporter::new();
    reporter.add_unit("X.java", ADAPTABLE);

    if let Some(message) = analyzer.check_declared_reference(class_id, false, None) {
        reporter.warning("X.java", find_nth(ADAPTABLE, "Class", 0), message);
    }
    if let Some(message) = analyzer.check_declared_reference(
        class_id,
        false,
        Some(OverrideContext {
            super_is_raw_at_position: true,
        }),
    ) {
        reporter.warning("X.java", find_nth(ADAPTABLE, "Class", 1), message);
    }

    assert_eq!(
        reporter.render(),
        "----------\n\
         1. WARNING in X.java (at line 2)\n\
         \tpublic Object getAdapter(Class clazz);\n\
         \t                         ^^^^^\n\
         Class is a raw type. References to generic type Class<T> should be parameterized\n\
         ----------\n\
         2. WARNING in X.java (at line 5)\n\
         \tpublic Object getAdapter(Class clazz) {\n\
         \t                         ^^^^^\n\
         Class is a raw type. References to generic type Class<T> should be parameterized\n\
         ----------\n"
    );
}

/// A raw local declaration at the use site warns under either setting.
#[test]
fn raw_declared_at_use_site_warns_under_both_settings() {
    let store = TypeStore::with_minimal_jdk();
    let list = store.well_known().list;

    for toggle in [Toggle::Enabled, Toggle::Disabled] {
        let analyzer = RawTypeAnalyzer::new(&store, options(toggle));
        assert!(
            analyzer
                .check_declared_reference(list, false, None)
                .is_some(),
            "raw local declaration must warn with {toggle:?}"
        );
    }
}

/// An override that goes raw against a *parameterized* super signature chose
/// the rawness itself: both the raw warning and the unchecked-conversion
/// warning appear, under either setting.
#[test]
fn override_going_raw_against_parameterized_super_warns_twice() {
    let mut store = TypeStore::with_minimal_jdk();
    let wk = *store.well_known();
    let object = Type::class(wk.object, vec![]);
    let list_string = Type::class(wk.list, vec![Type::class(wk.string, vec![])]);
    let raw_list = Type::class(wk.list, vec![]);

    let mut top = ClassDef::new("Top", ClassKind::Class, Some(object.clone()));
    top.methods = vec![MethodDef::new("get", vec![], list_string)];
    let top_id = store.add_class(top);

    let mut sub = ClassDef::new("Sub", ClassKind::Class, Some(Type::class(top_id, vec![])));
    sub.methods = vec![MethodDef::new("get", vec![], raw_list)];
    let sub_id = store.add_class(sub);

    let analyzer = RawTypeAnalyzer::new(&store, options(Toggle::Disabled));
    let sub_get = &store.class(sub_id).unwrap().methods[0];
    let top_get = &store.class(top_id).unwrap().methods[0];
    let warnings = analyzer.check_override_return(sub_id, sub_get, top_id, top_get);

    assert_eq!(
        warnings,
        vec![
            "List is a raw type. References to generic type List<E> should be parameterized"
                .to_string(),
            "Type safety: The return type List for get() from the type Sub needs unchecked conversion to conform to List<String> from the type Top"
                .to_string(),
        ]
    );
}

/// A faithful raw override of a raw super signature only warns when
/// unavoidable problems are enabled.
#[test]
fn faithful_raw_override_follows_the_toggle() {
    let mut store = TypeStore::with_minimal_jdk();
    let wk = *store.well_known();
    let object = Type::class(wk.object, vec![]);
    let raw_list = Type::class(wk.list, vec![]);

    let mut top = ClassDef::new("Top", ClassKind::Class, Some(object.clone()));
    top.methods = vec![MethodDef::new("get", vec![], raw_list.clone())];
    let top_id = store.add_class(top);
    let mut sub = ClassDef::new("Sub", ClassKind::Class, Some(Type::class(top_id, vec![])));
    sub.methods = vec![MethodDef::new("get", vec![], raw_list)];
    let sub_id = store.add_class(sub);

    let sub_get = store.class(sub_id).unwrap().methods[0].clone();
    let top_get = store.class(top_id).unwrap().methods[0].clone();

    let disabled = RawTypeAnalyzer::new(&store, options(Toggle::Disabled));
    assert!(disabled
        .check_override_return(sub_id, &sub_get, top_id, &top_get)
        .is_empty());

    let enabled = RawTypeAnalyzer::new(&store, options(Toggle::Enabled));
    assert_eq!(
        enabled.check_override_return(sub_id, &sub_get, top_id, &top_get),
        vec![
            "List is a raw type. References to generic type List<E> should be parameterized"
                .to_string()
        ]
    );
}

/// A generic method invoked with a raw-typed argument resolves, but only via
/// unchecked conversion, and the warning names both the call shape and the
/// declared shape.
#[test]
fn unchecked_generic_invocation_message() {
    let mut store = TypeStore::with_minimal_jdk();
    let wk = *store.well_known();
    let object = Type::class(wk.object, vec![]);

    // public class X.EntityKey<I> {}
    let i = store.add_type_param("I", vec![object.clone()]);
    let mut entity_key = ClassDef::new("X$EntityKey", ClassKind::Class, Some(object.clone()));
    entity_key.type_params = vec![i];
    let entity_key_id = store.add_class(entity_key);

    // static class X.EntityCondenser { <K extends EntityKey<I2>, I2> void condense(K k) {} }
    let i2 = store.add_type_param("I", vec![object.clone()]);
    let k = store.add_type_param(
        "K",
        vec![Type::class(entity_key_id, vec![Type::TypeVar(i2)])],
    );
    let mut condenser = ClassDef::new("X$EntityCondenser", ClassKind::Class, Some(object));
    condenser.methods = vec![MethodDef::new("condense", vec![Type::TypeVar(k)], Type::Void)
        .with_type_params(vec![i2, k])];
    let condenser_id = store.add_class(condenser);

    let raw_key = Type::class(entity_key_id, vec![]);
    let condense = store.class(condenser_id).unwrap().methods[0].clone();
    let inferred = infer(
        &store,
        &Invocation {
            owner: condenser_id,
            method: &condense,
            args: &[raw_key.clone()],
            expected_return: None,
        },
        InvocationPhase::Strict,
    )
    .unwrap();
    assert!(inferred.unchecked, "raw argument forces unchecked inference");

    let analyzer = RawTypeAnalyzer::new(&store, options(Toggle::Disabled));
    assert_eq!(
        analyzer.unchecked_invocation_message(condenser_id, &condense, &[raw_key]),
        "Type safety: Unchecked invocation condense(X.EntityKey) of the generic method condense(K) of type X.EntityCondenser"
    );
}

#[test]
fn raw_field_access_from_api_is_suppressed_only_when_disabled() {
    let store = TypeStore::with_minimal_jdk();
    let wk = store.well_known();
    let raw_list = Type::class(wk.list, vec![]);

    let disabled = RawTypeAnalyzer::new(&store, options(Toggle::Disabled));
    let usage = disabled.classify_expression(&raw_list, true);
    assert_eq!(usage, javelin_infer::RawUsage::RawForced);

    let add = MethodDef::new(
        "add",
        vec![Type::class(wk.object, vec![])],
        Type::Primitive(javelin_types::PrimitiveType::Boolean),
    );
    assert!(disabled
        .check_raw_method_access(usage, wk.list, &add)
        .is_none());

    let enabled = RawTypeAnalyzer::new(&store, options(Toggle::Enabled));
    assert!(enabled
        .check_raw_method_access(usage, wk.list, &add)
        .is_some());
}
