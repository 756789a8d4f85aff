use std::collections::HashMap;

use crate::{
    ClassDef, ClassId, ClassKind, MethodDef, PrimitiveType, Type, TypeEnv, TypeParamDef, TypeVarId,
    Visibility,
};

/// Frequently consulted classes, resolved once at store construction.
#[derive(Clone, Copy, Debug)]
pub struct WellKnownTypes {
    pub object: ClassId,
    pub string: ClassId,
    pub number: ClassId,
    pub integer: ClassId,
    pub class_: ClassId,
    pub cloneable: ClassId,
    pub serializable: ClassId,
    pub runnable: ClassId,
    pub autocloseable: ClassId,
    pub comparable: ClassId,
    pub collection: ClassId,
    pub list: ClassId,
    pub array_list: ClassId,
}

/// The type registry: owns every class and type-parameter definition.
///
/// Entries are created during declaration resolution and immutable afterward;
/// algorithms that need scratch type variables (capture conversion) allocate
/// them in a [`crate::TyContext`] overlay instead of here.
#[derive(Debug)]
pub struct TypeStore {
    classes: Vec<ClassDef>,
    type_params: Vec<TypeParamDef>,
    by_name: HashMap<String, ClassId>,
    well_known: WellKnownTypes,
}

impl TypeStore {
    /// A store pre-seeded with the slice of `java.*` the engines lean on:
    /// `Object`, `String`, the boxing partners, `Class`, `Serializable`,
    /// `Cloneable`, `Runnable`, `AutoCloseable`, `Comparable` and the
    /// `Collection`/`List`/`ArrayList` family.
    pub fn with_minimal_jdk() -> Self {
        let mut store = TypeStore {
            classes: Vec::new(),
            type_params: Vec::new(),
            by_name: HashMap::new(),
            // Placeholder ids, fixed up below once the classes exist.
            well_known: WellKnownTypes {
                object: ClassId(0),
                string: ClassId(0),
                number: ClassId(0),
                integer: ClassId(0),
                class_: ClassId(0),
                cloneable: ClassId(0),
                serializable: ClassId(0),
                runnable: ClassId(0),
                autocloseable: ClassId(0),
                comparable: ClassId(0),
                collection: ClassId(0),
                list: ClassId(0),
                array_list: ClassId(0),
            },
        };

        let object = store.add_class(ClassDef::new("java.lang.Object", ClassKind::Class, None));
        let object_ty = || Type::class(object, vec![]);

        let string = store.add_class(ClassDef::new(
            "java.lang.String",
            ClassKind::Class,
            Some(object_ty()),
        ));
        let number = store.add_class(ClassDef::new(
            "java.lang.Number",
            ClassKind::Class,
            Some(object_ty()),
        ));

        // Comparable<T>
        let comparable_t = store.add_type_param("T", vec![object_ty()]);
        let comparable = {
            let mut def = ClassDef::new("java.lang.Comparable", ClassKind::Interface, None);
            def.type_params = vec![comparable_t];
            def.methods = vec![MethodDef::new(
                "compareTo",
                vec![Type::TypeVar(comparable_t)],
                Type::Primitive(PrimitiveType::Int),
            )
            .abstract_()];
            store.add_class(def)
        };

        // Boxing partners. Integer & friends extend Number; Boolean and
        // Character extend Object directly.
        let integer = {
            let mut def = ClassDef::new("java.lang.Integer", ClassKind::Class, None);
            def.super_class = Some(Type::class(number, vec![]));
            def.interfaces = vec![Type::class(comparable, vec![Type::Named(
                "java.lang.Integer".to_string(),
            )])];
            store.add_class(def)
        };
        for name in [
            "java.lang.Byte",
            "java.lang.Short",
            "java.lang.Long",
            "java.lang.Float",
            "java.lang.Double",
        ] {
            let mut def = ClassDef::new(name, ClassKind::Class, None);
            def.super_class = Some(Type::class(number, vec![]));
            store.add_class(def);
        }
        for name in ["java.lang.Boolean", "java.lang.Character"] {
            store.add_class(ClassDef::new(name, ClassKind::Class, Some(object_ty())));
        }

        // Class<T>
        let class_t = store.add_type_param("T", vec![object_ty()]);
        let class_ = {
            let mut def = ClassDef::new("java.lang.Class", ClassKind::Class, Some(object_ty()));
            def.type_params = vec![class_t];
            store.add_class(def)
        };

        let cloneable =
            store.add_class(ClassDef::new("java.lang.Cloneable", ClassKind::Interface, None));
        let serializable = store.add_class(ClassDef::new(
            "java.io.Serializable",
            ClassKind::Interface,
            None,
        ));

        let runnable = {
            let mut def = ClassDef::new("java.lang.Runnable", ClassKind::Interface, None);
            def.methods = vec![MethodDef::new("run", vec![], Type::Void).abstract_()];
            store.add_class(def)
        };
        let autocloseable = {
            let mut def = ClassDef::new("java.lang.AutoCloseable", ClassKind::Interface, None);
            def.methods = vec![MethodDef::new("close", vec![], Type::Void).abstract_()];
            store.add_class(def)
        };

        // Collection<E> / List<E> / ArrayList<E>
        let collection_e = store.add_type_param("E", vec![object_ty()]);
        let collection = {
            let mut def = ClassDef::new("java.util.Collection", ClassKind::Interface, None);
            def.type_params = vec![collection_e];
            def.methods = vec![MethodDef::new(
                "add",
                vec![Type::TypeVar(collection_e)],
                Type::Primitive(PrimitiveType::Boolean),
            )
            .abstract_()];
            store.add_class(def)
        };

        let list_e = store.add_type_param("E", vec![object_ty()]);
        let list = {
            let mut def = ClassDef::new("java.util.List", ClassKind::Interface, None);
            def.type_params = vec![list_e];
            def.interfaces = vec![Type::class(collection, vec![Type::TypeVar(list_e)])];
            def.methods = vec![
                MethodDef::new(
                    "add",
                    vec![Type::TypeVar(list_e)],
                    Type::Primitive(PrimitiveType::Boolean),
                )
                .abstract_(),
                MethodDef::new(
                    "get",
                    vec![Type::Primitive(PrimitiveType::Int)],
                    Type::TypeVar(list_e),
                )
                .abstract_(),
                MethodDef::new(
                    "set",
                    vec![Type::Primitive(PrimitiveType::Int), Type::TypeVar(list_e)],
                    Type::TypeVar(list_e),
                )
                .abstract_(),
            ];
            store.add_class(def)
        };

        let array_list_e = store.add_type_param("E", vec![object_ty()]);
        let array_list = {
            let mut def = ClassDef::new("java.util.ArrayList", ClassKind::Class, Some(object_ty()));
            def.type_params = vec![array_list_e];
            def.interfaces = vec![Type::class(list, vec![Type::TypeVar(array_list_e)])];
            store.add_class(def)
        };

        store.well_known = WellKnownTypes {
            object,
            string,
            number,
            integer,
            class_,
            cloneable,
            serializable,
            runnable,
            autocloseable,
            comparable,
            collection,
            list,
            array_list,
        };
        store
    }

    pub fn add_class(&mut self, def: ClassDef) -> ClassId {
        let id = ClassId(self.classes.len() as u32);
        self.by_name.insert(def.name.clone(), id);
        self.classes.push(def);
        id
    }

    pub fn class_mut(&mut self, id: ClassId) -> Option<&mut ClassDef> {
        self.classes.get_mut(id.0 as usize)
    }

    /// Allocate a declared type parameter. Bounds may refer to type variables
    /// allocated earlier (including this one, for F-bounded declarations);
    /// cycle checking happens separately in [`crate::check_type_param_cycles`].
    pub fn add_type_param(&mut self, name: impl Into<String>, upper_bounds: Vec<Type>) -> TypeVarId {
        let id = TypeVarId(self.type_params.len() as u32);
        self.type_params.push(TypeParamDef {
            name: name.into(),
            upper_bounds,
            lower_bound: None,
            captured_wildcard: None,
        });
        id
    }

    /// Replace the bounds of an already-allocated type parameter. Needed when
    /// a bound refers to a parameter declared later in the same list
    /// (`<A extends B, B extends A>`): ids are allocated first, bounds wired
    /// after.
    pub fn set_type_param_bounds(&mut self, id: TypeVarId, upper_bounds: Vec<Type>) {
        if let Some(def) = self.type_params.get_mut(id.0 as usize) {
            def.upper_bounds = upper_bounds;
        }
    }

    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    /// Convenience: a package-private class (used to exercise accessibility
    /// rules without spelling the whole definition).
    pub fn add_package_private_class(
        &mut self,
        name: impl Into<String>,
        super_class: Option<Type>,
    ) -> ClassId {
        let mut def = ClassDef::new(name, ClassKind::Class, super_class);
        def.visibility = Visibility::Package;
        self.add_class(def)
    }
}

impl TypeEnv for TypeStore {
    fn class(&self, id: ClassId) -> Option<&ClassDef> {
        self.classes.get(id.0 as usize)
    }

    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef> {
        if id.context_local_index().is_some() {
            return None;
        }
        self.type_params.get(id.0 as usize)
    }

    fn lookup_class(&self, name: &str) -> Option<ClassId> {
        self.class_id(name)
    }

    fn well_known(&self) -> &WellKnownTypes {
        &self.well_known
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_jdk_defines_the_expected_classes() {
        let store = TypeStore::with_minimal_jdk();
        for name in [
            "java.lang.Object",
            "java.lang.String",
            "java.lang.Integer",
            "java.lang.Class",
            "java.io.Serializable",
            "java.lang.Runnable",
            "java.lang.AutoCloseable",
            "java.util.List",
            "java.util.ArrayList",
        ] {
            assert!(store.class_id(name).is_some(), "{name} should be seeded");
        }
        let wk = store.well_known();
        assert_eq!(store.class(wk.list).unwrap().type_params.len(), 1);
        assert_eq!(store.class(wk.object).unwrap().super_class, None);
    }

    #[test]
    fn late_bound_wiring_supports_forward_references() {
        let mut store = TypeStore::with_minimal_jdk();
        let a = store.add_type_param("A", vec![]);
        let b = store.add_type_param("B", vec![Type::TypeVar(a)]);
        store.set_type_param_bounds(a, vec![Type::TypeVar(b)]);
        assert_eq!(
            store.type_param(a).unwrap().upper_bounds,
            vec![Type::TypeVar(b)]
        );
    }
}
