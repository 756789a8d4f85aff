//! The nominal type model for a Java-like language: declared classes and
//! interfaces with bounded type parameters, parameterized and raw types,
//! wildcards, arrays and intersections.
//!
//! The model is registry-shaped: [`TypeStore`] owns every [`ClassDef`] and
//! [`TypeParamDef`], and algorithms reach them through the read-only
//! [`TypeEnv`] trait so per-invocation overlays (capture conversion contexts)
//! can layer their own allocations on top without mutating shared state.

mod capture;
mod cycles;
pub mod format;
mod sam;
mod store;
mod subtyping;

pub use crate::capture::TyContext;
pub use crate::cycles::{check_type_param_cycles, BoundCycle};
pub use crate::sam::{sam_method, SamMethod};
pub use crate::store::{TypeStore, WellKnownTypes};
pub use crate::subtyping::{
    erasure, glb, instantiate_as_supertype, is_subtype, lub, primitive_widens,
};

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassId(pub(crate) u32);

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeVarId(pub(crate) u32);

impl fmt::Debug for TypeVarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.context_local_index() {
            Some(idx) => write!(f, "TypeVarId(ctx#{idx})"),
            None => write!(f, "TypeVarId({})", self.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Char => "char",
            PrimitiveType::Short => "short",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
        }
    }

    /// Qualified name of the boxing partner (`int` -> `java.lang.Integer`).
    pub fn boxed_class_name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "java.lang.Boolean",
            PrimitiveType::Byte => "java.lang.Byte",
            PrimitiveType::Char => "java.lang.Character",
            PrimitiveType::Short => "java.lang.Short",
            PrimitiveType::Int => "java.lang.Integer",
            PrimitiveType::Long => "java.lang.Long",
            PrimitiveType::Float => "java.lang.Float",
            PrimitiveType::Double => "java.lang.Double",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WildcardBound {
    Unbounded,
    Extends(Box<Type>),
    Super(Box<Type>),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassType {
    pub def: ClassId,
    /// Type arguments; empty on a generic class means the *raw* type.
    pub args: Vec<Type>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Primitive(PrimitiveType),
    Void,
    /// The type of the `null` literal.
    Null,
    Class(ClassType),
    /// An unresolved textual reference, canonicalized on demand.
    Named(String),
    TypeVar(TypeVarId),
    Wildcard(WildcardBound),
    Array(Box<Type>),
    Intersection(Vec<Type>),
    Unknown,
    Error,
}

impl Type {
    pub fn class(def: ClassId, args: Vec<Type>) -> Type {
        Type::Class(ClassType { def, args })
    }

    pub fn array(elem: Type) -> Type {
        Type::Array(Box::new(elem))
    }

    pub fn is_errorish(&self) -> bool {
        matches!(self, Type::Unknown | Type::Error)
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Type::Wildcard(_))
    }

    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            Type::Class(_)
                | Type::Named(_)
                | Type::TypeVar(_)
                | Type::Array(_)
                | Type::Intersection(_)
                | Type::Null
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassKind {
    Class,
    Interface,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Package,
}

/// A declared type parameter, or a synthetic capture variable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeParamDef {
    pub name: String,
    /// First bound may be a class, the rest interfaces. Never mutated after
    /// declaration resolution.
    pub upper_bounds: Vec<Type>,
    /// Only set on capture variables originating from `? super` wildcards.
    pub lower_bound: Option<Type>,
    /// Set iff this is a capture variable; records the captured wildcard for
    /// diagnostics (`capture#1-of ? extends X`).
    pub captured_wildcard: Option<WildcardBound>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub ty: Type,
    pub is_static: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDef {
    pub name: String,
    pub type_params: Vec<TypeVarId>,
    pub params: Vec<Type>,
    pub return_type: Type,
    pub is_static: bool,
    pub is_varargs: bool,
    pub is_abstract: bool,
    /// Interface default method (concrete body declared on an interface).
    pub is_default: bool,
    pub visibility: Visibility,
}

impl MethodDef {
    /// A public concrete instance method; the common case in tests and
    /// minimal-JDK construction.
    pub fn new(name: impl Into<String>, params: Vec<Type>, return_type: Type) -> Self {
        Self {
            name: name.into(),
            type_params: vec![],
            params,
            return_type,
            is_static: false,
            is_varargs: false,
            is_abstract: false,
            is_default: false,
            visibility: Visibility::Public,
        }
    }

    pub fn abstract_(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn static_(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn varargs(mut self) -> Self {
        self.is_varargs = true;
        self
    }

    pub fn default_(mut self) -> Self {
        self.is_default = true;
        self
    }

    pub fn with_type_params(mut self, type_params: Vec<TypeVarId>) -> Self {
        self.type_params = type_params;
        self
    }

    pub fn package_private(mut self) -> Self {
        self.visibility = Visibility::Package;
        self
    }

    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDef {
    /// Qualified dotted name; nested classes use `$` (`com.foo.X$Marker`).
    pub name: String,
    pub kind: ClassKind,
    pub visibility: Visibility,
    pub type_params: Vec<TypeVarId>,
    pub super_class: Option<Type>,
    pub interfaces: Vec<Type>,
    pub fields: Vec<FieldDef>,
    pub constructors: Vec<MethodDef>,
    pub methods: Vec<MethodDef>,
}

impl ClassDef {
    /// A public top-level class extending the given supertype.
    pub fn new(name: impl Into<String>, kind: ClassKind, super_class: Option<Type>) -> Self {
        Self {
            name: name.into(),
            kind,
            visibility: Visibility::Public,
            type_params: vec![],
            super_class,
            interfaces: vec![],
            fields: vec![],
            constructors: vec![],
            methods: vec![],
        }
    }

    pub fn package(&self) -> &str {
        match self.name.rfind('.') {
            Some(dot) => &self.name[..dot],
            None => "",
        }
    }

    /// Name after the package, with `$` nesting turned into `.`
    /// (`com.foo.X$Marker` -> `X.Marker`).
    pub fn source_name(&self) -> String {
        let simple = match self.name.rfind('.') {
            Some(dot) => &self.name[dot + 1..],
            None => &self.name,
        };
        simple.replace('$', ".")
    }

    /// Internal (slash-separated) binary name, `$` nesting preserved.
    pub fn internal_name(&self) -> String {
        self.name.replace('.', "/")
    }

    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }
}

/// Read-only view of the type registry. Implemented by [`TypeStore`] and by
/// per-invocation overlays such as [`TyContext`].
pub trait TypeEnv {
    fn class(&self, id: ClassId) -> Option<&ClassDef>;
    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef>;
    fn lookup_class(&self, name: &str) -> Option<ClassId>;
    fn well_known(&self) -> &WellKnownTypes;
}

/// Apply a type-parameter substitution. Type variables absent from the
/// mapping pass through unchanged; the walk is purely structural, so it
/// terminates on any (finite) type expression regardless of how the bound
/// graph looks.
pub fn substitute(ty: &Type, mapping: &HashMap<TypeVarId, Type>) -> Type {
    match ty {
        Type::TypeVar(id) => mapping.get(id).cloned().unwrap_or_else(|| ty.clone()),
        Type::Class(ClassType { def, args }) => Type::class(
            *def,
            args.iter().map(|arg| substitute(arg, mapping)).collect(),
        ),
        Type::Wildcard(WildcardBound::Extends(upper)) => Type::Wildcard(WildcardBound::Extends(
            Box::new(substitute(upper, mapping)),
        )),
        Type::Wildcard(WildcardBound::Super(lower)) => {
            Type::Wildcard(WildcardBound::Super(Box::new(substitute(lower, mapping))))
        }
        Type::Array(elem) => Type::array(substitute(elem, mapping)),
        Type::Intersection(parts) => Type::Intersection(
            parts.iter().map(|part| substitute(part, mapping)).collect(),
        ),
        _ => ty.clone(),
    }
}

/// Resolve `Named` spellings to `Class` types where the environment knows the
/// name. Unresolvable names are left alone.
pub fn canonicalize_named(env: &dyn TypeEnv, ty: &Type) -> Type {
    match ty {
        Type::Named(name) => match env.lookup_class(name) {
            Some(id) => Type::class(id, vec![]),
            None => ty.clone(),
        },
        _ => ty.clone(),
    }
}

/// Stable sort key so iteration orders never depend on registration order of
/// equivalent types.
pub fn type_sort_key(env: &dyn TypeEnv, ty: &Type) -> String {
    format::display_type_qualified(env, ty)
}

/// Boxing partner of a primitive, if the environment declares it.
pub fn boxed(env: &dyn TypeEnv, primitive: PrimitiveType) -> Option<Type> {
    env.lookup_class(primitive.boxed_class_name())
        .map(|id| Type::class(id, vec![]))
}

/// Inverse of [`boxed`]: `java.lang.Integer` -> `int`.
pub fn unboxed(env: &dyn TypeEnv, ty: &Type) -> Option<PrimitiveType> {
    let Type::Class(ClassType { def, .. }) = ty else {
        return None;
    };
    let class = env.class(*def)?;
    const ALL: [PrimitiveType; 8] = [
        PrimitiveType::Boolean,
        PrimitiveType::Byte,
        PrimitiveType::Char,
        PrimitiveType::Short,
        PrimitiveType::Int,
        PrimitiveType::Long,
        PrimitiveType::Float,
        PrimitiveType::Double,
    ];
    ALL.into_iter()
        .find(|p| p.boxed_class_name() == class.name)
}
