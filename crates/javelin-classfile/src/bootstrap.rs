use std::fmt;

use serde::{Deserialize, Serialize};

/// Method-handle reference kind. Lambda instantiation only ever links through
/// `invokestatic` handles to the metafactories, so the other JVMS 4.4.8 kinds
/// are not modeled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceKind {
    InvokeStatic,
}

impl ReferenceKind {
    pub fn keyword(self) -> &'static str {
        match self {
            ReferenceKind::InvokeStatic => "invokestatic",
        }
    }
}

/// A symbolic method reference: internal owner name, method name, descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodRef {
    pub owner: String,
    pub name: String,
    pub descriptor: String,
}

impl MethodRef {
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}:{}", self.owner, self.name, self.descriptor)
    }
}

/// One static argument of a bootstrap method entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BootstrapArg {
    /// A `CONSTANT_MethodType` — rendered by its descriptor.
    MethodType(String),
    /// A `CONSTANT_MethodHandle` with its reference kind.
    MethodHandle(ReferenceKind, MethodRef),
    /// A `CONSTANT_Integer` (the altMetafactory flag word and marker count).
    Integer(i32),
    /// A `CONSTANT_Class` — internal name.
    ClassName(String),
}

impl fmt::Display for BootstrapArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootstrapArg::MethodType(descriptor) => f.write_str(descriptor),
            BootstrapArg::MethodHandle(kind, method) => {
                write!(f, "{} {}", kind.keyword(), method)
            }
            BootstrapArg::Integer(value) => write!(f, "{value}"),
            BootstrapArg::ClassName(name) => f.write_str(name),
        }
    }
}

/// One entry of the `BootstrapMethods` attribute.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapEntry {
    pub kind: ReferenceKind,
    pub method: MethodRef,
    pub args: Vec<BootstrapArg>,
}

/// Append-only per-class bootstrap method table.
///
/// Indices are assigned in first-use order: index 0 is the first
/// `invokedynamic` site encountered in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapMethods {
    entries: Vec<BootstrapEntry>,
}

impl BootstrapMethods {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, returning its attribute index.
    pub fn push(&mut self, entry: BootstrapEntry) -> u16 {
        let index = self.entries.len() as u16;
        self.entries.push(entry);
        index
    }

    pub fn entries(&self) -> &[BootstrapEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the attribute in the javap-like verification format, one block
    /// per entry:
    ///
    /// ```text
    /// 0: invokestatic java/lang/invoke/LambdaMetafactory.altMetafactory:(...)Ljava/lang/invoke/CallSite;
    ///   Method arguments:
    ///     ()I
    ///     invokestatic X.lambda$0:()I
    ///     ()I
    ///     1
    /// ```
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for (index, entry) in self.entries.iter().enumerate() {
            out.push_str(&format!(
                "{}: {} {}\n",
                index,
                entry.kind.keyword(),
                entry.method
            ));
            out.push_str("  Method arguments:\n");
            for arg in &entry.args {
                out.push_str(&format!("    {arg}\n"));
            }
        }
        out
    }
}

const METAFACTORY_OWNER: &str = "java/lang/invoke/LambdaMetafactory";

/// `LambdaMetafactory.metafactory` — the plain three-argument bootstrap.
pub fn metafactory_ref() -> MethodRef {
    MethodRef::new(
        METAFACTORY_OWNER,
        "metafactory",
        "(Ljava/lang/invoke/MethodHandles$Lookup;Ljava/lang/String;Ljava/lang/invoke/MethodType;\
         Ljava/lang/invoke/MethodType;Ljava/lang/invoke/MethodHandle;Ljava/lang/invoke/MethodType;)\
         Ljava/lang/invoke/CallSite;",
    )
}

/// `LambdaMetafactory.altMetafactory` — the extended form carrying a flag
/// word and optional marker interfaces.
pub fn alt_metafactory_ref() -> MethodRef {
    MethodRef::new(
        METAFACTORY_OWNER,
        "altMetafactory",
        "(Ljava/lang/invoke/MethodHandles$Lookup;Ljava/lang/String;Ljava/lang/invoke/MethodType;\
         [Ljava/lang/Object;)Ljava/lang/invoke/CallSite;",
    )
}
