use serde::{Deserialize, Serialize};

/// Java language level the engines are operating at.
///
/// Only the levels the supported constructs care about are modeled: the
/// diamond operator is gated below [`SourceLevel::Java7`], lambda expressions
/// and default methods below [`SourceLevel::Java8`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SourceLevel {
    Java6,
    Java7,
    Java8,
}

impl SourceLevel {
    pub fn supports_diamond(self) -> bool {
        self >= SourceLevel::Java7
    }

    pub fn supports_lambdas(self) -> bool {
        self >= SourceLevel::Java8
    }

    /// Generic varargs declarations get a heap-pollution warning from Java 7.
    pub fn reports_heap_pollution(self) -> bool {
        self >= SourceLevel::Java7
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Toggle {
    Enabled,
    Disabled,
}

impl Toggle {
    pub fn is_enabled(self) -> bool {
        matches!(self, Toggle::Enabled)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnusedTypeParameter {
    Error,
    Ignore,
}

/// Explicit configuration value threaded through every engine entry point.
///
/// There is deliberately no global options state anywhere in the workspace:
/// substitution, inference and diagnostic emission all take the options they
/// need as a parameter, so two compilations with different settings can run
/// back to back without influencing each other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerOptions {
    pub source_level: SourceLevel,
    /// Whether raw-type problems the user cannot fix locally (rawness forced
    /// by a declaration elsewhere) are still reported.
    pub report_unavoidable_generic_type_problems: Toggle,
    pub report_unused_type_parameter: UnusedTypeParameter,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            source_level: SourceLevel::Java8,
            report_unavoidable_generic_type_problems: Toggle::Enabled,
            report_unused_type_parameter: UnusedTypeParameter::Ignore,
        }
    }
}
