//! Language backends for harness generation

pub mod cpp;
pub mod java;
pub mod javascript;
pub mod python;

use super::harness::HarnessPlan;
use super::structures::LevelOrder;
use super::types::{GenericType, StructureKind};
use crate::models::Language;

/// How control characters are escaped inside string literals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeStyle {
    /// `\001`
    Octal,
    /// `\x01`
    Hex,
}

/// Delimiters for array literals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceStyle {
    /// `[1, 2]`
    Brackets,
    /// `{1, 2}`
    Braces,
    /// `new int[]{1, 2}` at the top level, `{1, 2}` nested
    NewArray,
}

/// Literal spelling rules of a language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiteralSyntax {
    pub true_literal: &'static str,
    pub false_literal: &'static str,
    pub null_literal: &'static str,
    pub sequence: SequenceStyle,
    /// Appended to `long` values outside the 32-bit range
    pub long_suffix: &'static str,
    pub escape: EscapeStyle,
}

/// One local variable holding a test argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub native_type: String,
    pub expression: String,
}

/// User code split into hoisted imports and the remaining body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedCode {
    pub imports: Vec<String>,
    pub body: String,
}

/// Source fragments one target language contributes to a harness
pub trait LanguageBackend: Send + Sync {
    fn language(&self) -> Language;

    fn syntax(&self) -> &'static LiteralSyntax;

    /// Native spelling of a generic type, `None` if unsupported
    fn native_type(&self, ty: &GenericType) -> Option<String>;

    /// Include/import lines needed for the plan's types
    fn includes(&self, plan: &HarnessPlan) -> Vec<String>;

    /// `TreeNode`/`ListNode` definition
    fn structure_definition(&self, kind: StructureKind) -> String;

    /// Function building a structure from its level-order array
    fn structure_builder(&self, kind: StructureKind) -> String;

    /// Function serializing a structure back to `[1,2,null,3]`
    fn structure_printer(&self, kind: StructureKind) -> String;

    /// Call expression building a non-empty structure
    fn build_expression(&self, kind: StructureKind, level_order: &LevelOrder) -> String;

    /// Helpers the output statement relies on
    fn output_helpers(&self, _plan: &HarnessPlan) -> Vec<String> {
        Vec::new()
    }

    /// Final shape of the helper fragments
    fn wrap_helpers(&self, helpers: Vec<String>) -> Vec<String> {
        helpers
    }

    /// Program entry: bindings, invocation, output and the error trap
    fn entry_point(&self, plan: &HarnessPlan, bindings: &[Binding]) -> String;

    /// Names a parameter or function cannot take: language keywords and
    /// identifiers the entry point uses after the arguments are bound
    fn reserved_names(&self) -> &'static [&'static str];

    fn is_reserved(&self, name: &str) -> bool {
        self.reserved_names().contains(&name)
    }

    /// Split user code before assembly
    fn prepare_user_code(&self, code: &str) -> PreparedCode {
        PreparedCode {
            imports: Vec::new(),
            body: code.to_string(),
        }
    }
}

/// Backend for a language
pub fn backend(language: Language) -> &'static dyn LanguageBackend {
    match language {
        Language::Cpp => &cpp::CppBackend,
        Language::Python => &python::PythonBackend,
        Language::JavaScript => &javascript::JavaScriptBackend,
        Language::Java => &java::JavaBackend,
    }
}

/// Level-order slots rendered with a language's null spelling
pub(crate) fn join_slots(level_order: &LevelOrder, null_literal: &str) -> String {
    level_order
        .slots()
        .iter()
        .map(|slot| match slot {
            Some(value) => value.to_string(),
            None => null_literal.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
