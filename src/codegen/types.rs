//! Generic type vocabulary and the per-language type registry
//!
//! Problems declare parameter and return types with a small generic
//! vocabulary (`int`, `array<string>`, `matrix<int>`, `TreeNode`, ...). The
//! [`TypeRegistry`] maps every (type, language) pair to the native type name
//! and the renderer that turns a JSON value into a source literal.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use super::CodegenError;
use super::languages::{self, EscapeStyle, LiteralSyntax, SequenceStyle};
use super::structures::{LevelOrder, StructureBuilder};
use crate::models::Language;

/// Element types that can appear on their own, in arrays and in matrices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScalarType {
    Int,
    Long,
    Double,
    String,
    Boolean,
}

impl ScalarType {
    pub const ALL: [ScalarType; 5] = [
        ScalarType::Int,
        ScalarType::Long,
        ScalarType::Double,
        ScalarType::String,
        ScalarType::Boolean,
    ];

    /// Canonical vocabulary name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Long => "long",
            Self::Double => "double",
            Self::String => "string",
            Self::Boolean => "boolean",
        }
    }

    fn parse(name: &str) -> Option<Self> {
        match name {
            "int" | "integer" => Some(Self::Int),
            "long" | "longlong" => Some(Self::Long),
            "double" | "float" => Some(Self::Double),
            "string" | "str" | "String" => Some(Self::String),
            "boolean" | "bool" => Some(Self::Boolean),
            _ => None,
        }
    }
}

/// Recursive structures built from level-order arrays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StructureKind {
    Tree,
    List,
}

impl StructureKind {
    pub const ALL: [StructureKind; 2] = [StructureKind::Tree, StructureKind::List];

    /// Type name used in every target language
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Tree => "TreeNode",
            Self::List => "ListNode",
        }
    }

    fn parse(name: &str) -> Option<Self> {
        let bare = name
            .strip_prefix("Optional[")
            .and_then(|rest| rest.strip_suffix(']'))
            .unwrap_or(name)
            .trim_end_matches('*');
        match bare {
            "TreeNode" => Some(Self::Tree),
            "ListNode" => Some(Self::List),
            _ => None,
        }
    }
}

/// A parameter or return type from the generic vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GenericType {
    Scalar(ScalarType),
    Array(ScalarType),
    Matrix(ScalarType),
    Structure(StructureKind),
}

impl GenericType {
    /// Parse a type name, accepting the aliases stored problems use
    /// (`vector<int>`, `List[int]`, `int[]`, `bool`, ...).
    pub fn parse(name: &str) -> Result<Self, CodegenError> {
        let compact: String = name.chars().filter(|c| !c.is_whitespace()).collect();
        parse_compact(&compact).ok_or_else(|| CodegenError::UnknownType(name.trim().to_string()))
    }

    /// The complete closed vocabulary
    pub fn vocabulary() -> Vec<GenericType> {
        let mut types = Vec::with_capacity(ScalarType::ALL.len() * 3 + StructureKind::ALL.len());
        types.extend(ScalarType::ALL.iter().copied().map(Self::Scalar));
        types.extend(ScalarType::ALL.iter().copied().map(Self::Array));
        types.extend(ScalarType::ALL.iter().copied().map(Self::Matrix));
        types.extend(StructureKind::ALL.iter().copied().map(Self::Structure));
        types
    }

    pub fn structure(&self) -> Option<StructureKind> {
        match self {
            Self::Structure(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Scalar element type, if any
    pub fn element(&self) -> Option<ScalarType> {
        match self {
            Self::Scalar(s) | Self::Array(s) | Self::Matrix(s) => Some(*s),
            Self::Structure(_) => None,
        }
    }
}

fn parse_compact(name: &str) -> Option<GenericType> {
    if let Some(scalar) = ScalarType::parse(name) {
        return Some(GenericType::Scalar(scalar));
    }
    if let Some(kind) = StructureKind::parse(name) {
        return Some(GenericType::Structure(kind));
    }
    if let Some(inner) = name.strip_prefix("matrix<").and_then(|rest| rest.strip_suffix('>')) {
        return ScalarType::parse(inner).map(GenericType::Matrix);
    }

    let inner = unwrap_array(name)?;
    match parse_compact(inner)? {
        GenericType::Scalar(scalar) => Some(GenericType::Array(scalar)),
        GenericType::Array(scalar) => Some(GenericType::Matrix(scalar)),
        _ => None,
    }
}

fn unwrap_array(name: &str) -> Option<&str> {
    const WRAPPERS: [(&str, char); 4] = [("array<", '>'), ("vector<", '>'), ("List[", ']'), ("list[", ']')];

    WRAPPERS
        .iter()
        .find_map(|(open, close)| name.strip_prefix(open).and_then(|rest| rest.strip_suffix(*close)))
        .or_else(|| name.strip_suffix("[]"))
}

impl fmt::Display for GenericType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => write!(f, "{}", s.name()),
            Self::Array(s) => write!(f, "array<{}>", s.name()),
            Self::Matrix(s) => write!(f, "matrix<{}>", s.name()),
            Self::Structure(kind) => write!(f, "{}", kind.type_name()),
        }
    }
}

impl FromStr for GenericType {
    type Err = CodegenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Renders a JSON value of a registered type as source text
pub type LiteralRenderer =
    fn(&Value, &GenericType, &TypeEntry, Language) -> Result<String, CodegenError>;

/// Registry entry for one (type, language) pair
#[derive(Clone)]
pub struct TypeEntry {
    pub native_type: String,
    pub render: LiteralRenderer,
}

impl fmt::Debug for TypeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeEntry")
            .field("native_type", &self.native_type)
            .finish_non_exhaustive()
    }
}

/// Data-driven (type, language) registry.
///
/// Built once at startup and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    entries: HashMap<(GenericType, Language), TypeEntry>,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry populated from every language backend's native type table
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for language in Language::ALL {
            let backend = languages::backend(language);
            for ty in GenericType::vocabulary() {
                if let Some(native_type) = backend.native_type(&ty) {
                    registry.register(
                        ty,
                        language,
                        TypeEntry {
                            native_type,
                            render: default_renderer(&ty),
                        },
                    );
                }
            }
        }
        registry
    }

    /// Register (or replace) a mapping
    pub fn register(&mut self, ty: GenericType, language: Language, entry: TypeEntry) {
        self.entries.insert((ty, language), entry);
    }

    /// Remove a mapping, returning it
    pub fn remove(&mut self, ty: &GenericType, language: Language) -> Option<TypeEntry> {
        self.entries.remove(&(*ty, language))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check that every vocabulary type is mapped for every language
    pub fn validate(&self) -> Result<(), CodegenError> {
        for language in Language::ALL {
            for ty in GenericType::vocabulary() {
                self.entry(&ty, language)?;
            }
        }
        Ok(())
    }

    /// Look up a mapping, failing hard when it is absent
    pub fn entry(&self, ty: &GenericType, language: Language) -> Result<&TypeEntry, CodegenError> {
        self.entries
            .get(&(*ty, language))
            .ok_or_else(|| CodegenError::MissingTypeMapping {
                type_name: ty.to_string(),
                language: language.to_string(),
            })
    }

    /// Native type name of a generic type in a language
    pub fn native_type(&self, ty: &GenericType, language: Language) -> Result<&str, CodegenError> {
        Ok(self.entry(ty, language)?.native_type.as_str())
    }

    /// Render a value as a source expression of the given type
    pub fn literal(
        &self,
        value: &Value,
        ty: &GenericType,
        language: Language,
    ) -> Result<String, CodegenError> {
        let entry = self.entry(ty, language)?;
        (entry.render)(value, ty, entry, language)
    }
}

fn default_renderer(ty: &GenericType) -> LiteralRenderer {
    match ty {
        GenericType::Scalar(_) => render_scalar_entry,
        GenericType::Array(_) => render_array_entry,
        GenericType::Matrix(_) => render_matrix_entry,
        GenericType::Structure(_) => render_structure_entry,
    }
}

fn render_scalar_entry(
    value: &Value,
    ty: &GenericType,
    _entry: &TypeEntry,
    language: Language,
) -> Result<String, CodegenError> {
    let scalar = ty.element().ok_or_else(|| CodegenError::UnknownType(ty.to_string()))?;
    render_scalar(value, scalar, languages::backend(language).syntax())
}

fn render_array_entry(
    value: &Value,
    ty: &GenericType,
    entry: &TypeEntry,
    language: Language,
) -> Result<String, CodegenError> {
    let scalar = ty.element().ok_or_else(|| CodegenError::UnknownType(ty.to_string()))?;
    let syntax = languages::backend(language).syntax();
    let items = expect_array(value, ty)?
        .iter()
        .map(|item| render_scalar(item, scalar, syntax))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(wrap_sequence(&items, syntax, Some(&entry.native_type)))
}

fn render_matrix_entry(
    value: &Value,
    ty: &GenericType,
    entry: &TypeEntry,
    language: Language,
) -> Result<String, CodegenError> {
    let scalar = ty.element().ok_or_else(|| CodegenError::UnknownType(ty.to_string()))?;
    let syntax = languages::backend(language).syntax();
    let rows = expect_array(value, ty)?
        .iter()
        .map(|row| {
            let items = expect_array(row, ty)?
                .iter()
                .map(|item| render_scalar(item, scalar, syntax))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(wrap_sequence(&items, syntax, None))
        })
        .collect::<Result<Vec<_>, CodegenError>>()?;
    Ok(wrap_sequence(&rows, syntax, Some(&entry.native_type)))
}

fn render_structure_entry(
    value: &Value,
    ty: &GenericType,
    _entry: &TypeEntry,
    language: Language,
) -> Result<String, CodegenError> {
    let kind = ty.structure().ok_or_else(|| CodegenError::UnknownType(ty.to_string()))?;
    let level_order = LevelOrder::from_value(value, kind)?;
    StructureBuilder::build(&level_order, kind, language)
}

fn expect_array<'a>(value: &'a Value, ty: &GenericType) -> Result<&'a Vec<Value>, CodegenError> {
    value
        .as_array()
        .ok_or_else(|| CodegenError::mismatch(ty, value, "expected an array"))
}

/// Render a single scalar value
pub(crate) fn render_scalar(
    value: &Value,
    scalar: ScalarType,
    syntax: &LiteralSyntax,
) -> Result<String, CodegenError> {
    match scalar {
        ScalarType::Int => {
            let n = value
                .as_i64()
                .ok_or_else(|| CodegenError::mismatch(scalar.name(), value, "expected an integer"))?;
            if i32::try_from(n).is_err() {
                return Err(CodegenError::mismatch(scalar.name(), value, "out of 32-bit range"));
            }
            Ok(n.to_string())
        }
        ScalarType::Long => {
            let n = value
                .as_i64()
                .ok_or_else(|| CodegenError::mismatch(scalar.name(), value, "expected an integer"))?;
            if i32::try_from(n).is_ok() {
                Ok(n.to_string())
            } else {
                Ok(format!("{}{}", n, syntax.long_suffix))
            }
        }
        ScalarType::Double => {
            let n = value
                .as_f64()
                .ok_or_else(|| CodegenError::mismatch(scalar.name(), value, "expected a number"))?;
            Ok(format!("{:?}", n))
        }
        ScalarType::String => value
            .as_str()
            .map(|s| quote_string(s, syntax.escape))
            .ok_or_else(|| CodegenError::mismatch(scalar.name(), value, "expected a string")),
        ScalarType::Boolean => value
            .as_bool()
            .map(|b| if b { syntax.true_literal } else { syntax.false_literal }.to_string())
            .ok_or_else(|| CodegenError::mismatch(scalar.name(), value, "expected a boolean")),
    }
}

/// Join rendered items with the language's sequence delimiters.
///
/// `native_type` is only passed for the outermost sequence, where Java
/// needs a `new T[]` prefix to form an expression.
pub(crate) fn wrap_sequence(items: &[String], syntax: &LiteralSyntax, native_type: Option<&str>) -> String {
    let body = items.join(", ");
    match (syntax.sequence, native_type) {
        (SequenceStyle::Brackets, _) => format!("[{}]", body),
        (SequenceStyle::Braces, _) | (SequenceStyle::NewArray, None) => format!("{{{}}}", body),
        (SequenceStyle::NewArray, Some(native)) => format!("new {}{{{}}}", native, body),
    }
}

/// Double-quote a string with C-family escapes
pub(crate) fn quote_string(text: &str, escape: EscapeStyle) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => match escape {
                EscapeStyle::Octal => out.push_str(&format!("\\{:03o}", c as u32)),
                EscapeStyle::Hex => out.push_str(&format!("\\x{:02x}", c as u32)),
            },
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
