//! JavaScript backend
//!
//! Solutions are free functions named after the problem's function name.

use super::{join_slots, Binding, EscapeStyle, LanguageBackend, LiteralSyntax, SequenceStyle};
use crate::codegen::harness::HarnessPlan;
use crate::codegen::structures::LevelOrder;
use crate::codegen::template::indent;
use crate::codegen::types::{GenericType, ScalarType, StructureKind};
use crate::models::Language;

static SYNTAX: LiteralSyntax = LiteralSyntax {
    true_literal: "true",
    false_literal: "false",
    null_literal: "null",
    sequence: SequenceStyle::Brackets,
    long_suffix: "",
    escape: EscapeStyle::Hex,
};

const TREE_DEFINITION: &str = r#"function TreeNode(val, left, right) {
    this.val = (val === undefined ? 0 : val);
    this.left = (left === undefined ? null : left);
    this.right = (right === undefined ? null : right);
}"#;

const LIST_DEFINITION: &str = r#"function ListNode(val, next) {
    this.val = (val === undefined ? 0 : val);
    this.next = (next === undefined ? null : next);
}"#;

const TREE_BUILDER: &str = r#"function buildTree(values) {
    if (!values || values.length === 0 || values[0] === null) return null;
    const root = new TreeNode(values[0]);
    const pending = [root];
    let head = 0;
    let i = 1;
    while (head < pending.length && i < values.length) {
        const node = pending[head++];
        if (i < values.length && values[i] !== null) {
            node.left = new TreeNode(values[i]);
            pending.push(node.left);
        }
        i++;
        if (i < values.length && values[i] !== null) {
            node.right = new TreeNode(values[i]);
            pending.push(node.right);
        }
        i++;
    }
    return root;
}"#;

const TREE_PRINTER: &str = r#"function serializeTree(root) {
    const slots = [];
    const pending = [root];
    let head = 0;
    while (head < pending.length) {
        const node = pending[head++];
        if (node === null || node === undefined) {
            slots.push("null");
            continue;
        }
        slots.push(String(node.val));
        pending.push(node.left);
        pending.push(node.right);
    }
    while (slots.length > 0 && slots[slots.length - 1] === "null") slots.pop();
    return "[" + slots.join(",") + "]";
}"#;

const LIST_BUILDER: &str = r#"function buildList(values) {
    const dummy = new ListNode();
    let tail = dummy;
    for (const value of values) {
        tail.next = new ListNode(value);
        tail = tail.next;
    }
    return dummy.next;
}"#;

const LIST_PRINTER: &str = r#"function serializeList(head) {
    const values = [];
    for (let node = head; node; node = node.next) values.push(String(node.val));
    return "[" + values.join(",") + "]";
}"#;

const RESERVED: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for", "function",
    "if", "implements", "import", "in", "instanceof", "interface", "let", "new", "null",
    "package", "private", "protected", "public", "return", "static", "super", "switch", "this",
    "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield", "console",
    "JSON", "buildTree", "buildList", "serializeTree", "serializeList",
];

pub struct JavaScriptBackend;

fn scalar_type(scalar: ScalarType) -> &'static str {
    match scalar {
        ScalarType::Int | ScalarType::Long | ScalarType::Double => "number",
        ScalarType::String => "string",
        ScalarType::Boolean => "boolean",
    }
}

impl LanguageBackend for JavaScriptBackend {
    fn language(&self) -> Language {
        Language::JavaScript
    }

    fn syntax(&self) -> &'static LiteralSyntax {
        &SYNTAX
    }

    fn native_type(&self, ty: &GenericType) -> Option<String> {
        Some(match ty {
            GenericType::Scalar(s) => scalar_type(*s).to_string(),
            GenericType::Array(s) => format!("{}[]", scalar_type(*s)),
            GenericType::Matrix(s) => format!("{}[][]", scalar_type(*s)),
            GenericType::Structure(kind) => kind.type_name().to_string(),
        })
    }

    fn includes(&self, _plan: &HarnessPlan) -> Vec<String> {
        Vec::new()
    }

    fn structure_definition(&self, kind: StructureKind) -> String {
        match kind {
            StructureKind::Tree => TREE_DEFINITION.to_string(),
            StructureKind::List => LIST_DEFINITION.to_string(),
        }
    }

    fn structure_builder(&self, kind: StructureKind) -> String {
        match kind {
            StructureKind::Tree => TREE_BUILDER.to_string(),
            StructureKind::List => LIST_BUILDER.to_string(),
        }
    }

    fn structure_printer(&self, kind: StructureKind) -> String {
        match kind {
            StructureKind::Tree => TREE_PRINTER.to_string(),
            StructureKind::List => LIST_PRINTER.to_string(),
        }
    }

    fn build_expression(&self, kind: StructureKind, level_order: &LevelOrder) -> String {
        let slots = join_slots(level_order, SYNTAX.null_literal);
        match kind {
            StructureKind::Tree => format!("buildTree([{}])", slots),
            StructureKind::List => format!("buildList([{}])", slots),
        }
    }

    fn entry_point(&self, plan: &HarnessPlan, bindings: &[Binding]) -> String {
        let mut body: Vec<String> = bindings
            .iter()
            .map(|b| format!("const {} = {};", b.name, b.expression))
            .collect();
        let arguments = bindings.iter().map(|b| b.name.as_str()).collect::<Vec<_>>().join(", ");
        body.push(format!("const result = {}({});", plan.function_name, arguments));
        body.push(match plan.return_type {
            GenericType::Scalar(_) => "console.log(result);".to_string(),
            GenericType::Array(_) | GenericType::Matrix(_) => {
                "console.log(JSON.stringify(result));".to_string()
            }
            GenericType::Structure(StructureKind::Tree) => {
                "console.log(serializeTree(result));".to_string()
            }
            GenericType::Structure(StructureKind::List) => {
                "console.log(serializeList(result));".to_string()
            }
        });

        format!(
            "try {{\n{}\n}} catch (error) {{\n    console.log(\"Error: \" + (error && error.message ? error.message : error));\n}}",
            indent(&body.join("\n"), 1)
        )
    }

    fn reserved_names(&self) -> &'static [&'static str] {
        RESERVED
    }
}
