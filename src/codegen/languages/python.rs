//! Python backend

use super::{join_slots, Binding, EscapeStyle, LanguageBackend, LiteralSyntax, SequenceStyle};
use crate::codegen::harness::HarnessPlan;
use crate::codegen::structures::LevelOrder;
use crate::codegen::template::indent;
use crate::codegen::types::{GenericType, ScalarType, StructureKind};
use crate::models::Language;

static SYNTAX: LiteralSyntax = LiteralSyntax {
    true_literal: "True",
    false_literal: "False",
    null_literal: "None",
    sequence: SequenceStyle::Brackets,
    long_suffix: "",
    escape: EscapeStyle::Hex,
};

const TREE_DEFINITION: &str = r#"class TreeNode:
    def __init__(self, val=0, left=None, right=None):
        self.val = val
        self.left = left
        self.right = right"#;

const LIST_DEFINITION: &str = r#"class ListNode:
    def __init__(self, val=0, next=None):
        self.val = val
        self.next = next"#;

const TREE_BUILDER: &str = r#"def build_tree(values):
    if not values or values[0] is None:
        return None
    root = TreeNode(values[0])
    pending = deque([root])
    i = 1
    while pending and i < len(values):
        node = pending.popleft()
        if i < len(values) and values[i] is not None:
            node.left = TreeNode(values[i])
            pending.append(node.left)
        i += 1
        if i < len(values) and values[i] is not None:
            node.right = TreeNode(values[i])
            pending.append(node.right)
        i += 1
    return root"#;

const TREE_PRINTER: &str = r#"def serialize_tree(root):
    slots = []
    pending = deque([root])
    while pending:
        node = pending.popleft()
        if node is None:
            slots.append("null")
            continue
        slots.append(str(node.val))
        pending.append(node.left)
        pending.append(node.right)
    while slots and slots[-1] == "null":
        slots.pop()
    return "[" + ",".join(slots) + "]""#;

const LIST_BUILDER: &str = r#"def build_list(values):
    dummy = ListNode()
    tail = dummy
    for value in values:
        tail.next = ListNode(value)
        tail = tail.next
    return dummy.next"#;

const LIST_PRINTER: &str = r#"def serialize_list(head):
    values = []
    while head is not None:
        values.append(str(head.val))
        head = head.next
    return "[" + ",".join(values) + "]""#;

/// Keywords plus the names the entry function reads after binding arguments
const RESERVED: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield", "Solution", "Exception", "print", "json", "build_tree",
    "build_list", "serialize_tree", "serialize_list",
];

pub struct PythonBackend;

fn scalar_type(scalar: ScalarType) -> &'static str {
    match scalar {
        ScalarType::Int | ScalarType::Long => "int",
        ScalarType::Double => "float",
        ScalarType::String => "str",
        ScalarType::Boolean => "bool",
    }
}

impl LanguageBackend for PythonBackend {
    fn language(&self) -> Language {
        Language::Python
    }

    fn syntax(&self) -> &'static LiteralSyntax {
        &SYNTAX
    }

    fn native_type(&self, ty: &GenericType) -> Option<String> {
        Some(match ty {
            GenericType::Scalar(s) => scalar_type(*s).to_string(),
            GenericType::Array(s) => format!("List[{}]", scalar_type(*s)),
            GenericType::Matrix(s) => format!("List[List[{}]]", scalar_type(*s)),
            GenericType::Structure(kind) => format!("Optional[{}]", kind.type_name()),
        })
    }

    fn includes(&self, plan: &HarnessPlan) -> Vec<String> {
        let mut lines = vec!["from typing import List, Optional".to_string()];
        if plan.structures.contains(&StructureKind::Tree) {
            lines.push("from collections import deque".to_string());
        }
        if matches!(plan.return_type, GenericType::Array(_) | GenericType::Matrix(_)) {
            lines.push("import json".to_string());
        }
        lines
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
            StructureKind::Tree => format!("build_tree([{}])", slots),
            StructureKind::List => format!("build_list([{}])", slots),
        }
    }

    fn entry_point(&self, plan: &HarnessPlan, bindings: &[Binding]) -> String {
        let mut body: Vec<String> = bindings
            .iter()
            .map(|b| format!("{} = {}", b.name, b.expression))
            .collect();
        let arguments = bindings.iter().map(|b| b.name.as_str()).collect::<Vec<_>>().join(", ");
        body.push("sol = Solution()".to_string());
        body.push(format!("result = sol.{}({})", plan.function_name, arguments));
        body.push(match plan.return_type {
            GenericType::Scalar(_) => "print(result)".to_string(),
            GenericType::Array(_) | GenericType::Matrix(_) => {
                "print(json.dumps(result, separators=(\",\", \":\")))".to_string()
            }
            GenericType::Structure(StructureKind::Tree) => "print(serialize_tree(result))".to_string(),
            GenericType::Structure(StructureKind::List) => "print(serialize_list(result))".to_string(),
        });

        // Arguments are locals of the entry function so they never shadow
        // module globals the user code reads
        let main = format!(
            "try:\n{}\nexcept Exception as e:\n    print(f\"Error: {{e}}\")",
            indent(&body.join("\n"), 1)
        );
        format!("def _harness_main():\n{}\n\n\n_harness_main()", indent(&main, 1))
    }

    fn reserved_names(&self) -> &'static [&'static str] {
        RESERVED
    }
}
