//! Java backend
//!
//! The sandbox compiles `Main.java`, so the entry class is `public class
//! Main` and every other class (user code included) is package-private.

use super::{
    join_slots, Binding, EscapeStyle, LanguageBackend, LiteralSyntax, PreparedCode, SequenceStyle,
};
use crate::codegen::harness::HarnessPlan;
use crate::codegen::structures::LevelOrder;
use crate::codegen::template::indent;
use crate::codegen::types::{GenericType, ScalarType, StructureKind};
use crate::models::Language;

static SYNTAX: LiteralSyntax = LiteralSyntax {
    true_literal: "true",
    false_literal: "false",
    null_literal: "null",
    sequence: SequenceStyle::NewArray,
    long_suffix: "L",
    escape: EscapeStyle::Octal,
};

const TREE_DEFINITION: &str = r#"class TreeNode {
    int val;
    TreeNode left;
    TreeNode right;
    TreeNode() {}
    TreeNode(int val) { this.val = val; }
    TreeNode(int val, TreeNode left, TreeNode right) {
        this.val = val;
        this.left = left;
        this.right = right;
    }
}"#;

const LIST_DEFINITION: &str = r#"class ListNode {
    int val;
    ListNode next;
    ListNode() {}
    ListNode(int val) { this.val = val; }
    ListNode(int val, ListNode next) { this.val = val; this.next = next; }
}"#;

const TREE_BUILDER: &str = r#"static TreeNode buildTree(Integer[] values) {
    if (values.length == 0 || values[0] == null) return null;
    TreeNode root = new TreeNode(values[0]);
    Deque<TreeNode> pending = new ArrayDeque<>();
    pending.add(root);
    int i = 1;
    while (!pending.isEmpty() && i < values.length) {
        TreeNode node = pending.poll();
        if (i < values.length && values[i] != null) {
            node.left = new TreeNode(values[i]);
            pending.add(node.left);
        }
        i++;
        if (i < values.length && values[i] != null) {
            node.right = new TreeNode(values[i]);
            pending.add(node.right);
        }
        i++;
    }
    return root;
}"#;

const TREE_PRINTER: &str = r#"static String serializeTree(TreeNode root) {
    List<String> slots = new ArrayList<>();
    Queue<TreeNode> pending = new LinkedList<>();
    pending.add(root);
    while (!pending.isEmpty()) {
        TreeNode node = pending.poll();
        if (node == null) {
            slots.add("null");
            continue;
        }
        slots.add(String.valueOf(node.val));
        pending.add(node.left);
        pending.add(node.right);
    }
    while (!slots.isEmpty() && slots.get(slots.size() - 1).equals("null")) {
        slots.remove(slots.size() - 1);
    }
    return "[" + String.join(",", slots) + "]";
}"#;

const LIST_BUILDER: &str = r#"static ListNode buildList(int[] values) {
    ListNode dummy = new ListNode();
    ListNode tail = dummy;
    for (int value : values) {
        tail.next = new ListNode(value);
        tail = tail.next;
    }
    return dummy.next;
}"#;

const LIST_PRINTER: &str = r#"static String serializeList(ListNode head) {
    List<String> values = new ArrayList<>();
    for (ListNode node = head; node != null; node = node.next) {
        values.add(String.valueOf(node.val));
    }
    return "[" + String.join(",", values) + "]";
}"#;

const VALUE_FORMATTER: &str = r#"static String format(Object value) {
    if (value == null) return "null";
    if (value instanceof String) return quote((String) value);
    if (value.getClass().isArray()) {
        StringBuilder out = new StringBuilder("[");
        int length = java.lang.reflect.Array.getLength(value);
        for (int i = 0; i < length; i++) {
            if (i > 0) out.append(',');
            out.append(format(java.lang.reflect.Array.get(value, i)));
        }
        return out.append(']').toString();
    }
    if (value instanceof Iterable) {
        StringBuilder out = new StringBuilder("[");
        boolean first = true;
        for (Object item : (Iterable<?>) value) {
            if (!first) out.append(',');
            out.append(format(item));
            first = false;
        }
        return out.append(']').toString();
    }
    return String.valueOf(value);
}

static String quote(String text) {
    return "\"" + text.replace("\\", "\\\\").replace("\"", "\\\"") + "\"";
}"#;

/// `args` is the `main` parameter; `Harness` and `System` would be obscured by
/// a local of the same name
const RESERVED: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally",
    "float", "for", "goto", "if", "implements", "import", "instanceof", "int", "interface",
    "long", "native", "new", "package", "private", "protected", "public", "return", "short",
    "static", "strictfp", "super", "switch", "synchronized", "this", "throw", "throws",
    "transient", "try", "void", "volatile", "while", "true", "false", "null", "_", "args",
    "Harness", "System", "Solution",
];

pub struct JavaBackend;

fn scalar_type(scalar: ScalarType) -> &'static str {
    match scalar {
        ScalarType::Int => "int",
        ScalarType::Long => "long",
        ScalarType::Double => "double",
        ScalarType::String => "String",
        ScalarType::Boolean => "boolean",
    }
}

impl LanguageBackend for JavaBackend {
    fn language(&self) -> Language {
        Language::Java
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
        vec!["import java.util.*;".to_string()]
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
            StructureKind::Tree => format!("Harness.buildTree(new Integer[]{{{}}})", slots),
            StructureKind::List => format!("Harness.buildList(new int[]{{{}}})", slots),
        }
    }

    fn output_helpers(&self, plan: &HarnessPlan) -> Vec<String> {
        match plan.return_type {
            GenericType::Array(_) | GenericType::Matrix(_) => vec![VALUE_FORMATTER.to_string()],
            _ => Vec::new(),
        }
    }

    /// Static helpers live in a package-private `Harness` class
    fn wrap_helpers(&self, helpers: Vec<String>) -> Vec<String> {
        if helpers.is_empty() {
            return helpers;
        }
        vec![format!("class Harness {{\n{}\n}}", indent(&helpers.join("\n\n"), 1))]
    }

    fn entry_point(&self, plan: &HarnessPlan, bindings: &[Binding]) -> String {
        let mut body: Vec<String> = bindings
            .iter()
            .map(|b| format!("{} {} = {};", b.native_type, b.name, b.expression))
            .collect();
        let arguments = bindings.iter().map(|b| b.name.as_str()).collect::<Vec<_>>().join(", ");
        body.push("Solution sol = new Solution();".to_string());
        body.push(format!("var result = sol.{}({});", plan.function_name, arguments));
        body.push(match plan.return_type {
            GenericType::Scalar(_) => "System.out.println(result);".to_string(),
            GenericType::Array(_) | GenericType::Matrix(_) => {
                "System.out.println(Harness.format(result));".to_string()
            }
            GenericType::Structure(StructureKind::Tree) => {
                "System.out.println(Harness.serializeTree(result));".to_string()
            }
            GenericType::Structure(StructureKind::List) => {
                "System.out.println(Harness.serializeList(result));".to_string()
            }
        });

        let main = format!(
            "public static void main(String[] args) {{\n    try {{\n{}\n    }} catch (Throwable e) {{\n        System.out.println(\"Error: \" + (e.getMessage() != null ? e.getMessage() : e.toString()));\n    }}\n}}",
            indent(&body.join("\n"), 2)
        );
        format!("public class Main {{\n{}\n}}", indent(&main, 1))
    }

    fn reserved_names(&self) -> &'static [&'static str] {
        RESERVED
    }

    /// Hoist leading `import` lines and drop `package` declarations; a
    /// `public class` would clash with `Main`, so the modifier is removed.
    fn prepare_user_code(&self, code: &str) -> PreparedCode {
        let mut imports = Vec::new();
        let mut body = Vec::new();
        let mut in_header = true;

        for line in code.lines() {
            let trimmed = line.trim();
            if in_header {
                if trimmed.starts_with("import ") {
                    imports.push(trimmed.to_string());
                    continue;
                }
                if trimmed.starts_with("package ") {
                    continue;
                }
                if !trimmed.is_empty() && !trimmed.starts_with("//") {
                    in_header = false;
                }
            }
            match line.strip_prefix("public class ") {
                Some(rest) => body.push(format!("class {}", rest)),
                None => body.push(line.to_string()),
            }
        }

        PreparedCode {
            imports,
            body: body.join("\n"),
        }
    }
}
