//! C++ backend

use super::{join_slots, Binding, EscapeStyle, LanguageBackend, LiteralSyntax, SequenceStyle};
use crate::codegen::harness::HarnessPlan;
use crate::codegen::structures::LevelOrder;
use crate::codegen::template::indent;
use crate::codegen::types::{GenericType, ScalarType, StructureKind};
use crate::models::Language;

static SYNTAX: LiteralSyntax = LiteralSyntax {
    true_literal: "true",
    false_literal: "false",
    null_literal: "nullptr",
    sequence: SequenceStyle::Braces,
    long_suffix: "LL",
    escape: EscapeStyle::Octal,
};

/// Headers every C++ harness includes
const BASE_HEADERS: [&str; 8] = [
    "iostream",
    "string",
    "vector",
    "algorithm",
    "unordered_map",
    "unordered_set",
    "map",
    "climits",
];

const TREE_DEFINITION: &str = r#"struct TreeNode {
    int val;
    TreeNode *left;
    TreeNode *right;
    TreeNode() : val(0), left(nullptr), right(nullptr) {}
    TreeNode(int x) : val(x), left(nullptr), right(nullptr) {}
    TreeNode(int x, TreeNode *left, TreeNode *right) : val(x), left(left), right(right) {}
};"#;

const LIST_DEFINITION: &str = r#"struct ListNode {
    int val;
    ListNode *next;
    ListNode() : val(0), next(nullptr) {}
    ListNode(int x) : val(x), next(nullptr) {}
    ListNode(int x, ListNode *next) : val(x), next(next) {}
};"#;

const TREE_BUILDER: &str = r#"TreeNode* buildTree(const vector<int>& values, const vector<bool>& present) {
    if (values.empty() || !present[0]) return nullptr;
    TreeNode* root = new TreeNode(values[0]);
    queue<TreeNode*> pending;
    pending.push(root);
    size_t i = 1;
    while (!pending.empty() && i < values.size()) {
        TreeNode* node = pending.front();
        pending.pop();
        if (i < values.size() && present[i]) {
            node->left = new TreeNode(values[i]);
            pending.push(node->left);
        }
        i++;
        if (i < values.size() && present[i]) {
            node->right = new TreeNode(values[i]);
            pending.push(node->right);
        }
        i++;
    }
    return root;
}"#;

const TREE_PRINTER: &str = r#"string serializeTree(TreeNode* root) {
    vector<string> slots;
    queue<TreeNode*> pending;
    pending.push(root);
    while (!pending.empty()) {
        TreeNode* node = pending.front();
        pending.pop();
        if (node) {
            slots.push_back(to_string(node->val));
            pending.push(node->left);
            pending.push(node->right);
        } else {
            slots.push_back("null");
        }
    }
    while (!slots.empty() && slots.back() == "null") slots.pop_back();
    string out = "[";
    for (size_t i = 0; i < slots.size(); i++) {
        if (i > 0) out += ",";
        out += slots[i];
    }
    return out + "]";
}"#;

const LIST_BUILDER: &str = r#"ListNode* buildList(const vector<int>& values) {
    ListNode dummy;
    ListNode* tail = &dummy;
    for (int value : values) {
        tail->next = new ListNode(value);
        tail = tail->next;
    }
    return dummy.next;
}"#;

const LIST_PRINTER: &str = r#"string serializeList(ListNode* head) {
    string out = "[";
    for (ListNode* node = head; node; node = node->next) {
        if (node != head) out += ",";
        out += to_string(node->val);
    }
    return out + "]";
}"#;

const VALUE_PRINTERS: &str = r#"void printValue(int value) { cout << value; }
void printValue(long value) { cout << value; }
void printValue(long long value) { cout << value; }
void printValue(double value) { cout << value; }
void printValue(bool value) { cout << (value ? "true" : "false"); }
void printValue(const string& value) {
    cout << '"';
    for (char c : value) {
        if (c == '"' || c == '\\') cout << '\\';
        cout << c;
    }
    cout << '"';
}

template <typename T>
void printValue(const vector<T>& values) {
    cout << '[';
    for (size_t i = 0; i < values.size(); i++) {
        if (i > 0) cout << ',';
        printValue(values[i]);
    }
    cout << ']';
}"#;

const RESERVED: &[&str] = &[
    "alignas", "alignof", "and", "and_eq", "asm", "auto", "bitand", "bitor", "bool", "break",
    "case", "catch", "char", "char16_t", "char32_t", "class", "compl", "const", "constexpr",
    "const_cast", "continue", "decltype", "default", "delete", "do", "double", "dynamic_cast",
    "else", "enum", "explicit", "export", "extern", "false", "float", "for", "friend", "goto",
    "if", "inline", "int", "long", "mutable", "namespace", "new", "noexcept", "not", "not_eq",
    "nullptr", "operator", "or", "or_eq", "private", "protected", "public", "register",
    "reinterpret_cast", "return", "short", "signed", "sizeof", "static", "static_assert",
    "static_cast", "struct", "switch", "template", "this", "thread_local", "throw", "true",
    "try", "typedef", "typeid", "typename", "union", "unsigned", "using", "virtual", "void",
    "volatile", "wchar_t", "while", "xor", "xor_eq", "main", "Solution", "TreeNode",
    "ListNode", "buildTree", "buildList", "serializeTree", "serializeList", "printValue",
    "vector", "string", "cout", "endl", "setprecision",
];

pub struct CppBackend;

fn scalar_type(scalar: ScalarType) -> &'static str {
    match scalar {
        ScalarType::Int => "int",
        ScalarType::Long => "long long",
        ScalarType::Double => "double",
        ScalarType::String => "string",
        ScalarType::Boolean => "bool",
    }
}

impl LanguageBackend for CppBackend {
    fn language(&self) -> Language {
        Language::Cpp
    }

    fn syntax(&self) -> &'static LiteralSyntax {
        &SYNTAX
    }

    fn native_type(&self, ty: &GenericType) -> Option<String> {
        Some(match ty {
            GenericType::Scalar(s) => scalar_type(*s).to_string(),
            GenericType::Array(s) => format!("vector<{}>", scalar_type(*s)),
            GenericType::Matrix(s) => format!("vector<vector<{}>>", scalar_type(*s)),
            GenericType::Structure(kind) => format!("{}*", kind.type_name()),
        })
    }

    fn includes(&self, plan: &HarnessPlan) -> Vec<String> {
        let mut headers: Vec<&str> = BASE_HEADERS.to_vec();
        if plan.structures.contains(&StructureKind::Tree) {
            headers.push("queue");
        }
        if plan.return_type.element() == Some(ScalarType::Double) {
            headers.push("iomanip");
        }

        let mut lines: Vec<String> = headers.iter().map(|h| format!("#include <{}>", h)).collect();
        lines.push(String::new());
        lines.push("using namespace std;".to_string());
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
        match kind {
            // Absent slots hold 0 and are masked out by `present` (C++14, no std::optional)
            StructureKind::Tree => {
                let slots = level_order.slots();
                let values = slots
                    .iter()
                    .map(|slot| slot.unwrap_or(0).to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                let present = slots
                    .iter()
                    .map(|slot| if slot.is_some() { "true" } else { "false" })
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("buildTree({{{}}}, {{{}}})", values, present)
            }
            StructureKind::List => format!("buildList({{{}}})", join_slots(level_order, "0")),
        }
    }

    fn output_helpers(&self, plan: &HarnessPlan) -> Vec<String> {
        match plan.return_type {
            GenericType::Array(_) | GenericType::Matrix(_) => vec![VALUE_PRINTERS.to_string()],
            _ => Vec::new(),
        }
    }

    fn entry_point(&self, plan: &HarnessPlan, bindings: &[Binding]) -> String {
        let mut body: Vec<String> = bindings
            .iter()
            .map(|b| format!("{} {} = {};", b.native_type, b.name, b.expression))
            .collect();
        let arguments = bindings.iter().map(|b| b.name.as_str()).collect::<Vec<_>>().join(", ");
        body.push("Solution sol;".to_string());
        body.push(format!("auto result = sol.{}({});", plan.function_name, arguments));

        if plan.return_type.element() == Some(ScalarType::Double) {
            body.push("cout << setprecision(15);".to_string());
        }
        body.push(match plan.return_type {
            GenericType::Scalar(ScalarType::Boolean) => {
                "cout << (result ? \"true\" : \"false\") << endl;".to_string()
            }
            GenericType::Scalar(_) => "cout << result << endl;".to_string(),
            GenericType::Array(_) | GenericType::Matrix(_) => {
                "printValue(result);\ncout << endl;".to_string()
            }
            GenericType::Structure(StructureKind::Tree) => {
                "cout << serializeTree(result) << endl;".to_string()
            }
            GenericType::Structure(StructureKind::List) => {
                "cout << serializeList(result) << endl;".to_string()
            }
        });

        format!(
            "int main() {{\n    try {{\n{}\n    }} catch (const exception& e) {{\n        cout << \"Error: \" << e.what() << endl;\n    }} catch (...) {{\n        cout << \"Error: unknown exception\" << endl;\n    }}\n    return 0;\n}}",
            indent(&body.join("\n"), 2)
        )
    }

    fn reserved_names(&self) -> &'static [&'static str] {
        RESERVED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::harness::PlannedParameter;

    fn plan(return_type: &str) -> HarnessPlan {
        HarnessPlan::new(
            "solve",
            vec![PlannedParameter::new("root", GenericType::parse("TreeNode").unwrap())],
            GenericType::parse(return_type).unwrap(),
        )
    }

    #[test]
    fn test_includes_follow_types() {
        let includes = CppBackend.includes(&plan("double")).join("\n");
        assert!(includes.contains("#include <queue>"));
        assert!(!includes.contains("optional"));
        assert!(includes.contains("#include <iomanip>"));
        assert!(includes.ends_with("using namespace std;"));

        let includes = CppBackend.includes(&plan("int")).join("\n");
        assert!(!includes.contains("iomanip"));
    }

    #[test]
    fn test_entry_point_prints_by_return_type() {
        let bindings = vec![Binding {
            name: "root".to_string(),
            native_type: "TreeNode*".to_string(),
            expression: "buildTree({1})".to_string(),
        }];

        let entry = CppBackend.entry_point(&plan("TreeNode"), &bindings);
        assert!(entry.contains("        TreeNode* root = buildTree({1});"));
        assert!(entry.contains("auto result = sol.solve(root);"));
        assert!(entry.contains("cout << serializeTree(result) << endl;"));
        assert!(entry.contains("cout << \"Error: \" << e.what() << endl;"));

        let entry = CppBackend.entry_point(&plan("array<int>"), &bindings);
        assert!(entry.contains("printValue(result);"));
        assert_eq!(CppBackend.output_helpers(&plan("array<int>")).len(), 1);
        assert!(CppBackend.output_helpers(&plan("int")).is_empty());
    }

    #[test]
    fn test_tree_builder_avoids_cpp17() {
        let level_order = LevelOrder::new(vec![Some(4), None, Some(-7), None, Some(3)]);
        assert_eq!(
            CppBackend.build_expression(StructureKind::Tree, &level_order),
            "buildTree({4, 0, -7, 0, 3}, {true, false, true, false, true})"
        );
        let builder = CppBackend.structure_builder(StructureKind::Tree);
        assert!(builder.contains("const vector<bool>& present"));
        assert!(!builder.contains("optional"));
    }
}
