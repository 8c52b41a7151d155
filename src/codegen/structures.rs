//! Level-order trees and linked lists
//!
//! Structures travel as level-order arrays: index 0 is the root, `null` marks
//! an absent child and trailing nulls may be omitted. Linked lists are the
//! same array read left to right.

use std::collections::VecDeque;

use serde_json::Value;

use super::CodegenError;
use super::languages;
use super::types::StructureKind;
use crate::models::Language;

/// Level-order array of a tree or linked list
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LevelOrder(Vec<Option<i64>>);

impl LevelOrder {
    pub fn new(slots: Vec<Option<i64>>) -> Self {
        Self(slots)
    }

    /// Parse a JSON test value.
    ///
    /// `null` and `[]` are the empty structure. Node values must fit in 32
    /// bits. Lists may not contain `null` slots.
    pub fn from_value(value: &Value, kind: StructureKind) -> Result<Self, CodegenError> {
        let items = match value {
            Value::Null => return Ok(Self::default()),
            Value::Array(items) => items,
            other => {
                return Err(CodegenError::mismatch(
                    kind.type_name(),
                    other,
                    "expected a level-order array",
                ))
            }
        };

        let mut slots = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match item {
                Value::Null if kind == StructureKind::List => {
                    return Err(CodegenError::InvalidStructure(format!(
                        "ListNode array has null at index {}",
                        index
                    )));
                }
                Value::Null => slots.push(None),
                other => {
                    let n = other
                        .as_i64()
                        .filter(|n| i32::try_from(*n).is_ok())
                        .ok_or_else(|| {
                            CodegenError::InvalidStructure(format!(
                                "{} node at index {} is not a 32-bit integer: {}",
                                kind.type_name(),
                                index,
                                other
                            ))
                        })?;
                    slots.push(Some(n));
                }
            }
        }
        Ok(Self(slots))
    }

    pub fn slots(&self) -> &[Option<i64>] {
        &self.0
    }

    /// True when the structure has no root
    pub fn is_empty(&self) -> bool {
        matches!(self.0.first(), None | Some(None))
    }

    /// Rebuild the structure and serialize it again.
    ///
    /// Two arrays describing the same tree (for example with and without
    /// trailing nulls, or with slots under absent parents) canonicalize to the
    /// same value.
    pub fn canonical(&self, kind: StructureKind) -> LevelOrder {
        match kind {
            StructureKind::List => Self(self.0.iter().copied().take_while(Option::is_some).collect()),
            StructureKind::Tree => Tree::build(&self.0).serialize(),
        }
    }

    pub fn to_value(&self) -> Value {
        Value::Array(
            self.0
                .iter()
                .map(|slot| slot.map(Value::from).unwrap_or(Value::Null))
                .collect(),
        )
    }
}

/// Arena-backed binary tree used for canonicalization
struct Tree {
    nodes: Vec<TreeSlot>,
}

struct TreeSlot {
    value: i64,
    left: Option<usize>,
    right: Option<usize>,
}

impl Tree {
    fn build(slots: &[Option<i64>]) -> Self {
        let mut tree = Tree { nodes: Vec::new() };
        let Some(Some(root)) = slots.first() else {
            return tree;
        };
        tree.push(*root);

        let mut pending = VecDeque::from([0usize]);
        let mut next = 1;
        while next < slots.len() {
            let Some(parent) = pending.pop_front() else {
                break;
            };
            if let Some(Some(value)) = slots.get(next) {
                let child = tree.push(*value);
                tree.nodes[parent].left = Some(child);
                pending.push_back(child);
            }
            next += 1;
            if let Some(Some(value)) = slots.get(next) {
                let child = tree.push(*value);
                tree.nodes[parent].right = Some(child);
                pending.push_back(child);
            }
            next += 1;
        }
        tree
    }

    fn push(&mut self, value: i64) -> usize {
        self.nodes.push(TreeSlot {
            value,
            left: None,
            right: None,
        });
        self.nodes.len() - 1
    }

    fn serialize(&self) -> LevelOrder {
        let mut out = Vec::new();
        if self.nodes.is_empty() {
            return LevelOrder(out);
        }

        let mut queue = VecDeque::from([Some(0usize)]);
        while let Some(slot) = queue.pop_front() {
            match slot {
                Some(index) => {
                    let node = &self.nodes[index];
                    out.push(Some(node.value));
                    queue.push_back(node.left);
                    queue.push_back(node.right);
                }
                None => out.push(None),
            }
        }
        while matches!(out.last(), Some(None)) {
            out.pop();
        }
        LevelOrder(out)
    }
}

/// Emits builder expressions and helper source for structures
pub struct StructureBuilder;

impl StructureBuilder {
    /// Source expression constructing the structure in `language`.
    ///
    /// An empty structure is the language's null literal.
    pub fn build(
        level_order: &LevelOrder,
        kind: StructureKind,
        language: Language,
    ) -> Result<String, CodegenError> {
        let backend = languages::backend(language);
        if level_order.is_empty() {
            return Ok(backend.syntax().null_literal.to_string());
        }
        if kind == StructureKind::List && level_order.slots().iter().any(Option::is_none) {
            return Err(CodegenError::InvalidStructure(
                "ListNode array contains null".to_string(),
            ));
        }
        Ok(backend.build_expression(kind, level_order))
    }

    /// Builder and printer source for one structure kind
    pub fn helper_functions(kind: StructureKind, language: Language) -> Vec<String> {
        let backend = languages::backend(language);
        vec![
            backend.structure_builder(kind),
            backend.structure_printer(kind),
        ]
    }

    /// Type definition (`TreeNode`/`ListNode`) for one structure kind
    pub fn type_definition(kind: StructureKind, language: Language) -> String {
        languages::backend(language).structure_definition(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(value: Value) -> LevelOrder {
        LevelOrder::from_value(&value, StructureKind::Tree).unwrap()
    }

    #[test]
    fn test_empty_structures() {
        assert!(tree(json!(null)).is_empty());
        assert!(tree(json!([])).is_empty());
        assert!(tree(json!([null, 1])).is_empty());
        assert_eq!(tree(json!([])).canonical(StructureKind::Tree), LevelOrder::default());
    }

    #[test]
    fn test_canonical_strips_trailing_nulls() {
        let with = tree(json!([1, null, 2, 3, null, null, null]));
        let without = tree(json!([1, null, 2, 3]));
        let canonical = with.canonical(StructureKind::Tree);
        assert_eq!(canonical, without.canonical(StructureKind::Tree));
        assert_eq!(canonical.to_value(), json!([1, null, 2, 3]));
    }

    #[test]
    fn test_canonical_round_trips_complete_tree() {
        let full = tree(json!([3, 9, 20, null, null, 15, 7]));
        assert_eq!(full.canonical(StructureKind::Tree), full);
    }

    #[test]
    fn test_canonical_drops_slots_without_parent() {
        // Slots past the last parent cannot attach anywhere
        let extra = tree(json!([1, null, null, 5, 6]));
        assert_eq!(extra.canonical(StructureKind::Tree).to_value(), json!([1]));
    }

    #[test]
    fn test_list_rules() {
        let list = LevelOrder::from_value(&json!([1, 2, 3]), StructureKind::List).unwrap();
        assert_eq!(list.canonical(StructureKind::List), list);
        assert!(matches!(
            LevelOrder::from_value(&json!([1, null, 3]), StructureKind::List),
            Err(CodegenError::InvalidStructure(_))
        ));
    }

    #[test]
    fn test_rejects_non_integer_nodes() {
        assert!(LevelOrder::from_value(&json!([1, "a"]), StructureKind::Tree).is_err());
        assert!(LevelOrder::from_value(&json!([1.5]), StructureKind::Tree).is_err());
        assert!(LevelOrder::from_value(&json!([5_000_000_000i64]), StructureKind::Tree).is_err());
        assert!(LevelOrder::from_value(&json!({"root": 1}), StructureKind::Tree).is_err());
    }

    #[test]
    fn test_build_expressions() {
        let level_order = tree(json!([1, null, 2]));
        let cases = [
            (Language::Cpp, "buildTree({1, 0, 2}, {true, false, true})"),
            (Language::Python, "build_tree([1, None, 2])"),
            (Language::JavaScript, "buildTree([1, null, 2])"),
            (Language::Java, "Harness.buildTree(new Integer[]{1, null, 2})"),
        ];
        for (language, expected) in cases {
            assert_eq!(
                StructureBuilder::build(&level_order, StructureKind::Tree, language).unwrap(),
                expected
            );
        }

        let list = LevelOrder::new(vec![Some(4), Some(5)]);
        assert_eq!(
            StructureBuilder::build(&list, StructureKind::List, Language::Java).unwrap(),
            "Harness.buildList(new int[]{4, 5})"
        );
        assert_eq!(
            StructureBuilder::build(&LevelOrder::default(), StructureKind::List, Language::Python).unwrap(),
            "None"
        );
    }

    #[test]
    fn test_helpers_mention_builders() {
        for language in Language::ALL {
            let helpers = StructureBuilder::helper_functions(StructureKind::Tree, language).join("\n");
            assert!(helpers.contains("uild"), "{} tree helpers", language);
            assert!(StructureBuilder::type_definition(StructureKind::Tree, language).contains("TreeNode"));
        }
    }
}
