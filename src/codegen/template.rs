//! Ordered program assembly
//!
//! Every backend fills the same five slots; assembly order is fixed.

/// Fragments of a generated program
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramFragments {
    pub includes: Vec<String>,
    pub type_definitions: Vec<String>,
    pub user_code: String,
    pub helpers: Vec<String>,
    pub entry_point: String,
}

impl ProgramFragments {
    /// Join the fragments: includes, type definitions, user code, helpers,
    /// entry point. Empty fragments are skipped.
    pub fn assemble(&self) -> String {
        let includes = self.includes.join("\n");
        let mut sections: Vec<&str> = Vec::with_capacity(4 + self.type_definitions.len() + self.helpers.len());

        sections.push(&includes);
        sections.extend(self.type_definitions.iter().map(String::as_str));
        sections.push(self.user_code.trim_start_matches(['\n', '\r']).trim_end());
        sections.extend(self.helpers.iter().map(String::as_str));
        sections.push(&self.entry_point);

        let mut program = sections
            .into_iter()
            .filter(|section| !section.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");
        program.push('\n');
        program
    }
}

/// Indent every non-empty line by `levels` steps of four spaces
pub fn indent(text: &str, levels: usize) -> String {
    let pad = "    ".repeat(levels);
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{}{}", pad, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_order_and_skips_empty() {
        let fragments = ProgramFragments {
            includes: vec!["#include <a>".to_string(), "#include <b>".to_string()],
            type_definitions: vec![],
            user_code: "user();\n\n".to_string(),
            helpers: vec!["helper();".to_string(), "  ".to_string()],
            entry_point: "main();".to_string(),
        };

        assert_eq!(
            fragments.assemble(),
            "#include <a>\n#include <b>\n\nuser();\n\nhelper();\n\nmain();\n"
        );
    }

    #[test]
    fn test_indent() {
        assert_eq!(indent("a\n\nb", 1), "    a\n\n    b");
        assert_eq!(indent("x", 2), "        x");
    }
}
