use crate::error::{ExtractError, Result};
use tree_sitter::{Language, Parser, Tree};

/// Tree-sitter grammar for C#
pub fn language() -> Language {
    tree_sitter_c_sharp::LANGUAGE.into()
}

/// Reusable C# parser
pub struct CSharpParser {
    parser: Parser,
}

impl CSharpParser {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser.set_language(&language())?;
        Ok(Self { parser })
    }

    /// Parse a complete compilation unit. Syntax errors are kept in the tree as `ERROR` nodes.
    pub fn parse(&mut self, source: &str) -> Result<Tree> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or(ExtractError::ParseError)?;

        let root = tree.root_node();
        if root.has_error() {
            log::warn!(
                "Source contains syntax errors; extraction continues on the recovered tree ({} error nodes)",
                error_node_count(root)
            );
        }
        Ok(tree)
    }
}

fn error_node_count(root: tree_sitter::Node) -> usize {
    crate::syntax::descendants(root)
        .into_iter()
        .filter(|n| n.is_error() || n.is_missing())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grammar_abi_is_loadable() {
        let version = language().version();
        assert!(
            (tree_sitter::MIN_COMPATIBLE_LANGUAGE_VERSION..=tree_sitter::LANGUAGE_VERSION)
                .contains(&version),
            "grammar ABI {version} not supported by the tree-sitter runtime"
        );
        assert!(CSharpParser::new().is_ok());
    }

    #[test]
    fn parses_compilation_unit() {
        let mut parser = CSharpParser::new().unwrap();
        let tree = parser.parse("namespace A { class B { } }").unwrap();
        let root = tree.root_node();
        assert_eq!(root.kind(), "compilation_unit");
        assert!(!root.has_error());
    }

    #[test]
    fn broken_source_still_yields_tree() {
        let mut parser = CSharpParser::new().unwrap();
        let tree = parser.parse("class B { void M( { }").unwrap();
        assert!(tree.root_node().has_error());
    }
}
