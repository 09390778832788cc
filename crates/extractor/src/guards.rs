//! Guard clause detection.
//!
//! Only `if` statements whose consequence contains a `throw` statement are recognized.
//! Throws outside an `if` and throw expressions (`x ?? throw ...`) are not reported.
//!
//! The `else` branch is not part of the guarded consequence: a throw there is never
//! paired with the outer condition, since that condition is false when it runs. An `if`
//! nested inside the `else` still reports its own condition.

use crate::syntax::{self, descendants, named_children};
use crate::types::ExceptionConditionDescriptor;
use tree_sitter::Node;

/// Guard conditions found anywhere inside `member`, in source order
pub fn exception_conditions(
    member: Node,
    source: &str,
    fallback_type: &str,
) -> Vec<ExceptionConditionDescriptor> {
    let mut conditions = Vec::new();

    for if_statement in descendants(member)
        .into_iter()
        .filter(|n| n.kind() == "if_statement")
    {
        let Some(condition) = if_statement.child_by_field_name("condition") else {
            continue;
        };
        let Some(consequence) = if_statement.child_by_field_name("consequence") else {
            continue;
        };
        let condition_text = syntax::text(condition, source).trim();

        for throw in std::iter::once(consequence)
            .chain(descendants(consequence))
            .filter(|n| n.kind() == "throw_statement")
        {
            conditions.push(ExceptionConditionDescriptor {
                condition_expression: condition_text.to_string(),
                exception_type: thrown_type(throw, source)
                    .unwrap_or_else(|| fallback_type.to_string()),
            });
        }
    }

    conditions
}

/// Written type of `throw new T(...)`
fn thrown_type(throw: Node, source: &str) -> Option<String> {
    let thrown = named_children(throw)
        .into_iter()
        .find(|c| !syntax::is_comment(*c))?;
    if thrown.kind() != "object_creation_expression" {
        return None;
    }
    syntax::type_node(thrown).map(|t| syntax::text(t, source).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::CSharpParser;
    use pretty_assertions::assert_eq;

    fn guards(body: &str) -> Vec<(String, String)> {
        let src = format!("class A {{ void M(object x, int n) {{ {body} }} }}");
        let tree = CSharpParser::new().unwrap().parse(&src).unwrap();
        let method = descendants(tree.root_node())
            .into_iter()
            .find(|n| n.kind() == "method_declaration")
            .unwrap();
        exception_conditions(method, &src, "Exception")
            .into_iter()
            .map(|c| (c.condition_expression, c.exception_type))
            .collect()
    }

    #[test]
    fn detects_null_guard() {
        assert_eq!(
            guards("if (x == null) { throw new ArgumentNullException(nameof(x)); }"),
            vec![("x == null".to_string(), "ArgumentNullException".to_string())]
        );
    }

    #[test]
    fn finds_nested_throws_and_unbraced_consequences() {
        let found = guards(
            "if (n < 0) throw new System.ArgumentOutOfRangeException(nameof(n));
             if (n > 10) { if (x != null) { throw new InvalidOperationException(); } }",
        );
        assert_eq!(
            found,
            vec![
                (
                    "n < 0".to_string(),
                    "System.ArgumentOutOfRangeException".to_string()
                ),
                (
                    "n > 10".to_string(),
                    "InvalidOperationException".to_string()
                ),
                (
                    "x != null".to_string(),
                    "InvalidOperationException".to_string()
                ),
            ]
        );
    }

    #[test]
    fn rethrow_uses_fallback_label() {
        let found = guards("var e = new Exception(); if (n == 0) { throw e; }");
        assert_eq!(found, vec![("n == 0".to_string(), "Exception".to_string())]);
    }

    #[test]
    fn ignores_unguarded_and_else_throws() {
        assert!(guards("throw new NotImplementedException();").is_empty());
        assert!(guards("if (n == 1) { n++; } else { throw new Exception(); }").is_empty());
    }

    #[test]
    fn else_if_reports_only_its_own_condition() {
        let found = guards(
            "if (n == 1) { n++; } else if (n > 5) { throw new ArgumentException(); } else { throw new Exception(); }",
        );
        assert_eq!(
            found,
            vec![("n > 5".to_string(), "ArgumentException".to_string())]
        );
    }
}
