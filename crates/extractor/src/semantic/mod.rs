//! Semantic model of one compilation unit.
//!
//! ```text
//! Tree
//!   │
//!   ├──> SymbolTable   types declared in source, namespace scopes, using directives
//!   │
//!   ├──> Binder        type syntax ──> TypeRef (in-source, core library, external)
//!   │
//!   └──> Inference     expression types for `var` locals, members, base types
//! ```

pub mod corelib;
mod infer;
mod resolve;
mod symbols;

pub use infer::LocalVariable;
pub use resolve::{TupleElement, TypeRef};
pub use symbols::{NamespaceScope, SymbolTable, TypeId, TypeKind, TypeSymbol, UsingDirective};

use crate::syntax::{self, has_modifier};
use tree_sitter::{Node, Tree};

/// Declared symbol of a method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSymbol {
    pub name: String,
    pub return_type: Option<TypeRef>,
    pub is_public: bool,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_async: bool,
}

pub struct SemanticModel<'t> {
    source: &'t str,
    root: Node<'t>,
    table: SymbolTable<'t>,
}

impl<'t> SemanticModel<'t> {
    pub fn build(tree: &'t Tree, source: &'t str) -> Self {
        let root = tree.root_node();
        let table = SymbolTable::build(root, source);
        Self {
            source,
            root,
            table,
        }
    }

    pub fn source(&self) -> &'t str {
        self.source
    }

    pub fn root(&self) -> Node<'t> {
        self.root
    }

    pub fn symbols(&self) -> &SymbolTable<'t> {
        &self.table
    }

    pub fn symbol(&self, id: TypeId) -> &TypeSymbol<'t> {
        self.table.get(id)
    }

    pub fn declared_type(&self, node: Node) -> Option<TypeId> {
        self.table.declared_by(node)
    }

    pub fn display_name(&self, id: TypeId) -> String {
        self.table.display_name(id)
    }

    /// Innermost type declaration enclosing `node`
    pub fn enclosing_type(&self, node: Node) -> Option<TypeId> {
        syntax::ancestors(node).find_map(|a| self.table.declared_by(a))
    }

    pub(crate) fn text(&self, node: Node) -> &'t str {
        syntax::text(node, self.source)
    }

    pub fn method_symbol(&self, node: Node<'t>) -> Option<MethodSymbol> {
        if node.kind() != "method_declaration" {
            return None;
        }
        let name = syntax::name_of(node, self.source)?.to_string();
        let return_type = node
            .child_by_field_name("returns")
            .or_else(|| syntax::type_node(node))
            .and_then(|t| self.resolve_type(t));
        let has_body = syntax::field_or_kind(node, "body", &["block", "arrow_expression_clause"])
            .is_some();
        let in_interface = self
            .enclosing_type(node)
            .is_some_and(|id| self.symbol(id).kind == TypeKind::Interface);

        Some(MethodSymbol {
            name,
            return_type,
            is_public: has_modifier(node, self.source, "public"),
            is_static: has_modifier(node, self.source, "static"),
            is_abstract: has_modifier(node, self.source, "abstract") || (in_interface && !has_body),
            is_async: has_modifier(node, self.source, "async"),
        })
    }

    /// `using` directives at compilation-unit level, as written
    pub fn root_using_directives(&self) -> Vec<String> {
        syntax::named_children(self.root)
            .into_iter()
            .filter(|c| c.kind() == "using_directive")
            .map(|c| self.text(c).trim().to_string())
            .collect()
    }
}
