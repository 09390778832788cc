//! Transitive collection of in-source type definitions.
//!
//! The collector owns an insertion-ordered map from fully qualified type name to normalized
//! declaration text. A type is recorded before its members are visited and a recorded type
//! is never visited again, which is what stops recursion on cyclic type graphs.

use crate::normalize::{self, NormalizeOptions};
use crate::semantic::{SemanticModel, TypeId, TypeRef};
use crate::syntax::{self, named_children, MEMBER_CONTAINER_KINDS};
use indexmap::IndexMap;
use tree_sitter::Node;

pub struct ReferenceCollector<'m, 't> {
    model: &'m SemanticModel<'t>,
    options: &'m NormalizeOptions,
    follow_type_arguments: bool,
    definitions: IndexMap<String, String>,
}

impl<'m, 't> ReferenceCollector<'m, 't> {
    pub fn new(
        model: &'m SemanticModel<'t>,
        options: &'m NormalizeOptions,
        follow_type_arguments: bool,
    ) -> Self {
        Self {
            model,
            options,
            follow_type_arguments,
            definitions: IndexMap::new(),
        }
    }

    /// Visit a type reference; only in-source types are recorded
    pub fn visit(&mut self, ty: &TypeRef) {
        if let Some(id) = self.model.in_source(ty) {
            self.collect(id);
        }
        if !self.follow_type_arguments {
            return;
        }
        match ty {
            TypeRef::Declared { args, .. }
            | TypeRef::Core { args, .. }
            | TypeRef::External { args, .. } => {
                for arg in args {
                    self.visit(arg);
                }
            }
            TypeRef::Nullable(inner) | TypeRef::Pointer(inner) => {
                if self.model.in_source(ty).is_none() {
                    self.visit(inner);
                }
            }
            TypeRef::Array { element, .. } => self.visit(element),
            TypeRef::Tuple(elements) => {
                for element in elements {
                    self.visit(&element.ty);
                }
            }
            TypeRef::TypeParameter(_) | TypeRef::Dynamic => {}
        }
    }

    /// Record `id` and everything reachable from its members and base types
    pub fn collect(&mut self, id: TypeId) {
        let model = self.model;
        let key = model.display_name(id);
        if self.definitions.contains_key(&key) {
            return;
        }

        let symbol = model.symbol(id);
        let text = normalize::normalize_with_comments(symbol.primary, model.source(), self.options);
        log::trace!("Collected {key}");
        self.definitions.insert(key, text);

        if !MEMBER_CONTAINER_KINDS.contains(&symbol.primary.kind()) {
            return;
        }
        for ty in self.member_types(symbol.primary) {
            self.visit(&ty);
        }
        for ty in model.base_types(id) {
            self.visit(&ty);
        }
    }

    /// Property, field and constructor parameter types of a declaration, in that order
    pub fn member_types(&self, declaration: Node<'t>) -> Vec<TypeRef> {
        let members = syntax::declaration_body(declaration)
            .map(named_children)
            .unwrap_or_default();

        let properties = members
            .iter()
            .filter(|m| m.kind() == "property_declaration")
            .filter_map(|m| syntax::type_node(*m));
        let fields = members
            .iter()
            .filter(|m| matches!(m.kind(), "field_declaration" | "event_field_declaration"))
            .filter_map(|m| syntax::child_of_kind(*m, &["variable_declaration"]))
            .filter_map(syntax::type_node);
        let constructor_parameters = std::iter::once(declaration)
            .chain(
                members
                    .iter()
                    .copied()
                    .filter(|m| m.kind() == "constructor_declaration"),
            )
            .flat_map(syntax::parameters)
            .filter_map(syntax::type_node);

        properties
            .chain(fields)
            .chain(constructor_parameters)
            .filter_map(|t| self.model.resolve_type(t))
            .collect()
    }

    pub fn into_definitions(self) -> IndexMap<String, String> {
        self.definitions
    }
}
