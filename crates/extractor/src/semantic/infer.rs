//! Local variable discovery and expression typing.

use super::corelib;
use super::resolve::TypeRef;
use super::symbols::{TypeId, TypeKind};
use super::SemanticModel;
use crate::syntax::{self, named_children};
use std::collections::{HashMap, HashSet};
use tree_sitter::Node;

/// A variable declared inside a member body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVariable {
    pub name: String,
    /// `None` when the type could not be inferred
    pub ty: Option<TypeRef>,
}

type Scope = HashMap<String, TypeRef>;

const DICTIONARY_NAMES: &[&str] = &[
    "Dictionary",
    "IDictionary",
    "IReadOnlyDictionary",
    "SortedDictionary",
    "SortedList",
];

impl<'t> SemanticModel<'t> {
    /// Variables declared within `member`'s body, in source order. Parameters are not included.
    pub fn declared_locals(&self, member: Node<'t>) -> Vec<LocalVariable> {
        let Some(body) = syntax::field_or_kind(member, "body", &["block", "arrow_expression_clause"])
        else {
            return Vec::new();
        };

        let mut scope = Scope::new();
        for parameter in syntax::parameters(member) {
            let name = syntax::name_of(parameter, self.source());
            let ty = syntax::type_node(parameter).and_then(|t| self.resolve_type(t));
            if let (Some(name), Some(ty)) = (name, ty) {
                scope.insert(name.to_string(), ty);
            }
        }

        let mut locals = Vec::new();
        for node in std::iter::once(body).chain(syntax::descendants(body)) {
            match node.kind() {
                "variable_declaration" => {
                    let declared = syntax::type_node(node)
                        .filter(|t| !self.is_implicit(*t));
                    for declarator in named_children(node)
                        .into_iter()
                        .filter(|c| c.kind() == "variable_declarator")
                    {
                        let Some(name) = syntax::name_of(declarator, self.source()) else {
                            continue;
                        };
                        let ty = match declared {
                            Some(t) => self.resolve_type(t),
                            None => initializer(declarator)
                                .and_then(|e| self.type_of_expression(e, &scope)),
                        };
                        record(&mut locals, &mut scope, name, ty);
                    }
                }
                "foreach_statement" => {
                    let declared_type = syntax::type_node(node);
                    let Some(name) = node
                        .child_by_field_name("left")
                        .or_else(|| {
                            named_children(node)
                                .into_iter()
                                .find(|c| c.kind() == "identifier" && Some(*c) != declared_type)
                        })
                        .filter(|l| l.kind() == "identifier")
                        .map(|l| self.text(l).trim())
                    else {
                        continue;
                    };
                    let ty = match syntax::type_node(node).filter(|t| !self.is_implicit(*t)) {
                        Some(t) => self.resolve_type(t),
                        None => node
                            .child_by_field_name("right")
                            .and_then(|e| self.type_of_expression(e, &scope))
                            .and_then(|t| element_type(&t)),
                    };
                    record(&mut locals, &mut scope, name, ty);
                }
                "declaration_expression" | "catch_declaration" | "declaration_pattern" => {
                    let Some(name) = designated_name(node).map(|n| self.text(n).trim()) else {
                        continue;
                    };
                    let ty = syntax::type_node(node)
                        .filter(|t| !self.is_implicit(*t))
                        .and_then(|t| self.resolve_type(t));
                    record(&mut locals, &mut scope, name, ty);
                }
                _ => {}
            }
        }
        locals
    }

    fn is_implicit(&self, type_node: Node<'t>) -> bool {
        match type_node.kind() {
            "implicit_type" => true,
            "identifier" => {
                self.text(type_node).trim() == "var" && self.resolve_named(type_node).is_none()
            }
            _ => false,
        }
    }

    /// Static type of an expression, as far as it can be told without overload resolution
    pub(crate) fn type_of_expression(&self, expr: Node<'t>, scope: &Scope) -> Option<TypeRef> {
        match expr.kind() {
            "object_creation_expression" | "array_creation_expression" | "cast_expression" => {
                syntax::type_node(expr).and_then(|t| self.resolve_type(t))
            }
            "as_expression" => expr
                .child_by_field_name("right")
                .or_else(|| named_children(expr).into_iter().last())
                .and_then(|t| self.resolve_type(t)),
            "default_expression" => syntax::type_node(expr)
                .or_else(|| named_children(expr).into_iter().next())
                .and_then(|t| self.resolve_type(t)),
            "parenthesized_expression" | "checked_expression" => named_children(expr)
                .into_iter()
                .next()
                .and_then(|inner| self.type_of_expression(inner, scope)),
            "postfix_unary_expression" if self.text(expr).trim_end().ends_with('!') => {
                named_children(expr)
                    .into_iter()
                    .next()
                    .and_then(|inner| self.type_of_expression(inner, scope))
            }
            "conditional_expression" => expr
                .child_by_field_name("consequence")
                .and_then(|e| self.type_of_expression(e, scope))
                .or_else(|| {
                    expr.child_by_field_name("alternative")
                        .and_then(|e| self.type_of_expression(e, scope))
                }),
            "identifier" => {
                let name = self.text(expr).trim();
                scope.get(name).cloned().or_else(|| {
                    let owner = self.enclosing_type(expr)?;
                    self.member_type(owner, name)
                })
            }
            "this_expression" | "this" => {
                let owner = self.enclosing_type(expr)?;
                Some(self.self_type(owner))
            }
            "member_access_expression" => {
                let receiver = expr.child_by_field_name("expression")?;
                let name = member_name(expr.child_by_field_name("name")?, self.source())?;
                let receiver_ty = self
                    .type_of_expression(receiver, scope)
                    .or_else(|| self.resolve_named(receiver))?;
                let TypeRef::Declared { id, args } = &receiver_ty else {
                    return None;
                };
                let member = self.member_type(*id, name)?;
                Some(member.substitute(&self.symbol(*id).type_params, args))
            }
            "invocation_expression" => {
                let function = expr.child_by_field_name("function")?;
                match function.kind() {
                    "identifier" | "generic_name" => {
                        let name = member_name(function, self.source())?;
                        let owner = self.enclosing_type(expr)?;
                        self.method_return_type(owner, name)
                    }
                    "member_access_expression" => {
                        let receiver = function.child_by_field_name("expression")?;
                        let name =
                            member_name(function.child_by_field_name("name")?, self.source())?;
                        let receiver_ty = self
                            .type_of_expression(receiver, scope)
                            .or_else(|| self.resolve_named(receiver))?;
                        let TypeRef::Declared { id, args } = &receiver_ty else {
                            return None;
                        };
                        let returned = self.method_return_type(*id, name)?;
                        Some(returned.substitute(&self.symbol(*id).type_params, args))
                    }
                    _ => None,
                }
            }
            "await_expression" => named_children(expr)
                .into_iter()
                .next()
                .and_then(|inner| self.type_of_expression(inner, scope))
                .and_then(|t| awaited_type(&t)),
            "element_access_expression" => expr
                .child_by_field_name("expression")
                .and_then(|e| self.type_of_expression(e, scope))
                .and_then(|t| indexed_type(&t)),
            "string_literal"
            | "verbatim_string_literal"
            | "raw_string_literal"
            | "interpolated_string_expression" => TypeRef::predefined("string"),
            "integer_literal" => TypeRef::predefined("int"),
            "real_literal" => TypeRef::predefined("double"),
            "boolean_literal" => TypeRef::predefined("bool"),
            "character_literal" => TypeRef::predefined("char"),
            "typeof_expression" => corelib::lookup("System", "Type", 0).map(TypeRef::core),
            _ => None,
        }
    }

    /// A type as seen from inside its own declaration
    fn self_type(&self, id: TypeId) -> TypeRef {
        TypeRef::Declared {
            id,
            args: self
                .symbol(id)
                .type_params
                .iter()
                .map(|p| TypeRef::TypeParameter(p.clone()))
                .collect(),
        }
    }

    /// In-source base class of a type, if it has one
    pub fn base_class(&self, id: TypeId) -> Option<TypeId> {
        self.base_types(id).iter().find_map(|t| match t {
            TypeRef::Declared { id: base, .. }
                if matches!(self.symbol(*base).kind, TypeKind::Class | TypeKind::Record) =>
            {
                Some(*base)
            }
            _ => None,
        })
    }

    /// Types listed after `:` across all declarations of a type, in order, without duplicates
    pub fn base_types(&self, id: TypeId) -> Vec<TypeRef> {
        let mut out: Vec<TypeRef> = Vec::new();
        for declaration in &self.symbol(id).declarations {
            let Some(base_list) = syntax::child_of_kind(*declaration, &["base_list"]) else {
                continue;
            };
            for entry in named_children(base_list) {
                let type_node = match entry.kind() {
                    "argument_list" => continue,
                    "primary_constructor_base_type" => syntax::type_node(entry)
                        .or_else(|| named_children(entry).into_iter().next()),
                    _ => Some(entry),
                };
                if let Some(ty) = type_node.and_then(|t| self.resolve_type(t)) {
                    if !out.contains(&ty) {
                        out.push(ty);
                    }
                }
            }
        }
        out
    }

    /// Declared type of a field or property, searched through the in-source base chain
    pub fn member_type(&self, id: TypeId, name: &str) -> Option<TypeRef> {
        self.find_in_hierarchy(id, |member| match member.kind() {
            "property_declaration" => (syntax::name_of(member, self.source()) == Some(name))
                .then(|| syntax::type_node(member))
                .flatten()
                .and_then(|t| self.resolve_type(t)),
            "field_declaration" | "event_field_declaration" => {
                let declaration = syntax::child_of_kind(member, &["variable_declaration"])?;
                named_children(declaration)
                    .into_iter()
                    .filter(|d| d.kind() == "variable_declarator")
                    .any(|d| syntax::name_of(d, self.source()) == Some(name))
                    .then(|| syntax::type_node(declaration))
                    .flatten()
                    .and_then(|t| self.resolve_type(t))
            }
            _ => None,
        })
    }

    /// Return type of the first method called `name`, searched through the in-source base chain
    pub fn method_return_type(&self, id: TypeId, name: &str) -> Option<TypeRef> {
        self.find_in_hierarchy(id, |member| {
            if member.kind() != "method_declaration"
                || syntax::name_of(member, self.source()) != Some(name)
            {
                return None;
            }
            self.method_symbol(member)?.return_type
        })
    }

    fn find_in_hierarchy<F>(&self, id: TypeId, mut lookup: F) -> Option<TypeRef>
    where
        F: FnMut(Node<'t>) -> Option<TypeRef>,
    {
        let mut seen = HashSet::new();
        let mut current = Some(id);
        while let Some(type_id) = current {
            if !seen.insert(type_id) {
                break;
            }
            for declaration in &self.symbol(type_id).declarations {
                let Some(body) = syntax::declaration_body(*declaration) else {
                    continue;
                };
                if let Some(found) = named_children(body).into_iter().find_map(&mut lookup) {
                    return Some(found);
                }
            }
            current = self.base_class(type_id);
        }
        None
    }
}

fn record(locals: &mut Vec<LocalVariable>, scope: &mut Scope, name: &str, ty: Option<TypeRef>) {
    if let Some(ty) = &ty {
        scope.insert(name.to_string(), ty.clone());
    }
    locals.push(LocalVariable {
        name: name.to_string(),
        ty,
    });
}

/// Value assigned by a variable declarator, if any
fn initializer(declarator: Node<'_>) -> Option<Node<'_>> {
    let name = declarator.child_by_field_name("name");
    let value = named_children(declarator).into_iter().rev().find(|c| {
        Some(*c) != name && !matches!(c.kind(), "bracketed_argument_list" | "tuple_pattern")
    })?;
    if value.kind() == "equals_value_clause" {
        named_children(value).into_iter().next()
    } else {
        Some(value)
    }
}

/// Identifier introduced by a declaration expression, catch clause or pattern
fn designated_name(node: Node<'_>) -> Option<Node<'_>> {
    if let Some(name) = node.child_by_field_name("name") {
        return Some(name);
    }
    let designation = node.child_by_field_name("designation").or_else(|| {
        syntax::child_of_kind(node, &["single_variable_designation", "identifier"])
    })?;
    if designation.kind() == "identifier" {
        return Some(designation);
    }
    syntax::child_of_kind(designation, &["identifier"])
}

fn member_name<'s>(node: Node, source: &'s str) -> Option<&'s str> {
    match node.kind() {
        "identifier" => Some(syntax::text(node, source).trim()),
        "generic_name" => {
            syntax::field_or_kind(node, "name", &["identifier"]).map(|n| syntax::text(n, source).trim())
        }
        _ => None,
    }
}

/// `T` of `Task<T>` / `ValueTask<T>`
fn awaited_type(ty: &TypeRef) -> Option<TypeRef> {
    let is_task = match ty {
        TypeRef::Core { core, .. } => matches!(core.name, "Task" | "ValueTask"),
        TypeRef::External { name, .. } => {
            let simple = name.rsplit('.').next().unwrap_or(name);
            matches!(simple, "Task" | "ValueTask")
        }
        _ => false,
    };
    match ty.type_arguments() {
        [inner] if is_task => Some(inner.clone()),
        _ => None,
    }
}

fn is_dictionary(ty: &TypeRef) -> bool {
    match ty {
        TypeRef::Core { core, .. } => DICTIONARY_NAMES.contains(&core.name),
        TypeRef::External { name, .. } => {
            DICTIONARY_NAMES.contains(&name.rsplit('.').next().unwrap_or(name))
        }
        _ => false,
    }
}

/// Element type produced by `foreach` over a value of type `ty`
fn element_type(ty: &TypeRef) -> Option<TypeRef> {
    if let TypeRef::Array { element, .. } = ty {
        return Some(element.as_ref().clone());
    }
    if ty.is_core("System", "String") {
        return TypeRef::predefined("char");
    }
    match ty.type_arguments() {
        [key, value] if is_dictionary(ty) => {
            corelib::lookup("System.Collections.Generic", "KeyValuePair", 2).map(|core| {
                TypeRef::Core {
                    core,
                    args: vec![key.clone(), value.clone()],
                }
            })
        }
        [single] => Some(single.clone()),
        _ => None,
    }
}

/// Result of `value[index]` for a value of type `ty`
fn indexed_type(ty: &TypeRef) -> Option<TypeRef> {
    if let TypeRef::Array { element, .. } = ty {
        return Some(element.as_ref().clone());
    }
    match ty.type_arguments() {
        [_, value] if is_dictionary(ty) => Some(value.clone()),
        [single] => Some(single.clone()),
        _ => None,
    }
}
