use crate::syntax::{
    compact_text, declaration_body, has_modifier, name_of, named_children,
    type_parameter_names, TYPE_DECLARATION_KINDS,
};
use std::collections::HashMap;
use tree_sitter::Node;

/// Index of a type in the [`SymbolTable`]
pub type TypeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Struct,
    Record,
    Interface,
    Enum,
    Delegate,
}

impl TypeKind {
    fn from_node_kind(kind: &str) -> Option<Self> {
        match kind {
            "class_declaration" => Some(Self::Class),
            "struct_declaration" | "record_struct_declaration" => Some(Self::Struct),
            "record_declaration" => Some(Self::Record),
            "interface_declaration" => Some(Self::Interface),
            "enum_declaration" => Some(Self::Enum),
            "delegate_declaration" => Some(Self::Delegate),
            _ => None,
        }
    }

    /// Whether a nullable annotation on this type is a reference annotation
    pub const fn is_reference(self) -> bool {
        matches!(self, Self::Class | Self::Record | Self::Interface | Self::Delegate)
    }
}

/// A type declared in the analyzed source, with all of its partial declarations merged
#[derive(Debug, Clone)]
pub struct TypeSymbol<'t> {
    pub name: String,
    pub type_params: Vec<String>,
    pub namespace: Option<String>,
    pub containing: Option<TypeId>,
    pub kind: TypeKind,
    pub is_static: bool,
    pub is_abstract: bool,
    /// First declaration in source order
    pub primary: Node<'t>,
    /// Every declaration, `primary` included
    pub declarations: Vec<Node<'t>>,
    path: String,
}

impl TypeSymbol<'_> {
    pub fn arity(&self) -> usize {
        self.type_params.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsingDirective {
    Namespace(String),
    Alias { alias: String, target: String },
    Static(String),
}

impl UsingDirective {
    pub fn parse(text: &str) -> Option<Self> {
        let compact = |s: &str| -> String {
            let name: String = s.chars().filter(|c| !c.is_whitespace()).collect();
            name.strip_prefix("global::").map_or(name.clone(), str::to_string)
        };

        let text = text.trim().trim_end_matches(';').trim();
        let text = match text.strip_prefix("global") {
            Some(rest) if rest.starts_with(char::is_whitespace) => rest.trim_start(),
            _ => text,
        };
        let rest = text.strip_prefix("using")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let rest = rest.trim_start();

        if let Some(target) = rest.strip_prefix("static") {
            if target.starts_with(char::is_whitespace) {
                return Some(Self::Static(compact(target)));
            }
        }
        if let Some((alias, target)) = rest.split_once('=') {
            return Some(Self::Alias {
                alias: compact(alias),
                target: compact(target),
            });
        }
        Some(Self::Namespace(compact(rest)))
    }
}

/// A namespace body (or the compilation unit) and the using directives it declares
#[derive(Debug, Clone)]
pub struct NamespaceScope {
    /// Fully qualified namespace, `None` for the compilation unit
    pub name: Option<String>,
    pub start: usize,
    pub end: usize,
    pub usings: Vec<UsingDirective>,
}

/// Every type declared in one compilation unit
#[derive(Debug, Default)]
pub struct SymbolTable<'t> {
    types: Vec<TypeSymbol<'t>>,
    by_path: HashMap<(String, usize), TypeId>,
    by_node: HashMap<usize, TypeId>,
    scopes: Vec<NamespaceScope>,
}

fn qualify(namespace: Option<&str>, name: &str) -> String {
    match namespace {
        Some(ns) if !ns.is_empty() => format!("{ns}.{name}"),
        _ => name.to_string(),
    }
}

fn using_directives(container: Node, source: &str) -> Vec<UsingDirective> {
    named_children(container)
        .into_iter()
        .filter(|c| c.kind() == "using_directive")
        .filter_map(|c| UsingDirective::parse(crate::syntax::text(c, source)))
        .collect()
}

impl<'t> SymbolTable<'t> {
    pub fn build(root: Node<'t>, source: &str) -> Self {
        let mut table = Self::default();
        table.scopes.push(NamespaceScope {
            name: None,
            start: root.start_byte(),
            end: root.end_byte(),
            usings: using_directives(root, source),
        });
        table.collect(root, source, None, None);
        log::debug!(
            "Declared {} types in {} namespace scopes",
            table.types.len(),
            table.scopes.len()
        );
        table
    }

    fn collect(
        &mut self,
        container: Node<'t>,
        source: &str,
        namespace: Option<&str>,
        containing: Option<TypeId>,
    ) {
        // A file-scoped namespace applies to the declarations that follow it.
        let mut namespace = namespace.map(str::to_string);

        for child in named_children(container) {
            match child.kind() {
                "namespace_declaration" => {
                    let Some(name) = child.child_by_field_name("name") else {
                        continue;
                    };
                    let full = qualify(namespace.as_deref(), &compact_text(name, source));
                    let body = declaration_body(child);
                    self.scopes.push(NamespaceScope {
                        name: Some(full.clone()),
                        start: child.start_byte(),
                        end: child.end_byte(),
                        usings: body.map_or_else(Vec::new, |b| using_directives(b, source)),
                    });
                    if let Some(body) = body {
                        self.collect(body, source, Some(&full), None);
                    }
                }
                "file_scoped_namespace_declaration" => {
                    let Some(name) = child.child_by_field_name("name") else {
                        continue;
                    };
                    let full = qualify(namespace.as_deref(), &compact_text(name, source));
                    self.scopes.push(NamespaceScope {
                        name: Some(full.clone()),
                        start: child.start_byte(),
                        end: container.end_byte(),
                        usings: using_directives(child, source),
                    });
                    self.collect(child, source, Some(&full), None);
                    namespace = Some(full);
                }
                kind if TYPE_DECLARATION_KINDS.contains(&kind) => {
                    let Some(id) = self.declare(child, source, namespace.as_deref(), containing)
                    else {
                        continue;
                    };
                    if let Some(body) = declaration_body(child) {
                        self.collect(body, source, namespace.as_deref(), Some(id));
                    }
                }
                "ERROR" | "declaration_list" => {
                    self.collect(child, source, namespace.as_deref(), containing);
                }
                _ => {}
            }
        }
    }

    fn declare(
        &mut self,
        node: Node<'t>,
        source: &str,
        namespace: Option<&str>,
        containing: Option<TypeId>,
    ) -> Option<TypeId> {
        let kind = TypeKind::from_node_kind(node.kind())?;
        let name = name_of(node, source).filter(|n| !n.is_empty())?.to_string();
        let type_params = type_parameter_names(node, source);
        let path = match containing {
            Some(outer) => format!("{}.{}", self.types[outer].path, name),
            None => qualify(namespace, &name),
        };
        let is_static = has_modifier(node, source, "static");
        let is_abstract = has_modifier(node, source, "abstract");

        let key = (path.clone(), type_params.len());
        if let Some(&id) = self.by_path.get(&key) {
            let existing = &mut self.types[id];
            existing.declarations.push(node);
            existing.is_static |= is_static;
            existing.is_abstract |= is_abstract;
            self.by_node.insert(node.id(), id);
            return Some(id);
        }

        let id = self.types.len();
        self.types.push(TypeSymbol {
            name,
            type_params,
            namespace: namespace.map(str::to_string),
            containing,
            kind,
            is_static,
            is_abstract,
            primary: node,
            declarations: vec![node],
            path,
        });
        self.by_path.insert(key, id);
        self.by_node.insert(node.id(), id);
        Some(id)
    }

    pub fn get(&self, id: TypeId) -> &TypeSymbol<'t> {
        &self.types[id]
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Type declared by `node`, if `node` is a type declaration
    pub fn declared_by(&self, node: Node) -> Option<TypeId> {
        self.by_node.get(&node.id()).copied()
    }

    /// Type by dotted path without type parameters, e.g. `Shop.Outer.Inner`
    pub fn lookup_path(&self, path: &str, arity: usize) -> Option<TypeId> {
        self.by_path.get(&(path.to_string(), arity)).copied()
    }

    pub fn nested(&self, container: TypeId, name: &str, arity: usize) -> Option<TypeId> {
        let path = format!("{}.{name}", self.types[container].path);
        self.lookup_path(&path, arity)
    }

    /// Namespace-or-containing-type prefix of a type's qualified display name, dot included
    pub fn display_prefix(&self, id: TypeId) -> String {
        let symbol = &self.types[id];
        match (symbol.containing, symbol.namespace.as_deref()) {
            (Some(outer), _) => format!("{}.", self.display_name(outer)),
            (None, Some(ns)) if !ns.is_empty() => format!("{ns}."),
            _ => String::new(),
        }
    }

    /// Fully qualified name with declared type parameters, e.g. `Shop.Box<T>`
    pub fn display_name(&self, id: TypeId) -> String {
        let symbol = &self.types[id];
        let mut out = self.display_prefix(id);
        out.push_str(&symbol.name);
        if !symbol.type_params.is_empty() {
            out.push('<');
            out.push_str(&symbol.type_params.join(", "));
            out.push('>');
        }
        out
    }

    /// Scopes enclosing a byte offset, outermost first
    pub fn scopes_at(&self, byte: usize) -> Vec<&NamespaceScope> {
        let mut scopes: Vec<&NamespaceScope> = self
            .scopes
            .iter()
            .filter(|s| s.start <= byte && byte <= s.end)
            .collect();
        scopes.sort_by_key(|s| std::cmp::Reverse(s.end - s.start));
        scopes
    }
}
