//! Binding of type syntax to [`TypeRef`]s.
//!
//! Simple names are looked up in this order: type parameters of enclosing methods and
//! types, nested types of enclosing types, types of the enclosing namespaces (innermost
//! first), then the using directives in scope (aliases, then imported namespaces in source
//! and in the core library). A name that binds nowhere stays external and keeps its written
//! form.

use super::corelib::{self, CoreType};
use super::symbols::{TypeId, UsingDirective};
use super::SemanticModel;
use crate::syntax::{self, named_children};
use tree_sitter::Node;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    /// Type declared in the analyzed source
    Declared { id: TypeId, args: Vec<TypeRef> },
    /// Well-known core library type
    Core { core: CoreType, args: Vec<TypeRef> },
    /// Named type that does not bind, kept as written
    External { name: String, args: Vec<TypeRef> },
    TypeParameter(String),
    Nullable(Box<TypeRef>),
    Array { element: Box<TypeRef>, rank: usize },
    Tuple(Vec<TupleElement>),
    Pointer(Box<TypeRef>),
    Dynamic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TupleElement {
    pub ty: TypeRef,
    pub name: Option<String>,
}

impl TypeRef {
    pub fn core(core: CoreType) -> Self {
        Self::Core {
            core,
            args: Vec::new(),
        }
    }

    /// Core type behind a predefined keyword
    pub fn predefined(keyword: &str) -> Option<Self> {
        corelib::predefined(keyword).map(Self::core)
    }

    pub fn type_arguments(&self) -> &[TypeRef] {
        match self {
            Self::Declared { args, .. } | Self::Core { args, .. } | Self::External { args, .. } => {
                args
            }
            _ => &[],
        }
    }

    /// Whether this is the core type `namespace.name`
    pub fn is_core(&self, namespace: &str, name: &str) -> bool {
        matches!(self, Self::Core { core, .. } if core.namespace == namespace && core.name == name)
    }

    /// Replace type parameters by the matching type arguments
    pub fn substitute(&self, params: &[String], args: &[TypeRef]) -> TypeRef {
        if params.is_empty() || params.len() != args.len() {
            return self.clone();
        }
        let map_all = |items: &[TypeRef]| -> Vec<TypeRef> {
            items.iter().map(|t| t.substitute(params, args)).collect()
        };
        match self {
            Self::TypeParameter(name) => params
                .iter()
                .position(|p| p == name)
                .map_or_else(|| self.clone(), |i| args[i].clone()),
            Self::Declared { id, args: inner } => Self::Declared {
                id: *id,
                args: map_all(inner),
            },
            Self::Core { core, args: inner } => Self::Core {
                core: *core,
                args: map_all(inner),
            },
            Self::External { name, args: inner } => Self::External {
                name: name.clone(),
                args: map_all(inner),
            },
            Self::Nullable(inner) => Self::Nullable(Box::new(inner.substitute(params, args))),
            Self::Array { element, rank } => Self::Array {
                element: Box::new(element.substitute(params, args)),
                rank: *rank,
            },
            Self::Tuple(elements) => Self::Tuple(
                elements
                    .iter()
                    .map(|e| TupleElement {
                        ty: e.ty.substitute(params, args),
                        name: e.name.clone(),
                    })
                    .collect(),
            ),
            Self::Pointer(inner) => Self::Pointer(Box::new(inner.substitute(params, args))),
            Self::Dynamic => Self::Dynamic,
        }
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

/// `A.B.C` -> `A.B.C`, `A.B`, `A`, `` (global)
fn namespace_prefixes(namespace: Option<&str>) -> Vec<String> {
    let mut prefixes = Vec::new();
    let mut current = namespace.unwrap_or("").to_string();
    while !current.is_empty() {
        prefixes.push(current.clone());
        current = current
            .rsplit_once('.')
            .map_or_else(String::new, |(head, _)| head.to_string());
    }
    prefixes.push(String::new());
    prefixes
}

fn strip_global(path: &str) -> &str {
    path.strip_prefix("global::").unwrap_or(path)
}

impl<'t> SemanticModel<'t> {
    /// Bind a type syntax node. `None` for `var` and for syntax that is not a type.
    pub fn resolve_type(&self, node: Node<'t>) -> Option<TypeRef> {
        match node.kind() {
            "predefined_type" => TypeRef::predefined(self.text(node).trim()),
            "implicit_type" => None,
            "identifier" => {
                let name = self.text(node).trim();
                if let Some(bound) = self.lookup_simple(name, Vec::new(), node) {
                    return Some(bound);
                }
                match name {
                    "var" => None,
                    "dynamic" => Some(TypeRef::Dynamic),
                    _ => Some(TypeRef::External {
                        name: name.to_string(),
                        args: Vec::new(),
                    }),
                }
            }
            "generic_name" => {
                let (name, args) = self.simple_name_parts(node)?;
                Some(
                    self.lookup_simple(&name, args.clone(), node)
                        .unwrap_or(TypeRef::External { name, args }),
                )
            }
            "qualified_name" => self.resolve_qualified(node).or_else(|| {
                let qualifier = node
                    .child_by_field_name("qualifier")
                    .or_else(|| named_children(node).into_iter().next())?;
                let simple = node
                    .child_by_field_name("name")
                    .or_else(|| named_children(node).into_iter().last())?;
                let (name, args) = self.simple_name_parts(simple)?;
                let qualifier = syntax::compact_text(qualifier, self.source());
                Some(TypeRef::External {
                    name: join(strip_global(&qualifier), &name),
                    args,
                })
            }),
            "alias_qualified_name" => {
                let compact = syntax::compact_text(node, self.source());
                let path = strip_global(&compact);
                Some(self.resolve_path(path, node))
            }
            "nullable_type" => {
                let inner = syntax::type_node(node)
                    .or_else(|| named_children(node).into_iter().next())?;
                self.resolve_type(inner)
                    .map(|t| TypeRef::Nullable(Box::new(t)))
            }
            "array_type" => {
                let element = syntax::type_node(node)
                    .or_else(|| named_children(node).into_iter().next())?;
                let rank = node
                    .child_by_field_name("rank")
                    .or_else(|| syntax::child_of_kind(node, &["array_rank_specifier"]))
                    .map_or(1, |r| self.text(r).matches(',').count() + 1);
                self.resolve_type(element).map(|t| TypeRef::Array {
                    element: Box::new(t),
                    rank,
                })
            }
            "pointer_type" => {
                let inner = syntax::type_node(node)
                    .or_else(|| named_children(node).into_iter().next())?;
                self.resolve_type(inner)
                    .map(|t| TypeRef::Pointer(Box::new(t)))
            }
            "tuple_type" => {
                let elements = named_children(node)
                    .into_iter()
                    .filter(|c| c.kind() == "tuple_element")
                    .map(|element| {
                        let ty = syntax::type_node(element)
                            .or_else(|| named_children(element).into_iter().next())
                            .and_then(|t| self.resolve_type(t))
                            .unwrap_or(TypeRef::External {
                                name: self.text(element).trim().to_string(),
                                args: Vec::new(),
                            });
                        let name = element
                            .child_by_field_name("name")
                            .map(|n| self.text(n).trim().to_string());
                        TupleElement { ty, name }
                    })
                    .collect();
                Some(TypeRef::Tuple(elements))
            }
            "ref_type" | "scoped_type" => {
                let inner = syntax::type_node(node)
                    .or_else(|| named_children(node).into_iter().last())?;
                self.resolve_type(inner)
            }
            "function_pointer_type" => Some(TypeRef::External {
                name: syntax::compact_text(node, self.source()),
                args: Vec::new(),
            }),
            _ => None,
        }
    }

    /// Name and bound type arguments of an `identifier` or `generic_name`
    fn simple_name_parts(&self, node: Node<'t>) -> Option<(String, Vec<TypeRef>)> {
        match node.kind() {
            "identifier" => Some((self.text(node).trim().to_string(), Vec::new())),
            "generic_name" => {
                let name = syntax::field_or_kind(node, "name", &["identifier"])?;
                let args = syntax::child_of_kind(node, &["type_argument_list"])
                    .map(|list| {
                        named_children(list)
                            .into_iter()
                            .map(|arg| {
                                self.resolve_type(arg).unwrap_or(TypeRef::External {
                                    name: self.text(arg).trim().to_string(),
                                    args: Vec::new(),
                                })
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                Some((self.text(name).trim().to_string(), args))
            }
            _ => None,
        }
    }

    /// Bind a name that denotes a type, without falling back to an external type
    pub(crate) fn resolve_named(&self, node: Node<'t>) -> Option<TypeRef> {
        match node.kind() {
            "identifier" | "generic_name" => {
                let (name, args) = self.simple_name_parts(node)?;
                self.lookup_simple(&name, args, node)
            }
            "qualified_name" => self.resolve_qualified(node),
            "predefined_type" => TypeRef::predefined(self.text(node).trim()),
            _ => None,
        }
    }

    fn lookup_simple(&self, name: &str, args: Vec<TypeRef>, at: Node<'t>) -> Option<TypeRef> {
        let arity = args.len();
        let source = self.source();

        for ancestor in syntax::ancestors(at) {
            if arity == 0
                && matches!(ancestor.kind(), "method_declaration" | "local_function_statement")
                && syntax::type_parameter_names(ancestor, source)
                    .iter()
                    .any(|p| p == name)
            {
                return Some(TypeRef::TypeParameter(name.to_string()));
            }
            if let Some(id) = self.declared_type(ancestor) {
                if arity == 0 && self.symbol(id).type_params.iter().any(|p| p == name) {
                    return Some(TypeRef::TypeParameter(name.to_string()));
                }
                if let Some(nested) = self.symbols().nested(id, name, arity) {
                    return Some(TypeRef::Declared { id: nested, args });
                }
            }
        }

        let scopes = self.symbols().scopes_at(at.start_byte());
        let innermost = scopes.iter().rev().find_map(|s| s.name.as_deref());
        for prefix in namespace_prefixes(innermost) {
            if let Some(id) = self.symbols().lookup_path(&join(&prefix, name), arity) {
                return Some(TypeRef::Declared { id, args });
            }
        }

        for scope in scopes.iter().rev() {
            for using in &scope.usings {
                if let UsingDirective::Alias { alias, target } = using {
                    if arity == 0 && alias == name {
                        return Some(self.resolve_path(target, at));
                    }
                }
            }
            for using in &scope.usings {
                if let UsingDirective::Namespace(namespace) = using {
                    if let Some(bound) = self.lookup_in_namespace(namespace, name, &args) {
                        return Some(bound);
                    }
                }
            }
        }
        None
    }

    fn lookup_in_namespace(&self, namespace: &str, name: &str, args: &[TypeRef]) -> Option<TypeRef> {
        let arity = args.len();
        if let Some(id) = self.symbols().lookup_path(&join(namespace, name), arity) {
            return Some(TypeRef::Declared {
                id,
                args: args.to_vec(),
            });
        }
        corelib::lookup(namespace, name, arity).map(|core| TypeRef::Core {
            core,
            args: args.to_vec(),
        })
    }

    fn resolve_qualified(&self, node: Node<'t>) -> Option<TypeRef> {
        let qualifier = node
            .child_by_field_name("qualifier")
            .or_else(|| named_children(node).into_iter().next())?;
        let simple = node
            .child_by_field_name("name")
            .or_else(|| named_children(node).into_iter().last())?;
        let (name, args) = self.simple_name_parts(simple)?;
        let arity = args.len();

        if let Some(TypeRef::Declared { id, .. }) = self.resolve_named(qualifier) {
            return self
                .symbols()
                .nested(id, &name, arity)
                .map(|nested| TypeRef::Declared { id: nested, args });
        }

        let written = syntax::compact_text(qualifier, self.source());
        if written.contains('<') {
            return None;
        }
        let mut candidates = vec![strip_global(&written).to_string()];
        if let Some(expanded) = self.expand_namespace_alias(&written, node) {
            candidates.push(expanded);
        }

        let scopes = self.symbols().scopes_at(node.start_byte());
        let innermost = scopes.iter().rev().find_map(|s| s.name.as_deref());
        for namespace in &candidates {
            for prefix in namespace_prefixes(innermost) {
                let path = join(&join(&prefix, namespace), &name);
                if let Some(id) = self.symbols().lookup_path(&path, arity) {
                    return Some(TypeRef::Declared { id, args });
                }
            }
            if let Some(core) = corelib::lookup(namespace, &name, arity) {
                return Some(TypeRef::Core { core, args });
            }
        }
        None
    }

    /// `Col.List` with `using Col = System.Collections.Generic;` -> `System.Collections.Generic`
    fn expand_namespace_alias(&self, qualifier: &str, at: Node<'t>) -> Option<String> {
        let (head, rest) = match qualifier.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (qualifier, None),
        };
        let head = head.split("::").last().unwrap_or(head);
        self.symbols()
            .scopes_at(at.start_byte())
            .iter()
            .rev()
            .flat_map(|scope| scope.usings.iter())
            .find_map(|using| match using {
                UsingDirective::Alias { alias, target } if alias == head => Some(match rest {
                    Some(rest) => join(target, rest),
                    None => target.clone(),
                }),
                _ => None,
            })
    }

    /// Bind a dotted path written without type arguments
    fn resolve_path(&self, path: &str, at: Node<'t>) -> TypeRef {
        let path = strip_global(path);
        if let Some(id) = self.symbols().lookup_path(path, 0) {
            return TypeRef::Declared {
                id,
                args: Vec::new(),
            };
        }
        // Alias targets never see other aliases, so only in-source paths relative to the
        // enclosing namespaces are tried before the core library.
        let scopes = self.symbols().scopes_at(at.start_byte());
        let innermost = scopes.iter().rev().find_map(|s| s.name.as_deref());
        for prefix in namespace_prefixes(innermost) {
            if let Some(id) = self.symbols().lookup_path(&join(&prefix, path), 0) {
                return TypeRef::Declared {
                    id,
                    args: Vec::new(),
                };
            }
        }
        corelib::lookup_qualified(path, 0).map_or_else(
            || TypeRef::External {
                name: path.to_string(),
                args: Vec::new(),
            },
            TypeRef::core,
        )
    }

    /// Declared type, if `ty` denotes a type from the analyzed source
    pub fn in_source(&self, ty: &TypeRef) -> Option<TypeId> {
        match ty {
            TypeRef::Declared { id, .. } => Some(*id),
            TypeRef::Nullable(inner) => match inner.as_ref() {
                TypeRef::Declared { id, .. } if self.symbol(*id).kind.is_reference() => Some(*id),
                _ => None,
            },
            _ => None,
        }
    }

    /// Whether `ty` is a named type (as opposed to an array, pointer or type parameter)
    pub fn is_named(&self, ty: &TypeRef) -> bool {
        match ty {
            TypeRef::Declared { .. }
            | TypeRef::Core { .. }
            | TypeRef::External { .. }
            | TypeRef::Tuple(_) => true,
            TypeRef::Nullable(inner) => self.is_named(inner),
            TypeRef::TypeParameter(_)
            | TypeRef::Array { .. }
            | TypeRef::Pointer(_)
            | TypeRef::Dynamic => false,
        }
    }

    /// Human-readable form: in-source types fully qualified, core special types as keywords,
    /// external types as written
    pub fn display(&self, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Declared { id, args } => {
                if args.is_empty() {
                    self.display_name(*id)
                } else {
                    format!(
                        "{}{}<{}>",
                        self.symbols().display_prefix(*id),
                        self.symbol(*id).name,
                        self.display_list(args)
                    )
                }
            }
            TypeRef::Core { core, args } => match args.as_slice() {
                [inner] if core.namespace == "System" && core.name == "Nullable" => {
                    format!("{}?", self.display(inner))
                }
                [] => core
                    .keyword
                    .map_or_else(|| core.full_name(), str::to_string),
                _ => format!("{}<{}>", core.full_name(), self.display_list(args)),
            },
            TypeRef::External { name, args } => {
                if args.is_empty() {
                    name.clone()
                } else {
                    format!("{name}<{}>", self.display_list(args))
                }
            }
            TypeRef::TypeParameter(name) => name.clone(),
            TypeRef::Nullable(inner) => format!("{}?", self.display(inner)),
            TypeRef::Array { element, rank } => format!(
                "{}[{}]",
                self.display(element),
                ",".repeat(rank.saturating_sub(1))
            ),
            TypeRef::Tuple(elements) => {
                let parts: Vec<String> = elements
                    .iter()
                    .map(|e| match &e.name {
                        Some(name) => format!("{} {name}", self.display(&e.ty)),
                        None => self.display(&e.ty),
                    })
                    .collect();
                format!("({})", parts.join(", "))
            }
            TypeRef::Pointer(inner) => format!("{}*", self.display(inner)),
            TypeRef::Dynamic => "dynamic".to_string(),
        }
    }

    fn display_list(&self, types: &[TypeRef]) -> String {
        types
            .iter()
            .map(|t| self.display(t))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::CSharpParser;
    use crate::syntax::descendants;
    use pretty_assertions::assert_eq;

    /// Display of every property type in declaration order
    fn property_types(src: &str) -> Vec<String> {
        let tree = CSharpParser::new().unwrap().parse(src).unwrap();
        let model = SemanticModel::build(&tree, src);
        descendants(tree.root_node())
            .into_iter()
            .filter(|n| n.kind() == "property_declaration")
            .map(|p| {
                let ty = syntax::type_node(p).and_then(|t| model.resolve_type(t));
                ty.map_or_else(|| "<none>".to_string(), |t| model.display(&t))
            })
            .collect()
    }

    #[test]
    fn binds_source_types_from_enclosing_namespaces() {
        let src = r"
namespace Shop.Core { public class Money { } }
namespace Shop.Core.Orders {
    public class Order {
        public Money Total { get; set; }
        public Order Parent { get; set; }
    }
}";
        assert_eq!(
            property_types(src),
            vec!["Shop.Core.Money", "Shop.Core.Orders.Order"]
        );
    }

    #[test]
    fn core_types_need_their_namespace_imported() {
        let src = r"
using System.Collections.Generic;
namespace Shop {
    public class Cart {
        public List<int> Ids { get; set; }
        public Task<string> Pending { get; set; }
        public string Name { get; set; }
        public int? Count { get; set; }
    }
}";
        assert_eq!(
            property_types(src),
            vec![
                "System.Collections.Generic.List<int>",
                "Task<string>",
                "string",
                "int?"
            ]
        );
    }

    #[test]
    fn type_parameters_and_nested_types() {
        let src = r"
namespace Shop {
    public class Box<T> {
        public T Value { get; set; }
        public Lid Top { get; set; }
        public class Lid { }
    }
    public class Crate {
        public Box<Crate>[] Boxes { get; set; }
    }
}";
        assert_eq!(
            property_types(src),
            vec!["T", "Shop.Box<T>.Lid", "Shop.Box<Shop.Crate>[]"]
        );
    }

    #[test]
    fn aliases_and_qualified_names() {
        let src = r"
using Store = Shop.Data.Store;
namespace Shop.Data { public class Store { } }
namespace Shop.Web {
    public class Page {
        public Store Backing { get; set; }
        public Shop.Data.Store Direct { get; set; }
        public Vendor.Api.Client Remote { get; set; }
    }
}";
        assert_eq!(
            property_types(src),
            vec!["Shop.Data.Store", "Shop.Data.Store", "Vendor.Api.Client"]
        );
    }

    #[test]
    fn substitutes_type_arguments() {
        let param = TypeRef::TypeParameter("T".into());
        let arg = TypeRef::predefined("int").unwrap();
        let list = TypeRef::Nullable(Box::new(param));
        assert_eq!(
            list.substitute(&["T".to_string()], &[arg.clone()]),
            TypeRef::Nullable(Box::new(arg))
        );
    }
}
