//! Small helpers over tree-sitter C# nodes

use tree_sitter::Node;

/// Declarations that introduce a named type
pub const TYPE_DECLARATION_KINDS: &[&str] = &[
    "class_declaration",
    "struct_declaration",
    "record_declaration",
    "record_struct_declaration",
    "interface_declaration",
    "enum_declaration",
    "delegate_declaration",
];

/// Declarations reported as classes
pub const CLASS_LIKE_KINDS: &[&str] = &[
    "class_declaration",
    "struct_declaration",
    "record_declaration",
    "record_struct_declaration",
];

/// Declarations whose bodies hold members worth following
pub const MEMBER_CONTAINER_KINDS: &[&str] = &[
    "class_declaration",
    "struct_declaration",
    "record_declaration",
    "record_struct_declaration",
    "interface_declaration",
];

pub fn text<'s>(node: Node, source: &'s str) -> &'s str {
    source.get(node.byte_range()).unwrap_or("")
}

/// Source text with all whitespace removed, used for names such as `System . Linq`
pub fn compact_text(node: Node, source: &str) -> String {
    text(node, source)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

pub fn children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

pub fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// First named child of one of the given kinds
pub fn child_of_kind<'t>(node: Node<'t>, kinds: &[&str]) -> Option<Node<'t>> {
    named_children(node)
        .into_iter()
        .find(|c| kinds.contains(&c.kind()))
}

/// Field lookup with a fallback to the first child of the given kinds
pub fn field_or_kind<'t>(node: Node<'t>, field: &str, kinds: &[&str]) -> Option<Node<'t>> {
    node.child_by_field_name(field)
        .or_else(|| child_of_kind(node, kinds))
}

/// All descendants of `node` in source order, `node` itself excluded
pub fn descendants<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut out = Vec::new();
    let mut stack: Vec<Node<'t>> = named_and_anonymous_rev(node);
    while let Some(current) = stack.pop() {
        out.push(current);
        stack.extend(named_and_anonymous_rev(current));
    }
    out
}

fn named_and_anonymous_rev(node: Node<'_>) -> Vec<Node<'_>> {
    let mut kids = children(node);
    kids.reverse();
    kids
}

pub fn ancestors<'t>(node: Node<'t>) -> impl Iterator<Item = Node<'t>> {
    std::iter::successors(node.parent(), Node::parent)
}

/// Modifier keywords of a declaration (`public`, `static`, ...)
pub fn modifiers<'s>(node: Node, source: &'s str) -> Vec<&'s str> {
    named_children(node)
        .into_iter()
        .filter(|c| c.kind() == "modifier")
        .map(|c| text(c, source).trim())
        .collect()
}

pub fn has_modifier(node: Node, source: &str, modifier: &str) -> bool {
    modifiers(node, source).contains(&modifier)
}

/// Declared identifier of a declaration or variable
pub fn name_of<'s>(node: Node, source: &'s str) -> Option<&'s str> {
    field_or_kind(node, "name", &["identifier"]).map(|n| text(n, source).trim())
}

/// Body of a type or namespace declaration
pub fn declaration_body(node: Node<'_>) -> Option<Node<'_>> {
    field_or_kind(node, "body", &["declaration_list", "enum_member_declaration_list"])
}

/// Type parameter names of a generic declaration
pub fn type_parameter_names(node: Node, source: &str) -> Vec<String> {
    let Some(list) = child_of_kind(node, &["type_parameter_list"]) else {
        return Vec::new();
    };
    named_children(list)
        .into_iter()
        .filter(|c| c.kind() == "type_parameter")
        .filter_map(|p| {
            p.child_by_field_name("name")
                .or_else(|| {
                    named_children(p)
                        .into_iter()
                        .rev()
                        .find(|c| c.kind() == "identifier")
                })
                .map(|n| text(n, source).trim().to_string())
        })
        .collect()
}

/// `parameter` nodes of a member's parameter list
pub fn parameters<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let Some(list) = field_or_kind(node, "parameters", &["parameter_list"]) else {
        return Vec::new();
    };
    named_children(list)
        .into_iter()
        .filter(|c| c.kind() == "parameter")
        .collect()
}

/// Declared type node of a parameter, property, variable declaration and the like
pub fn type_node(node: Node<'_>) -> Option<Node<'_>> {
    node.child_by_field_name("type")
}

pub fn is_comment(node: Node) -> bool {
    node.kind() == "comment"
}
