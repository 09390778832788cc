//! Whitespace normalization of C# syntax.
//!
//! Source text is re-emitted token by token with canonical spacing: one space between
//! tokens unless punctuation forbids it, block braces on their own lines, one statement
//! per line and a fixed indentation unit per nesting level. String literals and comments
//! are emitted verbatim.

use crate::syntax::{children, is_comment};
use tree_sitter::Node;

/// Indentation and line-break settings of normalized text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub indent: String,
    pub newline: String,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            indent: "    ".to_string(),
            newline: "\n".to_string(),
        }
    }
}

/// Nodes emitted as a single token
const ATOMIC_KINDS: &[&str] = &[
    "string_literal",
    "verbatim_string_literal",
    "raw_string_literal",
    "interpolated_string_expression",
    "interpolated_verbatim_string_expression",
    "character_literal",
    "comment",
];

/// Parents whose braces open an indented block
const BLOCK_BRACE_PARENTS: &[&str] = &[
    "declaration_list",
    "block",
    "enum_member_declaration_list",
    "switch_body",
    "switch_block",
];

/// Keywords that keep a space before a following `(` or `[`
const SPACED_KEYWORDS: &[&str] = &[
    "if", "while", "for", "foreach", "switch", "using", "lock", "catch", "fixed", "return",
    "when", "in", "is", "and", "or", "not", "await", "throw", "yield", "else", "case", "as",
    "out", "ref", "var", "select", "where", "from", "let", "on", "equals", "by", "into",
    "orderby", "group", "join", "params",
];

/// Parents in which `:` is surrounded by spaces
const SPACED_COLON_PARENTS: &[&str] = &[
    "base_list",
    "conditional_expression",
    "constructor_initializer",
    "type_parameter_constraints_clause",
];

const SWITCH_LABEL_PARENTS: &[&str] = &[
    "switch_section",
    "case_switch_label",
    "default_switch_label",
    "case_pattern_switch_label",
    "switch_label",
];

const GENERIC_LIST_KINDS: &[&str] = &["type_argument_list", "type_parameter_list"];

/// Parents whose children each start on a line of their own
const MEMBER_LIST_PARENTS: &[&str] = &["declaration_list", "compilation_unit"];

#[derive(Debug, Clone, Copy)]
struct Token<'s> {
    text: &'s str,
    kind: &'static str,
    parent: &'static str,
    grandparent: &'static str,
    first_in_parent: bool,
    last_in_parent: bool,
    start_row: usize,
    end_row: usize,
    /// `{` or `}` delimiting an indented block
    block: bool,
    /// First token of a type member
    member_start: bool,
    /// Last token of a type member
    member_end: bool,
}

impl Token<'_> {
    fn is(&self, text: &str) -> bool {
        self.text == text
    }

    fn is_generic_bracket(&self) -> bool {
        (self.is("<") || self.is(">")) && GENERIC_LIST_KINDS.contains(&self.parent)
    }

    fn is_prefix_operator(&self) -> bool {
        self.parent == "prefix_unary_expression" && self.first_in_parent
    }

    fn is_postfix_operator(&self) -> bool {
        self.parent == "postfix_unary_expression" && self.last_in_parent
    }

    fn is_line_trivia(&self) -> bool {
        self.kind == "comment" || self.kind.starts_with("preproc")
    }

    fn is_word(&self) -> bool {
        self.text
            .chars()
            .next()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '@')
    }
}

fn is_atomic(node: Node) -> bool {
    let kind = node.kind();
    ATOMIC_KINDS.contains(&kind)
        || (kind.starts_with("preproc") && node.start_position().row == node.end_position().row)
}

fn is_block_brace(node: Node) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };
    match parent.kind() {
        "accessor_list" => children(parent).into_iter().any(|accessor| {
            accessor.kind() == "accessor_declaration"
                && children(accessor)
                    .iter()
                    .any(|c| matches!(c.kind(), "block" | "arrow_expression_clause"))
        }),
        kind => BLOCK_BRACE_PARENTS.contains(&kind),
    }
}

fn tokenize<'s>(node: Node, source: &'s str, out: &mut Vec<Token<'s>>) {
    let is_member = !is_comment(node)
        && node
            .parent()
            .is_some_and(|p| MEMBER_LIST_PARENTS.contains(&p.kind()));
    let first = out.len();
    tokenize_tokens(node, source, out);
    if is_member && out.len() > first {
        out[first].member_start = true;
        if let Some(last) = out.last_mut() {
            last.member_end = true;
        }
    }
}

fn tokenize_tokens<'s>(node: Node, source: &'s str, out: &mut Vec<Token<'s>>) {
    if node.child_count() > 0 && !is_atomic(node) {
        for child in children(node) {
            tokenize(child, source, out);
        }
        return;
    }

    let text = source.get(node.byte_range()).unwrap_or("").trim_end();
    if text.is_empty() {
        return;
    }
    let parent = node.parent();
    out.push(Token {
        text,
        kind: node.kind(),
        parent: parent.map_or("", |p| p.kind()),
        grandparent: parent.and_then(|p| p.parent()).map_or("", |g| g.kind()),
        first_in_parent: node.prev_sibling().is_none(),
        last_in_parent: node.next_sibling().is_none(),
        start_row: node.start_position().row,
        end_row: node.end_position().row,
        block: matches!(text, "{" | "}") && is_block_brace(node),
        member_start: false,
        member_end: false,
    });
}

fn needs_space(prev: &Token, cur: &Token) -> bool {
    if matches!(prev.text, "(" | "[" | "." | "::" | "->" | ".." | "?.")
        || (prev.is("<") && prev.is_generic_bracket())
        || (prev.is("?") && prev.parent == "conditional_access_expression")
        || (prev.is(")") && prev.parent == "cast_expression")
        || (prev.is(",") && prev.parent == "array_rank_specifier")
        || prev.is_prefix_operator()
    {
        return false;
    }

    match cur.text {
        ")" | "]" | ";" | "," | "." | "::" | "->" | ".." | "?." => false,
        "?" => !matches!(cur.parent, "nullable_type" | "conditional_access_expression"),
        "*" if cur.parent == "pointer_type" => false,
        "<" | ">" if cur.is_generic_bracket() => false,
        ":" => SPACED_COLON_PARENTS.contains(&cur.parent),
        "(" => {
            if (prev.is(">") && prev.is_generic_bracket()) || matches!(prev.text, ")" | "]") {
                false
            } else if prev.is_word() {
                SPACED_KEYWORDS.contains(&prev.text)
            } else {
                true
            }
        }
        "[" => {
            if matches!(prev.text, ")" | "]" | "?") || prev.is_generic_bracket() {
                false
            } else if prev.is_word() {
                SPACED_KEYWORDS.contains(&prev.text)
            } else {
                true
            }
        }
        _ if cur.is_postfix_operator() => false,
        _ => true,
    }
}

enum Brace {
    Block { saved_parens: usize },
    Inline,
}

struct Writer<'o> {
    options: &'o NormalizeOptions,
    single_line: bool,
    out: String,
    depth: usize,
    at_line_start: bool,
    force_space: bool,
    paren_depth: usize,
    braces: Vec<Brace>,
}

impl<'o> Writer<'o> {
    fn new(options: &'o NormalizeOptions, single_line: bool) -> Self {
        Self {
            options,
            single_line,
            out: String::new(),
            depth: 0,
            at_line_start: true,
            force_space: false,
            paren_depth: 0,
            braces: Vec::new(),
        }
    }

    fn line_break(&mut self) {
        if self.single_line {
            self.force_space = !self.out.is_empty();
            return;
        }
        if !self.at_line_start {
            self.out.push_str(&self.options.newline);
            self.at_line_start = true;
        }
    }

    fn blank_line(&mut self) {
        self.line_break();
        if !self.single_line {
            self.out.push_str(&self.options.newline);
        }
    }

    fn write(&mut self, text: &str, space_before: bool) {
        if self.at_line_start {
            if !self.single_line {
                for _ in 0..self.depth {
                    self.out.push_str(&self.options.indent);
                }
            }
        } else if space_before || self.force_space {
            self.out.push(' ');
        }
        self.out.push_str(text);
        self.at_line_start = false;
        self.force_space = false;
    }

    fn inside_inline_braces(&self) -> bool {
        matches!(self.braces.last(), Some(Brace::Inline))
    }

    fn render(mut self, tokens: &[Token]) -> String {
        let mut prev: Option<&Token> = None;

        for (i, token) in tokens.iter().enumerate() {
            let next = tokens.get(i + 1);

            if token.is_line_trivia() {
                if self.single_line {
                    continue;
                }
                let trailing =
                    !self.at_line_start && prev.is_some_and(|p| p.end_row == token.start_row);
                if !trailing {
                    self.line_break();
                }
                self.write(token.text, true);
                let ends_line = token.text.starts_with("//")
                    || token.kind.starts_with("preproc")
                    || next.is_some_and(|n| n.start_row > token.end_row);
                if ends_line {
                    self.line_break();
                }
                prev = Some(token);
                continue;
            }

            match (token.text, token.block) {
                ("{", true) => {
                    self.line_break();
                    self.write("{", false);
                    self.braces.push(Brace::Block {
                        saved_parens: self.paren_depth,
                    });
                    self.paren_depth = 0;
                    self.depth += 1;
                    self.line_break();
                }
                ("}", true) => {
                    self.depth = self.depth.saturating_sub(1);
                    self.line_break();
                    self.write("}", false);
                    if let Some(Brace::Block { saved_parens }) = self.braces.pop() {
                        self.paren_depth = saved_parens;
                    }
                    let closes_member = token.grandparent.ends_with("_declaration")
                        && token.grandparent != "accessor_declaration";
                    match next.map(|n| n.text) {
                        Some(";" | "," | ")") => {}
                        Some("}") | None => self.line_break(),
                        Some(_) if closes_member => self.blank_line(),
                        Some(_) => self.line_break(),
                    }
                }
                _ => {
                    if token.member_start {
                        self.line_break();
                    }
                    let space = prev.is_some_and(|p| needs_space(p, token));
                    self.write(token.text, space);
                    self.after_token(token);
                    if token.member_end {
                        self.line_break();
                    }
                }
            }
            prev = Some(token);
        }

        self.out.trim_end().to_string()
    }

    fn after_token(&mut self, token: &Token) {
        match token.text {
            "(" => self.paren_depth += 1,
            ")" => self.paren_depth = self.paren_depth.saturating_sub(1),
            "{" => self.braces.push(Brace::Inline),
            "}" => {
                self.braces.pop();
            }
            ";" if self.paren_depth == 0 && !self.inside_inline_braces() => self.line_break(),
            "," if token.parent == "enum_member_declaration_list" => self.line_break(),
            ":" if SWITCH_LABEL_PARENTS.contains(&token.parent) => self.line_break(),
            "]" if token.parent == "attribute_list" => {
                let on_declaration = token.grandparent.ends_with("declaration")
                    || matches!(token.grandparent, "global_attribute" | "compilation_unit");
                if on_declaration {
                    self.line_break();
                }
            }
            _ => {}
        }
    }
}

/// Comments directly preceding `node` that are not trailing the previous sibling's line
pub fn leading_comments(node: Node<'_>) -> Vec<Node<'_>> {
    let mut comments = Vec::new();
    let mut current = node.prev_sibling();
    while let Some(sibling) = current {
        if !is_comment(sibling) {
            break;
        }
        comments.push(sibling);
        current = sibling.prev_sibling();
    }
    if let Some(previous) = current {
        let row = previous.end_position().row;
        comments.retain(|c| c.start_position().row != row);
    }
    comments.reverse();
    comments
}

/// Normalized text of `node` alone
pub fn normalize_node(node: Node, source: &str, options: &NormalizeOptions) -> String {
    let mut tokens = Vec::new();
    tokenize(node, source, &mut tokens);
    Writer::new(options, false).render(&tokens)
}

/// Normalized text of `node` preceded by its leading comments
pub fn normalize_with_comments(node: Node, source: &str, options: &NormalizeOptions) -> String {
    let mut tokens = Vec::new();
    for comment in leading_comments(node) {
        tokenize(comment, source, &mut tokens);
    }
    tokenize(node, source, &mut tokens);
    Writer::new(options, false).render(&tokens)
}

/// Single-line header of a member: everything before its body, attributes and comments excluded
pub fn signature(node: Node, source: &str) -> String {
    let body = node.child_by_field_name("body");
    let mut tokens = Vec::new();
    for child in children(node) {
        if Some(child) == body || matches!(child.kind(), "block" | "arrow_expression_clause" | ";")
        {
            break;
        }
        if matches!(child.kind(), "attribute_list" | "comment") {
            continue;
        }
        tokenize(child, source, &mut tokens);
    }
    Writer::new(&NormalizeOptions::default(), true).render(&tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::CSharpParser;
    use crate::syntax::descendants;
    use pretty_assertions::assert_eq;

    fn first<'t>(root: Node<'t>, kind: &str) -> Node<'t> {
        descendants(root)
            .into_iter()
            .find(|n| n.kind() == kind)
            .unwrap()
    }

    #[test]
    fn lays_out_blocks_and_statements() {
        let src = "class   A{int x;   }";
        let tree = CSharpParser::new().unwrap().parse(src).unwrap();
        let class = first(tree.root_node(), "class_declaration");
        let text = normalize_node(class, src, &NormalizeOptions::default());
        assert_eq!(text, "class A\n{\n    int x;\n}");
    }

    #[test]
    fn honors_indent_and_newline_options() {
        let src = "class A{int x;}";
        let tree = CSharpParser::new().unwrap().parse(src).unwrap();
        let class = first(tree.root_node(), "class_declaration");
        let options = NormalizeOptions {
            indent: "\t".to_string(),
            newline: "\r\n".to_string(),
        };
        assert_eq!(
            normalize_node(class, src, &options),
            "class A\r\n{\r\n\tint x;\r\n}"
        );
    }

    #[test]
    fn keeps_auto_property_accessors_inline() {
        let src = "class A { public int Id {get;set;} }";
        let tree = CSharpParser::new().unwrap().parse(src).unwrap();
        let prop = first(tree.root_node(), "property_declaration");
        assert_eq!(
            normalize_node(prop, src, &NormalizeOptions::default()),
            "public int Id { get; set; }"
        );
    }

    #[test]
    fn members_start_on_their_own_lines() {
        let src = "class Dto { public int Id {get;set;} public string Name {get;set;} \
                   [Required] public Dto Parent {get;} public int X => 1; }";
        let tree = CSharpParser::new().unwrap().parse(src).unwrap();
        let class = first(tree.root_node(), "class_declaration");
        assert_eq!(
            normalize_node(class, src, &NormalizeOptions::default()),
            "class Dto\n{\n    public int Id { get; set; }\n    public string Name { get; set; }\n    \
             [Required]\n    public Dto Parent { get; }\n    public int X => 1;\n}"
        );
    }

    #[test]
    fn constructor_signature_includes_initializer() {
        let src = "class A : B { [Obsolete] public  A( int id ,string name ) : base(id) { } }";
        let tree = CSharpParser::new().unwrap().parse(src).unwrap();
        let ctor = first(tree.root_node(), "constructor_declaration");
        assert_eq!(
            signature(ctor, src),
            "public A(int id, string name) : base(id)"
        );
    }

    #[test]
    fn generic_method_signature_has_tight_brackets() {
        let src = "class A { public List < T > Get < T > ( T x ) { return null; } }";
        let tree = CSharpParser::new().unwrap().parse(src).unwrap();
        let method = first(tree.root_node(), "method_declaration");
        assert_eq!(signature(method, src), "public List<T> Get<T>(T x)");
    }

    #[test]
    fn leading_comments_travel_with_the_node() {
        let src = "namespace N\n{\n    // an order\n    class Order { }\n}";
        let tree = CSharpParser::new().unwrap().parse(src).unwrap();
        let class = first(tree.root_node(), "class_declaration");
        assert_eq!(
            normalize_with_comments(class, src, &NormalizeOptions::default()),
            "// an order\nclass Order\n{\n}"
        );
    }

    #[test]
    fn string_literals_are_verbatim() {
        let src = "class A { string s = \"a  {  b\"; }";
        let tree = CSharpParser::new().unwrap().parse(src).unwrap();
        let field = first(tree.root_node(), "field_declaration");
        assert_eq!(
            normalize_node(field, src, &NormalizeOptions::default()),
            "string s = \"a  {  b\";"
        );
    }
}
