use arborium::tree_sitter::{Node, Parser, Tree};
use std::collections::HashSet;
use std::path::Path;

use crate::errors::{Result, ScannerError};

/// Set of unique class names collected from one or more templates
pub type ClassSet = HashSet<String>;

/// Keyword argument name htpy uses for the `class` attribute
const CLASS_KEYWORD: &str = "class_";

/// Visitor that extracts class names from htpy element calls.
///
/// Two conventions are recognized on every `call` node:
/// - `div(class_="flex p-4")`: the `class_` keyword with a string literal value
/// - `div(".flex .p-4")`: a bare-name callee whose first positional argument
///   is a string literal starting with `.`
pub struct TemplateVisitor<'a> {
    source: &'a str,
    /// Classes found so far
    pub classes: ClassSet,
}

impl<'a> TemplateVisitor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            classes: ClassSet::new(),
        }
    }

    /// Walk the whole tree below `root`, depth first
    pub fn visit(&mut self, root: Node) {
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if node.kind() == "call" {
                self.visit_call(node);
            }

            let mut cursor = node.walk();
            let children: Vec<Node> = node.named_children(&mut cursor).collect();
            // Reverse so children are visited in source order
            stack.extend(children.into_iter().rev());
        }
    }

    pub fn into_classes(self) -> ClassSet {
        self.classes
    }

    fn visit_call(&mut self, node: Node) {
        let Some(arguments) = node.child_by_field_name("arguments") else {
            return;
        };
        // `f(x for x in y)` has a generator in place of an argument list
        if arguments.kind() != "argument_list" {
            return;
        }

        let mut cursor = arguments.walk();
        let args: Vec<Node> = arguments
            .named_children(&mut cursor)
            .filter(|arg| arg.kind() != "comment")
            .collect();

        // class_="..."
        for arg in &args {
            if arg.kind() != "keyword_argument" {
                continue;
            }
            let is_class_keyword = arg
                .child_by_field_name("name")
                .is_some_and(|name| self.text(name) == CLASS_KEYWORD);
            if !is_class_keyword {
                continue;
            }
            if let Some(value) = arg
                .child_by_field_name("value")
                .and_then(|value| self.string_literal(value))
            {
                self.classes
                    .extend(value.split_whitespace().map(str::to_string));
            }
        }

        // div(".a .b")
        let callee_is_name = node
            .child_by_field_name("function")
            .is_some_and(|function| function.kind() == "identifier");
        if !callee_is_name {
            return;
        }
        let first_positional = args
            .iter()
            .find(|arg| !matches!(arg.kind(), "keyword_argument" | "dictionary_splat"));
        if let Some(value) = first_positional.and_then(|arg| self.string_literal(*arg)) {
            if value.starts_with('.') {
                self.classes.extend(
                    value
                        .split_whitespace()
                        .map(|token| token.trim_start_matches('.'))
                        .filter(|token| !token.is_empty())
                        .map(str::to_string),
                );
            }
        }
    }

    /// Value of a `str` constant expression, or `None` for anything computed.
    ///
    /// Adjacent literals are folded the way Python folds them; f-strings and
    /// byte strings are not `str` constants.
    fn string_literal(&self, node: Node) -> Option<String> {
        match node.kind() {
            "string" => decode_string_literal(self.text(node)),
            "concatenated_string" => {
                let mut cursor = node.walk();
                let parts: Vec<Node> = node
                    .named_children(&mut cursor)
                    .filter(|part| part.kind() != "comment")
                    .collect();
                let mut value = String::new();
                for part in parts {
                    if part.kind() != "string" {
                        return None;
                    }
                    value.push_str(&decode_string_literal(self.text(part))?);
                }
                Some(value)
            }
            "parenthesized_expression" => {
                let mut cursor = node.walk();
                let inner: Vec<Node> = node
                    .named_children(&mut cursor)
                    .filter(|child| child.kind() != "comment")
                    .collect();
                match inner.as_slice() {
                    [single] => self.string_literal(*single),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    fn text(&self, node: Node) -> &'a str {
        self.source
            .get(node.start_byte()..node.end_byte())
            .unwrap_or_default()
    }
}

/// Decode the source text of a single Python string token into its value.
///
/// Returns `None` for f-strings, byte strings and malformed tokens.
fn decode_string_literal(token: &str) -> Option<String> {
    let quote_start = token.find(['"', '\''])?;
    let prefix = token[..quote_start].to_ascii_lowercase();
    if prefix.contains('f') || prefix.contains('b') || prefix.contains('t') {
        return None;
    }
    let raw = prefix.contains('r');

    let quoted = &token[quote_start..];
    let quote_len = if quoted.starts_with("\"\"\"") || quoted.starts_with("'''") {
        3
    } else {
        1
    };
    if quoted.len() < quote_len * 2 {
        return None;
    }
    let body = &quoted[quote_len..quoted.len() - quote_len];

    if raw {
        Some(body.to_string())
    } else {
        Some(unescape(body))
    }
}

/// Resolve backslash escapes in a non-raw string body.
/// Unknown escapes, including `\N{...}` with an unknown name, are kept verbatim.
fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };
        match next {
            '\n' => {}
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\x0b'),
            '0'..='7' => {
                let mut digits = String::from(next);
                while digits.len() < 3 {
                    match chars.peek() {
                        Some(&d) if ('0'..='7').contains(&d) => {
                            digits.push(d);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                match u32::from_str_radix(&digits, 8).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push('\\');
                        out.push_str(&digits);
                    }
                }
            }
            'N' if chars.peek() == Some(&'{') => {
                let rest: String = chars.clone().skip(1).take_while(|&c| c != '}').collect();
                let closed = chars.clone().nth(1 + rest.chars().count()) == Some('}');
                match closed.then(|| unicode_names2::character(&rest.to_uppercase())).flatten() {
                    Some(decoded) => {
                        out.push(decoded);
                        // `{`, the name and `}`
                        for _ in 0..rest.chars().count() + 2 {
                            chars.next();
                        }
                    }
                    None => {
                        out.push('\\');
                        out.push('N');
                    }
                }
            }
            'x' | 'u' | 'U' => {
                let width = match next {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let digits: String = chars.clone().take(width).collect();
                let decoded = (digits.len() == width && digits.chars().all(|d| d.is_ascii_hexdigit()))
                    .then(|| u32::from_str_radix(&digits, 16).ok())
                    .flatten()
                    .and_then(char::from_u32);
                match decoded {
                    Some(decoded) => {
                        out.push(decoded);
                        for _ in 0..width {
                            chars.next();
                        }
                    }
                    None => {
                        out.push('\\');
                        out.push(next);
                    }
                }
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }

    out
}

/// Parse Python source into a syntax tree, rejecting sources with syntax errors
pub fn parse_python(content: &str, source_name: &str) -> Result<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&arborium_python::language().into())
        .map_err(|e| ScannerError::GrammarError(e.to_string()))?;

    let tree = parser
        .parse(content, None)
        .ok_or_else(|| ScannerError::ParseError {
            path: source_name.to_string(),
            message: "Parser produced no syntax tree".to_string(),
        })?;

    let root = tree.root_node();
    let rejected = if root.has_error() {
        Some(("Invalid Python syntax", first_error(root)))
    } else {
        first_invalid_construct(root).map(|(reason, node)| (reason, Some(node)))
    };

    if let Some((reason, node)) = rejected {
        let message = match node {
            Some(node) => {
                let pos = node.start_position();
                format!("{} at line {}, column {}", reason, pos.row + 1, pos.column + 1)
            }
            None => reason.to_string(),
        };
        return Err(ScannerError::ParseError {
            path: source_name.to_string(),
            message,
        });
    }

    Ok(tree)
}

/// Locate the first ERROR or MISSING node in source order
fn first_error(root: Node) -> Option<Node> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if !node.has_error() {
            continue;
        }
        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    None
}

/// Find constructs the grammar accepts but Python 3 rejects.
///
/// The grammar is lenient: it still knows Python 2 `print`/`exec` statements
/// and does not check argument order.
fn first_invalid_construct(root: Node) -> Option<(&'static str, Node)> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        match node.kind() {
            "print_statement" | "exec_statement" => {
                return Some(("Python 2 statement is not valid Python 3", node));
            }
            "argument_list" => {
                if let Some(violation) = argument_order_violation(node) {
                    return Some(violation);
                }
            }
            _ => {}
        }

        let mut cursor = node.walk();
        let children: Vec<Node> = node.named_children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    None
}

/// Positional arguments may not follow keywords, and `*args` may not follow `**kwargs`
fn argument_order_violation(arguments: Node) -> Option<(&'static str, Node)> {
    let mut seen_keyword = false;
    let mut seen_keyword_splat = false;

    let mut cursor = arguments.walk();
    for arg in arguments.named_children(&mut cursor) {
        match arg.kind() {
            "comment" => {}
            "keyword_argument" => seen_keyword = true,
            "dictionary_splat" => seen_keyword_splat = true,
            "list_splat" | "parenthesized_list_splat" => {
                if seen_keyword_splat {
                    return Some((
                        "Iterable argument unpacking follows keyword argument unpacking",
                        arg,
                    ));
                }
            }
            _ => {
                if seen_keyword_splat {
                    return Some(("Positional argument follows keyword argument unpacking", arg));
                }
                if seen_keyword {
                    return Some(("Positional argument follows keyword argument", arg));
                }
            }
        }
    }
    None
}

/// Parse Python content and extract all htpy class names
pub fn extract_classes_from_content(content: &str, source_name: &str) -> Result<ClassSet> {
    let tree = parse_python(content, source_name)?;

    let mut visitor = TemplateVisitor::new(content);
    visitor.visit(tree.root_node());

    Ok(visitor.into_classes())
}

/// Read a Python file and extract all htpy class names
pub fn extract_classes_from_file(file_path: &Path) -> Result<ClassSet> {
    let content = std::fs::read_to_string(file_path)?;
    extract_classes_from_content(&content, &file_path.display().to_string())
}
