use tree_sitter::Node;

/// Extract UTF-8 text from a tree-sitter node, returning `""` on failure.
pub fn txt<'a>(node: Node, src: &'a [u8]) -> &'a str {
    node.utf8_text(src).unwrap_or("")
}

/// Strip surrounding quotes (`'`, `"`, `` ` ``) from a string literal.
pub fn trim_quotes(s: &str) -> &str {
    s.trim_matches(|c: char| c == '\'' || c == '"' || c == '`')
}

/// `Util` -> `util`, `HTTPClient` -> `hTTPClient`.
pub fn lower_camel(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// 1-based line of a node's first byte.
pub fn line_of(node: Node) -> usize {
    node.start_position().row + 1
}

/// Pre-order walk below and including `root`.
///
/// `visit` returns whether to descend into the node's children.
pub fn walk(root: Node, mut visit: impl FnMut(Node) -> bool) {
    let mut cursor = root.walk();
    loop {
        let descend = visit(cursor.node());
        if descend && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}

/// Nodes that open a new function or class scope.
pub fn is_nested_scope(kind: &str) -> bool {
    matches!(
        kind,
        "function_declaration"
            | "generator_function_declaration"
            | "function_expression"
            | "function"
            | "generator_function"
            | "arrow_function"
            | "method_definition"
            | "class"
            | "class_declaration"
            | "abstract_class_declaration"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &[u8]) -> tree_sitter::Tree {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())
            .unwrap();
        parser.parse(src, None).unwrap()
    }

    #[test]
    fn lower_camel_lowers_only_first_char() {
        assert_eq!(lower_camel("TestClass"), "testClass");
        assert_eq!(lower_camel("util"), "util");
        assert_eq!(lower_camel(""), "");
    }

    #[test]
    fn walk_visits_in_source_order() {
        let src = b"a(); function f() { b(); } c();";
        let tree = parse(src);
        let mut calls = Vec::new();
        walk(tree.root_node(), |n| {
            if n.kind() == "call_expression" {
                calls.push(txt(n, src).to_string());
            }
            true
        });
        assert_eq!(calls, vec!["a()", "b()", "c()"]);
    }

    #[test]
    fn walk_can_prune_subtrees() {
        let src = b"a(); function f() { b(); } c();";
        let tree = parse(src);
        let mut calls = Vec::new();
        walk(tree.root_node(), |n| {
            if n.kind() == "call_expression" {
                calls.push(txt(n, src).to_string());
            }
            !is_nested_scope(n.kind())
        });
        assert_eq!(calls, vec!["a()", "c()"]);
    }
}
