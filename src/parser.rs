use std::path::Path;

use tree_sitter::{Language, Node, Parser, Tree};

use crate::error::Error;

/// Detect the tree-sitter language from a file extension.
///
/// Plain JavaScript goes through the TypeScript grammar too, which accepts
/// annotations, decorators and class fields without erroring.
pub fn detect_language(ext: &str) -> Result<Language, Error> {
    match ext {
        "tsx" | "jsx" => Ok(tree_sitter_typescript::LANGUAGE_TSX.into()),
        "" | "ts" | "mts" | "cts" | "js" | "mjs" | "cjs" => {
            Ok(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())
        }
        _ => Err(Error::UnsupportedExtension(ext.to_string())),
    }
}

/// Parse source text, picking the grammar from `filename`'s extension.
///
/// A tree with any `ERROR` or missing node is rejected so that a half-parsed
/// module never produces a misleading scaffold.
pub fn parse_source(source: &str, filename: &str) -> Result<Tree, Error> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");
    let language = detect_language(ext)?;

    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .map_err(|e| Error::Language(e.to_string()))?;

    let tree = parser.parse(source, None).ok_or_else(|| Error::ParseFailed {
        filename: filename.to_string(),
        line: 0,
        column: 0,
    })?;

    if let Some(bad) = first_error(tree.root_node()) {
        let pos = bad.start_position();
        return Err(Error::ParseFailed {
            filename: filename.to_string(),
            line: pos.row + 1,
            column: pos.column + 1,
        });
    }

    Ok(tree)
}

/// Find the first `ERROR` or missing node in document order.
fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_function() {
        let tree = parse_source("function doSomething() {}", "my-module.js").unwrap();
        assert_eq!(tree.root_node().kind(), "program");
    }

    #[test]
    fn tolerates_type_annotations_and_decorators() {
        let src = "@Injectable()\nexport class Service {\n  name: string;\n  run(a: number): void {}\n}";
        assert!(parse_source(src, "service.ts").is_ok());
    }

    #[test]
    fn malformed_input_reports_position() {
        let err = parse_source("function broken( {", "broken.js").unwrap_err();
        match err {
            Error::ParseFailed { filename, line, .. } => {
                assert_eq!(filename, "broken.js");
                assert_eq!(line, 1);
            }
            other => panic!("expected ParseFailed, got {other:?}"),
        }
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = parse_source("", "styles.css").unwrap_err();
        assert!(matches!(err, Error::UnsupportedExtension(ext) if ext == "css"));
    }

    #[test]
    fn missing_extension_uses_typescript_grammar() {
        assert!(parse_source("var add = function(a, b) { return a + b; }", "my-module").is_ok());
    }
}
