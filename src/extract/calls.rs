use tree_sitter::Node;

use crate::model::CallPath;
use crate::util::{txt, walk};

/// Every call below `body`, in source order, nested callbacks included.
pub(super) fn collect_calls(body: Node, src: &[u8]) -> Vec<CallPath> {
    let mut calls = Vec::new();
    walk(body, |node| {
        if node.kind() == "call_expression" {
            if let Some(path) = call_path(node, src) {
                calls.push(path);
            }
        }
        true
    });
    calls
}

/// `lib.a.b()` -> `[lib, a, b]`, `this.x()` -> `[this, x]`, `f()` -> `[f]`.
pub(super) fn call_path(call: Node, src: &[u8]) -> Option<CallPath> {
    let func = call.child_by_field_name("function")?;
    let chain = match func.kind() {
        "identifier" => vec![txt(func, src).to_string()],
        "member_expression" => member_chain(func, src),
        _ => Vec::new(),
    };
    if chain.is_empty() {
        None
    } else {
        Some(CallPath(chain))
    }
}

/// Flatten a member expression into its identifier segments.
///
/// Objects that are not identifiers, `this` or further member accesses
/// (call results, subscripts) contribute no segment.
pub(super) fn member_chain(expr: Node, src: &[u8]) -> Vec<String> {
    match expr.kind() {
        "identifier" => vec![txt(expr, src).to_string()],
        "this" => vec!["this".to_string()],
        "member_expression" => {
            let mut chain = expr
                .child_by_field_name("object")
                .map(|o| member_chain(o, src))
                .unwrap_or_default();
            if let Some(prop) = expr.child_by_field_name("property") {
                chain.push(txt(prop, src).to_string());
            }
            chain
        }
        _ => Vec::new(),
    }
}
