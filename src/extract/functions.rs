use tree_sitter::Node;

use super::calls::{collect_calls, member_chain};
use super::{Candidate, Extraction};
use crate::model::{CallPath, Construct, Diagnostic, FunctionDefinition, UnitKind};
use crate::util::{is_nested_scope, line_of, txt, walk};

/// What a function body reveals about itself.
#[derive(Debug, Default)]
pub(super) struct BodyFacts {
    pub parameters: Vec<String>,
    pub local_variables: Vec<String>,
    pub assigned_members: Vec<String>,
    pub call_sites: Vec<CallPath>,
    pub returns_value: bool,
}

/// `function name(...) {}`
pub(super) fn extract_declaration(node: Node, src: &[u8], out: &mut Extraction) {
    let Some(name) = node.child_by_field_name("name") else {
        return;
    };
    let mut diagnostics = Vec::new();
    let facts = analyze(node, src, &mut diagnostics);
    out.functions.push(Candidate {
        unit: definition(txt(name, src).to_string(), Vec::new(), None, facts),
        diagnostics,
    });
}

/// A function expression or arrow function, named by what it is bound to.
pub(super) fn extract_value(node: Node, src: &[u8], out: &mut Extraction) {
    let Some(binding) = binding_name(node, src) else {
        tracing::debug!(line = line_of(node), "unbound function value");
        return;
    };
    let mut diagnostics = Vec::new();
    let facts = analyze(node, src, &mut diagnostics);
    out.functions.push(Candidate {
        unit: definition(binding.name, binding.callee_path, binding.prototype_owner, facts),
        diagnostics,
    });
}

fn definition(
    name: String,
    callee_path: Vec<String>,
    prototype_owner: Option<usize>,
    facts: BodyFacts,
) -> FunctionDefinition {
    FunctionDefinition {
        name,
        kind: UnitKind::Function,
        parameters: facts.parameters,
        local_variables: facts.local_variables,
        call_sites: facts.call_sites,
        returns_value: facts.returns_value,
        callee_path,
        prototype_owner,
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Binding {
    name: String,
    callee_path: Vec<String>,
    prototype_owner: Option<usize>,
}

/// `const name = function...` -> `name`;
/// `A.prototype.b.name = function...` -> `name` qualified by `[A, b]`, owner `A`.
fn binding_name(node: Node, src: &[u8]) -> Option<Binding> {
    let parent = node.parent()?;
    match parent.kind() {
        "variable_declarator" if parent.child_by_field_name("value") == Some(node) => {
            let name = parent.child_by_field_name("name")?;
            (name.kind() == "identifier").then(|| Binding {
                name: txt(name, src).to_string(),
                callee_path: Vec::new(),
                prototype_owner: None,
            })
        }
        "assignment_expression" if parent.child_by_field_name("right") == Some(node) => {
            let left = parent.child_by_field_name("left")?;
            let mut chain = match left.kind() {
                "identifier" => vec![txt(left, src).to_string()],
                "member_expression" => member_chain(left, src),
                _ => return None,
            };
            let name = chain.pop()?;
            let mut prototype_owner = None;
            let mut callee_path = Vec::with_capacity(chain.len());
            for segment in chain {
                if segment == "prototype" {
                    if prototype_owner.is_none() && !callee_path.is_empty() {
                        prototype_owner = Some(callee_path.len() - 1);
                    }
                } else {
                    callee_path.push(segment);
                }
            }
            Some(Binding {
                name,
                callee_path,
                prototype_owner,
            })
        }
        _ => None,
    }
}

/// Read parameters, locals, self-member writes, calls and returns of a
/// function-like node (declaration, expression, arrow or method).
pub(super) fn analyze(func: Node, src: &[u8], diagnostics: &mut Vec<Diagnostic>) -> BodyFacts {
    let mut facts = BodyFacts {
        parameters: parameter_names(func, src, diagnostics),
        ..BodyFacts::default()
    };

    let Some(body) = func.child_by_field_name("body") else {
        return facts;
    };

    // `(a) => a + 1` returns its expression.
    if body.kind() != "statement_block" {
        facts.returns_value = true;
    }

    walk(body, |node| {
        match node.kind() {
            "variable_declarator" => {
                if let Some(name) = node.child_by_field_name("name") {
                    if name.kind() == "identifier" {
                        facts.local_variables.push(txt(name, src).to_string());
                    }
                }
            }
            "return_statement" => facts.returns_value = true,
            "assignment_expression" => {
                if let Some(member) = self_member_written(node, src) {
                    if !facts.assigned_members.contains(&member) {
                        facts.assigned_members.push(member);
                    }
                }
            }
            _ => {}
        }
        node == body || !is_nested_scope(node.kind())
    });

    facts.call_sites = collect_calls(body, src);
    facts
}

/// `this.name = ...` -> `name`
fn self_member_written(assign: Node, src: &[u8]) -> Option<String> {
    let left = assign.child_by_field_name("left")?;
    if left.kind() != "member_expression" {
        return None;
    }
    let object = left.child_by_field_name("object")?;
    let property = left.child_by_field_name("property")?;
    (object.kind() == "this").then(|| txt(property, src).to_string())
}

/// Parameter names in declared order.
///
/// Defaults reduce to their target, rest parameters to their identifier.
/// Destructured parameters become `param<index>` and are flagged.
pub(super) fn parameter_names(
    func: Node,
    src: &[u8],
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<String> {
    if let Some(single) = func.child_by_field_name("parameter") {
        return vec![txt(single, src).to_string()];
    }
    let Some(params) = func.child_by_field_name("parameters") else {
        return Vec::new();
    };

    let mut names = Vec::new();
    let mut cursor = params.walk();
    for param in params.named_children(&mut cursor) {
        let pattern = match param.kind() {
            "required_parameter" | "optional_parameter" => {
                match param.child_by_field_name("pattern") {
                    Some(p) => p,
                    None => continue,
                }
            }
            "comment" | "decorator" => continue,
            _ => param,
        };
        if pattern.kind() == "this" {
            continue;
        }
        let index = names.len();
        let name = pattern_name(pattern, src).unwrap_or_else(|| {
            tracing::warn!(line = line_of(pattern), "destructured parameter replaced by placeholder");
            diagnostics.push(Diagnostic {
                construct: Construct::DestructuredParameter,
                line: line_of(pattern),
            });
            format!("param{index}")
        });
        names.push(name);
    }
    names
}

fn pattern_name(pattern: Node, src: &[u8]) -> Option<String> {
    match pattern.kind() {
        "identifier" => Some(txt(pattern, src).to_string()),
        "assignment_pattern" => pattern_name(pattern.child_by_field_name("left")?, src),
        "rest_pattern" => {
            let inner = pattern.named_child(0)?;
            (inner.kind() == "identifier").then(|| txt(inner, src).to_string())
        }
        _ => None,
    }
}
