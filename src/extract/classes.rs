use tree_sitter::Node;

use super::functions::analyze;
use super::{Candidate, Extraction};
use crate::model::{ClassDefinition, Construct, Diagnostic, MethodDefinition, UnitKind};
use crate::util::{line_of, txt};

// ── Classes ──

/// Record a class declaration or class expression with its members.
pub(super) fn extract_class(node: Node, src: &[u8], out: &mut Extraction) {
    let Some(name) = class_name(node, src) else {
        tracing::warn!(line = line_of(node), "class has no name or binding");
        out.diagnostics.push(Diagnostic {
            construct: Construct::AnonymousClass,
            line: line_of(node),
        });
        return;
    };

    let mut properties: Vec<String> = Vec::new();
    let mut methods: Vec<MethodDefinition> = Vec::new();
    let mut diagnostics = Vec::new();

    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            match member.kind() {
                "public_field_definition" | "field_definition" => {
                    let field = member
                        .child_by_field_name("name")
                        .or_else(|| member.child_by_field_name("property"));
                    if let Some(field) = field {
                        add_property(&mut properties, txt(field, src));
                    }
                }
                "method_definition" => {
                    let Some(method) = method_definition(member, src, &mut diagnostics) else {
                        continue;
                    };
                    if method.kind == UnitKind::Constructor {
                        for prop in parameter_properties(member, src) {
                            add_property(&mut properties, &prop);
                        }
                    }
                    methods.push(method);
                }
                _ => {}
            }
        }
    }

    for method in &methods {
        for member in &method.assigned_members {
            add_property(&mut properties, member);
        }
    }

    if !methods.iter().any(|m| m.kind == UnitKind::Constructor) {
        methods.insert(0, MethodDefinition::implicit_constructor());
    }

    out.classes.push(Candidate {
        unit: ClassDefinition {
            name,
            properties,
            methods,
        },
        diagnostics,
    });
}

/// The variable a class expression initializes, else the class's own name.
///
/// `const A = class B {}` is only reachable as `A` outside its body.
fn class_name(node: Node, src: &[u8]) -> Option<String> {
    let declarator = node.parent().filter(|p| {
        p.kind() == "variable_declarator" && p.child_by_field_name("value") == Some(node)
    });
    if let Some(name) = declarator.and_then(|d| d.child_by_field_name("name")) {
        if name.kind() == "identifier" {
            return Some(txt(name, src).to_string());
        }
    }
    node.child_by_field_name("name").map(|n| txt(n, src).to_string())
}

fn add_property(properties: &mut Vec<String>, name: &str) {
    if !properties.iter().any(|p| p == name) {
        properties.push(name.to_string());
    }
}

/// `None` for accessors, which are not test units.
fn method_definition(
    member: Node,
    src: &[u8],
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<MethodDefinition> {
    let name_node = member.child_by_field_name("name")?;
    let name = txt(name_node, src).to_string();

    let mut is_static = false;
    let mut cursor = member.walk();
    for token in member.children(&mut cursor) {
        if token == name_node {
            break;
        }
        match token.kind() {
            "static" => is_static = true,
            "get" | "set" => return None,
            _ => {}
        }
    }

    let kind = if name == "constructor" && !is_static {
        UnitKind::Constructor
    } else {
        UnitKind::Method
    };
    let facts = analyze(member, src, diagnostics);

    Some(MethodDefinition {
        name,
        kind,
        is_static,
        parameters: facts.parameters,
        local_variables: facts.local_variables,
        assigned_members: facts.assigned_members,
        call_sites: facts.call_sites,
        returns_value: facts.returns_value,
    })
}

/// `constructor(private readonly repo: Repo)` declares `repo` as a field.
fn parameter_properties(ctor: Node, src: &[u8]) -> Vec<String> {
    let Some(params) = ctor.child_by_field_name("parameters") else {
        return Vec::new();
    };
    let mut props = Vec::new();
    let mut cursor = params.walk();
    for param in params.named_children(&mut cursor) {
        let mut pcursor = param.walk();
        let has_modifier = param
            .children(&mut pcursor)
            .any(|c| matches!(c.kind(), "accessibility_modifier" | "readonly"));
        if !has_modifier {
            continue;
        }
        if let Some(pattern) = param.child_by_field_name("pattern") {
            if pattern.kind() == "identifier" {
                props.push(txt(pattern, src).to_string());
            }
        }
    }
    props
}
