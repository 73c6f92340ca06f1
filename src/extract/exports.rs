use tree_sitter::Node;

use super::Extraction;
use crate::model::{Construct, Diagnostic, ExportDeclaration, ExportKind, ExportSlot, ModuleExport};
use crate::util::{line_of, trim_quotes, txt};

// ── ES module exports ──

/// Record the names an `export` statement publishes.
pub(super) fn extract_export(node: Node, src: &[u8], out: &mut Extraction) {
    if let Some(source) = node.child_by_field_name("source") {
        extract_reexport(node, trim_quotes(txt(source, src)), src, out);
        return;
    }

    let is_default = has_token(node, "default");
    let kind = if is_default {
        ExportKind::Default
    } else {
        ExportKind::Named
    };

    if let Some(decl) = node.child_by_field_name("declaration") {
        match decl.kind() {
            "class_declaration"
            | "abstract_class_declaration"
            | "function_declaration"
            | "generator_function_declaration" => {
                if let Some(name) = decl.child_by_field_name("name") {
                    push_export(out, kind, txt(name, src), txt(name, src));
                }
            }
            "lexical_declaration" | "variable_declaration" => {
                let mut cursor = decl.walk();
                for declarator in decl.named_children(&mut cursor) {
                    if declarator.kind() != "variable_declarator" {
                        continue;
                    }
                    if let Some(name) = declarator.child_by_field_name("name") {
                        if name.kind() == "identifier" {
                            push_export(out, kind, txt(name, src), txt(name, src));
                        }
                    }
                }
            }
            _ => {}
        }
        return;
    }

    if let Some(value) = node.child_by_field_name("value") {
        let name = match value.kind() {
            "identifier" => Some(value),
            "class" | "function_expression" | "function" | "generator_function" => {
                value.child_by_field_name("name")
            }
            _ => None,
        };
        match name {
            Some(name) => push_export(out, ExportKind::Default, txt(name, src), txt(name, src)),
            None => {
                tracing::warn!(line = line_of(node), "anonymous default export is not modeled");
                out.diagnostics.push(Diagnostic {
                    construct: Construct::AnonymousDefaultExport,
                    line: line_of(node),
                });
            }
        }
        return;
    }

    let mut cursor = node.walk();
    for clause in node.named_children(&mut cursor) {
        if clause.kind() != "export_clause" {
            continue;
        }
        let mut ccursor = clause.walk();
        for spec in clause.named_children(&mut ccursor) {
            if spec.kind() != "export_specifier" {
                continue;
            }
            let Some(local) = spec.child_by_field_name("name") else {
                continue;
            };
            let local = txt(local, src);
            let exported = spec
                .child_by_field_name("alias")
                .map_or(local, |a| txt(a, src));
            let kind = if exported == "default" {
                ExportKind::Default
            } else {
                ExportKind::Named
            };
            push_export(out, kind, exported, local);
        }
    }
}

/// `export { a, b as c } from "./x"` and `export * as ns from "./x"` publish
/// names with no local unit behind them. `export * from` publishes none we can
/// name, and a re-exported default has no name to import it by.
fn extract_reexport(node: Node, source: &str, src: &[u8], out: &mut Extraction) {
    let mut names = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "namespace_export" => {
                if let Some(name) = child.named_child(0) {
                    names.push(txt(name, src));
                }
            }
            "export_clause" => {
                let mut ccursor = child.walk();
                for spec in child.named_children(&mut ccursor) {
                    if spec.kind() != "export_specifier" {
                        continue;
                    }
                    let exported = spec
                        .child_by_field_name("alias")
                        .or_else(|| spec.child_by_field_name("name"));
                    if let Some(exported) = exported {
                        names.push(txt(exported, src));
                    }
                }
            }
            _ => {}
        }
    }

    for name in names {
        if name == "default" {
            tracing::debug!(line = line_of(node), "skipping re-exported default");
            continue;
        }
        out.export_declarations.push(ExportDeclaration {
            kind: ExportKind::Named,
            exported_name: name.to_string(),
            local_name: name.to_string(),
            source: Some(source.to_string()),
        });
    }
}

fn push_export(out: &mut Extraction, kind: ExportKind, exported: &str, local: &str) {
    out.export_declarations.push(ExportDeclaration {
        kind,
        exported_name: exported.to_string(),
        local_name: local.to_string(),
        source: None,
    });
}

fn has_token(node: Node, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| c.kind() == token);
    found
}

// ── CommonJS export slot ──

/// Record `module.exports = ...`, `module.exports.x = ...` and `exports.x = ...`.
pub(super) fn extract_module_export(assign: Node, src: &[u8], out: &mut Extraction) {
    let (Some(left), Some(right)) = (
        assign.child_by_field_name("left"),
        assign.child_by_field_name("right"),
    ) else {
        return;
    };
    if left.kind() != "member_expression" {
        return;
    }

    if is_module_exports(left, src) {
        match right.kind() {
            "identifier" => {
                let name = txt(right, src).to_string();
                out.module_exports.push(ModuleExport {
                    exported_name: name.clone(),
                    bound_name: name,
                    slot: ExportSlot::Whole,
                });
            }
            "object" => extract_export_object(right, src, out),
            kind if is_function_value(kind) || kind == "class" => {
                flag(out, Construct::InlineExportAssignment, assign);
            }
            _ => tracing::debug!(line = line_of(assign), "export slot value not modeled"),
        }
        return;
    }

    let Some(object) = left.child_by_field_name("object") else {
        return;
    };
    let is_slot_property = is_module_exports(object, src)
        || (object.kind() == "identifier" && txt(object, src) == "exports");
    if !is_slot_property {
        return;
    }
    let Some(property) = left.child_by_field_name("property") else {
        return;
    };

    match right.kind() {
        "identifier" => out.module_exports.push(ModuleExport {
            exported_name: txt(property, src).to_string(),
            bound_name: txt(right, src).to_string(),
            slot: ExportSlot::Property,
        }),
        kind if is_function_value(kind) => flag(out, Construct::InlineExportAssignment, assign),
        _ => {}
    }
}

fn extract_export_object(object: Node, src: &[u8], out: &mut Extraction) {
    let mut cursor = object.walk();
    for prop in object.named_children(&mut cursor) {
        match prop.kind() {
            "shorthand_property_identifier" => {
                let name = txt(prop, src).to_string();
                out.module_exports.push(ModuleExport {
                    exported_name: name.clone(),
                    bound_name: name,
                    slot: ExportSlot::Property,
                });
            }
            "pair" => {
                let (Some(key), Some(value)) = (
                    prop.child_by_field_name("key"),
                    prop.child_by_field_name("value"),
                ) else {
                    continue;
                };
                match value.kind() {
                    "identifier" if key.kind() != "computed_property_name" => {
                        out.module_exports.push(ModuleExport {
                            exported_name: trim_quotes(txt(key, src)).to_string(),
                            bound_name: txt(value, src).to_string(),
                            slot: ExportSlot::Property,
                        });
                    }
                    kind if is_function_value(kind) => {
                        flag(out, Construct::InlineExportValue, prop);
                    }
                    _ => {}
                }
            }
            "method_definition" => flag(out, Construct::InlineExportValue, prop),
            _ => {}
        }
    }
}

fn is_module_exports(node: Node, src: &[u8]) -> bool {
    if node.kind() != "member_expression" {
        return false;
    }
    let object = node.child_by_field_name("object");
    let property = node.child_by_field_name("property");
    matches!(
        (object, property),
        (Some(o), Some(p)) if o.kind() == "identifier"
            && txt(o, src) == "module"
            && txt(p, src) == "exports"
    )
}

fn is_function_value(kind: &str) -> bool {
    matches!(
        kind,
        "function_expression" | "function" | "generator_function" | "arrow_function"
    )
}

fn flag(out: &mut Extraction, construct: Construct, node: Node) {
    tracing::warn!(line = line_of(node), "{construct} is not modeled");
    out.diagnostics.push(Diagnostic {
        construct,
        line: line_of(node),
    });
}

#[cfg(test)]
mod tests {
    use crate::extract::tests::collect_src;
    use crate::model::{Construct, ExportKind, ExportSlot};

    fn exported(src: &str) -> Vec<(ExportKind, String, String)> {
        collect_src(src)
            .export_declarations
            .into_iter()
            .map(|e| (e.kind, e.exported_name, e.local_name))
            .collect()
    }

    fn slot(src: &str) -> Vec<(String, String, ExportSlot)> {
        collect_src(src)
            .module_exports
            .into_iter()
            .map(|e| (e.exported_name, e.bound_name, e.slot))
            .collect()
    }

    #[test]
    fn named_class_and_function() {
        assert_eq!(
            exported("export class TestClass {}\nexport function run() {}"),
            vec![
                (ExportKind::Named, "TestClass".into(), "TestClass".into()),
                (ExportKind::Named, "run".into(), "run".into()),
            ]
        );
    }

    #[test]
    fn default_class_declaration() {
        assert_eq!(
            exported("export default class TestClass { someMethod() {} }"),
            vec![(ExportKind::Default, "TestClass".into(), "TestClass".into())]
        );
    }

    #[test]
    fn default_identifier() {
        assert_eq!(
            exported("const add = (a, b) => a + b;\nexport default add;"),
            vec![(ExportKind::Default, "add".into(), "add".into())]
        );
    }

    #[test]
    fn export_clause_with_alias() {
        assert_eq!(
            exported("function f() {}\nfunction g() {}\nexport { f, g as h };"),
            vec![
                (ExportKind::Named, "f".into(), "f".into()),
                (ExportKind::Named, "h".into(), "g".into()),
            ]
        );
    }

    #[test]
    fn export_const_declarators() {
        assert_eq!(
            exported("export const add = (a, b) => a + b, sub = function(a, b) { return a - b; };"),
            vec![
                (ExportKind::Named, "add".into(), "add".into()),
                (ExportKind::Named, "sub".into(), "sub".into()),
            ]
        );
    }

    #[test]
    fn re_exports_are_recorded_with_their_source() {
        let raw = collect_src(
            "export { a, b as c, default } from './a';\n\
             export * from './b';\n\
             export * as ns from './c';",
        );
        let found: Vec<_> = raw
            .export_declarations
            .iter()
            .map(|e| (e.exported_name.as_str(), e.source.as_deref()))
            .collect();
        assert_eq!(
            found,
            vec![("a", Some("./a")), ("c", Some("./a")), ("ns", Some("./c"))]
        );
        assert!(raw.export_declarations.iter().all(|e| e.is_reexport()));
    }

    #[test]
    fn anonymous_default_is_flagged() {
        let raw = collect_src("export default function() {}");
        assert!(raw.export_declarations.is_empty());
        assert_eq!(raw.diagnostics[0].construct, Construct::AnonymousDefaultExport);
    }

    #[test]
    fn whole_slot_assignment() {
        assert_eq!(
            slot("module.exports = add;"),
            vec![("add".into(), "add".into(), ExportSlot::Whole)]
        );
    }

    #[test]
    fn object_slot_assignment() {
        assert_eq!(
            slot("module.exports = { something: something, other, 'quoted': q };"),
            vec![
                ("something".into(), "something".into(), ExportSlot::Property),
                ("other".into(), "other".into(), ExportSlot::Property),
                ("quoted".into(), "q".into(), ExportSlot::Property),
            ]
        );
    }

    #[test]
    fn property_assignments_accumulate() {
        assert_eq!(
            slot("module.exports.a = first;\nexports.b = second;"),
            vec![
                ("a".into(), "first".into(), ExportSlot::Property),
                ("b".into(), "second".into(), ExportSlot::Property),
            ]
        );
    }

    #[test]
    fn inline_functions_in_export_object_are_flagged() {
        let raw = collect_src("module.exports = { add: function(a, b) { return a + b; }, sub() {} };");
        assert!(raw.module_exports.is_empty());
        let constructs: Vec<_> = raw.diagnostics.iter().map(|d| d.construct).collect();
        assert_eq!(constructs, vec![Construct::InlineExportValue, Construct::InlineExportValue]);
    }

    #[test]
    fn inline_function_assigned_to_slot_is_flagged() {
        let raw = collect_src("module.exports = function () {};");
        assert!(raw.module_exports.is_empty());
        assert_eq!(raw.diagnostics[0].construct, Construct::InlineExportAssignment);
    }
}
