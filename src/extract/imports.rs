use tree_sitter::Node;

use super::Extraction;
use crate::model::{
    Construct, Diagnostic, ImportBinding, ImportDeclaration, ImportKind, RequireDeclaration,
};
use crate::util::{line_of, trim_quotes, txt};

/// Record an `import` statement with every name it binds.
pub(super) fn extract_import(node: Node, src: &[u8], out: &mut Extraction) {
    let Some(source) = node.child_by_field_name("source") else {
        tracing::debug!(line = line_of(node), "import without a source path");
        return;
    };

    let mut kind = None;
    let mut bindings: Vec<ImportBinding> = Vec::new();
    let mut type_only = false;
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "type" => type_only = true,
            "import_clause" => read_clause(child, src, &mut kind, &mut bindings),
            _ => {}
        }
    }

    let mut unique: Vec<ImportBinding> = Vec::with_capacity(bindings.len());
    for binding in bindings {
        if !unique.iter().any(|b| b.local() == binding.local()) {
            unique.push(binding);
        }
    }

    out.imports.push(ImportDeclaration {
        kind: kind.unwrap_or(ImportKind::SideEffect),
        bindings: unique,
        source_path: trim_quotes(txt(source, src)).to_string(),
        type_only,
    });
}

fn read_clause(
    clause: Node,
    src: &[u8],
    kind: &mut Option<ImportKind>,
    bindings: &mut Vec<ImportBinding>,
) {
    let mut cursor = clause.walk();
    for spec in clause.named_children(&mut cursor) {
        match spec.kind() {
            "identifier" => {
                kind.get_or_insert(ImportKind::Default);
                bindings.push(ImportBinding::Default(txt(spec, src).to_string()));
            }
            "namespace_import" => {
                kind.get_or_insert(ImportKind::Default);
                let mut ncursor = spec.walk();
                let local = spec
                    .named_children(&mut ncursor)
                    .find(|n| n.kind() == "identifier");
                if let Some(local) = local {
                    bindings.push(ImportBinding::Namespace(txt(local, src).to_string()));
                }
            }
            "named_imports" => {
                kind.get_or_insert(ImportKind::Member);
                let mut scursor = spec.walk();
                for member in spec.named_children(&mut scursor) {
                    if member.kind() != "import_specifier" {
                        continue;
                    }
                    let Some(imported) = member.child_by_field_name("name") else {
                        continue;
                    };
                    let imported = txt(imported, src).to_string();
                    let local = member
                        .child_by_field_name("alias")
                        .map_or_else(|| imported.clone(), |a| txt(a, src).to_string());
                    bindings.push(ImportBinding::Member { imported, local });
                }
            }
            _ => {}
        }
    }
}

/// Record `const x = require("path")`, including member and call tails
/// such as `require("util").inspect` or `require("debug")("app")`.
pub(super) fn extract_require(call: Node, src: &[u8], out: &mut Extraction) {
    let is_require = call
        .child_by_field_name("function")
        .is_some_and(|f| f.kind() == "identifier" && txt(f, src) == "require");
    if !is_require {
        return;
    }

    let Some(declarator) = enclosing_declarator(call) else {
        return;
    };
    let Some(pattern) = declarator.child_by_field_name("name") else {
        return;
    };

    let Some(source_path) = first_literal_argument(call, src) else {
        tracing::warn!(line = line_of(call), "require path is not a string literal");
        out.diagnostics.push(Diagnostic {
            construct: Construct::ComputedRequirePath,
            line: line_of(call),
        });
        return;
    };

    let mut names = Vec::new();
    pattern_bindings(pattern, src, &mut names);
    if names.is_empty() {
        tracing::warn!(line = line_of(pattern), "require binds no identifier");
        out.diagnostics.push(Diagnostic {
            construct: Construct::EmptyRequirePattern,
            line: line_of(pattern),
        });
        return;
    }

    let keyword = declarator
        .parent()
        .and_then(|decl| decl.child(0))
        .map_or("const", |kw| txt(kw, src));
    // Verbatim: comments inside the declarator keep their line breaks.
    let statement = format!("{keyword} {};", txt(declarator, src));

    for name in names {
        out.requires.push(RequireDeclaration {
            bound_name: name,
            source_path: source_path.clone(),
            statement: statement.clone(),
        });
    }
}

/// Identifiers a binding pattern introduces, in source order. Default values
/// and property keys bind nothing.
fn pattern_bindings(pattern: Node, src: &[u8], names: &mut Vec<String>) {
    match pattern.kind() {
        "identifier" | "shorthand_property_identifier_pattern" => {
            names.push(txt(pattern, src).to_string());
        }
        "object_pattern" | "array_pattern" => {
            let mut cursor = pattern.walk();
            for child in pattern.named_children(&mut cursor) {
                pattern_bindings(child, src, names);
            }
        }
        "pair_pattern" => {
            if let Some(value) = pattern.child_by_field_name("value") {
                pattern_bindings(value, src, names);
            }
        }
        "assignment_pattern" | "object_assignment_pattern" => {
            if let Some(left) = pattern.child_by_field_name("left") {
                pattern_bindings(left, src, names);
            }
        }
        "rest_pattern" => {
            if let Some(inner) = pattern.named_child(0) {
                pattern_bindings(inner, src, names);
            }
        }
        _ => {}
    }
}

/// Climb from a `require(...)` call through member/call tails to the
/// declarator it initializes.
fn enclosing_declarator(call: Node) -> Option<Node> {
    let mut current = call;
    loop {
        let parent = current.parent()?;
        match parent.kind() {
            "member_expression" if parent.child_by_field_name("object") == Some(current) => {}
            "call_expression" if parent.child_by_field_name("function") == Some(current) => {}
            "parenthesized_expression" | "await_expression" => {}
            "variable_declarator" => {
                return (parent.child_by_field_name("value") == Some(current)).then_some(parent);
            }
            _ => return None,
        }
        current = parent;
    }
}

fn first_literal_argument(call: Node, src: &[u8]) -> Option<String> {
    let args = call.child_by_field_name("arguments")?;
    let first = args.named_child(0)?;
    match first.kind() {
        "string" => Some(trim_quotes(txt(first, src)).to_string()),
        "template_string" => {
            let mut cursor = first.walk();
            let interpolated = first
                .named_children(&mut cursor)
                .any(|c| c.kind() == "template_substitution");
            (!interpolated).then(|| trim_quotes(txt(first, src)).to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crate::extract::tests::collect_src;
    use crate::model::{Construct, ImportBinding, ImportKind};

    fn bound(src: &str) -> Vec<String> {
        collect_src(src).imports[0]
            .bound_names()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn default_import() {
        let raw = collect_src("import someModule from \"some-module\";");
        let import = &raw.imports[0];
        assert_eq!(import.kind, ImportKind::Default);
        assert_eq!(import.bindings, vec![ImportBinding::Default("someModule".into())]);
        assert_eq!(import.source_path, "some-module");
        assert!(!import.type_only);
    }

    #[test]
    fn member_import_keeps_imported_and_local_names() {
        let raw = collect_src("import { a, b as c } from './lib'");
        let import = &raw.imports[0];
        assert_eq!(import.kind, ImportKind::Member);
        assert_eq!(
            import.bindings,
            vec![
                ImportBinding::Member { imported: "a".into(), local: "a".into() },
                ImportBinding::Member { imported: "b".into(), local: "c".into() },
            ]
        );
        assert!(import.binds("c"));
        assert!(!import.binds("b"));
    }

    #[test]
    fn multi_line_import_with_comments() {
        assert_eq!(bound("import {\n  a, // keep\n  b\n} from \"x\";"), vec!["a", "b"]);
    }

    #[test]
    fn default_first_then_members() {
        let raw = collect_src("import React, { useState } from \"react\";");
        assert_eq!(raw.imports[0].kind, ImportKind::Default);
        assert_eq!(bound("import React, { useState } from \"react\";"), vec!["React", "useState"]);
    }

    #[test]
    fn namespace_import_is_default_kind() {
        let raw = collect_src("import * as path from \"path\";");
        assert_eq!(raw.imports[0].kind, ImportKind::Default);
        assert_eq!(raw.imports[0].bindings, vec![ImportBinding::Namespace("path".into())]);
    }

    #[test]
    fn type_only_import_is_marked() {
        let raw = collect_src("import type { User } from \"./user\";");
        assert!(raw.imports[0].type_only);
        assert_eq!(bound("import type { User } from \"./user\";"), vec!["User"]);
    }

    #[test]
    fn side_effect_import_binds_nothing() {
        let raw = collect_src("import \"reflect-metadata\";");
        assert_eq!(raw.imports[0].kind, ImportKind::SideEffect);
        assert!(raw.imports[0].bindings.is_empty());
    }

    #[test]
    fn plain_require() {
        let raw = collect_src("const someLibrary = require(\"some-library\");");
        let req = &raw.requires[0];
        assert_eq!(req.bound_name, "someLibrary");
        assert_eq!(req.source_path, "some-library");
        assert_eq!(req.statement, "const someLibrary = require(\"some-library\");");
    }

    #[test]
    fn require_with_member_tail_keeps_statement() {
        let raw = collect_src("var someFunction = require('util').someFunction;");
        let req = &raw.requires[0];
        assert_eq!(req.bound_name, "someFunction");
        assert_eq!(req.source_path, "util");
        assert_eq!(req.statement, "var someFunction = require('util').someFunction;");
    }

    #[test]
    fn multiple_declarators_are_separate_statements() {
        let raw = collect_src("const a = require(\"a\"), b = require(\"b\");");
        let statements: Vec<_> = raw.requires.iter().map(|r| r.statement.as_str()).collect();
        assert_eq!(statements, vec!["const a = require(\"a\");", "const b = require(\"b\");"]);
    }

    #[test]
    fn destructured_require_binds_each_name() {
        let raw = collect_src(
            "const { client, retry: backoff, opts = {}, ...rest } = require(\"http-client\");",
        );
        let names: Vec<_> = raw.requires.iter().map(|r| r.bound_name.as_str()).collect();
        assert_eq!(names, vec!["client", "backoff", "opts", "rest"]);
        assert!(raw.requires.iter().all(|r| r.source_path == "http-client"));
        assert!(raw.requires.iter().all(|r| r.statement == raw.requires[0].statement));
        assert!(raw.diagnostics.is_empty());
    }

    #[test]
    fn array_require_pattern() {
        let raw = collect_src("const [first, , second] = require(\"pair\");");
        let names: Vec<_> = raw.requires.iter().map(|r| r.bound_name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn empty_require_pattern_is_flagged() {
        let raw = collect_src("const {} = require(\"setup\");");
        assert!(raw.requires.is_empty());
        assert_eq!(raw.diagnostics[0].construct, Construct::EmptyRequirePattern);
    }

    #[test]
    fn multi_line_require_is_kept_verbatim() {
        let raw = collect_src("const {\n  a, // first\n  b\n} = require(\"x\");");
        assert_eq!(raw.requires[0].statement, "const {\n  a, // first\n  b\n} = require(\"x\");");
    }

    #[test]
    fn computed_require_is_flagged() {
        let raw = collect_src("const mod = require(base + \"/mod\");");
        assert!(raw.requires.is_empty());
        assert_eq!(raw.diagnostics[0].construct, Construct::ComputedRequirePath);
    }

    #[test]
    fn bare_require_call_is_ignored() {
        let raw = collect_src("require(\"side-effect\");");
        assert!(raw.requires.is_empty());
        assert!(raw.diagnostics.is_empty());
    }
}
