//! Export & dependency resolution: turns raw traversal collections into the
//! finalized [`SourceModel`]. Pure and order-preserving.

use crate::extract::{Candidate, Extraction};
use crate::model::{
    CallPath, ClassDefinition, Diagnostic, ExportDeclaration, FunctionDefinition,
    ImportDeclaration, LibraryUsage, ModuleExport, RequireDeclaration, SourceModel, UnitKind,
};

/// Local names the module publishes, from either export style. Re-exports
/// name no local binding and are left out.
pub struct ExportSurface<'a> {
    names: Vec<&'a str>,
}

impl<'a> ExportSurface<'a> {
    pub fn new(module_exports: &'a [ModuleExport], declarations: &'a [ExportDeclaration]) -> Self {
        let names = module_exports
            .iter()
            .map(|e| e.bound_name.as_str())
            .chain(
                declarations
                    .iter()
                    .filter(|d| !d.is_reexport())
                    .map(|d| d.local_name.as_str()),
            )
            .collect();
        Self { names }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| *n == name)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// A function is public if its name, or any qualifier segment, is exported.
    pub fn exposes(&self, function: &FunctionDefinition) -> bool {
        self.contains(&function.name) || function.callee_path.iter().any(|s| self.contains(s))
    }
}

/// Filter, infer constructors, and merge dependency usage.
pub fn finalize(extraction: Extraction) -> SourceModel {
    let Extraction {
        filename,
        imports,
        requires,
        module_exports,
        export_declarations,
        classes,
        functions,
        mut diagnostics,
    } = extraction;

    let surface = ExportSurface::new(&module_exports, &export_declarations);
    if surface.is_empty() {
        tracing::debug!(%filename, "module exports nothing");
    }

    let classes = retain(classes, &mut diagnostics, |c: &ClassDefinition| {
        surface.contains(&c.name)
    });
    let mut functions = retain(functions, &mut diagnostics, |f| surface.exposes(f));

    if classes.is_empty() {
        infer_constructor(&mut functions);
    }

    let call_sites = classes
        .iter()
        .flat_map(|c| c.methods.iter().flat_map(|m| m.call_sites.iter()))
        .chain(functions.iter().flat_map(|f| f.call_sites.iter()));
    let libraries = filter_libraries(aggregate_libraries(call_sites), &imports, &requires);

    // Stable: same-line diagnostics keep discovery order.
    diagnostics.sort_by_key(|d| d.line);

    SourceModel {
        filename,
        imports,
        requires,
        classes,
        functions,
        libraries,
        module_exports,
        export_declarations,
        diagnostics,
    }
}

fn retain<T>(
    candidates: Vec<Candidate<T>>,
    diagnostics: &mut Vec<Diagnostic>,
    keep: impl Fn(&T) -> bool,
) -> Vec<T> {
    let mut kept = Vec::new();
    for candidate in candidates {
        if keep(&candidate.unit) {
            diagnostics.extend(candidate.diagnostics);
            kept.push(candidate.unit);
        }
    }
    kept
}

/// Promote the function another function's qualifier refers to
/// (`Util` in `Util.prototype.add = ...`) to a constructor.
///
/// With several candidates the last one wins.
pub fn infer_constructor(functions: &mut [FunctionDefinition]) {
    let mut promoted = None;
    for (i, candidate) in functions.iter().enumerate() {
        let referenced = functions
            .iter()
            .enumerate()
            .any(|(j, f)| j != i && f.callee_path.iter().any(|s| *s == candidate.name));
        if referenced {
            promoted = Some(i);
        }
    }
    if let Some(i) = promoted {
        tracing::debug!(name = %functions[i].name, "inferred constructor function");
        functions[i].kind = UnitKind::Constructor;
    }
}

/// One entry per call target with every distinct member path merged in.
pub fn aggregate_libraries<'a>(call_sites: impl Iterator<Item = &'a CallPath>) -> Vec<LibraryUsage> {
    let mut libraries: Vec<LibraryUsage> = Vec::new();
    for site in call_sites {
        let Some(target) = site.target() else {
            continue;
        };
        let path = site.usage_path();
        match libraries.iter_mut().find(|l| l.name == target) {
            Some(existing) => existing.record(path),
            None => {
                let mut usage = LibraryUsage {
                    name: target.to_string(),
                    usage_paths: Vec::new(),
                    is_self_member: site.is_self_reference(),
                };
                usage.record(path);
                libraries.push(usage);
            }
        }
    }
    libraries
}

/// Drop targets with no import or require binding: local helpers and globals.
pub fn filter_libraries(
    libraries: Vec<LibraryUsage>,
    imports: &[ImportDeclaration],
    requires: &[RequireDeclaration],
) -> Vec<LibraryUsage> {
    libraries
        .into_iter()
        .filter(|lib| {
            imports.iter().any(|i| i.binds(&lib.name))
                || requires.iter().any(|r| r.bound_name == lib.name)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::tests::model;
    use crate::model::{Construct, ImportBinding, ImportKind};

    fn path(parts: &[&str]) -> CallPath {
        CallPath(parts.iter().map(|s| s.to_string()).collect())
    }

    fn function(name: &str, callee: &[&str]) -> FunctionDefinition {
        FunctionDefinition {
            name: name.to_string(),
            kind: UnitKind::Function,
            parameters: Vec::new(),
            local_variables: Vec::new(),
            call_sites: Vec::new(),
            returns_value: false,
            callee_path: callee.iter().map(|s| s.to_string()).collect(),
            prototype_owner: None,
        }
    }

    #[test]
    fn merges_paths_per_target() {
        let sites = [
            path(&["lib", "one"]),
            path(&["lib", "two"]),
            path(&["lib", "one"]),
            path(&["this", "client", "get"]),
            path(&["lib"]),
        ];
        let libs = aggregate_libraries(sites.iter());
        assert_eq!(libs.len(), 2);
        assert_eq!(libs[0].name, "lib");
        assert_eq!(
            libs[0].usage_paths,
            vec![vec!["one".to_string()], vec!["two".to_string()]]
        );
        assert!(!libs[0].is_self_member);
        assert_eq!(libs[1].name, "client");
        assert!(libs[1].is_self_member);
    }

    #[test]
    fn unbound_targets_are_dropped() {
        let libs = aggregate_libraries([path(&["lib", "fn"]), path(&["helper"])].iter());
        let imports = [ImportDeclaration {
            kind: ImportKind::Member,
            bindings: vec![ImportBinding::Member {
                imported: "lib".into(),
                local: "lib".into(),
            }],
            source_path: "lib".into(),
            type_only: false,
        }];
        let kept = filter_libraries(libs, &imports, &[]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name, "lib");
    }

    #[test]
    fn require_binding_keeps_target() {
        let libs = aggregate_libraries([path(&["axios", "get"])].iter());
        let requires = [RequireDeclaration {
            bound_name: "axios".into(),
            source_path: "axios".into(),
            statement: "const axios = require(\"axios\");".into(),
        }];
        assert_eq!(filter_libraries(libs, &[], &requires).len(), 1);
    }

    #[test]
    fn last_referenced_function_becomes_constructor() {
        let mut fns = vec![
            function("A", &[]),
            function("a1", &["A"]),
            function("B", &[]),
            function("b1", &["B"]),
        ];
        infer_constructor(&mut fns);
        let kinds: Vec<_> = fns.iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec![UnitKind::Function, UnitKind::Function, UnitKind::Constructor, UnitKind::Function]
        );
    }

    #[test]
    fn no_reference_no_constructor() {
        let mut fns = vec![function("add", &[]), function("sub", &[])];
        infer_constructor(&mut fns);
        assert!(fns.iter().all(|f| f.kind == UnitKind::Function));
    }

    #[test]
    fn qualifier_segment_exports_function() {
        let m = model(
            "const util = {};\n\
             util.add = function(a, b) { return a + b; };\n\
             util.helper = function() {};\n\
             other.thing = function() {};\n\
             module.exports = util;",
        );
        let names: Vec<_> = m.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["add", "helper"]);
    }

    #[test]
    fn constructor_inference_skipped_for_class_modules() {
        let m = model(
            "export class A { run() {} }\n\
             export function Helper() {}\n\
             Helper.prototype.go = function() {};",
        );
        assert!(m.functions.iter().all(|f| f.kind == UnitKind::Function));
    }

    #[test]
    fn diagnostics_only_for_kept_units() {
        let m = model(
            "function hidden({ a }) {}\n\
             function shown({ b }) {}\n\
             module.exports = shown;",
        );
        assert_eq!(m.diagnostics.len(), 1);
        assert_eq!(m.diagnostics[0].construct, Construct::DestructuredParameter);
        assert_eq!(m.diagnostics[0].line, 2);
    }

    #[test]
    fn re_export_does_not_expose_a_local_namesake() {
        let m = model(
            "export { helper } from \"./shared\";\n\
             function helper() {}\n\
             export function run() {}",
        );
        let names: Vec<_> = m.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["run"]);
        assert_eq!(m.export_declarations.len(), 2);
    }

    #[test]
    fn extraction_is_deterministic() {
        let src = "import { a } from \"a\";\nfunction f() { a.x(); a.y(); }\nmodule.exports = f;";
        assert_eq!(model(src), model(src));
    }
}
