use super::{js_string, Constructor, TestFramework};
use crate::model::{
    CallPath, ImportBinding, ImportDeclaration, ImportKind, LibraryUsage, RequireDeclaration,
};
use crate::output::Stmt;

/// Jest backend: `describe`/`test`, `jest.mock`, `jest.spyOn`, `mockClear`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Jest;

impl TestFramework for Jest {
    fn module_level_imports(&self) -> Vec<Stmt> {
        Vec::new()
    }

    fn setup(&self, constructors: &[Constructor]) -> Vec<Stmt> {
        let mut body = Vec::new();
        let mut declared: Vec<&str> = Vec::new();
        for ctor in constructors {
            for param in &ctor.parameters {
                if !declared.contains(&param.as_str()) {
                    declared.push(param);
                    body.push(Stmt::line(format!("const {param} = null;")));
                }
            }
            body.push(Stmt::line(format!(
                "{} = new {}({});",
                ctor.binding,
                ctor.name,
                ctor.parameters.join(", ")
            )));
        }
        vec![Stmt::block("beforeEach(() => {", body, "});")]
    }

    fn teardown(&self, libraries: &[LibraryUsage], imports: &[ImportDeclaration]) -> Vec<Stmt> {
        let mut body = Vec::new();
        for lib in libraries {
            if !imports.iter().any(|i| i.binds(&lib.name)) {
                continue;
            }
            if lib.usage_paths.is_empty() {
                body.push(Stmt::line(format!("{}.mockClear();", lib.name)));
            }
            for path in &lib.usage_paths {
                body.push(Stmt::line(format!("{}.{}.mockClear();", lib.name, path.join("."))));
            }
        }
        if body.is_empty() {
            return Vec::new();
        }
        vec![Stmt::block("afterEach(() => {", body, "});")]
    }

    fn mock_factory(&self, import: &ImportDeclaration, libraries: &[LibraryUsage]) -> Vec<Stmt> {
        if import.type_only {
            return Vec::new();
        }
        let entries = match import.kind {
            ImportKind::SideEffect => return Vec::new(),
            ImportKind::Default => Vec::new(),
            ImportKind::Member => {
                let used: Vec<(&str, &LibraryUsage)> = import
                    .bindings
                    .iter()
                    .filter_map(|binding| match binding {
                        ImportBinding::Member { imported, local } => libraries
                            .iter()
                            .find(|l| &l.name == local)
                            .map(|lib| (imported.as_str(), lib)),
                        _ => None,
                    })
                    .collect();
                let last = used.len().saturating_sub(1);
                used.iter()
                    .enumerate()
                    .map(|(i, (key, lib))| library_entry(key, lib, i < last))
                    .collect()
            }
        };

        let open = format!("jest.mock({}, () => ({{", js_string(&import.source_path));
        if entries.is_empty() {
            return vec![Stmt::line(format!("{open}}}));"))];
        }
        vec![Stmt::block(open, entries, "}));")]
    }

    fn spy_instrumentation(
        &self,
        call_sites: &[CallPath],
        requires: &[RequireDeclaration],
        imports: &[ImportDeclaration],
        receiver: Option<&str>,
    ) -> Vec<Stmt> {
        let mut spies: Vec<Stmt> = Vec::new();
        for site in call_sites {
            let Some(target) = site.target() else {
                continue;
            };
            let bound = imports.iter().any(|i| i.binds(target))
                || requires.iter().any(|r| r.bound_name == target);
            // `lib()` has no object to spy on.
            let has_receiver = site.is_self_reference() || site.segments().len() > 1;
            if !bound || !has_receiver {
                continue;
            }
            let segments: Vec<String> = match site.segments().split_first() {
                Some((_, rest)) if site.is_self_reference() => {
                    let Some(receiver) = receiver else {
                        continue;
                    };
                    std::iter::once(receiver.to_string())
                        .chain(rest.iter().cloned())
                        .collect()
                }
                _ => site.segments().to_vec(),
            };
            let spy = Stmt::line(spy_statement(&segments));
            if !spies.contains(&spy) {
                spies.push(spy);
            }
        }
        spies
    }

    fn test_block(&self, description: &str, body: Vec<Stmt>) -> Stmt {
        Stmt::block(format!("test({}, () => {{", js_string(description)), body, "});")
    }

    fn suite_block(&self, description: &str, body: Vec<Stmt>) -> Stmt {
        Stmt::block(format!("describe({}, () => {{", js_string(description)), body, "});")
    }
}

/// `jest.spyOn(a.b, "c");`, or `jest.spyOn(a);` for a single segment.
fn spy_statement(segments: &[String]) -> String {
    match segments.split_last() {
        Some((method, object)) if !object.is_empty() => {
            format!("jest.spyOn({}, {});", object.join("."), js_string(method))
        }
        _ => format!("jest.spyOn({});", segments.join(".")),
    }
}

/// Members reached through one binding, merged into a tree.
#[derive(Debug, Default)]
struct MockNode {
    segment: String,
    called: bool,
    children: Vec<MockNode>,
}

impl MockNode {
    fn insert(&mut self, path: &[String]) {
        let Some((first, rest)) = path.split_first() else {
            self.called = true;
            return;
        };
        let idx = match self.children.iter().position(|c| &c.segment == first) {
            Some(idx) => idx,
            None => {
                self.children.push(MockNode {
                    segment: first.clone(),
                    ..MockNode::default()
                });
                self.children.len() - 1
            }
        };
        self.children[idx].insert(rest);
    }

    fn render(&self, trailing_comma: bool) -> Stmt {
        let comma = if trailing_comma { "," } else { "" };
        if self.children.is_empty() {
            return Stmt::line(format!("{}: jest.fn(){comma}", self.segment));
        }
        let last = self.children.len() - 1;
        let body = self
            .children
            .iter()
            .enumerate()
            .map(|(i, c)| c.render(i < last))
            .collect();
        if self.called {
            Stmt::block(
                format!("{}: Object.assign(jest.fn(), {{", self.segment),
                body,
                format!("}}){comma}"),
            )
        } else {
            Stmt::block(format!("{}: {{", self.segment), body, format!("}}{comma}"))
        }
    }
}

/// Mock entry for one used binding, keyed by `key`.
fn library_entry(key: &str, lib: &LibraryUsage, trailing_comma: bool) -> Stmt {
    let mut root = MockNode {
        segment: key.to_string(),
        called: lib.usage_paths.is_empty(),
        children: Vec::new(),
    };
    for path in &lib.usage_paths {
        root.insert(path);
    }
    // The binding itself is only callable when nothing hangs off it.
    if !root.children.is_empty() {
        root.called = false;
    }
    root.render(trailing_comma)
}
