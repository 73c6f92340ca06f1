use std::fmt;

/// How an import statement binds its names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// First specifier is a default or namespace binding.
    Default,
    /// First specifier is a named member (`import { a } from ...`).
    Member,
    /// `import "polyfill";` binds nothing.
    SideEffect,
}

/// One name an `import` statement introduces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportBinding {
    /// `import d from ...`
    Default(String),
    /// `import * as ns from ...`
    Namespace(String),
    /// `import { imported as local } from ...`; both equal without an alias.
    Member { imported: String, local: String },
}

impl ImportBinding {
    /// The name the importing module sees.
    pub fn local(&self) -> &str {
        match self {
            Self::Default(name) | Self::Namespace(name) => name,
            Self::Member { local, .. } => local,
        }
    }
}

/// An `import` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDeclaration {
    pub kind: ImportKind,
    /// Bindings in source order, unique by local name within the declaration.
    pub bindings: Vec<ImportBinding>,
    pub source_path: String,
    /// `import type ...`, erased at runtime.
    pub type_only: bool,
}

impl ImportDeclaration {
    /// Locally bound names in source order.
    pub fn bound_names(&self) -> impl Iterator<Item = &str> {
        self.bindings.iter().map(ImportBinding::local)
    }

    pub fn binds(&self, name: &str) -> bool {
        self.bound_names().any(|n| n == name)
    }
}

/// One binding introduced by a `require(...)` declarator.
///
/// A destructuring declarator (`const { a, b } = require("x")`) yields one
/// entry per bound identifier, all sharing `statement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequireDeclaration {
    pub bound_name: String,
    pub source_path: String,
    /// The declarator as written, with its declaration keyword.
    pub statement: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Default,
    Named,
}

/// A name published through `export` syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDeclaration {
    pub kind: ExportKind,
    pub exported_name: String,
    /// Name of the local binding (differs from `exported_name` for `export { a as b }`).
    /// Equal to `exported_name` for re-exports.
    pub local_name: String,
    /// Origin module of `export { a } from "./a"`. Re-exports declare no local unit.
    pub source: Option<String>,
}

impl ExportDeclaration {
    pub fn is_reexport(&self) -> bool {
        self.source.is_some()
    }
}

/// Whether a `module.exports` entry replaces the whole slot or adds a property to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportSlot {
    /// `module.exports = name`
    Whole,
    /// `module.exports = { key: name }`, `module.exports.key = name`, `exports.key = name`
    Property,
}

/// A name published through the CommonJS export slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleExport {
    pub exported_name: String,
    pub bound_name: String,
    pub slot: ExportSlot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Constructor,
    Method,
    Function,
}

/// The identifier chain of a call such as `this.client.get()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallPath(pub Vec<String>);

impl CallPath {
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_self_reference(&self) -> bool {
        self.0.first().is_some_and(|s| s == "this")
    }

    /// The binding the call goes through: the second token after `this`, else the first.
    pub fn target(&self) -> Option<&str> {
        let idx = usize::from(self.is_self_reference());
        self.0.get(idx).map(String::as_str)
    }

    /// Tokens following the target.
    pub fn usage_path(&self) -> &[String] {
        let start = usize::from(self.is_self_reference()) + 1;
        self.0.get(start..).unwrap_or(&[])
    }
}

impl fmt::Display for CallPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// A method inside a class body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDefinition {
    pub name: String,
    pub kind: UnitKind,
    pub is_static: bool,
    pub parameters: Vec<String>,
    pub local_variables: Vec<String>,
    pub assigned_members: Vec<String>,
    pub call_sites: Vec<CallPath>,
    pub returns_value: bool,
}

impl MethodDefinition {
    /// The zero-parameter constructor used when a class declares none.
    pub fn implicit_constructor() -> Self {
        Self {
            name: "constructor".to_string(),
            kind: UnitKind::Constructor,
            is_static: false,
            parameters: Vec::new(),
            local_variables: Vec::new(),
            assigned_members: Vec::new(),
            call_sites: Vec::new(),
            returns_value: false,
        }
    }
}

/// A class with its fields and methods. Always holds exactly one constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDefinition {
    pub name: String,
    pub properties: Vec<String>,
    pub methods: Vec<MethodDefinition>,
}

impl ClassDefinition {
    pub fn constructor(&self) -> Option<&MethodDefinition> {
        self.methods.iter().find(|m| m.kind == UnitKind::Constructor)
    }
}

/// A function declaration or a function value bound to a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDefinition {
    pub name: String,
    pub kind: UnitKind,
    pub parameters: Vec<String>,
    pub local_variables: Vec<String>,
    pub call_sites: Vec<CallPath>,
    pub returns_value: bool,
    /// Qualifier of `obj.inner.name = function ...`, with `prototype` segments removed.
    pub callee_path: Vec<String>,
    /// Index into `callee_path` of the segment that owned a removed `prototype`.
    pub prototype_owner: Option<usize>,
}

/// One external binding and every member path the module calls through it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryUsage {
    pub name: String,
    /// Distinct non-empty paths in first-seen order.
    pub usage_paths: Vec<Vec<String>>,
    pub is_self_member: bool,
}

impl LibraryUsage {
    pub fn record(&mut self, path: &[String]) {
        if !path.is_empty() && !self.usage_paths.iter().any(|p| p.as_slice() == path) {
            self.usage_paths.push(path.to_vec());
        }
    }
}

/// Syntax the builder recognizes but does not model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Construct {
    AnonymousDefaultExport,
    DestructuredParameter,
    InlineExportValue,
    InlineExportAssignment,
    ComputedRequirePath,
    EmptyRequirePattern,
    AnonymousClass,
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AnonymousDefaultExport => "anonymous default export",
            Self::DestructuredParameter => "destructured parameter",
            Self::InlineExportValue => "inline function in export object",
            Self::InlineExportAssignment => "inline function assigned to export slot",
            Self::ComputedRequirePath => "non-literal require path",
            Self::EmptyRequirePattern => "require pattern binding no names",
            Self::AnonymousClass => "anonymous class",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Diagnostic {
    pub construct: Construct,
    pub line: usize,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (line {})", self.construct, self.line)
    }
}

/// Everything known about one module. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceModel {
    pub filename: String,
    pub imports: Vec<ImportDeclaration>,
    pub requires: Vec<RequireDeclaration>,
    pub classes: Vec<ClassDefinition>,
    pub functions: Vec<FunctionDefinition>,
    pub libraries: Vec<LibraryUsage>,
    pub module_exports: Vec<ModuleExport>,
    pub export_declarations: Vec<ExportDeclaration>,
    pub diagnostics: Vec<Diagnostic>,
}

impl SourceModel {
    pub fn is_import_bound(&self, name: &str) -> bool {
        self.imports.iter().any(|i| i.binds(name))
    }

    pub fn is_require_bound(&self, name: &str) -> bool {
        self.requires.iter().any(|r| r.bound_name == name)
    }

    pub fn library(&self, name: &str) -> Option<&LibraryUsage> {
        self.libraries.iter().find(|l| l.name == name)
    }
}
