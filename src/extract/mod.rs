//! Model builder: one pass over the syntax tree collecting every import,
//! require, export, class and function candidate, handed to
//! [`resolve::finalize`] for export filtering and dependency merging.

mod calls;
mod classes;
mod exports;
mod functions;
mod imports;

use tree_sitter::Node;

use crate::model::{
    ClassDefinition, Diagnostic, ExportDeclaration, FunctionDefinition, ImportDeclaration,
    ModuleExport, RequireDeclaration, SourceModel,
};
use crate::resolve;
use crate::util::walk;

/// A class or function found in the tree, before export filtering.
///
/// Diagnostics raised while reading the unit travel with it and only reach
/// the model if the unit is kept.
#[derive(Debug)]
pub struct Candidate<T> {
    pub unit: T,
    pub diagnostics: Vec<Diagnostic>,
}

/// Raw traversal output. Local to a single extraction call.
#[derive(Debug, Default)]
pub struct Extraction {
    pub filename: String,
    pub imports: Vec<ImportDeclaration>,
    pub requires: Vec<RequireDeclaration>,
    pub module_exports: Vec<ModuleExport>,
    pub export_declarations: Vec<ExportDeclaration>,
    pub classes: Vec<Candidate<ClassDefinition>>,
    pub functions: Vec<Candidate<FunctionDefinition>>,
    pub diagnostics: Vec<Diagnostic>,
}

/// The node kinds the builder reacts to.
enum Syntax<'t> {
    Import(Node<'t>),
    Export(Node<'t>),
    Class(Node<'t>),
    FunctionDeclaration(Node<'t>),
    FunctionValue(Node<'t>),
    Call(Node<'t>),
    Assignment(Node<'t>),
    Other,
}

fn classify(node: Node) -> Syntax {
    // Keyword tokens share kind names with expressions (`class`, `function`).
    if !node.is_named() {
        return Syntax::Other;
    }
    match node.kind() {
        "import_statement" => Syntax::Import(node),
        "export_statement" => Syntax::Export(node),
        "class_declaration" | "abstract_class_declaration" | "class" => Syntax::Class(node),
        "function_declaration" | "generator_function_declaration" => {
            Syntax::FunctionDeclaration(node)
        }
        "function_expression" | "function" | "generator_function" | "arrow_function" => {
            Syntax::FunctionValue(node)
        }
        "call_expression" => Syntax::Call(node),
        "assignment_expression" => Syntax::Assignment(node),
        _ => Syntax::Other,
    }
}

/// Build the finalized model for one parsed module.
pub fn extract_model(root: Node, src: &[u8], filename: &str) -> SourceModel {
    resolve::finalize(collect(root, src, filename))
}

/// Single traversal filling the raw collections in first-occurrence order.
pub fn collect(root: Node, src: &[u8], filename: &str) -> Extraction {
    let mut out = Extraction {
        filename: filename.to_string(),
        ..Extraction::default()
    };

    walk(root, |node| {
        match classify(node) {
            Syntax::Import(n) => imports::extract_import(n, src, &mut out),
            Syntax::Export(n) => exports::extract_export(n, src, &mut out),
            Syntax::Class(n) => classes::extract_class(n, src, &mut out),
            Syntax::FunctionDeclaration(n) => functions::extract_declaration(n, src, &mut out),
            Syntax::FunctionValue(n) => functions::extract_value(n, src, &mut out),
            Syntax::Call(n) => imports::extract_require(n, src, &mut out),
            Syntax::Assignment(n) => exports::extract_module_export(n, src, &mut out),
            Syntax::Other => {}
        }
        true
    });

    out
}
