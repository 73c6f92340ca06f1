//! Target test-framework backends.
//!
//! Everything framework-specific (suite and test wrappers, mock factories,
//! spies, call-history resets) sits behind [`TestFramework`]. Backends are
//! chosen with [`FrameworkKind`] rather than looked up by name at runtime.

mod jest;

use std::fmt;

use crate::model::{CallPath, ImportDeclaration, LibraryUsage, RequireDeclaration};
use crate::output::Stmt;

pub use jest::Jest;

/// A type the suite instantiates before each test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constructor {
    /// Class or constructor-function name, as imported.
    pub name: String,
    /// Lower-camel instance variable.
    pub binding: String,
    pub parameters: Vec<String>,
}

/// Framework vocabulary used by the synthesizer.
pub trait TestFramework {
    /// File-scope statements the framework needs before anything else.
    fn module_level_imports(&self) -> Vec<Stmt>;

    /// One before-each block instantiating every constructor. A parameter
    /// name shared by several constructors is declared once.
    fn setup(&self, constructors: &[Constructor]) -> Vec<Stmt>;

    /// One after-each block resetting call history of import-bound dependencies.
    /// Empty when nothing needs resetting.
    fn teardown(&self, libraries: &[LibraryUsage], imports: &[ImportDeclaration]) -> Vec<Stmt>;

    /// Substitute module for one import. Members are keyed by the name the
    /// imported module exports, not the local alias. Type-only and
    /// side-effect imports get nothing.
    fn mock_factory(&self, import: &ImportDeclaration, libraries: &[LibraryUsage]) -> Vec<Stmt>;

    /// Spy registrations placed before the call under test.
    ///
    /// `receiver` is the expression standing for `this` in the unit under
    /// test; self-reference call sites are spied through it and dropped when
    /// there is none.
    fn spy_instrumentation(
        &self,
        call_sites: &[CallPath],
        requires: &[RequireDeclaration],
        imports: &[ImportDeclaration],
        receiver: Option<&str>,
    ) -> Vec<Stmt>;

    /// Statements placed after the call under test.
    fn post_test(&self) -> Vec<Stmt> {
        Vec::new()
    }

    fn test_block(&self, description: &str, body: Vec<Stmt>) -> Stmt;

    fn suite_block(&self, description: &str, body: Vec<Stmt>) -> Stmt;
}

/// Supported target frameworks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum FrameworkKind {
    #[default]
    Jest,
}

impl FrameworkKind {
    pub fn backend(self) -> Box<dyn TestFramework> {
        match self {
            Self::Jest => Box::new(Jest),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Jest => "jest",
        }
    }
}

impl fmt::Display for FrameworkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `const p = null;` per parameter, in declared order.
pub(crate) fn null_bindings(parameters: &[String]) -> Vec<Stmt> {
    parameters
        .iter()
        .map(|p| Stmt::line(format!("const {p} = null;")))
        .collect()
}

/// Quote a string as a JavaScript double-quoted literal.
pub(crate) fn js_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_framework_is_jest() {
        assert_eq!(FrameworkKind::default(), FrameworkKind::Jest);
        assert_eq!(FrameworkKind::Jest.to_string(), "jest");
    }

    #[test]
    fn js_string_escapes_quotes() {
        assert_eq!(js_string("my-module.js"), "\"my-module.js\"");
        assert_eq!(js_string("a\"b"), "\"a\\\"b\"");
    }
}
