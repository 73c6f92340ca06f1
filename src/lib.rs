//! `testplate`: generates a Jest test scaffold from the exported surface of a
//! JavaScript or TypeScript module.
//!
//! The pipeline is pure and per-module: parse, build a [`model::SourceModel`],
//! resolve exports and dependencies, then synthesize a document through a
//! [`framework::TestFramework`] backend.

pub mod error;
pub mod extract;
pub mod framework;
pub mod model;
pub mod output;
pub mod parser;
pub mod resolve;
pub mod synth;
pub mod util;

pub use error::Error;
pub use framework::FrameworkKind;
pub use model::SourceModel;

/// Options for one generation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateConfig {
    pub framework: FrameworkKind,
}

/// Parse `source` and build its finalized model.
pub fn build_model(source: &str, filename: &str) -> Result<SourceModel, Error> {
    let tree = parser::parse_source(source, filename)?;
    let model = extract::extract_model(tree.root_node(), source.as_bytes(), filename);
    tracing::debug!(
        %filename,
        classes = model.classes.len(),
        functions = model.functions.len(),
        libraries = model.libraries.len(),
        "built model"
    );
    Ok(model)
}

/// Generate the test file text for one module.
///
/// `filename` names the module as the test should import it; its extension
/// selects the grammar.
pub fn generate(source: &str, filename: &str, config: &GenerateConfig) -> Result<String, Error> {
    let model = build_model(source, filename)?;
    let backend = config.framework.backend();
    Ok(synth::synthesize(&model, backend.as_ref()).to_string())
}
