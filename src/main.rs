//! `testplate`: generate Jest test scaffolds for JavaScript/TypeScript modules.
//!
//! Expands the given glob patterns, skips `node_modules`, and writes one
//! `<stem>.spec.<ext>` per source file under the output directory, mirroring
//! the source's directory layout.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use testplate::{generate, Error, FrameworkKind, GenerateConfig};

#[derive(Debug, Parser)]
#[command(
    name = "testplate",
    version,
    about = "Generate Jest test scaffolds from a module's exports",
    arg_required_else_help = true
)]
struct Cli {
    /// Source files or glob patterns (`src/**/*.js`).
    #[arg(required = true)]
    patterns: Vec<String>,

    /// Target test framework.
    #[arg(long, value_enum, default_value_t = FrameworkKind::Jest)]
    test_framework: FrameworkKind,

    /// Directory the generated tests are written under.
    #[arg(long, default_value = "__tests__")]
    out_dir: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    install_subscriber();

    let files = match expand_patterns(&cli.patterns) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("testplate: {e}");
            return ExitCode::from(2);
        }
    };

    let config = GenerateConfig {
        framework: cli.test_framework,
    };
    let mut failed = false;
    for file in &files {
        tracing::info!(file = %file.display(), "processing");
        if let Err(e) = process_file(file, &cli.out_dir, &config) {
            tracing::error!(file = %file.display(), "{e}");
            failed = true;
        }
    }

    if failed {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    }
}

fn install_subscriber() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Expand every pattern, dropping anything under `node_modules`. Order follows
/// the patterns, duplicates are removed.
fn expand_patterns(patterns: &[String]) -> Result<Vec<PathBuf>, Error> {
    let mut files: Vec<PathBuf> = Vec::new();
    for pattern in patterns {
        let entries = glob::glob(pattern).map_err(|e| Error::Pattern {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;
        for entry in entries {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    tracing::warn!("{e}");
                    continue;
                }
            };
            if is_in_node_modules(&path) || !path.is_file() || files.contains(&path) {
                continue;
            }
            files.push(path);
        }
    }
    if files.is_empty() {
        return Err(Error::NoMatchingFiles(patterns.join(", ")));
    }
    Ok(files)
}

fn is_in_node_modules(path: &Path) -> bool {
    path.components()
        .any(|c| c.as_os_str() == OsStr::new("node_modules"))
}

fn process_file(source: &Path, out_dir: &Path, config: &GenerateConfig) -> Result<(), Error> {
    let text = std::fs::read_to_string(source).map_err(|e| io_error(source, e))?;
    let target = output_path(out_dir, source);
    let specifier = module_specifier(&target, source);

    let generated = generate(&text, &specifier, config)?;

    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
    }
    std::fs::write(&target, generated).map_err(|e| io_error(&target, e))?;
    tracing::info!(output = %target.display(), "wrote");
    Ok(())
}

fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Plain directory names of `path`, without root, `.` or `..`.
fn normal_components(path: &Path) -> impl Iterator<Item = &OsStr> {
    path.components().filter_map(|c| match c {
        Component::Normal(name) => Some(name),
        _ => None,
    })
}

/// `src/lib/util.test.js` -> `<out>/src/lib/util.spec.js`.
fn output_path(out_dir: &Path, source: &Path) -> PathBuf {
    let mut target = out_dir.to_path_buf();
    if let Some(parent) = source.parent() {
        target.extend(normal_components(parent));
    }
    let file_name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = file_name.split('.').next().unwrap_or(&file_name);
    let ext = source
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "js".to_string());
    target.push(format!("{stem}.spec.{ext}"));
    target
}

/// How the generated test at `target` reaches `source`.
///
/// Both paths relative to the working directory give a `../`-prefixed
/// specifier; otherwise the absolute source path is used.
fn module_specifier(target: &Path, source: &Path) -> String {
    let plain = |p: &Path| {
        p.is_relative()
            && p.components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
    };
    if plain(target) && plain(source) {
        let depth = target
            .parent()
            .map(|p| normal_components(p).count())
            .unwrap_or(0);
        let mut spec = "../".repeat(depth);
        if spec.is_empty() {
            spec.push_str("./");
        }
        let rest: Vec<_> = normal_components(source)
            .map(|c| c.to_string_lossy().into_owned())
            .collect();
        spec.push_str(&rest.join("/"));
        return spec;
    }
    std::path::absolute(source)
        .unwrap_or_else(|_| source.to_path_buf())
        .to_string_lossy()
        .replace('\\', "/")
}
