use std::fs;
use std::process::Command;

fn testplate() -> Command {
    Command::new(env!("CARGO_BIN_EXE_testplate"))
}

#[test]
fn writes_spec_files_mirroring_source_dirs() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("src/lib")).unwrap();
    fs::write(
        dir.path().join("src/lib/math.js"),
        "function add(a, b) { return a + b; }\nmodule.exports = add;\n",
    )
    .unwrap();

    let status = testplate()
        .current_dir(dir.path())
        .arg("src/**/*.js")
        .status()
        .unwrap();
    assert!(status.success());

    let generated = fs::read_to_string(dir.path().join("__tests__/src/lib/math.spec.js")).unwrap();
    assert!(generated.contains("const add = require(\"../../../src/lib/math\");"));
    assert!(generated.contains("describe(\"math.js\", () => {"));
    assert!(generated.contains("const result = add(a, b);"));
}

#[test]
fn honors_out_dir_and_skips_node_modules() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("node_modules/dep")).unwrap();
    fs::write(dir.path().join("node_modules/dep/index.js"), "module.exports = 1;").unwrap();
    fs::write(dir.path().join("app.ts"), "export function start() {}\n").unwrap();

    let status = testplate()
        .current_dir(dir.path())
        .args(["--out-dir", "spec", "--test-framework", "jest", "**/*.[jt]s"])
        .status()
        .unwrap();
    assert!(status.success());

    assert!(dir.path().join("spec/app.spec.ts").is_file());
    assert!(!dir.path().join("spec/node_modules").exists());
}

#[test]
fn no_matching_files_exits_with_2() {
    let dir = tempfile::tempdir().unwrap();
    let output = testplate()
        .current_dir(dir.path())
        .arg("missing/*.js")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No matching files. Tried: missing/*.js"));
}

#[test]
fn parse_failure_is_isolated_to_its_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("bad.js"), "function broken( {").unwrap();
    fs::write(dir.path().join("good.js"), "function ok() {}\nmodule.exports = ok;").unwrap();

    let status = testplate()
        .current_dir(dir.path())
        .args(["bad.js", "good.js"])
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(2));
    assert!(!dir.path().join("__tests__/bad.spec.js").exists());
    assert!(dir.path().join("__tests__/good.spec.js").is_file());
}
