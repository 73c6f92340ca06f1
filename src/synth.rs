//! Test code synthesis: walks a finalized [`SourceModel`] in a fixed order and
//! asks a [`TestFramework`] for every framework-specific statement.

use std::path::Path;

use crate::framework::{js_string, null_bindings, Constructor, TestFramework};
use crate::model::{
    CallPath, ClassDefinition, ExportKind, ExportSlot, FunctionDefinition, ImportBinding,
    ImportDeclaration, ImportKind, MethodDefinition, SourceModel, UnitKind,
};
use crate::output::{Document, Stmt};
use crate::util::lower_camel;

/// Build the test document for one module.
pub fn synthesize(model: &SourceModel, framework: &dyn TestFramework) -> Document {
    let mut statements = Vec::new();

    for diagnostic in &model.diagnostics {
        statements.push(Stmt::line(format!("// unsupported: {diagnostic}")));
    }
    if !statements.is_empty() {
        statements.push(Stmt::Blank);
    }

    let preamble_start = statements.len();
    statements.extend(framework.module_level_imports());
    for import in &model.imports {
        statements.push(Stmt::line(import_statement(import)));
        statements.extend(framework.mock_factory(import, &model.libraries));
    }
    let mut requires: Vec<&str> = Vec::new();
    for require in &model.requires {
        // Destructured declarators share one statement.
        if !requires.contains(&require.statement.as_str()) {
            requires.push(&require.statement);
            statements.push(Stmt::line(require.statement.clone()));
        }
    }
    if statements.len() > preamble_start {
        statements.push(Stmt::Blank);
    }

    let include = module_include(model);
    if !include.is_empty() {
        statements.extend(include);
        statements.push(Stmt::Blank);
    }

    statements.push(suite(model, framework));
    Document { statements }
}

/// Re-render an import from its bindings, one line, comments dropped.
pub fn import_statement(import: &ImportDeclaration) -> String {
    let path = js_string(&import.source_path);
    if import.kind == ImportKind::SideEffect {
        return format!("import {path};");
    }
    let mut parts: Vec<String> = Vec::new();
    let mut members: Vec<String> = Vec::new();
    for binding in &import.bindings {
        match binding {
            ImportBinding::Default(name) => parts.push(name.clone()),
            ImportBinding::Namespace(name) => parts.push(format!("* as {name}")),
            ImportBinding::Member { imported, local } if imported == local => {
                members.push(local.clone())
            }
            ImportBinding::Member { imported, local } => {
                members.push(format!("{imported} as {local}"))
            }
        }
    }
    if !members.is_empty() {
        parts.push(format!("{{ {} }}", members.join(", ")));
    }
    let type_only = if import.type_only { "type " } else { "" };
    format!("import {type_only}{} from {path};", parts.join(", "))
}

/// `my-module.js` -> `my-module`; extensionless names are kept as is.
pub fn include_path(filename: &str) -> String {
    let path = Path::new(filename);
    match path.extension() {
        Some(ext) => filename[..filename.len() - ext.len() - 1].to_string(),
        None => filename.to_string(),
    }
}

/// Last path component, used as the suite description.
pub fn suite_name(filename: &str) -> &str {
    filename.rsplit(['/', '\\']).next().unwrap_or(filename)
}

/// Bind the module under test: ES exports win over the CommonJS slot.
fn module_include(model: &SourceModel) -> Vec<Stmt> {
    let path = js_string(&include_path(&model.filename));

    if !model.export_declarations.is_empty() {
        let mut default = None;
        let mut named: Vec<String> = Vec::new();
        for decl in &model.export_declarations {
            match decl.kind {
                ExportKind::Default => {
                    default.get_or_insert(decl.local_name.as_str());
                }
                ExportKind::Named => {
                    let specifier = if decl.exported_name == decl.local_name {
                        decl.local_name.clone()
                    } else {
                        format!("{} as {}", decl.exported_name, decl.local_name)
                    };
                    if !named.contains(&specifier) {
                        named.push(specifier);
                    }
                }
            }
        }
        let clause = match (default, named.is_empty()) {
            (Some(d), true) => d.to_string(),
            (Some(d), false) => format!("{d}, {{ {} }}", named.join(", ")),
            (None, _) => format!("{{ {} }}", named.join(", ")),
        };
        return vec![Stmt::line(format!("import {clause} from {path};"))];
    }

    let mut lines: Vec<Stmt> = Vec::new();
    for export in &model.module_exports {
        let line = match export.slot {
            ExportSlot::Whole => format!("const {} = require({path});", export.bound_name),
            ExportSlot::Property => format!(
                "const {} = require({path}).{};",
                export.bound_name, export.exported_name
            ),
        };
        let line = Stmt::line(line);
        if !lines.contains(&line) {
            lines.push(line);
        }
    }
    lines
}

fn constructors(model: &SourceModel) -> Vec<Constructor> {
    let classes = model.classes.iter().map(|class| Constructor {
        name: class.name.clone(),
        binding: lower_camel(&class.name),
        parameters: class
            .constructor()
            .map(|c| c.parameters.clone())
            .unwrap_or_default(),
    });
    let functions = model
        .functions
        .iter()
        .filter(|f| f.kind == UnitKind::Constructor)
        .map(|f| Constructor {
            name: f.name.clone(),
            binding: lower_camel(&f.name),
            parameters: f.parameters.clone(),
        });
    classes.chain(functions).collect()
}

fn suite(model: &SourceModel, framework: &dyn TestFramework) -> Stmt {
    let mut body = Vec::new();

    let constructors = constructors(model);
    for ctor in &constructors {
        body.push(Stmt::line(format!("let {};", ctor.binding)));
    }
    if !constructors.is_empty() {
        body.extend(framework.setup(&constructors));
    }
    body.extend(framework.teardown(&model.libraries, &model.imports));

    for class in &model.classes {
        for method in class.methods.iter().filter(|m| m.kind == UnitKind::Method) {
            body.push(method_test(model, framework, class, method));
        }
    }
    for function in model.functions.iter().filter(|f| f.kind == UnitKind::Function) {
        body.push(function_test(model, framework, function));
    }

    framework.suite_block(suite_name(&model.filename), body)
}

fn method_test(
    model: &SourceModel,
    framework: &dyn TestFramework,
    class: &ClassDefinition,
    method: &MethodDefinition,
) -> Stmt {
    let receiver = if method.is_static {
        class.name.clone()
    } else {
        lower_camel(&class.name)
    };
    let call = format!("{receiver}.{}({})", method.name, method.parameters.join(", "));
    let body = test_body(
        model,
        framework,
        &method.call_sites,
        &method.parameters,
        Some(receiver.as_str()),
        call,
        method.returns_value,
    );
    framework.test_block(&method.name, body)
}

fn function_test(
    model: &SourceModel,
    framework: &dyn TestFramework,
    function: &FunctionDefinition,
) -> Stmt {
    let mut chain = call_chain(function);
    // `this` inside a prototype method is the shared instance.
    let receiver = function.prototype_owner.and(chain.first().cloned());
    chain.push(function.name.clone());
    let call = format!("{}({})", chain.join("."), function.parameters.join(", "));
    let body = test_body(
        model,
        framework,
        &function.call_sites,
        &function.parameters,
        receiver.as_deref(),
        call,
        function.returns_value,
    );
    framework.test_block(&function.name, body)
}

/// Qualifier to call a function through. A prototype owner becomes its
/// instance binding and anything before it is dropped.
fn call_chain(function: &FunctionDefinition) -> Vec<String> {
    let owned = function
        .prototype_owner
        .and_then(|owner| function.callee_path.get(owner..))
        .and_then(|rest| rest.split_first());
    match owned {
        Some((owner, rest)) => std::iter::once(lower_camel(owner))
            .chain(rest.iter().cloned())
            .collect(),
        None => function.callee_path.clone(),
    }
}

fn test_body(
    model: &SourceModel,
    framework: &dyn TestFramework,
    call_sites: &[CallPath],
    parameters: &[String],
    receiver: Option<&str>,
    call: String,
    returns_value: bool,
) -> Vec<Stmt> {
    let mut body =
        framework.spy_instrumentation(call_sites, &model.requires, &model.imports, receiver);
    body.extend(null_bindings(parameters));
    body.push(Stmt::line(if returns_value {
        format!("const result = {call};")
    } else {
        format!("{call};")
    }));
    body.extend(framework.post_test());
    body
}
