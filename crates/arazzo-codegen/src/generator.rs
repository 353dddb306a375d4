//! Program assembly

use arazzo_ast::{Import, Program, Stmt, ToTs};
use arazzo_document::{ArazzoDocument, OpenApiDocument};
use serde::Serialize;
use tracing::info;

use crate::{Diagnostic, GeneratorOptions, TestCaseEmitter, UsedAssertions};

pub const HEADER: &str =
    "This test file was generated from an arazzo.yaml document.\nDo not edit this file manually.";
pub const DOTENV_MODULE: &str = "jsr:@std/dotenv/load";
pub const JSONPATH_MODULE: &str = "npm:jsonpath-plus";
pub const ASSERT_MODULE: &str = "jsr:@std/assert";

/// Result of one generation pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Generation {
    /// `None` when the document produced no assertion at all
    pub program: Option<Program>,
    pub diagnostics: Vec<Diagnostic>,
    pub used_assertions: UsedAssertions,
}

impl Generation {
    /// The program as TypeScript text
    pub fn render(&self) -> Option<String> {
        self.program.as_ref().map(render)
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Generate the test program for every workflow of `arazzo`.
///
/// Steps whose operation cannot be found and criteria that fail to compile
/// are skipped and reported; generation only comes back empty when no
/// assertion was produced anywhere in the document.
pub fn generate_program(
    arazzo: &ArazzoDocument,
    openapi: &OpenApiDocument,
    options: &GeneratorOptions,
) -> Generation {
    let mut emitter = TestCaseEmitter::new(openapi, options);
    let mut used = UsedAssertions::new();
    info!(
        workflows = arazzo.workflows.len(),
        server_url = emitter.server_url(),
        "generating test program"
    );

    let body: Vec<Stmt> = arazzo
        .workflows
        .iter()
        .map(|workflow| emitter.emit(workflow, &mut used))
        .collect();
    let uses_jsonpath = emitter.uses_jsonpath();
    let diagnostics = emitter.into_diagnostics();

    if used.is_empty() {
        info!("no assertions were produced, nothing to generate");
        return Generation {
            program: None,
            diagnostics,
            used_assertions: used,
        };
    }

    let mut imports = vec![Import::side_effect(DOTENV_MODULE)];
    if uses_jsonpath {
        imports.push(Import::named(vec!["JSONPath".to_string()], JSONPATH_MODULE));
    }
    imports.push(Import::named(used.function_names(), ASSERT_MODULE));

    info!(
        assertion_kinds = used.len(),
        diagnostics = diagnostics.len(),
        "generated test program"
    );
    Generation {
        program: Some(Program::new(imports, body).with_header(HEADER)),
        diagnostics,
        used_assertions: used,
    }
}

pub fn render(program: &Program) -> String {
    program.to_ts(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn documents(arazzo: &str, openapi: &str) -> (ArazzoDocument, OpenApiDocument) {
        (serde_yaml::from_str(arazzo).unwrap(), serde_yaml::from_str(openapi).unwrap())
    }

    const OPENAPI: &str = r#"
openapi: 3.1.0
servers:
  - url: http://localhost:8080
paths:
  /v1/robots:
    post:
      operationId: createRobot
"#;

    #[test]
    fn test_no_assertions_means_no_program() {
        let (arazzo, openapi) = documents(
            r#"
arazzo: 1.0.0
workflows:
  - workflowId: quiet
    steps:
      - stepId: create
        operationId: createRobot
"#,
            OPENAPI,
        );
        let generation = generate_program(&arazzo, &openapi, &GeneratorOptions::default());
        assert!(generation.program.is_none());
        assert!(generation.render().is_none());
        assert!(generation.used_assertions.is_empty());
    }

    #[test]
    fn test_failed_criterion_is_an_error() {
        let (arazzo, openapi) = documents(
            r#"
arazzo: 1.0.0
workflows:
  - workflowId: partial
    steps:
      - stepId: create
        operationId: createRobot
        successCriteria:
          - condition: justtext
          - condition: $statusCode == 201
"#,
            OPENAPI,
        );
        let generation = generate_program(&arazzo, &openapi, &GeneratorOptions::default());
        assert!(generation.program.is_some());
        assert!(generation.has_errors());

        let (clean, _) = documents(
            r#"
arazzo: 1.0.0
workflows:
  - workflowId: clean
    steps:
      - stepId: create
        operationId: createRobot
        successCriteria:
          - condition: $statusCode == 201
"#,
            OPENAPI,
        );
        assert!(!generate_program(&clean, &openapi, &GeneratorOptions::default()).has_errors());
    }

    #[test]
    fn test_imports_follow_usage() {
        let (arazzo, openapi) = documents(
            r#"
arazzo: 1.0.0
workflows:
  - workflowId: create
    steps:
      - stepId: create
        operationId: createRobot
        successCriteria:
          - condition: $statusCode == 201
          - context: $response.body#/links
            condition: $.length == 5
            type: jsonpath
"#,
            OPENAPI,
        );
        let generation = generate_program(&arazzo, &openapi, &GeneratorOptions::default());
        let program = generation.program.unwrap();
        assert_eq!(
            program.imports,
            vec![
                Import::side_effect("jsr:@std/dotenv/load"),
                Import::named(vec!["JSONPath".to_string()], "npm:jsonpath-plus"),
                Import::named(vec!["assertEquals".to_string()], "jsr:@std/assert"),
            ]
        );
        assert_eq!(program.header.as_deref(), Some(HEADER));
    }

    #[test]
    fn test_jsonpath_import_omitted_without_jsonpath() {
        let (arazzo, openapi) = documents(
            r#"
arazzo: 1.0.0
workflows:
  - workflowId: create
    steps:
      - stepId: create
        operationId: createRobot
        successCriteria:
          - condition: $statusCode >= 200 && $statusCode < 300
"#,
            OPENAPI,
        );
        let text = generate_program(&arazzo, &openapi, &GeneratorOptions::default())
            .render()
            .unwrap();
        assert!(text.starts_with(
            "/**\n * This test file was generated from an arazzo.yaml document.\n * Do not edit this file manually.\n */\n"
        ));
        assert!(text.contains("import \"jsr:@std/dotenv/load\";\nimport { assertGreaterOrEqual, assertLess } from \"jsr:@std/assert\";\n\nDeno.test("));
        assert!(!text.contains("jsonpath-plus"));
    }

    #[test]
    fn test_server_url_override() {
        let (arazzo, openapi) = documents(
            r#"
arazzo: 1.0.0
workflows:
  - workflowId: create
    steps:
      - stepId: create
        operationId: createRobot
        successCriteria:
          - condition: $statusCode == 201
"#,
            OPENAPI,
        );
        let options = GeneratorOptions::default()
            .with_server_url("https://staging.example.com")
            .with_api_key_env("ROBOT_KEY");
        let text = generate_program(&arazzo, &openapi, &options).render().unwrap();
        assert!(text.contains("const serverUrl = \"https://staging.example.com\";"));
        assert!(text.contains("Deno.env.get(\"ROBOT_KEY\")"));
    }
}
