//! Test case emission
//!
//! Lowers one workflow into a `Deno.test(...)` statement. Steps are emitted
//! in document order inside `test.step(...)` calls and share one `context`
//! object; a step that references `$steps.<id>.outputs.<name>` relies on the
//! earlier step's write having been emitted first. Nothing is reordered.

use std::collections::HashSet;

use arazzo_ast::{sanitize_identifier, Expr, Property, Stmt, Template};
use arazzo_document::{
    security_header, CriterionKind, OpenApiDocument, OperationIndex, OperationRef, ParameterLocation,
    SecurityHeader, Step, Workflow,
};
use tracing::{debug, warn};

use crate::context::{output_key, ContextStore};
use crate::criteria::{compile_with, UsedAssertions};
use crate::lower::{lower_json, lower_runtime, lower_value, StepScope};
use crate::{Diagnostic, GeneratorOptions};

/// Names every generated step already binds or calls
const STEP_LOCALS: &[&str] = &[
    "serverUrl",
    "apiKey",
    "context",
    "test",
    "response",
    "data",
    "payload",
    "fetch",
    "JSON",
    "String",
    "encodeURIComponent",
    "RegExp",
    "JSONPath",
    "Deno",
    "undefined",
    "assert",
    "assertEquals",
    "assertNotEquals",
    "assertLess",
    "assertLessOrEqual",
    "assertGreater",
    "assertGreaterOrEqual",
    "assertMatch",
];

/// Emits test cases for the workflows of one document
pub struct TestCaseEmitter<'a> {
    operations: OperationIndex<'a>,
    security: SecurityHeader,
    server_url: String,
    api_key_env: String,
    default_context: String,
    uses_jsonpath: bool,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> TestCaseEmitter<'a> {
    pub fn new(openapi: &'a OpenApiDocument, options: &GeneratorOptions) -> Self {
        let server_url = options
            .server_url
            .clone()
            .unwrap_or_else(|| openapi.server_url().to_string());
        let operations = OperationIndex::build(openapi);
        if operations.is_empty() {
            warn!("OpenAPI document declares no operations");
        }
        debug!(operations = operations.len(), server_url = %server_url, "indexed OpenAPI operations");
        Self {
            operations,
            security: security_header(openapi),
            server_url,
            api_key_env: options.api_key_env.clone(),
            default_context: options.default_context.clone(),
            uses_jsonpath: false,
            diagnostics: Vec::new(),
        }
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Whether a jsonpath assertion has been emitted
    pub fn uses_jsonpath(&self) -> bool {
        self.uses_jsonpath
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Emit `Deno.test(<title>, async (test) => { ... })` for one workflow
    pub fn emit(&mut self, workflow: &Workflow, used: &mut UsedAssertions) -> Stmt {
        debug!(workflow = %workflow.workflow_id, steps = workflow.steps.len(), "emitting test case");

        let mut context = ContextStore::new();
        let mut body = self.environment();
        let mut emitted = 0;

        for step in &workflow.steps {
            let Some(step_body) = self.emit_step(workflow, step, &mut context, used) else {
                continue;
            };
            if emitted > 0 {
                body.push(Stmt::Empty);
            }
            body.push(Stmt::expr(
                Expr::call(
                    Expr::ident("test").property("step"),
                    vec![Expr::string(step.title()), Expr::async_arrow(Vec::new(), step_body)],
                )
                .awaited(),
            ));
            emitted += 1;
        }

        Stmt::expr(Expr::call(
            Expr::ident("Deno").property("test"),
            vec![
                Expr::string(workflow.title()),
                Expr::async_arrow(vec!["test".to_string()], body),
            ],
        ))
    }

    /// `serverUrl`, `apiKey` and the empty `context` store
    fn environment(&self) -> Vec<Stmt> {
        vec![
            Stmt::constant("serverUrl", Expr::string(self.server_url.as_str())),
            Stmt::constant(
                "apiKey",
                Expr::call(
                    Expr::ident("Deno").property("env").property("get"),
                    vec![Expr::string(self.api_key_env.as_str())],
                ),
            ),
            Stmt::Const {
                name: "context".to_string(),
                ty: Some("Record<string, unknown>".to_string()),
                init: Expr::Object(Vec::new()),
            },
        ]
    }

    fn warn(&mut self, workflow: &Workflow, step: &Step, message: String) {
        warn!(workflow = %workflow.workflow_id, step = %step.step_id, "{}", message);
        self.diagnostics
            .push(Diagnostic::warning(&workflow.workflow_id, Some(step.step_id.as_str()), message));
    }

    fn emit_step(
        &mut self,
        workflow: &Workflow,
        step: &Step,
        context: &mut ContextStore,
        used: &mut UsedAssertions,
    ) -> Option<Vec<Stmt>> {
        let Some(operation_id) = step.operation_id.as_deref() else {
            self.warn(workflow, step, "step has no operationId, skipped".to_string());
            return None;
        };
        let Some(operation) = self.operations.get(operation_id) else {
            self.warn(
                workflow,
                step,
                format!("operation not found for operationId '{}', step skipped", operation_id),
            );
            return None;
        };
        debug!(
            step = %step.step_id,
            method = %operation.method,
            path = operation.path,
            "emitting step"
        );

        let mut scope = StepScope::new(step.step_id.as_str(), step.payload().is_some());
        let mut stmts = Vec::new();

        let request = self.request(workflow, step, operation, &mut scope, &mut stmts);
        stmts.push(Stmt::constant("response", request));
        stmts.push(Stmt::constant(
            "data",
            Expr::call(Expr::ident("response").property("json"), Vec::new()).awaited(),
        ));

        for criterion in &step.success_criteria {
            match compile_with(criterion, &mut scope, &self.default_context, used) {
                Ok(assertions) => {
                    if criterion.kind() == Some(CriterionKind::JsonPath) {
                        self.uses_jsonpath = true;
                    }
                    stmts.extend(assertions.iter().map(|a| a.to_stmt()));
                }
                Err(err) => {
                    warn!(
                        workflow = %workflow.workflow_id,
                        step = %step.step_id,
                        condition = %criterion.condition,
                        error = %err,
                        "success criterion skipped"
                    );
                    self.diagnostics.push(Diagnostic::compile_error(
                        &workflow.workflow_id,
                        &step.step_id,
                        &criterion.condition,
                        &err,
                    ));
                }
            }
        }

        let mut writes = Vec::new();
        for (name, value) in &step.outputs {
            let key = output_key(&step.step_id, name);
            let target = Expr::ident("context").element(Expr::string(key.as_str()));
            stmts.push(Stmt::assign(target, lower_runtime(value, &mut scope)));
            writes.push(key);
        }

        for key in &scope.context_reads {
            if !context.is_written(key) {
                self.warn(
                    workflow,
                    step,
                    format!("context key '{}' is read before any earlier step writes it", key),
                );
            }
        }
        for (expression, reason) in &scope.unresolved {
            let diagnostic = Diagnostic::warning(
                &workflow.workflow_id,
                Some(step.step_id.as_str()),
                format!("'{}' resolved to undefined: {}", expression, reason),
            )
            .with_source(expression.as_str());
            self.diagnostics.push(diagnostic);
        }
        for key in writes {
            context.record_write(key);
        }

        Some(stmts)
    }

    /// Parameter bindings go to `stmts`; returns the `await fetch(...)` expression
    fn request(
        &mut self,
        workflow: &Workflow,
        step: &Step,
        operation: OperationRef<'_>,
        scope: &mut StepScope,
        stmts: &mut Vec<Stmt>,
    ) -> Expr {
        let mut taken: HashSet<String> = STEP_LOCALS.iter().map(|s| s.to_string()).collect();
        let mut path_bindings = Vec::new();
        let mut query = Vec::new();
        let mut headers = vec![
            Property::quoted(self.security.name.as_str(), {
                let mut template = Template::new(self.security.prefix.as_str());
                template.push(Expr::ident("apiKey"), "");
                Expr::Template(template)
            }),
            Property::quoted("Content-Type", Expr::string("application/json")),
        ];

        for parameter in &step.parameters {
            match parameter.location {
                Some(ParameterLocation::Path) => {
                    let binding = bind_name(&parameter.name, &mut taken);
                    stmts.push(Stmt::constant(binding.as_str(), lower_value(&parameter.value, scope)));
                    path_bindings.push((parameter.name.as_str(), binding));
                }
                Some(ParameterLocation::Query) => {
                    let binding = bind_name(&parameter.name, &mut taken);
                    stmts.push(Stmt::constant(binding.as_str(), lower_value(&parameter.value, scope)));
                    query.push((parameter.name.as_str(), binding));
                }
                Some(ParameterLocation::Header) => {
                    let value = match parameter.runtime_expression() {
                        Some(_) => Expr::call(Expr::ident("String"), vec![lower_value(&parameter.value, scope)]),
                        None => match parameter.value.as_str() {
                            Some(text) => Expr::string(text),
                            None => Expr::call(Expr::ident("String"), vec![lower_json(&parameter.value)]),
                        },
                    };
                    headers.push(Property::quoted(parameter.name.as_str(), value));
                }
                Some(ParameterLocation::Cookie) => {
                    self.warn(
                        workflow,
                        step,
                        format!("cookie parameter '{}' is not supported, skipped", parameter.name),
                    );
                }
                None => {
                    self.warn(
                        workflow,
                        step,
                        format!("parameter '{}' has no location, skipped", parameter.name),
                    );
                }
            }
        }

        let mut url = Template::new("");
        url.push(Expr::ident("serverUrl"), "");
        for placeholder in substitute_path(operation.path, &path_bindings, &mut url) {
            self.warn(
                workflow,
                step,
                format!("path placeholder '{{{}}}' has no matching parameter", placeholder),
            );
        }
        for (i, (name, binding)) in query.iter().enumerate() {
            url.push_text(&format!("{}{}=", if i == 0 { "?" } else { "&" }, name));
            url.push(
                Expr::call(
                    Expr::ident("encodeURIComponent"),
                    vec![Expr::call(Expr::ident("String"), vec![Expr::ident(binding.as_str())])],
                ),
                "",
            );
        }

        let body = match step.payload() {
            Some(payload) => {
                stmts.push(Stmt::constant("payload", lower_json(payload)));
                Expr::call(
                    Expr::ident("JSON").property("stringify"),
                    vec![Expr::ident("payload")],
                )
            }
            None => Expr::null(),
        };

        Expr::call(
            Expr::ident("fetch"),
            vec![
                Expr::Template(url),
                Expr::Object(vec![
                    Property::new("method", Expr::string(operation.method.as_str())),
                    Property::new("headers", Expr::Object(headers)),
                    Property::new("body", body),
                ]),
            ],
        )
        .awaited()
    }
}

/// A binding name for a parameter that does not clash with the step's locals
fn bind_name(name: &str, taken: &mut HashSet<String>) -> String {
    let base = sanitize_identifier(name);
    let mut candidate = base.clone();
    let mut n = 2;
    while taken.contains(&candidate) {
        candidate = format!("{}{}", base, n);
        n += 1;
    }
    taken.insert(candidate.clone());
    candidate
}

/// Append `path` to `url`, turning bound `{name}` placeholders into slots.
/// Returns the placeholders left verbatim.
fn substitute_path(path: &str, bindings: &[(&str, String)], url: &mut Template) -> Vec<String> {
    let mut unmatched = Vec::new();
    let mut rest = path;

    while let Some(open) = rest.find('{') {
        let Some(len) = rest[open..].find('}') else {
            break;
        };
        let close = open + len;
        let name = &rest[open + 1..close];
        url.push_text(&rest[..open]);
        match bindings.iter().find(|(param, _)| *param == name) {
            Some((_, binding)) => url.push(Expr::ident(binding.as_str()), ""),
            None => {
                url.push_text(&rest[open..=close]);
                unmatched.push(name.to_string());
            }
        }
        rest = &rest[close + 1..];
    }
    url.push_text(rest);
    unmatched
}

/// Emit one workflow's test case with default options and the given server URL
pub fn emit_test_case(
    workflow: &Workflow,
    server_url: &str,
    openapi: &OpenApiDocument,
    used: &mut UsedAssertions,
) -> Stmt {
    let options = GeneratorOptions::default().with_server_url(server_url);
    TestCaseEmitter::new(openapi, &options).emit(workflow, used)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arazzo_ast::ToTs;

    const OPENAPI: &str = r#"
openapi: 3.1.0
servers:
  - url: http://localhost:8080
paths:
  /v1/robots:
    post:
      operationId: createRobot
  /v1/robots/{robotId}:
    get:
      operationId: getRobot
  /v1/robots/{robotId}/parts/{partId}:
    get:
      operationId: getPart
  /v1/search:
    get:
      operationId: search
  /v1/jobs/{fetch}:
    get:
      operationId: getJob
"#;

    fn openapi() -> OpenApiDocument {
        serde_yaml::from_str(OPENAPI).unwrap()
    }

    fn workflow(yaml: &str) -> Workflow {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_single_step_layout() {
        let workflow = workflow(
            r#"
workflowId: fetchRobot
description: Fetch a robot
steps:
  - stepId: getRobot
    description: Get the robot
    operationId: getRobot
    parameters:
      - name: robotId
        in: path
        value: abc
    successCriteria:
      - condition: $statusCode == 200
    outputs:
      status: $statusCode
"#,
        );
        let openapi = openapi();
        let mut used = UsedAssertions::new();
        let stmt = emit_test_case(&workflow, "http://localhost:8080", &openapi, &mut used);

        let expected = r#"Deno.test("Fetch a robot", async (test) => {
  const serverUrl = "http://localhost:8080";
  const apiKey = Deno.env.get("BUILDABOT_API_KEY_AUTH");
  const context: Record<string, unknown> = {};
  await test.step("Get the robot", async () => {
    const robotId = "abc";
    const response = await fetch(`${serverUrl}/v1/robots/${robotId}`, {
      method: "GET",
      headers: {
        "Authorization": `${apiKey}`,
        "Content-Type": "application/json",
      },
      body: null,
    });
    const data = await response.json();
    assertEquals(response.status, 200, "$statusCode == 200");
    context["getRobot.outputs.status"] = response.status;
  });
});"#;
        assert_eq!(stmt.to_ts(0), expected);
        assert_eq!(used.function_names(), vec!["assertEquals"]);
    }

    #[test]
    fn test_payload_is_bound_and_stringified() {
        let workflow = workflow(
            r#"
workflowId: create
steps:
  - stepId: createRobot
    operationId: createRobot
    requestBody:
      contentType: application/json
      payload:
        model: humanoid
    successCriteria:
      - condition: $response.body#/model == $request.body#/model
"#,
        );
        let openapi = openapi();
        let mut emitter = TestCaseEmitter::new(&openapi, &GeneratorOptions::default());
        let text = emitter.emit(&workflow, &mut UsedAssertions::new()).to_ts(0);

        assert!(text.contains("const payload = {\n      model: \"humanoid\",\n    };"));
        assert!(text.contains("body: JSON.stringify(payload),"));
        assert!(text.contains("assertEquals(data.model, payload.model,"));
        assert!(emitter.diagnostics().is_empty());
        assert_eq!(emitter.server_url(), "http://localhost:8080");
    }

    #[test]
    fn test_missing_operation_skips_step() {
        let workflow = workflow(
            r#"
workflowId: partial
steps:
  - stepId: ghost
    operationId: doesNotExist
    successCriteria:
      - condition: $statusCode == 200
  - stepId: create
    operationId: createRobot
    successCriteria:
      - condition: $statusCode == 201
"#,
        );
        let openapi = openapi();
        let mut emitter = TestCaseEmitter::new(&openapi, &GeneratorOptions::default());
        let mut used = UsedAssertions::new();
        let text = emitter.emit(&workflow, &mut used).to_ts(0);

        assert!(!text.contains("$statusCode == 200"));
        assert!(text.contains("assertEquals(response.status, 201, \"$statusCode == 201\");"));
        assert_eq!(emitter.diagnostics().len(), 1);
        assert_eq!(emitter.diagnostics()[0].step_id.as_deref(), Some("ghost"));
        assert!(emitter.diagnostics()[0].message.contains("doesNotExist"));
    }

    #[test]
    fn test_bad_criterion_does_not_stop_the_step() {
        let workflow = workflow(
            r#"
workflowId: partial
steps:
  - stepId: create
    operationId: createRobot
    successCriteria:
      - condition: justtext
      - condition: $statusCode == 201
"#,
        );
        let openapi = openapi();
        let mut emitter = TestCaseEmitter::new(&openapi, &GeneratorOptions::default());
        let text = emitter.emit(&workflow, &mut UsedAssertions::new()).to_ts(0);

        assert!(text.contains("\"$statusCode == 201\""));
        let diagnostics = emitter.into_diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].is_error());
        assert_eq!(diagnostics[0].code, Some("E-CRIT-001"));
    }

    #[test]
    fn test_read_before_write_is_reported() {
        let workflow = workflow(
            r#"
workflowId: outOfOrder
steps:
  - stepId: fetch
    operationId: getRobot
    parameters:
      - name: robotId
        in: path
        value: $steps.create.outputs.robotId
  - stepId: create
    operationId: createRobot
    outputs:
      robotId: $response.body#/robotId
"#,
        );
        let openapi = openapi();
        let mut emitter = TestCaseEmitter::new(&openapi, &GeneratorOptions::default());
        let text = emitter.emit(&workflow, &mut UsedAssertions::new()).to_ts(0);

        let read = text.find("const robotId = context[\"create.outputs.robotId\"];").unwrap();
        let write = text.find("context[\"create.outputs.robotId\"] = data.robotId;").unwrap();
        assert!(read < write);
        assert_eq!(emitter.diagnostics().len(), 1);
        assert!(emitter.diagnostics()[0].message.contains("create.outputs.robotId"));
    }

    #[test]
    fn test_query_and_header_parameters() {
        let workflow = workflow(
            r#"
workflowId: search
steps:
  - stepId: search
    operationId: search
    parameters:
      - name: q
        in: query
        value: arm
      - name: page-size
        in: query
        value: 20
      - name: X-Trace
        in: header
        value: $steps.other.outputs.trace
      - name: session
        in: cookie
        value: abc
"#,
        );
        let openapi = openapi();
        let mut emitter = TestCaseEmitter::new(&openapi, &GeneratorOptions::default());
        let text = emitter.emit(&workflow, &mut UsedAssertions::new()).to_ts(0);

        assert!(text.contains("const q = \"arm\";"));
        assert!(text.contains("const page_size = 20;"));
        assert!(text.contains(
            "`${serverUrl}/v1/search?q=${encodeURIComponent(String(q))}&page-size=${encodeURIComponent(String(page_size))}`"
        ));
        assert!(text.contains("\"X-Trace\": String(context[\"other.outputs.trace\"]),"));
        let messages: Vec<_> = emitter.diagnostics().iter().map(|d| d.message.as_str()).collect();
        assert!(messages.iter().any(|m| m.contains("cookie parameter 'session'")));
        assert!(messages.iter().any(|m| m.contains("other.outputs.trace")));
    }

    #[test]
    fn test_unmatched_placeholder_stays_verbatim() {
        let workflow = workflow(
            r#"
workflowId: parts
steps:
  - stepId: part
    operationId: getPart
    parameters:
      - name: robotId
        in: path
        value: r1
"#,
        );
        let openapi = openapi();
        let mut emitter = TestCaseEmitter::new(&openapi, &GeneratorOptions::default());
        let text = emitter.emit(&workflow, &mut UsedAssertions::new()).to_ts(0);

        assert!(text.contains("`${serverUrl}/v1/robots/${robotId}/parts/{partId}`"));
        assert!(emitter.diagnostics()[0].message.contains("{partId}"));
    }

    #[test]
    fn test_parameters_do_not_shadow_globals() {
        let workflow = workflow(
            r#"
workflowId: jobs
steps:
  - stepId: job
    operationId: getJob
    parameters:
      - name: fetch
        in: path
        value: x
    successCriteria:
      - condition: $statusCode == 200
  - stepId: search
    operationId: search
    parameters:
      - name: String
        in: query
        value: arm
      - name: assertEquals
        in: query
        value: 1
    successCriteria:
      - condition: $statusCode == 200
"#,
        );
        let openapi = openapi();
        let mut emitter = TestCaseEmitter::new(&openapi, &GeneratorOptions::default());
        let text = emitter.emit(&workflow, &mut UsedAssertions::new()).to_ts(0);

        assert!(!text.contains("const fetch ="));
        assert!(text.contains("const fetch2 = \"x\";"));
        assert!(text.contains("const response = await fetch(`${serverUrl}/v1/jobs/${fetch2}`, {"));
        assert!(text.contains("const String2 = \"arm\";"));
        assert!(text.contains("const assertEquals2 = 1;"));
        assert!(text.contains(
            "`${serverUrl}/v1/search?String=${encodeURIComponent(String(String2))}&assertEquals=${encodeURIComponent(String(assertEquals2))}`"
        ));
        assert!(emitter.diagnostics().is_empty());
    }

    #[test]
    fn test_bind_name_avoids_locals() {
        let mut taken: HashSet<String> = STEP_LOCALS.iter().map(|s| s.to_string()).collect();
        assert_eq!(bind_name("data", &mut taken), "data2");
        assert_eq!(bind_name("data", &mut taken), "data3");
        assert_eq!(bind_name("robot-id", &mut taken), "robot_id");
        assert_eq!(bind_name("JSONPath", &mut taken), "JSONPath2");
        assert_eq!(bind_name("Deno", &mut taken), "Deno2");
    }
}
