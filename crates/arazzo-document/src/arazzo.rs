//! Arazzo workflow document model

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArazzoDocument {
    #[serde(default)]
    pub arazzo: String,
    #[serde(default)]
    pub info: Info,
    #[serde(default)]
    pub source_descriptions: Vec<SourceDescription>,
    #[serde(default)]
    pub workflows: Vec<Workflow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDescription {
    pub name: String,
    pub url: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub workflow_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Value>,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub outputs: IndexMap<String, String>,
}

impl Workflow {
    /// Test name: the description, else the summary, else the workflow id
    pub fn title(&self) -> &str {
        self.description
            .as_deref()
            .or(self.summary.as_deref())
            .unwrap_or(&self.workflow_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub step_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    #[serde(default)]
    pub success_criteria: Vec<SuccessCriterion>,
    #[serde(default)]
    pub outputs: IndexMap<String, String>,
}

impl Step {
    /// Test step name: the description, else the step id
    pub fn title(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.step_id)
    }

    /// The request payload, if the step sends one
    pub fn payload(&self) -> Option<&Value> {
        self.request_body.as_ref().and_then(|body| body.payload.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<ParameterLocation>,
    #[serde(default)]
    pub value: Value,
}

impl Parameter {
    /// The value as a runtime expression, when it is a string starting with `$`
    pub fn runtime_expression(&self) -> Option<&str> {
        self.value.as_str().filter(|s| s.starts_with('$'))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessCriterion {
    pub condition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub criterion_type: Option<CriterionType>,
}

impl SuccessCriterion {
    pub fn simple(condition: impl Into<String>) -> Self {
        Self {
            condition: condition.into(),
            context: None,
            criterion_type: None,
        }
    }

    pub fn with_type(mut self, name: impl Into<String>) -> Self {
        self.criterion_type = Some(CriterionType::Name(name.into()));
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// The declared type name; `simple` when absent
    pub fn type_name(&self) -> &str {
        match &self.criterion_type {
            None => "simple",
            Some(CriterionType::Name(name)) => name,
            Some(CriterionType::Expression { name, .. }) => name,
        }
    }

    /// The compiler path for this criterion; `None` for types the generator does not handle
    pub fn kind(&self) -> Option<CriterionKind> {
        CriterionKind::from_name(self.type_name())
    }
}

/// `type: jsonpath` or the object form `type: { type: jsonpath, version: draft-goessner-dispatch-jsonpath-00 }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CriterionType {
    Name(String),
    Expression {
        #[serde(rename = "type")]
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        version: Option<String>,
    },
}

/// Which compiler handles a success criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CriterionKind {
    Simple,
    Regex,
    JsonPath,
}

impl CriterionKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "simple" => Some(CriterionKind::Simple),
            "regex" => Some(CriterionKind::Regex),
            "jsonpath" => Some(CriterionKind::JsonPath),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_from_yaml() {
        let yaml = r#"
stepId: createRobot
description: Create a new robot design session
operationId: createRobot
parameters:
  - name: robotId
    in: path
    value: $steps.a.outputs.id
  - name: limit
    in: query
    value: 10
requestBody:
  contentType: application/json
  payload:
    model: humanoid
successCriteria:
  - condition: $statusCode == 201
  - condition: $.length == 5
    context: $response.body#/links
    type: jsonpath
outputs:
  robotId: $response.body#/robotId
  model: $response.body#/model
"#;
        let step: Step = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(step.step_id, "createRobot");
        assert_eq!(step.parameters[0].location, Some(ParameterLocation::Path));
        assert_eq!(step.parameters[0].runtime_expression(), Some("$steps.a.outputs.id"));
        assert_eq!(step.parameters[1].value, serde_json::json!(10));
        assert_eq!(step.parameters[1].runtime_expression(), None);
        assert_eq!(step.payload(), Some(&serde_json::json!({"model": "humanoid"})));
        assert_eq!(step.success_criteria[0].kind(), Some(CriterionKind::Simple));
        assert_eq!(step.success_criteria[1].kind(), Some(CriterionKind::JsonPath));
        let keys: Vec<_> = step.outputs.keys().cloned().collect();
        assert_eq!(keys, vec!["robotId", "model"]);
    }

    #[test]
    fn test_criterion_type_object_form() {
        let yaml = r#"
condition: $[?(@.count > 0)]
type:
  type: JSONPath
  version: draft-goessner-dispatch-jsonpath-00
"#;
        let criterion: SuccessCriterion = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(criterion.type_name(), "JSONPath");
        assert_eq!(criterion.kind(), Some(CriterionKind::JsonPath));
    }

    #[test]
    fn test_unknown_criterion_type() {
        let criterion = SuccessCriterion::simple("//robot").with_type("xpath");
        assert_eq!(criterion.kind(), None);
    }

    #[test]
    fn test_titles_fall_back_to_ids() {
        let step = Step {
            step_id: "getRobot".to_string(),
            ..Default::default()
        };
        assert_eq!(step.title(), "getRobot");

        let workflow = Workflow {
            workflow_id: "robotLifecycle".to_string(),
            summary: Some("Robot lifecycle".to_string()),
            ..Default::default()
        };
        assert_eq!(workflow.title(), "Robot lifecycle");
    }
}
