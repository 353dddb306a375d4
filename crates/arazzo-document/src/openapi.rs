//! The slice of an OpenAPI description the generator reads

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    #[serde(default)]
    pub openapi: String,
    #[serde(default)]
    pub servers: Vec<Server>,
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
    #[serde(default)]
    pub components: Components,
}

impl OpenApiDocument {
    /// URL of the first declared server, or `""` when there is none
    pub fn server_url(&self) -> &str {
        self.servers.first().map(|s| s.url.as_str()).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<Operation>,
}

impl PathItem {
    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Trace => self.trace.as_ref(),
        }
    }

    /// Declared operations in method order
    pub fn operations(&self) -> impl Iterator<Item = (HttpMethod, &Operation)> {
        HttpMethod::ALL
            .into_iter()
            .filter_map(move |method| self.operation(method).map(|op| (method, op)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Patch,
        HttpMethod::Trace,
    ];

    /// Upper-case request method, as sent on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Trace => "TRACE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    #[serde(default)]
    pub security_schemes: IndexMap<String, SecurityScheme>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecurityScheme {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Header, query or cookie name for `apiKey` schemes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "in", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// HTTP auth scheme for `http` schemes, e.g. `bearer`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// An operation located by id
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperationRef<'a> {
    pub path: &'a str,
    pub method: HttpMethod,
    pub operation: &'a Operation,
}

/// Operations keyed by `operationId`; the first declaration of an id wins
#[derive(Debug, Clone)]
pub struct OperationIndex<'a> {
    operations: IndexMap<&'a str, OperationRef<'a>>,
}

impl<'a> OperationIndex<'a> {
    pub fn build(document: &'a OpenApiDocument) -> Self {
        let mut operations = IndexMap::new();
        for (path, item) in &document.paths {
            for (method, operation) in item.operations() {
                let Some(id) = operation.operation_id.as_deref() else {
                    continue;
                };
                operations.entry(id).or_insert(OperationRef {
                    path: path.as_str(),
                    method,
                    operation,
                });
            }
        }
        Self { operations }
    }

    pub fn get(&self, operation_id: &str) -> Option<OperationRef<'a>> {
        self.operations.get(operation_id).copied()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROBOTS: &str = r#"
openapi: 3.1.0
servers:
  - url: http://localhost:8080
paths:
  /v1/robots:
    post:
      operationId: createRobot
    get:
      operationId: listRobots
  /v1/robots/{robotId}/assemble:
    post:
      operationId: assembleRobot
"#;

    fn robots() -> OpenApiDocument {
        serde_yaml::from_str(ROBOTS).unwrap()
    }

    #[test]
    fn test_server_url() {
        assert_eq!(robots().server_url(), "http://localhost:8080");
        assert_eq!(OpenApiDocument::default().server_url(), "");
    }

    #[test]
    fn test_index_lookup() {
        let doc = robots();
        let index = OperationIndex::build(&doc);
        assert_eq!(index.len(), 3);
        let found = index.get("assembleRobot").unwrap();
        assert_eq!(found.path, "/v1/robots/{robotId}/assemble");
        assert_eq!(found.method, HttpMethod::Post);
        assert_eq!(index.get("listRobots").unwrap().method.as_str(), "GET");
        assert!(index.get("deleteRobot").is_none());
    }

    #[test]
    fn test_first_declaration_wins() {
        let yaml = r#"
paths:
  /a:
    get:
      operationId: dup
  /b:
    get:
      operationId: dup
"#;
        let doc: OpenApiDocument = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(OperationIndex::build(&doc).get("dup").unwrap().path, "/a");
    }
}
