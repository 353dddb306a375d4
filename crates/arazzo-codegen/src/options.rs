//! Generator configuration

use serde::{Deserialize, Serialize};

pub const DEFAULT_API_KEY_ENV: &str = "BUILDABOT_API_KEY_AUTH";
pub const DEFAULT_CONTEXT: &str = "$response.body";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneratorOptions {
    /// Environment variable the generated test reads the API key from
    pub api_key_env: String,
    /// Base URL for requests; the OpenAPI document's first server when unset
    pub server_url: Option<String>,
    /// Runtime expression regex and jsonpath criteria read when they declare no context
    pub default_context: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            server_url: None,
            default_context: DEFAULT_CONTEXT.to_string(),
        }
    }
}

impl GeneratorOptions {
    pub fn with_api_key_env(mut self, name: impl Into<String>) -> Self {
        self.api_key_env = name.into();
        self
    }

    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = GeneratorOptions::default();
        assert_eq!(options.api_key_env, "BUILDABOT_API_KEY_AUTH");
        assert_eq!(options.server_url, None);
        assert_eq!(options.default_context, "$response.body");
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let options: GeneratorOptions =
            serde_json::from_str(r#"{"serverUrl": "http://localhost:9000"}"#).unwrap();
        assert_eq!(options.server_url.as_deref(), Some("http://localhost:9000"));
        assert_eq!(options.api_key_env, DEFAULT_API_KEY_ENV);
    }
}
