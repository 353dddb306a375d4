//! YAML loading for Arazzo and OpenAPI documents

use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::{ArazzoDocument, DocumentError, OpenApiDocument};

/// Parse YAML text, attributing failures to `path`
pub fn from_yaml_str<T: DeserializeOwned>(content: &str, path: &Path) -> Result<T, DocumentError> {
    serde_yaml::from_str(content).map_err(|source| DocumentError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

fn read(path: &Path) -> Result<String, DocumentError> {
    fs::read_to_string(path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_arazzo(path: &Path) -> Result<ArazzoDocument, DocumentError> {
    info!(path = %path.display(), "reading Arazzo document");
    let document: ArazzoDocument = from_yaml_str(&read(path)?, path)?;
    debug!(workflows = document.workflows.len(), "loaded Arazzo document");
    Ok(document)
}

pub fn load_openapi(path: &Path) -> Result<OpenApiDocument, DocumentError> {
    info!(path = %path.display(), "reading OpenAPI document");
    let document: OpenApiDocument = from_yaml_str(&read(path)?, path)?;
    debug!(paths = document.paths.len(), "loaded OpenAPI document");
    Ok(document)
}

/// Locate the API description behind the first source description.
/// Relative URLs are taken relative to the Arazzo file's directory.
pub fn resolve_source_path(document: &ArazzoDocument, arazzo_path: &Path) -> Result<PathBuf, DocumentError> {
    let source = document
        .source_descriptions
        .first()
        .ok_or_else(|| DocumentError::MissingSourceDescription {
            path: arazzo_path.to_path_buf(),
        })?;

    let url = source.url.as_str();
    if url.contains("://") && !url.starts_with("file://") {
        return Err(DocumentError::RemoteSource {
            name: source.name.clone(),
            url: url.to_string(),
        });
    }

    let location = Path::new(url.strip_prefix("file://").unwrap_or(url));
    if location.is_absolute() {
        return Ok(location.to_path_buf());
    }
    let base = arazzo_path.parent().unwrap_or_else(|| Path::new(""));
    Ok(base.join(location))
}

/// An Arazzo document together with the API description it targets
#[derive(Debug, Clone)]
pub struct Sources {
    pub arazzo: ArazzoDocument,
    pub openapi: OpenApiDocument,
    pub openapi_path: PathBuf,
}

/// Load the Arazzo document at `arazzo_path` and its first source description
pub fn load_sources(arazzo_path: &Path) -> Result<Sources, DocumentError> {
    let arazzo = load_arazzo(arazzo_path)?;
    let openapi_path = resolve_source_path(&arazzo, arazzo_path)?;
    let openapi = load_openapi(&openapi_path)?;
    Ok(Sources {
        arazzo,
        openapi,
        openapi_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn document_with_url(url: &str) -> ArazzoDocument {
        from_yaml_str(
            &format!(
                "arazzo: 1.0.0\nsourceDescriptions:\n  - name: api\n    url: {}\n    type: openapi\nworkflows: []\n",
                url
            ),
            Path::new("arazzo.yaml"),
        )
        .unwrap()
    }

    #[test]
    fn test_relative_source_is_joined_to_arazzo_dir() {
        let doc = document_with_url("./openapi.yaml");
        let path = resolve_source_path(&doc, Path::new("/specs/arazzo.yaml")).unwrap();
        assert_eq!(path, Path::new("/specs/./openapi.yaml"));

        let doc = document_with_url("openapi.yaml");
        let path = resolve_source_path(&doc, Path::new("specs/arazzo.yaml")).unwrap();
        assert_eq!(path, Path::new("specs/openapi.yaml"));
    }

    #[test]
    fn test_remote_source_is_rejected() {
        let doc = document_with_url("https://example.com/openapi.yaml");
        let err = resolve_source_path(&doc, Path::new("arazzo.yaml")).unwrap_err();
        assert!(matches!(err, DocumentError::RemoteSource { .. }));
        assert_eq!(err.code(), "E-DOC-004");
    }

    #[test]
    fn test_missing_source_description() {
        let doc = ArazzoDocument::default();
        let err = resolve_source_path(&doc, Path::new("arazzo.yaml")).unwrap_err();
        assert!(matches!(err, DocumentError::MissingSourceDescription { .. }));
    }

    #[test]
    fn test_load_sources_from_disk() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("openapi.yaml"),
            "openapi: 3.1.0\nservers:\n  - url: http://localhost:8080\npaths: {}\n",
        )
        .unwrap();
        let arazzo_path = dir.path().join("arazzo.yaml");
        fs::write(
            &arazzo_path,
            "arazzo: 1.0.0\ninfo:\n  title: Robots\n  version: 1.0.0\nsourceDescriptions:\n  - name: api\n    url: ./openapi.yaml\nworkflows: []\n",
        )
        .unwrap();

        let sources = load_sources(&arazzo_path).unwrap();
        assert_eq!(sources.arazzo.info.title, "Robots");
        assert_eq!(sources.openapi.server_url(), "http://localhost:8080");
    }

    #[test]
    fn test_missing_file_and_bad_yaml() {
        let dir = TempDir::new().unwrap();
        let err = load_arazzo(&dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, DocumentError::Io { .. }));

        let bad = dir.path().join("bad.yaml");
        fs::write(&bad, "workflows: [unclosed").unwrap();
        let err = load_arazzo(&bad).unwrap_err();
        assert!(matches!(err, DocumentError::Yaml { .. }));
        assert!(err.to_string().contains("bad.yaml"));
    }
}
