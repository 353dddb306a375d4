//! Security header selection

use serde::Serialize;
use tracing::debug;

use crate::{OpenApiDocument, SecurityScheme};

/// Header the generated requests carry the API key in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityHeader {
    pub name: String,
    /// Text written before the key, `"Bearer "` or empty
    pub prefix: String,
}

impl SecurityHeader {
    fn authorization(prefix: &str) -> Self {
        Self {
            name: "Authorization".to_string(),
            prefix: prefix.to_string(),
        }
    }
}

fn is_api_key_header(scheme: &SecurityScheme) -> bool {
    scheme.reference.is_none()
        && scheme.kind.as_deref() == Some("apiKey")
        && scheme.location.as_deref() == Some("header")
}

/// First `apiKey` scheme sent in a header, in declaration order
pub fn api_key_header(document: &OpenApiDocument) -> Option<SecurityHeader> {
    document
        .components
        .security_schemes
        .iter()
        .find(|(_, scheme)| is_api_key_header(scheme))
        .and_then(|(_, scheme)| {
            let name = scheme.name.clone()?;
            let bearer = name.to_lowercase().contains("bearer");
            Some(SecurityHeader {
                name,
                prefix: if bearer { "Bearer ".to_string() } else { String::new() },
            })
        })
}

/// The header used for every generated request: an API key header when one is
/// declared, then an HTTP bearer scheme, then a bare `Authorization` header
pub fn security_header(document: &OpenApiDocument) -> SecurityHeader {
    if let Some(header) = api_key_header(document) {
        debug!(header = %header.name, "using apiKey security scheme");
        return header;
    }

    let has_bearer = document.components.security_schemes.values().any(|scheme| {
        scheme.reference.is_none()
            && scheme.kind.as_deref() == Some("http")
            && scheme
                .scheme
                .as_deref()
                .map(|s| s.eq_ignore_ascii_case("bearer"))
                .unwrap_or(false)
    });
    if has_bearer {
        debug!("using http bearer security scheme");
        return SecurityHeader::authorization("Bearer ");
    }

    debug!("no security scheme declared, falling back to Authorization");
    SecurityHeader::authorization("")
}
