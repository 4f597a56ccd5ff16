//! The OpenAPI excerpt resource.

use std::sync::Arc;

use mcp_layer::resource::{ResourceDescriptor, StaticText};

pub const OPENAPI_RESOURCE_URI: &str = "usaspending://openapi/selected.yaml";
pub const OPENAPI_MIME_TYPE: &str = "text/yaml";

/// Expose the configured OpenAPI excerpt, trimmed. Empty input yields an
/// empty document rather than an error.
pub fn openapi_resource(yaml: &str) -> ResourceDescriptor {
    ResourceDescriptor {
        uri: OPENAPI_RESOURCE_URI.to_string(),
        name: "selected.yaml".to_string(),
        description: Some("OpenAPI excerpt for the endpoints behind the tools.".to_string()),
        mime_type: OPENAPI_MIME_TYPE,
        reader: Arc::new(StaticText(yaml.trim().to_string())),
    }
}
