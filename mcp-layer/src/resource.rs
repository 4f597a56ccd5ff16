use std::sync::Arc;

use async_trait::async_trait;

/// A read-only, URI-addressed value exposed next to the tools.
#[derive(Clone)]
pub struct ResourceDescriptor {
    pub uri: String,
    pub name: String,
    pub description: Option<String>,
    pub mime_type: &'static str,
    pub reader: Arc<dyn ResourceReader + Send + Sync>,
}

#[async_trait]
pub trait ResourceReader: Send + Sync {
    async fn read(&self) -> String;
}

/// Resource whose content is fixed when the server starts.
pub struct StaticText(pub String);

#[async_trait]
impl ResourceReader for StaticText {
    async fn read(&self) -> String {
        self.0.clone()
    }
}
