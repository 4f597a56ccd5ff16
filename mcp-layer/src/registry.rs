use std::{any::Any, collections::BTreeMap, sync::Arc};

use linkme::distributed_slice;
use serde_json::Value;
use crate::schema::RootSchema;
use tokio::sync::RwLock;

use crate::resource::ResourceDescriptor;
use crate::tool::{ReqMeta, ToolCtx, ToolDescriptor, ToolError, ToolHandler};

pub struct ToolRegistration {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: fn() -> RootSchema,
    pub output_schema: fn() -> RootSchema,
    pub build_handler: fn() -> Arc<dyn ToolHandler + Send + Sync>,
    pub defined_at_file: &'static str,
    pub defined_at_line: u32,
}

#[distributed_slice]
pub static TOOLS: [ToolRegistration] = [..];

/// Listing entry for one tool. `name` and `description` are always present.
#[derive(Clone, Debug)]
pub struct ToolSummary {
    pub name: String,
    pub description: String,
    pub input_schema: RootSchema,
    pub output_schema: RootSchema,
}

pub struct ToolRegistry {
    tools: RwLock<BTreeMap<String, ToolDescriptor>>,
    resources: RwLock<BTreeMap<String, ResourceDescriptor>>,
    app_state: Arc<dyn Any + Send + Sync>,
}

impl ToolRegistry {
    pub fn empty_with_state(app_state: Arc<dyn Any + Send + Sync>) -> Arc<Self> {
        Arc::new(Self {
            tools: Default::default(),
            resources: Default::default(),
            app_state,
        })
    }

    /// Build a registry from every `#[mcp_tool]` linked into the binary.
    pub fn gather_with_state(app_state: Arc<dyn Any + Send + Sync>) -> Arc<Self> {
        let mut tools = BTreeMap::new();
        for item in TOOLS {
            let desc = ToolDescriptor {
                name: item.name,
                description: item.description,
                input_schema: (item.input_schema)(),
                output_schema: (item.output_schema)(),
                handler: (item.build_handler)(),
            };
            // Duplicate detection with helpful message
            if let Some(prev) = tools.insert(desc.name.to_string(), desc) {
                panic!(
                    "duplicate MCP tool name '{}'\nfirst defined previously, now again at {}:{}",
                    prev.name, item.defined_at_file, item.defined_at_line
                );
            }
        }
        tracing::debug!(tools = tools.len(), "tool registry gathered");
        Arc::new(Self {
            tools: RwLock::new(tools),
            resources: Default::default(),
            app_state,
        })
    }

    pub async fn insert(&self, desc: ToolDescriptor) -> Option<ToolDescriptor> {
        self.tools.write().await.insert(desc.name.to_string(), desc)
    }

    pub async fn get(&self, name: &str) -> Option<ToolDescriptor> {
        self.tools.read().await.get(name).cloned()
    }

    /// Tools sorted by name.
    pub async fn list(&self) -> Vec<ToolSummary> {
        self.tools
            .read()
            .await
            .values()
            .map(|d| ToolSummary {
                name: d.name.to_string(),
                description: d.description.to_string(),
                input_schema: d.input_schema.clone(),
                output_schema: d.output_schema.clone(),
            })
            .collect()
    }

    pub async fn call(&self, name: &str, args: Value) -> Result<Value, ToolError> {
        self.call_with_meta(name, args, ReqMeta::default()).await
    }

    pub async fn call_with_meta(
        &self,
        name: &str,
        args: Value,
        req_meta: ReqMeta,
    ) -> Result<Value, ToolError> {
        // Clone the handler out so the lock is not held across the call.
        let d = self
            .get(name)
            .await
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        let ctx = ToolCtx { app_state: self.app_state.clone(), req_meta };
        d.handler.call(&ctx, args).await
    }

    pub async fn insert_resource(&self, res: ResourceDescriptor) -> Option<ResourceDescriptor> {
        self.resources.write().await.insert(res.uri.clone(), res)
    }

    pub async fn resources(&self) -> Vec<ResourceDescriptor> {
        self.resources.read().await.values().cloned().collect()
    }

    pub async fn read_resource(&self, uri: &str) -> Option<(ResourceDescriptor, String)> {
        let res = self.resources.read().await.get(uri).cloned()?;
        let text = res.reader.read().await;
        Some((res, text))
    }
}
