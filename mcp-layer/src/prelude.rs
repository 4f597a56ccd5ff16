pub use crate::tool::{ToolCtx, ToolDescriptor, ToolError, ToolHandler};
pub use crate::registry::{ToolRegistry, TOOLS, ToolRegistration};
pub use crate::resource::{ResourceDescriptor, ResourceReader, StaticText};
pub use crate::{IntoJsonValue, McpServer};
#[cfg(feature = "http")] pub use crate::{McpLayer, McpLayerConfig};
