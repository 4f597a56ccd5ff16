//! MCP server exposing a handful of USAspending.gov endpoints as tools.

pub mod config;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod normalize;
pub mod resource;
pub mod server;
pub mod tools;

pub use error::UsaSpendingError;
pub use gateway::{GatewayGuard, HttpGateway};
pub use tools::AppState;
