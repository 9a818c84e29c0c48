//! Transports serving the dispatcher
//!
//! - [`http`]: JSON over HTTP (`POST /mcp`) with health and info endpoints
//! - [`stdio`]: MCP over stdin/stdout

pub mod http;
pub mod stdio;
