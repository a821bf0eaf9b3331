//! Transport layer for the MCP server.
//!
//! Two transports carry the same service: stdio for CLI integrations and
//! streamable HTTP for web clients.

pub mod http;
pub mod stdio;

pub use http::HttpTransport;
pub use stdio::StdioTransport;

use crate::error::GatewayResult;

/// A transport runs the MCP service until shutdown.
pub trait Transport {
    /// Run the transport until completion or a shutdown signal.
    async fn run(&self) -> GatewayResult<()>;

    /// Transport name for logging.
    fn name(&self) -> &'static str;
}
