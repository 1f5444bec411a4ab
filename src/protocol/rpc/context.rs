//! Per-connection RPC context.

use std::fmt;

/// State a connection hands to every procedure handler.
///
/// The engine resolves filesystems through the process-wide mount table,
/// and file ownership is pinned to the calling process, so the context
/// carries only what the logs and transport need.
#[derive(Clone)]
pub struct Context {
    /// Port the service is listening on
    pub local_port: u16,
    /// Client address, for logging
    pub client_addr: String,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("rpc::Context")
            .field("local_port", &self.local_port)
            .field("client_addr", &self.client_addr)
            .finish()
    }
}
