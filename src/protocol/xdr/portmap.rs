//! Portmap protocol (RFC 1057 Appendix A) data structures.
//!
//! This server acts as a portmap *client*: at bring-up it registers the NFS
//! program with the host port mapper under an unreal version number to keep
//! the daemon alive for the kernel NFS client. Only the pieces that
//! registration needs are defined here.

// Keep original RFC naming conventions for consistency with the specification
#![allow(non_camel_case_types)]

use super::*;

/// A mapping between an RPC program and a network port.
#[derive(Copy, Clone, Debug, Default)]
pub struct mapping {
    /// The RPC program number
    pub prog: u32,
    /// The RPC program version number
    pub vers: u32,
    /// The transport protocol (see IPPROTO_* constants)
    pub prot: u32,
    /// The port number where the service is listening
    pub port: u32,
}
DeserializeStruct!(mapping, prog, vers, prot, port);
SerializeStruct!(mapping, prog, vers, prot, port);

/// Protocol number for TCP/IP.
pub const IPPROTO_TCP: u32 = 6;
/// Portmap RPC program number.
pub const PROGRAM: u32 = 100000;
/// Portmap RPC version number.
pub const VERSION: u32 = 2;

/// Register a new program-to-port mapping.
pub const PMAPPROC_SET: u32 = 1;
/// Remove a program-to-port mapping.
pub const PMAPPROC_UNSET: u32 = 2;
