//! MOUNT protocol (RFC 1813 Appendix I) program and status numbers.
//!
//! The kernel is handed its root file handle through the mount syscall, so
//! this server never honors MOUNT traffic; the program is registered only
//! because the RPC wire format references it, and every procedure is
//! answered by a stub. Only the numbers needed by those stubs live here.

// Keep original RFC naming conventions for consistency with the specification
#![allow(non_camel_case_types)]

use num_derive::{FromPrimitive, ToPrimitive};

use super::*;

/// MOUNT program number for RPC.
pub const PROGRAM: u32 = 100005;
/// MOUNT protocol version 3.
pub const VERSION: u32 = 3;

/// Status codes returned by MOUNT protocol operations.
#[derive(Copy, Clone, Debug, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u32)]
pub enum mountstat3 {
    /// No error
    MNT3_OK = 0,
    /// Not owner
    MNT3ERR_PERM = 1,
    /// No such file or directory
    MNT3ERR_NOENT = 2,
    /// I/O error
    MNT3ERR_IO = 5,
    /// Permission denied
    MNT3ERR_ACCES = 13,
    /// Not a directory
    MNT3ERR_NOTDIR = 20,
    /// Invalid argument
    MNT3ERR_INVAL = 22,
    /// Filename too long
    MNT3ERR_NAMETOOLONG = 63,
    /// Operation not supported
    MNT3ERR_NOTSUPP = 10004,
    /// A failure on the server
    MNT3ERR_SERVERFAULT = 10006,
}
SerializeEnum!(mountstat3);
DeserializeEnum!(mountstat3);

/// Procedure numbers for the MOUNT version 3 protocol.
#[allow(clippy::upper_case_acronyms)]
#[derive(Copy, Clone, Debug, FromPrimitive, ToPrimitive)]
pub enum MountProgram {
    /// Null procedure for service availability testing
    MOUNTPROC3_NULL = 0,
    /// Mount a file system
    MOUNTPROC3_MNT = 1,
    /// List mounted file systems
    MOUNTPROC3_DUMP = 2,
    /// Unmount a file system
    MOUNTPROC3_UMNT = 3,
    /// Unmount all file systems
    MOUNTPROC3_UMNTALL = 4,
    /// List exported file systems
    MOUNTPROC3_EXPORT = 5,
    /// Invalid procedure number
    INVALID,
}
