//! KFS - mount user-space file systems through an embedded loopback NFSv3
//! server.
//!
//! This library lets application code expose an in-process, user-defined
//! filesystem as a real mounted volume on a POSIX host, without any kernel
//! extension: it embeds a minimal NFS version 3 server (RFC 1813) listening
//! on a loopback TCP port, asks the kernel's native NFS client to mount
//! that endpoint, and translates inbound NFS calls into invocations of a
//! set of filesystem callbacks supplied by the application.
//!
//! ## Main Components
//!
//! - `vfs`: The callback contract an application implements to expose a
//!   filesystem. Operations are path-based and report failures as host
//!   errno values.
//!
//! - `mount`/`unmount`: The per-filesystem lifecycle. `mount` registers the
//!   callbacks, brings up the shared RPC service on first use, and issues
//!   the host NFS mount; `unmount` tears all of that down again.
//!
//! - `protocol`: The NFSv3 request engine, the RPC dispatch layer, and the
//!   XDR codec underneath both.
//!
//! - `fileid`/`table`: The process-wide bookkeeping the engine resolves
//!   file handles against: the mount table and the per-mount path/file-id
//!   registry.
//!
//! ## Usage
//!
//! Implement [`vfs::KfsFileSystem`] and pass it to [`mount`] with the
//! desired mountpoint. Mounting requires the ability to bind loopback TCP
//! sockets, talk to the host port mapper, and issue the host NFS mount
//! syscall, which on most platforms means root or equivalent privilege.
//!
//! ## Standards Compliance
//!
//! - RFC 1813: NFS Version 3 Protocol Specification
//! - RFC 5531: RPC: Remote Procedure Call Protocol Specification Version 2
//! - RFC 1832: XDR: External Data Representation Standard

pub mod contents;
mod error;
pub mod fileid;
mod mount;
mod mount_args;
pub mod protocol;
pub mod table;
pub mod tcp;
pub mod vfs;

/// Filesystem identifier returned by [`mount`].
pub type FsId = i64;

pub use contents::Contents;
pub use error::Error;
pub use mount::{mount, unmount, MountOptions};
pub use mount_args::DEV_PREFIX;
pub use protocol::xdr;
pub use tcp::{set_thread_begin_callback, set_thread_end_callback};
pub use vfs::KfsFileSystem;
