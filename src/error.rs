//! Errors reported by the mount API.

use std::fmt;
use std::io;

/// Failure modes of [`crate::mount`] and the supporting tables.
#[derive(Debug)]
pub enum Error {
    /// Every mount table slot is occupied.
    MaxFilesystems,
    /// The library reached a state it should not be able to reach.
    Internal,
    /// The loopback RPC service could not be brought up.
    Transport(io::Error),
    /// The mountpoint directory could not be created.
    Mountpoint(io::Error),
    /// The host NFS mount syscall failed.
    Mount(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MaxFilesystems => write!(f, "KFS maximum filesystems exceeded."),
            Error::Internal => write!(f, "KFS internal error."),
            Error::Transport(e) => write!(f, "cannot start NFS service: {e}"),
            Error::Mountpoint(e) => write!(f, "cannot create mountpoint: {e}"),
            Error::Mount(e) => write!(f, "cannot mount filesystem: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MaxFilesystems | Error::Internal => None,
            Error::Transport(e) | Error::Mountpoint(e) | Error::Mount(e) => Some(e),
        }
    }
}
