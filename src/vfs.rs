//! The callback contract between the NFS request engine and an application
//! filesystem.
//!
//! An application exposes a filesystem by implementing [`KfsFileSystem`].
//! Every operation receives a path rooted at `"/"` and reports failure with
//! a host `errno` value, which the engine translates into NFS status codes.
//! All callbacks run on the single RPC service thread and are expected to
//! return promptly.
//!
//! Every method has a default implementation that fails with `ENOTSUP`, so
//! an implementor only overrides the operations its filesystem supports.
//! A filesystem that leaves the mutating operations unimplemented should
//! also report [`Capabilities::ReadOnly`] so the volume is mounted
//! read-only.
//!
//! Unsupported filesystem features, as in the original library:
//!   - no users/groups on files (ownership is pinned to the calling process)
//!   - no special file creation
//!   - no hard links

use crate::contents::Contents;

/// Host errno value reported by callbacks on failure.
pub type Errno = libc::c_int;

/// Second/nanosecond timestamp used in [`Stat`] and `utimes`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TimeSpec {
    pub sec: u64,
    pub nsec: u64,
}

impl From<TimeSpec> for filetime::FileTime {
    fn from(time: TimeSpec) -> Self {
        filetime::FileTime::from_unix_time(time.sec as i64, time.nsec as u32)
    }
}

impl From<filetime::FileTime> for TimeSpec {
    fn from(time: filetime::FileTime) -> Self {
        TimeSpec { sec: time.unix_seconds() as u64, nsec: u64::from(time.nanoseconds()) }
    }
}

/// The type of a filesystem object.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum FileType {
    /// Regular file
    #[default]
    Reg,
    /// Directory
    Dir,
    /// Block special device
    Blk,
    /// Character special device
    Chr,
    /// Symbolic link
    Lnk,
    /// Socket
    Sock,
    /// Named pipe
    Fifo,
}

/// Permission bit values used in [`Stat::mode`] and `chmod`.
///
/// These are library-defined values, numerically distinct from both the
/// POSIX and the NFS bit assignments; the engine translates bit by bit.
pub mod mode {
    pub const IRUSR: u32 = 0x400;
    pub const IWUSR: u32 = 0x200;
    pub const IXUSR: u32 = 0x100;
    pub const IRGRP: u32 = 0x040;
    pub const IWGRP: u32 = 0x020;
    pub const IXGRP: u32 = 0x010;
    pub const IROTH: u32 = 0x004;
    pub const IWOTH: u32 = 0x002;
    pub const IXOTH: u32 = 0x001;

    /// All nine defined permission bits.
    pub const MASK: u32 = 0x777;
}

/// File attributes reported by the `stat` callback.
#[derive(Copy, Clone, Debug, Default)]
pub struct Stat {
    /// Object type
    pub ftype: FileType,
    /// Permission bits (see [`mode`])
    pub mode: u32,
    /// Size in bytes
    pub size: u64,
    /// Bytes actually used on the backing store
    pub used: u64,
    /// Time of last access
    pub atime: TimeSpec,
    /// Time of last data modification
    pub mtime: TimeSpec,
    /// Time of last attribute change
    pub ctime: TimeSpec,
}

/// Volume statistics reported by the `statfs` callback.
#[derive(Copy, Clone, Debug, Default)]
pub struct StatFs {
    /// Free bytes
    pub free: u64,
    /// Total bytes
    pub size: u64,
}

/// Whether a filesystem supports mutation.
///
/// Drives the read-only mount flag derivation: a `ReadOnly` filesystem is
/// mounted with the host's read-only flag so the kernel rejects writes
/// before they reach the callbacks.
pub enum Capabilities {
    /// Only the read-side callbacks are implemented
    ReadOnly,
    /// The write-side callbacks are implemented too
    ReadWrite,
}

/// The set of callbacks an application implements to expose a filesystem.
pub trait KfsFileSystem: Send + Sync {
    /// Volume statistics for the filesystem containing `path`.
    fn statfs(&self, path: &str) -> Result<StatFs, Errno> {
        let _ = path;
        Err(libc::ENOTSUP)
    }

    /// Attributes of the object at `path`. Must not follow symbolic links.
    fn stat(&self, path: &str) -> Result<Stat, Errno> {
        let _ = path;
        Err(libc::ENOTSUP)
    }

    /// Reads up to `buf.len()` bytes from `path` starting at `offset`.
    /// Returns the number of bytes read; 0 signals end of file.
    fn read(&self, path: &str, buf: &mut [u8], offset: u64) -> Result<usize, Errno> {
        let _ = (path, buf, offset);
        Err(libc::ENOTSUP)
    }

    /// Writes `buf` to `path` starting at `offset`. Returns the number of
    /// bytes written.
    fn write(&self, path: &str, buf: &[u8], offset: u64) -> Result<usize, Errno> {
        let _ = (path, buf, offset);
        Err(libc::ENOTSUP)
    }

    /// Creates a symbolic link at `path` pointing at `target`.
    fn symlink(&self, path: &str, target: &str) -> Result<(), Errno> {
        let _ = (path, target);
        Err(libc::ENOTSUP)
    }

    /// Returns the target of the symbolic link at `path`.
    fn readlink(&self, path: &str) -> Result<String, Errno> {
        let _ = path;
        Err(libc::ENOTSUP)
    }

    /// Creates an empty regular file at `path`.
    fn create(&self, path: &str) -> Result<(), Errno> {
        let _ = path;
        Err(libc::ENOTSUP)
    }

    /// Removes the file at `path`.
    fn remove(&self, path: &str) -> Result<(), Errno> {
        let _ = path;
        Err(libc::ENOTSUP)
    }

    /// Moves the object at `path` to `new_path`. Both paths are within the
    /// same filesystem.
    fn rename(&self, path: &str, new_path: &str) -> Result<(), Errno> {
        let _ = (path, new_path);
        Err(libc::ENOTSUP)
    }

    /// Resizes the file at `path` to `size` bytes.
    fn truncate(&self, path: &str, size: u64) -> Result<(), Errno> {
        let _ = (path, size);
        Err(libc::ENOTSUP)
    }

    /// Changes the permission bits of `path` (see [`mode`]).
    fn chmod(&self, path: &str, mode: u32) -> Result<(), Errno> {
        let _ = (path, mode);
        Err(libc::ENOTSUP)
    }

    /// Changes the access and/or modification times of `path`. A time that
    /// should not change is passed as `None`.
    fn utimes(
        &self,
        path: &str,
        atime: Option<&TimeSpec>,
        mtime: Option<&TimeSpec>,
    ) -> Result<(), Errno> {
        let _ = (path, atime, mtime);
        Err(libc::ENOTSUP)
    }

    /// Creates a directory at `path`.
    fn mkdir(&self, path: &str) -> Result<(), Errno> {
        let _ = path;
        Err(libc::ENOTSUP)
    }

    /// Removes the directory at `path`.
    fn rmdir(&self, path: &str) -> Result<(), Errno> {
        let _ = path;
        Err(libc::ENOTSUP)
    }

    /// Lists the directory at `path` by appending entry names to
    /// `contents`.
    fn readdir(&self, path: &str, contents: &mut Contents) -> Result<(), Errno> {
        let _ = (path, contents);
        Err(libc::ENOTSUP)
    }

    /// Declares whether this filesystem supports mutation.
    fn capabilities(&self) -> Capabilities {
        Capabilities::ReadWrite
    }
}
