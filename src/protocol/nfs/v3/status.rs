//! Translation of callback errno values into NFS status codes.
//!
//! Callbacks fail with host errno values; a fixed table maps the portable
//! ones onto their NFSv3 counterparts and anything unmapped becomes the
//! calling procedure's default. Each procedure additionally declares the
//! set of codes RFC 1813 allows it to return, and a mapped status outside
//! that set is replaced with `NFS3ERR_SERVERFAULT` so a misbehaving
//! callback cannot leak an NFS-inappropriate status to the client.

use crate::protocol::xdr::nfs3::nfsstat3;
use crate::vfs::Errno;

/// Maps a host errno onto an NFS status, falling back to `default` for
/// anything outside the fixed table.
pub fn from_errno(err: Errno, default: nfsstat3) -> nfsstat3 {
    match err {
        libc::EPERM => nfsstat3::NFS3ERR_PERM,
        libc::ENOENT => nfsstat3::NFS3ERR_NOENT,
        libc::EIO => nfsstat3::NFS3ERR_IO,
        libc::ENXIO => nfsstat3::NFS3ERR_NXIO,
        libc::EACCES => nfsstat3::NFS3ERR_ACCES,
        libc::EEXIST => nfsstat3::NFS3ERR_EXIST,
        libc::EXDEV => nfsstat3::NFS3ERR_XDEV,
        libc::ENODEV => nfsstat3::NFS3ERR_NODEV,
        libc::ENOTDIR => nfsstat3::NFS3ERR_NOTDIR,
        libc::EISDIR => nfsstat3::NFS3ERR_ISDIR,
        libc::EINVAL => nfsstat3::NFS3ERR_INVAL,
        libc::EFBIG => nfsstat3::NFS3ERR_FBIG,
        libc::ENOSPC => nfsstat3::NFS3ERR_NOSPC,
        libc::EROFS => nfsstat3::NFS3ERR_ROFS,
        libc::EMLINK => nfsstat3::NFS3ERR_MLINK,
        libc::ENAMETOOLONG => nfsstat3::NFS3ERR_NAMETOOLONG,
        libc::ENOTEMPTY => nfsstat3::NFS3ERR_NOTEMPTY,
        libc::EDQUOT => nfsstat3::NFS3ERR_DQUOT,
        _ => default,
    }
}

/// Replaces a status outside `allowed` with `NFS3ERR_SERVERFAULT`.
pub fn filter(status: nfsstat3, allowed: &[nfsstat3]) -> nfsstat3 {
    if allowed.contains(&status) {
        status
    } else {
        nfsstat3::NFS3ERR_SERVERFAULT
    }
}
