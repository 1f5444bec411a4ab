//! File handle resolution.
//!
//! Handles issued by this server are printable NUL-terminated
//! `"<fsid>:<fileid>"` strings: the fsid selects a mount table slot and the
//! fileid indexes that mount's path registry. A handle without a `:` is the
//! bootstrap form the mount syscall hands the kernel, just the fsid, and
//! resolves to the root directory `"/"`. The printable form is a debugging
//! convenience; the only contract is that the server round-trips handles it
//! issued.

use std::sync::Arc;

use crate::fileid::{self, FileId};
use crate::protocol::xdr::nfs3;
use crate::table::{self, Descriptor};
use crate::FsId;

/// A file handle resolved against the mount table and the id registry.
pub struct Resolved {
    pub fsid: FsId,
    pub desc: Arc<Descriptor>,
    pub path: Arc<str>,
}

/// Resolves a handle to its filesystem descriptor and path.
///
/// Returns `NFS3ERR_BADHANDLE` when the fsid selects no live mount or the
/// fileid is unknown to the registry.
pub fn resolve(object: &nfs3::nfs_fh3) -> Result<Resolved, nfs3::nfsstat3> {
    let raw = match object.data.iter().position(|&b| b == 0) {
        Some(end) => &object.data[..end],
        None => &object.data[..],
    };
    let text =
        std::str::from_utf8(raw).map_err(|_| nfs3::nfsstat3::NFS3ERR_BADHANDLE)?;

    let (fsid_part, fileid_part) = match text.split_once(':') {
        Some((fsid, fileid)) => (fsid, Some(fileid)),
        None => (text, None),
    };
    let fsid: FsId = fsid_part.parse().unwrap_or(0);
    let desc = table::get(fsid).ok_or(nfs3::nfsstat3::NFS3ERR_BADHANDLE)?;
    let fileid: FileId = match fileid_part {
        Some(part) => part.parse().unwrap_or(0),
        None => fileid::fileid(fsid, "/"),
    };
    let path = fileid::path_from(fsid, fileid).ok_or(nfs3::nfsstat3::NFS3ERR_BADHANDLE)?;
    Ok(Resolved { fsid, desc, path })
}

/// Encodes a handle in the wire form, NUL terminator included.
pub fn encode(fsid: FsId, fileid: FileId) -> nfs3::nfs_fh3 {
    let mut data = format!("{fsid}:{fileid}").into_bytes();
    data.push(0);
    nfs3::nfs_fh3 { data }
}

/// Composes the path of `name` within `dir`. The root directory is the
/// literal `"/"`, so joining under it must not double the slash.
pub fn child_path(dir: &str, name: &nfs3::filename3) -> String {
    let name = String::from_utf8_lossy(name);
    if dir == "/" {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}
