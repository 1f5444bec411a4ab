//! Implementation of the `ACCESS` procedure (procedure 4) for NFS version 3
//! as defined in RFC 1813 section 3.3.4.
//!
//! `ACCESS` reports which of the requested access rights the caller holds.
//! The answer is computed from the object's mode bits against the calling
//! process's uid/gid: the first matching permission class (owner, then
//! group, then other) decides each of read, write and execute. The call
//! itself always succeeds; an object that cannot be stat'ed simply grants
//! nothing.

use std::io::{Read, Write};

use tracing::debug;

use crate::protocol::rpc;
use crate::protocol::xdr::{self, deserialize, nfs3, Serialize};

use super::attr;

const NFS_IRUSR: u32 = 0x00100;
const NFS_IWUSR: u32 = 0x00080;
const NFS_IXUSR: u32 = 0x00040;
const NFS_IRGRP: u32 = 0x00020;
const NFS_IWGRP: u32 = 0x00010;
const NFS_IXGRP: u32 = 0x00008;
const NFS_IROTH: u32 = 0x00004;
const NFS_IWOTH: u32 = 0x00002;
const NFS_IXOTH: u32 = 0x00001;

/// Handles `NFSv3` `ACCESS` procedure (procedure 4).
pub fn nfsproc3_access(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    _context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let args = deserialize::<nfs3::ACCESS3args>(input)?;
    debug!("nfsproc3_access({:?},{:?})", xid, args);

    let attrs = attr::get_fattr(&args.object).unwrap_or_default();
    let uid = attr::process_uid();
    let gid = attr::process_gid();

    let flags_read = nfs3::ACCESS3_READ;
    let flags_write = nfs3::ACCESS3_MODIFY | nfs3::ACCESS3_EXTEND | nfs3::ACCESS3_DELETE;
    let flags_execute = nfs3::ACCESS3_EXECUTE | nfs3::ACCESS3_LOOKUP;

    let mut flags = 0;
    if attrs.mode & NFS_IRUSR != 0 && attrs.uid == uid {
        flags |= flags_read;
    } else if attrs.mode & NFS_IRGRP != 0 && attrs.gid == gid {
        flags |= flags_read;
    } else if attrs.mode & NFS_IROTH != 0 {
        flags |= flags_read;
    }

    if attrs.mode & NFS_IWUSR != 0 && attrs.uid == uid {
        flags |= flags_write;
    } else if attrs.mode & NFS_IWGRP != 0 && attrs.gid == gid {
        flags |= flags_write;
    } else if attrs.mode & NFS_IWOTH != 0 {
        flags |= flags_write;
    }

    if attrs.mode & NFS_IXUSR != 0 && attrs.uid == uid {
        flags |= flags_execute;
    } else if attrs.mode & NFS_IXGRP != 0 && attrs.gid == gid {
        flags |= flags_execute;
    } else if attrs.mode & NFS_IXOTH != 0 {
        flags |= flags_execute;
    }

    debug!(" {:?} --> {:#x}", xid, flags);
    xdr::rpc::make_success_reply(xid).serialize(output)?;
    nfs3::nfsstat3::NFS3_OK.serialize(output)?;
    nfs3::post_op_attr::Void.serialize(output)?;
    flags.serialize(output)?;
    Ok(())
}
