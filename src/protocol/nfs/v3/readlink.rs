//! Implementation of the `READLINK` procedure (procedure 5) for NFS
//! version 3 as defined in RFC 1813 section 3.3.5.
//!
//! `READLINK` returns the target text of a symbolic link via the
//! `readlink` callback. Targets longer than `PATH_MAX` are truncated.

use std::io::{Read, Write};

use tracing::{debug, error};

use crate::protocol::rpc;
use crate::protocol::xdr::{self, deserialize, nfs3, Serialize};

use super::{handle, status};

const READLINK_STATUSES: [nfs3::nfsstat3; 8] = [
    nfs3::nfsstat3::NFS3_OK,
    nfs3::nfsstat3::NFS3ERR_IO,
    nfs3::nfsstat3::NFS3ERR_INVAL,
    nfs3::nfsstat3::NFS3ERR_ACCES,
    nfs3::nfsstat3::NFS3ERR_STALE,
    nfs3::nfsstat3::NFS3ERR_BADHANDLE,
    nfs3::nfsstat3::NFS3ERR_NOTSUPP,
    nfs3::nfsstat3::NFS3ERR_SERVERFAULT,
];

/// Handles `NFSv3` `READLINK` procedure (procedure 5).
pub fn nfsproc3_readlink(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    _context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let symlink = deserialize::<nfs3::nfs_fh3>(input)?;
    debug!("nfsproc3_readlink({:?},{:?})", xid, symlink);

    let resolved = match handle::resolve(&symlink) {
        Ok(resolved) => resolved,
        Err(stat) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            stat.serialize(output)?;
            nfs3::post_op_attr::Void.serialize(output)?;
            return Ok(());
        }
    };

    match resolved.desc.fs.readlink(&resolved.path) {
        Ok(mut target) => {
            let mut limit = libc::PATH_MAX as usize;
            if target.len() > limit {
                while !target.is_char_boundary(limit) {
                    limit -= 1;
                }
                target.truncate(limit);
            }
            debug!(" {:?} --> {:?}", xid, target);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            nfs3::nfsstat3::NFS3_OK.serialize(output)?;
            nfs3::post_op_attr::Void.serialize(output)?;
            nfs3::nfspath3::from(target.as_str()).serialize(output)?;
        }
        Err(err) => {
            let stat = status::filter(
                status::from_errno(err, nfs3::nfsstat3::NFS3ERR_INVAL),
                &READLINK_STATUSES,
            );
            error!("nfsproc3_readlink error {:?} --> {:?}", xid, stat);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            stat.serialize(output)?;
            nfs3::post_op_attr::Void.serialize(output)?;
        }
    }
    Ok(())
}
