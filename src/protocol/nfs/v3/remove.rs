//! Implementation of the `REMOVE` procedure (procedure 12) for NFS
//! version 3 as defined in RFC 1813 section 3.3.12.
//!
//! `REMOVE` deletes a file through the `remove` callback. The file's
//! registry id is left in place by policy: an outstanding handle to the
//! removed file turns into a dangling id whose callbacks fail naturally
//! with `NOENT` on the now-missing path.

use std::io::{Read, Write};

use tracing::{debug, error};

use crate::protocol::rpc;
use crate::protocol::xdr::{self, deserialize, nfs3, Serialize};

use super::{handle, status};

const REMOVE_STATUSES: [nfs3::nfsstat3; 11] = [
    nfs3::nfsstat3::NFS3_OK,
    nfs3::nfsstat3::NFS3ERR_NOENT,
    nfs3::nfsstat3::NFS3ERR_IO,
    nfs3::nfsstat3::NFS3ERR_ACCES,
    nfs3::nfsstat3::NFS3ERR_NOTDIR,
    nfs3::nfsstat3::NFS3ERR_NAMETOOLONG,
    nfs3::nfsstat3::NFS3ERR_ROFS,
    nfs3::nfsstat3::NFS3ERR_STALE,
    nfs3::nfsstat3::NFS3ERR_BADHANDLE,
    nfs3::nfsstat3::NFS3ERR_NOTSUPP,
    nfs3::nfsstat3::NFS3ERR_SERVERFAULT,
];

/// Handles `NFSv3` `REMOVE` procedure (procedure 12).
pub fn nfsproc3_remove(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    _context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let args = deserialize::<nfs3::diropargs3>(input)?;
    debug!("nfsproc3_remove({:?},{:?})", xid, args);

    let resolved = match handle::resolve(&args.dir) {
        Ok(resolved) => resolved,
        Err(stat) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            stat.serialize(output)?;
            nfs3::wcc_data::default().serialize(output)?;
            return Ok(());
        }
    };

    let fspath = handle::child_path(&resolved.path, &args.name);
    let stat = match resolved.desc.fs.remove(&fspath) {
        Ok(()) => nfs3::nfsstat3::NFS3_OK,
        Err(err) => {
            status::filter(status::from_errno(err, nfs3::nfsstat3::NFS3ERR_IO), &REMOVE_STATUSES)
        }
    };

    if stat != nfs3::nfsstat3::NFS3_OK {
        error!("nfsproc3_remove error {:?} --> {:?}", xid, stat);
    }
    xdr::rpc::make_success_reply(xid).serialize(output)?;
    stat.serialize(output)?;
    nfs3::wcc_data::default().serialize(output)?;
    Ok(())
}
