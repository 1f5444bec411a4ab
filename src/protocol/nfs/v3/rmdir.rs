//! Implementation of the `RMDIR` procedure (procedure 13) for NFS
//! version 3 as defined in RFC 1813 section 3.3.13.
//!
//! `RMDIR` deletes a directory through the `rmdir` callback. A non-empty
//! directory surfaces as `NFS3ERR_NOTEMPTY`. Like REMOVE, the directory's
//! registry id is not invalidated.

use std::io::{Read, Write};

use tracing::{debug, error};

use crate::protocol::rpc;
use crate::protocol::xdr::{self, deserialize, nfs3, Serialize};

use super::{handle, status};

const RMDIR_STATUSES: [nfs3::nfsstat3; 14] = [
    nfs3::nfsstat3::NFS3_OK,
    nfs3::nfsstat3::NFS3ERR_NOENT,
    nfs3::nfsstat3::NFS3ERR_IO,
    nfs3::nfsstat3::NFS3ERR_ACCES,
    nfs3::nfsstat3::NFS3ERR_INVAL,
    nfs3::nfsstat3::NFS3ERR_EXIST,
    nfs3::nfsstat3::NFS3ERR_NOTDIR,
    nfs3::nfsstat3::NFS3ERR_NAMETOOLONG,
    nfs3::nfsstat3::NFS3ERR_ROFS,
    nfs3::nfsstat3::NFS3ERR_NOTEMPTY,
    nfs3::nfsstat3::NFS3ERR_STALE,
    nfs3::nfsstat3::NFS3ERR_BADHANDLE,
    nfs3::nfsstat3::NFS3ERR_NOTSUPP,
    nfs3::nfsstat3::NFS3ERR_SERVERFAULT,
];

/// Handles `NFSv3` `RMDIR` procedure (procedure 13).
pub fn nfsproc3_rmdir(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    _context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let args = deserialize::<nfs3::diropargs3>(input)?;
    debug!("nfsproc3_rmdir({:?},{:?})", xid, args);

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
    let stat = match resolved.desc.fs.rmdir(&fspath) {
        Ok(()) => nfs3::nfsstat3::NFS3_OK,
        Err(err) => {
            status::filter(status::from_errno(err, nfs3::nfsstat3::NFS3ERR_IO), &RMDIR_STATUSES)
        }
    };

    if stat != nfs3::nfsstat3::NFS3_OK {
        error!("nfsproc3_rmdir error {:?} --> {:?}", xid, stat);
    }
    xdr::rpc::make_success_reply(xid).serialize(output)?;
    stat.serialize(output)?;
    nfs3::wcc_data::default().serialize(output)?;
    Ok(())
}
