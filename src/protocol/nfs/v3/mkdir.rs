//! Implementation of the `MKDIR` procedure (procedure 9) for NFS version 3
//! as defined in RFC 1813 section 3.3.9.
//!
//! `MKDIR` has the same shape as CREATE without the creation modes: create
//! the directory, apply the initial attributes, and remove the directory
//! again (best effort) when the attribute application fails.

use std::io::{Read, Write};

use tracing::{debug, error};

use crate::fileid;
use crate::protocol::rpc;
use crate::protocol::xdr::{self, deserialize, nfs3, Serialize};

use super::{attr, handle, status};

const MKDIR_STATUSES: [nfs3::nfsstat3; 13] = [
    nfs3::nfsstat3::NFS3_OK,
    nfs3::nfsstat3::NFS3ERR_IO,
    nfs3::nfsstat3::NFS3ERR_ACCES,
    nfs3::nfsstat3::NFS3ERR_EXIST,
    nfs3::nfsstat3::NFS3ERR_NOTDIR,
    nfs3::nfsstat3::NFS3ERR_NOSPC,
    nfs3::nfsstat3::NFS3ERR_ROFS,
    nfs3::nfsstat3::NFS3ERR_NAMETOOLONG,
    nfs3::nfsstat3::NFS3ERR_DQUOT,
    nfs3::nfsstat3::NFS3ERR_STALE,
    nfs3::nfsstat3::NFS3ERR_BADHANDLE,
    nfs3::nfsstat3::NFS3ERR_NOTSUPP,
    nfs3::nfsstat3::NFS3ERR_SERVERFAULT,
];

fn fail(
    xid: u32,
    stat: nfs3::nfsstat3,
    output: &mut impl Write,
) -> Result<(), anyhow::Error> {
    error!("nfsproc3_mkdir error {:?} --> {:?}", xid, stat);
    xdr::rpc::make_success_reply(xid).serialize(output)?;
    stat.serialize(output)?;
    nfs3::wcc_data::default().serialize(output)?;
    Ok(())
}

/// Handles `NFSv3` `MKDIR` procedure (procedure 9).
pub fn nfsproc3_mkdir(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    _context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let args = deserialize::<nfs3::dir::MKDIR3args>(input)?;
    debug!("nfsproc3_mkdir({:?},{:?})", xid, args);

    let resolved = match handle::resolve(&args.dirops.dir) {
        Ok(resolved) => resolved,
        Err(stat) => return fail(xid, stat, output),
    };

    let fspath = handle::child_path(&resolved.path, &args.dirops.name);
    let object = handle::encode(resolved.fsid, fileid::fileid(resolved.fsid, &fspath));

    if let Err(err) = resolved.desc.fs.mkdir(&fspath) {
        let stat =
            status::filter(status::from_errno(err, nfs3::nfsstat3::NFS3ERR_IO), &MKDIR_STATUSES);
        return fail(xid, stat, output);
    }

    let setstatus = status::filter(attr::set_fattr(&object, &args.attributes), &MKDIR_STATUSES);
    if setstatus != nfs3::nfsstat3::NFS3_OK {
        // best-effort rollback
        let _ = resolved.desc.fs.rmdir(&fspath);
        return fail(xid, setstatus, output);
    }

    debug!(" {:?} --> {:?}", xid, object);
    let obj_attributes = match attr::get_fattr(&object) {
        Ok(fattr) => nfs3::post_op_attr::attributes(fattr),
        Err(_) => nfs3::post_op_attr::Void,
    };
    xdr::rpc::make_success_reply(xid).serialize(output)?;
    nfs3::nfsstat3::NFS3_OK.serialize(output)?;
    nfs3::post_op_fh3::handle(object).serialize(output)?;
    obj_attributes.serialize(output)?;
    nfs3::wcc_data::default().serialize(output)?;
    Ok(())
}
