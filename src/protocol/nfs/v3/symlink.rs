//! Implementation of the `SYMLINK` procedure (procedure 10) for NFS
//! version 3 as defined in RFC 1813 section 3.3.10.
//!
//! `SYMLINK` creates a symbolic link and then applies the requested
//! attributes. Unlike CREATE and MKDIR there is no rollback when the
//! attribute application fails: a symlink with default attributes is still
//! a usable object, so the link is left in place and the attribute status
//! is reported.

use std::io::{Read, Write};

use tracing::{debug, error};

use crate::fileid;
use crate::protocol::rpc;
use crate::protocol::xdr::{self, deserialize, nfs3, Serialize};

use super::{attr, handle, status};

const SYMLINK_STATUSES: [nfs3::nfsstat3; 13] = [
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
    error!("nfsproc3_symlink error {:?} --> {:?}", xid, stat);
    xdr::rpc::make_success_reply(xid).serialize(output)?;
    stat.serialize(output)?;
    nfs3::wcc_data::default().serialize(output)?;
    Ok(())
}

/// Handles `NFSv3` `SYMLINK` procedure (procedure 10).
pub fn nfsproc3_symlink(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    _context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let args = deserialize::<nfs3::dir::SYMLINK3args>(input)?;
    debug!("nfsproc3_symlink({:?},{:?})", xid, args);

    let resolved = match handle::resolve(&args.dirops.dir) {
        Ok(resolved) => resolved,
        Err(stat) => return fail(xid, stat, output),
    };

    let fspath = handle::child_path(&resolved.path, &args.dirops.name);
    let object = handle::encode(resolved.fsid, fileid::fileid(resolved.fsid, &fspath));
    let target = String::from_utf8_lossy(&args.symlink.symlink_data).into_owned();

    if let Err(err) = resolved.desc.fs.symlink(&fspath, &target) {
        let stat =
            status::filter(status::from_errno(err, nfs3::nfsstat3::NFS3ERR_IO), &SYMLINK_STATUSES);
        return fail(xid, stat, output);
    }

    let setstatus =
        status::filter(attr::set_fattr(&object, &args.symlink.symlink_attributes), &SYMLINK_STATUSES);
    if setstatus != nfs3::nfsstat3::NFS3_OK {
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
