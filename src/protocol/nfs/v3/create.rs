//! Implementation of the `CREATE` procedure (procedure 8) for NFS version 3
//! as defined in RFC 1813 section 3.3.8.
//!
//! `CREATE` makes a new regular file. UNCHECKED mode creates
//! unconditionally; GUARDED first probes with `stat` and fails with
//! `NFS3ERR_EXIST` if the name is taken; EXCLUSIVE is not supported (no
//! verifier storage exists to make it idempotent). After a successful
//! create the initial attributes are applied, and if that fails the engine
//! removes the just-created file again, best effort, and reports the
//! attribute failure.

use std::io::{Read, Write};

use tracing::{debug, error};

use crate::fileid;
use crate::protocol::rpc;
use crate::protocol::xdr::{self, deserialize, nfs3, Serialize};

use super::{attr, handle, status};

const CREATE_STATUSES: [nfs3::nfsstat3; 13] = [
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
    error!("nfsproc3_create error {:?} --> {:?}", xid, stat);
    xdr::rpc::make_success_reply(xid).serialize(output)?;
    stat.serialize(output)?;
    nfs3::wcc_data::default().serialize(output)?;
    Ok(())
}

/// Handles `NFSv3` `CREATE` procedure (procedure 8).
pub fn nfsproc3_create(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    _context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let args = deserialize::<nfs3::CREATE3args>(input)?;
    debug!("nfsproc3_create({:?},{:?})", xid, args);

    let resolved = match handle::resolve(&args.dirops.dir) {
        Ok(resolved) => resolved,
        Err(stat) => return fail(xid, stat, output),
    };

    let fspath = handle::child_path(&resolved.path, &args.dirops.name);
    let object = handle::encode(resolved.fsid, fileid::fileid(resolved.fsid, &fspath));

    let attrs = match args.how {
        nfs3::createhow3::UNCHECKED(attrs) => attrs,
        nfs3::createhow3::GUARDED(attrs) => {
            if attr::get_fattr(&object).is_ok() {
                return fail(xid, nfs3::nfsstat3::NFS3ERR_EXIST, output);
            }
            attrs
        }
        nfs3::createhow3::EXCLUSIVE(_) => {
            return fail(xid, nfs3::nfsstat3::NFS3ERR_NOTSUPP, output);
        }
    };

    if let Err(err) = resolved.desc.fs.create(&fspath) {
        let stat =
            status::filter(status::from_errno(err, nfs3::nfsstat3::NFS3ERR_IO), &CREATE_STATUSES);
        return fail(xid, stat, output);
    }

    let setstatus = status::filter(attr::set_fattr(&object, &attrs), &CREATE_STATUSES);
    if setstatus != nfs3::nfsstat3::NFS3_OK {
        // best-effort rollback
        let _ = resolved.desc.fs.remove(&fspath);
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
