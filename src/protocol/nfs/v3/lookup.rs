//! Implementation of the `LOOKUP` procedure (procedure 3) for NFS version 3
//! as defined in RFC 1813 section 3.3.3.
//!
//! `LOOKUP` translates a name within a directory into a file handle. The
//! child path is composed from the directory's registry path, a fresh or
//! existing file id is taken from the registry, and the handle plus the
//! object's attributes are returned. The object must actually stat: a
//! missing child surfaces as `NFS3ERR_NOENT` rather than a dangling handle.

use std::io::{Read, Write};

use tracing::{debug, error};

use crate::fileid;
use crate::protocol::rpc;
use crate::protocol::xdr::{self, deserialize, nfs3, Serialize};

use super::{attr, handle, status};

const LOOKUP_STATUSES: [nfs3::nfsstat3; 8] = [
    nfs3::nfsstat3::NFS3_OK,
    nfs3::nfsstat3::NFS3ERR_IO,
    nfs3::nfsstat3::NFS3ERR_NOENT,
    nfs3::nfsstat3::NFS3ERR_ACCES,
    nfs3::nfsstat3::NFS3ERR_NAMETOOLONG,
    nfs3::nfsstat3::NFS3ERR_STALE,
    nfs3::nfsstat3::NFS3ERR_BADHANDLE,
    nfs3::nfsstat3::NFS3ERR_SERVERFAULT,
];

/// Handles `NFSv3` `LOOKUP` procedure (procedure 3).
pub fn nfsproc3_lookup(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    _context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let args = deserialize::<nfs3::diropargs3>(input)?;
    debug!("nfsproc3_lookup({:?},{:?})", xid, args);

    let resolved = match handle::resolve(&args.dir) {
        Ok(resolved) => resolved,
        Err(stat) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            stat.serialize(output)?;
            // resfail: post-op attributes of the directory, not populated
            nfs3::post_op_attr::Void.serialize(output)?;
            return Ok(());
        }
    };

    let fspath = handle::child_path(&resolved.path, &args.name);
    let object = handle::encode(resolved.fsid, fileid::fileid(resolved.fsid, &fspath));

    match attr::get_fattr(&object) {
        Ok(fattr) => {
            debug!(" {:?} --> {:?}", xid, object);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            nfs3::nfsstat3::NFS3_OK.serialize(output)?;
            object.serialize(output)?;
            nfs3::post_op_attr::attributes(fattr).serialize(output)?;
            nfs3::post_op_attr::Void.serialize(output)?;
        }
        Err(stat) => {
            let stat = status::filter(stat, &LOOKUP_STATUSES);
            error!("nfsproc3_lookup error {:?} --> {:?}", xid, stat);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            stat.serialize(output)?;
            nfs3::post_op_attr::Void.serialize(output)?;
        }
    }
    Ok(())
}
