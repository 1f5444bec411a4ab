//! Implementation of the `RENAME` procedure (procedure 14) for NFS
//! version 3 as defined in RFC 1813 section 3.3.14.
//!
//! `RENAME` moves an object within one filesystem. Both directory handles
//! must resolve to the same mount; cross-mount renames answer
//! `NFS3ERR_BADHANDLE`, which is how the engine enforces its no-XDEV
//! policy. After the callback succeeds the registry ids of the source and
//! destination paths are swapped, so an outstanding handle to the source
//! keeps resolving to the file at its new location, while a handle that
//! pointed at an overwritten destination now names the vacated source path
//! and dies cleanly in the callbacks.

use std::io::{Read, Write};

use tracing::{debug, error};

use crate::fileid;
use crate::protocol::rpc;
use crate::protocol::xdr::{self, deserialize, nfs3, Serialize};

use super::{handle, status};

const RENAME_STATUSES: [nfs3::nfsstat3; 19] = [
    nfs3::nfsstat3::NFS3_OK,
    nfs3::nfsstat3::NFS3ERR_NOENT,
    nfs3::nfsstat3::NFS3ERR_IO,
    nfs3::nfsstat3::NFS3ERR_ACCES,
    nfs3::nfsstat3::NFS3ERR_EXIST,
    nfs3::nfsstat3::NFS3ERR_XDEV,
    nfs3::nfsstat3::NFS3ERR_NOTDIR,
    nfs3::nfsstat3::NFS3ERR_ISDIR,
    nfs3::nfsstat3::NFS3ERR_INVAL,
    nfs3::nfsstat3::NFS3ERR_NOSPC,
    nfs3::nfsstat3::NFS3ERR_ROFS,
    nfs3::nfsstat3::NFS3ERR_MLINK,
    nfs3::nfsstat3::NFS3ERR_NAMETOOLONG,
    nfs3::nfsstat3::NFS3ERR_NOTEMPTY,
    nfs3::nfsstat3::NFS3ERR_DQUOT,
    nfs3::nfsstat3::NFS3ERR_STALE,
    nfs3::nfsstat3::NFS3ERR_BADHANDLE,
    nfs3::nfsstat3::NFS3ERR_NOTSUPP,
    nfs3::nfsstat3::NFS3ERR_SERVERFAULT,
];

/// Handles `NFSv3` `RENAME` procedure (procedure 14).
pub fn nfsproc3_rename(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    _context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let from = deserialize::<nfs3::diropargs3>(input)?;
    let to = deserialize::<nfs3::diropargs3>(input)?;
    debug!("nfsproc3_rename({:?},{:?},{:?})", xid, from, to);

    let stat = match (handle::resolve(&from.dir), handle::resolve(&to.dir)) {
        (Ok(from_dir), Ok(to_dir))
            if from_dir.fsid == to_dir.fsid
                && std::sync::Arc::ptr_eq(&from_dir.desc, &to_dir.desc) =>
        {
            let from_fspath = handle::child_path(&from_dir.path, &from.name);
            let to_fspath = handle::child_path(&to_dir.path, &to.name);
            match from_dir.desc.fs.rename(&from_fspath, &to_fspath) {
                Ok(()) => {
                    // swap ids so outstanding handles for the source aren't
                    // stale. the destination has been replaced, so swapping
                    // (rather than minting a fresh id for it) is fine: the
                    // client shouldn't use the destination's old handle any
                    // more, and if it does, the callbacks reject the path.
                    fileid::swap(
                        from_dir.fsid,
                        fileid::fileid(from_dir.fsid, &from_fspath),
                        fileid::fileid(to_dir.fsid, &to_fspath),
                    );
                    nfs3::nfsstat3::NFS3_OK
                }
                Err(err) => status::filter(
                    status::from_errno(err, nfs3::nfsstat3::NFS3ERR_IO),
                    &RENAME_STATUSES,
                ),
            }
        }
        _ => nfs3::nfsstat3::NFS3ERR_BADHANDLE,
    };

    if stat != nfs3::nfsstat3::NFS3_OK {
        error!("nfsproc3_rename error {:?} --> {:?}", xid, stat);
    }
    xdr::rpc::make_success_reply(xid).serialize(output)?;
    stat.serialize(output)?;
    nfs3::wcc_data::default().serialize(output)?; // fromdir_wcc
    nfs3::wcc_data::default().serialize(output)?; // todir_wcc
    Ok(())
}
