//! Implementation of the `FSSTAT` procedure (procedure 18) for NFS
//! version 3 as defined in RFC 1813 section 3.3.18.
//!
//! `FSSTAT` maps the `statfs` callback onto volume byte counts. Inode
//! statistics are reported as zero: the callback contract has no notion of
//! file slots.

use std::io::{Read, Write};

use tracing::{debug, error};

use crate::protocol::rpc;
use crate::protocol::xdr::{self, deserialize, nfs3, Serialize};

use super::{handle, status};

const FSSTAT_STATUSES: [nfs3::nfsstat3; 5] = [
    nfs3::nfsstat3::NFS3_OK,
    nfs3::nfsstat3::NFS3ERR_IO,
    nfs3::nfsstat3::NFS3ERR_STALE,
    nfs3::nfsstat3::NFS3ERR_BADHANDLE,
    nfs3::nfsstat3::NFS3ERR_SERVERFAULT,
];

/// Handles `NFSv3` `FSSTAT` procedure (procedure 18).
pub fn nfsproc3_fsstat(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    _context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let fsroot = deserialize::<nfs3::nfs_fh3>(input)?;
    debug!("nfsproc3_fsstat({:?},{:?})", xid, fsroot);

    let resolved = match handle::resolve(&fsroot) {
        Ok(resolved) => resolved,
        Err(stat) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            stat.serialize(output)?;
            nfs3::post_op_attr::Void.serialize(output)?;
            return Ok(());
        }
    };

    match resolved.desc.fs.statfs(&resolved.path) {
        Ok(sbuf) => {
            debug!(" {:?} --> {:?}", xid, sbuf);
            let res = nfs3::fs::FSSTAT3resok {
                obj_attributes: nfs3::post_op_attr::Void,
                tbytes: sbuf.size,
                fbytes: sbuf.free,
                abytes: sbuf.free,
                tfiles: 0,
                ffiles: 0,
                afiles: 0,
                invarsec: 0,
            };
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            nfs3::nfsstat3::NFS3_OK.serialize(output)?;
            res.serialize(output)?;
        }
        Err(err) => {
            let stat = status::filter(
                status::from_errno(err, nfs3::nfsstat3::NFS3ERR_IO),
                &FSSTAT_STATUSES,
            );
            error!("nfsproc3_fsstat error {:?} --> {:?}", xid, stat);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            stat.serialize(output)?;
            nfs3::post_op_attr::Void.serialize(output)?;
        }
    }
    Ok(())
}
