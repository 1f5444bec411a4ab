//! Implementation of the `FSINFO` procedure (procedure 19) for NFS
//! version 3 as defined in RFC 1813 section 3.3.19.
//!
//! The capabilities are fixed for every mount: transfer sizes match the
//! engine's READ/WRITE clamps, the directory preference matches the
//! READDIR entry limit, and the property mask advertises symlinks and
//! settable times but not hard links.

use std::io::{Read, Write};

use tracing::debug;

use crate::protocol::rpc;
use crate::protocol::xdr::{self, deserialize, nfs3, Serialize};

use super::{DIR_MAX_LEN, READ_MAX_LEN, WRITE_MAX_LEN};

/// Handles `NFSv3` `FSINFO` procedure (procedure 19).
pub fn nfsproc3_fsinfo(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    _context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let fsroot = deserialize::<nfs3::nfs_fh3>(input)?;
    debug!("nfsproc3_fsinfo({:?},{:?})", xid, fsroot);

    let res = nfs3::fs::fsinfo3 {
        obj_attributes: nfs3::post_op_attr::Void,
        rtmax: READ_MAX_LEN as u32,
        rtpref: READ_MAX_LEN as u32,
        rtmult: 1,
        wtmax: WRITE_MAX_LEN as u32,
        wtpref: WRITE_MAX_LEN as u32,
        wtmult: 1,
        dtpref: DIR_MAX_LEN as u32,
        maxfilesize: u64::from(u32::MAX),
        time_delta: nfs3::nfstime3 { seconds: 1, nseconds: 0 },
        properties: nfs3::fs::FSF_HOMOGENEOUS | nfs3::fs::FSF_SYMLINK | nfs3::fs::FSF_CANSETTIME,
    };
    xdr::rpc::make_success_reply(xid).serialize(output)?;
    nfs3::nfsstat3::NFS3_OK.serialize(output)?;
    res.serialize(output)?;
    Ok(())
}
