//! Implementation of the `READ` procedure (procedure 6) for NFS version 3
//! as defined in RFC 1813 section 3.3.6.
//!
//! `READ` fetches a byte range from a regular file through the `read`
//! callback. The requested count is clamped to `READ_MAX_LEN`, which is
//! also the rtmax the server advertises in FSINFO. End of file is reported
//! when the callback returns zero bytes.

use std::io::{Read, Write};

use tracing::{debug, error};

use crate::protocol::rpc;
use crate::protocol::xdr::{self, deserialize, nfs3, Serialize};

use super::{handle, status, READ_MAX_LEN};

const READ_STATUSES: [nfs3::nfsstat3; 8] = [
    nfs3::nfsstat3::NFS3_OK,
    nfs3::nfsstat3::NFS3ERR_IO,
    nfs3::nfsstat3::NFS3ERR_NXIO,
    nfs3::nfsstat3::NFS3ERR_ACCES,
    nfs3::nfsstat3::NFS3ERR_INVAL,
    nfs3::nfsstat3::NFS3ERR_STALE,
    nfs3::nfsstat3::NFS3ERR_BADHANDLE,
    nfs3::nfsstat3::NFS3ERR_SERVERFAULT,
];

/// Handles `NFSv3` `READ` procedure (procedure 6).
pub fn nfsproc3_read(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    _context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let args = deserialize::<nfs3::file::READ3args>(input)?;
    debug!("nfsproc3_read({:?},{:?})", xid, args);

    let resolved = match handle::resolve(&args.file) {
        Ok(resolved) => resolved,
        Err(stat) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            stat.serialize(output)?;
            nfs3::post_op_attr::Void.serialize(output)?;
            return Ok(());
        }
    };

    let rsize = (args.count as usize).min(READ_MAX_LEN);
    let mut buffer = vec![0_u8; rsize];
    match resolved.desc.fs.read(&resolved.path, &mut buffer, args.offset) {
        Ok(count) => {
            buffer.truncate(count);
            debug!(" {:?} --> {} bytes", xid, count);
            let res = nfs3::file::READ3resok {
                file_attributes: nfs3::post_op_attr::Void,
                count: count as nfs3::count3,
                eof: count == 0,
                data: buffer,
            };
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            nfs3::nfsstat3::NFS3_OK.serialize(output)?;
            res.serialize(output)?;
        }
        Err(err) => {
            let stat =
                status::filter(status::from_errno(err, nfs3::nfsstat3::NFS3ERR_IO), &READ_STATUSES);
            error!("nfsproc3_read error {:?} --> {:?}", xid, stat);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            stat.serialize(output)?;
            nfs3::post_op_attr::Void.serialize(output)?;
        }
    }
    Ok(())
}
