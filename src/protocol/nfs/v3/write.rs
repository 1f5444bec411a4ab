//! Implementation of the `WRITE` procedure (procedure 7) for NFS version 3
//! as defined in RFC 1813 section 3.3.7.
//!
//! `WRITE` pushes a byte range into a regular file through the `write`
//! callback, clamped to `WRITE_MAX_LEN`. The reply always claims
//! `FILE_SYNC` stability: the server treats every write as durable the
//! moment the callback returns, and COMMIT is answered as unsupported.

use std::io::{Read, Write};

use tracing::{debug, error};

use crate::protocol::rpc;
use crate::protocol::xdr::{self, deserialize, nfs3, Serialize};

use super::{handle, status, WRITE_MAX_LEN};

const WRITE_STATUSES: [nfs3::nfsstat3; 11] = [
    nfs3::nfsstat3::NFS3_OK,
    nfs3::nfsstat3::NFS3ERR_IO,
    nfs3::nfsstat3::NFS3ERR_ACCES,
    nfs3::nfsstat3::NFS3ERR_FBIG,
    nfs3::nfsstat3::NFS3ERR_DQUOT,
    nfs3::nfsstat3::NFS3ERR_NOSPC,
    nfs3::nfsstat3::NFS3ERR_ROFS,
    nfs3::nfsstat3::NFS3ERR_INVAL,
    nfs3::nfsstat3::NFS3ERR_STALE,
    nfs3::nfsstat3::NFS3ERR_BADHANDLE,
    nfs3::nfsstat3::NFS3ERR_SERVERFAULT,
];

/// Handles `NFSv3` `WRITE` procedure (procedure 7).
pub fn nfsproc3_write(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    _context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let args = deserialize::<nfs3::file::WRITE3args>(input)?;
    debug!("nfsproc3_write({:?},{},{})", xid, args.offset, args.count);

    let resolved = match handle::resolve(&args.file) {
        Ok(resolved) => resolved,
        Err(stat) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            stat.serialize(output)?;
            nfs3::wcc_data::default().serialize(output)?;
            return Ok(());
        }
    };

    let wsize = (args.count as usize).min(WRITE_MAX_LEN).min(args.data.len());
    match resolved.desc.fs.write(&resolved.path, &args.data[..wsize], args.offset) {
        Ok(count) => {
            debug!(" {:?} --> {} bytes", xid, count);
            let res = nfs3::file::WRITE3resok {
                file_wcc: nfs3::wcc_data::default(),
                count: count as nfs3::count3,
                committed: nfs3::file::stable_how::FILE_SYNC,
                verf: nfs3::writeverf3::default(),
            };
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            nfs3::nfsstat3::NFS3_OK.serialize(output)?;
            res.serialize(output)?;
        }
        Err(err) => {
            let stat = status::filter(
                status::from_errno(err, nfs3::nfsstat3::NFS3ERR_IO),
                &WRITE_STATUSES,
            );
            error!("nfsproc3_write error {:?} --> {:?}", xid, stat);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            stat.serialize(output)?;
            nfs3::wcc_data::default().serialize(output)?;
        }
    }
    Ok(())
}
