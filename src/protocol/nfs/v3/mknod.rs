//! `MKNOD` procedure (procedure 11), RFC 1813 section 3.3.11.
//!
//! Special file creation has no counterpart in the callback contract, so
//! the procedure is answered with `NFS3ERR_NOTSUPP` without decoding its
//! arguments.

use std::io::Write;

use tracing::debug;

use crate::protocol::xdr::{self, nfs3, Serialize};

/// Handles `NFSv3` `MKNOD` procedure (procedure 11).
pub fn nfsproc3_mknod(xid: u32, output: &mut impl Write) -> Result<(), anyhow::Error> {
    debug!("nfsproc3_mknod({:?}) --> NOTSUPP", xid);
    xdr::rpc::make_success_reply(xid).serialize(output)?;
    nfs3::nfsstat3::NFS3ERR_NOTSUPP.serialize(output)?;
    nfs3::wcc_data::default().serialize(output)?;
    Ok(())
}
