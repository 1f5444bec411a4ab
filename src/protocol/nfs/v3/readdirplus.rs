//! `READDIRPLUS` procedure (procedure 17), RFC 1813 section 3.3.17.
//!
//! Answered with `NFS3ERR_NOTSUPP`; clients fall back to READDIR plus
//! per-entry LOOKUP, which this server serves fully.

use std::io::Write;

use tracing::debug;

use crate::protocol::xdr::{self, nfs3, Serialize};

/// Handles `NFSv3` `READDIRPLUS` procedure (procedure 17).
pub fn nfsproc3_readdirplus(xid: u32, output: &mut impl Write) -> Result<(), anyhow::Error> {
    debug!("nfsproc3_readdirplus({:?}) --> NOTSUPP", xid);
    xdr::rpc::make_success_reply(xid).serialize(output)?;
    nfs3::nfsstat3::NFS3ERR_NOTSUPP.serialize(output)?;
    nfs3::post_op_attr::Void.serialize(output)?;
    Ok(())
}
