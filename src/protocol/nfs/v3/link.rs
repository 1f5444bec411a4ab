//! `LINK` procedure (procedure 15), RFC 1813 section 3.3.15.
//!
//! Hard links are unsupported, so the procedure is answered with
//! `NFS3ERR_NOTSUPP` without decoding its arguments.

use std::io::Write;

use tracing::debug;

use crate::protocol::xdr::{self, nfs3, Serialize};

/// Handles `NFSv3` `LINK` procedure (procedure 15).
pub fn nfsproc3_link(xid: u32, output: &mut impl Write) -> Result<(), anyhow::Error> {
    debug!("nfsproc3_link({:?}) --> NOTSUPP", xid);
    xdr::rpc::make_success_reply(xid).serialize(output)?;
    nfs3::nfsstat3::NFS3ERR_NOTSUPP.serialize(output)?;
    nfs3::post_op_attr::Void.serialize(output)?;
    nfs3::wcc_data::default().serialize(output)?;
    Ok(())
}
