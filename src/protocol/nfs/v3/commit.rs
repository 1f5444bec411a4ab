//! `COMMIT` procedure (procedure 21), RFC 1813 section 3.3.21.
//!
//! Every WRITE already replies `FILE_SYNC`, so there is never anything for
//! the client to commit; the procedure is answered with
//! `NFS3ERR_NOTSUPP`.

use std::io::Write;

use tracing::debug;

use crate::protocol::xdr::{self, nfs3, Serialize};

/// Handles `NFSv3` `COMMIT` procedure (procedure 21).
pub fn nfsproc3_commit(xid: u32, output: &mut impl Write) -> Result<(), anyhow::Error> {
    debug!("nfsproc3_commit({:?}) --> NOTSUPP", xid);
    xdr::rpc::make_success_reply(xid).serialize(output)?;
    nfs3::nfsstat3::NFS3ERR_NOTSUPP.serialize(output)?;
    nfs3::wcc_data::default().serialize(output)?;
    Ok(())
}
