//! Implementation of the `GETATTR` procedure (procedure 1) for NFS version 3
//! as defined in RFC 1813 section 3.3.1.
//!
//! `GETATTR` resolves a file handle and returns the complete `fattr3` for
//! the object it names. Clients call this constantly to validate their
//! attribute caches, so it is the thinnest path through the engine: resolve,
//! one `stat` callback, translate.

use std::io::{Read, Write};

use tracing::{debug, error};

use crate::protocol::rpc;
use crate::protocol::xdr::{self, deserialize, nfs3, Serialize};

use super::attr;

/// Handles `NFSv3` `GETATTR` procedure (procedure 1).
///
/// An unresolvable handle yields `NFS3ERR_BADHANDLE`; a failed `stat`
/// callback is mapped with a default of `NFS3ERR_NOENT`.
pub fn nfsproc3_getattr(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    _context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let handle = deserialize::<nfs3::nfs_fh3>(input)?;
    debug!("nfsproc3_getattr({:?},{:?})", xid, handle);

    match attr::get_fattr(&handle) {
        Ok(fattr) => {
            debug!(" {:?} --> {:?}", xid, fattr);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            nfs3::nfsstat3::NFS3_OK.serialize(output)?;
            fattr.serialize(output)?;
        }
        Err(stat) => {
            error!("nfsproc3_getattr error {:?} --> {:?}", xid, stat);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            stat.serialize(output)?;
        }
    }
    Ok(())
}
