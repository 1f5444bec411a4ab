//! Implementation of the `SETATTR` procedure (procedure 2) for NFS version 3
//! as defined in RFC 1813 section 3.3.2.
//!
//! `SETATTR` changes one or more attributes of an object. The request may
//! carry a guard ctime: when present, the object's current ctime must match
//! exactly or the call fails with `NFS3ERR_NOT_SYNC` and nothing is
//! applied. Attribute application order is truncate, chmod, utimes, with
//! ownership changes accepted only as no-ops (see the attr module).
//!
//! Weak cache consistency data is returned with both sides empty: the
//! pre-op side is never populated by this server, and the post-op side is
//! skipped here as the original does.

use std::io::{Read, Write};

use tracing::{debug, error};

use crate::protocol::rpc;
use crate::protocol::xdr::{self, deserialize, nfs3, Serialize};

use super::attr;

/// Handles `NFSv3` `SETATTR` procedure (procedure 2).
pub fn nfsproc3_setattr(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    _context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let args = deserialize::<nfs3::SETATTR3args>(input)?;
    debug!("nfsproc3_setattr({:?},{:?})", xid, args);

    let mut status = nfs3::nfsstat3::NFS3_OK;

    // guard check: compare the object's ctime before touching anything
    if let nfs3::sattrguard3::obj_ctime(guard_ctime) = args.guard {
        let attrs = attr::get_fattr(&args.object).unwrap_or_default();
        if attrs.ctime.seconds != guard_ctime.seconds
            || attrs.ctime.nseconds != guard_ctime.nseconds
        {
            status = nfs3::nfsstat3::NFS3ERR_NOT_SYNC;
        }
    }

    if status == nfs3::nfsstat3::NFS3_OK {
        status = attr::set_fattr(&args.object, &args.new_attributes);
    }

    if status != nfs3::nfsstat3::NFS3_OK {
        error!("nfsproc3_setattr error {:?} --> {:?}", xid, status);
    }
    xdr::rpc::make_success_reply(xid).serialize(output)?;
    status.serialize(output)?;
    nfs3::wcc_data::default().serialize(output)?;
    Ok(())
}
