//! Implementation of the `PATHCONF` procedure (procedure 20) for NFS
//! version 3 as defined in RFC 1813 section 3.3.20.
//!
//! Constant answers for every mount. The case-insensitivity flag is
//! advisory for the client; the server's actual behavior is whatever the
//! callbacks implement.

use std::io::{Read, Write};

use tracing::debug;

use crate::protocol::rpc;
use crate::protocol::xdr::{self, deserialize, nfs3, Serialize};

const LINK_MAX: u32 = 32767;
const NAME_MAX: u32 = 255;

/// Handles `NFSv3` `PATHCONF` procedure (procedure 20).
pub fn nfsproc3_pathconf(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    _context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let object = deserialize::<nfs3::nfs_fh3>(input)?;
    debug!("nfsproc3_pathconf({:?},{:?})", xid, object);

    let res = nfs3::fs::PATHCONF3resok {
        obj_attributes: nfs3::post_op_attr::Void,
        linkmax: LINK_MAX,
        name_max: NAME_MAX,
        no_trunc: true,
        chown_restricted: false,
        case_insensitive: true,
        case_preserving: true,
    };
    xdr::rpc::make_success_reply(xid).serialize(output)?;
    nfs3::nfsstat3::NFS3_OK.serialize(output)?;
    res.serialize(output)?;
    Ok(())
}
