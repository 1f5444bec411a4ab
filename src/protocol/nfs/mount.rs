//! MOUNT program stubs (RFC 1813 Appendix I).
//!
//! The kernel NFS client is bootstrapped through the mount syscall with an
//! already-decided file handle, so no MOUNT traffic is expected; the
//! program is registered only because the RPC wire format references it.
//! Every procedure logs the unexpected request. MNT answers
//! `MNT3ERR_NOTSUPP`; the listing procedures answer empty lists; the
//! notification procedures are void successes.

use std::io::{Read, Write};

use num_traits::cast::FromPrimitive;
use tracing::warn;

use crate::protocol::xdr::{self, mount, Serialize};

/// Dispatches one MOUNT program call to its stub.
pub fn handle_mount(
    xid: u32,
    call: xdr::rpc::call_body,
    _input: &mut impl Read,
    output: &mut impl Write,
) -> Result<(), anyhow::Error> {
    let prog = mount::MountProgram::from_u32(call.proc).unwrap_or(mount::MountProgram::INVALID);

    match prog {
        mount::MountProgram::MOUNTPROC3_NULL => {
            warn!("unexpected request: mountproc3_null");
            xdr::rpc::make_success_reply(xid).serialize(output)?;
        }
        mount::MountProgram::MOUNTPROC3_MNT => {
            warn!("unexpected request: mountproc3_mnt");
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            mount::mountstat3::MNT3ERR_NOTSUPP.serialize(output)?;
        }
        mount::MountProgram::MOUNTPROC3_DUMP => {
            warn!("unexpected request: mountproc3_dump");
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            // empty mountlist
            false.serialize(output)?;
        }
        mount::MountProgram::MOUNTPROC3_UMNT => {
            warn!("unexpected request: mountproc3_umnt");
            xdr::rpc::make_success_reply(xid).serialize(output)?;
        }
        mount::MountProgram::MOUNTPROC3_UMNTALL => {
            warn!("unexpected request: mountproc3_umntall");
            xdr::rpc::make_success_reply(xid).serialize(output)?;
        }
        mount::MountProgram::MOUNTPROC3_EXPORT => {
            warn!("unexpected request: mountproc3_export");
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            // empty exports list
            false.serialize(output)?;
        }
        mount::MountProgram::INVALID => {
            warn!("unknown mount procedure {}", call.proc);
            xdr::rpc::proc_unavail_reply_message(xid).serialize(output)?;
        }
    }
    Ok(())
}
