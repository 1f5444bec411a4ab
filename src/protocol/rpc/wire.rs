//! RPC message framing and dispatch.
//!
//! TCP is a byte stream, so RPC messages are delimited with the Record
//! Marking Standard (RFC 5531): each record is a sequence of fragments,
//! each fragment prefixed by a 4-byte header whose low 31 bits carry the
//! fragment length and whose high bit marks the record's last fragment.
//!
//! [`handle_rpc`] decodes one record into an [`rpc_msg`], validates the RPC
//! version, and routes the call by program number. Auxiliary programs some
//! kernels probe (NFS ACL, ID mapping, metadata, LOCALIO) are answered
//! PROG_UNAVAIL rather than dropped so the client does not stall waiting.

use std::io::{Read, Write};

use anyhow::anyhow;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{error, trace, warn};

use crate::protocol::rpc::Context;
use crate::protocol::xdr::{self, deserialize, mount, nfs3, Serialize};
use crate::protocol::nfs;

/// RPC program number for NFS Access Control Lists.
const NFS_ACL_PROGRAM: u32 = 100227;
/// RPC program number for NFS ID Mapping.
const NFS_ID_MAP_PROGRAM: u32 = 100270;
/// RPC program number for NFS Metadata.
const NFS_METADATA_PROGRAM: u32 = 200024;
/// RPC program number for the LOCALIO auxiliary protocol.
const NFS_LOCALIO_PROGRAM: u32 = 400122;

/// Upper bound on a reassembled RPC record. The largest legitimate request
/// is a full-size WRITE plus headers, so this is generous.
pub const MAX_RPC_RECORD_LENGTH: usize = 1024 * 1024;

/// Processes a single decoded RPC record.
///
/// Returns through `output` whatever reply the routed handler produced.
/// A record that is not a CALL is a protocol violation and surfaces as an
/// error, which tears the connection down.
pub fn handle_rpc(
    input: &mut impl Read,
    output: &mut impl Write,
    context: &Context,
) -> Result<(), anyhow::Error> {
    let recv = deserialize::<xdr::rpc::rpc_msg>(input)?;
    let xid = recv.xid;
    let xdr::rpc::rpc_body::CALL(call) = recv.body else {
        error!("unexpectedly received a reply instead of a call");
        return Err(anyhow!("bad RPC call format"));
    };
    if call.rpcvers != 2 {
        warn!("invalid RPC version {} != 2", call.rpcvers);
        xdr::rpc::rpc_vers_mismatch(xid).serialize(output)?;
        return Ok(());
    }

    match call.prog {
        nfs3::PROGRAM => nfs::v3::handle_nfs(xid, call, input, output, context)?,
        mount::PROGRAM => nfs::mount::handle_mount(xid, call, input, output)?,
        NFS_ACL_PROGRAM | NFS_ID_MAP_PROGRAM | NFS_METADATA_PROGRAM | NFS_LOCALIO_PROGRAM => {
            trace!("ignoring auxiliary program {}", call.prog);
            xdr::rpc::prog_unavail_reply_message(xid).serialize(output)?;
        }
        unknown => {
            warn!("unknown RPC program number {} != {}", unknown, nfs3::PROGRAM);
            xdr::rpc::prog_unavail_reply_message(xid).serialize(output)?;
        }
    }
    Ok(())
}

/// Reads one complete record from the socket, reassembling fragments.
pub async fn read_record(
    socket: &mut TcpStream,
    record: &mut Vec<u8>,
) -> Result<(), anyhow::Error> {
    record.clear();
    loop {
        let mut header_buf = [0_u8; 4];
        socket.read_exact(&mut header_buf).await?;
        let fragment_header = u32::from_be_bytes(header_buf);
        let is_last = (fragment_header & (1 << 31)) > 0;
        let length = (fragment_header & ((1 << 31) - 1)) as usize;
        trace!("reading fragment length:{}, last:{}", length, is_last);
        if record.len().saturating_add(length) > MAX_RPC_RECORD_LENGTH {
            return Err(anyhow!(
                "RPC record length {} exceeds max {}",
                record.len() + length,
                MAX_RPC_RECORD_LENGTH
            ));
        }
        let start = record.len();
        record.resize(start + length, 0);
        socket.read_exact(&mut record[start..]).await?;
        if is_last {
            return Ok(());
        }
    }
}

/// Writes `buf` to the socket as record-marked fragments.
pub async fn write_record(socket: &mut TcpStream, buf: &[u8]) -> Result<(), anyhow::Error> {
    const MAX_FRAGMENT_SIZE: usize = (1 << 31) - 1;

    let mut offset = 0;
    loop {
        let remaining = buf.len() - offset;
        let fragment_size = remaining.min(MAX_FRAGMENT_SIZE);
        let is_last = offset + fragment_size >= buf.len();
        let fragment_header =
            if is_last { fragment_size as u32 | (1 << 31) } else { fragment_size as u32 };

        socket.write_all(&fragment_header.to_be_bytes()).await?;
        trace!("writing fragment length:{}, last:{}", fragment_size, is_last);
        socket.write_all(&buf[offset..offset + fragment_size]).await?;

        offset += fragment_size;
        if is_last {
            return Ok(());
        }
    }
}
