//! RPC (Remote Procedure Call) layer as specified in RFC 5531.
//!
//! Provides record-marked message framing for TCP, the per-connection
//! context, and the dispatcher that routes decoded calls to the NFS and
//! MOUNT program handlers. Requests are handled one at a time on the
//! service thread; there is no retransmission tracking, so a kernel
//! retransmit is simply re-executed (idempotent procedures tolerate this,
//! CREATE and REMOVE may observe EXIST/NOENT).

mod context;
mod wire;

pub use context::Context;
pub use wire::{handle_rpc, read_record, write_record, MAX_RPC_RECORD_LENGTH};
