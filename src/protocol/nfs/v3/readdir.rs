//! Implementation of the `READDIR` procedure (procedure 16) for NFS
//! version 3 as defined in RFC 1813 section 3.3.16.
//!
//! The cookie scheme: the `readdir` callback fills a
//! complete listing, entries are emitted starting at index `cookie`, and
//! each entry's cookie is the index it came from, so resumption is a plain
//! array index. The cookie verifier is the directory's mtime seconds
//! formatted as hex and NUL-padded into the verifier field; a resumed call
//! whose verifier no longer matches fails with `NFS3ERR_BAD_COOKIE`
//! because the listing may have shifted under the client.

use std::io::{Read, Write};

use tracing::{debug, error, trace};

use crate::contents::Contents;
use crate::fileid;
use crate::protocol::rpc;
use crate::protocol::xdr::{self, deserialize, nfs3, Serialize};

use super::{attr, handle, status, DIR_MAX_LEN};

const READDIR_STATUSES: [nfs3::nfsstat3; 10] = [
    nfs3::nfsstat3::NFS3_OK,
    nfs3::nfsstat3::NFS3ERR_IO,
    nfs3::nfsstat3::NFS3ERR_ACCES,
    nfs3::nfsstat3::NFS3ERR_NOTDIR,
    nfs3::nfsstat3::NFS3ERR_BAD_COOKIE,
    nfs3::nfsstat3::NFS3ERR_TOOSMALL,
    nfs3::nfsstat3::NFS3ERR_STALE,
    nfs3::nfsstat3::NFS3ERR_BADHANDLE,
    nfs3::nfsstat3::NFS3ERR_NOTSUPP,
    nfs3::nfsstat3::NFS3ERR_SERVERFAULT,
];

/// Formats the verifier for a directory mtime: lowercase hex, NUL padded,
/// always NUL terminated within the 8-byte field.
fn cookie_verifier(mtime_seconds: u32) -> nfs3::cookieverf3 {
    let mut verf = nfs3::cookieverf3::default();
    let text = format!("{mtime_seconds:x}");
    let bytes = text.as_bytes();
    let len = bytes.len().min(verf.len() - 1);
    verf[..len].copy_from_slice(&bytes[..len]);
    verf
}

fn fail(
    xid: u32,
    stat: nfs3::nfsstat3,
    output: &mut impl Write,
) -> Result<(), anyhow::Error> {
    error!("nfsproc3_readdir error {:?} --> {:?}", xid, stat);
    xdr::rpc::make_success_reply(xid).serialize(output)?;
    stat.serialize(output)?;
    nfs3::post_op_attr::Void.serialize(output)?;
    Ok(())
}

/// Handles `NFSv3` `READDIR` procedure (procedure 16).
pub fn nfsproc3_readdir(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    _context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let args = deserialize::<nfs3::dir::READDIR3args>(input)?;
    debug!("nfsproc3_readdir({:?},{:?})", xid, args);

    // the directory attributes feed the cookie verifier; a failed stat
    // leaves a zero mtime, which still verifies consistently
    let dirattr = attr::get_fattr(&args.dir).unwrap_or_default();
    let verifier = cookie_verifier(dirattr.mtime.seconds);

    let new_request = args.cookie == 0 && args.cookieverf[0] == 0;
    if !new_request && args.cookieverf != verifier {
        return fail(xid, nfs3::nfsstat3::NFS3ERR_BAD_COOKIE, output);
    }

    let resolved = match handle::resolve(&args.dir) {
        Ok(resolved) => resolved,
        Err(stat) => return fail(xid, stat, output),
    };

    let mut contents = Contents::new();
    if let Err(err) = resolved.desc.fs.readdir(&resolved.path, &mut contents) {
        let stat = status::filter(
            status::from_errno(err, nfs3::nfsstat3::NFS3ERR_NOTDIR),
            &READDIR_STATUSES,
        );
        return fail(xid, stat, output);
    }

    xdr::rpc::make_success_reply(xid).serialize(output)?;
    nfs3::nfsstat3::NFS3_OK.serialize(output)?;
    nfs3::post_op_attr::Void.serialize(output)?;
    verifier.serialize(output)?;

    // emit entries starting at the requested index until the reply is full
    // or the listing ends; each entry's cookie is the index it came from
    let total = contents.count();
    let limit = (args.dircount as usize).min(DIR_MAX_LEN) as u64;
    let mut index = args.cookie;
    let mut emitted = 0_u64;
    while index < total && emitted < limit {
        let Some(entry_name) = contents.at(index) else { break };
        let fspath = handle::child_path(&resolved.path, &nfs3::filename3::from(entry_name));
        let entry = nfs3::dir::entry3 {
            fileid: fileid::fileid(resolved.fsid, &fspath),
            name: nfs3::filename3::from(entry_name),
            cookie: index,
        };
        trace!("  -- dirent {:?}", entry);
        true.serialize(output)?;
        entry.serialize(output)?;
        index += 1;
        emitted += 1;
    }
    false.serialize(output)?;
    let eof = index == total;
    eof.serialize(output)?;
    debug!(" {:?} --> {} entries, eof {}", xid, emitted, eof);
    Ok(())
}
