//! XDR structures for the directory procedures of NFS version 3 (RFC 1813):
//! MKDIR, SYMLINK and READDIR. The extended READDIRPLUS and special-node
//! MKNOD procedures are answered with `NFS3ERR_NOTSUPP` before their
//! arguments would be decoded, so no types for them live here.

// Preserve original RFC naming conventions (e.g. READDIR3args, MKDIR3args)
// for consistency with the NFS version 3 protocol specification
#![allow(non_camel_case_types)]

use super::*;

/// Arguments for the MKDIR procedure (procedure 9).
#[derive(Debug, Default)]
pub struct MKDIR3args {
    /// Directory in which to create, and the new directory's name
    pub dirops: diropargs3,
    /// Initial attributes for the new directory
    pub attributes: sattr3,
}
DeserializeStruct!(MKDIR3args, dirops, attributes);
SerializeStruct!(MKDIR3args, dirops, attributes);

/// Arguments for the SYMLINK procedure (procedure 10).
#[derive(Debug, Default)]
pub struct SYMLINK3args {
    /// Directory in which to create, and the link's name
    pub dirops: diropargs3,
    /// Target path and attributes for the symbolic link
    pub symlink: symlinkdata3,
}
DeserializeStruct!(SYMLINK3args, dirops, symlink);
SerializeStruct!(SYMLINK3args, dirops, symlink);

/// A single directory entry returned by READDIR.
#[derive(Debug, Default)]
pub struct entry3 {
    /// File identifier of the entry
    pub fileid: fileid3,
    /// Name of the entry
    pub name: filename3,
    /// Cookie with which a later READDIR can resume after this entry
    pub cookie: cookie3,
}
DeserializeStruct!(entry3, fileid, name, cookie);
SerializeStruct!(entry3, fileid, name, cookie);

/// Arguments for the READDIR procedure (procedure 16).
#[derive(Debug, Default)]
pub struct READDIR3args {
    /// File handle of the directory to read
    pub dir: nfs_fh3,
    /// Position to resume from; 0 means the beginning of the directory
    pub cookie: cookie3,
    /// Verifier tying the cookie to a directory state
    pub cookieverf: cookieverf3,
    /// Upper bound on the amount of directory information to return
    pub dircount: count3,
}
DeserializeStruct!(READDIR3args, dir, cookie, cookieverf, dircount);
SerializeStruct!(READDIR3args, dir, cookie, cookieverf, dircount);
