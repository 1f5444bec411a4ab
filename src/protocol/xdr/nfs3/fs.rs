//! XDR structures for the file-system information procedures of NFS
//! version 3 (RFC 1813): FSSTAT (procedure 18), FSINFO (procedure 19) and
//! PATHCONF (procedure 20).

// Preserve original RFC naming conventions for consistency with the specification
#![allow(non_camel_case_types)]

use super::*;

/// The file system supports hard links.
pub const FSF_LINK: u32 = 0x0001;
/// The file system supports symbolic links.
pub const FSF_SYMLINK: u32 = 0x0002;
/// PATHCONF information is identical for every object in the file system.
pub const FSF_HOMOGENEOUS: u32 = 0x0008;
/// The server will set file times via SETATTR if requested.
pub const FSF_CANSETTIME: u32 = 0x0010;

/// File system capabilities returned by FSINFO.
#[derive(Debug, Default)]
pub struct fsinfo3 {
    /// File system attributes
    pub obj_attributes: post_op_attr,
    /// Maximum read request supported (bytes)
    pub rtmax: u32,
    /// Preferred read request size (bytes)
    pub rtpref: u32,
    /// Suggested read request multiple (bytes)
    pub rtmult: u32,
    /// Maximum write request supported (bytes)
    pub wtmax: u32,
    /// Preferred write request size (bytes)
    pub wtpref: u32,
    /// Suggested write request multiple (bytes)
    pub wtmult: u32,
    /// Preferred directory read request size (bytes)
    pub dtpref: u32,
    /// Maximum file size supported (bytes)
    pub maxfilesize: size3,
    /// Server time granularity
    pub time_delta: nfstime3,
    /// Bit mask of FSF_* properties
    pub properties: u32,
}
DeserializeStruct!(
    fsinfo3,
    obj_attributes,
    rtmax,
    rtpref,
    rtmult,
    wtmax,
    wtpref,
    wtmult,
    dtpref,
    maxfilesize,
    time_delta,
    properties
);
SerializeStruct!(
    fsinfo3,
    obj_attributes,
    rtmax,
    rtpref,
    rtmult,
    wtmax,
    wtpref,
    wtmult,
    dtpref,
    maxfilesize,
    time_delta,
    properties
);

/// Volume statistics returned by FSSTAT.
#[derive(Debug, Default)]
pub struct FSSTAT3resok {
    /// File system attributes
    pub obj_attributes: post_op_attr,
    /// Total size of the file system in bytes
    pub tbytes: size3,
    /// Free space in bytes
    pub fbytes: size3,
    /// Free space available to the caller in bytes
    pub abytes: size3,
    /// Total number of file slots
    pub tfiles: size3,
    /// Number of free file slots
    pub ffiles: size3,
    /// Number of free file slots available to the caller
    pub afiles: size3,
    /// Seconds for which this information is valid
    pub invarsec: u32,
}
DeserializeStruct!(
    FSSTAT3resok,
    obj_attributes,
    tbytes,
    fbytes,
    abytes,
    tfiles,
    ffiles,
    afiles,
    invarsec
);
SerializeStruct!(
    FSSTAT3resok,
    obj_attributes,
    tbytes,
    fbytes,
    abytes,
    tfiles,
    ffiles,
    afiles,
    invarsec
);

/// Path configuration returned by PATHCONF.
#[derive(Debug, Default)]
pub struct PATHCONF3resok {
    /// File system attributes
    pub obj_attributes: post_op_attr,
    /// Maximum number of hard links to a file
    pub linkmax: u32,
    /// Maximum length of a file name
    pub name_max: u32,
    /// Long names are rejected rather than truncated
    pub no_trunc: bool,
    /// Changing ownership is restricted to privileged users
    pub chown_restricted: bool,
    /// File names compare case-insensitively
    pub case_insensitive: bool,
    /// File name case is preserved
    pub case_preserving: bool,
}
DeserializeStruct!(
    PATHCONF3resok,
    obj_attributes,
    linkmax,
    name_max,
    no_trunc,
    chown_restricted,
    case_insensitive,
    case_preserving
);
SerializeStruct!(
    PATHCONF3resok,
    obj_attributes,
    linkmax,
    name_max,
    no_trunc,
    chown_restricted,
    case_insensitive,
    case_preserving
);
