//! XDR data types and constants for NFS version 3, as defined in RFC 1813.
//!
//! These are the structures the request engine decodes from and encodes to
//! the wire: file handles, attributes, the SETATTR attribute bundle, and the
//! shared weak-cache-consistency containers. Types for individual procedures
//! live in the [`dir`], [`file`] and [`fs`] submodules.

// Preserve original RFC naming conventions for consistency with the specification
#![allow(non_camel_case_types)]

use std::fmt;
use std::io::{Read, Write};

use num_derive::{FromPrimitive, ToPrimitive};

use super::{deserialize, Deserialize, Serialize};
use crate::{
    DeserializeBoolUnion, DeserializeEnum, DeserializeStruct, SerializeBoolUnion, SerializeEnum,
    SerializeStruct,
};

pub mod dir;
pub mod file;
pub mod fs;

/// The RPC program number for the NFS version 3 service.
pub const PROGRAM: u32 = 100003;
/// The version number for the NFS version 3 protocol.
pub const VERSION: u32 = 3;

/// The size in bytes of the opaque cookie verifier passed by READDIR.
pub const NFS3_COOKIEVERFSIZE: u32 = 8;
/// The size in bytes of the opaque verifier used for exclusive CREATE.
pub const NFS3_CREATEVERFSIZE: u32 = 8;
/// The size in bytes of the opaque verifier used for asynchronous WRITE.
pub const NFS3_WRITEVERFSIZE: u32 = 8;

/// Byte string used by NFS for filenames and paths.
#[derive(Default, Clone, PartialEq, Eq)]
pub struct nfsstring(pub Vec<u8>);

impl nfsstring {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for nfsstring {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl From<&[u8]> for nfsstring {
    fn from(value: &[u8]) -> Self {
        Self(value.into())
    }
}

impl From<&str> for nfsstring {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().into())
    }
}

impl AsRef<[u8]> for nfsstring {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::ops::Deref for nfsstring {
    type Target = Vec<u8>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Debug for nfsstring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Display for nfsstring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

impl Serialize for nfsstring {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        self.0.serialize(dest)
    }
}

impl Deserialize for nfsstring {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        self.0.deserialize(src)
    }
}

/// Procedure numbers for the NFS version 3 protocol.
#[allow(clippy::upper_case_acronyms)]
#[derive(Copy, Clone, Debug, FromPrimitive, ToPrimitive)]
pub enum NFSProgram {
    /// Do nothing
    NFSPROC3_NULL = 0,
    /// Get file attributes
    NFSPROC3_GETATTR = 1,
    /// Set file attributes
    NFSPROC3_SETATTR = 2,
    /// Look up filename
    NFSPROC3_LOOKUP = 3,
    /// Check file access permission
    NFSPROC3_ACCESS = 4,
    /// Read from symbolic link
    NFSPROC3_READLINK = 5,
    /// Read from file
    NFSPROC3_READ = 6,
    /// Write to file
    NFSPROC3_WRITE = 7,
    /// Create file
    NFSPROC3_CREATE = 8,
    /// Create directory
    NFSPROC3_MKDIR = 9,
    /// Create symbolic link
    NFSPROC3_SYMLINK = 10,
    /// Create special device
    NFSPROC3_MKNOD = 11,
    /// Remove file
    NFSPROC3_REMOVE = 12,
    /// Remove directory
    NFSPROC3_RMDIR = 13,
    /// Rename file or directory
    NFSPROC3_RENAME = 14,
    /// Create hard link
    NFSPROC3_LINK = 15,
    /// Read directory
    NFSPROC3_READDIR = 16,
    /// Extended read directory
    NFSPROC3_READDIRPLUS = 17,
    /// Get file system statistics
    NFSPROC3_FSSTAT = 18,
    /// Get file system information
    NFSPROC3_FSINFO = 19,
    /// Get path configuration
    NFSPROC3_PATHCONF = 20,
    /// Commit cached data
    NFSPROC3_COMMIT = 21,
    /// Invalid procedure
    INVALID = 22,
}

/// Component of a pathname.
pub type filename3 = nfsstring;
/// Pathname or symbolic link contents.
pub type nfspath3 = nfsstring;
/// Unique number identifying a file within a filesystem.
pub type fileid3 = u64;
/// Directory entry position cookie.
pub type cookie3 = u64;
/// Cookie verifier, used to detect a changed directory mid-iteration.
pub type cookieverf3 = [u8; NFS3_COOKIEVERFSIZE as usize];
/// Exclusive-create verifier.
pub type createverf3 = [u8; NFS3_CREATEVERFSIZE as usize];
/// Asynchronous-write verifier.
pub type writeverf3 = [u8; NFS3_WRITEVERFSIZE as usize];
/// User ID.
pub type uid3 = u32;
/// Group ID.
pub type gid3 = u32;
/// File size in bytes.
pub type size3 = u64;
/// File offset in bytes.
pub type offset3 = u64;
/// File mode bits.
pub type mode3 = u32;
/// Count of bytes or entries.
pub type count3 = u32;

/// Status codes returned by NFS version 3 operations.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u32)]
pub enum nfsstat3 {
    /// The call completed successfully.
    #[default]
    NFS3_OK = 0,
    /// Not owner. The caller is neither privileged nor the owner of the
    /// target of the operation.
    NFS3ERR_PERM = 1,
    /// No such file or directory.
    NFS3ERR_NOENT = 2,
    /// A hard I/O error occurred while processing the operation.
    NFS3ERR_IO = 5,
    /// No such device or address.
    NFS3ERR_NXIO = 6,
    /// Permission denied. Contrast with NFS3ERR_PERM, which is restricted to
    /// owner or privileged-user permission failures.
    NFS3ERR_ACCES = 13,
    /// File exists.
    NFS3ERR_EXIST = 17,
    /// Attempt to do a cross-device hard link.
    NFS3ERR_XDEV = 18,
    /// No such device.
    NFS3ERR_NODEV = 19,
    /// The caller specified a non-directory in a directory operation.
    NFS3ERR_NOTDIR = 20,
    /// The caller specified a directory in a non-directory operation.
    NFS3ERR_ISDIR = 21,
    /// Invalid or unsupported argument, e.g. READLINK on a non-symlink.
    NFS3ERR_INVAL = 22,
    /// File too large for the server's limit.
    NFS3ERR_FBIG = 27,
    /// No space left on device.
    NFS3ERR_NOSPC = 28,
    /// A modifying operation was attempted on a read-only file system.
    NFS3ERR_ROFS = 30,
    /// Too many hard links.
    NFS3ERR_MLINK = 31,
    /// The filename in an operation was too long.
    NFS3ERR_NAMETOOLONG = 63,
    /// An attempt was made to remove a directory that was not empty.
    NFS3ERR_NOTEMPTY = 66,
    /// Resource (quota) hard limit exceeded.
    NFS3ERR_DQUOT = 69,
    /// The file referred to by the file handle no longer exists or access to
    /// it has been revoked.
    NFS3ERR_STALE = 70,
    /// Too many levels of remote in path.
    NFS3ERR_REMOTE = 71,
    /// The file handle failed internal consistency checks.
    NFS3ERR_BADHANDLE = 10001,
    /// Update synchronization mismatch detected during a SETATTR.
    NFS3ERR_NOT_SYNC = 10002,
    /// READDIR cookie is stale.
    NFS3ERR_BAD_COOKIE = 10003,
    /// Operation is not supported.
    NFS3ERR_NOTSUPP = 10004,
    /// Buffer or request is too small.
    NFS3ERR_TOOSMALL = 10005,
    /// An error occurred on the server which does not map to any of the
    /// legal NFS version 3 protocol error values.
    NFS3ERR_SERVERFAULT = 10006,
    /// An attempt was made to create an object of an unsupported type.
    NFS3ERR_BADTYPE = 10007,
    /// The server cannot complete the request in a timely fashion.
    NFS3ERR_JUKEBOX = 10008,
}
SerializeEnum!(nfsstat3);
DeserializeEnum!(nfsstat3);

/// File type enumeration as defined in RFC 1813 section 2.3.5.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u32)]
pub enum ftype3 {
    /// Regular file
    #[default]
    NF3REG = 1,
    /// Directory
    NF3DIR = 2,
    /// Block special device
    NF3BLK = 3,
    /// Character special device
    NF3CHR = 4,
    /// Symbolic link
    NF3LNK = 5,
    /// Socket
    NF3SOCK = 6,
    /// Named pipe
    NF3FIFO = 7,
}
SerializeEnum!(ftype3);
DeserializeEnum!(ftype3);

/// Major and minor numbers for character and block special devices.
#[derive(Copy, Clone, Debug, Default)]
pub struct specdata3 {
    /// Major device number
    pub specdata1: u32,
    /// Minor device number
    pub specdata2: u32,
}
DeserializeStruct!(specdata3, specdata1, specdata2);
SerializeStruct!(specdata3, specdata1, specdata2);

/// The NFS version 3 file handle. The server owns the internal format; this
/// server issues printable `"<fsid>:<fileid>"` strings.
#[derive(Clone, Debug, Default)]
pub struct nfs_fh3 {
    /// Raw file handle data
    pub data: Vec<u8>,
}
DeserializeStruct!(nfs_fh3, data);
SerializeStruct!(nfs_fh3, data);

/// File timestamp (access, modify, change).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct nfstime3 {
    /// Seconds since the Unix epoch
    pub seconds: u32,
    /// Nanoseconds (0-999999999)
    pub nseconds: u32,
}
DeserializeStruct!(nfstime3, seconds, nseconds);
SerializeStruct!(nfstime3, seconds, nseconds);

/// File attributes as defined in RFC 1813 section 2.3.5.
#[derive(Copy, Clone, Debug, Default)]
pub struct fattr3 {
    /// Type of the file
    pub ftype: ftype3,
    /// Permission bits
    pub mode: mode3,
    /// Number of hard links to the file
    pub nlink: u32,
    /// User ID of the owner
    pub uid: uid3,
    /// Group ID of the owner
    pub gid: gid3,
    /// File size in bytes
    pub size: size3,
    /// Bytes actually allocated on the backing store
    pub used: size3,
    /// Device numbers for special files
    pub rdev: specdata3,
    /// File system identifier
    pub fsid: u64,
    /// File identifier within its file system
    pub fileid: fileid3,
    /// Time of last data access
    pub atime: nfstime3,
    /// Time of last data modification
    pub mtime: nfstime3,
    /// Time of last attribute change
    pub ctime: nfstime3,
}
DeserializeStruct!(
    fattr3, ftype, mode, nlink, uid, gid, size, used, rdev, fsid, fileid, atime, mtime, ctime
);
SerializeStruct!(
    fattr3, ftype, mode, nlink, uid, gid, size, used, rdev, fsid, fileid, atime, mtime, ctime
);

/// Attribute subset used for weak cache consistency checking.
#[derive(Copy, Clone, Debug, Default)]
pub struct wcc_attr {
    /// File size in bytes
    pub size: size3,
    /// Last modification time
    pub mtime: nfstime3,
    /// Last status change time
    pub ctime: nfstime3,
}
DeserializeStruct!(wcc_attr, size, mtime, ctime);
SerializeStruct!(wcc_attr, size, mtime, ctime);

/// Pre-operation attributes for weak cache consistency.
#[derive(Copy, Clone, Debug, Default)]
#[repr(u32)]
pub enum pre_op_attr {
    /// No attributes available
    #[default]
    Void,
    /// Attributes are available
    attributes(wcc_attr),
}
DeserializeBoolUnion!(pre_op_attr, attributes, wcc_attr);
SerializeBoolUnion!(pre_op_attr, attributes, wcc_attr);

/// Post-operation attributes, returned in most procedure responses.
#[derive(Copy, Clone, Debug, Default)]
#[repr(u32)]
pub enum post_op_attr {
    /// No attributes available
    #[default]
    Void,
    /// Attributes are available
    attributes(fattr3),
}
DeserializeBoolUnion!(post_op_attr, attributes, fattr3);
SerializeBoolUnion!(post_op_attr, attributes, fattr3);

/// Weak cache consistency data: attributes before and after a mutation.
#[derive(Copy, Clone, Debug, Default)]
pub struct wcc_data {
    /// File attributes before the operation
    pub before: pre_op_attr,
    /// File attributes after the operation
    pub after: post_op_attr,
}
DeserializeStruct!(wcc_data, before, after);
SerializeStruct!(wcc_data, before, after);

/// Optional file handle response.
#[derive(Clone, Debug, Default)]
#[repr(u32)]
pub enum post_op_fh3 {
    /// No file handle
    #[default]
    Void,
    /// File handle is available
    handle(nfs_fh3),
}
DeserializeBoolUnion!(post_op_fh3, handle, nfs_fh3);
SerializeBoolUnion!(post_op_fh3, handle, nfs_fh3);

/// Optional file mode for SETATTR operations.
#[derive(Copy, Clone, Debug)]
#[repr(u32)]
pub enum set_mode3 {
    /// Don't change the mode
    Void,
    /// Set to the specified mode
    mode(mode3),
}
DeserializeBoolUnion!(set_mode3, mode, mode3);
SerializeBoolUnion!(set_mode3, mode, mode3);

/// Optional user ID for SETATTR operations.
#[derive(Copy, Clone, Debug)]
#[repr(u32)]
pub enum set_uid3 {
    /// Don't change the user ID
    Void,
    /// Set to the specified user ID
    uid(uid3),
}
DeserializeBoolUnion!(set_uid3, uid, uid3);
SerializeBoolUnion!(set_uid3, uid, uid3);

/// Optional group ID for SETATTR operations.
#[derive(Copy, Clone, Debug)]
#[repr(u32)]
pub enum set_gid3 {
    /// Don't change the group ID
    Void,
    /// Set to the specified group ID
    gid(gid3),
}
DeserializeBoolUnion!(set_gid3, gid, gid3);
SerializeBoolUnion!(set_gid3, gid, gid3);

/// Optional file size for SETATTR operations.
#[derive(Copy, Clone, Debug)]
#[repr(u32)]
pub enum set_size3 {
    /// Don't change the file size
    Void,
    /// Set to the specified size
    size(size3),
}
DeserializeBoolUnion!(set_size3, size, size3);
SerializeBoolUnion!(set_size3, size, size3);

/// How to modify the last access time during a SETATTR operation.
#[derive(Copy, Clone, Debug)]
#[repr(u32)]
pub enum set_atime {
    /// Leave the access time unchanged
    DONT_CHANGE,
    /// Set the access time to the server's current time
    SET_TO_SERVER_TIME,
    /// Set the access time to the specified value
    SET_TO_CLIENT_TIME(nfstime3),
}

impl Serialize for set_atime {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        match self {
            set_atime::DONT_CHANGE => 0_u32.serialize(dest),
            set_atime::SET_TO_SERVER_TIME => 1_u32.serialize(dest),
            set_atime::SET_TO_CLIENT_TIME(v) => {
                2_u32.serialize(dest)?;
                v.serialize(dest)
            }
        }
    }
}
impl Deserialize for set_atime {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        match deserialize::<u32>(src)? {
            0 => *self = set_atime::DONT_CHANGE,
            1 => *self = set_atime::SET_TO_SERVER_TIME,
            2 => *self = set_atime::SET_TO_CLIENT_TIME(deserialize(src)?),
            c => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("invalid set_atime value: {c}"),
                ));
            }
        }
        Ok(())
    }
}

/// How to modify the last modification time during a SETATTR operation.
#[derive(Copy, Clone, Debug)]
#[repr(u32)]
pub enum set_mtime {
    /// Leave the modification time unchanged
    DONT_CHANGE,
    /// Set the modification time to the server's current time
    SET_TO_SERVER_TIME,
    /// Set the modification time to the specified value
    SET_TO_CLIENT_TIME(nfstime3),
}

impl Serialize for set_mtime {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        match self {
            set_mtime::DONT_CHANGE => 0_u32.serialize(dest),
            set_mtime::SET_TO_SERVER_TIME => 1_u32.serialize(dest),
            set_mtime::SET_TO_CLIENT_TIME(v) => {
                2_u32.serialize(dest)?;
                v.serialize(dest)
            }
        }
    }
}
impl Deserialize for set_mtime {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        match deserialize::<u32>(src)? {
            0 => *self = set_mtime::DONT_CHANGE,
            1 => *self = set_mtime::SET_TO_SERVER_TIME,
            2 => *self = set_mtime::SET_TO_CLIENT_TIME(deserialize(src)?),
            c => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("invalid set_mtime value: {c}"),
                ));
            }
        }
        Ok(())
    }
}

/// Set of file attributes to change in SETATTR and create-style operations.
#[derive(Copy, Clone, Debug)]
pub struct sattr3 {
    /// File mode (permissions)
    pub mode: set_mode3,
    /// User ID of the owner
    pub uid: set_uid3,
    /// Group ID of the owner
    pub gid: set_gid3,
    /// File size
    pub size: set_size3,
    /// Last access time
    pub atime: set_atime,
    /// Last modification time
    pub mtime: set_mtime,
}
DeserializeStruct!(sattr3, mode, uid, gid, size, atime, mtime);
SerializeStruct!(sattr3, mode, uid, gid, size, atime, mtime);

impl Default for sattr3 {
    fn default() -> sattr3 {
        sattr3 {
            mode: set_mode3::Void,
            uid: set_uid3::Void,
            gid: set_gid3::Void,
            size: set_size3::Void,
            atime: set_atime::DONT_CHANGE,
            mtime: set_mtime::DONT_CHANGE,
        }
    }
}

/// Arguments naming an entry within a directory.
#[derive(Clone, Debug, Default)]
pub struct diropargs3 {
    /// Directory file handle
    pub dir: nfs_fh3,
    /// Name within the directory
    pub name: filename3,
}
DeserializeStruct!(diropargs3, dir, name);
SerializeStruct!(diropargs3, dir, name);

/// Data for creating a symbolic link.
#[derive(Debug, Default)]
pub struct symlinkdata3 {
    /// Attributes for the symbolic link
    pub symlink_attributes: sattr3,
    /// Target path the link points at
    pub symlink_data: nfspath3,
}
DeserializeStruct!(symlinkdata3, symlink_attributes, symlink_data);
SerializeStruct!(symlinkdata3, symlink_attributes, symlink_data);

/// Permission to read file data or read a directory.
pub const ACCESS3_READ: u32 = 0x0001;
/// Permission to look up names in a directory.
pub const ACCESS3_LOOKUP: u32 = 0x0002;
/// Permission to modify the contents of an existing file.
pub const ACCESS3_MODIFY: u32 = 0x0004;
/// Permission to grow a file or extend a directory.
pub const ACCESS3_EXTEND: u32 = 0x0008;
/// Permission to delete a file or directory entry.
pub const ACCESS3_DELETE: u32 = 0x0010;
/// Permission to execute a file or traverse a directory.
pub const ACCESS3_EXECUTE: u32 = 0x0020;

/// File creation modes for CREATE operations.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u32)]
pub enum createmode3 {
    /// Create unconditionally
    #[default]
    UNCHECKED = 0,
    /// Fail if the file exists
    GUARDED = 1,
    /// Exclusive create mechanism (with verifier)
    EXCLUSIVE = 2,
}
SerializeEnum!(createmode3);
DeserializeEnum!(createmode3);

/// Creation mode union for CREATE: UNCHECKED and GUARDED carry initial
/// attributes, EXCLUSIVE carries the client verifier.
#[derive(Copy, Clone, Debug)]
#[repr(u32)]
pub enum createhow3 {
    /// Create unconditionally, then apply attributes
    UNCHECKED(sattr3),
    /// Fail with EXIST if the name is taken, otherwise apply attributes
    GUARDED(sattr3),
    /// Idempotent create keyed on the verifier
    EXCLUSIVE(createverf3),
}

impl Default for createhow3 {
    fn default() -> createhow3 {
        createhow3::UNCHECKED(sattr3::default())
    }
}

impl Serialize for createhow3 {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        match self {
            createhow3::UNCHECKED(attrs) => {
                0_u32.serialize(dest)?;
                attrs.serialize(dest)
            }
            createhow3::GUARDED(attrs) => {
                1_u32.serialize(dest)?;
                attrs.serialize(dest)
            }
            createhow3::EXCLUSIVE(verf) => {
                2_u32.serialize(dest)?;
                verf.serialize(dest)
            }
        }
    }
}
impl Deserialize for createhow3 {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        match deserialize::<u32>(src)? {
            0 => *self = createhow3::UNCHECKED(deserialize(src)?),
            1 => *self = createhow3::GUARDED(deserialize(src)?),
            2 => *self = createhow3::EXCLUSIVE(deserialize(src)?),
            mode => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("invalid createhow3 mode: {mode}"),
                ));
            }
        }
        Ok(())
    }
}

/// Arguments for the CREATE procedure.
#[derive(Debug, Default)]
pub struct CREATE3args {
    /// Directory and name for the new file
    pub dirops: diropargs3,
    /// Creation mode and initial attributes
    pub how: createhow3,
}
DeserializeStruct!(CREATE3args, dirops, how);
SerializeStruct!(CREATE3args, dirops, how);

/// Arguments for the ACCESS procedure.
#[derive(Debug, Default)]
pub struct ACCESS3args {
    /// File handle to check
    pub object: nfs_fh3,
    /// Access rights the caller wants validated
    pub access: u32,
}
DeserializeStruct!(ACCESS3args, object, access);
SerializeStruct!(ACCESS3args, object, access);

/// Guard condition for SETATTR operations based on ctime.
#[derive(Copy, Clone, Debug, Default)]
#[repr(u32)]
pub enum sattrguard3 {
    /// No guard, change unconditionally
    #[default]
    Void,
    /// Only change if the object's ctime matches this value
    obj_ctime(nfstime3),
}
DeserializeBoolUnion!(sattrguard3, obj_ctime, nfstime3);
SerializeBoolUnion!(sattrguard3, obj_ctime, nfstime3);

/// Arguments for the SETATTR procedure.
#[derive(Clone, Debug, Default)]
pub struct SETATTR3args {
    /// File handle of the target object
    pub object: nfs_fh3,
    /// New attributes to apply
    pub new_attributes: sattr3,
    /// Guard condition for an atomic change
    pub guard: sattrguard3,
}
DeserializeStruct!(SETATTR3args, object, new_attributes, guard);
SerializeStruct!(SETATTR3args, object, new_attributes, guard);
