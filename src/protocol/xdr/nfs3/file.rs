//! XDR structures for the file data procedures of NFS version 3 (RFC 1813):
//! READ (procedure 6) and WRITE (procedure 7).

// Preserve original RFC naming conventions (e.g. READ3args, WRITE3resok)
// for consistency with the NFS version 3 protocol specification
#![allow(non_camel_case_types)]

use num_derive::{FromPrimitive, ToPrimitive};

use super::*;

/// Arguments for the READ procedure.
#[derive(Debug, Default)]
pub struct READ3args {
    /// File handle of the file to read
    pub file: nfs_fh3,
    /// Position within the file to begin reading
    pub offset: offset3,
    /// Number of bytes of data to read
    pub count: count3,
}
DeserializeStruct!(READ3args, file, offset, count);
SerializeStruct!(READ3args, file, offset, count);

/// Successful response for the READ procedure.
#[derive(Debug, Default)]
pub struct READ3resok {
    /// File attributes after the operation
    pub file_attributes: post_op_attr,
    /// Number of bytes actually read
    pub count: count3,
    /// True if the end of file was reached
    pub eof: bool,
    /// The data read from the file
    pub data: Vec<u8>,
}
DeserializeStruct!(READ3resok, file_attributes, count, eof, data);
SerializeStruct!(READ3resok, file_attributes, count, eof, data);

/// Requested stability for written data.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u32)]
pub enum stable_how {
    /// Data may be buffered before reaching stable storage
    #[default]
    UNSTABLE = 0,
    /// The data of this request must reach stable storage before the reply
    DATA_SYNC = 1,
    /// Data and metadata of this request must reach stable storage
    FILE_SYNC = 2,
}
SerializeEnum!(stable_how);
DeserializeEnum!(stable_how);

/// Arguments for the WRITE procedure.
#[derive(Debug, Default)]
pub struct WRITE3args {
    /// File handle of the file to write
    pub file: nfs_fh3,
    /// Position within the file to begin writing
    pub offset: offset3,
    /// Number of bytes of data to write
    pub count: count3,
    /// Requested stability level
    pub stable: u32,
    /// The data to be written
    pub data: Vec<u8>,
}
DeserializeStruct!(WRITE3args, file, offset, count, stable, data);
SerializeStruct!(WRITE3args, file, offset, count, stable, data);

/// Successful response for the WRITE procedure.
#[derive(Debug, Default)]
pub struct WRITE3resok {
    /// File attributes around the operation
    pub file_wcc: wcc_data,
    /// Number of bytes actually written
    pub count: count3,
    /// Stability level actually used
    pub committed: stable_how,
    /// Verifier for detecting server restarts between WRITE and COMMIT
    pub verf: writeverf3,
}
DeserializeStruct!(WRITE3resok, file_wcc, count, committed, verf);
SerializeStruct!(WRITE3resok, file_wcc, count, committed, verf);
