//! XDR (External Data Representation) serialization as defined in RFC 1832.
//!
//! Every message that crosses the loopback socket (RPC envelopes, NFSv3
//! arguments and results, portmap registrations) is encoded in XDR. This
//! module defines the `Serialize`/`Deserialize` traits, implementations for
//! the primitive types XDR knows about, and the macros the protocol type
//! definitions use to derive field-by-field codecs.

use std::io::{Read, Write};

use byteorder::BigEndian;
use byteorder::{ReadBytesExt, WriteBytesExt};

pub mod mount;
pub mod nfs3;
pub mod portmap;
pub mod rpc;

/// Byte order used throughout XDR (RFC 1832 mandates big endian).
pub type XDREndian = BigEndian;

/// Serialization half of the XDR codec.
pub trait Serialize {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()>;
}

/// Deserialization half of the XDR codec.
///
/// Decoding is expressed as in-place mutation of a default value, which is
/// what the struct/union macros build on.
pub trait Deserialize {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()>;
}

/// Reads one `T` from the stream.
pub fn deserialize<T: Deserialize + Default>(src: &mut impl Read) -> std::io::Result<T> {
    let mut value = T::default();
    value.deserialize(src)?;
    Ok(value)
}

/// Booleans are 4-byte integers: 0 is false, anything else is true.
impl Serialize for bool {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        dest.write_u32::<XDREndian>(u32::from(*self))
    }
}
impl Deserialize for bool {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        *self = src.read_u32::<XDREndian>()? > 0;
        Ok(())
    }
}

impl Serialize for i32 {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        dest.write_i32::<XDREndian>(*self)
    }
}
impl Deserialize for i32 {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        *self = src.read_i32::<XDREndian>()?;
        Ok(())
    }
}

impl Serialize for u32 {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        dest.write_u32::<XDREndian>(*self)
    }
}
impl Deserialize for u32 {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        *self = src.read_u32::<XDREndian>()?;
        Ok(())
    }
}

impl Serialize for i64 {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        dest.write_i64::<XDREndian>(*self)
    }
}
impl Deserialize for i64 {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        *self = src.read_i64::<XDREndian>()?;
        Ok(())
    }
}

impl Serialize for u64 {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        dest.write_u64::<XDREndian>(*self)
    }
}
impl Deserialize for u64 {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        *self = src.read_u64::<XDREndian>()?;
        Ok(())
    }
}

/// Fixed-size opaque data: raw bytes, no length prefix.
impl<const N: usize> Serialize for [u8; N] {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        dest.write_all(self)
    }
}
impl<const N: usize> Deserialize for [u8; N] {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        src.read_exact(self)
    }
}

/// Variable-length opaque data: 4-byte length prefix, bytes, zero padding to
/// a 4-byte boundary.
impl Serialize for Vec<u8> {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        assert!(self.len() < u32::MAX as usize);
        let length = self.len() as u32;
        length.serialize(dest)?;
        dest.write_all(self)?;
        let pad = ((4 - length % 4) % 4) as usize;
        let zeros = [0_u8; 4];
        if pad > 0 {
            dest.write_all(&zeros[..pad])?;
        }
        Ok(())
    }
}
impl Deserialize for Vec<u8> {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        let length = deserialize::<u32>(src)?;
        self.resize(length as usize, 0);
        src.read_exact(self)?;
        let pad = ((4 - length % 4) % 4) as usize;
        let mut zeros = [0_u8; 4];
        src.read_exact(&mut zeros[..pad])?;
        Ok(())
    }
}

/// Counted arrays of integers: 4-byte length prefix, then the elements.
impl Serialize for Vec<u32> {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        assert!(self.len() < u32::MAX as usize);
        (self.len() as u32).serialize(dest)?;
        for item in self {
            item.serialize(dest)?;
        }
        Ok(())
    }
}
impl Deserialize for Vec<u32> {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        let length = deserialize::<u32>(src)?;
        self.resize(length as usize, 0);
        for item in self.iter_mut() {
            item.deserialize(src)?;
        }
        Ok(())
    }
}

/// Strings travel as opaque byte sequences; decoding enforces UTF-8.
impl Serialize for String {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        self.as_bytes().to_vec().serialize(dest)
    }
}
impl Deserialize for String {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        let bytes = deserialize::<Vec<u8>>(src)?;
        *self = String::from_utf8(bytes)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        Ok(())
    }
}

/// Implements `Serialize` for a struct by serializing each field in order.
#[macro_export]
macro_rules! SerializeStruct {
    ($t:ident, $($element:ident),*) => {
        impl $crate::protocol::xdr::Serialize for $t {
            fn serialize<W: std::io::Write>(&self, dest: &mut W) -> std::io::Result<()> {
                $(self.$element.serialize(dest)?;)*
                Ok(())
            }
        }
    };
}

/// Implements `Deserialize` for a struct by deserializing each field in order.
#[macro_export]
macro_rules! DeserializeStruct {
    ($t:ident, $($element:ident),*) => {
        impl $crate::protocol::xdr::Deserialize for $t {
            fn deserialize<R: std::io::Read>(&mut self, src: &mut R) -> std::io::Result<()> {
                $(self.$element.deserialize(src)?;)*
                Ok(())
            }
        }
    };
}

/// Implements `Serialize` for a fieldless enum as its 32-bit discriminant.
#[macro_export]
macro_rules! SerializeEnum {
    ($t:ident) => {
        impl $crate::protocol::xdr::Serialize for $t {
            fn serialize<W: std::io::Write>(&self, dest: &mut W) -> std::io::Result<()> {
                use byteorder::WriteBytesExt;
                dest.write_u32::<$crate::protocol::xdr::XDREndian>(*self as u32)
            }
        }
    };
}

/// Implements `Deserialize` for a fieldless enum, rejecting unknown
/// discriminants. Requires `num_derive::FromPrimitive` on the enum.
#[macro_export]
macro_rules! DeserializeEnum {
    ($t:ident) => {
        impl $crate::protocol::xdr::Deserialize for $t {
            fn deserialize<R: std::io::Read>(&mut self, src: &mut R) -> std::io::Result<()> {
                use byteorder::ReadBytesExt;
                let raw = src.read_u32::<$crate::protocol::xdr::XDREndian>()?;
                match num_traits::cast::FromPrimitive::from_u32(raw) {
                    Some(value) => {
                        *self = value;
                        Ok(())
                    }
                    None => Err(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("invalid value for {}: {}", stringify!($t), raw),
                    )),
                }
            }
        }
    };
}

/// Implements `Serialize` for a two-armed XDR union discriminated by a
/// boolean: a `Void` arm and an arm carrying a value.
#[macro_export]
macro_rules! SerializeBoolUnion {
    ($t:ident, $enumcase:ident, $enumtype:ty) => {
        impl $crate::protocol::xdr::Serialize for $t {
            fn serialize<W: std::io::Write>(&self, dest: &mut W) -> std::io::Result<()> {
                match self {
                    $t::Void => false.serialize(dest),
                    $t::$enumcase(v) => {
                        true.serialize(dest)?;
                        v.serialize(dest)
                    }
                }
            }
        }
    };
}

/// Deserialization counterpart of [`SerializeBoolUnion!`].
#[macro_export]
macro_rules! DeserializeBoolUnion {
    ($t:ident, $enumcase:ident, $enumtype:ty) => {
        impl $crate::protocol::xdr::Deserialize for $t {
            fn deserialize<R: std::io::Read>(&mut self, src: &mut R) -> std::io::Result<()> {
                if $crate::protocol::xdr::deserialize::<bool>(src)? {
                    let mut value = <$enumtype>::default();
                    value.deserialize(src)?;
                    *self = $t::$enumcase(value);
                } else {
                    *self = $t::Void;
                }
                Ok(())
            }
        }
    };
}

// Re-export the macros so protocol modules can pull them in with the rest of
// the codec via `use super::*`.
pub use crate::{
    DeserializeBoolUnion, DeserializeEnum, DeserializeStruct, SerializeBoolUnion, SerializeEnum,
    SerializeStruct,
};
