//! Serialization bijection tests for the XDR codec: every value must decode
//! back to itself, regardless of the buffer's starting capacity or of data
//! already sitting in front of it, and every encoding must be padded to a
//! four-byte boundary.

use std::fmt::Debug;

use kfs::xdr::{deserialize, nfs3, Deserialize, Serialize};

#[derive(Default)]
struct Context {
    buf: Vec<u8>,
}

trait TestValue: Deserialize + Serialize + Eq + Default + Debug + Clone {}
impl<T: Deserialize + Serialize + Eq + Default + Debug + Clone> TestValue for T {}

impl Context {
    fn check<T: TestValue>(&mut self, src_value: &T) {
        for capacity in 0..32 {
            for existing in 0..capacity {
                self.buf = Vec::with_capacity(capacity);
                self.buf.resize(existing, Default::default());

                src_value.serialize(&mut self.buf).expect("cannot serialize");
                assert_eq!((self.buf.len() - existing) % 4, 0);

                let result_value =
                    deserialize::<T>(&mut &self.buf[existing..]).expect("cannot deserialize");

                assert_eq!(src_value, &result_value);
            }
        }
    }

    fn check_multi<T: TestValue>(&mut self, src_values: &[T]) {
        src_values.iter().for_each(|value| self.check(value));
    }
}

#[derive(Default, PartialEq, Eq, Debug, Clone)]
struct TestForVecU8(Vec<u8>);

impl Serialize for TestForVecU8 {
    fn serialize<W: std::io::Write>(&self, dest: &mut W) -> std::io::Result<()> {
        self.0.serialize(dest)
    }
}

impl Deserialize for TestForVecU8 {
    fn deserialize<R: std::io::Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        self.0.deserialize(src)
    }
}

#[derive(Default, PartialEq, Eq, Debug, Clone)]
struct TestForString(String);

impl Serialize for TestForString {
    fn serialize<W: std::io::Write>(&self, dest: &mut W) -> std::io::Result<()> {
        self.0.serialize(dest)
    }
}

impl Deserialize for TestForString {
    fn deserialize<R: std::io::Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        self.0.deserialize(src)
    }
}

#[test]
fn test_scalar_bijection() {
    let mut ctx = Context::default();

    ctx.check_multi(&[true, false]);

    ctx.check_multi(&[i32::MIN, -1i32, 0i32, 1i32, i32::MAX]);
    ctx.check_multi(&[i64::MIN, -1i64, 0i64, 1i64, i64::MAX]);

    ctx.check_multi(&[u32::MIN, 1u32, 2u32, u32::MAX]);
    ctx.check_multi(&[u64::MIN, 1u64, 2u64, u64::MAX]);
}

#[test]
fn test_array_bijection() {
    let mut ctx = Context::default();

    ctx.check(&[1u8]);
    ctx.check(&[1u8, 2u8, 3u8]);
    ctx.check(&[1u8, 2u8, 3u8, 4u8, 5u8, 6u8]);
}

#[test]
fn test_str_bijection() {
    let mut ctx = Context::default();

    ctx.check_multi(&[
        TestForString(String::from("")),
        TestForString(String::from("abc1234+-")),
        TestForString(String::from("abc")),
    ]);
}

#[test]
fn test_vec_bijection() {
    let mut ctx = Context::default();

    ctx.check_multi(&[
        TestForVecU8(vec![]),
        TestForVecU8(vec![1u8]),
        TestForVecU8(vec![1u8, 2u8, 3u8]),
        TestForVecU8(vec![1u8, 2u8, 3u8, 4u8]),
    ]);
}

#[test]
fn test_nfsstring_bijection() {
    let mut ctx = Context::default();

    ctx.check_multi(&[
        nfs3::nfsstring::default(),
        nfs3::nfsstring::from("file.txt"),
        nfs3::nfsstring::from("7:42"),
    ]);
}

#[test]
fn test_handle_wire_form_is_nul_terminated_ascii() {
    // the server issues "<fsid>:<fileid>" with a trailing NUL; the opaque
    // codec must carry the terminator through untouched
    let handle = nfs3::nfs_fh3 { data: b"3:17\0".to_vec() };
    let mut buf = Vec::new();
    handle.serialize(&mut buf).expect("serialize handle");
    // length prefix + 5 bytes payload + 3 bytes pad
    assert_eq!(buf.len(), 12);
    assert_eq!(&buf[..4], &5u32.to_be_bytes());

    let decoded = deserialize::<nfs3::nfs_fh3>(&mut &buf[..]).expect("deserialize handle");
    assert_eq!(decoded.data, handle.data);
}
