//! Transport tests: bring the loopback service up for real, speak
//! record-marked RPC to it over TCP, and check the framing and dispatch.

use std::io::{Cursor, Read, Write};
use std::net::TcpStream;
use std::time::Duration;

mod support;

use kfs::xdr::{self, deserialize, nfs3, Serialize};

use support::*;

fn connect() -> TcpStream {
    let port = kfs::tcp::ensure_service().expect("service");
    let stream = TcpStream::connect(("127.0.0.1", port)).expect("connect");
    stream.set_read_timeout(Some(Duration::from_secs(5))).expect("read timeout");
    stream.set_write_timeout(Some(Duration::from_secs(5))).expect("write timeout");
    stream
}

fn call(stream: &mut TcpStream, xid: u32, prog: u32, vers: u32, proc: u32, args: &[u8]) {
    let msg = xdr::rpc::rpc_msg {
        xid,
        body: xdr::rpc::rpc_body::CALL(xdr::rpc::call_body {
            rpcvers: 2,
            prog,
            vers,
            proc,
            cred: xdr::rpc::opaque_auth::default(),
            verf: xdr::rpc::opaque_auth::default(),
        }),
    };
    let mut record = Vec::new();
    msg.serialize(&mut record).expect("serialize call");
    record.extend_from_slice(args);

    let header = (record.len() as u32) | (1 << 31);
    stream.write_all(&header.to_be_bytes()).expect("write header");
    stream.write_all(&record).expect("write record");
}

fn reply(stream: &mut TcpStream) -> Cursor<Vec<u8>> {
    let mut record = Vec::new();
    loop {
        let mut header_buf = [0_u8; 4];
        stream.read_exact(&mut header_buf).expect("read header");
        let header = u32::from_be_bytes(header_buf);
        let length = (header & ((1 << 31) - 1)) as usize;
        let start = record.len();
        record.resize(start + length, 0);
        stream.read_exact(&mut record[start..]).expect("read record");
        if header & (1 << 31) != 0 {
            return Cursor::new(record);
        }
    }
}

#[test]
fn null_round_trips_over_tcp() {
    let mut stream = connect();
    call(&mut stream, 11, nfs3::PROGRAM, nfs3::VERSION, 0, &[]);

    let mut cursor = reply(&mut stream);
    let msg = deserialize::<xdr::rpc::rpc_msg>(&mut cursor).expect("reply");
    assert_eq!(msg.xid, 11);
    match msg.body {
        xdr::rpc::rpc_body::REPLY(xdr::rpc::reply_body::MSG_ACCEPTED(accepted)) => {
            assert!(matches!(accepted.reply_data, xdr::rpc::accept_body::SUCCESS));
        }
        other => panic!("expected MSG_ACCEPTED, got {other:?}"),
    }
}

#[test]
fn getattr_round_trips_over_tcp() {
    let (_, root) = register(MemFs::new());
    let mut stream = connect();
    call(&mut stream, 12, nfs3::PROGRAM, nfs3::VERSION, 1, &encode(&root));

    let mut cursor = reply(&mut stream);
    let msg = deserialize::<xdr::rpc::rpc_msg>(&mut cursor).expect("reply");
    assert_eq!(msg.xid, 12);
    let status = deserialize::<nfs3::nfsstat3>(&mut cursor).expect("status");
    assert_eq!(status, nfs3::nfsstat3::NFS3_OK);
    let attrs = deserialize::<nfs3::fattr3>(&mut cursor).expect("attributes");
    assert_eq!(attrs.ftype, nfs3::ftype3::NF3DIR);
}

#[test]
fn requests_on_one_connection_are_answered_in_order() {
    let (_, root) = register(MemFs::new());
    let mut stream = connect();
    for xid in 20..25 {
        call(&mut stream, xid, nfs3::PROGRAM, nfs3::VERSION, 1, &encode(&root));
    }
    for xid in 20..25 {
        let mut cursor = reply(&mut stream);
        let msg = deserialize::<xdr::rpc::rpc_msg>(&mut cursor).expect("reply");
        assert_eq!(msg.xid, xid);
    }
}

#[test]
fn mount_program_answers_over_tcp() {
    let mut stream = connect();
    // MOUNTPROC3_MNT with an arbitrary dirpath argument
    call(&mut stream, 13, 100005, 3, 1, &encode(&b"/export".to_vec()));

    let mut cursor = reply(&mut stream);
    let msg = deserialize::<xdr::rpc::rpc_msg>(&mut cursor).expect("reply");
    assert_eq!(msg.xid, 13);
    let status = deserialize::<u32>(&mut cursor).expect("mount status");
    assert_eq!(status, 10004); // MNT3ERR_NOTSUPP
}
