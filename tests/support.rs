//! Shared test fixtures: an in-memory filesystem with fully controlled
//! metadata, a passthrough filesystem backed by a real directory, and
//! helpers that drive the NFSv3 engine through serialized calls the way
//! the RPC layer would.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

use kfs::contents::Contents;
use kfs::protocol::nfs::v3::handle_nfs;
use kfs::protocol::rpc::Context;
use kfs::table::{self, Descriptor};
use kfs::vfs::{self, Capabilities, Errno, KfsFileSystem, Stat, StatFs, TimeSpec};
use kfs::xdr::{self, deserialize, nfs3, Serialize};
use kfs::FsId;

// ---------------------------------------------------------------------------
// engine driving helpers

/// Installs a subscriber once so failing tests show the engine's logs.
pub fn init_logging() {
    use std::sync::Once;
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_test_writer()
            .try_init();
    });
}

/// Serializes a value the way the client would serialize call arguments.
pub fn encode<T: Serialize>(value: &T) -> Vec<u8> {
    let mut buf = Vec::new();
    value.serialize(&mut buf).expect("serialize arguments");
    buf
}

/// Runs one NFSv3 procedure through the dispatcher and returns a cursor
/// positioned after the RPC reply header, i.e. at the procedure status.
pub fn nfs_call(proc: nfs3::NFSProgram, args: Vec<u8>) -> Cursor<Vec<u8>> {
    let xid = 7;
    let call = xdr::rpc::call_body {
        rpcvers: 2,
        prog: nfs3::PROGRAM,
        vers: nfs3::VERSION,
        proc: proc as u32,
        cred: xdr::rpc::opaque_auth::default(),
        verf: xdr::rpc::opaque_auth::default(),
    };
    let context = Context { local_port: 0, client_addr: "127.0.0.1:1234".to_string() };

    let mut input = Cursor::new(args);
    let mut reply = Vec::new();
    {
        let mut output = Cursor::new(&mut reply);
        handle_nfs(xid, call, &mut input, &mut output, &context).expect("handle_nfs");
    }

    let mut cursor = Cursor::new(reply);
    let msg = deserialize::<xdr::rpc::rpc_msg>(&mut cursor).expect("reply header");
    assert_eq!(msg.xid, xid);
    match msg.body {
        xdr::rpc::rpc_body::REPLY(xdr::rpc::reply_body::MSG_ACCEPTED(accepted)) => {
            assert!(matches!(accepted.reply_data, xdr::rpc::accept_body::SUCCESS));
        }
        other => panic!("expected MSG_ACCEPTED, got {other:?}"),
    }
    cursor
}

/// Reads the procedure status from a reply cursor.
pub fn read_status(cursor: &mut Cursor<Vec<u8>>) -> nfs3::nfsstat3 {
    deserialize::<nfs3::nfsstat3>(cursor).expect("status")
}

/// Registers a filesystem directly with the mount table, bypassing the
/// kernel mount, and returns its id plus the bootstrap root handle (the
/// raw ASCII id, the same form the mount syscall hands the kernel).
pub fn register(fs: impl KfsFileSystem + 'static) -> (FsId, nfs3::nfs_fh3) {
    register_shared(Arc::new(fs))
}

/// Like [`register`], for tests that keep their own reference to the
/// filesystem to inspect its state afterwards.
pub fn register_shared(fs: Arc<dyn KfsFileSystem>) -> (FsId, nfs3::nfs_fh3) {
    init_logging();
    let identifier = table::put(Descriptor::new(fs, "/tmp/kfs-test-unused".to_string()))
        .expect("mount table slot");
    let root = nfs3::nfs_fh3 { data: format!("{identifier}").into_bytes() };
    (identifier, root)
}

/// LOOKUP `name` under `dir`, expecting success; returns the child handle.
pub fn lookup(dir: &nfs3::nfs_fh3, name: &str) -> nfs3::nfs_fh3 {
    let args = nfs3::diropargs3 { dir: dir.clone(), name: nfs3::filename3::from(name) };
    let mut reply = nfs_call(nfs3::NFSProgram::NFSPROC3_LOOKUP, encode(&args));
    let status = read_status(&mut reply);
    assert_eq!(status, nfs3::nfsstat3::NFS3_OK, "lookup {name}");
    deserialize::<nfs3::nfs_fh3>(&mut reply).expect("object handle")
}

/// GETATTR on `object`, expecting success.
pub fn getattr(object: &nfs3::nfs_fh3) -> nfs3::fattr3 {
    let mut reply = nfs_call(nfs3::NFSProgram::NFSPROC3_GETATTR, encode(object));
    let status = read_status(&mut reply);
    assert_eq!(status, nfs3::nfsstat3::NFS3_OK, "getattr");
    deserialize::<nfs3::fattr3>(&mut reply).expect("attributes")
}

/// CREATE (UNCHECKED, default attributes) of `name` under `dir`.
pub fn create(dir: &nfs3::nfs_fh3, name: &str) -> nfs3::nfs_fh3 {
    let args = nfs3::CREATE3args {
        dirops: nfs3::diropargs3 { dir: dir.clone(), name: nfs3::filename3::from(name) },
        how: nfs3::createhow3::UNCHECKED(nfs3::sattr3::default()),
    };
    let mut reply = nfs_call(nfs3::NFSProgram::NFSPROC3_CREATE, encode(&args));
    let status = read_status(&mut reply);
    assert_eq!(status, nfs3::nfsstat3::NFS3_OK, "create {name}");
    let handle = deserialize::<nfs3::post_op_fh3>(&mut reply).expect("handle union");
    match handle {
        nfs3::post_op_fh3::handle(fh) => fh,
        nfs3::post_op_fh3::Void => panic!("create returned no handle"),
    }
}

/// WRITE `data` at `offset`, expecting success; returns the written count.
pub fn write(object: &nfs3::nfs_fh3, offset: u64, data: &[u8]) -> u32 {
    let args = nfs3::file::WRITE3args {
        file: object.clone(),
        offset,
        count: data.len() as u32,
        stable: nfs3::file::stable_how::FILE_SYNC as u32,
        data: data.to_vec(),
    };
    let mut reply = nfs_call(nfs3::NFSProgram::NFSPROC3_WRITE, encode(&args));
    let status = read_status(&mut reply);
    assert_eq!(status, nfs3::nfsstat3::NFS3_OK, "write");
    let res = deserialize::<nfs3::file::WRITE3resok>(&mut reply).expect("write result");
    assert_eq!(res.committed, nfs3::file::stable_how::FILE_SYNC);
    res.count
}

/// READ `count` bytes at `offset`; returns `(status, data, eof)`.
pub fn read(object: &nfs3::nfs_fh3, offset: u64, count: u32) -> (nfs3::nfsstat3, Vec<u8>, bool) {
    let args = nfs3::file::READ3args { file: object.clone(), offset, count };
    let mut reply = nfs_call(nfs3::NFSProgram::NFSPROC3_READ, encode(&args));
    let status = read_status(&mut reply);
    if status != nfs3::nfsstat3::NFS3_OK {
        return (status, Vec::new(), false);
    }
    let res = deserialize::<nfs3::file::READ3resok>(&mut reply).expect("read result");
    (status, res.data, res.eof)
}

/// SETATTR applying just `sattr`, without a guard; returns the status.
pub fn setattr(object: &nfs3::nfs_fh3, sattr: nfs3::sattr3) -> nfs3::nfsstat3 {
    let args = nfs3::SETATTR3args {
        object: object.clone(),
        new_attributes: sattr,
        guard: nfs3::sattrguard3::Void,
    };
    let mut reply = nfs_call(nfs3::NFSProgram::NFSPROC3_SETATTR, encode(&args));
    read_status(&mut reply)
}

/// REMOVE `name` under `dir`; returns the status.
pub fn remove(dir: &nfs3::nfs_fh3, name: &str) -> nfs3::nfsstat3 {
    let args = nfs3::diropargs3 { dir: dir.clone(), name: nfs3::filename3::from(name) };
    let mut reply = nfs_call(nfs3::NFSProgram::NFSPROC3_REMOVE, encode(&args));
    read_status(&mut reply)
}

/// RMDIR `name` under `dir`; returns the status.
pub fn rmdir(dir: &nfs3::nfs_fh3, name: &str) -> nfs3::nfsstat3 {
    let args = nfs3::diropargs3 { dir: dir.clone(), name: nfs3::filename3::from(name) };
    let mut reply = nfs_call(nfs3::NFSProgram::NFSPROC3_RMDIR, encode(&args));
    read_status(&mut reply)
}

/// MKDIR `name` under `dir`, expecting success.
pub fn mkdir(dir: &nfs3::nfs_fh3, name: &str) -> nfs3::nfsstat3 {
    let args = nfs3::dir::MKDIR3args {
        dirops: nfs3::diropargs3 { dir: dir.clone(), name: nfs3::filename3::from(name) },
        attributes: nfs3::sattr3::default(),
    };
    let mut reply = nfs_call(nfs3::NFSProgram::NFSPROC3_MKDIR, encode(&args));
    read_status(&mut reply)
}

/// RENAME `from_name` to `to_name` within `dir`; returns the status.
pub fn rename(dir: &nfs3::nfs_fh3, from_name: &str, to_name: &str) -> nfs3::nfsstat3 {
    let mut args = encode(&nfs3::diropargs3 {
        dir: dir.clone(),
        name: nfs3::filename3::from(from_name),
    });
    args.extend(encode(&nfs3::diropargs3 {
        dir: dir.clone(),
        name: nfs3::filename3::from(to_name),
    }));
    let mut reply = nfs_call(nfs3::NFSProgram::NFSPROC3_RENAME, args);
    read_status(&mut reply)
}

/// SYMLINK `name` -> `target` under `dir`; returns the status.
pub fn symlink(dir: &nfs3::nfs_fh3, name: &str, target: &str) -> nfs3::nfsstat3 {
    let args = nfs3::dir::SYMLINK3args {
        dirops: nfs3::diropargs3 { dir: dir.clone(), name: nfs3::filename3::from(name) },
        symlink: nfs3::symlinkdata3 {
            symlink_attributes: nfs3::sattr3::default(),
            symlink_data: nfs3::nfspath3::from(target),
        },
    };
    let mut reply = nfs_call(nfs3::NFSProgram::NFSPROC3_SYMLINK, encode(&args));
    read_status(&mut reply)
}

/// READLINK on `object`; returns `(status, target)`.
pub fn readlink(object: &nfs3::nfs_fh3) -> (nfs3::nfsstat3, String) {
    let mut reply = nfs_call(nfs3::NFSProgram::NFSPROC3_READLINK, encode(object));
    let status = read_status(&mut reply);
    if status != nfs3::nfsstat3::NFS3_OK {
        return (status, String::new());
    }
    let _attrs = deserialize::<nfs3::post_op_attr>(&mut reply).expect("post op attr");
    let target = deserialize::<nfs3::nfspath3>(&mut reply).expect("link target");
    (status, target.to_string())
}

// ---------------------------------------------------------------------------
// in-memory filesystem

#[derive(Clone, Copy)]
pub struct Meta {
    pub mode: u32,
    pub atime: TimeSpec,
    pub mtime: TimeSpec,
    pub ctime: TimeSpec,
}

impl Meta {
    fn file() -> Meta {
        Meta {
            mode: vfs::mode::IRUSR | vfs::mode::IWUSR | vfs::mode::IRGRP | vfs::mode::IROTH,
            atime: TimeSpec { sec: 2000, nsec: 0 },
            mtime: TimeSpec { sec: 2000, nsec: 0 },
            ctime: TimeSpec { sec: 2000, nsec: 400 },
        }
    }

    fn dir() -> Meta {
        Meta {
            mode: vfs::mode::IRUSR
                | vfs::mode::IWUSR
                | vfs::mode::IXUSR
                | vfs::mode::IRGRP
                | vfs::mode::IXGRP
                | vfs::mode::IROTH
                | vfs::mode::IXOTH,
            atime: TimeSpec { sec: 500, nsec: 0 },
            mtime: TimeSpec { sec: 500, nsec: 0 },
            ctime: TimeSpec { sec: 500, nsec: 100 },
        }
    }
}

#[derive(Clone)]
enum Node {
    File { data: Vec<u8>, meta: Meta },
    Dir { meta: Meta },
    Link { target: String, meta: Meta },
}

impl Node {
    fn meta(&self) -> &Meta {
        match self {
            Node::File { meta, .. } | Node::Dir { meta } | Node::Link { meta, .. } => meta,
        }
    }

    fn meta_mut(&mut self) -> &mut Meta {
        match self {
            Node::File { meta, .. } | Node::Dir { meta } | Node::Link { meta, .. } => meta,
        }
    }
}

/// A fully in-memory filesystem whose metadata the tests control exactly.
pub struct MemFs {
    nodes: Mutex<BTreeMap<String, Node>>,
    readdir_error: Option<Errno>,
}

impl MemFs {
    pub fn new() -> MemFs {
        let mut nodes = BTreeMap::new();
        nodes.insert("/".to_string(), Node::Dir { meta: Meta::dir() });
        MemFs { nodes: Mutex::new(nodes), readdir_error: None }
    }

    /// A filesystem whose `readdir` callback fails with `err`, for
    /// exercising the engine's status filtering.
    pub fn with_readdir_error(err: Errno) -> MemFs {
        let mut fs = MemFs::new();
        fs.readdir_error = Some(err);
        fs
    }

    pub fn contains(&self, path: &str) -> bool {
        self.nodes.lock().unwrap().contains_key(path)
    }

    pub fn file_len(&self, path: &str) -> Option<usize> {
        match self.nodes.lock().unwrap().get(path) {
            Some(Node::File { data, .. }) => Some(data.len()),
            _ => None,
        }
    }
}

impl KfsFileSystem for MemFs {
    fn statfs(&self, _path: &str) -> Result<StatFs, Errno> {
        Ok(StatFs { free: 1 << 20, size: 1 << 21 })
    }

    fn stat(&self, path: &str) -> Result<Stat, Errno> {
        let nodes = self.nodes.lock().unwrap();
        let node = nodes.get(path).ok_or(libc::ENOENT)?;
        let meta = node.meta();
        let (ftype, size) = match node {
            Node::File { data, .. } => (vfs::FileType::Reg, data.len() as u64),
            Node::Dir { .. } => (vfs::FileType::Dir, 0),
            Node::Link { target, .. } => (vfs::FileType::Lnk, target.len() as u64),
        };
        Ok(Stat {
            ftype,
            mode: meta.mode,
            size,
            used: size,
            atime: meta.atime,
            mtime: meta.mtime,
            ctime: meta.ctime,
        })
    }

    fn read(&self, path: &str, buf: &mut [u8], offset: u64) -> Result<usize, Errno> {
        let nodes = self.nodes.lock().unwrap();
        let Some(Node::File { data, .. }) = nodes.get(path) else {
            return Err(libc::ENOENT);
        };
        let start = (offset as usize).min(data.len());
        let count = buf.len().min(data.len() - start);
        buf[..count].copy_from_slice(&data[start..start + count]);
        Ok(count)
    }

    fn write(&self, path: &str, buf: &[u8], offset: u64) -> Result<usize, Errno> {
        let mut nodes = self.nodes.lock().unwrap();
        let Some(Node::File { data, .. }) = nodes.get_mut(path) else {
            return Err(libc::ENOENT);
        };
        let end = offset as usize + buf.len();
        if data.len() < end {
            data.resize(end, 0);
        }
        data[offset as usize..end].copy_from_slice(buf);
        Ok(buf.len())
    }

    fn symlink(&self, path: &str, target: &str) -> Result<(), Errno> {
        let mut nodes = self.nodes.lock().unwrap();
        if nodes.contains_key(path) {
            return Err(libc::EEXIST);
        }
        nodes.insert(path.to_string(), Node::Link { target: target.to_string(), meta: Meta::file() });
        Ok(())
    }

    fn readlink(&self, path: &str) -> Result<String, Errno> {
        match self.nodes.lock().unwrap().get(path) {
            Some(Node::Link { target, .. }) => Ok(target.clone()),
            Some(_) => Err(libc::EINVAL),
            None => Err(libc::ENOENT),
        }
    }

    fn create(&self, path: &str) -> Result<(), Errno> {
        let mut nodes = self.nodes.lock().unwrap();
        nodes.insert(path.to_string(), Node::File { data: Vec::new(), meta: Meta::file() });
        Ok(())
    }

    fn remove(&self, path: &str) -> Result<(), Errno> {
        let mut nodes = self.nodes.lock().unwrap();
        match nodes.get(path) {
            Some(Node::Dir { .. }) => Err(libc::EISDIR),
            Some(_) => {
                nodes.remove(path);
                Ok(())
            }
            None => Err(libc::ENOENT),
        }
    }

    fn rename(&self, path: &str, new_path: &str) -> Result<(), Errno> {
        let mut nodes = self.nodes.lock().unwrap();
        let node = nodes.remove(path).ok_or(libc::ENOENT)?;
        nodes.insert(new_path.to_string(), node);
        Ok(())
    }

    fn truncate(&self, path: &str, size: u64) -> Result<(), Errno> {
        let mut nodes = self.nodes.lock().unwrap();
        let Some(Node::File { data, .. }) = nodes.get_mut(path) else {
            return Err(libc::ENOENT);
        };
        data.resize(size as usize, 0);
        Ok(())
    }

    fn chmod(&self, path: &str, mode: u32) -> Result<(), Errno> {
        let mut nodes = self.nodes.lock().unwrap();
        let node = nodes.get_mut(path).ok_or(libc::ENOENT)?;
        node.meta_mut().mode = mode & vfs::mode::MASK;
        Ok(())
    }

    fn utimes(
        &self,
        path: &str,
        atime: Option<&TimeSpec>,
        mtime: Option<&TimeSpec>,
    ) -> Result<(), Errno> {
        let mut nodes = self.nodes.lock().unwrap();
        let node = nodes.get_mut(path).ok_or(libc::ENOENT)?;
        if let Some(atime) = atime {
            node.meta_mut().atime = *atime;
        }
        if let Some(mtime) = mtime {
            node.meta_mut().mtime = *mtime;
        }
        Ok(())
    }

    fn mkdir(&self, path: &str) -> Result<(), Errno> {
        let mut nodes = self.nodes.lock().unwrap();
        if nodes.contains_key(path) {
            return Err(libc::EEXIST);
        }
        nodes.insert(path.to_string(), Node::Dir { meta: Meta::dir() });
        Ok(())
    }

    fn rmdir(&self, path: &str) -> Result<(), Errno> {
        let mut nodes = self.nodes.lock().unwrap();
        match nodes.get(path) {
            Some(Node::Dir { .. }) => {}
            Some(_) => return Err(libc::ENOTDIR),
            None => return Err(libc::ENOENT),
        }
        let prefix = format!("{path}/");
        if nodes.keys().any(|key| key.starts_with(&prefix)) {
            return Err(libc::ENOTEMPTY);
        }
        nodes.remove(path);
        Ok(())
    }

    fn readdir(&self, path: &str, contents: &mut Contents) -> Result<(), Errno> {
        if let Some(err) = self.readdir_error {
            return Err(err);
        }
        let nodes = self.nodes.lock().unwrap();
        match nodes.get(path) {
            Some(Node::Dir { .. }) => {}
            Some(_) => return Err(libc::ENOTDIR),
            None => return Err(libc::ENOENT),
        }
        let prefix = if path == "/" { "/".to_string() } else { format!("{path}/") };
        for key in nodes.keys() {
            if let Some(rest) = key.strip_prefix(&prefix) {
                if !rest.is_empty() && !rest.contains('/') {
                    contents.append(rest.to_string());
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// passthrough filesystem over a real directory

const POSIX_MODE_PAIRS: [(u32, u32); 9] = [
    (0o400, vfs::mode::IRUSR),
    (0o200, vfs::mode::IWUSR),
    (0o100, vfs::mode::IXUSR),
    (0o040, vfs::mode::IRGRP),
    (0o020, vfs::mode::IWGRP),
    (0o010, vfs::mode::IXGRP),
    (0o004, vfs::mode::IROTH),
    (0o002, vfs::mode::IWOTH),
    (0o001, vfs::mode::IXOTH),
];

pub fn mode_from_posix(mode: u32) -> u32 {
    POSIX_MODE_PAIRS
        .iter()
        .filter(|(posix, _)| mode & posix != 0)
        .fold(0, |acc, (_, kfs)| acc | kfs)
}

pub fn mode_to_posix(mode: u32) -> u32 {
    POSIX_MODE_PAIRS
        .iter()
        .filter(|(_, kfs)| mode & kfs != 0)
        .fold(0, |acc, (posix, _)| acc | posix)
}

fn io_errno(error: std::io::Error) -> Errno {
    error.raw_os_error().unwrap_or(libc::EIO)
}

/// A filesystem that mirrors a backing directory on the host, the shape an
/// application would use to re-export part of the real tree.
pub struct PassthroughFs {
    root: std::path::PathBuf,
}

impl PassthroughFs {
    pub fn new(root: std::path::PathBuf) -> PassthroughFs {
        PassthroughFs { root }
    }

    fn real(&self, path: &str) -> std::path::PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

impl KfsFileSystem for PassthroughFs {
    fn statfs(&self, _path: &str) -> Result<StatFs, Errno> {
        Ok(StatFs { free: 1 << 30, size: 1 << 31 })
    }

    fn stat(&self, path: &str) -> Result<Stat, Errno> {
        use std::os::unix::fs::MetadataExt;

        let meta = std::fs::symlink_metadata(self.real(path)).map_err(io_errno)?;
        let ftype = if meta.file_type().is_dir() {
            vfs::FileType::Dir
        } else if meta.file_type().is_symlink() {
            vfs::FileType::Lnk
        } else {
            vfs::FileType::Reg
        };
        Ok(Stat {
            ftype,
            mode: mode_from_posix(meta.mode() & 0o777),
            size: meta.len(),
            used: meta.blocks() * 512,
            atime: TimeSpec { sec: meta.atime() as u64, nsec: meta.atime_nsec() as u64 },
            mtime: TimeSpec { sec: meta.mtime() as u64, nsec: meta.mtime_nsec() as u64 },
            ctime: TimeSpec { sec: meta.ctime() as u64, nsec: meta.ctime_nsec() as u64 },
        })
    }

    fn read(&self, path: &str, buf: &mut [u8], offset: u64) -> Result<usize, Errno> {
        use std::os::unix::fs::FileExt;

        let file = std::fs::File::open(self.real(path)).map_err(io_errno)?;
        file.read_at(buf, offset).map_err(io_errno)
    }

    fn write(&self, path: &str, buf: &[u8], offset: u64) -> Result<usize, Errno> {
        use std::os::unix::fs::FileExt;

        let file = std::fs::OpenOptions::new()
            .write(true)
            .open(self.real(path))
            .map_err(io_errno)?;
        file.write_at(buf, offset).map_err(io_errno)
    }

    fn symlink(&self, path: &str, target: &str) -> Result<(), Errno> {
        std::os::unix::fs::symlink(target, self.real(path)).map_err(io_errno)
    }

    fn readlink(&self, path: &str) -> Result<String, Errno> {
        let target = std::fs::read_link(self.real(path)).map_err(io_errno)?;
        Ok(target.to_string_lossy().into_owned())
    }

    fn create(&self, path: &str) -> Result<(), Errno> {
        std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.real(path))
            .map(|_| ())
            .map_err(io_errno)
    }

    fn remove(&self, path: &str) -> Result<(), Errno> {
        std::fs::remove_file(self.real(path)).map_err(io_errno)
    }

    fn rename(&self, path: &str, new_path: &str) -> Result<(), Errno> {
        std::fs::rename(self.real(path), self.real(new_path)).map_err(io_errno)
    }

    fn truncate(&self, path: &str, size: u64) -> Result<(), Errno> {
        let file = std::fs::OpenOptions::new()
            .write(true)
            .open(self.real(path))
            .map_err(io_errno)?;
        file.set_len(size).map_err(io_errno)
    }

    fn chmod(&self, path: &str, mode: u32) -> Result<(), Errno> {
        use std::os::unix::fs::PermissionsExt;

        let permissions = std::fs::Permissions::from_mode(mode_to_posix(mode));
        std::fs::set_permissions(self.real(path), permissions).map_err(io_errno)
    }

    fn utimes(
        &self,
        path: &str,
        atime: Option<&TimeSpec>,
        mtime: Option<&TimeSpec>,
    ) -> Result<(), Errno> {
        let real = self.real(path);
        let meta = std::fs::metadata(&real).map_err(io_errno)?;
        let atime = atime
            .map(|time| (*time).into())
            .unwrap_or_else(|| filetime::FileTime::from_last_access_time(&meta));
        let mtime = mtime
            .map(|time| (*time).into())
            .unwrap_or_else(|| filetime::FileTime::from_last_modification_time(&meta));
        filetime::set_file_times(&real, atime, mtime).map_err(io_errno)
    }

    fn mkdir(&self, path: &str) -> Result<(), Errno> {
        std::fs::create_dir(self.real(path)).map_err(io_errno)
    }

    fn rmdir(&self, path: &str) -> Result<(), Errno> {
        std::fs::remove_dir(self.real(path)).map_err(io_errno)
    }

    fn readdir(&self, path: &str, contents: &mut Contents) -> Result<(), Errno> {
        for entry in std::fs::read_dir(self.real(path)).map_err(io_errno)? {
            let entry = entry.map_err(io_errno)?;
            contents.append(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(())
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::ReadWrite
    }
}
