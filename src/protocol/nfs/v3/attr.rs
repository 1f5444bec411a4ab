//! Attribute translation between the callback contract and NFSv3.
//!
//! `Stat` becomes `fattr3` with a bit-by-bit mode translation (the library
//! and NFS use different bit assignments), a link count of 1, ownership
//! pinned to the calling process, and the file id taken from the path
//! registry. `sattr3` is applied by decomposing it into `truncate`,
//! `chmod` and `utimes` callback invocations in that order, stopping at the
//! first failure.

use crate::fileid;
use crate::protocol::xdr::nfs3;
use crate::vfs::{self, FileType, Stat, TimeSpec};
use crate::FsId;

use super::handle;
use super::status;

const NFS_IRUSR: u32 = 0x00100;
const NFS_IWUSR: u32 = 0x00080;
const NFS_IXUSR: u32 = 0x00040;
const NFS_IRGRP: u32 = 0x00020;
const NFS_IWGRP: u32 = 0x00010;
const NFS_IXGRP: u32 = 0x00008;
const NFS_IROTH: u32 = 0x00004;
const NFS_IWOTH: u32 = 0x00002;
const NFS_IXOTH: u32 = 0x00001;

const MODE_BIT_PAIRS: [(u32, u32); 9] = [
    (vfs::mode::IRUSR, NFS_IRUSR),
    (vfs::mode::IWUSR, NFS_IWUSR),
    (vfs::mode::IXUSR, NFS_IXUSR),
    (vfs::mode::IRGRP, NFS_IRGRP),
    (vfs::mode::IWGRP, NFS_IWGRP),
    (vfs::mode::IXGRP, NFS_IXGRP),
    (vfs::mode::IROTH, NFS_IROTH),
    (vfs::mode::IWOTH, NFS_IWOTH),
    (vfs::mode::IXOTH, NFS_IXOTH),
];

/// Translates library mode bits into NFS mode bits.
pub fn mode_to_nfs(mode: u32) -> u32 {
    MODE_BIT_PAIRS
        .iter()
        .filter(|(kfs, _)| mode & kfs != 0)
        .fold(0, |acc, (_, nfs)| acc | nfs)
}

/// Translates NFS mode bits into library mode bits.
pub fn mode_from_nfs(mode: u32) -> u32 {
    MODE_BIT_PAIRS
        .iter()
        .filter(|(_, nfs)| mode & nfs != 0)
        .fold(0, |acc, (kfs, _)| acc | kfs)
}

/// Effective uid of this process, the owner of every exposed file.
pub fn process_uid() -> u32 {
    unsafe { libc::getuid() }
}

/// Effective gid of this process, the group of every exposed file.
pub fn process_gid() -> u32 {
    unsafe { libc::getgid() }
}

fn nfstime(time: TimeSpec) -> nfs3::nfstime3 {
    nfs3::nfstime3 { seconds: time.sec as u32, nseconds: time.nsec as u32 }
}

/// Builds `fattr3` from a callback `Stat`.
pub fn fattr_from_stat(fsid: FsId, path: &str, sbuf: &Stat) -> nfs3::fattr3 {
    nfs3::fattr3 {
        ftype: match sbuf.ftype {
            FileType::Reg => nfs3::ftype3::NF3REG,
            FileType::Dir => nfs3::ftype3::NF3DIR,
            FileType::Blk => nfs3::ftype3::NF3BLK,
            FileType::Chr => nfs3::ftype3::NF3CHR,
            FileType::Lnk => nfs3::ftype3::NF3LNK,
            FileType::Sock => nfs3::ftype3::NF3SOCK,
            FileType::Fifo => nfs3::ftype3::NF3FIFO,
        },
        mode: mode_to_nfs(sbuf.mode),
        nlink: 1,
        uid: process_uid(),
        gid: process_gid(),
        size: sbuf.size,
        used: sbuf.used,
        rdev: nfs3::specdata3::default(),
        fsid: 0,
        fileid: fileid::fileid(fsid, path),
        atime: nfstime(sbuf.atime),
        mtime: nfstime(sbuf.mtime),
        ctime: nfstime(sbuf.ctime),
    }
}

/// Resolves a handle and stats it.
///
/// Fails with `BADHANDLE` for an unresolvable handle and maps a `stat`
/// callback failure with a default of `NOENT`.
pub fn get_fattr(object: &nfs3::nfs_fh3) -> Result<nfs3::fattr3, nfs3::nfsstat3> {
    let resolved = handle::resolve(object)?;
    match resolved.desc.fs.stat(&resolved.path) {
        Ok(sbuf) => Ok(fattr_from_stat(resolved.fsid, &resolved.path, &sbuf)),
        Err(err) => Err(status::from_errno(err, nfs3::nfsstat3::NFS3ERR_NOENT)),
    }
}

fn timespec(time: nfs3::nfstime3) -> TimeSpec {
    TimeSpec { sec: u64::from(time.seconds), nsec: u64::from(time.nseconds) }
}

fn server_time() -> TimeSpec {
    match std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH) {
        Ok(elapsed) => TimeSpec { sec: elapsed.as_secs(), nsec: u64::from(elapsed.subsec_nanos()) },
        Err(_) => TimeSpec::default(),
    }
}

/// Applies a `sattr3` to the object behind a handle.
///
/// Order of application is truncate, chmod, utimes; the first failure wins.
/// Ownership changes are accepted only when they are no-ops: the process
/// uid, and the process gid or 0. Anything else is `NOTSUPP`.
pub fn set_fattr(object: &nfs3::nfs_fh3, attrs: &nfs3::sattr3) -> nfs3::nfsstat3 {
    let resolved = match handle::resolve(object) {
        Ok(resolved) => resolved,
        Err(status) => return status,
    };
    let fs = &resolved.desc.fs;
    let path = &resolved.path;

    if let nfs3::set_size3::size(size) = attrs.size {
        if let Err(err) = fs.truncate(path, size) {
            return status::from_errno(err, nfs3::nfsstat3::NFS3ERR_NOENT);
        }
    }

    if let nfs3::set_mode3::mode(mode) = attrs.mode {
        if let Err(err) = fs.chmod(path, mode_from_nfs(mode)) {
            return status::from_errno(err, nfs3::nfsstat3::NFS3ERR_NOENT);
        }
    }

    let atime = match attrs.atime {
        nfs3::set_atime::DONT_CHANGE => None,
        nfs3::set_atime::SET_TO_SERVER_TIME => Some(server_time()),
        nfs3::set_atime::SET_TO_CLIENT_TIME(time) => Some(timespec(time)),
    };
    let mtime = match attrs.mtime {
        nfs3::set_mtime::DONT_CHANGE => None,
        nfs3::set_mtime::SET_TO_SERVER_TIME => Some(server_time()),
        nfs3::set_mtime::SET_TO_CLIENT_TIME(time) => Some(timespec(time)),
    };
    if atime.is_some() || mtime.is_some() {
        if let Err(err) = fs.utimes(path, atime.as_ref(), mtime.as_ref()) {
            return status::from_errno(err, nfs3::nfsstat3::NFS3ERR_NOENT);
        }
    }

    if let nfs3::set_uid3::uid(uid) = attrs.uid {
        if uid != process_uid() {
            return nfs3::nfsstat3::NFS3ERR_NOTSUPP;
        }
    }

    if let nfs3::set_gid3::gid(gid) = attrs.gid {
        if gid != process_gid() && gid != 0 {
            return nfs3::nfsstat3::NFS3ERR_NOTSUPP;
        }
    }

    nfs3::nfsstat3::NFS3_OK
}
