//! Host NFS mount and unmount syscalls.
//!
//! On BSD-style hosts the kernel client is handed a ready-made argument
//! block including the root file handle, which is how a mount is
//! bootstrapped without any MOUNT protocol traffic: the handle is the
//! ASCII filesystem id, and the engine treats a handle without a `:` as
//! the root directory. The argument structure is defined in an NFS header
//! hidden behind private ifdefs on the host, but its layout is shared
//! across BSD systems and reproduced here.
//!
//! Linux has no public equivalent of the handle-carrying argument block;
//! there the kernel's string-option NFS mount is used, which negotiates
//! the root handle through the MOUNT protocol instead.

use std::ffi::CString;
use std::io;

use crate::FsId;

/// Device name prefix used for mount hostnames (`kfs<FsId>`).
pub const DEV_PREFIX: &str = "kfs";

fn cstring(text: &str) -> io::Result<CString> {
    CString::new(text)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "path contains a NUL byte"))
}

/// Initial timeout handed to the kernel client, in tenths of a second.
const NFS_TIMEO: i32 = 1;
/// Number of request retries before the kernel client reports an error.
const NFS_RETRANS: i32 = 4;

#[cfg(target_os = "macos")]
mod sys {
    use super::*;
    use crate::protocol::nfs::v3::{DIR_MAX_LEN, READ_MAX_LEN, WRITE_MAX_LEN};

    const NFSMNT_NFSV3: i32 = 0x00000200;
    const NFSMNT_WSIZE: i32 = 0x00000002;
    const NFSMNT_RSIZE: i32 = 0x00000004;
    const NFSMNT_READDIRSIZE: i32 = 0x00020000;
    const NFSMNT_TIMEO: i32 = 0x00000008;
    const NFSMNT_RETRANS: i32 = 0x00000010;
    const NFSMNT_DEADTIMEOUT: i32 = 0x00001000;
    const NFSMNT_NOLOCKS: i32 = 0x00040000;

    /// The version 3 NFS mount argument block shared across BSD systems.
    #[repr(C)]
    struct NfsArgs3 {
        version: i32,
        addr: *mut libc::sockaddr,
        addrlen: i32,
        sotype: i32,
        proto: i32,
        fh: *mut libc::c_uchar,
        fhsize: i32,
        flags: i32,
        wsize: i32,
        rsize: i32,
        readdirsize: i32,
        timeo: i32,
        retrans: i32,
        maxgrouplist: i32,
        readahead: i32,
        leaseterm: i32,
        deadthresh: i32,
        hostname: *mut libc::c_char,
    }

    pub fn mount_nfs(mountpoint: &str, port: u16, id: FsId, read_only: bool) -> io::Result<()> {
        let fstype = cstring("nfs")?;
        let target = cstring(mountpoint)?;
        let hostname = cstring(&format!("{DEV_PREFIX}{id}"))?;
        // the raw id bootstraps the root handle; no NUL, fhsize is strlen
        let mut fhandle = format!("{id}").into_bytes();

        let mut addr: libc::sockaddr_in = unsafe { std::mem::zeroed() };
        addr.sin_len = std::mem::size_of::<libc::sockaddr_in>() as u8;
        addr.sin_family = libc::AF_INET as libc::sa_family_t;
        addr.sin_port = port.to_be();
        addr.sin_addr = libc::in_addr { s_addr: 0x7f000001_u32.to_be() };

        let mut args = NfsArgs3 {
            version: 3,
            addr: &mut addr as *mut libc::sockaddr_in as *mut libc::sockaddr,
            addrlen: std::mem::size_of::<libc::sockaddr_in>() as i32,
            sotype: libc::SOCK_STREAM,
            proto: libc::IPPROTO_TCP,
            fh: fhandle.as_mut_ptr(),
            fhsize: fhandle.len() as i32,
            flags: NFSMNT_NFSV3
                | NFSMNT_WSIZE
                | NFSMNT_RSIZE
                | NFSMNT_READDIRSIZE
                | NFSMNT_TIMEO
                | NFSMNT_RETRANS
                | NFSMNT_NOLOCKS
                | NFSMNT_DEADTIMEOUT,
            wsize: WRITE_MAX_LEN as i32,
            rsize: READ_MAX_LEN as i32,
            readdirsize: DIR_MAX_LEN as i32,
            timeo: NFS_TIMEO,
            retrans: NFS_RETRANS,
            maxgrouplist: 0,
            readahead: 0,
            leaseterm: 0,
            deadthresh: 0,
            hostname: hostname.as_ptr() as *mut libc::c_char,
        };

        let mut flags = libc::MNT_SYNCHRONOUS;
        if read_only {
            flags |= libc::MNT_RDONLY;
        }
        let rc = unsafe {
            libc::mount(
                fstype.as_ptr(),
                target.as_ptr(),
                flags,
                &mut args as *mut NfsArgs3 as *mut libc::c_void,
            )
        };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    pub fn unmount_force(mountpoint: &str) -> io::Result<()> {
        let target = cstring(mountpoint)?;
        let rc = unsafe { libc::unmount(target.as_ptr(), libc::MNT_FORCE) };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

#[cfg(target_os = "linux")]
mod sys {
    use super::*;
    use crate::protocol::nfs::v3::{READ_MAX_LEN, WRITE_MAX_LEN};

    pub fn mount_nfs(mountpoint: &str, port: u16, id: FsId, read_only: bool) -> io::Result<()> {
        let source = cstring(&format!("127.0.0.1:/{id}"))?;
        let target = cstring(mountpoint)?;
        let fstype = cstring("nfs")?;
        let data = cstring(&format!(
            "addr=127.0.0.1,vers=3,proto=tcp,port={port},mountport={port},\
             rsize={READ_MAX_LEN},wsize={WRITE_MAX_LEN},timeo={NFS_TIMEO},\
             retrans={NFS_RETRANS},nolock,actimeo=1"
        ))?;

        let mut flags = libc::MS_SYNCHRONOUS;
        if read_only {
            flags |= libc::MS_RDONLY;
        }
        let rc = unsafe {
            libc::mount(
                source.as_ptr(),
                target.as_ptr(),
                fstype.as_ptr(),
                flags,
                data.as_ptr() as *const libc::c_void,
            )
        };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    pub fn unmount_force(mountpoint: &str) -> io::Result<()> {
        let target = cstring(mountpoint)?;
        let rc = unsafe { libc::umount2(target.as_ptr(), libc::MNT_FORCE) };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

/// Mounts filesystem `id` of the loopback service at `mountpoint`.
pub fn mount_nfs(mountpoint: &str, port: u16, id: FsId, read_only: bool) -> io::Result<()> {
    sys::mount_nfs(mountpoint, port, id, read_only)
}

/// Force-unmounts the volume at `mountpoint`.
pub fn unmount_force(mountpoint: &str) -> io::Result<()> {
    sys::unmount_force(mountpoint)
}
