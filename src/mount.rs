//! Mount orchestration: the path from a callback bundle to a live volume.
//!
//! `mount` brings up the loopback RPC service on first use, registers the
//! filesystem in the mount table, makes sure the mountpoint directory
//! exists, and asks the host kernel to NFS-mount the loopback endpoint
//! with the raw filesystem id as the bootstrap file handle. Every step
//! rolls the registration back on failure.
//!
//! The library cannot observe the system unmounting a volume behind its
//! back, so applications should call `unmount` explicitly even if the
//! volume is already gone; that is what reclaims the identifier and the
//! id registry. A process-exit hook unmounts whatever is still live.

use std::fs;
use std::io;
use std::sync::{Arc, Once};

use tracing::{info, warn};

use crate::error::Error;
use crate::table::{self, Descriptor};
use crate::vfs::{Capabilities, KfsFileSystem};
use crate::{fileid, mount_args, tcp, FsId};

/// Mount configuration for a filesystem.
///
/// The mountpoint directory is created if absent (intermediate directories
/// are not).
#[derive(Clone, Debug)]
pub struct MountOptions {
    /// Path at which the volume is grafted onto the host namespace
    pub mountpoint: String,
}

/// Mounts `filesystem` and returns the identifier needed to unmount it.
pub fn mount<F: KfsFileSystem + 'static>(
    filesystem: F,
    options: MountOptions,
) -> Result<FsId, Error> {
    let port = tcp::ensure_service().map_err(Error::Transport)?;
    register_finalizer();

    let read_only = matches!(filesystem.capabilities(), Capabilities::ReadOnly);
    let identifier =
        table::put(Descriptor::new(Arc::new(filesystem), options.mountpoint.clone()))?;

    if let Err(e) = fs::create_dir(&options.mountpoint) {
        if e.kind() != io::ErrorKind::AlreadyExists {
            table::remove(identifier);
            return Err(Error::Mountpoint(e));
        }
    }

    if let Err(e) = mount_args::mount_nfs(&options.mountpoint, port, identifier, read_only) {
        table::remove(identifier);
        return Err(Error::Mount(e));
    }

    info!("mounted filesystem {} at {}", identifier, options.mountpoint);
    Ok(identifier)
}

/// Unmounts the filesystem registered under `identifier` and releases
/// everything it held: the kernel mount, the mountpoint directory, the
/// table slot, and the file id registry.
pub fn unmount(identifier: FsId) {
    if let Some(descriptor) = table::get(identifier) {
        if let Err(e) = mount_args::unmount_force(&descriptor.mountpoint) {
            warn!("cannot unmount {}: {:?}", descriptor.mountpoint, e);
        }
        let _ = fs::remove_dir(&descriptor.mountpoint);
    }
    table::remove(identifier);
    fileid::clear(identifier);
}

fn register_finalizer() {
    static ONCE: Once = Once::new();
    ONCE.call_once(|| unsafe {
        libc::atexit(finalize);
    });
}

/// Unmounts every live filesystem at process exit.
extern "C" fn finalize() {
    let mut identifier: FsId = 0;
    while table::iterate(&mut identifier) {
        unmount(identifier);
    }
}
