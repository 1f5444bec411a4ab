//! Per-mount registry mapping path strings to stable 64-bit file ids.
//!
//! NFSv3 requires a file handle the server can recognize indefinitely, but
//! the backing store here is arbitrary application code with no stable inode
//! to lean on. The registry hands out synthetic ids instead: the first time
//! a path is seen it gets the next id from a counter shared across all
//! mounts, and both directions of the mapping are kept until the mount's
//! [`clear`] at unmount. Id 0 is reserved and never issued.
//!
//! The id indirection also makes rename cheap: [`swap`] exchanges the paths
//! behind two ids in one step, which keeps every outstanding handle for the
//! renamed file pointing at its new location (see the RENAME procedure).
//!
//! One process-wide mutex guards both dictionaries and the counter; it is
//! held only across map operations, never across callbacks.

use std::collections::HashMap;
use std::hash::{BuildHasherDefault, Hasher};
use std::sync::{LazyLock, Mutex};

use crate::FsId;

/// 64-bit file identifier, unique within one mounted filesystem.
pub type FileId = u64;

#[cfg(target_pointer_width = "64")]
const FNV_PRIME: u64 = 1099511628211;
#[cfg(target_pointer_width = "64")]
const FNV_BASIS: u64 = 14695981039346656037;

#[cfg(not(target_pointer_width = "64"))]
const FNV_PRIME: u64 = 16777619;
#[cfg(not(target_pointer_width = "64"))]
const FNV_BASIS: u64 = 2166136261;

/// FNV-1a hasher for the path map, sized by pointer width.
#[derive(Clone)]
pub struct FnvHasher(u64);

impl Default for FnvHasher {
    fn default() -> FnvHasher {
        FnvHasher(FNV_BASIS)
    }
}

impl Hasher for FnvHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.0 ^= u64::from(byte);
            self.0 = self.0.wrapping_mul(FNV_PRIME);
        }
    }
}

type FnvBuildHasher = BuildHasherDefault<FnvHasher>;

/// The two dictionaries of one mount. Each path string is stored once and
/// shared between them, so it is dropped exactly once on `clear`.
#[derive(Default)]
struct Maps {
    path_to_id: HashMap<std::sync::Arc<str>, FileId, FnvBuildHasher>,
    id_to_path: HashMap<FileId, std::sync::Arc<str>>,
}

struct Registry {
    next_id: FileId,
    filesystems: HashMap<FsId, Maps>,
}

static REGISTRY: LazyLock<Mutex<Registry>> =
    LazyLock::new(|| Mutex::new(Registry { next_id: 1, filesystems: HashMap::new() }));

/// Returns the id bound to `path` within filesystem `fs`, allocating a new
/// one on first use.
pub fn fileid(fs: FsId, path: &str) -> FileId {
    let mut registry = REGISTRY.lock().expect("file id registry lock");
    let Registry { next_id, filesystems } = &mut *registry;
    let maps = filesystems.entry(fs).or_default();
    if let Some(&id) = maps.path_to_id.get(path) {
        return id;
    }
    let save: std::sync::Arc<str> = std::sync::Arc::from(path);
    let id = *next_id;
    *next_id += 1;
    maps.path_to_id.insert(save.clone(), id);
    maps.id_to_path.insert(id, save);
    id
}

/// Looks up the path bound to `id`, without allocating anything.
pub fn path_from(fs: FsId, id: FileId) -> Option<std::sync::Arc<str>> {
    let registry = REGISTRY.lock().expect("file id registry lock");
    registry.filesystems.get(&fs)?.id_to_path.get(&id).cloned()
}

/// Exchanges the paths bound to two live ids, atomically.
///
/// After the swap, `path_to_id` and `id_to_path` agree with the swapped
/// assignment; every other binding is untouched. Both ids must have been
/// issued by [`fileid`] and not cleared.
pub fn swap(fs: FsId, id_one: FileId, id_two: FileId) {
    let mut registry = REGISTRY.lock().expect("file id registry lock");
    let Some(maps) = registry.filesystems.get_mut(&fs) else { return };
    let (Some(path_one), Some(path_two)) =
        (maps.id_to_path.get(&id_one).cloned(), maps.id_to_path.get(&id_two).cloned())
    else {
        return;
    };
    maps.path_to_id.insert(path_one.clone(), id_two);
    maps.id_to_path.insert(id_two, path_one);
    maps.path_to_id.insert(path_two.clone(), id_one);
    maps.id_to_path.insert(id_one, path_two);
}

/// Drops every binding of filesystem `fs`. Called on unmount to reclaim the
/// path strings accumulated over the mount's lifetime.
pub fn clear(fs: FsId) {
    let mut registry = REGISTRY.lock().expect("file id registry lock");
    registry.filesystems.remove(&fs);
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test filesystems use ids far outside the mount table's range so they
    // never collide with engine tests running in the same process.
    const FS: FsId = 1 << 40;

    #[test]
    fn ids_are_stable_and_never_zero() {
        let fs = FS;
        let id = fileid(fs, "/stable/a");
        assert_ne!(id, 0);
        assert_eq!(fileid(fs, "/stable/a"), id);
        assert_ne!(fileid(fs, "/stable/b"), id);
        clear(fs);
    }

    #[test]
    fn path_round_trips_through_id() {
        let fs = FS + 1;
        for path in ["/", "/a", "/a/b", "/deep/nested/path.txt"] {
            let id = fileid(fs, path);
            assert_eq!(path_from(fs, id).as_deref(), Some(path));
        }
        clear(fs);
    }

    #[test]
    fn unknown_id_is_none() {
        let fs = FS + 2;
        fileid(fs, "/known");
        assert_eq!(path_from(fs, u64::MAX), None);
        clear(fs);
    }

    #[test]
    fn swap_exchanges_exactly_two_bindings() {
        let fs = FS + 3;
        let a = fileid(fs, "/a");
        let b = fileid(fs, "/b");
        let c = fileid(fs, "/c");

        swap(fs, a, b);

        assert_eq!(path_from(fs, a).as_deref(), Some("/b"));
        assert_eq!(path_from(fs, b).as_deref(), Some("/a"));
        assert_eq!(path_from(fs, c).as_deref(), Some("/c"));
        assert_eq!(fileid(fs, "/a"), b);
        assert_eq!(fileid(fs, "/b"), a);
        clear(fs);
    }

    #[test]
    fn filesystems_are_isolated() {
        let one = FS + 4;
        let two = FS + 5;
        let id = fileid(one, "/same/path");
        assert_ne!(fileid(two, "/same/path"), id);
        clear(one);
        assert_eq!(path_from(one, id), None);
        assert!(path_from(two, fileid(two, "/same/path")).is_some());
        clear(two);
    }
}
