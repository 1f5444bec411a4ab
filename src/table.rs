//! Process-wide table of mounted filesystems.
//!
//! Each live mount occupies one slot of a fixed-capacity array; the slot
//! index is the mount's [`FsId`] and the first component of every file
//! handle the engine issues. Identifiers are allocated by linear probe from
//! a rotating cursor and recycled on unmount. One mutex guards the slot
//! array and the cursor; it is held only across table operations, never
//! across callback invocation.

use std::sync::{Arc, Mutex};

use crate::error::Error;
use crate::vfs::KfsFileSystem;
use crate::FsId;

/// Capacity of the mount table.
pub const MAX_FILESYSTEMS: usize = 1024;

/// A registered filesystem: the callback object plus its mount
/// configuration. Immutable after registration; the table controls its
/// lifetime.
pub struct Descriptor {
    /// The application's callback implementation
    pub fs: Arc<dyn KfsFileSystem>,
    /// Owned copy of the mountpoint path
    pub mountpoint: String,
}

impl Descriptor {
    pub fn new(fs: Arc<dyn KfsFileSystem>, mountpoint: String) -> Descriptor {
        Descriptor { fs, mountpoint }
    }
}

struct Table {
    slots: Vec<Option<Arc<Descriptor>>>,
    cursor: usize,
}

static TABLE: Mutex<Table> = Mutex::new(Table { slots: Vec::new(), cursor: 0 });

fn lock() -> std::sync::MutexGuard<'static, Table> {
    let mut table = TABLE.lock().expect("mount table lock");
    if table.slots.is_empty() {
        table.slots.resize_with(MAX_FILESYSTEMS, || None);
    }
    table
}

/// Stores a descriptor in the next free slot and returns its identifier.
///
/// Fails with [`Error::MaxFilesystems`] when a full sweep finds no empty
/// slot.
pub fn put(descriptor: Descriptor) -> Result<FsId, Error> {
    let mut table = lock();
    let start = table.cursor;
    let mut number = start;
    loop {
        if table.slots[number].is_none() {
            table.slots[number] = Some(Arc::new(descriptor));
            table.cursor = (number + 1) % MAX_FILESYSTEMS;
            return Ok(number as FsId);
        }
        number = (number + 1) % MAX_FILESYSTEMS;
        if number == start {
            return Err(Error::MaxFilesystems);
        }
    }
}

/// Returns the descriptor registered under `identifier`, if any.
pub fn get(identifier: FsId) -> Option<Arc<Descriptor>> {
    if identifier < 0 || identifier as usize >= MAX_FILESYSTEMS {
        return None;
    }
    lock().slots[identifier as usize].clone()
}

/// Frees the slot registered under `identifier`.
pub fn remove(identifier: FsId) {
    if identifier < 0 || identifier as usize >= MAX_FILESYSTEMS {
        return;
    }
    lock().slots[identifier as usize] = None;
}

/// Advances `identifier` to the next live slot, wrapping around the table.
///
/// Returns false once a full cycle finds no live entry. The same identifier
/// is returned again on the next call unless its slot has been freed in
/// between, which is what lets the process finalizer drain the table by
/// unmounting whatever `iterate` yields.
pub fn iterate(identifier: &mut FsId) -> bool {
    let table = lock();
    if *identifier < 0 || *identifier as usize >= MAX_FILESYSTEMS {
        *identifier = 0;
    }
    let start = *identifier as usize;
    let mut number = start;
    loop {
        if table.slots[number].is_some() {
            *identifier = number as FsId;
            return true;
        }
        number = (number + 1) % MAX_FILESYSTEMS;
        if number == start {
            return false;
        }
    }
}
