//! File store backends.

mod drive;
mod memory;

pub use drive::{DEFAULT_DRIVE_URL, DriveStore};
pub use memory::MemoryFileStore;
