//! Document store backends.

mod cloudant;
mod memory;

pub use cloudant::CloudantStore;
pub use memory::MemoryDocumentStore;
