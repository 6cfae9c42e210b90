//! Store provider implementations.
//!
//! # Available Providers
//!
//! - [`MemoryStore`]: in-process sharded map, lost on restart
//! - [`DiskStore`]: one file per key, committed by temp-file rename

mod disk;
mod memory;

pub use disk::DiskStore;
pub use memory::MemoryStore;
