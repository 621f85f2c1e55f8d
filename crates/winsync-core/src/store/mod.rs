//! Local durable storage.

mod errors;
mod file;
mod memory;
mod traits;

pub use errors::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use traits::KeyValueStore;
