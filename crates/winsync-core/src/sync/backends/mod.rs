mod directory;
mod memory;

pub use directory::DirectoryRemoteStore;
pub use memory::MemoryRemoteStore;
