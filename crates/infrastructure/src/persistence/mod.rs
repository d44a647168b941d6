//! Session storage backends.

mod memory;
mod session_file;

pub use memory::MemorySessionStore;
pub use session_file::FileSessionStore;
