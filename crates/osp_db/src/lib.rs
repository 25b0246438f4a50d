pub mod memory;
pub mod repository;
pub mod schema;
pub mod store;

// Re-export common types for convenience
pub use memory::MemoryStore;
pub use repository::{RequestRepository, ServiceRepository};
pub use store::{RequestStore, ServiceStore};
