//! Backend infrastructure - Store implementations

mod edges;
mod http;
mod in_memory;

pub use edges::AssociationTable;
pub use http::HttpBackend;
pub use in_memory::InMemoryBackend;
