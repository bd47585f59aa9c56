// Concrete implementations of the domain ports.

pub mod memory;
pub mod storage;

pub use memory::InMemoryTicketRepository;
pub use storage::LocalStorage;
