// Service exports
pub mod cache;
pub mod memory;
pub mod postgres;
pub mod rest;
pub mod session;
pub mod store;

pub use cache::{CacheError, CacheKey, CacheManager};
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use rest::RestStore;
pub use session::{Claims, SessionError, SessionRegistry, SessionVerifier};
pub use store::{bounded_write, ParticipantStore, StoreError};
