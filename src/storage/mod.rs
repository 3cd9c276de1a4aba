//! Storage implementations for sessions and users

pub mod credentials;
pub mod in_memory;

pub use credentials::{StaticCredentialStore, UserRecord, digest_secret};
pub use in_memory::InMemorySessionStore;
