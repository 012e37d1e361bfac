//! Infrastructure adapters for scheduler collaborators.

pub mod lock;
pub use lock::LocalLockProvider;
