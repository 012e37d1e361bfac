//! Lock provider backends.

pub mod memory;

pub use memory::LocalLockProvider;
