//! Specific background job implementations.

pub mod keep_alive;

pub use keep_alive::KeepAliveJob;
