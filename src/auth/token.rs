//! Bearer token value types.

pub mod cached;
pub mod secret;
