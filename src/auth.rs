//! Credential models: client credentials and the cached bearer token.

pub mod credentials;
pub mod token;

pub use credentials::*;
pub use token::{cached::*, secret::*};
