//! Replicates a carrom session between two players through a shared store
//!
//! There is no game server: each client writes the fields it owns and
//! subscribes to the rest. Turn ownership is checked against the stored
//! session before every publish.

pub mod channel;
pub mod convert;
pub mod env;
pub mod error;
pub mod store;

pub use channel::*;
pub use convert::*;
pub use env::*;
pub use error::*;
pub use store::*;

#[cfg(test)]
mod tests;
