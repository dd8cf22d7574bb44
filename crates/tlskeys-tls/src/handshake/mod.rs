//! Handshake-side key material: ephemeral key shares and the pool that
//! pre-generates them.

pub mod key_exchange;
pub mod key_pool;

pub use key_exchange::KeyExchange;
pub use key_pool::{KeyPool, KeyPoolSet};
