//! Adapters layer (Hexagonal Architecture)

mod memory_chain;

pub use memory_chain::*;
