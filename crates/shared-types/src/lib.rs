//! # Shared Types Crate
//!
//! Primitive types used across the merge-transition workspace.
//!
//! ## Design Principles
//!
//! - **Fixed-size identities**: hashes and addresses are plain byte arrays so
//!   they are `Copy` and hash cheaply as map keys.
//! - **Big integers from one place**: `U256` is re-exported from
//!   `primitive-types` so difficulty arithmetic agrees across crates.

pub mod entities;

pub use entities::*;
