//! Domain layer for the merge-transition engine
//!
//! - block: headers, bodies and the phase classification
//! - config: terminal difficulty and header limits
//! - error: typed validation failures

mod block;
mod config;
mod error;

pub use block::*;
pub use config::*;
pub use error::*;
