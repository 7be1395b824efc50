//! bridge-engine
//!
//! Path discovery over any `IndexClient`: resolve two topics to articles,
//! recursively search for the articles that connect them, and assemble the
//! best chain.

pub mod assemble;
pub mod discovery;
pub mod error;

pub use assemble::{assemble, pick_best};
pub use discovery::{EngineOptions, PathEngine};
pub use error::{DiscoveryError, NoConnectionReason};
