//! bridge-core
//!
//! Documents, topics and candidate paths; the structured query builder; the
//! index capability the path engine consumes; configuration.

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod config;
pub mod dedupe;
pub mod error;
pub mod lazy;
pub mod memory;
pub mod query;
pub mod traits;
pub mod types;

pub use dedupe::dedupe;
pub use error::{Error, IndexError};
pub use memory::MemoryIndex;
pub use query::{Field, QueryBuilder, StructuredQuery};
pub use traits::{DocumentSink, IndexClient, LazyIngestor};
pub use types::{CandidatePath, DocId, Document, ExclusionSet, IndexStatus, PathScore, Topic};
