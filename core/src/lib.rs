pub mod corpus;
pub mod graph;
pub mod index;
pub mod persist;
pub mod search;
pub mod tokenizer;
pub mod verify;

/// Stable document identifier. Assigned once by the crawler and never
/// renumbered, including across corpus merges.
pub type DocId = u32;

pub use corpus::Document;
pub use graph::LinkGraph;
pub use index::{build_index, IndexSnapshot, Posting};
pub use search::{SearchEngine, SearchHit, SearchOptions};
pub use verify::{Evidence, FactVerifier, Verdict, VerdictStatus};
