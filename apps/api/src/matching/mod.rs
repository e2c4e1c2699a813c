// Similarity ranking: query text → embedding → cosine score against every catalog fund.
// The catalog is always passed in by the caller; this module never loads it.

pub mod ranker;
pub mod similarity;

pub use ranker::{rank, score_catalog, ScoredFund};
