//! Content-predicate matching (spec §4.4 "ContentMatcher").

pub mod matcher;
pub mod num_matcher;

pub use matcher::body_matches;
pub use num_matcher::numeric_compare;
