//! Thread trees and subject threading
//!
//! This module holds the two algorithmic halves of SORT/THREAD support:
//!
//! - `tree`: arena-backed forest of thread nodes
//! - `codec`: nearest-ancestor THREAD payload parsing and serialization
//! - `subject_matching`: base subject extraction
//! - `ordered_subject`: ORDEREDSUBJECT grouping built on base subjects

pub mod codec;
pub mod ordered_subject;
pub mod subject_matching;
pub mod tree;

// Re-export main types and functions
pub use codec::{ThreadCodec, format_threads, parse_thread_tree, serialize_thread_tree};
pub use ordered_subject::{SubjectMessage, thread_by_ordered_subject};
pub use subject_matching::{BaseSubject, SubjectNormalizer, normalize_subject};
pub use tree::{NodeId, ThreadForest, ThreadNode};
