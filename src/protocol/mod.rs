//! SORT and THREAD command and response values
//!
//! Framing these values inside tagged/untagged protocol lines belongs to the
//! connection layer; this module only maps between `Value` lists and typed
//! commands and responses.

pub mod commands;
pub mod responses;
pub mod value;

pub use commands::{SortCommand, ThreadCommand, format_sort_criteria, parse_sort_criteria};
pub use responses::{SortResponse, ThreadResponse};
pub use value::Value;
