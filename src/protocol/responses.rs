use std::fmt;

use crate::error::{Error, Result};
use crate::threading::codec::parse_message_id;
use crate::threading::{ThreadForest, format_threads, parse_thread_tree, serialize_thread_tree};

use super::value::Value;

fn expect_name(name: &str, expected: &str) -> Result<()> {
    if name.eq_ignore_ascii_case(expected) {
        Ok(())
    } else {
        Err(Error::UnhandledResponse(format!("expected {expected}, got {name}")))
    }
}

/// Untagged `SORT` response: matching message ids in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortResponse {
    pub ids: Vec<u32>,
}

impl SortResponse {
    pub const NAME: &'static str = "SORT";

    /// Decode a named response. Any name other than `SORT` is unhandled.
    pub fn from_response(name: &str, fields: &[Value]) -> Result<Self> {
        expect_name(name, Self::NAME)?;

        let ids = fields
            .iter()
            .map(parse_message_id)
            .collect::<Result<Vec<u32>>>()?;

        Ok(Self { ids })
    }

    pub fn fields(&self) -> Vec<Value> {
        self.ids.iter().map(|&id| Value::Number(id)).collect()
    }
}

impl fmt::Display for SortResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Self::NAME)?;
        for id in &self.ids {
            write!(f, " {id}")?;
        }
        Ok(())
    }
}

/// Untagged `THREAD` response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadResponse {
    pub threads: ThreadForest,
}

impl ThreadResponse {
    pub const NAME: &'static str = "THREAD";

    pub fn from_response(name: &str, fields: &[Value]) -> Result<Self> {
        expect_name(name, Self::NAME)?;
        Ok(Self {
            threads: parse_thread_tree(fields)?,
        })
    }

    pub fn fields(&self) -> Vec<Value> {
        serialize_thread_tree(&self.threads)
    }
}

/// `THREAD (2)(3 6 (4 23) (44 7 96))`; an empty result is a bare `THREAD`.
impl fmt::Display for ThreadResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.threads.is_empty() {
            return f.write_str(Self::NAME);
        }
        write!(f, "{} {}", Self::NAME, format_threads(&self.threads))
    }
}
