use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

// ===== Sort Criteria =====

/// A message attribute a SORT command can order by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortField {
    Arrival,
    Cc,
    Date,
    From,
    Size,
    Subject,
    To,
}

impl SortField {
    pub const ALL: [SortField; 7] = [
        SortField::Arrival,
        SortField::Cc,
        SortField::Date,
        SortField::From,
        SortField::Size,
        SortField::Subject,
        SortField::To,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Arrival => "ARRIVAL",
            SortField::Cc => "CC",
            SortField::Date => "DATE",
            SortField::From => "FROM",
            SortField::Size => "SIZE",
            SortField::Subject => "SUBJECT",
            SortField::To => "TO",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortField::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownSortKey(s.to_ascii_uppercase()))
    }
}

/// One key of a SORT criteria list. `reverse` flips the order for this key
/// only; later keys keep their own direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortCriterion {
    pub field: SortField,
    #[serde(default)]
    pub reverse: bool,
}

impl SortCriterion {
    pub fn new(field: SortField) -> Self {
        Self {
            field,
            reverse: false,
        }
    }

    pub fn reversed(field: SortField) -> Self {
        Self {
            field,
            reverse: true,
        }
    }
}

impl fmt::Display for SortCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reverse {
            write!(f, "REVERSE {}", self.field)
        } else {
            write!(f, "{}", self.field)
        }
    }
}

// ===== Thread Algorithms =====

/// Threading algorithms a THREAD command can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ThreadAlgorithm {
    /// Group by base subject, ordered by sent date.
    OrderedSubject,
    /// Link by In-Reply-To/References headers.
    References,
}

impl ThreadAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreadAlgorithm::OrderedSubject => "ORDEREDSUBJECT",
            ThreadAlgorithm::References => "REFERENCES",
        }
    }
}

impl fmt::Display for ThreadAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThreadAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ORDEREDSUBJECT" => Ok(ThreadAlgorithm::OrderedSubject),
            "REFERENCES" => Ok(ThreadAlgorithm::References),
            _ => Err(Error::UnknownThreadAlgorithm(s.to_string())),
        }
    }
}
