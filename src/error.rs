use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while decoding SORT/THREAD values or normalizing subjects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("cannot interpret response: expected identifier or list, got {0}")]
    MalformedElement(String),
    #[error("cannot interpret response: invalid message identifier '{0}'")]
    MalformedIdentifier(String),
    #[error("thread list nested deeper than {limit} levels")]
    NestingTooDeep { limit: usize },
    #[error("subject normalization did not converge within {passes} passes")]
    IterationLimit { passes: usize },
    #[error("unhandled response: {0}")]
    UnhandledResponse(String),
    #[error("unknown sort criteria: {0}")]
    UnknownSortKey(String),
    #[error("missing sort key after REVERSE")]
    MissingSortKey,
    #[error("unknown thread algorithm: {0}")]
    UnknownThreadAlgorithm(String),
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("syntax error: {0}")]
    Syntax(String),
}

impl Error {
    /// True for the malformed element/identifier pair, which callers report
    /// as a single "cannot interpret response" condition.
    pub fn is_invalid_response(&self) -> bool {
        matches!(
            self,
            Error::MalformedElement(_) | Error::MalformedIdentifier(_)
        )
    }
}
