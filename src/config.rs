use std::env;

pub const MAX_PASSES_VAR: &str = "SORTTHREAD_SUBJECT_MAX_PASSES";
pub const MAX_NESTING_VAR: &str = "SORTTHREAD_MAX_NESTING";

pub const DEFAULT_MAX_NESTING: usize = 512;

fn lookup_usize<F>(lookup: &F, key: &str) -> Option<usize>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|value| value.trim().parse::<usize>().ok())
}

fn env_lookup(key: &str) -> Option<String> {
    env::var(key).ok()
}

/// Limits applied by [`crate::threading::SubjectNormalizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizerConfig {
    /// Maximum number of outer fixed-point passes. `None` runs until the
    /// subject stops changing.
    pub max_passes: Option<usize>,
}

impl NormalizerConfig {
    pub fn unbounded() -> Self {
        Self { max_passes: None }
    }

    pub fn with_max_passes(max_passes: usize) -> Self {
        Self {
            max_passes: Some(max_passes),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(env_lookup)
    }

    /// Builds the config from an arbitrary variable source. A value of `0`
    /// or anything unparsable leaves the normalizer unbounded.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            max_passes: lookup_usize(&lookup, MAX_PASSES_VAR).filter(|&passes| passes > 0),
        }
    }
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Limits applied by [`crate::threading::ThreadCodec`] while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// Maximum list nesting accepted in a THREAD payload.
    pub max_depth: usize,
}

impl CodecConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            max_depth: lookup_usize(&lookup, MAX_NESTING_VAR)
                .filter(|&depth| depth > 0)
                .unwrap_or(DEFAULT_MAX_NESTING),
        }
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
