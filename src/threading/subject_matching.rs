//! Base subject extraction for subject-based threading
//!
//! Mail clients decorate subjects with reply and forward markers, often
//! several layers deep (`Re: Fwd: Re: [list] topic`). ORDEREDSUBJECT groups
//! messages by their "base subject", the text left once those markers are
//! gone, and records whether any marker was seen.
//!
//! ## Algorithm
//!
//! 1. Tabs and line breaks become spaces, runs of spaces collapse to one
//! 2. Repeat until a pass removes nothing:
//!    - strip trailing spaces and `(fwd)` trailers
//!    - strip leading spaces and reply/forward leaders such as `Re:`,
//!      `Fwd:` or `[list] Re [2]:`
//! 3. If the result is wrapped as `[fwd: ...]`, unwrap it and go back to 2
//!
//! A blob is a bracketed annotation without nested brackets, `[ocf/puppet]`.
//! A blob directly following a removed leader is dropped as part of that
//! leader unless nothing would remain after it. Blobs that start the subject
//! on their own are kept.
//!
//! Every rule removes text, so the loop always terminates. Callers that feed
//! untrusted subjects can still bound the number of passes with
//! [`NormalizerConfig::max_passes`].

use regex::Regex;
use serde::Serialize;
use std::convert::Infallible;
use std::sync::OnceLock;

use crate::config::NormalizerConfig;
use crate::error::{Error, Result};

/// `[`, any characters in U+0001..=U+00FF except brackets, `]`, then blanks.
const BLOB: &str = r"\[[\x01-\x5a\x5c\x5e-\xff]*\][ \t]*";

static LEADER_REGEX: OnceLock<Regex> = OnceLock::new();
static BLOB_REGEX: OnceLock<Regex> = OnceLock::new();
static TRAILER_REGEX: OnceLock<Regex> = OnceLock::new();

/// Matches `*blob ("re" / "fw" ["d"]) *WSP [blob] ":"` at the start.
fn leader_regex() -> &'static Regex {
    LEADER_REGEX.get_or_init(|| {
        Regex::new(&format!(r"^(?:{BLOB})*(?i:re|fwd?)[ \t]*(?:{BLOB})?:"))
            .expect("Invalid subject leader regex")
    })
}

fn blob_regex() -> &'static Regex {
    BLOB_REGEX.get_or_init(|| Regex::new(&format!("^{BLOB}")).expect("Invalid subject blob regex"))
}

/// One trailing space or a `(fwd)` trailer.
fn trailer_regex() -> &'static Regex {
    TRAILER_REGEX.get_or_init(|| Regex::new(r"(?i:\(fwd\)| )$").expect("Invalid subject trailer regex"))
}

const FORWARD_HEADER_PREFIX: &str = "[fwd:";

/// A normalized subject and whether the original looked like a reply or
/// forward.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BaseSubject {
    pub subject: String,
    pub is_reply_or_forward: bool,
}

/// Extract the base subject of an already-decoded subject line.
///
/// ## Examples
///
/// ```rust
/// use sortthread::threading::normalize_subject;
///
/// let base = normalize_subject("Fwd: Re: ugh");
/// assert_eq!(base.subject, "ugh");
/// assert!(base.is_reply_or_forward);
///
/// let base = normalize_subject("[FWD: simple [extraction]]");
/// assert_eq!(base.subject, "simple [extraction]");
/// ```
pub fn normalize_subject(subject: &str) -> BaseSubject {
    match normalize(subject, || Ok::<(), Infallible>(())) {
        Ok(base) => base,
        Err(never) => match never {},
    }
}

/// Subject normalizer with an optional bound on the number of passes.
#[derive(Debug, Clone, Default)]
pub struct SubjectNormalizer {
    config: NormalizerConfig,
}

impl SubjectNormalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    /// Like [`normalize_subject`], but fails with [`Error::IterationLimit`]
    /// once more than `max_passes` passes would be needed.
    pub fn normalize(&self, subject: &str) -> Result<BaseSubject> {
        let Some(max_passes) = self.config.max_passes else {
            return Ok(normalize_subject(subject));
        };

        let mut passes = 0;
        normalize(subject, || {
            passes += 1;
            if passes > max_passes {
                log::warn!(
                    "subject normalization exceeded {} passes ({} bytes)",
                    max_passes,
                    subject.len()
                );
                return Err(Error::IterationLimit { passes: max_passes });
            }
            Ok(())
        })
    }
}

/// Runs the normalization loop. `on_pass` is called before every outer pass
/// and may abort it.
fn normalize<E>(
    subject: &str,
    mut on_pass: impl FnMut() -> std::result::Result<(), E>,
) -> std::result::Result<BaseSubject, E> {
    let mut is_reply_or_forward = false;
    let mut subject = collapse_whitespace(subject);

    loop {
        loop {
            on_pass()?;
            let before = subject.len();

            is_reply_or_forward |= strip_trailers(&mut subject);
            is_reply_or_forward |= strip_leaders(&mut subject);

            if subject.len() == before {
                break;
            }
        }

        match unwrap_forward_header(&subject) {
            Some(inner) => {
                log::trace!("unwrapping forward header in {:?}", subject);
                subject = inner.to_string();
                is_reply_or_forward = true;
            }
            None => break,
        }
    }

    log::trace!("base subject {:?} (reply/forward: {})", subject, is_reply_or_forward);
    Ok(BaseSubject {
        subject,
        is_reply_or_forward,
    })
}

fn collapse_whitespace(subject: &str) -> String {
    let mut collapsed = String::with_capacity(subject.len());
    let mut previous_space = false;

    for c in subject.chars() {
        let c = if matches!(c, '\t' | '\r' | '\n') { ' ' } else { c };
        if c == ' ' && previous_space {
            continue;
        }
        previous_space = c == ' ';
        collapsed.push(c);
    }

    collapsed
}

/// Remove trailing spaces and `(fwd)` markers. Returns whether anything was
/// removed.
fn strip_trailers(subject: &mut String) -> bool {
    let mut stripped = false;
    while let Some(start) = trailer_regex().find(subject).map(|found| found.start()) {
        subject.truncate(start);
        stripped = true;
    }
    stripped
}

/// Remove leading spaces and reply/forward leaders. Returns whether a leader
/// was removed; spaces alone do not count.
fn strip_leaders(subject: &mut String) -> bool {
    let mut found_leader = false;

    loop {
        let before = subject.len();

        if subject.starts_with(' ') {
            subject.remove(0);
        }

        if let Some(end) = leader_regex().find(subject).map(|leader| leader.end()) {
            subject.replace_range(..end, "");
            found_leader = true;

            if let Some(end) = blob_regex().find(subject).map(|blob| blob.end()) {
                if end < subject.len() {
                    subject.replace_range(..end, "");
                }
            }
        }

        if subject.len() == before {
            break;
        }
    }

    found_leader
}

/// Inner text of a `[fwd: ...]` wrapped subject, compared case-insensitively.
fn unwrap_forward_header(subject: &str) -> Option<&str> {
    let prefix = subject.get(..FORWARD_HEADER_PREFIX.len())?;
    if !prefix.eq_ignore_ascii_case(FORWARD_HEADER_PREFIX) || !subject.ends_with(']') {
        return None;
    }
    subject.get(FORWARD_HEADER_PREFIX.len()..subject.len() - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(subject: &str) -> (String, bool) {
        let base = normalize_subject(subject);
        (base.subject, base.is_reply_or_forward)
    }

    #[test]
    fn test_normalize_plain_subject() {
        assert_eq!(base("No Replacement"), ("No Replacement".to_string(), false));
    }

    #[test]
    fn test_normalize_reply_keeps_standalone_blob() {
        assert_eq!(
            base("Re: [ocf/puppet] Fix kerberos not booting up correctly [needs testing] (#781)"),
            (
                "[ocf/puppet] Fix kerberos not booting up correctly [needs testing] (#781)"
                    .to_string(),
                true
            )
        );
    }

    #[test]
    fn test_normalize_forward_prefixes() {
        assert_eq!(base("Fwd: waifus"), ("waifus".to_string(), true));
        assert_eq!(base("Fwd: Re: ugh"), ("ugh".to_string(), true));
        assert_eq!(base("FW: re:RE: x"), ("x".to_string(), true));
    }

    #[test]
    fn test_normalize_forward_header() {
        assert_eq!(
            base("[FWD: simple [extraction]]"),
            ("simple [extraction]".to_string(), true)
        );
        assert_eq!(
            base("Re: [fwd: Re: [OCF] Service update during PG&E outage]"),
            ("[OCF] Service update during PG&E outage".to_string(), true)
        );
    }

    #[test]
    fn test_normalize_blobs_around_leader() {
        assert_eq!(base("[list] Re: topic"), ("topic".to_string(), true));
        assert_eq!(base("Re [2]: topic"), ("topic".to_string(), true));
        assert_eq!(base("Re:[list]topic"), ("topic".to_string(), true));
        // Nothing would be left after the blob
        assert_eq!(base("Re:[list]"), ("[list]".to_string(), true));
    }

    #[test]
    fn test_normalize_keeps_leading_blob_without_leader() {
        assert_eq!(base("[list] topic"), ("[list] topic".to_string(), false));
        assert_eq!(base("[a][b] topic"), ("[a][b] topic".to_string(), false));
    }

    #[test]
    fn test_normalize_trailing_space_marks_reply() {
        assert_eq!(base("topic "), ("topic".to_string(), true));
        assert_eq!(base("topic\t\t"), ("topic".to_string(), true));
    }

    #[test]
    fn test_normalize_trailers() {
        assert_eq!(base("topic (fwd)"), ("topic".to_string(), true));
        assert_eq!(base("topic (FWD)(fwd)"), ("topic".to_string(), true));
        assert_eq!(base("topic(fwd) "), ("topic".to_string(), true));
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(
            base("Re:\t  folded\r\n   subject"),
            ("folded subject".to_string(), true)
        );
        assert_eq!(base("  leading"), ("leading".to_string(), false));
    }

    #[test]
    fn test_normalize_words_starting_with_re_are_kept() {
        assert_eq!(base("Release notes"), ("Release notes".to_string(), false));
        assert_eq!(base("Reply: maybe"), ("Reply: maybe".to_string(), false));
        assert_eq!(base("Fwdx: nope"), ("Fwdx: nope".to_string(), false));
    }

    #[test]
    fn test_normalize_unbalanced_brackets() {
        assert_eq!(base("[unterminated"), ("[unterminated".to_string(), false));
        assert_eq!(base("Re: ]["), ("][".to_string(), true));
        assert_eq!(base("[fwd:"), ("[fwd:".to_string(), false));
        assert_eq!(base("[fwd:]"), ("".to_string(), true));
    }

    #[test]
    fn test_normalize_non_latin_text() {
        assert_eq!(base("Re: Grüße 你好"), ("Grüße 你好".to_string(), true));
        // Blob characters stop at U+00FF
        assert_eq!(base("Re:[你好] x"), ("[你好] x".to_string(), true));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for subject in [
            "No Replacement",
            "Re: [ocf/puppet] Fix kerberos not booting up correctly [needs testing] (#781)",
            "Fwd: Re: ugh",
            "[FWD: simple [extraction]]",
            "Re: [fwd: Re: [OCF] Service update during PG&E outage]",
            "[list] Re: topic (fwd)",
        ] {
            let once = normalize_subject(subject).subject;
            let twice = normalize_subject(&once);
            assert_eq!(twice.subject, once, "re-normalizing {subject:?}");
            assert!(!twice.is_reply_or_forward, "artifacts left in {once:?}");
        }
    }

    #[test]
    fn test_normalizer_pass_limit() {
        let mut subject = "x".to_string();
        for _ in 0..50 {
            subject = format!("[fwd: {subject}]");
        }

        let roomy = SubjectNormalizer::new(NormalizerConfig::with_max_passes(200));
        assert_eq!(roomy.normalize(&subject).unwrap().subject, "x");

        let tight = SubjectNormalizer::new(NormalizerConfig::with_max_passes(10));
        assert_eq!(
            tight.normalize(&subject),
            Err(Error::IterationLimit { passes: 10 })
        );
    }

    #[test]
    fn test_normalizer_unbounded_matches_free_function() {
        let normalizer = SubjectNormalizer::new(NormalizerConfig::unbounded());
        let deep = "Re: ".repeat(1000) + "topic";
        assert_eq!(
            normalizer.normalize(&deep).unwrap(),
            normalize_subject(&deep)
        );
        assert_eq!(normalize_subject(&deep).subject, "topic");
    }
}
