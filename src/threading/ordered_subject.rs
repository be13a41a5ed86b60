//! ORDEREDSUBJECT threading
//!
//! The simple THREAD algorithm: messages sharing a base subject form one
//! thread. Within a group the earliest message is the root and every other
//! message becomes a direct child of it, in sent-date order. Threads are
//! ordered by the sent date of their root.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::error::Result;

use super::subject_matching::SubjectNormalizer;
use super::tree::ThreadForest;

/// The fields ORDEREDSUBJECT needs from each matching message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectMessage {
    /// Sequence number or UID
    pub id: u32,

    /// Decoded subject line
    pub subject: String,

    /// Sent date, from the Date header
    pub sent: DateTime<Utc>,
}

/// Group messages by base subject into an ORDEREDSUBJECT forest.
///
/// Base subjects compare case-sensitively. Ties on sent date are broken by
/// message id so the output is deterministic.
pub fn thread_by_ordered_subject(
    messages: &[SubjectMessage],
    normalizer: &SubjectNormalizer,
) -> Result<ThreadForest> {
    // base subject -> messages
    let mut groups: HashMap<String, Vec<&SubjectMessage>> = HashMap::new();
    for message in messages {
        let base = normalizer.normalize(&message.subject)?;
        groups.entry(base.subject).or_default().push(message);
    }

    let mut threads: Vec<Vec<&SubjectMessage>> = groups.into_values().collect();
    for thread in &mut threads {
        thread.sort_by_key(|message| (message.sent, message.id));
    }
    threads.sort_by_key(|thread| (thread[0].sent, thread[0].id));

    let mut forest = ThreadForest::new();
    for thread in &threads {
        let root = forest.add_root(thread[0].id);
        for message in &thread[1..] {
            forest.add_child(root, message.id);
        }
    }

    log::debug!(
        "ORDEREDSUBJECT grouped {} messages into {} threads",
        messages.len(),
        threads.len()
    );
    Ok(forest)
}
