//! THREAD response tree codec
//!
//! A THREAD payload nests message identifiers using nearest-ancestor
//! notation:
//!
//! - a run of identifiers at one nesting level is an ancestor chain,
//!   `(1 2 3)` meaning 1 → 2 → 3
//! - a parenthesized list after an identifier is one branch below it,
//!   `(4 5 (6) (7 8))` meaning 5 has the children 6 and 7 → 8
//! - a list with no identifier before it at its level is a separate thread,
//!   which is how servers report subtrees whose parent was not in the
//!   search result
//!
//! ## Round trips
//!
//! Serialization only emits branch lists with a single root, and for those
//! `parse(serialize(forest)) == forest`. A received branch list holding
//! several roots, such as the `((2)(3))` in `(1 ((2)(3)))`, parses with all
//! of its roots attached to the parent and is re-serialized in canonical
//! form, `(1 (2) (3))`.

use crate::config::CodecConfig;
use crate::error::{Error, Result};
use crate::protocol::Value;

use super::tree::{NodeId, ThreadForest};

/// Parser/serializer for THREAD payloads.
#[derive(Debug, Clone, Default)]
pub struct ThreadCodec {
    config: CodecConfig,
}

impl ThreadCodec {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Parse the values following `THREAD` in a response into a forest.
    ///
    /// Fails without a partial result if any element is neither an
    /// identifier nor a list, or an identifier is not a u32.
    pub fn parse(&self, values: &[Value]) -> Result<ThreadForest> {
        let mut forest = ThreadForest::new();
        let roots = self.parse_level(values, &mut forest, 0)?;
        for root in roots {
            forest.push_root(root);
        }

        log::debug!(
            "parsed {} threads containing {} messages",
            forest.roots().len(),
            forest.len()
        );
        Ok(forest)
    }

    /// Parse one nesting level, returning the nodes that have no parent at
    /// this level.
    fn parse_level(
        &self,
        values: &[Value],
        forest: &mut ThreadForest,
        depth: usize,
    ) -> Result<Vec<NodeId>> {
        if depth >= self.config.max_depth {
            log::warn!("rejecting THREAD payload nested deeper than {}", self.config.max_depth);
            return Err(Error::NestingTooDeep {
                limit: self.config.max_depth,
            });
        }

        let mut siblings = Vec::new();
        let mut parent: Option<NodeId> = None;

        for value in values {
            match value {
                Value::List(items) => {
                    let branch = self.parse_level(items, forest, depth + 1)?;
                    match parent {
                        Some(parent) => {
                            for node in branch {
                                forest.push_child(parent, node);
                            }
                        }
                        None => {
                            if !branch.is_empty() {
                                log::trace!("promoting {} orphan subtrees to top level", branch.len());
                            }
                            siblings.extend(branch);
                        }
                    }
                }
                other => {
                    let node = forest.insert(parse_message_id(other)?);
                    match parent {
                        Some(parent) => forest.push_child(parent, node),
                        None => siblings.push(node),
                    }
                    parent = Some(node);
                }
            }
        }

        Ok(siblings)
    }

    /// Encode a forest as the values following `THREAD` in a response.
    pub fn serialize(&self, forest: &ThreadForest) -> Vec<Value> {
        serialize_thread_tree(forest)
    }
}

/// A message identifier: a number, or an atom of decimal digits in u32 range.
pub(crate) fn parse_message_id(value: &Value) -> Result<u32> {
    match value {
        Value::Number(id) => Ok(*id),
        Value::Atom(text) => {
            if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
                return Err(Error::MalformedIdentifier(text.clone()));
            }
            text.parse::<u32>()
                .map_err(|_| Error::MalformedIdentifier(text.clone()))
        }
        other => Err(Error::MalformedElement(other.kind().to_string())),
    }
}

/// One list under construction: the terms written so far and the branches
/// still to be serialized into it.
struct OpenList<'a> {
    terms: Vec<Value>,
    branches: std::slice::Iter<'a, NodeId>,
}

/// Starts the list for the subtree at `node`: the chain of single children
/// inline, then one branch per child of the first node with several.
fn open_subtree(forest: &ThreadForest, node: NodeId) -> OpenList<'_> {
    let mut terms = Vec::new();
    let mut current = node;

    loop {
        terms.push(Value::Number(forest.message_id(current)));
        match forest.children(current) {
            [only] => current = *only,
            branches => {
                return OpenList {
                    terms,
                    branches: branches.iter(),
                };
            }
        }
    }
}

/// Parse a THREAD payload with the default codec settings.
pub fn parse_thread_tree(values: &[Value]) -> Result<ThreadForest> {
    ThreadCodec::default().parse(values)
}

/// Serialize a forest into THREAD payload values, one list per thread.
pub fn serialize_thread_tree(forest: &ThreadForest) -> Vec<Value> {
    // The top level collects one list per root
    let mut stack = vec![OpenList {
        terms: Vec::new(),
        branches: forest.roots().iter(),
    }];
    let mut threads = Vec::new();

    while let Some(mut list) = stack.pop() {
        if let Some(&branch) = list.branches.next() {
            stack.push(list);
            stack.push(open_subtree(forest, branch));
        } else if let Some(parent) = stack.last_mut() {
            parent.terms.push(Value::List(list.terms));
        } else {
            threads = list.terms;
        }
    }

    threads
}

enum Step {
    Open { node: NodeId, separated: bool },
    Close,
}

/// Wire text of a THREAD payload. Threads are concatenated without
/// separators, `(3)(5)`, as servers send them.
pub fn format_threads(forest: &ThreadForest) -> String {
    let mut out = String::new();
    let mut stack: Vec<Step> = forest
        .roots()
        .iter()
        .rev()
        .map(|&node| Step::Open {
            node,
            separated: false,
        })
        .collect();

    while let Some(step) = stack.pop() {
        let (node, separated) = match step {
            Step::Close => {
                out.push(')');
                continue;
            }
            Step::Open { node, separated } => (node, separated),
        };

        if separated {
            out.push(' ');
        }
        out.push('(');
        stack.push(Step::Close);

        let mut current = node;
        loop {
            out.push_str(&forest.message_id(current).to_string());
            match forest.children(current) {
                [] => break,
                [only] => {
                    out.push(' ');
                    current = *only;
                }
                branches => {
                    // Reverse pushes keep left-to-right order when popping
                    stack.extend(branches.iter().rev().map(|&node| Step::Open {
                        node,
                        separated: true,
                    }));
                    break;
                }
            }
        }
    }

    out
}
