//! Depth-first traversal of one registry source.
//!
//! The walk uses an explicit stack instead of recursion. A key's values are
//! searched before its children; children are pushed in reverse so they pop
//! in source order, which keeps hit order identical to a pre-order,
//! left-to-right enumeration of the tree.
//!
//! Children are pushed unopened and opened when popped. A parent stays open
//! only while some of its children are still pending, so at most one key per
//! level is held open.
//!
//! A key is walked at most once per source. A key seen again below itself is
//! a `cycle`; a key seen again elsewhere is an `alias`. Both skip the branch.

use super::matcher::Matcher;
use super::results::{ErrorRecord, MatchHit, SearchResultSet};
use crate::error::{ErrorKind, NodeError};
use crate::registry::{KeyPath, RegistrySource};
use std::collections::HashSet;
use std::rc::Rc;
use tracing::debug;

/// Default maximum key depth below a root.
pub const DEFAULT_MAX_DEPTH: usize = 512;

enum Frame<N, R> {
    Pending {
        parent: Rc<N>,
        child: R,
        path: KeyPath,
        depth: usize,
    },
    Failed {
        path: KeyPath,
        error: NodeError,
    },
}

/// Walks sources and records hits and per-node failures.
pub struct Walker<'m> {
    matcher: &'m Matcher,
    max_depth: usize,
}

impl<'m> Walker<'m> {
    pub fn new(matcher: &'m Matcher, max_depth: usize) -> Self {
        Walker { matcher, max_depth }
    }

    /// Walk `source` from its root, appending to `results`.
    pub fn walk<S: RegistrySource + ?Sized>(&self, source: &S, results: &mut SearchResultSet) {
        let label = source.label().to_string();
        let (root_name, root) = match source.root() {
            Ok(r) => r,
            Err(e) => {
                debug!("walk: root of {} unreadable: {}", label, e);
                results.push_error(ErrorRecord::new(&label, &label, &e));
                return;
            }
        };

        let mut stack: Vec<Frame<S::Node, S::ChildRef>> = Vec::new();
        // Identities of the keys on the path from the root to the current key.
        let mut ancestry: Vec<Option<u64>> = Vec::new();
        let mut seen: HashSet<u64> = HashSet::new();
        let mut visited = 0usize;
        let mut next = Some((KeyPath::root(root_name), root, 0usize));

        loop {
            let (path, node, depth) = match next.take() {
                Some(entered) => entered,
                None => match stack.pop() {
                    None => break,
                    Some(Frame::Failed { path, error }) => {
                        results.push_error(ErrorRecord::new(&label, path.to_string(), &error));
                        continue;
                    }
                    Some(Frame::Pending {
                        parent,
                        child,
                        path,
                        depth,
                    }) => match source.open_child(&parent, child) {
                        Ok(node) => (path, node, depth),
                        Err(e) => {
                            results.push_error(ErrorRecord::new(&label, path.to_string(), &e));
                            continue;
                        }
                    },
                },
            };

            ancestry.truncate(depth);
            let id = source.node_id(&node);
            if let Some(id) = id {
                if !seen.insert(id) {
                    let error = if ancestry.contains(&Some(id)) {
                        NodeError::new(ErrorKind::Cycle, "key is its own ancestor; branch skipped")
                    } else {
                        NodeError::new(ErrorKind::Alias, "key already walked under another path; branch skipped")
                    };
                    results.push_error(ErrorRecord::new(&label, path.to_string(), &error));
                    continue;
                }
            }
            ancestry.push(id);
            visited += 1;

            self.visit_values(source, &label, &path, &node, results);

            let children = match source.children(&node) {
                Ok(children) => children,
                Err(e) => {
                    results.push_error(ErrorRecord::new(&label, path.to_string(), &e));
                    continue;
                }
            };
            if children.is_empty() {
                continue;
            }
            if depth >= self.max_depth {
                let error = NodeError::new(
                    ErrorKind::Depth,
                    format!("maximum depth {} reached; {} subkeys skipped", self.max_depth, children.len()),
                );
                results.push_error(ErrorRecord::new(&label, path.to_string(), &error));
                continue;
            }
            let parent = Rc::new(node);
            for child in children.into_iter().rev() {
                let child_path = path.child(&child.name);
                stack.push(match child.entry {
                    Ok(child) => Frame::Pending {
                        parent: Rc::clone(&parent),
                        child,
                        path: child_path,
                        depth: depth + 1,
                    },
                    Err(error) => Frame::Failed {
                        path: child_path,
                        error,
                    },
                });
            }
        }

        debug!("walk: {} keys visited under {}", visited, label);
    }

    fn visit_values<S: RegistrySource + ?Sized>(
        &self,
        source: &S,
        label: &str,
        path: &KeyPath,
        node: &S::Node,
        results: &mut SearchResultSet,
    ) {
        let values = match source.values(node) {
            Ok(values) => values,
            Err(e) => {
                results.push_error(ErrorRecord::new(label, path.to_string(), &e));
                return;
            }
        };
        for value in values {
            match value {
                Ok(value) => {
                    if let Some(text) = self.matcher.match_value(&value) {
                        results.push_hit(MatchHit {
                            source: label.to_string(),
                            path: path.to_string(),
                            name: value.name,
                            textual_form: text,
                        });
                    }
                }
                Err(e) => results.push_error(ErrorRecord::new(label, path.to_string(), &e)),
            }
        }
    }
}
