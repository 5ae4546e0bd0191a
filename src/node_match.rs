//! Single-node matcher (§4.3): decides whether one candidate string matches
//! one grammar node, independent of its siblings.

use crate::config::MatcherConfig;
use crate::tree::{Node, NodeKind};
use crate::value;

/// The result of matching a single node against a candidate string.
#[derive(Clone)]
pub struct NodeMatch {
    pub matched: bool,
    /// True only for a keyword whose full text equals the candidate.
    pub exact: bool,
    /// Set when `matched` is false and the node is a variable: the parser's
    /// or validator's reason string (§4.2).
    pub reason: Option<String>,
}

impl NodeMatch {
    fn no() -> Self {
        NodeMatch {
            matched: false,
            exact: false,
            reason: None,
        }
    }

    fn yes(exact: bool) -> Self {
        NodeMatch {
            matched: true,
            exact,
            reason: None,
        }
    }

    fn no_with_reason(reason: String) -> Self {
        NodeMatch {
            matched: false,
            exact: false,
            reason: Some(reason),
        }
    }
}

/// Match `candidate` (`None` means "vacuous match", used while enumerating
/// expansion choices) against `node`.
pub fn match_node(node: &Node, candidate: Option<&str>, config: &MatcherConfig) -> NodeMatch {
    match &node.kind {
        NodeKind::Keyword(k) => {
            let Some(candidate) = candidate else {
                return NodeMatch::yes(false);
            };
            let (text, candidate) = if config.ignorecase {
                (k.text.to_ascii_lowercase(), candidate.to_ascii_lowercase())
            } else {
                (k.text.clone(), candidate.to_string())
            };
            if text.starts_with(&candidate) {
                NodeMatch::yes(text.len() == candidate.len())
            } else {
                NodeMatch::no()
            }
        }
        NodeKind::Variable(v) => {
            let Some(candidate) = candidate else {
                return NodeMatch::yes(false);
            };
            if v.ty == crate::value::ScalarType::Rest {
                return if candidate.is_empty() {
                    NodeMatch::no()
                } else {
                    NodeMatch::yes(false)
                };
            }
            if candidate.is_empty() {
                return NodeMatch::yes(false);
            }
            match match_variable(&v.ty, &v.constraints, candidate) {
                Ok(()) => NodeMatch::yes(false),
                Err(reason) => NodeMatch::no_with_reason(reason),
            }
        }
        // References are resolved by the walker before matching ever runs.
        NodeKind::Reference(_) => NodeMatch::no(),
    }
}

/// §4.2: parse `candidate` as the variable's declared type, then validate it
/// against every constraint. The value itself is discarded here; the walker
/// re-parses it when a binding is actually captured.
fn match_variable(
    ty: &crate::value::ScalarType,
    constraints: &[crate::value::Constraint],
    candidate: &str,
) -> Result<(), String> {
    let typed = value::parse(ty, candidate)?;
    for constraint in constraints {
        constraint.validate(candidate, &typed)?;
    }
    Ok(())
}

/// §4.3: true iff `node` is a keyword and `candidate` equals it exactly
/// (modulo case-folding per config).
pub fn is_perfect_match(node: &Node, candidate: &str, config: &MatcherConfig) -> bool {
    match &node.kind {
        NodeKind::Keyword(k) => {
            if config.ignorecase {
                k.text.eq_ignore_ascii_case(candidate)
            } else {
                k.text == candidate
            }
        }
        _ => false,
    }
}
