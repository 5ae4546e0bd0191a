//! Recursive-descent tree walker (§4.4): the core algorithm that consumes
//! one input token per grammar level, arbitrating between sibling
//! candidates by preference before descending to the next level.

use std::rc::Rc;

use crate::config::MatcherConfig;
use crate::error::{Error, Result};
use crate::expand::{self, ChoiceExpander, ReferenceResolver};
use crate::limit::LimitTracker;
use crate::node_match::{self, NodeMatch};
use crate::token::Tokens;
use crate::tree::{Binding, Bindings, Child, Node, NodeKind, Tree};
use crate::value;

/// One surviving path through the tree: the node matched at the final
/// token, its preference weight, and the bindings accumulated along the way.
#[derive(Clone)]
pub struct MatchResult {
    pub node: Rc<Node>,
    pub preference: i32,
    pub exact: bool,
    pub bindings: Bindings,
}

/// The outcome of walking one command line: every surviving path, plus a
/// diagnostic reason string when nothing survived and the dead end was a
/// variable-only level (§4.4.1, the `onlyvars` heuristic).
pub struct WalkOutcome {
    pub matches: Vec<MatchResult>,
    pub reason: Option<String>,
}

/// Walk `tree` against `tokens` from the first level, expanding references
/// and choice variables as they are encountered.
pub fn match_pattern(
    tree: &Tree,
    tokens: &Tokens,
    config: &MatcherConfig,
    resolver: &dyn ReferenceResolver,
    expander: &dyn ChoiceExpander,
) -> Result<WalkOutcome> {
    let mut bindings = Bindings::new();
    let mut limit = LimitTracker::default();
    walk_level(&tree.roots, 1, tokens, &mut bindings, config, resolver, expander, &mut limit)
}

/// Depth-guarded entry to one level of the recursion: bumps the recursion
/// budget, runs the level, then always releases the budget again.
fn walk_level(
    children: &[Child],
    level: usize,
    tokens: &Tokens,
    bindings: &mut Bindings,
    config: &MatcherConfig,
    resolver: &dyn ReferenceResolver,
    expander: &dyn ChoiceExpander,
    limit: &mut LimitTracker,
) -> Result<WalkOutcome> {
    limit.consume();
    if limit.limited() {
        limit.release();
        return Err(Error::CyclicExpansion(format!(
            "recursion limit exceeded at command level {level}"
        )));
    }
    let outcome = walk_level_inner(children, level, tokens, bindings, config, resolver, expander, limit);
    limit.release();
    outcome
}

fn walk_level_inner(
    children: &[Child],
    level: usize,
    tokens: &Tokens,
    bindings: &mut Bindings,
    config: &MatcherConfig,
    resolver: &dyn ReferenceResolver,
    expander: &dyn ChoiceExpander,
    limit: &mut LimitTracker,
) -> Result<WalkOutcome> {
    let token = tokens.token(level);
    let rest = tokens.rest(level);
    // `tokens.levels()` counts the committed words before the current one
    // (see `Tokens`), so the final, currently-typed token sits one past it.
    let is_terminal_level = level >= tokens.levels() + 1;

    let mut nodes_only: Vec<Rc<Node>> = Vec::new();
    for child in children {
        flatten_transparent(child, bindings, resolver, expander, limit, &mut nodes_only)?;
    }

    let mut candidates: Vec<(Rc<Node>, NodeMatch, &str)> = Vec::new();
    for node in &nodes_only {
        let candidate = candidate_for(node, token, rest);
        let m = node_match::match_node(node, Some(candidate), config);
        if m.matched {
            candidates.push((Rc::clone(node), m, candidate));
        }
    }

    if candidates.is_empty() {
        return Ok(WalkOutcome {
            matches: Vec::new(),
            reason: failure_reason(&nodes_only, token, config),
        });
    }

    if is_terminal_level {
        // §4.4.2: terminal level collects every match, unpruned — the
        // tie-breaker runs later, over the whole result set (§4.6).
        let mut matches = Vec::with_capacity(candidates.len());
        for (node, m, candidate) in candidates {
            let mut leaf_bindings = bindings.clone();
            capture_binding(&node, candidate, &mut leaf_bindings);
            matches.push(MatchResult {
                preference: node.preference(m.exact),
                exact: m.exact,
                node,
                bindings: leaf_bindings,
            });
        }
        return Ok(WalkOutcome { matches, reason: None });
    }

    // §4.4.1 interior level: an exact keyword match overrides every other
    // candidate; otherwise descend into every sibling sharing the top
    // preference tier.
    let perfect: Vec<_> = candidates
        .iter()
        .filter(|(node, _, candidate)| node_match::is_perfect_match(node, candidate, config))
        .cloned()
        .collect();
    let surviving = if !perfect.is_empty() {
        perfect
    } else {
        let top = candidates
            .iter()
            .map(|(node, m, _)| node.preference(m.exact))
            .max()
            .unwrap_or(0);
        candidates
            .into_iter()
            .filter(|(node, m, _)| node.preference(m.exact) == top)
            .collect()
    };

    let mut matches = Vec::new();
    let mut reason = None;
    for (node, _, candidate) in surviving {
        let pushed = push_binding_if_variable(&node, candidate, bindings);
        let sub = {
            let grandchildren = node.children();
            let grandchildren: Vec<Child> = grandchildren.clone();
            walk_level(&grandchildren, level + 1, tokens, bindings, config, resolver, expander, limit)?
        };
        if pushed {
            bindings.pop();
        }
        if sub.matches.is_empty() {
            reason = reason.or(sub.reason);
        } else {
            matches.extend(sub.matches);
        }
    }

    if matches.is_empty() {
        Ok(WalkOutcome { matches, reason })
    } else {
        Ok(WalkOutcome { matches, reason: None })
    }
}

/// §4.4.1 `onlyvars`: a dead end's parse/validation failure is only worth
/// surfacing when every sibling at this level is a variable — if a keyword
/// sibling exists, the user likely mistyped the keyword, and the variable's
/// rejection reason would only be noise.
fn failure_reason(nodes: &[Rc<Node>], token: &str, config: &MatcherConfig) -> Option<String> {
    let only_vars = !nodes.is_empty()
        && nodes
            .iter()
            .all(|n| matches!(n.kind, NodeKind::Variable(_)));
    if !only_vars {
        return None;
    }
    let reasons: Vec<String> = nodes
        .iter()
        .filter_map(|n| node_match::match_node(n, Some(token), config).reason)
        .collect();
    if reasons.is_empty() {
        None
    } else {
        Some(reasons.join("; "))
    }
}

/// A `Reference` never matches a token itself, and a choice-expanded
/// variable stands in for its synthetic keyword alternatives rather than
/// for a raw value (§4.4.3) — both are transparent, so this recurses into
/// their (already-expanded) children and collects the real candidates in
/// their place. Guarded by `limit` against a resolver/expander cycle.
fn flatten_transparent(
    child: &Child,
    bindings: &Bindings,
    resolver: &dyn ReferenceResolver,
    expander: &dyn ChoiceExpander,
    limit: &mut LimitTracker,
    out: &mut Vec<Rc<Node>>,
) -> Result<()> {
    let Child::Node(node) = child else { return Ok(()) };
    expand::expand_node(node, bindings, resolver, expander)?;

    let transparent = matches!(node.kind, NodeKind::Reference(_)) || node.is_choice_expanded();
    if !transparent {
        out.push(Rc::clone(node));
        return Ok(());
    }

    limit.consume();
    if limit.limited() {
        limit.release();
        return Err(Error::CyclicExpansion(
            "reference or choice expansion nested too deeply".to_string(),
        ));
    }
    let grandchildren: Vec<Child> = node.children().clone();
    for grandchild in &grandchildren {
        flatten_transparent(grandchild, bindings, resolver, expander, limit, out)?;
    }
    limit.release();
    Ok(())
}

/// A rest-of-line variable matches against the remainder of the line from
/// this level onward (spaces included); everything else matches the single
/// current token.
fn candidate_for<'t>(node: &Node, token: &'t str, rest: &'t str) -> &'t str {
    if node.is_rest_variable() {
        rest
    } else {
        token
    }
}

fn push_binding_if_variable(node: &Rc<Node>, token: &str, bindings: &mut Bindings) -> bool {
    if let NodeKind::Variable(v) = &node.kind {
        if let Ok(typed) = value::parse(&v.ty, token) {
            node.set_matched_value(token.to_string());
            bindings.push(Binding {
                name: v.name.clone(),
                value: typed,
                is_constant: false,
            });
            return true;
        }
        return false;
    }
    // §4.4.1 step 6: a synthetic keyword expanded from a variable (§4.4.3)
    // binds back into its origin's name, not its own.
    let origin = node.origin();
    if !Rc::ptr_eq(&origin, node) {
        if let (NodeKind::Keyword(k), NodeKind::Variable(v)) = (&node.kind, &origin.kind) {
            origin.set_matched_value(k.text.clone());
            bindings.push(Binding {
                name: v.name.clone(),
                value: value::TypedValue::String(k.text.clone()),
                is_constant: false,
            });
            return true;
        }
    }
    false
}

fn capture_binding(node: &Rc<Node>, token: &str, bindings: &mut Bindings) {
    push_binding_if_variable(node, token, bindings);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expand::NoExpansion;
    use crate::tree::{Child, Preference};
    use crate::value::ScalarType;

    fn show_iface_tree() -> Tree {
        let eth0 = Node::keyword("eth0", Preference::KEYWORD);
        eth0.set_terminal();
        let show = Node::keyword("show", Preference::KEYWORD);
        show.push_child(Child::Node(eth0));
        Tree::new(vec![Child::Node(show)])
    }

    #[test]
    fn single_keyword_path_matches() {
        let tree = show_iface_tree();
        let tokens = Tokens::tokenise("show eth0").unwrap();
        let config = MatcherConfig::default();
        let outcome = match_pattern(&tree, &tokens, &config, &NoExpansion, &NoExpansion).unwrap();
        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].node.keyword_text(), Some("eth0"));
    }

    #[test]
    fn typed_variable_binds_value() {
        let ttl = Node::variable(
            "ttl",
            ScalarType::Int32,
            vec![crate::value::Constraint::Range { min: 0, max: 255 }],
            Preference::SCALAR,
        );
        ttl.set_terminal();
        let set = Node::keyword("set", Preference::KEYWORD);
        set.push_child(Child::Node(ttl));
        let tree = Tree::new(vec![Child::Node(set)]);

        let tokens = Tokens::tokenise("set 64").unwrap();
        let config = MatcherConfig::default();
        let outcome = match_pattern(&tree, &tokens, &config, &NoExpansion, &NoExpansion).unwrap();
        assert_eq!(outcome.matches.len(), 1);
        let bindings = &outcome.matches[0].bindings;
        assert_eq!(bindings.as_slice()[0].name, "ttl");
    }

    #[test]
    fn out_of_range_value_produces_reason_when_onlyvars() {
        let ttl = Node::variable(
            "ttl",
            ScalarType::Int32,
            vec![crate::value::Constraint::Range { min: 0, max: 255 }],
            Preference::SCALAR,
        );
        ttl.set_terminal();
        let set = Node::keyword("set", Preference::KEYWORD);
        set.push_child(Child::Node(ttl));
        let tree = Tree::new(vec![Child::Node(set)]);

        let tokens = Tokens::tokenise("set 9999").unwrap();
        let config = MatcherConfig::default();
        let outcome = match_pattern(&tree, &tokens, &config, &NoExpansion, &NoExpansion).unwrap();
        assert!(outcome.matches.is_empty());
        assert!(outcome.reason.unwrap().contains("range"));
    }

    #[test]
    fn keyword_sibling_suppresses_variable_reason() {
        let ttl = Node::variable(
            "ttl",
            ScalarType::Int32,
            vec![crate::value::Constraint::Range { min: 0, max: 255 }],
            Preference::SCALAR,
        );
        ttl.set_terminal();
        let help = Node::keyword("help", Preference::KEYWORD);
        help.set_terminal();
        let set = Node::keyword("set", Preference::KEYWORD);
        set.push_child(Child::Node(ttl));
        set.push_child(Child::Node(help));
        let tree = Tree::new(vec![Child::Node(set)]);

        // "9999" matches neither the "help" keyword prefix nor the ttl
        // range, but a keyword sibling exists, so the range-failure reason
        // must be suppressed (§4.4.1, onlyvars).
        let tokens = Tokens::tokenise("set 9999").unwrap();
        let config = MatcherConfig::default();
        let outcome = match_pattern(&tree, &tokens, &config, &NoExpansion, &NoExpansion).unwrap();
        assert!(outcome.matches.is_empty());
        assert!(outcome.reason.is_none());
    }

    #[test]
    fn ambiguous_prefix_yields_multiple_matches() {
        let int = Node::keyword("interface", Preference::KEYWORD);
        int.set_terminal();
        let ip = Node::keyword("ip", Preference::KEYWORD);
        ip.set_terminal();
        let show = Node::keyword("show", Preference::KEYWORD);
        show.push_child(Child::Node(int));
        show.push_child(Child::Node(ip));
        let tree = Tree::new(vec![Child::Node(show)]);

        let tokens = Tokens::tokenise("show i").unwrap();
        let config = MatcherConfig::default();
        let outcome = match_pattern(&tree, &tokens, &config, &NoExpansion, &NoExpansion).unwrap();
        assert_eq!(outcome.matches.len(), 2);
    }

    #[test]
    fn terminal_level_keeps_both_prefix_and_exact_unpruned() {
        // "en" and "enable" both start with "en"; the walker itself never
        // prunes a terminal level (§4.4.2) -- arbitration between an exact
        // match and a longer prefix happens later, in the tie-breaker.
        let en = Node::keyword("en", Preference::KEYWORD);
        en.set_terminal();
        let enable = Node::keyword("enable", Preference::KEYWORD);
        enable.set_terminal();
        let root = Node::keyword("mode", Preference::KEYWORD);
        root.push_child(Child::Node(en));
        root.push_child(Child::Node(enable));
        let tree = Tree::new(vec![Child::Node(root)]);

        let tokens = Tokens::tokenise("mode en").unwrap();
        let config = MatcherConfig::default();
        let outcome = match_pattern(&tree, &tokens, &config, &NoExpansion, &NoExpansion).unwrap();
        assert_eq!(outcome.matches.len(), 2);
        assert!(outcome.matches.iter().any(|m| m.exact && m.node.keyword_text() == Some("en")));
    }

    #[test]
    fn reference_is_transparent_to_matching() {
        // A bare Reference node never matches a token itself (§4.4.3); the
        // walker must offer the resolved subtree's children as candidates
        // at the reference's own level, not one level further down.
        struct OneTarget(Rc<Node>);
        impl crate::expand::ReferenceResolver for OneTarget {
            fn resolve(&self, name: &str) -> Option<Rc<Node>> {
                (name == "iface").then(|| Rc::clone(&self.0))
            }
        }

        let eth0 = Node::keyword("eth0", Preference::KEYWORD);
        eth0.set_terminal();
        let target_root = Node::keyword("unused-root", 0);
        target_root.push_child(Child::Node(eth0));

        let reference = Node::reference("iface");
        let show = Node::keyword("show", Preference::KEYWORD);
        show.push_child(Child::Node(reference));
        let tree = Tree::new(vec![Child::Node(show)]);

        let resolver = OneTarget(target_root);
        let tokens = Tokens::tokenise("show eth0").unwrap();
        let config = MatcherConfig::default();
        let outcome = match_pattern(&tree, &tokens, &config, &resolver, &NoExpansion).unwrap();
        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].node.keyword_text(), Some("eth0"));
    }

    #[test]
    fn choice_expanded_match_binds_origin_variable_at_terminal_level() {
        // §4.4.1 step 6: matching a synthetic keyword must bind into its
        // origin variable's name, not silently drop the value.
        struct Choices;
        impl ChoiceExpander for Choices {
            fn expand(&self, name: &str, _b: &Bindings) -> Option<Vec<(String, Option<String>)>> {
                (name == "exp").then(|| {
                    vec![("exp1".into(), None), ("exp2".into(), None), ("exp3".into(), None)]
                })
            }
        }

        let exp = Node::variable("exp", ScalarType::String, vec![], Preference::STRING);
        exp.set_terminal();
        let tree = Tree::new(vec![Child::Node(exp)]);

        let tokens = Tokens::tokenise("exp2").unwrap();
        let config = MatcherConfig::default();
        let outcome = match_pattern(&tree, &tokens, &config, &NoExpansion, &Choices).unwrap();
        assert_eq!(outcome.matches.len(), 1);
        let bindings = outcome.matches[0].bindings.as_slice();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].name, "exp");
        assert_eq!(bindings[0].value.to_string(), "exp2");
    }

    #[test]
    fn choice_expanded_match_binds_origin_variable_at_interior_level() {
        // Same binding capture, but through the interior-level path
        // (walker.rs's `push_binding_if_variable`) because a trailer follows.
        struct Choices;
        impl ChoiceExpander for Choices {
            fn expand(&self, name: &str, _b: &Bindings) -> Option<Vec<(String, Option<String>)>> {
                (name == "exp").then(|| vec![("exp1".into(), None)])
            }
        }

        let exp = Node::variable("exp", ScalarType::String, vec![], Preference::STRING);
        let done = Node::keyword("done", Preference::KEYWORD);
        done.set_terminal();
        exp.push_child(Child::Node(done));
        let tree = Tree::new(vec![Child::Node(exp)]);

        let tokens = Tokens::tokenise("exp1 done").unwrap();
        let config = MatcherConfig::default();
        let outcome = match_pattern(&tree, &tokens, &config, &NoExpansion, &Choices).unwrap();
        assert_eq!(outcome.matches.len(), 1);
        let bindings = outcome.matches[0].bindings.as_slice();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].name, "exp");
        assert_eq!(bindings[0].value.to_string(), "exp1");
    }
}
