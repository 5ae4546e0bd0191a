//! Exact-match entry point (§4.5) and the final tie-breaker (§4.6).

use std::rc::Rc;

use crate::config::MatcherConfig;
use crate::error::Result;
use crate::expand::{ChoiceExpander, ReferenceResolver};
use crate::token::Tokens;
use crate::tree::Tree;
use crate::walker::{self, MatchResult};

/// The result of matching a complete command line against a grammar tree.
pub enum MatchOutcome {
    /// No candidate in the tree accepted this input at all. Carries the
    /// suppressed-aware reason (§4.4.1 step 4) when one was recorded; the
    /// caller falls back to a generic "Unknown command" otherwise.
    None(Option<String>),
    /// A candidate matched every token, but the matched node is not a legal
    /// place to stop (no `Terminal` child) — more input is expected.
    Incomplete,
    /// Exactly one candidate survived the tie-breaker.
    Unique(MatchResult),
    /// Several equally preferred candidates survived; `preference_mode_first`
    /// was not set, so the caller must disambiguate.
    Ambiguous(Vec<MatchResult>),
}

/// Match `input` against `tree` to completion: tokenise, walk, then arbitrate
/// down to zero, one, or many results.
pub fn match_exact(
    tree: &Tree,
    input: &str,
    config: &MatcherConfig,
    resolver: &dyn ReferenceResolver,
    expander: &dyn ChoiceExpander,
) -> Result<MatchOutcome> {
    let tokens = Tokens::tokenise(input)?;
    match_exact_tokens(tree, &tokens, config, resolver, expander)
}

pub fn match_exact_tokens(
    tree: &Tree,
    tokens: &Tokens,
    config: &MatcherConfig,
    resolver: &dyn ReferenceResolver,
    expander: &dyn ChoiceExpander,
) -> Result<MatchOutcome> {
    let outcome = walker::match_pattern(tree, tokens, config, resolver, expander)?;
    let reason = outcome.reason.clone();
    let matches = tie_break(outcome.matches, config);
    Ok(match matches.len() {
        0 => MatchOutcome::None(reason),
        1 => {
            let result = matches.into_iter().next().unwrap();
            if result.node.is_terminal() {
                apply_origin_side_effect(&result);
                MatchOutcome::Unique(result)
            } else {
                MatchOutcome::Incomplete
            }
        }
        _ => MatchOutcome::Ambiguous(matches),
    })
}

/// §4.6: an exact keyword match anywhere in the result set beats every
/// non-exact candidate outright; otherwise keep only the top preference
/// tier. When `preference_mode_first` is set, a remaining tie is broken by
/// keeping the first candidate encountered during the walk.
fn tie_break(mut matches: Vec<MatchResult>, config: &MatcherConfig) -> Vec<MatchResult> {
    if matches.is_empty() {
        return matches;
    }
    if matches.iter().any(|m| m.exact) {
        matches.retain(|m| m.exact);
    } else {
        // §9: a set with no positive-preference candidate ties at weight 0.
        let top = matches.iter().map(|m| m.preference).max().unwrap_or(0);
        matches.retain(|m| m.preference == top);
    }
    if matches.len() > 1 && config.preference_mode_first {
        matches.truncate(1);
    }
    matches
}

/// §5, side effect (b): when the unique match is a synthetic keyword
/// produced by choice expansion, record the matched text on the variable it
/// was expanded from, so a grammar-side reader sees the chosen value there.
fn apply_origin_side_effect(result: &MatchResult) {
    let origin = result.node.origin();
    if !Rc::ptr_eq(&origin, &result.node) {
        if let Some(text) = result.node.keyword_text() {
            origin.set_matched_value(text.to_string());
        }
    }
}
