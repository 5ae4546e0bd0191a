//! Tab-completion engine (§4.7): grows the current partial token to the
//! longest common prefix of every matching candidate, and — in STEPS mode —
//! keeps advancing through forced single-candidate levels.

use crate::config::MatcherConfig;
use crate::error::Result;
use crate::expand::{ChoiceExpander, ReferenceResolver};
use crate::token::Tokens;
use crate::tree::{NodeKind, Tree};
use crate::walker::{self, MatchResult};

/// The outcome of a completion pass: the (possibly grown) input buffer, and
/// the labels of every candidate considered at the point completion stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResult {
    pub buffer: String,
    pub candidates: Vec<String>,
}

struct StepResult {
    buffer: String,
    candidates: Vec<String>,
    advanced: bool,
}

/// Complete `input` against `tree`. In STEPS mode, repeatedly completes and
/// advances past forced single-candidate levels until an ambiguity, a dead
/// end, or a variable is reached.
pub fn complete(
    tree: &Tree,
    input: &str,
    config: &MatcherConfig,
    resolver: &dyn ReferenceResolver,
    expander: &dyn ChoiceExpander,
) -> Result<CompletionResult> {
    let mut buffer = input.to_string();
    let mut candidates = Vec::new();
    loop {
        let step = complete_one_step(tree, &buffer, config, resolver, expander)?;
        buffer = step.buffer;
        candidates = step.candidates;
        if !(config.tabmode.steps && step.advanced) {
            break;
        }
    }
    Ok(CompletionResult { buffer, candidates })
}

fn complete_one_step(
    tree: &Tree,
    input: &str,
    config: &MatcherConfig,
    resolver: &dyn ReferenceResolver,
    expander: &dyn ChoiceExpander,
) -> Result<StepResult> {
    let tokens = Tokens::tokenise(input)?;
    let last_level = tokens.levels() + 1;
    let partial = tokens.token(last_level);

    let outcome = walker::match_pattern(tree, &tokens, config, resolver, expander)?;
    let eligible: Vec<&MatchResult> = outcome
        .matches
        .iter()
        .filter(|m| config.tabmode.vars || matches!(m.node.kind, NodeKind::Keyword(_)))
        .collect();

    if eligible.is_empty() {
        return Ok(StepResult {
            buffer: input.to_string(),
            candidates: Vec::new(),
            advanced: false,
        });
    }

    if eligible.len() == 1 {
        let m = eligible[0];
        return Ok(match m.node.keyword_text() {
            Some(text) => {
                let mut buffer = replace_last_token(input, &tokens, last_level, text);
                buffer.push(config.delimiter);
                StepResult {
                    buffer,
                    candidates: vec![text.to_string()],
                    advanced: true,
                }
            }
            None => StepResult {
                buffer: input.to_string(),
                candidates: vec![candidate_label(m)],
                advanced: false,
            },
        });
    }

    let labels: Vec<String> = eligible.iter().map(|m| candidate_label(m)).collect();
    let literal_texts: Vec<&str> = eligible.iter().filter_map(|m| m.node.keyword_text()).collect();
    // A single keyword candidate alongside a still-matching variable is
    // genuine ambiguity, not a growable stem: growing to the keyword's full
    // text would silently discard the variable possibility. Only grow when
    // at least two keywords are competing for a real common prefix.
    if literal_texts.len() < 2 {
        return Ok(StepResult {
            buffer: input.to_string(),
            candidates: labels,
            advanced: false,
        });
    }

    let common = longest_common_prefix(&literal_texts);
    let buffer = if common.len() > partial.len() {
        replace_last_token(input, &tokens, last_level, &common)
    } else {
        input.to_string()
    };
    Ok(StepResult {
        buffer,
        candidates: labels,
        advanced: false,
    })
}

fn candidate_label(m: &MatchResult) -> String {
    match m.node.keyword_text() {
        Some(text) => text.to_string(),
        None => match &m.node.kind {
            NodeKind::Variable(v) => format!("<{}>", v.name),
            _ => String::new(),
        },
    }
}

fn replace_last_token(input: &str, tokens: &Tokens, last_level: usize, replacement: &str) -> String {
    let rest = tokens.rest(last_level);
    let prefix_len = input.len() - rest.len();
    format!("{}{}", &input[..prefix_len], replacement)
}

fn longest_common_prefix(strs: &[&str]) -> String {
    let Some(first) = strs.first() else {
        return String::new();
    };
    let mut prefix_len = first.len();
    for s in &strs[1..] {
        let shared = first
            .char_indices()
            .zip(s.char_indices())
            .take_while(|((_, a), (_, b))| a == b)
            .last()
            .map(|((i, c), _)| i + c.len_utf8())
            .unwrap_or(0);
        prefix_len = prefix_len.min(shared);
    }
    first[..prefix_len].to_string()
}
