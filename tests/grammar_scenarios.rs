//! End-to-end scenarios exercising the matcher through its public API only.

use cligen_match::expand::{ChoiceRegistry, NoExpansion};
use cligen_match::tree::{Child, Node, Preference};
use cligen_match::value::{Constraint, ScalarType};
use cligen_match::{complete, match_exact, MatchOutcome, MatcherConfig, TabMode, Tree};

fn show_interface_tree() -> Tree {
    let interface = Node::keyword("interface", Preference::KEYWORD);
    interface.set_terminal();
    let show = Node::keyword("show", Preference::KEYWORD);
    show.push_child(Child::Node(interface));
    Tree::new(vec![Child::Node(show)])
}

#[test]
fn abbreviated_prefix_resolves_to_unique_command() {
    let tree = show_interface_tree();
    let config = MatcherConfig::default();
    let outcome = match_exact(&tree, "sh int", &config, &NoExpansion, &NoExpansion).unwrap();
    match outcome {
        MatchOutcome::Unique(result) => assert_eq!(result.node.keyword_text(), Some("interface")),
        _ => panic!("expected unique match for \"sh int\""),
    }
}

#[test]
fn stopping_before_a_non_terminal_node_is_incomplete() {
    let tree = show_interface_tree();
    let config = MatcherConfig::default();
    let outcome = match_exact(&tree, "sh", &config, &NoExpansion, &NoExpansion).unwrap();
    assert!(matches!(outcome, MatchOutcome::Incomplete));
}

#[test]
fn unrelated_second_word_is_no_match() {
    let tree = show_interface_tree();
    let config = MatcherConfig::default();
    let outcome = match_exact(&tree, "sh foo", &config, &NoExpansion, &NoExpansion).unwrap();
    assert!(matches!(outcome, MatchOutcome::None(_)));
}

fn set_ttl_tree() -> Tree {
    let ttl = Node::variable(
        "v",
        ScalarType::Int32,
        vec![Constraint::Range { min: 0, max: 255 }],
        Preference::SCALAR,
    );
    ttl.set_terminal();
    let ttl_kw = Node::keyword("ttl", Preference::KEYWORD);
    ttl_kw.push_child(Child::Node(ttl));
    let set = Node::keyword("set", Preference::KEYWORD);
    set.push_child(Child::Node(ttl_kw));
    Tree::new(vec![Child::Node(set)])
}

#[test]
fn valid_ranged_integer_binds_its_value() {
    let tree = set_ttl_tree();
    let config = MatcherConfig::default();
    let outcome = match_exact(&tree, "set ttl 42", &config, &NoExpansion, &NoExpansion).unwrap();
    match outcome {
        MatchOutcome::Unique(result) => {
            let bindings = result.bindings.as_slice();
            assert_eq!(bindings.len(), 1);
            assert_eq!(bindings[0].name, "v");
            assert_eq!(bindings[0].value.to_string(), "42");
        }
        _ => panic!("expected unique match"),
    }
}

#[test]
fn out_of_range_integer_reports_range_reason() {
    let tree = set_ttl_tree();
    let config = MatcherConfig::default();
    let outcome = match_exact(&tree, "set ttl 999", &config, &NoExpansion, &NoExpansion).unwrap();
    match outcome {
        MatchOutcome::None(reason) => assert!(reason.unwrap().contains("range")),
        _ => panic!("expected no match"),
    }
}

#[test]
fn non_numeric_value_reports_parse_reason() {
    let tree = set_ttl_tree();
    let config = MatcherConfig::default();
    let outcome = match_exact(&tree, "set ttl abc", &config, &NoExpansion, &NoExpansion).unwrap();
    match outcome {
        MatchOutcome::None(reason) => assert!(reason.unwrap().contains("integer")),
        _ => panic!("expected no match"),
    }
}

// "enable" and "exit" share only their first letter: typing one more
// character ("en") disambiguates them, exercising both the ambiguous and
// the unique ends of preference arbitration over the same pair of keywords.
fn enable_exit_tree() -> Tree {
    let enable = Node::keyword("enable", Preference::KEYWORD);
    enable.set_terminal();
    let exit = Node::keyword("exit", Preference::KEYWORD);
    exit.set_terminal();
    Tree::new(vec![Child::Node(enable), Child::Node(exit)])
}

#[test]
fn two_character_prefix_is_unambiguous() {
    let tree = enable_exit_tree();
    let config = MatcherConfig::default();
    let outcome = match_exact(&tree, "en", &config, &NoExpansion, &NoExpansion).unwrap();
    match outcome {
        MatchOutcome::Unique(result) => assert_eq!(result.node.keyword_text(), Some("enable")),
        _ => panic!("expected unique match"),
    }
}

#[test]
fn one_character_prefix_is_ambiguous_without_tie_break() {
    let tree = enable_exit_tree();
    let config = MatcherConfig::default();
    let outcome = match_exact(&tree, "e", &config, &NoExpansion, &NoExpansion).unwrap();
    match outcome {
        MatchOutcome::Ambiguous(candidates) => assert_eq!(candidates.len(), 2),
        _ => panic!("expected ambiguous match"),
    }
}

#[test]
fn preference_mode_first_resolves_the_same_ambiguity() {
    let tree = enable_exit_tree();
    let config = MatcherConfig::new().preference_mode_first(true);
    let outcome = match_exact(&tree, "e", &config, &NoExpansion, &NoExpansion).unwrap();
    match outcome {
        MatchOutcome::Unique(result) => assert_eq!(result.node.keyword_text(), Some("enable")),
        _ => panic!("expected a unique match under preference_mode_first"),
    }
}

#[test]
fn rest_of_line_preserves_internal_spaces() {
    let message = Node::variable("s", ScalarType::Rest, vec![], Preference::REST);
    message.set_terminal();
    let echo = Node::keyword("echo", Preference::KEYWORD);
    echo.push_child(Child::Node(message));
    let tree = Tree::new(vec![Child::Node(echo)]);

    let config = MatcherConfig::default();
    let outcome = match_exact(&tree, "echo hello  world", &config, &NoExpansion, &NoExpansion).unwrap();
    match outcome {
        MatchOutcome::Unique(result) => {
            let bindings = result.bindings.as_slice();
            assert_eq!(bindings[0].value.to_string(), "hello  world");
        }
        _ => panic!("expected unique match"),
    }
}

fn choice_expanded_variable_tree() -> (Tree, ChoiceRegistry) {
    let exp = Node::variable("exp", ScalarType::String, vec![], Preference::STRING);
    exp.set_terminal();
    let tree = Tree::new(vec![Child::Node(exp)]);
    let mut choices = ChoiceRegistry::new();
    choices.register(
        "exp",
        vec![
            ("exp1".to_string(), None),
            ("exp2".to_string(), None),
            ("exp3".to_string(), None),
        ],
    );
    (tree, choices)
}

#[test]
fn choice_expansion_offers_every_registered_candidate() {
    let (tree, choices) = choice_expanded_variable_tree();
    let config = MatcherConfig::new().tabmode(TabMode { vars: true, steps: false });
    let result = complete(&tree, "exp", &config, &NoExpansion, &choices).unwrap();
    assert_eq!(result.candidates.len(), 3);
    assert_eq!(result.buffer, "exp");
}

#[test]
fn choice_expansion_binds_the_chosen_value_on_exact_match() {
    let (tree, choices) = choice_expanded_variable_tree();
    let config = MatcherConfig::default();
    let outcome = match_exact(&tree, "exp2", &config, &NoExpansion, &choices).unwrap();
    match outcome {
        MatchOutcome::Unique(result) => {
            let bindings = result.bindings.as_slice();
            assert_eq!(bindings.len(), 1);
            assert_eq!(bindings[0].name, "exp");
            assert_eq!(bindings[0].value.to_string(), "exp2");
        }
        _ => panic!("expected a unique match for \"exp2\""),
    }
}

#[test]
fn unambiguous_choice_advances_through_the_next_level_in_steps_mode() {
    let exp = Node::variable("exp", ScalarType::String, vec![], Preference::STRING);
    let trailer = Node::keyword("done", Preference::KEYWORD);
    trailer.set_terminal();
    exp.push_child(Child::Node(trailer));
    let tree = Tree::new(vec![Child::Node(exp)]);
    let mut choices = ChoiceRegistry::new();
    choices.register("exp", vec![("exp1".to_string(), None)]);

    let config = MatcherConfig::new().tabmode(TabMode { vars: true, steps: true });
    let result = complete(&tree, "exp1 ", &config, &NoExpansion, &choices).unwrap();
    assert_eq!(result.buffer, "exp1 done ");
}

#[test]
fn keyword_sibling_beats_string_variable_at_the_same_level() {
    let name = Node::variable("name", ScalarType::String, vec![], Preference::STRING);
    name.set_terminal();
    let help = Node::keyword("help", Preference::KEYWORD);
    help.set_terminal();
    let show = Node::keyword("show", Preference::KEYWORD);
    show.push_child(Child::Node(name));
    show.push_child(Child::Node(help));
    let tree = Tree::new(vec![Child::Node(show)]);

    let config = MatcherConfig::default();
    let outcome = match_exact(&tree, "show help", &config, &NoExpansion, &NoExpansion).unwrap();
    match outcome {
        MatchOutcome::Unique(result) => assert_eq!(result.node.keyword_text(), Some("help")),
        _ => panic!("expected unique match where the keyword beats the string variable"),
    }
}
