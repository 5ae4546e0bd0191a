//! A minimal interactive shell over a hand-built grammar, demonstrating
//! `match_exact` and `complete` together. Run with `cargo run --example repl`.

use std::io::{self, Write};

use cligen_match::tree::{Child, Node, Preference};
use cligen_match::value::{Constraint, ScalarType};
use cligen_match::{match_exact, MatchOutcome, MatcherConfig, NoExpansion, Tree};

fn build_tree() -> Tree {
    let eth0 = Node::keyword("eth0", Preference::KEYWORD);
    eth0.set_terminal();
    let eth1 = Node::keyword("eth1", Preference::KEYWORD);
    eth1.set_terminal();
    let interface = Node::keyword("interface", Preference::KEYWORD);
    interface.push_child(Child::Node(eth0));
    interface.push_child(Child::Node(eth1));
    let ip = Node::keyword("ip", Preference::KEYWORD);
    ip.set_terminal();
    let show = Node::keyword("show", Preference::KEYWORD);
    show.push_child(Child::Node(interface));
    show.push_child(Child::Node(ip));

    let ttl = Node::variable(
        "ttl",
        ScalarType::Int32,
        vec![Constraint::Range { min: 0, max: 255 }],
        Preference::SCALAR,
    );
    ttl.set_terminal();
    let set = Node::keyword("set", Preference::KEYWORD);
    set.push_child(Child::Node(ttl));

    let enable = Node::keyword("enable", Preference::KEYWORD);
    enable.set_terminal();
    let disable = Node::keyword("disable", Preference::KEYWORD);
    disable.set_terminal();

    Tree::new(vec![
        Child::Node(show),
        Child::Node(set),
        Child::Node(enable),
        Child::Node(disable),
    ])
}

fn main() {
    env_logger::init();
    let stdin = io::stdin();
    let config = MatcherConfig::default();
    let tree = build_tree();
    println!("type a command (show interface eth0 | set ttl <n> | enable | disable), empty line to quit");
    loop {
        print!("> ");
        io::stdout().flush().ok();
        let mut line = String::new();
        if stdin.read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let line = line.trim_end_matches('\n');
        if line.is_empty() {
            break;
        }
        match match_exact(&tree, line, &config, &NoExpansion, &NoExpansion) {
            Ok(MatchOutcome::Unique(result)) => {
                println!("matched {:?}, bindings: {:?}", result.node.keyword_text(), result.bindings.as_slice());
            }
            Ok(MatchOutcome::Ambiguous(candidates)) => {
                println!("ambiguous: {} candidates", candidates.len());
            }
            Ok(MatchOutcome::Incomplete) => println!("incomplete command"),
            Ok(MatchOutcome::None(reason)) => {
                println!("unknown command{}", reason.map(|r| format!(": {r}")).unwrap_or_default());
            }
            Err(e) => println!("error: {e}"),
        }
    }
}
