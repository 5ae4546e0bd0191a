//! A CLI command grammar matcher: given a tree of keywords, typed
//! variables, and references, match an input line against it, or offer
//! tab-completion for a partial one.
//!
//! The grammar itself — parsing a textual syntax into a [`tree::Tree`],
//! resolving references, and enumerating variable choices — is the caller's
//! responsibility (see [`expand::ReferenceResolver`] and
//! [`expand::ChoiceExpander`]). This crate only walks an already-built tree.
//!
//! Single-threaded by design: [`tree::Node`] uses `Rc`/`RefCell` rather than
//! `Arc`/`Mutex`, since one matcher handle is never shared across threads.

pub mod complete;
pub mod config;
pub mod error;
pub mod exact;
pub mod expand;
pub mod limit;
pub mod node_match;
pub mod token;
pub mod tree;
pub mod value;
pub mod walker;

pub use complete::{complete, CompletionResult};
pub use config::{MatcherConfig, TabMode};
pub use error::{Error, Result};
pub use exact::{match_exact, MatchOutcome};
pub use expand::{ChoiceExpander, ChoiceRegistry, NoExpansion, ReferenceResolver, TreeRegistry};
pub use token::Tokens;
pub use tree::{Binding, Bindings, Child, Node, Tree};
pub use value::{Constraint, ScalarType, TypedValue};
