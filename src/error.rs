//! Error type for the matcher.
//!
//! Only *fatal* conditions are represented here: grammar inconsistencies
//! surfaced by the reference resolver / choice expander. "No match",
//! "ambiguous" and "incomplete command" are not errors — they are outcomes,
//! returned as plain enum values from [`crate::exact::match_exact`] and
//! friends.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A [`crate::expand::ReferenceResolver`] could not resolve a symbolic
    /// subtree name.
    #[error("reference to unknown subtree {0:?}")]
    UnresolvedReference(String),

    /// Sub-tree expansion recursed into itself without making progress.
    #[error("cyclic expansion detected while expanding {0:?}")]
    CyclicExpansion(String),
}
