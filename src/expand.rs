//! Grammar-side callbacks required by sub-tree expansion (§4.4.3, §6).
//!
//! These are supplied by the grammar layer (out of scope for this crate,
//! per §1); the walker only invokes them through these two traits.

use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::Error;
use crate::tree::{Bindings, Node};

/// Resolves a [`crate::tree::Reference`]'s symbolic name to a concrete
/// subtree, substituted for the reference node for the scope of one match.
pub trait ReferenceResolver {
    fn resolve(&self, name: &str) -> Option<Rc<Node>>;
}

/// Populates the synthetic keyword children of a variable with an
/// enumerated or dynamically-computed value set. Each returned string
/// becomes a synthetic [`crate::tree::Child::Node`] whose
/// [`Node::origin`](crate::tree::Node::origin) points back at the variable.
///
/// Receives the current binding vector so later choices can depend on
/// earlier arguments (e.g. an interface name depending on a chosen device).
pub trait ChoiceExpander {
    /// Returns `(command_string, help_text)` pairs, or `None` if this
    /// variable has no registered expansion (an ordinary scalar).
    fn expand(&self, variable_name: &str, bindings: &Bindings) -> Option<Vec<(String, Option<String>)>>;
}

/// A [`ReferenceResolver`] and [`ChoiceExpander`] that never has anything to
/// offer — useful for grammars with no references or enumerated variables.
pub struct NoExpansion;

impl ReferenceResolver for NoExpansion {
    fn resolve(&self, _name: &str) -> Option<Rc<Node>> {
        None
    }
}

impl ChoiceExpander for NoExpansion {
    fn expand(&self, _variable_name: &str, _bindings: &Bindings) -> Option<Vec<(String, Option<String>)>> {
        None
    }
}

/// A [`ReferenceResolver`] backed by a name-ordered map, for grammars whose
/// references are known up front. Iteration (and thus help/expansion
/// ordering downstream) follows insertion order.
#[derive(Default)]
pub struct TreeRegistry(IndexMap<String, Rc<Node>>);

impl TreeRegistry {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn register(&mut self, name: impl Into<String>, subtree: Rc<Node>) {
        self.0.insert(name.into(), subtree);
    }
}

impl ReferenceResolver for TreeRegistry {
    fn resolve(&self, name: &str) -> Option<Rc<Node>> {
        self.0.get(name).cloned()
    }
}

/// A [`ChoiceExpander`] backed by a static, binding-independent choice map —
/// suitable for enumerations fixed at grammar-authoring time. Grammars whose
/// choices depend on earlier arguments should implement [`ChoiceExpander`]
/// directly instead.
#[derive(Default)]
pub struct ChoiceRegistry(IndexMap<String, Vec<(String, Option<String>)>>);

impl ChoiceRegistry {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn register(&mut self, variable_name: impl Into<String>, choices: Vec<(String, Option<String>)>) {
        self.0.insert(variable_name.into(), choices);
    }
}

impl ChoiceExpander for ChoiceRegistry {
    fn expand(&self, variable_name: &str, _bindings: &Bindings) -> Option<Vec<(String, Option<String>)>> {
        self.0.get(variable_name).cloned()
    }
}

/// Resolves `node`'s subtree in place: if it is a `Reference`, splice in the
/// resolver's subtree; if it is a `Variable` with a registered choice
/// expansion, append synthetic keyword children whose origin is `node`.
/// Idempotent: a node that has already been expanded is left untouched.
///
/// Both cases leave `node` *transparent* to the walker: a `Reference` never
/// matches a token itself (see [`crate::node_match::match_node`]), and a
/// choice-expanded variable is flagged via
/// [`Node::mark_choice_expanded`](crate::tree::Node::mark_choice_expanded) so
/// the walker offers its synthetic children as this level's candidates
/// instead of the variable.
pub(crate) fn expand_node(
    node: &Rc<Node>,
    bindings: &Bindings,
    resolver: &dyn ReferenceResolver,
    expander: &dyn ChoiceExpander,
) -> Result<(), Error> {
    if node.is_expanded() {
        return Ok(());
    }
    match &node.kind {
        crate::tree::NodeKind::Reference(r) => {
            let target = resolver
                .resolve(&r.target)
                .ok_or_else(|| Error::UnresolvedReference(r.target.clone()))?;
            for child in target.children().iter() {
                node.push_child(child.clone());
            }
        }
        crate::tree::NodeKind::Variable(v) => {
            if let Some(choices) = expander.expand(&v.name, bindings) {
                // Whatever already followed this variable (its continuation
                // subtree, including its own Terminal sentinel if it was a
                // legal stopping point) applies equally to every expanded
                // alternative, so it moves onto each synthetic child rather
                // than staying a sibling of them.
                let continuation = node.take_children();
                for (text, help) in choices {
                    let synthetic = Node::keyword(text, crate::tree::Preference::KEYWORD);
                    synthetic.set_help(help);
                    synthetic.set_origin(node);
                    synthetic.with_children(continuation.clone());
                    node.push_child(crate::tree::Child::Node(synthetic));
                }
                node.mark_choice_expanded();
            }
        }
        crate::tree::NodeKind::Keyword(_) => {}
    }
    node.mark_expanded();
    Ok(())
}
