//! The grammar data model: [`Node`], [`Tree`], and the binding vector that
//! accumulates matched variable values during a walk (§3).

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::value::{Constraint, ScalarType, TypedValue};

/// One child slot of a node's children array. `Terminal` is the distinguished
/// sentinel that marks "this node is a legal place to stop" (§3, Invariants).
#[derive(Clone)]
pub enum Child {
    Node(Rc<Node>),
    Terminal,
}

impl Child {
    pub fn as_node(&self) -> Option<&Rc<Node>> {
        match self {
            Child::Node(n) => Some(n),
            Child::Terminal => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Child::Terminal)
    }
}

impl fmt::Debug for Child {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Child::Node(n) => write!(f, "{n:?}"),
            Child::Terminal => write!(f, "<terminal>"),
        }
    }
}

/// A literal keyword a user can type.
#[derive(Debug)]
pub struct Keyword {
    pub text: String,
    pub help: RefCell<Option<String>>,
    pub preference: i32,
}

/// A typed variable with optional validation constraints.
pub struct Variable {
    pub name: String,
    pub ty: ScalarType,
    pub constraints: Vec<Constraint>,
    pub help: Option<String>,
    pub preference: i32,
    /// Overwritten on a successful unique terminal-level match against a
    /// synthetic keyword expanded from this variable (§4.4.2, §5).
    pub(crate) matched_value: RefCell<Option<String>>,
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .finish()
    }
}

/// A symbolic reference to another subtree, resolved by the grammar layer's
/// [`crate::expand::ReferenceResolver`] (§4.4.3).
#[derive(Debug, Clone)]
pub struct Reference {
    pub target: String,
}

/// A grammar node: a keyword, a typed variable, or a reference to another
/// subtree. See §3.
pub enum NodeKind {
    Keyword(Keyword),
    Variable(Variable),
    Reference(Reference),
}

pub struct Node {
    pub kind: NodeKind,
    children: RefCell<Vec<Child>>,
    /// Non-owning back-pointer: for a synthetic keyword produced by
    /// expansion, the [`Variable`] node it was expanded from. `None` for
    /// every node that is not such a synthetic child (§3, Invariants).
    origin: RefCell<Option<Weak<Node>>>,
    /// Set once a reference/choice expansion has been spliced into
    /// `children`; re-expanding is then a no-op (§4.4.3, idempotent).
    expanded: RefCell<bool>,
    /// Set for a variable whose choice expansion produced synthetic keyword
    /// children. Such a variable is *transparent* during matching: the
    /// walker offers its synthetic children as this level's candidates
    /// instead of the variable itself (§4.4.3).
    choice_expanded: RefCell<bool>,
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NodeKind::Keyword(k) => write!(f, "Keyword({:?})", k.text),
            NodeKind::Variable(v) => write!(f, "Variable({:?})", v.name),
            NodeKind::Reference(r) => write!(f, "Reference({:?})", r.target),
        }
    }
}

impl Node {
    pub fn keyword(text: impl Into<String>, preference: i32) -> Rc<Node> {
        Rc::new(Node {
            kind: NodeKind::Keyword(Keyword {
                text: text.into(),
                help: RefCell::new(None),
                preference,
            }),
            children: RefCell::new(Vec::new()),
            origin: RefCell::new(None),
            expanded: RefCell::new(false),
            choice_expanded: RefCell::new(false),
        })
    }

    pub fn variable(
        name: impl Into<String>,
        ty: ScalarType,
        constraints: Vec<Constraint>,
        preference: i32,
    ) -> Rc<Node> {
        Rc::new(Node {
            kind: NodeKind::Variable(Variable {
                name: name.into(),
                ty,
                constraints,
                help: None,
                preference,
                matched_value: RefCell::new(None),
            }),
            children: RefCell::new(Vec::new()),
            origin: RefCell::new(None),
            expanded: RefCell::new(false),
            choice_expanded: RefCell::new(false),
        })
    }

    pub fn reference(target: impl Into<String>) -> Rc<Node> {
        Rc::new(Node {
            kind: NodeKind::Reference(Reference {
                target: target.into(),
            }),
            children: RefCell::new(Vec::new()),
            origin: RefCell::new(None),
            expanded: RefCell::new(false),
            choice_expanded: RefCell::new(false),
        })
    }

    pub fn with_children(self: &Rc<Self>, children: Vec<Child>) -> Rc<Self> {
        *self.children.borrow_mut() = children;
        Rc::clone(self)
    }

    pub fn push_child(&self, child: Child) {
        self.children.borrow_mut().push(child);
    }

    /// Remove every child, returning what was there. Used by choice
    /// expansion to move a variable's continuation subtree onto each of its
    /// synthetic alternatives instead of leaving it a sibling of them.
    pub fn take_children(&self) -> Vec<Child> {
        std::mem::take(&mut *self.children.borrow_mut())
    }

    pub fn set_terminal(&self) {
        self.children.borrow_mut().push(Child::Terminal);
    }

    pub fn children(&self) -> std::cell::Ref<'_, Vec<Child>> {
        self.children.borrow()
    }

    pub fn is_terminal(&self) -> bool {
        self.children.borrow().iter().any(Child::is_terminal)
    }

    pub fn preference(&self, exact: bool) -> i32 {
        match &self.kind {
            NodeKind::Keyword(k) => {
                if exact {
                    Preference::EXACT_KEYWORD
                } else {
                    k.preference
                }
            }
            NodeKind::Variable(v) => v.preference,
            NodeKind::Reference(_) => 0,
        }
    }

    pub fn origin(self: &Rc<Self>) -> Rc<Node> {
        match self.origin.borrow().as_ref().and_then(Weak::upgrade) {
            Some(o) => o,
            None => Rc::clone(self),
        }
    }

    pub fn set_origin(&self, origin: &Rc<Node>) {
        *self.origin.borrow_mut() = Some(Rc::downgrade(origin));
    }

    pub fn is_expanded(&self) -> bool {
        *self.expanded.borrow()
    }

    /// Attach help text to a synthetic keyword produced by expansion.
    pub fn set_help(&self, help: Option<String>) {
        if let NodeKind::Keyword(k) = &self.kind {
            *k.help.borrow_mut() = help;
        }
    }

    pub fn help(&self) -> Option<String> {
        match &self.kind {
            NodeKind::Keyword(k) => k.help.borrow().clone(),
            NodeKind::Variable(v) => v.help.clone(),
            NodeKind::Reference(_) => None,
        }
    }

    pub fn mark_expanded(&self) {
        *self.expanded.borrow_mut() = true;
    }

    pub fn mark_choice_expanded(&self) {
        *self.choice_expanded.borrow_mut() = true;
    }

    pub fn is_choice_expanded(&self) -> bool {
        *self.choice_expanded.borrow()
    }

    /// Attach the matched candidate string to this node's variable slot, so
    /// the callback layer can read it back (§5, side effect (b)).
    pub fn set_matched_value(&self, value: String) {
        if let NodeKind::Variable(v) = &self.kind {
            *v.matched_value.borrow_mut() = Some(value);
        }
    }

    pub fn matched_value(&self) -> Option<String> {
        match &self.kind {
            NodeKind::Variable(v) => v.matched_value.borrow().clone(),
            _ => None,
        }
    }

    pub fn keyword_text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Keyword(k) => Some(&k.text),
            _ => None,
        }
    }

    pub fn is_rest_variable(&self) -> bool {
        matches!(
            &self.kind,
            NodeKind::Variable(v) if v.ty == ScalarType::Rest
        )
    }
}

/// Preference weights used by the tie-breaker and interior-level arbitration
/// (§4.4.1, §4.6). An exact keyword match always wins over everything else;
/// among non-perfect matches, typed scalars beat strings, which beat rest.
pub struct Preference;

impl Preference {
    pub const EXACT_KEYWORD: i32 = 100;
    pub const KEYWORD: i32 = 40;
    pub const SCALAR: i32 = 30;
    pub const STRING: i32 = 20;
    pub const REST: i32 = 10;
    /// §9, open question: the tie-breaker reads an initial weight before any
    /// candidate has been observed. Treat that case as weight 0.
    pub const NONE: i32 = 0;
}

impl ScalarType {
    /// The node-kind preference weight for this scalar type (§4.4.1 step 3).
    pub fn preference_weight(&self) -> i32 {
        match self {
            ScalarType::Int32
            | ScalarType::Int64
            | ScalarType::Decimal64 { .. }
            | ScalarType::Ipv4
            | ScalarType::Ipv6
            | ScalarType::Mac => Preference::SCALAR,
            ScalarType::String => Preference::STRING,
            ScalarType::Rest => Preference::REST,
        }
    }
}

/// An ordered sequence of top-level nodes: the root of a grammar (§3).
#[derive(Clone)]
pub struct Tree {
    pub roots: Vec<Child>,
}

impl Tree {
    pub fn new(roots: Vec<Child>) -> Self {
        Self { roots }
    }
}

/// A single (name, value, is_constant) entry in the binding vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: String,
    pub value: TypedValue,
    pub is_constant: bool,
}

/// The ordered binding vector (`cvv`) accumulated while walking down a
/// matched path (§3). Grows on a successful match, shrinks again if that
/// branch is abandoned — see [`Bindings::scoped_push`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings(Vec<Binding>);

impl Bindings {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn as_slice(&self) -> &[Binding] {
        &self.0
    }

    pub fn push(&mut self, binding: Binding) {
        self.0.push(binding);
    }

    pub fn pop(&mut self) -> Option<Binding> {
        self.0.pop()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
