//! Right-hand-side trees: the grammar AST.

use indexmap::IndexSet;
use parlance_core::TokenType;

/// The node tag of an [`RhsTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RhsType {
    Identifier,
    Terminal,
    Regex,
    Group,
    Optional,
    Repeat,
    Alternation,
    Concatenation,
}

/// Arity class of a node: leaves carry a payload and no children, singles
/// exactly one child, lists any number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RhsKind {
    Leaf,
    Single,
    List,
}

impl RhsType {
    pub fn kind(self) -> RhsKind {
        match self {
            RhsType::Identifier | RhsType::Terminal | RhsType::Regex => RhsKind::Leaf,
            RhsType::Group | RhsType::Optional | RhsType::Repeat => RhsKind::Single,
            RhsType::Alternation | RhsType::Concatenation => RhsKind::List,
        }
    }
}

/// Stable handle to a rule in its grammar's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleId(pub(crate) usize);

/// Stable handle to a dependency grammar of the owning grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepId(pub(crate) usize);

/// A resolved identifier reference, populated by the linking pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    /// A rule of the owning grammar.
    Local(RuleId),
    /// A rule of one of the owning grammar's dependency grammars.
    External { dep: DepId, rule: RuleId },
}

/// A node in a grammar right-hand side.
///
/// The variant payloads make the kind arity invariants structural: leaves
/// cannot hold children, singles hold exactly one.
#[derive(Debug, Clone)]
pub enum RhsTree {
    Identifier { name: String, link: Option<Link> },
    Terminal { literal: String },
    Regex { token_type: TokenType },
    Group { child: Box<RhsTree> },
    Optional { child: Box<RhsTree> },
    Repeat { child: Box<RhsTree> },
    Alternation { children: Vec<RhsTree> },
    Concatenation { children: Vec<RhsTree> },
}

impl RhsTree {
    pub fn identifier(name: impl Into<String>) -> RhsTree {
        RhsTree::Identifier {
            name: name.into(),
            link: None,
        }
    }

    pub fn terminal(literal: impl Into<String>) -> RhsTree {
        RhsTree::Terminal {
            literal: literal.into(),
        }
    }

    /// The empty-string terminal (epsilon).
    pub fn epsilon() -> RhsTree {
        RhsTree::terminal("")
    }

    pub fn regex(token_type: TokenType) -> RhsTree {
        RhsTree::Regex { token_type }
    }

    /// Construct a single-child node of the given type.
    ///
    /// # Panics
    ///
    /// Panics when `rhs_type` is not of single kind.
    pub fn single(rhs_type: RhsType, child: RhsTree) -> RhsTree {
        let child = Box::new(child);
        match rhs_type {
            RhsType::Group => RhsTree::Group { child },
            RhsType::Optional => RhsTree::Optional { child },
            RhsType::Repeat => RhsTree::Repeat { child },
            other => panic!("{other:?} is not a single-child node type"),
        }
    }

    /// Construct a list node of the given type.
    ///
    /// # Panics
    ///
    /// Panics when `rhs_type` is not of list kind.
    pub fn list(rhs_type: RhsType, children: Vec<RhsTree>) -> RhsTree {
        match rhs_type {
            RhsType::Alternation => RhsTree::Alternation { children },
            RhsType::Concatenation => RhsTree::Concatenation { children },
            other => panic!("{other:?} is not a list node type"),
        }
    }

    pub fn rhs_type(&self) -> RhsType {
        match self {
            RhsTree::Identifier { .. } => RhsType::Identifier,
            RhsTree::Terminal { .. } => RhsType::Terminal,
            RhsTree::Regex { .. } => RhsType::Regex,
            RhsTree::Group { .. } => RhsType::Group,
            RhsTree::Optional { .. } => RhsType::Optional,
            RhsTree::Repeat { .. } => RhsType::Repeat,
            RhsTree::Alternation { .. } => RhsType::Alternation,
            RhsTree::Concatenation { .. } => RhsType::Concatenation,
        }
    }

    pub fn kind(&self) -> RhsKind {
        self.rhs_type().kind()
    }

    /// Children of a list or single node; empty for leaves.
    pub fn children(&self) -> &[RhsTree] {
        match self {
            RhsTree::Group { child } | RhsTree::Optional { child } | RhsTree::Repeat { child } => {
                std::slice::from_ref(child)
            }
            RhsTree::Alternation { children } | RhsTree::Concatenation { children } => children,
            _ => &[],
        }
    }

    /// The single child of a single-kind node, or the first child of a
    /// list node.
    ///
    /// # Panics
    ///
    /// Panics on leaves.
    pub fn child(&self) -> &RhsTree {
        self.children()
            .first()
            .unwrap_or_else(|| panic!("{:?} node has no children", self.rhs_type()))
    }

    /// Append a child to a list node.
    ///
    /// # Panics
    ///
    /// Panics on leaf and single nodes (kind arity invariant).
    pub fn push_child(&mut self, child: RhsTree) {
        match self {
            RhsTree::Alternation { children } | RhsTree::Concatenation { children } => {
                children.push(child);
            }
            other => panic!("cannot add a child to a {:?} node", other.rhs_type()),
        }
    }

    /// Remove and return the rightmost child of a list node.
    ///
    /// # Panics
    ///
    /// Panics on non-list nodes and on empty child lists.
    pub fn pop_child(&mut self) -> RhsTree {
        match self {
            RhsTree::Alternation { children } | RhsTree::Concatenation { children } => children
                .pop()
                .unwrap_or_else(|| panic!("cannot pop from an empty child list")),
            other => panic!("cannot pop a child from a {:?} node", other.rhs_type()),
        }
    }

    /// The name of an identifier leaf.
    ///
    /// # Panics
    ///
    /// Panics on other node types.
    pub fn identifier_name(&self) -> &str {
        match self {
            RhsTree::Identifier { name, .. } => name,
            other => panic!("{:?} node has no identifier name", other.rhs_type()),
        }
    }

    /// The resolved link of an identifier leaf.
    ///
    /// # Panics
    ///
    /// Panics when the identifier has not been linked, or on other node
    /// types; both are programming errors.
    pub fn link(&self) -> Link {
        match self {
            RhsTree::Identifier { name, link } => link
                .unwrap_or_else(|| panic!("identifier `{name}` is not linked")),
            other => panic!("{:?} node has no link", other.rhs_type()),
        }
    }

    /// Structural copy with all identifier links cleared. Rewritten
    /// grammars re-link from scratch.
    pub fn copy_unlinked(&self) -> RhsTree {
        match self {
            RhsTree::Identifier { name, .. } => RhsTree::identifier(name.clone()),
            RhsTree::Terminal { literal } => RhsTree::terminal(literal.clone()),
            RhsTree::Regex { token_type } => RhsTree::regex(token_type.clone()),
            RhsTree::Group { child } => RhsTree::Group {
                child: Box::new(child.copy_unlinked()),
            },
            RhsTree::Optional { child } => RhsTree::Optional {
                child: Box::new(child.copy_unlinked()),
            },
            RhsTree::Repeat { child } => RhsTree::Repeat {
                child: Box::new(child.copy_unlinked()),
            },
            RhsTree::Alternation { children } => RhsTree::Alternation {
                children: children.iter().map(RhsTree::copy_unlinked).collect(),
            },
            RhsTree::Concatenation { children } => RhsTree::Concatenation {
                children: children.iter().map(RhsTree::copy_unlinked).collect(),
            },
        }
    }

    /// Collect the terminal literals of this tree, not following links.
    pub fn collect_terminals(&self, out: &mut IndexSet<String>) {
        match self {
            RhsTree::Terminal { literal } => {
                out.insert(literal.clone());
            }
            RhsTree::Identifier { .. } | RhsTree::Regex { .. } => {}
            _ => {
                for child in self.children() {
                    child.collect_terminals(out);
                }
            }
        }
    }
}
